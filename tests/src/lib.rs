//! End-to-end checks of the scanner and the report pipeline against real
//! loopback sockets.

#[cfg(test)]
mod util;

#[cfg(test)]
mod scan {
    mod integration;
}

#[cfg(test)]
mod report {
    mod pipeline;
}
