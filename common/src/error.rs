use std::io;
use std::net::IpAddr;
use std::path::PathBuf;

use thiserror::Error;

/// The aggregation engine could not be constructed. Always fatal.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("verbosity level {0} is outside -1..=3")]
    Verbosity(i8),
    #[error("invalid scanner setting: {0}")]
    ScanConfig(&'static str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// A port result arrived for an address no collector registered.
    #[error("host {0} was never registered in the inventory")]
    UnknownHost(IpAddr),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("no ports selected for probing")]
    NoPorts,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot write the report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
