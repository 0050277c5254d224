//! Facts about the running process that later stages depend on.

/// Result of the privilege precheck, handed to every collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precheck {
    /// Running with uid 0. Several collectors read less without it.
    pub root: bool,
}

impl Precheck {
    pub fn run() -> Self {
        Self {
            root: is_root::is_root(),
        }
    }
}
