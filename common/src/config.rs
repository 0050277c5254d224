use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SetupError;
use crate::log::DEFAULT_VERBOSITY;

pub const DEFAULT_START_PORT: u16 = 22;
pub const DEFAULT_WORKERS: usize = 64;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(750);
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);
pub const DEFAULT_SERVICES_PATH: &str = "services.csv";
pub const DEFAULT_LOG_PATH: &str = "aridi.log";

/// Ports probed on every host after the contiguous range, used for service discovery.
pub const WELL_KNOWN_PORTS: [u16; 20] = [
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5900,
    8080,
];

/// Run-wide settings, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// From -1 (suppress everything) to 3 (debug and above).
    pub verbosity: i8,
    pub scan: ScanConfig,
    /// Delimited port to service name database.
    pub services_path: PathBuf,
    /// Artifact that receives every log entry when the run ends.
    pub log_path: PathBuf,
    /// Skips the confirmation asked when running without root privileges.
    pub assume_yes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            scan: ScanConfig::default(),
            services_path: PathBuf::from(DEFAULT_SERVICES_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            assume_yes: false,
        }
    }
}

/// Tuning of the port scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// First port probed on every host.
    pub start_port: u16,
    /// Length of the contiguous range beginning at the start port.
    pub port_count: u16,
    pub well_known: Vec<u16>,
    /// Upper bound of probes in flight at the same time.
    pub workers: usize,
    pub probe_timeout: Duration,
    /// Overall budget of one scan invocation.
    pub deadline: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_port: DEFAULT_START_PORT,
            port_count: 1,
            well_known: WELL_KNOWN_PORTS.to_vec(),
            workers: DEFAULT_WORKERS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.workers == 0 {
            return Err(SetupError::ScanConfig("worker pool size must be at least 1"));
        }
        if self.port_count == 0 {
            return Err(SetupError::ScanConfig("port count must be at least 1"));
        }
        if self.probe_timeout.is_zero() {
            return Err(SetupError::ScanConfig("probe timeout must be positive"));
        }
        if self.deadline.is_zero() {
            return Err(SetupError::ScanConfig("scan deadline must be positive"));
        }
        Ok(())
    }

    /// Ports probed on each host, in dispatch order.
    ///
    /// The seed port comes first, followed by the rest of the contiguous range
    /// and then the well-known set. Duplicates and port 0 are dropped.
    pub fn ports(&self, start_port: u16) -> Vec<u16> {
        let end: u16 = start_port.saturating_add(self.port_count.saturating_sub(1));
        let contiguous = (start_port..=end).filter(|port| *port != 0);

        let mut seen: HashSet<u16> = HashSet::new();
        let mut ports: Vec<u16> = Vec::new();
        for port in contiguous.chain(self.well_known.iter().copied()) {
            if port != 0 && seen.insert(port) {
                ports.push(port);
            }
        }
        ports
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
