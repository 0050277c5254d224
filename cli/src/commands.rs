use std::path::PathBuf;
use std::time::Duration;

use aridi_common::config::{self, Config, ScanConfig};
use aridi_common::log::{DEFAULT_VERBOSITY, MAX_VERBOSITY, MIN_VERBOSITY};
use aridi_core::render::{Sections, View};
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(name = "aridi")]
#[command(version, about = "Gathers host information and maps the services around it.")]
#[command(disable_version_flag = true)]
#[command(group(ArgGroup::new("output").multiple(false)))]
pub struct CommandLine {
    /// Print version
    #[arg(long, action = clap::ArgAction::Version)]
    version: (),

    /// General, specific, volatile and other information
    #[arg(short, long)]
    pub all: bool,

    /// General information about this host (default)
    #[arg(short, long)]
    pub general: bool,

    /// Specific information, implies --general
    #[arg(short, long)]
    pub specific: bool,

    /// Volatile information: uptime, load and processes
    #[arg(short, long)]
    pub volatile: bool,

    /// Other information: listening sockets
    #[arg(short = 'c', long = "carving")]
    pub other: bool,

    /// Scan every gathered host for open TCP ports
    #[arg(long)]
    pub scan: bool,

    /// Export the network graph (PNG too when Graphviz is installed)
    #[arg(long)]
    pub graph: bool,

    /// Log verbosity: -1 none, 0 errors, 1 warnings, 2 info, 3 debug
    #[arg(
        short = 'V',
        long = "verbose",
        value_name = "LEVEL",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i8).range(MIN_VERBOSITY as i64..=MAX_VERBOSITY as i64),
    )]
    pub verbosity: Option<i8>,

    /// Everything gathered, every port result and the execution log
    #[arg(long, group = "output")]
    pub output_full: bool,

    /// Summary and detailed facts, open and closed ports
    #[arg(long, group = "output")]
    pub output_det: bool,

    /// Summary facts and open ports (default)
    #[arg(long, group = "output")]
    pub output_sum: bool,

    /// Hosts and their ports only
    #[arg(long, group = "output")]
    pub output_inf: bool,

    /// First port of the contiguous scan range
    #[arg(long, default_value_t = config::DEFAULT_START_PORT)]
    pub start_port: u16,

    /// Extra ports to probe on every host, replacing the well-known list
    #[arg(long, value_delimiter = ',')]
    pub ports: Option<Vec<u16>>,

    /// Length of the contiguous scan range
    #[arg(long, default_value_t = 1)]
    pub port_count: u16,

    /// Probes in flight at once
    #[arg(long, default_value_t = config::DEFAULT_WORKERS)]
    pub workers: usize,

    /// Timeout of a single connection attempt
    #[arg(long, value_name = "MS")]
    pub probe_timeout_ms: Option<u64>,

    /// Overall scan deadline
    #[arg(long, value_name = "SECS")]
    pub deadline_secs: Option<u64>,

    /// Port to service name database
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_SERVICES_PATH)]
    pub services: PathBuf,

    /// Where the execution log is written
    #[arg(long, value_name = "PATH", default_value = config::DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,

    /// Continue without root privileges instead of asking
    #[arg(short = 'y', long)]
    pub assume_yes: bool,

    /// Write the report to FILE instead of the console
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn view(&self) -> View {
        if self.output_full {
            View::Full
        } else if self.output_det {
            View::Detailed
        } else if self.output_inf {
            View::Infrastructure
        } else {
            View::Summarized
        }
    }

    /// Gathering categories to run. General is implied by specific and is
    /// the default unless volatile or other information was chosen.
    pub fn sections(&self) -> Sections {
        let specific: bool = self.all || self.specific;
        let volatile: bool = self.all || self.volatile;
        let other: bool = self.all || self.other;
        let general: bool =
            self.all || self.general || specific || !(volatile || other);
        Sections {
            general,
            specific,
            volatile,
            other,
            infrastructure: self.scan,
        }
    }

    pub fn config(&self) -> Config {
        let defaults = ScanConfig::default();
        Config {
            verbosity: self.verbosity.unwrap_or(DEFAULT_VERBOSITY),
            scan: ScanConfig {
                start_port: self.start_port,
                port_count: self.port_count,
                well_known: self.ports.clone().unwrap_or(defaults.well_known),
                workers: self.workers,
                probe_timeout: self
                    .probe_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.probe_timeout),
                deadline: self
                    .deadline_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.deadline),
            },
            services_path: self.services.clone(),
            log_path: self.log_file.clone(),
            assume_yes: self.assume_yes,
        }
    }
}
