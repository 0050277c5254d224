mod commands;
mod stages;
mod terminal;

use std::path::Path;

use anyhow::Context;
use aridi_common::config::Config;
use aridi_common::log::EventLog;
use aridi_common::report::{Category, ReportModel};
use aridi_core::collectors;
use aridi_core::graph;
use aridi_core::render::{self, Sections, Snapshot, View};
use aridi_core::scanner::NetworkScanner;
use aridi_core::services::PortNameResolver;
use aridi_core::system::Precheck;

use commands::CommandLine;
use terminal::{logging, print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let cfg: Config = commands.config();

    let log = EventLog::with_verbosity(cfg.verbosity).context("cannot set up the event log")?;
    logging::init(cfg.verbosity);
    check_settings(&cfg, &log)?;

    if cfg.verbosity >= 0 {
        print::banner();
    }
    log.info("aridi started");
    log.debug(format!("Verbosity level {}", cfg.verbosity));

    let sections: Sections = commands.sections();
    let view: View = commands.view();

    let resolver: PortNameResolver = load_port_names(&cfg, &log);
    let precheck: Precheck = Precheck::run();
    if precheck.root {
        log.debug("Executed with uid 0");
    } else {
        log.debug("Executed as a user");
        log.warning("aridi has been invoked with restricted privileges");
        if !cfg.assume_yes && !print::confirm_unprivileged().unwrap_or(false) {
            log.info("Run cancelled without root privileges");
            return flush(&log, &cfg.log_path);
        }
    }
    log.debug("Precheck finished");

    let mut model = ReportModel::new();
    for category in Category::ALL.into_iter().filter(|c| sections.includes(*c)) {
        if let Some(collector) = collectors::for_category(category) {
            let _ = stages::run(&log, collector.name(), || {
                collector.collect(&mut model, &log, &precheck)
            });
        }
    }

    if sections.infrastructure {
        spinner::start("Scanning the gathered hosts...");
        let scanner =
            NetworkScanner::new(cfg.scan.clone()).on_progress(spinner::report_scan_progress);
        let _ = stages::run_async(&log, "Scan", async {
            anyhow::Ok(
                scanner
                    .scan(&mut model, &resolver, &log, cfg.scan.start_port)
                    .await?,
            )
        })
        .await;
        spinner::stop();
    }

    if commands.graph {
        let _ = stages::run(&log, "Graph export", || {
            match graph::make_graph(&model, graph::DEFAULT_DOT_PATH, &log)? {
                true => log.info("Graph generated"),
                false => log.info("Graph didn't generate"),
            };
            Ok(())
        });
    }

    let entries = log.rendered_view();
    let snapshot = Snapshot {
        log: &entries,
        model: &model,
    };
    let report: String = render::render(view, &snapshot, &sections);

    match &commands.file {
        Some(path) => {
            if let Err(e) = render::save(path, &report) {
                log.error(format!("Report failed: {e}"));
                flush(&log, &cfg.log_path)?;
                return Err(e).context("something went wrong with the report, see the log");
            }
            log.info(format!("{} saved", path.display()));
        }
        None => println!("{report}"),
    }

    log.info("aridi completed successfully");
    if cfg.verbosity >= 0 {
        print::finished(commands.file.as_deref());
    }
    flush(&log, &cfg.log_path)
}

/// Invalid scanner settings end the run, but only after the log artifact
/// recorded why.
fn check_settings(cfg: &Config, log: &EventLog) -> anyhow::Result<()> {
    if let Err(e) = cfg.scan.validate() {
        log.error(format!("Setup failed: {e}"));
        flush(log, &cfg.log_path)?;
        return Err(e).context("cannot set up the scanner");
    }
    Ok(())
}

/// A missing port database only costs service names; the scan still runs.
fn load_port_names(cfg: &Config, log: &EventLog) -> PortNameResolver {
    let mut resolver = PortNameResolver::new();
    if resolver.load(&cfg.services_path, log) {
        log.info(format!("{} port names loaded", resolver.len()));
    } else {
        log.error(format!(
            "aridi can't load port names from {}, open ports will have no service name",
            cfg.services_path.display()
        ));
    }
    resolver
}

fn flush(log: &EventLog, path: &Path) -> anyhow::Result<()> {
    log.flush(path)
        .with_context(|| format!("cannot write the log to {}", path.display()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use aridi_common::log::Severity;

    fn config(log_name: &str) -> Config {
        let mut cfg = Config::default();
        cfg.log_path = std::env::temp_dir().join(format!("{log_name}-{}.log", std::process::id()));
        cfg
    }

    #[test]
    fn invalid_settings_are_logged_and_flushed() {
        let mut cfg = config("aridi-setup-invalid");
        cfg.scan.workers = 0;
        let log = EventLog::new();

        let err = check_settings(&cfg, &log).unwrap_err();

        assert!(format!("{err:#}").contains("worker pool size"));
        assert_eq!(log.view(Severity::Error).len(), 1);
        let artifact = std::fs::read_to_string(&cfg.log_path).unwrap();
        assert!(artifact.contains("ERROR   Setup failed: invalid scanner setting"));
        let _ = std::fs::remove_file(&cfg.log_path);
    }

    #[test]
    fn valid_settings_write_nothing_yet() {
        let cfg = config("aridi-setup-valid");
        let log = EventLog::new();

        check_settings(&cfg, &log).unwrap();

        assert!(log.is_empty());
        assert!(!cfg.log_path.exists());
    }
}
