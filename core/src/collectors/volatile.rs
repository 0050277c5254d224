//! Volatile information: state that changes from one minute to the next.

use std::time::Duration;

use aridi_common::log::EventLog;
use aridi_common::report::{Category, DetailLevel, ReportModel};
use sysinfo::{ProcessExt, System, SystemExt};

use super::{Collector, mebibytes};
use crate::system::Precheck;

const TOP_PROCESSES: usize = 10;

pub struct VolatileCollector;

impl Collector for VolatileCollector {
    fn name(&self) -> &'static str {
        "Volatile information gathering"
    }

    fn category(&self) -> Category {
        Category::Volatile
    }

    fn collect(
        &self,
        model: &mut ReportModel,
        log: &EventLog,
        _precheck: &Precheck,
    ) -> anyhow::Result<()> {
        const CAT: Category = Category::Volatile;

        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_processes();

        let uptime: String = format_uptime(Duration::from_secs(sys.uptime()));
        model.add_fact(CAT, DetailLevel::Summary, "Uptime", uptime);

        let load = sys.load_average();
        let load: String = format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen);
        model.add_fact(CAT, DetailLevel::Detailed, "Load average", load);

        let memory: String = format!(
            "{} MiB used of {} MiB",
            mebibytes(sys.used_memory()),
            mebibytes(sys.total_memory())
        );
        model.add_fact(CAT, DetailLevel::Detailed, "Memory in use", memory);

        let mut processes: Vec<_> = sys.processes().values().collect();
        log.debug(format!("{} processes visible", processes.len()));
        model.add_fact(CAT, DetailLevel::Summary, "Processes", processes.len().to_string());

        processes.sort_by(|a, b| b.memory().cmp(&a.memory()).then(a.pid().cmp(&b.pid())));
        let top: Vec<String> = processes
            .iter()
            .take(TOP_PROCESSES)
            .map(|p| format!("{} {} ({} MiB)", p.pid(), p.name(), mebibytes(p.memory())))
            .collect();
        model.add_fact(CAT, DetailLevel::Detailed, "Top memory consumers", top.join("\n"));

        processes.sort_by_key(|p| p.pid());
        for process in processes {
            let command: String = match process.cmd() {
                [] => process.name().to_string(),
                cmd => cmd.join(" "),
            };
            model.add_fact(CAT, DetailLevel::Full, format!("Process {}", process.pid()), command);
        }

        Ok(())
    }
}

fn format_uptime(uptime: Duration) -> String {
    let secs: u64 = uptime.as_secs();
    let (days, hours, minutes) = (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60);
    match days {
        0 => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h {minutes}m"),
    }
}
