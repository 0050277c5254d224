//! Specific information: storage layout and local accounts.

use aridi_common::log::EventLog;
use aridi_common::report::{Category, DetailLevel, ReportModel};
use sysinfo::{DiskExt, System, SystemExt, UserExt};

use super::{Collector, mebibytes};
use crate::system::Precheck;

pub struct SpecificCollector;

impl Collector for SpecificCollector {
    fn name(&self) -> &'static str {
        "Specific information gathering"
    }

    fn category(&self) -> Category {
        Category::Specific
    }

    fn collect(
        &self,
        model: &mut ReportModel,
        log: &EventLog,
        precheck: &Precheck,
    ) -> anyhow::Result<()> {
        const CAT: Category = Category::Specific;

        let mut sys = System::new();
        sys.refresh_disks_list();
        sys.refresh_users_list();

        if let Some(kernel) = sys.kernel_version() {
            model.add_fact(CAT, DetailLevel::Summary, "Kernel", kernel);
        }
        if let Some(os) = sys.long_os_version() {
            model.add_fact(CAT, DetailLevel::Detailed, "Distribution", os);
        }

        let disks = sys.disks();
        model.add_fact(CAT, DetailLevel::Summary, "Mounted disks", disks.len().to_string());
        for disk in disks {
            let value: String = format!(
                "{} ({}), {} MiB total, {} MiB free",
                disk.name().to_string_lossy(),
                String::from_utf8_lossy(disk.file_system()),
                mebibytes(disk.total_space()),
                mebibytes(disk.available_space())
            );
            let name: String = format!("Disk {}", disk.mount_point().display());
            model.add_fact(CAT, DetailLevel::Detailed, name, value);
        }

        let mut users: Vec<(String, String)> = sys
            .users()
            .iter()
            .map(|user| (user.name().to_string(), user.groups().join(", ")))
            .collect();
        users.sort();
        if users.is_empty() && !precheck.root {
            log.warning("No user accounts visible, try again with root privileges");
        }

        let names: Vec<&str> = users.iter().map(|(name, _)| name.as_str()).collect();
        model.add_fact(CAT, DetailLevel::Summary, "Users", names.join(", "));
        for (name, groups) in &users {
            model.add_fact(CAT, DetailLevel::Full, format!("Groups of {name}"), groups.as_str());
        }

        Ok(())
    }
}
