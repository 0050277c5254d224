//! General information: identity of the machine, its interfaces and the
//! neighbours it already talks to. This collector also seeds the host
//! inventory the scanner works on.

use std::collections::BTreeSet;
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::OnceLock;

use anyhow::Context;
use aridi_common::log::EventLog;
use aridi_common::report::{Category, DetailLevel, ReportModel};
use mac_oui::Oui;
use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use pnet::util::MacAddr;

use super::Collector;
use crate::system::Precheck;

const ARP_CACHE: &str = "/proc/net/arp";
const ARP_FLAG_COMPLETE: u32 = 0x2;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

pub struct GeneralCollector;

impl Collector for GeneralCollector {
    fn name(&self) -> &'static str {
        "General information gathering"
    }

    fn category(&self) -> Category {
        Category::General
    }

    fn collect(
        &self,
        model: &mut ReportModel,
        log: &EventLog,
        precheck: &Precheck,
    ) -> anyhow::Result<()> {
        const CAT: Category = Category::General;

        let hostname: String = sys_info::hostname().context("reading the hostname")?;
        model.add_fact(CAT, DetailLevel::Summary, "Hostname", hostname);

        match (sys_info::os_type(), sys_info::os_release()) {
            (Ok(os), Ok(release)) => {
                let system: String = format!("{os} {release}");
                model.add_fact(CAT, DetailLevel::Summary, "Operating system", system);
            }
            _ => {
                log.debug("Operating system release not available");
            }
        }

        let privileges: &str = if precheck.root { "root" } else { "unprivileged user" };
        model.add_fact(CAT, DetailLevel::Detailed, "Privileges", privileges);

        if let Ok(cpus) = sys_info::cpu_num() {
            model.add_fact(CAT, DetailLevel::Detailed, "CPUs", cpus.to_string());
        }
        if let Ok(mem) = sys_info::mem_info() {
            let memory: String = format!(
                "{} MiB total, {} MiB available",
                mem.total / 1024,
                mem.avail / 1024
            );
            model.add_fact(CAT, DetailLevel::Detailed, "Memory", memory);
        }

        let interfaces: Vec<NetworkInterface> = datalink::interfaces()
            .into_iter()
            .filter(|intf| intf.is_up() && !intf.ips.is_empty())
            .collect();
        log.debug(format!("Identified {} active network interface(s)", interfaces.len()));

        let mut addresses: BTreeSet<IpAddr> = BTreeSet::new();
        for intf in &interfaces {
            let networks: String = describe_networks(&intf.ips);
            model.add_fact(CAT, DetailLevel::Detailed, format!("Interface {}", intf.name), networks);
            if let Some(mac) = intf.mac.filter(|mac| *mac != MacAddr::zero()) {
                let vendor: String =
                    get_vendor(mac).unwrap_or_else(|| String::from("unknown vendor"));
                let value: String = format!("{mac} ({vendor})");
                model.add_fact(CAT, DetailLevel::Full, format!("MAC {}", intf.name), value);
            }
            addresses.extend(
                intf.ips
                    .iter()
                    .map(IpNetwork::ip)
                    .filter(|ip| ip.is_ipv4() && !ip.is_loopback()),
            );
        }

        if !addresses.is_empty() {
            let joined: Vec<String> = addresses.iter().map(IpAddr::to_string).collect();
            model.add_fact(CAT, DetailLevel::Summary, "Addresses", joined.join(", "));
        }

        let neighbours: Vec<ArpNeighbour> = match fs::read_to_string(ARP_CACHE) {
            Ok(table) => parse_arp_table(&table),
            Err(e) => {
                log.debug(format!("ARP cache not readable: {e}"));
                Vec::new()
            }
        };
        if !neighbours.is_empty() {
            let lines: Vec<String> = neighbours
                .iter()
                .map(|n| format!("{} {} on {}", n.ip, n.mac, n.device))
                .collect();
            model.add_fact(CAT, DetailLevel::Full, "ARP neighbours", lines.join("\n"));
        }

        let mut registered: usize = 0;
        for ip in addresses.iter().copied().chain(neighbours.iter().map(|n| IpAddr::V4(n.ip))) {
            if model.add_host(ip) {
                registered += 1;
            }
        }
        if model.inventory().is_empty() {
            log.debug("No network addresses found, falling back to the loopback address");
            model.add_host(IpAddr::V4(Ipv4Addr::LOCALHOST));
            registered += 1;
        }
        log.info(format!("{registered} host(s) added to the inventory"));

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpNeighbour {
    pub ip: Ipv4Addr,
    pub mac: String,
    pub device: String,
}

/// Parses the Linux ARP cache, keeping complete entries only.
pub fn parse_arp_table(table: &str) -> Vec<ArpNeighbour> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [ip, _hw_type, flags, mac, _mask, device] = fields.as_slice() else {
                return None;
            };
            let flags: u32 = u32::from_str_radix(flags.trim_start_matches("0x"), 16).ok()?;
            if flags & ARP_FLAG_COMPLETE == 0 {
                return None;
            }
            Some(ArpNeighbour {
                ip: ip.parse().ok()?,
                mac: mac.to_string(),
                device: device.to_string(),
            })
        })
        .collect()
}

fn describe_networks(ips: &[IpNetwork]) -> String {
    ips.iter()
        .map(|net| format!("{}/{}", net.ip(), net.prefix()))
        .collect::<Vec<String>>()
        .join(", ")
}

/// Identify the vendor of a MAC address from its OUI.
fn get_vendor(mac: MacAddr) -> Option<String> {
    let db: &Oui = OUI_DB.get_or_init(|| Oui::default().ok()).as_ref()?;
    match db.lookup_by_mac(&mac.to_string()) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
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
