//! Other information: services listening on this machine and who owns them.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;

use aridi_common::log::EventLog;
use aridi_common::report::{Category, DetailLevel, ReportModel};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

use super::Collector;
use crate::system::Precheck;

pub struct OtherCollector;

impl Collector for OtherCollector {
    fn name(&self) -> &'static str {
        "Other information gathering"
    }

    fn category(&self) -> Category {
        Category::Other
    }

    fn collect(
        &self,
        model: &mut ReportModel,
        log: &EventLog,
        precheck: &Precheck,
    ) -> anyhow::Result<()> {
        let af_flags = AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6;
        let sockets_info: Vec<SocketInfo> = get_sockets_info(af_flags, ProtocolFlags::TCP)?;
        let mut sys = System::new();
        sys.refresh_processes();

        let mut listeners: BTreeMap<SocketAddr, Option<String>> = BTreeMap::new();
        for si in &sockets_info {
            let Some(addr) = listening_addr(&si.protocol_socket_info) else {
                continue;
            };
            let owner: Option<String> = si
                .associated_pids
                .first()
                .and_then(|pid| sys.process(Pid::from_u32(*pid)))
                .map(|process| process.name().to_string());
            let entry = listeners.entry(addr).or_default();
            if entry.is_none() {
                *entry = owner;
            }
        }
        log.debug(format!("{} listening TCP sockets", listeners.len()));
        if !precheck.root && listeners.values().any(Option::is_none) {
            log.debug("Some socket owners are hidden without root privileges");
        }

        record_listeners(model, &listeners);
        Ok(())
    }
}

/// Local address of a TCP socket in the listen state.
fn listening_addr(info: &ProtocolSocketInfo) -> Option<SocketAddr> {
    match info {
        ProtocolSocketInfo::Tcp(tcp) if tcp.state == TcpState::Listen => {
            Some(SocketAddr::new(tcp.local_addr, tcp.local_port))
        }
        _ => None,
    }
}

fn record_listeners(model: &mut ReportModel, listeners: &BTreeMap<SocketAddr, Option<String>>) {
    const CAT: Category = Category::Other;

    let ports: BTreeSet<u16> = listeners.keys().map(SocketAddr::port).collect();
    let joined: Vec<String> = ports.iter().map(u16::to_string).collect();
    model.add_fact(CAT, DetailLevel::Summary, "Listening TCP ports", joined.join(", "));

    for (addr, owner) in listeners {
        let scope: &str = if addr.ip().is_loopback() { "local only" } else { "reachable" };
        let value: String = match owner {
            Some(name) => format!("{name}, {scope}"),
            None => format!("unknown process, {scope}"),
        };
        model.add_fact(CAT, DetailLevel::Detailed, format!("Listener {addr}"), value);
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
