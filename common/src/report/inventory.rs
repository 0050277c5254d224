use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    Error,
}

impl PortState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortState::Open => "open",
            PortState::Closed => "closed",
            PortState::Filtered => "filtered",
            PortState::Error => "error",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of probing one port on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    pub port: u16,
    pub state: PortState,
    /// Only resolved for open ports, and only when the database knows the port.
    pub service: Option<String>,
    pub duration: Duration,
    /// Transport error behind an [`PortState::Error`] result.
    pub error: Option<String>,
}

impl PortResult {
    pub fn new(port: u16, state: PortState, duration: Duration) -> Self {
        Self {
            port,
            state,
            service: None,
            duration,
            error: None,
        }
    }

    pub fn with_service(mut self, service: Option<String>) -> Self {
        self.service = service;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    address: IpAddr,
    ports: Vec<PortResult>,
}

impl HostRecord {
    fn new(address: IpAddr) -> Self {
        Self {
            address,
            ports: Vec::new(),
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// Results in the order the probes completed.
    pub fn ports(&self) -> &[PortResult] {
        &self.ports
    }

    pub fn with_state(&self, state: PortState) -> impl Iterator<Item = &PortResult> {
        self.ports.iter().filter(move |result| result.state == state)
    }
}

/// Every host known to this run, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    hosts: Vec<HostRecord>,
    index: HashMap<IpAddr, usize>,
}

impl Inventory {
    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    pub fn get(&self, address: &IpAddr) -> Option<&HostRecord> {
        self.index.get(address).map(|idx| &self.hosts[*idx])
    }

    pub fn contains(&self, address: &IpAddr) -> bool {
        self.index.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.hosts.iter().map(HostRecord::address)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub(crate) fn insert(&mut self, address: IpAddr) -> bool {
        if self.contains(&address) {
            return false;
        }
        self.index.insert(address, self.hosts.len());
        self.hosts.push(HostRecord::new(address));
        true
    }

    pub(crate) fn push_result(&mut self, address: &IpAddr, result: PortResult) -> bool {
        match self.index.get(address) {
            Some(idx) => {
                self.hosts[*idx].ports.push(result);
                true
            }
            None => false,
        }
    }
}
