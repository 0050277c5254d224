use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use crate::error::ReportError;

use super::fact::{Category, DetailLevel, FactRecord};
use super::inventory::{Inventory, PortResult};

/// Facts partitioned by category plus the host inventory.
///
/// Content only grows: there is no way to remove or rewrite a fact, a host or
/// a port result once recorded.
#[derive(Debug, Clone, Default)]
pub struct ReportModel {
    facts: BTreeMap<Category, Vec<FactRecord>>,
    inventory: Inventory,
}

impl ReportModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fact(
        &mut self,
        category: Category,
        level: DetailLevel,
        name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.facts
            .entry(category)
            .or_default()
            .push(FactRecord::new(category, level, name, value));
    }

    /// Registers a host. Returns `false` when the address was already known.
    pub fn add_host(&mut self, address: IpAddr) -> bool {
        self.inventory.insert(address)
    }

    pub fn add_port_result(
        &mut self,
        address: IpAddr,
        result: PortResult,
    ) -> Result<(), ReportError> {
        if self.inventory.push_result(&address, result) {
            Ok(())
        } else {
            Err(ReportError::UnknownHost(address))
        }
    }

    /// Facts of the requested categories, in insertion order. A requested
    /// category without facts maps to an empty slice.
    pub fn categories(&self, requested: &BTreeSet<Category>) -> BTreeMap<Category, &[FactRecord]> {
        requested
            .iter()
            .map(|category| (*category, self.facts(*category)))
            .collect()
    }

    pub fn facts(&self, category: Category) -> &[FactRecord] {
        self.facts.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First fact with the given name, used by stages that need a value another one gathered.
    pub fn fact_value(&self, category: Category, name: &str) -> Option<&str> {
        self.facts(category)
            .iter()
            .find(|fact| fact.name == name)
            .map(|fact| fact.value.as_str())
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
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
