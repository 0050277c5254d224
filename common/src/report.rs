//! # Report Model
//!
//! The structured store every collector and the scanner write into.
//!
//! * [`fact`]: categorized facts with a detail level.
//! * [`inventory`]: known hosts and their port findings.
//! * [`model`]: the [`ReportModel`] aggregate and its append API.

pub mod fact;
pub mod inventory;
pub mod model;

pub use fact::{Category, DetailLevel, FactRecord};
pub use inventory::{HostRecord, Inventory, PortResult, PortState};
pub use model::ReportModel;
