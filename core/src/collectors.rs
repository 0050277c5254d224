//! # Collector Stages
//!
//! Each collector gathers one category of host facts and writes them into the
//! [`ReportModel`]. Collectors never read each other's state directly: the
//! only thing shared is the model's append API and the [`EventLog`].
//!
//! A failing collector returns its error to the stage boundary, which logs it
//! and moves on to the next stage.

use aridi_common::log::EventLog;
use aridi_common::report::{Category, ReportModel};

use crate::system::Precheck;

pub mod general;
pub mod other;
pub mod specific;
pub mod volatile;

pub use general::GeneralCollector;
pub use other::OtherCollector;
pub use specific::SpecificCollector;
pub use volatile::VolatileCollector;

pub trait Collector {
    /// Human readable stage name, used in log messages.
    fn name(&self) -> &'static str;

    fn category(&self) -> Category;

    fn collect(
        &self,
        model: &mut ReportModel,
        log: &EventLog,
        precheck: &Precheck,
    ) -> anyhow::Result<()>;
}

/// The collector gathering `category`. Infrastructure is filled by the scanner.
pub fn for_category(category: Category) -> Option<Box<dyn Collector>> {
    match category {
        Category::General => Some(Box::new(GeneralCollector)),
        Category::Specific => Some(Box::new(SpecificCollector)),
        Category::Volatile => Some(Box::new(VolatileCollector)),
        Category::Other => Some(Box::new(OtherCollector)),
        Category::Infrastructure => None,
    }
}

pub(crate) fn mebibytes(bytes: u64) -> u64 {
    bytes / (1024 * 1024)
}
