//! Shared model of an aridi run: configuration, errors, the event log and the
//! report model every stage writes into.

pub mod config;
pub mod error;
pub mod log;
pub mod report;
