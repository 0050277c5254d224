//! # aridi core
//!
//! The engines behind an aridi run:
//!
//! * [`services`]: port to service name lookups.
//! * [`scanner`]: the concurrent TCP port scanner.
//! * [`render`]: the four report views.
//! * [`collectors`]: host fact gathering stages.
//! * [`graph`]: Graphviz export of the inventory.
//! * [`system`]: privilege precheck.

pub mod collectors;
pub mod graph;
pub mod render;
pub mod scanner;
pub mod services;
pub mod system;
