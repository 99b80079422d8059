/// Debug Toolbar Module
///
/// Collectors supply the data a debug toolbar renders; rendering itself
/// lives outside this crate.
pub mod collector;
pub mod database;

pub use collector::{Collector, CollectorFlags, CollectorSnapshot, TimelineEntry, VarData};
pub use database::DatabaseCollector;
