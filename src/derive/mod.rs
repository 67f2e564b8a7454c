//! Deterministic derivation stages.
//!
//! Events flow strictly downward: events are aggregated into groups, groups
//! become signals, signals become alerts and recommendations. Every stage
//! here is pure and synchronous; nothing suspends or performs I/O.

pub mod aggregator;
pub mod alerts;
pub mod recommendations;
pub mod signals;

pub use aggregator::{aggregate_events, EventGroup, MIN_GROUP_SIZE};
pub use alerts::{derive_alerts, AlertThresholds};
pub use recommendations::{derive_recommendations, UserContext};
pub use signals::derive_signals;
