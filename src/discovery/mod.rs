//! CHIRP discovery engine
//!
//! The [`Manager`] owns the registered and discovered service sets and runs
//! the background loop that reacts to incoming broadcasts.

mod manager;
mod service;

pub use manager::Manager;
pub use service::{CallbackId, DiscoverCallback, DiscoveredService, RegisteredService};
