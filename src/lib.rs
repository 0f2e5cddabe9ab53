//! office-status - OpenClaw session poller for the virtual office dashboard
//!
//! This library crate exposes internal modules for integration testing.

pub mod agents;
pub mod config;
pub mod data;
pub mod integrations;
pub mod server;
pub mod snapshot;
pub mod util;
