//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the sync engine and the `gpsync` binary:
//! - Run configuration ([`config::MirrorConfig`]) with fail-fast validation
//! - Logging and tracing setup ([`logging::init_logging`])

pub mod config;
pub mod error;
pub mod logging;

pub use config::{MirrorConfig, MirrorConfigBuilder, SizeSelector, SyncMode};
pub use error::{Error, Result};
