//! Shared building blocks for the nettest checks.
//!
//! This crate contains:
//! - **Testbed**: YAML topology loading and device connection state
//! - **Drivers**: the `DeviceDriver` seam plus snapshot and in-memory drivers
//! - **Learned data**: `Option`-returning accessors over learned/parsed output
//! - **Steps & reports**: the nested pass/fail/skip results tree and its rendering
//! - **Config**: TOML configuration shared by every check

pub mod config;
pub mod driver;
pub mod learned;
pub mod report;
pub mod steps;
pub mod testbed;

pub use config::CheckConfig;
pub use driver::DeviceDriver;
pub use report::ScriptReport;
pub use steps::{Outcome, Step};
pub use testbed::{Device, Testbed};
