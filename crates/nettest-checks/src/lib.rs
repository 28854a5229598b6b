//! Network testbed checks.
//!
//! - [`connection`]: every testbed device connected
//! - [`interface_errors`]: no interface reports error counters above zero
//! - [`interface_mac`]: Device/Interface/MAC export to CSV
//! - [`version_check`]: Device/Version export appended to CSV
//! - [`job`]: all of the above in one run
//!
//! Each check runs inside the [`harness`], which provides the common setup
//! (testbed load and connect), the testcase sections and the cleanup.

use std::path::Path;

use anyhow::Context as _;

pub mod cli;
pub mod connection;
pub mod harness;
pub mod interface_errors;
pub mod interface_mac;
pub mod job;
pub mod version_check;

pub use harness::{Check, Context, Harness, TestbedSource};

pub(crate) fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("create directory {}", dir.display())),
        _ => Ok(()),
    }
}
