//! Testbed connection check: every device in the testbed, supported or not,
//! must have connected during common setup.

use nettest_common::Step;

use crate::harness::{Check, Context};

pub const NAME: &str = "verify_connected";

#[derive(Debug, Default)]
pub struct VerifyConnected;

impl VerifyConnected {
    pub fn new() -> Self {
        Self
    }
}

impl Check for VerifyConnected {
    fn name(&self) -> &'static str {
        NAME
    }

    fn test(&mut self, ctx: &mut Context<'_>, section: &mut Step) -> anyhow::Result<()> {
        for device in ctx.testbed.devices() {
            let step = section.start(format!("Test Connection Status of {}", device.name));
            let status = format!("{} connected status: {}", device.name, device.is_connected());
            if device.is_connected() {
                tracing::info!("{status}");
            } else {
                step.failed(status);
            }
        }
        Ok(())
    }
}
