//! Script harness.
//!
//! Runs one [`Check`] through the fixed script shape:
//!
//! - `common_setup`: `load_testbed`, then `connect` (connection failures are
//!   logged and tolerated)
//! - the testcase, named after the check: `setup`, then `test`
//! - `common_cleanup`: nothing to do, always passed
//!
//! A testcase whose common setup did not pass is blocked without running.
//! An error escaping `setup` or `test` marks that section errored; `test` is
//! blocked when `setup` did not succeed.

use std::path::PathBuf;

use nettest_common::report::ScriptReport;
use nettest_common::{CheckConfig, DeviceDriver, Outcome, Step, Testbed};

pub const COMMON_SETUP: &str = "common_setup";
pub const COMMON_CLEANUP: &str = "common_cleanup";
pub const TESTBED_MISSING: &str = "Testbed is not provided!";
pub const CONNECT_FAILED: &str = "Unable to connect to all devices";

/// What a check gets to work with during `setup` and `test`.
pub struct Context<'a> {
    pub testbed: &'a Testbed,
    pub driver: &'a mut dyn DeviceDriver,
    pub config: &'a CheckConfig,
}

pub trait Check {
    /// Testcase name, also used as the script name.
    fn name(&self) -> &'static str;

    fn setup(&mut self, _ctx: &mut Context<'_>, _section: &mut Step) -> anyhow::Result<()> {
        Ok(())
    }

    fn test(&mut self, ctx: &mut Context<'_>, section: &mut Step) -> anyhow::Result<()>;
}

/// Where the testbed comes from. Every run starts from a fresh copy.
#[derive(Debug, Clone)]
pub enum TestbedSource {
    Missing,
    Path(PathBuf),
    Loaded(Testbed),
}

impl From<Option<PathBuf>> for TestbedSource {
    fn from(path: Option<PathBuf>) -> Self {
        path.map(TestbedSource::Path).unwrap_or(TestbedSource::Missing)
    }
}

pub struct Harness<'d> {
    source: TestbedSource,
    driver: &'d mut dyn DeviceDriver,
    config: CheckConfig,
}

impl<'d> Harness<'d> {
    pub fn new(source: TestbedSource, driver: &'d mut dyn DeviceDriver, config: CheckConfig) -> Self {
        Self {
            source,
            driver,
            config,
        }
    }

    pub fn run(&mut self, check: &mut dyn Check) -> ScriptReport {
        let mut report = ScriptReport::new(check.name());
        tracing::info!(script = check.name(), "script starting");

        let mut setup = Step::new(COMMON_SETUP);
        let testbed = self.common_setup(&mut setup);
        let ready = setup.result() == Outcome::Passed;
        report.push_section(setup);

        let mut testcase = Step::new(check.name());
        match testbed {
            Some(testbed) if ready => self.testcase(check, &testbed, &mut testcase),
            _ => testcase.blocked(format!("{COMMON_SETUP} did not pass")),
        }
        report.push_section(testcase);

        report.section(COMMON_CLEANUP);
        report.finish();
        tracing::info!(script = check.name(), result = %report.result(), "script finished");
        report
    }

    fn common_setup(&mut self, section: &mut Step) -> Option<Testbed> {
        let load = section.start("load_testbed");
        let mut testbed = match &self.source {
            TestbedSource::Missing => {
                load.failed(TESTBED_MISSING);
                return None;
            }
            TestbedSource::Path(path) => match Testbed::load(path) {
                Ok(testbed) => testbed,
                Err(e) => {
                    load.errored(e.to_string());
                    return None;
                }
            },
            TestbedSource::Loaded(testbed) => testbed.clone(),
        };
        load.passed(format!("testbed with {} device(s)", testbed.len()));

        let connect = section.start("connect");
        match testbed.connect(&mut *self.driver) {
            Ok(()) => connect.passed(format!("connected to {} device(s)", testbed.len())),
            Err(e) => {
                tracing::error!(
                    attempted = e.attempted,
                    failed = e.failures.len(),
                    "{CONNECT_FAILED}"
                );
                for failure in &e.failures {
                    tracing::error!(device = %failure.device, kind = %failure.kind, reason = %failure.reason, "device unavailable");
                }
            }
        }
        Some(testbed)
    }

    fn testcase(&mut self, check: &mut dyn Check, testbed: &Testbed, testcase: &mut Step) {
        let mut ctx = Context {
            testbed,
            driver: &mut *self.driver,
            config: &self.config,
        };

        let setup = testcase.start("setup");
        if let Err(e) = check.setup(&mut ctx, setup) {
            setup.errored(format!("{e:#}"));
        }
        let setup_result = setup.result();

        let test = testcase.start("test");
        if !setup_result.is_success() {
            test.blocked(format!("setup {}", setup_result.label().to_lowercase()));
            return;
        }
        if let Err(e) = check.test(&mut ctx, test) {
            test.errored(format!("{e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nettest_common::driver::MemoryDriver;

    struct Recorder {
        fail_setup: bool,
        tested: bool,
    }

    impl Check for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn setup(&mut self, _ctx: &mut Context<'_>, _section: &mut Step) -> anyhow::Result<()> {
            if self.fail_setup {
                anyhow::bail!("learn exploded");
            }
            Ok(())
        }

        fn test(&mut self, ctx: &mut Context<'_>, section: &mut Step) -> anyhow::Result<()> {
            self.tested = true;
            for device in ctx.testbed.devices() {
                section.start(device.name.clone());
            }
            Ok(())
        }
    }

    fn testbed() -> Testbed {
        Testbed::from_yaml_str("devices:\n  R1:\n    os: ios\n  R2:\n    os: ios\n").unwrap()
    }

    #[test]
    fn missing_testbed_blocks_the_testcase() {
        let mut driver = MemoryDriver::new();
        let mut harness = Harness::new(TestbedSource::Missing, &mut driver, CheckConfig::default());
        let mut recorder = Recorder { fail_setup: false, tested: false };
        let report = harness.run(&mut recorder);

        let setup = report.section_named(COMMON_SETUP).unwrap();
        assert_eq!(setup.result(), Outcome::Failed);
        let load = setup.child("load_testbed").unwrap();
        assert_eq!(load.messages(Outcome::Failed).collect::<Vec<_>>(), [TESTBED_MISSING]);
        assert_eq!(report.section_named("recorder").unwrap().result(), Outcome::Blocked);
        assert_eq!(report.section_named(COMMON_CLEANUP).unwrap().result(), Outcome::Passed);
        assert!(!recorder.tested);
    }

    #[test]
    fn unreadable_testbed_errors_setup() {
        let mut driver = MemoryDriver::new();
        let source = TestbedSource::Path(std::env::temp_dir().join("nettest-no-such-testbed.yaml"));
        let mut harness = Harness::new(source, &mut driver, CheckConfig::default());
        let report = harness.run(&mut Recorder { fail_setup: false, tested: false });
        assert_eq!(report.section_named(COMMON_SETUP).unwrap().result(), Outcome::Errored);
        assert_eq!(report.result(), Outcome::Errored);
    }

    #[test]
    fn connection_failures_do_not_abort() {
        let mut driver = MemoryDriver::new().with_device("R1");
        let mut harness = Harness::new(TestbedSource::Loaded(testbed()), &mut driver, CheckConfig::default());
        let mut recorder = Recorder { fail_setup: false, tested: false };
        let report = harness.run(&mut recorder);

        assert_eq!(report.section_named(COMMON_SETUP).unwrap().result(), Outcome::Passed);
        assert!(recorder.tested);
        let test = report.section_named("recorder").unwrap().child("test").unwrap();
        assert_eq!(test.children().len(), 2);
        assert_eq!(report.result(), Outcome::Passed);
    }

    #[test]
    fn setup_error_blocks_test() {
        let mut driver = MemoryDriver::new().with_device("R1").with_device("R2");
        let mut harness = Harness::new(TestbedSource::Loaded(testbed()), &mut driver, CheckConfig::default());
        let mut recorder = Recorder { fail_setup: true, tested: false };
        let report = harness.run(&mut recorder);

        let testcase = report.section_named("recorder").unwrap();
        let setup = testcase.child("setup").unwrap();
        assert_eq!(setup.messages(Outcome::Errored).collect::<Vec<_>>(), ["learn exploded"]);
        assert_eq!(testcase.child("test").unwrap().result(), Outcome::Blocked);
        assert_eq!(testcase.result(), Outcome::Errored);
        assert!(!recorder.tested);
    }
}
