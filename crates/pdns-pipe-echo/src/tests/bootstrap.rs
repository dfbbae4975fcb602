//! Bootstrap sequencing with stubbed collaborators.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use ortho_config::{OrthoConfig, OrthoError};
use pdns_pipe::{ProtocolVersion, SessionError};
use pdns_pipe_config::Config;
use rstest::{fixture, rstest};

use crate::{BootstrapError, ConfigLoader, HealthReporter, bootstrap_with};

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingReporter {
    fn push(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().expect("events lock").clone()
    }
}

impl HealthReporter for RecordingReporter {
    fn bootstrap_starting(&self) {
        self.push("bootstrap_starting");
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.push("bootstrap_succeeded");
    }

    fn bootstrap_failed(&self, _error: &BootstrapError) {
        self.push("bootstrap_failed");
    }

    fn negotiation_failed(&self, _error: &SessionError, _attempt: u32) {
        self.push("negotiation_failed");
    }

    fn session_started(&self, _version: ProtocolVersion) {
        self.push("session_started");
    }

    fn session_ended(&self) {
        self.push("session_ended");
    }

    fn session_failed(&self, _error: &SessionError) {
        self.push("session_failed");
    }
}

/// Loader parsing a fixed argument list instead of the process arguments.
struct ArgsLoader(Vec<&'static str>);

impl ConfigLoader for ArgsLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = std::iter::once("pdns-pipe-echo")
            .chain(self.0.iter().copied())
            .map(OsString::from);
        Config::load_from_iter(args)
    }
}

#[fixture]
fn reporter() -> Arc<RecordingReporter> {
    Arc::new(RecordingReporter::default())
}

#[rstest]
fn successful_bootstrap_reports_start_and_success(reporter: Arc<RecordingReporter>) {
    let loader = ArgsLoader(vec!["--banner", "Echo", "--default-ttl", "120"]);
    let worker = bootstrap_with(&loader, reporter.clone()).expect("bootstrap should succeed");

    assert_eq!(worker.config().banner(), "Echo");
    assert_eq!(worker.config().default_ttl(), 120);
    assert_eq!(
        reporter.events(),
        ["bootstrap_starting", "bootstrap_succeeded"]
    );
}

#[rstest]
fn configuration_errors_are_reported(reporter: Arc<RecordingReporter>) {
    let loader = ArgsLoader(vec!["--default-ttl", "forever"]);
    let error = bootstrap_with(&loader, reporter.clone())
        .err()
        .expect("bootstrap should fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    assert!(error.to_string().starts_with("failed to load configuration"));
    assert_eq!(reporter.events(), ["bootstrap_starting", "bootstrap_failed"]);
}
