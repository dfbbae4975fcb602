//! Structured health reporting for worker lifecycle events.

use std::sync::Arc;

use pdns_pipe::{ProtocolVersion, SessionError};
use pdns_pipe_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = "pdns_pipe_echo::health";

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a rejected handshake. `attempt` counts from one.
    fn negotiation_failed(&self, error: &SessionError, attempt: u32);

    /// Invoked once the handshake has succeeded.
    fn session_started(&self, version: ProtocolVersion);

    /// Invoked when the resolver closes the pipe.
    fn session_ended(&self);

    /// Invoked when the session aborts on a channel failure.
    fn session_failed(&self, error: &SessionError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn negotiation_failed(&self, error: &SessionError, attempt: u32) {
        (**self).negotiation_failed(error, attempt);
    }

    fn session_started(&self, version: ProtocolVersion) {
        (**self).session_started(version);
    }

    fn session_ended(&self) {
        (**self).session_ended();
    }

    fn session_failed(&self, error: &SessionError) {
        (**self).session_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting worker bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            banner = %config.banner(),
            default_ttl = config.default_ttl(),
            negotiation_attempts = config.negotiation_attempts(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "worker bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "worker bootstrap failed"
        );
    }

    fn negotiation_failed(&self, error: &SessionError, attempt: u32) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "negotiation_failed",
            attempt,
            retryable = error.is_retryable(),
            error = %error,
            "handshake failed"
        );
    }

    fn session_started(&self, version: ProtocolVersion) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_started",
            version = version.number(),
            "pipe session started"
        );
    }

    fn session_ended(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_ended",
            "pipe session ended"
        );
    }

    fn session_failed(&self, error: &SessionError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "session_failed",
            error = %error,
            "pipe session failed"
        );
    }
}
