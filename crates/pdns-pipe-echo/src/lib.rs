//! Runnable pipe backend worker serving a small sample zone.
//!
//! The binary loads [`pdns_pipe_config::Config`], initialises telemetry on
//! stderr, and serves one session over stdin/stdout with the router from
//! [`zone::sample_router`]. Lifecycle events go to a [`HealthReporter`].

pub mod bootstrap;
pub mod health;
pub mod session;
pub mod telemetry;
pub mod zone;

pub use bootstrap::{BootstrapError, ConfigLoader, SystemConfigLoader, Worker, bootstrap_with};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use session::{ServeError, serve};
pub use zone::{SAMPLE_ZONE, sample_router};

#[cfg(test)]
mod tests;
