//! Test suites for the pipe session engine.

mod protocol;
mod support;
