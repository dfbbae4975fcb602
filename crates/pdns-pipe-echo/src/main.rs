//! Pipe backend worker answering the sample zone over stdin/stdout.

use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::sync::Arc;

use pdns_pipe_echo::{
    HealthReporter, SAMPLE_ZONE, StructuredHealthReporter, SystemConfigLoader, bootstrap_with,
    sample_router,
};

fn main() -> ExitCode {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let Ok(worker) = bootstrap_with(&SystemConfigLoader, reporter) else {
        return ExitCode::FAILURE;
    };

    let router = match sample_router(SAMPLE_ZONE, worker.config().default_ttl()) {
        Ok(router) => router,
        Err(error) => {
            tracing::error!(%error, "sample zone patterns failed to compile");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match worker.serve(stdin.lock(), BufWriter::new(stdout.lock()), &router) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
