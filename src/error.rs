use std::io;

use thiserror::Error;

/// Startup failures. Everything here is fatal; the benchmark has no
/// recoverable runtime errors.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("terminal setup failed: {0}")]
    Terminal(#[from] io::Error),

    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        source: io::Error,
    },
}
