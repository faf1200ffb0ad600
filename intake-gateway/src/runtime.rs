use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::error::{GatewayError, GatewayResult};

pub const WORKER_THREAD_NAME: &str = "intake-worker";

/// Multi-threaded runtime whose worker pool serves gateway requests.
pub fn build_runtime(worker_threads: usize) -> GatewayResult<Runtime> {
    if worker_threads == 0 {
        return Err(GatewayError::Config("Worker thread count must be at least 1".to_string()));
    }

    let runtime = Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name(WORKER_THREAD_NAME)
        .enable_all()
        .build()
        .map_err(|e| GatewayError::Runtime(format!("Failed to start worker pool: {}", e)))?;

    info!(worker_threads, "Worker pool started");
    Ok(runtime)
}
