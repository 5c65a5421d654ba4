//! Fixed-size worker pool.
//!
//! A set number of tokio tasks drain a shared work queue. At most `workers`
//! jobs are in flight at any time, whatever the number of items.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::warn;

/// Default number of concurrent workers for a subnet sweep
pub const DEFAULT_WORKERS: usize = 32;

/// Run `job` over every item on a pool of `workers` tasks.
///
/// Jobs returning `None` are left out of the result. Result order follows
/// completion, not input order. A panicking job loses only its own result.
pub async fn run_bounded<I, T, F, Fut>(items: Vec<I>, workers: usize, job: F) -> Vec<T>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<T>> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }
    let workers = workers.max(1).min(items.len());

    let (work_tx, work_rx) = mpsc::unbounded_channel();
    for item in items {
        // receiver is alive until the pool finishes
        let _ = work_tx.send(item);
    }
    drop(work_tx);

    let queue = Arc::new(Mutex::new(work_rx));
    let job = Arc::new(job);
    let (result_tx, mut result_rx) = mpsc::unbounded_channel();

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let queue = queue.clone();
        let job = job.clone();
        let result_tx = result_tx.clone();

        pool.spawn(async move {
            loop {
                let next = queue.lock().await.recv().await;
                let Some(item) = next else { break };

                let job = job.clone();
                // run each job in its own task so a panic does not take the worker down
                match tokio::spawn(async move { job(item).await }).await {
                    Ok(Some(result)) => {
                        let _ = result_tx.send(result);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "Pool job failed"),
                }
            }
        });
    }
    drop(result_tx);

    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Pool worker failed");
        }
    }

    let mut results = Vec::new();
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }
    results
}
