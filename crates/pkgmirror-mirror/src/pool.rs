use std::future::Future;

use async_channel::Receiver;
use tokio::task::JoinSet;

/// A fixed set of workers draining one shared queue.
///
/// Every worker gets its own receiver handle. Closing the queue is the stop
/// signal: once it is closed and empty, each worker's `recv` fails exactly
/// once and the worker returns. [`WorkerPool::join`] then plays the role of a
/// wait-group.
pub struct WorkerPool {
    stage: &'static str,
    tasks: JoinSet<()>,
}

impl WorkerPool {
    pub fn spawn<T, F, Fut>(stage: &'static str, size: usize, queue: Receiver<T>, mut worker: F) -> Self
    where
        F: FnMut(usize, Receiver<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for id in 0..size.max(1) {
            tasks.spawn(worker(id, queue.clone()));
        }
        tracing::debug!(stage, workers = tasks.len(), "pool started");
        Self { stage, tasks }
    }

    pub fn len(&self) -> usize { self.tasks.len() }

    pub fn is_empty(&self) -> bool { self.tasks.is_empty() }

    /// Wait for every worker to exit; returns how many exited normally.
    pub async fn join(mut self) -> usize {
        let mut exited = 0;
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(()) => exited += 1,
                Err(e) => tracing::error!(stage = self.stage, error = %e, "worker terminated abnormally"),
            }
        }
        tracing::debug!(stage = self.stage, exited, "pool stopped");
        exited
    }
}
