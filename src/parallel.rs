use crate::error::{Result, ScoreError};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Executes tasks in parallel with a specified concurrency limit
pub struct ParallelProcessor {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
}

impl ParallelProcessor {
    /// Creates a new parallel processor with the specified concurrency limit
    ///
    /// A limit of zero is treated as one.
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// The concurrency limit
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Runs every task and returns their outputs in input order
    ///
    /// A task that panics yields `ScoreError::Task` in its slot; the others
    /// are unaffected.
    pub async fn process<F, T>(&self, tasks: Vec<F>) -> Vec<Result<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    handles.push(Err(ScoreError::Task(e.to_string())));
                    continue;
                }
            };
            handles.push(Ok(tokio::spawn(async move {
                let result = task.await;
                drop(permit);
                result
            })));
        }

        join_all(handles.into_iter().map(|handle| async move {
            match handle {
                Ok(handle) => handle.await.map_err(|e| ScoreError::Task(e.to_string())),
                Err(e) => Err(e),
            }
        }))
        .await
    }
}
