//! Stage endpoints implementing the shutdown protocol.
//!
//! A pool of `k` workers shares one input queue. A single
//! [`Envelope::Shutdown`] is inserted once upstream is exhausted. Each
//! worker that takes it puts it back before stopping (when `k > 1`), so it
//! reaches every worker of the pool exactly once with no extra
//! coordination. The marker must never be lost: interrupted inserts of it
//! are retried until they succeed.

use crate::error::QueueError;

use super::queue::{Envelope, PutError, SharedQueue, WorkQueue};

/// Receiving end of a stage worker.
pub struct StageInput<T> {
    stage: &'static str,
    queue: SharedQueue<T>,
    pool_size: usize,
}

impl<T> Clone for StageInput<T> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage,
            queue: self.queue.clone(),
            pool_size: self.pool_size,
        }
    }
}

impl<T: Send + 'static> StageInput<T> {
    /// Create the input of one worker in a pool of `pool_size` workers.
    pub fn new(stage: &'static str, queue: SharedQueue<T>, pool_size: usize) -> Self {
        Self {
            stage,
            queue,
            pool_size,
        }
    }

    /// Wait for the next work item.
    ///
    /// Returns `None` once this worker has observed the shutdown marker
    /// (after passing it on to the rest of the pool), or if the queue has
    /// closed.
    pub async fn next(&self) -> Option<T> {
        loop {
            match self.queue.take().await {
                Ok(Envelope::Item(item)) => return Some(item),
                Ok(Envelope::Shutdown) => {
                    if self.pool_size > 1 {
                        put_shutdown(self.queue.as_ref(), self.stage).await;
                    }
                    tracing::debug!("{}: worker observed shutdown", self.stage);
                    return None;
                }
                Err(QueueError::Interrupted) => {
                    tracing::warn!("{}: interrupted taking from queue, retrying", self.stage);
                }
                Err(QueueError::Closed) => {
                    tracing::error!("{}: input queue closed without shutdown", self.stage);
                    return None;
                }
            }
        }
    }
}

/// Sending end of a stage worker.
pub struct StageOutput<T> {
    stage: &'static str,
    queue: SharedQueue<T>,
}

impl<T> Clone for StageOutput<T> {
    fn clone(&self) -> Self {
        Self {
            stage: self.stage,
            queue: self.queue.clone(),
        }
    }
}

impl<T: Send + 'static> StageOutput<T> {
    pub fn new(stage: &'static str, queue: SharedQueue<T>) -> Self {
        Self { stage, queue }
    }

    /// Forward one item downstream, waiting while the queue is full.
    ///
    /// An interrupted insert is not retried: the item is abandoned and the
    /// error returned so the caller can report what was lost.
    pub async fn send(&self, item: T) -> Result<(), QueueError> {
        self.queue
            .put(Envelope::Item(item))
            .await
            .map_err(|e| e.kind)
    }

    /// Insert the shutdown marker for the downstream pool.
    pub async fn shutdown(&self) {
        put_shutdown(self.queue.as_ref(), self.stage).await;
    }
}

/// Insert the shutdown marker, retrying interrupted attempts until it lands.
pub async fn put_shutdown<T: Send + 'static>(queue: &dyn WorkQueue<T>, stage: &str) {
    let mut message = Envelope::Shutdown;
    loop {
        match queue.put(message).await {
            Ok(()) => return,
            Err(PutError {
                kind: QueueError::Interrupted,
                message: returned,
            }) => {
                tracing::warn!("{stage}: interrupted inserting shutdown, retrying");
                message = returned;
            }
            Err(PutError {
                kind: QueueError::Closed,
                ..
            }) => {
                tracing::error!("{stage}: queue closed, shutdown not delivered");
                return;
            }
        }
    }
}
