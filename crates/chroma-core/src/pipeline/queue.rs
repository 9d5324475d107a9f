//! Bounded queues between pipeline stages.
//!
//! Every queue carries [`Envelope`]s: real work items, or the single
//! [`Envelope::Shutdown`] marker that tells a worker pool there is no more
//! work. A full queue blocks `put`, an empty queue blocks `take`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::error::QueueError;

/// A queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    /// A unit of work
    Item(T),
    /// No more work will arrive on this queue
    Shutdown,
}

impl<T> Envelope<T> {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Envelope::Shutdown)
    }
}

/// A failed `put`, handing the message back to the caller.
pub struct PutError<T> {
    pub kind: QueueError,
    pub message: Envelope<T>,
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError")
            .field("kind", &self.kind)
            .field("shutdown", &self.message.is_shutdown())
            .finish()
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Blocking multi-producer, multi-consumer queue of envelopes.
#[async_trait]
pub trait WorkQueue<T: Send + 'static>: Send + Sync {
    /// Insert a message, waiting while the queue is full.
    async fn put(&self, message: Envelope<T>) -> Result<(), PutError<T>>;

    /// Remove the oldest message, waiting while the queue is empty.
    async fn take(&self) -> Result<Envelope<T>, QueueError>;
}

/// Shared handle to a queue.
pub type SharedQueue<T> = Arc<dyn WorkQueue<T>>;

/// Bounded queue built on a tokio channel.
///
/// The receiving half is shared by all consumers of a pool behind an async
/// mutex, so each message goes to exactly one consumer. The queue keeps a
/// sender of its own and therefore never reports itself closed; shutdown
/// is signalled only with [`Envelope::Shutdown`].
pub struct BoundedQueue<T> {
    sender: mpsc::Sender<Envelope<T>>,
    receiver: Mutex<mpsc::Receiver<Envelope<T>>>,
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` messages.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Create a queue already wrapped for sharing between stages.
    pub fn shared(capacity: usize) -> SharedQueue<T> {
        Arc::new(Self::new(capacity))
    }

    /// Messages currently buffered.
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<T: Send + 'static> WorkQueue<T> for BoundedQueue<T> {
    async fn put(&self, message: Envelope<T>) -> Result<(), PutError<T>> {
        self.sender.send(message).await.map_err(|e| PutError {
            kind: QueueError::Closed,
            message: e.0,
        })
    }

    async fn take(&self) -> Result<Envelope<T>, QueueError> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await.ok_or(QueueError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = BoundedQueue::<i32>::new(4);
        queue.put(Envelope::Item(1)).await.unwrap();
        queue.put(Envelope::Item(2)).await.unwrap();
        queue.put(Envelope::Shutdown).await.unwrap();
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.take().await.unwrap(), Envelope::Item(1));
        assert_eq!(queue.take().await.unwrap(), Envelope::Item(2));
        assert_eq!(queue.take().await.unwrap(), Envelope::Shutdown);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_blocks_producer() {
        let queue: SharedQueue<&'static str> = BoundedQueue::shared(1);
        queue.put(Envelope::Item("a")).await.unwrap();

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            queue.put(Envelope::Item("b")),
        )
        .await;
        assert!(blocked.is_err(), "put into a full queue must wait");

        let producer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.put(Envelope::Item("b")).await })
        };
        assert_eq!(queue.take().await.unwrap(), Envelope::Item("a"));
        producer.await.unwrap().unwrap();
        assert_eq!(queue.take().await.unwrap(), Envelope::Item("b"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_item_taken_once() {
        let queue: SharedQueue<u32> = BoundedQueue::shared(8);
        let mut consumers = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            consumers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Ok(Envelope::Item(n)) = queue.take().await {
                    seen.push(n);
                }
                seen
            }));
        }

        for n in 0..100u32 {
            queue.put(Envelope::Item(n)).await.unwrap();
        }
        for _ in 0..4 {
            queue.put(Envelope::Shutdown).await.unwrap();
        }

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }
}
