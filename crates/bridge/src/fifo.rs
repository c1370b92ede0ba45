//! A bounded queue that drops the oldest entry rather than blocking the
//! producer when full, used between the AI receive loop and the audio
//! playback pump so a slow consumer never backs up live audio.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

pub struct BoundedFifo<T> {
    capacity: usize,
    inner: Mutex<VecDeque<T>>,
    notify: Notify,
}

impl<T> BoundedFifo<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
        }
    }

    /// Pushes an item, dropping the oldest one to make room if at capacity.
    /// Returns `true` when an item was dropped.
    pub fn push(&self, item: T) -> bool {
        let dropped = {
            let mut guard = self.inner.lock();
            let dropped = guard.len() >= self.capacity;
            if dropped {
                guard.pop_front();
            }
            guard.push_back(item);
            dropped
        };
        self.notify.notify_one();
        dropped
    }

    /// Drops everything currently queued. Used for interruption handling,
    /// where the outgoing-audio FIFO must empty immediately.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn recv(&self) -> T {
        loop {
            if let Some(item) = self.inner.lock().pop_front() {
                return item;
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn recv_returns_pushed_items_in_order() {
        let fifo = BoundedFifo::new(4);
        fifo.push(1);
        fifo.push(2);
        assert_eq!(fifo.recv().await, 1);
        assert_eq!(fifo.recv().await, 2);
    }

    #[test]
    fn push_past_capacity_drops_oldest() {
        let fifo = BoundedFifo::new(2);
        assert!(!fifo.push(1));
        assert!(!fifo.push(2));
        assert!(fifo.push(3));
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn clear_empties_the_queue() {
        let fifo = BoundedFifo::new(4);
        fifo.push(1);
        fifo.push(2);
        fifo.clear();
        assert!(fifo.is_empty());
    }
}
