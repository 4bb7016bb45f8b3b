//! In-memory implementations of the store, queue and notifier contracts.
//!
//! Used by the test suite and handy for running the pipeline locally
//! without AWS. The queue models the parts of the FIFO contract the
//! workers depend on: ready/in-flight separation, receipt handles, a
//! dedup-id window, and explicit redelivery standing in for visibility
//! timeout expiry.

use super::notify::Notifier;
use super::queue::{QueueMessage, WorkQueue};
use super::storage::{ObjectMeta, ObjectStore, StoreError};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `put` calls fail, to exercise error paths.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `delete` calls fail, to exercise rollback failure.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("injected put failure")));
        }
        self.objects.lock().unwrap().insert(key.to_string(), body);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|body| ObjectMeta { size: body.len() as u64 }))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("injected delete failure")));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct QueueInner {
    ready: VecDeque<String>,
    in_flight: HashMap<String, String>,
    dedup_seen: HashSet<String>,
    receipt_counter: u64,
}

#[derive(Default)]
pub struct MemoryQueue {
    inner: Mutex<QueueInner>,
    fail_enqueues: AtomicBool,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `enqueue` calls fail, to exercise compensation.
    pub fn fail_enqueues(&self, fail: bool) {
        self.fail_enqueues.store(fail, Ordering::SeqCst);
    }

    /// Return every in-flight message to the ready set, as an expired
    /// visibility timeout would. Returns how many came back.
    pub fn redeliver(&self) -> usize {
        let mut inner = self.inner.lock().unwrap();
        let receipts: Vec<String> = inner.in_flight.keys().cloned().collect();
        let count = receipts.len();
        for receipt in receipts {
            if let Some(body) = inner.in_flight.remove(&receipt) {
                inner.ready.push_back(body);
            }
        }
        count
    }

    /// Messages waiting to be received.
    pub fn pending(&self) -> usize {
        self.inner.lock().unwrap().ready.len()
    }

    /// Messages received but not yet acknowledged.
    pub fn in_flight(&self) -> usize {
        self.inner.lock().unwrap().in_flight.len()
    }

    pub fn pending_bodies(&self) -> Vec<String> {
        self.inner.lock().unwrap().ready.iter().cloned().collect()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn enqueue(&self, body: &str, _group: &str, dedup_id: &str) -> Result<()> {
        if self.fail_enqueues.load(Ordering::SeqCst) {
            return Err(anyhow!("injected enqueue failure"));
        }
        let mut inner = self.inner.lock().unwrap();
        // Duplicate dedup ids inside the window collapse silently, exactly
        // like an SQS FIFO queue. The window here never expires, which is
        // fine for test lifetimes.
        if !inner.dedup_seen.insert(dedup_id.to_string()) {
            return Ok(());
        }
        inner.ready.push_back(body.to_string());
        Ok(())
    }

    async fn receive(&self, max_messages: i32, _wait_seconds: i32) -> Result<Vec<QueueMessage>> {
        let mut inner = self.inner.lock().unwrap();
        let mut messages = Vec::new();
        while messages.len() < max_messages.max(0) as usize {
            let Some(body) = inner.ready.pop_front() else {
                break;
            };
            inner.receipt_counter += 1;
            let receipt = format!("receipt-{}", inner.receipt_counter);
            inner.in_flight.insert(receipt.clone(), body.clone());
            messages.push(QueueMessage { body, receipt });
        }
        Ok(messages)
    }

    async fn delete(&self, receipt: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .in_flight
            .remove(receipt)
            .map(|_| ())
            .ok_or_else(|| anyhow!("unknown receipt handle {receipt}"))
    }
}

#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub subject: String,
    pub message: String,
    pub attributes: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryNotifier {
    published: Mutex<Vec<PublishedMessage>>,
    fail_publishes: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn publish(
        &self,
        subject: &str,
        message: &str,
        attributes: HashMap<String, String>,
    ) -> Result<()> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(anyhow!("injected publish failure"));
        }
        self.published.lock().unwrap().push(PublishedMessage {
            subject: subject.to_string(),
            message: message.to_string(),
            attributes,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dedup_window_collapses_duplicate_enqueues() {
        let queue = MemoryQueue::new();
        queue.enqueue("a", "g", "dedup-1").await.unwrap();
        queue.enqueue("a", "g", "dedup-1").await.unwrap();
        queue.enqueue("b", "g", "dedup-2").await.unwrap();
        assert_eq!(queue.pending(), 2);
    }

    #[tokio::test]
    async fn unacked_messages_come_back_on_redelivery() {
        let queue = MemoryQueue::new();
        queue.enqueue("job", "g", "d1").await.unwrap();

        let received = queue.receive(1, 0).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.in_flight(), 1);

        // Not acked: a visibility timeout expiry makes it receivable again.
        assert_eq!(queue.redeliver(), 1);
        let again = queue.receive(1, 0).await.unwrap();
        assert_eq!(again[0].body, "job");

        // Acked: gone for good.
        queue.delete(&again[0].receipt).await.unwrap();
        assert_eq!(queue.redeliver(), 0);
        assert!(queue.receive(1, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn head_distinguishes_presence_from_absence() {
        let store = MemoryStore::new();
        store.put("k", Bytes::from_static(b"xyz")).await.unwrap();

        let meta = store.head("k").await.unwrap().unwrap();
        assert_eq!(meta.size, 3);
        assert!(store.head("missing").await.unwrap().is_none());
        assert!(matches!(store.get("missing").await, Err(StoreError::NotFound)));
    }
}
