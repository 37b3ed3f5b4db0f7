//! Message producer that records records instead of sending them.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::QueueError;
use crate::port::outbound::{DeliveryHandle, MessageProducer, QueueRecord};

/// Records every sent record; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingProducer {
    records: Mutex<Vec<QueueRecord>>,
    next_offset: AtomicI64,
    fail: AtomicBool,
}

impl RecordingProducer {
    pub fn records(&self) -> Vec<QueueRecord> {
        self.records.lock().clone()
    }

    /// Make subsequent sends fail (after recording the record).
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageProducer for RecordingProducer {
    async fn send(&self, record: QueueRecord) -> Result<DeliveryHandle, QueueError> {
        let topic = record.topic.clone();
        let partition = record.partition;
        self.records.lock().push(record);

        if self.fail.load(Ordering::SeqCst) {
            return Err(QueueError::Send {
                topic,
                reason: "broker unavailable".to_string(),
            });
        }
        Ok(DeliveryHandle {
            topic,
            partition: Some(partition.unwrap_or(0)),
            offset: Some(self.next_offset.fetch_add(1, Ordering::SeqCst)),
        })
    }
}
