use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{DataPoint, PointSink, SinkError, SinkResult};

/// Keeps points in memory. Flushed batches are retained for inspection.
#[derive(Default)]
pub struct MemorySink {
    buffer: Mutex<Vec<DataPoint>>,
    batches: Mutex<Vec<Vec<DataPoint>>>,
    flushes: AtomicUsize,
    fail_flushes: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent flushes fail (and lose their points) until reset.
    pub fn fail_flushes(&self, fail: bool) {
        self.fail_flushes.store(fail, Ordering::SeqCst);
    }

    /// Flush attempts so far, failed ones included.
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn buffered(&self) -> Vec<DataPoint> {
        self.buffer.lock().clone()
    }

    /// Successfully flushed batches, oldest first.
    pub fn batches(&self) -> Vec<Vec<DataPoint>> {
        self.batches.lock().clone()
    }

    pub fn flushed_points(&self) -> Vec<DataPoint> {
        self.batches.lock().iter().flatten().cloned().collect()
    }
}

#[async_trait::async_trait]
impl PointSink for MemorySink {
    fn write_point(&self, point: DataPoint) {
        self.buffer.lock().push(point);
    }

    async fn flush(&self) -> SinkResult<usize> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        let batch = std::mem::take(&mut *self.buffer.lock());
        if self.fail_flushes.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable(format!("{} points lost", batch.len())));
        }
        let n = batch.len();
        self.batches.lock().push(batch);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flush_moves_buffer_into_a_batch() {
        let sink = MemorySink::new();
        sink.write_point(DataPoint::new("m").string_field("f", "1"));
        sink.write_point(DataPoint::new("m").string_field("f", "2"));

        assert_eq!(sink.flush().await.unwrap(), 2);
        assert!(sink.buffered().is_empty());
        assert_eq!(sink.batches().len(), 1);
        assert_eq!(sink.flush_count(), 1);
    }

    #[tokio::test]
    async fn failing_flush_loses_points() {
        let sink = MemorySink::new();
        sink.fail_flushes(true);
        sink.write_point(DataPoint::new("m").string_field("f", "1"));

        assert!(sink.flush().await.is_err());
        assert!(sink.buffered().is_empty());
        assert!(sink.flushed_points().is_empty());
        assert_eq!(sink.flush_count(), 1);
    }
}
