use crate::{DataPoint, SinkResult};

#[async_trait::async_trait]
pub trait PointSink: Send + Sync {
    /// Buffer a point. Never blocks on I/O.
    fn write_point(&self, point: DataPoint);

    /// Drain buffered points to storage. Returns how many were sent.
    /// On error the drained points are gone; there is no retry queue.
    async fn flush(&self) -> SinkResult<usize>;
}
