//! Time-series sink for occupancy snapshots.
//!
//! Producers hand `DataPoint`s to a `PointSink` with `write_point`, which only
//! buffers. `flush` drains the buffer; a failed flush loses that batch.
//!
//! ```text
//! DataPoint --> line::encode --> InfluxSink buffer --> POST /api/v2/write
//! ```

pub mod config;
pub mod errors;
pub mod influx;
pub mod line;
pub mod memory;
pub mod point;
pub mod sink;

pub use config::InfluxConfig;
pub use errors::{SinkError, SinkResult};
pub use influx::InfluxSink;
pub use memory::MemorySink;
pub use point::DataPoint;
pub use sink::PointSink;
