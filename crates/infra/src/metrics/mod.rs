//! Metrics capture: the emission facade and the buffered writer behind it.

pub mod chunk;
pub mod recorder;
pub mod writer;

pub use chunk::{plan_chunks, ChunkLimits};
pub use recorder::{EventSink, MetricsRecorder};
pub use writer::{FlushReport, MetricsWriter, WriterConfig, WriterError, WriterStats};
