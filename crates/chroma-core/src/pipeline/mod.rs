//! Pipeline stages and the queues that connect them.
//!
//! - **source**: Read URL records from the input
//! - **fetch**: Retrieve and decode images, retrying empty decodes
//! - **analyze**: Compute the dominant colors of each image
//! - **sink**: Write result lines to the output
//! - **queue**: Bounded multi-consumer queues carrying work and shutdown
//! - **stage**: Worker endpoints implementing the shutdown protocol
//! - **processor**: Orchestrates the full pipeline

pub mod analyze;
pub mod decode;
pub mod fetch;
pub mod processor;
pub mod queue;
pub mod sink;
pub mod source;
pub mod stage;
pub mod transport;

// Re-exports for convenient access
pub use analyze::Analyzer;
pub use decode::{Decode, DecodeOutcome, ImageDecoder};
pub use fetch::Fetcher;
pub use processor::Pipeline;
pub use queue::{BoundedQueue, Envelope, SharedQueue, WorkQueue};
pub use sink::ResultSink;
pub use source::UrlSource;
pub use stage::{StageInput, StageOutput};
pub use transport::{HttpTransport, Transport};
