//! Pipe layer.
//!
//! Connects a source stream to a destination, forwarding data with
//! backpressure pause/resume and tearing down all of its subscriptions
//! exactly once on the first terminal event from either side. The bridge
//! never mutates lifecycle flags directly; it only calls the endpoints'
//! public operations.
//!
//! ```
//! use flowline::{PipeOptions, Stream, StreamKind, TickQueue, WriteOutcome};
//!
//! let queue = TickQueue::new();
//! let source = Stream::<&str>::builder(StreamKind::Readable, &queue).build();
//! let sink = Stream::<&str>::builder(StreamKind::Writable, &queue)
//!     .write(|_chunk| WriteOutcome::Accepted)
//!     .build();
//!
//! source.pipe(&sink, PipeOptions::default());
//! source.push("chunk");
//! source.finish();
//!
//! // Source end propagated to the destination exactly once.
//! assert!(sink.ended());
//! ```

pub(crate) mod pipe_bridge;
pub(crate) mod pipe_link;
