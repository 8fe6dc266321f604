//! Lifecycle layer.
//!
//! Owns the per-stream flag model, the idempotent destroy transition, and the
//! error/close notification policy. The destroy coordinator is the only code
//! that mutates lifecycle flags; the pipe layer reaches streams exclusively
//! through their public operations.
//!
//! ```
//! use flowline::{Stream, StreamError, StreamKind, TickQueue};
//!
//! let queue = TickQueue::new();
//! let stream = Stream::<()>::builder(StreamKind::Duplex, &queue)
//!     .teardown(|_error, done| done.complete(None))
//!     .build();
//!
//! // Destroy is idempotent: the second call is a no-op beyond its callback.
//! stream.destroy(Some(StreamError::new("first")), None);
//! stream.destroy(Some(StreamError::new("second")), None);
//! queue.run_until_idle();
//!
//! assert!(stream.destroyed());
//! assert_eq!(stream.errored().map(|e| e.to_string()).as_deref(), Some("first"));
//! ```

pub(crate) mod destroy_coordinator;
pub(crate) mod notifier;
pub(crate) mod stream_state;
