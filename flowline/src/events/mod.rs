//! Notification layer.
//!
//! Owns the ordered, synchronous, multi-observer dispatch primitive the
//! lifecycle and pipe layers emit through. Dispatch reports how many
//! observers received a payload so callers can detect unobserved terminal
//! errors explicitly instead of relying on a runtime default.
//!
//! ```
//! use flowline::{Stream, StreamEvent, StreamKind, TickQueue};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let queue = TickQueue::new();
//! let stream = Stream::<u8>::builder(StreamKind::Readable, &queue).build();
//!
//! let seen = Rc::new(Cell::new(0u8));
//! let seen_probe = seen.clone();
//! stream.on(StreamEvent::Data, move |payload| {
//!     if let Some(chunk) = payload.chunk() {
//!         seen_probe.set(*chunk);
//!     }
//! });
//!
//! stream.push(7);
//! assert_eq!(seen.get(), 7);
//! ```

pub(crate) mod emitter;
