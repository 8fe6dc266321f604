/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! # flowline
//!
//! Stream lifecycle coordination: idempotent destruction with asynchronous
//! resource teardown, deferred error/close notification with a strict
//! ordering contract, and pipe connections with backpressure and
//! exactly-once cleanup.
//!
//! A [`Stream`] is a cloneable, single-threaded handle over shared lifecycle
//! state. Capability hooks (teardown, write, end, pause, resume) are supplied
//! at construction through [`StreamBuilder`]; what a stream *can* do is fixed
//! up front, never probed at runtime. All deferred notifications run on a
//! [`TickQueue`], a cooperative scheduler the embedding application drains.
//!
//! ## The lifecycle contract
//!
//! * `destroy()` is idempotent: the first call wins, runs the teardown hook
//!   at most once, and later calls neither re-run teardown nor replace the
//!   recorded error.
//! * A per-call completion callback always runs before this destruction's
//!   broadcast notifications.
//! * Error and close notifications are deferred to a later scheduler turn,
//!   and when both fire, error strictly precedes close.
//! * At most one error notification fires per stream lifetime, even for
//!   duplex streams with two sides.
//! * An error dispatched to zero observers is escalated through the queue;
//!   [`TickQueue::take_unhandled`] hands it to the embedding application.
//!
//! ## Destroying a stream
//!
//! ```
//! use flowline::{Stream, StreamError, StreamEvent, StreamKind, TickQueue};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let queue = TickQueue::new();
//! let stream = Stream::<Vec<u8>>::builder(StreamKind::Duplex, &queue)
//!     .name("upstream-socket")
//!     .teardown(|_error, done| {
//!         // Release the underlying resource, then report completion.
//!         done.complete(None);
//!     })
//!     .build();
//!
//! let closed = Rc::new(Cell::new(false));
//! let probe = closed.clone();
//! stream.on(StreamEvent::Close, move |_| probe.set(true));
//!
//! stream.destroy(Some(StreamError::new("connection reset")), None);
//! assert!(stream.destroyed());
//! assert!(!closed.get()); // notifications are deferred
//!
//! queue.run_until_idle();
//! assert!(closed.get());
//! ```
//!
//! ## Piping
//!
//! ```
//! use flowline::{PipeOptions, Stream, StreamKind, TickQueue, WriteOutcome};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let queue = TickQueue::new();
//! let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
//! let received = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink_chunks = received.clone();
//! let sink = Stream::<u32>::builder(StreamKind::Writable, &queue)
//!     .write(move |chunk| {
//!         sink_chunks.borrow_mut().push(*chunk);
//!         WriteOutcome::Accepted
//!     })
//!     .build();
//!
//! source.pipe(&sink, PipeOptions::default());
//! source.push(1);
//! source.push(2);
//! source.finish();
//!
//! assert_eq!(*received.borrow(), vec![1, 2]);
//! assert!(sink.ended());
//! ```

mod events;
mod lifecycle;
pub mod observability;
mod pipe;
mod runtime;
mod stream;
mod stream_error;

pub use events::emitter::{EventPayload, ListenerId, StreamEvent};
pub use lifecycle::destroy_coordinator::{error_or_destroy, DestroyCallback, TeardownDone};
pub use lifecycle::stream_state::StreamKind;
pub use pipe::pipe_bridge::PipeOptions;
pub use runtime::tick_queue::TickQueue;
pub use stream::{Stream, StreamBuilder, TeardownHook, WriteHook, WriteOutcome};
pub use stream_error::{SharedError, StreamError, UnhandledError};
