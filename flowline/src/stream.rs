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

//! Outward stream facade: construction, lifecycle, flow, and observation.

use crate::events::emitter::{Emitter, EventPayload, ListenerId, StreamEvent};
use crate::lifecycle::destroy_coordinator::{self, DestroyCallback, TeardownDone};
use crate::lifecycle::stream_state::{StreamKind, StreamState};
use crate::observability::events;
use crate::pipe::pipe_bridge::{self, PipeOptions};
use crate::runtime::tick_queue::TickQueue;
use crate::stream_error::{SharedError, StreamError};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

const COMPONENT: &str = "stream";
const DEFAULT_STREAM_NAME: &str = "stream";

/// Result of offering one chunk to a destination.
#[derive(Clone, Debug)]
pub enum WriteOutcome {
    /// The chunk was accepted; keep sending.
    Accepted,
    /// The chunk was taken but the destination cannot accept more yet; a
    /// drain notification follows when it can.
    Backpressure,
    /// The write failed terminally.
    Failed(SharedError),
}

/// Teardown hook releasing the stream's underlying resource. Receives the
/// error that triggered destruction (if any) and a completion continuation.
pub type TeardownHook<T> = Box<dyn FnMut(Option<SharedError>, TeardownDone<T>)>;

/// Write hook consuming one chunk on the destination side.
pub type WriteHook<T> = Box<dyn FnMut(&T) -> WriteOutcome>;

pub(crate) struct StreamHooks<T> {
    pub(crate) teardown: Option<TeardownHook<T>>,
    pub(crate) write: Option<WriteHook<T>>,
    pub(crate) end: Option<Box<dyn FnMut()>>,
    pub(crate) pause: Option<Box<dyn FnMut()>>,
    pub(crate) resume: Option<Box<dyn FnMut()>>,
}

impl<T> StreamHooks<T> {
    fn empty() -> Self {
        Self {
            teardown: None,
            write: None,
            end: None,
            pause: None,
            resume: None,
        }
    }
}

struct StreamInner<T> {
    id: String,
    name: String,
    queue: TickQueue,
    state: RefCell<StreamState>,
    emitter: Emitter<T>,
    hooks: RefCell<StreamHooks<T>>,
}

/// Cloneable handle to one stream. All clones refer to the same lifecycle
/// state; handles are single-threaded by construction.
pub struct Stream<T> {
    inner: Rc<StreamInner<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Stream<T> {
    /// Starts building a stream of the given kind on `queue`.
    pub fn builder(kind: StreamKind, queue: &TickQueue) -> StreamBuilder<T> {
        StreamBuilder::new(kind, queue)
    }

    /// Unique id used for log correlation and unhandled-error attribution.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Human-readable name for diagnostics.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The scheduler this stream defers notifications on.
    pub fn queue(&self) -> &TickQueue {
        &self.inner.queue
    }

    /// The capability shape declared at construction.
    pub fn kind(&self) -> StreamKind {
        self.with_state(|state| state.kind)
    }

    // ---- lifecycle ----------------------------------------------------

    /// Destroys the stream. Idempotent; see the crate docs for the callback
    /// and notification ordering contract. Returns the stream for chaining.
    pub fn destroy(&self, error: Option<SharedError>, callback: Option<DestroyCallback>) -> Stream<T> {
        destroy_coordinator::destroy(self, error, callback);
        self.clone()
    }

    /// Resets lifecycle flags for reuse (object-pooling embeddings only).
    ///
    /// Must not be called while an asynchronous teardown is in flight;
    /// that precondition is documented, not enforced.
    pub fn undestroy(&self) {
        destroy_coordinator::undestroy(self);
    }

    /// Routes an error detected outside the normal write/read path. See
    /// [`error_or_destroy`](crate::error_or_destroy).
    pub fn error_or_destroy(&self, error: SharedError) {
        destroy_coordinator::error_or_destroy(self, error);
    }

    // ---- piping -------------------------------------------------------

    /// Pipes this stream into `destination`, returning the destination so
    /// pipes chain: `a.pipe(&b, ..).pipe(&c, ..)`.
    pub fn pipe(&self, destination: &Stream<T>, options: PipeOptions) -> Stream<T> {
        pipe_bridge::pipe(self, destination, options)
    }

    // ---- flow operations ----------------------------------------------

    /// Offers one chunk to this stream's write hook. Writing to a destroyed
    /// stream fails; a stream without a write hook accepts everything.
    pub fn write(&self, chunk: &T) -> WriteOutcome {
        if self.destroyed() {
            debug!(
                event = events::WRITE_AFTER_DESTROY,
                component = COMPONENT,
                stream_id = self.id(),
                stream_name = self.name(),
                "rejecting write on destroyed stream"
            );
            return WriteOutcome::Failed(StreamError::new("write after destroy"));
        }

        let hook = self.inner.hooks.borrow_mut().write.take();
        match hook {
            Some(mut write) => {
                let outcome = write(chunk);
                self.inner.hooks.borrow_mut().write = Some(write);
                outcome
            }
            None => WriteOutcome::Accepted,
        }
    }

    /// Marks the write side ended and runs the end hook once. No-op for
    /// readable-only or destroyed streams.
    pub fn end(&self) {
        let first = self.with_state_mut(|state| {
            if state.destroyed {
                return false;
            }
            match state.write_side_mut() {
                Some(side) if !side.ended => {
                    side.ended = true;
                    true
                }
                _ => false,
            }
        });

        if !first {
            return;
        }

        let hook = self.inner.hooks.borrow_mut().end.take();
        if let Some(mut end) = hook {
            end();
            self.inner.hooks.borrow_mut().end = Some(end);
        }
    }

    /// Asks the source to stop producing. No-op without a pause hook.
    pub fn pause(&self) {
        let hook = self.inner.hooks.borrow_mut().pause.take();
        if let Some(mut pause) = hook {
            pause();
            self.inner.hooks.borrow_mut().pause = Some(pause);
        }
    }

    /// Asks the source to start producing again. No-op without a resume hook.
    pub fn resume(&self) {
        let hook = self.inner.hooks.borrow_mut().resume.take();
        if let Some(mut resume) = hook {
            resume();
            self.inner.hooks.borrow_mut().resume = Some(resume);
        }
    }

    /// True when the stream can be paused for backpressure.
    pub fn can_pause(&self) -> bool {
        self.inner.hooks.borrow().pause.is_some()
    }

    /// True when the stream can be resumed after a drain.
    pub fn can_resume(&self) -> bool {
        self.inner.hooks.borrow().resume.is_some()
    }

    // ---- producer-side entry points -----------------------------------
    //
    // The buffering layer that owns chunk production sits outside this
    // crate; these are the notification entry points it drives.

    /// Dispatches one chunk to data observers. Dropped after destroy.
    pub fn push(&self, chunk: T) {
        if self.destroyed() {
            return;
        }
        self.inner
            .emitter
            .emit(StreamEvent::Data, &EventPayload::Chunk(chunk));
    }

    /// Marks the read side ended and dispatches the end notification.
    /// Fires at most once; dropped after destroy.
    pub fn finish(&self) {
        let first = self.with_state_mut(|state| {
            if state.destroyed {
                return false;
            }
            match state.read_side_mut() {
                Some(side) if !side.ended => {
                    side.ended = true;
                    true
                }
                _ => false,
            }
        });

        if first {
            self.inner.emitter.emit(StreamEvent::End, &EventPayload::None);
        }
    }

    /// Announces that a backpressured destination can accept writes again.
    pub fn signal_drain(&self) {
        if self.destroyed() {
            return;
        }
        self.inner.emitter.emit(StreamEvent::Drain, &EventPayload::None);
    }

    // ---- observation --------------------------------------------------

    /// Registers an observer behind the existing ones.
    pub fn on(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.inner.emitter.on(event, handler)
    }

    /// Registers an observer removed just before its first dispatch.
    pub fn once(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.inner.emitter.once(event, handler)
    }

    /// Registers an observer ahead of every existing one for `event`.
    pub fn prepend_listener(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.inner.emitter.prepend(event, handler)
    }

    /// Removes one observer. Returns `true` only when it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.emitter.remove(id)
    }

    /// Returns how many observers are registered for `event`.
    pub fn listener_count(&self, event: StreamEvent) -> usize {
        self.inner.emitter.listener_count(event)
    }

    // ---- state accessors ----------------------------------------------

    /// True once destroy has begun. Monotonic.
    pub fn destroyed(&self) -> bool {
        self.with_state(|state| state.destroyed)
    }

    /// The terminal error, if one was recorded.
    pub fn errored(&self) -> Option<SharedError> {
        self.with_state(|state| state.errored())
    }

    /// True once an error notification was dispatched.
    pub fn error_emitted(&self) -> bool {
        self.with_state(|state| state.error_emitted())
    }

    /// True once the logical end of data was reached: the read side for
    /// readable streams, the write side for writable ones, both for duplex.
    pub fn ended(&self) -> bool {
        self.with_state(|state| match state.kind {
            StreamKind::Readable => state.read_ended(),
            StreamKind::Writable => state.write_ended(),
            StreamKind::Duplex => state.read_ended() && state.write_ended(),
        })
    }

    /// True once the read side reached its logical end. False for streams
    /// without a read side.
    pub fn read_ended(&self) -> bool {
        self.with_state(|state| state.read_ended())
    }

    /// True once teardown completed.
    pub fn closed(&self) -> bool {
        self.with_state(|state| state.closed)
    }

    /// True once the close notification was dispatched.
    pub fn close_emitted(&self) -> bool {
        self.with_state(|state| state.close_emitted)
    }

    /// True when this stream represents a raw OS-handle sink.
    pub fn is_raw_sink(&self) -> bool {
        self.with_state(|state| state.raw_sink)
    }

    // ---- crate-internal accessors -------------------------------------

    pub(crate) fn with_state<R>(&self, read: impl FnOnce(&StreamState) -> R) -> R {
        read(&self.inner.state.borrow())
    }

    pub(crate) fn with_state_mut<R>(&self, mutate: impl FnOnce(&mut StreamState) -> R) -> R {
        mutate(&mut self.inner.state.borrow_mut())
    }

    pub(crate) fn emitter(&self) -> &Emitter<T> {
        &self.inner.emitter
    }

    pub(crate) fn take_teardown(&self) -> Option<TeardownHook<T>> {
        self.inner.hooks.borrow_mut().teardown.take()
    }

    pub(crate) fn restore_teardown(&self, hook: TeardownHook<T>) {
        self.inner.hooks.borrow_mut().teardown = Some(hook);
    }
}

/// Builder collecting configuration and capability hooks for one stream.
pub struct StreamBuilder<T> {
    kind: StreamKind,
    name: String,
    queue: TickQueue,
    emit_close: bool,
    auto_destroy: bool,
    raw_sink: bool,
    hooks: StreamHooks<T>,
}

impl<T: 'static> StreamBuilder<T> {
    fn new(kind: StreamKind, queue: &TickQueue) -> Self {
        Self {
            kind,
            name: DEFAULT_STREAM_NAME.to_string(),
            queue: queue.clone(),
            emit_close: true,
            auto_destroy: false,
            raw_sink: false,
            hooks: StreamHooks::empty(),
        }
    }

    /// Sets the diagnostic name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether a close notification should ever fire. Defaults to `true`.
    pub fn emit_close(mut self, emit_close: bool) -> Self {
        self.emit_close = emit_close;
        self
    }

    /// Whether errors automatically trigger destroy. Defaults to `false`.
    pub fn auto_destroy(mut self, auto_destroy: bool) -> Self {
        self.auto_destroy = auto_destroy;
        self
    }

    /// Marks a raw OS-handle sink, which pipes never auto-end.
    pub fn raw_sink(mut self, raw_sink: bool) -> Self {
        self.raw_sink = raw_sink;
        self
    }

    /// Installs the teardown hook releasing the underlying resource.
    pub fn teardown(
        mut self,
        hook: impl FnMut(Option<SharedError>, TeardownDone<T>) + 'static,
    ) -> Self {
        self.hooks.teardown = Some(Box::new(hook));
        self
    }

    /// Installs the destination-side write hook.
    pub fn write(mut self, hook: impl FnMut(&T) -> WriteOutcome + 'static) -> Self {
        self.hooks.write = Some(Box::new(hook));
        self
    }

    /// Installs the hook run when the write side is ended.
    pub fn on_end(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.end = Some(Box::new(hook));
        self
    }

    /// Installs the pause capability hook.
    pub fn pause(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.pause = Some(Box::new(hook));
        self
    }

    /// Installs the resume capability hook.
    pub fn resume(mut self, hook: impl FnMut() + 'static) -> Self {
        self.hooks.resume = Some(Box::new(hook));
        self
    }

    /// Builds the stream.
    pub fn build(self) -> Stream<T> {
        Stream {
            inner: Rc::new(StreamInner {
                id: Uuid::new_v4().to_string(),
                name: self.name,
                queue: self.queue,
                state: RefCell::new(StreamState::new(
                    self.kind,
                    self.emit_close,
                    self.auto_destroy,
                    self.raw_sink,
                )),
                emitter: Emitter::new(),
                hooks: RefCell::new(self.hooks),
            }),
        }
    }
}
