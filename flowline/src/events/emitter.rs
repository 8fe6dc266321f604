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

//! Per-stream observer registry with ordered synchronous dispatch.

use crate::observability::events;
use crate::stream_error::SharedError;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

const COMPONENT: &str = "emitter";

/// Notification kinds a stream can dispatch.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StreamEvent {
    /// A chunk is available from the source side.
    Data,
    /// A backpressured destination can accept writes again.
    Drain,
    /// The logical end of data was reached on the source side.
    End,
    /// The stream finished teardown and will notify nothing further.
    Close,
    /// A terminal error.
    Error,
}

/// Payload delivered alongside a notification.
#[derive(Debug)]
pub enum EventPayload<T> {
    /// No payload (`Drain`, `End`, `Close`).
    None,
    /// The chunk carried by a `Data` notification.
    Chunk(T),
    /// The terminal error carried by an `Error` notification.
    Failure(SharedError),
}

impl<T> EventPayload<T> {
    /// Returns the chunk when this is a `Data` payload.
    pub fn chunk(&self) -> Option<&T> {
        match self {
            EventPayload::Chunk(chunk) => Some(chunk),
            _ => None,
        }
    }

    /// Returns the error when this is an `Error` payload.
    pub fn failure(&self) -> Option<&SharedError> {
        match self {
            EventPayload::Failure(error) => Some(error),
            _ => None,
        }
    }
}

/// Stable handle for one registered observer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListenerId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(&EventPayload<T>)>>;

struct ListenerEntry<T> {
    id: ListenerId,
    event: StreamEvent,
    once: bool,
    handler: Handler<T>,
}

/// Ordered observer registry for a single stream.
///
/// Dispatch runs over a snapshot taken at emit time, so handlers may add or
/// remove observers re-entrantly. A handler removed mid-dispatch by an
/// earlier handler is skipped; duplicate registration of one closure per
/// event is allowed and each registration is dispatched. A re-entrant emit
/// that reaches a handler already running further up the stack skips that
/// handler for the inner dispatch.
pub(crate) struct Emitter<T> {
    entries: RefCell<Vec<ListenerEntry<T>>>,
    next_id: Cell<u64>,
}

impl<T: 'static> Emitter<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Registers an observer behind the existing ones.
    pub(crate) fn on(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.insert(event, false, false, handler)
    }

    /// Registers an observer that is removed just before its first dispatch.
    pub(crate) fn once(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.insert(event, true, false, handler)
    }

    /// Registers an observer ahead of every existing one for `event`.
    pub(crate) fn prepend(
        &self,
        event: StreamEvent,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        self.insert(event, false, true, handler)
    }

    /// Removes one observer. Returns `true` only when it was registered.
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Returns how many observers are registered for `event`.
    pub(crate) fn listener_count(&self, event: StreamEvent) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .count()
    }

    /// Dispatches `payload` to every observer of `event`, in registration
    /// order, on the calling stack. Returns the number of observers invoked.
    pub(crate) fn emit(&self, event: StreamEvent, payload: &EventPayload<T>) -> usize {
        let snapshot: Vec<(ListenerId, bool, Handler<T>)> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.event == event)
            .map(|entry| (entry.id, entry.once, Rc::clone(&entry.handler)))
            .collect();

        let mut delivered = 0;
        for (id, once, handler) in snapshot {
            let still_registered = if once {
                // Remove before invoking so a re-entrant emit cannot run a
                // once observer twice.
                self.remove(id)
            } else {
                self.contains(id)
            };

            if !still_registered {
                continue;
            }

            // A handler can emit re-entrantly and reach its own entry; it is
            // skipped for the inner dispatch rather than aliased.
            let Ok(mut handler) = handler.try_borrow_mut() else {
                debug!(
                    event = events::DISPATCH_REENTRY_SKIPPED,
                    component = COMPONENT,
                    "skipping handler already running further up the stack"
                );
                continue;
            };
            handler(payload);
            delivered += 1;
        }

        delivered
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|entry| entry.id == id)
    }

    fn insert(
        &self,
        event: StreamEvent,
        once: bool,
        prepend: bool,
        handler: impl FnMut(&EventPayload<T>) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let entry = ListenerEntry {
            id,
            event,
            once,
            handler: Rc::new(RefCell::new(handler)),
        };

        let mut entries = self.entries.borrow_mut();
        if prepend {
            let position = entries
                .iter()
                .position(|existing| existing.event == event)
                .unwrap_or(entries.len());
            entries.insert(position, entry);
        } else {
            entries.push(entry);
        }

        id
    }
}
