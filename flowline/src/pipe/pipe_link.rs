//! Subscription bookkeeping for one pipe operation.

use crate::events::emitter::ListenerId;
use crate::observability::events;
use crate::stream::Stream;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

const COMPONENT: &str = "pipe_link";

/// Which endpoint a subscription was registered on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LinkEnd {
    Source,
    Destination,
}

/// State owned by the bridge for the duration of one pipe operation.
///
/// Torn down only by [`cleanup`](PipeLink::cleanup); the latch makes repeated
/// terminal events no-ops, so there is never partial teardown.
pub(crate) struct PipeLink<T> {
    id: String,
    pub(crate) source: Stream<T>,
    pub(crate) destination: Stream<T>,
    /// Whether the bridge ends the destination on source end/close.
    pub(crate) end_destination: bool,
    listener_ids: RefCell<Vec<(LinkEnd, ListenerId)>>,
    cleaned: Cell<bool>,
    destination_ended: Cell<bool>,
    awaiting_drain: Cell<bool>,
}

impl<T: 'static> PipeLink<T> {
    pub(crate) fn new(
        source: Stream<T>,
        destination: Stream<T>,
        end_destination: bool,
    ) -> Rc<Self> {
        Rc::new(Self {
            id: Uuid::new_v4().to_string(),
            source,
            destination,
            end_destination,
            listener_ids: RefCell::new(Vec::new()),
            cleaned: Cell::new(false),
            destination_ended: Cell::new(false),
            awaiting_drain: Cell::new(false),
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn track(&self, end: LinkEnd, id: ListenerId) {
        self.listener_ids.borrow_mut().push((end, id));
    }

    pub(crate) fn cleaned(&self) -> bool {
        self.cleaned.get()
    }

    /// Marks the link as waiting for a destination drain. Returns `true`
    /// only when it was not already waiting, so the source is paused once
    /// per backpressure cycle.
    pub(crate) fn enter_awaiting_drain(&self) -> bool {
        !self.awaiting_drain.replace(true)
    }

    /// Clears the waiting-for-drain mark. Returns `true` only when the link
    /// was waiting, so the source is resumed once per cycle.
    pub(crate) fn leave_awaiting_drain(&self) -> bool {
        self.awaiting_drain.replace(false)
    }

    /// Ends the destination at most once per link.
    pub(crate) fn end_destination_once(&self) {
        if self.destination_ended.replace(true) {
            return;
        }

        debug!(
            event = events::PIPE_END_DESTINATION,
            component = COMPONENT,
            link_id = self.id(),
            stream_id = self.destination.id(),
            "ending destination after source terminal event"
        );
        self.destination.end();
    }

    /// Removes every subscription this link registered, exactly once,
    /// regardless of which terminal event triggered it.
    pub(crate) fn cleanup(&self) {
        if self.cleaned.replace(true) {
            return;
        }

        let ids: Vec<(LinkEnd, ListenerId)> = self.listener_ids.borrow_mut().drain(..).collect();
        for (end, listener_id) in ids {
            match end {
                LinkEnd::Source => self.source.remove_listener(listener_id),
                LinkEnd::Destination => self.destination.remove_listener(listener_id),
            };
        }

        debug!(
            event = events::PIPE_DETACH,
            component = COMPONENT,
            link_id = self.id(),
            stream_id = self.source.id(),
            "pipe link torn down"
        );
    }
}
