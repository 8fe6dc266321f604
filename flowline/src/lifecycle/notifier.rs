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

//! Error/close notification policy and deferred emission helpers.
//!
//! Deferred emission runs on the next scheduler turn, never synchronously
//! from within `destroy()`, so synchronous callers get a chance to attach
//! observers first. Error strictly precedes close whenever both fire.

use crate::events::emitter::{EventPayload, StreamEvent};
use crate::lifecycle::stream_state::StreamState;
use crate::observability::events;
use crate::stream::Stream;
use crate::stream_error::{SharedError, UnhandledError};
use tracing::debug;

const COMPONENT: &str = "notifier";

/// Decides whether an error notification is still owed, marking the stream as
/// emitted when it is.
///
/// The marking side effect is intentional: callers invoke this exactly when
/// they commit to emitting, which is what keeps the notification from ever
/// firing twice across the read and write sides.
pub(crate) fn needs_error_notification(
    state: &mut StreamState,
    error: Option<&SharedError>,
) -> bool {
    if error.is_none() {
        return false;
    }
    if state.error_emitted() {
        return false;
    }

    state.mark_error_emitted();
    true
}

/// Schedules an error notification for a later turn.
pub(crate) fn schedule_error<T: 'static>(stream: &Stream<T>, error: SharedError) {
    let stream = stream.clone();
    stream.queue().clone().defer(move || {
        emit_error_now(&stream, error);
    });
}

/// Schedules error-then-close for a later turn. Close fires in the same
/// turn, strictly after the error, and only when the stream emits close.
pub(crate) fn schedule_error_then_close<T: 'static>(stream: &Stream<T>, error: SharedError) {
    let stream = stream.clone();
    stream.queue().clone().defer(move || {
        emit_error_now(&stream, error);
        emit_close_now(&stream);
    });
}

/// Schedules a close notification for a later turn.
pub(crate) fn schedule_close<T: 'static>(stream: &Stream<T>) {
    let stream = stream.clone();
    stream.queue().clone().defer(move || {
        emit_close_now(&stream);
    });
}

/// Dispatches an error notification on the calling stack. An error delivered
/// to zero observers is escalated through the scheduler.
pub(crate) fn emit_error_now<T: 'static>(stream: &Stream<T>, error: SharedError) {
    debug!(
        event = events::ERROR_EMIT,
        component = COMPONENT,
        stream_id = stream.id(),
        stream_name = stream.name(),
        err = %error,
        "dispatching error notification"
    );

    let delivered = stream
        .emitter()
        .emit(StreamEvent::Error, &EventPayload::Failure(error.clone()));

    if delivered == 0 {
        stream
            .queue()
            .escalate(UnhandledError::new(stream.id(), error));
    }
}

fn emit_close_now<T: 'static>(stream: &Stream<T>) {
    let owed = stream.with_state_mut(|state| {
        if !state.emit_close || state.close_emitted {
            return false;
        }
        state.close_emitted = true;
        true
    });

    if !owed {
        return;
    }

    debug!(
        event = events::CLOSE_EMIT,
        component = COMPONENT,
        stream_id = stream.id(),
        stream_name = stream.name(),
        "dispatching close notification"
    );
    stream.emitter().emit(StreamEvent::Close, &EventPayload::None);
}
