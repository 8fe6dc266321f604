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

//! Idempotent destroy orchestration across state, teardown, and notification.

use crate::lifecycle::notifier;
use crate::observability::{events, fields};
use crate::stream::Stream;
use crate::stream_error::SharedError;
use tracing::{debug, warn};

const COMPONENT: &str = "destroy_coordinator";

/// Completion callback for one `destroy` call, invoked exactly once with the
/// (possibly absent) terminal error.
pub type DestroyCallback = Box<dyn FnOnce(Option<SharedError>)>;

/// Continuation handed to the teardown hook.
///
/// The hook calls [`complete`](TeardownDone::complete) when the underlying
/// resource is released, synchronously or on a later turn. Completing
/// consumes the handle, so teardown finishes at most once per destroy.
pub struct TeardownDone<T> {
    stream: Stream<T>,
    trigger: Option<SharedError>,
    callback: Option<DestroyCallback>,
}

impl<T: 'static> TeardownDone<T> {
    /// Finishes teardown. `teardown_error` reports a failure of the hook
    /// itself, distinct from the error that triggered destruction; when
    /// present it becomes the stream's terminal error.
    pub fn complete(self, teardown_error: Option<SharedError>) {
        finish_teardown(self.stream, self.trigger, self.callback, teardown_error);
    }
}

/// Destroys `stream`, idempotently.
///
/// The first call transitions the state machine and runs the teardown hook
/// synchronously; every later call only invokes its own completion callback
/// (synchronously) or schedules a still-owed error notification.
pub(crate) fn destroy<T: 'static>(
    stream: &Stream<T>,
    error: Option<SharedError>,
    callback: Option<DestroyCallback>,
) {
    let first = stream.with_state_mut(|state| {
        if !state.begin_destroy() {
            return false;
        }
        if let Some(error) = &error {
            state.record_error(error);
        }
        true
    });

    if !first {
        already_destroyed(stream, error, callback);
        return;
    }

    debug!(
        event = events::DESTROY_START,
        component = COMPONENT,
        stream_id = stream.id(),
        stream_name = stream.name(),
        err = fields::format_optional_error(error.as_ref()),
        "destroy transition started"
    );

    let done = TeardownDone {
        stream: stream.clone(),
        trigger: error.clone(),
        callback,
    };

    // The hook is taken for the duration of the call so it cannot run twice,
    // then restored for streams that are reused after `undestroy`.
    match stream.take_teardown() {
        Some(mut teardown) => {
            teardown(error, done);
            stream.restore_teardown(teardown);
        }
        None => done.complete(None),
    }
}

fn already_destroyed<T: 'static>(
    stream: &Stream<T>,
    error: Option<SharedError>,
    callback: Option<DestroyCallback>,
) {
    debug!(
        event = events::DESTROY_ALREADY_DESTROYED,
        component = COMPONENT,
        stream_id = stream.id(),
        stream_name = stream.name(),
        err = fields::format_optional_error(error.as_ref()),
        "destroy on already-destroyed stream"
    );

    if let Some(callback) = callback {
        callback(error);
        return;
    }

    if let Some(error) = error {
        let owed = stream.with_state_mut(|state| {
            state.record_error(&error);
            notifier::needs_error_notification(state, Some(&error))
        });
        if owed {
            notifier::schedule_error(stream, error);
        }
    }
}

fn finish_teardown<T: 'static>(
    stream: Stream<T>,
    trigger: Option<SharedError>,
    callback: Option<DestroyCallback>,
    teardown_error: Option<SharedError>,
) {
    match &teardown_error {
        Some(error) => warn!(
            event = events::TEARDOWN_FAILED,
            component = COMPONENT,
            stream_id = stream.id(),
            stream_name = stream.name(),
            err = %error,
            "teardown hook reported a failure"
        ),
        None => debug!(
            event = events::TEARDOWN_OK,
            component = COMPONENT,
            stream_id = stream.id(),
            stream_name = stream.name(),
            "teardown finished"
        ),
    }

    let effective = teardown_error.or(trigger);
    stream.with_state_mut(|state| {
        if let Some(error) = &effective {
            state.record_error(error);
        }
        state.finish_teardown();
    });

    if let Some(callback) = callback {
        // Callback ordering is part of the contract: the callback runs now,
        // in the continuation's turn, before any deferred notification.
        callback(effective);
        if stream.with_state(|state| state.emit_close && !state.close_emitted) {
            notifier::schedule_close(&stream);
        }
        return;
    }

    let owed = match &effective {
        Some(error) => {
            stream.with_state_mut(|state| notifier::needs_error_notification(state, Some(error)))
        }
        None => false,
    };

    if owed {
        // needs_error_notification answered true, so effective is present.
        let error = effective.expect("error notification owed without an error");
        notifier::schedule_error_then_close(&stream, error);
    } else if stream.with_state(|state| state.emit_close && !state.close_emitted) {
        notifier::schedule_close(&stream);
    }
}

/// Resets the stream to its initial lifecycle state for reuse.
///
/// Precondition (documented, not enforced): no asynchronous teardown may be
/// in flight; behavior is undefined otherwise.
pub(crate) fn undestroy<T: 'static>(stream: &Stream<T>) {
    stream.with_state_mut(|state| state.undestroy());
    debug!(
        event = events::UNDESTROY,
        component = COMPONENT,
        stream_id = stream.id(),
        stream_name = stream.name(),
        "lifecycle flags reset"
    );
}

/// Routes an error detected outside the normal write/read path.
///
/// Auto-destroy streams destroy with the error; otherwise a still-owed error
/// notification is dispatched directly, without deferral.
pub fn error_or_destroy<T: 'static>(stream: &Stream<T>, error: SharedError) {
    if stream.with_state(|state| state.auto_destroy) {
        destroy(stream, Some(error), None);
        return;
    }

    let owed = stream.with_state_mut(|state| {
        state.record_error(&error);
        notifier::needs_error_notification(state, Some(&error))
    });
    if owed {
        notifier::emit_error_now(stream, error);
    }
}
