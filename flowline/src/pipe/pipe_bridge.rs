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

//! Pipe establishment: subscriptions, flow control, and error propagation.

use crate::events::emitter::StreamEvent;
use crate::lifecycle::destroy_coordinator::error_or_destroy;
use crate::lifecycle::notifier;
use crate::observability::{events, fields};
use crate::pipe::pipe_link::{LinkEnd, PipeLink};
use crate::stream::{Stream, WriteOutcome};
use crate::stream_error::SharedError;
use std::rc::Rc;
use tracing::{debug, warn};

const COMPONENT: &str = "pipe_bridge";

/// Options for one pipe operation.
#[derive(Clone, Copy, Debug)]
pub struct PipeOptions {
    /// Whether the destination is ended when the source ends or closes.
    /// Raw OS-handle sinks are never auto-ended regardless of this flag.
    pub end: bool,
}

impl Default for PipeOptions {
    fn default() -> Self {
        Self { end: true }
    }
}

/// Connects `source` to `destination` and returns the destination for
/// chaining.
///
/// Registers data/end/close (plus a prepended error observer) on the source
/// and drain/close (plus a prepended error observer) on the destination, all
/// removed by the link's single latched cleanup.
pub(crate) fn pipe<T: 'static>(
    source: &Stream<T>,
    destination: &Stream<T>,
    options: PipeOptions,
) -> Stream<T> {
    let end_destination = options.end && !destination.is_raw_sink();
    let link = PipeLink::new(source.clone(), destination.clone(), end_destination);

    debug!(
        event = events::PIPE_ATTACH,
        component = COMPONENT,
        link_id = link.id(),
        stream_id = source.id(),
        stream_name = source.name(),
        reason = if end_destination {
            fields::NONE
        } else if destination.is_raw_sink() {
            fields::REASON_RAW_SINK
        } else {
            fields::REASON_END_DISABLED
        },
        "pipe link established"
    );

    {
        let handler_link = Rc::clone(&link);
        let id = source.on(StreamEvent::Data, move |payload| {
            let Some(chunk) = payload.chunk() else {
                return;
            };
            forward_chunk(&handler_link, chunk);
        });
        link.track(LinkEnd::Source, id);
    }

    {
        let handler_link = Rc::clone(&link);
        let id = destination.on(StreamEvent::Drain, move |_| {
            if handler_link.leave_awaiting_drain() && handler_link.source.can_resume() {
                debug!(
                    event = events::PIPE_RESUME,
                    component = COMPONENT,
                    link_id = handler_link.id(),
                    stream_id = handler_link.source.id(),
                    "destination drained, resuming source"
                );
                handler_link.source.resume();
            }
        });
        link.track(LinkEnd::Destination, id);
    }

    {
        let handler_link = Rc::clone(&link);
        let id = source.on(StreamEvent::End, move |_| finish_link(&handler_link));
        link.track(LinkEnd::Source, id);
    }

    {
        let handler_link = Rc::clone(&link);
        let id = source.on(StreamEvent::Close, move |_| finish_link(&handler_link));
        link.track(LinkEnd::Source, id);
    }

    {
        let handler_link = Rc::clone(&link);
        let id = destination.on(StreamEvent::Close, move |_| handler_link.cleanup());
        link.track(LinkEnd::Destination, id);
    }

    // Error observers are installed ahead of any user handler so cleanup
    // always runs, even if a user handler panics or rethrows.
    {
        let handler_link = Rc::clone(&link);
        let id = source.prepend_listener(StreamEvent::Error, move |payload| {
            let Some(error) = payload.failure() else {
                return;
            };
            handler_link.cleanup();
            surface_unobserved(&handler_link.source, error.clone());
        });
        link.track(LinkEnd::Source, id);
    }

    {
        let handler_link = Rc::clone(&link);
        let id = destination.prepend_listener(StreamEvent::Error, move |payload| {
            let Some(error) = payload.failure() else {
                return;
            };
            handler_link.cleanup();
            surface_unobserved(&handler_link.destination, error.clone());
        });
        link.track(LinkEnd::Destination, id);
    }

    // A source whose read side already reached its logical end never emits
    // End again; run the terminal handling on a later turn instead of
    // waiting forever.
    if source.read_ended() {
        let link = Rc::clone(&link);
        source.queue().defer(move || finish_link(&link));
    }

    destination.clone()
}

fn forward_chunk<T: 'static>(link: &Rc<PipeLink<T>>, chunk: &T) {
    match link.destination.write(chunk) {
        WriteOutcome::Accepted => {}
        WriteOutcome::Backpressure => {
            if !link.cleaned() && link.source.can_pause() && link.enter_awaiting_drain() {
                debug!(
                    event = events::PIPE_PAUSE,
                    component = COMPONENT,
                    link_id = link.id(),
                    stream_id = link.source.id(),
                    "destination backpressured, pausing source"
                );
                link.source.pause();
            }
        }
        WriteOutcome::Failed(error) => {
            warn!(
                event = events::PIPE_WRITE_FAILED,
                component = COMPONENT,
                link_id = link.id(),
                stream_id = link.destination.id(),
                err = %error,
                "destination write failed, breaking pipe"
            );
            link.cleanup();
            error_or_destroy(&link.destination, error);
        }
    }
}

fn finish_link<T: 'static>(link: &Rc<PipeLink<T>>) {
    if link.cleaned() {
        return;
    }
    if link.end_destination {
        link.end_destination_once();
    }
    link.cleanup();
}

/// Re-emits an error that would otherwise be swallowed: after cleanup, a
/// stream with no remaining error observers escalates through the scheduler.
fn surface_unobserved<T: 'static>(stream: &Stream<T>, error: SharedError) {
    if stream.listener_count(StreamEvent::Error) == 0 {
        notifier::emit_error_now(stream, error);
    }
}
