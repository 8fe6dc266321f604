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

mod support;

use flowline::{SharedError, Stream, StreamError, StreamEvent, StreamKind, TickQueue};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use support::{init_tracing, journal_lifecycle};

#[test]
fn callback_then_error_then_close_across_the_whole_lifecycle() {
    init_tracing();
    let queue = TickQueue::new();
    let journal = Rc::new(RefCell::new(Vec::new()));

    let teardown_journal = journal.clone();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue)
        .name("socket")
        .teardown(move |_error, done| {
            teardown_journal.borrow_mut().push("teardown".to_string());
            done.complete(None);
        })
        .build();
    journal_lifecycle(&stream, "socket", &journal);

    let callback_journal = journal.clone();
    stream.destroy(
        Some(StreamError::new("reset")),
        Some(Box::new(move |error: Option<SharedError>| {
            let message = error.map(|e| e.to_string()).unwrap_or_default();
            callback_journal.borrow_mut().push(format!("callback:{message}"));
        })),
    );

    // Teardown and the completion callback are synchronous here; the close
    // notification waits for a later turn, and the callback absorbed the
    // error so no error notification fires at all.
    assert_eq!(
        *journal.borrow(),
        vec!["teardown".to_string(), "callback:reset".to_string()]
    );

    queue.run_until_idle();
    assert_eq!(
        *journal.borrow(),
        vec![
            "teardown".to_string(),
            "callback:reset".to_string(),
            "socket:close".to_string(),
        ]
    );
}

#[test]
fn error_and_close_fire_in_the_same_turn_error_first() {
    init_tracing();
    let queue = TickQueue::new();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue).build();
    let turns = Rc::new(RefCell::new(Vec::new()));

    let error_probe = turns.clone();
    let error_queue = queue.clone();
    stream.on(StreamEvent::Error, move |_| {
        error_probe.borrow_mut().push(("error", error_queue.turn()));
    });
    let close_probe = turns.clone();
    let close_queue = queue.clone();
    stream.on(StreamEvent::Close, move |_| {
        close_probe.borrow_mut().push(("close", close_queue.turn()));
    });

    let destroy_turn = queue.turn();
    stream.destroy(Some(StreamError::new("x")), None);
    queue.run_until_idle();

    let turns = turns.borrow();
    assert_eq!(turns[0].0, "error");
    assert_eq!(turns[1].0, "close");
    assert_eq!(turns[0].1, turns[1].1);
    assert!(turns[0].1 > destroy_turn);
}

#[test]
fn observers_attached_after_destroy_still_see_the_error() {
    init_tracing();
    let queue = TickQueue::new();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue).build();

    stream.destroy(Some(StreamError::new("late attach")), None);

    // Deferred emission exists exactly for this: synchronous callers get a
    // chance to subscribe between destroy and the notification turn.
    let seen = Rc::new(RefCell::new(Vec::new()));
    let probe = seen.clone();
    stream.once(StreamEvent::Error, move |payload| {
        if let Some(error) = payload.failure() {
            probe.borrow_mut().push(error.to_string());
        }
    });

    queue.run_until_idle();
    assert_eq!(*seen.borrow(), vec!["late attach".to_string()]);
    assert!(queue.take_unhandled().is_empty());
}

#[test]
fn a_duplex_stream_reports_one_conceptual_error() {
    init_tracing();
    let queue = TickQueue::new();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue).build();
    let errors = Rc::new(Cell::new(0));

    let probe = errors.clone();
    stream.on(StreamEvent::Error, move |_| probe.set(probe.get() + 1));

    stream.destroy(Some(StreamError::new("first")), None);
    stream.destroy(Some(StreamError::new("second")), None);
    queue.run_until_idle();
    stream.destroy(Some(StreamError::new("third")), None);
    queue.run_until_idle();

    assert_eq!(errors.get(), 1);
    assert_eq!(
        stream.errored().map(|e| e.to_string()).as_deref(),
        Some("first")
    );
}

#[test]
fn asynchronous_teardown_failure_overrides_the_trigger_error() {
    init_tracing();
    let queue = TickQueue::new();
    let defer_queue = queue.clone();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue)
        .teardown(move |_error, done| {
            defer_queue.defer(move || {
                done.complete(Some(StreamError::new("fd close failed")));
            });
        })
        .build();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let probe = seen.clone();
    stream.on(StreamEvent::Error, move |payload| {
        if let Some(error) = payload.failure() {
            probe.borrow_mut().push(error.to_string());
        }
    });

    stream.destroy(Some(StreamError::new("reset")), None);
    assert!(!stream.closed());

    queue.run_until_idle();
    assert!(stream.closed());
    assert_eq!(*seen.borrow(), vec!["fd close failed".to_string()]);
}

#[test]
fn unobserved_terminal_errors_reach_the_embedder() {
    init_tracing();
    let queue = TickQueue::new();
    let stream = Stream::<u32>::builder(StreamKind::Writable, &queue)
        .name("orphan")
        .build();

    stream.destroy(Some(StreamError::new("nobody listening")), None);
    queue.run_until_idle();

    let unhandled = queue.take_unhandled();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].stream_id(), stream.id());
    assert_eq!(unhandled[0].error().to_string(), "nobody listening");
}

#[test]
fn undestroy_supports_a_full_second_lifecycle() {
    init_tracing();
    let queue = TickQueue::new();
    let teardowns = Rc::new(Cell::new(0));

    let probe = teardowns.clone();
    let stream = Stream::<u32>::builder(StreamKind::Duplex, &queue)
        .teardown(move |_error, done| {
            probe.set(probe.get() + 1);
            done.complete(None);
        })
        .build();
    let closes = Rc::new(Cell::new(0));

    let close_probe = closes.clone();
    stream.on(StreamEvent::Close, move |_| close_probe.set(close_probe.get() + 1));

    stream.destroy(Some(StreamError::new("first life")), None);
    queue.run_until_idle();
    assert!(stream.destroyed());

    stream.undestroy();
    assert!(!stream.destroyed());
    assert!(stream.errored().is_none());

    stream.destroy(None, None);
    queue.run_until_idle();

    assert_eq!(teardowns.get(), 2);
    assert_eq!(closes.get(), 2);
}
