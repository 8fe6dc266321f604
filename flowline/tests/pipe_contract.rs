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

use flowline::{PipeOptions, Stream, StreamError, StreamKind, TickQueue, WriteOutcome};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use support::{init_tracing, journal_lifecycle, recording_sink};

#[test]
fn chunks_flow_end_to_end_and_the_sink_is_ended() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue)
        .name("file-reader")
        .build();
    let (sink, chunks) = recording_sink(&queue);

    source.pipe(&sink, PipeOptions::default());
    source.push(10);
    source.push(20);
    source.push(30);
    source.finish();

    assert_eq!(*chunks.borrow(), vec![10, 20, 30]);
    assert!(sink.ended());

    // The link is gone; late chunks are dropped at the source.
    source.push(40);
    assert_eq!(*chunks.borrow(), vec![10, 20, 30]);
}

#[test]
fn a_transform_in_the_middle_relays_data_and_end() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
    let (sink, chunks) = recording_sink(&queue);

    // Duplex transform: doubles each chunk, finishes its read side when its
    // write side is ended, so termination travels the whole chain.
    let transform_handle: Rc<RefCell<Option<Stream<u32>>>> = Rc::new(RefCell::new(None));
    let write_handle = transform_handle.clone();
    let end_handle = transform_handle.clone();
    let transform = Stream::<u32>::builder(StreamKind::Duplex, &queue)
        .name("doubler")
        .write(move |chunk| {
            if let Some(transform) = write_handle.borrow().as_ref() {
                transform.push(chunk * 2);
            }
            WriteOutcome::Accepted
        })
        .on_end(move || {
            if let Some(transform) = end_handle.borrow().as_ref() {
                transform.finish();
            }
        })
        .build();
    *transform_handle.borrow_mut() = Some(transform.clone());

    source
        .pipe(&transform, PipeOptions::default())
        .pipe(&sink, PipeOptions::default());

    source.push(1);
    source.push(2);
    source.finish();

    assert_eq!(*chunks.borrow(), vec![2, 4]);
    assert!(transform.ended());
    assert!(sink.ended());
}

#[test]
fn backpressure_round_trip_through_a_pipe() {
    init_tracing();
    let queue = TickQueue::new();
    let paused = Rc::new(Cell::new(false));

    let pause_probe = paused.clone();
    let resume_probe = paused.clone();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue)
        .pause(move || pause_probe.set(true))
        .resume(move || resume_probe.set(false))
        .build();

    let full = Rc::new(Cell::new(true));
    let accepted = Rc::new(RefCell::new(Vec::new()));
    let sink_full = full.clone();
    let sink_accepted = accepted.clone();
    let sink = Stream::<u32>::builder(StreamKind::Writable, &queue)
        .write(move |chunk| {
            sink_accepted.borrow_mut().push(*chunk);
            if sink_full.get() {
                WriteOutcome::Backpressure
            } else {
                WriteOutcome::Accepted
            }
        })
        .build();

    source.pipe(&sink, PipeOptions::default());

    source.push(1);
    assert!(paused.get());

    // Buffer cleared: drain resumes the source and flow continues.
    full.set(false);
    sink.signal_drain();
    assert!(!paused.get());

    source.push(2);
    assert!(!paused.get());
    assert_eq!(*accepted.borrow(), vec![1, 2]);
}

#[test]
fn destroying_the_destination_detaches_and_surfaces_the_error() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
    let (sink, chunks) = recording_sink(&queue);
    let journal = Rc::new(RefCell::new(Vec::new()));
    journal_lifecycle(&source, "source", &journal);

    source.pipe(&sink, PipeOptions::default());
    source.push(1);

    sink.destroy(Some(StreamError::new("disk gone")), None);
    queue.run_until_idle();

    // The sink had no error observers of its own; the link re-surfaced the
    // error to the embedder instead of swallowing it.
    let unhandled = queue.take_unhandled();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].stream_id(), sink.id());

    // Source keeps its own lifecycle; only the link is gone.
    source.push(2);
    assert_eq!(*chunks.borrow(), vec![1]);
    assert!(!source.destroyed());
    assert!(journal.borrow().is_empty());
}

#[test]
fn source_destroy_mid_stream_leaves_the_destination_usable() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
    let (sink, chunks) = recording_sink(&queue);
    let journal = Rc::new(RefCell::new(Vec::new()));
    journal_lifecycle(&source, "source", &journal);

    source.pipe(&sink, PipeOptions::default());
    source.push(1);
    source.destroy(Some(StreamError::new("upstream reset")), None);
    queue.run_until_idle();

    assert_eq!(
        *journal.borrow(),
        vec![
            "source:error:upstream reset".to_string(),
            "source:close".to_string(),
        ]
    );

    // The destination was not ended or destroyed; direct writes still work.
    assert!(!sink.ended());
    assert!(matches!(sink.write(&5), WriteOutcome::Accepted));
    assert_eq!(*chunks.borrow(), vec![1, 5]);
}

#[test]
fn failing_destination_write_destroys_an_auto_destroy_sink() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
    let journal = Rc::new(RefCell::new(Vec::new()));

    let sink = Stream::<u32>::builder(StreamKind::Writable, &queue)
        .auto_destroy(true)
        .write(|_chunk| WriteOutcome::Failed(StreamError::new("quota exceeded")))
        .build();
    journal_lifecycle(&sink, "sink", &journal);

    source.pipe(&sink, PipeOptions::default());
    source.push(1);
    queue.run_until_idle();

    assert!(sink.destroyed());
    assert_eq!(
        *journal.borrow(),
        vec![
            "sink:error:quota exceeded".to_string(),
            "sink:close".to_string(),
        ]
    );
}

#[test]
fn piping_a_finished_source_ends_the_destination_next_turn() {
    init_tracing();
    let queue = TickQueue::new();
    let source = Stream::<u32>::builder(StreamKind::Readable, &queue).build();
    let (sink, _chunks) = recording_sink(&queue);

    source.finish();
    source.pipe(&sink, PipeOptions::default());
    assert!(!sink.ended());

    queue.run_until_idle();
    assert!(sink.ended());
}
