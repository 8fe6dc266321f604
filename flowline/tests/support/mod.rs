use flowline::{Stream, StreamEvent, StreamKind, TickQueue, WriteOutcome};
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init();
}

/// Writable sink that records every accepted chunk.
#[allow(dead_code)]
pub(crate) fn recording_sink(queue: &TickQueue) -> (Stream<u32>, Rc<RefCell<Vec<u32>>>) {
    let chunks = Rc::new(RefCell::new(Vec::new()));

    let probe = chunks.clone();
    let sink = Stream::<u32>::builder(StreamKind::Writable, queue)
        .name("recording-sink")
        .write(move |chunk| {
            probe.borrow_mut().push(*chunk);
            WriteOutcome::Accepted
        })
        .build();

    (sink, chunks)
}

/// Journals lifecycle notifications on `stream` under the given tag.
pub(crate) fn journal_lifecycle(
    stream: &Stream<u32>,
    tag: &'static str,
    journal: &Rc<RefCell<Vec<String>>>,
) {
    let error_journal = journal.clone();
    stream.on(StreamEvent::Error, move |payload| {
        let message = payload.failure().map(|e| e.to_string()).unwrap_or_default();
        error_journal.borrow_mut().push(format!("{tag}:error:{message}"));
    });

    let close_journal = journal.clone();
    stream.on(StreamEvent::Close, move |_| {
        close_journal.borrow_mut().push(format!("{tag}:close"));
    });
}
