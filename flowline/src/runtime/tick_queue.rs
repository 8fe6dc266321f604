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

//! Single-threaded deferred-task queue with an observable turn counter.

use crate::observability::{events, fields};
use crate::stream_error::UnhandledError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::warn;

const COMPONENT: &str = "tick_queue";

type Task = Box<dyn FnOnce()>;

/// Cooperative scheduler handle shared by every stream in one flow graph.
///
/// `defer` enqueues a zero-delay task that runs after the current synchronous
/// call stack unwinds; `run_until_idle` drains the queue one task per turn.
/// Cloning the handle shares the underlying queue.
#[derive(Clone)]
pub struct TickQueue {
    inner: Rc<RefCell<TickQueueInner>>,
}

#[derive(Default)]
struct TickQueueInner {
    tasks: VecDeque<Task>,
    turn: u64,
    unhandled: Vec<UnhandledError>,
}

impl TickQueue {
    /// Creates an empty queue at turn zero.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(TickQueueInner::default())),
        }
    }

    /// Schedules `task` to run on a later turn.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().tasks.push_back(Box::new(task));
    }

    /// Returns the current turn index. Synchronous code observes the turn of
    /// the call that is currently unwinding; deferred tasks observe a strictly
    /// larger turn.
    pub fn turn(&self) -> u64 {
        self.inner.borrow().turn
    }

    /// Returns the number of tasks waiting for a later turn.
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Drains the queue, running each task on its own turn, until no tasks
    /// remain. Tasks deferred while draining run too. Returns the number of
    /// tasks executed.
    pub fn run_until_idle(&self) -> u64 {
        let mut executed = 0;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                match inner.tasks.pop_front() {
                    Some(task) => {
                        inner.turn += 1;
                        task
                    }
                    None => break,
                }
            };

            task();
            executed += 1;
        }

        executed
    }

    /// Records a terminal error that was dispatched with zero observers.
    pub(crate) fn escalate(&self, unhandled: UnhandledError) {
        warn!(
            event = events::ERROR_UNOBSERVED,
            component = COMPONENT,
            stream_id = unhandled.stream_id(),
            err = %unhandled.error(),
            reason = fields::REASON_NO_ERROR_OBSERVERS,
            "terminal error had no observers"
        );
        self.inner.borrow_mut().unhandled.push(unhandled);
    }

    /// Drains the unobserved terminal errors collected so far.
    ///
    /// The embedding application owns the escalation policy; the queue only
    /// guarantees none of these errors are dropped.
    pub fn take_unhandled(&self) -> Vec<UnhandledError> {
        std::mem::take(&mut self.inner.borrow_mut().unhandled)
    }
}

impl Default for TickQueue {
    fn default() -> Self {
        Self::new()
    }
}
