//! Scheduling layer.
//!
//! Owns the explicit micro-deferred queue that "next turn" emission runs on.
//! Keeping the queue explicit (instead of hiding it behind a runtime) makes
//! the completion-before-notification and error-before-close orderings
//! observable by turn index.
//!
//! ```
//! use flowline::TickQueue;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let queue = TickQueue::new();
//! let ran_at = Rc::new(Cell::new(0));
//! let ran_at_probe = ran_at.clone();
//! let queue_probe = queue.clone();
//!
//! queue.defer(move || ran_at_probe.set(queue_probe.turn()));
//! assert_eq!(queue.turn(), 0);
//! queue.run_until_idle();
//! assert!(ran_at.get() > 0);
//! ```

pub(crate) mod tick_queue;
