// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot timers: the seam between the tracker and the host's event loop.
//!
//! ## Overview
//!
//! The tracker never sleeps or spawns. It asks a [`Scheduler`] to run a task
//! after a delay and to forget that task again on pointer-leave. Hosts implement
//! [`Scheduler`] on top of whatever their event loop offers (a timer wheel, a
//! platform timer, a frame clock).
//!
//! [`ManualScheduler`] is a deterministic implementation driven by a virtual
//! clock. It is what the tests in this crate use, and it also works as the
//! timer queue of a host that already ticks once per frame.
//!
//! ## Contract
//!
//! - `set_timeout` must not run the task before returning.
//! - `clear_timeout` on a handle that already fired, was already cleared, or was
//!   never issued is a no-op.
//! - Everything is single-threaded; tasks are not `Send`.
//!
//! ```
//! use core::cell::Cell;
//! use core::time::Duration;
//! use std::rc::Rc;
//! use understory_dwell::timer::{ManualScheduler, Scheduler};
//!
//! let timers = ManualScheduler::new();
//! let fired = Rc::new(Cell::new(false));
//! let f = fired.clone();
//! timers.set_timeout(Duration::from_millis(10), Box::new(move || f.set(true)));
//!
//! timers.advance(Duration::from_millis(9));
//! assert!(!fired.get());
//! timers.advance(Duration::from_millis(1));
//! assert!(fired.get());
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

/// Deferred work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce()>;

/// Host timer facility used by [`DwellTracker`](crate::tracker::DwellTracker).
pub trait Scheduler {
    /// Handle identifying a scheduled task.
    type Handle: Copy + Eq + core::fmt::Debug;

    /// Run `task` once, no earlier than `delay` from now.
    fn set_timeout(&self, delay: Duration, task: Task) -> Self::Handle;

    /// Drop the task behind `handle` if it has not run yet.
    fn clear_timeout(&self, handle: Self::Handle);
}

/// Handle issued by [`ManualScheduler`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerId(u64);

struct Pending {
    id: TimerId,
    deadline: Duration,
    task: Task,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending>,
}

impl Queue {
    /// Remove and return the earliest task due at or before `limit`.
    ///
    /// Equal deadlines run in scheduling order.
    fn pop_due(&mut self, limit: Duration) -> Option<Pending> {
        let mut best: Option<usize> = None;
        for (i, p) in self.pending.iter().enumerate() {
            if p.deadline > limit {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(j) => {
                    let b = &self.pending[j];
                    if (p.deadline, p.id) < (b.deadline, b.id) {
                        best = Some(i);
                    }
                }
            }
        }
        best.map(|i| self.pending.remove(i))
    }
}

/// Deterministic [`Scheduler`] over a virtual clock.
///
/// Time only moves when [`advance`](Self::advance), [`advance_to`](Self::advance_to)
/// or [`run_until_idle`](Self::run_until_idle) is called. Tasks run in deadline
/// order with the clock set to their deadline, so a task that schedules more work
/// sees the right "now". Tasks scheduled while advancing still run in the same
/// call if they fall due before its target time.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Queue>,
}

impl core::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let q = self.queue.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &q.now)
            .field("pending", &q.pending.len())
            .finish_non_exhaustive()
    }
}

impl ManualScheduler {
    /// Create a scheduler with its clock at zero and nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    /// Number of tasks that have neither run nor been cleared.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Move the clock to `target`, running every task due at or before it.
    ///
    /// A `target` in the past only runs tasks that are already overdue; the clock
    /// never goes backwards. Returns the number of tasks run.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs: tasks may schedule or clear.
            let next = {
                let mut q = self.queue.borrow_mut();
                let due = q.pop_due(target);
                if let Some(p) = &due {
                    q.now = q.now.max(p.deadline);
                }
                due
            };
            let Some(p) = next else { break };
            (p.task)();
            ran += 1;
        }
        let mut q = self.queue.borrow_mut();
        q.now = q.now.max(target);
        ran
    }

    /// Run tasks until nothing is pending, advancing the clock as needed.
    ///
    /// Returns the number of tasks run. Work that keeps rescheduling itself
    /// makes this loop forever.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let latest = self.queue.borrow().pending.iter().map(|p| p.deadline).max();
            match latest {
                Some(deadline) => ran += self.advance_to(deadline),
                None => return ran,
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    type Handle = TimerId;

    fn set_timeout(&self, delay: Duration, task: Task) -> TimerId {
        let mut q = self.queue.borrow_mut();
        let id = TimerId(q.next_id);
        q.next_id += 1;
        let deadline = q.now.saturating_add(delay);
        q.pending.push(Pending { id, deadline, task });
        id
    }

    fn clear_timeout(&self, handle: TimerId) {
        self.queue.borrow_mut().pending.retain(|p| p.id != handle);
    }
}
