// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dwell --heading-base-level=0

//! Understory Dwell: deterministic, `no_std` dwell detection for UI elements.
//!
//! ## Overview
//!
//! A dwell is the pointer resting over one element for at least a configured
//! time. This crate wraps a host's child elements so that entering a child arms a
//! one-shot timer and leaving it cancels the timer; a timer that survives calls a
//! dwell callback with the triggering event and the child's payload.
//! Handlers the children already had are kept and called after the tracker's
//! own bookkeeping.
//!
//! It does not hit test, lay out, or render.
//! Feed it enter/leave from your toolkit, or use the small [`hover`] driver to
//! derive them from pointer positions and [`kurbo::Rect`] bounds.
//!
//! ## Inputs
//!
//! - [`Child`](crate::child::Child): a payload `A` behind an `Rc` plus optional
//!   pointer-enter and pointer-leave handlers. [`Attributes`](crate::attrs::Attributes)
//!   is a ready-made ordered key/value payload.
//! - [`DwellConfig`](crate::config::DwellConfig): dwelling time (default 333 ms)
//!   and [`SlotPolicy`](crate::config::SlotPolicy).
//! - A [`Scheduler`](crate::timer::Scheduler): the host's one-shot timer facility.
//!   [`ManualScheduler`](crate::timer::ManualScheduler) is a virtual-clock
//!   implementation for tests and frame-driven hosts.
//!
//! ## Workflow
//!
//! 1) Build a [`DwellTracker`](crate::tracker::DwellTracker) over your scheduler
//!    and install a dwell callback.
//! 2) Wrap — pass the children to [`DwellTracker::wrap`](crate::tracker::DwellTracker::wrap)
//!    on every redraw and present the returned children. Wrappers are reused while
//!    a child's payload and handlers keep their identity.
//! 3) Dispatch — deliver pointer-enter/leave to the wrapped handlers, directly or
//!    via [`HoverState`](crate::hover::HoverState).
//! 4) Tick — let the scheduler run due timers; dwells are reported through the
//!    callback.
//!
//! ```
//! use core::cell::Cell;
//! use core::time::Duration;
//! use std::rc::Rc;
//! use understory_dwell::attrs::Attributes;
//! use understory_dwell::child::Child;
//! use understory_dwell::pointer::PointerEvent;
//! use understory_dwell::timer::ManualScheduler;
//! use understory_dwell::tracker::DwellTracker;
//!
//! let timers = Rc::new(ManualScheduler::new());
//! let dwells = Rc::new(Cell::new(0));
//! let n = dwells.clone();
//! let mut tracker: DwellTracker<ManualScheduler> =
//!     DwellTracker::new(timers.clone())
//!         .on_dwell(move |_: &PointerEvent, _: &Attributes| n.set(n.get() + 1));
//!
//! let children = [Child::new(Attributes::new().with("id", "open"))];
//! let wrapped = tracker.wrap(&children);
//!
//! // A transient hover does nothing.
//! wrapped[0].pointer_enter(&PointerEvent::default());
//! timers.advance(Duration::from_millis(100));
//! wrapped[0].pointer_leave(&PointerEvent::default());
//! timers.advance(Duration::from_secs(1));
//! assert_eq!(dwells.get(), 0);
//!
//! // Resting for the default 333 ms is a dwell.
//! wrapped[0].pointer_enter(&PointerEvent::default());
//! timers.advance(Duration::from_millis(333));
//! assert_eq!(dwells.get(), 1);
//! ```
//!
//! ## Pending-timer policy
//!
//! With [`SlotPolicy::PerChild`](crate::config::SlotPolicy::PerChild) every child
//! has its own pending timer and a leave only cancels the leaving child's timer.
//! [`SlotPolicy::Shared`](crate::config::SlotPolicy::Shared) keeps one slot for all
//! children; with overlapping hovers a leave can cancel another child's timer.
//!
//! ## Threading
//!
//! Everything is single-threaded (`Rc`, `RefCell`). Timers are the only
//! suspension points.
//!
//! ## Logging
//!
//! Arm, cancel, and wrapper rebuilds are reported at `trace` level through the
//! [`log`] facade, and fired dwells at `debug`. Install any `log` backend to see
//! them.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod attrs;
pub mod child;
pub mod config;
pub mod error;
pub mod hover;
pub mod pointer;
pub mod timer;
pub mod tracker;
