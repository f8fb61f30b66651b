// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell tracker implementation.
//!
//! ## Overview
//!
//! [`DwellTracker::wrap`] takes the children a host is about to present and
//! returns copies whose pointer-enter and pointer-leave slots hold generated
//! wrappers. Everything else about a child (its payload and payload identity)
//! is passed through untouched, and the caller's descriptors are never mutated.
//!
//! ## Enter and leave
//!
//! - Enter: schedule a one-shot timer for the configured dwelling time, record
//!   it as pending, then call the child's own enter handler (if any) with the
//!   same event.
//! - Leave: cancel the pending timer, then call the child's own leave handler
//!   (if any).
//! - Fire: the timer clears its pending entry and calls the dwell callback with
//!   the triggering event and the child's payload.
//!
//! Per child this is `Idle --enter--> Armed --leave--> Idle` and
//! `Armed --fire--> Idle`. Dwelling is measured from pointer-enter only;
//! pointer movement inside a child does not restart it.
//!
//! ## Pending timers
//!
//! [`SlotPolicy`] decides what "the pending timer" means. With
//! [`SlotPolicy::PerChild`] (the default) each child owns its own
//! entry, and a repeated enter on the same child cancels that child's earlier
//! timer. With [`SlotPolicy::Shared`] a single slot is overwritten by every
//! enter and emptied by every leave, so overlapping hovers across children can
//! cancel the wrong timer. See [`SlotPolicy::Shared`] for the exact sequence.
//!
//! ## Memoization
//!
//! A child's identity is its payload `Rc` together with its original handlers.
//! Wrappers are cached per identity and follow the child when it moves within
//! the slice, so pending timers follow it too. A child that disappears from
//! the slice, or whose payload or handlers are replaced, counts as unwrapped
//! and its pending timer is cancelled.
//!
//! ## Teardown
//!
//! Dropping the tracker cancels every timer still scheduled, including ones
//! overwritten in a [`SlotPolicy::Shared`] slot. Wrappers that outlive the
//! tracker keep chaining to the original handlers but no longer arm timers.
//!
//! ## Re-entrancy
//!
//! No internal borrow is held while the dwell callback or a chained handler
//! runs, so they may freely call back into wrapped handlers.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::time::Duration;

use log::{debug, trace};

use crate::attrs::Attributes;
use crate::child::{Child, Handler, same_handler};
use crate::config::{DwellConfig, SlotPolicy};
use crate::pointer::PointerEvent;
use crate::timer::Scheduler;

type DwellFn<E, A> = Rc<dyn Fn(&E, &A)>;

#[derive(Clone, Copy)]
struct Armed<H> {
    key: u64,
    token: u64,
    handle: H,
}

enum Slots<H> {
    /// The slot a leave empties, plus every timer still scheduled so teardown
    /// can reach the overwritten ones.
    Shared {
        slot: Option<Armed<H>>,
        live: Vec<Armed<H>>,
    },
    PerChild(BTreeMap<u64, Armed<H>>),
}

impl<H: Copy> Slots<H> {
    fn for_policy(policy: SlotPolicy) -> Self {
        match policy {
            SlotPolicy::PerChild => Self::PerChild(BTreeMap::new()),
            SlotPolicy::Shared => Self::Shared {
                slot: None,
                live: Vec::new(),
            },
        }
    }

    fn policy(&self) -> SlotPolicy {
        match self {
            Self::PerChild(_) => SlotPolicy::PerChild,
            Self::Shared { .. } => SlotPolicy::Shared,
        }
    }

    /// Record a freshly armed timer. Returns a superseded handle the caller must cancel.
    fn insert(&mut self, armed: Armed<H>) -> Option<H> {
        match self {
            // Overwritten, not cancelled.
            Self::Shared { slot, live } => {
                live.push(armed);
                *slot = Some(armed);
                None
            }
            Self::PerChild(map) => map.insert(armed.key, armed).map(|old| old.handle),
        }
    }

    /// Remove the entry a leave on child `key` cancels.
    fn take_for_leave(&mut self, key: u64) -> Option<H> {
        match self {
            Self::Shared { slot, live } => {
                let armed = slot.take()?;
                live.retain(|a| a.token != armed.token);
                Some(armed.handle)
            }
            Self::PerChild(map) => map.remove(&key).map(|a| a.handle),
        }
    }

    /// Remove every timer armed for child `key`.
    fn take_child(&mut self, key: u64) -> Vec<H> {
        match self {
            Self::Shared { slot, live } => {
                if slot.as_ref().is_some_and(|a| a.key == key) {
                    *slot = None;
                }
                let mut taken = Vec::new();
                live.retain(|a| {
                    if a.key == key {
                        taken.push(a.handle);
                        false
                    } else {
                        true
                    }
                });
                taken
            }
            Self::PerChild(map) => map.remove(&key).map(|a| a.handle).into_iter().collect(),
        }
    }

    /// Forget a timer that just fired, unless the entry was already replaced.
    fn release(&mut self, key: u64, token: u64) {
        match self {
            Self::Shared { slot, live } => {
                if slot.as_ref().is_some_and(|a| a.token == token) {
                    *slot = None;
                }
                live.retain(|a| a.token != token);
            }
            Self::PerChild(map) => {
                if map.get(&key).is_some_and(|a| a.token == token) {
                    map.remove(&key);
                }
            }
        }
    }

    fn drain(&mut self) -> Vec<H> {
        match self {
            Self::Shared { slot, live } => {
                *slot = None;
                core::mem::take(live).into_iter().map(|a| a.handle).collect()
            }
            Self::PerChild(map) => core::mem::take(map).into_values().map(|a| a.handle).collect(),
        }
    }

    fn is_armed(&self, key: u64) -> bool {
        match self {
            Self::Shared { slot, .. } => slot.as_ref().is_some_and(|a| a.key == key),
            Self::PerChild(map) => map.contains_key(&key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Shared { slot, .. } => usize::from(slot.is_some()),
            Self::PerChild(map) => map.len(),
        }
    }
}

/// State shared between the tracker, its wrappers, and its scheduled timers.
struct Inner<S: Scheduler, E, A> {
    scheduler: Rc<S>,
    dwelling_time: Cell<Duration>,
    on_dwell: RefCell<DwellFn<E, A>>,
    slots: RefCell<Slots<S::Handle>>,
    next_token: Cell<u64>,
}

impl<S: Scheduler, E, A> Inner<S, E, A> {
    fn disarm(&self, key: u64) {
        let handle = self.slots.borrow_mut().take_for_leave(key);
        if let Some(handle) = handle {
            trace!("dwell timer {handle:?} cancelled by leave on child #{key}");
            self.scheduler.clear_timeout(handle);
        }
    }

    /// Cancel the timers of a child that is no longer wrapped.
    fn forget(&self, key: u64) {
        let handles = self.slots.borrow_mut().take_child(key);
        for handle in handles {
            trace!("dwell timer {handle:?} cancelled, child #{key} was unwrapped");
            self.scheduler.clear_timeout(handle);
        }
    }

    fn cancel_all(&self) {
        let handles = self.slots.borrow_mut().drain();
        for handle in handles {
            trace!("dwell timer {handle:?} cancelled");
            self.scheduler.clear_timeout(handle);
        }
    }

    fn fire(&self, key: u64, token: u64, event: &E, attrs: &A) {
        self.slots.borrow_mut().release(key, token);
        let on_dwell = self.on_dwell.borrow().clone();
        debug!("dwell on child #{key}");
        on_dwell(event, attrs);
    }
}

impl<S, E, A> Inner<S, E, A>
where
    S: Scheduler + 'static,
    E: Clone + 'static,
    A: 'static,
{
    fn arm(self: &Rc<Self>, key: u64, attrs: &Rc<A>, event: &E) {
        let token = self.next_token.get();
        self.next_token.set(token.wrapping_add(1));

        let delay = self.dwelling_time.get();
        let weak: Weak<Self> = Rc::downgrade(self);
        let attrs = attrs.clone();
        let event = event.clone();
        let handle = self.scheduler.set_timeout(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire(key, token, &event, &attrs);
                }
            }),
        );
        trace!("dwell timer {handle:?} armed for child #{key} ({delay:?})");

        let superseded = self.slots.borrow_mut().insert(Armed { key, token, handle });
        if let Some(old) = superseded {
            trace!("dwell timer {old:?} superseded by re-enter on child #{key}");
            self.scheduler.clear_timeout(old);
        }
    }
}

/// Cached wrappers for one child.
struct Wrapped<E, A> {
    /// Stable identity of the child; pending timers are keyed by it.
    key: u64,
    attrs: Rc<A>,
    enter: Option<Handler<E>>,
    leave: Option<Handler<E>>,
    wrapped_enter: Handler<E>,
    wrapped_leave: Handler<E>,
}

impl<E, A> Wrapped<E, A> {
    fn matches(&self, child: &Child<E, A>) -> bool {
        Rc::ptr_eq(&self.attrs, &child.attrs)
            && same_handler(&self.enter, &child.on_pointer_enter)
            && same_handler(&self.leave, &child.on_pointer_leave)
    }

    fn apply(&self, child: &Child<E, A>) -> Child<E, A> {
        Child {
            attrs: child.attrs.clone(),
            on_pointer_enter: Some(self.wrapped_enter.clone()),
            on_pointer_leave: Some(self.wrapped_leave.clone()),
        }
    }
}

/// Detects pointer dwell over a set of children.
///
/// ## Usage
///
/// - Construct with [`DwellTracker::new`] (default [`DwellConfig`]) or
///   [`DwellTracker::with_config`], handing over the host's [`Scheduler`].
/// - Install the dwell callback with [`DwellTracker::on_dwell`] or
///   [`DwellTracker::set_on_dwell`]. Without one, dwells are detected and
///   dropped.
/// - Call [`DwellTracker::wrap`] whenever the children are (re)built and
///   present the returned children instead of the originals.
///
/// ```
/// use core::cell::RefCell;
/// use core::time::Duration;
/// use std::rc::Rc;
/// use understory_dwell::attrs::Attributes;
/// use understory_dwell::child::Child;
/// use understory_dwell::config::DwellConfig;
/// use understory_dwell::pointer::PointerEvent;
/// use understory_dwell::timer::ManualScheduler;
/// use understory_dwell::tracker::DwellTracker;
///
/// let timers = Rc::new(ManualScheduler::new());
/// let dwelled = Rc::new(RefCell::new(Vec::new()));
/// let sink = dwelled.clone();
/// let config = DwellConfig::new().with_dwelling_time(Duration::from_millis(500));
/// let mut tracker: DwellTracker<ManualScheduler> = DwellTracker::with_config(timers.clone(), config)
///     .on_dwell(move |_event: &PointerEvent, attrs: &Attributes| sink.borrow_mut().push(attrs.clone()));
///
/// let child = Child::new(Attributes::new().with("aKey", "aValue"));
/// let wrapped = tracker.wrap(core::slice::from_ref(&child));
///
/// wrapped[0].pointer_enter(&PointerEvent::default());
/// timers.advance(Duration::from_millis(500));
/// assert_eq!(*dwelled.borrow(), [Attributes::new().with("aKey", "aValue")]);
/// ```
pub struct DwellTracker<S: Scheduler, E = PointerEvent, A = Attributes> {
    inner: Rc<Inner<S, E, A>>,
    /// Wrappers in the order of the last [`wrap`](Self::wrap).
    cache: Vec<Wrapped<E, A>>,
    next_key: u64,
}

impl<S: Scheduler, E, A> core::fmt::Debug for DwellTracker<S, E, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DwellTracker")
            .field("dwelling_time", &self.inner.dwelling_time.get())
            .field("slots", &self.inner.slots.borrow().policy())
            .field("armed", &self.inner.slots.borrow().len())
            .field("wrapped", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<S, E, A> DwellTracker<S, E, A>
where
    S: Scheduler + 'static,
    E: Clone + 'static,
    A: 'static,
{
    /// Create a tracker with the default configuration and a no-op dwell callback.
    pub fn new(scheduler: Rc<S>) -> Self {
        Self::with_config(scheduler, DwellConfig::default())
    }

    /// Create a tracker with an explicit configuration.
    pub fn with_config(scheduler: Rc<S>, config: DwellConfig) -> Self {
        let noop: DwellFn<E, A> = Rc::new(|_: &E, _: &A| {});
        Self {
            inner: Rc::new(Inner {
                scheduler,
                dwelling_time: Cell::new(config.dwelling_time),
                on_dwell: RefCell::new(noop),
                slots: RefCell::new(Slots::for_policy(config.slots)),
                next_token: Cell::new(0),
            }),
            cache: Vec::new(),
            next_key: 0,
        }
    }

    /// Builder form of [`set_on_dwell`](Self::set_on_dwell).
    pub fn on_dwell(self, callback: impl Fn(&E, &A) + 'static) -> Self {
        self.set_on_dwell(callback);
        self
    }

    /// Replace the dwell callback.
    ///
    /// Takes effect for every timer that fires afterwards, including ones
    /// already armed. Existing wrappers stay valid.
    pub fn set_on_dwell(&self, callback: impl Fn(&E, &A) + 'static) {
        let callback: DwellFn<E, A> = Rc::new(callback);
        *self.inner.on_dwell.borrow_mut() = callback;
    }

    /// Produce wrapped copies of `children`, in order.
    ///
    /// Each returned child shares its payload `Rc` with the input and has both
    /// handler slots filled with generated wrappers. A single child can be
    /// passed with [`core::slice::from_ref`].
    ///
    /// A child keeps its identity, and with it any pending timer, as long as
    /// its payload `Rc` and original handlers stay the same, wherever it moves
    /// in the slice. Children from the previous call that are not matched again
    /// have their pending timers cancelled.
    pub fn wrap(&mut self, children: &[Child<E, A>]) -> Vec<Child<E, A>> {
        let mut previous: Vec<Option<Wrapped<E, A>>> =
            core::mem::take(&mut self.cache).into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            let reused = find_reusable(&previous, index, child).and_then(|at| previous[at].take());
            let wrapped = match reused {
                Some(wrapped) => {
                    trace!("reusing dwell wrappers of child #{} at {index}", wrapped.key);
                    wrapped
                }
                None => {
                    let key = self.next_key;
                    self.next_key = key.wrapping_add(1);
                    trace!("building dwell wrappers of child #{key} at {index}");
                    self.build(key, child)
                }
            };
            out.push(wrapped.apply(child));
            self.cache.push(wrapped);
        }
        for stale in previous.into_iter().flatten() {
            self.inner.forget(stale.key);
        }
        out
    }

    fn build(&self, key: u64, child: &Child<E, A>) -> Wrapped<E, A> {
        let enter = {
            let weak = Rc::downgrade(&self.inner);
            let attrs = child.attrs.clone();
            let original = child.on_pointer_enter.clone();
            Rc::new(move |event: &E| {
                if let Some(inner) = weak.upgrade() {
                    inner.arm(key, &attrs, event);
                }
                if let Some(h) = &original {
                    h(event);
                }
            }) as Handler<E>
        };
        let leave = {
            let weak = Rc::downgrade(&self.inner);
            let original = child.on_pointer_leave.clone();
            Rc::new(move |event: &E| {
                if let Some(inner) = weak.upgrade() {
                    inner.disarm(key);
                }
                if let Some(h) = &original {
                    h(event);
                }
            }) as Handler<E>
        };
        Wrapped {
            key,
            attrs: child.attrs.clone(),
            enter: child.on_pointer_enter.clone(),
            leave: child.on_pointer_leave.clone(),
            wrapped_enter: enter,
            wrapped_leave: leave,
        }
    }
}

/// Cache slot to reuse for `child`, preferring the one at the same position.
fn find_reusable<E, A>(
    previous: &[Option<Wrapped<E, A>>],
    index: usize,
    child: &Child<E, A>,
) -> Option<usize> {
    let fits = |w: &Option<Wrapped<E, A>>| w.as_ref().is_some_and(|w| w.matches(child));
    if previous.get(index).is_some_and(fits) {
        return Some(index);
    }
    previous.iter().position(fits)
}

impl<S: Scheduler, E, A> DwellTracker<S, E, A> {
    /// Current configuration.
    pub fn config(&self) -> DwellConfig {
        DwellConfig {
            dwelling_time: self.inner.dwelling_time.get(),
            slots: self.inner.slots.borrow().policy(),
        }
    }

    /// Change the dwelling time used by subsequent enters.
    ///
    /// Timers that are already armed keep their original deadline.
    pub fn set_dwelling_time(&self, dwelling_time: Duration) {
        self.inner.dwelling_time.set(dwelling_time);
    }

    /// Change the pending-timer policy.
    ///
    /// Switching to a different policy cancels every pending timer first.
    pub fn set_slot_policy(&self, policy: SlotPolicy) {
        if self.inner.slots.borrow().policy() == policy {
            return;
        }
        self.inner.cancel_all();
        *self.inner.slots.borrow_mut() = Slots::for_policy(policy);
    }

    /// Whether a leave on the child at `index` of the last
    /// [`wrap`](Self::wrap) would cancel a pending timer.
    pub fn is_armed(&self, index: usize) -> bool {
        self.cache
            .get(index)
            .is_some_and(|w| self.inner.slots.borrow().is_armed(w.key))
    }

    /// Number of pending timers a leave could cancel.
    ///
    /// Under [`SlotPolicy::Shared`] this is at most one, even when overwritten
    /// timers are still scheduled. [`cancel_all`](Self::cancel_all) and drop
    /// reach those too.
    pub fn armed_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    /// Cancel every pending timer, including ones overwritten in a shared slot.
    pub fn cancel_all(&self) {
        self.inner.cancel_all();
    }

    /// The scheduler timers are armed on.
    pub fn scheduler(&self) -> &Rc<S> {
        &self.inner.scheduler
    }
}

impl<S: Scheduler, E, A> Drop for DwellTracker<S, E, A> {
    fn drop(&mut self) {
        self.inner.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualScheduler;
    use alloc::vec;
    use kurbo::Point;

    type Calls = Rc<RefCell<Vec<(PointerEvent, Attributes)>>>;

    const DWELLING_TIME: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn setup(slots: SlotPolicy) -> (Rc<ManualScheduler>, DwellTracker<ManualScheduler>, Calls) {
        let timers = Rc::new(ManualScheduler::new());
        let calls: Calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let config = DwellConfig::new()
            .with_dwelling_time(DWELLING_TIME)
            .with_slots(slots);
        let tracker = DwellTracker::with_config(timers.clone(), config)
            .on_dwell(move |e: &PointerEvent, a: &Attributes| sink.borrow_mut().push((*e, a.clone())));
        (timers, tracker, calls)
    }

    fn attrs(value: &str) -> Attributes {
        Attributes::new().with("aKey", value)
    }

    fn child(value: &str) -> Child<PointerEvent, Attributes> {
        Child::new(attrs(value))
    }

    fn ev(x: f64) -> PointerEvent {
        PointerEvent::at(Point::new(x, 0.0))
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&PointerEvent) + 'static) {
        let n = Rc::new(Cell::new(0));
        let m = n.clone();
        (n, move |_: &PointerEvent| m.set(m.get() + 1))
    }

    #[test]
    fn dwell_fires_after_dwelling_time() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(1.0));
        assert!(tracker.is_armed(0));
        timers.advance(DWELLING_TIME);

        assert_eq!(*calls.borrow(), vec![(ev(1.0), attrs("aValue"))]);
        assert!(!tracker.is_armed(0));
    }

    #[test]
    fn no_dwell_before_dwelling_time() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(DWELLING_TIME / 2);
        assert!(calls.borrow().is_empty());
        timers.advance(DWELLING_TIME / 2 - ms(1));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn fires_exactly_once() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(DWELLING_TIME);
        timers.advance(DWELLING_TIME * 4);
        // A late leave is a no-op.
        wrapped[0].pointer_leave(&ev(0.0));
        timers.run_until_idle();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn leave_before_threshold_cancels() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(ms(250));
        wrapped[0].pointer_leave(&ev(0.0));
        timers.run_until_idle();

        assert!(calls.borrow().is_empty());
        assert_eq!(timers.pending(), 0);
        assert_eq!(tracker.armed_count(), 0);
    }

    #[test]
    fn immediate_leave_cancels() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::Shared);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[0].pointer_leave(&ev(0.0));
        timers.run_until_idle();
        assert!(calls.borrow().is_empty());
    }

    // Each hover interval is judged on its own: a short one followed by a long one fires once.
    #[test]
    fn short_then_long_hover_on_same_child() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(1.0));
        timers.advance(ms(400));
        wrapped[0].pointer_leave(&ev(1.0));
        wrapped[0].pointer_enter(&ev(2.0));
        timers.advance(ms(400));
        assert!(calls.borrow().is_empty());
        timers.advance(ms(100));
        assert_eq!(*calls.borrow(), vec![(ev(2.0), attrs("aValue"))]);
    }

    #[test]
    fn original_handlers_are_chained() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let (entered, on_enter) = counter();
        let (left, on_leave) = counter();
        let c = child("aValue")
            .with_pointer_enter(on_enter)
            .with_pointer_leave(on_leave);
        let wrapped = tracker.wrap(&[c]);

        // Without a dwell.
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[0].pointer_leave(&ev(0.0));
        assert_eq!((entered.get(), left.get()), (1, 1));

        // With a dwell.
        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(DWELLING_TIME);
        wrapped[0].pointer_leave(&ev(0.0));
        assert_eq!((entered.get(), left.get()), (2, 2));
        assert_eq!(calls.borrow().len(), 1);
    }

    // The child's own enter handler runs after the timer is armed.
    #[test]
    fn enter_handler_sees_armed_timer() {
        let timers = Rc::new(ManualScheduler::new());
        let mut tracker: DwellTracker<ManualScheduler> = DwellTracker::new(timers.clone());
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let t = timers.clone();
        let c = child("x").with_pointer_enter(move |_| s.set(t.pending()));
        let wrapped = tracker.wrap(&[c]);
        wrapped[0].pointer_enter(&ev(0.0));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn default_callback_is_inert() {
        let timers = Rc::new(ManualScheduler::new());
        let mut tracker: DwellTracker<ManualScheduler> = DwellTracker::new(timers.clone());
        let (entered, on_enter) = counter();
        let wrapped = tracker.wrap(&[child("aValue").with_pointer_enter(on_enter)]);

        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[0].pointer_leave(&ev(0.0));
        wrapped[0].pointer_enter(&ev(0.0));
        assert_eq!(timers.advance(Duration::from_millis(333)), 1);
        assert_eq!(entered.get(), 2);
    }

    #[test]
    fn sequential_dwells_carry_each_childs_attributes() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::Shared);
        let wrapped = tracker.wrap(&[child("childOne"), child("childTwo")]);

        wrapped[0].pointer_enter(&ev(1.0));
        timers.advance(DWELLING_TIME);
        wrapped[0].pointer_leave(&ev(1.0));
        wrapped[1].pointer_enter(&ev(2.0));
        timers.advance(DWELLING_TIME);

        assert_eq!(
            *calls.borrow(),
            vec![(ev(1.0), attrs("childOne")), (ev(2.0), attrs("childTwo"))]
        );
    }

    #[test]
    fn only_dwelled_hovers_fire() {
        for policy in [SlotPolicy::PerChild, SlotPolicy::Shared] {
            let (timers, mut tracker, calls) = setup(policy);
            let wrapped = tracker.wrap(&[child("childOne"), child("childTwo")]);

            wrapped[0].pointer_enter(&ev(1.0));
            wrapped[0].pointer_leave(&ev(1.0));
            wrapped[1].pointer_enter(&ev(2.0));
            timers.advance(DWELLING_TIME);

            assert_eq!(
                *calls.borrow(),
                vec![(ev(2.0), attrs("childTwo"))],
                "policy {policy:?}"
            );
        }
    }

    // Overlapping hovers with a single shared slot: leaving A cancels B's timer, A still fires.
    #[test]
    fn shared_slot_overlap_cancels_last_armed() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::Shared);
        let wrapped = tracker.wrap(&[child("childOne"), child("childTwo")]);

        wrapped[0].pointer_enter(&ev(1.0));
        wrapped[1].pointer_enter(&ev(2.0));
        assert!(!tracker.is_armed(0));
        assert!(tracker.is_armed(1));
        assert_eq!(tracker.armed_count(), 1);
        assert_eq!(timers.pending(), 2);

        wrapped[0].pointer_leave(&ev(1.0));
        timers.advance(DWELLING_TIME);

        assert_eq!(*calls.borrow(), vec![(ev(1.0), attrs("childOne"))]);
    }

    #[test]
    fn per_child_overlap_cancels_own_timer() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("childOne"), child("childTwo")]);

        wrapped[0].pointer_enter(&ev(1.0));
        wrapped[1].pointer_enter(&ev(2.0));
        assert_eq!(tracker.armed_count(), 2);

        wrapped[0].pointer_leave(&ev(1.0));
        timers.advance(DWELLING_TIME);

        assert_eq!(*calls.borrow(), vec![(ev(2.0), attrs("childTwo"))]);
    }

    #[test]
    fn per_child_reenter_replaces_pending_timer() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("aValue")]);

        wrapped[0].pointer_enter(&ev(1.0));
        timers.advance(ms(300));
        wrapped[0].pointer_enter(&ev(2.0));
        assert_eq!(timers.pending(), 1);
        timers.advance(ms(300));
        assert!(calls.borrow().is_empty());
        timers.advance(ms(200));
        assert_eq!(*calls.borrow(), vec![(ev(2.0), attrs("aValue"))]);
    }

    #[test]
    fn wrap_preserves_order_and_identity() {
        let (_timers, mut tracker, _calls) = setup(SlotPolicy::PerChild);
        let children = vec![child("a"), child("b"), child("c")];
        let wrapped = tracker.wrap(&children);

        assert_eq!(wrapped.len(), 3);
        for (orig, w) in children.iter().zip(&wrapped) {
            assert!(Rc::ptr_eq(&orig.attrs, &w.attrs));
            assert!(w.on_pointer_enter.is_some());
            assert!(w.on_pointer_leave.is_some());
        }
        // Inputs are untouched.
        assert!(children.iter().all(|c| c.on_pointer_enter.is_none()));
        assert!(tracker.wrap(&[]).is_empty());
    }

    #[test]
    fn wrappers_are_memoized_by_identity() {
        let (_timers, mut tracker, _calls) = setup(SlotPolicy::PerChild);
        let a = child("a");
        let b = child("b");
        let first = tracker.wrap(&[a.clone(), b.clone()]);
        let second = tracker.wrap(&[a.clone(), b.clone()]);
        let same = |x: &Child<PointerEvent, Attributes>, y: &Child<PointerEvent, Attributes>| {
            same_handler(&x.on_pointer_enter, &y.on_pointer_enter)
                && same_handler(&x.on_pointer_leave, &y.on_pointer_leave)
        };
        assert!(same(&first[0], &second[0]));
        assert!(same(&first[1], &second[1]));

        // Equal contents, new identity: rebuilt.
        let b2 = child("b");
        let third = tracker.wrap(&[a.clone(), b2]);
        assert!(same(&first[0], &third[0]));
        assert!(!same(&first[1], &third[1]));

        // Same payload, new handler: rebuilt.
        let a2 = a.clone().with_pointer_enter(|_| {});
        let fourth = tracker.wrap(&[a2]);
        assert!(!same(&first[0], &fourth[0]));
    }

    // Replacing a child's payload, or dropping the child, unwraps it.
    #[test]
    fn unwrapped_children_lose_their_timers() {
        for policy in [SlotPolicy::PerChild, SlotPolicy::Shared] {
            let (timers, mut tracker, calls) = setup(policy);
            let keep = child("keep");
            let first = tracker.wrap(&[keep.clone(), child("old")]);
            first[1].pointer_enter(&ev(0.0));

            let second = tracker.wrap(&[keep.clone(), child("new")]);
            assert_eq!(timers.pending(), 0, "policy {policy:?}");
            assert!(!tracker.is_armed(1));

            second[1].pointer_enter(&ev(0.0));
            assert_eq!(timers.pending(), 1);
            let _ = tracker.wrap(core::slice::from_ref(&keep));
            assert_eq!(timers.pending(), 0, "policy {policy:?}");
            assert_eq!(tracker.armed_count(), 0);

            timers.run_until_idle();
            assert!(calls.borrow().is_empty(), "policy {policy:?}");
        }
    }

    // The pending timer belongs to the child, not to its position.
    #[test]
    fn reordered_children_keep_their_timers() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let a = child("A");
        let b = child("B");
        let first = tracker.wrap(&[a.clone(), b.clone()]);
        first[0].pointer_enter(&ev(0.0));
        timers.advance(ms(100));

        let second = tracker.wrap(&[b.clone(), a.clone()]);
        assert!(same_handler(&first[0].on_pointer_leave, &second[1].on_pointer_leave));
        assert!(!tracker.is_armed(0));
        assert!(tracker.is_armed(1));
        timers.advance(ms(100));
        second[1].pointer_leave(&ev(0.0));
        timers.advance(ms(1000));

        assert!(calls.borrow().is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn inserted_child_leaves_pending_timer_alone() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let a = child("A");
        let b = child("B");
        let first = tracker.wrap(&[a.clone(), b.clone()]);
        first[0].pointer_enter(&ev(3.0));
        timers.advance(ms(200));

        let second = tracker.wrap(&[child("C"), a.clone(), b.clone()]);
        // A leave on whatever now sits at A's old position is not A's leave.
        second[0].pointer_enter(&ev(4.0));
        second[0].pointer_leave(&ev(4.0));
        timers.advance(ms(300));

        assert_eq!(*calls.borrow(), vec![(ev(3.0), attrs("A"))]);
    }

    // Two entries sharing one payload and handlers are still two children.
    #[test]
    fn duplicate_children_get_separate_wrappers() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let a = child("A");
        let wrapped = tracker.wrap(&[a.clone(), a.clone()]);
        assert!(!same_handler(&wrapped[0].on_pointer_enter, &wrapped[1].on_pointer_enter));

        wrapped[0].pointer_enter(&ev(1.0));
        wrapped[1].pointer_enter(&ev(2.0));
        wrapped[0].pointer_leave(&ev(1.0));
        timers.advance(DWELLING_TIME);
        assert_eq!(*calls.borrow(), vec![(ev(2.0), attrs("A"))]);
    }

    #[test]
    fn drop_cancels_pending_timers() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let (left, on_leave) = counter();
        let wrapped = tracker.wrap(&[child("a").with_pointer_leave(on_leave), child("b")]);
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[1].pointer_enter(&ev(0.0));
        drop(tracker);
        assert_eq!(timers.pending(), 0);

        // Wrappers outliving the tracker only chain.
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[0].pointer_leave(&ev(0.0));
        assert_eq!(left.get(), 1);
        assert_eq!(timers.pending(), 0);
        timers.run_until_idle();
        assert!(calls.borrow().is_empty());
    }

    // Overwriting the shared slot does not hide a timer from teardown.
    #[test]
    fn drop_cancels_overwritten_shared_timers() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::Shared);
        let wrapped = tracker.wrap(&[child("a"), child("b"), child("c")]);
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[1].pointer_enter(&ev(0.0));
        assert_eq!(tracker.armed_count(), 1);
        assert_eq!(timers.pending(), 2);
        drop(tracker);
        assert_eq!(timers.pending(), 0);
        assert_eq!(timers.run_until_idle(), 0);
        assert!(calls.borrow().is_empty());
    }

    // Fired and left timers are pruned, so cancel_all only touches live ones.
    #[test]
    fn shared_cancel_all_after_partial_activity() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::Shared);
        let wrapped = tracker.wrap(&[child("a"), child("b"), child("c")]);
        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(DWELLING_TIME);
        wrapped[1].pointer_enter(&ev(1.0));
        wrapped[2].pointer_enter(&ev(2.0));
        wrapped[1].pointer_leave(&ev(1.0));
        assert_eq!(timers.pending(), 1);

        tracker.cancel_all();
        assert_eq!(timers.pending(), 0);
        timers.run_until_idle();
        assert_eq!(*calls.borrow(), vec![(ev(0.0), attrs("a"))]);
    }

    #[test]
    fn dwelling_time_change_applies_to_next_enter() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("a")]);

        wrapped[0].pointer_enter(&ev(0.0));
        tracker.set_dwelling_time(ms(100));
        assert_eq!(tracker.config().dwelling_time, ms(100));
        timers.advance(ms(100));
        assert!(calls.borrow().is_empty());
        timers.advance(ms(400));
        assert_eq!(calls.borrow().len(), 1);

        wrapped[0].pointer_leave(&ev(0.0));
        wrapped[0].pointer_enter(&ev(0.0));
        timers.advance(ms(100));
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn switching_policy_cancels_pending() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("a"), child("b")]);
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[1].pointer_enter(&ev(0.0));

        tracker.set_slot_policy(SlotPolicy::PerChild);
        assert_eq!(tracker.armed_count(), 2);

        tracker.set_slot_policy(SlotPolicy::Shared);
        assert_eq!(tracker.config().slots, SlotPolicy::Shared);
        assert_eq!(tracker.armed_count(), 0);
        assert_eq!(timers.pending(), 0);
        timers.run_until_idle();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn cancel_all_clears_everything() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let wrapped = tracker.wrap(&[child("a"), child("b")]);
        wrapped[0].pointer_enter(&ev(0.0));
        wrapped[1].pointer_enter(&ev(0.0));
        tracker.cancel_all();
        assert_eq!(tracker.armed_count(), 0);
        timers.run_until_idle();
        assert!(calls.borrow().is_empty());
        assert!(Rc::ptr_eq(tracker.scheduler(), &timers));
    }

    // A chained handler may dispatch straight back into the wrappers.
    #[test]
    fn chained_handler_can_reenter() {
        let (timers, mut tracker, calls) = setup(SlotPolicy::PerChild);
        let leave_slot: Rc<RefCell<Option<Handler<PointerEvent>>>> = Rc::new(RefCell::new(None));
        let ls = leave_slot.clone();
        let c = child("a").with_pointer_enter(move |e| {
            let leave = ls.borrow().clone();
            if let Some(leave) = leave {
                leave(e);
            }
        });
        let wrapped = tracker.wrap(&[c]);
        *leave_slot.borrow_mut() = wrapped[0].on_pointer_leave.clone();

        wrapped[0].pointer_enter(&ev(0.0));
        assert_eq!(tracker.armed_count(), 0);
        timers.run_until_idle();
        assert!(calls.borrow().is_empty());
    }

    // The dwell callback may re-arm the same child.
    #[test]
    fn dwell_callback_can_rearm() {
        let timers = Rc::new(ManualScheduler::new());
        let enter_slot: Rc<RefCell<Option<Handler<PointerEvent>>>> = Rc::new(RefCell::new(None));
        let es = enter_slot.clone();
        let count = Rc::new(Cell::new(0_u32));
        let n = count.clone();
        let mut tracker: DwellTracker<ManualScheduler> = DwellTracker::new(timers.clone())
            .on_dwell(move |e: &PointerEvent, _: &Attributes| {
                n.set(n.get() + 1);
                if n.get() < 3 {
                    let enter = es.borrow().clone();
                    if let Some(enter) = enter {
                        enter(e);
                    }
                }
            });
        let wrapped = tracker.wrap(&[child("a")]);
        *enter_slot.borrow_mut() = wrapped[0].on_pointer_enter.clone();

        wrapped[0].pointer_enter(&ev(0.0));
        assert_eq!(timers.advance(Duration::from_millis(333 * 3)), 3);
        assert_eq!(count.get(), 3);
        assert!(!tracker.is_armed(0));
    }
}
