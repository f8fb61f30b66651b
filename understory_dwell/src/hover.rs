// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover driver: turn pointer positions into enter/leave calls on children.
//!
//! ## Usage
//!
//! Hosts that already deliver enter/leave to their elements can call the wrapped
//! handlers directly and skip this module. Hosts that only see raw pointer
//! positions can:
//!
//! 1) Keep one [`HoverState`] per pointer surface.
//! 2) On every pointer move, call [`HoverState::pointer_moved`] with the wrapped
//!    children and their world-space bounds (same order as the children).
//! 3) When the pointer leaves the surface, call [`HoverState::pointer_left`].
//!
//! Movement inside the hovered child produces no transitions, so it never
//! restarts a dwell.
//!
//! ## Minimal example
//!
//! ```
//! use understory_dwell::hover::{HoverEvent, HoverState};
//! let mut h = HoverState::new();
//! assert_eq!(h.update(Some(0)), vec![HoverEvent::Enter(0)]);
//! assert!(h.update(Some(0)).is_empty());
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Leave(0), HoverEvent::Enter(2)]);
//! assert_eq!(h.clear(), vec![HoverEvent::Leave(2)]);
//! ```

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::child::Child;
use crate::pointer::PointerEvent;

/// A hover transition, naming a child by its position.
///
/// Returned by [`HoverState::update`]; deliver with [`dispatch`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent {
    /// Pointer enters the child at this position.
    Enter(usize),
    /// Pointer leaves the child at this position.
    Leave(usize),
}

/// Which child, if any, is currently under the pointer.
///
/// When the hovered child changes, the leave for the old child is emitted
/// before the enter for the new one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    current: Option<usize>,
}

impl HoverState {
    /// Create a state with nothing hovered.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Position of the hovered child, if any.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Forget the hovered child, returning its leave event.
    pub fn clear(&mut self) -> Vec<HoverEvent> {
        self.update(None)
    }

    /// Move the hover to `hovered` and return the transitions required.
    pub fn update(&mut self, hovered: Option<usize>) -> Vec<HoverEvent> {
        let mut out = Vec::new();
        if self.current == hovered {
            return out;
        }
        if let Some(old) = self.current {
            out.push(HoverEvent::Leave(old));
        }
        if let Some(new) = hovered {
            out.push(HoverEvent::Enter(new));
        }
        self.current = hovered;
        out
    }

    /// Hit test `event.position` against `bounds`, update the hover, and deliver
    /// the resulting transitions to `children`.
    ///
    /// `bounds[i]` is the world-space box of `children[i]`.
    pub fn pointer_moved<A>(
        &mut self,
        children: &[Child<PointerEvent, A>],
        bounds: &[Rect],
        event: &PointerEvent,
    ) -> Vec<HoverEvent> {
        let hit = hit_test(bounds, event.position);
        let transitions = self.update(hit);
        dispatch(children, &transitions, event);
        transitions
    }

    /// The pointer left the surface: deliver a leave to the hovered child.
    pub fn pointer_left<E, A>(&mut self, children: &[Child<E, A>], event: &E) -> Vec<HoverEvent> {
        let transitions = self.clear();
        dispatch(children, &transitions, event);
        transitions
    }
}

/// Position of the topmost box containing `pt`.
///
/// Later boxes are drawn above earlier ones, so the last match wins.
pub fn hit_test(bounds: &[Rect], pt: Point) -> Option<usize> {
    bounds.iter().rposition(|r| r.contains(pt))
}

/// Deliver transitions to the children they name, in order.
///
/// Positions past the end of `children` are skipped; a host may shrink the
/// child list between a hover and its leave.
pub fn dispatch<E, A>(children: &[Child<E, A>], transitions: &[HoverEvent], event: &E) {
    for t in transitions {
        match *t {
            HoverEvent::Enter(i) => {
                if let Some(c) = children.get(i) {
                    c.pointer_enter(event);
                }
            }
            HoverEvent::Leave(i) => {
                if let Some(c) = children.get(i) {
                    c.pointer_leave(event);
                }
            }
        }
    }
}
