// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child element descriptors.
//!
//! A [`Child`] pairs a host payload (`A`, shared through an [`Rc`]) with the two
//! handler slots the tracker cares about. The `Rc` pointer of the payload is the
//! child's attribute identity: hand the tracker the same `Rc` on the next redraw
//! and it reuses the wrappers it already built.

use alloc::rc::Rc;

/// Shared pointer handler.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// One wrapped or wrappable child element.
pub struct Child<E, A> {
    /// Host payload for this child; passed to the dwell callback.
    pub attrs: Rc<A>,
    /// Called when the pointer enters the child.
    pub on_pointer_enter: Option<Handler<E>>,
    /// Called when the pointer leaves the child.
    pub on_pointer_leave: Option<Handler<E>>,
}

impl<E, A> Clone for Child<E, A> {
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            on_pointer_enter: self.on_pointer_enter.clone(),
            on_pointer_leave: self.on_pointer_leave.clone(),
        }
    }
}

impl<E, A: core::fmt::Debug> core::fmt::Debug for Child<E, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Child")
            .field("attrs", &self.attrs)
            .field("on_pointer_enter", &self.on_pointer_enter.is_some())
            .field("on_pointer_leave", &self.on_pointer_leave.is_some())
            .finish()
    }
}

impl<E, A> Child<E, A> {
    /// Create a child with no handlers.
    pub fn new(attrs: A) -> Self {
        Self::from_rc(Rc::new(attrs))
    }

    /// Create a child around an existing shared payload.
    pub fn from_rc(attrs: Rc<A>) -> Self {
        Self {
            attrs,
            on_pointer_enter: None,
            on_pointer_leave: None,
        }
    }

    /// Set the pointer-enter handler.
    pub fn with_pointer_enter(mut self, handler: impl Fn(&E) + 'static) -> Self {
        let handler: Handler<E> = Rc::new(handler);
        self.on_pointer_enter = Some(handler);
        self
    }

    /// Set the pointer-leave handler.
    pub fn with_pointer_leave(mut self, handler: impl Fn(&E) + 'static) -> Self {
        let handler: Handler<E> = Rc::new(handler);
        self.on_pointer_leave = Some(handler);
        self
    }

    /// Deliver a pointer-enter to this child's handler, if it has one.
    pub fn pointer_enter(&self, event: &E) {
        if let Some(h) = &self.on_pointer_enter {
            h(event);
        }
    }

    /// Deliver a pointer-leave to this child's handler, if it has one.
    pub fn pointer_leave(&self, event: &E) {
        if let Some(h) = &self.on_pointer_leave {
            h(event);
        }
    }
}

/// Identity comparison for optional handlers.
pub(crate) fn same_handler<E>(a: &Option<Handler<E>>, b: &Option<Handler<E>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}
