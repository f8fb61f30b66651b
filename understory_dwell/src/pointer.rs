// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Default pointer event type.
//!
//! The tracker is generic over the event it forwards; hosts with their own
//! event type can ignore this module. [`PointerEvent`] is what the
//! [`hover`](crate::hover) driver consumes.

use kurbo::Point;

bitflags::bitflags! {
    /// Keyboard modifiers held while the pointer event was produced.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT = 0b0000_0001;
        /// Control key.
        const CTRL  = 0b0000_0010;
        /// Alt / Option key.
        const ALT   = 0b0000_0100;
        /// Meta / Command / Super key.
        const META  = 0b0000_1000;
    }
}

/// A pointer position update in world coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Pointer position.
    pub position: Point,
    /// Modifiers held at the time of the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create an event at `position` with no modifiers.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            modifiers: Modifiers::empty(),
        }
    }

    /// Replace the modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
