// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types shared by the registry, the detection machines, and the container.
//!
//! ## Overview
//!
//! Element identities are supplied by the embedding toolkit as a generic `E`
//! (a DOM node id, a box tree `NodeId`, an arena index, ...). The crate only
//! needs to copy, order, and print them.

use kurbo::Rect;

/// Which boundary of a section a sentinel guards.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edge {
    /// Leading sentinel, placed before the section's children.
    Top,
    /// Trailing sentinel, placed after the section's children.
    Bottom,
}

impl Edge {
    /// Both edges, top first.
    pub const ALL: [Self; 2] = [Self::Top, Self::Bottom];
}

/// State of one edge machine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum PinState {
    /// The sticky target flows with its section.
    #[default]
    Normal,
    /// The sticky target is pinned to the container edge.
    Pinned,
}

/// Kind of a stuck/unstuck transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TransitionKind {
    /// The sticky target started pinning.
    Stuck,
    /// The sticky target resumed normal flow.
    Unstuck,
}

impl TransitionKind {
    /// The machine state a transition of this kind leads to.
    pub const fn state(self) -> PinState {
        match self {
            Self::Stuck => PinState::Pinned,
            Self::Unstuck => PinState::Normal,
        }
    }
}

/// A transition resolved to the sticky target it concerns.
///
/// Handed to [`Callbacks::on_change`](crate::section::Callbacks::on_change) after the
/// kind-specific callback has run. Never stored by this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TransitionEvent<E> {
    /// Whether the target became stuck or unstuck.
    pub kind: TransitionKind,
    /// The sticky target guarded by the notified sentinel.
    pub target: E,
}

/// A single intersection notification, as delivered by the host.
///
/// Rectangles are in the same coordinate space; `y0` is the top edge and `y1`
/// the bottom edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Notification<E> {
    /// The observed sentinel.
    pub target: E,
    /// The sentinel's bounding rectangle at notification time.
    pub bounding_rect: Rect,
    /// The container's visible bounds at notification time.
    pub root_bounds: Rect,
    /// Fraction of the sentinel that intersects `root_bounds`, in `0.0..=1.0`.
    pub intersection_ratio: f64,
}

/// The two sentinel markers of one section.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SentinelPair<E> {
    /// Sentinel placed before the section's children.
    pub top: E,
    /// Sentinel placed after the section's children.
    pub bottom: E,
}

impl<E: Copy> SentinelPair<E> {
    /// Returns the sentinel guarding `edge`.
    pub const fn get(&self, edge: Edge) -> E {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}

/// Identifier for a section in a [`StickyContainer`](crate::container::StickyContainer).
///
/// A slot index plus a generation counter. Removing a section frees its slot;
/// reusing the slot bumps the generation, so stale ids never alias a live section.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SectionId(pub(crate) u32, pub(crate) u32);

impl SectionId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// Routing key attached to every watcher.
///
/// The host echoes it back with each [`Notification`]. `epoch` changes every time
/// the watcher is re-created, which lets the container drop notifications that
/// were already in flight when a watcher was torn down.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WatchKey {
    /// Section owning the watcher.
    pub section: SectionId,
    /// Which sentinel the watcher observes.
    pub edge: Edge,
    /// Watcher incarnation.
    pub epoch: u32,
}
