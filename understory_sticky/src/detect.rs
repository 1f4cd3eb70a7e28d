// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge state machines: classify intersection notifications as stuck/unstuck.
//!
//! ## Overview
//!
//! Each section runs two independent machines, one per sentinel. Both have the
//! states [`PinState::Normal`] and [`PinState::Pinned`] and are driven by pure
//! transition functions, so they can be exercised without any observer plumbing.
//!
//! - The top machine is observed with [`TOP_THRESHOLDS`] (fully out vs any overlap).
//! - The bottom machine is observed with [`BOTTOM_THRESHOLDS`] (fully contained).
//!
//! Every notification that matches a rule produces an event, including one that
//! confirms the current state: hosts only notify on threshold crossings, and the
//! first notification after `observe` reports the initial geometry.
//! Notifications that match no rule leave the state untouched.
//!
//! There is no ordering guarantee between the two sentinels of one section; the
//! machines never look at each other.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Rect;
//! use understory_sticky::detect::EdgeMachine;
//! use understory_sticky::types::{Edge, Notification, PinState, TransitionKind};
//!
//! let mut top = EdgeMachine::new(Edge::Top);
//! let n = Notification {
//!     target: 7_u32,
//!     bounding_rect: Rect::new(0.0, -30.0, 100.0, -10.0),
//!     root_bounds: Rect::new(0.0, 0.0, 100.0, 500.0),
//!     intersection_ratio: 0.0,
//! };
//! assert_eq!(top.step(&n), Some(TransitionKind::Stuck));
//! assert_eq!(top.state(), PinState::Pinned);
//! ```

use crate::types::{Edge, Notification, PinState, TransitionKind};

/// Thresholds the top sentinel is observed with.
pub const TOP_THRESHOLDS: [f64; 1] = [0.0];

/// Thresholds the bottom sentinel is observed with.
pub const BOTTOM_THRESHOLDS: [f64; 1] = [1.0];

/// Returns the observation thresholds for `edge`.
pub const fn thresholds(edge: Edge) -> &'static [f64] {
    match edge {
        Edge::Top => &TOP_THRESHOLDS,
        Edge::Bottom => &BOTTOM_THRESHOLDS,
    }
}

/// Result of one transition: the next state and the event to emit, if any.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// State after the notification.
    pub state: PinState,
    /// Event to emit for this notification.
    pub event: Option<TransitionKind>,
}

impl Step {
    const fn hold(state: PinState) -> Self {
        Self { state, event: None }
    }

    const fn emit(kind: TransitionKind) -> Self {
        Self {
            state: kind.state(),
            event: Some(kind),
        }
    }
}

/// Top-edge transition.
///
/// - `Stuck` when the sentinel's bottom edge is above the container's visible top.
/// - `Unstuck` when the sentinel's bottom edge is inside the visible band
///   (`root.top <= bottom < root.bottom`).
/// - Otherwise no event (for example the sentinel is still below the visible area).
pub fn top_edge<E>(state: PinState, n: &Notification<E>) -> Step {
    let target = n.bounding_rect;
    let root = n.root_bounds;
    if target.y1 < root.y0 {
        Step::emit(TransitionKind::Stuck)
    } else if root.y0 <= target.y1 && target.y1 < root.y1 {
        Step::emit(TransitionKind::Unstuck)
    } else {
        Step::hold(state)
    }
}

/// Bottom-edge transition.
///
/// - `Stuck` when the sentinel is fully visible and its bottom edge is below the
///   container's visible top.
/// - `Unstuck` when the sentinel's top has left through the container's top while
///   its bottom is still inside the visible band.
///
/// The rules overlap for some geometries; the `Stuck` rule is checked first and
/// at most one event is produced per notification.
pub fn bottom_edge<E>(state: PinState, n: &Notification<E>) -> Step {
    let target = n.bounding_rect;
    let root = n.root_bounds;
    if target.y1 > root.y0 && n.intersection_ratio >= 1.0 {
        Step::emit(TransitionKind::Stuck)
    } else if target.y0 < root.y0 && target.y1 < root.y1 {
        Step::emit(TransitionKind::Unstuck)
    } else {
        Step::hold(state)
    }
}

/// Dispatches to [`top_edge`] or [`bottom_edge`].
pub fn transition<E>(edge: Edge, state: PinState, n: &Notification<E>) -> Step {
    match edge {
        Edge::Top => top_edge(state, n),
        Edge::Bottom => bottom_edge(state, n),
    }
}

/// A single edge machine holding its current [`PinState`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeMachine {
    edge: Edge,
    state: PinState,
}

impl EdgeMachine {
    /// Create a machine in the [`PinState::Normal`] state.
    pub const fn new(edge: Edge) -> Self {
        Self {
            edge,
            state: PinState::Normal,
        }
    }

    /// The edge this machine classifies.
    pub const fn edge(&self) -> Edge {
        self.edge
    }

    /// Current state.
    pub const fn state(&self) -> PinState {
        self.state
    }

    /// Feed one notification and return the event it produces, if any.
    pub fn step<E>(&mut self, n: &Notification<E>) -> Option<TransitionKind> {
        let step = transition(self.edge, self.state, n);
        self.state = step.state;
        step.event
    }

    /// Return to [`PinState::Normal`] without emitting anything.
    pub fn reset(&mut self) {
        self.state = PinState::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    const ROOT: Rect = Rect::new(0.0, 0.0, 300.0, 500.0);

    fn note(top: f64, bottom: f64, ratio: f64) -> Notification<u32> {
        Notification {
            target: 1,
            bounding_rect: Rect::new(0.0, top, 300.0, bottom),
            root_bounds: ROOT,
            intersection_ratio: ratio,
        }
    }

    #[test]
    fn top_sentinel_above_root_is_stuck() {
        let step = top_edge(PinState::Normal, &note(-30.0, -10.0, 0.0));
        assert_eq!(step.event, Some(TransitionKind::Stuck));
        assert_eq!(step.state, PinState::Pinned);
    }

    #[test]
    fn top_sentinel_back_in_band_is_unstuck() {
        let step = top_edge(PinState::Pinned, &note(30.0, 50.0, 1.0));
        assert_eq!(step.event, Some(TransitionKind::Unstuck));
        assert_eq!(step.state, PinState::Normal);
    }

    #[test]
    fn top_sentinel_touching_root_top_is_unstuck() {
        let step = top_edge(PinState::Pinned, &note(-20.0, 0.0, 0.0));
        assert_eq!(step.event, Some(TransitionKind::Unstuck));
    }

    #[test]
    fn top_sentinel_below_root_is_ignored() {
        for state in [PinState::Normal, PinState::Pinned] {
            let step = top_edge(state, &note(580.0, 600.0, 0.0));
            assert_eq!(step.event, None);
            assert_eq!(step.state, state);
        }
    }

    #[test]
    fn top_sentinel_at_root_bottom_is_ignored() {
        let step = top_edge(PinState::Normal, &note(480.0, 500.0, 1.0));
        assert_eq!(step.event, None);
    }

    #[test]
    fn bottom_sentinel_fully_visible_is_stuck() {
        let step = bottom_edge(PinState::Normal, &note(0.0, 10.0, 1.0));
        assert_eq!(step.event, Some(TransitionKind::Stuck));
        assert_eq!(step.state, PinState::Pinned);
    }

    #[test]
    fn bottom_sentinel_leaving_through_top_is_unstuck() {
        let step = bottom_edge(PinState::Pinned, &note(-5.0, 100.0, 0.95));
        assert_eq!(step.event, Some(TransitionKind::Unstuck));
        assert_eq!(step.state, PinState::Normal);
    }

    #[test]
    fn bottom_rules_overlap_prefers_stuck() {
        // Satisfies both rules: fully visible and top above the root's top.
        let step = bottom_edge(PinState::Normal, &note(-5.0, 100.0, 1.0));
        assert_eq!(step.event, Some(TransitionKind::Stuck));
    }

    #[test]
    fn bottom_sentinel_partially_below_is_ignored() {
        let step = bottom_edge(PinState::Pinned, &note(480.0, 520.0, 0.5));
        assert_eq!(step.event, None);
        assert_eq!(step.state, PinState::Pinned);
    }

    #[test]
    fn machine_tracks_state_across_steps() {
        let mut m = EdgeMachine::new(Edge::Top);
        assert_eq!(m.step(&note(580.0, 600.0, 0.0)), None);
        assert_eq!(m.state(), PinState::Normal);
        assert_eq!(m.step(&note(-30.0, -10.0, 0.0)), Some(TransitionKind::Stuck));
        assert_eq!(m.state(), PinState::Pinned);
        assert_eq!(m.step(&note(30.0, 50.0, 1.0)), Some(TransitionKind::Unstuck));
        assert_eq!(m.state(), PinState::Normal);
        m.step(&note(-30.0, -10.0, 0.0));
        m.reset();
        assert_eq!(m.state(), PinState::Normal);
    }

    #[test]
    fn thresholds_per_edge() {
        assert_eq!(thresholds(Edge::Top), &[0.0]);
        assert_eq!(thresholds(Edge::Bottom), &[1.0]);
    }
}
