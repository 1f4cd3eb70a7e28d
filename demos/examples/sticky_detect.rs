// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge machines without any observer plumbing.
//!
//! Feeds hand-written notifications to the top and bottom machines and prints
//! the transitions they classify.
//!
//! Run:
//! - `cargo run -p understory_sticky_demos --example sticky_detect`

use kurbo::Rect;
use understory_sticky::detect::EdgeMachine;
use understory_sticky::types::{Edge, Notification, PinState, TransitionKind};

fn note(top: f64, bottom: f64, ratio: f64) -> Notification<&'static str> {
    Notification {
        target: "sentinel",
        bounding_rect: Rect::new(0.0, top, 320.0, bottom),
        root_bounds: Rect::new(0.0, 0.0, 320.0, 500.0),
        intersection_ratio: ratio,
    }
}

fn main() {
    let mut top = EdgeMachine::new(Edge::Top);
    let top_events = [
        top.step(&note(590.0, 600.0, 0.0)),
        top.step(&note(-20.0, -10.0, 0.0)),
        top.step(&note(40.0, 50.0, 1.0)),
    ];
    println!("== Top edge ==\n  {top_events:?}");
    assert_eq!(
        top_events,
        [None, Some(TransitionKind::Stuck), Some(TransitionKind::Unstuck)]
    );

    let mut bottom = EdgeMachine::new(Edge::Bottom);
    let bottom_events = [
        bottom.step(&note(0.0, 10.0, 1.0)),
        bottom.step(&note(-5.0, 100.0, 0.95)),
    ];
    println!("== Bottom edge ==\n  {bottom_events:?}");
    assert_eq!(
        bottom_events,
        [Some(TransitionKind::Stuck), Some(TransitionKind::Unstuck)]
    );
    assert_eq!(bottom.state(), PinState::Normal);
}
