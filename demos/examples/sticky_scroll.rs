// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two sticky sections in a simulated scroll container.
//!
//! The host in this example lays out elements on a fixed document, computes
//! intersection ratios against a 400px viewport, and notifies on threshold
//! crossings. Scrolling down and back up prints each stuck/unstuck transition.
//!
//! Run:
//! - `RUST_LOG=understory_sticky=debug cargo run -p understory_sticky_demos --example sticky_scroll`

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_sticky::container::StickyContainer;
use understory_sticky::element::{ElementProps, STYLESHEET};
use understory_sticky::host::{
    Declaration, IntersectionHost, ObserveRequest, ResolvedStyle, StyleHost,
};
use understory_sticky::section::{Callbacks, SectionProps};
use understory_sticky::types::{
    Notification, SentinelPair, TransitionEvent, TransitionKind, WatchKey,
};

const VIEWPORT: f64 = 400.0;
const WIDTH: f64 = 320.0;
const SECTION: f64 = 600.0;
const HEADER: f64 = 48.0;

struct Watch {
    request: ObserveRequest<u32>,
    last_ratio: Option<f64>,
}

#[derive(Default)]
struct ScrollHost {
    layout: BTreeMap<u32, (f64, f64)>,
    styles: BTreeMap<u32, ResolvedStyle>,
    watches: Vec<Option<Watch>>,
}

fn crossed(ratio: f64, threshold: f64) -> bool {
    if threshold == 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

fn intersection_ratio(rect: Rect, root: Rect) -> f64 {
    let overlap = (rect.y1.min(root.y1) - rect.y0.max(root.y0)).max(0.0);
    if rect.height() > 0.0 {
        overlap / rect.height()
    } else {
        0.0
    }
}

impl ScrollHost {
    fn place(&mut self, element: u32, top: f64, bottom: f64) {
        self.layout.insert(element, (top, bottom));
    }

    /// Scroll to `offset` and collect the notifications the crossing produces.
    fn scroll_to(&mut self, offset: f64) -> Vec<(WatchKey, Notification<u32>)> {
        let root = Rect::new(0.0, 0.0, WIDTH, VIEWPORT);
        let mut out = Vec::new();
        for watch in self.watches.iter_mut().flatten() {
            let Some(&(top, bottom)) = self.layout.get(&watch.request.target) else {
                continue;
            };
            let rect = Rect::new(0.0, top - offset, WIDTH, bottom - offset);
            let ratio = intersection_ratio(rect, root);
            let notify = match watch.last_ratio {
                None => true,
                Some(last) => watch
                    .request
                    .thresholds
                    .iter()
                    .any(|&t| crossed(last, t) != crossed(ratio, t)),
            };
            watch.last_ratio = Some(ratio);
            if notify {
                out.push((
                    watch.request.key,
                    Notification {
                        target: watch.request.target,
                        bounding_rect: rect,
                        root_bounds: root,
                        intersection_ratio: ratio,
                    },
                ));
            }
        }
        out
    }
}

impl IntersectionHost<u32> for ScrollHost {
    type Subscription = usize;

    fn observe(&mut self, request: ObserveRequest<u32>) -> usize {
        self.watches.push(Some(Watch {
            request,
            last_ratio: None,
        }));
        self.watches.len() - 1
    }

    fn unobserve(&mut self, subscription: usize) {
        if let Some(slot) = self.watches.get_mut(subscription) {
            *slot = None;
        }
    }
}

impl StyleHost<u32> for ScrollHost {
    fn resolved_style(&self, element: u32) -> Option<ResolvedStyle> {
        self.styles.get(&element).cloned()
    }

    fn set_inline_style(&mut self, element: u32, declarations: &[Declaration]) {
        for d in declarations {
            println!("  style #{element}: {}: {}", d.property, d.value);
        }
    }
}

type Log = Rc<RefCell<Vec<(&'static str, TransitionKind)>>>;

fn section_props(name: &'static str, log: &Log) -> SectionProps<u32> {
    let log = log.clone();
    SectionProps {
        element: ElementProps::new().with_attribute("id", name),
        callbacks: Callbacks::new()
            .on_stuck(move |target: u32| println!("  {name}: header #{target} stuck"))
            .on_change(move |event: TransitionEvent<u32>| {
                log.borrow_mut().push((name, event.kind));
            }),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("== Stylesheet ==\n{STYLESHEET}");

    // Element ids: 1 is the scroller; each section has top/bottom sentinels and a header.
    let sections = [("first", 10_u32, 11_u32, 12_u32), ("second", 20, 21, 22)];

    let mut host = ScrollHost::default();
    for (i, &(_, top, bottom, header)) in sections.iter().enumerate() {
        let start = i as f64 * SECTION;
        host.place(top, start, start + 1.0);
        host.place(header, start, start + HEADER);
        host.place(bottom, start + SECTION - HEADER, start + SECTION);
        host.styles
            .insert(header, ResolvedStyle::new("0px", "0px", "48px", "0px"));
    }

    let log: Log = Rc::default();
    let mut container: StickyContainer<u32, usize> = StickyContainer::default();
    container.mount(1, &mut host);

    println!("== Mount ==");
    for &(name, top, bottom, header) in &sections {
        let id = container.add_section(section_props(name, &log));
        let ctx = container
            .mount_section(id, SentinelPair { top, bottom }, &mut host)
            .expect("section was just added");
        container
            .mount_sticky(&ctx, header, &mut host)
            .expect("sentinels are mounted");
        let frame = container.frame(id).expect("section is alive");
        println!("  <{} class=\"{}\">", frame.section.tag, frame.section.class);
    }

    println!("== Scroll ==");
    for offset in [0.0, 100.0, 200.0, 580.0, 700.0, 300.0, 0.0] {
        println!("scrollTop = {offset}");
        let _span = tracing::info_span!("scroll", top = offset).entered();
        let entries = host.scroll_to(offset);
        container.deliver_all(entries.iter().map(|(key, n)| (*key, n)));
    }

    use TransitionKind::{Stuck, Unstuck};
    assert_eq!(
        *log.borrow(),
        [
            ("first", Unstuck),
            ("first", Stuck),
            ("first", Stuck),
            ("first", Unstuck),
            ("second", Unstuck),
            ("second", Stuck),
            ("first", Stuck),
            ("second", Unstuck),
            ("first", Unstuck),
        ]
    );
}
