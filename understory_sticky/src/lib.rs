// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sticky --heading-base-level=0

//! Understory Sticky: sentinel-driven stuck/unstuck detection for sticky sections.
//!
//! ## Overview
//!
//! A scroll container holds sections, and each section holds one sticky child that
//! pins to the container's top while the section is in range. Pinning itself is
//! one CSS rule. This crate answers the harder question: *when* did the child
//! become stuck or unstuck?
//!
//! Each section gets two invisible sentinels, one before and one after its
//! children. The host's intersection service watches both against the scroll
//! container, and two small state machines classify every threshold crossing.
//! Sentinels are mapped back to the sticky child they guard through a shared
//! registry, so callbacks receive the sticky child, not the sentinel.
//!
//! It does not compute intersections, resolve styles, or render markup. The
//! embedding toolkit provides those through the traits in [`host`].
//!
//! ## Components
//!
//! - [`Registry`](crate::registry::Registry): container reference plus the
//!   sentinel → sticky target map. Mutations return [`Changes`](crate::registry::Changes)
//!   and bump per-concern revisions, so re-mounting the same element is a no-op.
//! - [`SectionController`](crate::section::SectionController): geometry
//!   compensation, watcher lifecycle, and callback dispatch for one section.
//! - [`StickyContainer`](crate::container::StickyContainer): the container root. It
//!   owns the registry and the sections and routes notifications by
//!   [`WatchKey`](crate::types::WatchKey).
//! - [`detect`]: the pure edge transition functions, usable on their own.
//!
//! ## Workflow
//!
//! 1) Add sections and render their [`SectionFrame`](crate::section::SectionFrame)s.
//! 2) Mount the container element, then each section's sentinels, then each
//!    sticky child through the [`SectionContext`](crate::section::SectionContext)
//!    its section handed out.
//! 3) Forward every host notification to
//!    [`StickyContainer::deliver`](crate::container::StickyContainer::deliver).
//!
//! ```
//! use kurbo::Rect;
//! use understory_sticky::container::StickyContainer;
//! use understory_sticky::host::{Declaration, IntersectionHost, ObserveRequest, ResolvedStyle, StyleHost};
//! use understory_sticky::section::{Callbacks, SectionProps};
//! use understory_sticky::types::{Edge, Notification, SentinelPair, TransitionKind};
//!
//! /// A host that accepts every subscription and reports one style for every element.
//! #[derive(Default)]
//! struct Host {
//!     next: u32,
//! }
//!
//! impl IntersectionHost<u32> for Host {
//!     type Subscription = u32;
//!     fn observe(&mut self, _request: ObserveRequest<u32>) -> u32 {
//!         self.next += 1;
//!         self.next
//!     }
//!     fn unobserve(&mut self, _subscription: u32) {}
//! }
//!
//! impl StyleHost<u32> for Host {
//!     fn resolved_style(&self, _element: u32) -> Option<ResolvedStyle> {
//!         Some(ResolvedStyle::new("0px", "4px", "24px", "4px"))
//!     }
//!     fn set_inline_style(&mut self, _element: u32, _declarations: &[Declaration]) {}
//! }
//!
//! let mut host = Host::default();
//! let mut container: StickyContainer<u32, u32> = StickyContainer::default();
//!
//! let section = container.add_section(SectionProps {
//!     callbacks: Callbacks::new().on_stuck(|target: u32| assert_eq!(target, 3)),
//!     ..SectionProps::default()
//! });
//! container.mount(1, &mut host);
//! let ctx = container
//!     .mount_section(section, SentinelPair { top: 2, bottom: 4 }, &mut host)
//!     .unwrap();
//! container.mount_sticky(&ctx, 3, &mut host).unwrap();
//!
//! // The top sentinel scrolled above the container: the sticky child is stuck.
//! let key = container.section(section).unwrap().watch_key(Edge::Top).unwrap();
//! let event = container
//!     .deliver(key, &Notification {
//!         target: 2,
//!         bounding_rect: Rect::new(0.0, -21.0, 320.0, -20.0),
//!         root_bounds: Rect::new(0.0, 0.0, 320.0, 480.0),
//!         intersection_ratio: 0.0,
//!     })
//!     .unwrap();
//! assert_eq!(event.kind, TransitionKind::Stuck);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod container;
pub mod detect;
pub mod element;
pub mod error;
pub mod host;
pub mod length;
pub mod registry;
pub mod section;
pub mod types;

#[cfg(test)]
mod testing;

pub use container::StickyContainer;
pub use element::{ElementDesc, ElementProps, StickyProps};
pub use error::StickyError;
pub use registry::{Changes, Registry, Revision, StickyActions, StickyState};
pub use section::{Callbacks, SectionContext, SectionController, SectionProps};
pub use types::{Edge, Notification, PinState, SectionId, TransitionEvent, TransitionKind};
