// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host primitives consumed by the section controllers.
//!
//! ## Overview
//!
//! This crate does not compute intersections or resolve styles. The embedding
//! toolkit provides both through the traits below:
//!
//! - [`IntersectionHost`]: begin/end observation of an element against a root.
//!   For every threshold crossing the host calls
//!   [`StickyContainer::deliver`](crate::container::StickyContainer::deliver) with the
//!   [`WatchKey`] it was given and a [`Notification`](crate::types::Notification).
//! - [`StyleHost`]: read the resolved box of an element and write inline style
//!   declarations on sentinels.
//!
//! Notifications must be delivered in the order the geometry crosses the
//! thresholds for a given element. Nothing is assumed across elements.

use alloc::borrow::Cow;
use alloc::string::String;

use crate::types::WatchKey;

/// Arguments to [`IntersectionHost::observe`].
#[derive(Clone, Debug, PartialEq)]
pub struct ObserveRequest<E> {
    /// Element to observe.
    pub target: E,
    /// Scroll container whose visible bounds define intersection.
    pub root: E,
    /// Intersection ratios whose crossing triggers a notification.
    pub thresholds: &'static [f64],
    /// Key to pass back with every notification for this subscription.
    pub key: WatchKey,
}

/// Viewport intersection notification service.
pub trait IntersectionHost<E> {
    /// Handle identifying a live subscription.
    type Subscription;

    /// Begin delivering notifications for `request.target`.
    fn observe(&mut self, request: ObserveRequest<E>) -> Self::Subscription;

    /// Stop delivering notifications for a subscription.
    fn unobserve(&mut self, subscription: Self::Subscription);
}

/// Effective box values of an element, as CSS length strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedStyle {
    /// Resolved `margin-top`.
    pub margin_top: String,
    /// Resolved `padding-top`.
    pub padding_top: String,
    /// Resolved `height` (content box).
    pub height: String,
    /// Resolved `padding-bottom`.
    pub padding_bottom: String,
}

impl ResolvedStyle {
    /// Convenience constructor, in `margin-top, padding-top, height, padding-bottom` order.
    pub fn new(
        margin_top: impl Into<String>,
        padding_top: impl Into<String>,
        height: impl Into<String>,
        padding_bottom: impl Into<String>,
    ) -> Self {
        Self {
            margin_top: margin_top.into(),
            padding_top: padding_top.into(),
            height: height.into(),
            padding_bottom: padding_bottom.into(),
        }
    }
}

/// One inline style declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// CSS property name, e.g. `height`.
    pub property: Cow<'static, str>,
    /// CSS value text.
    pub value: String,
}

impl Declaration {
    /// Create a declaration.
    pub fn new(property: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

/// Resolved style reader and inline style writer.
pub trait StyleHost<E> {
    /// Resolved box values of `element`, or `None` if it has no computed style yet.
    fn resolved_style(&self, element: E) -> Option<ResolvedStyle>;

    /// Set inline style declarations on `element`, replacing previous values of
    /// the same properties.
    fn set_inline_style(&mut self, element: E, declarations: &[Declaration]);
}
