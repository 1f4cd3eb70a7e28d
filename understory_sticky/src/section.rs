// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Section controller: sentinel geometry, watcher lifecycle, and event dispatch.
//!
//! ## Overview
//!
//! One controller exists per sticky section. It owns the section's two
//! sentinels, one [`EdgeMachine`] per sentinel, and the host subscriptions that
//! drive them.
//!
//! ## Lifecycle
//!
//! 1) The container adds the section; the toolkit renders its [`SectionFrame`].
//! 2) The toolkit mounts the sentinels, and the sticky child registers its
//!    sentinel → target mapping.
//! 3) On every registry change the container calls [`SectionController::sync`]:
//!    - guarded target changed: recompute [`SectionGeometry`], write it to the
//!      sentinels, and re-create both watchers;
//!    - container changed: re-create both watchers;
//!    - otherwise: nothing, not even a host call.
//! 4) Notifications are routed back by [`WatchKey`]; a key whose epoch is not the
//!    live watcher's is dropped, so torn-down watchers never fire.
//!
//! Without a container no watcher exists; creation is retried on the next sync.
//!
//! Callbacks are looked up at dispatch time rather than captured by a watcher,
//! so replacing them takes effect immediately and needs no re-subscription.

use alloc::boxed::Box;

use crate::detect::{EdgeMachine, thresholds};
use crate::element::{
    ElementDesc, ElementProps, SECTION_CLASS, SENTINEL_BOTTOM_CLASS, SENTINEL_TOP_CLASS,
};
use crate::host::{Declaration, IntersectionHost, ObserveRequest, StyleHost};
use crate::length::SectionGeometry;
use crate::registry::{Revision, StickyState};
use crate::types::{
    Edge, Notification, PinState, SectionId, SentinelPair, TransitionEvent, TransitionKind,
    WatchKey,
};

/// Callback receiving every transition.
pub type ChangeCallback<E> = Box<dyn FnMut(TransitionEvent<E>)>;

/// Callback receiving the sticky target of a stuck or unstuck transition.
pub type TargetCallback<E> = Box<dyn FnMut(E)>;

/// Caller-supplied transition callbacks. All are optional.
///
/// For each accepted transition the kind-specific callback runs first, then
/// `on_change`.
pub struct Callbacks<E> {
    on_change: Option<ChangeCallback<E>>,
    on_stuck: Option<TargetCallback<E>>,
    on_unstuck: Option<TargetCallback<E>>,
}

impl<E> Default for Callbacks<E> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_stuck: None,
            on_unstuck: None,
        }
    }
}

impl<E> core::fmt::Debug for Callbacks<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_change", &self.on_change.is_some())
            .field("on_stuck", &self.on_stuck.is_some())
            .field("on_unstuck", &self.on_unstuck.is_some())
            .finish()
    }
}

impl<E: Copy> Callbacks<E> {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generic transition callback.
    pub fn on_change(mut self, f: impl FnMut(TransitionEvent<E>) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    /// Set the callback for [`TransitionKind::Stuck`].
    pub fn on_stuck(mut self, f: impl FnMut(E) + 'static) -> Self {
        self.on_stuck = Some(Box::new(f));
        self
    }

    /// Set the callback for [`TransitionKind::Unstuck`].
    pub fn on_unstuck(mut self, f: impl FnMut(E) + 'static) -> Self {
        self.on_unstuck = Some(Box::new(f));
        self
    }

    fn fire(&mut self, event: TransitionEvent<E>) {
        let specific = match event.kind {
            TransitionKind::Stuck => self.on_stuck.as_mut(),
            TransitionKind::Unstuck => self.on_unstuck.as_mut(),
        };
        if let Some(f) = specific {
            f(event.target);
        }
        if let Some(f) = self.on_change.as_mut() {
            f(event);
        }
    }
}

/// Props of a section: element options and callbacks.
#[derive(Debug)]
pub struct SectionProps<E> {
    /// Tag override (default `section`) and pass-through attributes.
    pub element: ElementProps,
    /// Transition callbacks.
    pub callbacks: Callbacks<E>,
}

impl<E> Default for SectionProps<E> {
    fn default() -> Self {
        Self {
            element: ElementProps::default(),
            callbacks: Callbacks::default(),
        }
    }
}

/// What the toolkit renders for a section: the section element wrapping the top
/// sentinel, the children, and the bottom sentinel, in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionFrame {
    /// The section element.
    pub section: ElementDesc,
    /// First child of the section.
    pub top_sentinel: ElementDesc,
    /// Last child of the section.
    pub bottom_sentinel: ElementDesc,
}

/// Capability a sticky child needs to register with its section.
///
/// Only [`StickyContainer::mount_section`](crate::container::StickyContainer::mount_section)
/// hands these out.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SectionContext<E> {
    pub(crate) section: SectionId,
    pub(crate) sentinels: SentinelPair<E>,
}

impl<E: Copy> SectionContext<E> {
    /// The owning section.
    pub fn section(&self) -> SectionId {
        self.section
    }

    /// The section's sentinels.
    pub fn sentinels(&self) -> SentinelPair<E> {
        self.sentinels
    }
}

#[derive(Debug)]
struct Watcher<S> {
    machine: EdgeMachine,
    epoch: u32,
    subscription: Option<S>,
}

impl<S> Watcher<S> {
    fn new(edge: Edge) -> Self {
        Self {
            machine: EdgeMachine::new(edge),
            epoch: 0,
            subscription: None,
        }
    }
}

/// Registry state a controller last synchronized against.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Seen<E> {
    container: Option<E>,
    container_rev: Revision,
    target: Option<E>,
    targets_rev: Revision,
}

/// Detection state for one sticky section.
pub struct SectionController<E, S> {
    id: SectionId,
    element: ElementProps,
    callbacks: Callbacks<E>,
    sentinels: Option<SentinelPair<E>>,
    top: Watcher<S>,
    bottom: Watcher<S>,
    geometry: Option<SectionGeometry>,
    seen: Option<Seen<E>>,
    last: Option<TransitionKind>,
}

impl<E: core::fmt::Debug, S> core::fmt::Debug for SectionController<E, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SectionController")
            .field("id", &self.id)
            .field("sentinels", &self.sentinels)
            .field("top", &self.top.machine.state())
            .field("bottom", &self.bottom.machine.state())
            .field("geometry", &self.geometry)
            .finish_non_exhaustive()
    }
}

impl<E: Copy + Ord + core::fmt::Debug, S> SectionController<E, S> {
    pub(crate) fn new(id: SectionId, props: SectionProps<E>) -> Self {
        Self {
            id,
            element: props.element,
            callbacks: props.callbacks,
            sentinels: None,
            top: Watcher::new(Edge::Top),
            bottom: Watcher::new(Edge::Bottom),
            geometry: None,
            seen: None,
            last: None,
        }
    }

    /// This section's id.
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Mounted sentinels, if any.
    pub fn sentinels(&self) -> Option<SentinelPair<E>> {
        self.sentinels
    }

    /// Current compensation geometry, once the guarded target has resolved style.
    pub fn geometry(&self) -> Option<&SectionGeometry> {
        self.geometry.as_ref()
    }

    /// State of one edge machine.
    pub fn pin_state(&self, edge: Edge) -> PinState {
        self.watcher(edge).machine.state()
    }

    /// True if the last emitted transition, from either edge, was
    /// [`TransitionKind::Stuck`].
    pub fn is_pinned(&self) -> bool {
        self.last == Some(TransitionKind::Stuck)
    }

    /// True if the watcher for `edge` is subscribed.
    pub fn is_watching(&self, edge: Edge) -> bool {
        self.watcher(edge).subscription.is_some()
    }

    /// Key that notifications for the live `edge` watcher must carry.
    pub fn watch_key(&self, edge: Edge) -> Option<WatchKey> {
        let watcher = self.watcher(edge);
        watcher.subscription.as_ref().map(|_| WatchKey {
            section: self.id,
            edge,
            epoch: watcher.epoch,
        })
    }

    /// Describe the section element and its sentinels with the current geometry.
    pub fn frame(&self) -> SectionFrame {
        let mut top_sentinel = ElementDesc::with_class("div", SENTINEL_TOP_CLASS);
        let mut bottom_sentinel = ElementDesc::with_class("div", SENTINEL_BOTTOM_CLASS);
        if let Some(geometry) = &self.geometry {
            let [top, bottom] = sentinel_styles(geometry);
            top_sentinel.style.push(top);
            bottom_sentinel.style.push(bottom);
        }
        SectionFrame {
            section: self.element.describe("section", Some(SECTION_CLASS)),
            top_sentinel,
            bottom_sentinel,
        }
    }

    pub(crate) fn set_callbacks(&mut self, callbacks: Callbacks<E>) {
        self.callbacks = callbacks;
    }

    /// Attach sentinels. Re-mounting with different sentinels tears down the
    /// watchers of the old ones and forces a full resync.
    ///
    /// Returns the pair that was replaced, if any.
    pub(crate) fn mount<H>(
        &mut self,
        sentinels: SentinelPair<E>,
        host: &mut H,
    ) -> Option<SentinelPair<E>>
    where
        H: IntersectionHost<E, Subscription = S>,
    {
        if self.sentinels == Some(sentinels) {
            return None;
        }
        self.teardown(host);
        self.geometry = None;
        self.seen = None;
        self.sentinels.replace(sentinels)
    }

    /// Synchronize with the registry: recompute geometry and re-create watchers
    /// only when this section's dependencies actually changed.
    pub fn sync<R, H>(&mut self, registry: &R, host: &mut H)
    where
        R: StickyState<E>,
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let Some(sentinels) = self.sentinels else {
            return;
        };
        let container_rev = registry.container_revision();
        let targets_rev = registry.targets_revision();
        let pending_geometry = self.geometry.is_none()
            && self.seen.is_some_and(|seen| seen.target.is_some());
        if let Some(seen) = self.seen {
            if seen.container_rev == container_rev
                && seen.targets_rev == targets_rev
                && !pending_geometry
            {
                return;
            }
        }

        let container = registry.container_ref();
        let target = registry.lookup_target(sentinels.top);
        let previous = self.seen;
        self.seen = Some(Seen {
            container,
            container_rev,
            target,
            targets_rev,
        });

        let target_changed = previous.is_none_or(|seen| seen.target != target);
        let container_changed = previous.is_none_or(|seen| seen.container != container);

        if target_changed {
            self.geometry = None;
        }
        if self.geometry.is_none() {
            if let Some(target) = target {
                self.refresh_geometry(target, sentinels, host);
            }
        }
        if target_changed || container_changed {
            self.rewatch(container, sentinels, host);
        }
    }

    /// Re-read the guarded target's style and rewrite the sentinel styles.
    pub(crate) fn recompute_geometry<R, H>(&mut self, registry: &R, host: &mut H)
    where
        R: StickyState<E>,
        H: StyleHost<E>,
    {
        let Some(sentinels) = self.sentinels else {
            return;
        };
        if let Some(target) = registry.lookup_target(sentinels.top) {
            self.refresh_geometry(target, sentinels, host);
        }
    }

    fn refresh_geometry<H: StyleHost<E>>(
        &mut self,
        target: E,
        sentinels: SentinelPair<E>,
        host: &mut H,
    ) {
        let Some(style) = host.resolved_style(target) else {
            tracing::debug!(section = ?self.id, ?target, "target has no resolved style; geometry deferred");
            return;
        };
        let geometry = SectionGeometry::from_style(&style);
        if self.geometry.as_ref() == Some(&geometry) {
            return;
        }
        let [top, bottom] = sentinel_styles(&geometry);
        host.set_inline_style(sentinels.top, &[top]);
        host.set_inline_style(sentinels.bottom, &[bottom]);
        tracing::debug!(
            section = ?self.id,
            target_height = %geometry.target_height,
            margin_top = %geometry.sentinel_margin_top,
            "sentinel geometry updated"
        );
        self.geometry = Some(geometry);
    }

    fn rewatch<H>(&mut self, container: Option<E>, sentinels: SentinelPair<E>, host: &mut H)
    where
        H: IntersectionHost<E, Subscription = S>,
    {
        self.teardown(host);
        let Some(root) = container else {
            tracing::debug!(section = ?self.id, "no container yet; watchers deferred");
            return;
        };
        for edge in Edge::ALL {
            let id = self.id;
            let watcher = self.watcher_mut(edge);
            let key = WatchKey {
                section: id,
                edge,
                epoch: watcher.epoch,
            };
            let subscription = host.observe(ObserveRequest {
                target: sentinels.get(edge),
                root,
                thresholds: thresholds(edge),
                key,
            });
            watcher.subscription = Some(subscription);
            tracing::debug!(?key, "watcher created");
        }
    }

    /// Unsubscribe both watchers. Notifications already in flight for them are
    /// dropped on arrival.
    pub(crate) fn teardown<H>(&mut self, host: &mut H)
    where
        H: IntersectionHost<E, Subscription = S>,
    {
        let id = self.id;
        for edge in Edge::ALL {
            let watcher = self.watcher_mut(edge);
            if let Some(subscription) = watcher.subscription.take() {
                host.unobserve(subscription);
                tracing::debug!(section = ?id, ?edge, epoch = watcher.epoch, "watcher removed");
            }
            watcher.epoch = watcher.epoch.wrapping_add(1);
            watcher.machine.reset();
        }
        self.last = None;
    }

    /// Forget the sentinels after teardown (section unmount).
    pub(crate) fn detach(&mut self) -> Option<SentinelPair<E>> {
        self.seen = None;
        self.geometry = None;
        self.sentinels.take()
    }

    /// Classify one notification and run the callbacks.
    ///
    /// Returns the dispatched event. Stale keys, foreign sentinels, and sentinels
    /// without a registered target produce nothing and leave the machine as is.
    pub(crate) fn handle<R: StickyState<E>>(
        &mut self,
        key: WatchKey,
        n: &Notification<E>,
        registry: &R,
    ) -> Option<TransitionEvent<E>> {
        let sentinel = self.sentinels?.get(key.edge);
        let watcher = self.watcher_mut(key.edge);
        if watcher.subscription.is_none() || watcher.epoch != key.epoch {
            tracing::trace!(?key, "dropping notification from a removed watcher");
            return None;
        }
        if n.target != sentinel {
            tracing::trace!(?key, target = ?n.target, "notification for a foreign element");
            return None;
        }
        let Some(target) = registry.lookup_target(n.target) else {
            tracing::warn!(?key, sentinel = ?n.target, "no sticky target registered for sentinel");
            return None;
        };
        let kind = watcher.machine.step(n)?;
        tracing::trace!(?key, ?kind, ratio = n.intersection_ratio, "edge transition");
        let event = TransitionEvent { kind, target };
        self.last = Some(kind);
        self.callbacks.fire(event);
        Some(event)
    }

    fn watcher(&self, edge: Edge) -> &Watcher<S> {
        match edge {
            Edge::Top => &self.top,
            Edge::Bottom => &self.bottom,
        }
    }

    fn watcher_mut(&mut self, edge: Edge) -> &mut Watcher<S> {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
        }
    }
}

fn sentinel_styles(geometry: &SectionGeometry) -> [Declaration; 2] {
    [
        Declaration::new("margin-top", geometry.top_sentinel_margin().to_css()),
        Declaration::new("height", geometry.target_height.to_css()),
    ]
}
