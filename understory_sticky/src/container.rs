// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sticky container: the container root, its registry, and its sections.
//!
//! ## Overview
//!
//! [`StickyContainer`] is the single owner of the [`Registry`] and of every
//! [`SectionController`] under one scroll container. All mutations go through
//! it, and after each mutation that produced [`Changes`] it synchronizes every
//! section. Mutations that change nothing reach no section.
//!
//! ## Mount order
//!
//! 1) [`StickyContainer::add_section`] for each section, then render its
//!    [`SectionFrame`] via [`StickyContainer::frame`].
//! 2) [`StickyContainer::mount`] with the scroll container element. This may
//!    happen at any point; sections defer their watchers until it does.
//! 3) [`StickyContainer::mount_section`] with the sentinel elements, which yields
//!    the [`SectionContext`] sticky children need.
//! 4) [`StickyContainer::mount_sticky`] for the sticky child of each section.
//!
//! The host then calls [`StickyContainer::deliver`] for every notification.

use alloc::vec::Vec;

use crate::element::{ElementDesc, ElementProps};
use crate::error::{Result, StickyError};
use crate::host::{IntersectionHost, StyleHost};
use crate::registry::{Changes, Registry, StickyActions};
use crate::section::{Callbacks, SectionContext, SectionController, SectionFrame, SectionProps};
use crate::types::{Notification, SectionId, SentinelPair, TransitionEvent, WatchKey};

/// Sticky container for element identities `E` and host subscriptions `S`.
pub struct StickyContainer<E, S> {
    element: ElementProps,
    registry: Registry<E>,
    sections: Vec<Option<SectionController<E, S>>>, // slots
    generations: Vec<u32>,                           // last generation per slot
    free_list: Vec<usize>,
}

impl<E, S> core::fmt::Debug for StickyContainer<E, S>
where
    E: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.sections.iter().filter(|s| s.is_some()).count();
        f.debug_struct("StickyContainer")
            .field("registry", &self.registry)
            .field("sections_total", &self.sections.len())
            .field("sections_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<E: Copy + Ord + core::fmt::Debug, S> Default for StickyContainer<E, S> {
    fn default() -> Self {
        Self::new(ElementProps::default())
    }
}

impl<E: Copy + Ord + core::fmt::Debug, S> StickyContainer<E, S> {
    /// Create a container with the given element options.
    pub fn new(element: ElementProps) -> Self {
        Self {
            element,
            registry: Registry::new(),
            sections: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Describe the container element (default tag `div`).
    pub fn describe(&self) -> ElementDesc {
        self.element.describe("div", None)
    }

    /// The registry shared by all sections.
    pub fn registry(&self) -> &Registry<E> {
        &self.registry
    }

    /// Look up a live section.
    pub fn section(&self, id: SectionId) -> Option<&SectionController<E, S>> {
        self.sections
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.id() == id)
    }

    /// Iterate over live sections.
    pub fn sections(&self) -> impl Iterator<Item = &SectionController<E, S>> {
        self.sections.iter().flatten()
    }

    /// True if `id` refers to a live section.
    pub fn is_alive(&self, id: SectionId) -> bool {
        self.section(id).is_some()
    }

    fn section_mut(&mut self, id: SectionId) -> Result<&mut SectionController<E, S>> {
        live_mut(&mut self.sections, id).ok_or(StickyError::UnknownSection(id))
    }

    /// Add a section. It stays inert until its sentinels are mounted.
    pub fn add_section(&mut self, props: SectionProps<E>) -> SectionId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.sections.push(None);
            self.generations.push(1);
            (self.sections.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SectionId stores 32-bit slot indices."
        )]
        let id = SectionId::new(idx as u32, generation);
        self.sections[idx] = Some(SectionController::new(id, props));
        id
    }

    /// Describe a section element and its sentinels.
    pub fn frame(&self, id: SectionId) -> Result<SectionFrame> {
        self.section(id)
            .map(SectionController::frame)
            .ok_or(StickyError::UnknownSection(id))
    }

    /// Replace a section's callbacks. Takes effect for the next notification.
    pub fn set_callbacks(&mut self, id: SectionId, callbacks: Callbacks<E>) -> Result<()> {
        self.section_mut(id)?.set_callbacks(callbacks);
        Ok(())
    }

    /// Container root mount: record the scroll container.
    ///
    /// Mounting the element that is already recorded changes nothing and touches
    /// no section.
    pub fn mount<H>(&mut self, element: E, host: &mut H) -> Changes
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let changes = self.registry.set_container_ref(element);
        if !changes.is_empty() {
            tracing::debug!(container = ?element, "container mounted");
            self.notify(host);
        }
        changes
    }

    /// Container root unmount: forget the container and stop every watcher.
    pub fn unmount<H>(&mut self, host: &mut H) -> Changes
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let changes = self.registry.clear_container();
        if !changes.is_empty() {
            tracing::debug!("container unmounted");
            self.notify(host);
        }
        changes
    }

    /// Mount a section's sentinels and return the context for its sticky child.
    ///
    /// Re-mounting with other sentinels stops the old watchers and drops the old
    /// sentinels from the registry; contexts handed out for them go stale.
    pub fn mount_section<H>(
        &mut self,
        id: SectionId,
        sentinels: SentinelPair<E>,
        host: &mut H,
    ) -> Result<SectionContext<E>>
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let replaced = self.section_mut(id)?.mount(sentinels, host);
        let purged =
            replaced.is_some_and(|old| !self.registry.remove_sentinels(old).is_empty());
        if purged {
            tracing::debug!(section = ?id, "sentinels replaced");
            self.notify(host);
        } else {
            let Self {
                registry, sections, ..
            } = self;
            if let Some(section) = live_mut(sections, id) {
                section.sync(&*registry, host);
            }
        }
        Ok(SectionContext {
            section: id,
            sentinels,
        })
    }

    /// Register a sticky child with the section that handed out `ctx`.
    ///
    /// Fails if the section is gone or has re-mounted with other sentinels.
    /// Registering the same child again changes nothing.
    pub fn mount_sticky<H>(
        &mut self,
        ctx: &SectionContext<E>,
        target: E,
        host: &mut H,
    ) -> Result<Changes>
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let section = self.section_mut(ctx.section)?;
        match section.sentinels() {
            None => return Err(StickyError::SentinelsNotMounted(ctx.section)),
            Some(current) if current != ctx.sentinels => {
                return Err(StickyError::ForeignContext(ctx.section));
            }
            Some(_) => {}
        }
        let changes = self.registry.add_sticky_ref(ctx.sentinels, target);
        if !changes.is_empty() {
            tracing::debug!(section = ?ctx.section, ?target, "sticky target registered");
            self.notify(host);
        }
        Ok(changes)
    }

    /// Unmount and remove a section. Its watchers are torn down and its sentinel
    /// entries leave the registry.
    pub fn remove_section<H>(&mut self, id: SectionId, host: &mut H) -> Result<()>
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let section = self.section_mut(id)?;
        section.teardown(host);
        let sentinels = section.detach();
        self.sections[id.idx()] = None;
        self.free_list.push(id.idx());
        if let Some(sentinels) = sentinels {
            if !self.registry.remove_sentinels(sentinels).is_empty() {
                self.notify(host);
            }
        }
        tracing::debug!(section = ?id, "section removed");
        Ok(())
    }

    /// Re-read the guarded target's style for one section (for example after a
    /// font or viewport change) and rewrite its sentinel geometry.
    pub fn refresh_geometry<H>(&mut self, id: SectionId, host: &mut H) -> Result<()>
    where
        H: StyleHost<E>,
    {
        let Self {
            registry, sections, ..
        } = self;
        let section = live_mut(sections, id).ok_or(StickyError::UnknownSection(id))?;
        section.recompute_geometry(&*registry, host);
        Ok(())
    }

    /// Route one host notification to its section.
    ///
    /// Returns the event dispatched to the section's callbacks, if any.
    /// Notifications for removed sections or torn-down watchers are dropped.
    pub fn deliver(&mut self, key: WatchKey, n: &Notification<E>) -> Option<TransitionEvent<E>> {
        let Self {
            registry, sections, ..
        } = self;
        let Some(section) = live_mut(sections, key.section) else {
            tracing::trace!(
                ?key,
                generation = key.section.generation(),
                "dropping notification for a removed section"
            );
            return None;
        };
        section.handle(key, n, &*registry)
    }

    /// Route a batch of notifications in order, collecting dispatched events.
    pub fn deliver_all<'a, I>(&mut self, entries: I) -> Vec<TransitionEvent<E>>
    where
        I: IntoIterator<Item = (WatchKey, &'a Notification<E>)>,
        E: 'a,
    {
        entries
            .into_iter()
            .filter_map(|(key, n)| self.deliver(key, n))
            .collect()
    }

    fn notify<H>(&mut self, host: &mut H)
    where
        H: IntersectionHost<E, Subscription = S> + StyleHost<E>,
    {
        let Self {
            registry, sections, ..
        } = self;
        for section in sections.iter_mut().flatten() {
            section.sync(&*registry, host);
        }
    }
}

fn live_mut<E, S>(
    sections: &mut [Option<SectionController<E, S>>],
    id: SectionId,
) -> Option<&mut SectionController<E, S>>
where
    E: Copy + Ord + core::fmt::Debug,
{
    sections
        .get_mut(id.idx())
        .and_then(Option::as_mut)
        .filter(|s| s.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::SECTION_CLASS;
    use crate::registry::StickyState;
    use crate::testing::RecordingHost;
    use crate::types::{Edge, TransitionKind};
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use kurbo::Rect;

    type Container = StickyContainer<u32, usize>;

    const ROOT_EL: u32 = 1;
    const ROOT: Rect = Rect::new(0.0, 0.0, 300.0, 500.0);

    fn note(target: u32, top: f64, bottom: f64, ratio: f64) -> Notification<u32> {
        Notification {
            target,
            bounding_rect: Rect::new(0.0, top, 300.0, bottom),
            root_bounds: ROOT,
            intersection_ratio: ratio,
        }
    }

    /// Container with one fully mounted section guarding element 20.
    fn setup(host: &mut RecordingHost) -> (Container, SectionId, SectionContext<u32>) {
        let mut c = Container::default();
        host.set_style(20, "10px", "5px", "40px", "5px");
        c.mount(ROOT_EL, host);
        let id = c.add_section(SectionProps::default());
        let ctx = c
            .mount_section(id, SentinelPair { top: 10, bottom: 11 }, host)
            .unwrap();
        c.mount_sticky(&ctx, 20, host).unwrap();
        (c, id, ctx)
    }

    #[test]
    fn full_mount_watches_and_resolves() {
        let mut host = RecordingHost::default();
        let (c, id, _) = setup(&mut host);
        let s = c.section(id).unwrap();
        assert!(s.is_watching(Edge::Top));
        assert!(s.is_watching(Edge::Bottom));
        assert_eq!(host.live(), 2);
        assert_eq!(c.registry().lookup_target(10), Some(20));
        assert_eq!(c.registry().lookup_target(11), Some(20));
        assert_eq!(
            c.frame(id).unwrap().bottom_sentinel.style_value("height"),
            Some("calc(10px + 5px + 40px + 5px)")
        );
    }

    #[test]
    fn remounting_same_container_is_inert() {
        let mut host = RecordingHost::default();
        let (mut c, _, _) = setup(&mut host);
        let calls = host.calls().len();
        let rev = c.registry().container_revision();
        assert!(c.mount(ROOT_EL, &mut host).is_empty());
        assert_eq!(c.registry().container_revision(), rev);
        assert_eq!(host.calls().len(), calls);
    }

    #[test]
    fn sections_before_container_are_deferred() {
        let mut host = RecordingHost::default();
        let mut c = Container::default();
        let id = c.add_section(SectionProps::default());
        let ctx = c
            .mount_section(id, SentinelPair { top: 10, bottom: 11 }, &mut host)
            .unwrap();
        c.mount_sticky(&ctx, 20, &mut host).unwrap();
        assert_eq!(host.observed(), 0);

        c.mount(ROOT_EL, &mut host);
        assert_eq!(host.live(), 2);
        assert!(c.section(id).unwrap().watch_key(Edge::Top).is_some());
    }

    #[test]
    fn identical_sticky_registration_is_idempotent() {
        let mut host = RecordingHost::default();
        let (mut c, id, ctx) = setup(&mut host);
        let calls = host.calls().len();
        assert!(c.mount_sticky(&ctx, 20, &mut host).unwrap().is_empty());
        assert_eq!(host.calls().len(), calls);
        assert_eq!(c.registry().len(), 2);

        let fired = Rc::new(RefCell::new(0));
        let f = fired.clone();
        c.set_callbacks(id, Callbacks::new().on_change(move |_| *f.borrow_mut() += 1))
            .unwrap();
        let key = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        c.deliver(key, &note(10, -30.0, -10.0, 0.0));
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn deliver_routes_to_owning_section() {
        let mut host = RecordingHost::default();
        let (mut c, a, _) = setup(&mut host);
        let b = c.add_section(SectionProps::default());
        let ctx_b = c
            .mount_section(b, SentinelPair { top: 12, bottom: 13 }, &mut host)
            .unwrap();
        c.mount_sticky(&ctx_b, 21, &mut host).unwrap();

        let key_b = c.section(b).unwrap().watch_key(Edge::Bottom).unwrap();
        let ev = c.deliver(key_b, &note(13, 0.0, 10.0, 1.0)).unwrap();
        assert_eq!(ev.kind, TransitionKind::Stuck);
        assert_eq!(ev.target, 21);
        assert!(c.section(b).unwrap().is_pinned());
        assert!(!c.section(a).unwrap().is_pinned());
    }

    #[test]
    fn removed_section_drops_in_flight_notifications() {
        let mut host = RecordingHost::default();
        let (mut c, id, ctx) = setup(&mut host);
        let key = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        c.remove_section(id, &mut host).unwrap();
        assert_eq!(host.live(), 0);
        assert!(c.registry().is_empty());
        assert_eq!(c.deliver(key, &note(10, -30.0, -10.0, 0.0)), None);
        assert_eq!(
            c.mount_sticky(&ctx, 20, &mut host),
            Err(StickyError::UnknownSection(id))
        );

        // The slot is reused with a new generation; the old key still misses.
        let fresh = c.add_section(SectionProps::default());
        assert_ne!(fresh, id);
        assert!(!c.is_alive(id));
        c.mount_section(fresh, SentinelPair { top: 10, bottom: 11 }, &mut host)
            .unwrap();
        assert_eq!(c.deliver(key, &note(10, -30.0, -10.0, 0.0)), None);
    }

    #[test]
    fn unmount_stops_all_watchers() {
        let mut host = RecordingHost::default();
        let (mut c, id, _) = setup(&mut host);
        let key = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        assert_eq!(c.unmount(&mut host), Changes::CONTAINER);
        assert_eq!(host.live(), 0);
        assert_eq!(c.deliver(key, &note(10, -30.0, -10.0, 0.0)), None);

        c.mount(ROOT_EL, &mut host);
        assert_eq!(host.live(), 2);
    }

    #[test]
    fn composition_errors_fail_fast() {
        let mut host = RecordingHost::default();
        let mut c = Container::default();
        let id = c.add_section(SectionProps::default());
        let ctx = SectionContext {
            section: id,
            sentinels: SentinelPair { top: 10, bottom: 11 },
        };
        assert_eq!(
            c.mount_sticky(&ctx, 20, &mut host),
            Err(StickyError::SentinelsNotMounted(id))
        );

        let real = c
            .mount_section(id, SentinelPair { top: 14, bottom: 15 }, &mut host)
            .unwrap();
        assert_eq!(
            c.mount_sticky(&ctx, 20, &mut host),
            Err(StickyError::ForeignContext(id))
        );
        assert!(c.mount_sticky(&real, 20, &mut host).is_ok());
        assert!(c.registry().lookup_target(10).is_none());
    }

    #[test]
    fn deliver_all_keeps_order() {
        let mut host = RecordingHost::default();
        let (mut c, id, _) = setup(&mut host);
        let top = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        let stuck = note(10, -30.0, -10.0, 0.0);
        let below = note(10, 580.0, 600.0, 0.0);
        let unstuck = note(10, 30.0, 50.0, 1.0);
        let events = c.deliver_all(vec![(top, &stuck), (top, &below), (top, &unstuck)]);
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, [TransitionKind::Stuck, TransitionKind::Unstuck]);
    }

    #[test]
    fn frame_describes_section_and_container() {
        let mut c = Container::new(ElementProps::new().with_tag("main"));
        let id = c.add_section(SectionProps {
            element: ElementProps::new()
                .with_tag("article")
                .with_attribute("id", "intro"),
            ..SectionProps::default()
        });
        assert_eq!(c.describe().tag, "main");
        let frame = c.frame(id).unwrap();
        assert_eq!(frame.section.tag, "article");
        assert_eq!(frame.section.class, SECTION_CLASS);
        assert_eq!(frame.section.attribute("id"), Some("intro"));
        assert!(frame.top_sentinel.style.is_empty());
    }

    #[test]
    fn new_sticky_child_recomputes_geometry_and_rewatches() {
        let mut host = RecordingHost::default();
        let (mut c, id, ctx) = setup(&mut host);
        let old = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        host.set_style(21, "0px", "5px", "20px", "5px");
        let unobserved = host.unobserved();

        assert_eq!(c.mount_sticky(&ctx, 21, &mut host), Ok(Changes::TARGETS));
        let s = c.section(id).unwrap();
        assert_eq!(s.geometry().unwrap().target_height.to_px(), Some(30.0));
        assert_eq!(host.inline_style(10, "margin-top"), Some("0px"));
        assert_eq!(host.unobserved(), unobserved + 2);
        assert_eq!(host.live(), 2);

        let new = s.watch_key(Edge::Top).unwrap();
        assert_ne!(old, new);
        assert_eq!(c.deliver(old, &note(10, -30.0, -10.0, 0.0)), None);
        let ev = c.deliver(new, &note(10, -30.0, -10.0, 0.0)).unwrap();
        assert_eq!(ev.kind, TransitionKind::Stuck);
        assert_eq!(ev.target, 21);
    }

    #[test]
    fn remounting_sentinels_replaces_watchers_and_entries() {
        let mut host = RecordingHost::default();
        let (mut c, id, old_ctx) = setup(&mut host);
        let old = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        let next = SentinelPair { top: 30, bottom: 31 };
        let (observed, unobserved) = (host.observed(), host.unobserved());

        let ctx = c.mount_section(id, next, &mut host).unwrap();
        assert_eq!(host.unobserved(), unobserved + 2);
        assert_eq!(host.live(), 2);
        let targets: Vec<_> = host.requests().skip(observed).map(|r| r.target).collect();
        assert_eq!(targets, [30, 31]);
        assert_eq!(c.registry().lookup_target(10), None);
        assert_eq!(c.registry().lookup_target(11), None);
        assert_eq!(c.deliver(old, &note(10, -30.0, -10.0, 0.0)), None);
        assert_eq!(
            c.mount_sticky(&old_ctx, 20, &mut host),
            Err(StickyError::ForeignContext(id))
        );

        c.mount_sticky(&ctx, 20, &mut host).unwrap();
        assert_eq!(host.live(), 2);
        assert_eq!(c.registry().len(), 2);
        let key = c.section(id).unwrap().watch_key(Edge::Top).unwrap();
        let ev = c.deliver(key, &note(30, -30.0, -10.0, 0.0)).unwrap();
        assert_eq!(ev.target, 20);
    }

    #[test]
    fn refresh_geometry_picks_up_new_style() {
        let mut host = RecordingHost::default();
        let (mut c, id, _) = setup(&mut host);
        host.set_style(20, "0px", "8px", "24px", "8px");
        c.refresh_geometry(id, &mut host).unwrap();
        let s = c.section(id).unwrap();
        assert_eq!(s.geometry().unwrap().target_height.to_px(), Some(40.0));
        assert_eq!(host.inline_style(10, "margin-top"), Some("0px"));
    }
}
