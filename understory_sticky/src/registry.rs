// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ref registry: the scroll container and the sentinel → sticky target map.
//!
//! ## Overview
//!
//! A pure state holder shared by every section of one container. It is written
//! during mount (container, then sticky children) and read during notification
//! handling.
//!
//! ## Change tokens
//!
//! Every mutation returns [`Changes`], and each concern carries its own
//! [`Revision`]. Dependents compare revisions instead of identities, so setting
//! the same container twice, or re-registering the same sentinel/target triple,
//! is observably a no-op and does not re-create any watcher.
//!
//! ```
//! use understory_sticky::registry::{Changes, Registry, StickyActions, StickyState};
//! use understory_sticky::types::SentinelPair;
//!
//! let mut reg: Registry<u32> = Registry::new();
//! assert_eq!(reg.set_container_ref(1), Changes::CONTAINER);
//! let rev = reg.container_revision();
//! assert!(reg.set_container_ref(1).is_empty());
//! assert_eq!(reg.container_revision(), rev);
//!
//! let pair = SentinelPair { top: 10, bottom: 11 };
//! assert_eq!(reg.add_sticky_ref(pair, 20), Changes::TARGETS);
//! assert_eq!(reg.lookup_target(10), Some(20));
//! assert_eq!(reg.lookup_target(11), Some(20));
//! ```

use alloc::collections::BTreeMap;

use crate::types::SentinelPair;

/// Monotonic version counter for one registry concern.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Revision(u64);

impl Revision {
    fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

bitflags::bitflags! {
    /// What a registry mutation changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Changes: u8 {
        /// The container reference changed.
        const CONTAINER = 0b0000_0001;
        /// The sentinel → target map changed.
        const TARGETS   = 0b0000_0010;
    }
}

/// Write capability handed to the container root and sticky children.
pub trait StickyActions<E> {
    /// Record the scrolling ancestor. Setting the current element again changes nothing.
    fn set_container_ref(&mut self, container: E) -> Changes;

    /// Map both sentinels of `sentinels` to `target`.
    fn add_sticky_ref(&mut self, sentinels: SentinelPair<E>, target: E) -> Changes;
}

/// Read capability consumed by section controllers.
pub trait StickyState<E> {
    /// The scrolling ancestor, once mounted.
    fn container_ref(&self) -> Option<E>;

    /// The sticky target guarded by `sentinel`.
    fn lookup_target(&self, sentinel: E) -> Option<E>;

    /// Revision of the container reference.
    fn container_revision(&self) -> Revision;

    /// Revision of the sentinel → target map.
    fn targets_revision(&self) -> Revision;
}

/// Registry for one sticky container.
#[derive(Clone, Debug)]
pub struct Registry<E> {
    container: Option<E>,
    targets: BTreeMap<E, E>,
    container_rev: Revision,
    targets_rev: Revision,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            container: None,
            targets: BTreeMap::new(),
            container_rev: Revision::default(),
            targets_rev: Revision::default(),
        }
    }
}

impl<E: Copy + Ord> Registry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the container reference (container unmount).
    pub fn clear_container(&mut self) -> Changes {
        if self.container.take().is_some() {
            self.container_rev.bump();
            Changes::CONTAINER
        } else {
            Changes::empty()
        }
    }

    /// Drop the entries of both sentinels of a section.
    pub fn remove_sentinels(&mut self, sentinels: SentinelPair<E>) -> Changes {
        let top = self.targets.remove(&sentinels.top).is_some();
        let bottom = self.targets.remove(&sentinels.bottom).is_some();
        if top || bottom {
            self.targets_rev.bump();
            Changes::TARGETS
        } else {
            Changes::empty()
        }
    }

    /// Number of sentinel entries.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True if no sentinel is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn insert(&mut self, sentinel: E, target: E) -> bool {
        self.targets.insert(sentinel, target) != Some(target)
    }
}

impl<E: Copy + Ord> StickyActions<E> for Registry<E> {
    fn set_container_ref(&mut self, container: E) -> Changes {
        if self.container == Some(container) {
            return Changes::empty();
        }
        self.container = Some(container);
        self.container_rev.bump();
        Changes::CONTAINER
    }

    fn add_sticky_ref(&mut self, sentinels: SentinelPair<E>, target: E) -> Changes {
        // Non-short-circuiting: both entries must be written.
        let changed = self.insert(sentinels.top, target) | self.insert(sentinels.bottom, target);
        if changed {
            self.targets_rev.bump();
            Changes::TARGETS
        } else {
            Changes::empty()
        }
    }
}

impl<E: Copy + Ord> StickyState<E> for Registry<E> {
    fn container_ref(&self) -> Option<E> {
        self.container
    }

    fn lookup_target(&self, sentinel: E) -> Option<E> {
        self.targets.get(&sentinel).copied()
    }

    fn container_revision(&self) -> Revision {
        self.container_rev
    }

    fn targets_revision(&self) -> Revision {
        self.targets_rev
    }
}
