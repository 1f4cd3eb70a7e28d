// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition errors.
//!
//! Only misuse of the component structure is an error. A missing container or a
//! notification for an unknown sentinel is deferred or dropped instead.

use crate::types::SectionId;

/// Errors returned when sticky components are composed incorrectly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StickyError {
    /// The section does not exist in this container (never added, or removed).
    #[error("section {0:?} is not registered in this container")]
    UnknownSection(SectionId),
    /// A sticky child was mounted before its section's sentinels.
    #[error("section {0:?} has no mounted sentinels")]
    SentinelsNotMounted(SectionId),
    /// The section context is stale: the section re-mounted with other sentinels.
    #[error("section context for {0:?} does not match its current sentinels")]
    ForeignContext(SectionId),
}

/// Result alias for sticky composition.
pub type Result<T, E = StickyError> = core::result::Result<T, E>;
