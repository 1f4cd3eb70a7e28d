// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording host used by the unit tests.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::host::{Declaration, IntersectionHost, ObserveRequest, ResolvedStyle, StyleHost};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HostCall {
    Observe(usize, ObserveRequest<u32>),
    Unobserve(usize),
    Style(u32, Vec<Declaration>),
}

/// Hands out sequential subscription ids and records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    calls: Vec<HostCall>,
    next: usize,
    styles: BTreeMap<u32, ResolvedStyle>,
    inline: BTreeMap<(u32, String), String>,
}

impl RecordingHost {
    pub(crate) fn set_style(&mut self, element: u32, mt: &str, pt: &str, h: &str, pb: &str) {
        self.styles
            .insert(element, ResolvedStyle::new(mt, pt, h, pb));
    }

    pub(crate) fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub(crate) fn requests(&self) -> impl Iterator<Item = &ObserveRequest<u32>> {
        self.calls.iter().filter_map(|c| match c {
            HostCall::Observe(_, r) => Some(r),
            _ => None,
        })
    }

    pub(crate) fn observed(&self) -> usize {
        self.requests().count()
    }

    pub(crate) fn unobserved(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Unobserve(_)))
            .count()
    }

    /// Subscriptions observed and not yet unobserved.
    pub(crate) fn live(&self) -> usize {
        self.observed() - self.unobserved()
    }

    pub(crate) fn inline_style(&self, element: u32, property: &str) -> Option<&str> {
        self.inline
            .get(&(element, String::from(property)))
            .map(String::as_str)
    }
}

impl IntersectionHost<u32> for RecordingHost {
    type Subscription = usize;

    fn observe(&mut self, request: ObserveRequest<u32>) -> usize {
        let id = self.next;
        self.next += 1;
        self.calls.push(HostCall::Observe(id, request));
        id
    }

    fn unobserve(&mut self, subscription: usize) {
        self.calls.push(HostCall::Unobserve(subscription));
    }
}

impl StyleHost<u32> for RecordingHost {
    fn resolved_style(&self, element: u32) -> Option<ResolvedStyle> {
        self.styles.get(&element).cloned()
    }

    fn set_inline_style(&mut self, element: u32, declarations: &[Declaration]) {
        for d in declarations {
            self.inline
                .insert((element, String::from(&*d.property)), d.value.clone());
        }
        self.calls.push(HostCall::Style(element, declarations.to_vec()));
    }
}
