// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element descriptions for the container, section, and sticky child components.
//!
//! ## Overview
//!
//! Rendering arbitrary markup is left to the embedding toolkit. Each component
//! describes the element it wants (tag, class, inline style, pass-through
//! attributes) and the toolkit creates it, then reports the element identity back
//! through the mount calls on [`StickyContainer`](crate::container::StickyContainer).
//!
//! The positioning itself is plain CSS: include [`STYLESHEET`] once per document.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use crate::host::Declaration;

/// Class of the sticky child.
pub const STICKY_CLASS: &str = "sticky";
/// Class of the section element.
pub const SECTION_CLASS: &str = "sticky__section";
/// Class of the top sentinel.
pub const SENTINEL_TOP_CLASS: &str = "sticky__sentinel_top";
/// Class of the bottom sentinel.
pub const SENTINEL_BOTTOM_CLASS: &str = "sticky__sentinel_bottom";

/// Rules for the classes above.
pub const STYLESHEET: &str = "\
.sticky { position: sticky; top: 0; }
.sticky__section { position: relative; }
.sticky__sentinel_top, .sticky__sentinel_bottom { left: 0; right: 0; visibility: hidden; pointer-events: none; }
.sticky__sentinel_top { position: relative; height: 1px; }
.sticky__sentinel_bottom { position: absolute; bottom: 0; }
";

/// A pass-through attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name.
    pub name: Cow<'static, str>,
    /// Attribute value.
    pub value: String,
}

/// Caller-supplied element options: a tag override and pass-through attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementProps {
    /// Tag to render instead of the component's default.
    pub tag: Option<Cow<'static, str>>,
    /// Attributes copied onto the rendered element.
    pub attributes: Vec<Attribute>,
}

impl ElementProps {
    /// Options with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the rendered tag.
    pub fn with_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add a pass-through attribute.
    pub fn with_attribute(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Describe the element, falling back to `default_tag`.
    ///
    /// A pass-through `class` attribute is appended to `class` rather than
    /// replacing it.
    pub fn describe(&self, default_tag: &'static str, class: Option<&str>) -> ElementDesc {
        let mut classes: Vec<&str> = class.into_iter().collect();
        let mut attributes = Vec::with_capacity(self.attributes.len());
        for attr in &self.attributes {
            if attr.name == "class" {
                classes.push(&attr.value);
            } else {
                attributes.push(attr.clone());
            }
        }
        ElementDesc {
            tag: self
                .tag
                .clone()
                .unwrap_or(Cow::Borrowed(default_tag)),
            class: classes.join(" "),
            style: Vec::new(),
            attributes,
        }
    }
}

/// A rendered element description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDesc {
    /// Element tag.
    pub tag: Cow<'static, str>,
    /// Space separated class list; empty when the element has none.
    pub class: String,
    /// Inline style declarations.
    pub style: Vec<Declaration>,
    /// Pass-through attributes.
    pub attributes: Vec<Attribute>,
}

impl ElementDesc {
    /// A bare element with a class and no attributes.
    pub fn with_class(tag: &'static str, class: &str) -> Self {
        Self {
            tag: Cow::Borrowed(tag),
            class: class.into(),
            style: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Value of a pass-through attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of an inline style property.
    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }
}

/// Props of a sticky child: only element options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StickyProps {
    /// Tag override (default `div`) and pass-through attributes.
    pub element: ElementProps,
}

impl StickyProps {
    /// Describe the sticky child element.
    pub fn describe(&self) -> ElementDesc {
        self.element.describe("div", Some(STICKY_CLASS))
    }
}
