// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS lengths and the sentinel compensation geometry.
//!
//! ## Overview
//!
//! The style reader hands back resolved values as strings. Pixel values are
//! parsed so they can be evaluated and negated exactly; anything else (`1em`,
//! `calc(..)`, ...) is carried verbatim and only ever composed inside `calc()`.
//!
//! ```
//! use understory_sticky::host::ResolvedStyle;
//! use understory_sticky::length::SectionGeometry;
//!
//! let style = ResolvedStyle::new("10px", "5px", "40px", "5px");
//! let geometry = SectionGeometry::from_style(&style);
//! assert_eq!(geometry.target_height.to_px(), Some(60.0));
//! assert_eq!(geometry.target_height.to_css(), "calc(10px + 5px + 40px + 5px)");
//! assert_eq!(geometry.top_sentinel_margin().to_css(), "-10px");
//! ```

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::host::ResolvedStyle;

/// A single CSS length value.
#[derive(Clone, Debug, PartialEq)]
pub enum Length {
    /// An absolute pixel length.
    Px(f64),
    /// Any other length expression, kept as written.
    Other(String),
}

impl Length {
    /// Parse a resolved length. Unparseable input is kept as [`Length::Other`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value == "0" {
            return Self::Px(0.0);
        }
        if let Some(number) = value.strip_suffix("px") {
            if let Ok(px) = number.trim_end().parse::<f64>() {
                if px.is_finite() {
                    return Self::Px(px);
                }
            }
        }
        Self::Other(value.to_string())
    }

    /// Pixel value, if this is an absolute length.
    pub fn to_px(&self) -> Option<f64> {
        match self {
            Self::Px(px) => Some(*px),
            Self::Other(_) => None,
        }
    }

    /// The same length with the opposite sign.
    pub fn negated(&self) -> Self {
        match self {
            Self::Px(px) => Self::Px(-px),
            Self::Other(expr) => Self::Other(format!("calc(-1 * {expr})")),
        }
    }

    /// CSS text for this length.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Avoid printing `-0px`.
            Self::Px(px) if *px == 0.0 => f.write_str("0px"),
            Self::Px(px) => write!(f, "{px}px"),
            Self::Other(expr) => f.write_str(expr),
        }
    }
}

/// An additive composition of lengths, rendered as `calc(a + b + ..)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LengthSum {
    terms: Vec<Length>,
}

impl LengthSum {
    /// Build a sum from its terms, in order.
    pub fn new(terms: impl IntoIterator<Item = Length>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    /// The summed terms.
    pub fn terms(&self) -> &[Length] {
        &self.terms
    }

    /// Evaluate to pixels when every term is an absolute length.
    pub fn to_px(&self) -> Option<f64> {
        self.terms.iter().map(Length::to_px).sum()
    }

    /// CSS text for this sum.
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LengthSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.terms.as_slice() {
            [] => f.write_str("0px"),
            [single] => write!(f, "{single}"),
            terms => {
                f.write_str("calc(")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{term}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Per-section compensation geometry derived from the guarded sticky target.
///
/// Computed once per change of the guarded target, never per notification.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionGeometry {
    /// `margin-top + padding-top + height + padding-bottom` of the sticky target.
    ///
    /// Applied as the bottom sentinel's height so the page does not jump when the
    /// target un-pins.
    pub target_height: LengthSum,
    /// The sticky target's `margin-top`. The top sentinel gets the negated value.
    pub sentinel_margin_top: Length,
}

impl SectionGeometry {
    /// Derive the geometry from the target's resolved style.
    pub fn from_style(style: &ResolvedStyle) -> Self {
        let margin_top = Length::parse(&style.margin_top);
        let target_height = LengthSum::new([
            margin_top.clone(),
            Length::parse(&style.padding_top),
            Length::parse(&style.height),
            Length::parse(&style.padding_bottom),
        ]);
        Self {
            target_height,
            sentinel_margin_top: margin_top,
        }
    }

    /// Margin applied to the top sentinel, so its crossing point lines up with the
    /// start of the target's margin box.
    pub fn top_sentinel_margin(&self) -> Length {
        self.sentinel_margin_top.negated()
    }
}
