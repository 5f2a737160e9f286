// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis projection and margin formatting.
//!
//! Layout measurements arrive as two-dimensional [`Rect`]s and [`Size`]s.
//! The scene only ever reasons about one axis at a time, so [`Axis`] projects
//! them into axis-relative values:
//!
//! - [`AxisSpan`]: `{start, end, size}` of a rect along the axis.
//! - [`AxisContainer`]: `{start, client_size, scroll_size, scroll_position}`
//!   of a [`ContainerRect`] along the axis.
//!
//! [`Length`] and [`Margin`] format the viewport margin handed to the
//! viewport observer, CSS-style (`"-120px 0px 40% 0px"`).

use core::fmt;

use kurbo::{Rect, Size, Vec2};

/// The scroll axis a scene tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Track vertical scrolling (top → bottom).
    #[default]
    Vertical,
    /// Track horizontal scrolling (left → right).
    Horizontal,
}

impl Axis {
    /// Returns the axis selected by a `vertical` option flag.
    #[inline]
    #[must_use]
    pub const fn from_vertical(vertical: bool) -> Self {
        if vertical {
            Self::Vertical
        } else {
            Self::Horizontal
        }
    }

    /// Returns `true` for [`Axis::Vertical`].
    #[inline]
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }

    /// Projects a rect onto this axis.
    #[must_use]
    pub fn span(self, rect: Rect) -> AxisSpan {
        let rect = rect.abs();
        match self {
            Self::Vertical => AxisSpan {
                start: rect.y0,
                end: rect.y1,
                size: rect.height(),
            },
            Self::Horizontal => AxisSpan {
                start: rect.x0,
                end: rect.x1,
                size: rect.width(),
            },
        }
    }

    /// Returns the component of `size` along this axis.
    #[inline]
    #[must_use]
    pub fn size(self, size: Size) -> f64 {
        match self {
            Self::Vertical => size.height,
            Self::Horizontal => size.width,
        }
    }

    /// Returns the component of `offset` along this axis.
    #[inline]
    #[must_use]
    pub fn offset(self, offset: Vec2) -> f64 {
        match self {
            Self::Vertical => offset.y,
            Self::Horizontal => offset.x,
        }
    }

    /// Projects a container measurement onto this axis.
    #[must_use]
    pub fn container(self, rect: &ContainerRect) -> AxisContainer {
        let bounds = self.span(rect.bounds);
        AxisContainer {
            start: bounds.start,
            client_size: bounds.size,
            scroll_size: self.size(rect.scroll_size),
            scroll_position: self.offset(rect.scroll_position),
        }
    }
}

/// A rect projected onto one axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct AxisSpan {
    /// Leading edge.
    pub start: f64,
    /// Trailing edge.
    pub end: f64,
    /// Extent along the axis (`end - start`).
    pub size: f64,
}

/// Measurement of a scroll container, as reported by a
/// [`Container`](crate::backend::Container).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ContainerRect {
    /// Visible area of the container in viewport coordinates. For the window
    /// this is `(0, 0)` to the viewport size.
    pub bounds: Rect,
    /// Total scrollable content size.
    pub scroll_size: Size,
    /// Current scroll position.
    pub scroll_position: Vec2,
}

/// A [`ContainerRect`] projected onto one axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct AxisContainer {
    /// Leading edge of the visible area in viewport coordinates.
    pub start: f64,
    /// Visible extent.
    pub client_size: f64,
    /// Scrollable content extent.
    pub scroll_size: f64,
    /// Current scroll position.
    pub scroll_position: f64,
}

/// A CSS-style length used in margin specifications.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the reference size (`50.0` means half).
    Percent(f64),
}

impl Length {
    /// A zero pixel length.
    pub const ZERO: Self = Self::Px(0.0);
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Px(px) => write!(f, "{}px", normalize(px)),
            Self::Percent(pct) => write!(f, "{}%", normalize(pct)),
        }
    }
}

// Drops the sign of negative zero so margins never render as `-0px`.
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Margins applied around an intersection root, in CSS order.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Margin {
    /// Top margin.
    pub top: Length,
    /// Right margin.
    pub right: Length,
    /// Bottom margin.
    pub bottom: Length,
    /// Left margin.
    pub left: Length,
}

impl Margin {
    /// Builds a margin that only expands (or shrinks) along `axis`; the
    /// cross-axis sides are zero.
    #[must_use]
    pub fn along(axis: Axis, start: Length, end: Length) -> Self {
        match axis {
            Axis::Vertical => Self {
                top: start,
                bottom: end,
                ..Self::default()
            },
            Axis::Horizontal => Self {
                left: start,
                right: end,
                ..Self::default()
            },
        }
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_follows_axis() {
        let rect = Rect::new(10.0, 20.0, 110.0, 220.0);
        assert_eq!(
            Axis::Vertical.span(rect),
            AxisSpan {
                start: 20.0,
                end: 220.0,
                size: 200.0
            }
        );
        assert_eq!(
            Axis::Horizontal.span(rect),
            AxisSpan {
                start: 10.0,
                end: 110.0,
                size: 100.0
            }
        );
    }

    #[test]
    fn container_projection_picks_matching_components() {
        let rect = ContainerRect {
            bounds: Rect::new(0.0, 50.0, 300.0, 650.0),
            scroll_size: Size::new(900.0, 4000.0),
            scroll_position: Vec2::new(12.0, 340.0),
        };
        let v = Axis::Vertical.container(&rect);
        assert_eq!(v.start, 50.0);
        assert_eq!(v.client_size, 600.0);
        assert_eq!(v.scroll_size, 4000.0);
        assert_eq!(v.scroll_position, 340.0);

        let h = Axis::Horizontal.container(&rect);
        assert_eq!(h.client_size, 300.0);
        assert_eq!(h.scroll_position, 12.0);
    }

    #[test]
    fn length_formatting() {
        assert_eq!(Length::Px(-120.0).to_string(), "-120px");
        assert_eq!(Length::Percent(12.5).to_string(), "12.5%");
        assert_eq!(Length::Px(-0.0).to_string(), "0px");
    }

    #[test]
    fn margin_along_axis() {
        let m = Margin::along(Axis::Vertical, Length::Px(-10.0), Length::Percent(20.0));
        assert_eq!(m.to_string(), "-10px 0px 20% 0px");

        let m = Margin::along(Axis::Horizontal, Length::Px(-10.0), Length::Px(5.0));
        assert_eq!(m.to_string(), "0px 5px 0px -10px");
    }
}
