// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene options: public input, sanitization, derivation and diffing.
//!
//! Options flow through three shapes:
//!
//! - [`PartialOptions`]: what callers pass to
//!   [`Scene::modify`](crate::scene::Scene::modify). Every field is optional.
//! - [`PublicOptions`]: the merged, sanitized user-facing configuration.
//! - [`PrivateOptions`]: the fully-resolved form the scene works with
//!   (scroll parent resolved to a container target, `vertical` resolved to an
//!   [`Axis`]).
//!
//! [`process`] turns a partial update into the next public/private pair and
//! [`diff`] compares two private snapshots field by field, producing the
//! [`FieldSet`] that drives every side effect in the scene.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use crate::defaults::DefaultOptions;
use crate::geometry::{Axis, Length};

/// The scroll container a scene tracks against.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ScrollParent<E> {
    /// The top-level viewport.
    #[default]
    Window,
    /// A scrollable element.
    Element(E),
}

impl<E> ScrollParent<E> {
    /// Returns the element, if this is not the window.
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<&E> {
        match self {
            Self::Window => None,
            Self::Element(element) => Some(element),
        }
    }
}

/// A function from element size to pixels.
pub type ExtentFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// An offset or size expressed relative to the tracked element's size.
///
/// Extents resolve to pixels through [`resolve`](Self::resolve). Function
/// extents compare by identity, so passing the same `Arc` twice is not a
/// change, while two separately built closures always are.
#[derive(Clone)]
pub enum Extent {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of the element size (`100.0` is the full element).
    Percent(f64),
    /// Arbitrary function of the element size.
    Func(ExtentFn),
}

impl Extent {
    /// Builds a function extent.
    #[must_use]
    pub fn func(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Func(Arc::new(f))
    }

    /// Resolves the extent to pixels for an element of `element_size`.
    #[must_use]
    pub fn resolve(&self, element_size: f64) -> f64 {
        match self {
            Self::Px(px) => *px,
            Self::Percent(pct) => pct / 100.0 * element_size,
            Self::Func(f) => f(element_size),
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v.is_finite(),
            Self::Func(_) => true,
        }
    }
}

impl PartialEq for Extent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Px(a), Self::Px(b)) | (Self::Percent(a), Self::Percent(b)) => a == b,
            (Self::Func(a), Self::Func(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "Px({px})"),
            Self::Percent(pct) => write!(f, "Percent({pct})"),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<f64> for Extent {
    fn from(px: f64) -> Self {
        Self::Px(px)
    }
}

impl From<Length> for Extent {
    fn from(length: Length) -> Self {
        match length {
            Length::Px(px) => Self::Px(px),
            Length::Percent(pct) => Self::Percent(pct),
        }
    }
}

impl FromStr for Extent {
    type Err = ParseExtentError;

    /// Parses `"20px"`, `"50%"` or a bare number (pixels).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseExtentError::Empty);
        }
        let (number, percent) = if let Some(n) = s.strip_suffix('%') {
            (n, true)
        } else if let Some(n) = s.strip_suffix("px") {
            (n, false)
        } else if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(ParseExtentError::UnknownUnit);
        } else {
            (s, false)
        };
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| ParseExtentError::InvalidNumber)?;
        if !value.is_finite() {
            return Err(ParseExtentError::InvalidNumber);
        }
        Ok(if percent {
            Self::Percent(value)
        } else {
            Self::Px(value)
        })
    }
}

/// Errors from parsing an [`Extent`] string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseExtentError {
    /// The string was empty.
    Empty,
    /// The numeric part was not a finite number.
    InvalidNumber,
    /// The unit suffix was neither `px` nor `%`.
    UnknownUnit,
}

impl fmt::Display for ParseExtentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty extent"),
            Self::InvalidNumber => f.write_str("extent is not a finite number"),
            Self::UnknownUnit => f.write_str("extent unit must be `px` or `%`"),
        }
    }
}

impl core::error::Error for ParseExtentError {}

/// An option field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// The tracked element.
    Element,
    /// The scroll container.
    ScrollParent,
    /// The scroll axis.
    Vertical,
    /// Leading edge of the trackable window.
    TrackStart,
    /// Trailing edge of the trackable window.
    TrackEnd,
    /// Trigger offset relative to the element.
    Offset,
    /// Trigger size relative to the element.
    Size,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Element,
        Self::ScrollParent,
        Self::Vertical,
        Self::TrackStart,
        Self::TrackEnd,
        Self::Offset,
        Self::Size,
    ];

    /// Returns the user-facing option name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::ScrollParent => "scroll_parent",
            Self::Vertical => "vertical",
            Self::TrackStart => "track_start",
            Self::TrackEnd => "track_end",
            Self::Offset => "offset",
            Self::Size => "size",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of [`Field`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every field.
    pub const ALL: Self = Self(0b111_1111);

    /// Returns `true` if `field` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    /// Adds `field` to the set.
    #[inline]
    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    /// Returns the set with `field` added.
    #[inline]
    #[must_use]
    pub const fn with(self, field: Field) -> Self {
        Self(self.0 | field.bit())
    }

    /// Returns `true` if no field is in the set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of fields in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the fields in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Field::name)).finish()
    }
}

/// The merged, user-facing configuration of a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicOptions<E> {
    /// The tracked element.
    pub element: Option<E>,
    /// The scroll container.
    pub scroll_parent: ScrollParent<E>,
    /// Track vertical (`true`) or horizontal scrolling.
    pub vertical: bool,
    /// Fraction of the container size where tracking starts (progress 0).
    pub track_start: f64,
    /// Fraction of the container size where tracking ends (progress 1).
    pub track_end: f64,
    /// Start of the trigger region relative to the element's leading edge.
    pub offset: Extent,
    /// Length of the trigger region.
    pub size: Extent,
}

impl<E> PublicOptions<E> {
    /// Builds options from defaults, with no element and the window as
    /// scroll parent.
    #[must_use]
    pub fn from_defaults(defaults: &DefaultOptions) -> Self {
        Self {
            element: None,
            scroll_parent: ScrollParent::Window,
            vertical: defaults.vertical,
            track_start: defaults.track_start,
            track_end: defaults.track_end,
            offset: defaults.offset.clone(),
            size: defaults.size.clone(),
        }
    }
}

impl<E: Clone> PublicOptions<E> {
    /// Returns a copy with every field present in `partial` replaced.
    #[must_use]
    pub fn merge(&self, partial: &PartialOptions<E>) -> Self {
        Self {
            element: partial
                .element
                .clone()
                .unwrap_or_else(|| self.element.clone()),
            scroll_parent: partial
                .scroll_parent
                .clone()
                .unwrap_or_else(|| self.scroll_parent.clone()),
            vertical: partial.vertical.unwrap_or(self.vertical),
            track_start: partial.track_start.unwrap_or(self.track_start),
            track_end: partial.track_end.unwrap_or(self.track_end),
            offset: partial.offset.clone().unwrap_or_else(|| self.offset.clone()),
            size: partial.size.clone().unwrap_or_else(|| self.size.clone()),
        }
    }
}

/// A partial option update.
///
/// Built with the chainable setters:
///
/// ```
/// use scrollscene_core::options::{Extent, PartialOptions};
///
/// let update = PartialOptions::<u32>::new()
///     .element(7)
///     .track_start(0.8)
///     .offset("25%".parse::<Extent>().unwrap());
/// assert!(!update.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PartialOptions<E> {
    /// New tracked element; `Some(None)` clears it.
    pub element: Option<Option<E>>,
    /// New scroll container.
    pub scroll_parent: Option<ScrollParent<E>>,
    /// New axis flag.
    pub vertical: Option<bool>,
    /// New track start fraction.
    pub track_start: Option<f64>,
    /// New track end fraction.
    pub track_end: Option<f64>,
    /// New trigger offset.
    pub offset: Option<Extent>,
    /// New trigger size.
    pub size: Option<Extent>,
}

impl<E> Default for PartialOptions<E> {
    fn default() -> Self {
        Self {
            element: None,
            scroll_parent: None,
            vertical: None,
            track_start: None,
            track_end: None,
            offset: None,
            size: None,
        }
    }
}

impl<E> PartialOptions<E> {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracked element.
    #[must_use]
    pub fn element(mut self, element: E) -> Self {
        self.element = Some(Some(element));
        self
    }

    /// Clears the tracked element.
    #[must_use]
    pub fn clear_element(mut self) -> Self {
        self.element = Some(None);
        self
    }

    /// Sets the scroll container.
    #[must_use]
    pub fn scroll_parent(mut self, scroll_parent: ScrollParent<E>) -> Self {
        self.scroll_parent = Some(scroll_parent);
        self
    }

    /// Sets the axis flag.
    #[must_use]
    pub fn vertical(mut self, vertical: bool) -> Self {
        self.vertical = Some(vertical);
        self
    }

    /// Sets the track start fraction.
    #[must_use]
    pub fn track_start(mut self, track_start: f64) -> Self {
        self.track_start = Some(track_start);
        self
    }

    /// Sets the track end fraction.
    #[must_use]
    pub fn track_end(mut self, track_end: f64) -> Self {
        self.track_end = Some(track_end);
        self
    }

    /// Sets the trigger offset.
    #[must_use]
    pub fn offset(mut self, offset: impl Into<Extent>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Sets the trigger size.
    #[must_use]
    pub fn size(mut self, size: impl Into<Extent>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.element.is_none()
            && self.scroll_parent.is_none()
            && self.vertical.is_none()
            && self.track_start.is_none()
            && self.track_end.is_none()
            && self.offset.is_none()
            && self.size.is_none()
    }
}

impl<E: Clone> From<&PublicOptions<E>> for PartialOptions<E> {
    fn from(public: &PublicOptions<E>) -> Self {
        Self {
            element: Some(public.element.clone()),
            scroll_parent: Some(public.scroll_parent.clone()),
            vertical: Some(public.vertical),
            track_start: Some(public.track_start),
            track_end: Some(public.track_end),
            offset: Some(public.offset.clone()),
            size: Some(public.size.clone()),
        }
    }
}

/// The resolved configuration the scene computes with.
#[derive(Clone, Debug, PartialEq)]
pub struct PrivateOptions<E> {
    /// The tracked element.
    pub element: Option<E>,
    /// The resolved scroll container.
    pub container: ScrollParent<E>,
    /// The tracked axis.
    pub axis: Axis,
    /// Track start fraction, within `[0, 1]`.
    pub track_start: f64,
    /// Track end fraction, within `[0, 1]`.
    pub track_end: f64,
    /// Trigger offset.
    pub offset: Extent,
    /// Trigger size.
    pub size: Extent,
}

/// How sanitization altered a value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CorrectionKind {
    /// The value was not finite and was dropped from the update.
    Rejected,
    /// The value was clamped into range.
    Clamped {
        /// Value as given.
        from: f64,
        /// Value after clamping.
        to: f64,
    },
}

/// A single sanitization correction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correction {
    /// The corrected field.
    pub field: Field,
    /// What happened to the value.
    pub kind: CorrectionKind,
}

/// Result of [`sanitize`].
#[derive(Clone, Debug)]
pub struct Sanitized<E> {
    /// The corrected update.
    pub options: PartialOptions<E>,
    /// Every correction that was applied.
    pub corrections: Vec<Correction>,
}

/// Corrects invalid values in a partial update.
///
/// Non-finite numbers are dropped from the update (the previous value stays
/// in effect) and track fractions are clamped into `[0, 1]`.
#[must_use]
pub fn sanitize<E>(mut options: PartialOptions<E>) -> Sanitized<E> {
    let mut corrections = Vec::new();

    for (field, slot) in [
        (Field::TrackStart, &mut options.track_start),
        (Field::TrackEnd, &mut options.track_end),
    ] {
        let Some(value) = *slot else { continue };
        if !value.is_finite() {
            *slot = None;
            corrections.push(Correction {
                field,
                kind: CorrectionKind::Rejected,
            });
        } else if !(0.0..=1.0).contains(&value) {
            let to = value.clamp(0.0, 1.0);
            *slot = Some(to);
            corrections.push(Correction {
                field,
                kind: CorrectionKind::Clamped { from: value, to },
            });
        }
    }

    for (field, slot) in [
        (Field::Offset, &mut options.offset),
        (Field::Size, &mut options.size),
    ] {
        if slot.as_ref().is_some_and(|extent| !extent.is_finite()) {
            *slot = None;
            corrections.push(Correction {
                field,
                kind: CorrectionKind::Rejected,
            });
        }
    }

    Sanitized {
        options,
        corrections,
    }
}

/// Result of [`process`].
#[derive(Clone, Debug)]
pub struct Processed<E> {
    /// The merged public options.
    pub public: PublicOptions<E>,
    /// The derived private options.
    pub private: PrivateOptions<E>,
    /// Corrections applied while sanitizing the update.
    pub corrections: Vec<Correction>,
}

/// Sanitizes `partial`, merges it onto `current` and derives private options.
///
/// `previous` is the private snapshot currently in effect; fields whose
/// resolved value is unchanged keep the previous resolution.
#[must_use]
pub fn process<E: Clone + PartialEq>(
    current: &PublicOptions<E>,
    partial: PartialOptions<E>,
    previous: Option<&PrivateOptions<E>>,
) -> Processed<E> {
    let Sanitized {
        options,
        corrections,
    } = sanitize(partial);
    let public = current.merge(&options);
    let private = derive(&public, previous);
    Processed {
        public,
        private,
        corrections,
    }
}

fn derive<E: Clone + PartialEq>(
    public: &PublicOptions<E>,
    previous: Option<&PrivateOptions<E>>,
) -> PrivateOptions<E> {
    let container = match previous {
        Some(prev) if prev.container == public.scroll_parent => prev.container.clone(),
        _ => public.scroll_parent.clone(),
    };
    PrivateOptions {
        element: public.element.clone(),
        container,
        axis: Axis::from_vertical(public.vertical),
        track_start: public.track_start,
        track_end: public.track_end,
        offset: public.offset.clone(),
        size: public.size.clone(),
    }
}

/// Compares two private snapshots field by field.
///
/// Without a previous snapshot every field counts as changed.
#[must_use]
pub fn diff<E: PartialEq>(previous: Option<&PrivateOptions<E>>, next: &PrivateOptions<E>) -> FieldSet {
    let Some(prev) = previous else {
        return FieldSet::ALL;
    };
    let mut changed = FieldSet::EMPTY;
    if prev.element != next.element {
        changed.insert(Field::Element);
    }
    if prev.container != next.container {
        changed.insert(Field::ScrollParent);
    }
    if prev.axis != next.axis {
        changed.insert(Field::Vertical);
    }
    if prev.track_start != next.track_start {
        changed.insert(Field::TrackStart);
    }
    if prev.track_end != next.track_end {
        changed.insert(Field::TrackEnd);
    }
    if prev.offset != next.offset {
        changed.insert(Field::Offset);
    }
    if prev.size != next.size {
        changed.insert(Field::Size);
    }
    changed
}

/// Converts private options back to their public form.
#[must_use]
pub fn output<E: Clone>(private: &PrivateOptions<E>) -> PublicOptions<E> {
    PublicOptions {
        element: private.element.clone(),
        scroll_parent: private.container.clone(),
        vertical: private.axis.is_vertical(),
        track_start: private.track_start,
        track_end: private.track_end,
        offset: private.offset.clone(),
        size: private.size.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PublicOptions<u32> {
        PublicOptions::from_defaults(&DefaultOptions::BUILTIN)
    }

    #[test]
    fn extent_parsing() {
        assert_eq!("20px".parse::<Extent>(), Ok(Extent::Px(20.0)));
        assert_eq!(" 50% ".parse::<Extent>(), Ok(Extent::Percent(50.0)));
        assert_eq!("-12.5".parse::<Extent>(), Ok(Extent::Px(-12.5)));
        assert_eq!("".parse::<Extent>(), Err(ParseExtentError::Empty));
        assert_eq!("3em".parse::<Extent>(), Err(ParseExtentError::UnknownUnit));
        assert_eq!("abcpx".parse::<Extent>(), Err(ParseExtentError::InvalidNumber));
        assert_eq!("NaN%".parse::<Extent>(), Err(ParseExtentError::InvalidNumber));
    }

    #[test]
    fn extent_resolution() {
        assert_eq!(Extent::Px(30.0).resolve(200.0), 30.0);
        assert_eq!(Extent::Percent(50.0).resolve(200.0), 100.0);
        assert_eq!(Extent::func(|s| s * 2.0 + 1.0).resolve(10.0), 21.0);
    }

    #[test]
    fn function_extents_compare_by_identity() {
        let f = Extent::func(|s| s);
        assert_eq!(f, f.clone());
        assert_ne!(f, Extent::func(|s| s));
    }

    #[test]
    fn sanitize_clamps_and_rejects() {
        let out = sanitize(
            PartialOptions::<u32>::new()
                .track_start(1.5)
                .track_end(f64::NAN)
                .offset(f64::INFINITY)
                .size(Extent::Percent(80.0)),
        );
        assert_eq!(out.options.track_start, Some(1.0));
        assert_eq!(out.options.track_end, None);
        assert_eq!(out.options.offset, None);
        assert_eq!(out.options.size, Some(Extent::Percent(80.0)));
        assert_eq!(
            out.corrections,
            vec![
                Correction {
                    field: Field::TrackStart,
                    kind: CorrectionKind::Clamped { from: 1.5, to: 1.0 },
                },
                Correction {
                    field: Field::TrackEnd,
                    kind: CorrectionKind::Rejected,
                },
                Correction {
                    field: Field::Offset,
                    kind: CorrectionKind::Rejected,
                },
            ]
        );
    }

    #[test]
    fn first_process_marks_everything_changed() {
        let processed = process(&base(), PartialOptions::new().element(1), None);
        assert_eq!(diff(None, &processed.private), FieldSet::ALL);
        assert_eq!(processed.private.element, Some(1));
        assert_eq!(processed.private.axis, Axis::Vertical);
    }

    #[test]
    fn diff_is_flat_and_exact() {
        let first = process(&base(), PartialOptions::new().element(1), None);
        let second = process(
            &first.public,
            PartialOptions::new().vertical(false).track_end(0.25),
            Some(&first.private),
        );
        let changed = diff(Some(&first.private), &second.private);
        assert_eq!(
            changed,
            FieldSet::EMPTY.with(Field::Vertical).with(Field::TrackEnd)
        );
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn reapplying_current_values_changes_nothing() {
        let first = process(&base(), PartialOptions::new().element(3), None);
        let again = process(
            &first.public,
            PartialOptions::from(&first.public),
            Some(&first.private),
        );
        assert!(diff(Some(&first.private), &again.private).is_empty());

        let empty = process(&first.public, PartialOptions::new(), Some(&first.private));
        assert!(diff(Some(&first.private), &empty.private).is_empty());
    }

    #[test]
    fn output_round_trips_public_view() {
        let processed = process(
            &base(),
            PartialOptions::new()
                .element(9)
                .scroll_parent(ScrollParent::Element(4))
                .vertical(false),
            None,
        );
        assert_eq!(output(&processed.private), processed.public);
    }

    #[test]
    fn field_set_debug_lists_names() {
        let set = FieldSet::EMPTY.with(Field::Offset).with(Field::Element);
        assert_eq!(format!("{set:?}"), r#"{"element", "offset"}"#);
    }
}
