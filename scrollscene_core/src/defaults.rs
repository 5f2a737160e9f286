// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide default options.
//!
//! Every [`Scene`](crate::scene::Scene) starts from a snapshot of the
//! defaults held here, then merges its own constructor options on top.
//!
//! # Lifecycle
//!
//! The store is initialized with [`DefaultOptions::BUILTIN`] and lives for
//! the whole process. It is meant to be configured once at startup through
//! [`set_defaults`] (or
//! [`Scene::default_options`](crate::scene::Scene::default_options)) and is
//! only read afterwards, once per scene construction. Updating it never
//! affects scenes that already exist.
//!
//! The tracked element and the scroll parent are per-instance and are not
//! part of the defaults: a new scene has no element and tracks the window.

use std::sync::{PoisonError, RwLock};

use crate::options::{Extent, PartialOptions, sanitize};

/// The option values new scenes start from.
#[derive(Clone, Debug, PartialEq)]
pub struct DefaultOptions {
    /// Track vertical (`true`) or horizontal scrolling.
    pub vertical: bool,
    /// Track start fraction.
    pub track_start: f64,
    /// Track end fraction.
    pub track_end: f64,
    /// Trigger offset.
    pub offset: Extent,
    /// Trigger size.
    pub size: Extent,
}

impl DefaultOptions {
    /// The built-in defaults: vertical tracking over the whole container
    /// (from its trailing edge to its leading edge), with the trigger region
    /// covering the whole element.
    pub const BUILTIN: Self = Self {
        vertical: true,
        track_start: 1.0,
        track_end: 0.0,
        offset: Extent::Px(0.0),
        size: Extent::Percent(100.0),
    };
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self::BUILTIN
    }
}

static DEFAULTS: RwLock<DefaultOptions> = RwLock::new(DefaultOptions::BUILTIN);

/// Returns a snapshot of the current defaults.
#[must_use]
pub fn defaults() -> DefaultOptions {
    DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Sanitizes `partial` and merges it into the defaults, returning the new
/// snapshot.
///
/// `element` and `scroll_parent` in `partial` are ignored.
pub fn set_defaults<E>(partial: PartialOptions<E>) -> DefaultOptions {
    let options = sanitize(partial).options;
    let mut current = DEFAULTS.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(vertical) = options.vertical {
        current.vertical = vertical;
    }
    if let Some(track_start) = options.track_start {
        current.track_start = track_start;
    }
    if let Some(track_end) = options.track_end {
        current.track_end = track_end;
    }
    if let Some(offset) = options.offset {
        current.offset = offset;
    }
    if let Some(size) = options.size {
        current.size = size;
    }
    current.clone()
}

/// Restores [`DefaultOptions::BUILTIN`].
pub fn reset_defaults() {
    *DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = DefaultOptions::BUILTIN;
}
