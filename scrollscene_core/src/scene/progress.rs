// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure progress math: trigger bounds, viewport margins, progress and edges.

use crate::event::EventKind;
use crate::geometry::{Axis, Length, Margin};
use crate::options::Extent;

/// The trigger region along the scroll axis, relative to the element's
/// leading edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TriggerBounds {
    /// Start of the trigger region.
    pub start: f64,
    /// End of the trigger region.
    pub end: f64,
    /// Extent of the element itself along the axis.
    pub size: f64,
}

impl TriggerBounds {
    /// Resolves `offset` and `size` against an element of `element_size`.
    #[must_use]
    pub fn resolve(element_size: f64, offset: &Extent, size: &Extent) -> Self {
        let start = offset.resolve(element_size);
        Self {
            start,
            end: start + size.resolve(element_size),
            size: element_size,
        }
    }

    /// Computes the root margin under which the element intersects the
    /// viewport exactly while progress can be strictly between 0 and 1.
    ///
    /// The leading side shrinks the root until the element's trailing edge
    /// passes the track end; the trailing side until the trigger start
    /// passes the track start.
    #[must_use]
    pub fn viewport_margin(
        &self,
        axis: Axis,
        track_start: f64,
        track_end: f64,
        container_size: f64,
    ) -> Margin {
        let leading = self.end - self.size - track_end * container_size;
        let trailing = (track_start - 1.0) * container_size - self.start;
        Margin::along(axis, Length::Px(leading), Length::Px(trailing))
    }
}

/// Computes progress for an element whose leading edge sits at
/// `element_position` relative to the container's visible start.
///
/// Returns `None` when no meaningful value exists: a degenerate container or
/// a trigger region too short for the track window.
#[must_use]
pub fn compute_progress(
    bounds: &TriggerBounds,
    element_position: f64,
    container_size: f64,
    track_start: f64,
    track_end: f64,
) -> Option<f64> {
    if container_size.is_nan() || container_size <= 0.0 {
        return None;
    }
    let relative_start = (element_position + bounds.start) / container_size;
    let relative_distance = (bounds.end - bounds.start) / container_size;
    let total = relative_distance + (track_start - track_end);
    if total.is_nan() || total < 0.0 {
        return None;
    }
    let passed = track_start - relative_start;
    let next = if total == 0.0 {
        if passed > 0.0 { 1.0 } else { 0.0 }
    } else {
        (passed / total).clamp(0.0, 1.0)
    };
    next.is_finite().then_some(next)
}

/// Returns the events a move from `previous` to `next` emits, in dispatch
/// order. Empty when the value did not change.
pub fn edges(previous: f64, next: f64) -> impl Iterator<Item = EventKind> {
    let moved = next != previous;
    let enter = moved && is_edge(previous);
    let leave = moved && is_edge(next);
    [
        enter.then_some(EventKind::Enter),
        moved.then_some(EventKind::Progress),
        leave.then_some(EventKind::Leave),
    ]
    .into_iter()
    .flatten()
}

fn is_edge(progress: f64) -> bool {
    progress == 0.0 || progress == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: TriggerBounds = TriggerBounds {
        start: 0.0,
        end: 100.0,
        size: 100.0,
    };

    #[test]
    fn whole_container_track() {
        let p = compute_progress(&BOUNDS, 900.0, 1000.0, 1.0, 0.0).unwrap();
        assert!((p - 0.1 / 1.1).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn longer_trigger_region_slows_progress() {
        let bounds = TriggerBounds {
            end: 200.0,
            ..BOUNDS
        };
        let p = compute_progress(&bounds, 900.0, 1000.0, 1.0, 0.0).unwrap();
        assert!((p - 0.1 / 1.2).abs() < 1e-12, "got {p}");
    }

    #[test]
    fn overshoot_clamps() {
        assert_eq!(compute_progress(&BOUNDS, 2000.0, 1000.0, 1.0, 0.0), Some(0.0));
        assert_eq!(compute_progress(&BOUNDS, -500.0, 1000.0, 1.0, 0.0), Some(1.0));
    }

    #[test]
    fn negative_total_and_degenerate_container_abort() {
        // Track window inverted by more than the trigger region.
        assert_eq!(compute_progress(&BOUNDS, 500.0, 1000.0, 0.2, 0.8), None);
        assert_eq!(compute_progress(&BOUNDS, 500.0, 0.0, 1.0, 0.0), None);
        assert_eq!(compute_progress(&BOUNDS, 500.0, f64::NAN, 1.0, 0.0), None);
    }

    #[test]
    fn zero_total_snaps_by_passed_sign() {
        let point = TriggerBounds {
            start: 0.0,
            end: 0.0,
            size: 0.0,
        };
        assert_eq!(compute_progress(&point, 400.0, 1000.0, 0.5, 0.5), Some(1.0));
        assert_eq!(compute_progress(&point, 600.0, 1000.0, 0.5, 0.5), Some(0.0));
    }

    #[test]
    fn edges_follow_boundaries() {
        let all = |p, n| edges(p, n).collect::<Vec<_>>();
        assert_eq!(all(0.0, 0.5), [EventKind::Enter, EventKind::Progress]);
        assert_eq!(all(0.5, 0.6), [EventKind::Progress]);
        assert_eq!(all(0.6, 1.0), [EventKind::Progress, EventKind::Leave]);
        assert_eq!(
            all(1.0, 0.0),
            [EventKind::Enter, EventKind::Progress, EventKind::Leave]
        );
        assert!(all(0.3, 0.3).is_empty());
        assert!(all(1.0, 1.0).is_empty());
    }

    #[test]
    fn bounds_resolve_extents() {
        let b = TriggerBounds::resolve(200.0, &Extent::Percent(25.0), &Extent::Px(80.0));
        assert_eq!(
            b,
            TriggerBounds {
                start: 50.0,
                end: 130.0,
                size: 200.0
            }
        );
    }

    #[test]
    fn margin_matches_track_window() {
        // Element fully inside the trigger region: margins only pull in by
        // the track fractions.
        let m = BOUNDS.viewport_margin(Axis::Vertical, 1.0, 0.0, 1000.0);
        assert_eq!(m.to_string(), "0px 0px 0px 0px");

        let m = BOUNDS.viewport_margin(Axis::Vertical, 0.75, 0.25, 1000.0);
        assert_eq!(m.to_string(), "-250px 0px -250px 0px");

        let offset = TriggerBounds {
            start: 50.0,
            end: 150.0,
            size: 100.0,
        };
        let m = offset.viewport_margin(Axis::Horizontal, 1.0, 0.0, 500.0);
        assert_eq!(m.to_string(), "0px -50px 0px 50px");
    }
}
