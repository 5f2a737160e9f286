// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reaction graph from option fields to derived state.
//!
//! Every option change is fed through a small dependency graph tracked with
//! [`understory_dirty`]. Option fields are leaf nodes; derived state nodes
//! depend on the fields (and other derived nodes) they are computed from:
//!
//! ```text
//! element ─┬──────────────▶ OBSERVED_ELEMENT ─┐
//!          │                                   │
//! offset ──┼─▶ TRIGGER_BOUNDS ────────────────┤
//! size ────┤                                   ├─▶ VIEWPORT_MARGIN
//! vertical ┴───────────────────────────────────┤
//! track_start, track_end ─────────────────────┤
//! scroll_parent ─▶ CONTAINER ─────────────────┘
//! ```
//!
//! Changed fields are marked with [`EagerPolicy`], so dirtiness propagates
//! to every dependent at mark time; a single drain of [`REACTION`] yields all
//! derived state that must react. [`ReactionGraph::react`] folds the drained
//! nodes into [`Reactions`], which the scene applies in a fixed order.

use core::fmt;

use understory_dirty::{Channel, CycleHandling, DirtyTracker, EagerPolicy};

use crate::options::{Field, FieldSet};

/// The single channel used for reaction propagation.
pub const REACTION: Channel = Channel::new(0);

/// Node keys.
pub mod node {
    /// Tracked element.
    pub const ELEMENT: u32 = 0;
    /// Scroll parent.
    pub const SCROLL_PARENT: u32 = 1;
    /// Axis flag.
    pub const VERTICAL: u32 = 2;
    /// Track start fraction.
    pub const TRACK_START: u32 = 3;
    /// Track end fraction.
    pub const TRACK_END: u32 = 4;
    /// Trigger offset.
    pub const OFFSET: u32 = 5;
    /// Trigger size.
    pub const SIZE: u32 = 6;
    /// Trigger bounds (derived).
    pub const TRIGGER_BOUNDS: u32 = 7;
    /// Element attached to the viewport/resize observers (derived).
    pub const OBSERVED_ELEMENT: u32 = 8;
    /// Attached container proxy (derived).
    pub const CONTAINER: u32 = 9;
    /// Viewport observer root and margin (derived).
    pub const VIEWPORT_MARGIN: u32 = 10;
}

const EDGES: [(u32, u32); 14] = [
    (node::TRIGGER_BOUNDS, node::ELEMENT),
    (node::TRIGGER_BOUNDS, node::OFFSET),
    (node::TRIGGER_BOUNDS, node::SIZE),
    (node::TRIGGER_BOUNDS, node::VERTICAL),
    (node::OBSERVED_ELEMENT, node::ELEMENT),
    (node::CONTAINER, node::SCROLL_PARENT),
    (node::VIEWPORT_MARGIN, node::TRIGGER_BOUNDS),
    (node::VIEWPORT_MARGIN, node::OBSERVED_ELEMENT),
    (node::VIEWPORT_MARGIN, node::CONTAINER),
    (node::VIEWPORT_MARGIN, node::VERTICAL),
    (node::VIEWPORT_MARGIN, node::TRACK_START),
    (node::VIEWPORT_MARGIN, node::TRACK_END),
    (node::VIEWPORT_MARGIN, node::OFFSET),
    (node::VIEWPORT_MARGIN, node::SIZE),
];

const fn field_node(field: Field) -> u32 {
    match field {
        Field::Element => node::ELEMENT,
        Field::ScrollParent => node::SCROLL_PARENT,
        Field::Vertical => node::VERTICAL,
        Field::TrackStart => node::TRACK_START,
        Field::TrackEnd => node::TRACK_END,
        Field::Offset => node::OFFSET,
        Field::Size => node::SIZE,
    }
}

/// Derived state that must be refreshed after an option change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reactions {
    /// Recompute trigger bounds.
    pub trigger_bounds: bool,
    /// Re-attach the viewport and resize observers.
    pub observed_element: bool,
    /// Re-attach the container proxy and reset the active flag.
    pub container: bool,
    /// Reconfigure the viewport observer.
    pub viewport_margin: bool,
}

/// Dependency graph from option fields to derived state.
pub struct ReactionGraph {
    tracker: DirtyTracker<u32>,
}

impl fmt::Debug for ReactionGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionGraph").finish_non_exhaustive()
    }
}

impl Default for ReactionGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactionGraph {
    /// Builds the graph.
    #[must_use]
    pub fn new() -> Self {
        let mut tracker = DirtyTracker::with_cycle_handling(CycleHandling::Error);
        for (dependent, dependency) in EDGES {
            // The edge set is static and acyclic.
            let _ = tracker.add_dependency(dependent, dependency, REACTION);
        }
        Self { tracker }
    }

    /// Marks `changed` and drains the derived state that depends on it.
    pub fn react(&mut self, changed: FieldSet) -> Reactions {
        for field in changed.iter() {
            self.tracker
                .mark_with(field_node(field), REACTION, &EagerPolicy);
        }
        let affected: Vec<u32> = self
            .tracker
            .drain(REACTION)
            .affected()
            .deterministic()
            .run()
            .collect();

        let mut reactions = Reactions::default();
        for key in affected {
            match key {
                node::TRIGGER_BOUNDS => reactions.trigger_bounds = true,
                node::OBSERVED_ELEMENT => reactions.observed_element = true,
                node::CONTAINER => reactions.container = true,
                node::VIEWPORT_MARGIN => reactions.viewport_margin = true,
                _ => {}
            }
        }
        reactions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_changed_nothing_reacts() {
        let mut graph = ReactionGraph::new();
        assert_eq!(graph.react(FieldSet::EMPTY), Reactions::default());
    }

    #[test]
    fn element_change_reaches_everything_but_container() {
        let mut graph = ReactionGraph::new();
        let r = graph.react(FieldSet::EMPTY.with(Field::Element));
        assert_eq!(
            r,
            Reactions {
                trigger_bounds: true,
                observed_element: true,
                container: false,
                viewport_margin: true,
            }
        );
    }

    #[test]
    fn track_change_only_touches_margin() {
        let mut graph = ReactionGraph::new();
        let r = graph.react(FieldSet::EMPTY.with(Field::TrackStart).with(Field::TrackEnd));
        assert_eq!(
            r,
            Reactions {
                viewport_margin: true,
                ..Reactions::default()
            }
        );
    }

    #[test]
    fn scroll_parent_change_reattaches_container() {
        let mut graph = ReactionGraph::new();
        let r = graph.react(FieldSet::EMPTY.with(Field::ScrollParent));
        assert!(r.container);
        assert!(r.viewport_margin);
        assert!(!r.trigger_bounds);
    }

    #[test]
    fn drain_resets_between_passes() {
        let mut graph = ReactionGraph::new();
        assert!(graph.react(FieldSet::ALL).trigger_bounds);
        let r = graph.react(FieldSet::EMPTY.with(Field::Vertical));
        assert!(r.trigger_bounds);
        assert!(!r.observed_element);
        assert!(!r.container);
    }
}
