// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Process-wide defaults. Kept in its own test binary since it mutates
//! global state; everything runs in one test to avoid ordering races.

use kurbo::Rect;

use scrollscene_core::defaults::{self, DefaultOptions};
use scrollscene_core::options::{Extent, PartialOptions, ScrollParent};
use scrollscene_core::scene::Scene;
use scrollscene_harness::{MockElement, MockPlatform};

#[test]
fn defaults_apply_to_new_scenes_only() {
    let platform = MockPlatform::new();
    let el = platform.element(Rect::new(0.0, 900.0, 100.0, 1000.0));

    let before = Scene::new(platform.clone(), PartialOptions::new().element(el));
    assert_eq!(
        Scene::<MockPlatform>::default_options(None),
        DefaultOptions::BUILTIN
    );

    let updated = Scene::<MockPlatform>::default_options(Some(
        PartialOptions::new()
            .track_start(0.5)
            .track_end(7.0)
            .offset(Extent::Percent(10.0))
            .element(el)
            .scroll_parent(ScrollParent::Element(el)),
    ));
    assert_eq!(updated.track_start, 0.5);
    assert_eq!(updated.track_end, 1.0, "clamped");
    assert_eq!(updated.offset, Extent::Percent(10.0));
    assert_eq!(defaults::defaults(), updated);

    // Non-finite values leave the default untouched.
    defaults::set_defaults(PartialOptions::<MockElement>::new().track_start(f64::INFINITY));
    assert_eq!(defaults::defaults().track_start, 0.5);

    let after = Scene::new(platform.clone(), PartialOptions::new().element(el));
    assert_eq!(after.track_start(), 0.5);
    assert_eq!(after.track_end(), 1.0);
    assert_eq!(after.offset(), Extent::Percent(10.0));
    assert_eq!(after.trigger_bounds().start, 10.0);
    // Element and scroll parent are never taken from the defaults.
    assert_eq!(after.scroll_parent(), ScrollParent::Window);

    assert_eq!(before.track_start(), 1.0);
    assert_eq!(before.track_end(), 0.0);

    defaults::reset_defaults();
    assert_eq!(defaults::defaults(), DefaultOptions::BUILTIN);
    let fresh = Scene::new(platform, PartialOptions::<MockElement>::new());
    assert_eq!(fresh.track_start(), 1.0);
    assert_eq!(fresh.element(), None);
}
