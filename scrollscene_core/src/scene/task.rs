// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::backend::Platform;
use crate::queue::Command;

use super::Scene;

/// Work a scene defers to the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneTask {
    /// Re-measure the element and recompute trigger bounds.
    UpdateTriggerBounds,
    /// Recompute and apply the viewport observer root and margin.
    UpdateViewportObserver,
    /// Recompute progress and emit events.
    UpdateProgress,
}

impl<P: Platform> Command<Scene<P>> for SceneTask {
    fn execute(self, scene: &Scene<P>) {
        match self {
            Self::UpdateTriggerBounds => scene.update_trigger_bounds(),
            Self::UpdateViewportObserver => scene.update_viewport_observer(),
            Self::UpdateProgress => scene.update_progress(),
        }
    }

    fn halted(scene: &Scene<P>) -> bool {
        scene.is_destroyed()
    }
}
