// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted layout world implementing [`Platform`].
//!
//! [`MockPlatform`] owns element rects and a container measurement that the
//! test edits directly. Observers and containers created from it register in
//! the shared world, and fire only when the test emits a signal. Callbacks
//! run with no world borrow held, so scenes may measure freely from inside
//! them.

use core::cell::RefCell;
use std::rc::Rc;

use kurbo::{Rect, Size, Vec2};

use scrollscene_core::backend::{
    Container, ContainerEvent, FrameRequester, IntersectionCallback, Platform, ResizeObserver,
    ViewportConfig, ViewportObserver,
};
use scrollscene_core::geometry::ContainerRect;
use scrollscene_core::options::ScrollParent;

use crate::frames::ManualFrames;

/// A scripted element: an index into the world's rect table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MockElement(usize);

impl MockElement {
    /// Returns the element's index.
    #[must_use]
    pub const fn id(self) -> usize {
        self.0
    }
}

type Shared<T> = Rc<RefCell<T>>;
type ContainerHandler = Shared<Box<dyn FnMut(ContainerEvent)>>;

struct ContainerSlot {
    target: Option<ScrollParent<MockElement>>,
    on_event: Option<ContainerHandler>,
}

struct ViewportSlot {
    target: Option<MockElement>,
    on_change: Shared<IntersectionCallback<MockElement>>,
}

struct ResizeSlot {
    target: Option<MockElement>,
    on_resize: Shared<Box<dyn FnMut()>>,
}

struct World {
    rects: Vec<Rect>,
    container: ContainerRect,
    containers: Vec<ContainerSlot>,
    viewports: Vec<ViewportSlot>,
    resizes: Vec<ResizeSlot>,
    last_config: Option<ViewportConfig<MockElement>>,
    config_updates: usize,
}

/// The scripted platform.
///
/// Clones share one world and one [`ManualFrames`].
#[derive(Clone)]
pub struct MockPlatform {
    world: Shared<World>,
    frames: Rc<ManualFrames>,
}

impl MockPlatform {
    /// Creates a world with a 1000 × 1000 window scrolled to the top over
    /// 1000 × 5000 of content.
    #[must_use]
    pub fn new() -> Self {
        Self::with_container(ContainerRect {
            bounds: Rect::new(0.0, 0.0, 1000.0, 1000.0),
            scroll_size: Size::new(1000.0, 5000.0),
            scroll_position: Vec2::ZERO,
        })
    }

    /// Creates a world with the given container measurement.
    #[must_use]
    pub fn with_container(container: ContainerRect) -> Self {
        Self {
            world: Rc::new(RefCell::new(World {
                rects: Vec::new(),
                container,
                containers: Vec::new(),
                viewports: Vec::new(),
                resizes: Vec::new(),
                last_config: None,
                config_updates: 0,
            })),
            frames: Rc::new(ManualFrames::new()),
        }
    }

    /// Returns the shared frame requester.
    #[must_use]
    pub fn manual_frames(&self) -> &ManualFrames {
        &self.frames
    }

    /// Fires one frame. Returns the number of callbacks that ran.
    pub fn fire_frame(&self) -> usize {
        self.frames.fire()
    }

    // -- geometry ----------------------------------------------------------

    /// Adds an element at `rect` (viewport coordinates).
    pub fn element(&self, rect: Rect) -> MockElement {
        let mut world = self.world.borrow_mut();
        world.rects.push(rect);
        MockElement(world.rects.len() - 1)
    }

    /// Returns an element's current rect.
    #[must_use]
    pub fn rect(&self, element: MockElement) -> Rect {
        self.world
            .borrow()
            .rects
            .get(element.0)
            .copied()
            .unwrap_or(Rect::ZERO)
    }

    /// Moves or resizes an element without notifying anyone.
    pub fn set_rect(&self, element: MockElement, rect: Rect) {
        if let Some(slot) = self.world.borrow_mut().rects.get_mut(element.0) {
            *slot = rect;
        }
    }

    /// Returns the container measurement.
    #[must_use]
    pub fn container_rect(&self) -> ContainerRect {
        self.world.borrow().container
    }

    /// Replaces the container measurement without notifying anyone.
    pub fn set_container_rect(&self, rect: ContainerRect) {
        self.world.borrow_mut().container = rect;
    }

    // -- signals -----------------------------------------------------------

    /// Scrolls the content by `delta`: every element moves by `-delta`, the
    /// scroll position advances, and a scroll event is emitted.
    pub fn scroll_by(&self, delta: Vec2) {
        {
            let mut world = self.world.borrow_mut();
            for rect in &mut world.rects {
                *rect = *rect - delta;
            }
            world.container.scroll_position += delta;
        }
        self.emit_scroll();
    }

    /// Emits a scroll event to every attached container.
    pub fn emit_scroll(&self) {
        self.emit_container(ContainerEvent::Scroll);
    }

    /// Replaces the container measurement and emits a resize event.
    pub fn resize_container(&self, rect: ContainerRect) {
        self.set_container_rect(rect);
        self.emit_resize();
    }

    /// Emits a resize event to every attached container.
    pub fn emit_resize(&self) {
        self.emit_container(ContainerEvent::Resize);
    }

    fn emit_container(&self, event: ContainerEvent) {
        let handlers: Vec<ContainerHandler> = self
            .world
            .borrow()
            .containers
            .iter()
            .filter_map(|slot| slot.on_event.clone())
            .collect();
        for handler in handlers {
            (handler.borrow_mut())(event);
        }
    }

    /// Reports an intersection change for `element` to every viewport
    /// observer watching it.
    pub fn emit_intersection(&self, element: MockElement, intersecting: bool) {
        let callbacks: Vec<_> = self
            .world
            .borrow()
            .viewports
            .iter()
            .filter(|slot| slot.target == Some(element))
            .map(|slot| Rc::clone(&slot.on_change))
            .collect();
        for callback in callbacks {
            (callback.borrow_mut())(intersecting, &element);
        }
    }

    /// Resizes `element` and notifies every resize observer watching it.
    pub fn resize_element(&self, element: MockElement, rect: Rect) {
        self.set_rect(element, rect);
        self.emit_element_resize(element);
    }

    /// Notifies every resize observer watching `element`.
    pub fn emit_element_resize(&self, element: MockElement) {
        let callbacks: Vec<_> = self
            .world
            .borrow()
            .resizes
            .iter()
            .filter(|slot| slot.target == Some(element))
            .map(|slot| Rc::clone(&slot.on_resize))
            .collect();
        for callback in callbacks {
            (callback.borrow_mut())();
        }
    }

    // -- inspection --------------------------------------------------------

    /// Returns the targets of every attached container.
    #[must_use]
    pub fn attached_targets(&self) -> Vec<ScrollParent<MockElement>> {
        self.world
            .borrow()
            .containers
            .iter()
            .filter_map(|slot| slot.target.clone())
            .collect()
    }

    /// Returns the elements watched by viewport observers.
    #[must_use]
    pub fn observed_elements(&self) -> Vec<MockElement> {
        self.world
            .borrow()
            .viewports
            .iter()
            .filter_map(|slot| slot.target)
            .collect()
    }

    /// Returns the elements watched by resize observers.
    #[must_use]
    pub fn resize_observed_elements(&self) -> Vec<MockElement> {
        self.world
            .borrow()
            .resizes
            .iter()
            .filter_map(|slot| slot.target)
            .collect()
    }

    /// Returns the most recently applied viewport configuration.
    #[must_use]
    pub fn viewport_config(&self) -> Option<ViewportConfig<MockElement>> {
        self.world.borrow().last_config.clone()
    }

    /// Returns how many times any viewport observer was reconfigured.
    #[must_use]
    pub fn viewport_config_updates(&self) -> usize {
        self.world.borrow().config_updates
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MockPlatform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let world = self.world.borrow();
        f.debug_struct("MockPlatform")
            .field("elements", &world.rects.len())
            .field("container", &world.container)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl Platform for MockPlatform {
    type Element = MockElement;
    type Container = MockContainer;
    type Viewport = MockViewportObserver;
    type Resize = MockResizeObserver;

    fn frames(&self) -> Rc<dyn FrameRequester> {
        Rc::clone(&self.frames) as Rc<dyn FrameRequester>
    }

    fn element_rect(&self, element: &MockElement) -> Rect {
        self.rect(*element)
    }

    fn container(&self) -> MockContainer {
        let mut world = self.world.borrow_mut();
        world.containers.push(ContainerSlot {
            target: None,
            on_event: None,
        });
        MockContainer {
            world: Rc::clone(&self.world),
            slot: world.containers.len() - 1,
        }
    }

    fn viewport_observer(&self, on_change: IntersectionCallback<MockElement>) -> MockViewportObserver {
        let mut world = self.world.borrow_mut();
        world.viewports.push(ViewportSlot {
            target: None,
            on_change: Rc::new(RefCell::new(on_change)),
        });
        MockViewportObserver {
            world: Rc::clone(&self.world),
            slot: world.viewports.len() - 1,
        }
    }

    fn resize_observer(&self, on_resize: Box<dyn FnMut()>) -> MockResizeObserver {
        let mut world = self.world.borrow_mut();
        world.resizes.push(ResizeSlot {
            target: None,
            on_resize: Rc::new(RefCell::new(on_resize)),
        });
        MockResizeObserver {
            world: Rc::clone(&self.world),
            slot: world.resizes.len() - 1,
        }
    }
}

/// A [`Container`] registered in a [`MockPlatform`] world.
pub struct MockContainer {
    world: Shared<World>,
    slot: usize,
}

impl Container<MockElement> for MockContainer {
    fn attach(
        &mut self,
        target: &ScrollParent<MockElement>,
        on_event: Box<dyn FnMut(ContainerEvent)>,
    ) {
        if let Some(slot) = self.world.borrow_mut().containers.get_mut(self.slot) {
            slot.target = Some(target.clone());
            slot.on_event = Some(Rc::new(RefCell::new(on_event)));
        }
    }

    fn detach(&mut self) {
        if let Some(slot) = self.world.borrow_mut().containers.get_mut(self.slot) {
            slot.target = None;
            slot.on_event = None;
        }
    }

    fn rect(&self) -> ContainerRect {
        self.world.borrow().container
    }
}

impl core::fmt::Debug for MockContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockContainer")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// A [`ViewportObserver`] registered in a [`MockPlatform`] world.
pub struct MockViewportObserver {
    world: Shared<World>,
    slot: usize,
}

impl ViewportObserver<MockElement> for MockViewportObserver {
    fn observe(&mut self, element: &MockElement) {
        if let Some(slot) = self.world.borrow_mut().viewports.get_mut(self.slot) {
            slot.target = Some(*element);
        }
    }

    fn disconnect(&mut self) {
        if let Some(slot) = self.world.borrow_mut().viewports.get_mut(self.slot) {
            slot.target = None;
        }
    }

    fn modify(&mut self, config: ViewportConfig<MockElement>) {
        let mut world = self.world.borrow_mut();
        world.last_config = Some(config);
        world.config_updates += 1;
    }
}

impl core::fmt::Debug for MockViewportObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockViewportObserver")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// A [`ResizeObserver`] registered in a [`MockPlatform`] world.
pub struct MockResizeObserver {
    world: Shared<World>,
    slot: usize,
}

impl ResizeObserver<MockElement> for MockResizeObserver {
    fn observe(&mut self, element: &MockElement) {
        if let Some(slot) = self.world.borrow_mut().resizes.get_mut(self.slot) {
            slot.target = Some(*element);
        }
    }

    fn disconnect(&mut self) {
        if let Some(slot) = self.world.borrow_mut().resizes.get_mut(self.slot) {
            slot.target = None;
        }
    }
}

impl core::fmt::Debug for MockResizeObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockResizeObserver")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn scroll_moves_elements_and_notifies() {
        let platform = MockPlatform::new();
        let el = platform.element(Rect::new(0.0, 900.0, 100.0, 1000.0));
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut container = platform.container();
        {
            let events = Rc::clone(&events);
            container.attach(
                &ScrollParent::Window,
                Box::new(move |e| events.borrow_mut().push(e)),
            );
        }
        platform.scroll_by(Vec2::new(0.0, 100.0));
        assert_eq!(platform.rect(el), Rect::new(0.0, 800.0, 100.0, 900.0));
        assert_eq!(container.rect().scroll_position, Vec2::new(0.0, 100.0));
        assert_eq!(*events.borrow(), [ContainerEvent::Scroll]);
        assert_eq!(platform.attached_targets(), [ScrollParent::Window]);

        container.detach();
        platform.emit_resize();
        assert_eq!(events.borrow().len(), 1);
        assert!(platform.attached_targets().is_empty());
    }

    #[test]
    fn observers_only_hear_their_target() {
        let platform = MockPlatform::new();
        let a = platform.element(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = platform.element(Rect::new(0.0, 20.0, 10.0, 30.0));
        let hits = Rc::new(Cell::new(0));
        let mut observer = {
            let hits = Rc::clone(&hits);
            platform.viewport_observer(Box::new(move |_, _| hits.set(hits.get() + 1)))
        };
        observer.observe(&a);
        platform.emit_intersection(b, true);
        assert_eq!(hits.get(), 0);
        platform.emit_intersection(a, true);
        assert_eq!(hits.get(), 1);
        assert_eq!(platform.observed_elements(), [a]);

        observer.disconnect();
        platform.emit_intersection(a, false);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn resize_observer_sees_new_rect() {
        let platform = MockPlatform::new();
        let el = platform.element(Rect::new(0.0, 0.0, 10.0, 10.0));
        let heights = Rc::new(RefCell::new(Vec::new()));
        let mut observer = {
            let heights = Rc::clone(&heights);
            let probe = platform.clone();
            platform.resize_observer(Box::new(move || {
                heights.borrow_mut().push(probe.rect(el).height());
            }))
        };
        observer.observe(&el);
        platform.resize_element(el, Rect::new(0.0, 0.0, 10.0, 40.0));
        assert_eq!(*heights.borrow(), [40.0]);
        assert_eq!(platform.resize_observed_elements(), [el]);
    }
}
