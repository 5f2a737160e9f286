// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform contract.
//!
//! The scene never touches a layout engine directly. Everything it reads or
//! observes comes through the traits in this module, which backend crates
//! implement:
//!
//! - **Frames**: [`FrameRequester`] delivers one-shot callbacks on the next
//!   animation frame (e.g. `requestAnimationFrame`).
//! - **Container**: [`Container`] normalizes "window" vs. "element" scroll
//!   containers, reports a [`ContainerRect`] and notifies on resize/scroll.
//! - **Viewport observer**: [`ViewportObserver`] reports
//!   intersecting/not-intersecting transitions of one element against a
//!   margin-expanded root.
//! - **Resize observer**: [`ResizeObserver`] reports box size changes of one
//!   element.
//! - **Measurement**: [`Platform::element_rect`] returns an element's
//!   bounding box in viewport coordinates.
//!
//! [`Platform`] bundles the element type with factories for all of the
//! above, so a [`Scene`](crate::scene::Scene) is generic over a single
//! parameter.
//!
//! Callbacks handed to a container or an observer must never be invoked
//! synchronously from `attach`, `observe` or `modify`; deliver them from the
//! host's event loop instead.
//!
//! # Crate boundaries
//!
//! `scrollscene_core` owns the options model, the scheduling primitives and
//! the scene controller. `scrollscene_backend_web` implements this contract
//! on top of browser APIs; `scrollscene_harness` implements it with scripted
//! geometry for deterministic tests.

use core::fmt;
use std::rc::Rc;

use kurbo::Rect;

use crate::geometry::{ContainerRect, Margin};
use crate::options::ScrollParent;
use crate::time::HostTime;

/// Identifies an outstanding frame request.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameRequest(pub u64);

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRequest({})", self.0)
    }
}

/// A one-shot frame callback.
pub type FrameCallback = Box<dyn FnOnce(HostTime)>;

/// Schedules callbacks on the next animation frame.
///
/// Methods take `&self` because requesters are shared between the execution
/// queue and the resize throttle; implementations use interior mutability.
/// Callbacks must be invoked without any internal borrow held, since they
/// commonly request the next frame.
pub trait FrameRequester {
    /// Runs `callback` once on the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest;

    /// Cancels a pending request. Cancelling a request that already fired, or
    /// was already cancelled, is a no-op.
    fn cancel_frame(&self, request: FrameRequest);
}

impl<T: FrameRequester + ?Sized> FrameRequester for Rc<T> {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        (**self).request_frame(callback)
    }

    fn cancel_frame(&self, request: FrameRequest) {
        (**self).cancel_frame(request);
    }
}

/// A notification from a [`Container`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerEvent {
    /// The container's visible area changed size.
    Resize,
    /// The container scrolled.
    Scroll,
}

/// Normalized access to a scroll container.
pub trait Container<E> {
    /// Starts tracking `target`, replacing any previous target. `on_event`
    /// receives every later resize/scroll notification.
    fn attach(&mut self, target: &ScrollParent<E>, on_event: Box<dyn FnMut(ContainerEvent)>);

    /// Stops tracking and drops the callback.
    fn detach(&mut self);

    /// Measures the current target.
    fn rect(&self) -> ContainerRect;
}

/// Configuration of a [`ViewportObserver`].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig<E> {
    /// Intersection root: `None` for the window viewport.
    pub root: Option<E>,
    /// Expansion applied to the root before intersecting.
    pub margin: Margin,
}

impl<E> Default for ViewportConfig<E> {
    fn default() -> Self {
        Self {
            root: None,
            margin: Margin::default(),
        }
    }
}

/// Observes whether one element intersects a margin-expanded root.
///
/// The callback given at construction receives `(intersecting, target)` on
/// transitions only, including the initial state after [`observe`] or
/// [`modify`].
///
/// [`observe`]: Self::observe
/// [`modify`]: Self::modify
pub trait ViewportObserver<E> {
    /// Starts observing `element`, replacing any previous target.
    fn observe(&mut self, element: &E);

    /// Stops observing.
    fn disconnect(&mut self);

    /// Applies a new root and margin, keeping the observed element.
    fn modify(&mut self, config: ViewportConfig<E>);
}

/// Observes box size changes of one element.
pub trait ResizeObserver<E> {
    /// Starts observing `element`, replacing any previous target.
    fn observe(&mut self, element: &E);

    /// Stops observing.
    fn disconnect(&mut self);
}

/// Callback receiving viewport observer transitions.
pub type IntersectionCallback<E> = Box<dyn FnMut(bool, &E)>;

/// Everything a scene needs from its host environment.
pub trait Platform: 'static {
    /// Handle to a layout element.
    type Element: Clone + PartialEq + fmt::Debug + 'static;
    /// Scroll container proxy.
    type Container: Container<Self::Element>;
    /// Viewport observer.
    type Viewport: ViewportObserver<Self::Element>;
    /// Resize observer.
    type Resize: ResizeObserver<Self::Element>;

    /// Returns the shared frame requester.
    fn frames(&self) -> Rc<dyn FrameRequester>;

    /// Measures `element` in viewport coordinates.
    fn element_rect(&self, element: &Self::Element) -> Rect;

    /// Creates a detached container proxy.
    fn container(&self) -> Self::Container;

    /// Creates a viewport observer reporting to `on_change`.
    fn viewport_observer(&self, on_change: IntersectionCallback<Self::Element>) -> Self::Viewport;

    /// Creates a resize observer reporting to `on_resize`.
    fn resize_observer(&self, on_resize: Box<dyn FnMut()>) -> Self::Resize;
}
