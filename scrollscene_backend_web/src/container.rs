// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window and element scroll containers.
//!
//! [`DomContainer`] hides the differences between scrolling the top-level
//! window and scrolling an element:
//!
//! | | window | element |
//! |---|---|---|
//! | scroll | `scroll` on `window` | `scroll` on the element |
//! | resize | `resize` on `window` | `ResizeObserver` |
//! | visible area | `innerWidth` × `innerHeight` at the origin | client box in viewport coordinates |
//! | scroll size | document element `scrollWidth/Height` | `scrollWidth/Height` |
//! | position | `scrollX/Y` | `scrollLeft/Top` |
//!
//! Failing browser calls degrade to zero-sized measurements.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::{Rect, Size, Vec2};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget};

use scrollscene_core::backend::{Container, ContainerEvent, ResizeObserver};
use scrollscene_core::geometry::ContainerRect;
use scrollscene_core::options::ScrollParent;

use crate::observers::DomResizeObserver;

type Handler = Rc<RefCell<Box<dyn FnMut(ContainerEvent)>>>;

/// An event listener removed on drop.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: EventTarget,
        kind: &'static str,
        handler: &Handler,
        event: ContainerEvent,
    ) -> Option<Self> {
        let handler = Rc::clone(handler);
        let closure = Closure::wrap(Box::new(move |_: Event| {
            (handler.borrow_mut())(event);
        }) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(Self {
            target,
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

struct Attached {
    target: ScrollParent<Element>,
    _scroll: Option<Listener>,
    _resize: Option<Listener>,
    _observer: Option<DomResizeObserver>,
}

/// A [`Container`] over the window or a scrollable element.
#[derive(Default)]
pub struct DomContainer {
    attached: Option<Attached>,
}

impl DomContainer {
    /// Creates a detached container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Container<Element> for DomContainer {
    fn attach(&mut self, target: &ScrollParent<Element>, on_event: Box<dyn FnMut(ContainerEvent)>) {
        self.detach();
        let handler: Handler = Rc::new(RefCell::new(on_event));
        let attached = match target {
            ScrollParent::Window => {
                let window: Option<EventTarget> = web_sys::window().map(Into::into);
                Attached {
                    target: ScrollParent::Window,
                    _scroll: window.clone().and_then(|w| {
                        Listener::new(w, "scroll", &handler, ContainerEvent::Scroll)
                    }),
                    _resize: window.and_then(|w| {
                        Listener::new(w, "resize", &handler, ContainerEvent::Resize)
                    }),
                    _observer: None,
                }
            }
            ScrollParent::Element(element) => {
                let resize = Rc::clone(&handler);
                let mut observer = DomResizeObserver::new(Box::new(move || {
                    (resize.borrow_mut())(ContainerEvent::Resize);
                }));
                observer.observe(element);
                Attached {
                    target: ScrollParent::Element(element.clone()),
                    _scroll: Listener::new(
                        element.clone().into(),
                        "scroll",
                        &handler,
                        ContainerEvent::Scroll,
                    ),
                    _resize: None,
                    _observer: Some(observer),
                }
            }
        };
        self.attached = Some(attached);
    }

    fn detach(&mut self) {
        self.attached = None;
    }

    fn rect(&self) -> ContainerRect {
        match self.attached.as_ref().map(|a| &a.target) {
            Some(ScrollParent::Element(element)) => element_rect(element),
            Some(ScrollParent::Window) | None => window_rect(),
        }
    }
}

impl core::fmt::Debug for DomContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomContainer")
            .field("target", &self.attached.as_ref().map(|a| &a.target))
            .finish_non_exhaustive()
    }
}

fn window_rect() -> ContainerRect {
    let Some(window) = web_sys::window() else {
        return ContainerRect::default();
    };
    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    let width = dimension(window.inner_width());
    let height = dimension(window.inner_height());
    let scroll_size = window
        .document()
        .and_then(|d| d.document_element())
        .map(|root| Size::new(f64::from(root.scroll_width()), f64::from(root.scroll_height())))
        .unwrap_or_default();
    ContainerRect {
        bounds: Rect::new(0.0, 0.0, width, height),
        scroll_size,
        scroll_position: Vec2::new(
            window.scroll_x().unwrap_or(0.0),
            window.scroll_y().unwrap_or(0.0),
        ),
    }
}

fn element_rect(element: &Element) -> ContainerRect {
    let outer = element.get_bounding_client_rect();
    let x0 = outer.left() + f64::from(element.client_left());
    let y0 = outer.top() + f64::from(element.client_top());
    ContainerRect {
        bounds: Rect::new(
            x0,
            y0,
            x0 + f64::from(element.client_width()),
            y0 + f64::from(element.client_height()),
        ),
        scroll_size: Size::new(
            f64::from(element.scroll_width()),
            f64::from(element.scroll_height()),
        ),
        scroll_position: Vec2::new(
            f64::from(element.scroll_left()),
            f64::from(element.scroll_top()),
        ),
    }
}
