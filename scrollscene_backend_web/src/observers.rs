// Copyright 2026 the Scrollscene Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `IntersectionObserver` and `ResizeObserver` wrappers.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::ToString;
use core::cell::RefCell;

use js_sys::{Array, Object};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
};

use scrollscene_core::backend::{
    IntersectionCallback, ResizeObserver, ViewportConfig, ViewportObserver,
};

type IntersectionClosure = Closure<dyn FnMut(Array, IntersectionObserver)>;
type ResizeClosure = Closure<dyn FnMut(Array, web_sys::ResizeObserver)>;

/// A [`ViewportObserver`] backed by `IntersectionObserver`.
///
/// Browsers fix an observer's root and margin at construction, so every
/// [`modify`](ViewportObserver::modify) builds a new observer and
/// re-observes the current target.
pub struct DomViewportObserver {
    closure: IntersectionClosure,
    observer: Option<IntersectionObserver>,
    config: ViewportConfig<Element>,
    target: Option<Element>,
}

impl DomViewportObserver {
    /// Creates an observer reporting `(intersecting, target)` to `callback`.
    #[must_use]
    pub fn new(callback: IntersectionCallback<Element>) -> Self {
        let callback = Rc::new(RefCell::new(callback));
        let closure = Closure::wrap(Box::new(move |entries: Array, _: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let target = entry.target();
                (callback.borrow_mut())(entry.is_intersecting(), &target);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);
        Self {
            closure,
            observer: None,
            config: ViewportConfig::default(),
            target: None,
        }
    }

    fn connect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&self.config.margin.to_string());
        if let Some(root) = &self.config.root {
            init.set_root(Some(AsRef::<Object>::as_ref(root)));
        }
        // An unparsable margin throws; without an observer the scene simply
        // never becomes active.
        let Ok(observer) =
            IntersectionObserver::new_with_options(self.closure.as_ref().unchecked_ref(), &init)
        else {
            return;
        };
        if let Some(target) = &self.target {
            observer.observe(target);
        }
        self.observer = Some(observer);
    }
}

impl ViewportObserver<Element> for DomViewportObserver {
    fn observe(&mut self, element: &Element) {
        self.target = Some(element.clone());
        match &self.observer {
            Some(observer) => {
                observer.disconnect();
                observer.observe(element);
            }
            None => self.connect(),
        }
    }

    fn disconnect(&mut self) {
        self.target = None;
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }

    fn modify(&mut self, config: ViewportConfig<Element>) {
        self.config = config;
        self.connect();
    }
}

impl Drop for DomViewportObserver {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl core::fmt::Debug for DomViewportObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomViewportObserver")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("connected", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

/// A [`ResizeObserver`] backed by the browser's `ResizeObserver`.
pub struct DomResizeObserver {
    // Kept alive for as long as the observer may call it.
    _closure: ResizeClosure,
    observer: Option<web_sys::ResizeObserver>,
    target: Option<Element>,
}

impl DomResizeObserver {
    /// Creates an observer invoking `callback` on every box size change.
    #[must_use]
    pub fn new(mut callback: Box<dyn FnMut()>) -> Self {
        let closure = Closure::wrap(Box::new(move |_: Array, _: web_sys::ResizeObserver| {
            callback();
        }) as Box<dyn FnMut(Array, web_sys::ResizeObserver)>);
        let observer = web_sys::ResizeObserver::new(closure.as_ref().unchecked_ref()).ok();
        Self {
            _closure: closure,
            observer,
            target: None,
        }
    }
}

impl ResizeObserver<Element> for DomResizeObserver {
    fn observe(&mut self, element: &Element) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
            observer.observe(element);
        }
        self.target = Some(element.clone());
    }

    fn disconnect(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
        self.target = None;
    }
}

impl Drop for DomResizeObserver {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

impl core::fmt::Debug for DomResizeObserver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomResizeObserver")
            .field("target", &self.target)
            .field("available", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
