//! Visibility detection capability.
//!
//! The controller only needs "is my container sufficiently on screen", so the
//! capability is a trait. Browsers back it with `IntersectionObserver`; other
//! runtimes get [`NoViewport`], which never reports anything.

use std::rc::Rc;

pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.25;

/// Fraction of the element that must intersect the viewport to count as visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityThreshold(f64);

impl VisibilityThreshold {
    pub fn new(ratio: f64) -> Self {
        if !ratio.is_finite() {
            return Self::default();
        }
        Self(ratio.clamp(0.0, 1.0))
    }

    pub fn ratio(self) -> f64 {
        self.0
    }

    /// A fully hidden element is never visible, even with a zero threshold.
    pub fn is_visible(self, intersection_ratio: f64) -> bool {
        intersection_ratio > 0.0 && intersection_ratio >= self.0
    }
}

impl Default for VisibilityThreshold {
    fn default() -> Self {
        Self(DEFAULT_VISIBILITY_THRESHOLD)
    }
}

pub type VisibilityCallback = Rc<dyn Fn(bool)>;

pub trait ViewportObserver {
    /// Start watching. `None` means the runtime cannot detect visibility.
    fn observe(
        &self,
        threshold: VisibilityThreshold,
        on_change: VisibilityCallback,
    ) -> Option<Observation>;
}

/// Live watcher registration; disconnects when dropped.
pub struct Observation {
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Observation {
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Fallback for runtimes without intersection detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViewport;

impl ViewportObserver for NoViewport {
    fn observe(
        &self,
        _threshold: VisibilityThreshold,
        _on_change: VisibilityCallback,
    ) -> Option<Observation> {
        None
    }
}

/// Watches the DOM element with the given id through `IntersectionObserver`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct ElementViewport {
    element_id: String,
}

#[cfg(target_arch = "wasm32")]
impl ElementViewport {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl ViewportObserver for ElementViewport {
    fn observe(
        &self,
        threshold: VisibilityThreshold,
        on_change: VisibilityCallback,
    ) -> Option<Observation> {
        use dioxus::core::{Runtime, RuntimeGuard};
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::{JsCast, JsValue};
        use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

        let win = web_sys::window()?;
        let supported = js_sys::Reflect::has(&win, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if !supported {
            tracing::warn!("IntersectionObserver unavailable; viewport stop disabled");
            return None;
        }

        let Some(element) = win
            .document()
            .and_then(|doc| doc.get_element_by_id(&self.element_id))
        else {
            tracing::warn!(element_id = %self.element_id, "viewport target not in document");
            return None;
        };

        let runtime = Runtime::current();
        let callback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let _guard = RuntimeGuard::new(runtime.clone());
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        on_change(threshold.is_visible(entry.intersection_ratio()));
                    }
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold.ratio()));
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(err) => {
                    tracing::warn!(?err, "failed to create IntersectionObserver");
                    return None;
                }
            };
        observer.observe(&element);

        Some(Observation::new(move || {
            observer.disconnect();
            drop(callback);
        }))
    }
}
