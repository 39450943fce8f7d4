use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::error::PageError;
use crate::reveal::{IntersectionSample, RevealState, RevealTransition};

/// Pulls the reveal point up so a section has to clear the bottom edge a
/// little before it animates in.
const ROOT_MARGIN: &str = "0px 0px -40px 0px";

type RevealCallback = Box<dyn Fn()>;

/// Tracks one section with an `IntersectionObserver` and folds the samples
/// into a [`RevealState`]. Disconnects when dropped.
pub struct RevealController {
    state: Rc<RefCell<RevealState>>,
    observer: Option<IntersectionObserver>,
    _callback: Option<Closure<dyn FnMut(Array, IntersectionObserver)>>,
}

impl RevealController {
    /// Observe `target`. `on_reveal` runs once, when the section first
    /// becomes visible. Without `IntersectionObserver` the section is shown
    /// immediately.
    pub fn attach(target: &Element, threshold: f64, on_reveal: RevealCallback) -> Self {
        match Self::observe(target, threshold, on_reveal) {
            Ok(controller) => controller,
            Err(err) => {
                log::warn!("{err}; showing section immediately");
                Self {
                    state: Rc::new(RefCell::new(RevealState::always_visible(threshold))),
                    observer: None,
                    _callback: None,
                }
            }
        }
    }

    fn observe(target: &Element, threshold: f64, on_reveal: RevealCallback) -> Result<Self, PageError> {
        let global = js_sys::global();
        let supported = js_sys::Reflect::has(&global, &JsValue::from_str("IntersectionObserver"))
            .unwrap_or(false);
        if !supported {
            return Err(PageError::ObservationUnavailable);
        }

        let state = Rc::new(RefCell::new(RevealState::new(threshold)));
        let cb_state = Rc::clone(&state);
        let callback = Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                let sample =
                    IntersectionSample::new(entry.intersection_ratio(), entry.is_intersecting());
                let transition = cb_state.borrow_mut().observe(sample);
                if transition == RevealTransition::Revealed {
                    observer.unobserve(&entry.target());
                    on_reveal();
                }
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(state.borrow().threshold()));
        options.set_root_margin(ROOT_MARGIN);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(|_| PageError::ObservationUnavailable)?;
        observer.observe(target);

        Ok(Self {
            state,
            observer: Some(observer),
            _callback: Some(callback),
        })
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().is_visible()
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}
