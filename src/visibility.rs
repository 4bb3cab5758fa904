use crate::raf::SharedLoop;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// `IntersectionObserver` feeding a section's loop; disconnects on drop.
pub struct VisibilityObserver {
    observer: web::IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web::IntersectionObserver)>,
}

impl VisibilityObserver {
    pub fn observe(element: &web::Element, lp: &SharedLoop) -> anyhow::Result<Self> {
        let params = *lp.borrow().visibility_params();
        let weak = Rc::downgrade(lp);
        let callback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: web::IntersectionObserver| {
                let Some(lp) = weak.upgrade() else {
                    return;
                };
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<web::IntersectionObserverEntry>() {
                        lp.borrow_mut().set_intersection_ratio(entry.intersection_ratio());
                    }
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, web::IntersectionObserver)>);

        let init = web::IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(params.threshold));
        init.set_root_margin(&params.root_margin_css());
        let observer =
            web::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
                .map_err(crate::dom::js_error)?;
        observer.observe(element);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
