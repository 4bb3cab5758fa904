use crate::raf::{self, SharedLoop};
use crate::visibility::VisibilityObserver;
use folio_core::{LoopState, QualityContext, VisibilityParams};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

/// Per-section frame loop. Stops while the section is scrolled away, and
/// while the caller has paused it.
#[wasm_bindgen]
pub struct SectionAnimator {
    lp: SharedLoop,
    observer: Option<VisibilityObserver>,
    ctx: Rc<QualityContext>,
}

impl SectionAnimator {
    pub fn new(
        window: web::Window,
        ctx: Rc<QualityContext>,
        element: Option<web::Element>,
    ) -> anyhow::Result<Self> {
        let lp = raf::shared_loop(window, VisibilityParams::default());
        let observer = match element {
            Some(el) => Some(VisibilityObserver::observe(&el, &lp)?),
            None => None,
        };
        Ok(Self { lp, observer, ctx })
    }
}

#[wasm_bindgen]
impl SectionAnimator {
    /// Replaces any running callback with `callback(elapsedSeconds, deltaMs)`.
    /// A throw stops the loop and is logged.
    pub fn start(&self, callback: js_sys::Function) {
        self.lp.borrow_mut().start(move |tick| {
            callback
                .call2(
                    &JsValue::NULL,
                    &JsValue::from_f64(tick.elapsed_s),
                    &JsValue::from_f64(tick.delta_ms),
                )
                .map(|_| ())
                .map_err(crate::dom::js_error)
        });
    }

    pub fn stop(&self) {
        self.lp.borrow_mut().stop();
    }

    pub fn pause(&self) {
        self.lp.borrow_mut().pause();
    }

    pub fn resume(&self) {
        self.lp.borrow_mut().resume();
    }

    /// Stops the loop and detaches the visibility observer.
    pub fn dispose(&mut self) {
        self.observer = None;
        self.lp.borrow_mut().dispose();
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.lp.borrow().is_paused()
    }

    #[wasm_bindgen(js_name = isVisible)]
    pub fn is_visible(&self) -> bool {
        self.lp.borrow().is_visible()
    }

    pub fn state(&self) -> String {
        match self.lp.borrow().state() {
            LoopState::Stopped => "stopped",
            LoopState::Running => "running",
            LoopState::Paused => "paused",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = targetFps)]
    pub fn target_fps(&self) -> u32 {
        self.ctx.target_fps()
    }
}

impl Drop for SectionAnimator {
    fn drop(&mut self) {
        self.dispose();
    }
}
