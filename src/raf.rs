use folio_core::{AnimationLoop, FrameHandle, FrameScheduler, VisibilityParams};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub type SharedLoop = Rc<RefCell<AnimationLoop<RafScheduler>>>;

/// `requestAnimationFrame` scheduler; every request reuses one closure.
pub struct RafScheduler {
    window: web::Window,
    tick: TickSlot,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let slot = self.tick.borrow();
        let tick = slot.as_ref()?;
        self.window
            .request_animation_frame(tick.as_ref().unchecked_ref())
            .ok()
            .map(FrameHandle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        _ = self.window.cancel_animation_frame(handle.0);
    }
}

/// Builds a loop whose frames are delivered by `requestAnimationFrame`.
pub fn shared_loop(window: web::Window, visibility: VisibilityParams) -> SharedLoop {
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let lp = Rc::new(RefCell::new(AnimationLoop::with_visibility(
        RafScheduler {
            window,
            tick: tick.clone(),
        },
        visibility,
    )));
    let weak = Rc::downgrade(&lp);
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
        if let Some(lp) = weak.upgrade() {
            deliver_frame(&lp, now_ms);
        }
    }) as Box<dyn FnMut(f64)>));
    lp
}

/// Runs one frame with no borrow held across the callback, so the callback
/// may pause, stop or restart its own loop.
fn deliver_frame(lp: &SharedLoop, now_ms: f64) {
    // cancelled frames never fire, so a delivered frame is the pending one
    let due = {
        let mut l = lp.borrow_mut();
        match l.pending_handle() {
            Some(handle) => l.begin_frame(handle, now_ms),
            None => None,
        }
    };
    let Some(due) = due else {
        return;
    };
    let mut callback = due.callback.borrow_mut();
    let result = (&mut *callback)(due.tick);
    drop(callback);
    // failures are logged by the loop, which also stops itself
    _ = lp.borrow_mut().finish_frame(due, result);
}
