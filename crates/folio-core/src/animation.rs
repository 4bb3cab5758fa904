//! Per-section animation loop driver.
//!
//! `AnimationLoop` is a small state machine (Stopped / Running / Paused) that
//! owns one render callback and chains display frames through a
//! [`FrameScheduler`] (`requestAnimationFrame` in the browser, the winit event
//! loop natively). Frames are delivered back with the handle they were
//! scheduled under; deliveries for a handle that is no longer pending (the
//! loop was stopped or restarted in between) are ignored.
//!
//! Hosts that share the loop behind `Rc<RefCell<_>>` call [`begin_frame`],
//! invoke the callback with no borrow held, then call [`finish_frame`]. This
//! lets the callback pause or stop its own loop. Hosts without that concern can
//! use [`run_frame`].
//!
//! A callback error stops the loop and unregisters the callback; only an
//! explicit `start` brings it back.
//!
//! [`begin_frame`]: AnimationLoop::begin_frame
//! [`finish_frame`]: AnimationLoop::finish_frame
//! [`run_frame`]: AnimationLoop::run_frame

use crate::constants::{VISIBILITY_ROOT_MARGIN_PX, VISIBILITY_THRESHOLD};
use std::cell::RefCell;
use std::rc::Rc;

/// Opaque id of a scheduled frame (the `requestAnimationFrame` id on the web).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Schedules exactly one future frame per request.
pub trait FrameScheduler {
    /// `None` when the platform refused to schedule.
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler whose frames are delivered by the host calling
/// [`AnimationLoop::run_frame`] with [`AnimationLoop::pending_handle`].
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: i32,
    pub requested: Vec<FrameHandle>,
    pub cancelled: Vec<FrameHandle>,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.requested.push(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.cancelled.push(handle);
    }
}

/// Timing passed to the render callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub now_ms: f64,
    /// Milliseconds since the previous frame; 0 on the first frame after a
    /// (re)start or resume.
    pub delta_ms: f64,
    /// Seconds since the loop (re)started.
    pub elapsed_s: f64,
}

pub type FrameCallback = Rc<RefCell<dyn FnMut(FrameTick) -> anyhow::Result<()>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
    Paused,
}

/// Viewport-intersection options for auto stop/restart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityParams {
    /// Minimum visible fraction of the element.
    pub threshold: f64,
    /// Pre-trigger margin around the viewport.
    pub root_margin_px: u32,
}

impl Default for VisibilityParams {
    fn default() -> Self {
        Self {
            threshold: VISIBILITY_THRESHOLD,
            root_margin_px: VISIBILITY_ROOT_MARGIN_PX,
        }
    }
}

impl VisibilityParams {
    #[inline]
    pub fn is_visible(&self, intersection_ratio: f64) -> bool {
        intersection_ratio >= self.threshold
    }

    pub fn root_margin_css(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

/// A frame that passed the state checks and must now run its callback.
pub struct DueFrame {
    pub tick: FrameTick,
    pub callback: FrameCallback,
    generation: u64,
}

pub struct AnimationLoop<S: FrameScheduler> {
    scheduler: S,
    visibility: VisibilityParams,
    paused: bool,
    visible: bool,
    running: bool,
    pending: Option<FrameHandle>,
    callback: Option<FrameCallback>,
    start_ms: Option<f64>,
    last_frame_ms: Option<f64>,
    // bumped by every stop so in-flight frames of an older chain are dropped
    generation: u64,
}

impl<S: FrameScheduler> AnimationLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_visibility(scheduler, VisibilityParams::default())
    }

    pub fn with_visibility(scheduler: S, visibility: VisibilityParams) -> Self {
        Self {
            scheduler,
            visibility,
            paused: false,
            visible: true,
            running: false,
            pending: None,
            callback: None,
            start_ms: None,
            last_frame_ms: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        if self.paused {
            LoopState::Paused
        } else if self.running {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn visibility_params(&self) -> &VisibilityParams {
        &self.visibility
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Registers `callback` and starts the loop if visible and not paused.
    /// A loop that is already running is stopped first.
    pub fn start(&mut self, callback: impl FnMut(FrameTick) -> anyhow::Result<()> + 'static) {
        self.start_shared(Rc::new(RefCell::new(callback)));
    }

    pub fn start_shared(&mut self, callback: FrameCallback) {
        self.stop();
        self.callback = Some(callback);
        if self.visible && !self.paused {
            self.schedule_chain();
        }
    }

    /// Cancels the scheduled frame and resets timing. The callback stays
    /// registered so visibility can restart the loop.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.running = false;
        self.start_ms = None;
        self.last_frame_ms = None;
        self.generation += 1;
    }

    /// The next delivered frame observes the flag and ends the chain.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.last_frame_ms = None;
        if self.visible && self.callback.is_some() && self.pending.is_none() {
            self.schedule_chain();
        }
    }

    /// Applies an intersection ratio from the visibility observer.
    pub fn set_intersection_ratio(&mut self, ratio: f64) {
        let visible = self.visibility.is_visible(ratio);
        self.set_visible(visible);
    }

    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if self.paused {
            return;
        }
        if !visible {
            log::debug!("[loop] section hidden, stopping");
            self.stop();
        } else if self.callback.is_some() && self.pending.is_none() {
            log::debug!("[loop] section visible, restarting");
            self.schedule_chain();
        }
    }

    /// Stops the loop and drops the callback.
    pub fn dispose(&mut self) {
        self.stop();
        self.callback = None;
    }

    /// First half of a frame delivery: validates the handle and state and
    /// computes timing. `None` means there is nothing to run.
    pub fn begin_frame(&mut self, handle: FrameHandle, now_ms: f64) -> Option<DueFrame> {
        if self.pending != Some(handle) {
            log::trace!("[loop] ignoring stale frame {:?}", handle);
            return None;
        }
        self.pending = None;
        if self.paused || !self.visible {
            self.running = false;
            return None;
        }
        let Some(callback) = self.callback.clone() else {
            self.running = false;
            return None;
        };
        let start = *self.start_ms.get_or_insert(now_ms);
        let last = self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        Some(DueFrame {
            tick: FrameTick {
                now_ms,
                delta_ms: now_ms - last,
                elapsed_s: (now_ms - start) / 1000.0,
            },
            callback,
            generation: self.generation,
        })
    }

    /// Second half of a frame delivery: schedules the next frame, or stops the
    /// loop if the callback failed. The callback's error is handed back.
    pub fn finish_frame(&mut self, frame: DueFrame, result: anyhow::Result<()>) -> anyhow::Result<()> {
        let current = frame.generation == self.generation;
        if let Err(e) = result {
            if current {
                log::error!("[loop] frame callback failed, stopping: {:#}", e);
                self.dispose();
            }
            return Err(e);
        }
        if current && self.pending.is_none() {
            if !self.paused && self.visible && self.callback.is_some() {
                self.schedule_next();
            } else {
                self.running = false;
            }
        }
        Ok(())
    }

    /// Delivers frame `handle` and runs the callback in place.
    /// Returns whether the callback ran.
    pub fn run_frame(&mut self, handle: FrameHandle, now_ms: f64) -> anyhow::Result<bool> {
        let Some(frame) = self.begin_frame(handle, now_ms) else {
            return Ok(false);
        };
        let mut callback = frame.callback.borrow_mut();
        let result = (&mut *callback)(frame.tick);
        drop(callback);
        self.finish_frame(frame, result)?;
        Ok(true)
    }

    fn schedule_chain(&mut self) {
        self.start_ms = None;
        self.last_frame_ms = None;
        self.schedule_next();
    }

    fn schedule_next(&mut self) {
        self.pending = self.scheduler.request_frame();
        self.running = self.pending.is_some();
        if self.pending.is_none() {
            log::warn!("[loop] platform refused to schedule a frame");
        }
    }
}
