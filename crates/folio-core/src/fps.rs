//! Rolling-window frame-rate sampler driving automatic quality degradation.
//!
//! Every observed frame contributes one instantaneous FPS sample. Once the
//! window holds enough samples, two rules are evaluated in order:
//!
//! 1. *Sustained*: the window mean is below a fraction of the current level's
//!    target FPS.
//! 2. *Sudden drop*: the mean of the most recent samples fell below a fraction
//!    of the mean of the samples just before them (thermal throttling).
//!
//! Each rule that fires steps the level down once and clears the window. The
//! second rule therefore sees an empty window whenever the first one fired, so
//! one evaluation lowers the level by at most one step.
//!
//! Deciding a step ([`FpsSampler::take_step`]) is separate from applying it
//! ([`PendingStep::apply`]): applying notifies quality listeners, which must
//! not run while a shared sampler is borrowed.

use crate::constants::*;
use crate::context::QualityContext;
use crate::quality::QualityLevel;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerParams {
    pub capacity: usize,
    pub min_samples: usize,
    pub sustained_ratio: f64,
    pub recent_samples: usize,
    pub earlier_samples: usize,
    pub drop_ratio: f64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            capacity: FPS_WINDOW_CAPACITY,
            min_samples: FPS_MIN_SAMPLES,
            sustained_ratio: SUSTAINED_FPS_RATIO,
            recent_samples: THERMAL_RECENT_SAMPLES,
            earlier_samples: THERMAL_EARLIER_SAMPLES,
            drop_ratio: THERMAL_DROP_RATIO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegradeReason {
    SustainedLowFps,
    SuddenDrop,
}

/// One quality step taken by the sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Degradation {
    pub reason: DegradeReason,
    pub from: QualityLevel,
    pub to: QualityLevel,
    pub average_fps: f64,
}

pub type Degradations = SmallVec<[Degradation; 2]>;

#[derive(Debug)]
pub struct FpsSampler {
    params: SamplerParams,
    window: VecDeque<f64>,
    last_frame_ms: Option<f64>,
    monitoring: bool,
}

impl Default for FpsSampler {
    fn default() -> Self {
        Self::new(SamplerParams::default())
    }
}

impl FpsSampler {
    pub fn new(params: SamplerParams) -> Self {
        Self {
            params,
            window: VecDeque::with_capacity(params.capacity),
            last_frame_ms: None,
            monitoring: false,
        }
    }

    pub fn params(&self) -> &SamplerParams {
        &self.params
    }

    /// Begins sampling; a no-op while already monitoring.
    pub fn start_monitoring(&mut self, now_ms: f64) {
        if self.monitoring {
            return;
        }
        self.monitoring = true;
        self.window.clear();
        self.last_frame_ms = Some(now_ms);
        log::debug!("[fps] monitoring started");
    }

    /// Halts sampling and clears the history.
    pub fn stop_monitoring(&mut self) {
        if self.monitoring {
            log::debug!("[fps] monitoring stopped");
        }
        self.monitoring = false;
        self.window.clear();
        self.last_frame_ms = None;
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Mean of the current window, 0 when empty.
    pub fn average_fps(&self) -> f64 {
        mean(self.window.iter())
    }

    /// Adds one instantaneous FPS value, evicting the oldest beyond capacity.
    pub fn push_sample(&mut self, fps: f64) {
        self.window.push_back(fps);
        while self.window.len() > self.params.capacity {
            self.window.pop_front();
        }
    }

    /// Adds the sample for a frame at `now_ms`. Returns `false` when the frame
    /// was ignored (monitoring off).
    pub fn observe_frame(&mut self, now_ms: f64) -> bool {
        if !self.monitoring {
            return false;
        }
        let delta = now_ms - self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        if delta > 0.0 {
            self.push_sample(1000.0 / delta);
        }
        true
    }

    /// Checks both rules against the window for a context currently at
    /// `level`. A firing rule clears the window and yields the step to apply;
    /// nothing fires at the floor.
    pub fn take_step(&mut self, level: QualityLevel, target_fps: u32) -> Option<PendingStep> {
        if self.window.len() < self.params.min_samples || level.degraded().is_none() {
            return None;
        }

        let average = self.average_fps();
        if average < target_fps as f64 * self.params.sustained_ratio {
            self.window.clear();
            return Some(PendingStep {
                reason: DegradeReason::SustainedLowFps,
                average_fps: average,
            });
        }

        let len = self.window.len();
        let recent = self.params.recent_samples;
        if len < recent {
            return None;
        }
        let earlier_start = len.saturating_sub(recent + self.params.earlier_samples);
        let earlier_end = len - recent;
        if earlier_end <= earlier_start {
            return None;
        }
        let earlier_avg = mean(self.window.range(earlier_start..earlier_end));
        let recent_avg = mean(self.window.range(earlier_end..));
        if earlier_avg > 0.0 && recent_avg < earlier_avg * self.params.drop_ratio {
            self.window.clear();
            return Some(PendingStep {
                reason: DegradeReason::SuddenDrop,
                average_fps: recent_avg,
            });
        }
        None
    }

    /// Records a frame at `now_ms` and evaluates the degradation rules.
    /// Frames arriving while monitoring is off are ignored.
    pub fn record_frame(&mut self, now_ms: f64, ctx: &QualityContext) -> Degradations {
        if !self.observe_frame(now_ms) {
            return Degradations::new();
        }
        self.evaluate(ctx)
    }

    /// Runs both rules against the current window.
    pub fn evaluate(&mut self, ctx: &QualityContext) -> Degradations {
        self.take_step(ctx.quality(), ctx.target_fps())
            .and_then(|step| step.apply(ctx))
            .into_iter()
            .collect()
    }

    /// [`record_frame`](Self::record_frame) for a sampler shared behind a
    /// `RefCell`. The borrow is released before the context is degraded, so
    /// quality listeners may read, restart or stop the sampler.
    pub fn record_shared(
        sampler: &RefCell<Self>,
        now_ms: f64,
        ctx: &QualityContext,
    ) -> Degradations {
        let step = {
            let mut s = sampler.borrow_mut();
            if !s.observe_frame(now_ms) {
                return Degradations::new();
            }
            s.take_step(ctx.quality(), ctx.target_fps())
        };
        step.and_then(|step| step.apply(ctx)).into_iter().collect()
    }
}

/// A rule that fired; not yet applied to the context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingStep {
    pub reason: DegradeReason,
    pub average_fps: f64,
}

impl PendingStep {
    /// Steps the context down once. `None` if it is already at the floor.
    pub fn apply(self, ctx: &QualityContext) -> Option<Degradation> {
        let from = ctx.quality();
        let to = ctx.degrade()?;
        log::info!(
            "[fps] {:?} at {:.1} fps: {} -> {}",
            self.reason,
            self.average_fps,
            from,
            to
        );
        Some(Degradation {
            reason: self.reason,
            from,
            to,
            average_fps: self.average_fps,
        })
    }
}

fn mean<'a>(values: impl ExactSizeIterator<Item = &'a f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}
