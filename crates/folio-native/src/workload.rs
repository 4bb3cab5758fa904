use folio_core::RenderSettings;
use std::time::{Duration, Instant};

/// Synthetic per-frame CPU cost standing in for scene work. Scales with the
/// particle budget of the current render settings, so degrading quality
/// actually lightens the frame.
#[derive(Clone, Copy, Debug)]
pub struct Workload {
    base: Duration,
}

impl Workload {
    pub fn new(base_ms: f64) -> Self {
        Self {
            base: Duration::from_secs_f64(base_ms.max(0.0) / 1000.0),
        }
    }

    pub fn frame_cost(&self, settings: &RenderSettings) -> Duration {
        self.base.mul_f64(settings.particle_multiplier)
    }

    /// Busy-waits for the frame cost.
    pub fn run(&self, settings: &RenderSettings) {
        let cost = self.frame_cost(settings);
        if cost.is_zero() {
            return;
        }
        let start = Instant::now();
        while start.elapsed() < cost {
            std::hint::spin_loop();
        }
    }
}
