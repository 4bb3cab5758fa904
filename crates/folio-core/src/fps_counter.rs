use crate::constants::FPS_COUNTER_INTERVAL_MS;
use crate::observable::Observable;

/// Once-per-second frame counter for the on-screen FPS readout.
pub struct FpsCounter {
    fps: Observable<u32>,
    enabled: bool,
    window_start_ms: f64,
    frames: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            fps: Observable::new(0),
            enabled: false,
            window_start_ms: 0.0,
            frames: 0,
        }
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        self.window_start_ms = now_ms;
        self.frames = 0;
        self.fps.set(0);
    }

    pub fn stop(&mut self) {
        self.enabled = false;
        self.frames = 0;
        self.fps.set(0);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Counts one frame; publishes a new reading once a full interval elapsed.
    pub fn tick(&mut self, now_ms: f64) -> Option<u32> {
        if !self.enabled {
            return None;
        }
        self.frames += 1;
        let elapsed = now_ms - self.window_start_ms;
        if elapsed < FPS_COUNTER_INTERVAL_MS {
            return None;
        }
        let fps = (self.frames as f64 * 1000.0 / elapsed).round() as u32;
        self.frames = 0;
        self.window_start_ms = now_ms;
        self.fps.set(fps);
        Some(fps)
    }

    pub fn fps(&self) -> u32 {
        self.fps.get()
    }

    pub fn observable(&self) -> &Observable<u32> {
        &self.fps
    }
}
