/// Adaptation tuning constants.
///
/// Frame-window sizes, thresholds and score weights used by the quality
/// detector and the FPS sampler. Kept together so the controller's behavior can
/// be read off one file.

// Persistence key for the chosen quality level
pub const QUALITY_STORAGE_KEY: &str = "wifsimster_quality";

// FPS sample window
pub const FPS_WINDOW_CAPACITY: usize = 60;
pub const FPS_MIN_SAMPLES: usize = 30;

// Degrade when the window mean is below this fraction of the target FPS
pub const SUSTAINED_FPS_RATIO: f64 = 0.7;

// Sudden-drop detector: last N samples compared against the M before them
pub const THERMAL_RECENT_SAMPLES: usize = 10;
pub const THERMAL_EARLIER_SAMPLES: usize = 20;
pub const THERMAL_DROP_RATIO: f64 = 0.7;

// Navigator fallbacks when a hint is not exposed
pub const DEFAULT_DEVICE_MEMORY_GB: f64 = 4.0;
pub const DEFAULT_HARDWARE_CONCURRENCY: u32 = 4;
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;
pub const MAX_NATIVE_PIXEL_RATIO: f64 = 3.0;

// Renderer string reported when the GPU cannot be identified
pub const UNKNOWN_RENDERER: &str = "unknown";

// Initial quality score weights
pub const SCORE_GPU_HIGH: i32 = 3;
pub const SCORE_GPU_MEDIUM: i32 = 2;
pub const SCORE_THREADS_MANY: i32 = 2; // >= 8 threads
pub const SCORE_THREADS_SOME: i32 = 1; // >= 4 threads
pub const SCORE_MEMORY_LARGE: i32 = 2; // >= 8 GB
pub const SCORE_MEMORY_MEDIUM: i32 = 1; // >= 4 GB
pub const SCORE_MOBILE_PENALTY: i32 = 3;
pub const SCORE_MOBILE_LOW_GPU_PENALTY: i32 = 1;
pub const SCORE_HIGH_DPR_PENALTY: i32 = 1;
pub const SCORE_LOW_BATTERY_PENALTY: i32 = 1;

pub const MANY_THREADS: u32 = 8;
pub const SOME_THREADS: u32 = 4;
pub const LARGE_MEMORY_GB: f64 = 8.0;
pub const MEDIUM_MEMORY_GB: f64 = 4.0;
pub const HIGH_DPR_THRESHOLD: f64 = 2.0;

// Battery thresholds (fraction of full charge)
pub const LOW_BATTERY_LEVEL: f64 = 0.3;
pub const CRITICAL_BATTERY_LEVEL: f64 = 0.2;

// Score cut-offs
pub const SCORE_HIGH_MIN: i32 = 5;
pub const SCORE_LOW_MIN: i32 = 2;

// Visibility: fraction of the element that must intersect the viewport
pub const VISIBILITY_THRESHOLD: f64 = 0.1;
pub const VISIBILITY_ROOT_MARGIN_PX: u32 = 50;

// On-screen FPS counter publish interval
pub const FPS_COUNTER_INTERVAL_MS: f64 = 1000.0;
