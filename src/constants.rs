// Browser-side identifiers used by the probes and subscriptions.
// Platform-free so host tests can include this file directly.

// WebGL contexts tried in order for the renderer probe
pub const WEBGL_CONTEXT_IDS: [&str; 2] = ["webgl", "experimental-webgl"];

// Debug extension exposing the unmasked renderer string
pub const DEBUG_RENDERER_EXTENSION: &str = "WEBGL_debug_renderer_info";
pub const UNMASKED_RENDERER_WEBGL: u32 = 0x9246;

// Extension used to release the probe context right away
pub const LOSE_CONTEXT_EXTENSION: &str = "WEBGL_lose_context";

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Navigator properties not covered by web-sys bindings
pub const NAVIGATOR_DEVICE_MEMORY: &str = "deviceMemory";
pub const NAVIGATOR_GET_BATTERY: &str = "getBattery";
pub const NAVIGATOR_BATTERY: &str = "battery";
pub const WINDOW_TOUCH_START: &str = "ontouchstart";

// BatteryManager events refreshing the snapshot
pub const BATTERY_EVENTS: [&str; 4] = [
    "chargingchange",
    "levelchange",
    "chargingtimechange",
    "dischargingtimechange",
];

// Console log level for the wasm build
pub const LOG_LEVEL: log::Level = log::Level::Info;
