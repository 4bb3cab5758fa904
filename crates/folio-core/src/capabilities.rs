//! Device capability snapshot and GPU tier classification.
//!
//! The platform front-ends implement [`DeviceProbe`] over whatever signals they
//! have (navigator hints and a WebGL context in the browser, the wgpu adapter
//! and `sysinfo` natively). [`detect_capabilities`] turns those raw signals into
//! an immutable [`DeviceCapabilities`] value, substituting defaults for anything
//! the platform does not expose.

use crate::constants::*;

/// Coarse GPU capability class inferred from the renderer string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GpuTier {
    Low,
    Medium,
    High,
}

impl GpuTier {
    pub fn as_str(self) -> &'static str {
        match self {
            GpuTier::Low => "low",
            GpuTier::Medium => "medium",
            GpuTier::High => "high",
        }
    }
}

// Integrated, older mobile and software rasterisers
const LOW_END_PATTERNS: &[&str] = &[
    "intel hd graphics",
    "intel uhd graphics",
    "intel iris",
    "mali-4",
    "mali-t",
    "adreno 3",
    "adreno 4",
    "adreno 5",
    "powervr",
    "sgx",
    "videocore",
    "llvmpipe",
    "swiftshader",
    "software",
];

const HIGH_END_PATTERNS: &[&str] = &[
    "nvidia geforce rtx",
    "nvidia geforce gtx 10",
    "nvidia geforce gtx 16",
    "nvidia geforce gtx 20",
    "nvidia geforce gtx 30",
    "nvidia geforce gtx 40",
    "radeon rx 5",
    "radeon rx 6",
    "radeon rx 7",
    "apple m1",
    "apple m2",
    "apple m3",
    "apple gpu",
    "adreno 7",
    "mali-g7",
    "mali-g6",
];

const MOBILE_UA_TOKENS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Classifies a renderer string. Low-end patterns win over high-end ones.
pub fn classify_gpu(renderer: &str) -> GpuTier {
    let lower = renderer.to_lowercase();
    if LOW_END_PATTERNS.iter().any(|p| lower.contains(p)) {
        GpuTier::Low
    } else if HIGH_END_PATTERNS.iter().any(|p| lower.contains(p)) {
        GpuTier::High
    } else {
        GpuTier::Medium
    }
}

#[inline]
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let lower = user_agent.to_lowercase();
    MOBILE_UA_TOKENS.iter().any(|t| lower.contains(t))
}

/// Outcome of the transient graphics-context probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GpuProbe {
    /// No graphics context could be created.
    NoContext,
    /// A context exists but the renderer string is not exposed.
    Masked,
    Renderer(String),
}

/// Raw platform signals consumed by [`detect_capabilities`].
///
/// Every method is best-effort: `None` means the platform does not expose the
/// hint and a default is used instead.
pub trait DeviceProbe {
    fn user_agent(&self) -> Option<String>;
    fn has_touch(&self) -> bool;
    fn gpu(&self) -> GpuProbe;
    fn device_memory_gb(&self) -> Option<f64>;
    fn hardware_concurrency(&self) -> Option<u32>;
    fn device_pixel_ratio(&self) -> Option<f64>;
    fn prefers_reduced_motion(&self) -> bool;
}

/// Immutable device snapshot, computed once per process.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceCapabilities {
    pub is_mobile: bool,
    pub is_touch: bool,
    pub gpu_renderer: String,
    pub gpu_tier: GpuTier,
    pub device_memory_gb: f64,
    pub hardware_concurrency: u32,
    /// Display pixel ratio, capped at 3.
    pub native_pixel_ratio: f64,
    pub prefers_reduced_motion: bool,
}

impl Default for DeviceCapabilities {
    /// A desktop with an unidentified GPU and default navigator hints.
    fn default() -> Self {
        Self {
            is_mobile: false,
            is_touch: false,
            gpu_renderer: UNKNOWN_RENDERER.to_string(),
            gpu_tier: GpuTier::Medium,
            device_memory_gb: DEFAULT_DEVICE_MEMORY_GB,
            hardware_concurrency: DEFAULT_HARDWARE_CONCURRENCY,
            native_pixel_ratio: DEFAULT_PIXEL_RATIO,
            prefers_reduced_motion: false,
        }
    }
}

/// Resolves the renderer string and tier from a GPU probe.
pub fn resolve_gpu(probe: GpuProbe) -> (String, GpuTier) {
    match probe {
        GpuProbe::NoContext => (UNKNOWN_RENDERER.to_string(), GpuTier::Low),
        GpuProbe::Masked => (UNKNOWN_RENDERER.to_string(), classify_gpu(UNKNOWN_RENDERER)),
        GpuProbe::Renderer(name) => {
            let tier = classify_gpu(&name);
            (name, tier)
        }
    }
}

pub fn detect_capabilities(probe: &impl DeviceProbe) -> DeviceCapabilities {
    let is_mobile = probe
        .user_agent()
        .map(|ua| is_mobile_user_agent(&ua))
        .unwrap_or(false);
    let (gpu_renderer, gpu_tier) = resolve_gpu(probe.gpu());
    let device_memory_gb = probe
        .device_memory_gb()
        .filter(|gb| *gb > 0.0)
        .unwrap_or(DEFAULT_DEVICE_MEMORY_GB);
    let hardware_concurrency = probe
        .hardware_concurrency()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_HARDWARE_CONCURRENCY);
    let native_pixel_ratio = probe
        .device_pixel_ratio()
        .filter(|r| *r > 0.0)
        .unwrap_or(DEFAULT_PIXEL_RATIO)
        .min(MAX_NATIVE_PIXEL_RATIO);

    let caps = DeviceCapabilities {
        is_mobile,
        is_touch: probe.has_touch(),
        gpu_renderer,
        gpu_tier,
        device_memory_gb,
        hardware_concurrency,
        native_pixel_ratio,
        prefers_reduced_motion: probe.prefers_reduced_motion(),
    };
    log::debug!(
        "[caps] mobile={} touch={} gpu='{}' tier={} mem={}GB threads={} dpr={:.2} reduced_motion={}",
        caps.is_mobile,
        caps.is_touch,
        caps.gpu_renderer,
        caps.gpu_tier.as_str(),
        caps.device_memory_gb,
        caps.hardware_concurrency,
        caps.native_pixel_ratio,
        caps.prefers_reduced_motion
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrated_intel_is_low_even_inside_angle_string() {
        assert_eq!(
            classify_gpu("ANGLE (Intel, Intel(R) UHD Graphics 620 Direct3D11 vs_5_0 ps_5_0)"),
            GpuTier::Low
        );
    }

    #[test]
    fn discrete_and_apple_silicon_are_high() {
        assert_eq!(classify_gpu("NVIDIA GeForce RTX 3080/PCIe/SSE2"), GpuTier::High);
        assert_eq!(classify_gpu("Apple M2 Pro"), GpuTier::High);
        assert_eq!(classify_gpu("Adreno (TM) 740"), GpuTier::Medium);
        assert_eq!(classify_gpu("Adreno 730"), GpuTier::High);
    }

    #[test]
    fn unmatched_renderer_is_medium() {
        assert_eq!(classify_gpu("AMD Radeon Pro 5500M"), GpuTier::Medium);
        assert_eq!(classify_gpu(UNKNOWN_RENDERER), GpuTier::Medium);
    }

    #[test]
    fn mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15"
        ));
        assert!(is_mobile_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
        ));
    }

    #[test]
    fn no_context_means_low_unknown() {
        assert_eq!(
            resolve_gpu(GpuProbe::NoContext),
            (UNKNOWN_RENDERER.to_string(), GpuTier::Low)
        );
        assert_eq!(
            resolve_gpu(GpuProbe::Masked),
            (UNKNOWN_RENDERER.to_string(), GpuTier::Medium)
        );
    }
}
