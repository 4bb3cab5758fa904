//! Render parameters derived from the quality level and device class.

use crate::capabilities::DeviceCapabilities;
use crate::quality::QualityLevel;

/// GPU power hint forwarded to the renderer/context constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerPreference {
    HighPerformance,
    LowPower,
    Default,
}

impl PowerPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerPreference::HighPerformance => "high-performance",
            PowerPreference::LowPower => "low-power",
            PowerPreference::Default => "default",
        }
    }
}

/// Concrete parameters consumed by the 3D layer. Never stored; recomputed from
/// the current level whenever it is needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub pixel_ratio: f64,
    pub antialias: bool,
    pub power_preference: PowerPreference,
    pub particle_multiplier: f64,
    pub segment_multiplier: f64,
    pub target_fps: u32,
    pub light_count: u32,
}

/// Target cadence for a level; also used by the sampler's sustained rule.
#[inline]
pub fn target_fps(level: QualityLevel, is_mobile: bool) -> u32 {
    match (level, is_mobile) {
        (QualityLevel::Minimal, _) => 30,
        (QualityLevel::Low, true) => 30,
        (QualityLevel::Low, false) => 45,
        (QualityLevel::High, true) => 30,
        (QualityLevel::High, false) => 60,
    }
}

pub fn render_settings(level: QualityLevel, caps: &DeviceCapabilities) -> RenderSettings {
    let mobile = caps.is_mobile;
    let native = caps.native_pixel_ratio;
    let fps = target_fps(level, mobile);
    match level {
        QualityLevel::Minimal => RenderSettings {
            pixel_ratio: 1.0,
            antialias: false,
            power_preference: PowerPreference::LowPower,
            particle_multiplier: if mobile { 0.15 } else { 0.25 },
            segment_multiplier: if mobile { 0.2 } else { 0.25 },
            target_fps: fps,
            light_count: if mobile { 2 } else { 3 },
        },
        QualityLevel::Low => RenderSettings {
            pixel_ratio: native.min(if mobile { 1.2 } else { 1.5 }),
            antialias: false,
            power_preference: if mobile {
                PowerPreference::LowPower
            } else {
                PowerPreference::Default
            },
            particle_multiplier: if mobile { 0.35 } else { 0.5 },
            segment_multiplier: if mobile { 0.4 } else { 0.5 },
            target_fps: fps,
            light_count: if mobile { 3 } else { 4 },
        },
        QualityLevel::High => RenderSettings {
            pixel_ratio: native.min(if mobile { 1.5 } else { 2.5 }),
            // antialiasing is the first thing dropped on mobile
            antialias: !mobile,
            power_preference: if mobile {
                PowerPreference::Default
            } else {
                PowerPreference::HighPerformance
            },
            particle_multiplier: if mobile { 0.8 } else { 1.5 },
            segment_multiplier: if mobile { 0.9 } else { 1.5 },
            target_fps: fps,
            light_count: if mobile { 4 } else { 6 },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(mobile: bool, dpr: f64) -> DeviceCapabilities {
        DeviceCapabilities {
            is_mobile: mobile,
            native_pixel_ratio: dpr,
            ..DeviceCapabilities::default()
        }
    }

    #[test]
    fn settings_are_deterministic_across_the_matrix() {
        for level in QualityLevel::ALL {
            for mobile in [false, true] {
                let c = caps(mobile, 2.0);
                assert_eq!(render_settings(level, &c), render_settings(level, &c));
            }
        }
    }

    #[test]
    fn pixel_ratio_caps_grow_with_level() {
        let desktop = caps(false, 3.0);
        assert_eq!(render_settings(QualityLevel::Minimal, &desktop).pixel_ratio, 1.0);
        assert_eq!(render_settings(QualityLevel::Low, &desktop).pixel_ratio, 1.5);
        assert_eq!(render_settings(QualityLevel::High, &desktop).pixel_ratio, 2.5);

        let phone = caps(true, 3.0);
        assert_eq!(render_settings(QualityLevel::Low, &phone).pixel_ratio, 1.2);
        assert_eq!(render_settings(QualityLevel::High, &phone).pixel_ratio, 1.5);
    }

    #[test]
    fn native_ratio_below_cap_is_kept() {
        let s = render_settings(QualityLevel::High, &caps(false, 1.25));
        assert_eq!(s.pixel_ratio, 1.25);
    }

    #[test]
    fn antialias_only_on_high_desktop() {
        for level in QualityLevel::ALL {
            for mobile in [false, true] {
                let s = render_settings(level, &caps(mobile, 1.0));
                assert_eq!(s.antialias, level == QualityLevel::High && !mobile);
            }
        }
    }

    #[test]
    fn high_desktop_row() {
        let s = render_settings(QualityLevel::High, &caps(false, 2.0));
        assert_eq!(s.power_preference, PowerPreference::HighPerformance);
        assert_eq!(s.particle_multiplier, 1.5);
        assert_eq!(s.segment_multiplier, 1.5);
        assert_eq!(s.target_fps, 60);
        assert_eq!(s.light_count, 6);
    }

    #[test]
    fn target_fps_table() {
        assert_eq!(target_fps(QualityLevel::Minimal, false), 30);
        assert_eq!(target_fps(QualityLevel::Low, false), 45);
        assert_eq!(target_fps(QualityLevel::Low, true), 30);
        assert_eq!(target_fps(QualityLevel::High, true), 30);
    }
}
