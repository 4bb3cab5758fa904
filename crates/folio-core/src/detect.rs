//! Initial quality heuristic.

use crate::battery::BatterySnapshot;
use crate::capabilities::{DeviceCapabilities, GpuTier};
use crate::constants::*;
use crate::quality::QualityLevel;
use crate::storage::{load_quality, KeyValueStore};

/// Weighted device score; higher means more headroom.
pub fn device_score(caps: &DeviceCapabilities, battery: Option<&BatterySnapshot>) -> i32 {
    let mut score = match caps.gpu_tier {
        GpuTier::High => SCORE_GPU_HIGH,
        GpuTier::Medium => SCORE_GPU_MEDIUM,
        GpuTier::Low => 0,
    };

    if caps.hardware_concurrency >= MANY_THREADS {
        score += SCORE_THREADS_MANY;
    } else if caps.hardware_concurrency >= SOME_THREADS {
        score += SCORE_THREADS_SOME;
    }

    if caps.device_memory_gb >= LARGE_MEMORY_GB {
        score += SCORE_MEMORY_LARGE;
    } else if caps.device_memory_gb >= MEDIUM_MEMORY_GB {
        score += SCORE_MEMORY_MEDIUM;
    }

    if caps.is_mobile {
        score -= SCORE_MOBILE_PENALTY;
        if caps.gpu_tier == GpuTier::Low {
            score -= SCORE_MOBILE_LOW_GPU_PENALTY;
        }
    }

    if caps.native_pixel_ratio > HIGH_DPR_THRESHOLD {
        score -= SCORE_HIGH_DPR_PENALTY;
    }

    if battery.is_some_and(BatterySnapshot::is_low_and_discharging) {
        score -= SCORE_LOW_BATTERY_PENALTY;
    }

    score
}

#[inline]
pub fn quality_for_score(score: i32) -> QualityLevel {
    if score >= SCORE_HIGH_MIN {
        QualityLevel::High
    } else if score >= SCORE_LOW_MIN {
        QualityLevel::Low
    } else {
        QualityLevel::Minimal
    }
}

/// Level derived from the device alone, ignoring any persisted choice.
pub fn heuristic_quality(
    caps: &DeviceCapabilities,
    battery: Option<&BatterySnapshot>,
) -> QualityLevel {
    if caps.prefers_reduced_motion {
        return QualityLevel::Minimal;
    }
    let score = device_score(caps, battery);
    let level = quality_for_score(score);
    log::debug!("[detect] score={} -> {}", score, level);
    level
}

/// Persisted choice first, then reduced motion, then the device score.
pub fn detect_initial_quality(
    store: &dyn KeyValueStore,
    caps: &DeviceCapabilities,
    battery: Option<&BatterySnapshot>,
) -> QualityLevel {
    if let Some(saved) = load_quality(store) {
        log::debug!("[detect] using persisted quality {}", saved);
        return saved;
    }
    heuristic_quality(caps, battery)
}
