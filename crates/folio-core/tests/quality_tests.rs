// Integration tests for initial quality detection and the quality context.

use folio_core::constants::QUALITY_STORAGE_KEY;
use folio_core::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Store handle the test keeps a second reference to, so persisted writes can
/// be inspected after the context took ownership.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl SharedStore {
    fn persisted(&self) -> Option<String> {
        self.0.borrow().get(QUALITY_STORAGE_KEY).unwrap()
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.borrow().get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().set(key, value)
    }
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().remove(key)
    }
}

fn strong_desktop() -> DeviceCapabilities {
    DeviceCapabilities {
        is_mobile: false,
        gpu_tier: GpuTier::High,
        gpu_renderer: "NVIDIA GeForce RTX 4070".into(),
        hardware_concurrency: 8,
        device_memory_gb: 16.0,
        native_pixel_ratio: 1.0,
        prefers_reduced_motion: false,
        ..DeviceCapabilities::default()
    }
}

fn weak_phone() -> DeviceCapabilities {
    DeviceCapabilities {
        is_mobile: true,
        is_touch: true,
        gpu_tier: GpuTier::Low,
        gpu_renderer: "Mali-T860".into(),
        hardware_concurrency: 4,
        device_memory_gb: 4.0,
        native_pixel_ratio: 2.0,
        prefers_reduced_motion: false,
    }
}

#[test]
fn strong_desktop_scores_high() {
    let caps = strong_desktop();
    assert_eq!(device_score(&caps, None), 7);
    assert_eq!(
        detect_initial_quality(&MemoryStore::new(), &caps, None),
        QualityLevel::High
    );
}

#[test]
fn weak_phone_scores_minimal() {
    let caps = weak_phone();
    assert_eq!(device_score(&caps, None), -2);
    assert_eq!(
        detect_initial_quality(&MemoryStore::new(), &caps, None),
        QualityLevel::Minimal
    );
}

#[test]
fn persisted_value_wins_over_heuristics() {
    let store = MemoryStore::with_entry(QUALITY_STORAGE_KEY, "high");
    assert_eq!(
        detect_initial_quality(&store, &weak_phone(), None),
        QualityLevel::High
    );
}

#[test]
fn invalid_persisted_value_falls_back_to_detection() {
    let store = MemoryStore::with_entry(QUALITY_STORAGE_KEY, "ultra");
    assert_eq!(
        detect_initial_quality(&store, &strong_desktop(), None),
        QualityLevel::High
    );
}

#[test]
fn reduced_motion_forces_minimal() {
    let caps = DeviceCapabilities {
        prefers_reduced_motion: true,
        ..strong_desktop()
    };
    assert_eq!(
        detect_initial_quality(&MemoryStore::new(), &caps, None),
        QualityLevel::Minimal
    );
}

#[test]
fn high_dpr_and_low_battery_each_cost_a_point() {
    let caps = DeviceCapabilities {
        native_pixel_ratio: 3.0,
        ..strong_desktop()
    };
    assert_eq!(device_score(&caps, None), 6);

    let draining = BatterySnapshot {
        level: Some(0.15),
        charging: Some(false),
        ..BatterySnapshot::default()
    };
    assert_eq!(device_score(&caps, Some(&draining)), 5);

    let plugged = BatterySnapshot {
        charging: Some(true),
        ..draining
    };
    assert_eq!(device_score(&caps, Some(&plugged)), 6);
}

#[test]
fn score_boundaries_map_to_levels() {
    assert_eq!(quality_for_score(5), QualityLevel::High);
    assert_eq!(quality_for_score(4), QualityLevel::Low);
    assert_eq!(quality_for_score(2), QualityLevel::Low);
    assert_eq!(quality_for_score(1), QualityLevel::Minimal);
    assert_eq!(quality_for_score(-4), QualityLevel::Minimal);
}

#[test]
fn every_mutation_is_persisted() {
    let store = SharedStore::default();
    let ctx = QualityContext::new(strong_desktop(), store.clone(), None);
    assert_eq!(ctx.quality(), QualityLevel::High);
    assert_eq!(store.persisted(), None);

    ctx.set_quality(QualityLevel::Low);
    assert_eq!(store.persisted().as_deref(), Some("low"));

    assert_eq!(ctx.degrade(), Some(QualityLevel::Minimal));
    assert_eq!(store.persisted().as_deref(), Some("minimal"));

    assert_eq!(ctx.cycle_quality(), QualityLevel::Low);
    assert_eq!(store.persisted().as_deref(), Some("low"));
}

#[test]
fn cycle_from_minimal_wraps_after_three_calls() {
    let ctx = QualityContext::new(weak_phone(), MemoryStore::new(), None);
    assert!(ctx.is_minimal_quality());
    assert_eq!(ctx.cycle_quality(), QualityLevel::Low);
    assert_eq!(ctx.cycle_quality(), QualityLevel::High);
    assert!(ctx.is_high_quality());
    assert_eq!(ctx.cycle_quality(), QualityLevel::Minimal);
}

#[test]
fn degrade_at_floor_is_a_no_op() {
    let ctx = QualityContext::new(weak_phone(), MemoryStore::new(), None);
    assert_eq!(ctx.degrade(), None);
    assert_eq!(ctx.quality(), QualityLevel::Minimal);
}

#[test]
fn reset_clears_persistence_and_redetects() {
    let store = SharedStore::default();
    store
        .0
        .borrow_mut()
        .set(QUALITY_STORAGE_KEY, "minimal")
        .unwrap();
    let ctx = QualityContext::new(strong_desktop(), store.clone(), None);
    assert_eq!(ctx.quality(), QualityLevel::Minimal);

    assert_eq!(ctx.reset(None), QualityLevel::High);
    assert_eq!(ctx.quality(), QualityLevel::High);
    assert_eq!(store.persisted(), None);

    ctx.set_quality(QualityLevel::Low);
    assert_eq!(store.persisted().as_deref(), Some("low"));
}

#[test]
fn render_settings_follow_the_level() {
    let ctx = QualityContext::new(strong_desktop(), MemoryStore::new(), None);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_l = seen.clone();
    let _sub = ctx.subscribe_render_settings(move |s| seen_l.borrow_mut().push(s.target_fps));

    assert_eq!(ctx.render_settings().target_fps, 60);
    ctx.set_quality(QualityLevel::Low);
    ctx.set_quality(QualityLevel::Minimal);
    assert_eq!(*seen.borrow(), vec![45, 30]);
    assert_eq!(
        ctx.render_settings(),
        render_settings(QualityLevel::Minimal, ctx.capabilities())
    );
}

struct FakeProbe {
    ua: &'static str,
    gpu: GpuProbe,
    memory: Option<f64>,
    threads: Option<u32>,
    dpr: Option<f64>,
}

impl DeviceProbe for FakeProbe {
    fn user_agent(&self) -> Option<String> {
        Some(self.ua.to_string())
    }
    fn has_touch(&self) -> bool {
        false
    }
    fn gpu(&self) -> GpuProbe {
        self.gpu.clone()
    }
    fn device_memory_gb(&self) -> Option<f64> {
        self.memory
    }
    fn hardware_concurrency(&self) -> Option<u32> {
        self.threads
    }
    fn device_pixel_ratio(&self) -> Option<f64> {
        self.dpr
    }
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

#[test]
fn probe_defaults_fill_missing_hints() {
    let caps = detect_capabilities(&FakeProbe {
        ua: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0)",
        gpu: GpuProbe::NoContext,
        memory: None,
        threads: None,
        dpr: Some(4.0),
    });
    assert!(!caps.is_mobile);
    assert_eq!(caps.gpu_renderer, "unknown");
    assert_eq!(caps.gpu_tier, GpuTier::Low);
    assert_eq!(caps.device_memory_gb, 4.0);
    assert_eq!(caps.hardware_concurrency, 4);
    assert_eq!(caps.native_pixel_ratio, 3.0);
}

#[test]
fn probe_classifies_reported_renderer() {
    let caps = detect_capabilities(&FakeProbe {
        ua: "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X)",
        gpu: GpuProbe::Renderer("Apple GPU".into()),
        memory: Some(8.0),
        threads: Some(8),
        dpr: Some(2.0),
    });
    assert!(caps.is_mobile);
    assert_eq!(caps.gpu_tier, GpuTier::High);
    // 3 + 2 + 2 - 3
    assert_eq!(device_score(&caps, None), 4);
}
