//! Application-root quality context.
//!
//! One `QualityContext` is built at startup and handed to everything that
//! reads or changes the quality level: UI controls, the FPS sampler and the
//! per-section animation drivers. It owns the immutable capabilities snapshot,
//! the observable level and the persistence backend.

use crate::battery::BatterySnapshot;
use crate::capabilities::DeviceCapabilities;
use crate::detect::{detect_initial_quality, heuristic_quality};
use crate::observable::{Observable, Subscription};
use crate::quality::QualityLevel;
use crate::settings::{render_settings, target_fps, RenderSettings};
use crate::storage::{clear_quality, save_quality, KeyValueStore};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct QualityContext {
    caps: DeviceCapabilities,
    quality: Observable<QualityLevel>,
    store: Rc<RefCell<dyn KeyValueStore>>,
    persist_enabled: Rc<Cell<bool>>,
    _persist: Subscription,
}

impl QualityContext {
    pub fn new(
        caps: DeviceCapabilities,
        store: impl KeyValueStore + 'static,
        battery: Option<&BatterySnapshot>,
    ) -> Self {
        let store: Rc<RefCell<dyn KeyValueStore>> = Rc::new(RefCell::new(store));
        let initial = detect_initial_quality(&*store.borrow(), &caps, battery);
        log::info!(
            "[quality] initial level {} (gpu tier {}, mobile={})",
            initial,
            caps.gpu_tier.as_str(),
            caps.is_mobile
        );

        let quality = Observable::new(initial);
        let persist_enabled = Rc::new(Cell::new(true));
        let persist = {
            let store = Rc::clone(&store);
            let enabled = Rc::clone(&persist_enabled);
            quality.subscribe(move |level: &QualityLevel| {
                if enabled.get() {
                    save_quality(&mut *store.borrow_mut(), *level);
                }
            })
        };

        Self {
            caps,
            quality,
            store,
            persist_enabled,
            _persist: persist,
        }
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    pub fn quality(&self) -> QualityLevel {
        self.quality.get()
    }

    pub fn observable(&self) -> &Observable<QualityLevel> {
        &self.quality
    }

    pub fn set_quality(&self, level: QualityLevel) {
        if self.quality.set(level) {
            log::info!("[quality] set to {}", level);
        }
    }

    /// minimal -> low -> high -> minimal
    pub fn cycle_quality(&self) -> QualityLevel {
        let next = self.quality().cycled();
        self.set_quality(next);
        next
    }

    /// Steps down one level. Returns the new level, or `None` at the floor.
    pub fn degrade(&self) -> Option<QualityLevel> {
        let current = self.quality();
        let next = current.degraded()?;
        self.quality.set(next);
        log::info!("[quality] degraded {} -> {}", current, next);
        Some(next)
    }

    pub fn is_high_quality(&self) -> bool {
        self.quality() == QualityLevel::High
    }

    pub fn is_minimal_quality(&self) -> bool {
        self.quality() == QualityLevel::Minimal
    }

    pub fn render_settings(&self) -> RenderSettings {
        render_settings(self.quality(), &self.caps)
    }

    pub fn target_fps(&self) -> u32 {
        target_fps(self.quality(), self.caps.is_mobile)
    }

    /// Forgets the persisted choice and re-runs the device heuristic.
    /// The re-detected level is not persisted.
    pub fn reset(&self, battery: Option<&BatterySnapshot>) -> QualityLevel {
        clear_quality(&mut *self.store.borrow_mut());
        let level = heuristic_quality(&self.caps, battery);
        self.persist_enabled.set(false);
        self.quality.set(level);
        self.persist_enabled.set(true);
        log::info!("[quality] reset to detected level {}", level);
        level
    }

    pub fn subscribe(&self, listener: impl Fn(&QualityLevel) + 'static) -> Subscription {
        self.quality.subscribe(listener)
    }

    /// Notifies with freshly derived settings after every level change.
    pub fn subscribe_render_settings(
        &self,
        listener: impl Fn(&RenderSettings) + 'static,
    ) -> Subscription {
        let caps = self.caps.clone();
        self.quality
            .subscribe(move |level: &QualityLevel| listener(&render_settings(*level, &caps)))
    }
}
