//! Battery status snapshot fed by the platform's battery source.

use crate::constants::{CRITICAL_BATTERY_LEVEL, LOW_BATTERY_LEVEL};
use crate::observable::{Observable, Subscription};

/// Latest reading from the battery source. Every field is optional because the
/// platform may expose only part of it (or nothing at all).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatterySnapshot {
    /// Charge in `[0, 1]`.
    pub level: Option<f64>,
    pub charging: Option<bool>,
    /// Seconds until full; may be infinite.
    pub charging_time_s: Option<f64>,
    /// Seconds until empty; may be infinite.
    pub discharging_time_s: Option<f64>,
}

impl BatterySnapshot {
    /// Known to be discharging below 30%.
    pub fn is_low_and_discharging(&self) -> bool {
        matches!(
            (self.level, self.charging),
            (Some(level), Some(false)) if level < LOW_BATTERY_LEVEL
        )
    }

    pub fn is_critical(&self) -> bool {
        matches!(
            (self.level, self.charging),
            (Some(level), Some(false)) if level < CRITICAL_BATTERY_LEVEL
        )
    }
}

/// Holds the most recent battery snapshot.
///
/// The snapshot only biases the initial quality score; runtime degradation is
/// left to the FPS sampler.
pub struct BatteryMonitor {
    snapshot: Observable<BatterySnapshot>,
    _advisory: Subscription,
}

impl BatteryMonitor {
    pub fn new(is_mobile: bool) -> Self {
        let snapshot = Observable::new(BatterySnapshot::default());
        let advisory = snapshot.subscribe(move |s: &BatterySnapshot| {
            if is_mobile && s.is_critical() {
                log::info!(
                    "[battery] level {:.0}% and discharging; leaving degradation to the frame sampler",
                    s.level.unwrap_or(0.0) * 100.0
                );
            }
        });
        Self {
            snapshot,
            _advisory: advisory,
        }
    }

    pub fn update(&self, snapshot: BatterySnapshot) {
        self.snapshot.set(snapshot);
    }

    /// `None` until the battery source has reported at least once.
    pub fn current(&self) -> Option<BatterySnapshot> {
        let s = self.snapshot.get();
        if s == BatterySnapshot::default() {
            None
        } else {
            Some(s)
        }
    }

    pub fn observable(&self) -> &Observable<BatterySnapshot> {
        &self.snapshot
    }
}
