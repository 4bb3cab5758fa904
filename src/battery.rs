use crate::constants::*;
use crate::dom;
use folio_core::{BatteryMonitor, BatterySnapshot};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn read_snapshot(battery: &JsValue) -> BatterySnapshot {
    BatterySnapshot {
        level: dom::number_property(battery, "level"),
        charging: dom::bool_property(battery, "charging"),
        charging_time_s: dom::number_property(battery, "chargingTime"),
        discharging_time_s: dom::number_property(battery, "dischargingTime"),
    }
}

/// Resolves `navigator.getBattery()` (or the legacy `navigator.battery`).
async fn battery_manager(navigator: &web::Navigator) -> Option<JsValue> {
    let get_battery = js_sys::Reflect::get(navigator, &JsValue::from_str(NAVIGATOR_GET_BATTERY))
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
    if let Some(get_battery) = get_battery {
        let promise = get_battery
            .call0(navigator)
            .ok()?
            .dyn_into::<js_sys::Promise>()
            .ok()?;
        return JsFuture::from(promise).await.ok();
    }
    js_sys::Reflect::get(navigator, &JsValue::from_str(NAVIGATOR_BATTERY))
        .ok()
        .filter(|b| b.is_object())
}

/// Subscribes `monitor` to battery events. Returns the first reading, or
/// `None` when the platform has no battery API. Never fails.
pub async fn subscribe(window: &web::Window, monitor: Rc<BatteryMonitor>) -> Option<BatterySnapshot> {
    let Some(battery) = battery_manager(&window.navigator()).await else {
        log::debug!("[battery] API not available");
        return None;
    };
    let first = read_snapshot(&battery);
    monitor.update(first);

    let Ok(target) = battery.clone().dyn_into::<web::EventTarget>() else {
        return Some(first);
    };
    for event in BATTERY_EVENTS {
        let battery_ev = battery.clone();
        let monitor_ev = Rc::clone(&monitor);
        let closure = Closure::wrap(Box::new(move || {
            monitor_ev.update(read_snapshot(&battery_ev));
        }) as Box<dyn FnMut()>);
        _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }
    Some(first)
}
