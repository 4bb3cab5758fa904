#![cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

mod animator;
mod battery;
mod constants;
mod controller;
mod dom;
mod probe;
mod raf;
mod storage;
mod visibility;

pub use animator::SectionAnimator;
pub use controller::{QualityController, QualitySubscription, RenderSettingsView};

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(constants::LOG_LEVEL).ok();
    log::info!("folio-web starting");
    Ok(())
}

/// Probes the device, waits for the first battery reading (when the Battery
/// API exists) and builds the controller. Awaited once by the page root.
#[wasm_bindgen(js_name = createQualityController)]
pub async fn create_quality_controller() -> Result<QualityController, JsValue> {
    controller::build()
        .await
        .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
