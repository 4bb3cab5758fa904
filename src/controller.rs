use crate::animator::SectionAnimator;
use crate::battery;
use crate::dom;
use crate::probe::BrowserProbe;
use crate::raf::{self, SharedLoop};
use crate::storage::LocalStore;
use folio_core::{
    detect_capabilities, BatteryMonitor, FpsCounter, FpsSampler, QualityContext, QualityLevel,
    RenderSettings, Subscription, VisibilityParams,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys as web;

/// Page-wide quality state exposed to UI controls and the 3D layer.
#[wasm_bindgen]
pub struct QualityController {
    window: web::Window,
    ctx: Rc<QualityContext>,
    battery: Rc<BatteryMonitor>,
    sampler: Rc<RefCell<FpsSampler>>,
    sampler_loop: SharedLoop,
    counter: Rc<RefCell<FpsCounter>>,
    counter_loop: SharedLoop,
}

pub async fn build() -> anyhow::Result<QualityController> {
    let window = dom::window()?;
    let caps = detect_capabilities(&BrowserProbe::new(window.clone()));
    let battery = Rc::new(BatteryMonitor::new(caps.is_mobile));
    let first_reading = battery::subscribe(&window, Rc::clone(&battery)).await;
    let ctx = Rc::new(QualityContext::new(
        caps,
        LocalStore::new(&window),
        first_reading.as_ref(),
    ));

    let sampler = Rc::new(RefCell::new(FpsSampler::default()));
    let sampler_loop = raf::shared_loop(window.clone(), VisibilityParams::default());
    let counter = Rc::new(RefCell::new(FpsCounter::new()));
    let counter_loop = raf::shared_loop(window.clone(), VisibilityParams::default());

    Ok(QualityController {
        window,
        ctx,
        battery,
        sampler,
        sampler_loop,
        counter,
        counter_loop,
    })
}

fn parse_level(level: &str) -> Result<QualityLevel, JsValue> {
    level.parse().map_err(|e: folio_core::ParseQualityError| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
impl QualityController {
    pub fn quality(&self) -> String {
        self.ctx.quality().to_string()
    }

    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&self, level: &str) -> Result<(), JsValue> {
        self.ctx.set_quality(parse_level(level)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = cycleQuality)]
    pub fn cycle_quality(&self) -> String {
        self.ctx.cycle_quality().to_string()
    }

    /// Forgets the stored choice and re-detects from the device.
    pub fn reset(&self) -> String {
        self.ctx.reset(self.battery.current().as_ref()).to_string()
    }

    #[wasm_bindgen(js_name = isHighQuality)]
    pub fn is_high_quality(&self) -> bool {
        self.ctx.is_high_quality()
    }

    #[wasm_bindgen(js_name = isMinimalQuality)]
    pub fn is_minimal_quality(&self) -> bool {
        self.ctx.is_minimal_quality()
    }

    #[wasm_bindgen(js_name = renderSettings)]
    pub fn render_settings(&self) -> RenderSettingsView {
        RenderSettingsView(self.ctx.render_settings())
    }

    #[wasm_bindgen(js_name = gpuRenderer)]
    pub fn gpu_renderer(&self) -> String {
        self.ctx.capabilities().gpu_renderer.clone()
    }

    #[wasm_bindgen(js_name = gpuTier)]
    pub fn gpu_tier(&self) -> String {
        self.ctx.capabilities().gpu_tier.as_str().to_string()
    }

    #[wasm_bindgen(js_name = isMobile)]
    pub fn is_mobile(&self) -> bool {
        self.ctx.capabilities().is_mobile
    }

    #[wasm_bindgen(js_name = isTouch)]
    pub fn is_touch(&self) -> bool {
        self.ctx.capabilities().is_touch
    }

    /// Calls `listener(level)` after every quality change until the returned
    /// subscription is freed or unsubscribed.
    #[wasm_bindgen(js_name = onQualityChange)]
    pub fn on_quality_change(&self, listener: js_sys::Function) -> QualitySubscription {
        let sub = self.ctx.subscribe(move |level: &QualityLevel| {
            if let Err(e) = listener.call1(&JsValue::NULL, &JsValue::from_str(level.as_str())) {
                log::warn!("[quality] change listener threw: {:?}", e);
            }
        });
        QualitySubscription(Some(sub))
    }

    #[wasm_bindgen(js_name = startFpsMonitoring)]
    pub fn start_fps_monitoring(&self) {
        if self.sampler.borrow().is_monitoring() {
            return;
        }
        self.sampler.borrow_mut().start_monitoring(instant::now());
        let sampler = Rc::clone(&self.sampler);
        let ctx = Rc::clone(&self.ctx);
        self.sampler_loop.borrow_mut().start(move |tick| {
            // quality listeners may call back into the sampler
            FpsSampler::record_shared(&sampler, tick.now_ms, &ctx);
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = stopFpsMonitoring)]
    pub fn stop_fps_monitoring(&self) {
        self.sampler_loop.borrow_mut().dispose();
        self.sampler.borrow_mut().stop_monitoring();
    }

    #[wasm_bindgen(js_name = averageFps)]
    pub fn average_fps(&self) -> f64 {
        self.sampler.borrow().average_fps()
    }

    /// Starts the once-per-second readout used by the debug overlay.
    #[wasm_bindgen(js_name = startFpsCounter)]
    pub fn start_fps_counter(&self) {
        if self.counter.borrow().is_enabled() {
            return;
        }
        self.counter.borrow_mut().start(instant::now());
        let counter = Rc::clone(&self.counter);
        self.counter_loop.borrow_mut().start(move |tick| {
            counter.borrow_mut().tick(tick.now_ms);
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = stopFpsCounter)]
    pub fn stop_fps_counter(&self) {
        self.counter_loop.borrow_mut().dispose();
        self.counter.borrow_mut().stop();
    }

    pub fn fps(&self) -> u32 {
        self.counter.borrow().fps()
    }

    /// Animation driver for one page section. With an element, the loop stops
    /// while the element is off-screen.
    #[wasm_bindgen(js_name = createSectionAnimator)]
    pub fn create_section_animator(
        &self,
        element: Option<web::Element>,
    ) -> Result<SectionAnimator, JsValue> {
        SectionAnimator::new(self.window.clone(), Rc::clone(&self.ctx), element)
            .map_err(|e| JsValue::from_str(&format!("{:#}", e)))
    }
}

impl Drop for QualityController {
    fn drop(&mut self) {
        self.sampler_loop.borrow_mut().dispose();
        self.counter_loop.borrow_mut().dispose();
    }
}

/// Handle returned by `onQualityChange`.
#[wasm_bindgen]
pub struct QualitySubscription(Option<Subscription>);

#[wasm_bindgen]
impl QualitySubscription {
    pub fn unsubscribe(&mut self) {
        if let Some(sub) = self.0.take() {
            sub.unsubscribe();
        }
    }
}

/// Read-only view of [`RenderSettings`] for JavaScript.
#[wasm_bindgen]
pub struct RenderSettingsView(RenderSettings);

#[wasm_bindgen]
impl RenderSettingsView {
    #[wasm_bindgen(getter, js_name = pixelRatio)]
    pub fn pixel_ratio(&self) -> f64 {
        self.0.pixel_ratio
    }

    #[wasm_bindgen(getter)]
    pub fn antialias(&self) -> bool {
        self.0.antialias
    }

    #[wasm_bindgen(getter, js_name = powerPreference)]
    pub fn power_preference(&self) -> String {
        self.0.power_preference.as_str().to_string()
    }

    #[wasm_bindgen(getter, js_name = particleMultiplier)]
    pub fn particle_multiplier(&self) -> f64 {
        self.0.particle_multiplier
    }

    #[wasm_bindgen(getter, js_name = segmentMultiplier)]
    pub fn segment_multiplier(&self) -> f64 {
        self.0.segment_multiplier
    }

    #[wasm_bindgen(getter, js_name = targetFps)]
    pub fn target_fps(&self) -> u32 {
        self.0.target_fps
    }

    #[wasm_bindgen(getter, js_name = lightCount)]
    pub fn light_count(&self) -> u32 {
        self.0.light_count
    }
}
