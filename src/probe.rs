use crate::constants::*;
use crate::dom;
use folio_core::{DeviceProbe, GpuProbe};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Navigator, media-query and WebGL signals for the capability snapshot.
pub struct BrowserProbe {
    window: web::Window,
}

impl BrowserProbe {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }
}

impl DeviceProbe for BrowserProbe {
    fn user_agent(&self) -> Option<String> {
        self.window.navigator().user_agent().ok()
    }

    fn has_touch(&self) -> bool {
        dom::has_property(&self.window, WINDOW_TOUCH_START)
            || self.window.navigator().max_touch_points() > 0
    }

    fn gpu(&self) -> GpuProbe {
        probe_webgl_renderer()
    }

    fn device_memory_gb(&self) -> Option<f64> {
        dom::number_property(&self.window.navigator(), NAVIGATOR_DEVICE_MEMORY)
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        let n = self.window.navigator().hardware_concurrency();
        (n >= 1.0).then_some(n as u32)
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        Some(self.window.device_pixel_ratio())
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .map(|mq| mq.matches())
            .unwrap_or(false)
    }
}

/// Reads the unmasked renderer through a throwaway WebGL context.
fn probe_webgl_renderer() -> GpuProbe {
    let Some(document) = dom::window_document() else {
        return GpuProbe::NoContext;
    };
    let canvas = match document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
    {
        Some(c) => c,
        None => return GpuProbe::NoContext,
    };
    let gl = WEBGL_CONTEXT_IDS.iter().find_map(|id| {
        canvas
            .get_context(id)
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<web::WebGlRenderingContext>().ok())
    });
    let Some(gl) = gl else {
        log::debug!("[probe] no WebGL context");
        return GpuProbe::NoContext;
    };

    let probe = match gl.get_extension(DEBUG_RENDERER_EXTENSION) {
        Ok(Some(_)) => gl
            .get_parameter(UNMASKED_RENDERER_WEBGL)
            .ok()
            .and_then(|v| v.as_string())
            .map(GpuProbe::Renderer)
            .unwrap_or(GpuProbe::Masked),
        _ => GpuProbe::Masked,
    };
    release_context(&gl);
    probe
}

fn release_context(gl: &web::WebGlRenderingContext) {
    if let Ok(Some(ext)) = gl.get_extension(LOSE_CONTEXT_EXTENSION) {
        let lose = js_sys::Reflect::get(&ext, &JsValue::from_str("loseContext"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        if let Some(lose) = lose {
            _ = lose.call0(&ext);
        }
    }
}
