use folio_core::{DeviceProbe, GpuProbe};
use sysinfo::System;

// Set to any non-empty value other than "0" to emulate prefers-reduced-motion
pub const REDUCED_MOTION_ENV: &str = "FOLIO_REDUCED_MOTION";

/// Device signals from the wgpu adapter, the OS and the window.
pub struct NativeProbe {
    adapter: wgpu::AdapterInfo,
    scale_factor: f64,
}

impl NativeProbe {
    pub fn new(adapter: wgpu::AdapterInfo, scale_factor: f64) -> Self {
        Self {
            adapter,
            scale_factor,
        }
    }
}

impl DeviceProbe for NativeProbe {
    fn user_agent(&self) -> Option<String> {
        // the host OS name, so an Android build classifies as mobile
        Some(format!("folio-native ({})", std::env::consts::OS))
    }

    fn has_touch(&self) -> bool {
        false
    }

    fn gpu(&self) -> GpuProbe {
        match self.adapter.device_type {
            wgpu::DeviceType::Cpu => GpuProbe::Renderer(format!("{} (software)", self.adapter.name)),
            _ if self.adapter.name.is_empty() => GpuProbe::Masked,
            _ => GpuProbe::Renderer(self.adapter.name.clone()),
        }
    }

    fn device_memory_gb(&self) -> Option<f64> {
        let mut system = System::new();
        system.refresh_memory();
        let bytes = system.total_memory();
        (bytes > 0).then(|| bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }

    fn hardware_concurrency(&self) -> Option<u32> {
        std::thread::available_parallelism()
            .ok()
            .map(|n| n.get() as u32)
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        Some(self.scale_factor)
    }

    fn prefers_reduced_motion(&self) -> bool {
        reduced_motion_requested(std::env::var(REDUCED_MOTION_ENV).ok().as_deref())
    }
}

fn reduced_motion_requested(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty() && v != "0")
}
