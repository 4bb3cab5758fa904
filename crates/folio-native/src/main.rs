use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use folio_core::{
    detect_capabilities, AnimationLoop, FpsCounter, FpsSampler, FrameClock, FrameHandle,
    FrameScheduler, QualityContext, QualityLevel, Subscription,
};
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

mod gpu;
mod probe;
mod store;
mod workload;

use gpu::GpuState;
use probe::NativeProbe;
use store::FileStore;
use workload::Workload;

const WINDOW_TITLE: &str = "folio (native)";

#[derive(Parser, Debug)]
#[command(name = "folio-native")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Synthetic CPU cost per frame at full particle budget, in milliseconds
    #[arg(long = "load-ms", value_name = "MS", default_value_t = 8.0)]
    load_ms: f64,

    /// Start at this quality level (minimal, low, high); persisted like a user choice
    #[arg(short = 'q', long = "quality", value_name = "LEVEL")]
    quality: Option<QualityLevel>,

    /// JSON file holding the persisted quality level [default: quality.json in the config directory]
    #[arg(long = "state-file", value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Forget the persisted level and re-detect from the device
    #[arg(long = "reset")]
    reset: bool,
}

/// Frames are delivered on `RedrawRequested`; the scheduler only mints ids.
#[derive(Default)]
struct RedrawScheduler {
    next_id: i32,
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next_id = self.next_id.wrapping_add(1);
        Some(FrameHandle(self.next_id))
    }

    fn cancel_frame(&mut self, _handle: FrameHandle) {}
}

struct Harness {
    ctx: Rc<QualityContext>,
    sampler: Rc<RefCell<FpsSampler>>,
    counter: FpsCounter,
    lp: AnimationLoop<RedrawScheduler>,
    clock: FrameClock,
    _settings_log: Subscription,
}

impl Harness {
    fn new(ctx: Rc<QualityContext>, workload: Workload) -> Self {
        let clock = FrameClock::new();
        let settings_log = ctx.subscribe_render_settings(|s| {
            log::info!(
                "render settings: dpr {:.2}, aa {}, particles x{}, {} fps, {} lights",
                s.pixel_ratio,
                s.antialias,
                s.particle_multiplier,
                s.target_fps,
                s.light_count
            );
        });

        let sampler = Rc::new(RefCell::new(FpsSampler::default()));
        sampler.borrow_mut().start_monitoring(clock.now_ms());
        let mut counter = FpsCounter::new();
        counter.start(clock.now_ms());

        let mut lp = AnimationLoop::new(RedrawScheduler::default());
        {
            let ctx = Rc::clone(&ctx);
            let sampler = Rc::clone(&sampler);
            lp.start(move |tick| {
                workload.run(&ctx.render_settings());
                FpsSampler::record_shared(&sampler, tick.now_ms, &ctx);
                Ok(())
            });
        }

        Self {
            ctx,
            sampler,
            counter,
            lp,
            clock,
            _settings_log: settings_log,
        }
    }

    /// Runs the pending frame, if any. Returns a new FPS reading once a second.
    fn frame(&mut self) -> Option<u32> {
        let handle = self.lp.pending_handle()?;
        let now = self.clock.now_ms();
        match self.lp.run_frame(handle, now) {
            Ok(true) => self.counter.tick(now),
            Ok(false) => None,
            Err(e) => {
                log::error!("frame loop stopped: {:#}", e);
                None
            }
        }
    }

    /// Window occlusion; stops the loop like a section scrolled off-screen.
    fn set_visible(&mut self, visible: bool) {
        if visible == self.lp.is_visible() {
            return;
        }
        if visible {
            // a paused loop restarts sampling on resume
            if !self.lp.is_paused() {
                self.sampler.borrow_mut().start_monitoring(self.clock.now_ms());
            }
        } else {
            self.sampler.borrow_mut().stop_monitoring();
        }
        self.lp.set_visible(visible);
    }

    fn toggle_pause(&mut self) {
        if self.lp.is_paused() {
            self.sampler.borrow_mut().start_monitoring(self.clock.now_ms());
            self.lp.resume();
            log::info!("resumed");
        } else {
            self.lp.pause();
            // paused time must not count as one long frame
            self.sampler.borrow_mut().stop_monitoring();
            log::info!("paused");
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .build(&event_loop)?;

    let mut gpu = pollster::block_on(GpuState::new(&window))?;
    let caps = detect_capabilities(&NativeProbe::new(
        gpu.adapter_info().clone(),
        window.scale_factor(),
    ));
    log::info!(
        "device: {} (tier {}), {:.1} GB, {} threads, dpr {:.2}",
        caps.gpu_renderer,
        caps.gpu_tier.as_str(),
        caps.device_memory_gb,
        caps.hardware_concurrency,
        caps.native_pixel_ratio
    );

    let state_file = match args.state_file {
        Some(path) => path,
        None => FileStore::default_path()?,
    };
    let store = FileStore::new(state_file);
    log::info!("quality state file: {}", store.path().display());
    // no battery source on the desktop harness
    let ctx = Rc::new(QualityContext::new(caps, store, None));
    if args.reset {
        ctx.reset(None);
    }
    if let Some(level) = args.quality {
        ctx.set_quality(level);
    }

    let mut harness = Harness::new(Rc::clone(&ctx), Workload::new(args.load_ms));

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => gpu.resize(size),
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Occluded(occluded) => harness.set_visible(!occluded),
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key,
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => match logical_key.as_ref() {
                    Key::Named(NamedKey::Escape) => elwt.exit(),
                    Key::Character("q") => {
                        harness.ctx.cycle_quality();
                    }
                    Key::Character("r") => {
                        harness.ctx.reset(None);
                    }
                    Key::Character("p") => harness.toggle_pause(),
                    _ => {}
                },
                WindowEvent::RedrawRequested => {
                    if let Some(fps) = harness.frame() {
                        gpu.window.set_title(&format!(
                            "{} - {} - {} fps (avg {:.0})",
                            WINDOW_TITLE,
                            harness.ctx.quality(),
                            fps,
                            harness.sampler.borrow().average_fps()
                        ));
                    }
                    match gpu.render(harness.ctx.quality()) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu.resize(gpu.window.inner_size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                        Err(e) => log::debug!("surface error: {:?}", e),
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if harness.lp.pending_handle().is_some() {
                    gpu.window.request_redraw();
                }
            }
            _ => {}
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{DeviceCapabilities, MemoryStore};

    fn harness() -> Harness {
        let ctx = Rc::new(QualityContext::new(
            DeviceCapabilities::default(),
            MemoryStore::new(),
            None,
        ));
        Harness::new(ctx, Workload::new(0.0))
    }

    #[test]
    fn uncovering_a_paused_window_keeps_sampling_off() {
        let mut h = harness();
        h.toggle_pause();
        h.set_visible(false);
        h.set_visible(true);
        assert!(!h.sampler.borrow().is_monitoring());
        assert_eq!(h.sampler.borrow().sample_count(), 0);

        h.toggle_pause();
        assert!(h.sampler.borrow().is_monitoring());
    }

    #[test]
    fn uncovering_a_running_window_restarts_sampling() {
        let mut h = harness();
        h.set_visible(false);
        assert!(!h.sampler.borrow().is_monitoring());
        h.set_visible(true);
        assert!(h.sampler.borrow().is_monitoring());
    }

    #[test]
    fn state_file_flag_overrides_the_default() {
        let args = Args::parse_from(["folio-native", "--state-file", "here.json"]);
        assert_eq!(args.state_file.as_deref(), Some(std::path::Path::new("here.json")));
        assert!(Args::parse_from(["folio-native"]).state_file.is_none());
    }
}
