// app.rs
use std::time::{Duration, Instant};

use crate::behavior::{BehaviorContext, FrameRequests};
use crate::context::Context;
use crate::errors::{EngineError, Result};
use crate::input::{CursorMode, Input};
use crate::renderer::{RendererRegistry, SceneRenderer};
use crate::settings::{EngineSettings, WindowMode};

/// Window, clock and event source the application loop runs against.
pub trait Platform {
    /// Applies the window title, mode and swap interval from the settings.
    /// Called once before the renderer is initialized.
    fn configure(&mut self, title: &str, mode: WindowMode, vsync: bool);

    /// Output size in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Seconds since an arbitrary fixed point.
    fn time(&self) -> f64;

    fn should_close(&self) -> bool;

    /// Delivers pending key and mouse events into `input`.
    fn poll_events(&mut self, input: &mut Input);

    fn swap_buffers(&mut self);

    fn set_cursor_mode(&mut self, mode: CursorMode);

    fn request_close(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedEvent {
    Press(String),
    Release(String),
    MouseMove(f64, f64),
}

/// Platform without a window: a fixed number of frames on a simulated clock,
/// with input events replayed from a script.
#[derive(Debug)]
pub struct HeadlessPlatform {
    size: (u32, u32),
    max_frames: u64,
    presented: u64,
    step: f64,
    close_requested: bool,
    cursor_mode: CursorMode,
    script: Vec<(u64, ScriptedEvent)>,
    title: String,
    mode: WindowMode,
    vsync: bool,
}

impl HeadlessPlatform {
    pub fn new(width: u32, height: u32, frames: u64) -> Self {
        Self {
            size: (width, height),
            max_frames: frames,
            presented: 0,
            step: 1.0 / 60.0,
            close_requested: false,
            cursor_mode: CursorMode::Normal,
            script: Vec::new(),
            title: String::new(),
            mode: WindowMode::Windowed,
            vsync: false,
        }
    }

    /// Seconds the simulated clock advances per presented frame.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Delivers `event` during the event poll after frame `frame` (0-based)
    /// was presented.
    pub fn schedule(mut self, frame: u64, event: ScriptedEvent) -> Self {
        self.script.push((frame, event));
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }
}

impl Platform for HeadlessPlatform {
    fn configure(&mut self, title: &str, mode: WindowMode, vsync: bool) {
        log::debug!("Headless window '{}' ({:?}, vsync: {})", title, mode, vsync);
        self.title = title.to_string();
        self.mode = mode;
        self.vsync = vsync;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn time(&self) -> f64 {
        self.presented as f64 * self.step
    }

    fn should_close(&self) -> bool {
        self.close_requested || self.presented >= self.max_frames
    }

    fn poll_events(&mut self, input: &mut Input) {
        let frame = self.presented.saturating_sub(1);
        for (_, event) in self.script.iter().filter(|(at, _)| *at == frame) {
            match event {
                ScriptedEvent::Press(key) => input.press_key(key),
                ScriptedEvent::Release(key) => input.release_key(key),
                ScriptedEvent::MouseMove(x, y) => input.set_mouse_position(*x, *y),
            }
        }
    }

    fn swap_buffers(&mut self) {
        self.presented += 1;
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor_mode = mode;
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }
}

#[derive(Debug)]
struct FrameCounter {
    frames: u32,
    since: Instant,
}

impl FrameCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        if self.since.elapsed() >= Duration::from_secs(1) {
            log::debug!("fps: {}", self.frames);
            self.frames = 0;
            self.since = Instant::now();
        }
    }
}

/// The frame loop: loads the active scene, runs behaviors, updates
/// transforms and renders.
pub struct App {
    settings: EngineSettings,
    context: Context,
    renderer: Box<dyn SceneRenderer>,
    last_scene: Option<String>,
    current_time: f64,
    last_time: f64,
    cursor_mode: CursorMode,
    requests: FrameRequests,
    counter: FrameCounter,
}

impl App {
    /// Creates the renderer named in `settings` from `renderers`.
    pub fn new(settings: EngineSettings, context: Context, renderers: &RendererRegistry) -> Result<Self> {
        let renderer = renderers.create(&settings.renderer, &settings)?;
        Ok(Self {
            settings,
            context,
            renderer,
            last_scene: None,
            current_time: 0.0,
            last_time: 0.0,
            cursor_mode: CursorMode::Normal,
            requests: FrameRequests::default(),
            counter: FrameCounter::new(),
        })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn renderer(&self) -> &dyn SceneRenderer {
        self.renderer.as_ref()
    }

    /// Initializes the renderer for the platform's output and runs frames
    /// until the platform asks to close. Any frame error ends the loop.
    pub fn run<P: Platform>(&mut self, platform: &mut P) -> Result<()> {
        let window = &self.settings.window;
        platform.configure(&window.title, window.mode, self.settings.vsync);

        let (width, height) = platform.framebuffer_size();
        self.context.set_screen_size(width, height);
        self.renderer.init(width, height)?;
        log::info!("Renderer: {}", self.renderer.version());

        self.current_time = platform.time();
        while !platform.should_close() {
            if let Err(err) = self.frame(platform) {
                log::error!("Frame failed: {}", err);
                return Err(err);
            }
        }

        log::info!("Application shutdown complete");
        Ok(())
    }

    /// Runs a single frame. `run` must have initialized the renderer.
    pub fn frame<P: Platform>(&mut self, platform: &mut P) -> Result<()> {
        let frame_start = Instant::now();
        self.last_time = self.current_time;
        self.current_time = platform.time();

        let size = platform.framebuffer_size();
        if size != self.context.screen_size() {
            self.context.set_screen_size(size.0, size.1);
            self.renderer.resize(size.0, size.1)?;
        }

        let scene_name = self
            .context
            .current_scene_name()
            .map(str::to_owned)
            .ok_or_else(|| EngineError::SceneNotFound("<none applied>".to_string()))?;

        if self.last_scene.as_deref() != Some(scene_name.as_str()) {
            log::info!("Loading scene '{}'", scene_name);
            self.context
                .load_scene_assets(&scene_name, self.renderer.as_mut())?;
            self.run_behaviors(&scene_name, true)?;
            self.last_scene = Some(scene_name.clone());
        }

        self.context.scene_mut(&scene_name)?.update_transforms();
        let (scene, assets) = self.context.scene_and_assets(&scene_name)?;
        self.renderer.render(scene, assets)?;

        platform.swap_buffers();
        platform.poll_events(self.context.input_mut());

        self.context.input_mut().frame_start(self.current_time);
        self.run_behaviors(&scene_name, false)?;
        self.context.input_mut().frame_end();

        self.apply_requests(platform);
        self.throttle(frame_start);
        self.counter.tick();
        Ok(())
    }

    fn run_behaviors(&mut self, scene_name: &str, start: bool) -> Result<()> {
        let time = self.current_time;
        let delta_time = self.current_time - self.last_time;
        let requests = &mut self.requests;
        let (scene, input) = self.context.scene_and_input(scene_name)?;

        scene.run_behaviors(|scene, object, behavior| {
            let mut ctx = BehaviorContext {
                scene,
                object,
                input: &mut *input,
                time,
                delta_time,
                requests: &mut *requests,
            };
            if start {
                behavior.start(&mut ctx);
            } else {
                behavior.update(&mut ctx);
            }
        });
        Ok(())
    }

    fn apply_requests<P: Platform>(&mut self, platform: &mut P) {
        let requests = std::mem::take(&mut self.requests);

        let mode = self.context.input().cursor_mode();
        if mode != self.cursor_mode {
            platform.set_cursor_mode(mode);
            self.cursor_mode = mode;
        }

        if requests.exit {
            log::info!("Exit requested");
            platform.request_close();
        }

        if let Some(name) = requests.scene {
            if let Err(err) = self.context.apply_scene(&name) {
                log::warn!("Ignoring scene switch: {}", err);
            }
        }
    }

    fn throttle(&self, frame_start: Instant) {
        if self.settings.frame_limit == 0 {
            return;
        }
        let budget = Duration::from_secs_f64(1.0 / self.settings.frame_limit as f64);
        if let Some(remaining) = budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }
}
