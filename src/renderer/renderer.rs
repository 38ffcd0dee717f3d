// renderer/renderer.rs
use std::collections::HashMap;

use crate::asset::AssetRegistry;
use crate::errors::{EngineError, Result};
use crate::renderer::collect::FrameComponents;
use crate::renderer::deferred::DeferredPipeline;
use crate::renderer::headless::HeadlessBackend;
use crate::renderer::resources::GpuResources;
use crate::renderer::GpuBackend;
use crate::scene::Scene;
use crate::settings::{EngineSettings, ShadowSettings};

/// Draws a scene into the output the platform presents.
pub trait SceneRenderer {
    /// Creates the device objects for an output of `width` x `height`.
    fn init(&mut self, width: u32, height: u32) -> Result<()>;

    fn version(&self) -> String;

    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Announces loaded assets; they are uploaded on the next `render`.
    fn notify_install(&mut self, names: &[String]);

    /// Renders every enabled camera of `scene`. Assets referenced but not
    /// resident are loaded through `assets` and show up a frame later.
    fn render(&mut self, scene: &Scene, assets: &mut AssetRegistry) -> Result<()>;
}

pub struct DeferredRenderer<B: GpuBackend> {
    backend: B,
    shadows: ShadowSettings,
    resources: GpuResources,
    pipeline: Option<DeferredPipeline>,
}

impl<B: GpuBackend> DeferredRenderer<B> {
    pub fn new(backend: B, shadows: ShadowSettings) -> Self {
        Self {
            backend,
            shadows,
            resources: GpuResources::new(),
            pipeline: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }
}

impl<B: GpuBackend> SceneRenderer for DeferredRenderer<B> {
    fn init(&mut self, width: u32, height: u32) -> Result<()> {
        log::info!("Initializing deferred renderer on {}", self.backend.version());
        let pipeline = DeferredPipeline::new(&mut self.backend, width, height, &self.shadows)?;
        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn version(&self) -> String {
        format!("deferred ({})", self.backend.version())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.resize(&mut self.backend, width, height),
            None => self.init(width, height),
        }
    }

    fn notify_install(&mut self, names: &[String]) {
        log::debug!("{} assets queued for install", names.len());
        self.resources.queue(names);
    }

    fn render(&mut self, scene: &Scene, assets: &mut AssetRegistry) -> Result<()> {
        let pipeline = self.pipeline.as_ref().ok_or_else(|| {
            EngineError::FramebufferSetup("renderer used before init".to_string())
        })?;

        self.resources.install_pending(&mut self.backend, assets)?;

        let frame = FrameComponents::collect(scene);
        log::trace!(
            "Frame: {} cameras, {} lights, {} meshes, {} sprites",
            frame.cameras.len(),
            frame.lights.len(),
            frame.meshes.len(),
            frame.sprites.len()
        );
        pipeline.render(&mut self.backend, &mut self.resources, assets, &frame)
    }
}

pub type RendererFactory = Box<dyn Fn(&EngineSettings) -> Box<dyn SceneRenderer>>;

/// Renderers selectable by name from the engine settings.
#[derive(Default)]
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the headless deferred renderer under "deferred".
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("deferred", |settings: &EngineSettings| {
            Box::new(DeferredRenderer::new(
                HeadlessBackend::new(),
                settings.shadows,
            )) as Box<dyn SceneRenderer>
        });
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&EngineSettings) -> Box<dyn SceneRenderer> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str, settings: &EngineSettings) -> Result<Box<dyn SceneRenderer>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::RendererNotFound(name.to_string()))?;
        Ok(factory(settings))
    }
}
