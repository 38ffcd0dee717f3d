use std::collections::HashMap;

use crate::asset::{Asset, AssetRegistry};
use crate::errors::{EngineError, Result};
use crate::input::Input;
use crate::renderer::SceneRenderer;
use crate::scene::Scene;

/// Everything an application shares between its scenes: the asset registry,
/// the registered scenes, the active scene and the input state.
#[derive(Debug, Default)]
pub struct Context {
    assets: AssetRegistry,
    scenes: HashMap<String, Scene>,
    current: Option<String>,
    screen: (u32, u32),
    input: Input,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_asset(&mut self, name: impl Into<String>, asset: impl Into<Asset>) {
        self.assets.register(name, asset);
    }

    /// Registers `scene` under `name`, replacing any scene of that name.
    pub fn register_scene(&mut self, name: impl Into<String>, scene: Scene) {
        let name = name.into();
        if self.scenes.insert(name.clone(), scene).is_some() {
            log::debug!("Replaced scene '{}'", name);
        }
    }

    /// Makes `name` the active scene. Its assets are loaded by the
    /// application loop before its first frame.
    pub fn apply_scene(&mut self, name: &str) -> Result<()> {
        if !self.scenes.contains_key(name) {
            return Err(EngineError::SceneNotFound(name.to_string()));
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.as_ref().and_then(|name| self.scenes.get(name))
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Result<&mut Scene> {
        self.scenes
            .get_mut(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))
    }

    pub(crate) fn scene_and_assets(&mut self, name: &str) -> Result<(&Scene, &mut AssetRegistry)> {
        let scene = self
            .scenes
            .get(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;
        Ok((scene, &mut self.assets))
    }

    pub(crate) fn scene_and_input(&mut self, name: &str) -> Result<(&mut Scene, &mut Input)> {
        let scene = self
            .scenes
            .get_mut(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;
        Ok((scene, &mut self.input))
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        &mut self.input
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    pub fn set_screen_size(&mut self, width: u32, height: u32) {
        self.screen = (width, height);
    }

    /// Loads `names` on the calling thread and tells `renderer` about them.
    /// Nothing is announced when a load fails.
    pub fn load_assets(&mut self, names: &[String], renderer: &mut dyn SceneRenderer) -> Result<()> {
        self.assets.load_assets(names)?;
        renderer.notify_install(names);
        Ok(())
    }

    /// Loads everything scene `name` references, decoding on the worker pool,
    /// and announces the assets to `renderer`.
    pub fn load_scene_assets(&mut self, name: &str, renderer: &mut dyn SceneRenderer) -> Result<()> {
        let scene = self
            .scenes
            .get(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;
        let pending = self.assets.begin_scene_load(scene)?;
        log::debug!(
            "Waiting for {} assets of scene '{}'",
            pending.names().len(),
            name
        );
        let loaded = pending.wait()?;
        let names = self.assets.finish_scene_load(loaded);
        renderer.notify_install(&names);
        Ok(())
    }
}
