//! Scene asset resolution and the off-thread decode of a scene's assets.

use std::collections::HashSet;
use std::sync::mpsc::{sync_channel, Receiver};

use image::RgbaImage;

use super::material::decode_image;
use super::mesh::MeshAsset;
use super::obj::MeshData;
use super::source::AssetSource;
use super::{AssetKind, AssetRegistry};
use crate::errors::{DecodeError, EngineError, Result};
use crate::scene::{MeshComponent, Scene, SpriteComponent};

pub(crate) enum DecodeJob {
    Mesh(AssetSource),
    Image(AssetSource),
}

impl DecodeJob {
    pub(crate) fn run(self) -> std::result::Result<Decoded, DecodeError> {
        match self {
            DecodeJob::Mesh(source) => MeshAsset::decode(&source).map(Decoded::Mesh),
            DecodeJob::Image(source) => decode_image(&source).map(Decoded::Image),
        }
    }
}

pub(crate) enum Decoded {
    Mesh(MeshData),
    Image(RgbaImage),
}

type DecodeResult = Result<Vec<(String, Decoded)>>;

/// Decode work running on the thread pool for one scene.
pub struct PendingLoad {
    names: Vec<String>,
    receiver: Receiver<DecodeResult>,
}

impl PendingLoad {
    /// Every asset name the scene references, in scan order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Blocks until the worker reports back.
    pub fn wait(self) -> Result<LoadedAssets> {
        let decoded = self
            .receiver
            .recv()
            .map_err(|_| EngineError::LoaderDisconnected)??;
        Ok(LoadedAssets {
            names: self.names,
            decoded,
        })
    }
}

/// Decoded data waiting to be installed into the registry.
pub struct LoadedAssets {
    names: Vec<String>,
    decoded: Vec<(String, Decoded)>,
}

impl LoadedAssets {
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl AssetRegistry {
    /// Names of every asset the enabled mesh and sprite components of
    /// `scene` need. A component naming an unknown or non-mesh asset as its
    /// mesh is invalid; unknown material and shader names are skipped.
    pub fn scene_asset_names(&self, scene: &Scene) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for (object_name, id) in scene.objects() {
            if !scene.is_enabled(id) {
                continue;
            }
            if let Some(mesh) = scene.component::<MeshComponent>(id) {
                self.collect_renderable(
                    object_name,
                    &mesh.mesh,
                    &mesh.material,
                    mesh.shader.as_deref(),
                    &mut names,
                )?;
            }
            if let Some(sprite) = scene.component::<SpriteComponent>(id) {
                self.collect_renderable(
                    object_name,
                    &sprite.mesh,
                    &sprite.material,
                    sprite.shader.as_deref(),
                    &mut names,
                )?;
            }
        }
        Ok(names)
    }

    fn collect_renderable(
        &self,
        object: &str,
        mesh: &str,
        material: &str,
        shader: Option<&str>,
        names: &mut Vec<String>,
    ) -> Result<()> {
        match self.kind(mesh) {
            Some(AssetKind::Mesh) => names.push(mesh.to_string()),
            Some(other) => {
                return Err(EngineError::invalid_component(
                    object,
                    format!("asset '{}' is a {:?}, not a mesh", mesh, other),
                ))
            }
            None => {
                return Err(EngineError::invalid_component(
                    object,
                    format!("mesh '{}' is not registered", mesh),
                ))
            }
        }
        if self.contains(material) {
            names.push(material.to_string());
        }
        if let Some(shader) = shader.filter(|s| self.contains(s)) {
            names.push(shader.to_string());
        }
        Ok(())
    }

    /// Scans `scene` on the calling thread and decodes whatever is not
    /// loaded yet on the rayon pool.
    pub fn begin_scene_load(&self, scene: &Scene) -> Result<PendingLoad> {
        let names = self.scene_asset_names(scene)?;

        let mut seen = HashSet::new();
        let jobs: Vec<(String, DecodeJob)> = names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter_map(|name| {
                let job = self.get(name)?.decode_job()?;
                Some((name.clone(), job))
            })
            .collect();

        log::debug!(
            "Scene references {} assets, {} need decoding",
            names.len(),
            jobs.len()
        );

        let (sender, receiver) = sync_channel(1);
        rayon::spawn(move || {
            let mut decoded = Vec::with_capacity(jobs.len());
            let mut result = Ok(());
            for (name, job) in jobs {
                match job.run() {
                    Ok(data) => decoded.push((name, data)),
                    Err(err) => {
                        log::error!("Failed to decode asset '{}': {}", name, err);
                        result = Err(EngineError::from(err));
                        break;
                    }
                }
            }
            let _ = sender.send(result.map(|_| decoded));
        });

        Ok(PendingLoad { names, receiver })
    }

    /// Installs decoded data on the calling thread and returns the names the
    /// renderer has to be notified about.
    pub fn finish_scene_load(&mut self, loaded: LoadedAssets) -> Vec<String> {
        for (name, decoded) in loaded.decoded {
            match self.assets.get_mut(&name) {
                Some(asset) if !asset.loaded() => {
                    if asset.install(decoded) {
                        log::info!("Loaded asset: {}", name);
                    } else {
                        log::warn!("Asset '{}' changed kind while loading; skipped", name);
                    }
                }
                Some(_) => {}
                None => log::warn!("Asset '{}' was removed while loading", name),
            }
        }
        loaded.names
    }

    /// Scans and loads `scene` synchronously.
    pub fn load_scene(&mut self, scene: &Scene) -> Result<Vec<String>> {
        let names = self.scene_asset_names(scene)?;
        self.load_assets(&names)?;
        Ok(names)
    }
}
