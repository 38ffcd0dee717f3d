//! Device-side copies of registry assets, keyed by asset name.

use std::collections::HashMap;

use glam::Vec4;

use super::backend::GpuBackend;
use super::handle::{MeshId, ProgramId, TextureId};
use super::vertex::Vertex;
use crate::asset::{Asset, AssetRegistry};
use crate::errors::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuMaterial {
    pub color: Vec4,
    pub diffuse_map: Option<TextureId>,
}

/// Installed meshes, materials and programs. Entries live as long as the
/// renderer; nothing is evicted.
#[derive(Debug, Default)]
pub struct GpuResources {
    meshes: HashMap<String, MeshId>,
    materials: HashMap<String, GpuMaterial>,
    sprite_materials: HashMap<String, TextureId>,
    programs: HashMap<String, ProgramId>,
    pending: Vec<String>,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers `names` for installation at the start of the next render.
    pub fn queue(&mut self, names: &[String]) {
        for name in names {
            if !self.pending.contains(name) {
                self.pending.push(name.clone());
            }
        }
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn mesh(&self, name: &str) -> Option<MeshId> {
        self.meshes.get(name).copied()
    }

    pub fn material(&self, name: &str) -> Option<GpuMaterial> {
        self.materials.get(name).copied()
    }

    pub fn sprite_material(&self, name: &str) -> Option<TextureId> {
        self.sprite_materials.get(name).copied()
    }

    pub fn program(&self, name: &str) -> Option<ProgramId> {
        self.programs.get(name).copied()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.meshes.contains_key(name)
            || self.materials.contains_key(name)
            || self.sprite_materials.contains_key(name)
            || self.programs.contains_key(name)
    }

    /// Uploads every queued asset. Names that are already installed are
    /// skipped; assets whose data is not decoded yet are dropped from the
    /// queue and picked up again by the next lazy load.
    pub fn install_pending<B: GpuBackend>(
        &mut self,
        backend: &mut B,
        assets: &AssetRegistry,
    ) -> Result<()> {
        for name in std::mem::take(&mut self.pending) {
            if self.is_installed(&name) {
                continue;
            }
            let asset = assets
                .get(&name)
                .ok_or_else(|| EngineError::AssetNotFound(name.clone()))?;
            if !asset.loaded() {
                log::debug!("Asset '{}' is not decoded yet; install deferred", name);
                continue;
            }
            self.install(backend, &name, asset)?;
            log::info!("Installed asset: {}", name);
        }
        Ok(())
    }

    fn install<B: GpuBackend>(&mut self, backend: &mut B, name: &str, asset: &Asset) -> Result<()> {
        match asset {
            Asset::Mesh(mesh) => {
                let Some(data) = mesh.data() else {
                    return Ok(());
                };
                let vertices = Vertex::interleave(data);
                let id = backend.upload_mesh(name, &vertices)?;
                self.meshes.insert(name.to_string(), id);
            }
            Asset::MeshMaterial(material) => {
                let diffuse_map = match material.diffuse_image() {
                    Some(image) => Some(upload_flipped(backend, name, image)?),
                    None => None,
                };
                self.materials.insert(
                    name.to_string(),
                    GpuMaterial {
                        color: material.diffuse_color,
                        diffuse_map,
                    },
                );
            }
            Asset::SpriteMaterial(material) => {
                let Some(image) = material.image() else {
                    return Ok(());
                };
                let texture = upload_flipped(backend, name, image)?;
                self.sprite_materials.insert(name.to_string(), texture);
            }
            Asset::Shader(shader) => {
                let program = backend.compile_shader(name, &shader.source)?;
                self.programs.insert(name.to_string(), program);
            }
        }
        Ok(())
    }
}

/// Images decode top row first; textures expect the bottom row first.
fn upload_flipped<B: GpuBackend>(
    backend: &mut B,
    name: &str,
    image: &image::RgbaImage,
) -> Result<TextureId> {
    let flipped = image::imageops::flip_vertical(image);
    backend.upload_texture(name, flipped.width(), flipped.height(), flipped.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{MeshAsset, MeshMaterialAsset, ShaderAsset, ShaderSource};
    use crate::renderer::headless::{GpuCommand, HeadlessBackend};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn installs_each_asset_once() {
        let mut assets = AssetRegistry::new();
        assets.register("cube", MeshAsset::cube());
        assets.register("red", MeshMaterialAsset::new(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assets.load_assets(&names(&["cube", "red"])).unwrap();

        let mut backend = HeadlessBackend::recording();
        let mut resources = GpuResources::new();
        resources.queue(&names(&["cube", "red", "cube"]));
        resources.install_pending(&mut backend, &assets).unwrap();
        resources.queue(&names(&["cube"]));
        resources.install_pending(&mut backend, &assets).unwrap();

        let uploads = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::UploadMesh { .. }))
            .count();
        assert_eq!(uploads, 1);
        assert!(resources.mesh("cube").is_some());
        assert_eq!(resources.material("red").unwrap().diffuse_map, None);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let assets = AssetRegistry::new();
        let mut resources = GpuResources::new();
        resources.queue(&names(&["ghost"]));
        let err = resources
            .install_pending(&mut HeadlessBackend::recording(), &assets)
            .unwrap_err();
        assert!(matches!(err, EngineError::AssetNotFound(name) if name == "ghost"));
    }

    #[test]
    fn undecoded_mesh_is_not_installed() {
        let mut assets = AssetRegistry::new();
        assets.register("cube", MeshAsset::cube());
        let mut resources = GpuResources::new();
        resources.queue(&names(&["cube"]));
        resources
            .install_pending(&mut HeadlessBackend::recording(), &assets)
            .unwrap();
        assert!(resources.mesh("cube").is_none());
        assert!(resources.pending().is_empty());
    }

    #[test]
    fn shaders_are_compiled_on_install() {
        let mut assets = AssetRegistry::new();
        assets.register(
            "toon",
            ShaderAsset::new(ShaderSource::new("void main() {}", "void main() {}")),
        );
        let mut backend = HeadlessBackend::recording();
        let mut resources = GpuResources::new();
        resources.queue(&names(&["toon"]));
        resources.install_pending(&mut backend, &assets).unwrap();
        assert!(resources.program("toon").is_some());
        assert_eq!(
            backend.commands(),
            &[GpuCommand::CompileShader {
                label: "toon".to_string()
            }]
        );
    }
}
