pub mod load;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod shader;
pub mod source;

pub use load::{LoadedAssets, PendingLoad};
pub use material::{MeshMaterialAsset, SpriteMaterialAsset};
pub use mesh::MeshAsset;
pub use obj::MeshData;
pub use shader::{ShaderAsset, ShaderSource};
pub use source::AssetSource;

use std::collections::HashMap;

use crate::errors::{EngineError, Result};
use load::{DecodeJob, Decoded};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Mesh,
    MeshMaterial,
    SpriteMaterial,
    Shader,
}

#[derive(Debug, Clone)]
pub enum Asset {
    Mesh(MeshAsset),
    MeshMaterial(MeshMaterialAsset),
    SpriteMaterial(SpriteMaterialAsset),
    Shader(ShaderAsset),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Mesh(_) => AssetKind::Mesh,
            Asset::MeshMaterial(_) => AssetKind::MeshMaterial,
            Asset::SpriteMaterial(_) => AssetKind::SpriteMaterial,
            Asset::Shader(_) => AssetKind::Shader,
        }
    }

    pub fn loaded(&self) -> bool {
        match self {
            Asset::Mesh(mesh) => mesh.loaded(),
            Asset::MeshMaterial(material) => material.loaded(),
            Asset::SpriteMaterial(material) => material.loaded(),
            Asset::Shader(shader) => shader.loaded(),
        }
    }

    /// Work needed to bring the asset to the loaded state, `None` when
    /// nothing has to be decoded.
    pub(crate) fn decode_job(&self) -> Option<DecodeJob> {
        if self.loaded() {
            return None;
        }
        match self {
            Asset::Mesh(mesh) => Some(DecodeJob::Mesh(mesh.source().clone())),
            Asset::MeshMaterial(material) => material.diffuse_map().cloned().map(DecodeJob::Image),
            Asset::SpriteMaterial(material) => Some(DecodeJob::Image(material.texture().clone())),
            Asset::Shader(_) => None,
        }
    }

    pub(crate) fn install(&mut self, decoded: Decoded) -> bool {
        match (self, decoded) {
            (Asset::Mesh(mesh), Decoded::Mesh(data)) => mesh.install(data),
            (Asset::MeshMaterial(material), Decoded::Image(image)) => material.install(image),
            (Asset::SpriteMaterial(material), Decoded::Image(image)) => material.install(image),
            _ => return false,
        }
        true
    }
}

impl From<MeshAsset> for Asset {
    fn from(value: MeshAsset) -> Self {
        Asset::Mesh(value)
    }
}

impl From<MeshMaterialAsset> for Asset {
    fn from(value: MeshMaterialAsset) -> Self {
        Asset::MeshMaterial(value)
    }
}

impl From<SpriteMaterialAsset> for Asset {
    fn from(value: SpriteMaterialAsset) -> Self {
        Asset::SpriteMaterial(value)
    }
}

impl From<ShaderAsset> for Asset {
    fn from(value: ShaderAsset) -> Self {
        Asset::Shader(value)
    }
}

/// Named assets shared by every scene of a context.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, Asset>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `asset` under `name`, replacing any previous asset.
    pub fn register(&mut self, name: impl Into<String>, asset: impl Into<Asset>) {
        let name = name.into();
        if self.assets.insert(name.clone(), asset.into()).is_some() {
            log::debug!("Replaced asset '{}'", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Asset> {
        self.assets.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<AssetKind> {
        self.assets.get(name).map(Asset::kind)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.assets.get(name).map(Asset::loaded).unwrap_or(false)
    }

    pub fn mesh(&self, name: &str) -> Option<&MeshAsset> {
        match self.assets.get(name) {
            Some(Asset::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_material(&self, name: &str) -> Option<&MeshMaterialAsset> {
        match self.assets.get(name) {
            Some(Asset::MeshMaterial(material)) => Some(material),
            _ => None,
        }
    }

    pub fn sprite_material(&self, name: &str) -> Option<&SpriteMaterialAsset> {
        match self.assets.get(name) {
            Some(Asset::SpriteMaterial(material)) => Some(material),
            _ => None,
        }
    }

    pub fn shader(&self, name: &str) -> Option<&ShaderAsset> {
        match self.assets.get(name) {
            Some(Asset::Shader(shader)) => Some(shader),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Loads every named asset that is not loaded yet, in order, stopping at
    /// the first failure. Already loaded assets are never decoded again.
    pub fn load_assets(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            let asset = self
                .assets
                .get_mut(name)
                .ok_or_else(|| EngineError::AssetNotFound(name.clone()))?;
            let Some(job) = asset.decode_job() else {
                continue;
            };
            let decoded = job.run()?;
            asset.install(decoded);
            log::info!("Loaded asset: {}", name);
        }
        Ok(())
    }
}
