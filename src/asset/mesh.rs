use super::obj::{parse_obj, MeshData};
use super::source::AssetSource;
use crate::errors::DecodeError;

const CUBE_OBJ: &str = include_str!("builtin/cube.obj");
const PLANE_OBJ: &str = include_str!("builtin/plane.obj");
const SPRITE_OBJ: &str = include_str!("builtin/sprite.obj");

/// OBJ mesh; decoded into per-corner arrays on load.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    source: AssetSource,
    data: Option<MeshData>,
}

impl MeshAsset {
    pub fn new(source: AssetSource) -> Self {
        Self { source, data: None }
    }

    pub fn from_obj_text(text: &str) -> Self {
        Self::new(AssetSource::bytes(text.as_bytes()))
    }

    /// Unit cube spanning -1..1 on every axis.
    pub fn cube() -> Self {
        Self::from_obj_text(CUBE_OBJ)
    }

    /// 2x2 plane on the XZ plane facing +Y.
    pub fn plane() -> Self {
        Self::from_obj_text(PLANE_OBJ)
    }

    /// 2x2 quad on the XY plane facing +Z.
    pub fn sprite() -> Self {
        Self::from_obj_text(SPRITE_OBJ)
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub fn loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&MeshData> {
        self.data.as_ref()
    }

    pub(crate) fn decode(source: &AssetSource) -> Result<MeshData, DecodeError> {
        let bytes = source.read()?;
        parse_obj(&String::from_utf8_lossy(&bytes))
    }

    pub(crate) fn install(&mut self, data: MeshData) {
        self.data = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn builtin_meshes_decode() {
        let cube = MeshAsset::decode(MeshAsset::cube().source()).unwrap();
        assert_eq!(cube.vertex_count(), 36);

        let plane = MeshAsset::decode(MeshAsset::plane().source()).unwrap();
        assert_eq!(plane.vertex_count(), 6);
        assert!(plane.normals.iter().all(|n| *n == Vec3::Y));

        let sprite = MeshAsset::decode(MeshAsset::sprite().source()).unwrap();
        assert!(sprite.normals.iter().all(|n| *n == Vec3::Z));
    }

    #[test]
    fn cube_corners_stay_within_unit_bounds() {
        let cube = MeshAsset::decode(MeshAsset::cube().source()).unwrap();
        assert!(cube
            .positions
            .iter()
            .all(|p| p.abs().max_element() <= 1.0 + 1e-6));
    }
}
