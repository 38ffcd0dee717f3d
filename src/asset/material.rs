use glam::Vec4;
use image::RgbaImage;

use super::source::AssetSource;
use crate::errors::DecodeError;

/// Surface description for mesh components.
#[derive(Debug, Clone)]
pub struct MeshMaterialAsset {
    pub diffuse_color: Vec4,
    diffuse_map: Option<AssetSource>,
    diffuse_image: Option<RgbaImage>,
}

impl MeshMaterialAsset {
    pub fn new(diffuse_color: Vec4) -> Self {
        Self {
            diffuse_color,
            diffuse_map: None,
            diffuse_image: None,
        }
    }

    pub fn with_diffuse_map(mut self, source: AssetSource) -> Self {
        self.diffuse_map = Some(source);
        self.diffuse_image = None;
        self
    }

    pub fn diffuse_map(&self) -> Option<&AssetSource> {
        self.diffuse_map.as_ref()
    }

    /// A material without a map is always loaded.
    pub fn loaded(&self) -> bool {
        self.diffuse_map.is_none() || self.diffuse_image.is_some()
    }

    pub fn diffuse_image(&self) -> Option<&RgbaImage> {
        self.diffuse_image.as_ref()
    }

    pub(crate) fn install(&mut self, image: RgbaImage) {
        self.diffuse_image = Some(image);
    }
}

/// Texture for sprite components; the texture is mandatory.
#[derive(Debug, Clone)]
pub struct SpriteMaterialAsset {
    texture: AssetSource,
    image: Option<RgbaImage>,
}

impl SpriteMaterialAsset {
    pub fn new(texture: AssetSource) -> Self {
        Self {
            texture,
            image: None,
        }
    }

    pub fn texture(&self) -> &AssetSource {
        &self.texture
    }

    pub fn loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub(crate) fn install(&mut self, image: RgbaImage) {
        self.image = Some(image);
    }
}

/// Decodes any raster format `image` understands into RGBA8.
pub(crate) fn decode_image(source: &AssetSource) -> Result<RgbaImage, DecodeError> {
    let bytes = source.read()?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_fn(2, 3, |x, y| image::Rgba([x as u8 * 100, y as u8 * 50, 7, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn color_only_material_is_loaded() {
        assert!(MeshMaterialAsset::new(Vec4::ONE).loaded());
    }

    #[test]
    fn mapped_material_needs_decode() {
        let mut material =
            MeshMaterialAsset::new(Vec4::ONE).with_diffuse_map(AssetSource::bytes(png_bytes()));
        assert!(!material.loaded());

        let image = decode_image(material.diffuse_map().unwrap()).unwrap();
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.get_pixel(1, 2).0, [100, 100, 7, 255]);

        material.install(image);
        assert!(material.loaded());
    }

    #[test]
    fn garbage_image_fails_to_decode() {
        let err = decode_image(&AssetSource::bytes(vec![1u8, 2, 3])).unwrap_err();
        assert!(matches!(err, DecodeError::Image(_)));
    }

    #[test]
    fn loaded_sprite_is_not_decoded_again() {
        use crate::asset::{Asset, AssetRegistry};

        let mut assets = AssetRegistry::new();
        assets.register("leaf", SpriteMaterialAsset::new(AssetSource::bytes(png_bytes())));
        let names = vec!["leaf".to_string()];
        assets.load_assets(&names).unwrap();

        if let Some(Asset::SpriteMaterial(sprite)) = assets.get_mut("leaf") {
            sprite.texture = AssetSource::bytes(vec![0u8; 4]);
        }
        assets.load_assets(&names).unwrap();
        assert_eq!(assets.sprite_material("leaf").unwrap().image().unwrap().dimensions(), (2, 3));
    }
}
