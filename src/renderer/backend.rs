//! Device abstraction the deferred pipeline draws through.

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::handle::{MeshId, ProgramId, TargetId, TextureId};
use super::vertex::Vertex;
use crate::asset::ShaderSource;
use crate::errors::Result;
use crate::scene::ClearFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgb32F,
    Rgba8,
    R32F,
    Depth32F,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Flat,
    /// Six square faces sampled by direction.
    Cube,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachment {
    None,
    /// Depth testing only, never sampled.
    Renderbuffer,
    /// Depth written into a texture that later passes sample.
    Texture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDescriptor {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub shape: TargetShape,
    pub color: Vec<TextureFormat>,
    pub depth: DepthAttachment,
}

impl RenderTargetDescriptor {
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            shape: TargetShape::Flat,
            color: Vec::new(),
            depth: DepthAttachment::None,
        }
    }

    pub fn with_shape(mut self, shape: TargetShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_color(mut self, format: TextureFormat) -> Self {
        self.color.push(format);
        self
    }

    pub fn with_depth(mut self, depth: DepthAttachment) -> Self {
        self.depth = depth;
        self
    }
}

/// A created framebuffer and the textures attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTarget {
    pub id: TargetId,
    pub color: Vec<TextureId>,
    pub depth: Option<TextureId>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetBinding {
    Screen,
    Offscreen(TargetId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Opaque,
    /// `one + one` accumulation.
    Additive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    Mat4Array(Vec<Mat4>),
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Mat3> for UniformValue {
    fn from(value: Mat3) -> Self {
        UniformValue::Mat3(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// Immediate-mode graphics device. All calls happen on the thread that owns
/// the backend; state set by one call persists until changed.
pub trait GpuBackend {
    /// Human readable device/driver description.
    fn version(&self) -> String;

    fn upload_mesh(&mut self, label: &str, vertices: &[Vertex]) -> Result<MeshId>;

    /// `rgba` holds `width * height` tightly packed RGBA8 pixels, first row
    /// at the bottom.
    fn upload_texture(&mut self, label: &str, width: u32, height: u32, rgba: &[u8])
        -> Result<TextureId>;

    fn compile_shader(&mut self, label: &str, source: &ShaderSource) -> Result<ProgramId>;

    /// Fails with `FramebufferSetup` when the device reports the target as
    /// incomplete.
    fn create_render_target(&mut self, descriptor: &RenderTargetDescriptor)
        -> Result<RenderTarget>;

    /// Frees the framebuffer and every texture attached to it.
    fn release_render_target(&mut self, target: &RenderTarget);

    fn bind_render_target(&mut self, target: TargetBinding, viewport: PixelRect);

    fn clear(&mut self, flags: ClearFlags, color: Vec4);

    fn set_blend(&mut self, mode: BlendMode);

    fn set_depth_test(&mut self, enabled: bool);

    fn use_program(&mut self, program: ProgramId);

    /// Sets a uniform of the program in use. Unknown names are ignored.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn bind_texture(&mut self, slot: u32, name: &str, texture: TextureId);

    fn draw(&mut self, mesh: MeshId);
}
