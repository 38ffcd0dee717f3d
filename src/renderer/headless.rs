//! Backend that tracks resources instead of talking to a device. Used by
//! the demo binary, and in recording mode by tests that inspect what a frame
//! would draw.

use glam::Vec4;

use super::backend::{
    BlendMode, GpuBackend, PixelRect, RenderTarget, RenderTargetDescriptor, TargetBinding,
    TargetShape, UniformValue,
};
use super::handle::{Handle, MeshId, ProgramId, TextureId};
use super::vertex::Vertex;
use crate::asset::ShaderSource;
use crate::errors::{EngineError, Result};
use crate::scene::ClearFlags;

/// One recorded backend call. Resources are referred to by their labels.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    UploadMesh { label: String, vertices: usize },
    UploadTexture { label: String, width: u32, height: u32 },
    CompileShader { label: String },
    CreateTarget { label: String, width: u32, height: u32 },
    ReleaseTarget { label: String },
    /// `None` is the default framebuffer.
    BindTarget { target: Option<String>, viewport: PixelRect },
    Clear { flags: ClearFlags, color: Vec4 },
    SetBlend(BlendMode),
    SetDepthTest(bool),
    UseProgram(String),
    SetUniform { name: String, value: UniformValue },
    BindTexture { slot: u32, name: String, texture: String },
    Draw { mesh: String },
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    meshes: Vec<String>,
    textures: Vec<String>,
    programs: Vec<String>,
    targets: Vec<String>,
    max_target_size: Option<u32>,
    uploaded_bytes: usize,
    recording: bool,
    commands: Vec<GpuCommand>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that keeps every call as a `GpuCommand` until
    /// `take_commands` drains them.
    pub fn recording() -> Self {
        Self {
            recording: true,
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Render targets larger than `size` in either dimension are reported
    /// as incomplete.
    pub fn with_max_target_size(mut self, size: u32) -> Self {
        self.max_target_size = Some(size);
        self
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Bytes of vertex and texel data uploaded so far.
    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }

    fn label<T>(labels: &[String], handle: Handle<T>) -> String {
        labels
            .get(handle.id() as usize)
            .cloned()
            .unwrap_or_else(|| format!("#{}", handle.id()))
    }

    fn push_command(&mut self, command: GpuCommand) {
        if self.recording {
            self.commands.push(command);
        }
    }

    fn push_texture(&mut self, label: String) -> TextureId {
        self.textures.push(label);
        Handle::new(self.textures.len() as u32 - 1)
    }
}

impl GpuBackend for HeadlessBackend {
    fn version(&self) -> String {
        "headless".to_string()
    }

    fn upload_mesh(&mut self, label: &str, vertices: &[Vertex]) -> Result<MeshId> {
        self.uploaded_bytes += bytemuck::cast_slice::<Vertex, u8>(vertices).len();
        self.push_command(GpuCommand::UploadMesh {
            label: label.to_string(),
            vertices: vertices.len(),
        });
        self.meshes.push(label.to_string());
        Ok(Handle::new(self.meshes.len() as u32 - 1))
    }

    fn upload_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureId> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            log::warn!(
                "Texture '{}' has {} bytes, expected {} for {}x{}",
                label,
                rgba.len(),
                expected,
                width,
                height
            );
        }
        self.uploaded_bytes += rgba.len();
        self.push_command(GpuCommand::UploadTexture {
            label: label.to_string(),
            width,
            height,
        });
        Ok(self.push_texture(label.to_string()))
    }

    fn compile_shader(&mut self, label: &str, source: &ShaderSource) -> Result<ProgramId> {
        if source.vertex.trim().is_empty() || source.fragment.trim().is_empty() {
            return Err(EngineError::NoAvailableShader(format!(
                "'{}' is missing a vertex or fragment stage",
                label
            )));
        }
        self.push_command(GpuCommand::CompileShader {
            label: label.to_string(),
        });
        self.programs.push(label.to_string());
        Ok(Handle::new(self.programs.len() as u32 - 1))
    }

    fn create_render_target(
        &mut self,
        descriptor: &RenderTargetDescriptor,
    ) -> Result<RenderTarget> {
        let RenderTargetDescriptor {
            label,
            width,
            height,
            shape,
            ..
        } = descriptor;

        if *width == 0 || *height == 0 {
            return Err(EngineError::FramebufferSetup(format!(
                "'{}' has a zero sized attachment",
                label
            )));
        }
        if *shape == TargetShape::Cube && width != height {
            return Err(EngineError::FramebufferSetup(format!(
                "cube target '{}' is not square ({}x{})",
                label, width, height
            )));
        }
        if let Some(limit) = self.max_target_size {
            if *width > limit || *height > limit {
                return Err(EngineError::FramebufferSetup(format!(
                    "'{}' is {}x{}, device limit is {}",
                    label, width, height, limit
                )));
            }
        }

        let color = (0..descriptor.color.len())
            .map(|i| self.push_texture(format!("{}.color{}", label, i)))
            .collect();
        let depth = match descriptor.depth {
            super::backend::DepthAttachment::Texture => {
                Some(self.push_texture(format!("{}.depth", label)))
            }
            _ => None,
        };

        self.push_command(GpuCommand::CreateTarget {
            label: label.clone(),
            width: *width,
            height: *height,
        });
        self.targets.push(label.clone());

        Ok(RenderTarget {
            id: Handle::new(self.targets.len() as u32 - 1),
            color,
            depth,
            width: *width,
            height: *height,
        })
    }

    fn release_render_target(&mut self, target: &RenderTarget) {
        let label = Self::label(&self.targets, target.id);
        self.push_command(GpuCommand::ReleaseTarget { label });
    }

    fn bind_render_target(&mut self, target: TargetBinding, viewport: PixelRect) {
        let target = match target {
            TargetBinding::Screen => None,
            TargetBinding::Offscreen(id) => Some(Self::label(&self.targets, id)),
        };
        self.push_command(GpuCommand::BindTarget { target, viewport });
    }

    fn clear(&mut self, flags: ClearFlags, color: Vec4) {
        self.push_command(GpuCommand::Clear { flags, color });
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.push_command(GpuCommand::SetBlend(mode));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.push_command(GpuCommand::SetDepthTest(enabled));
    }

    fn use_program(&mut self, program: ProgramId) {
        let label = Self::label(&self.programs, program);
        self.push_command(GpuCommand::UseProgram(label));
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.push_command(GpuCommand::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn bind_texture(&mut self, slot: u32, name: &str, texture: TextureId) {
        let texture = Self::label(&self.textures, texture);
        self.push_command(GpuCommand::BindTexture {
            slot,
            name: name.to_string(),
            texture,
        });
    }

    fn draw(&mut self, mesh: MeshId) {
        let mesh = Self::label(&self.meshes, mesh);
        self.push_command(GpuCommand::Draw { mesh });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::{DepthAttachment, TextureFormat};

    #[test]
    fn records_labels_for_handles() {
        let mut backend = HeadlessBackend::recording();
        let mesh = backend
            .upload_mesh("quad", &Vertex::fullscreen_quad())
            .unwrap();
        backend.draw(mesh);

        assert_eq!(backend.uploaded_bytes(), 6 * Vertex::STRIDE);
        assert_eq!(
            backend.commands().last(),
            Some(&GpuCommand::Draw {
                mesh: "quad".to_string()
            })
        );
    }

    #[test]
    fn oversized_target_fails_setup() {
        let mut backend = HeadlessBackend::recording().with_max_target_size(1024);
        let descriptor = RenderTargetDescriptor::new("shadow", 2048, 2048)
            .with_depth(DepthAttachment::Texture);
        let err = backend.create_render_target(&descriptor).unwrap_err();
        assert!(matches!(err, EngineError::FramebufferSetup(_)));
    }

    #[test]
    fn target_textures_are_labelled_by_attachment() {
        let mut backend = HeadlessBackend::recording();
        let descriptor = RenderTargetDescriptor::new("gbuffer", 4, 4)
            .with_color(TextureFormat::Rgb32F)
            .with_color(TextureFormat::Rgba8)
            .with_depth(DepthAttachment::Renderbuffer);
        let target = backend.create_render_target(&descriptor).unwrap();
        assert_eq!(target.color.len(), 2);
        assert!(target.depth.is_none());

        backend.bind_texture(0, "gDiffuse", target.color[1]);
        assert_eq!(
            backend.commands().last(),
            Some(&GpuCommand::BindTexture {
                slot: 0,
                name: "gDiffuse".to_string(),
                texture: "gbuffer.color1".to_string(),
            })
        );
    }

    #[test]
    fn default_backend_keeps_no_command_log() {
        let mut backend = HeadlessBackend::new();
        let mesh = backend
            .upload_mesh("quad", &Vertex::fullscreen_quad())
            .unwrap();
        for _ in 0..100 {
            backend.draw(mesh);
        }

        assert!(!backend.is_recording());
        assert!(backend.commands().is_empty());
        assert_eq!(backend.uploaded_bytes(), 6 * Vertex::STRIDE);
    }
}
