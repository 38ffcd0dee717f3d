pub mod backend;
pub mod collect;
pub mod deferred;
pub mod handle;
pub mod headless;
pub mod lighting;
pub mod renderer;
pub mod resources;
pub mod shaders;
pub mod shadows;
pub mod vertex;

pub use backend::{
    BlendMode, DepthAttachment, GpuBackend, PixelRect, RenderTarget, RenderTargetDescriptor,
    TargetBinding, TargetShape, TextureFormat, UniformValue,
};
pub use collect::{FrameComponents, View};
pub use deferred::DeferredPipeline;
pub use handle::{Handle, MeshId, ProgramId, TargetId, TextureId};
pub use headless::{GpuCommand, HeadlessBackend};
pub use renderer::{DeferredRenderer, RendererFactory, RendererRegistry, SceneRenderer};
pub use resources::{GpuMaterial, GpuResources};
pub use shaders::BuiltinShader;
pub use vertex::Vertex;
