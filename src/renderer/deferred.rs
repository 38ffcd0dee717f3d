//! Deferred shading: every camera fills the geometry buffer, seeds the output
//! with ambient light and then adds one full-screen pass per light, each
//! preceded by a shadow map pass when the light casts shadows.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::backend::{
    BlendMode, DepthAttachment, GpuBackend, PixelRect, RenderTarget, RenderTargetDescriptor,
    TargetBinding, TargetShape, TextureFormat, UniformValue,
};
use super::collect::{FrameComponents, View};
use super::handle::{MeshId, ProgramId, TextureId};
use super::resources::GpuResources;
use super::shaders::{BuiltinShader, SHADOW_BIAS, SHININESS};
use super::shadows;
use super::vertex::Vertex;
use crate::asset::{AssetKind, AssetRegistry};
use crate::errors::{EngineError, Result};
use crate::scene::{
    CameraComponent, ClearFlags, LightComponent, LightSource, MeshComponent, SpriteComponent,
    WorldTransform,
};
use crate::settings::ShadowSettings;

const SHADOW_SLOT: u32 = 3;

/// Position, normal and diffuse attachments plus a depth renderbuffer.
#[derive(Debug)]
struct GBuffer {
    target: RenderTarget,
    position: TextureId,
    normal: TextureId,
    diffuse: TextureId,
}

impl GBuffer {
    fn create<B: GpuBackend>(backend: &mut B, width: u32, height: u32) -> Result<Self> {
        let descriptor = RenderTargetDescriptor::new("gbuffer", width, height)
            .with_color(TextureFormat::Rgb32F)
            .with_color(TextureFormat::Rgb32F)
            .with_color(TextureFormat::Rgba8)
            .with_depth(DepthAttachment::Renderbuffer);
        let target = backend.create_render_target(&descriptor)?;
        let (position, normal, diffuse) = match target.color[..] {
            [position, normal, diffuse] => (position, normal, diffuse),
            _ => {
                return Err(EngineError::FramebufferSetup(format!(
                    "gbuffer has {} color attachments, expected 3",
                    target.color.len()
                )))
            }
        };
        Ok(Self {
            target,
            position,
            normal,
            diffuse,
        })
    }
}

#[derive(Debug)]
struct ShadowMap {
    target: RenderTarget,
    /// What the lighting pass samples: the depth texture of a flat map or
    /// the distance color attachment of a cube map.
    texture: TextureId,
    size: u32,
}

impl ShadowMap {
    fn flat<B: GpuBackend>(backend: &mut B, label: &str, size: u32) -> Result<Self> {
        let descriptor =
            RenderTargetDescriptor::new(label, size, size).with_depth(DepthAttachment::Texture);
        let target = backend.create_render_target(&descriptor)?;
        let texture = target.depth.ok_or_else(|| {
            EngineError::FramebufferSetup(format!("'{}' has no depth texture", label))
        })?;
        Ok(Self {
            target,
            texture,
            size,
        })
    }

    fn cube<B: GpuBackend>(backend: &mut B, label: &str, size: u32) -> Result<Self> {
        let descriptor = RenderTargetDescriptor::new(label, size, size)
            .with_shape(TargetShape::Cube)
            .with_color(TextureFormat::R32F)
            .with_depth(DepthAttachment::Renderbuffer);
        let target = backend.create_render_target(&descriptor)?;
        let texture = target.color.first().copied().ok_or_else(|| {
            EngineError::FramebufferSetup(format!("'{}' has no distance attachment", label))
        })?;
        Ok(Self {
            target,
            texture,
            size,
        })
    }

    fn viewport(&self) -> PixelRect {
        PixelRect::full(self.size, self.size)
    }
}

/// Device objects owned by the deferred path for the lifetime of the renderer.
#[derive(Debug)]
pub struct DeferredPipeline {
    screen: (u32, u32),
    gbuffer: GBuffer,
    directional_shadow: ShadowMap,
    point_shadow: ShadowMap,
    spot_shadow: ShadowMap,
    quad: MeshId,
    programs: HashMap<BuiltinShader, ProgramId>,
}

impl DeferredPipeline {
    pub fn new<B: GpuBackend>(
        backend: &mut B,
        width: u32,
        height: u32,
        shadows: &ShadowSettings,
    ) -> Result<Self> {
        let mut programs = HashMap::new();
        for shader in BuiltinShader::ALL {
            let program = backend.compile_shader(shader.label(), &shader.source())?;
            programs.insert(shader, program);
        }

        let quad = backend.upload_mesh("fullscreen_quad", &Vertex::fullscreen_quad())?;
        let gbuffer = GBuffer::create(backend, width, height)?;
        let directional_shadow =
            ShadowMap::flat(backend, "shadow_directional", shadows.directional)?;
        let point_shadow = ShadowMap::cube(backend, "shadow_point", shadows.point)?;
        let spot_shadow = ShadowMap::flat(backend, "shadow_spot", shadows.spot)?;

        log::info!(
            "Deferred pipeline ready: {}x{} gbuffer, shadow maps {}/{}/{}",
            width,
            height,
            shadows.directional,
            shadows.point,
            shadows.spot
        );

        Ok(Self {
            screen: (width, height),
            gbuffer,
            directional_shadow,
            point_shadow,
            spot_shadow,
            quad,
            programs,
        })
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    /// Recreates the geometry buffer for the new output size.
    pub fn resize<B: GpuBackend>(&mut self, backend: &mut B, width: u32, height: u32) -> Result<()> {
        if self.screen == (width, height) {
            return Ok(());
        }
        let gbuffer = GBuffer::create(backend, width, height)?;
        backend.release_render_target(&self.gbuffer.target);
        self.gbuffer = gbuffer;
        self.screen = (width, height);
        log::debug!("Geometry buffer resized to {}x{}", width, height);
        Ok(())
    }

    fn program(&self, shader: BuiltinShader) -> Result<ProgramId> {
        self.programs
            .get(&shader)
            .copied()
            .ok_or_else(|| EngineError::NoAvailableShader(shader.label().to_string()))
    }

    /// Runs every pass for each camera of `frame`, which must already be in
    /// camera order. Stops at the first error.
    pub fn render<B: GpuBackend>(
        &self,
        backend: &mut B,
        resources: &mut GpuResources,
        assets: &mut AssetRegistry,
        frame: &FrameComponents,
    ) -> Result<()> {
        let mut pass = Pass {
            pipeline: self,
            backend,
            resources,
            assets,
        };
        for camera in &frame.cameras {
            log::trace!("Rendering camera '{}'", camera.name);
            let eye = Eye::new(camera, self.screen);
            pass.geometry(&eye, frame)?;
            pass.ambient(camera)?;
            for light in &frame.lights {
                pass.light(&eye, camera, light, frame)?;
            }
            pass.backend.set_blend(BlendMode::Opaque);
        }
        Ok(())
    }
}

/// Camera state shared by the passes of one camera.
struct Eye {
    view: Mat4,
    projection: Mat4,
    position: Vec3,
    right: Vec3,
    up: Vec3,
    back: Vec3,
}

impl Eye {
    fn new(camera: &View<CameraComponent>, (width, height): (u32, u32)) -> Self {
        let t = &camera.transform;
        Self {
            view: Mat4::look_at_rh(t.position, t.position + t.forward, t.up),
            projection: camera.component.projection_matrix(width, height),
            position: t.position,
            right: t.right.normalize_or_zero(),
            up: t.up.normalize_or_zero(),
            back: -t.forward.normalize_or_zero(),
        }
    }

    /// Keeps the object's position and per-axis scale, swaps its rotation
    /// for the camera's so the quad faces the viewer.
    fn billboard(&self, object: &WorldTransform) -> Mat4 {
        let scale = Vec3::new(
            object.model.x_axis.truncate().length(),
            object.model.y_axis.truncate().length(),
            object.model.z_axis.truncate().length(),
        );
        Mat4::from_cols(
            (self.right * scale.x).extend(0.0),
            (self.up * scale.y).extend(0.0),
            (self.back * scale.z).extend(0.0),
            object.position.extend(1.0),
        )
    }
}

enum LightShadow {
    None,
    Projected { matrix: Mat4, map: TextureId },
    Cube { map: TextureId },
}

struct Pass<'a, B> {
    pipeline: &'a DeferredPipeline,
    backend: &'a mut B,
    resources: &'a mut GpuResources,
    assets: &'a mut AssetRegistry,
}

impl<B: GpuBackend> Pass<'_, B> {
    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    fn geometry(&mut self, eye: &Eye, frame: &FrameComponents) -> Result<()> {
        let (width, height) = self.pipeline.screen;
        self.backend.bind_render_target(
            TargetBinding::Offscreen(self.pipeline.gbuffer.target.id),
            PixelRect::full(width, height),
        );
        self.backend.clear(ClearFlags::all(), Vec4::ZERO);
        self.backend.set_blend(BlendMode::Opaque);
        self.backend.set_depth_test(true);

        for mesh in &frame.meshes {
            self.draw_mesh(eye, mesh)?;
        }
        for sprite in &frame.sprites {
            self.draw_sprite(eye, sprite)?;
        }
        Ok(())
    }

    fn draw_mesh(&mut self, eye: &Eye, view: &View<MeshComponent>) -> Result<()> {
        let mesh = &view.component;
        let Some(gpu_mesh) =
            self.resolve(&view.name, &mesh.mesh, AssetKind::Mesh, GpuResources::mesh)?
        else {
            return Ok(());
        };
        if mesh.material.is_empty() {
            return Err(EngineError::MeshNoMaterial(view.name.clone()));
        }
        let Some(material) = self.resolve(
            &view.name,
            &mesh.material,
            AssetKind::MeshMaterial,
            GpuResources::material,
        )?
        else {
            return Ok(());
        };
        let fallback = if material.diffuse_map.is_some() {
            BuiltinShader::GeometryTexture
        } else {
            BuiltinShader::GeometryColor
        };
        let Some(program) = self.select_program(mesh.shader.as_deref(), fallback)? else {
            return Ok(());
        };

        self.backend.use_program(program);
        self.set_geometry_uniforms(eye, view.transform.model, mesh.receive_shadow);
        match material.diffuse_map {
            Some(texture) => self.backend.bind_texture(0, "diffuseMap", texture),
            None => self.backend.set_uniform("color", material.color.into()),
        }
        self.backend.draw(gpu_mesh);
        Ok(())
    }

    fn draw_sprite(&mut self, eye: &Eye, view: &View<SpriteComponent>) -> Result<()> {
        let sprite = &view.component;
        let Some(gpu_mesh) =
            self.resolve(&view.name, &sprite.mesh, AssetKind::Mesh, GpuResources::mesh)?
        else {
            return Ok(());
        };
        if sprite.material.is_empty() {
            return Err(EngineError::MeshNoMaterial(view.name.clone()));
        }
        let Some(texture) = self.resolve(
            &view.name,
            &sprite.material,
            AssetKind::SpriteMaterial,
            GpuResources::sprite_material,
        )?
        else {
            return Ok(());
        };
        let Some(program) =
            self.select_program(sprite.shader.as_deref(), BuiltinShader::GeometryTexture)?
        else {
            return Ok(());
        };

        self.backend.use_program(program);
        self.set_geometry_uniforms(eye, eye.billboard(&view.transform), false);
        self.backend.bind_texture(0, "diffuseMap", texture);
        self.backend.draw(gpu_mesh);
        Ok(())
    }

    fn set_geometry_uniforms(&mut self, eye: &Eye, model: Mat4, receive_shadow: bool) {
        self.backend.set_uniform("model", model.into());
        self.backend.set_uniform("TImodel", normal_matrix(model).into());
        self.backend.set_uniform("view", eye.view.into());
        self.backend.set_uniform("projection", eye.projection.into());
        let receive: f32 = if receive_shadow { 1.0 } else { 0.0 };
        self.backend.set_uniform("recvShadow", receive.into());
    }

    /// Device resource for `name`, or `None` after scheduling a lazy load
    /// when the asset exists but is not installed yet.
    fn resolve<T>(
        &mut self,
        object: &str,
        name: &str,
        kind: AssetKind,
        installed: impl Fn(&GpuResources, &str) -> Option<T>,
    ) -> Result<Option<T>> {
        if let Some(found) = installed(&*self.resources, name) {
            return Ok(Some(found));
        }
        match self.assets.kind(name) {
            Some(registered) if registered == kind => {
                self.lazy_load(name)?;
                Ok(None)
            }
            Some(registered) => Err(EngineError::invalid_component(
                object,
                format!("asset '{}' is a {:?}, expected {:?}", name, registered, kind),
            )),
            None => Err(EngineError::invalid_component(
                object,
                format!("asset '{}' is not registered", name),
            )),
        }
    }

    fn select_program(
        &mut self,
        shader: Option<&str>,
        fallback: BuiltinShader,
    ) -> Result<Option<ProgramId>> {
        let Some(name) = shader else {
            return self.pipeline.program(fallback).map(Some);
        };
        if let Some(program) = self.resources.program(name) {
            return Ok(Some(program));
        }
        match self.assets.kind(name) {
            Some(AssetKind::Shader) => {
                self.lazy_load(name)?;
                Ok(None)
            }
            _ => Err(EngineError::NoAvailableShader(format!(
                "shader '{}' is not registered",
                name
            ))),
        }
    }

    fn lazy_load(&mut self, name: &str) -> Result<()> {
        log::debug!("'{}' is not resident; loading it for the next frame", name);
        let names = [name.to_string()];
        self.assets.load_assets(&names)?;
        self.resources.queue(&names);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ambient
    // ------------------------------------------------------------------

    fn ambient(&mut self, camera: &View<CameraComponent>) -> Result<()> {
        let program = self.pipeline.program(BuiltinShader::Ambient)?;
        let ambient = camera.component.ambient;

        self.bind_output(camera);
        self.backend
            .clear(camera.component.clear, ambient.extend(1.0));
        self.backend.set_blend(BlendMode::Opaque);
        self.backend.set_depth_test(false);
        self.backend.use_program(program);
        self.backend
            .bind_texture(0, "gDiffuse", self.pipeline.gbuffer.diffuse);
        self.backend.set_uniform("ambient", ambient.into());
        self.backend.draw(self.pipeline.quad);
        Ok(())
    }

    fn bind_output(&mut self, camera: &View<CameraComponent>) {
        let (width, height) = self.pipeline.screen;
        let (x, y, w, h) = camera.component.viewport.to_pixels(width, height);
        self.backend.bind_render_target(
            TargetBinding::Screen,
            PixelRect {
                x,
                y,
                width: w,
                height: h,
            },
        );
    }

    // ------------------------------------------------------------------
    // Lights
    // ------------------------------------------------------------------

    fn light(
        &mut self,
        eye: &Eye,
        camera: &View<CameraComponent>,
        view: &View<LightComponent>,
        frame: &FrameComponents,
    ) -> Result<()> {
        let pipeline = self.pipeline;
        let light = &view.component;
        let transform = &view.transform;

        let shadow = if !light.shadow.casts() {
            LightShadow::None
        } else {
            match light.source {
                LightSource::Directional => {
                    let matrix = shadows::directional_light_matrix(transform);
                    self.depth_map(&pipeline.directional_shadow, matrix, frame)?;
                    LightShadow::Projected {
                        matrix,
                        map: pipeline.directional_shadow.texture,
                    }
                }
                LightSource::Spot => {
                    let matrix = shadows::spot_light_matrix(transform, light.angle, light.range);
                    self.depth_map(&pipeline.spot_shadow, matrix, frame)?;
                    LightShadow::Projected {
                        matrix,
                        map: pipeline.spot_shadow.texture,
                    }
                }
                LightSource::Point => {
                    self.distance_cube(transform.position, light.range, frame)?;
                    LightShadow::Cube {
                        map: pipeline.point_shadow.texture,
                    }
                }
            }
        };

        let shadowed = !matches!(shadow, LightShadow::None);
        let program = pipeline.program(match (light.source, shadowed) {
            (LightSource::Directional, false) => BuiltinShader::Directional,
            (LightSource::Directional, true) => BuiltinShader::DirectionalShadow,
            (LightSource::Point, false) => BuiltinShader::Point,
            (LightSource::Point, true) => BuiltinShader::PointShadow,
            (LightSource::Spot, false) => BuiltinShader::Spot,
            (LightSource::Spot, true) => BuiltinShader::SpotShadow,
        })?;

        self.bind_output(camera);
        self.backend.set_blend(BlendMode::Additive);
        self.backend.set_depth_test(false);
        self.backend.use_program(program);

        let gbuffer = &pipeline.gbuffer;
        self.backend.bind_texture(0, "gPosition", gbuffer.position);
        self.backend.bind_texture(1, "gNormal", gbuffer.normal);
        self.backend.bind_texture(2, "gDiffuse", gbuffer.diffuse);

        let uniforms: [(&str, UniformValue); 9] = [
            ("cameraPosition", eye.position.into()),
            ("lightPosition", transform.position.into()),
            ("lightDirection", transform.forward.into()),
            ("lightDiffuse", light.diffuse.into()),
            ("lightSpecular", light.specular.into()),
            ("lightRange", light.range.into()),
            ("lightCutoff", (light.angle / 2.0).cos().into()),
            ("shininess", SHININESS.into()),
            ("shadowBias", SHADOW_BIAS.into()),
        ];
        for (name, value) in uniforms {
            self.backend.set_uniform(name, value);
        }

        match shadow {
            LightShadow::None => {}
            LightShadow::Projected { matrix, map } => {
                self.backend.set_uniform("lightMatrix", matrix.into());
                self.backend.bind_texture(SHADOW_SLOT, "shadowMap", map);
            }
            LightShadow::Cube { map } => {
                self.backend
                    .set_uniform("shadowFar", shadows::shadow_far(light.range).into());
                self.backend.bind_texture(SHADOW_SLOT, "shadowCube", map);
            }
        }

        self.backend.draw(pipeline.quad);
        Ok(())
    }

    fn depth_map(&mut self, map: &ShadowMap, matrix: Mat4, frame: &FrameComponents) -> Result<()> {
        let program = self.pipeline.program(BuiltinShader::ShadowDepth)?;
        self.backend
            .bind_render_target(TargetBinding::Offscreen(map.target.id), map.viewport());
        self.backend.clear(ClearFlags::DEPTH, Vec4::ONE);
        self.backend.set_blend(BlendMode::Opaque);
        self.backend.set_depth_test(true);
        self.backend.use_program(program);
        self.backend.set_uniform("lightMatrix", matrix.into());
        self.draw_casters(frame);
        Ok(())
    }

    fn distance_cube(&mut self, position: Vec3, range: f32, frame: &FrameComponents) -> Result<()> {
        let pipeline = self.pipeline;
        let program = pipeline.program(BuiltinShader::ShadowCube)?;
        let map = &pipeline.point_shadow;
        let matrices = shadows::point_light_matrices(position, range);

        self.backend
            .bind_render_target(TargetBinding::Offscreen(map.target.id), map.viewport());
        self.backend.clear(ClearFlags::all(), Vec4::ONE);
        self.backend.set_blend(BlendMode::Opaque);
        self.backend.set_depth_test(true);
        self.backend.use_program(program);
        self.backend
            .set_uniform("shadowMatrices", UniformValue::Mat4Array(matrices.to_vec()));
        self.backend.set_uniform("lightPosition", position.into());
        self.backend
            .set_uniform("shadowFar", shadows::shadow_far(range).into());
        self.draw_casters(frame);
        Ok(())
    }

    /// Casters that are not resident yet are skipped; the geometry pass
    /// already scheduled their load.
    fn draw_casters(&mut self, frame: &FrameComponents) {
        for view in frame.meshes.iter().filter(|m| m.component.cast_shadow) {
            let Some(mesh) = self.resources.mesh(&view.component.mesh) else {
                continue;
            };
            self.backend
                .set_uniform("model", view.transform.model.into());
            self.backend.draw(mesh);
        }
    }
}

/// Inverse-transpose of the linear part; identity for singular models.
fn normal_matrix(model: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(model);
    if linear.determinant() == 0.0 {
        return Mat3::IDENTITY;
    }
    let normal = linear.inverse().transpose();
    if normal.is_finite() {
        normal
    } else {
        Mat3::IDENTITY
    }
}
