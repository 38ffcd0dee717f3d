use std::f32::consts::FRAC_PI_2;
use std::io::Cursor;

use glam::{Vec3, Vec4};
use image::{ImageFormat, Rgba, RgbaImage};
use log::info;

use deferred_engine::asset::{AssetSource, MeshAsset, MeshMaterialAsset, SpriteMaterialAsset};
use deferred_engine::scene::{
    CameraComponent, LightComponent, MeshComponent, Object, Scene, ShadowType, SpriteComponent,
    Viewport,
};
use deferred_engine::{AxisMeta, Behavior, BehaviorContext, Context, CursorMode, MouseAxis, Result};

#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum DemoScene {
    /// Rotating cube pair over a floor, lit by a shadowed spot light.
    Cube,
    /// Billboarded sprites around a point light.
    Sprites,
}

impl DemoScene {
    pub fn name(self) -> &'static str {
        match self {
            DemoScene::Cube => "cube",
            DemoScene::Sprites => "sprites",
        }
    }

    /// Registers the shared assets and both demo scenes, then applies `self`.
    /// `texture` optionally names an image file used as the cube texture.
    pub fn build(self, context: &mut Context, texture: Option<&str>) -> Result<()> {
        register_assets(context, texture);
        bind_axes(context);

        context.register_scene(DemoScene::Cube.name(), cube_scene()?);
        context.register_scene(DemoScene::Sprites.name(), sprite_scene()?);
        context.apply_scene(self.name())?;

        info!("Demo scene '{}' ready", self.name());
        Ok(())
    }
}

fn register_assets(context: &mut Context, texture: Option<&str>) {
    context.register_asset("cubeMesh", MeshAsset::cube());
    context.register_asset("floorMesh", MeshAsset::plane());
    context.register_asset("spriteMesh", MeshAsset::sprite());

    let cube_texture = match texture {
        Some(path) => AssetSource::path(path),
        None => AssetSource::bytes(checkerboard(64, 8)),
    };
    context.register_asset(
        "cubeMaterial",
        MeshMaterialAsset::new(Vec4::ONE).with_diffuse_map(cube_texture),
    );
    context.register_asset(
        "floorMaterial",
        MeshMaterialAsset::new(Vec4::new(0.7, 0.7, 0.7, 1.0)),
    );
    context.register_asset(
        "spriteMaterial",
        SpriteMaterialAsset::new(AssetSource::bytes(checkerboard(32, 4))),
    );
}

fn bind_axes(context: &mut Context) {
    let input = context.input_mut();
    input.bind_axis("angle", AxisMeta::keys("up", "down", 3.0, 3.0));
    input.bind_axis("intensity", AxisMeta::keys("right", "left", 3.0, 3.0));
    input.bind_axis("mouse x", AxisMeta::mouse(MouseAxis::X, 0.1));
    input.bind_axis("mouse y", AxisMeta::mouse(MouseAxis::Y, 0.1));
}

/// PNG-encoded black and white checkerboard.
fn checkerboard(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells).max(1);
    let image = RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([40, 40, 40, 255])
        }
    });

    let mut bytes = Vec::new();
    if let Err(err) = image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        log::warn!("Failed to encode checkerboard: {}", err);
    }
    bytes
}

fn cube_scene() -> Result<Scene> {
    let mut scene = Scene::new();

    scene.register_object(
        "mainCamera",
        Object::new()
            .translate(Vec3::new(0.0, 0.0, 10.0))
            .with_component(
                CameraComponent::perspective(60f32.to_radians(), 0.1, 100.0)
                    .with_ambient(Vec3::splat(0.1)),
            )
            .with_behavior(CameraBehavior),
    )?;

    scene.register_object(
        "secondaryCamera",
        Object::new()
            .translate(Vec3::new(0.0, 20.0, -5.0))
            .rotate(-FRAC_PI_2, Vec3::X)
            .with_component(
                CameraComponent::perspective(60f32.to_radians(), 0.1, 100.0)
                    .with_depth(-1)
                    .with_viewport(Viewport::new(0.0, 0.6, 0.4, 0.4)),
            ),
    )?;

    scene.register_object(
        "dirLight",
        Object::new()
            .rotate(-FRAC_PI_2 / 2.0, Vec3::X)
            .enabled(false)
            .with_component(
                LightComponent::directional(Vec3::splat(0.5), Vec3::splat(0.5))
                    .with_shadow(ShadowType::Hard),
            ),
    )?;

    scene.register_object(
        "pointLight",
        Object::new()
            .translate(Vec3::new(0.0, 5.0, 0.0))
            .enabled(false)
            .with_component(
                LightComponent::point(Vec3::ONE, Vec3::ONE, 20.0).with_shadow(ShadowType::Hard),
            ),
    )?;

    scene.register_object(
        "spotLight",
        Object::new()
            .translate(Vec3::new(0.0, 15.0, -5.0))
            .rotate(-FRAC_PI_2, Vec3::X)
            .with_component(
                LightComponent::spot(Vec3::ONE, Vec3::ONE, 26.0, 30f32.to_radians())
                    .with_shadow(ShadowType::Hard),
            )
            .with_behavior(SpotControls),
    )?;

    let cube = scene.register_object(
        "simpleCube1",
        Object::new()
            .translate(Vec3::new(0.0, 0.0, -5.0))
            .with_component(MeshComponent::new("cubeMesh", "cubeMaterial").with_shadows(true, true))
            .with_behavior(ControlledRotation),
    )?;

    scene.register_object(
        "simpleCube2",
        Object::new()
            .translate(Vec3::new(5.0, 0.0, 0.0))
            .with_parent(cube)
            .with_component(MeshComponent::new("cubeMesh", "cubeMaterial").with_shadows(true, true))
            .with_behavior(Rotation { axis: Vec3::Y }),
    )?;

    scene.register_object(
        "floor",
        Object::new()
            .translate(Vec3::new(0.0, -5.0, 0.0))
            .scale(Vec3::new(100.0, 1.0, 100.0))
            .with_component(MeshComponent::new("floorMesh", "floorMaterial").with_shadows(false, true)),
    )?;

    Ok(scene)
}

fn sprite_scene() -> Result<Scene> {
    let mut scene = Scene::new();

    scene.register_object(
        "mainCamera",
        Object::new()
            .translate(Vec3::new(0.0, 2.0, 12.0))
            .with_component(CameraComponent::perspective(60f32.to_radians(), 0.1, 100.0))
            .with_behavior(CameraBehavior),
    )?;

    scene.register_object(
        "pointLight",
        Object::new()
            .translate(Vec3::new(0.0, 4.0, 0.0))
            .with_component(LightComponent::point(Vec3::ONE, Vec3::splat(0.3), 20.0)),
    )?;

    for i in 0..5 {
        let x = (i as f32 - 2.0) * 3.0;
        scene.register_object(
            format!("sprite{}", i),
            Object::new()
                .translate(Vec3::new(x, 0.0, 0.0))
                .with_component(SpriteComponent::new("spriteMesh", "spriteMaterial")),
        )?;
    }

    scene.register_object(
        "floor",
        Object::new()
            .translate(Vec3::new(0.0, -2.0, 0.0))
            .scale(Vec3::new(50.0, 1.0, 50.0))
            .with_component(MeshComponent::new("floorMesh", "floorMaterial")),
    )?;

    Ok(scene)
}

/// `escape` quits, `v` toggles mouse capture, `tab` cycles the demo scenes.
struct CameraBehavior;

impl Behavior for CameraBehavior {
    fn start(&mut self, ctx: &mut BehaviorContext<'_>) {
        ctx.input.set_cursor_mode(CursorMode::Normal);
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>) {
        if ctx.input.key_up("escape") {
            ctx.request_exit();
        }

        if ctx.input.key_up("v") {
            let mode = match ctx.input.cursor_mode() {
                CursorMode::Normal => CursorMode::Disabled,
                CursorMode::Disabled => CursorMode::Normal,
            };
            ctx.input.set_cursor_mode(mode);
        }

        if ctx.input.key_up("tab") {
            let next = if ctx.scene.object("simpleCube1").is_some() {
                DemoScene::Sprites
            } else {
                DemoScene::Cube
            };
            ctx.request_scene(next.name());
        }
    }
}

/// Widens the spot cone and scales its colour from the `angle` and
/// `intensity` axes.
struct SpotControls;

impl Behavior for SpotControls {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>) {
        let angle = ctx.input.axis("angle") as f32;
        let intensity = ctx.input.axis("intensity") as f32;
        let dt = ctx.delta_time as f32;

        if let Some(mut light) = ctx.scene.component_mut::<LightComponent>(ctx.object) {
            light.angle = (light.angle + angle * dt).clamp(0.1, 3.0);
            let value = (light.diffuse.x + intensity * dt).clamp(0.0, 2.0);
            light.diffuse = Vec3::splat(value);
            light.specular = Vec3::splat(value);
        }
    }
}

/// Turns the object with the mouse while the cursor is captured.
struct ControlledRotation;

impl Behavior for ControlledRotation {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>) {
        if ctx.input.cursor_mode() != CursorMode::Disabled {
            return;
        }
        let yaw = ctx.input.axis("mouse x") as f32;
        let pitch = ctx.input.axis("mouse y") as f32;
        if let Err(err) = ctx.with_transform(|transform| {
            transform.rotate(yaw.to_radians(), Vec3::Y);
            transform.rotate(pitch.to_radians(), Vec3::X);
        }) {
            log::warn!("ControlledRotation: {}", err);
        }
    }
}

struct Rotation {
    axis: Vec3,
}

impl Behavior for Rotation {
    fn update(&mut self, ctx: &mut BehaviorContext<'_>) {
        let angle = 0.3 * ctx.delta_time as f32;
        let axis = self.axis;
        if let Err(err) = ctx.with_transform(|transform| transform.rotate(angle, axis)) {
            log::warn!("Rotation: {}", err);
        }
    }
}
