// scene/components.rs
// hecs components stored on scene objects

use bitflags::bitflags;
use glam::{Mat4, Vec3};

// ============================================================================
// Object Components
// ============================================================================

/// Name the object was registered under
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Enable flag; disabled objects are skipped by every per-frame pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enabled(pub bool);

impl Default for Enabled {
    fn default() -> Self {
        Self(true)
    }
}

/// Parent object reference
#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

/// Child object references, never holding the same entity twice
#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<hecs::Entity>);

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `fov` is the vertical field of view in radians.
    Perspective { fov: f32, near: f32, far: f32 },
    Orthographic { width: f32, near: f32, far: f32 },
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

/// Normalized viewport rectangle, offset and size in 0..1 of the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel rectangle `(x, y, width, height)` for an output of the given size.
    pub fn to_pixels(&self, screen_width: u32, screen_height: u32) -> (u32, u32, u32, u32) {
        let w = screen_width as f32;
        let h = screen_height as f32;
        (
            (self.x * w).round() as u32,
            (self.y * h).round() as u32,
            (self.width * w).round() as u32,
            (self.height * h).round() as u32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraComponent {
    pub projection: Projection,
    /// Render priority; higher depths are drawn first.
    pub depth: i32,
    pub viewport: Viewport,
    pub ambient: Vec3,
    pub clear: ClearFlags,
}

impl CameraComponent {
    pub fn perspective(fov: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Perspective { fov, near, far },
            ..Self::default()
        }
    }

    pub fn orthographic(width: f32, near: f32, far: f32) -> Self {
        Self {
            projection: Projection::Orthographic { width, near, far },
            ..Self::default()
        }
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_ambient(mut self, ambient: Vec3) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_clear(mut self, clear: ClearFlags) -> Self {
        self.clear = clear;
        self
    }

    /// Projection for the full output size; the aspect ratio comes from the
    /// screen, not from the viewport rectangle.
    pub fn projection_matrix(&self, screen_width: u32, screen_height: u32) -> Mat4 {
        let w = screen_width.max(1) as f32;
        let h = screen_height.max(1) as f32;
        match self.projection {
            Projection::Perspective { fov, near, far } => {
                Mat4::perspective_rh_gl(fov, w / h, near, far)
            }
            Projection::Orthographic { width, near, far } => {
                let half_w = width / 2.0;
                let half_h = width * h / w / 2.0;
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, near, far)
            }
        }
    }
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective {
                fov: 60f32.to_radians(),
                near: 0.3,
                far: 100.0,
            },
            depth: 0,
            viewport: Viewport::FULL,
            ambient: Vec3::splat(0.2),
            clear: ClearFlags::all(),
        }
    }
}

// ============================================================================
// Lighting
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightSource {
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowType {
    #[default]
    None,
    /// Rendered exactly like `Hard`; no filtering is applied.
    Soft,
    Hard,
}

impl ShadowType {
    pub fn casts(self) -> bool {
        !matches!(self, ShadowType::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightComponent {
    pub source: LightSource,
    pub shadow: ShadowType,
    pub diffuse: Vec3,
    pub specular: Vec3,
    /// Point and spot lights only.
    pub range: f32,
    /// Full cone angle in radians, spot lights only.
    pub angle: f32,
}

impl LightComponent {
    pub fn directional(diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            source: LightSource::Directional,
            shadow: ShadowType::None,
            diffuse,
            specular,
            range: 0.0,
            angle: 0.0,
        }
    }

    pub fn point(diffuse: Vec3, specular: Vec3, range: f32) -> Self {
        Self {
            source: LightSource::Point,
            range,
            ..Self::directional(diffuse, specular)
        }
    }

    pub fn spot(diffuse: Vec3, specular: Vec3, range: f32, angle: f32) -> Self {
        Self {
            source: LightSource::Spot,
            range,
            angle,
            ..Self::directional(diffuse, specular)
        }
    }

    pub fn with_shadow(mut self, shadow: ShadowType) -> Self {
        self.shadow = shadow;
        self
    }
}

// ============================================================================
// Renderables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshComponent {
    pub mesh: String,
    /// Empty means no material; rendering such a mesh is an error.
    pub material: String,
    pub shader: Option<String>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshComponent {
    pub fn new(mesh: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            material: material.into(),
            shader: None,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader = Some(shader.into());
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

/// Camera-facing quad drawn through the geometry pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteComponent {
    pub mesh: String,
    pub material: String,
    pub shader: Option<String>,
}

impl SpriteComponent {
    pub fn new(mesh: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            material: material.into(),
            shader: None,
        }
    }

    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader = Some(shader.into());
        self
    }
}

// ============================================================================
// Component dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Camera,
    Light,
    Mesh,
    Sprite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Camera(CameraComponent),
    Light(LightComponent),
    Mesh(MeshComponent),
    Sprite(SpriteComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Camera(_) => ComponentKind::Camera,
            Component::Light(_) => ComponentKind::Light,
            Component::Mesh(_) => ComponentKind::Mesh,
            Component::Sprite(_) => ComponentKind::Sprite,
        }
    }
}

/// Typed access to the component stored for one kind.
pub trait ComponentData: hecs::Component + Clone {
    const KIND: ComponentKind;

    fn into_component(self) -> Component;
}

macro_rules! component_data {
    ($ty:ty, $variant:ident) => {
        impl ComponentData for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn into_component(self) -> Component {
                Component::$variant(self)
            }
        }

        impl From<$ty> for Component {
            fn from(value: $ty) -> Self {
                Component::$variant(value)
            }
        }
    };
}

component_data!(CameraComponent, Camera);
component_data!(LightComponent, Light);
component_data!(MeshComponent, Mesh);
component_data!(SpriteComponent, Sprite);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_maps_to_pixels() {
        let viewport = Viewport::new(0.0, 0.6, 0.4, 0.4);
        assert_eq!(viewport.to_pixels(800, 600), (0, 360, 320, 240));
        assert_eq!(Viewport::FULL.to_pixels(800, 600), (0, 0, 800, 600));
    }

    #[test]
    fn orthographic_height_follows_screen_aspect() {
        let camera = CameraComponent::orthographic(16.0, 0.1, 50.0);
        let projection = camera.projection_matrix(800, 400);
        // width 16 -> half width 8, height 16 * 400 / 800 = 8 -> half height 4
        let corner = projection.project_point3(Vec3::new(8.0, 4.0, -1.0));
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn perspective_uses_gl_depth_range() {
        let camera = CameraComponent::perspective(60f32.to_radians(), 0.5, 20.0);
        let projection = camera.projection_matrix(800, 600);
        let near = projection.project_point3(Vec3::new(0.0, 0.0, -0.5));
        let far = projection.project_point3(Vec3::new(0.0, 0.0, -20.0));
        assert!((near.z + 1.0).abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn component_kind_matches_variant() {
        let light: Component = LightComponent::point(Vec3::ONE, Vec3::ONE, 10.0).into();
        assert_eq!(light.kind(), ComponentKind::Light);
        assert_eq!(MeshComponent::KIND, ComponentKind::Mesh);
        assert!(!ShadowType::None.casts());
        assert!(ShadowType::Soft.casts());
    }
}
