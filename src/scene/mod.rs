// scene/mod.rs

pub mod builder;
pub mod components;
pub mod scene;
pub mod transform;

pub(crate) mod internal {
    pub(crate) mod transforms;
}

pub use builder::Object;
pub use scene::Scene;
pub use transform::{Transform, WorldTransform};

pub use components::{
    CameraComponent, Children, ClearFlags, Component, ComponentData, ComponentKind, Enabled,
    LightComponent, LightSource, MeshComponent, Name, Parent, Projection, ShadowType,
    SpriteComponent, Viewport,
};

/// Handle of an object inside its scene.
pub type ObjectId = hecs::Entity;
