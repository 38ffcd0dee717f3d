// scene/builder.rs
// Fluent construction of scene objects before registration

use glam::Vec3;

use super::components::*;
use crate::behavior::Behavior;
use crate::scene::{ObjectId, Transform};

/// Describes an object to be registered into a [`Scene`](crate::scene::Scene).
///
/// ```ignore
/// let cube = scene.register_object(
///     "cube",
///     Object::new()
///         .translate(Vec3::new(0.0, 0.0, -5.0))
///         .with_component(MeshComponent::new("cubeMesh", "cubeMaterial")),
/// )?;
/// ```
pub struct Object {
    pub(crate) transform: Transform,
    pub(crate) enabled: bool,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) components: Vec<Component>,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            transform: Transform::IDENTITY,
            enabled: true,
            parent: None,
            components: Vec::new(),
            behavior: None,
        }
    }

    pub fn translate(mut self, delta: Vec3) -> Self {
        self.transform.translate(delta);
        self
    }

    pub fn rotate(mut self, angle: f32, axis: Vec3) -> Self {
        self.transform.rotate(angle, axis);
        self
    }

    pub fn scale(mut self, delta: Vec3) -> Self {
        self.transform.scale(delta);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_parent(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Later components of the same kind replace earlier ones.
    pub fn with_component(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_behavior(mut self, behavior: impl Behavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub(crate) fn spawn_bundle(&self, name: &str) -> hecs::EntityBuilder {
        let mut builder = hecs::EntityBuilder::new();
        builder
            .add(Name::new(name))
            .add(Enabled(self.enabled))
            .add(self.transform)
            .add(Children::default());
        for component in &self.components {
            match component.clone() {
                Component::Camera(camera) => builder.add(camera),
                Component::Light(light) => builder.add(light),
                Component::Mesh(mesh) => builder.add(mesh),
                Component::Sprite(sprite) => builder.add(sprite),
            };
        }
        builder
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}
