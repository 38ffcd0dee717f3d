//! Per-frame snapshot of the renderable components of a scene.

use crate::scene::{
    CameraComponent, LightComponent, MeshComponent, ObjectId, Scene, SpriteComponent,
    WorldTransform,
};

/// A component together with the object it sits on.
#[derive(Debug, Clone)]
pub struct View<T> {
    pub object: ObjectId,
    pub name: String,
    pub component: T,
    pub transform: WorldTransform,
}

impl<T> View<T> {
    fn new(object: ObjectId, name: &str, component: T, transform: WorldTransform) -> Self {
        Self {
            object,
            name: name.to_string(),
            component,
            transform,
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameComponents {
    pub cameras: Vec<View<CameraComponent>>,
    pub lights: Vec<View<LightComponent>>,
    pub meshes: Vec<View<MeshComponent>>,
    pub sprites: Vec<View<SpriteComponent>>,
}

impl FrameComponents {
    /// Walks enabled objects in registration order. Objects that never took
    /// part in a transform pass are left out.
    pub fn collect(scene: &Scene) -> Self {
        let mut frame = FrameComponents::default();
        for (name, object) in scene.objects() {
            if !scene.is_enabled(object) {
                continue;
            }
            let Some(transform) = scene.world_transform(object) else {
                log::trace!("Skipping '{}': no world transform yet", name);
                continue;
            };
            if let Some(camera) = scene.component::<CameraComponent>(object) {
                frame.cameras.push(View::new(object, name, *camera, transform));
            }
            if let Some(light) = scene.component::<LightComponent>(object) {
                frame.lights.push(View::new(object, name, *light, transform));
            }
            if let Some(mesh) = scene.component::<MeshComponent>(object) {
                frame.meshes.push(View::new(object, name, (*mesh).clone(), transform));
            }
            if let Some(sprite) = scene.component::<SpriteComponent>(object) {
                frame.sprites.push(View::new(object, name, (*sprite).clone(), transform));
            }
        }
        order_cameras(&mut frame.cameras);
        frame
    }
}

/// Highest depth first; cameras with equal depth keep their order.
pub fn order_cameras(cameras: &mut [View<CameraComponent>]) {
    cameras.sort_by(|a, b| b.component.depth.cmp(&a.component.depth));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Object;

    #[test]
    fn collects_owned_copies_of_renderables() {
        let mut scene = Scene::new();
        scene
            .register_object(
                "cube",
                Object::new().with_component(
                    MeshComponent::new("cubeMesh", "red").with_shadows(true, false),
                ),
            )
            .unwrap();
        scene
            .register_object(
                "leaf",
                Object::new().with_component(SpriteComponent::new("quad", "leaf")),
            )
            .unwrap();
        scene.update_transforms();

        let frame = FrameComponents::collect(&scene);
        assert_eq!(frame.meshes.len(), 1);
        assert_eq!(frame.meshes[0].name, "cube");
        assert_eq!(
            frame.meshes[0].component,
            MeshComponent::new("cubeMesh", "red").with_shadows(true, false)
        );
        assert_eq!(frame.sprites.len(), 1);
        assert_eq!(frame.sprites[0].component, SpriteComponent::new("quad", "leaf"));
    }

    #[test]
    fn higher_depth_cameras_come_first() {
        let mut scene = Scene::new();
        for (name, depth) in [("low", -1), ("high", 2), ("mid", 0)] {
            scene
                .register_object(
                    name,
                    Object::new().with_component(
                        CameraComponent::perspective(1.0, 0.1, 10.0).with_depth(depth),
                    ),
                )
                .unwrap();
        }
        scene.update_transforms();

        let frame = FrameComponents::collect(&scene);
        let names: Vec<_> = frame.cameras.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }
}
