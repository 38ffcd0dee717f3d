use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use deferred_engine::scene::{
    CameraComponent, ComponentKind, LightComponent, MeshComponent, Object, Scene,
};
use deferred_engine::EngineError;

const EPSILON: f32 = 1e-5;

#[test]
fn child_world_position_follows_parent() {
    let mut scene = Scene::new();
    let parent = scene
        .register_object("parent", Object::new().translate(Vec3::new(0.0, 0.0, -5.0)))
        .unwrap();
    let child = scene
        .register_object(
            "child",
            Object::new()
                .translate(Vec3::new(5.0, 0.0, 0.0))
                .with_parent(parent),
        )
        .unwrap();

    scene.update_transforms();
    let world = scene.world_transform(child).unwrap();
    assert!(world
        .position
        .abs_diff_eq(Vec3::new(5.0, 0.0, -5.0), EPSILON));

    scene
        .transform_mut(parent)
        .unwrap()
        .rotate(FRAC_PI_2, Vec3::Y);
    scene.update_transforms();
    let world = scene.world_transform(child).unwrap();
    assert!(world
        .position
        .abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), EPSILON));
}

#[test]
fn default_orientation_looks_down_negative_z() {
    let mut scene = Scene::new();
    let id = scene.register_object("camera", Object::new()).unwrap();
    scene.update_transforms();

    let world = scene.world_transform(id).unwrap();
    assert!(world.forward.abs_diff_eq(Vec3::NEG_Z, EPSILON));
    assert!(world.up.abs_diff_eq(Vec3::Y, EPSILON));
    assert!(world.right.abs_diff_eq(Vec3::X, EPSILON));
}

#[test]
fn pointing_an_object_down_turns_forward_to_negative_y() {
    let mut scene = Scene::new();
    let id = scene
        .register_object("light", Object::new().rotate(-FRAC_PI_2, Vec3::X))
        .unwrap();
    scene.update_transforms();

    let world = scene.world_transform(id).unwrap();
    assert!(world.forward.abs_diff_eq(Vec3::NEG_Y, EPSILON));
}

#[test]
fn reparenting_under_a_descendant_is_rejected() {
    let mut scene = Scene::new();
    let root = scene.register_object("root", Object::new()).unwrap();
    let child = scene
        .register_object("child", Object::new().with_parent(root))
        .unwrap();
    let grandchild = scene
        .register_object("grandchild", Object::new().with_parent(child))
        .unwrap();

    let err = scene.set_parent(root, grandchild).unwrap_err();
    assert!(matches!(err, EngineError::HierarchyCycle(name) if name == "root"));
    assert_eq!(scene.parent(root), None);
    assert_eq!(scene.children(child), vec![grandchild]);
}

#[test]
fn moving_a_child_updates_both_parents() {
    let mut scene = Scene::new();
    let a = scene.register_object("a", Object::new()).unwrap();
    let b = scene.register_object("b", Object::new()).unwrap();
    let child = scene
        .register_object("child", Object::new().with_parent(a))
        .unwrap();

    scene.set_parent(child, b).unwrap();
    assert!(scene.children(a).is_empty());
    assert_eq!(scene.children(b), vec![child]);
    assert_eq!(scene.parent(child), Some(b));
}

#[test]
fn removing_a_parent_promotes_its_children() {
    let mut scene = Scene::new();
    let parent = scene
        .register_object("parent", Object::new().translate(Vec3::X))
        .unwrap();
    let child = scene
        .register_object("child", Object::new().with_parent(parent))
        .unwrap();

    scene.remove_object(parent).unwrap();
    assert!(!scene.contains(parent));
    assert_eq!(scene.parent(child), None);

    scene.update_transforms();
    let world = scene.world_transform(child).unwrap();
    assert!(world.position.abs_diff_eq(Vec3::ZERO, EPSILON));
}

#[test]
fn registering_a_name_twice_replaces_the_object() {
    let mut scene = Scene::new();
    let first = scene.register_object("cube", Object::new()).unwrap();
    let second = scene
        .register_object("cube", Object::new().translate(Vec3::Y))
        .unwrap();

    assert_eq!(scene.len(), 1);
    assert!(!scene.contains(first));
    assert_eq!(scene.object("cube"), Some(second));
}

#[test]
fn objects_keep_registration_order() {
    let mut scene = Scene::new();
    for name in ["c", "a", "b"] {
        scene.register_object(name, Object::new()).unwrap();
    }
    let names: Vec<&str> = scene.objects().map(|(name, _)| name).collect();
    assert_eq!(names, ["c", "a", "b"]);
}

#[test]
fn components_can_be_attached_and_detached() {
    let mut scene = Scene::new();
    let id = scene
        .register_object(
            "thing",
            Object::new()
                .with_component(MeshComponent::new("cube", "red"))
                .with_component(LightComponent::point(Vec3::ONE, Vec3::ONE, 10.0)),
        )
        .unwrap();

    scene
        .attach_component(id, CameraComponent::default())
        .unwrap();
    let kinds: Vec<ComponentKind> = scene.components(id).iter().map(|c| c.kind()).collect();
    assert!(kinds.contains(&ComponentKind::Camera));
    assert!(kinds.contains(&ComponentKind::Mesh));
    assert!(kinds.contains(&ComponentKind::Light));

    scene.detach_component(id, ComponentKind::Light).unwrap();
    assert!(scene.component::<LightComponent>(id).is_none());
    assert_eq!(scene.component::<MeshComponent>(id).unwrap().material, "red");
}

#[test]
fn disabled_objects_keep_their_last_world_transform() {
    let mut scene = Scene::new();
    let id = scene
        .register_object("cube", Object::new().translate(Vec3::X))
        .unwrap();
    scene.update_transforms();

    scene.set_enabled(id, false).unwrap();
    scene.transform_mut(id).unwrap().translate(Vec3::X);
    scene.update_transforms();
    let world = scene.world_transform(id).unwrap();
    assert!(world.position.abs_diff_eq(Vec3::X, EPSILON));
}

#[test]
fn three_level_chain_accumulates_translations() {
    let mut scene = Scene::new();
    let root = scene.register_object("root", Object::new()).unwrap();
    let middle = scene
        .register_object(
            "middle",
            Object::new()
                .translate(Vec3::new(0.0, 5.0, 0.0))
                .with_parent(root),
        )
        .unwrap();
    let leaf = scene
        .register_object(
            "leaf",
            Object::new()
                .translate(Vec3::new(1.0, 0.0, 0.0))
                .with_parent(middle),
        )
        .unwrap();

    scene.update_transforms();
    let world = scene.world_transform(leaf).unwrap();
    assert!(world.position.abs_diff_eq(Vec3::new(1.0, 5.0, 0.0), EPSILON));
}

#[test]
fn attaching_the_same_child_twice_keeps_one_edge() {
    let mut scene = Scene::new();
    let a = scene.register_object("a", Object::new()).unwrap();
    let b = scene.register_object("b", Object::new()).unwrap();

    scene.set_parent(b, a).unwrap();
    scene.set_parent(b, a).unwrap();
    assert_eq!(scene.children(a), vec![b]);
}

#[test]
fn objects_have_no_world_transform_before_the_first_pass() {
    let mut scene = Scene::new();
    let id = scene.register_object("fresh", Object::new()).unwrap();
    assert!(scene.world_transform(id).is_none());
}
