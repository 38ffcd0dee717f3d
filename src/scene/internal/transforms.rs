use std::collections::HashMap;

use crate::scene::components::{Enabled, Parent};
use crate::scene::transform::{Transform, WorldTransform};
use glam::Mat4;
use hecs::{Entity, World};
use rayon::prelude::*;

/// Recomputes the world transform of every enabled object. Disabled objects
/// keep whatever they had from the last pass they took part in.
pub(crate) fn propagate_transforms(world: &mut World) {
    let nodes: HashMap<Entity, (Mat4, Option<Entity>)> = world
        .query::<(&Transform, Option<&Parent>)>()
        .iter()
        .map(|(entity, (transform, parent))| {
            (entity, (transform.local_matrix(), parent.map(|p| p.0)))
        })
        .collect();

    let targets: Vec<Entity> = world
        .query::<(&Transform, &Enabled)>()
        .iter()
        .filter(|(_, (_, enabled))| enabled.0)
        .map(|(entity, _)| entity)
        .collect();

    log::trace!(
        "Computing world transforms for {} of {} objects",
        targets.len(),
        nodes.len()
    );

    let updates: Vec<(Entity, WorldTransform)> = targets
        .par_iter()
        .map(|&entity| (entity, WorldTransform::from_model(fold_to_root(&nodes, entity))))
        .collect();

    for (entity, world_transform) in updates {
        let mut has_world_transform = false;
        if let Ok(mut wt) = world.get::<&mut WorldTransform>(entity) {
            *wt = world_transform;
            has_world_transform = true;
        }

        if !has_world_transform {
            if let Err(e) = world.insert_one(entity, world_transform) {
                log::error!(
                    "Failed to insert WorldTransform for entity {:?}: {:?}",
                    entity,
                    e
                );
            }
        }
    }
}

/// Walks from `entity` to its root, prepending each node's local matrix.
fn fold_to_root(nodes: &HashMap<Entity, (Mat4, Option<Entity>)>, entity: Entity) -> Mat4 {
    let mut model = Mat4::IDENTITY;
    let mut current = Some(entity);
    while let Some(node) = current {
        let Some((local, parent)) = nodes.get(&node) else {
            break;
        };
        model = *local * model;
        current = *parent;
    }
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::{Children, Name};
    use glam::Vec3;

    fn translated(v: Vec3) -> Transform {
        let mut transform = Transform::default();
        transform.translate(v);
        transform
    }

    #[test]
    fn test_transform_propagation_simple() {
        let mut world = World::new();

        let parent = world.spawn((
            Name::new("Parent"),
            Enabled(true),
            translated(Vec3::new(5.0, 0.0, 0.0)),
        ));
        let child = world.spawn((
            Name::new("Child"),
            Enabled(true),
            translated(Vec3::new(2.0, 0.0, 0.0)),
            Parent(parent),
        ));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_transforms(&mut world);

        let parent_world = world.get::<&WorldTransform>(parent).unwrap();
        assert_eq!(parent_world.position, Vec3::new(5.0, 0.0, 0.0));

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert_eq!(child_world.position, Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn test_transform_propagation_scale() {
        let mut world = World::new();

        let mut parent_transform = Transform::default();
        parent_transform.scale(Vec3::splat(2.0));
        let parent = world.spawn((Enabled(true), parent_transform));

        let mut child_transform = translated(Vec3::new(1.0, 0.0, 0.0));
        child_transform.scale(Vec3::splat(0.5));
        let child = world.spawn((Enabled(true), child_transform, Parent(parent)));

        propagate_transforms(&mut world);

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert!(child_world.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
        assert!(child_world.right.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_transform_propagation_rotation() {
        let mut world = World::new();

        let mut parent_transform = Transform::default();
        parent_transform.rotate(std::f32::consts::FRAC_PI_2, Vec3::Y);
        let parent = world.spawn((Enabled(true), parent_transform));
        let child = world.spawn((
            Enabled(true),
            translated(Vec3::new(1.0, 0.0, 0.0)),
            Parent(parent),
        ));

        propagate_transforms(&mut world);

        let parent_world = world.get::<&WorldTransform>(parent).unwrap();
        assert!(parent_world.position.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(parent_world.forward.abs_diff_eq(Vec3::NEG_X, 1e-5));

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert!(child_world
            .position
            .abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_transform_propagation_skips_disabled() {
        let mut world = World::new();

        let parent = world.spawn((Enabled(false), translated(Vec3::new(0.0, 3.0, 0.0))));
        let child = world.spawn((
            Enabled(true),
            translated(Vec3::new(1.0, 0.0, 0.0)),
            Parent(parent),
        ));

        propagate_transforms(&mut world);

        assert!(world.get::<&WorldTransform>(parent).is_err());
        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert_eq!(child_world.position, Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn test_transform_propagation_keeps_stale_value_while_disabled() {
        let mut world = World::new();
        let object = world.spawn((Enabled(true), translated(Vec3::X)));

        propagate_transforms(&mut world);

        world.get::<&mut Enabled>(object).unwrap().0 = false;
        world
            .get::<&mut Transform>(object)
            .unwrap()
            .translate(Vec3::X);

        propagate_transforms(&mut world);

        let stale = world.get::<&WorldTransform>(object).unwrap();
        assert_eq!(stale.position, Vec3::X);
    }
}
