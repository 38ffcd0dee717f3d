//! Light-space matrices for the three shadow map kinds.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Mat4, Vec3};

use crate::scene::WorldTransform;

pub const SHADOW_NEAR: f32 = 0.1;
/// Half size of the square a directional light's orthographic box covers.
pub const DIRECTIONAL_EXTENT: f32 = 100.0;
pub const DIRECTIONAL_FAR: f32 = 200.0;

/// Face order and up vectors of a GL cube map.
const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

pub fn directional_light_matrix(light: &WorldTransform) -> Mat4 {
    let projection = Mat4::orthographic_rh_gl(
        -DIRECTIONAL_EXTENT,
        DIRECTIONAL_EXTENT,
        -DIRECTIONAL_EXTENT,
        DIRECTIONAL_EXTENT,
        SHADOW_NEAR,
        DIRECTIONAL_FAR,
    );
    projection * light_view(light)
}

pub fn spot_light_matrix(light: &WorldTransform, angle: f32, range: f32) -> Mat4 {
    let fov = angle.clamp(0.1, PI - 0.1);
    Mat4::perspective_rh_gl(fov, 1.0, SHADOW_NEAR, shadow_far(range)) * light_view(light)
}

/// View-projection of each cube face around `position`, in GL face order.
pub fn point_light_matrices(position: Vec3, range: f32) -> [Mat4; 6] {
    let projection = Mat4::perspective_rh_gl(FRAC_PI_2, 1.0, SHADOW_NEAR, shadow_far(range));

    let mut matrices = [Mat4::IDENTITY; 6];
    for (matrix, (direction, up)) in matrices.iter_mut().zip(CUBE_FACES) {
        *matrix = projection * Mat4::look_at_rh(position, position + direction, up);
    }
    matrices
}

/// Far plane of a point or spot light's shadow frustum.
pub fn shadow_far(range: f32) -> f32 {
    range.max(SHADOW_NEAR + 0.1)
}

/// Maps `world` into shadow map space: xy in texture coordinates, z the
/// depth the map would store.
pub fn project_to_shadow_map(light_matrix: Mat4, world: Vec3) -> Vec3 {
    let clip = light_matrix * world.extend(1.0);
    clip.truncate() / clip.w * 0.5 + Vec3::splat(0.5)
}

fn light_view(light: &WorldTransform) -> Mat4 {
    let forward = safe_normalize(light.forward, Vec3::NEG_Z);
    let mut up = safe_normalize(light.up, Vec3::Y);
    if forward.cross(up).length_squared() < 1e-8 {
        up = if forward.dot(Vec3::Y).abs() > 0.95 {
            Vec3::Z
        } else {
            Vec3::Y
        };
    }
    Mat4::look_at_rh(light.position, light.position + forward, up)
}

fn safe_normalize(vec: Vec3, fallback: Vec3) -> Vec3 {
    if vec.length_squared() > 1e-6 {
        vec.normalize()
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;

    const EPS: f32 = 1e-4;

    fn light_at(position: Vec3, pitch: f32) -> WorldTransform {
        let mut transform = Transform::default();
        transform.rotate(pitch, Vec3::X);
        transform.translate(position);
        WorldTransform::from_model(transform.local_matrix())
    }

    #[test]
    fn directional_map_centres_the_light_axis() {
        let light = light_at(Vec3::new(0.0, 50.0, 0.0), -FRAC_PI_2);
        let matrix = directional_light_matrix(&light);

        let below = project_to_shadow_map(matrix, Vec3::ZERO);
        assert!((below.x - 0.5).abs() < EPS);
        assert!((below.y - 0.5).abs() < EPS);

        let deeper = project_to_shadow_map(matrix, Vec3::new(0.0, -50.0, 0.0));
        assert!(deeper.z > below.z);
    }

    #[test]
    fn spot_map_depth_grows_with_distance() {
        let light = light_at(Vec3::ZERO, 0.0);
        let matrix = spot_light_matrix(&light, 1.0, 20.0);
        let near = project_to_shadow_map(matrix, Vec3::new(0.0, 0.0, -2.0));
        let far = project_to_shadow_map(matrix, Vec3::new(0.0, 0.0, -10.0));
        assert!(near.z < far.z);
        assert!((near.x - 0.5).abs() < EPS);
    }

    #[test]
    fn cube_faces_look_along_their_axis() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let matrices = point_light_matrices(origin, 10.0);
        for (matrix, (direction, _)) in matrices.iter().zip(CUBE_FACES) {
            let projected = project_to_shadow_map(*matrix, origin + direction * 5.0);
            assert!((projected.x - 0.5).abs() < EPS);
            assert!((projected.y - 0.5).abs() < EPS);
            assert!(projected.z > 0.0 && projected.z < 1.0);
        }
    }

    #[test]
    fn degenerate_range_still_yields_a_finite_matrix() {
        let matrices = point_light_matrices(Vec3::ZERO, 0.0);
        assert!(matrices.iter().all(|m| m.is_finite()));
        let spot = spot_light_matrix(&light_at(Vec3::ZERO, 0.0), 0.0, -1.0);
        assert!(spot.is_finite());
    }
}
