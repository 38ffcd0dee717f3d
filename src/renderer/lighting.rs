//! CPU rendition of the lighting shaders. The GLSL in `shader/` computes the
//! same terms per fragment; these functions exist so the math can be checked
//! without a device.

use glam::Vec3;

use super::shaders::{SHADOW_BIAS, SHININESS};
use crate::scene::{LightComponent, LightSource, WorldTransform};

/// What the geometry buffer holds for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub diffuse: Vec3,
    pub receive_shadow: bool,
}

/// Direction the light travels to reach `fragment`: the light's forward for
/// directional lights, `fragment - position` otherwise.
pub fn travel_direction(light: &LightComponent, transform: &WorldTransform, fragment: Vec3) -> Vec3 {
    match light.source {
        LightSource::Directional => transform.forward,
        LightSource::Point | LightSource::Spot => fragment - transform.position,
    }
}

pub fn diffuse(light_diffuse: Vec3, normal: Vec3, travel: Vec3, surface: Vec3) -> Vec3 {
    let lambert = normal
        .normalize_or_zero()
        .dot(-travel.normalize_or_zero())
        .max(0.0);
    light_diffuse * lambert * surface
}

pub fn specular(light_specular: Vec3, normal: Vec3, travel: Vec3, view: Vec3) -> Vec3 {
    let half = -(view + travel.normalize_or_zero()).normalize_or_zero();
    light_specular * normal.dot(half).max(0.0).powf(SHININESS)
}

/// Linear falloff reaching zero at `range`.
pub fn attenuation(distance: f32, range: f32) -> f32 {
    if range <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / range).max(0.0)
}

/// 1 inside the cone of half-angle `angle / 2`, 0 outside.
pub fn spot_cone(travel: Vec3, forward: Vec3, angle: f32) -> f32 {
    let cutoff = (angle / 2.0).cos();
    if travel.normalize_or_zero().dot(forward.normalize_or_zero()) > cutoff {
        1.0
    } else {
        0.0
    }
}

pub fn shadow_test(current: f32, closest: f32) -> f32 {
    if current - SHADOW_BIAS > closest {
        1.0
    } else {
        0.0
    }
}

/// Radiance one light adds to `sample` seen from `camera_position`. `shadow`
/// is the result of [`shadow_test`], 0 for lights without a shadow map.
pub fn contribution(
    light: &LightComponent,
    transform: &WorldTransform,
    camera_position: Vec3,
    sample: &SurfaceSample,
    shadow: f32,
) -> Vec3 {
    let travel = travel_direction(light, transform, sample.position);
    let view = (sample.position - camera_position).normalize_or_zero();

    let lit = diffuse(light.diffuse, sample.normal, travel, sample.diffuse)
        + specular(light.specular, sample.normal, travel, view);

    let falloff = match light.source {
        LightSource::Directional => 1.0,
        LightSource::Point | LightSource::Spot => attenuation(travel.length(), light.range),
    };
    let cone = match light.source {
        LightSource::Spot => spot_cone(travel, transform.forward, light.angle),
        _ => 1.0,
    };
    let receive = if sample.receive_shadow { 1.0 } else { 0.0 };

    cone * (1.0 - receive * shadow) * falloff * lit
}
