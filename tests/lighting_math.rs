use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use deferred_engine::renderer::lighting::{self, SurfaceSample};
use deferred_engine::scene::{LightComponent, WorldTransform};

const EPSILON: f32 = 1e-5;

fn at(position: Vec3) -> WorldTransform {
    WorldTransform::from_model(Mat4::from_translation(position))
}

fn pointing_down(position: Vec3) -> WorldTransform {
    WorldTransform::from_model(Mat4::from_rotation_translation(
        Quat::from_rotation_x(-FRAC_PI_2),
        position,
    ))
}

fn floor_sample(position: Vec3, receive_shadow: bool) -> SurfaceSample {
    SurfaceSample {
        position,
        normal: Vec3::Y,
        diffuse: Vec3::ONE,
        receive_shadow,
    }
}

#[test]
fn point_light_halfway_through_its_range_gives_half() {
    let light = LightComponent::point(Vec3::ONE, Vec3::ZERO, 20.0);
    let sample = floor_sample(Vec3::new(0.0, -10.0, 0.0), false);
    let lit = lighting::contribution(&light, &at(Vec3::ZERO), Vec3::new(0.0, 5.0, 5.0), &sample, 0.0);
    assert!(lit.abs_diff_eq(Vec3::splat(0.5), EPSILON));
}

#[test]
fn point_light_out_of_range_contributes_nothing() {
    let light = LightComponent::point(Vec3::ONE, Vec3::ONE, 5.0);
    let sample = floor_sample(Vec3::new(0.0, -10.0, 0.0), false);
    let lit = lighting::contribution(&light, &at(Vec3::ZERO), Vec3::new(0.0, 5.0, 0.0), &sample, 0.0);
    assert_eq!(lit, Vec3::ZERO);
}

#[test]
fn specular_peaks_when_reflection_meets_the_eye() {
    let light = LightComponent::point(Vec3::ZERO, Vec3::ONE, 100.0);
    let sample = floor_sample(Vec3::ZERO, false);
    let transform = at(Vec3::new(0.0, 10.0, 0.0));

    let straight = lighting::contribution(&light, &transform, Vec3::new(0.0, 10.0, 0.0), &sample, 0.0);
    let grazing = lighting::contribution(&light, &transform, Vec3::new(10.0, 1.0, 0.0), &sample, 0.0);
    assert!(straight.x > 0.85);
    assert!(grazing.x < straight.x * 0.1);
}

#[test]
fn directional_light_ignores_distance() {
    let light = LightComponent::directional(Vec3::ONE, Vec3::ZERO);
    let transform = pointing_down(Vec3::new(0.0, 1000.0, 0.0));
    let near = lighting::contribution(&light, &transform, Vec3::Y, &floor_sample(Vec3::ZERO, false), 0.0);
    let far = lighting::contribution(
        &light,
        &transform,
        Vec3::Y,
        &floor_sample(Vec3::new(500.0, 0.0, 0.0), false),
        0.0,
    );
    assert!(near.abs_diff_eq(Vec3::ONE, EPSILON));
    assert!(far.abs_diff_eq(near, EPSILON));
}

#[test]
fn spot_light_lights_only_inside_its_cone() {
    let light = LightComponent::spot(Vec3::ONE, Vec3::ZERO, 100.0, 30f32.to_radians());
    let transform = pointing_down(Vec3::new(0.0, 10.0, 0.0));
    let eye = Vec3::new(0.0, 10.0, 10.0);

    let inside = lighting::contribution(&light, &transform, eye, &floor_sample(Vec3::ZERO, false), 0.0);
    let outside = lighting::contribution(
        &light,
        &transform,
        eye,
        &floor_sample(Vec3::new(10.0, 0.0, 0.0), false),
        0.0,
    );
    assert!(inside.x > 0.0);
    assert_eq!(outside, Vec3::ZERO);
}

#[test]
fn shadow_only_darkens_receivers() {
    let light = LightComponent::directional(Vec3::ONE, Vec3::ZERO);
    let transform = pointing_down(Vec3::new(0.0, 10.0, 0.0));

    let receiver = lighting::contribution(&light, &transform, Vec3::Y, &floor_sample(Vec3::ZERO, true), 1.0);
    let ignorer = lighting::contribution(&light, &transform, Vec3::Y, &floor_sample(Vec3::ZERO, false), 1.0);
    assert_eq!(receiver, Vec3::ZERO);
    assert!(ignorer.abs_diff_eq(Vec3::ONE, EPSILON));
}

#[test]
fn shadow_test_applies_the_bias() {
    assert_eq!(lighting::shadow_test(0.5, 0.5), 0.0);
    assert_eq!(lighting::shadow_test(0.504, 0.5), 0.0);
    assert_eq!(lighting::shadow_test(0.51, 0.5), 1.0);
}
