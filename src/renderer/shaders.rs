//! Built-in GLSL programs of the deferred pipeline.

use crate::asset::ShaderSource;

const VERSION: &str = include_str!("../shader/version.glsl");
const LIGHTING_COMMON: &str = include_str!("../shader/lighting_common.glsl");

/// Specular exponent used by every lighting shader.
pub const SHININESS: f32 = 32.0;
/// Depth offset subtracted before comparing against a shadow map.
pub const SHADOW_BIAS: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinShader {
    GeometryColor,
    GeometryTexture,
    Ambient,
    Directional,
    DirectionalShadow,
    Point,
    PointShadow,
    Spot,
    SpotShadow,
    ShadowDepth,
    ShadowCube,
}

impl BuiltinShader {
    pub const ALL: [BuiltinShader; 11] = [
        BuiltinShader::GeometryColor,
        BuiltinShader::GeometryTexture,
        BuiltinShader::Ambient,
        BuiltinShader::Directional,
        BuiltinShader::DirectionalShadow,
        BuiltinShader::Point,
        BuiltinShader::PointShadow,
        BuiltinShader::Spot,
        BuiltinShader::SpotShadow,
        BuiltinShader::ShadowDepth,
        BuiltinShader::ShadowCube,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BuiltinShader::GeometryColor => "gbuffer_color",
            BuiltinShader::GeometryTexture => "gbuffer_texture",
            BuiltinShader::Ambient => "ambient",
            BuiltinShader::Directional => "light_directional",
            BuiltinShader::DirectionalShadow => "light_directional_shadow",
            BuiltinShader::Point => "light_point",
            BuiltinShader::PointShadow => "light_point_shadow",
            BuiltinShader::Spot => "light_spot",
            BuiltinShader::SpotShadow => "light_spot_shadow",
            BuiltinShader::ShadowDepth => "shadow_depth",
            BuiltinShader::ShadowCube => "shadow_cube",
        }
    }

    pub fn source(self) -> ShaderSource {
        match self {
            BuiltinShader::GeometryColor => ShaderSource::new(
                stage(include_str!("../shader/gbuffer.vert")),
                stage(include_str!("../shader/gbuffer_color.frag")),
            ),
            BuiltinShader::GeometryTexture => ShaderSource::new(
                stage(include_str!("../shader/gbuffer.vert")),
                stage(include_str!("../shader/gbuffer_texture.frag")),
            ),
            BuiltinShader::Ambient => ShaderSource::new(
                stage(include_str!("../shader/fullscreen.vert")),
                stage(include_str!("../shader/ambient.frag")),
            ),
            BuiltinShader::Directional => {
                lighting(include_str!("../shader/light_directional.frag"))
            }
            BuiltinShader::DirectionalShadow => {
                lighting(include_str!("../shader/light_directional_shadow.frag"))
            }
            BuiltinShader::Point => lighting(include_str!("../shader/light_point.frag")),
            BuiltinShader::PointShadow => {
                lighting(include_str!("../shader/light_point_shadow.frag"))
            }
            BuiltinShader::Spot => lighting(include_str!("../shader/light_spot.frag")),
            BuiltinShader::SpotShadow => {
                lighting(include_str!("../shader/light_spot_shadow.frag"))
            }
            BuiltinShader::ShadowDepth => ShaderSource::new(
                stage(include_str!("../shader/shadow_depth.vert")),
                stage(include_str!("../shader/shadow_depth.frag")),
            ),
            BuiltinShader::ShadowCube => ShaderSource::new(
                stage(include_str!("../shader/shadow_cube.vert")),
                stage(include_str!("../shader/shadow_cube.frag")),
            )
            .with_geometry(stage(include_str!("../shader/shadow_cube.geom"))),
        }
    }
}

fn stage(body: &str) -> String {
    format!("{}\n{}", VERSION, body)
}

fn lighting(main: &str) -> ShaderSource {
    ShaderSource::new(
        stage(include_str!("../shader/fullscreen.vert")),
        format!("{}\n{}\n{}", VERSION, LIGHTING_COMMON, main),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_starts_with_the_version_line() {
        for shader in BuiltinShader::ALL {
            let source = shader.source();
            assert!(source.vertex.starts_with("#version 410 core"), "{:?}", shader);
            assert!(source.fragment.starts_with("#version 410 core"), "{:?}", shader);
        }
    }

    #[test]
    fn only_the_cube_pass_has_a_geometry_stage() {
        for shader in BuiltinShader::ALL {
            let has_geometry = shader.source().geometry.is_some();
            assert_eq!(has_geometry, shader == BuiltinShader::ShadowCube);
        }
        let geometry = BuiltinShader::ShadowCube.source().geometry.unwrap();
        assert!(geometry.contains("shadowMatrices[6]"));
    }

    #[test]
    fn lighting_shaders_share_the_common_block() {
        let source = BuiltinShader::SpotShadow.source();
        assert!(source.fragment.contains("float cone(vec3 travel)"));
        assert!(source.fragment.contains("uniform sampler2D shadowMap"));
    }
}
