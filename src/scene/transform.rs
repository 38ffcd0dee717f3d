use glam::{Mat4, Vec3};

/// Local transform of an object, kept as three independently accumulated
/// matrices. They are only fused when the world matrix is computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Mat4,
    rotation: Mat4,
    scale: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Mat4::IDENTITY,
        rotation: Mat4::IDENTITY,
        scale: Mat4::IDENTITY,
    };

    pub fn translate(&mut self, delta: Vec3) {
        self.translation = Mat4::from_translation(delta) * self.translation;
    }

    /// Rotates by `angle` radians around `axis`. A zero axis leaves the
    /// rotation untouched.
    pub fn rotate(&mut self, angle: f32, axis: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            log::trace!("Ignoring rotation around a zero axis");
            return;
        };
        self.rotation = Mat4::from_axis_angle(axis, angle) * self.rotation;
    }

    pub fn scale(&mut self, delta: Vec3) {
        self.scale = Mat4::from_scale(delta) * self.scale;
    }

    pub fn reset_translation(&mut self) {
        self.translation = Mat4::IDENTITY;
    }

    pub fn reset_rotation(&mut self) {
        self.rotation = Mat4::IDENTITY;
    }

    pub fn reset_scale(&mut self) {
        self.scale = Mat4::IDENTITY;
    }

    pub fn translation_matrix(&self) -> Mat4 {
        self.translation
    }

    pub fn rotation_matrix(&self) -> Mat4 {
        self.rotation
    }

    pub fn scale_matrix(&self) -> Mat4 {
        self.scale
    }

    /// `translate * rotate * scale`
    pub fn local_matrix(&self) -> Mat4 {
        self.translation * self.rotation * self.scale
    }
}

/// World-space outputs derived from the hierarchy each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform {
    pub model: Mat4,
    pub position: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub forward: Vec3,
}

impl WorldTransform {
    /// Directions are left unnormalized; consumers normalize as needed.
    pub fn from_model(model: Mat4) -> Self {
        let position = model.transform_point3(Vec3::ZERO);
        let up = model.transform_vector3(Vec3::Y);
        let right = model.transform_vector3(Vec3::X);
        Self {
            model,
            position,
            up,
            right,
            forward: up.cross(right),
        }
    }
}
