use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque id of a device resource created by a [`GpuBackend`](super::GpuBackend).
pub struct Handle<T>(u32, PhantomData<fn() -> T>);

// Manual impls: derives would demand the same traits of the marker type.
impl<T> Copy for Handle<T> {}
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl<T> Handle<T> {
    pub fn new(id: u32) -> Self {
        Handle(id, PhantomData)
    }

    pub fn id(self) -> u32 {
        self.0
    }
}

/// Uploaded vertex data.
pub enum GpuMesh {}
/// 2D, cube or depth texture.
pub enum GpuTexture {}
/// Linked shader program.
pub enum GpuProgram {}
/// Framebuffer object.
pub enum GpuTarget {}

pub type MeshId = Handle<GpuMesh>;
pub type TextureId = Handle<GpuTexture>;
pub type ProgramId = Handle<GpuProgram>;
pub type TargetId = Handle<GpuTarget>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_copy_without_bounds_on_marker() {
        let h1: MeshId = Handle::new(5);
        let h2 = h1;
        assert_eq!(h1.id(), h2.id());
        assert_eq!(h1, h2);
    }
}
