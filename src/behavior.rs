use crate::errors::{EngineError, Result};
use crate::input::Input;
use crate::scene::{ObjectId, Scene, Transform};

/// Per-object script hooks driven by the application loop.
///
/// `start` runs once after the object's scene finished loading its assets,
/// `update` runs once per frame after the frame was presented.
pub trait Behavior {
    fn start(&mut self, _ctx: &mut BehaviorContext<'_>) {}

    fn update(&mut self, ctx: &mut BehaviorContext<'_>);
}

/// Requests a behavior can make of the application loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrameRequests {
    pub exit: bool,
    pub scene: Option<String>,
}

pub struct BehaviorContext<'a> {
    pub scene: &'a mut Scene,
    pub object: ObjectId,
    pub input: &'a mut Input,
    pub time: f64,
    pub delta_time: f64,
    pub(crate) requests: &'a mut FrameRequests,
}

impl<'a> BehaviorContext<'a> {
    pub fn transform_mut(&mut self) -> Result<hecs::RefMut<'_, Transform>> {
        self.scene.transform_mut(self.object)
    }

    /// Runs `f` against the object's own transform.
    pub fn with_transform(&mut self, f: impl FnOnce(&mut Transform)) -> Result<()> {
        let mut transform = self.transform_mut()?;
        f(&mut *transform);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<ObjectId> {
        self.scene
            .object(name)
            .ok_or(EngineError::NoSuchObject)
    }

    /// Stops the application after the current frame.
    pub fn request_exit(&mut self) {
        self.requests.exit = true;
    }

    /// Switches the active scene after the current frame.
    pub fn request_scene(&mut self, name: impl Into<String>) {
        self.requests.scene = Some(name.into());
    }
}
