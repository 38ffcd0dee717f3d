pub mod app;
pub mod asset;
pub mod behavior;
pub mod context;
pub mod errors;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use app::{App, HeadlessPlatform, Platform, ScriptedEvent};
pub use behavior::{Behavior, BehaviorContext};
pub use context::Context;
pub use errors::{DecodeError, EngineError, Result};
pub use input::{AxisMeta, CursorMode, Input, MouseAxis};
pub use renderer::{DeferredRenderer, RendererRegistry, SceneRenderer};
pub use settings::EngineSettings;

/// Installs the process-wide logger. `RUST_LOG` overrides the default
/// `info` filter. Calling it more than once is harmless.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
