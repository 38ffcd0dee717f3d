use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while decoding mesh, material or texture sources.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read asset source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed obj data at line {line}: {reason}")]
    Obj { line: usize, reason: String },

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("asset has no source to decode")]
    MissingSource,
}

impl DecodeError {
    pub(crate) fn obj(line: usize, reason: impl Into<String>) -> Self {
        DecodeError::Obj {
            line,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("object '{object}' has an invalid component: {reason}")]
    InvalidComponent { object: String, reason: String },

    #[error(transparent)]
    AssetDecode(#[from] DecodeError),

    #[error("mesh on object '{0}' has no material")]
    MeshNoMaterial(String),

    #[error("render target setup failed: {0}")]
    FramebufferSetup(String),

    #[error("no available shader: {0}")]
    NoAvailableShader(String),

    #[error("no such asset '{0}'")]
    AssetNotFound(String),

    #[error("no such scene '{0}'")]
    SceneNotFound(String),

    #[error("no renderer registered as '{0}'")]
    RendererNotFound(String),

    #[error("object handle does not belong to this scene")]
    NoSuchObject,

    #[error("re-parenting '{0}' would create a cycle")]
    HierarchyCycle(String),

    #[error("asset loader finished without reporting a result")]
    LoaderDisconnected,
}

impl EngineError {
    pub(crate) fn invalid_component(object: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidComponent {
            object: object.into(),
            reason: reason.into(),
        }
    }
}
