use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::DecodeError;

/// Where an asset's encoded data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Bytes(Arc<[u8]>),
    Path(PathBuf),
}

impl AssetSource {
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        AssetSource::Bytes(Arc::from(data.into()))
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        AssetSource::Path(path.into())
    }

    pub fn read(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        match self {
            AssetSource::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            AssetSource::Path(path) => Ok(Cow::Owned(std::fs::read(path)?)),
        }
    }
}
