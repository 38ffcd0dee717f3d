/// GLSL stage sources of one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub geometry: Option<String>,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            geometry: None,
            fragment: fragment.into(),
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<String>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }
}

/// User shader that can override the built-in geometry pass programs.
/// Loading is a no-op; the asset counts as loaded once both mandatory
/// stages have source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderAsset {
    pub source: ShaderSource,
}

impl ShaderAsset {
    pub fn new(source: ShaderSource) -> Self {
        Self { source }
    }

    pub fn loaded(&self) -> bool {
        !self.source.vertex.is_empty() && !self.source.fragment.is_empty()
    }
}
