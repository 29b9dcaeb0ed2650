use thiserror::Error;

/// Errors raised while loading a scene. All of these are fatal at load
/// time; no render begins with a partially-parsed scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("object references unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("scene file has no camera record")]
    MissingCamera,

    #[error("failed to load mesh `{path}`: {source}")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },

    #[error("mesh `{0}` contains no triangles")]
    EmptyMesh(String),
}

impl SceneError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SceneError::Parse {
            line,
            message: message.into(),
        }
    }
}
