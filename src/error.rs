use std::{io, path::PathBuf};

/// Everything that can go wrong between requesting the asset and handing the
/// decoded scene to the animation controller. Every variant is terminal for the
/// load attempt that produced it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot load from '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("network error fetching '{url}': {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from '{url}'")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid glTF document: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("buffer {index} could not be resolved: {reason}")]
    MissingBuffer { index: usize, reason: String },

    #[error("primitive {primitive} of mesh '{mesh}' is Draco-compressed but no decoder is configured")]
    DecoderUnavailable { mesh: String, primitive: usize },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("loader exited without a result")]
    Interrupted,

    #[error("loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        LoadError::Network {
            url: url.into(),
            source,
        }
    }

    pub fn decode(msg: impl ToString) -> Self {
        LoadError::Decode(msg.to_string())
    }
}
