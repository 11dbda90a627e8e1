use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to download {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("image analysis failed: {0}")]
    Analysis(String),
    #[error("failed to render {}: {reason}", .path.display())]
    Render { path: PathBuf, reason: String },
    #[error("invalid {field} {input:?}: {reason}")]
    Parse {
        field: &'static str,
        input: String,
        reason: String,
    },
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServiceError {
    pub(crate) fn render(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Render {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
