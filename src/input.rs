use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

/// Turns an [`ImageSource`] into a local file that can be analyzed.
///
/// URLs are fetched with a single GET and written to `download_path`, replacing
/// any earlier download.
pub async fn acquire(
    source: &ImageSource,
    http: &reqwest::Client,
    download_path: &Path,
) -> Result<PathBuf> {
    match source {
        ImageSource::File(path) => {
            let is_file = tokio::fs::metadata(path)
                .await
                .map(|metadata| metadata.is_file())
                .unwrap_or(false);
            if is_file {
                Ok(path.clone())
            } else {
                debug!(path = %path.display(), "image file does not exist");
                Err(ServiceError::NotFound(path.clone()))
            }
        }
        ImageSource::Url(url) => {
            download(url, http, download_path).await?;
            Ok(download_path.to_path_buf())
        }
    }
}

async fn download(url: &str, http: &reqwest::Client, download_path: &Path) -> Result<()> {
    let network = |source| ServiceError::Network {
        url: url.to_string(),
        source,
    };

    let response = http
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(network)?;
    let bytes = response.bytes().await.map_err(network)?;

    if let Some(parent) = download_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| ServiceError::io(parent, err))?;
    }
    tokio::fs::write(download_path, &bytes)
        .await
        .map_err(|err| ServiceError::io(download_path, err))?;

    info!(url, bytes = bytes.len(), "image downloaded");
    Ok(())
}
