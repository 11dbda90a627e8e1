//! `appsettings.json` loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";

fn default_bounding_box_directory() -> PathBuf {
    PathBuf::from("BoundingBoxes")
}

fn default_thumbnail_directory() -> PathBuf {
    PathBuf::from("Thumbnails")
}

fn default_download_path() -> PathBuf {
    PathBuf::from("downloaded_image.jpg")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    pub cognitive_services_endpoint: String,
    pub cognitive_service_key: String,
    #[serde(default = "default_bounding_box_directory")]
    pub bounding_box_directory: PathBuf,
    #[serde(default = "default_thumbnail_directory")]
    pub thumbnail_directory: PathBuf,
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json).context("malformed settings")?;
        if settings.cognitive_services_endpoint.trim().is_empty() {
            anyhow::bail!("CognitiveServicesEndpoint must not be empty");
        }
        if settings.cognitive_service_key.trim().is_empty() {
            anyhow::bail!("CognitiveServiceKey must not be empty");
        }
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Joins every relative path onto `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        let join = |path: PathBuf| if path.is_absolute() { path } else { base.join(path) };
        self.bounding_box_directory = join(self.bounding_box_directory);
        self.thumbnail_directory = join(self.thumbnail_directory);
        self.download_path = join(self.download_path);
        self.font_path = self.font_path.map(join);
        self
    }
}
