use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::render::load_image;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

impl ThumbnailRequest {
    /// Only the final path component of `file_name` is kept.
    pub fn with_size(width: u32, height: u32, file_name: &str) -> Result<Self> {
        let trimmed = file_name.trim();
        let file_name = Path::new(trimmed)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ServiceError::Parse {
                field: "thumbnail name",
                input: trimmed.to_string(),
                reason: "expected a file name such as thumbnail.jpg".to_string(),
            })?
            .to_string();

        Ok(Self {
            width,
            height,
            file_name,
        })
    }
}

/// Parses one thumbnail side; zero and negative values are rejected.
pub fn parse_dimension(field: &'static str, input: &str) -> Result<u32> {
    let parse_error = |reason: String| ServiceError::Parse {
        field,
        input: input.trim().to_string(),
        reason,
    };
    match input.trim().parse::<u32>() {
        Ok(0) => Err(parse_error("must be greater than zero".to_string())),
        Ok(value) => Ok(value),
        Err(err) => Err(parse_error(err.to_string())),
    }
}

/// Resizes `image_path` to exactly the requested size, ignoring aspect ratio, and
/// writes it into `output_dir`.
pub fn create_thumbnail(
    image_path: &Path,
    request: &ThumbnailRequest,
    output_dir: &Path,
) -> Result<PathBuf> {
    let image = load_image(image_path)?;
    let thumbnail = image.resize_exact(request.width, request.height, FilterType::Lanczos3);

    fs::create_dir_all(output_dir).map_err(|err| ServiceError::render(output_dir, err))?;
    let output_path = output_dir.join(&request.file_name);
    // JPEG has no alpha channel, so every thumbnail is flattened to RGB.
    DynamicImage::ImageRgb8(thumbnail.to_rgb8())
        .save(&output_path)
        .map_err(|err| ServiceError::render(&output_path, err))?;

    info!(
        "Thumbnail {}x{} written to {}",
        request.width,
        request.height,
        output_path.display()
    );
    Ok(output_path)
}
