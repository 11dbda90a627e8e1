use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::analysis::{format_confidence, AnalysisResult, DetectedObject};
use crate::error::{Result, ServiceError};

pub const BOUNDING_BOX_FILE_NAME: &str = "output_with_bounding_boxes.jpg";

const BORDER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BORDER_WIDTH: u32 = 3;
const LABEL_SCALE: f32 = 16.0;
const JPEG_QUALITY: u8 = 90;

/// Searched in order when `FontPath` is unset or unusable.
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub const MISSING_FONT_WARNING: &str =
    "Warning: no label font found, set FontPath in appsettings.json to label the boxes.";

/// Draws detected objects onto copies of the analyzed image.
pub struct BoundingBoxRenderer {
    output_dir: PathBuf,
    font: Option<FontVec>,
}

impl BoundingBoxRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, font: Option<FontVec>) -> Self {
        Self {
            output_dir: output_dir.into(),
            font,
        }
    }

    /// Loads the label font from `font_path`, then from the usual system font
    /// locations. Boxes are drawn unlabeled when neither yields a usable font.
    pub fn with_font_file(output_dir: impl Into<PathBuf>, font_path: Option<&Path>) -> Self {
        let font = font_path
            .and_then(load_font)
            .or_else(|| SYSTEM_FONT_PATHS.iter().map(Path::new).find_map(load_font));
        if font.is_none() {
            warn!("No label font found, bounding boxes are drawn without labels");
        }
        Self::new(output_dir, font)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(BOUNDING_BOX_FILE_NAME)
    }

    /// Draws `object` on a fresh copy of `image_path` and saves it to [`Self::output_path`].
    ///
    /// Every call writes the same file, so after several objects only the last box remains.
    pub fn draw(&self, image_path: &Path, object: &DetectedObject) -> Result<PathBuf> {
        let mut image = load_image(image_path)?.to_rgb8();

        let rect = object.rectangle;
        for i in 0..BORDER_WIDTH {
            let offset = Rect::at(rect.x - i as i32, rect.y - i as i32)
                .of_size(rect.w.max(1) + 2 * i, rect.h.max(1) + 2 * i);
            draw_hollow_rect_mut(&mut image, offset, BORDER_COLOR);
        }
        if let Some(font) = &self.font {
            draw_text_mut(
                &mut image,
                TEXT_COLOR,
                rect.x,
                rect.y,
                PxScale::from(LABEL_SCALE),
                font,
                &object.label,
            );
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|err| ServiceError::render(&self.output_dir, err))?;
        let output_path = self.output_path();
        save_jpeg(&image, &output_path)?;
        Ok(output_path)
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    if !path.is_file() {
        debug!("Font {} not present", path.display());
        return None;
    }
    match fs::read(path) {
        Ok(data) => match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!("Label font loaded from {}", path.display());
                Some(font)
            }
            Err(err) => {
                warn!("Unable to parse font {}: {}", path.display(), err);
                None
            }
        },
        Err(err) => {
            warn!("Cannot read font {}: {}", path.display(), err);
            None
        }
    }
}

/// Decodes an image, detecting the format from its contents rather than its extension.
pub(crate) fn load_image(path: &Path) -> Result<DynamicImage> {
    let data = fs::read(path).map_err(|err| ServiceError::render(path, err))?;
    image::load_from_memory(&data).map_err(|err| ServiceError::render(path, err))
}

fn save_jpeg(image: &RgbImage, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|err| ServiceError::render(path, err))?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
    image
        .write_with_encoder(encoder)
        .map_err(|err| ServiceError::render(path, err))
}

/// Prints captions and tags.
pub fn write_summary<W: Write>(out: &mut W, result: &AnalysisResult) -> std::io::Result<()> {
    writeln!(out, "Description:")?;
    for caption in &result.captions {
        writeln!(
            out,
            " - {} (Confidence: {})",
            caption.text,
            format_confidence(caption.confidence)
        )?;
    }
    writeln!(out, "Tags:")?;
    for tag in &result.tags {
        writeln!(
            out,
            " - {} (Confidence: {})",
            tag.name,
            format_confidence(tag.confidence)
        )?;
    }
    Ok(())
}

/// Prints the full report and draws every detected object.
///
/// Returns the annotated image path, or `None` when nothing was detected.
pub fn render_report<W: Write>(
    out: &mut W,
    result: &AnalysisResult,
    image_path: &Path,
    renderer: &BoundingBoxRenderer,
) -> Result<Option<PathBuf>> {
    let console = |err| ServiceError::io("<console>", err);

    write_summary(out, result).map_err(console)?;
    if result.objects.is_empty() {
        return Ok(None);
    }

    writeln!(out, "Objects detected:").map_err(console)?;
    if !renderer.has_font() {
        writeln!(out, "{MISSING_FONT_WARNING}").map_err(console)?;
    }
    let mut saved = None;
    for object in &result.objects {
        writeln!(
            out,
            " - {} (Confidence: {})",
            object.label,
            format_confidence(object.confidence)
        )
        .map_err(console)?;

        let path = renderer.draw(image_path, object)?;
        writeln!(out, "Output image saved as {}", path.display()).map_err(console)?;
        saved = Some(path);
    }
    Ok(saved)
}
