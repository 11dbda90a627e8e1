#![allow(dead_code)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::Router;
use image::{Rgb, RgbImage};
use image_service::{
    AnalysisResult, BoundingRect, Caption, DetectedObject, ImageAnalyzer, ServiceError, Settings,
    Tag,
};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn settings_in(dir: &Path) -> Settings {
    Settings {
        cognitive_services_endpoint: "http://127.0.0.1:9".to_string(),
        cognitive_service_key: "test-key".to_string(),
        bounding_box_directory: dir.join("BoundingBoxes"),
        thumbnail_directory: dir.join("Thumbnails"),
        download_path: dir.join("downloaded_image.jpg"),
        font_path: None,
    }
}

pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    RgbImage::from_pixel(width, height, Rgb([240, 240, 240]))
        .save(path)
        .unwrap();
    path.to_path_buf()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    RgbImage::from_pixel(width, height, Rgb([0, 128, 255]))
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        captions: vec![
            Caption {
                text: "a dog in a park".to_string(),
                confidence: 0.8765,
            },
            Caption {
                text: "a dog on grass".to_string(),
                confidence: 0.5,
            },
        ],
        tags: vec![
            Tag {
                name: "dog".to_string(),
                confidence: 0.99,
            },
            Tag {
                name: "grass".to_string(),
                confidence: 0.9,
            },
            Tag {
                name: "outdoor".to_string(),
                confidence: 0.75,
            },
        ],
        objects: vec![DetectedObject {
            label: "dog".to_string(),
            confidence: 0.62,
            rectangle: BoundingRect::new(5, 5, 20, 20),
        }],
    }
}

/// Returns a canned result, or an analysis failure when constructed with `None`.
pub struct StubAnalyzer {
    result: Option<AnalysisResult>,
}

impl StubAnalyzer {
    pub fn returning(result: AnalysisResult) -> Self {
        Self {
            result: Some(result),
        }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl ImageAnalyzer for StubAnalyzer {
    async fn analyze(&self, _image: &Path) -> Result<AnalysisResult, ServiceError> {
        self.result
            .clone()
            .ok_or_else(|| ServiceError::Analysis("quota exceeded".to_string()))
    }
}
