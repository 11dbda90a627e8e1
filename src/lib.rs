pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod session;
pub mod thumbnail;
pub mod vision;

use anyhow::Result;

pub use analysis::{AnalysisResult, BoundingRect, Caption, DetectedObject, Tag};
pub use config::Settings;
pub use error::ServiceError;
pub use input::ImageSource;
pub use session::{MenuChoice, Session};
pub use thumbnail::ThumbnailRequest;
pub use vision::{ImageAnalyzer, VisionClient};

pub fn create_vision_client(settings: &Settings) -> Result<VisionClient> {
    VisionClient::new(
        &settings.cognitive_services_endpoint,
        &settings.cognitive_service_key,
    )
}
