//! Client for the Azure Computer Vision `analyze` operation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::{AnalysisResult, BoundingRect, Caption, DetectedObject, Tag};
use crate::error::{Result, ServiceError};

const ANALYZE_PATH: &str = "vision/v3.2/analyze";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualFeature {
    Description,
    Tags,
    Objects,
}

impl VisualFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualFeature::Description => "Description",
            VisualFeature::Tags => "Tags",
            VisualFeature::Objects => "Objects",
        }
    }
}

pub const REQUESTED_FEATURES: &[VisualFeature] = &[
    VisualFeature::Description,
    VisualFeature::Tags,
    VisualFeature::Objects,
];

#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &Path) -> Result<AnalysisResult>;
}

pub struct VisionClient {
    client: Client,
    endpoint: String,
    key: String,
}

impl VisionClient {
    pub fn new(endpoint: &str, key: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!("Vision client configured: endpoint={}", endpoint);

        Ok(Self {
            client,
            endpoint,
            key: key.to_string(),
        })
    }

    pub async fn analyze_bytes(&self, image: Vec<u8>) -> Result<AnalysisResult> {
        let features = REQUESTED_FEATURES.iter().map(VisualFeature::as_str).join(",");
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, ANALYZE_PATH))
            .query(&[("visualFeatures", features.as_str())])
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|err| ServiceError::Analysis(format!("request failed: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ServiceError::Analysis(format!("failed to read response: {err}")))?;

        if !status.is_success() {
            return Err(ServiceError::Analysis(describe_failure(status, &body)));
        }

        let wire: AnalyzeResponse = serde_json::from_str(&body)
            .map_err(|err| ServiceError::Analysis(format!("unexpected response body: {err}")))?;
        debug!(
            request_id = wire.request_id.as_deref().unwrap_or("-"),
            model_version = wire.model_version.as_deref().unwrap_or("-"),
            "analysis response received"
        );
        if let Some(metadata) = &wire.metadata {
            debug!(
                width = metadata.width,
                height = metadata.height,
                format = metadata.format.as_deref().unwrap_or("-"),
                "analyzed image metadata"
            );
        }

        let result = AnalysisResult::from(wire);
        debug!(
            tags = %result.tags.iter().map(|tag| &tag.name).join(", "),
            objects = result.objects.len(),
            "analysis decoded"
        );
        Ok(result)
    }
}

#[async_trait]
impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, image: &Path) -> Result<AnalysisResult> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|err| ServiceError::io(image, err))?;
        self.analyze_bytes(bytes).await
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => format!("{status}: {} ({})", error.message, error.code),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

// --- wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    description: Option<WireDescription>,
    #[serde(default)]
    tags: Vec<WireTag>,
    #[serde(default)]
    objects: Vec<WireObject>,
    request_id: Option<String>,
    model_version: Option<String>,
    metadata: Option<WireMetadata>,
}

#[derive(Debug, Deserialize)]
struct WireDescription {
    #[serde(default)]
    captions: Vec<WireCaption>,
}

#[derive(Debug, Deserialize)]
struct WireCaption {
    text: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    name: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct WireObject {
    rectangle: WireRectangle,
    object: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct WireRectangle {
    x: i32,
    y: i32,
    w: u32,
    h: u32,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    width: u32,
    height: u32,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl From<AnalyzeResponse> for AnalysisResult {
    fn from(wire: AnalyzeResponse) -> Self {
        let captions = wire
            .description
            .map(|description| description.captions)
            .unwrap_or_default()
            .into_iter()
            .map(|caption| Caption {
                text: caption.text,
                confidence: caption.confidence,
            })
            .collect();
        let tags = wire
            .tags
            .into_iter()
            .map(|tag| Tag {
                name: tag.name,
                confidence: tag.confidence,
            })
            .collect();
        let objects = wire
            .objects
            .into_iter()
            .map(|object| DetectedObject {
                label: object.object,
                confidence: object.confidence,
                rectangle: BoundingRect::new(
                    object.rectangle.x,
                    object.rectangle.y,
                    object.rectangle.w,
                    object.rectangle.h,
                ),
            })
            .collect();

        AnalysisResult {
            captions,
            tags,
            objects,
        }
    }
}
