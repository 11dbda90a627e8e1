/// Everything the vision service reported for one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub captions: Vec<Caption>,
    pub tags: Vec<Tag>,
    pub objects: Vec<DetectedObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f64,
    pub rectangle: BoundingRect,
}

/// Pixel rectangle with its origin at the top-left corner of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl BoundingRect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Formats a `0.0..=1.0` confidence as a percentage with two decimals.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}
