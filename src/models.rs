use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Presentation styles offered by the generator UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Style {
    #[default]
    Photorealistic,
    #[serde(rename = "Digital Art")]
    DigitalArt,
    Anime,
    #[serde(rename = "3D Render")]
    Render3d,
    Cinematic,
    Cyberpunk,
    Watercolor,
}

impl Style {
    /// Lenient parse of the wire label; unknown styles fall back to the default.
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Digital Art") => Style::DigitalArt,
            Some("Anime") => Style::Anime,
            Some("3D Render") => Style::Render3d,
            Some("Cinematic") => Style::Cinematic,
            Some("Cyberpunk") => Style::Cyberpunk,
            Some("Watercolor") => Style::Watercolor,
            _ => Style::Photorealistic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Style::Photorealistic => "Photorealistic",
            Style::DigitalArt => "Digital Art",
            Style::Anime => "Anime",
            Style::Render3d => "3D Render",
            Style::Cinematic => "Cinematic",
            Style::Cyberpunk => "Cyberpunk",
            Style::Watercolor => "Watercolor",
        }
    }
}

/// Supported width:height ratios. Unknown or missing ratios collapse to 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("16:9") => AspectRatio::Wide,
            Some("9:16") => AspectRatio::Tall,
            Some("4:3") => AspectRatio::Classic,
            Some("3:4") => AspectRatio::Portrait,
            _ => AspectRatio::Square,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Classic => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }

    /// Pixel dimensions used for locally rendered placeholders.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Wide => (1280, 720),
            AspectRatio::Tall => (720, 1280),
            AspectRatio::Classic => (1200, 900),
            AspectRatio::Portrait => (900, 1200),
        }
    }
}

/// A validated generation request as the service consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: Style,
    pub ratio: AspectRatio,
}

/// Wire body of `POST /api/generate-image`. All fields are lenient so that a
/// missing prompt surfaces as a 400 from the service rather than a 422 from
/// the JSON extractor.
#[derive(Debug, Deserialize)]
pub struct GenerateImageBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub ratio: Option<String>,
}

impl GenerateImageBody {
    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.unwrap_or_default(),
            style: Style::parse(self.style.as_deref()),
            ratio: AspectRatio::parse(self.ratio.as_deref()),
        }
    }
}

/// Outcome of one submission, immutable once built. `image_data_url` is a
/// self-contained data URL so entries render and persist without any backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub prompt: String,
    pub style: Style,
    pub ratio: AspectRatio,
    pub image_data_url: String,
    pub created_at: DateTime<Utc>,
    pub is_fallback: bool,
}

/// A history record. Identity is a random UUID rather than the creation
/// timestamp so two results in the same millisecond cannot collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub result: GenerationResult,
}

impl HistoryEntry {
    pub fn new(result: GenerationResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            result,
        }
    }
}
