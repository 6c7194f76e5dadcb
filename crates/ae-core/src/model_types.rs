use serde::{Deserialize, Serialize};

/// Image model offered by the generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Realistic,
    Artistic,
    Anime,
    Sketch,
    Fantasy,
}

impl ModelType {
    /// Model name for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::Realistic => "Realistic",
            Self::Artistic => "Artistic",
            Self::Anime => "Anime",
            Self::Sketch => "Sketch",
            Self::Fantasy => "Fantasy",
        }
    }

    /// Model ID for API communication
    pub fn id(&self) -> &str {
        match self {
            Self::Realistic => "realistic",
            Self::Artistic => "artistic",
            Self::Anime => "anime",
            Self::Sketch => "sketch",
            Self::Fantasy => "fantasy",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        match self {
            Self::Realistic => "Photographic detail and natural lighting",
            Self::Artistic => "Painterly styles, bold color",
            Self::Anime => "Clean lines and cel shading",
            Self::Sketch => "Pencil and ink drawings",
            Self::Fantasy => "Dreamlike scenes and creatures",
        }
    }

    /// UI icon
    pub fn icon(&self) -> &str {
        match self {
            Self::Realistic => "📷",
            Self::Artistic => "🎨",
            Self::Anime => "🌸",
            Self::Sketch => "✏",
            Self::Fantasy => "🐉",
        }
    }

    /// All available models
    pub fn all() -> [ModelType; 5] {
        [
            Self::Realistic,
            Self::Artistic,
            Self::Anime,
            Self::Sketch,
            Self::Fantasy,
        ]
    }
}

impl Default for ModelType {
    fn default() -> Self {
        Self::Realistic
    }
}

/// Output aspect ratio, sent to the backend as `width_height_ratio`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "4:3",
            Self::Portrait => "3:4",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
        }
    }

    pub fn all() -> [AspectRatio; 5] {
        [
            Self::Square,
            Self::Landscape,
            Self::Portrait,
            Self::Wide,
            Self::Tall,
        ]
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Square
    }
}
