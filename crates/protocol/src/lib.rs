use serde::{Deserialize, Serialize};

/// Form-encoded body of a combination submission.
///
/// Both fields are optional on the wire so that a missing field reaches the handler
/// (and becomes a 400) instead of failing inside the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombineForm {
    #[serde(default)]
    pub elem1: Option<String>,
    #[serde(default)]
    pub elem2: Option<String>,
}

impl CombineForm {
    /// Both element names, if present and non-empty.
    pub fn pair(&self) -> Option<(&str, &str)> {
        let a = self.elem1.as_deref().filter(|s| !s.is_empty())?;
        let b = self.elem2.as_deref().filter(|s| !s.is_empty())?;
        Some((a, b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineResponse {
    #[serde(rename = "newResource")]
    pub new_resource: NewResource,
}

impl CombineResponse {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            new_resource: NewResource {
                name: name.into(),
                emoji: emoji.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A drag-drop gesture forwarded by the browser, with the measured board size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropRequest {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropAck {
    pub queued: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRequest {
    pub name: String,
    pub emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementView {
    pub name: String,
    pub emoji: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub placed: Option<ElementView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rev: u64,
    pub card_size: f64,
    pub elements: Vec<ElementView>,
}

pub mod routes {
    pub const HEALTH: &str = "/health";
    pub const COMBINE: &str = "/api/combine";
    pub const BOARD: &str = "/api/board";
    pub const BOARD_PLACE: &str = "/api/board/place";
    pub const DROP: &str = "/api/drop";
}
