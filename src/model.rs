use serde::{Deserialize, Serialize};

// --- Wire representation ---
//
// The engine consumes and produces the same JSON structure the editor saves
// under the `.pats` extension. Geometry, display names and the diagram title
// carry no simulation semantics; they are kept on the DTOs so a step returns
// them untouched.

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetriNetDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub places: Vec<PlaceDTO>,
    pub transitions: Vec<TransitionDTO>,
    pub arcs: Vec<ArcDTO>,
    /// When set, a step with two or more enabled transitions pauses for user
    /// arbitration instead of picking one at random.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deterministic_mode: Option<bool>,
}

impl PetriNetDTO {
    pub fn is_deterministic(&self) -> bool {
        self.deterministic_mode.unwrap_or(false)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDTO {
    pub id: String,
    pub tokens: i64,
    #[serde(default)]
    pub bounded: bool,
    /// Only meaningful when `bounded`; ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransitionDTO {
    pub id: String,
    /// Ignored on input; set by the engine on output.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub arc_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArcDTO {
    pub id: String,
    /// "REGULAR", "INHIBITOR" or "BIDIRECTIONAL".
    #[serde(rename = "type")]
    pub arc_type: String,
    pub incoming_id: String,
    pub outgoing_id: String,
}

// --- Geometry ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}
