//! Visual context: which view to show, which zone to highlight, which part.
//!
//! The assistant may put these fields under a nested `visual_context`
//! object or directly at the top level of its JSON. Both shapes are read
//! through [`ExtractedContext::from_value`].

use crate::zones::{CarView, HighlightZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const FIELD_PART_NAME: &str = "specific_part_name";
const FIELD_VIEW: &str = "car_view_needed";
const FIELD_ZONE: &str = "highlight_zone_id";

/// Structured display hint recovered from an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisualContext {
    /// Implicated component, empty when unknown
    #[serde(default)]
    pub specific_part_name: String,
    #[serde(default)]
    pub car_view_needed: CarView,
    #[serde(default)]
    pub highlight_zone_id: Option<HighlightZone>,
}

impl VisualContext {
    pub fn new(
        specific_part_name: impl Into<String>,
        car_view_needed: CarView,
        highlight_zone_id: Option<HighlightZone>,
    ) -> Self {
        Self {
            specific_part_name: specific_part_name.into(),
            car_view_needed,
            highlight_zone_id,
        }
    }

    /// Read the three fields from a JSON object, substituting defaults.
    ///
    /// Values outside the view or zone enumerations are treated as missing.
    fn from_fields(obj: &serde_json::Map<String, Value>) -> Self {
        let specific_part_name = obj
            .get(FIELD_PART_NAME)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let car_view_needed = match obj.get(FIELD_VIEW).and_then(|v| v.as_str()) {
            Some(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
                debug!("Unknown car_view_needed '{}', using lateral", raw);
                CarView::Lateral
            }),
            _ => CarView::Lateral,
        };

        let highlight_zone_id = match obj.get(FIELD_ZONE).and_then(|v| v.as_str()) {
            Some(raw) if !raw.is_empty() => match raw.parse::<HighlightZone>() {
                Ok(zone) => Some(zone),
                Err(e) => {
                    debug!("Dropping highlight zone: {}", e);
                    None
                }
            },
            _ => None,
        };

        Self {
            specific_part_name,
            car_view_needed,
            highlight_zone_id,
        }
    }
}

/// Shape of the structured data found in a decoded JSON value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContext {
    /// No visual-context fields at all
    NoStructure,
    /// Fields present directly on the top-level object
    FlatFields(VisualContext),
    /// Fields under a nested `visual_context` object
    NestedVisualContext(VisualContext),
}

impl ExtractedContext {
    /// Classify an arbitrary JSON value.
    ///
    /// A nested `visual_context` object wins over flat fields. Flat fields
    /// count only when at least one of them is a non-empty string.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ExtractedContext::NoStructure;
        };

        if let Some(nested) = obj.get("visual_context").and_then(|v| v.as_object()) {
            return ExtractedContext::NestedVisualContext(VisualContext::from_fields(nested));
        }

        let has_flat_field = [FIELD_PART_NAME, FIELD_VIEW, FIELD_ZONE]
            .iter()
            .any(|key| is_truthy_str(obj.get(*key)));

        if has_flat_field {
            ExtractedContext::FlatFields(VisualContext::from_fields(obj))
        } else {
            ExtractedContext::NoStructure
        }
    }

    pub fn into_visual_context(self) -> Option<VisualContext> {
        match self {
            ExtractedContext::NoStructure => None,
            ExtractedContext::FlatFields(ctx) | ExtractedContext::NestedVisualContext(ctx) => {
                Some(ctx)
            }
        }
    }
}

fn is_truthy_str(value: Option<&Value>) -> bool {
    value
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}
