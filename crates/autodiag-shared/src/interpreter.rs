//! Response interpreter: turns a free-form assistant reply into a
//! narrative plus an optional visual context.
//!
//! Strategies run in a fixed order and the first one that produces a
//! result wins:
//! 1. the whole reply is a JSON object
//! 2. a fenced code block holds JSON
//! 3. an inline `{...}` span mentions `"visual_context"`
//! 4. keyword inference over plain prose
//!
//! A failed parse is never an error, it just moves on to the next strategy.
//! When nothing is found the raw text comes back untouched.

use crate::keywords::infer_visual_context;
use crate::visual_context::{ExtractedContext, VisualContext};
use crate::zones::{legacy_category_for, LegacyCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

/// First fenced block, optionally tagged `json`
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").unwrap());

/// Widest `{ ... "visual_context" ... }` span
static INLINE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{[\s\S]*"visual_context"[\s\S]*\}"#).unwrap());

/// Which strategy produced an [`InterpretationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    WholeJson,
    FencedBlock,
    InlineObject,
    Keywords,
    /// Nothing extracted, narrative is the raw reply
    Raw,
}

/// Narrative text and optional visual context for one assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_context: Option<VisualContext>,
    pub strategy: Strategy,
}

impl InterpretationResult {
    fn raw(text: &str) -> Self {
        Self {
            narrative: text.to_string(),
            visual_context: None,
            strategy: Strategy::Raw,
        }
    }

    /// Legacy category of the highlighted zone, if any
    pub fn legacy_category(&self) -> Option<LegacyCategory> {
        legacy_category_for(
            self.visual_context
                .as_ref()
                .and_then(|ctx| ctx.highlight_zone_id),
        )
    }
}

/// Interpret an assistant reply. Pure and infallible.
pub fn interpret(raw_text: &str) -> InterpretationResult {
    debug!(
        "Interpreting reply ({} chars): {}",
        raw_text.len(),
        preview(raw_text)
    );

    if let Some(result) = from_whole_json(raw_text) {
        return result;
    }
    if let Some(result) = from_fenced_block(raw_text) {
        return result;
    }
    if let Some(result) = from_inline_object(raw_text) {
        return result;
    }

    match infer_visual_context(raw_text) {
        Some(ctx) => {
            debug!("Inferred visual context from keywords: {:?}", ctx);
            InterpretationResult {
                narrative: raw_text.to_string(),
                visual_context: Some(ctx),
                strategy: Strategy::Keywords,
            }
        }
        None => {
            debug!("No structure found, returning raw text");
            InterpretationResult::raw(raw_text)
        }
    }
}

fn from_whole_json(raw_text: &str) -> Option<InterpretationResult> {
    let parsed: Value = match serde_json::from_str(raw_text) {
        Ok(v) => v,
        Err(e) => {
            debug!("Not pure JSON ({}), trying other strategies", e);
            return None;
        }
    };

    if !(parsed.is_object() || parsed.is_array()) {
        debug!("Reply parsed as a JSON scalar, ignoring");
        return None;
    }

    debug!("Parsed reply as pure JSON");
    let narrative = first_text_field(&parsed, &["response", "text", "message"])
        .unwrap_or(raw_text)
        .to_string();

    Some(InterpretationResult {
        narrative,
        visual_context: ExtractedContext::from_value(&parsed).into_visual_context(),
        strategy: Strategy::WholeJson,
    })
}

fn from_fenced_block(raw_text: &str) -> Option<InterpretationResult> {
    let caps = FENCED_BLOCK.captures(raw_text)?;
    let block = caps.get(0)?;
    let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            debug!("Fenced block is not JSON: {}", e);
            return None;
        }
    };

    debug!("Found JSON in fenced block");
    let residual = format!(
        "{}{}",
        &raw_text[..block.start()],
        &raw_text[block.end()..]
    );
    let residual = residual.trim();

    let narrative = if residual.is_empty() {
        first_text_field(&parsed, &["response", "text"])
            .unwrap_or(raw_text)
            .to_string()
    } else {
        residual.to_string()
    };

    Some(InterpretationResult {
        narrative,
        visual_context: ExtractedContext::from_value(&parsed).into_visual_context(),
        strategy: Strategy::FencedBlock,
    })
}

fn from_inline_object(raw_text: &str) -> Option<InterpretationResult> {
    let span = INLINE_OBJECT.find(raw_text)?;

    let parsed: Value = match serde_json::from_str(span.as_str()) {
        Ok(v) => v,
        Err(e) => {
            debug!("Inline visual_context span is not JSON: {}", e);
            return None;
        }
    };

    debug!("Found inline JSON with visual_context");
    let before = raw_text[..span.start()].trim();
    let after = raw_text[span.end()..].trim();
    let combined = [before, after]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let narrative = if combined.is_empty() {
        first_text_field(&parsed, &["response"])
            .unwrap_or(raw_text)
            .to_string()
    } else {
        combined
    };

    Some(InterpretationResult {
        narrative,
        visual_context: ExtractedContext::from_value(&parsed).into_visual_context(),
        strategy: Strategy::InlineObject,
    })
}

/// First of `keys` holding a non-empty string
fn first_text_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::{CarView, HighlightZone};

    #[test]
    fn test_whole_json_prefers_response_then_text_then_message() {
        let r = interpret(r#"{"text": "via text", "message": "via message"}"#);
        assert_eq!(r.narrative, "via text");
        assert_eq!(r.strategy, Strategy::WholeJson);

        let r = interpret(r#"{"response": "", "message": "via message"}"#);
        assert_eq!(r.narrative, "via message");
    }

    #[test]
    fn test_whole_json_without_narrative_uses_raw() {
        let raw = r#"{"highlight_zone_id": "zone_headlight"}"#;
        let r = interpret(raw);
        assert_eq!(r.narrative, raw);
        assert_eq!(
            r.visual_context.unwrap().highlight_zone_id,
            Some(HighlightZone::Headlight)
        );
    }

    #[test]
    fn test_json_array_stops_cascade() {
        let raw = r#"["o motor esquenta"]"#;
        let r = interpret(raw);
        assert_eq!(r.strategy, Strategy::WholeJson);
        assert_eq!(r.narrative, raw);
        assert!(r.visual_context.is_none());
    }

    #[test]
    fn test_json_scalar_falls_through_to_keywords() {
        let r = interpret(r#""verifique a bateria""#);
        assert_eq!(r.strategy, Strategy::Keywords);
        assert_eq!(
            r.visual_context.unwrap().highlight_zone_id,
            Some(HighlightZone::Battery)
        );
    }

    #[test]
    fn test_fenced_block_only_uses_response_field() {
        let raw = "```json\n{\"response\": \"Troque o filtro.\", \"highlight_zone_id\": \"zone_air_filter\"}\n```";
        let r = interpret(raw);
        assert_eq!(r.strategy, Strategy::FencedBlock);
        assert_eq!(r.narrative, "Troque o filtro.");
        assert_eq!(
            r.visual_context.unwrap().highlight_zone_id,
            Some(HighlightZone::AirFilter)
        );
    }

    #[test]
    fn test_untagged_fence() {
        let raw = "Veja:\n```\n{\"visual_context\": {\"car_view_needed\": \"frontal\"}}\n```\nFim.";
        let r = interpret(raw);
        assert_eq!(r.strategy, Strategy::FencedBlock);
        assert_eq!(r.narrative, "Veja:\n\nFim.");
        assert_eq!(r.visual_context.unwrap().car_view_needed, CarView::Frontal);
    }

    #[test]
    fn test_broken_fence_falls_through_to_inline() {
        let raw = "```json\nnot json\n```\n{\"visual_context\": {\"highlight_zone_id\": \"zone_exhaust\"}}";
        let r = interpret(raw);
        assert_eq!(r.strategy, Strategy::InlineObject);
        assert_eq!(r.narrative, "```json\nnot json\n```");
        assert_eq!(
            r.visual_context.unwrap().highlight_zone_id,
            Some(HighlightZone::Exhaust)
        );
    }

    #[test]
    fn test_whitespace_padded_json_is_whole_json() {
        let raw = "  {\"response\": \"Pneu furado.\", \"visual_context\": {\"highlight_zone_id\": \"zone_wheel_rear_right\"}}\n";
        let r = interpret(raw);
        assert_eq!(r.strategy, Strategy::WholeJson);
        assert_eq!(r.narrative, "Pneu furado.");
    }

    #[test]
    fn test_legacy_category_of_result() {
        let r = interpret("Problema no silenciador.");
        assert_eq!(r.legacy_category(), Some(LegacyCategory::Escapamento));
        assert_eq!(interpret("Oi").legacy_category(), None);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "ç".repeat(300);
        assert_eq!(preview(&text).chars().count(), 200);
    }
}
