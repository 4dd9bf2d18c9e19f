//! Keyword inference for replies that carry no JSON at all.
//!
//! The zone table is ordered and first match wins. Several patterns overlap
//! (generic "freio" is tried before "freio traseiro", the front-wheel
//! pattern before the rear-wheel one), so the order below is part of the
//! behavior and must not be rearranged.

use crate::visual_context::VisualContext;
use crate::zones::{CarView, HighlightZone};
use regex::Regex;
use std::sync::LazyLock;

/// Lowercase keywords that select the engine-bay view
const MOTOR_VIEW_KEYWORDS: &[&str] = &["motor", "capô", "compartimento"];

/// Lowercase keywords that select the underside view
const INFERIOR_VIEW_KEYWORDS: &[&str] = &["inferior", "chassis", "embaixo"];

/// Ordered (pattern, zone) pairs, case-insensitive
pub static ZONE_PATTERNS: LazyLock<Vec<(Regex, HighlightZone)>> = LazyLock::new(|| {
    [
        (r"radiador", HighlightZone::Radiator),
        (r"bateria", HighlightZone::Battery),
        (r"alternador", HighlightZone::Alternator),
        (r"filtro\s*(?:de\s*)?ar", HighlightZone::AirFilter),
        (r"vela|ignição", HighlightZone::SparkPlugs),
        (r"motor|bloco", HighlightZone::EngineBlock),
        (r"freio\s*(?:dianteiro)?|pastilha", HighlightZone::BrakeFront),
        (r"freio\s*traseiro", HighlightZone::BrakeRear),
        (
            r"roda\s*(?:dianteira)?(?:\s*esquerda)?|pneu\s*(?:dianteiro)?",
            HighlightZone::WheelFrontLeft,
        ),
        (r"roda\s*(?:dianteira)?(?:\s*direita)?", HighlightZone::WheelFrontRight),
        (r"roda\s*traseira\s*(?:esquerda)?|pneu\s*traseiro", HighlightZone::WheelRearLeft),
        (r"suspensão\s*dianteira", HighlightZone::SuspensionFront),
        (r"suspensão\s*traseira", HighlightZone::SuspensionRear),
        (r"escapamento|escape", HighlightZone::Exhaust),
        (r"catalisador", HighlightZone::Catalytic),
        (r"silenciador", HighlightZone::Muffler),
        (r"óleo|cárter", HighlightZone::OilPan),
        (r"câmbio|transmissão", HighlightZone::Transmission),
        (r"tanque|combustível", HighlightZone::FuelTank),
        (r"farol", HighlightZone::Headlight),
        (r"lanterna", HighlightZone::Taillight),
    ]
    .into_iter()
    .map(|(pattern, zone)| (Regex::new(&format!("(?i){}", pattern)).unwrap(), zone))
    .collect()
});

/// Pick the diagram view from keywords in the text. Defaults to lateral.
pub fn detect_view(text: &str) -> CarView {
    let lower = text.to_lowercase();

    if MOTOR_VIEW_KEYWORDS.iter().any(|k| lower.contains(k)) {
        CarView::Motor
    } else if INFERIOR_VIEW_KEYWORDS.iter().any(|k| lower.contains(k)) {
        CarView::Inferior
    } else {
        CarView::Lateral
    }
}

/// First zone pattern that matches, with the matched substring as written
pub fn detect_zone(text: &str) -> Option<(HighlightZone, String)> {
    ZONE_PATTERNS.iter().find_map(|(pattern, zone)| {
        pattern
            .find(text)
            .map(|m| (*zone, m.as_str().to_string()))
    })
}

/// Infer a visual context from plain prose.
///
/// Returns `None` unless a zone matched or the view differs from lateral.
pub fn infer_visual_context(text: &str) -> Option<VisualContext> {
    let view = detect_view(text);
    let zone = detect_zone(text);

    if zone.is_none() && view == CarView::Lateral {
        return None;
    }

    let (highlight_zone_id, specific_part_name) = match zone {
        Some((zone, matched)) => (Some(zone), matched),
        None => (None, String::new()),
    };

    Some(VisualContext {
        specific_part_name,
        car_view_needed: view,
        highlight_zone_id,
    })
}
