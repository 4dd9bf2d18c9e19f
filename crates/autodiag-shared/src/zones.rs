//! Zone catalog: highlight zones, car views and legacy categories.
//!
//! Zone identifiers are wire-stable strings shared with the assistant and
//! the renderers. Do not rename a variant's wire string without a migration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A vehicle component region eligible for visual highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightZone {
    #[serde(rename = "zone_engine_block")]
    EngineBlock,
    #[serde(rename = "zone_radiator")]
    Radiator,
    #[serde(rename = "zone_battery")]
    Battery,
    #[serde(rename = "zone_alternator")]
    Alternator,
    #[serde(rename = "zone_air_filter")]
    AirFilter,
    #[serde(rename = "zone_spark_plugs")]
    SparkPlugs,
    #[serde(rename = "zone_wheel_front_left")]
    WheelFrontLeft,
    #[serde(rename = "zone_wheel_front_right")]
    WheelFrontRight,
    #[serde(rename = "zone_wheel_rear_left")]
    WheelRearLeft,
    #[serde(rename = "zone_wheel_rear_right")]
    WheelRearRight,
    #[serde(rename = "zone_brake_front")]
    BrakeFront,
    #[serde(rename = "zone_brake_rear")]
    BrakeRear,
    #[serde(rename = "zone_suspension_front")]
    SuspensionFront,
    #[serde(rename = "zone_suspension_rear")]
    SuspensionRear,
    #[serde(rename = "zone_exhaust")]
    Exhaust,
    #[serde(rename = "zone_catalytic")]
    Catalytic,
    #[serde(rename = "zone_muffler")]
    Muffler,
    #[serde(rename = "zone_oil_pan")]
    OilPan,
    #[serde(rename = "zone_transmission")]
    Transmission,
    #[serde(rename = "zone_fuel_tank")]
    FuelTank,
    #[serde(rename = "zone_headlight")]
    Headlight,
    #[serde(rename = "zone_taillight")]
    Taillight,
}

impl HighlightZone {
    /// Every zone, in catalog order
    pub const ALL: [HighlightZone; 22] = [
        HighlightZone::EngineBlock,
        HighlightZone::Radiator,
        HighlightZone::Battery,
        HighlightZone::Alternator,
        HighlightZone::AirFilter,
        HighlightZone::SparkPlugs,
        HighlightZone::WheelFrontLeft,
        HighlightZone::WheelFrontRight,
        HighlightZone::WheelRearLeft,
        HighlightZone::WheelRearRight,
        HighlightZone::BrakeFront,
        HighlightZone::BrakeRear,
        HighlightZone::SuspensionFront,
        HighlightZone::SuspensionRear,
        HighlightZone::Exhaust,
        HighlightZone::Catalytic,
        HighlightZone::Muffler,
        HighlightZone::OilPan,
        HighlightZone::Transmission,
        HighlightZone::FuelTank,
        HighlightZone::Headlight,
        HighlightZone::Taillight,
    ];

    /// Wire identifier, e.g. `zone_radiator`
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightZone::EngineBlock => "zone_engine_block",
            HighlightZone::Radiator => "zone_radiator",
            HighlightZone::Battery => "zone_battery",
            HighlightZone::Alternator => "zone_alternator",
            HighlightZone::AirFilter => "zone_air_filter",
            HighlightZone::SparkPlugs => "zone_spark_plugs",
            HighlightZone::WheelFrontLeft => "zone_wheel_front_left",
            HighlightZone::WheelFrontRight => "zone_wheel_front_right",
            HighlightZone::WheelRearLeft => "zone_wheel_rear_left",
            HighlightZone::WheelRearRight => "zone_wheel_rear_right",
            HighlightZone::BrakeFront => "zone_brake_front",
            HighlightZone::BrakeRear => "zone_brake_rear",
            HighlightZone::SuspensionFront => "zone_suspension_front",
            HighlightZone::SuspensionRear => "zone_suspension_rear",
            HighlightZone::Exhaust => "zone_exhaust",
            HighlightZone::Catalytic => "zone_catalytic",
            HighlightZone::Muffler => "zone_muffler",
            HighlightZone::OilPan => "zone_oil_pan",
            HighlightZone::Transmission => "zone_transmission",
            HighlightZone::FuelTank => "zone_fuel_tank",
            HighlightZone::Headlight => "zone_headlight",
            HighlightZone::Taillight => "zone_taillight",
        }
    }

    /// Human-readable component name for cards and listings
    pub fn label(&self) -> &'static str {
        match self {
            HighlightZone::EngineBlock => "Bloco do motor",
            HighlightZone::Radiator => "Radiador",
            HighlightZone::Battery => "Bateria",
            HighlightZone::Alternator => "Alternador",
            HighlightZone::AirFilter => "Filtro de ar",
            HighlightZone::SparkPlugs => "Velas de ignição",
            HighlightZone::WheelFrontLeft => "Roda dianteira esquerda",
            HighlightZone::WheelFrontRight => "Roda dianteira direita",
            HighlightZone::WheelRearLeft => "Roda traseira esquerda",
            HighlightZone::WheelRearRight => "Roda traseira direita",
            HighlightZone::BrakeFront => "Freio dianteiro",
            HighlightZone::BrakeRear => "Freio traseiro",
            HighlightZone::SuspensionFront => "Suspensão dianteira",
            HighlightZone::SuspensionRear => "Suspensão traseira",
            HighlightZone::Exhaust => "Escapamento",
            HighlightZone::Catalytic => "Catalisador",
            HighlightZone::Muffler => "Silenciador",
            HighlightZone::OilPan => "Cárter",
            HighlightZone::Transmission => "Transmissão",
            HighlightZone::FuelTank => "Tanque de combustível",
            HighlightZone::Headlight => "Farol",
            HighlightZone::Taillight => "Lanterna",
        }
    }

    /// Coarse legacy category for this zone
    pub fn legacy_category(&self) -> LegacyCategory {
        zone_to_legacy_category(*self)
    }
}

impl fmt::Display for HighlightZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for identifiers outside the zone catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown highlight zone: {0}")]
pub struct ParseZoneError(pub String);

impl FromStr for HighlightZone {
    type Err = ParseZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HighlightZone::ALL
            .iter()
            .copied()
            .find(|zone| zone.as_str() == s)
            .ok_or_else(|| ParseZoneError(s.to_string()))
    }
}

/// Camera/diagram view of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarView {
    #[default]
    Lateral,
    Motor,
    Inferior,
    Frontal,
    Traseira,
}

impl CarView {
    pub const ALL: [CarView; 5] = [
        CarView::Lateral,
        CarView::Motor,
        CarView::Inferior,
        CarView::Frontal,
        CarView::Traseira,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarView::Lateral => "lateral",
            CarView::Motor => "motor",
            CarView::Inferior => "inferior",
            CarView::Frontal => "frontal",
            CarView::Traseira => "traseira",
        }
    }

    /// Label shown on the view selector
    pub fn label(&self) -> &'static str {
        match self {
            CarView::Lateral => "Lateral",
            CarView::Motor => "Motor",
            CarView::Inferior => "Inferior",
            CarView::Frontal => "Frontal",
            CarView::Traseira => "Traseira",
        }
    }
}

impl fmt::Display for CarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for view names outside the view enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown car view: {0}")]
pub struct ParseViewError(pub String);

impl FromStr for CarView {
    type Err = ParseViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CarView::ALL
            .iter()
            .copied()
            .find(|view| view.as_str() == s)
            .ok_or_else(|| ParseViewError(s.to_string()))
    }
}

/// Coarse zone grouping used by older highlighting code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyCategory {
    Motor,
    SuspensaoDianteira,
    SuspensaoTraseira,
    Freios,
    Escapamento,
}

impl LegacyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyCategory::Motor => "motor",
            LegacyCategory::SuspensaoDianteira => "suspensao_dianteira",
            LegacyCategory::SuspensaoTraseira => "suspensao_traseira",
            LegacyCategory::Freios => "freios",
            LegacyCategory::Escapamento => "escapamento",
        }
    }
}

impl fmt::Display for LegacyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a zone to its legacy category. Total over the catalog.
pub fn zone_to_legacy_category(zone: HighlightZone) -> LegacyCategory {
    use HighlightZone::*;

    match zone {
        EngineBlock | Radiator | Battery | Alternator | AirFilter | SparkPlugs => {
            LegacyCategory::Motor
        }
        OilPan | Transmission | Headlight => LegacyCategory::Motor,
        WheelFrontLeft | WheelFrontRight | SuspensionFront => LegacyCategory::SuspensaoDianteira,
        WheelRearLeft | WheelRearRight | SuspensionRear => LegacyCategory::SuspensaoTraseira,
        BrakeFront | BrakeRear => LegacyCategory::Freios,
        Exhaust | Catalytic | Muffler | FuelTank | Taillight => LegacyCategory::Escapamento,
    }
}

/// Legacy category for an optional zone; no zone means no category
pub fn legacy_category_for(zone: Option<HighlightZone>) -> Option<LegacyCategory> {
    zone.map(zone_to_legacy_category)
}

/// Zones drawn on a given diagram view
pub fn zones_for_view(view: CarView) -> Vec<HighlightZone> {
    use HighlightZone::*;

    match view {
        CarView::Lateral => HighlightZone::ALL.to_vec(),
        CarView::Motor => vec![
            EngineBlock,
            Radiator,
            Battery,
            Alternator,
            AirFilter,
            SparkPlugs,
        ],
        CarView::Inferior => vec![
            OilPan,
            Transmission,
            Exhaust,
            Catalytic,
            Muffler,
            FuelTank,
            SuspensionFront,
            SuspensionRear,
            BrakeFront,
            BrakeRear,
        ],
        CarView::Frontal => vec![Headlight, Radiator, WheelFrontLeft, WheelFrontRight],
        CarView::Traseira => vec![Taillight, Muffler, WheelRearLeft, WheelRearRight],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_wire_strings_are_unique() {
        let mut ids: Vec<&str> = HighlightZone::ALL.iter().map(|z| z.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 22);
    }

    #[test]
    fn test_zone_from_str_rejects_unknown() {
        assert_eq!(
            "zone_radiator".parse::<HighlightZone>(),
            Ok(HighlightZone::Radiator)
        );
        assert!("zone_roof".parse::<HighlightZone>().is_err());
        assert!("ZONE_RADIATOR".parse::<HighlightZone>().is_err());
    }

    #[test]
    fn test_legacy_mapping_samples() {
        assert_eq!(zone_to_legacy_category(HighlightZone::Headlight), LegacyCategory::Motor);
        assert_eq!(
            zone_to_legacy_category(HighlightZone::FuelTank),
            LegacyCategory::Escapamento
        );
        assert_eq!(
            zone_to_legacy_category(HighlightZone::WheelRearRight),
            LegacyCategory::SuspensaoTraseira
        );
        assert_eq!(legacy_category_for(None), None);
    }

    #[test]
    fn test_car_view_default_is_lateral() {
        assert_eq!(CarView::default(), CarView::Lateral);
        assert_eq!("traseira".parse::<CarView>(), Ok(CarView::Traseira));
        assert!("top".parse::<CarView>().is_err());
    }

    #[test]
    fn test_view_zone_lists_are_in_catalog() {
        for view in CarView::ALL {
            assert!(!zones_for_view(view).is_empty(), "{} has no zones", view);
        }
        assert_eq!(zones_for_view(CarView::Lateral).len(), HighlightZone::ALL.len());
    }
}
