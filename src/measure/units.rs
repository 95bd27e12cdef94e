//! Unit systems and conversion constants
//!
//! Provides the metric/imperial classification of kitchen units and the fixed
//! conversion table used when displaying ingredients in the other system.

use serde::{Deserialize, Serialize};

/// Measurement convention selected for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Parse from string, case-insensitive
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Some(UnitSystem::Metric),
            "imperial" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }
}

// ============================================================================
// Volume Conversion Constants
// ============================================================================

/// Milliliters per fluid ounce (US)
pub const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per quart (US)
pub const ML_PER_QUART: f64 = 946.353;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;

// ============================================================================
// Weight Conversion Constants
// ============================================================================

/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;

/// One row of the conversion table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Source unit, lowercase
    pub from: &'static str,
    /// Unit in the other system
    pub to: &'static str,
    /// Multiply the quantity by this to get the target quantity
    pub factor: f64,
}

const CONVERSIONS: &[Conversion] = &[
    // Metric to imperial
    Conversion { from: "ml", to: "fl oz", factor: 1.0 / ML_PER_FL_OZ },
    Conversion { from: "l", to: "quart", factor: ML_PER_LITER / ML_PER_QUART },
    Conversion { from: "g", to: "oz", factor: 1.0 / G_PER_OZ },
    Conversion { from: "kg", to: "lb", factor: G_PER_KG / G_PER_LB },
    // Imperial to metric
    Conversion { from: "fl oz", to: "ml", factor: ML_PER_FL_OZ },
    Conversion { from: "quart", to: "l", factor: ML_PER_QUART / ML_PER_LITER },
    Conversion { from: "oz", to: "g", factor: G_PER_OZ },
    Conversion { from: "lb", to: "kg", factor: G_PER_LB / G_PER_KG },
    // Spoons and cups read the same in both kitchens
    Conversion { from: "tsp", to: "tsp", factor: 1.0 },
    Conversion { from: "tbsp", to: "tbsp", factor: 1.0 },
    Conversion { from: "cup", to: "cup", factor: 1.0 },
    Conversion { from: "cups", to: "cups", factor: 1.0 },
];

const METRIC_UNITS: &[&str] = &["ml", "l", "g", "kg"];
const IMPERIAL_UNITS: &[&str] = &["fl oz", "quart", "oz", "lb", "tsp", "tbsp", "cup", "cups"];

fn normalize(unit: &str) -> String {
    unit.trim().to_lowercase()
}

/// Look up the conversion row for a unit (case-insensitive)
pub fn conversion_for(unit: &str) -> Option<&'static Conversion> {
    let key = normalize(unit);
    CONVERSIONS.iter().find(|c| c.from == key)
}

/// Which system a unit belongs to, if it is one we know
pub fn system_of(unit: &str) -> Option<UnitSystem> {
    let key = normalize(unit);
    if METRIC_UNITS.contains(&key.as_str()) {
        Some(UnitSystem::Metric)
    } else if IMPERIAL_UNITS.contains(&key.as_str()) {
        Some(UnitSystem::Imperial)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_of_known_units() {
        assert_eq!(system_of("g"), Some(UnitSystem::Metric));
        assert_eq!(system_of("KG"), Some(UnitSystem::Metric));
        assert_eq!(system_of(" ml "), Some(UnitSystem::Metric));
        assert_eq!(system_of("oz"), Some(UnitSystem::Imperial));
        assert_eq!(system_of("Fl Oz"), Some(UnitSystem::Imperial));
        assert_eq!(system_of("cups"), Some(UnitSystem::Imperial));
    }

    #[test]
    fn test_system_of_unknown_units() {
        assert_eq!(system_of("pinch"), None);
        assert_eq!(system_of("clove"), None);
        assert_eq!(system_of(""), None);
    }

    #[test]
    fn test_every_unit_has_a_table_row() {
        for unit in METRIC_UNITS.iter().chain(IMPERIAL_UNITS) {
            assert!(conversion_for(unit).is_some(), "missing row for {}", unit);
        }
    }

    #[test]
    fn test_paired_factors_invert() {
        for (metric, imperial) in [("ml", "fl oz"), ("l", "quart"), ("g", "oz"), ("kg", "lb")] {
            let there = conversion_for(metric).unwrap();
            let back = conversion_for(imperial).unwrap();
            assert_eq!(there.to, imperial);
            assert_eq!(back.to, metric);
            assert!((there.factor * back.factor - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unit_system_from_str() {
        assert_eq!(UnitSystem::from_str("Metric"), Some(UnitSystem::Metric));
        assert_eq!(UnitSystem::from_str("imperial"), Some(UnitSystem::Imperial));
        assert_eq!(UnitSystem::from_str("nautical"), None);
    }
}
