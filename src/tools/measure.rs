//! Measurement MCP Tools
//!
//! Direct access to the quantity formatter and the unit converter.

use serde::Serialize;

use super::share::quantity_label;
use crate::measure::{convert_ingredient, format_quantity, system_of, UnitSystem};
use crate::models::{Ingredient, IngredientCategory};

/// Response for format_quantity
#[derive(Debug, Serialize)]
pub struct FormatQuantityResponse {
    pub quantity: f64,
    pub formatted: String,
}

/// Response for convert_ingredient
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub display: String,
    /// Which system the source unit belongs to, if it is known
    pub source_system: Option<UnitSystem>,
    pub target_system: UnitSystem,
    pub converted: bool,
}

pub fn format_quantity_tool(quantity: f64) -> Result<FormatQuantityResponse, String> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err("quantity must be a non-negative number".to_string());
    }
    Ok(FormatQuantityResponse {
        quantity,
        formatted: format_quantity(quantity),
    })
}

/// Convert one quantity/unit pair to the target system
pub fn convert_ingredient_tool(
    name: Option<String>,
    quantity: f64,
    unit: &str,
    target: UnitSystem,
) -> Result<ConvertResponse, String> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err("quantity must be a non-negative number".to_string());
    }

    let ingredient = Ingredient {
        name: name.unwrap_or_default(),
        quantity,
        unit: unit.trim().to_string(),
        category: IngredientCategory::Other,
        is_present: false,
    };
    let converted = convert_ingredient(&ingredient, target);

    Ok(ConvertResponse {
        display: quantity_label(converted.quantity, &converted.unit),
        converted: converted.unit != ingredient.unit || converted.quantity != ingredient.quantity,
        source_system: system_of(&ingredient.unit),
        target_system: target,
        name: converted.name,
        quantity: converted.quantity,
        unit: converted.unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tool() {
        assert_eq!(format_quantity_tool(1.5).unwrap().formatted, "1 1/2");
        assert!(format_quantity_tool(f64::NAN).is_err());
    }

    #[test]
    fn test_format_tool_rejects_negative() {
        assert!(format_quantity_tool(-0.5).is_err());
        assert_eq!(format_quantity_tool(0.0).unwrap().formatted, "0");
    }

    #[test]
    fn test_convert_tool() {
        let result = convert_ingredient_tool(Some("Butter".into()), 2.0, "lb", UnitSystem::Metric).unwrap();
        assert!(result.converted);
        assert_eq!(result.unit, "kg");
        assert_eq!(result.display, "0.91 kg");
        assert_eq!(result.source_system, Some(UnitSystem::Imperial));

        let pinch = convert_ingredient_tool(None, 1.0, "pinch", UnitSystem::Imperial).unwrap();
        assert!(!pinch.converted);
        assert_eq!(pinch.source_system, None);
        assert_eq!(pinch.display, "1 pinch");

        assert!(convert_ingredient_tool(None, -1.0, "g", UnitSystem::Imperial).is_err());
    }
}
