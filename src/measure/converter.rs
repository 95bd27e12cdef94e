//! Ingredient conversion and scaling
//!
//! Pure functions producing derived copies of ingredients. The input is never
//! modified.

use super::units::{conversion_for, system_of, UnitSystem};
use crate::models::Ingredient;

/// Express an ingredient in the requested unit system
///
/// Units already in `target`, units that read the same in both systems, and
/// units we don't recognize come back unchanged.
pub fn convert_ingredient(ingredient: &Ingredient, target: UnitSystem) -> Ingredient {
    let Some(source) = system_of(&ingredient.unit) else {
        return ingredient.clone();
    };
    if source == target {
        return ingredient.clone();
    }

    match conversion_for(&ingredient.unit) {
        Some(conversion) => Ingredient {
            quantity: ingredient.quantity * conversion.factor,
            unit: conversion.to.to_string(),
            ..ingredient.clone()
        },
        None => ingredient.clone(),
    }
}

/// Scale quantities from `base_servings` to `target_servings`
///
/// A non-positive base leaves quantities as they are.
pub fn scale_ingredients(
    ingredients: &[Ingredient],
    base_servings: f64,
    target_servings: f64,
) -> Vec<Ingredient> {
    if base_servings <= 0.0 || !base_servings.is_finite() {
        return ingredients.to_vec();
    }

    let factor = target_servings / base_servings;
    ingredients
        .iter()
        .map(|ingredient| ingredient.with_quantity(ingredient.quantity * factor))
        .collect()
}

/// Scale to a serving count, then convert each ingredient for display
pub fn prepare_ingredients(
    ingredients: &[Ingredient],
    base_servings: f64,
    target_servings: f64,
    system: UnitSystem,
) -> Vec<Ingredient> {
    scale_ingredients(ingredients, base_servings, target_servings)
        .iter()
        .map(|ingredient| convert_ingredient(ingredient, system))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::format_quantity;
    use crate::models::IngredientCategory;

    fn ingredient(quantity: f64, unit: &str) -> Ingredient {
        Ingredient {
            name: "Thing".to_string(),
            quantity,
            unit: unit.to_string(),
            category: IngredientCategory::Pantry,
            is_present: true,
        }
    }

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_grams_to_imperial() {
        let converted = convert_ingredient(&ingredient(500.0, "g"), UnitSystem::Imperial);
        assert_eq!(converted.unit, "oz");
        assert!(approx(converted.quantity, 17.637, 0.001));
        assert_eq!(format_quantity(converted.quantity), "17.64");
        assert_eq!(converted.name, "Thing");
        assert!(converted.is_present);
    }

    #[test]
    fn test_pounds_to_metric() {
        let converted = convert_ingredient(&ingredient(2.0, "lb"), UnitSystem::Metric);
        assert_eq!(converted.unit, "kg");
        assert!(approx(converted.quantity, 0.907, 0.001));
        assert_eq!(format_quantity(converted.quantity), "0.91");
    }

    #[test]
    fn test_volume_conversions() {
        let converted = convert_ingredient(&ingredient(1.0, "l"), UnitSystem::Imperial);
        assert_eq!(converted.unit, "quart");
        assert!(approx(converted.quantity, 1.0567, 0.0001));

        let converted = convert_ingredient(&ingredient(8.0, "fl oz"), UnitSystem::Metric);
        assert_eq!(converted.unit, "ml");
        assert!(approx(converted.quantity, 236.588, 0.001));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let original = ingredient(250.0, "g");
        let there = convert_ingredient(&original, UnitSystem::Imperial);
        let back = convert_ingredient(&there, UnitSystem::Metric);
        assert_eq!(back.unit, "g");
        assert!(approx(back.quantity, 250.0, 1e-9));
    }

    #[test]
    fn test_identity_cases() {
        let pinch = ingredient(1.0, "pinch");
        assert_eq!(convert_ingredient(&pinch, UnitSystem::Imperial), pinch);
        assert_eq!(convert_ingredient(&pinch, UnitSystem::Metric), pinch);

        let grams = ingredient(100.0, "g");
        assert_eq!(convert_ingredient(&grams, UnitSystem::Metric), grams);

        let cups = ingredient(2.0, "cups");
        assert_eq!(convert_ingredient(&cups, UnitSystem::Metric), cups);

        let unitless = ingredient(3.0, "");
        assert_eq!(convert_ingredient(&unitless, UnitSystem::Imperial), unitless);
    }

    #[test]
    fn test_unit_matching_ignores_case_and_spaces() {
        let converted = convert_ingredient(&ingredient(1.0, " KG "), UnitSystem::Imperial);
        assert_eq!(converted.unit, "lb");
        assert!(approx(converted.quantity, 2.2046, 0.0001));
    }

    #[test]
    fn test_scale_ingredients() {
        let ingredients = vec![ingredient(200.0, "g"), ingredient(1.0, "tsp")];
        let scaled = scale_ingredients(&ingredients, 4.0, 2.0);
        assert_eq!(scaled[0].quantity, 100.0);
        assert_eq!(scaled[1].quantity, 0.5);
        assert_eq!(ingredients[0].quantity, 200.0);

        assert_eq!(scale_ingredients(&ingredients, 0.0, 2.0), ingredients);
    }

    #[test]
    fn test_prepare_scales_before_converting() {
        let prepared =
            prepare_ingredients(&[ingredient(250.0, "g")], 2.0, 4.0, UnitSystem::Imperial);
        assert_eq!(prepared[0].unit, "oz");
        assert!(approx(prepared[0].quantity, 17.637, 0.001));
    }
}
