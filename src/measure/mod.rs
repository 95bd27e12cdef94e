//! Measurement module
//!
//! Quantity formatting, metric/imperial conversion, and serving scaling.

pub mod converter;
pub mod format;
pub mod units;

pub use converter::{convert_ingredient, prepare_ingredients, scale_ingredients};
pub use format::format_quantity;
pub use units::{conversion_for, system_of, Conversion, UnitSystem};
