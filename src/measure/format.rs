//! Quantity formatting
//!
//! Renders decimal quantities the way a cook reads them: "1 1/2" rather than
//! "1.5", falling back to a short decimal when no clean fraction fits.

/// Largest denominator considered a clean kitchen fraction
pub const MAX_DENOMINATOR: u32 = 16;

/// Decimal places used when no clean fraction exists
pub const DECIMAL_PLACES: i32 = 2;

/// Closeness required between the fraction and the value
pub const FRACTION_TOLERANCE: f64 = 1.0e-6;

const MAX_EXPANSION_TERMS: usize = 32;

/// Format a quantity as an integer, mixed number, fraction, or short decimal
///
/// Examples:
/// - 0.0 -> "0"
/// - 3.0 -> "3"
/// - 0.25 -> "1/4"
/// - 1.5 -> "1 1/2"
/// - 0.1234567 -> "0.12"
pub fn format_quantity(quantity: f64) -> String {
    if !quantity.is_finite() {
        return quantity.to_string();
    }

    if quantity == 0.0 {
        return "0".to_string();
    }

    if quantity < 0.0 {
        let magnitude = format_quantity(-quantity);
        return if magnitude == "0" {
            magnitude
        } else {
            format!("-{}", magnitude)
        };
    }

    // Also absorbs floating-point noise such as 2.0000000001 or 0.9999999
    let nearest = quantity.round();
    if (quantity - nearest).abs() <= FRACTION_TOLERANCE {
        return format!("{}", nearest);
    }

    let whole = quantity.trunc();
    let remainder = quantity - whole;

    match approximate_fraction(remainder) {
        Some((numerator, denominator)) if whole > 0.0 => {
            format!("{} {}/{}", whole, numerator, denominator)
        }
        Some((numerator, denominator)) => format!("{}/{}", numerator, denominator),
        None => format_decimal(quantity),
    }
}

/// Round to `DECIMAL_PLACES` and print without trailing zeros
fn format_decimal(quantity: f64) -> String {
    let scale = 10f64.powi(DECIMAL_PLACES);
    let rounded = (quantity * scale).round() / scale;
    format!("{}", rounded)
}

/// Continued-fraction expansion of a value in (0, 1)
///
/// Returns the first convergent within `FRACTION_TOLERANCE` of the value, or
/// None once the denominator grows past `MAX_DENOMINATOR`.
fn approximate_fraction(value: f64) -> Option<(u32, u32)> {
    // Convergent recurrences: h(n) = a(n) h(n-1) + h(n-2), same for k
    let (mut h_prev, mut h) = (0.0_f64, 1.0_f64);
    let (mut k_prev, mut k) = (1.0_f64, 0.0_f64);
    let mut term = value;

    for _ in 0..MAX_EXPANSION_TERMS {
        let a = term.floor();

        let h_next = a * h + h_prev;
        let k_next = a * k + k_prev;
        h_prev = h;
        h = h_next;
        k_prev = k;
        k = k_next;

        if k > MAX_DENOMINATOR as f64 {
            return None;
        }

        if (value - h / k).abs() <= FRACTION_TOLERANCE {
            if h == 0.0 {
                return None;
            }
            return Some((h as u32, k as u32));
        }

        let rest = term - a;
        if rest <= 0.0 {
            return None;
        }
        term = 1.0 / rest;
    }

    None
}
