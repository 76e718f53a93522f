//! # Quantity Engine
//!
//! Ingredient quantities are stored exactly as the user typed them ("1 1/2",
//! "0.25", "2 large"). This module turns that free text into numbers, scales
//! it by a serving ratio and renders the result back as kitchen-friendly text.
//!
//! ## Parsing rules (first match wins)
//!
//! 1. Empty or whitespace-only text is `0`
//! 2. Mixed numbers: `"1 1/2"` → `1.5`
//! 3. Simple fractions: `"3/4"` → `0.75`
//! 4. Leading decimal or integer: `"2.5"` → `2.5`, `"2 large"` → `2`
//! 5. Anything else is `0`
//!
//! ## Formatting rules (first match wins)
//!
//! 1. `0` renders as `"0"`
//! 2. Values below `0.1` keep two significant digits (`0.05` → `"0.050"`)
//! 3. A fractional part close to 1/4, 1/3, 1/2, 2/3 or 3/4 renders as that
//!    fraction, checked in that order
//! 4. Values within `0.1` of a whole number render as the whole number
//! 5. Everything else gets one decimal place
//!
//! Formatting is lossy: `parse_quantity(&format_quantity(x))` is not `x` in
//! general.
//!
//! ## Usage
//!
//! ```rust
//! use cookbook::quantity::{format_quantity, parse_quantity};
//!
//! let total = parse_quantity("1") + parse_quantity("1/2");
//! assert_eq!(format_quantity(total), "1 1/2");
//! ```

use log::{debug, trace};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{CookbookError, Result};
use crate::recipe_model::Ingredient;

/// Regex patterns for the accepted quantity shapes
static QUANTITY_PATTERNS: LazyLock<QuantityPatterns> = LazyLock::new(QuantityPatterns::new);

/// Fractions offered when rendering, in the order they are tried
const DISPLAY_FRACTIONS: [(f64, &str); 5] = [
    (0.25, "1/4"),
    (0.33, "1/3"),
    (0.5, "1/2"),
    (0.67, "2/3"),
    (0.75, "3/4"),
];

/// Maximum distance between a fractional part and a display fraction
const FRACTION_TOLERANCE: f64 = 0.05;

/// Maximum distance to a whole number for integer rendering
const WHOLE_TOLERANCE: f64 = 0.1;

/// Below this, quantities are rendered with significant digits
const SMALL_QUANTITY_THRESHOLD: f64 = 0.1;

/// Significant digits kept for small quantities (spice pinches and the like)
const SMALL_QUANTITY_DIGITS: i32 = 2;

/// Compiled regex patterns for quantity text
struct QuantityPatterns {
    /// Matches mixed numbers: "1 1/2", "2  3/4"
    mixed: Regex,
    /// Matches simple fractions: "1/2", "3/4"
    fraction: Regex,
    /// Matches the numeric prefix of a decimal: "2", "2.5", ".5", "1e3"
    leading_number: Regex,
}

impl QuantityPatterns {
    fn new() -> Self {
        Self {
            mixed: Regex::new(r"^(\d+)\s+(\d+)/(\d+)$").expect("mixed number pattern should be valid"),
            fraction: Regex::new(r"^(\d+)/(\d+)$").expect("fraction pattern should be valid"),
            leading_number: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
                .expect("leading number pattern should be valid"),
        }
    }
}

/// Parse free-form quantity text into a number.
///
/// Never fails: text that cannot be understood counts as `0`, which means an
/// ingredient like "a handful" silently contributes nothing when summed.
///
/// # Examples
///
/// ```rust
/// use cookbook::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity("1/2"), 0.5);
/// assert_eq!(parse_quantity("1 1/2"), 1.5);
/// assert_eq!(parse_quantity("2"), 2.0);
/// assert_eq!(parse_quantity(""), 0.0);
/// assert_eq!(parse_quantity("abc"), 0.0);
/// ```
pub fn parse_quantity(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    if let Some(captures) = QUANTITY_PATTERNS.mixed.captures(text) {
        let whole = parse_digits(&captures[1]);
        return whole + ratio(&captures[2], &captures[3], text);
    }

    if let Some(captures) = QUANTITY_PATTERNS.fraction.captures(text) {
        return ratio(&captures[1], &captures[2], text);
    }

    if let Some(number) = QUANTITY_PATTERNS.leading_number.find(text) {
        if let Ok(value) = number.as_str().parse::<f64>() {
            trace!("Parsed quantity '{}' as {}", text, value);
            return value;
        }
    }

    debug!("Unparseable quantity '{}', counting it as 0", text);
    0.0
}

/// Render a scaled or summed quantity as display text.
///
/// # Examples
///
/// ```rust
/// use cookbook::quantity::format_quantity;
///
/// assert_eq!(format_quantity(0.0), "0");
/// assert_eq!(format_quantity(0.05), "0.050");
/// assert_eq!(format_quantity(0.5), "1/2");
/// assert_eq!(format_quantity(2.5), "2 1/2");
/// assert_eq!(format_quantity(3.02), "3");
/// assert_eq!(format_quantity(2.4), "2.4");
/// ```
pub fn format_quantity(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    if value < SMALL_QUANTITY_THRESHOLD {
        return to_significant_digits(value, SMALL_QUANTITY_DIGITS);
    }

    let whole = value.floor();
    let frac = value - whole;

    for (key, label) in DISPLAY_FRACTIONS {
        if (frac - key).abs() < FRACTION_TOLERANCE {
            return if whole > 0.0 {
                format!("{} {}", whole as i64, label)
            } else {
                label.to_string()
            };
        }
    }

    let nearest = value.round();
    if (value - nearest).abs() < WHOLE_TOLERANCE {
        return format!("{}", nearest as i64);
    }

    format!("{:.1}", value)
}

/// Add two quantity texts and render the sum
pub fn add_quantities(existing: &str, additional: &str) -> String {
    format_quantity(parse_quantity(existing) + parse_quantity(additional))
}

/// Scale every ingredient of a recipe from `original_servings` to `new_servings`.
///
/// Names and units are copied unchanged; quantities are re-parsed, multiplied
/// by `new_servings / original_servings` and re-rendered. The input slice is
/// not modified.
///
/// # Errors
///
/// Returns [`CookbookError::InvalidServings`] when either serving count is zero.
///
/// # Examples
///
/// ```rust
/// use cookbook::quantity::scale_ingredients;
/// use cookbook::recipe_model::Ingredient;
///
/// let flour = Ingredient::new("Flour").with_quantity("1").with_unit("cup");
/// let scaled = scale_ingredients(&[flour], 4, 8)?;
/// assert_eq!(scaled[0].quantity, "2");
/// # Ok::<(), cookbook::error::CookbookError>(())
/// ```
pub fn scale_ingredients(
    ingredients: &[Ingredient],
    original_servings: u32,
    new_servings: u32,
) -> Result<Vec<Ingredient>> {
    if original_servings == 0 {
        return Err(CookbookError::InvalidServings(original_servings));
    }
    if new_servings == 0 {
        return Err(CookbookError::InvalidServings(new_servings));
    }

    let factor = f64::from(new_servings) / f64::from(original_servings);
    debug!(
        "Scaling {} ingredients from {} to {} servings (factor {:.3})",
        ingredients.len(),
        original_servings,
        new_servings,
        factor
    );

    Ok(ingredients
        .iter()
        .map(|ingredient| Ingredient {
            name: ingredient.name.clone(),
            quantity: format_quantity(parse_quantity(&ingredient.quantity) * factor),
            unit: ingredient.unit.clone(),
        })
        .collect())
}

fn parse_digits(digits: &str) -> f64 {
    digits.parse().unwrap_or(0.0)
}

/// A zero denominator makes the fraction count as 0
fn ratio(numerator: &str, denominator: &str, text: &str) -> f64 {
    let denominator = parse_digits(denominator);
    if denominator == 0.0 {
        debug!("Zero denominator in quantity '{}', counting it as 0", text);
        return 0.0;
    }
    parse_digits(numerator) / denominator
}

/// Render with a fixed number of significant digits, e.g. 0.05 -> "0.050".
/// Output is always positional, never in exponent form.
fn to_significant_digits(value: f64, digits: i32) -> String {
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let rendered = format!("{:.*}", decimals, value);

    // 0.0996 rounds up to 0.100, which now has one digit too many
    let carried = rendered
        .parse::<f64>()
        .map(|rounded| rounded.abs() >= 10f64.powi(magnitude + 1) * (1.0 - 1e-12))
        .unwrap_or(false);
    if carried && decimals > 0 {
        return format!("{:.*}", decimals - 1, value);
    }

    rendered
}
