//! # Processing: Keg and Jar Output Formulas
//!
//! Pure functions mapping a raw item's base sell price to the price of the
//! artisan good produced from it. All arithmetic is integer: Juice's 2.25x
//! multiplier is computed as `9b / 4` so the floor is exact.
//!
//! | Product | Building | Price        | Duration            |
//! |---------|----------|--------------|---------------------|
//! | Wine    | Keg      | 3b           | per item (descriptor) |
//! | Juice   | Keg      | floor(2.25b) | per item (descriptor) |
//! | Jelly   | Jar      | 2b + 50      | 3 days              |
//! | Pickles | Jar      | 2b + 50      | 3 days              |
//!
//! Inputs are validated, never clamped: a negative, non-finite, fractional
//! or overflowing base price is an `InvalidInput` error.

use serde::{Deserialize, Serialize};

use crate::error::PricingError;

/// Processing time of a preserves jar, in days, independent of the input item.
pub const JAR_DAYS: u32 = 3;

/// Flat bonus added by the jar on top of doubling the base price.
const JAR_FLAT_BONUS: i64 = 50;

/// Products a keg can turn a crop into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KegProduct {
    Wine,
    Juice,
}

/// Products a preserves jar can turn a crop into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JarProduct {
    Jelly,
    Pickles,
}

impl std::fmt::Display for KegProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KegProduct::Wine => write!(f, "Wine"),
            KegProduct::Juice => write!(f, "Juice"),
        }
    }
}

impl std::fmt::Display for JarProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JarProduct::Jelly => write!(f, "Jelly"),
            JarProduct::Pickles => write!(f, "Pickles"),
        }
    }
}

impl KegProduct {
    /// Output price of this keg product for a given base price.
    pub fn price(self, base: i64) -> Result<i64, PricingError> {
        match self {
            KegProduct::Wine => wine(base),
            KegProduct::Juice => juice(base),
        }
    }
}

impl JarProduct {
    /// Output price of this jar product for a given base price.
    pub fn price(self, base: i64) -> Result<i64, PricingError> {
        match self {
            JarProduct::Jelly => jelly(base),
            JarProduct::Pickles => pickles(base),
        }
    }

    /// Always [`JAR_DAYS`].
    pub fn days(self) -> u32 {
        JAR_DAYS
    }
}

fn check_base(base: i64) -> Result<i64, PricingError> {
    if base < 0 {
        return Err(PricingError::invalid(format!(
            "base price must be non-negative, got {}",
            base
        )));
    }
    Ok(base)
}

fn overflow(base: i64) -> PricingError {
    PricingError::invalid(format!("base price {} overflows product price", base))
}

/// Wine = 3b.
pub fn wine(base: i64) -> Result<i64, PricingError> {
    let b = check_base(base)?;
    b.checked_mul(3).ok_or_else(|| overflow(base))
}

/// Juice = floor(2.25b).
pub fn juice(base: i64) -> Result<i64, PricingError> {
    let b = check_base(base)?;
    b.checked_mul(9).map(|v| v / 4).ok_or_else(|| overflow(base))
}

/// Jelly = 2b + 50.
pub fn jelly(base: i64) -> Result<i64, PricingError> {
    jar_price(base)
}

/// Pickles = 2b + 50.
pub fn pickles(base: i64) -> Result<i64, PricingError> {
    jar_price(base)
}

fn jar_price(base: i64) -> Result<i64, PricingError> {
    let b = check_base(base)?;
    b.checked_mul(2)
        .and_then(|v| v.checked_add(JAR_FLAT_BONUS))
        .ok_or_else(|| overflow(base))
}

/// Convert a floating-point price (e.g. from a form field) into whole gold.
///
/// Rejects NaN, infinities, negatives and fractional values.
pub fn base_from_f64(raw: f64) -> Result<i64, PricingError> {
    if !raw.is_finite() {
        return Err(PricingError::invalid(format!(
            "base price must be finite, got {}",
            raw
        )));
    }
    if raw < 0.0 {
        return Err(PricingError::invalid(format!(
            "base price must be non-negative, got {}",
            raw
        )));
    }
    if raw.fract() != 0.0 {
        return Err(PricingError::invalid(format!(
            "base price must be whole gold, got {}",
            raw
        )));
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if raw >= i64::MAX as f64 {
        return Err(PricingError::invalid(format!("base price {} is too large", raw)));
    }
    Ok(raw as i64)
}
