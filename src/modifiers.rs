//! Quality tier multipliers and profession sell-price bonuses.
//!
//! Multipliers are kept as integers (quality in percent, profession bonus in
//! basis points) so that stacked prices can be floored exactly.

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::error::PricingError;

/// Basis points in 1.0.
pub const BASIS_POINTS: i64 = 10_000;

/// Item quality, each with a fixed sell-price multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Normal,
    Silver,
    Gold,
    Iridium,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::Normal,
        QualityTier::Silver,
        QualityTier::Gold,
        QualityTier::Iridium,
    ];

    /// Multiplier in percent: 100, 125, 150, 200.
    pub fn percent(self) -> i64 {
        match self {
            QualityTier::Normal => 100,
            QualityTier::Silver => 125,
            QualityTier::Gold => 150,
            QualityTier::Iridium => 200,
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityTier::Normal => write!(f, "normal"),
            QualityTier::Silver => write!(f, "silver"),
            QualityTier::Gold => write!(f, "gold"),
            QualityTier::Iridium => write!(f, "iridium"),
        }
    }
}

impl std::str::FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "base" => Ok(QualityTier::Normal),
            "silver" => Ok(QualityTier::Silver),
            "gold" => Ok(QualityTier::Gold),
            "iridium" => Ok(QualityTier::Iridium),
            other => Err(format!(
                "unknown quality '{}'. Valid: normal, silver, gold, iridium",
                other
            )),
        }
    }
}

/// A profession granting a percentage sell-price bonus to some categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profession {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Decimal fraction, e.g. `0.1` for +10%.
    pub bonus: f64,
    #[serde(default)]
    pub applies_to: Vec<Category>,
}

impl Profession {
    /// Bonus in basis points, rounded to the nearest point so that `0.1`
    /// maps to exactly 1000.
    pub fn bonus_bp(&self) -> i64 {
        (self.bonus * BASIS_POINTS as f64).round() as i64
    }

    pub fn applies(&self, category: Category) -> bool {
        self.applies_to.contains(&category)
    }
}

/// Sum of the bonuses (in basis points) of every profession that applies
/// to `category`. Bonuses stack additively; a sum past `i64` is an
/// `InvalidInput` error.
pub fn stacked_bonus_bp<'a, I>(professions: I, category: Category) -> Result<i64, PricingError>
where
    I: IntoIterator<Item = &'a Profession>,
{
    professions
        .into_iter()
        .filter(|p| p.applies(category))
        .try_fold(0i64, |acc, p| {
            acc.checked_add(p.bonus_bp()).ok_or_else(|| {
                PricingError::invalid(format!(
                    "stacked profession bonus overflows at '{}'",
                    p.id
                ))
            })
        })
}
