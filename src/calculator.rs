//! # Calculator: Effective Price, Gold-per-Day and Best Strategy
//!
//! Combines catalog entries, the modifier table and the processing formulas
//! into the numbers the calculator pages display.
//!
//! ## Price Stacking
//!
//! ```text
//! effective = floor(base × quality × (1 + Σ applicable profession bonuses))
//! ```
//!
//! Profession bonuses add together first and are then applied as a single
//! factor to the quality-adjusted price. The product is computed in integer
//! arithmetic (quality in percent, bonuses in basis points) and floored once
//! at the end, matching the floor used by the Juice formula.
//!
//! ## Processed Goods
//!
//! Keg and jar output prices come from [`crate::processing`] applied to the
//! raw base price. The resulting artisan good is priced at Normal quality
//! and in the `ArtisanGood` category, so Tiller does not boost wine but
//! Artisan does.
//!
//! ## Strategy Selection
//!
//! Options are evaluated in the fixed order raw, jar, keg. The first option
//! with the highest gold-per-day wins; later options must be strictly better
//! to replace it.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Category, Fertilizer, Item, ProcessingChoice};
use crate::error::PricingError;
use crate::modifiers::{stacked_bonus_bp, Profession, QualityTier, BASIS_POINTS};

/// Everything besides the item that affects a price: quality, professions
/// and an optional fertilizer.
#[derive(Debug, Clone, Default)]
pub struct PricingContext<'a> {
    pub quality: QualityTier,
    pub professions: Vec<&'a Profession>,
    pub fertilizer: Option<&'a Fertilizer>,
}

impl<'a> PricingContext<'a> {
    /// Resolve profession and fertilizer ids against the catalog.
    pub fn resolve<S: AsRef<str>>(
        catalog: &'a Catalog,
        quality: QualityTier,
        professions: &[S],
        fertilizer: Option<&str>,
    ) -> Result<Self, PricingError> {
        let professions = catalog.resolve_professions(professions)?;
        let fertilizer = match fertilizer {
            Some(id) => Some(catalog.fertilizer(id).ok_or_else(|| {
                PricingError::invalid(format!("unknown fertilizer '{}'", id))
            })?),
            None => None,
        };
        Ok(PricingContext {
            quality,
            professions,
            fertilizer,
        })
    }

    fn bonus_bp(&self, category: Category) -> Result<i64, PricingError> {
        stacked_bonus_bp(self.professions.iter().copied(), category)
    }
}

/// base × quality × (1 + bonus), floored.
pub fn effective_price(
    base: i64,
    quality: QualityTier,
    bonus_bp: i64,
) -> Result<i64, PricingError> {
    if base < 0 {
        return Err(PricingError::invalid(format!(
            "base price must be non-negative, got {}",
            base
        )));
    }
    if bonus_bp < 0 {
        return Err(PricingError::invalid(format!(
            "profession bonus must be non-negative, got {} bp",
            bonus_bp
        )));
    }
    let factor = BASIS_POINTS.checked_add(bonus_bp).ok_or_else(|| {
        PricingError::invalid(format!("profession bonus {} bp overflows", bonus_bp))
    })?;
    let numerator = (base as i128)
        .checked_mul(quality.percent() as i128)
        .and_then(|v| v.checked_mul(factor as i128))
        .ok_or_else(|| PricingError::invalid(format!("price {} overflows", base)))?;
    let denominator = 100 * BASIS_POINTS as i128;
    i64::try_from(numerator / denominator)
        .map_err(|_| PricingError::invalid(format!("price {} overflows", base)))
}

/// Gold earned per day of work. `days` of 0 is treated as 1.
pub fn gold_per_day(price: i64, days: u32) -> f64 {
    price as f64 / days.max(1) as f64
}

/// Growth days after a fertilizer removes `ceil(days × reduction)`, never
/// below one day.
pub fn fertilized_growth_days(days: u32, fertilizer: Option<&Fertilizer>) -> u32 {
    let Some(fert) = fertilizer else {
        return days;
    };
    let bp = (fert.growth_reduction * BASIS_POINTS as f64).round() as i64;
    let removed = (days as i64 * bp + BASIS_POINTS - 1) / BASIS_POINTS;
    (days as i64 - removed).max(1) as u32
}

/// The priced result of selling an item one particular way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyOutcome {
    pub choice: ProcessingChoice,
    pub unit_price: i64,
    pub days: u32,
    pub gold_per_day: f64,
}

/// Price an item for one processing choice.
pub fn evaluate(
    item: &Item,
    ctx: &PricingContext<'_>,
    choice: ProcessingChoice,
) -> Result<StrategyOutcome, PricingError> {
    let unsupported = || PricingError::UnsupportedProcessing {
        item_id: item.id.clone(),
        choice,
    };

    let (unit_price, days) = match choice {
        ProcessingChoice::Raw => {
            let bonus = ctx.bonus_bp(item.category)?;
            let price = effective_price(item.sell_price, ctx.quality, bonus)?;
            let days = item
                .growth_days
                .map(|g| fertilized_growth_days(g, ctx.fertilizer))
                .unwrap_or(1);
            (price, days)
        }
        ProcessingChoice::Jar => {
            let product = item
                .processing
                .as_ref()
                .and_then(|p| p.jar_product)
                .ok_or_else(unsupported)?;
            let base = product.price(item.sell_price)?;
            (artisan_price(base, ctx)?, product.days())
        }
        ProcessingChoice::Keg => {
            let descriptor = item.processing.as_ref().ok_or_else(unsupported)?;
            let product = descriptor.keg_product.ok_or_else(unsupported)?;
            let days = descriptor.keg_days.ok_or_else(unsupported)?;
            let base = product.price(item.sell_price)?;
            (artisan_price(base, ctx)?, days)
        }
    };

    Ok(StrategyOutcome {
        choice,
        unit_price,
        days,
        gold_per_day: gold_per_day(unit_price, days),
    })
}

fn artisan_price(base: i64, ctx: &PricingContext<'_>) -> Result<i64, PricingError> {
    effective_price(base, QualityTier::Normal, ctx.bonus_bp(Category::ArtisanGood)?)
}

/// Every option the item offers, in raw, jar, keg order.
pub fn all_strategies(
    item: &Item,
    ctx: &PricingContext<'_>,
) -> Result<Vec<StrategyOutcome>, PricingError> {
    ProcessingChoice::ORDER
        .iter()
        .filter(|c| item.offers(**c))
        .map(|c| evaluate(item, ctx, *c))
        .collect()
}

/// The option with the highest gold-per-day; ties go to the earlier option
/// in raw, jar, keg order.
pub fn best_strategy(
    item: &Item,
    ctx: &PricingContext<'_>,
) -> Result<StrategyOutcome, PricingError> {
    let mut best: Option<StrategyOutcome> = None;
    for outcome in all_strategies(item, ctx)? {
        match &best {
            Some(b) if outcome.gold_per_day <= b.gold_per_day => {}
            _ => best = Some(outcome),
        }
    }
    // Raw is always offered, so there is at least one outcome.
    best.ok_or_else(|| PricingError::invalid(format!("item '{}' has no sale option", item.id)))
}

/// A rendering-layer request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub item_id: String,
    #[serde(default)]
    pub quality_tier: QualityTier,
    #[serde(default)]
    pub active_professions: Vec<String>,
    #[serde(default)]
    pub processing_choice: Option<ProcessingChoice>,
}

/// The complete answer to a [`QuoteRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub effective_unit_price: i64,
    pub gold_per_day: f64,
    pub recommended_strategy: ProcessingChoice,
}

/// Price an item for the requested choice (raw when none) and recommend the
/// best choice. Either everything succeeds or a single error is returned.
pub fn quote(catalog: &Catalog, request: &QuoteRequest) -> Result<Quote, PricingError> {
    let item = catalog.require_item(&request.item_id)?;
    let ctx = PricingContext::resolve(
        catalog,
        request.quality_tier,
        &request.active_professions,
        None,
    )?;
    let choice = request.processing_choice.unwrap_or(ProcessingChoice::Raw);
    let chosen = evaluate(item, &ctx, choice)?;
    let best = best_strategy(item, &ctx)?;
    Ok(Quote {
        effective_unit_price: chosen.unit_price,
        gold_per_day: chosen.gold_per_day,
        recommended_strategy: best.choice,
    })
}
