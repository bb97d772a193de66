//! Season profit and crop ranking built on top of the calculator.
//!
//! A season is 28 days. Seeds are planted on day 1 and a crop must be
//! harvested by the last day of its final growing season, leaving
//! `28 × seasons − 1` days of growth.

use serde::Serialize;

use crate::calculator::{
    best_strategy, evaluate, fertilized_growth_days, PricingContext, StrategyOutcome,
};
use crate::catalog::{Catalog, Item, ProcessingChoice, Season};
use crate::error::PricingError;

pub const SEASON_DAYS: u32 = 28;

/// Harvest count and money for one planting over all of a crop's seasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonProfit {
    pub growing_days: u32,
    pub harvests: u32,
    pub seeds_bought: u32,
    pub revenue: i64,
    pub cost: i64,
    pub profit: i64,
    pub profit_per_day: f64,
}

/// Days available for growth across the item's seasons. Items with no
/// listed season get a single season.
pub fn growing_days(item: &Item) -> u32 {
    SEASON_DAYS * item.season_count().max(1) - 1
}

/// Raw-sale profit of one tile planted on day 1 and replanted (or left to
/// regrow) until the seasons end.
pub fn season_profit(item: &Item, ctx: &PricingContext<'_>) -> Result<SeasonProfit, PricingError> {
    let growth = item.growth_days.ok_or_else(|| {
        PricingError::invalid(format!("item '{}' is not a crop", item.id))
    })?;
    let growth = fertilized_growth_days(growth, ctx.fertilizer);
    let available = growing_days(item);

    let (harvests, seeds_bought) = if growth > available {
        (0, 0)
    } else {
        match item.regrowth_days {
            Some(regrow) => (1 + (available - growth) / regrow, 1),
            None => {
                let n = available / growth;
                (n, n)
            }
        }
    };

    let overflow = || PricingError::invalid(format!("season profit of '{}' overflows", item.id));

    let unit = evaluate(item, ctx, ProcessingChoice::Raw)?.unit_price;
    let revenue = unit.checked_mul(harvests as i64).ok_or_else(overflow)?;
    let seed_cost = item
        .seed_price
        .unwrap_or(0)
        .checked_mul(seeds_bought as i64)
        .ok_or_else(overflow)?;
    let fertilizer_cost = match ctx.fertilizer {
        Some(f) if harvests > 0 => f.price,
        _ => 0,
    };
    let cost = seed_cost.checked_add(fertilizer_cost).ok_or_else(overflow)?;
    let profit = revenue.checked_sub(cost).ok_or_else(overflow)?;

    Ok(SeasonProfit {
        growing_days: available,
        harvests,
        seeds_bought,
        revenue,
        cost,
        profit,
        profit_per_day: profit as f64 / available as f64,
    })
}

/// One row of a crop ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCrop {
    pub item_id: String,
    pub name: String,
    pub best: StrategyOutcome,
    pub season: SeasonProfit,
}

/// Crops growing in `season` (all crops when `None`), best gold-per-day
/// first. Equal rates are ordered by item id.
pub fn rank_crops(
    catalog: &Catalog,
    ctx: &PricingContext<'_>,
    season: Option<Season>,
) -> Result<Vec<RankedCrop>, PricingError> {
    let mut rows = Vec::new();
    for item in catalog.items.iter().filter(|i| i.is_crop()) {
        if let Some(s) = season {
            if !item.grows_in(s) {
                continue;
            }
        }
        rows.push(RankedCrop {
            item_id: item.id.clone(),
            name: item.name.clone(),
            best: best_strategy(item, ctx)?,
            season: season_profit(item, ctx)?,
        });
    }
    rows.sort_by(|a, b| {
        b.best
            .gold_per_day
            .total_cmp(&a.best.gold_per_day)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
    Ok(rows)
}
