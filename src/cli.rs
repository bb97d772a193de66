//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Each subcommand
//! resolves its inputs (flags first, then the settings file, then built-in
//! defaults) and prints a plain-text table to stdout.

use anyhow::{Context as _, Result};
use chrono::Utc;
use cropwise::calculator::{self, all_strategies, PricingContext, QuoteRequest};
use cropwise::catalog::{Catalog, ProcessingChoice, Season};
use cropwise::config::{self, Settings};
use cropwise::modifiers::QualityTier;
use cropwise::planner;
use cropwise::record::format_timestamp;
use cropwise::reference::OFFICIAL;
use cropwise::store::{JsonFileStore, RecordStore};
use cropwise::verify::{self, Verifier};
use std::path::PathBuf;
use tracing::{debug, info};

use super::Cli;

const DEFAULT_RECORD_FILE: &str = "verification.json";

/// Inputs shared by every subcommand.
pub struct Context {
    pub settings: Settings,
    pub catalog: Catalog,
    pub record_path: PathBuf,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Context> {
        let settings = config::load_optional(cli.config.as_deref())?;

        let catalog_path = cli.catalog.clone().or_else(|| settings.catalog.clone());
        let catalog = match &catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::bundled()?,
        };
        debug!(
            items = catalog.items.len(),
            source = %catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "bundled".into()),
            "catalog loaded"
        );

        let record_path = cli
            .record
            .clone()
            .or_else(|| settings.record.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORD_FILE));

        Ok(Context {
            settings,
            catalog,
            record_path,
        })
    }

    fn quality(&self, flag: Option<QualityTier>) -> QualityTier {
        flag.or(self.settings.defaults.quality).unwrap_or_default()
    }

    fn professions<'a>(&'a self, flags: &'a [String]) -> &'a [String] {
        if flags.is_empty() {
            &self.settings.defaults.professions
        } else {
            flags
        }
    }
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}

// ── Verification ────────────────────────────────────────────────

/// Run verification, persist the record and print the report. Returns an
/// error when any check failed so the process exits non-zero.
pub fn run_verify(ctx: &Context) -> Result<()> {
    let store = JsonFileStore::new(&ctx.record_path);
    let mut verifier = Verifier::new(OFFICIAL);
    let report = verify::run_and_persist(&store, &mut verifier, &ctx.catalog, Utc::now())?;
    info!(
        state = %report.state,
        passed = report.checks_passed,
        total = report.checks_total,
        record = %ctx.record_path.display(),
        "verification run recorded"
    );

    println!(
        "Verification {}: {}/{} checks passed",
        report.state.to_string().to_uppercase(),
        report.checks_passed,
        report.checks_total
    );
    if !report.errors.is_empty() {
        println!("{:<16} {:<24} {:<12} {:<12}", "Subject", "Field", "Expected", "Actual");
        println!("{}", "-".repeat(66));
        for e in &report.errors {
            println!(
                "{:<16} {:<24} {:<12} {:<12}",
                e.subject, e.field, e.expected, e.actual
            );
        }
    }
    if let Some(next) = &report.record.next_verification_due {
        println!("Next verification due: {}", format_timestamp(next));
    }

    if report.passed() {
        Ok(())
    } else {
        anyhow::bail!(
            "verification failed: {} mismatches across {} checks",
            report.errors.len(),
            report.checks_total
        )
    }
}

/// Print the stored verification record.
pub fn run_status(ctx: &Context) -> Result<()> {
    let store = JsonFileStore::new(&ctx.record_path);
    let record = match store.load()? {
        Some(r) => r,
        None => {
            println!(
                "Never verified (no record at {})",
                ctx.record_path.display()
            );
            return Ok(());
        }
    };

    let show = |ts: &Option<chrono::DateTime<Utc>>| {
        ts.as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "never".into())
    };
    println!("Last verified:  {}", show(&record.last_verified));
    println!("Next due:       {}", show(&record.next_verification_due));
    println!(
        "Overdue:        {}",
        if record.is_due(Utc::now()) { "yes" } else { "no" }
    );

    if !record.changelog.is_empty() {
        println!();
        println!("{:<12} {:<10} Note", "Date", "Action");
        println!("{}", "-".repeat(60));
        for entry in &record.changelog {
            println!(
                "{:<12} {:<10} {}",
                entry.date.to_string(),
                entry.action.to_string(),
                entry.note
            );
        }
    }
    Ok(())
}

// ── Calculator ──────────────────────────────────────────────────

/// Quote one item.
pub fn run_quote(
    ctx: &Context,
    item_id: &str,
    quality: Option<QualityTier>,
    professions: &[String],
    processing: Option<ProcessingChoice>,
    json: bool,
) -> Result<()> {
    let request = QuoteRequest {
        item_id: item_id.to_string(),
        quality_tier: ctx.quality(quality),
        active_professions: ctx.professions(professions).to_vec(),
        processing_choice: processing,
    };
    let quote = calculator::quote(&ctx.catalog, &request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    let item = ctx.catalog.require_item(item_id)?;
    println!("Item:         {} ({})", item.name, item.id);
    println!("Quality:      {}", request.quality_tier);
    println!("Professions:  {}", join_or_none(&request.active_professions));
    println!(
        "Processing:   {}",
        request.processing_choice.unwrap_or(ProcessingChoice::Raw)
    );
    println!("Unit price:   {}g", quote.effective_unit_price);
    println!("Gold/day:     {:.2}", quote.gold_per_day);
    println!("Recommended:  {}", quote.recommended_strategy);

    let pricing = PricingContext::resolve(
        &ctx.catalog,
        request.quality_tier,
        &request.active_professions,
        None,
    )?;
    println!();
    println!("{:<10} {:>10} {:>6} {:>10}", "Option", "Price", "Days", "Gold/day");
    println!("{}", "-".repeat(39));
    for s in all_strategies(item, &pricing)? {
        println!(
            "{:<10} {:>10} {:>6} {:>10.2}",
            s.choice.to_string(),
            s.unit_price,
            s.days,
            s.gold_per_day
        );
    }
    Ok(())
}

/// Rank crops for a season.
pub fn run_rank(
    ctx: &Context,
    season: Option<Season>,
    quality: Option<QualityTier>,
    professions: &[String],
    fertilizer: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let season = season.or(ctx.settings.defaults.season);
    let fertilizer = fertilizer.or(ctx.settings.defaults.fertilizer.as_deref());
    let professions = ctx.professions(professions);
    let quality = ctx.quality(quality);

    let pricing = PricingContext::resolve(&ctx.catalog, quality, professions, fertilizer)
        .context("resolving pricing context")?;
    let rows = planner::rank_crops(&ctx.catalog, &pricing, season)?;

    println!(
        "Season: {}  Quality: {}  Professions: {}  Fertilizer: {}",
        season.map(|s| s.to_string()).unwrap_or_else(|| "all".into()),
        quality,
        join_or_none(professions),
        fertilizer.unwrap_or("none")
    );
    println!();
    println!(
        "{:<4} {:<16} {:<6} {:>8} {:>10} {:>9} {:>10}",
        "#", "Crop", "Best", "Price", "Gold/day", "Harvests", "Profit"
    );
    println!("{}", "-".repeat(69));
    let shown = limit.unwrap_or(rows.len());
    for (i, row) in rows.iter().take(shown).enumerate() {
        println!(
            "{:<4} {:<16} {:<6} {:>8} {:>10.2} {:>9} {:>10}",
            i + 1,
            row.name,
            row.best.choice.to_string(),
            row.best.unit_price,
            row.best.gold_per_day,
            row.season.harvests,
            row.season.profit
        );
    }
    if rows.is_empty() {
        println!("No crops grow in that season");
    }
    Ok(())
}
