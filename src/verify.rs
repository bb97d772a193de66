//! # Verify: Catalog Verification Engine
//!
//! Compares the live catalog against [`ReferenceTable`] values and the
//! processing formulas, then logs the outcome into a
//! [`VerificationRecord`].
//!
//! ## Checks
//!
//! | Group | Per entry | Compared |
//! |-------|-----------|----------|
//! | Known items | 4 | sellPrice, seedPrice, growthDays, regrowthDays |
//! | Formula spot-checks | 1 | formula applied to the catalog's base price |
//! | Professions | 1 | bonus in basis points |
//! | Descriptors | 1–3 | stored kegPrice/jarPrice vs formula, jarDays == 3 |
//!
//! A missing item or profession is a single failed check. Mismatches are
//! collected, never raised: a run always completes and always advances the
//! record's timestamps.
//!
//! The engine is a small state machine (Idle → Running → Passed/Failed).
//! It is handed the record and returns the updated one; persistence is the
//! caller's job, see [`run_and_persist`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, Item};
use crate::processing::JAR_DAYS;
use crate::record::{ChangeAction, VerificationRecord};
use crate::reference::{KnownItem, ReferenceTable};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationState {
    Idle,
    Running,
    Passed,
    Failed,
}

impl std::fmt::Display for VerificationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerificationState::Idle => "idle",
            VerificationState::Running => "running",
            VerificationState::Passed => "passed",
            VerificationState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One disagreement between the catalog and the expected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationMismatch {
    pub subject: String,
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl VerificationMismatch {
    fn new(
        subject: impl Into<String>,
        field: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        VerificationMismatch {
            subject: subject.into(),
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl std::fmt::Display for VerificationMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}: expected {}, got {}",
            self.subject, self.field, self.expected, self.actual
        )
    }
}

/// Outcome of a single verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub state: VerificationState,
    pub errors: Vec<VerificationMismatch>,
    pub checks_passed: usize,
    pub checks_total: usize,
    pub record: VerificationRecord,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.state == VerificationState::Passed
    }
}

/// Running tally of checks.
#[derive(Default)]
struct Tally {
    errors: Vec<VerificationMismatch>,
    passed: usize,
    total: usize,
}

impl Tally {
    fn compare<T: PartialEq + std::fmt::Display>(
        &mut self,
        subject: &str,
        field: &str,
        expected: T,
        actual: T,
    ) {
        self.total += 1;
        if expected == actual {
            self.passed += 1;
        } else {
            self.errors
                .push(VerificationMismatch::new(subject, field, expected, actual));
        }
    }

    fn fail(&mut self, mismatch: VerificationMismatch) {
        self.total += 1;
        self.errors.push(mismatch);
    }
}

/// Render an optional value the way mismatches print it.
fn show<T: std::fmt::Display>(v: Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

fn check_known_item(tally: &mut Tally, known: &KnownItem, item: Option<&Item>) {
    let Some(item) = item else {
        tally.fail(VerificationMismatch::new(known.id, "item", "present", "missing"));
        return;
    };
    tally.compare(known.id, "sellPrice", known.sell_price, item.sell_price);
    tally.compare(known.id, "seedPrice", show(known.seed_price), show(item.seed_price));
    tally.compare(known.id, "growthDays", show(known.growth_days), show(item.growth_days));
    tally.compare(
        known.id,
        "regrowthDays",
        show(known.regrowth_days),
        show(item.regrowth_days),
    );
}

/// Stored processed prices must match the formula applied to the item's
/// current base price.
fn check_descriptor(tally: &mut Tally, item: &Item) {
    let Some(p) = &item.processing else {
        return;
    };
    if let Some(product) = p.keg_product {
        match product.price(item.sell_price) {
            Ok(expected) => tally.compare(
                &item.id,
                &format!("kegPrice ({})", product),
                show(Some(expected)),
                show(p.keg_price),
            ),
            Err(e) => tally.fail(VerificationMismatch::new(
                &item.id,
                "kegPrice",
                product,
                e,
            )),
        }
    }
    if let Some(product) = p.jar_product {
        match product.price(item.sell_price) {
            Ok(expected) => tally.compare(
                &item.id,
                &format!("jarPrice ({})", product),
                show(Some(expected)),
                show(p.jar_price),
            ),
            Err(e) => tally.fail(VerificationMismatch::new(
                &item.id,
                "jarPrice",
                product,
                e,
            )),
        }
        tally.compare(&item.id, "jarDays", JAR_DAYS, p.jar_days.unwrap_or(JAR_DAYS));
    }
}

/// Run every check. Returns the mismatches in check order, plus the number
/// of checks passed and performed.
pub fn check_catalog(
    catalog: &Catalog,
    reference: &ReferenceTable,
) -> (Vec<VerificationMismatch>, usize, usize) {
    let mut tally = Tally::default();

    for known in reference.items {
        check_known_item(&mut tally, known, catalog.item(known.id));
    }

    for formula in reference.formulas {
        let subject = format!("{} {}", formula.item_id, formula.product);
        let Some(item) = catalog.item(formula.item_id) else {
            tally.fail(VerificationMismatch::new(subject, "item", "present", "missing"));
            continue;
        };
        match formula.product.price(item.sell_price) {
            Ok(actual) => tally.compare(&subject, "price", formula.expected, actual),
            Err(e) => tally.fail(VerificationMismatch::new(
                subject,
                "price",
                formula.expected,
                e,
            )),
        }
    }

    for known in reference.professions {
        match catalog.profession(known.id) {
            Some(p) => tally.compare(known.id, "bonus (bp)", known.bonus_bp, p.bonus_bp()),
            None => tally.fail(VerificationMismatch::new(
                known.id,
                "profession",
                "present",
                "missing",
            )),
        }
    }

    for item in &catalog.items {
        check_descriptor(&mut tally, item);
    }

    (tally.errors, tally.passed, tally.total)
}

/// Verification state machine over a fixed reference table.
#[derive(Debug, Clone)]
pub struct Verifier {
    reference: ReferenceTable,
    state: VerificationState,
}

impl Verifier {
    pub fn new(reference: ReferenceTable) -> Self {
        Verifier {
            reference,
            state: VerificationState::Idle,
        }
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    /// Check `catalog` and log the run into `record`.
    pub fn run(
        &mut self,
        catalog: &Catalog,
        record: VerificationRecord,
        now: DateTime<Utc>,
    ) -> VerificationReport {
        self.state = VerificationState::Running;
        let (errors, checks_passed, checks_total) = check_catalog(catalog, &self.reference);

        let (state, action, note) = if errors.is_empty() {
            (
                VerificationState::Passed,
                ChangeAction::Verified,
                format!("All {} checks passed", checks_total),
            )
        } else {
            (
                VerificationState::Failed,
                ChangeAction::Failed,
                format!("{} mismatches across {} checks", errors.len(), checks_total),
            )
        };
        self.state = state;

        if errors.is_empty() {
            info!(checks = checks_total, "catalog verification passed");
        } else {
            for e in &errors {
                warn!(subject = %e.subject, field = %e.field, "{}", e);
            }
            warn!(
                mismatches = errors.len(),
                checks = checks_total,
                "catalog verification failed"
            );
        }

        VerificationReport {
            state,
            errors,
            checks_passed,
            checks_total,
            record: record.with_run(now, action, note),
        }
    }
}

/// Lock the store, run verification against the stored record and save the
/// updated record. A failed verification is still saved and returned as
/// `Ok`; only storage problems are errors.
pub fn run_and_persist(
    store: &dyn RecordStore,
    verifier: &mut Verifier,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<VerificationReport> {
    let _lock = store.lock()?;
    let record = store.load()?.unwrap_or_default();
    let report = verifier.run(catalog, record, now);
    store.save(&report.record)?;
    Ok(report)
}
