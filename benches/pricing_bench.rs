use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cropwise::calculator::{self, best_strategy, PricingContext, QuoteRequest};
use cropwise::catalog::{Catalog, ProcessingChoice, Season};
use cropwise::modifiers::QualityTier;
use cropwise::planner;
use cropwise::record::VerificationRecord;
use cropwise::reference::OFFICIAL;
use cropwise::verify::{check_catalog, Verifier};

fn bench_catalog_parse(c: &mut Criterion) {
    c.bench_function("catalog_bundled_parse", |b| {
        b.iter(|| Catalog::bundled().unwrap());
    });
}

fn bench_quote(c: &mut Criterion) {
    let catalog = Catalog::bundled().unwrap();
    let request = QuoteRequest {
        item_id: "starfruit".into(),
        quality_tier: QualityTier::Iridium,
        active_professions: vec!["tiller".into(), "artisan".into()],
        processing_choice: Some(ProcessingChoice::Keg),
    };
    c.bench_function("quote(starfruit, iridium, keg)", |b| {
        b.iter(|| calculator::quote(black_box(&catalog), black_box(&request)).unwrap());
    });
}

fn bench_best_strategy_all_items(c: &mut Criterion) {
    let catalog = Catalog::bundled().unwrap();
    let ctx = PricingContext::resolve(&catalog, QualityTier::Gold, &["artisan"], None).unwrap();
    c.bench_function("best_strategy(all items)", |b| {
        b.iter(|| {
            for item in &catalog.items {
                best_strategy(black_box(item), &ctx).unwrap();
            }
        });
    });
}

fn bench_rank_summer(c: &mut Criterion) {
    let catalog = Catalog::bundled().unwrap();
    let ctx =
        PricingContext::resolve::<&str>(&catalog, QualityTier::Normal, &[], Some("speed_gro"))
            .unwrap();
    c.bench_function("rank_crops(summer, speed_gro)", |b| {
        b.iter(|| planner::rank_crops(black_box(&catalog), &ctx, Some(Season::Summer)).unwrap());
    });
}

fn bench_check_catalog(c: &mut Criterion) {
    let catalog = Catalog::bundled().unwrap();
    c.bench_function("check_catalog(bundled)", |b| {
        b.iter(|| check_catalog(black_box(&catalog), &OFFICIAL));
    });
}

fn bench_verify_run(c: &mut Criterion) {
    let catalog = Catalog::bundled().unwrap();
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut verifier = Verifier::new(OFFICIAL);
    c.bench_function("verifier_run", |b| {
        b.iter(|| verifier.run(black_box(&catalog), VerificationRecord::default(), now));
    });
}

criterion_group!(
    benches,
    bench_catalog_parse,
    bench_quote,
    bench_best_strategy_all_items,
    bench_rank_summer,
    bench_check_catalog,
    bench_verify_run,
);
criterion_main!(benches);
