//! # Catalog: Item, Fertilizer and Profession Reference Data
//!
//! The catalog is a JSON document with three ordered sequences:
//!
//! ```json
//! { "items": [...], "fertilizers": [...], "professions": [...] }
//! ```
//!
//! It is loaded once per process (either the bundled copy compiled into the
//! binary or a file given on the command line), validated for structural
//! consistency, and then only ever borrowed immutably. Whether the prices it
//! carries are *correct* is not checked here; that is the job of
//! [`crate::verify`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::PricingError;
use crate::modifiers::Profession;
use crate::processing::{JarProduct, KegProduct};

/// Catalog shipped with the binary.
const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

/// Largest profession bonus a catalog may declare (+1000%).
const MAX_PROFESSION_BONUS: f64 = 10.0;

/// Sellable item categories. Professions select on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Crop,
    Fruit,
    Fish,
    Forage,
    AnimalProduct,
    Mineral,
    ArtisanGood,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Crop => "crop",
            Category::Fruit => "fruit",
            Category::Fish => "fish",
            Category::Forage => "forage",
            Category::AnimalProduct => "animal_product",
            Category::Mineral => "mineral",
            Category::ArtisanGood => "artisan_good",
        };
        write!(f, "{}", s)
    }
}

/// Growing season, or a marker for crops that grow year-round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    Greenhouse,
    Any,
}

impl Season {
    fn is_year_round(self) -> bool {
        matches!(self, Season::Greenhouse | Season::Any)
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
            Season::Greenhouse => "greenhouse",
            Season::Any => "any",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            "greenhouse" => Ok(Season::Greenhouse),
            "any" => Ok(Season::Any),
            other => Err(format!("unknown season '{}'", other)),
        }
    }
}

/// How an item is sold: as-is, or after a preserves jar or keg.
///
/// Declaration order is the tie-break order used when picking a best
/// strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingChoice {
    Raw,
    Jar,
    Keg,
}

impl ProcessingChoice {
    pub const ORDER: [ProcessingChoice; 3] =
        [ProcessingChoice::Raw, ProcessingChoice::Jar, ProcessingChoice::Keg];
}

impl std::fmt::Display for ProcessingChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingChoice::Raw => write!(f, "raw"),
            ProcessingChoice::Jar => write!(f, "jar"),
            ProcessingChoice::Keg => write!(f, "keg"),
        }
    }
}

impl std::str::FromStr for ProcessingChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(ProcessingChoice::Raw),
            "jar" => Ok(ProcessingChoice::Jar),
            "keg" => Ok(ProcessingChoice::Keg),
            other => Err(format!("unknown processing '{}'. Valid: raw, jar, keg", other)),
        }
    }
}

/// Keg and jar outputs declared for an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keg_product: Option<KegProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keg_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keg_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_product: Option<JarProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jar_days: Option<u32>,
}

impl ProcessingDescriptor {
    /// Whether the descriptor has a product for `choice`. Raw is always
    /// offered.
    pub fn offers(&self, choice: ProcessingChoice) -> bool {
        match choice {
            ProcessingChoice::Raw => true,
            ProcessingChoice::Jar => self.jar_product.is_some(),
            ProcessingChoice::Keg => self.keg_product.is_some(),
        }
    }
}

/// A sellable, possibly growable, entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub sell_price: i64,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regrowth_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<Season>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing: Option<ProcessingDescriptor>,
}

impl Item {
    /// Whether the item offers `choice`. Items without a descriptor only
    /// offer raw sale.
    pub fn offers(&self, choice: ProcessingChoice) -> bool {
        match &self.processing {
            Some(p) => p.offers(choice),
            None => choice == ProcessingChoice::Raw,
        }
    }

    /// Number of 28-day seasons the item can grow through. Greenhouse and
    /// year-round markers count as all four.
    pub fn season_count(&self) -> u32 {
        if self.seasons.iter().any(|s| s.is_year_round()) {
            return 4;
        }
        let distinct: HashSet<Season> = self.seasons.iter().copied().collect();
        distinct.len() as u32
    }

    /// Whether the item grows in `season`. Year-round items grow in all.
    pub fn grows_in(&self, season: Season) -> bool {
        self.seasons
            .iter()
            .any(|s| *s == season || s.is_year_round())
    }

    pub fn is_crop(&self) -> bool {
        self.growth_days.is_some()
    }
}

/// A fertilizer that shortens growth time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fertilizer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: i64,
    /// Fraction of growth time removed, e.g. `0.1` for Speed-Gro.
    #[serde(default)]
    pub growth_reduction: f64,
}

/// The full catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<Item>,
    #[serde(default)]
    pub fertilizers: Vec<Fertilizer>,
    #[serde(default)]
    pub professions: Vec<Profession>,
}

impl Catalog {
    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(content: &str) -> Result<Catalog> {
        let catalog: Catalog = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        Catalog::from_json(&content).with_context(|| format!("parsing catalog {}", path.display()))
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Catalog> {
        Catalog::from_json(BUNDLED_CATALOG).context("parsing bundled catalog")
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Like [`Catalog::item`], but as a typed calculator failure.
    pub fn require_item(&self, id: &str) -> Result<&Item, PricingError> {
        self.item(id).ok_or_else(|| PricingError::ItemNotFound {
            item_id: id.to_string(),
        })
    }

    pub fn profession(&self, id: &str) -> Option<&Profession> {
        self.professions.iter().find(|p| p.id == id)
    }

    /// Resolve a list of profession ids, failing on the first unknown one.
    pub fn resolve_professions<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> Result<Vec<&Profession>, PricingError> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                self.profession(id)
                    .ok_or_else(|| PricingError::UnknownProfession {
                        profession_id: id.to_string(),
                    })
            })
            .collect()
    }

    pub fn fertilizer(&self, id: &str) -> Option<&Fertilizer> {
        self.fertilizers.iter().find(|f| f.id == id)
    }

    /// Structural checks: unique ids, non-negative prices, sane day counts.
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if item.id.is_empty() {
                anyhow::bail!("item '{}' has an empty id", item.name);
            }
            if !seen.insert(item.id.as_str()) {
                anyhow::bail!("duplicate item id '{}'", item.id);
            }
            if item.sell_price < 0 {
                anyhow::bail!("item '{}' has negative sellPrice {}", item.id, item.sell_price);
            }
            if let Some(seed) = item.seed_price {
                if seed < 0 {
                    anyhow::bail!("item '{}' has negative seedPrice {}", item.id, seed);
                }
            }
            if item.growth_days == Some(0) {
                anyhow::bail!("item '{}' has growthDays 0", item.id);
            }
            match (item.growth_days, item.regrowth_days) {
                (_, Some(0)) => anyhow::bail!("item '{}' has regrowthDays 0", item.id),
                (None, Some(_)) => {
                    anyhow::bail!("item '{}' has regrowthDays without growthDays", item.id)
                }
                (Some(g), Some(r)) if r > g => anyhow::bail!(
                    "item '{}' regrowthDays {} exceeds growthDays {}",
                    item.id,
                    r,
                    g
                ),
                _ => {}
            }
            if let Some(p) = &item.processing {
                validate_descriptor(&item.id, p)?;
            }
        }

        let mut seen = HashSet::new();
        for prof in &self.professions {
            if !seen.insert(prof.id.as_str()) {
                anyhow::bail!("duplicate profession id '{}'", prof.id);
            }
            if !prof.bonus.is_finite() || !(0.0..=MAX_PROFESSION_BONUS).contains(&prof.bonus) {
                anyhow::bail!(
                    "profession '{}' bonus {} must be in [0, {}]",
                    prof.id,
                    prof.bonus,
                    MAX_PROFESSION_BONUS
                );
            }
        }

        let mut seen = HashSet::new();
        for fert in &self.fertilizers {
            if !seen.insert(fert.id.as_str()) {
                anyhow::bail!("duplicate fertilizer id '{}'", fert.id);
            }
            if !(0.0..1.0).contains(&fert.growth_reduction) {
                anyhow::bail!(
                    "fertilizer '{}' growthReduction {} must be in [0, 1)",
                    fert.id,
                    fert.growth_reduction
                );
            }
        }
        Ok(())
    }
}

fn validate_descriptor(item_id: &str, p: &ProcessingDescriptor) -> Result<()> {
    if p.keg_product.is_some() && (p.keg_price.is_none() || p.keg_days.is_none()) {
        anyhow::bail!("item '{}' declares a keg product without kegPrice/kegDays", item_id);
    }
    if p.jar_product.is_some() && p.jar_price.is_none() {
        anyhow::bail!("item '{}' declares a jar product without jarPrice", item_id);
    }
    if p.keg_days == Some(0) {
        anyhow::bail!("item '{}' has kegDays 0", item_id);
    }
    for price in [p.keg_price, p.jar_price].into_iter().flatten() {
        if price < 0 {
            anyhow::bail!("item '{}' has a negative processed price {}", item_id, price);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.items.len() >= 10);
        assert!(catalog.item("strawberry").is_some());
        assert!(catalog.profession("tiller").is_some());
        assert!(catalog.fertilizer("speed_gro").is_some());
    }

    #[test]
    fn parses_camel_case_item() {
        let json = r#"{
            "items": [{
                "id": "blueberry", "name": "Blueberry", "sellPrice": 50,
                "category": "fruit", "seedPrice": 80, "growthDays": 13,
                "regrowthDays": 4, "seasons": ["summer"],
                "processing": {"kegProduct": "Wine", "kegPrice": 150, "kegDays": 7,
                               "jarProduct": "Jelly", "jarPrice": 150, "jarDays": 3}
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let b = catalog.item("blueberry").unwrap();
        assert_eq!(b.sell_price, 50);
        assert_eq!(b.regrowth_days, Some(4));
        let p = b.processing.as_ref().unwrap();
        assert_eq!(p.keg_product, Some(KegProduct::Wine));
        assert_eq!(p.jar_days, Some(3));
        assert!(catalog.fertilizers.is_empty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let json = r#"{"items": [
            {"id": "a", "name": "A", "sellPrice": 1, "category": "crop"},
            {"id": "a", "name": "A2", "sellPrice": 2, "category": "crop"}
        ]}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("duplicate item id"));
    }

    #[test]
    fn rejects_regrowth_longer_than_growth() {
        let json = r#"{"items": [
            {"id": "a", "name": "A", "sellPrice": 1, "category": "crop",
             "growthDays": 4, "regrowthDays": 5}
        ]}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("exceeds growthDays"));
    }

    #[test]
    fn rejects_oversized_profession_bonus() {
        let json = r#"{"items": [],
            "professions": [{"id": "tycoon", "bonus": 1e15, "appliesTo": ["crop"]}]
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(err.to_string().contains("bonus"));
    }

    #[test]
    fn rejects_negative_price() {
        let json = r#"{"items": [
            {"id": "a", "name": "A", "sellPrice": -1, "category": "crop"}
        ]}"#;
        assert!(Catalog::from_json(json).is_err());
    }

    #[test]
    fn require_item_is_typed() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.require_item("nope").unwrap_err(),
            PricingError::ItemNotFound {
                item_id: "nope".into()
            }
        );
    }

    #[test]
    fn season_helpers() {
        let catalog = Catalog::bundled().unwrap();
        let ancient = catalog.item("ancient_fruit").unwrap();
        assert_eq!(ancient.season_count(), 3);
        assert!(ancient.grows_in(Season::Fall));
        assert!(!ancient.grows_in(Season::Winter));

        let mut greenhouse = ancient.clone();
        greenhouse.seasons = vec![Season::Greenhouse];
        assert_eq!(greenhouse.season_count(), 4);
        assert!(greenhouse.grows_in(Season::Winter));
    }

    #[test]
    fn offers_follows_descriptor() {
        let catalog = Catalog::bundled().unwrap();
        let sturgeon = catalog.item("sturgeon").unwrap();
        assert!(sturgeon.offers(ProcessingChoice::Raw));
        assert!(!sturgeon.offers(ProcessingChoice::Keg));

        let onion = catalog.item("spring_onion").unwrap();
        assert!(onion.offers(ProcessingChoice::Jar));
        assert!(!onion.offers(ProcessingChoice::Keg));
    }

    #[test]
    fn processing_choice_order_is_raw_jar_keg() {
        let mut v = vec![ProcessingChoice::Keg, ProcessingChoice::Raw, ProcessingChoice::Jar];
        v.sort();
        assert_eq!(v, ProcessingChoice::ORDER.to_vec());
    }
}
