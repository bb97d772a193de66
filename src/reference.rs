//! Officially-known values the catalog is checked against.
//!
//! This is the only place expected values live. The verification engine
//! walks these tables instead of re-deriving numbers per check.

use crate::processing::{JarProduct, KegProduct};

/// Expected growth data for one item. Every field is compared exactly,
/// so `None` means the catalog must not carry a value either.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownItem {
    pub id: &'static str,
    pub sell_price: i64,
    pub seed_price: Option<i64>,
    pub growth_days: Option<u32>,
    pub regrowth_days: Option<u32>,
}

/// A processed product, keg or jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Keg(KegProduct),
    Jar(JarProduct),
}

impl Product {
    pub fn price(self, base: i64) -> Result<i64, crate::error::PricingError> {
        match self {
            Product::Keg(p) => p.price(base),
            Product::Jar(p) => p.price(base),
        }
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Product::Keg(p) => write!(f, "{}", p),
            Product::Jar(p) => write!(f, "{}", p),
        }
    }
}

/// A published processed price for a given item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownFormula {
    pub item_id: &'static str,
    pub product: Product,
    pub base: i64,
    pub expected: i64,
}

/// A published profession bonus, in basis points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownProfession {
    pub id: &'static str,
    pub bonus_bp: i64,
}

/// The complete set of reference values.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceTable {
    pub items: &'static [KnownItem],
    pub formulas: &'static [KnownFormula],
    pub professions: &'static [KnownProfession],
}

const fn item(
    id: &'static str,
    sell_price: i64,
    seed_price: Option<i64>,
    growth_days: u32,
    regrowth_days: Option<u32>,
) -> KnownItem {
    KnownItem {
        id,
        sell_price,
        seed_price,
        growth_days: Some(growth_days),
        regrowth_days,
    }
}

const ITEMS: &[KnownItem] = &[
    item("parsnip", 35, Some(20), 4, None),
    item("potato", 80, Some(50), 6, None),
    item("cauliflower", 175, Some(80), 12, None),
    item("strawberry", 120, Some(100), 8, Some(4)),
    item("blueberry", 50, Some(80), 13, Some(4)),
    item("hot_pepper", 40, Some(40), 5, Some(3)),
    item("melon", 250, Some(80), 12, None),
    item("starfruit", 750, Some(400), 13, None),
    item("pumpkin", 320, Some(100), 13, None),
    item("cranberries", 75, Some(240), 7, Some(5)),
    item("ancient_fruit", 550, None, 28, Some(7)),
];

const FORMULAS: &[KnownFormula] = &[
    KnownFormula {
        item_id: "strawberry",
        product: Product::Keg(KegProduct::Wine),
        base: 120,
        expected: 360,
    },
    KnownFormula {
        item_id: "strawberry",
        product: Product::Jar(JarProduct::Jelly),
        base: 120,
        expected: 290,
    },
    KnownFormula {
        item_id: "starfruit",
        product: Product::Keg(KegProduct::Wine),
        base: 750,
        expected: 2250,
    },
    KnownFormula {
        item_id: "ancient_fruit",
        product: Product::Jar(JarProduct::Jelly),
        base: 550,
        expected: 1150,
    },
    KnownFormula {
        item_id: "cauliflower",
        product: Product::Keg(KegProduct::Juice),
        base: 175,
        expected: 393,
    },
    KnownFormula {
        item_id: "pumpkin",
        product: Product::Jar(JarProduct::Pickles),
        base: 320,
        expected: 690,
    },
];

const PROFESSIONS: &[KnownProfession] = &[
    KnownProfession { id: "tiller", bonus_bp: 1000 },
    KnownProfession { id: "rancher", bonus_bp: 2000 },
    KnownProfession { id: "artisan", bonus_bp: 4000 },
    KnownProfession { id: "fisher", bonus_bp: 2500 },
    KnownProfession { id: "angler", bonus_bp: 5000 },
    KnownProfession { id: "gemologist", bonus_bp: 3000 },
];

/// The published reference values.
pub const OFFICIAL: ReferenceTable = ReferenceTable {
    items: ITEMS,
    formulas: FORMULAS,
    professions: PROFESSIONS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn item_ids_are_unique() {
        let ids: HashSet<&str> = OFFICIAL.items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), OFFICIAL.items.len());
    }

    #[test]
    fn published_formulas_agree_with_engine() {
        for f in OFFICIAL.formulas {
            assert_eq!(
                f.product.price(f.base).unwrap(),
                f.expected,
                "{} {} from base {}",
                f.item_id,
                f.product,
                f.base
            );
        }
    }

    #[test]
    fn formula_bases_match_known_item_prices() {
        for f in OFFICIAL.formulas {
            let known = OFFICIAL.items.iter().find(|i| i.id == f.item_id).unwrap();
            assert_eq!(known.sell_price, f.base, "{}", f.item_id);
        }
    }

    #[test]
    fn regrowth_never_exceeds_growth() {
        for i in OFFICIAL.items {
            if let (Some(g), Some(r)) = (i.growth_days, i.regrowth_days) {
                assert!(r <= g, "{}", i.id);
            }
        }
    }
}
