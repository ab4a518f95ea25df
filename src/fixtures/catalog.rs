//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    catalog::{Catalog, CatalogBuilder, RawRule},
    fixtures::FixtureError,
};

/// Catalog in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Map of canonical item key -> item fixture
    pub items: FxHashMap<String, ItemFixture>,

    /// Map of combo key -> combo fixture
    #[serde(default)]
    pub combos: FxHashMap<String, ComboFixture>,

    /// Map of raw item key -> split rule
    #[serde(default)]
    pub rules: FxHashMap<String, RuleFixture>,

    /// Raw items sold only by the whole unit
    #[serde(default)]
    pub whole_units: Vec<String>,

    /// The two items given free with seafood
    pub free_items: Vec<String>,
}

/// Canonical item fixture
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Display name
    pub name: String,

    /// Price (e.g., "12.99 USD")
    pub price: String,

    /// Counts towards promotion eligibility
    #[serde(default)]
    pub seafood: bool,
}

/// Combo fixture
#[derive(Debug, Deserialize)]
pub struct ComboFixture {
    /// Display name
    pub name: String,

    /// Price (e.g., "49.99 USD")
    pub price: String,

    /// Canonical item key -> units supplied
    #[serde(default)]
    pub contents: FxHashMap<String, u32>,
}

/// How a raw item maps onto canonical items
#[derive(Debug, Deserialize)]
#[serde(tag = "split", rename_all = "snake_case")]
pub enum RuleFixture {
    /// Odd unit to `single`, pairs to `pair`
    Paired {
        /// Single-unit item
        single: String,

        /// Two-unit item
        pair: String,
    },

    /// Whole part to `whole`, any remainder to one `half`
    Fractional {
        /// Whole-unit item
        whole: String,

        /// Half-unit item
        half: String,
    },

    /// Added onto a composite item
    Merged {
        /// Composite item
        into: String,
    },
}

impl From<RuleFixture> for RawRule {
    fn from(fixture: RuleFixture) -> Self {
        match fixture {
            RuleFixture::Paired { single, pair } => RawRule::Paired { single, pair },
            RuleFixture::Fractional { whole, half } => RawRule::Fractional { whole, half },
            RuleFixture::Merged { into } => RawRule::Merged { into },
        }
    }
}

impl TryFrom<CatalogFixture> for Catalog {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let CatalogFixture {
            items,
            combos,
            rules,
            whole_units,
            free_items,
        } = fixture;

        let [first, second]: [String; 2] = free_items
            .try_into()
            .map_err(|names: Vec<String>| FixtureError::InvalidPromotion(names.len()))?;

        let mut currency: Option<&'static Currency> = None;
        let mut priced = |price: &str| -> Result<Money<'static, Currency>, FixtureError> {
            let (minor_units, parsed) = parse_price(price)?;

            match currency {
                Some(existing) if existing != parsed => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        parsed.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(parsed),
            }

            Ok(Money::from_minor(minor_units, parsed))
        };

        let mut parsed_items = Vec::with_capacity(items.len());

        for (key, item) in items {
            let price = priced(&item.price)?;
            parsed_items.push((key, item.name, price, item.seafood));
        }

        let mut parsed_combos = Vec::with_capacity(combos.len());

        for (key, combo) in combos {
            let price = priced(&combo.price)?;
            parsed_combos.push((key, combo.name, price, combo.contents));
        }

        let currency = currency.ok_or(FixtureError::NoItems)?;
        let mut builder = CatalogBuilder::new(currency);

        for (key, name, price, seafood) in parsed_items {
            builder.item(key, name, price, seafood);
        }

        for (key, name, price, contents) in parsed_combos {
            builder.combo(key, name, price, contents);
        }

        for (key, rule) in rules {
            builder.rule(key, rule.into());
        }

        builder.whole_units(whole_units).free_items(first, second);

        Ok(builder.build()?)
    }
}

/// Parse a catalog from YAML
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price cannot be parsed, or the
/// resulting catalog is invalid.
pub fn catalog_from_str(contents: &str) -> Result<Catalog, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(contents)?;

    fixture.try_into()
}

/// Parse price string (e.g., "12.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "USD" => USD,
        "GBP" => GBP,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::catalog::{CatalogError, SplitRule};

    use super::*;

    const MENU: &str = r#"
items:
  corn: { name: Corn, price: "0.75 USD" }
  potato: { name: Potato, price: "0.55 USD" }
  tail_1: { name: Lobster Tail, price: "12.99 USD", seafood: true }
  tail_2: { name: 2 Lobster Tails, price: "23.99 USD", seafood: true }
  king_one: { name: King Crab (1 lb), price: "64.99 USD", seafood: true }
  king_half: { name: King Crab (1/2 lb), price: "34.99 USD", seafood: true }
  ccm: { name: Crawfish / Clams / Mussels, price: "13.99 USD", seafood: true }
combos:
  surf:
    name: Surf Combo
    price: "29.99 USD"
    contents: { tail_1: 1, corn: 1, potato: 1, ccm: 1 }
rules:
  tail: { split: paired, single: tail_1, pair: tail_2 }
  king: { split: fractional, whole: king_one, half: king_half }
  crawfish: { split: merged, into: ccm }
  clams: { split: merged, into: ccm }
  mussels: { split: merged, into: ccm }
whole_units: [tail, corn, potato, clams]
free_items: [corn, potato]
"#;

    #[test]
    fn parses_items_combos_and_rules() -> TestResult {
        let catalog = catalog_from_str(MENU)?;

        assert_eq!(catalog.currency(), USD);
        assert_eq!(catalog.items().len(), 7);
        assert_eq!(catalog.combos().len(), 1);

        let tail = catalog.raw_item("tail").ok_or("missing tail")?;
        assert!(tail.requires_whole_units());
        assert!(matches!(tail.rule(), SplitRule::Paired { .. }));

        let crawfish = catalog.raw_item("crawfish").ok_or("missing crawfish")?;
        assert!(!crawfish.requires_whole_units());
        assert_eq!(
            crawfish.rule(),
            SplitRule::Merged(catalog.item_id("ccm").ok_or("missing ccm")?)
        );

        // produced by rules, so not orderable directly
        assert!(catalog.raw_item("tail_1").is_none());
        assert!(catalog.raw_item("ccm").is_none());

        let surf = catalog.combo_id("surf").and_then(|id| catalog.combo(id)).ok_or("missing surf")?;
        let corn = catalog.item_id("corn").ok_or("missing corn")?;
        let king = catalog.item_id("king_one").ok_or("missing king_one")?;

        assert_eq!(surf.price(), Money::from_minor(2999, USD));
        assert_eq!(surf.quantity_of(corn), 1);
        assert_eq!(surf.quantity_of(king), 0);

        Ok(())
    }

    #[test]
    fn promotion_credit_comes_from_free_items() -> TestResult {
        let catalog = catalog_from_str(MENU)?;

        assert_eq!(catalog.promotion_credit(), Money::from_minor(130, USD));

        Ok(())
    }

    #[test]
    fn rejects_mixed_currencies() {
        let yaml = r#"
items:
  corn: { name: Corn, price: "0.75 USD" }
  potato: { name: Potato, price: "0.55 GBP" }
free_items: [corn, potato]
"#;

        assert!(matches!(
            catalog_from_str(yaml),
            Err(FixtureError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn rejects_promotion_without_two_items() {
        let yaml = r#"
items:
  corn: { name: Corn, price: "0.75 USD" }
free_items: [corn]
"#;

        assert!(matches!(
            catalog_from_str(yaml),
            Err(FixtureError::InvalidPromotion(1))
        ));
    }

    #[test]
    fn rejects_combo_with_unknown_item() {
        let yaml = r#"
items:
  corn: { name: Corn, price: "0.75 USD" }
  potato: { name: Potato, price: "0.55 USD" }
combos:
  bad: { name: Bad, price: "1.00 USD", contents: { lobster: 1 } }
free_items: [corn, potato]
"#;

        assert!(matches!(
            catalog_from_str(yaml),
            Err(FixtureError::Catalog(CatalogError::UnknownItem { .. }))
        ));
    }

    #[test]
    fn rejects_unknown_split() {
        let yaml = r#"
items:
  corn: { name: Corn, price: "0.75 USD" }
  potato: { name: Potato, price: "0.55 USD" }
rules:
  corn_cob: { split: diced, into: corn }
free_items: [corn, potato]
"#;

        assert!(matches!(catalog_from_str(yaml), Err(FixtureError::Yaml(_))));
    }

    #[test]
    fn parse_price_is_exact() -> Result<(), FixtureError> {
        let (minor, currency) = parse_price("64.99 USD")?;

        assert_eq!(minor, 6499);
        assert_eq!(currency, USD);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }
}
