//! Builder for validated catalogs.

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, iso::Currency};

use crate::catalog::{
    CanonicalId, CanonicalItem, Catalog, CatalogError, Combo, ComboId, FreeItemPromotion,
    rules::{RawItem, SplitRule},
};

/// Rule for a raw item, naming canonical items by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRule {
    /// Sold singly or in pairs.
    Paired {
        /// Key of the single-unit item
        single: String,

        /// Key of the paired item
        pair: String,
    },

    /// Sold by the whole unit or by the half.
    Fractional {
        /// Key of the whole-unit item
        whole: String,

        /// Key of the half-unit item
        half: String,
    },

    /// Interchangeable with other raw items; summed into one composite item.
    Merged {
        /// Key of the composite item
        into: String,
    },
}

#[derive(Debug)]
struct PendingCombo {
    key: String,
    name: String,
    price: Money<'static, Currency>,
    contents: Vec<(String, u32)>,
}

/// Builder for a [`Catalog`].
///
/// Collects items, combos and rules in any order; [`CatalogBuilder::build`] sorts
/// them, assigns identifiers and validates every cross reference.
#[derive(Debug)]
pub struct CatalogBuilder {
    currency: &'static Currency,
    items: Vec<CanonicalItem>,
    combos: Vec<PendingCombo>,
    rules: Vec<(String, RawRule)>,
    whole_units: Vec<String>,
    free_items: Option<(String, String)>,
}

impl CatalogBuilder {
    /// Create an empty builder for prices in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
            combos: Vec::new(),
            rules: Vec::new(),
            whole_units: Vec::new(),
            free_items: None,
        }
    }

    /// Add a canonical item.
    pub fn item(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
        seafood: bool,
    ) -> &mut Self {
        self.items.push(CanonicalItem {
            key: key.into(),
            name: name.into(),
            price,
            seafood,
        });

        self
    }

    /// Add a combo with its make-up (canonical item key, units supplied).
    pub fn combo<K: Into<String>>(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        price: Money<'static, Currency>,
        contents: impl IntoIterator<Item = (K, u32)>,
    ) -> &mut Self {
        self.combos.push(PendingCombo {
            key: key.into(),
            name: name.into(),
            price,
            contents: contents
                .into_iter()
                .map(|(item, quantity)| (item.into(), quantity))
                .collect(),
        });

        self
    }

    /// Map a raw item onto canonical items.
    pub fn rule(&mut self, raw_key: impl Into<String>, rule: RawRule) -> &mut Self {
        self.rules.push((raw_key.into(), rule));

        self
    }

    /// Mark raw items that must be ordered by the whole unit.
    pub fn whole_units<K: Into<String>>(&mut self, keys: impl IntoIterator<Item = K>) -> &mut Self {
        self.whole_units.extend(keys.into_iter().map(Into::into));

        self
    }

    /// Set the two items made free by the promotion.
    pub fn free_items(&mut self, first: impl Into<String>, second: impl Into<String>) -> &mut Self {
        self.free_items = Some((first.into(), second.into()));

        self
    }

    /// Validate and assemble the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for duplicate keys, dangling item references,
    /// negative or mixed-currency prices, or a missing/degenerate promotion.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let CatalogBuilder {
            currency,
            mut items,
            mut combos,
            rules,
            whole_units,
            free_items,
        } = self;

        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        for item in &items {
            check_price(&item.key, item.price, currency)?;
        }

        items.sort_by(|a, b| a.key.cmp(&b.key));

        let mut item_keys = FxHashMap::default();

        for (index, item) in items.iter().enumerate() {
            if item_keys
                .insert(item.key.clone(), CanonicalId::new(index))
                .is_some()
            {
                return Err(CatalogError::DuplicateItem(item.key.clone()));
            }
        }

        let resolve = |key: &str, context: &str| {
            item_keys
                .get(key)
                .copied()
                .ok_or_else(|| CatalogError::UnknownItem {
                    item: key.to_string(),
                    context: context.to_string(),
                })
        };

        combos.sort_by(|a, b| a.key.cmp(&b.key));

        let mut combo_keys = FxHashMap::default();
        let mut built_combos = Vec::with_capacity(combos.len());

        for (index, combo) in combos.into_iter().enumerate() {
            check_price(&combo.key, combo.price, currency)?;

            let mut contents = vec![0_u32; items.len()];

            for (item_key, quantity) in &combo.contents {
                let id = resolve(item_key, &format!("combo `{}`", combo.key))?;

                if let Some(slot) = contents.get_mut(id.index()) {
                    *slot = slot.saturating_add(*quantity);
                }
            }

            if combo_keys
                .insert(combo.key.clone(), ComboId::new(index))
                .is_some()
            {
                return Err(CatalogError::DuplicateCombo(combo.key));
            }

            built_combos.push(Combo {
                key: combo.key,
                name: combo.name,
                price: combo.price,
                contents,
            });
        }

        // Raw items with explicit rules; the canonical items they produce are not
        // orderable by their own key.
        let mut raw_items: Vec<RawItem> = Vec::with_capacity(items.len() + rules.len());
        let mut produced: FxHashSet<CanonicalId> = FxHashSet::default();

        for (raw_key, rule) in rules {
            let context = format!("raw item `{raw_key}`");

            let rule = match rule {
                RawRule::Paired { single, pair } => SplitRule::Paired {
                    single: resolve(&single, &context)?,
                    pair: resolve(&pair, &context)?,
                },
                RawRule::Fractional { whole, half } => SplitRule::Fractional {
                    whole: resolve(&whole, &context)?,
                    half: resolve(&half, &context)?,
                },
                RawRule::Merged { into } => SplitRule::Merged(resolve(&into, &context)?),
            };

            match rule {
                SplitRule::Paired { single, pair } => produced.extend([single, pair]),
                SplitRule::Fractional { whole, half } => produced.extend([whole, half]),
                SplitRule::Merged(id) | SplitRule::Direct(id) => {
                    produced.insert(id);
                }
            }

            raw_items.push(RawItem {
                key: raw_key,
                rule,
                whole_units: false,
            });
        }

        for (index, item) in items.iter().enumerate() {
            let id = CanonicalId::new(index);

            if !produced.contains(&id) {
                raw_items.push(RawItem {
                    key: item.key.clone(),
                    rule: SplitRule::Direct(id),
                    whole_units: false,
                });
            }
        }

        raw_items.sort_by(|a, b| a.key.cmp(&b.key));

        let mut raw_keys = FxHashMap::default();

        for (index, raw) in raw_items.iter().enumerate() {
            if raw_keys.insert(raw.key.clone(), index).is_some() {
                return Err(CatalogError::DuplicateRawItem(raw.key.clone()));
            }
        }

        for key in whole_units {
            let raw = raw_keys
                .get(&key)
                .and_then(|index| raw_items.get_mut(*index))
                .ok_or_else(|| CatalogError::UnknownRawItem(key.clone()))?;

            raw.whole_units = true;
        }

        let (first, second) = free_items.ok_or(CatalogError::MissingPromotion)?;

        if first == second {
            return Err(CatalogError::InvalidPromotion(first));
        }

        let promotion = FreeItemPromotion {
            items: [
                resolve(&first, "the free-item promotion")?,
                resolve(&second, "the free-item promotion")?,
            ],
        };

        Ok(Catalog {
            currency,
            items,
            combos: built_combos,
            item_keys,
            combo_keys,
            raw_items,
            raw_keys,
            promotion,
        })
    }
}

fn check_price(
    key: &str,
    price: Money<'static, Currency>,
    currency: &'static Currency,
) -> Result<(), CatalogError> {
    if price.currency() != currency {
        return Err(CatalogError::CurrencyMismatch {
            key: key.to_string(),
            expected: currency.iso_alpha_code,
            actual: price.currency().iso_alpha_code,
        });
    }

    if price.to_minor_units() < 0 {
        return Err(CatalogError::NegativePrice(key.to_string()));
    }

    Ok(())
}
