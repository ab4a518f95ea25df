//! Catalog
//!
//! Canonical items, combos and the raw-item rules that map a customer order onto
//! canonical items. Items and combos are sorted by key once, when the catalog is
//! built, and every identifier handed out afterwards is an index into those
//! sorted lists. Nothing downstream reorders them.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

pub mod builder;
pub mod error;
pub mod rules;

pub use builder::{CatalogBuilder, RawRule};
pub use error::CatalogError;
pub use rules::{RawItem, SplitRule};

/// Identifier of a canonical item, aligned with its position in [`Catalog::items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalId(usize);

impl CanonicalId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the item in the catalog's sorted item list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identifier of a combo, aligned with its position in [`Catalog::combos`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComboId(usize);

impl ComboId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the combo in the catalog's sorted combo list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A-la-carte item after splitting and merging.
#[derive(Debug, Clone)]
pub struct CanonicalItem {
    key: String,
    name: String,
    price: Money<'static, Currency>,
    seafood: bool,
}

impl CanonicalItem {
    /// Catalog key, e.g. `king_half`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price when bought a-la-carte.
    pub fn price(&self) -> Money<'static, Currency> {
        self.price
    }

    /// Whether the item counts towards promotion eligibility.
    pub fn is_seafood(&self) -> bool {
        self.seafood
    }
}

/// Pre-priced package supplying fixed quantities of canonical items.
#[derive(Debug, Clone)]
pub struct Combo {
    key: String,
    name: String,
    price: Money<'static, Currency>,
    contents: Vec<u32>,
}

impl Combo {
    /// Catalog key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of one combo.
    pub fn price(&self) -> Money<'static, Currency> {
        self.price
    }

    /// Units of `item` supplied by one combo.
    pub fn quantity_of(&self, item: CanonicalId) -> u32 {
        self.contents.get(item.index()).copied().unwrap_or(0)
    }

    /// Make-up vector, aligned with [`Catalog::items`].
    pub fn contents(&self) -> &[u32] {
        &self.contents
    }
}

/// "Free corn and potato" style promotion: two canonical items whose unit prices
/// are credited back when the promotion is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeItemPromotion {
    items: [CanonicalId; 2],
}

impl FreeItemPromotion {
    /// The two items made free.
    pub fn items(&self) -> [CanonicalId; 2] {
        self.items
    }
}

/// Immutable catalog for one menu version.
#[derive(Debug)]
pub struct Catalog {
    currency: &'static Currency,
    items: Vec<CanonicalItem>,
    combos: Vec<Combo>,
    item_keys: FxHashMap<String, CanonicalId>,
    combo_keys: FxHashMap<String, ComboId>,
    raw_items: Vec<RawItem>,
    raw_keys: FxHashMap<String, usize>,
    promotion: FreeItemPromotion,
}

impl Catalog {
    /// Start building a catalog priced in `currency`.
    pub fn builder(currency: &'static Currency) -> CatalogBuilder {
        CatalogBuilder::new(currency)
    }

    /// Currency of every price in the catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Canonical items, sorted by key.
    pub fn items(&self) -> &[CanonicalItem] {
        &self.items
    }

    /// Look up a canonical item.
    pub fn item(&self, id: CanonicalId) -> Option<&CanonicalItem> {
        self.items.get(id.index())
    }

    /// Resolve a canonical item key.
    pub fn item_id(&self, key: &str) -> Option<CanonicalId> {
        self.item_keys.get(key).copied()
    }

    /// All canonical item identifiers, in index order.
    pub fn item_ids(&self) -> impl Iterator<Item = CanonicalId> + '_ {
        (0..self.items.len()).map(CanonicalId::new)
    }

    /// Combos, sorted by key.
    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    /// Look up a combo.
    pub fn combo(&self, id: ComboId) -> Option<&Combo> {
        self.combos.get(id.index())
    }

    /// Resolve a combo key.
    pub fn combo_id(&self, key: &str) -> Option<ComboId> {
        self.combo_keys.get(key).copied()
    }

    /// All combo identifiers, in index order.
    pub fn combo_ids(&self) -> impl Iterator<Item = ComboId> + '_ {
        (0..self.combos.len()).map(ComboId::new)
    }

    /// Raw (orderable) items, sorted by key.
    pub fn raw_items(&self) -> &[RawItem] {
        &self.raw_items
    }

    /// Resolve a raw item key to its position in [`Catalog::raw_items`].
    pub fn raw_item_index(&self, key: &str) -> Option<usize> {
        self.raw_keys.get(key).copied()
    }

    /// Look up a raw item by key.
    pub fn raw_item(&self, key: &str) -> Option<&RawItem> {
        self.raw_item_index(key)
            .and_then(|index| self.raw_items.get(index))
    }

    /// The free-item promotion.
    pub fn promotion(&self) -> &FreeItemPromotion {
        &self.promotion
    }

    /// Fixed credit granted when the promotion is active: one unit of each free item.
    pub fn promotion_credit(&self) -> Money<'static, Currency> {
        let minor_units = self
            .promotion
            .items
            .iter()
            .filter_map(|id| self.item(*id))
            .map(|item| item.price.to_minor_units())
            .fold(0_i64, i64::saturating_add);

        Money::from_minor(minor_units, self.currency)
    }
}
