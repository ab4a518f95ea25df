//! Raw item rules
//!
//! A customer orders raw items ("tail", "king", "clams"). Each raw item maps onto
//! one or two canonical items through a [`SplitRule`].

use rust_decimal::Decimal;
use smallvec::{SmallVec, smallvec};

use crate::catalog::CanonicalId;

/// How a raw item's ordered quantity becomes canonical demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// The quantity is the demand of one canonical item.
    Direct(CanonicalId),

    /// Items sold singly or in pairs: `n mod 2` singles and `floor(n / 2)` pairs.
    Paired {
        /// Item counted once
        single: CanonicalId,

        /// Item supplying two units
        pair: CanonicalId,
    },

    /// Items sold by the whole unit or by the half: `floor(n)` whole units plus
    /// one half unit when any fraction remains.
    Fractional {
        /// Whole-unit item
        whole: CanonicalId,

        /// Half-unit indicator item
        half: CanonicalId,
    },

    /// The quantity is added to a composite item shared with other
    /// interchangeable raw items.
    Merged(CanonicalId),
}

impl SplitRule {
    /// Split an ordered quantity into canonical demand.
    ///
    /// Both parts are always returned (possibly zero), so the parts recombine to
    /// the ordered quantity: `single + 2 * pair == n` for paired items, and
    /// `whole + half` keeps the whole/partial status of `n` for fractional items.
    pub fn split(self, quantity: Decimal) -> SmallVec<[(CanonicalId, Decimal); 2]> {
        match self {
            SplitRule::Direct(id) | SplitRule::Merged(id) => smallvec![(id, quantity)],
            SplitRule::Paired { single, pair } => {
                let pairs = (quantity / Decimal::TWO).floor();

                smallvec![(single, quantity % Decimal::TWO), (pair, pairs)]
            }
            SplitRule::Fractional { whole, half } => {
                let whole_units = quantity.floor();

                smallvec![(whole, whole_units), (half, (quantity - whole_units).ceil())]
            }
        }
    }
}

/// An orderable item.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub(crate) key: String,
    pub(crate) rule: SplitRule,
    pub(crate) whole_units: bool,
}

impl RawItem {
    /// Order key, e.g. `tail`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Mapping onto canonical items.
    pub fn rule(&self) -> SplitRule {
        self.rule
    }

    /// Whether the item must be ordered by the whole unit (or whole pound).
    pub fn requires_whole_units(&self) -> bool {
        self.whole_units
    }
}
