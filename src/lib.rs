//! King Crab
//!
//! King Crab finds the cheapest way to buy a seafood boil order. Raw order lines are
//! normalized onto the menu's canonical items, a mixed-integer program chooses combos
//! and a-la-carte items that cover the demand, and a free-item promotion is claimed
//! whenever the order qualifies.

pub mod catalog;
pub mod fixtures;
pub mod model;
pub mod normalize;
pub mod orders;
pub mod plan;
pub mod prelude;
pub mod promotion;
pub mod report;
pub mod solvers;
