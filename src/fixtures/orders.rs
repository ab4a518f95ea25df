//! Order Fixtures

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_norway::Number;

use crate::{
    fixtures::FixtureError,
    orders::{Order, OrderLine},
};

/// Parse an order from YAML.
///
/// The document maps raw item keys to quantities; a null quantity counts as
/// nothing ordered and an empty document is an empty order. Lines are kept in
/// key order.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or a quantity is not a finite
/// decimal number.
pub fn order_from_str(contents: &str) -> Result<Order, FixtureError> {
    if contents.trim().is_empty() {
        return Ok(Order::default());
    }

    let fixture: BTreeMap<String, Option<Number>> = serde_norway::from_str(contents)?;

    let lines = fixture
        .into_iter()
        .map(|(item, quantity)| {
            let quantity = quantity
                .map(|number| parse_quantity(&item, &number))
                .transpose()?;

            Ok(OrderLine::new(item, quantity))
        })
        .collect::<Result<Vec<_>, FixtureError>>()?;

    Ok(Order::new(lines))
}

fn parse_quantity(item: &str, number: &Number) -> Result<Decimal, FixtureError> {
    let text = number.to_string();

    text.parse::<Decimal>()
        .or_else(|_err| Decimal::from_scientific(&text))
        .map_err(|_err| FixtureError::InvalidQuantity {
            item: item.to_string(),
            value: text.clone(),
        })
}
