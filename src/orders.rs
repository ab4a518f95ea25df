//! Orders

use rust_decimal::Decimal;

/// One line of a customer order, as entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    item: String,
    quantity: Option<Decimal>,
}

impl OrderLine {
    /// Create an order line. A missing quantity counts as nothing ordered.
    pub fn new(item: impl Into<String>, quantity: Option<Decimal>) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }

    /// Raw item key.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Requested pounds or units, if any.
    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }
}

/// A raw customer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    lines: Vec<OrderLine>,
}

impl Order {
    /// Create an order from its lines.
    pub fn new(lines: impl Into<Vec<OrderLine>>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Convenience constructor from `(item, quantity)` pairs.
    pub fn from_quantities<K: Into<String>>(
        quantities: impl IntoIterator<Item = (K, Decimal)>,
    ) -> Self {
        Self {
            lines: quantities
                .into_iter()
                .map(|(item, quantity)| OrderLine::new(item, Some(quantity)))
                .collect(),
        }
    }

    /// Order lines in entry order.
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Lines with a positive quantity.
    pub fn requested(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.lines.iter().filter_map(|line| {
            line.quantity
                .filter(|quantity| *quantity > Decimal::ZERO)
                .map(|quantity| (line.item(), quantity))
        })
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the order has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
