//! Order report

use std::{io, time::Duration};

use decimal_percentage::Percentage;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{catalog::Catalog, orders::Order, plan::OrderPlan, solvers::Solution};

/// Errors that can occur when building or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The optimal total does not fit in minor units.
    #[error("optimal total {0} cannot be represented in minor units")]
    TotalNotRepresentable(f64),

    /// A line total overflowed.
    #[error("line total for {0} cannot be represented")]
    LineTotalNotRepresentable(String),

    /// Solution references an item or combo missing from the catalog.
    #[error("solution does not match the catalog")]
    CatalogMismatch,

    /// IO error
    #[error("IO error")]
    IO,
}

/// One purchased combo or a-la-carte item.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    key: String,
    name: String,
    quantity: u32,
    unit_price: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl ReportLine {
    fn new(
        key: &str,
        name: &str,
        quantity: u32,
        unit_price: Money<'static, Currency>,
    ) -> Result<Self, ReportError> {
        let total = unit_price
            .to_minor_units()
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| ReportError::LineTotalNotRepresentable(key.to_string()))?;

        Ok(Self {
            key: key.to_string(),
            name: name.to_string(),
            quantity,
            unit_price,
            total: Money::from_minor(total, unit_price.currency()),
        })
    }

    /// Catalog key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units bought
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price per unit
    pub fn unit_price(&self) -> Money<'static, Currency> {
        self.unit_price
    }

    /// `unit_price * quantity`
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }
}

/// Purchase plan of an optimal solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchasePlan {
    combos: Vec<ReportLine>,
    items: Vec<ReportLine>,
    promotion_triggered: bool,
    free_items: Vec<String>,
    total: Money<'static, Currency>,
    savings: Money<'static, Currency>,
    savings_percent: Option<Percentage>,
}

impl PurchasePlan {
    /// Combos bought (count > 0 only).
    pub fn combos(&self) -> &[ReportLine] {
        &self.combos
    }

    /// Items bought a-la-carte (count > 0 only).
    pub fn items(&self) -> &[ReportLine] {
        &self.items
    }

    /// Whether the solver claimed the free-item promotion.
    pub fn promotion_triggered(&self) -> bool {
        self.promotion_triggered
    }

    /// Names of the ordered items made free by the promotion.
    pub fn free_items(&self) -> &[String] {
        &self.free_items
    }

    /// Optimal total
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Reference cost minus the optimal total.
    pub fn savings(&self) -> Money<'static, Currency> {
        self.savings
    }

    /// Savings as a fraction of the reference cost. `None` when the reference is zero.
    pub fn savings_percent(&self) -> Option<Percentage> {
        self.savings_percent
    }
}

/// What the solver produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// An optimal purchase plan.
    Optimal(PurchasePlan),

    /// No purchase plan covers the order.
    Infeasible,

    /// The solver gave up.
    TimedOut(Duration),

    /// The solver failed.
    Failed(String),
}

/// Human-facing summary of a planned order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    order: Vec<(String, Decimal)>,
    reference_cost: Money<'static, Currency>,
    discounted_cost: Money<'static, Currency>,
    outcome: ReportOutcome,
}

impl Report {
    /// Build a report for `order` from its plan.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportError`] if money arithmetic overflows or the solution does
    /// not line up with `catalog`.
    pub fn new(catalog: &Catalog, order: &Order, plan: &OrderPlan) -> Result<Self, ReportError> {
        let promotion = plan.promotion();
        let reference_cost = promotion.reference_cost();

        let outcome = match plan.solution() {
            Solution::Optimal(solution) => {
                if solution.purchases().len() != catalog.items().len()
                    || solution.combos().len() != catalog.combos().len()
                {
                    return Err(ReportError::CatalogMismatch);
                }

                let mut combos = Vec::new();

                for (combo, &count) in catalog.combos().iter().zip(solution.combos()) {
                    if count > 0 {
                        combos.push(ReportLine::new(combo.key(), combo.name(), count, combo.price())?);
                    }
                }

                let mut items = Vec::new();

                for (item, &count) in catalog.items().iter().zip(solution.purchases()) {
                    if count > 0 {
                        items.push(ReportLine::new(item.key(), item.name(), count, item.price())?);
                    }
                }

                let promotion_triggered = solution.promotion_active();

                let free_items = if promotion_triggered {
                    promotion
                        .free_items()
                        .iter()
                        .map(|id| {
                            catalog
                                .item(*id)
                                .map(|item| item.name().to_string())
                                .ok_or(ReportError::CatalogMismatch)
                        })
                        .collect::<Result<Vec<_>, _>>()?
                } else {
                    Vec::new()
                };

                let objective = solution.objective();
                let total_minor = objective
                    .round()
                    .to_i64()
                    .ok_or(ReportError::TotalNotRepresentable(objective))?;

                let total = Money::from_minor(total_minor, catalog.currency());
                let savings = reference_cost.sub(total)?;

                ReportOutcome::Optimal(PurchasePlan {
                    combos,
                    items,
                    promotion_triggered,
                    free_items,
                    total,
                    savings,
                    savings_percent: savings_fraction(savings, reference_cost),
                })
            }
            Solution::Infeasible => ReportOutcome::Infeasible,
            Solution::TimedOut(timeout) => ReportOutcome::TimedOut(*timeout),
            Solution::Failed(message) => ReportOutcome::Failed(message.clone()),
        };

        Ok(Self {
            order: order
                .requested()
                .map(|(item, quantity)| (item.to_string(), quantity))
                .collect(),
            reference_cost,
            discounted_cost: promotion.discounted_cost(),
            outcome,
        })
    }

    /// Requested raw items with a positive quantity.
    pub fn order(&self) -> &[(String, Decimal)] {
        &self.order
    }

    /// Everything a-la-carte, no combos, no promotion.
    pub fn reference_cost(&self) -> Money<'static, Currency> {
        self.reference_cost
    }

    /// Everything a-la-carte with the free units removed.
    pub fn discounted_cost(&self) -> Money<'static, Currency> {
        self.discounted_cost
    }

    /// Solver outcome.
    pub fn outcome(&self) -> &ReportOutcome {
        &self.outcome
    }

    /// Optimal purchase plan, if any.
    pub fn purchase_plan(&self) -> Option<&PurchasePlan> {
        match &self.outcome {
            ReportOutcome::Optimal(plan) => Some(plan),
            _ => None,
        }
    }

    /// Writes the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReportError> {
        write_order_table(&mut out, &self.order)?;

        write_summary_line(&mut out, "A-la-carte:", &format!("{}", self.reference_cost))?;
        write_summary_line(
            &mut out,
            "With free items:",
            &format!("{}", self.discounted_cost),
        )?;

        match &self.outcome {
            ReportOutcome::Optimal(plan) => write_purchase_plan(&mut out, plan),
            ReportOutcome::Infeasible => {
                writeln!(out, "\nStatus: infeasible, no purchase plan covers this order")
                    .map_err(|_err| ReportError::IO)
            }
            ReportOutcome::TimedOut(timeout) => {
                writeln!(out, "\nStatus: timed out after {timeout:?}").map_err(|_err| ReportError::IO)
            }
            ReportOutcome::Failed(message) => {
                writeln!(out, "\nStatus: solver error: {message}").map_err(|_err| ReportError::IO)
            }
        }
    }
}

fn savings_fraction(
    savings: Money<'static, Currency>,
    reference: Money<'static, Currency>,
) -> Option<Percentage> {
    let reference_minor = reference.to_minor_units();

    if reference_minor == 0 {
        return None;
    }

    let savings_dec = Decimal::from_i64(savings.to_minor_units()).unwrap_or(Decimal::ZERO);
    let reference_dec = Decimal::from_i64(reference_minor).unwrap_or(Decimal::ZERO);

    Some(Percentage::from(savings_dec / reference_dec))
}

fn write_order_table(out: &mut impl io::Write, order: &[(String, Decimal)]) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Ordered", "Quantity"]);

    for (item, quantity) in order {
        builder.push_record([item.clone(), quantity.normalize().to_string()]);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..2), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)
}

fn write_purchase_plan(out: &mut impl io::Write, plan: &PurchasePlan) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Purchase", "Qty", "Unit Price", "Total"]);

    let combos = plan.combos.iter().map(|line| ("combo", line));
    let items = plan.items.iter().map(|line| ("item", line));

    for (kind, line) in combos.chain(items) {
        builder.push_record([
            kind.to_string(),
            line.name.clone(),
            line.quantity.to_string(),
            format!("{}", line.unit_price),
            format!("{}", line.total),
        ]);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(0..1), color_dark_grey());
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)?;

    if plan.promotion_triggered {
        let free = if plan.free_items.is_empty() {
            "claimed".to_string()
        } else {
            plan.free_items
                .iter()
                .map(|name| format!("1 {name}"))
                .collect::<Vec<_>>()
                .join(" and ")
        };

        write_summary_line(out, "Free items:", &free)?;
    }

    let savings_percent = plan
        .savings_percent
        .map_or_else(|| "n/a".to_string(), |pct| format!("{:.2}%", percent_points(pct)));

    write_summary_line(out, "Total:", &format!("\x1b[1m{}\x1b[0m", plan.total))?;
    write_summary_line(out, "Savings:", &format!("({savings_percent}) {}", plan.savings))?;

    writeln!(out).map_err(|_err| ReportError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}

const LABEL_WIDTH: usize = 18;

/// Writes a summary line with a right-aligned label.
fn write_summary_line(out: &mut impl io::Write, label: &str, value: &str) -> Result<(), ReportError> {
    writeln!(out, "{label:>LABEL_WIDTH$}  {value}").map_err(|_err| ReportError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
