//! End-to-end planning against the shipped boil-house menu.

use std::time::Duration;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use kingcrab::prelude::*;

fn fixture() -> Fixture {
    Fixture::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
}

fn menu() -> Result<Catalog, FixtureError> {
    fixture().load_catalog("boil")
}

fn demand_of(catalog: &Catalog, demand: &NormalizedDemand, key: &str) -> Result<Decimal, String> {
    catalog
        .item_id(key)
        .map(|id| demand.get(id))
        .ok_or_else(|| format!("missing {key}"))
}

#[test]
fn shipped_menu_keeps_free_items_at_their_menu_positions() -> TestResult {
    let catalog = menu()?;
    let [corn, potato] = catalog.promotion().items();

    assert_eq!(catalog.items().len(), 18);
    assert_eq!(catalog.combos().len(), 5);
    assert_eq!(corn.index(), 2);
    assert_eq!(potato.index(), 9);
    assert_eq!(catalog.promotion_credit(), Money::from_minor(130, USD));

    Ok(())
}

#[test]
fn tails_order_buys_a_la_carte_and_claims_promotion() -> TestResult {
    let catalog = menu()?;
    let order = fixture().load_order("tails")?;

    let plan = plan_order(&catalog, &order, &MILPSolver::new())?;

    assert_eq!(demand_of(&catalog, plan.demand(), "tail_1")?, Decimal::ONE);
    assert_eq!(demand_of(&catalog, plan.demand(), "tail_2")?, Decimal::ONE);

    let report = Report::new(&catalog, &order, &plan)?;
    let purchases = report.purchase_plan().ok_or("expected an optimal plan")?;

    // 12.99 + 23.99 + 0.75 + 0.55
    assert_eq!(report.reference_cost(), Money::from_minor(3828, USD));
    assert!(purchases.promotion_triggered());
    assert!(purchases.combos().is_empty());
    assert_eq!(purchases.total(), Money::from_minor(3698, USD));
    assert_eq!(purchases.savings(), Money::from_minor(130, USD));

    Ok(())
}

#[test]
fn king_crab_splits_into_whole_and_half_pounds() -> TestResult {
    let catalog = menu()?;
    let order = fixture().load_order("king")?;

    let demand = normalize(&catalog, &order)?;

    assert_eq!(demand_of(&catalog, &demand, "king_one")?, Decimal::from(2));
    assert_eq!(demand_of(&catalog, &demand, "king_half")?, Decimal::ONE);
    assert_eq!(demand_of(&catalog, &demand, "corn")?, Decimal::from(2));

    Ok(())
}

#[test]
fn crawfish_clams_and_mussels_merge() -> TestResult {
    let catalog = menu()?;
    let order = Order::from_quantities([
        ("crawfish", Decimal::ONE),
        ("clams", Decimal::ONE),
        ("mussels", Decimal::ONE),
    ]);

    let demand = normalize(&catalog, &order)?;

    assert_eq!(demand_of(&catalog, &demand, "ccm")?, Decimal::from(3));
    assert_eq!(demand.total_where(|_| true), Decimal::from(3));

    Ok(())
}

#[test]
fn fractional_whole_unit_item_stops_before_solving() -> TestResult {
    let catalog = menu()?;
    let order = fixture().load_order("invalid")?;

    let err = plan_order(&catalog, &order, &MILPSolver::new())
        .err()
        .ok_or("expected a validation error")?;

    assert!(matches!(
        &err,
        PlanError::Normalize(NormalizeError::NonIntegerQuantity { item, quantity })
            if item == "corn" && *quantity == Decimal::new(15, 1)
    ));

    let message = err.to_string();
    assert!(message.contains("corn"));
    assert!(message.contains("1.5"));

    Ok(())
}

#[test]
fn optimal_plans_cover_demand_and_never_cost_more_than_a_la_carte() -> TestResult {
    let catalog = menu()?;

    for name in ["family", "tails", "king", "veggies"] {
        let order = fixture().load_order(name)?;
        let plan = plan_order(
            &catalog,
            &order,
            &MILPSolver::with_timeout(Duration::from_secs(60)),
        )?;

        let solution = plan
            .solution()
            .optimal()
            .ok_or_else(|| format!("{name}: expected an optimal plan"))?;

        for (id, required) in plan.demand().iter() {
            let from_combos: u32 = catalog
                .combo_ids()
                .filter_map(|combo_id| {
                    let combo = catalog.combo(combo_id)?;

                    Some(combo.quantity_of(id) * solution.combo_count(combo_id))
                })
                .sum();

            let supplied = Decimal::from(from_combos + solution.purchased(id));

            assert!(
                supplied >= required,
                "{name}: item {} supplied {supplied} < {required}",
                id.index()
            );
        }

        let report = Report::new(&catalog, &order, &plan)?;
        let purchases = report.purchase_plan().ok_or("expected an optimal plan")?;

        assert!(
            purchases.savings().to_minor_units() >= 0,
            "{name}: negative savings {}",
            purchases.savings()
        );
    }

    Ok(())
}

#[test]
fn vegetables_alone_do_not_trigger_the_promotion() -> TestResult {
    let catalog = menu()?;
    let order = fixture().load_order("veggies")?;

    let plan = plan_order(&catalog, &order, &MILPSolver::new())?;
    let solution = plan.solution().optimal().ok_or("expected an optimal plan")?;

    assert!(!plan.promotion().is_eligible());
    assert!(!solution.promotion_active());

    // 2 * 0.75 + 2 * 0.55 + 2.99
    assert!((solution.objective() - 559.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn report_renders_order_and_totals() -> TestResult {
    let catalog = menu()?;
    let order = fixture().load_order("tails")?;

    let plan = plan_order(&catalog, &order, &MILPSolver::new())?;
    let report = Report::new(&catalog, &order, &plan)?;

    let mut out = Vec::new();
    report.write_to(&mut out)?;
    let text = String::from_utf8(out)?;

    assert!(text.contains("Lobster Tail"));
    assert!(text.contains("$38.28"));
    assert!(text.contains("$36.98"));
    assert!(text.contains("1 Corn and 1 Potato"));

    Ok(())
}
