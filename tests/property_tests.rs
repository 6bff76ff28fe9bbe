//! Property-based tests for pricing and estimate aggregation.

use proptest::prelude::*;
use site_survey_api::services::aggregation::{compute_totals, tax_for, PricedLine};
use site_survey_api::services::pricing::{
    calculate_selling_price, format_currency, format_number, line_amount, PRICE_STEP,
};

#[derive(Debug, Clone)]
struct Line {
    selling: i64,
    cost: i64,
    quantity: String,
    selected: bool,
}

impl PricedLine for Line {
    fn selling_price(&self) -> i64 {
        self.selling
    }

    fn cost_price(&self) -> i64 {
        self.cost
    }

    fn quantity(&self) -> &str {
        &self.quantity
    }

    fn is_selected(&self) -> bool {
        self.selected
    }
}

fn line_strategy() -> impl Strategy<Value = Line> {
    (0i64..2_000_000, 0i64..2_000_000, 0u32..50, any::<bool>()).prop_map(
        |(selling, cost, qty, selected)| Line {
            selling,
            cost,
            quantity: qty.to_string(),
            selected,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn selling_price_covers_markup_and_is_stepped(cost in 0i64..100_000_000) {
        let price = calculate_selling_price(cost);
        prop_assert_eq!(price % PRICE_STEP, 0);
        // price >= cost / 0.7
        prop_assert!(price * 7 >= cost * 10);
        // never more than one step above the exact markup
        prop_assert!((price - PRICE_STEP) * 7 < cost * 10 || price == 0);
    }

    #[test]
    fn selling_price_is_monotonic(a in 0i64..10_000_000, b in 0i64..10_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calculate_selling_price(lo) <= calculate_selling_price(hi));
    }

    #[test]
    fn totals_follow_selected_lines(lines in prop::collection::vec(line_strategy(), 0..30)) {
        let totals = compute_totals(&lines);

        let expected_subtotal: i64 = lines
            .iter()
            .filter(|l| l.selected)
            .map(|l| line_amount(l.selling, &l.quantity))
            .sum();
        prop_assert_eq!(totals.subtotal, expected_subtotal);
        prop_assert_eq!(totals.tax, expected_subtotal / 10);
        prop_assert_eq!(totals.total, totals.subtotal + totals.tax);
        prop_assert_eq!(totals.item_count, lines.len());
        prop_assert_eq!(totals.selected_count, lines.iter().filter(|l| l.selected).count());
        if totals.subtotal == 0 {
            prop_assert_eq!(totals.margin_rate, 0.0);
        }
    }

    #[test]
    fn deselecting_everything_zeroes_totals(lines in prop::collection::vec(line_strategy(), 0..30)) {
        let unselected: Vec<Line> = lines
            .into_iter()
            .map(|l| Line { selected: false, ..l })
            .collect();
        let totals = compute_totals(&unselected);
        prop_assert_eq!(totals.subtotal, 0);
        prop_assert_eq!(totals.total, 0);
        prop_assert_eq!(totals.margin_rate, 0.0);
    }

    #[test]
    fn tax_is_floor_of_ten_percent(subtotal in 0i64..1_000_000_000) {
        let tax = tax_for(subtotal);
        prop_assert!(tax * 10 <= subtotal);
        prop_assert!((tax + 1) * 10 > subtotal);
    }

    #[test]
    fn grouped_numbers_round_trip(n in 0i64..i64::MAX) {
        let grouped = format_number(n);
        prop_assert_eq!(grouped.replace(',', "").parse::<i64>().unwrap(), n);
        prop_assert!(format_currency(n).starts_with('￥'));
    }
}
