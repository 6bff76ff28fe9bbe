use crate::entities::project_item;
use crate::services::pricing::line_amount;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Consumption tax, in percent.
pub const TAX_RATE_PERCENT: i64 = 10;

/// Anything that can contribute to an estimate.
pub trait PricedLine {
    fn selling_price(&self) -> i64;
    fn cost_price(&self) -> i64;
    fn quantity(&self) -> &str;
    fn is_selected(&self) -> bool;
}

impl PricedLine for project_item::Model {
    fn selling_price(&self) -> i64 {
        self.selling_price
    }

    fn cost_price(&self) -> i64 {
        self.cost_price
    }

    fn quantity(&self) -> &str {
        &self.quantity
    }

    fn is_selected(&self) -> bool {
        self.is_selected
    }
}

/// Totals over the selected lines of a project. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EstimateTotals {
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub total_cost: i64,
    /// `(subtotal - total_cost) / subtotal * 100`, 0 when subtotal is not positive
    pub margin_rate: f64,
    pub selected_count: usize,
    pub item_count: usize,
}

impl Default for EstimateTotals {
    fn default() -> Self {
        Self {
            subtotal: 0,
            tax: 0,
            total: 0,
            total_cost: 0,
            margin_rate: 0.0,
            selected_count: 0,
            item_count: 0,
        }
    }
}

/// `floor(subtotal * 10%)`
pub fn tax_for(subtotal: i64) -> i64 {
    (subtotal.saturating_mul(TAX_RATE_PERCENT)).div_euclid(100)
}

pub fn compute_totals<L: PricedLine>(items: &[L]) -> EstimateTotals {
    let mut totals = EstimateTotals {
        item_count: items.len(),
        ..Default::default()
    };

    for line in items.iter().filter(|l| l.is_selected()) {
        totals.selected_count += 1;
        totals.subtotal = totals
            .subtotal
            .saturating_add(line_amount(line.selling_price(), line.quantity()));
        totals.total_cost = totals
            .total_cost
            .saturating_add(line_amount(line.cost_price(), line.quantity()));
    }

    totals.tax = tax_for(totals.subtotal);
    totals.total = totals.subtotal.saturating_add(totals.tax);
    totals.margin_rate = if totals.subtotal > 0 {
        (totals.subtotal - totals.total_cost) as f64 / totals.subtotal as f64 * 100.0
    } else {
        0.0
    };

    totals
}

/// One printed estimate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EstimateLine {
    /// 1-based position among the selected lines
    pub index: usize,
    pub description: String,
    pub quantity: String,
    pub unit: String,
    pub unit_price: i64,
    pub amount: i64,
}

/// Selected items in display order, numbered from 1.
pub fn estimate_lines(items: &[project_item::Model]) -> Vec<EstimateLine> {
    items
        .iter()
        .filter(|item| item.is_selected)
        .enumerate()
        .map(|(idx, item)| EstimateLine {
            index: idx + 1,
            description: item.description.clone(),
            quantity: item.quantity.clone(),
            unit: item.unit.clone(),
            unit_price: item.selling_price,
            amount: line_amount(item.selling_price, &item.quantity),
        })
        .collect()
}
