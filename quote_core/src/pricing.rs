//! # Cost Calculation
//!
//! The pricing chain turns a project into a `CostTotals` snapshot.
//! Every derived figure is recomputed from scratch on each call; no
//! intermediate is persisted.
//!
//! ## Chain
//!
//! ```text
//! materialSubtotal  = sum of item totals across all groups
//! transportCost     = basePrice + loadingCost of the selected rule (0 if unresolved)
//! directCosts       = materialSubtotal + transportCost
//! overheadAmount    = directCosts * overhead
//! profitAmount      = (directCosts + overheadAmount) * markup
//! subtotalBeforeVat = directCosts + overheadAmount + profitAmount
//! vatAmount         = subtotalBeforeVat * vatRate
//! grandTotal        = subtotalBeforeVat + vatAmount
//! ```
//!
//! `markup` and `overhead` come from the project's rate snapshots,
//! `vatRate` from the config. Rates are applied as given; out-of-range
//! values flow through arithmetically rather than erroring.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::config::AppConfig;
//! use quote_core::pricing::compute_totals;
//! use quote_core::project::Project;
//!
//! let project = Project::new_draft(&AppConfig::default());
//! let totals = compute_totals(&project, &AppConfig::default());
//! // An empty draft still prices its transport selection.
//! assert_eq!(totals.transport_cost, 1400.0);
//! ```

use serde::Serialize;

use crate::catalog::find_transport;
use crate::config::AppConfig;
use crate::project::Project;

/// Full pricing snapshot for one project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostTotals {
    pub material_subtotal: f64,
    pub transport_cost: f64,
    pub direct_costs: f64,
    pub overhead_amount: f64,
    pub profit_amount: f64,
    pub subtotal_before_vat: f64,
    pub vat_amount: f64,
    pub grand_total: f64,
}

/// Compute the complete cost chain for a project.
///
/// Pure: same project and config always produce the same totals.
pub fn compute_totals(project: &Project, config: &AppConfig) -> CostTotals {
    let material_subtotal = project.material_subtotal();
    let transport_cost = find_transport(&project.selected_transport)
        .map(|rule| rule.total_cost())
        .unwrap_or(0.0);

    let direct_costs = material_subtotal + transport_cost;
    let overhead_amount = direct_costs * project.overhead;
    let profit_amount = (direct_costs + overhead_amount) * project.markup;
    let subtotal_before_vat = direct_costs + overhead_amount + profit_amount;
    let vat_amount = subtotal_before_vat * config.vat_rate;
    let grand_total = subtotal_before_vat + vat_amount;

    CostTotals {
        material_subtotal,
        transport_cost,
        direct_costs,
        overhead_amount,
        profit_amount,
        subtotal_before_vat,
        vat_amount,
        grand_total,
    }
}

/// One slice of the cost distribution chart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSegment {
    pub label: &'static str,
    pub color: &'static str,
    /// Rounded to whole currency units for display
    pub value: f64,
    /// Share of the grand total, 0 when the grand total is 0
    pub percentage: f64,
}

/// Cost distribution across the four pre-VAT components.
///
/// Segment values are rounded to whole currency units; percentages are
/// taken against the unrounded grand total and guard division by zero.
pub fn cost_breakdown(totals: &CostTotals) -> Vec<BreakdownSegment> {
    let components: [(&'static str, &'static str, f64); 4] = [
        ("Assets", "#2563eb", totals.material_subtotal),
        ("Logistics", "#f59e0b", totals.transport_cost),
        ("Overhead", "#dc2626", totals.overhead_amount),
        ("Profit", "#10b981", totals.profit_amount),
    ];

    components
        .iter()
        .map(|&(label, color, raw)| {
            let value = raw.round();
            let percentage = if totals.grand_total > 0.0 {
                value / totals.grand_total * 100.0
            } else {
                0.0
            };
            BreakdownSegment { label, color, value, percentage }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::LineItem;

    const EPS: f64 = 1e-9;

    fn project_with_material_subtotal(subtotal: f64) -> Project {
        let mut project = Project::new_draft(&AppConfig::default());
        let mut item = LineItem::custom("Booth Structure", 1.0, "lot", "Custom");
        item.unit_price = subtotal;
        item.recompute_total(0.0);
        project.groups[0].items.push(item);
        project
    }

    #[test]
    fn test_full_cost_chain() {
        // 10,000 materials + quarter truck at default rates
        let project = project_with_material_subtotal(10_000.0);
        let totals = compute_totals(&project, &AppConfig::default());

        assert!((totals.material_subtotal - 10_000.0).abs() < EPS);
        assert!((totals.transport_cost - 1_400.0).abs() < EPS);
        assert!((totals.direct_costs - 11_400.0).abs() < EPS);
        assert!((totals.overhead_amount - 1_140.0).abs() < EPS);
        assert!((totals.profit_amount - 3_135.0).abs() < EPS);
        assert!((totals.subtotal_before_vat - 15_675.0).abs() < EPS);
        assert!((totals.vat_amount - 2_194.5).abs() < EPS);
        assert!((totals.grand_total - 17_869.5).abs() < EPS);
    }

    #[test]
    fn test_unresolved_transport_prices_at_zero() {
        let mut project = project_with_material_subtotal(10_000.0);
        project.selected_transport = "t99".to_string();
        let totals = compute_totals(&project, &AppConfig::default());

        assert_eq!(totals.transport_cost, 0.0);
        assert!((totals.direct_costs - 10_000.0).abs() < EPS);
    }

    #[test]
    fn test_empty_project_totals() {
        let mut project = Project::new_draft(&AppConfig::default());
        project.selected_transport = "none".to_string();
        let totals = compute_totals(&project, &AppConfig::default());

        assert_eq!(totals.material_subtotal, 0.0);
        assert_eq!(totals.grand_total, 0.0);
    }

    #[test]
    fn test_totals_are_deterministic() {
        let project = project_with_material_subtotal(3_275.25);
        let config = AppConfig::default();
        let first = compute_totals(&project, &config);
        let second = compute_totals(&project, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rates_pass_through_unclamped() {
        let mut project = project_with_material_subtotal(1_000.0);
        project.markup = -0.1;
        project.overhead = 0.0;
        let totals = compute_totals(&project, &AppConfig::default());

        // direct = 2400, profit = 2400 * -0.1 = -240
        assert!((totals.profit_amount + 240.0).abs() < EPS);
        assert!((totals.subtotal_before_vat - 2_160.0).abs() < EPS);
    }

    #[test]
    fn test_breakdown_segments() {
        let project = project_with_material_subtotal(10_000.0);
        let totals = compute_totals(&project, &AppConfig::default());
        let segments = cost_breakdown(&totals);

        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].label, "Assets");
        assert_eq!(segments[0].color, "#2563eb");
        assert_eq!(segments[0].value, 10_000.0);
        assert_eq!(segments[1].label, "Logistics");
        assert_eq!(segments[1].value, 1_400.0);
        assert_eq!(segments[2].label, "Overhead");
        assert_eq!(segments[2].value, 1_140.0);
        assert_eq!(segments[3].label, "Profit");
        assert_eq!(segments[3].value, 3_135.0);

        let share: f64 = segments.iter().map(|s| s.percentage).sum();
        // Pre-VAT components cover grand_total minus VAT
        let expected = totals.subtotal_before_vat / totals.grand_total * 100.0;
        assert!((share - expected).abs() < 0.01);
    }

    #[test]
    fn test_breakdown_zero_grand_total() {
        let mut project = Project::new_draft(&AppConfig::default());
        project.selected_transport = "none".to_string();
        let totals = compute_totals(&project, &AppConfig::default());
        let segments = cost_breakdown(&totals);

        for segment in segments {
            assert_eq!(segment.percentage, 0.0);
        }
    }
}
