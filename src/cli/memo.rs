//! Narrative memo rendering.
//!
//! A stateless formatting step over the engine's decision record. Nothing
//! here re-derives a rule outcome; the decision carries everything the
//! memo needs.

use crate::core::decision::{Decision, Recommendation};
use crate::core::indicators::IndicatorSnapshot;
use crate::core::policy::Policy;
use crate::core::valuation::ValuationSignal;
use chrono::Utc;

use super::ui;

fn fmt_opt(value: Option<f64>, format_fn: impl Fn(f64) -> String) -> String {
    value.map_or("N/A".to_string(), format_fn)
}

fn valuation_view(decision: &Decision, policy: &Policy) -> String {
    match &decision.valuation {
        ValuationSignal::Estimate { deviation, label } => format!(
            "Against a reference multiple of {:.1}, the observed multiple reads as {} \
             with an implied deviation of roughly {:+.1}%. This provides a rough sense \
             of valuation rather than a precise estimate.",
            policy.reference_multiple,
            label,
            deviation * 100.0
        ),
        ValuationSignal::MissingMultiple => {
            "No trailing multiple was available, so the valuation view is indeterminate \
             and the recommendation leans on operating support and risk alone."
                .to_string()
        }
        ValuationSignal::UnusableMultiple { observed } => format!(
            "The observed multiple of {observed:.1} is not economically meaningful for a \
             reference comparison, so the valuation view is indeterminate.",
        ),
    }
}

fn investment_view(decision: &Decision) -> String {
    match decision.recommendation {
        Recommendation::Buy => {
            "Current signals support a positive recommendation, with risk limiting \
             how aggressive a position should be."
        }
        Recommendation::Hold => {
            "Upside and risk are fairly evenly matched, suggesting a neutral stance."
        }
        Recommendation::Sell => {
            "Risk factors outweigh the available upside under the current assumptions."
        }
    }
    .to_string()
}

/// Renders the full investment memo as plain text.
pub fn render(snapshot: &IndicatorSnapshot, decision: &Decision, policy: &Policy) -> String {
    let drivers = decision
        .rationale
        .iter()
        .map(|note| format!("- {note}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\
========================================
Investment Thesis & Risk Synthesis - {name} ({symbol})
Date: {date}
========================================

Company Snapshot:
- Sector: {sector}
- Share Price: {price}
- Market Capitalization: {cap}

Key Signals:
- Trailing Multiple: {multiple}
- Revenue Growth (YoY): {growth}
- Free Cash Flow: {fcf}
- Debt-to-Equity: {dte}

Valuation View:
{valuation}

Risk View:
Overall risk is assessed as {risk_level} (aggregate {risk_aggregate:.2}) under the \
`{scenario}` scenario. These proxies argue for sizing the position accordingly.

Investment View:
{recommendation} ({conviction} conviction, composite score {composite:.3})

What supports this view:
{view}

Key Drivers:
{drivers}

This memo is generated from public market data and a transparent set of decision
rules. It is intended to support discussion rather than replace deeper valuation
work or analyst judgement.",
        name = snapshot.display_name(),
        symbol = snapshot.symbol,
        date = Utc::now().format("%Y-%m-%d"),
        sector = snapshot.sector.as_deref().unwrap_or("N/A"),
        price = fmt_opt(snapshot.share_price, |v| format!("{v:.2}")),
        cap = fmt_opt(snapshot.market_cap, ui::format_compact_number),
        multiple = fmt_opt(snapshot.trailing_multiple, |v| format!("{v:.1}")),
        growth = fmt_opt(snapshot.revenue_growth, |v| format!("{:.1}%", v * 100.0)),
        fcf = fmt_opt(snapshot.free_cash_flow, ui::format_compact_number),
        dte = fmt_opt(snapshot.debt_to_equity, |v| format!("{v:.1}")),
        valuation = valuation_view(decision, policy),
        risk_level = decision.risk.level,
        risk_aggregate = decision.risk.aggregate,
        scenario = policy.risk.scenario,
        recommendation = decision.recommendation,
        conviction = decision.conviction,
        composite = decision.composite,
        view = investment_view(decision),
        drivers = drivers,
    )
}
