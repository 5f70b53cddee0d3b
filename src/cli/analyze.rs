use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

use super::{memo, ui};
use crate::core::decision::Decision;
use crate::core::indicators::{IndicatorProvider, IndicatorSnapshot};
use crate::core::policy::Policy;
use crate::core;

fn indicator_table(snapshot: &IndicatorSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Indicator"), ui::header_cell("Value")]);

    table.add_row(vec![
        Cell::new("Share Price"),
        ui::format_optional_cell(snapshot.share_price, |v| format!("{v:.2}")),
    ]);
    table.add_row(vec![
        Cell::new("Market Cap"),
        ui::format_optional_cell(snapshot.market_cap, ui::format_compact_number),
    ]);
    table.add_row(vec![
        Cell::new("Trailing Multiple"),
        ui::format_optional_cell(snapshot.trailing_multiple, |v| format!("{v:.1}")),
    ]);
    table.add_row(vec![
        Cell::new("Revenue Growth (YoY)"),
        ui::format_optional_cell(snapshot.revenue_growth, |v| format!("{:.1}%", v * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Free Cash Flow"),
        ui::format_optional_cell(snapshot.free_cash_flow, ui::format_compact_number),
    ]);
    table.add_row(vec![
        Cell::new("Debt-to-Equity"),
        ui::format_optional_cell(snapshot.debt_to_equity, |v| format!("{v:.1}")),
    ]);

    table.to_string()
}

fn risk_table(decision: &Decision, policy: &Policy) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Risk Factor"),
        ui::header_cell("Proxy"),
        ui::header_cell("Weight"),
    ]);

    for (factor, proxy) in &decision.risk.factors {
        let weight = policy.risk.weights.get(factor).copied().unwrap_or(0.0);
        table.add_row(vec![
            Cell::new(factor),
            ui::format_optional_cell(Some(*proxy), |v| format!("{v:.2}")),
            ui::format_optional_cell(Some(weight), |v| format!("{v:.2}")),
        ]);
    }

    table.to_string()
}

pub async fn run(
    policy: &Policy,
    provider: &(dyn IndicatorProvider + Send + Sync),
    ticker: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let symbol = ticker.unwrap_or(&policy.ticker);

    let spinner = ui::new_spinner(&format!("Fetching indicators for {symbol}..."));
    let snapshot = provider.fetch_indicators(symbol).await?;
    spinner.finish_and_clear();

    let decision = core::evaluate(&snapshot, policy)?;

    println!(
        "Analysis: {}\n",
        ui::style_text(snapshot.display_name(), ui::StyleType::Title)
    );
    println!("{}\n", indicator_table(&snapshot));
    println!("{}\n", risk_table(&decision, policy));
    println!(
        "{} {} ({} conviction, {} risk)\n",
        ui::style_text("Recommendation:", ui::StyleType::Label),
        ui::recommendation_text(decision.recommendation),
        decision.conviction,
        decision.risk.level
    );

    let memo_text = memo::render(&snapshot, &decision, policy);
    println!("{memo_text}");

    if let Some(path) = output {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, &memo_text)
            .with_context(|| format!("Failed to write memo to {}", path.display()))?;
        info!("Wrote investment memo to {}", path.display());
    }

    Ok(())
}
