use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::indicators::{IndicatorProvider, IndicatorSnapshot};

// YahooIndicatorProvider implementation for IndicatorProvider
pub struct YahooIndicatorProvider {
    base_url: String,
}

impl YahooIndicatorProvider {
    pub fn new(base_url: &str) -> Self {
        YahooIndicatorProvider {
            base_url: base_url.to_string(),
        }
    }
}

/// Yahoo wraps most numbers as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Deserialize, Debug, Default)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}

#[derive(Deserialize, Debug)]
struct YahooSummaryResponse {
    #[serde(alias = "quoteSummary")]
    quote_summary: QuoteSummaryResult,
}

#[derive(Deserialize, Debug)]
struct QuoteSummaryResult {
    result: Vec<QuoteSummaryItem>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteSummaryItem {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(default, alias = "summaryDetail")]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(default, alias = "financialData")]
    financial_data: Option<FinancialDataModule>,
    #[serde(default, alias = "assetProfile")]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Deserialize, Debug, Default)]
struct PriceModule {
    #[serde(alias = "shortName")]
    short_name: Option<String>,
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<RawValue>,
    #[serde(alias = "marketCap")]
    market_cap: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
struct SummaryDetailModule {
    #[serde(alias = "trailingPE")]
    trailing_pe: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
struct FinancialDataModule {
    #[serde(alias = "revenueGrowth")]
    revenue_growth: Option<RawValue>,
    #[serde(alias = "freeCashflow")]
    free_cashflow: Option<RawValue>,
    #[serde(alias = "debtToEquity")]
    debt_to_equity: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
struct AssetProfileModule {
    sector: Option<String>,
}

#[async_trait]
impl IndicatorProvider for YahooIndicatorProvider {
    #[instrument(
        name = "YahooIndicatorFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_indicators(&self, symbol: &str) -> Result<IndicatorSnapshot> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=price,summaryDetail,financialData,assetProfile",
            self.base_url, symbol
        );
        debug!("Requesting indicator data from {}", url);

        let client = reqwest::Client::builder().user_agent("thesis/0.1").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let data = response.json::<YahooSummaryResponse>().await?;
        let item = data
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No indicator data found for symbol: {}", symbol))?;

        let price = item.price.unwrap_or_default();
        let summary = item.summary_detail.unwrap_or_default();
        let financial = item.financial_data.unwrap_or_default();
        let profile = item.asset_profile.unwrap_or_default();

        let snapshot = IndicatorSnapshot {
            symbol: symbol.to_string(),
            company_name: price.short_name,
            sector: profile.sector,
            share_price: raw(&price.regular_market_price),
            market_cap: raw(&price.market_cap),
            trailing_multiple: raw(&summary.trailing_pe),
            revenue_growth: raw(&financial.revenue_growth),
            free_cash_flow: raw(&financial.free_cashflow),
            debt_to_equity: raw(&financial.debt_to_equity),
        };
        debug!(?snapshot, "Parsed indicator snapshot");

        Ok(snapshot)
    }
}
