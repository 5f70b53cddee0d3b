//! Market indicator abstractions

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The bundle of market signals the engine reads for one ticker.
///
/// Every numeric field is optional: an unavailable indicator stays `None`
/// and the engine degrades gracefully instead of substituting zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub share_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_multiple: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

impl IndicatorSnapshot {
    /// A snapshot with no data beyond the symbol itself.
    pub fn empty(symbol: &str) -> Self {
        IndicatorSnapshot {
            symbol: symbol.to_string(),
            company_name: None,
            sector: None,
            share_price: None,
            market_cap: None,
            trailing_multiple: None,
            revenue_growth: None,
            free_cash_flow: None,
            debt_to_equity: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.symbol)
    }
}

#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    async fn fetch_indicators(&self, symbol: &str) -> Result<IndicatorSnapshot>;
}
