//! Decision policy: the immutable configuration driving the engine.
//!
//! Every threshold, weight, and scenario assumption the engine reads lives
//! here. The policy is loaded once per run from a YAML file and validated
//! before any decision is produced; the engine never substitutes defaults
//! for required fields.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::core::risk::{FACTOR_CAPITAL_INTENSITY, FACTOR_REGULATORY};

/// Configuration errors that make a policy unusable. The run is aborted
/// rather than proceeding with a partially applied policy.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("policy field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("policy references unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("policy risk weight `{0}` does not name a known risk factor")]
    UnknownRiskFactor(String),
}

impl PolicyError {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        PolicyError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValuationPolicy {
    /// Relative deviation at or above which a multiple reads as undervalued.
    pub undervalued_deviation: f64,
    /// Relative deviation at or below which a multiple reads as overvalued.
    pub overvalued_deviation: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupportPolicy {
    pub min_revenue_growth: f64,
    pub min_free_cash_flow: f64,
    pub max_debt_to_equity: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScenarioAssumptions {
    /// Capital-intensity risk proxy for this scenario, in [0, 1].
    pub capital_intensity: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiskThresholds {
    /// Aggregate score above which risk is at least Medium.
    pub medium: f64,
    /// Aggregate score above which risk is High.
    pub high: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiskPolicy {
    /// Name of the active scenario; must exist in `scenarios`.
    pub scenario: String,
    /// Risk factor name -> non-negative weight. Normalized at aggregation
    /// time, so the weights do not need to sum to 1.
    pub weights: BTreeMap<String, f64>,
    pub thresholds: RiskThresholds,
    /// Scenario name -> forward-looking assumptions.
    pub scenarios: BTreeMap<String, ScenarioAssumptions>,
    /// Sector name -> regulatory-exposure proxy in [0, 1].
    pub sector_exposure: BTreeMap<String, f64>,
    /// Exposure applied when the sector is unknown or unmapped.
    pub default_sector_exposure: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiskDiscounts {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConvictionBands {
    /// Distance beyond a recommendation threshold for Medium conviction.
    pub medium: f64,
    /// Distance beyond a recommendation threshold for High conviction.
    pub high: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DecisionPolicy {
    /// Composite score above which the recommendation is BUY.
    pub buy_threshold: f64,
    /// Composite score below which the recommendation is SELL.
    pub sell_threshold: f64,
    pub risk_discounts: RiskDiscounts,
    pub conviction_bands: ConvictionBands,
    /// Neutral support level used when valuation is indeterminate and the
    /// recommendation must come from support and risk alone.
    pub support_pivot: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Policy {
    /// Default ticker analyzed when none is given on the command line.
    pub ticker: String,
    /// Reference trailing multiple the observed multiple is compared to.
    pub reference_multiple: f64,
    pub valuation: ValuationPolicy,
    pub support: SupportPolicy,
    pub risk: RiskPolicy,
    pub decision: DecisionPolicy,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Policy {
    pub fn load() -> Result<Self> {
        debug!("Loading policy from default path");
        let policy_path = Self::default_policy_path()?;
        Self::load_from_path(&policy_path)
    }

    pub fn default_policy_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "codara", "thesis")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("policy.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let policy_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read policy file: {}", path.as_ref().display()))?;

        let policy: Self = serde_yaml::from_str(&policy_str)
            .with_context(|| format!("Failed to parse policy file: {}", path.as_ref().display()))?;
        policy.validate()?;
        debug!("Successfully loaded policy");
        Ok(policy)
    }

    /// Checks value ranges and cross-references. A policy that fails any of
    /// these checks is rejected outright.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.reference_multiple.is_finite() && self.reference_multiple > 0.0) {
            return Err(PolicyError::field(
                "reference_multiple",
                format!("must be a positive number, got {}", self.reference_multiple),
            ));
        }

        if self.valuation.overvalued_deviation >= self.valuation.undervalued_deviation {
            return Err(PolicyError::field(
                "valuation.overvalued_deviation",
                "must be below valuation.undervalued_deviation",
            ));
        }

        let known_factors = [FACTOR_CAPITAL_INTENSITY, FACTOR_REGULATORY];
        let mut weight_sum = 0.0;
        for (name, weight) in &self.risk.weights {
            if !known_factors.contains(&name.as_str()) {
                return Err(PolicyError::UnknownRiskFactor(name.clone()));
            }
            if !(weight.is_finite() && *weight >= 0.0) {
                return Err(PolicyError::field(
                    "risk.weights",
                    format!("weight for `{name}` must be non-negative, got {weight}"),
                ));
            }
            weight_sum += weight;
        }
        if weight_sum <= 0.0 {
            return Err(PolicyError::field(
                "risk.weights",
                "weights must sum to a positive total",
            ));
        }

        if !(0.0..=self.risk.thresholds.high).contains(&self.risk.thresholds.medium) {
            return Err(PolicyError::field(
                "risk.thresholds",
                "must satisfy 0 <= medium <= high",
            ));
        }

        for (name, scenario) in &self.risk.scenarios {
            if !(0.0..=1.0).contains(&scenario.capital_intensity) {
                return Err(PolicyError::field(
                    "risk.scenarios",
                    format!("capital_intensity for `{name}` must be in [0, 1]"),
                ));
            }
        }
        if !self.risk.scenarios.contains_key(&self.risk.scenario) {
            return Err(PolicyError::UnknownScenario(self.risk.scenario.clone()));
        }

        for (sector, exposure) in &self.risk.sector_exposure {
            if !(0.0..=1.0).contains(exposure) {
                return Err(PolicyError::field(
                    "risk.sector_exposure",
                    format!("exposure for `{sector}` must be in [0, 1]"),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.risk.default_sector_exposure) {
            return Err(PolicyError::field(
                "risk.default_sector_exposure",
                "must be in [0, 1]",
            ));
        }

        if self.decision.sell_threshold >= self.decision.buy_threshold {
            return Err(PolicyError::field(
                "decision.sell_threshold",
                "must be below decision.buy_threshold",
            ));
        }

        let discounts = &self.decision.risk_discounts;
        for (field, value) in [
            ("decision.risk_discounts.low", discounts.low),
            ("decision.risk_discounts.medium", discounts.medium),
            ("decision.risk_discounts.high", discounts.high),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(PolicyError::field(field, "must be in (0, 1]"));
            }
        }
        if discounts.high > discounts.medium || discounts.medium > discounts.low {
            return Err(PolicyError::field(
                "decision.risk_discounts",
                "must satisfy high <= medium <= low",
            ));
        }

        let bands = &self.decision.conviction_bands;
        if !(0.0 <= bands.medium && bands.medium <= bands.high) {
            return Err(PolicyError::field(
                "decision.conviction_bands",
                "must satisfy 0 <= medium <= high",
            ));
        }

        if !(0.0..=1.0).contains(&self.decision.support_pivot) {
            return Err(PolicyError::field(
                "decision.support_pivot",
                "must be in [0, 1]",
            ));
        }

        Ok(())
    }
}
