//! Risk aggregation: scenario- and sector-driven proxies into one level.
//!
//! Proxies are interpretable table lookups, not a causal model. The
//! weighted sum is normalized by the total weight, so mis-specified
//! weights that do not sum to 1 still aggregate correctly.

use std::collections::BTreeMap;
use std::fmt::Display;

use tracing::debug;

use crate::core::policy::{PolicyError, RiskPolicy};

/// Scenario-driven capital-intensity proxy.
pub const FACTOR_CAPITAL_INTENSITY: &str = "capital_intensity";
/// Sector-driven regulatory-exposure proxy.
pub const FACTOR_REGULATORY: &str = "regulatory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RiskLevel::Low => "Low",
                RiskLevel::Medium => "Medium",
                RiskLevel::High => "High",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    /// Factor name -> normalized proxy score in [0, 1].
    pub factors: BTreeMap<String, f64>,
    /// Weighted aggregate of the factor proxies.
    pub aggregate: f64,
    pub level: RiskLevel,
    /// Non-nominal lookups (e.g. an unmapped sector) recorded for the
    /// decision rationale.
    pub notes: Vec<String>,
}

impl RiskAssessment {
    pub fn rationale(&self, scenario: &str) -> String {
        format!(
            "Risk: {} (aggregate {:.2} under `{}` scenario with sector exposure).",
            self.level, self.aggregate, scenario
        )
    }
}

/// Derives factor proxies for the active scenario and sector, then maps the
/// normalized weighted sum onto the policy's risk levels.
///
/// An unknown scenario is a policy/code mismatch and aborts with an error;
/// an unknown sector falls back to the policy's documented default exposure
/// with a note. An aggregate exactly on a threshold resolves to the lower,
/// more benign tier.
pub fn aggregate(
    scenario: &str,
    sector: Option<&str>,
    policy: &RiskPolicy,
) -> Result<RiskAssessment, PolicyError> {
    let assumptions = policy
        .scenarios
        .get(scenario)
        .ok_or_else(|| PolicyError::UnknownScenario(scenario.to_string()))?;

    let mut notes = Vec::new();
    let regulatory = match sector.and_then(|s| policy.sector_exposure.get(s)) {
        Some(exposure) => *exposure,
        None => {
            notes.push(format!(
                "Risk: sector {} has no configured exposure, using default {:.2}.",
                sector.unwrap_or("(unknown)"),
                policy.default_sector_exposure
            ));
            policy.default_sector_exposure
        }
    };

    let mut factors = BTreeMap::new();
    factors.insert(
        FACTOR_CAPITAL_INTENSITY.to_string(),
        assumptions.capital_intensity,
    );
    factors.insert(FACTOR_REGULATORY.to_string(), regulatory);

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (name, proxy) in &factors {
        let weight = policy.weights.get(name).copied().unwrap_or(0.0);
        weighted_sum += weight * proxy;
        weight_total += weight;
    }
    // Validation guarantees a positive weight total.
    let aggregate = weighted_sum / weight_total;

    let level = if aggregate > policy.thresholds.high {
        RiskLevel::High
    } else if aggregate > policy.thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    debug!(scenario, aggregate, ?level, "Aggregated risk factors");

    Ok(RiskAssessment {
        factors,
        aggregate,
        level,
        notes,
    })
}
