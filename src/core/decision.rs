//! Decision synthesis: valuation, support, and risk into one recommendation.
//!
//! The combination rule is deterministic and monotonic:
//!
//! ```text
//! composite = deviation * (1 + support_score) * risk_discount(level)
//! ```
//!
//! with every coefficient read from the policy. When valuation is
//! indeterminate the composite falls back to support and risk alone:
//!
//! ```text
//! composite = (support_score - support_pivot) * risk_discount(level)
//! ```
//!
//! Identical indicators and policy always yield an identical decision;
//! there is no hidden state in the pipeline.

use std::fmt::Display;

use tracing::debug;

use crate::core::indicators::IndicatorSnapshot;
use crate::core::policy::{DecisionPolicy, Policy, PolicyError};
use crate::core::risk::{self, RiskAssessment, RiskLevel};
use crate::core::support::{self, SupportAssessment};
use crate::core::valuation::{self, ValuationSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Recommendation::Buy => "BUY",
                Recommendation::Hold => "HOLD",
                Recommendation::Sell => "SELL",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Conviction {
    Low,
    Medium,
    High,
}

impl Display for Conviction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Conviction::Low => "Low",
                Conviction::Medium => "Medium",
                Conviction::High => "High",
            }
        )
    }
}

/// The engine's final, immutable result. Carries the intermediate signals
/// so a renderer can produce a memo without re-deriving any rule outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub recommendation: Recommendation,
    pub conviction: Conviction,
    pub composite: f64,
    pub valuation: ValuationSignal,
    pub support: SupportAssessment,
    pub risk: RiskAssessment,
    /// Ordered trace of every rule that fired, with the values that
    /// triggered it. Mandatory output, not optional logging.
    pub rationale: Vec<String>,
}

fn risk_discount(level: RiskLevel, policy: &DecisionPolicy) -> f64 {
    match level {
        RiskLevel::Low => policy.risk_discounts.low,
        RiskLevel::Medium => policy.risk_discounts.medium,
        RiskLevel::High => policy.risk_discounts.high,
    }
}

/// Distance of the composite from the nearest recommendation threshold.
fn threshold_distance(
    composite: f64,
    recommendation: Recommendation,
    policy: &DecisionPolicy,
) -> f64 {
    match recommendation {
        Recommendation::Buy => composite - policy.buy_threshold,
        Recommendation::Sell => policy.sell_threshold - composite,
        Recommendation::Hold => {
            (policy.buy_threshold - composite).min(composite - policy.sell_threshold)
        }
    }
}

fn conviction_for(distance: f64, policy: &DecisionPolicy) -> Conviction {
    // A distance exactly on a band resolves to the lower tier.
    if distance > policy.conviction_bands.high {
        Conviction::High
    } else if distance > policy.conviction_bands.medium {
        Conviction::Medium
    } else {
        Conviction::Low
    }
}

/// Combines the three upstream signals into a recommendation, a conviction
/// tier, and the rationale trace.
pub fn synthesize(
    valuation: ValuationSignal,
    support: SupportAssessment,
    risk: RiskAssessment,
    policy: &Policy,
) -> Decision {
    let mut rationale = Vec::new();

    rationale.push(valuation.rationale(policy.reference_multiple));
    for check in &support.checks {
        rationale.push(check.rationale());
    }
    rationale.extend(risk.notes.iter().cloned());
    rationale.push(risk.rationale(&policy.risk.scenario));

    let discount = risk_discount(risk.level, &policy.decision);
    let insufficient_data = valuation.is_indeterminate() && support.is_indeterminate();

    let composite = match (valuation.deviation(), support.score) {
        (Some(deviation), Some(score)) => deviation * (1.0 + score) * discount,
        (Some(deviation), None) => {
            rationale.push(
                "Synthesis: no support checks available, composite uses valuation and risk only."
                    .to_string(),
            );
            deviation * discount
        }
        (None, Some(score)) => (score - policy.decision.support_pivot) * discount,
        (None, None) => 0.0,
    };

    let (recommendation, conviction) = if insufficient_data {
        rationale.push(
            "Synthesis: insufficient data, holding by default with Low conviction.".to_string(),
        );
        (Recommendation::Hold, Conviction::Low)
    } else {
        // A composite exactly on a threshold resolves to HOLD.
        let recommendation = if composite > policy.decision.buy_threshold {
            Recommendation::Buy
        } else if composite < policy.decision.sell_threshold {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        };

        rationale.push(format!(
            "Synthesis: composite score {:.3} vs buy threshold {:.3} / sell threshold {:.3} -> {}.",
            composite,
            policy.decision.buy_threshold,
            policy.decision.sell_threshold,
            recommendation
        ));

        let distance = threshold_distance(composite, recommendation, &policy.decision);
        let mut conviction = conviction_for(distance, &policy.decision);

        if valuation.is_indeterminate() {
            rationale.push(format!(
                "Synthesis: valuation indeterminate, recommendation rests on support and risk; conviction capped at Low (was {conviction}).",
            ));
            conviction = Conviction::Low;
        } else {
            rationale.push(format!(
                "Synthesis: conviction {conviction} (distance {distance:.3} from nearest threshold).",
            ));
        }

        (recommendation, conviction)
    };

    debug!(%recommendation, %conviction, composite, "Synthesized decision");

    Decision {
        recommendation,
        conviction,
        composite,
        valuation,
        support,
        risk,
        rationale,
    }
}

/// Runs the full pipeline for one snapshot: valuation interpretation,
/// support checks, risk aggregation, then synthesis.
pub fn evaluate(snapshot: &IndicatorSnapshot, policy: &Policy) -> Result<Decision, PolicyError> {
    let valuation = valuation::interpret(
        snapshot.trailing_multiple,
        policy.reference_multiple,
        &policy.valuation,
    );
    let support = support::check(snapshot, &policy.support);
    let risk = risk::aggregate(
        &policy.risk.scenario,
        snapshot.sector.as_deref(),
        &policy.risk,
    )?;

    Ok(synthesize(valuation, support, risk, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::tests::sample_policy;

    fn snapshot(multiple: Option<f64>, growth: Option<f64>, fcf: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            sector: Some("Technology".to_string()),
            trailing_multiple: multiple,
            revenue_growth: growth,
            free_cash_flow: fcf,
            ..IndicatorSnapshot::empty("MSFT")
        }
    }

    #[test]
    fn overvalued_supported_high_risk_sells() {
        // The bear-scenario walkthrough: multiple 35 vs reference 28,
        // growth and cash flow both supportive, weights 0.6/0.4 over
        // proxies 0.7/0.3 aggregate to 0.54 which reads High risk.
        let mut policy = sample_policy();
        policy.risk.scenario = "bear".to_string();
        policy.risk.thresholds.medium = 0.3;
        policy.risk.thresholds.high = 0.5;
        policy
            .risk
            .sector_exposure
            .insert("Technology".to_string(), 0.3);
        policy.validate().unwrap();

        let decision = evaluate(&snapshot(Some(35.0), Some(0.12), Some(60e9)), &policy).unwrap();

        assert!((decision.risk.aggregate - 0.54).abs() < 1e-12);
        assert_eq!(decision.risk.level, RiskLevel::High);
        assert_eq!(decision.support.score, Some(1.0));
        // -0.25 * (1 + 1.0) * 0.5 = -0.25
        assert!((decision.composite - (-0.25)).abs() < 1e-12);
        assert_eq!(decision.recommendation, Recommendation::Sell);
        assert_eq!(decision.conviction, Conviction::Medium);

        let trace = decision.rationale.join("\n");
        assert!(trace.contains("overvalued"));
        assert!(trace.contains("revenue growth passed"));
        assert!(trace.contains("free cash flow passed"));
        assert!(trace.contains("Risk: High"));
    }

    #[test]
    fn cheap_supported_low_risk_buys() {
        let mut policy = sample_policy();
        policy.risk.scenario = "bull".to_string();
        let decision = evaluate(&snapshot(Some(20.0), Some(0.12), Some(60e9)), &policy).unwrap();

        assert_eq!(decision.risk.level, RiskLevel::Low);
        assert_eq!(decision.recommendation, Recommendation::Buy);
        assert!(decision.composite > policy.decision.buy_threshold);
    }

    #[test]
    fn decision_is_deterministic() {
        let policy = sample_policy();
        let snap = snapshot(Some(31.0), Some(0.07), Some(10e9));
        let first = evaluate(&snap, &policy).unwrap();
        for _ in 0..10 {
            assert_eq!(evaluate(&snap, &policy).unwrap(), first);
        }
    }

    #[test]
    fn composite_is_monotonic_in_valuation_upside() {
        // Holding support and risk fixed, a cheaper multiple (more upside)
        // never lowers the composite score.
        let policy = sample_policy();
        let mut last = f64::NEG_INFINITY;
        for observed in [40.0, 35.0, 30.0, 28.0, 25.0, 20.0, 15.0] {
            let decision =
                evaluate(&snapshot(Some(observed), Some(0.12), Some(60e9)), &policy).unwrap();
            assert!(decision.composite >= last);
            last = decision.composite;
        }
    }

    #[test]
    fn composite_on_buy_threshold_holds() {
        use crate::core::support::{CheckOutcome, SupportCheck};
        use crate::core::valuation::ValuationLabel;
        use std::collections::BTreeMap;

        let policy = sample_policy();
        // deviation * (1 + 1.0) * 1.0 lands exactly on the buy threshold
        // when deviation is half the threshold (scaling by 2 is exact).
        let valuation = ValuationSignal::Estimate {
            deviation: policy.decision.buy_threshold / 2.0,
            label: ValuationLabel::FairlyValued,
        };
        let support = SupportAssessment {
            checks: vec![SupportCheck {
                name: "revenue growth",
                outcome: CheckOutcome::Passed,
                observed: Some(0.12),
                bound: 0.05,
            }],
            score: Some(1.0),
        };
        let risk = RiskAssessment {
            factors: BTreeMap::new(),
            aggregate: 0.2,
            level: RiskLevel::Low,
            notes: Vec::new(),
        };

        let decision = synthesize(valuation, support, risk, &policy);
        assert_eq!(decision.composite, policy.decision.buy_threshold);
        assert_eq!(decision.recommendation, Recommendation::Hold);
    }

    #[test]
    fn missing_multiple_caps_conviction_at_low() {
        let policy = sample_policy();
        let decision = evaluate(&snapshot(None, Some(0.12), Some(60e9)), &policy).unwrap();

        assert!(decision.valuation.is_indeterminate());
        assert_eq!(decision.conviction, Conviction::Low);
        // Full support above the pivot still reads positively.
        assert!(decision.composite > 0.0);
        assert_eq!(decision.recommendation, Recommendation::Buy);
        let trace = decision.rationale.join("\n");
        assert!(trace.contains("indeterminate"));
        assert!(trace.contains("capped at Low"));
    }

    #[test]
    fn unusable_multiple_caps_conviction_at_low() {
        let policy = sample_policy();
        let decision = evaluate(&snapshot(Some(-12.0), Some(0.12), Some(60e9)), &policy).unwrap();

        assert!(decision.valuation.is_indeterminate());
        assert_eq!(decision.conviction, Conviction::Low);
        let trace = decision.rationale.join("\n");
        assert!(trace.contains("not usable"));
    }

    #[test]
    fn no_data_at_all_holds_with_low_conviction() {
        let policy = sample_policy();
        let decision = evaluate(&IndicatorSnapshot::empty("MSFT"), &policy).unwrap();

        assert_eq!(decision.recommendation, Recommendation::Hold);
        assert_eq!(decision.conviction, Conviction::Low);
        assert_eq!(decision.composite, 0.0);
        let trace = decision.rationale.join("\n");
        assert!(trace.contains("insufficient data"));
    }

    #[test]
    fn high_risk_discounts_more_than_low_risk() {
        let mut bull = sample_policy();
        bull.risk.scenario = "bull".to_string();
        let mut bear = sample_policy();
        bear.risk.scenario = "bear".to_string();
        bear.risk.thresholds.medium = 0.3;
        bear.risk.thresholds.high = 0.5;

        let snap = snapshot(Some(20.0), Some(0.12), Some(60e9));
        let calm = evaluate(&snap, &bull).unwrap();
        let stressed = evaluate(&snap, &bear).unwrap();

        assert!(calm.composite > stressed.composite);
    }

    #[test]
    fn rationale_is_never_empty() {
        let policy = sample_policy();
        let decision = evaluate(&IndicatorSnapshot::empty("MSFT"), &policy).unwrap();
        assert!(!decision.rationale.is_empty());
    }
}
