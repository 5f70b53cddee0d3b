//! Business support checks: growth, cash flow, and leverage vs policy bounds.

use std::fmt::Display;

use crate::core::indicators::IndicatorSnapshot;
use crate::core::policy::SupportPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Failed,
    /// The indicator was unavailable; the check is excluded from the tally
    /// rather than counted as failing.
    Skipped,
}

impl Display for CheckOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CheckOutcome::Passed => "passed",
                CheckOutcome::Failed => "failed",
                CheckOutcome::Skipped => "skipped",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupportCheck {
    pub name: &'static str,
    pub outcome: CheckOutcome,
    pub observed: Option<f64>,
    pub bound: f64,
}

impl SupportCheck {
    pub fn rationale(&self) -> String {
        match (self.outcome, self.observed) {
            (CheckOutcome::Skipped, _) => {
                format!("Support: {} data is unavailable, check skipped.", self.name)
            }
            (outcome, Some(observed)) => format!(
                "Support: {} {} ({:.2} vs bound {:.2}).",
                self.name, outcome, observed, self.bound
            ),
            // Skipped is the only outcome without an observation.
            (outcome, None) => format!("Support: {} {}.", self.name, outcome),
        }
    }
}

/// Outcome of all support checks for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportAssessment {
    pub checks: Vec<SupportCheck>,
    /// Fraction of available checks that passed; `None` when every check
    /// was skipped for lack of data.
    pub score: Option<f64>,
}

impl SupportAssessment {
    pub fn is_indeterminate(&self) -> bool {
        self.score.is_none()
    }

    pub fn passed(&self) -> usize {
        self.count(CheckOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(CheckOutcome::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(CheckOutcome::Skipped)
    }

    fn count(&self, outcome: CheckOutcome) -> usize {
        self.checks.iter().filter(|c| c.outcome == outcome).count()
    }
}

fn check_metric(
    name: &'static str,
    observed: Option<f64>,
    bound: f64,
    pass: impl Fn(f64, f64) -> bool,
) -> SupportCheck {
    let outcome = match observed {
        Some(value) if pass(value, bound) => CheckOutcome::Passed,
        Some(_) => CheckOutcome::Failed,
        None => CheckOutcome::Skipped,
    };
    SupportCheck {
        name,
        outcome,
        observed,
        bound,
    }
}

/// Scores the snapshot's operating signals against the policy minimums.
/// Missing metrics are skipped, so the engine proceeds with whatever data
/// is available.
pub fn check(snapshot: &IndicatorSnapshot, policy: &SupportPolicy) -> SupportAssessment {
    let checks = vec![
        check_metric(
            "revenue growth",
            snapshot.revenue_growth,
            policy.min_revenue_growth,
            |value, bound| value >= bound,
        ),
        check_metric(
            "free cash flow",
            snapshot.free_cash_flow,
            policy.min_free_cash_flow,
            |value, bound| value > bound,
        ),
        check_metric(
            "debt to equity",
            snapshot.debt_to_equity,
            policy.max_debt_to_equity,
            |value, bound| value <= bound,
        ),
    ];

    let available = checks
        .iter()
        .filter(|c| c.outcome != CheckOutcome::Skipped)
        .count();
    let score = if available == 0 {
        None
    } else {
        let passed = checks
            .iter()
            .filter(|c| c.outcome == CheckOutcome::Passed)
            .count();
        Some(passed as f64 / available as f64)
    };

    SupportAssessment { checks, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> SupportPolicy {
        SupportPolicy {
            min_revenue_growth: 0.05,
            min_free_cash_flow: 0.0,
            max_debt_to_equity: 150.0,
        }
    }

    fn snapshot(growth: Option<f64>, fcf: Option<f64>, dte: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            revenue_growth: growth,
            free_cash_flow: fcf,
            debt_to_equity: dte,
            ..IndicatorSnapshot::empty("TEST")
        }
    }

    #[test]
    fn all_checks_passing_scores_one() {
        let assessment = check(&snapshot(Some(0.12), Some(60e9), Some(40.0)), &policy());
        assert_eq!(assessment.score, Some(1.0));
        assert_eq!(assessment.passed(), 3);
        assert_eq!(assessment.failed(), 0);
    }

    #[test]
    fn failing_checks_lower_the_score() {
        let assessment = check(&snapshot(Some(0.01), Some(-1e9), Some(40.0)), &policy());
        assert_eq!(assessment.score, Some(1.0 / 3.0));
        assert_eq!(assessment.failed(), 2);
    }

    #[test]
    fn missing_metric_is_skipped_not_failed() {
        let assessment = check(&snapshot(Some(0.12), None, None), &policy());
        assert_eq!(assessment.score, Some(1.0));
        assert_eq!(assessment.skipped(), 2);
        let skipped_note = assessment.checks[1].rationale();
        assert!(skipped_note.contains("unavailable"));
    }

    #[test]
    fn no_available_data_is_indeterminate() {
        let assessment = check(&snapshot(None, None, None), &policy());
        assert_eq!(assessment.score, None);
        assert!(assessment.is_indeterminate());
        assert_eq!(assessment.skipped(), 3);
    }

    #[test]
    fn growth_boundary_passes_at_minimum() {
        let assessment = check(&snapshot(Some(0.05), None, None), &policy());
        assert_eq!(assessment.checks[0].outcome, CheckOutcome::Passed);
    }

    #[test]
    fn leverage_above_ceiling_fails() {
        let assessment = check(&snapshot(None, None, Some(180.0)), &policy());
        assert_eq!(assessment.checks[2].outcome, CheckOutcome::Failed);
        assert_eq!(assessment.score, Some(0.0));
    }
}
