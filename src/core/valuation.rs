//! Valuation interpretation: relative deviation against a reference multiple.
//!
//! This is a rough sense of valuation, not a valuation model. The observed
//! trailing multiple is compared to the policy's reference multiple and the
//! deviation is thresholded into a qualitative label.

use std::fmt::Display;

use crate::core::policy::ValuationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuationLabel {
    Undervalued,
    FairlyValued,
    Overvalued,
}

impl Display for ValuationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ValuationLabel::Undervalued => "undervalued",
                ValuationLabel::FairlyValued => "fairly valued",
                ValuationLabel::Overvalued => "overvalued",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValuationSignal {
    /// The multiple was observed and produced a directional estimate.
    Estimate {
        /// Relative deviation: (reference - observed) / reference.
        /// Positive means potential upside.
        deviation: f64,
        label: ValuationLabel,
    },
    /// No trailing multiple was available.
    MissingMultiple,
    /// The observed multiple is non-positive; a negative P/E is not
    /// economically meaningful for this comparison, so the signal is
    /// downgraded rather than treated as an error.
    UnusableMultiple { observed: f64 },
}

impl ValuationSignal {
    pub fn deviation(&self) -> Option<f64> {
        match self {
            ValuationSignal::Estimate { deviation, .. } => Some(*deviation),
            _ => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        !matches!(self, ValuationSignal::Estimate { .. })
    }

    /// Rationale entry describing how this signal came about.
    pub fn rationale(&self, reference: f64) -> String {
        match self {
            ValuationSignal::Estimate { deviation, label } => format!(
                "Valuation: multiple reads as {} vs reference {:.1} (deviation {:+.1}%).",
                label,
                reference,
                deviation * 100.0
            ),
            ValuationSignal::MissingMultiple => {
                "Valuation: indeterminate, trailing multiple unavailable.".to_string()
            }
            ValuationSignal::UnusableMultiple { observed } => format!(
                "Valuation: indeterminate, observed multiple {observed:.1} is not usable for comparison.",
            ),
        }
    }
}

/// Interprets the observed trailing multiple against the policy reference.
///
/// Boundary deviations resolve to the more conservative label: a deviation
/// exactly at the undervalued cut point stays fairly valued, while one
/// exactly at the overvalued cut point reads as overvalued.
pub fn interpret(
    observed: Option<f64>,
    reference: f64,
    policy: &ValuationPolicy,
) -> ValuationSignal {
    let Some(observed) = observed else {
        return ValuationSignal::MissingMultiple;
    };

    if !(observed.is_finite() && observed > 0.0) {
        return ValuationSignal::UnusableMultiple { observed };
    }

    let deviation = (reference - observed) / reference;
    let label = if deviation <= policy.overvalued_deviation {
        ValuationLabel::Overvalued
    } else if deviation > policy.undervalued_deviation {
        ValuationLabel::Undervalued
    } else {
        ValuationLabel::FairlyValued
    };

    ValuationSignal::Estimate { deviation, label }
}
