//! Core decision-synthesis engine
//!
//! Pure functions over already-fetched indicators and an immutable policy.
//! Nothing in this module performs I/O; fetching lives in `providers` and
//! rendering in `cli`.

pub mod decision;
pub mod indicators;
pub mod log;
pub mod policy;
pub mod risk;
pub mod support;
pub mod valuation;

// Re-export main types for cleaner imports
pub use decision::{Conviction, Decision, Recommendation, evaluate};
pub use indicators::{IndicatorProvider, IndicatorSnapshot};
pub use policy::{Policy, PolicyError};
pub use risk::{RiskAssessment, RiskLevel};
pub use support::{CheckOutcome, SupportAssessment};
pub use valuation::{ValuationLabel, ValuationSignal};
