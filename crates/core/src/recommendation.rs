//! Presentation logic for a prediction: confidence, risk, financial
//! projection and the investment recommendation.

use serde::Serialize;

use crate::prediction::{PredictionResult, SuccessLabel};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Confidence (percent) strictly above which a prediction is "High".
pub const HIGH_CONFIDENCE_PCT: f64 = 60.0;
/// Confidence (percent) strictly above which a prediction is at least "Moderate".
pub const MODERATE_CONFIDENCE_PCT: f64 = 40.0;

// ---------------------------------------------------------------------------
// Revenue multiples per category
// ---------------------------------------------------------------------------

pub const FLOP_MULTIPLE: f64 = 0.8;
pub const BREAK_EVEN_MULTIPLE: f64 = 2.2;
pub const HIT_MULTIPLE: f64 = 3.5;

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence_pct: f64) -> Self {
        if confidence_pct > HIGH_CONFIDENCE_PCT {
            Self::High
        } else if confidence_pct > MODERATE_CONFIDENCE_PCT {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High confidence",
            Self::Moderate => "Moderate confidence",
            Self::Low => "Low confidence - close call",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn assess(label: SuccessLabel, confidence_pct: f64) -> Self {
        match label {
            SuccessLabel::Hit if confidence_pct > HIGH_CONFIDENCE_PCT => Self::Low,
            SuccessLabel::Flop => Self::High,
            _ => Self::Medium,
        }
    }
}

// ---------------------------------------------------------------------------
// Financial projection
// ---------------------------------------------------------------------------

/// Probability-weighted return estimate. All money values in millions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinancialProjection {
    pub budget: f64,
    pub expected_multiple: f64,
    pub expected_revenue: f64,
    pub expected_profit: f64,
}

impl FinancialProjection {
    pub fn project(result: &PredictionResult, budget: f64) -> Self {
        let expected_multiple = FLOP_MULTIPLE * result.probability_of(SuccessLabel::Flop)
            + BREAK_EVEN_MULTIPLE * result.probability_of(SuccessLabel::BreakEven)
            + HIT_MULTIPLE * result.probability_of(SuccessLabel::Hit);
        let expected_revenue = budget * expected_multiple;
        Self {
            budget,
            expected_multiple,
            expected_revenue,
            expected_profit: expected_revenue - budget,
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Greenlight,
    ConditionalApproval,
    MarginalHit,
    MarginalInvestment,
    HighRisk,
}

impl Recommendation {
    /// First matching rule wins, evaluated top-down.
    pub fn decide(label: SuccessLabel, confidence_pct: f64) -> Self {
        match label {
            SuccessLabel::Hit if confidence_pct > HIGH_CONFIDENCE_PCT => Self::Greenlight,
            SuccessLabel::Hit if confidence_pct > MODERATE_CONFIDENCE_PCT => {
                Self::ConditionalApproval
            }
            SuccessLabel::Hit => Self::MarginalHit,
            SuccessLabel::BreakEven => Self::MarginalInvestment,
            SuccessLabel::Flop => Self::HighRisk,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Greenlight => "Greenlight",
            Self::ConditionalApproval => "Conditional approval",
            Self::MarginalHit => "Marginal hit, proceed with caution",
            Self::MarginalInvestment => "Marginal investment",
            Self::HighRisk => "High risk, reconsider",
        }
    }

    pub fn rationale(self) -> &'static str {
        match self {
            Self::Greenlight => {
                "Strong profitability predicted with high confidence given budget, ratings, timing and genre."
            }
            Self::ConditionalApproval => {
                "Success is the most likely outcome, but the model is not highly confident."
            }
            Self::MarginalHit => {
                "Hit is only narrowly ahead of the other outcomes; treat the call as uncertain."
            }
            Self::MarginalInvestment => {
                "The movie is likely to cover its costs without generating significant profit."
            }
            Self::HighRisk => "The movie is predicted to lose money after marketing and distribution.",
        }
    }

    pub fn suggested_actions(self) -> &'static [&'static str] {
        match self {
            Self::Greenlight => &[],
            Self::ConditionalApproval | Self::MarginalHit => &[
                "Optimize the release date",
                "Check the budget against market expectations",
                "Improve expected ratings through script or cast",
            ],
            Self::MarginalInvestment => &[
                "Reduce the budget to improve the margin",
                "Move the release to a stronger window",
                "Strengthen commercial appeal",
            ],
            Self::HighRisk => &[
                "Restructure the project significantly",
                "Pass on this investment",
            ],
        }
    }
}

/// Everything the dashboard shows for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub label: SuccessLabel,
    pub confidence_pct: f64,
    pub confidence_tier: ConfidenceTier,
    pub confidence_label: &'static str,
    pub risk: RiskTier,
    pub financials: FinancialProjection,
    pub recommendation: Recommendation,
    pub headline: &'static str,
    pub rationale: &'static str,
    pub suggested_actions: &'static [&'static str],
}

/// Derive the full presentation for a prediction and its budget (millions).
pub fn assess(result: &PredictionResult, budget: f64) -> Assessment {
    let confidence_pct = result.top_probability() * 100.0;
    let recommendation = Recommendation::decide(result.label, confidence_pct);
    let confidence_tier = ConfidenceTier::from_confidence(confidence_pct);
    Assessment {
        label: result.label,
        confidence_pct,
        confidence_tier,
        confidence_label: confidence_tier.label(),
        risk: RiskTier::assess(result.label, confidence_pct),
        financials: FinancialProjection::project(result, budget),
        recommendation,
        headline: recommendation.headline(),
        rationale: recommendation.rationale(),
        suggested_actions: recommendation.suggested_actions(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(p: [f64; 3]) -> PredictionResult {
        PredictionResult::from_probabilities(&p).unwrap()
    }

    // -- ConfidenceTier boundaries --

    #[test]
    fn sixty_is_not_high() {
        assert_eq!(ConfidenceTier::from_confidence(60.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_confidence(60.01), ConfidenceTier::High);
    }

    #[test]
    fn forty_is_not_moderate() {
        assert_eq!(ConfidenceTier::from_confidence(40.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(40.01), ConfidenceTier::Moderate);
    }

    // -- RiskTier --

    #[test]
    fn risk_tiers() {
        assert_eq!(RiskTier::assess(SuccessLabel::Hit, 65.0), RiskTier::Low);
        assert_eq!(RiskTier::assess(SuccessLabel::Hit, 60.0), RiskTier::Medium);
        assert_eq!(RiskTier::assess(SuccessLabel::Flop, 99.0), RiskTier::High);
        assert_eq!(RiskTier::assess(SuccessLabel::BreakEven, 90.0), RiskTier::Medium);
    }

    // -- Recommendation decision table --

    #[test]
    fn recommendation_table_is_total() {
        let brackets = [30.0, 50.0, 70.0];
        let expected = [
            (
                SuccessLabel::Hit,
                [
                    Recommendation::MarginalHit,
                    Recommendation::ConditionalApproval,
                    Recommendation::Greenlight,
                ],
            ),
            (SuccessLabel::BreakEven, [Recommendation::MarginalInvestment; 3]),
            (SuccessLabel::Flop, [Recommendation::HighRisk; 3]),
        ];
        for (label, recs) in expected {
            for (confidence, rec) in brackets.iter().zip(recs) {
                assert_eq!(
                    Recommendation::decide(label, *confidence),
                    rec,
                    "{label} at {confidence}"
                );
            }
        }
    }

    #[test]
    fn hit_boundaries_are_strict() {
        assert_eq!(
            Recommendation::decide(SuccessLabel::Hit, 60.0),
            Recommendation::ConditionalApproval
        );
        assert_eq!(
            Recommendation::decide(SuccessLabel::Hit, 40.0),
            Recommendation::MarginalHit
        );
    }

    #[test]
    fn break_even_ignores_confidence() {
        for c in [0.0, 40.0, 60.0, 100.0] {
            assert_eq!(
                Recommendation::decide(SuccessLabel::BreakEven, c).headline(),
                "Marginal investment"
            );
        }
    }

    // -- FinancialProjection --

    #[test]
    fn financial_projection_example() {
        let f = FinancialProjection::project(&result([0.1, 0.2, 0.7]), 50.0);
        assert!((f.expected_multiple - 2.97).abs() < 1e-9);
        assert!((f.expected_revenue - 148.5).abs() < 1e-9);
        assert!((f.expected_profit - 98.5).abs() < 1e-9);
    }

    #[test]
    fn certain_flop_loses_money() {
        let f = FinancialProjection::project(&result([1.0, 0.0, 0.0]), 100.0);
        assert!((f.expected_profit + 20.0).abs() < 1e-9);
    }

    // -- assess --

    #[test]
    fn confident_hit_is_greenlit() {
        let a = assess(&result([0.15, 0.2, 0.65]), 50.0);
        assert!((a.confidence_pct - 65.0).abs() < 1e-9);
        assert_eq!(a.risk, RiskTier::Low);
        assert_eq!(a.recommendation, Recommendation::Greenlight);
        assert_eq!(a.headline, "Greenlight");
        assert!(a.suggested_actions.is_empty());
    }

    #[test]
    fn flop_is_high_risk() {
        let a = assess(&result([0.5, 0.3, 0.2]), 120.0);
        assert_eq!(a.label, SuccessLabel::Flop);
        assert_eq!(a.risk, RiskTier::High);
        assert_eq!(a.headline, "High risk, reconsider");
        assert_eq!(a.confidence_tier, ConfidenceTier::Moderate);
        assert_eq!(a.confidence_label, "Moderate confidence");
    }

    #[test]
    fn risk_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&RiskTier::Medium).unwrap(), "\"MEDIUM\"");
    }
}
