//! Portfolio-level strategy recommendations derived from the risk and
//! growth outputs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::SegmentAnalysisSummary;
use crate::churn::{ChurnRiskAssessment, RiskLevel};
use crate::growth::{GrowthPotential, ValueGrowthProjection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    CustomerRetention,
    RiskPrevention,
    ValueUplift,
    GrowthNurturing,
}

/// One actionable portfolio recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: RecommendationPriority,
    pub description: String,
    pub expected_impact: String,
}

/// Turns aggregate risk/growth counts into a short list of recommendations.
///
/// Each trigger rule is independent and appends at most one entry, so the
/// output order always follows the declaration order below and new rules
/// slot in without touching existing ones.
#[derive(Debug, Clone)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn recommend(
        &self,
        risks: &[ChurnRiskAssessment],
        growth: &[ValueGrowthProjection],
        summary: &SegmentAnalysisSummary,
    ) -> Vec<Recommendation> {
        let critical_risk = count_risk(risks, RiskLevel::Critical);
        let high_risk = count_risk(risks, RiskLevel::High);
        let high_growth = count_growth(growth, GrowthPotential::High);
        let medium_growth = count_growth(growth, GrowthPotential::Medium);

        let mut recommendations = Vec::new();

        if critical_risk > 0 {
            recommendations.push(Recommendation {
                category: RecommendationCategory::CustomerRetention,
                priority: RecommendationPriority::Critical,
                description: format!(
                    "{critical_risk} customers are at critical churn risk and need personal outreach this week"
                ),
                expected_impact: "Protects the revenue most likely to be lost this quarter"
                    .to_string(),
            });
        }

        if high_risk > 0 {
            recommendations.push(Recommendation {
                category: RecommendationCategory::RiskPrevention,
                priority: RecommendationPriority::High,
                description: format!(
                    "{high_risk} customers show elevated churn signals; enroll them in the re-engagement program"
                ),
                expected_impact: "Stops at-risk customers from sliding into the critical tier"
                    .to_string(),
            });
        }

        if high_growth > 0 {
            recommendations.push(Recommendation {
                category: RecommendationCategory::ValueUplift,
                priority: RecommendationPriority::High,
                description: format!(
                    "{high_growth} customers have high growth potential; offer premium lines and VIP benefits"
                ),
                expected_impact: "Converts the fastest-growing accounts into top-tier spenders"
                    .to_string(),
            });
        }

        if medium_growth > 0 {
            recommendations.push(Recommendation {
                category: RecommendationCategory::GrowthNurturing,
                priority: RecommendationPriority::Medium,
                description: format!(
                    "{medium_growth} customers are growing steadily; nurture them with cross-sell campaigns"
                ),
                expected_impact: "Compounds mid-tier spend into next year's loyal base".to_string(),
            });
        }

        debug!(
            total_customers = summary.total_customers,
            recommendations = recommendations.len(),
            "Generated portfolio recommendations"
        );
        recommendations
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn count_risk(risks: &[ChurnRiskAssessment], level: RiskLevel) -> usize {
    risks.iter().filter(|a| a.risk_level == level).count()
}

fn count_growth(growth: &[ValueGrowthProjection], potential: GrowthPotential) -> usize {
    growth.iter().filter(|p| p.growth_potential == potential).count()
}
