//! Churn risk scoring from recency, frequency, segment and lifecycle
//! signals, with per-factor explanations.

use serde::{Deserialize, Serialize};

use pulse_core::config::ChurnScoringConfig;
use pulse_core::types::{CustomerMetricRecord, LifecycleStage, RfmSegment};

// A sub-score only surfaces as a contributing factor when it clears these
// magnitudes, independent of its weight.
const RECENCY_MATERIALITY: f64 = 40.0;
const FREQUENCY_MATERIALITY: f64 = 40.0;
const SEGMENT_MATERIALITY: f64 = 50.0;
const LIFECYCLE_MATERIALITY: f64 = 40.0;

/// Churn risk tier, derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a composite 0-100 score onto a tier.
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            RiskLevel::Critical
        } else if score >= 60 {
            RiskLevel::High
        } else if score >= 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Probability the customer is retained without intervention. Strictly
    /// decreasing across tiers.
    pub fn retention_probability(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.9,
            RiskLevel::Medium => 0.7,
            RiskLevel::High => 0.4,
            RiskLevel::Critical => 0.2,
        }
    }
}

/// Which signal produced a risk contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Recency,
    Frequency,
    Segment,
    Lifecycle,
}

/// One material signal behind a customer's risk score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub factor: RiskFactor,
    pub weight: f64,
    pub description: String,
}

/// Risk verdict for a single customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnRiskAssessment {
    pub customer_id: String,
    pub full_name: String,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub contributing_factors: Vec<ContributingFactor>,
    pub recommended_actions: Vec<String>,
    pub retention_probability: f64,
    pub current_ltv: f64,
    pub potential_loss_value: f64,
}

/// Scores churn risk for batches of customer metric records.
#[derive(Debug, Clone)]
pub struct ChurnRiskScorer {
    weights: ChurnScoringConfig,
}

impl ChurnRiskScorer {
    pub fn new(weights: ChurnScoringConfig) -> Self {
        Self { weights }
    }

    /// Assess every record, sorted by descending risk score. The sort is
    /// stable, so equal scores keep their input order.
    pub fn score(&self, records: &[CustomerMetricRecord]) -> Vec<ChurnRiskAssessment> {
        let mut assessments: Vec<ChurnRiskAssessment> =
            records.iter().map(|record| self.assess(record)).collect();
        assessments.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
        assessments
    }

    /// Assess one customer. Total function: every input classifies.
    fn assess(&self, record: &CustomerMetricRecord) -> ChurnRiskAssessment {
        let recency = recency_risk(record.recency_days);
        let frequency = frequency_risk(record.frequency);
        let segment = segment_risk(record.rfm_segment);
        let lifecycle = lifecycle_risk(record.lifecycle_stage);

        let weighted = recency * self.weights.recency_weight
            + frequency * self.weights.frequency_weight
            + segment * self.weights.segment_weight
            + lifecycle * self.weights.lifecycle_weight;
        let risk_score = weighted.round().clamp(0.0, 100.0) as u8;
        let risk_level = RiskLevel::from_score(risk_score);
        let retention_probability = risk_level.retention_probability();

        let mut contributing_factors = Vec::new();
        if recency > RECENCY_MATERIALITY {
            contributing_factors.push(ContributingFactor {
                factor: RiskFactor::Recency,
                weight: self.weights.recency_weight,
                description: format!("No purchase in {} days", record.recency_days),
            });
        }
        if frequency > FREQUENCY_MATERIALITY {
            contributing_factors.push(ContributingFactor {
                factor: RiskFactor::Frequency,
                weight: self.weights.frequency_weight,
                description: format!(
                    "Only {:.1} purchases in the analysis window",
                    record.frequency
                ),
            });
        }
        if segment > SEGMENT_MATERIALITY {
            contributing_factors.push(ContributingFactor {
                factor: RiskFactor::Segment,
                weight: self.weights.segment_weight,
                description: format!("Sits in the \"{}\" RFM segment", record.rfm_segment),
            });
        }
        if lifecycle > LIFECYCLE_MATERIALITY {
            contributing_factors.push(ContributingFactor {
                factor: RiskFactor::Lifecycle,
                weight: self.weights.lifecycle_weight,
                description: format!("Lifecycle stage is \"{}\"", record.lifecycle_stage),
            });
        }

        let current_ltv = record.estimated_ltv;
        ChurnRiskAssessment {
            customer_id: record.customer_id.clone(),
            full_name: record.full_name.clone(),
            risk_score,
            risk_level,
            contributing_factors,
            recommended_actions: recommended_actions(risk_level),
            retention_probability,
            current_ltv,
            potential_loss_value: current_ltv * (1.0 - retention_probability),
        }
    }
}

impl Default for ChurnRiskScorer {
    fn default() -> Self {
        Self::new(ChurnScoringConfig::default())
    }
}

/// Days since last purchase, bucketed. Bounds are strict.
fn recency_risk(recency_days: u32) -> f64 {
    if recency_days > 180 {
        100.0
    } else if recency_days > 90 {
        70.0
    } else if recency_days > 60 {
        40.0
    } else if recency_days > 30 {
        20.0
    } else {
        0.0
    }
}

/// Purchase count in the window, bucketed. Fewer purchases, more risk.
fn frequency_risk(frequency: f64) -> f64 {
    if frequency < 1.0 {
        80.0
    } else if frequency < 2.0 {
        50.0
    } else if frequency < 4.0 {
        20.0
    } else {
        0.0
    }
}

/// Fixed lookup over the segment taxonomy. Exhaustive on purpose: a new
/// variant forces a decision here.
fn segment_risk(segment: RfmSegment) -> f64 {
    match segment {
        RfmSegment::Lost => 100.0,
        RfmSegment::AtRisk | RfmSegment::CannotLoseThem => 80.0,
        RfmSegment::Hibernating | RfmSegment::AboutToSleep => 60.0,
        RfmSegment::NeedAttention => 40.0,
        RfmSegment::Champions
        | RfmSegment::LoyalCustomers
        | RfmSegment::PotentialLoyalists
        | RfmSegment::NewCustomers
        | RfmSegment::Promising
        | RfmSegment::Unclassified => 0.0,
    }
}

fn lifecycle_risk(stage: LifecycleStage) -> f64 {
    match stage {
        LifecycleStage::Churned => 100.0,
        LifecycleStage::AtRisk => 70.0,
        LifecycleStage::Inactive => 50.0,
        LifecycleStage::Active | LifecycleStage::Unspecified => 0.0,
    }
}

/// Fixed playbook per tier. Low risk gets no outreach.
fn recommended_actions(level: RiskLevel) -> Vec<String> {
    let actions: &[&str] = match level {
        RiskLevel::Critical => &[
            "Call the customer personally within 48 hours",
            "Offer a time-limited win-back discount",
            "Escalate to the retention team for a save plan",
        ],
        RiskLevel::High => &[
            "Enroll in the re-engagement email sequence",
            "Offer bonus loyalty points on the next purchase",
            "Survey for dissatisfaction signals",
        ],
        RiskLevel::Medium => &[
            "Add to the nurture campaign",
            "Highlight new arrivals matching past purchases",
        ],
        RiskLevel::Low => &[],
    };
    actions.iter().map(|s| s.to_string()).collect()
}
