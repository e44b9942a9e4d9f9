//! Aggregates scored customers into segment distribution, average RFM
//! metrics and the risk tier breakdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pulse_core::types::{CustomerMetricRecord, RfmSegment};

use crate::churn::{ChurnRiskAssessment, RiskLevel};

/// Arithmetic means over the customer base. Recency and monetary are rounded
/// to whole units, frequency keeps two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageRfmScores {
    pub recency: i64,
    pub frequency: f64,
    pub monetary: i64,
}

/// One analysis run's portfolio summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalysisSummary {
    pub total_customers: u64,
    pub segment_distribution: BTreeMap<RfmSegment, u64>,
    pub average_rfm_scores: AverageRfmScores,
    pub risk_level_distribution: BTreeMap<RiskLevel, u64>,
}

impl SegmentAnalysisSummary {
    /// Zeroed summary, used for empty customer bases and disabled runs.
    pub fn empty() -> Self {
        Self {
            total_customers: 0,
            segment_distribution: BTreeMap::new(),
            average_rfm_scores: AverageRfmScores::default(),
            risk_level_distribution: BTreeMap::new(),
        }
    }
}

/// Rolls customer records and risk assessments up into a portfolio summary.
#[derive(Debug, Clone)]
pub struct SegmentAggregator;

impl SegmentAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate one batch. Risk counts come straight from the assessment
    /// list, never rescored; an empty list (risk stage disabled) yields an
    /// empty risk distribution.
    pub fn aggregate(
        &self,
        records: &[CustomerMetricRecord],
        assessments: &[ChurnRiskAssessment],
    ) -> SegmentAnalysisSummary {
        if records.is_empty() {
            return SegmentAnalysisSummary::empty();
        }

        let mut segment_distribution: BTreeMap<RfmSegment, u64> = BTreeMap::new();
        let mut recency_sum: u64 = 0;
        let mut frequency_sum: f64 = 0.0;
        let mut monetary_sum: f64 = 0.0;

        for record in records {
            *segment_distribution.entry(record.rfm_segment).or_insert(0) += 1;
            recency_sum += u64::from(record.recency_days);
            frequency_sum += record.frequency;
            monetary_sum += record.monetary_value;
        }

        let mut risk_level_distribution: BTreeMap<RiskLevel, u64> = BTreeMap::new();
        for assessment in assessments {
            *risk_level_distribution
                .entry(assessment.risk_level)
                .or_insert(0) += 1;
        }

        let count = records.len() as f64;
        SegmentAnalysisSummary {
            total_customers: records.len() as u64,
            segment_distribution,
            average_rfm_scores: AverageRfmScores {
                recency: (recency_sum as f64 / count).round() as i64,
                frequency: (frequency_sum / count * 100.0).round() / 100.0,
                monetary: (monetary_sum / count).round() as i64,
            },
            risk_level_distribution,
        }
    }
}

impl Default for SegmentAggregator {
    fn default() -> Self {
        Self::new()
    }
}
