//! Orchestrates one lifecycle analysis run: fetch, normalize, score,
//! aggregate, recommend, assemble.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use pulse_core::config::AnalysisConfig;
use pulse_core::types::AnalysisWindow;
use pulse_core::PulseResult;

use crate::aggregate::{SegmentAggregator, SegmentAnalysisSummary};
use crate::churn::{ChurnRiskAssessment, ChurnRiskScorer};
use crate::growth::{ValueGrowthProjection, ValueGrowthProjector};
use crate::normalizer;
use crate::recommend::{Recommendation, RecommendationEngine};
use crate::source::CustomerDataSource;

/// Parameters for one analysis run. Everything is optional: the window
/// defaults to the trailing configured period ending today, and every stage
/// is enabled unless switched off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_toggle")]
    pub include_rfm_analysis: bool,
    #[serde(default = "default_toggle")]
    pub include_churn_risk: bool,
    #[serde(default = "default_toggle")]
    pub include_value_growth: bool,
    #[serde(default = "default_toggle")]
    pub include_recommendations: bool,
}

fn default_toggle() -> bool {
    true
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            include_rfm_analysis: true,
            include_churn_risk: true,
            include_value_growth: true,
            include_recommendations: true,
        }
    }
}

/// Everything one analysis run produced. Disabled stages leave their slot
/// empty rather than absent so the response shape stays fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    pub churn_risks: Vec<ChurnRiskAssessment>,
    pub value_growth: Vec<ValueGrowthProjection>,
    pub segment_analysis: SegmentAnalysisSummary,
    pub recommendations: Vec<Recommendation>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisData {
    fn empty() -> Self {
        Self {
            churn_risks: Vec::new(),
            value_growth: Vec::new(),
            segment_analysis: SegmentAnalysisSummary::empty(),
            recommendations: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Response envelope. `success` is false only when the run itself failed,
/// in which case `data` is zeroed and `error` explains why. An empty
/// customer base is a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub success: bool,
    pub data: AnalysisData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// End-to-end lifecycle analysis over a customer data source.
pub struct SegmentationPipeline<S: CustomerDataSource> {
    source: S,
    config: AnalysisConfig,
    scorer: ChurnRiskScorer,
    projector: ValueGrowthProjector,
    aggregator: SegmentAggregator,
    recommender: RecommendationEngine,
}

impl<S: CustomerDataSource> SegmentationPipeline<S> {
    pub fn new(source: S, config: AnalysisConfig) -> Self {
        if !config.churn.is_normalized() {
            warn!(
                weight_sum = config.churn.weight_sum(),
                "Churn factor weights do not sum to 1.0, scores will be skewed"
            );
        }
        let scorer = ChurnRiskScorer::new(config.churn.clone());
        Self {
            source,
            config,
            scorer,
            projector: ValueGrowthProjector::new(),
            aggregator: SegmentAggregator::new(),
            recommender: RecommendationEngine::new(),
        }
    }

    /// Run one analysis. Never returns an error: fetch or engine failures
    /// are folded into the envelope with `success = false`.
    pub async fn run(&self, request: &AnalysisRequest) -> AnalysisEnvelope {
        metrics::counter!("analysis.runs").increment(1);

        match self.execute(request).await {
            Ok(data) => AnalysisEnvelope {
                success: true,
                data,
                error: None,
            },
            Err(err) => {
                metrics::counter!("analysis.fetch_errors").increment(1);
                error!(error = %err, "Lifecycle analysis run failed");
                AnalysisEnvelope {
                    success: false,
                    data: AnalysisData::empty(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    async fn execute(&self, request: &AnalysisRequest) -> PulseResult<AnalysisData> {
        let window = self.resolve_window(request);
        debug!(start = %window.start, end = %window.end, "Fetching customer collections");

        let (rfm_rows, ltv_rows, identities) = tokio::try_join!(
            self.source.fetch_rfm_metrics(&window),
            self.source.fetch_ltv_metrics(&window),
            self.source.fetch_identities(&window),
        )?;

        let records = normalizer::normalize(identities, rfm_rows, ltv_rows);
        metrics::counter!("analysis.customers_scored").increment(records.len() as u64);

        let churn_risks = if request.include_churn_risk {
            self.scorer.score(&records)
        } else {
            Vec::new()
        };
        let value_growth = if request.include_value_growth {
            self.projector.project(&records)
        } else {
            Vec::new()
        };
        let segment_analysis = if request.include_rfm_analysis {
            self.aggregator.aggregate(&records, &churn_risks)
        } else {
            SegmentAnalysisSummary::empty()
        };
        let recommendations = if request.include_recommendations {
            self.recommender
                .recommend(&churn_risks, &value_growth, &segment_analysis)
        } else {
            Vec::new()
        };

        info!(
            customers = records.len(),
            churn_risks = churn_risks.len(),
            value_growth = value_growth.len(),
            recommendations = recommendations.len(),
            "Lifecycle analysis complete"
        );

        Ok(AnalysisData {
            churn_risks,
            value_growth,
            segment_analysis,
            recommendations,
            timestamp: Utc::now(),
        })
    }

    /// Resolve the analysis window. A missing end date means today; a
    /// missing start date means the configured trailing period.
    fn resolve_window(&self, request: &AnalysisRequest) -> AnalysisWindow {
        let end = request.end_date.unwrap_or_else(|| Utc::now().date_naive());
        match request.start_date {
            Some(start) => AnalysisWindow::new(start, end),
            None => AnalysisWindow::trailing(end, self.config.default_window_days),
        }
    }
}
