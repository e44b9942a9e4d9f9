//! Customer lifecycle analytics — churn risk scoring, value growth
//! projection, segment rollups and portfolio recommendations.

pub mod aggregate;
pub mod churn;
pub mod growth;
pub mod normalizer;
pub mod pipeline;
pub mod recommend;
pub mod source;

pub use aggregate::SegmentAggregator;
pub use churn::ChurnRiskScorer;
pub use growth::ValueGrowthProjector;
pub use pipeline::{AnalysisEnvelope, AnalysisRequest, SegmentationPipeline};
pub use recommend::RecommendationEngine;
pub use source::{CustomerDataSource, Snapshot, SnapshotSource};
