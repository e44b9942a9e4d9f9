//! Customer data source trait and the row types mirroring the store's
//! analytics views.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pulse_core::types::AnalysisWindow;
use pulse_core::PulseResult;

/// One row of the per-customer RFM metrics view.
///
/// Numeric fields default to 0 when the store omits them; a malformed row
/// never aborts a fetch on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfmMetricsRow {
    pub customer_id: String,
    #[serde(default)]
    pub recency_days: u32,
    #[serde(default)]
    pub frequency: f64,
    #[serde(default)]
    pub monetary: f64,
    #[serde(default)]
    pub rfm_segment: String,
    #[serde(default)]
    pub lifecycle_stage: String,
    #[serde(default)]
    pub last_purchase_date: Option<NaiveDate>,
}

/// One row of the per-customer lifetime-value metrics view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LtvMetricsRow {
    pub customer_id: String,
    #[serde(default)]
    pub purchase_frequency_per_month: f64,
    #[serde(default)]
    pub average_order_value: f64,
    #[serde(default)]
    pub estimated_ltv: f64,
}

/// One row of the customer identity table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdentityRow {
    pub customer_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A fully materialized extract of the three store views, as produced by an
/// export job or the demo generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub rfm_metrics: Vec<RfmMetricsRow>,
    #[serde(default)]
    pub ltv_metrics: Vec<LtvMetricsRow>,
    #[serde(default)]
    pub customers: Vec<CustomerIdentityRow>,
}

/// Read-side collaborator that supplies the three per-customer collections
/// for an analysis window.
///
/// Implementations own their transport concerns (retries, timeouts,
/// pagination); the pipeline only awaits the three fetches and treats any
/// error as fatal for the run.
#[async_trait]
pub trait CustomerDataSource: Send + Sync {
    /// Fetch RFM metrics for customers active inside the window.
    async fn fetch_rfm_metrics(&self, window: &AnalysisWindow)
        -> PulseResult<Vec<RfmMetricsRow>>;

    /// Fetch lifetime-value metrics for customers active inside the window.
    async fn fetch_ltv_metrics(&self, window: &AnalysisWindow)
        -> PulseResult<Vec<LtvMetricsRow>>;

    /// Fetch the identity rows for the customer base.
    async fn fetch_identities(&self, window: &AnalysisWindow)
        -> PulseResult<Vec<CustomerIdentityRow>>;
}

/// In-memory source backed by a pre-extracted [`Snapshot`].
///
/// The snapshot is assumed to already be windowed by whatever produced it,
/// so the window argument is ignored. Used by the CLI (JSON snapshot files)
/// and by tests.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl CustomerDataSource for SnapshotSource {
    async fn fetch_rfm_metrics(
        &self,
        _window: &AnalysisWindow,
    ) -> PulseResult<Vec<RfmMetricsRow>> {
        debug!(rows = self.snapshot.rfm_metrics.len(), "Serving RFM metrics from snapshot");
        Ok(self.snapshot.rfm_metrics.clone())
    }

    async fn fetch_ltv_metrics(
        &self,
        _window: &AnalysisWindow,
    ) -> PulseResult<Vec<LtvMetricsRow>> {
        debug!(rows = self.snapshot.ltv_metrics.len(), "Serving LTV metrics from snapshot");
        Ok(self.snapshot.ltv_metrics.clone())
    }

    async fn fetch_identities(
        &self,
        _window: &AnalysisWindow,
    ) -> PulseResult<Vec<CustomerIdentityRow>> {
        debug!(rows = self.snapshot.customers.len(), "Serving identities from snapshot");
        Ok(self.snapshot.customers.clone())
    }
}
