use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RFM segment taxonomy used by the segmentation views.
///
/// Labels match the store's `rfm_segment` column verbatim; anything the
/// store emits outside this set lands in `Unclassified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RfmSegment {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "Potential Loyalists")]
    PotentialLoyalists,
    #[serde(rename = "New Customers")]
    NewCustomers,
    #[serde(rename = "Promising")]
    Promising,
    #[serde(rename = "Need Attention")]
    NeedAttention,
    #[serde(rename = "About to Sleep")]
    AboutToSleep,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Cannot Lose Them")]
    CannotLoseThem,
    #[serde(rename = "Hibernating")]
    Hibernating,
    #[serde(rename = "Lost")]
    Lost,
    #[serde(rename = "Unclassified")]
    Unclassified,
}

impl RfmSegment {
    /// Human-readable label as emitted by the segmentation views.
    pub fn label(&self) -> &'static str {
        match self {
            RfmSegment::Champions => "Champions",
            RfmSegment::LoyalCustomers => "Loyal Customers",
            RfmSegment::PotentialLoyalists => "Potential Loyalists",
            RfmSegment::NewCustomers => "New Customers",
            RfmSegment::Promising => "Promising",
            RfmSegment::NeedAttention => "Need Attention",
            RfmSegment::AboutToSleep => "About to Sleep",
            RfmSegment::AtRisk => "At Risk",
            RfmSegment::CannotLoseThem => "Cannot Lose Them",
            RfmSegment::Hibernating => "Hibernating",
            RfmSegment::Lost => "Lost",
            RfmSegment::Unclassified => "Unclassified",
        }
    }

    /// Parse a store label. Returns `None` for labels outside the taxonomy;
    /// callers decide the fallback.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let all = [
            RfmSegment::Champions,
            RfmSegment::LoyalCustomers,
            RfmSegment::PotentialLoyalists,
            RfmSegment::NewCustomers,
            RfmSegment::Promising,
            RfmSegment::NeedAttention,
            RfmSegment::AboutToSleep,
            RfmSegment::AtRisk,
            RfmSegment::CannotLoseThem,
            RfmSegment::Hibernating,
            RfmSegment::Lost,
            RfmSegment::Unclassified,
        ];
        all.into_iter().find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for RfmSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse engagement trajectory assigned by the lifecycle views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleStage {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Inactive")]
    Inactive,
    #[serde(rename = "Churned")]
    Churned,
    #[serde(rename = "Unspecified")]
    Unspecified,
}

impl LifecycleStage {
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleStage::Active => "Active",
            LifecycleStage::AtRisk => "At Risk",
            LifecycleStage::Inactive => "Inactive",
            LifecycleStage::Churned => "Churned",
            LifecycleStage::Unspecified => "Unspecified",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [
            LifecycleStage::Active,
            LifecycleStage::AtRisk,
            LifecycleStage::Inactive,
            LifecycleStage::Churned,
            LifecycleStage::Unspecified,
        ]
        .into_iter()
        .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical per-customer record the scoring engine operates on.
///
/// One record exists per customer that had RFM data in the analysis window;
/// LTV fields are zero when the LTV view had no row for the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerMetricRecord {
    pub customer_id: String,
    pub full_name: String,
    /// Days since the customer's last purchase.
    pub recency_days: u32,
    /// Purchase count inside the analysis window.
    pub frequency: f64,
    /// Total historical spend.
    pub monetary_value: f64,
    pub rfm_segment: RfmSegment,
    pub lifecycle_stage: LifecycleStage,
    pub last_purchase_date: Option<NaiveDate>,
    pub purchase_frequency_per_month: f64,
    pub average_order_value: f64,
    pub estimated_ltv: f64,
}

/// Resolved date window an analysis run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Trailing window of `days` days ending at `end`.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_labels_round_trip() {
        for segment in [
            RfmSegment::Champions,
            RfmSegment::NeedAttention,
            RfmSegment::CannotLoseThem,
            RfmSegment::Lost,
        ] {
            assert_eq!(RfmSegment::from_label(segment.label()), Some(segment));
        }
        assert_eq!(RfmSegment::from_label("  at risk "), Some(RfmSegment::AtRisk));
        assert_eq!(RfmSegment::from_label("VIP Whales"), None);
    }

    #[test]
    fn test_stage_labels_round_trip() {
        assert_eq!(LifecycleStage::from_label("Churned"), Some(LifecycleStage::Churned));
        assert_eq!(LifecycleStage::from_label("at risk"), Some(LifecycleStage::AtRisk));
        assert_eq!(LifecycleStage::from_label("dormant"), None);
    }

    #[test]
    fn test_trailing_window() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let window = AnalysisWindow::trailing(end, 90);
        assert_eq!(window.end, end);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_segment_serde_uses_display_labels() {
        let json = serde_json::to_string(&RfmSegment::AboutToSleep).unwrap();
        assert_eq!(json, "\"About to Sleep\"");
        let parsed: RfmSegment = serde_json::from_str("\"Cannot Lose Them\"").unwrap();
        assert_eq!(parsed, RfmSegment::CannotLoseThem);
    }
}
