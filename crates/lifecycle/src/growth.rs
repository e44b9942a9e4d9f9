//! Projects LTV trajectory, growth potential and the segment upgrade path
//! for each customer.

use serde::{Deserialize, Serialize};

use pulse_core::types::{CustomerMetricRecord, RfmSegment};

/// Direction of a customer's LTV trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LtvTrend {
    Accelerating,
    Growing,
    Stable,
    Declining,
}

/// How much headroom a customer has for value growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPotential {
    High,
    Medium,
    Low,
}

/// Expected time for a customer to reach the target segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeHorizon {
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6-9 months")]
    SixToNineMonths,
    #[serde(rename = "9-12 months")]
    NineToTwelveMonths,
    #[serde(rename = "12+ months")]
    TwelvePlusMonths,
}

impl UpgradeHorizon {
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeHorizon::ThreeToSixMonths => "3-6 months",
            UpgradeHorizon::SixToNineMonths => "6-9 months",
            UpgradeHorizon::NineToTwelveMonths => "9-12 months",
            UpgradeHorizon::TwelvePlusMonths => "12+ months",
        }
    }
}

/// Growth outlook for a single customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueGrowthProjection {
    pub customer_id: String,
    pub full_name: String,
    pub current_ltv: f64,
    pub estimated_future_ltv: f64,
    pub ltv_growth_rate: f64,
    pub ltv_trend: LtvTrend,
    pub growth_potential: GrowthPotential,
    pub current_segment: RfmSegment,
    pub target_segment: RfmSegment,
    pub time_to_upgrade: UpgradeHorizon,
    pub required_actions: Vec<String>,
}

/// Projects LTV growth for batches of customer metric records.
#[derive(Debug, Clone)]
pub struct ValueGrowthProjector;

impl ValueGrowthProjector {
    pub fn new() -> Self {
        Self
    }

    /// Project every record, sorted by descending growth rate. The sort is
    /// stable, so equal rates keep their input order.
    pub fn project(&self, records: &[CustomerMetricRecord]) -> Vec<ValueGrowthProjection> {
        let mut projections: Vec<ValueGrowthProjection> =
            records.iter().map(project_record).collect();
        projections.sort_by(|a, b| {
            b.ltv_growth_rate
                .partial_cmp(&a.ltv_growth_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        projections
    }
}

impl Default for ValueGrowthProjector {
    fn default() -> Self {
        Self::new()
    }
}

fn project_record(record: &CustomerMetricRecord) -> ValueGrowthProjection {
    let rate = growth_rate(record.purchase_frequency_per_month, record.average_order_value);
    let current_ltv = record.estimated_ltv;
    let growth_potential = growth_potential(rate, current_ltv);
    let target_segment = upgrade_target(record.rfm_segment, rate);

    ValueGrowthProjection {
        customer_id: record.customer_id.clone(),
        full_name: record.full_name.clone(),
        current_ltv,
        estimated_future_ltv: (current_ltv * (1.0 + rate / 100.0)).round(),
        ltv_growth_rate: rate,
        ltv_trend: trend(rate),
        growth_potential,
        current_segment: record.rfm_segment,
        target_segment,
        time_to_upgrade: upgrade_horizon(rate),
        required_actions: required_actions(growth_potential),
    }
}

/// Signed growth rate (percent) from monthly purchase cadence and order
/// size. A customer below every engagement bar is projected to shrink.
fn growth_rate(frequency_per_month: f64, average_order_value: f64) -> f64 {
    if frequency_per_month > 2.0 && average_order_value > 1_000.0 {
        15.0
    } else if frequency_per_month > 1.0 && average_order_value > 500.0 {
        8.0
    } else if frequency_per_month > 0.5 {
        3.0
    } else {
        -5.0
    }
}

fn trend(rate: f64) -> LtvTrend {
    if rate > 10.0 {
        LtvTrend::Accelerating
    } else if rate > 5.0 {
        LtvTrend::Growing
    } else if rate < 0.0 {
        LtvTrend::Declining
    } else {
        LtvTrend::Stable
    }
}

fn growth_potential(rate: f64, current_ltv: f64) -> GrowthPotential {
    if rate > 10.0 && current_ltv > 5_000.0 {
        GrowthPotential::High
    } else if rate > 5.0 || current_ltv > 2_000.0 {
        GrowthPotential::Medium
    } else {
        GrowthPotential::Low
    }
}

/// Segment upgrade rules, in order. Segments outside these three paths keep
/// their current segment as the target.
fn upgrade_target(segment: RfmSegment, rate: f64) -> RfmSegment {
    match segment {
        RfmSegment::NewCustomers if rate > 5.0 => RfmSegment::PotentialLoyalists,
        RfmSegment::PotentialLoyalists if rate > 10.0 => RfmSegment::LoyalCustomers,
        RfmSegment::NeedAttention if rate > 0.0 => RfmSegment::PotentialLoyalists,
        other => other,
    }
}

/// Horizon buckets use inclusive lower bounds so the top rate lands in the
/// shortest window.
fn upgrade_horizon(rate: f64) -> UpgradeHorizon {
    if rate >= 15.0 {
        UpgradeHorizon::ThreeToSixMonths
    } else if rate >= 8.0 {
        UpgradeHorizon::SixToNineMonths
    } else if rate >= 3.0 {
        UpgradeHorizon::NineToTwelveMonths
    } else {
        UpgradeHorizon::TwelvePlusMonths
    }
}

fn required_actions(potential: GrowthPotential) -> Vec<String> {
    let actions: &[&str] = match potential {
        GrowthPotential::High => &[
            "Introduce premium and limited-edition lines",
            "Invite into the VIP loyalty tier",
            "Offer early access to new collections",
        ],
        GrowthPotential::Medium => &[
            "Cross-sell complements of recent purchases",
            "Promote bundles to lift order size",
            "Nudge toward a replenishment subscription",
        ],
        GrowthPotential::Low => &[
            "Keep a regular engagement cadence",
            "Collect feedback to find purchase barriers",
            "Test small incentives on the next order",
        ],
    };
    actions.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::types::LifecycleStage;

    fn record(
        id: &str,
        frequency_per_month: f64,
        average_order_value: f64,
        estimated_ltv: f64,
        segment: RfmSegment,
    ) -> CustomerMetricRecord {
        CustomerMetricRecord {
            customer_id: id.to_string(),
            full_name: format!("Customer {id}"),
            recency_days: 20,
            frequency: 3.0,
            monetary_value: 1_000.0,
            rfm_segment: segment,
            lifecycle_stage: LifecycleStage::Active,
            last_purchase_date: None,
            purchase_frequency_per_month: frequency_per_month,
            average_order_value,
            estimated_ltv,
        }
    }

    #[test]
    fn test_top_tier_customer_accelerates() {
        let projector = ValueGrowthProjector::new();
        let projections = projector.project(&[record(
            "c-1",
            3.0,
            1_500.0,
            6_000.0,
            RfmSegment::LoyalCustomers,
        )]);

        let p = &projections[0];
        assert_eq!(p.ltv_growth_rate, 15.0);
        assert_eq!(p.ltv_trend, LtvTrend::Accelerating);
        assert_eq!(p.growth_potential, GrowthPotential::High);
        assert_eq!(p.time_to_upgrade, UpgradeHorizon::ThreeToSixMonths);
        assert_eq!(p.estimated_future_ltv, 6_900.0);
        assert_eq!(p.target_segment, RfmSegment::LoyalCustomers);
        assert_eq!(p.required_actions.len(), 3);
    }

    #[test]
    fn test_growth_rate_buckets() {
        assert_eq!(growth_rate(2.1, 1_001.0), 15.0);
        // Both bars are strict: sitting exactly on one drops to the next rule.
        assert_eq!(growth_rate(2.0, 2_000.0), 8.0);
        assert_eq!(growth_rate(2.1, 1_000.0), 8.0);
        assert_eq!(growth_rate(1.5, 600.0), 8.0);
        assert_eq!(growth_rate(1.0, 600.0), 3.0);
        assert_eq!(growth_rate(1.5, 500.0), 3.0);
        assert_eq!(growth_rate(0.6, 100.0), 3.0);
        assert_eq!(growth_rate(0.5, 100.0), -5.0);
        assert_eq!(growth_rate(0.0, 0.0), -5.0);
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(trend(15.0), LtvTrend::Accelerating);
        assert_eq!(trend(10.0), LtvTrend::Growing);
        assert_eq!(trend(8.0), LtvTrend::Growing);
        assert_eq!(trend(5.0), LtvTrend::Stable);
        assert_eq!(trend(3.0), LtvTrend::Stable);
        assert_eq!(trend(0.0), LtvTrend::Stable);
        assert_eq!(trend(-5.0), LtvTrend::Declining);
    }

    #[test]
    fn test_growth_potential_boundaries() {
        assert_eq!(growth_potential(15.0, 5_001.0), GrowthPotential::High);
        // 5000 does not clear the strict LTV bar for high.
        assert_eq!(growth_potential(15.0, 5_000.0), GrowthPotential::Medium);
        assert_eq!(growth_potential(8.0, 100.0), GrowthPotential::Medium);
        assert_eq!(growth_potential(3.0, 2_500.0), GrowthPotential::Medium);
        assert_eq!(growth_potential(3.0, 500.0), GrowthPotential::Low);
        assert_eq!(growth_potential(-5.0, 1_000.0), GrowthPotential::Low);
    }

    #[test]
    fn test_upgrade_paths() {
        assert_eq!(
            upgrade_target(RfmSegment::NewCustomers, 8.0),
            RfmSegment::PotentialLoyalists
        );
        assert_eq!(
            upgrade_target(RfmSegment::NewCustomers, 5.0),
            RfmSegment::NewCustomers
        );
        assert_eq!(
            upgrade_target(RfmSegment::PotentialLoyalists, 15.0),
            RfmSegment::LoyalCustomers
        );
        assert_eq!(
            upgrade_target(RfmSegment::PotentialLoyalists, 8.0),
            RfmSegment::PotentialLoyalists
        );
        assert_eq!(
            upgrade_target(RfmSegment::NeedAttention, 3.0),
            RfmSegment::PotentialLoyalists
        );
        assert_eq!(
            upgrade_target(RfmSegment::NeedAttention, -5.0),
            RfmSegment::NeedAttention
        );
        assert_eq!(upgrade_target(RfmSegment::Champions, 15.0), RfmSegment::Champions);
    }

    #[test]
    fn test_upgrade_horizon_lower_bounds_are_inclusive() {
        assert_eq!(upgrade_horizon(15.0), UpgradeHorizon::ThreeToSixMonths);
        assert_eq!(upgrade_horizon(14.9), UpgradeHorizon::SixToNineMonths);
        assert_eq!(upgrade_horizon(8.0), UpgradeHorizon::SixToNineMonths);
        assert_eq!(upgrade_horizon(3.0), UpgradeHorizon::NineToTwelveMonths);
        assert_eq!(upgrade_horizon(2.9), UpgradeHorizon::TwelvePlusMonths);
        assert_eq!(upgrade_horizon(-5.0), UpgradeHorizon::TwelvePlusMonths);
    }

    #[test]
    fn test_horizon_serializes_as_display_bucket() {
        let json = serde_json::to_string(&UpgradeHorizon::ThreeToSixMonths).unwrap();
        assert_eq!(json, "\"3-6 months\"");
        let parsed: UpgradeHorizon = serde_json::from_str("\"12+ months\"").unwrap();
        assert_eq!(parsed, UpgradeHorizon::TwelvePlusMonths);
    }

    #[test]
    fn test_future_ltv_rounds_to_whole_units() {
        let projector = ValueGrowthProjector::new();
        let projections =
            projector.project(&[record("c-2", 1.5, 600.0, 1_005.0, RfmSegment::Promising)]);

        // 1005 * 1.08 = 1085.4, rounded.
        assert_eq!(projections[0].estimated_future_ltv, 1_085.0);
    }

    #[test]
    fn test_zeroed_record_projects_decline() {
        let projector = ValueGrowthProjector::new();
        let projections = projector.project(&[record("c-3", 0.0, 0.0, 0.0, RfmSegment::Lost)]);

        let p = &projections[0];
        assert_eq!(p.ltv_growth_rate, -5.0);
        assert_eq!(p.ltv_trend, LtvTrend::Declining);
        assert_eq!(p.growth_potential, GrowthPotential::Low);
        assert_eq!(p.time_to_upgrade, UpgradeHorizon::TwelvePlusMonths);
        assert_eq!(p.estimated_future_ltv, 0.0);
        assert_eq!(p.target_segment, RfmSegment::Lost);
    }

    #[test]
    fn test_batch_sorts_by_descending_rate_with_stable_ties() {
        let projector = ValueGrowthProjector::new();
        let projections = projector.project(&[
            record("flat-1", 0.6, 100.0, 500.0, RfmSegment::Promising),
            record("fast", 3.0, 1_500.0, 6_000.0, RfmSegment::Champions),
            record("flat-2", 0.6, 100.0, 500.0, RfmSegment::Promising),
            record("shrinking", 0.1, 50.0, 100.0, RfmSegment::Lost),
        ]);

        let ids: Vec<&str> = projections.iter().map(|p| p.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["fast", "flat-1", "flat-2", "shrinking"]);
    }
}
