//! Integration test for the full snapshot-to-envelope analysis flow.
//! Runs entirely in memory against a fixed snapshot; no services required.

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use pulse_core::config::AnalysisConfig;
    use pulse_core::types::RfmSegment;
    use pulse_lifecycle::churn::RiskLevel;
    use pulse_lifecycle::growth::{GrowthPotential, LtvTrend, UpgradeHorizon};
    use pulse_lifecycle::recommend::RecommendationCategory;
    use pulse_lifecycle::source::{CustomerIdentityRow, LtvMetricsRow, RfmMetricsRow, Snapshot};
    use pulse_lifecycle::{AnalysisRequest, SegmentationPipeline, SnapshotSource};

    /// Construct a sample three-customer snapshot spanning the risk tiers.
    fn sample_snapshot() -> Snapshot {
        Snapshot {
            rfm_metrics: vec![
                RfmMetricsRow {
                    customer_id: "cust-301".to_string(),
                    recency_days: 120,
                    frequency: 0.8,
                    monetary: 350.0,
                    rfm_segment: "Hibernating".to_string(),
                    lifecycle_stage: "Inactive".to_string(),
                    last_purchase_date: NaiveDate::from_ymd_opt(2024, 3, 2),
                },
                RfmMetricsRow {
                    customer_id: "cust-302".to_string(),
                    recency_days: 12,
                    frequency: 5.0,
                    monetary: 3_400.0,
                    rfm_segment: "Loyal Customers".to_string(),
                    lifecycle_stage: "Active".to_string(),
                    last_purchase_date: NaiveDate::from_ymd_opt(2024, 6, 18),
                },
                RfmMetricsRow {
                    customer_id: "cust-303".to_string(),
                    recency_days: 18,
                    frequency: 1.5,
                    monetary: 260.0,
                    rfm_segment: "New Customers".to_string(),
                    lifecycle_stage: "Active".to_string(),
                    last_purchase_date: NaiveDate::from_ymd_opt(2024, 6, 12),
                },
            ],
            ltv_metrics: vec![
                LtvMetricsRow {
                    customer_id: "cust-301".to_string(),
                    purchase_frequency_per_month: 0.3,
                    average_order_value: 80.0,
                    estimated_ltv: 1_500.0,
                },
                LtvMetricsRow {
                    customer_id: "cust-302".to_string(),
                    purchase_frequency_per_month: 2.5,
                    average_order_value: 1_300.0,
                    estimated_ltv: 7_200.0,
                },
                LtvMetricsRow {
                    customer_id: "cust-303".to_string(),
                    purchase_frequency_per_month: 1.2,
                    average_order_value: 650.0,
                    estimated_ltv: 800.0,
                },
            ],
            customers: vec![
                CustomerIdentityRow {
                    customer_id: "cust-301".to_string(),
                    full_name: Some("Maya Okafor".to_string()),
                },
                CustomerIdentityRow {
                    customer_id: "cust-302".to_string(),
                    full_name: Some("Theo Brandt".to_string()),
                },
                // Archived customer with no metrics rows in the window.
                CustomerIdentityRow {
                    customer_id: "cust-900".to_string(),
                    full_name: Some("Elin Vasquez".to_string()),
                },
            ],
        }
    }

    fn pipeline() -> SegmentationPipeline<SnapshotSource> {
        SegmentationPipeline::new(
            SnapshotSource::new(sample_snapshot()),
            AnalysisConfig::default(),
        )
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = sample_snapshot();
        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let roundtripped: Snapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(roundtripped.rfm_metrics.len(), 3);
        assert_eq!(roundtripped.rfm_metrics[0].customer_id, "cust-301");
        assert_eq!(roundtripped.rfm_metrics[0].recency_days, 120);
        assert_eq!(
            roundtripped.rfm_metrics[0].last_purchase_date,
            NaiveDate::from_ymd_opt(2024, 3, 2)
        );
        assert_eq!(roundtripped.ltv_metrics[1].estimated_ltv, 7_200.0);
        assert_eq!(
            roundtripped.customers[0].full_name.as_deref(),
            Some("Maya Okafor")
        );
    }

    #[tokio::test]
    async fn test_analysis_flow_end_to_end() {
        let request = AnalysisRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
            ..AnalysisRequest::default()
        };

        let envelope = pipeline().run(&request).await;

        assert!(envelope.success);
        assert!(envelope.error.is_none());
        let data = &envelope.data;

        // The identity-only archived customer never becomes a scored record.
        assert_eq!(data.churn_risks.len(), 3);
        assert!(data.churn_risks.iter().all(|a| a.customer_id != "cust-900"));

        // Risk list is sorted descending with the hibernating customer on top.
        let top = &data.churn_risks[0];
        assert_eq!(top.customer_id, "cust-301");
        assert_eq!(top.full_name, "Maya Okafor");
        assert_eq!(top.risk_score, 66);
        assert_eq!(top.risk_level, RiskLevel::High);
        assert!((top.potential_loss_value - 900.0).abs() < 1e-9);
        assert!(!top.contributing_factors.is_empty());
        assert!(!top.recommended_actions.is_empty());

        // A customer without an identity row keeps the placeholder name.
        let newcomer = data
            .churn_risks
            .iter()
            .find(|a| a.customer_id == "cust-303")
            .unwrap();
        assert_eq!(newcomer.full_name, "Unknown");

        // Growth list leads with the loyal big spender.
        let fastest = &data.value_growth[0];
        assert_eq!(fastest.customer_id, "cust-302");
        assert_eq!(fastest.ltv_growth_rate, 15.0);
        assert_eq!(fastest.ltv_trend, LtvTrend::Accelerating);
        assert_eq!(fastest.growth_potential, GrowthPotential::High);
        assert_eq!(fastest.estimated_future_ltv, 8_280.0);

        // The newcomer is on the upgrade path toward potential loyalists.
        let growing = data
            .value_growth
            .iter()
            .find(|p| p.customer_id == "cust-303")
            .unwrap();
        assert_eq!(growing.current_segment, RfmSegment::NewCustomers);
        assert_eq!(growing.target_segment, RfmSegment::PotentialLoyalists);
        assert_eq!(growing.time_to_upgrade, UpgradeHorizon::SixToNineMonths);

        let summary = &data.segment_analysis;
        assert_eq!(summary.total_customers, 3);
        assert_eq!(summary.segment_distribution[&RfmSegment::Hibernating], 1);
        assert_eq!(summary.segment_distribution[&RfmSegment::LoyalCustomers], 1);
        assert_eq!(summary.average_rfm_scores.recency, 50);
        assert_eq!(summary.average_rfm_scores.frequency, 2.43);
        assert_eq!(summary.average_rfm_scores.monetary, 1_337);
        assert_eq!(summary.risk_level_distribution[&RiskLevel::High], 1);
        assert_eq!(summary.risk_level_distribution[&RiskLevel::Low], 2);

        // One recommendation per firing rule, in declaration order.
        let categories: Vec<RecommendationCategory> =
            data.recommendations.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![
                RecommendationCategory::RiskPrevention,
                RecommendationCategory::ValueUplift,
                RecommendationCategory::GrowthNurturing,
            ]
        );
    }

    #[tokio::test]
    async fn test_envelope_serializes_with_display_buckets() {
        let envelope = pipeline().run(&AnalysisRequest::default()).await;
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], serde_json::json!(true));
        assert!(json.get("error").is_none());

        // Segment keys keep their display labels.
        let segments = &json["data"]["segment_analysis"]["segment_distribution"];
        assert_eq!(segments["Loyal Customers"], serde_json::json!(1));
        assert_eq!(segments["New Customers"], serde_json::json!(1));

        // Risk tiers and horizons serialize as their wire spellings.
        let risks = &json["data"]["segment_analysis"]["risk_level_distribution"];
        assert_eq!(risks["high"], serde_json::json!(1));
        assert_eq!(risks["low"], serde_json::json!(2));
        assert_eq!(
            json["data"]["value_growth"][0]["time_to_upgrade"],
            serde_json::json!("3-6 months")
        );
    }
}
