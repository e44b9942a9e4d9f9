//! Joins the three store collections into canonical customer metric records.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use pulse_core::types::{CustomerMetricRecord, LifecycleStage, RfmSegment};

use crate::source::{CustomerIdentityRow, LtvMetricsRow, RfmMetricsRow};

const UNKNOWN_NAME: &str = "Unknown";

/// RFM facts lifted off a metrics row. Presence of this block is what makes
/// a customer scorable: drafts that never receive one are dropped.
#[derive(Debug, Clone)]
struct RfmFacts {
    recency_days: u32,
    frequency: f64,
    monetary: f64,
    segment: RfmSegment,
    stage: LifecycleStage,
    last_purchase_date: Option<NaiveDate>,
}

/// Lifetime-value facts. Absent means the LTV view had no row for the
/// customer, in which case every field defaults to 0.
#[derive(Debug, Clone, Default)]
struct LtvFacts {
    purchase_frequency_per_month: f64,
    average_order_value: f64,
    estimated_ltv: f64,
}

#[derive(Debug)]
struct RecordDraft {
    customer_id: String,
    full_name: Option<String>,
    rfm: Option<RfmFacts>,
    ltv: Option<LtvFacts>,
}

impl RecordDraft {
    fn new(customer_id: String) -> Self {
        Self {
            customer_id,
            full_name: None,
            rfm: None,
            ltv: None,
        }
    }

    /// Finalize the draft. Returns `None` when no RFM row was seen for the
    /// customer, since every downstream score keys off RFM facts.
    fn finish(self) -> Option<CustomerMetricRecord> {
        let rfm = self.rfm?;
        let ltv = self.ltv.unwrap_or_default();

        Some(CustomerMetricRecord {
            customer_id: self.customer_id,
            full_name: self
                .full_name
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            recency_days: rfm.recency_days,
            frequency: rfm.frequency,
            monetary_value: rfm.monetary,
            rfm_segment: rfm.segment,
            lifecycle_stage: rfm.stage,
            last_purchase_date: rfm.last_purchase_date,
            purchase_frequency_per_month: ltv.purchase_frequency_per_month,
            average_order_value: ltv.average_order_value,
            estimated_ltv: ltv.estimated_ltv,
        })
    }
}

/// Merge the identity, RFM and LTV collections into one record per customer.
///
/// The join is keyed on `customer_id`. Identity rows seed the drafts, RFM
/// rows overlay scoring fields, LTV rows overlay value fields. Customers
/// without an RFM row are dropped; customers without an identity row get the
/// name "Unknown"; customers without an LTV row get zeroed value fields.
///
/// Output preserves first-seen order across the three collections, which is
/// the tie-break order for every stable sort downstream.
pub fn normalize(
    identities: Vec<CustomerIdentityRow>,
    rfm_rows: Vec<RfmMetricsRow>,
    ltv_rows: Vec<LtvMetricsRow>,
) -> Vec<CustomerMetricRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut drafts: HashMap<String, RecordDraft> = HashMap::new();

    for identity in identities {
        let draft = drafts
            .entry(identity.customer_id.clone())
            .or_insert_with(|| {
                order.push(identity.customer_id.clone());
                RecordDraft::new(identity.customer_id.clone())
            });
        draft.full_name = identity.full_name.filter(|name| !name.trim().is_empty());
    }

    for row in rfm_rows {
        let segment = parse_segment(&row.rfm_segment, &row.customer_id);
        let stage = parse_stage(&row.lifecycle_stage, &row.customer_id);
        let draft = drafts.entry(row.customer_id.clone()).or_insert_with(|| {
            order.push(row.customer_id.clone());
            RecordDraft::new(row.customer_id.clone())
        });
        draft.rfm = Some(RfmFacts {
            recency_days: row.recency_days,
            frequency: row.frequency,
            monetary: row.monetary,
            segment,
            stage,
            last_purchase_date: row.last_purchase_date,
        });
    }

    for row in ltv_rows {
        // LTV rows never create a scorable record on their own, but the
        // draft still tracks them in case an RFM row arrives later.
        let draft = drafts.entry(row.customer_id.clone()).or_insert_with(|| {
            order.push(row.customer_id.clone());
            RecordDraft::new(row.customer_id.clone())
        });
        draft.ltv = Some(LtvFacts {
            purchase_frequency_per_month: row.purchase_frequency_per_month,
            average_order_value: row.average_order_value,
            estimated_ltv: row.estimated_ltv,
        });
    }

    let total_drafts = order.len();
    let mut records = Vec::with_capacity(total_drafts);
    for key in order {
        if let Some(draft) = drafts.remove(&key) {
            if let Some(record) = draft.finish() {
                records.push(record);
            }
        }
    }

    debug!(
        drafts = total_drafts,
        records = records.len(),
        "Normalized customer metric records"
    );
    records
}

fn parse_segment(label: &str, customer_id: &str) -> RfmSegment {
    RfmSegment::from_label(label).unwrap_or_else(|| {
        if !label.trim().is_empty() {
            warn!(
                customer_id = %customer_id,
                label = %label,
                "Unrecognized RFM segment label, treating as unclassified"
            );
        }
        RfmSegment::Unclassified
    })
}

fn parse_stage(label: &str, customer_id: &str) -> LifecycleStage {
    LifecycleStage::from_label(label).unwrap_or_else(|| {
        if !label.trim().is_empty() {
            warn!(
                customer_id = %customer_id,
                label = %label,
                "Unrecognized lifecycle stage label, treating as unspecified"
            );
        }
        LifecycleStage::Unspecified
    })
}
