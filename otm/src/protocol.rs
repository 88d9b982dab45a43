//! Wire shapes for the OTM saved-query API and this service's responses.
//!
//! Raw search items stay as `serde_json::Value`: the upstream populates fields
//! unevenly across queries and normalization must degrade to absent values
//! instead of failing a whole envelope on one malformed item.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Response body of the saved-query search endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedQueryResponse {
    pub items: Vec<JsonValue>,
    pub count: Option<u64>,
    pub has_more: bool,
}

/// One decoded status on a shipment, keyed by its status type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub value: String,
    pub update_date: Option<String>,
}

/// The flat, normalized view of one shipment.
///
/// `shipment_xid` is the dedup key and is always populated by the upstream;
/// every other field is optional and rendered as null when the source omits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub shipment_xid: Option<String>,
    pub shipment_name: Option<String>,
    pub transport_mode: Option<String>,
    pub carrier: Option<String>,
    pub source_location: Option<String>,
    pub dest_location: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub insert_date: Option<String>,
    pub update_date: Option<String>,
    pub total_weight: Option<JsonValue>,
    pub weight_unit: Option<String>,
    pub total_volume: Option<JsonValue>,
    pub volume_unit: Option<String>,
    pub total_actual_cost: Option<JsonValue>,
    pub currency: Option<String>,
    /// True when the shipment is FreightPay-relevant: either the upstream
    /// flags it as a work shipment or it carries a SEND_SHIPMENT_USB status.
    pub shipment_as_work: bool,
    pub perspective: Option<String>,
    pub attribute2: Option<String>,
    pub attribute10: Option<String>,
    pub data_source: Option<String>,
    pub statuses: IndexMap<String, StatusEntry>,
}

/// Result envelope for a single saved-query dispatch.
///
/// `error` and `items` are mutually exclusive in intent: a failed dispatch has
/// an empty item list and a zero count. Callers trust `error` over `count`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query: String,
    pub count: u64,
    pub has_more: bool,
    pub items: Vec<ShipmentRecord>,
    pub error: Option<String>,
}

impl QueryResult {
    /// Zero-item envelope for a dispatch that failed entirely.
    pub fn failed(query: &str, error: String) -> Self {
        Self {
            query: query.to_string(),
            count: 0,
            has_more: false,
            items: Vec::new(),
            error: Some(error),
        }
    }

    pub fn summary(&self) -> QuerySummary {
        QuerySummary {
            name: self.query.clone(),
            count: self.count,
            error: self.error.clone(),
        }
    }
}

/// Per-query line item reported alongside the merged search result.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub name: String,
    pub count: u64,
    pub error: Option<String>,
}

/// Merged, deduplicated result for one search term.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub search_type: String,
    pub search_value: String,
    /// Count after cross-query deduplication.
    pub total_count: u64,
    pub queries: Vec<QuerySummary>,
    pub errors: Vec<String>,
    pub items: Vec<ShipmentRecord>,
}

/// Grouped response for a bulk search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult {
    pub search_type: String,
    pub term_count: usize,
    /// Sum of per-term merged counts. A shipment matching two different terms
    /// is counted twice; totals reflect match volume per term.
    pub total_count: u64,
    pub results: Vec<SearchResult>,
}

/// Outcome of one status-transition trigger dispatch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOutcome {
    pub status: &'static str,
    pub http_status: u16,
    pub shipment_xid: String,
    /// First 500 characters of the integration endpoint's response body.
    pub response: String,
}

/// Health-probe report. Field names match the legacy service verbatim.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otm_http: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_query_response_defaults() {
        let parsed: SavedQueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.count, None);
        assert!(!parsed.has_more);

        let parsed: SavedQueryResponse =
            serde_json::from_str(r#"{"items": [{}], "count": 7, "hasMore": true}"#).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.count, Some(7));
        assert!(parsed.has_more);
    }

    #[test]
    fn test_record_wire_names() {
        let record = ShipmentRecord {
            shipment_xid: Some("SHIP1".to_string()),
            shipment_name: None,
            transport_mode: Some("TL".to_string()),
            carrier: None,
            source_location: None,
            dest_location: None,
            start_time: None,
            end_time: None,
            insert_date: None,
            update_date: None,
            total_weight: Some(serde_json::json!(410.5)),
            weight_unit: Some("LB".to_string()),
            total_volume: None,
            volume_unit: None,
            total_actual_cost: None,
            currency: None,
            shipment_as_work: true,
            perspective: None,
            attribute2: None,
            attribute10: None,
            data_source: None,
            statuses: IndexMap::new(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["shipmentXid"], "SHIP1");
        assert_eq!(json["transportMode"], "TL");
        assert_eq!(json["totalWeight"], 410.5);
        assert_eq!(json["weightUnit"], "LB");
        assert_eq!(json["shipmentAsWork"], true);
        assert_eq!(json["destLocation"], JsonValue::Null);
    }

    #[test]
    fn test_failed_envelope_shape() {
        let envelope = QueryResult::failed("KFNA.FP_SHP_NAME_DIRECT", "HTTP 500: boom".to_string());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["query"], "KFNA.FP_SHP_NAME_DIRECT");
        assert_eq!(json["count"], 0);
        assert_eq!(json["hasMore"], false);
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["error"], "HTTP 500: boom");
    }

    #[test]
    fn test_health_status_field_names() {
        let healthy = HealthStatus {
            status: "ok",
            otm_http: Some(200),
            detail: None,
        };
        let json = serde_json::to_value(&healthy).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "otm_http": 200}));

        let failed = HealthStatus {
            status: "error",
            otm_http: None,
            detail: Some("connection refused".to_string()),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "detail": "connection refused"})
        );
    }
}
