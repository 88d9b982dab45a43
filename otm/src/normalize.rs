//! Normalization of raw saved-query items into flat shipment records.
//!
//! Everything here is pure and total: a missing or oddly shaped field always
//! degrades to an absent value, never to an error. The status decoding rules
//! encode undocumented upstream conventions; their precedence is observable
//! behavior and must not be reordered.

use crate::config::{DATA_SOURCE_QUALIFIER, FP_STATUS_TYPES};
use crate::protocol::{ShipmentRecord, StatusEntry};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Link relation carrying an object's canonical resource URL.
pub const CANONICAL_REL: &str = "canonical";

/// Strips the `<domain>.` qualifier prefix from a GID, if present.
pub(crate) fn strip_domain(gid: &str) -> &str {
    gid.split_once('.').map_or(gid, |(_, rest)| rest)
}

/// Truncates to at most `limit` characters, mirroring the legacy service's
/// slice-by-codepoint behavior for captured error and response bodies.
pub(crate) fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Resolves an object's external code from its link collection.
///
/// Scans for links whose `rel` matches, takes the last path segment of the
/// first usable href, and strips a `<domain>.` qualifier from that segment.
/// Links whose href contains no path separator are skipped.
pub fn xid_from_links(resource: &JsonValue, rel: &str) -> Option<String> {
    let links = resource.get("links")?.as_array()?;
    for link in links {
        if link.get("rel").and_then(JsonValue::as_str) != Some(rel) {
            continue;
        }
        let href = link.get("href").and_then(JsonValue::as_str).unwrap_or("");
        if let Some((_, last)) = href.rsplit_once('/') {
            return Some(strip_domain(last).to_string());
        }
    }
    None
}

/// Decodes a coded status value GID into its human-readable suffix.
///
/// The upstream has no single canonical format, so this is a best-effort
/// decoder with a fixed precedence:
/// 1. strip the `<domain>.` prefix from the value;
/// 2. if the value contains ` - `, everything after the first occurrence wins;
/// 3. else if the value starts with `<type>_` (case-insensitive, type with its
///    own domain prefix stripped), the remainder wins;
/// 4. else if the value contains `_`, the substring after the last `_` wins;
/// 5. else the trimmed value is returned unchanged.
pub fn decode_status_value(status_type_gid: &str, status_value_gid: &str) -> String {
    let val = strip_domain(status_value_gid);

    if let Some((_, rest)) = val.split_once(" - ") {
        return rest.trim().to_string();
    }

    let type_name = strip_domain(status_type_gid);
    let prefix_len = type_name.len() + 1;
    if let Some(head) = val.get(..prefix_len) {
        if head.eq_ignore_ascii_case(&format!("{type_name}_")) {
            return val[prefix_len..].trim().to_string();
        }
    }

    if let Some((_, tail)) = val.rsplit_once('_') {
        return tail.trim().to_string();
    }

    val.trim().to_string()
}

/// Builds the status-kind → decoded-entry mapping from the inline `statuses`
/// collection, keeping only the FreightPay allow-list and preferring the
/// update timestamp over the insert timestamp.
pub fn normalize_statuses(raw_statuses: &JsonValue) -> IndexMap<String, StatusEntry> {
    let mut result = IndexMap::new();
    let Some(items) = raw_statuses.get("items").and_then(JsonValue::as_array) else {
        return result;
    };

    for item in items {
        let type_gid = item
            .get("statusTypeGid")
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        let value_gid = item
            .get("statusValueGid")
            .and_then(JsonValue::as_str)
            .unwrap_or("");

        let type_key = strip_domain(type_gid);
        if !FP_STATUS_TYPES.contains(&type_key) {
            continue;
        }

        let update_date = ["updateDate", "insertDate"]
            .iter()
            .find_map(|field| {
                item.get(*field)
                    .and_then(|wrapper| wrapper.get("value"))
                    .and_then(JsonValue::as_str)
            })
            .map(str::to_string);

        result.insert(
            type_key.to_string(),
            StatusEntry {
                value: decode_status_value(type_gid, value_gid),
                update_date,
            },
        );
    }

    result
}

/// Finds the externally supplied data-source tag in the inline `refnums`
/// collection. First DATA_SOURCE-qualified refnum wins, in source order.
pub fn data_source_refnum(raw_refnums: &JsonValue) -> Option<String> {
    let items = raw_refnums.get("items")?.as_array()?;
    for item in items {
        let qualifier = item
            .get("shipmentRefnumQualGid")
            .and_then(JsonValue::as_str)
            .unwrap_or("");
        if strip_domain(qualifier).eq_ignore_ascii_case(DATA_SOURCE_QUALIFIER) {
            return item
                .get("shipmentRefnumValue")
                .and_then(JsonValue::as_str)
                .map(str::to_string);
        }
    }
    None
}

fn field_str(raw: &JsonValue, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

/// Unwraps `{"value": ..., "unit"/"currency": ...}` scalars, reading one key.
fn wrapped_str(raw: &JsonValue, field: &str, key: &str) -> Option<String> {
    raw.get(field)?
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

fn wrapped_value(raw: &JsonValue, field: &str) -> Option<JsonValue> {
    raw.get(field)?
        .get("value")
        .filter(|v| !v.is_null())
        .cloned()
}

fn linked_xid(raw: &JsonValue, field: &str) -> Option<String> {
    raw.get(field)
        .and_then(|resource| xid_from_links(resource, CANONICAL_REL))
}

/// Converts one raw query-result item into the canonical shipment record.
pub fn normalize_shipment(raw: &JsonValue) -> ShipmentRecord {
    let statuses = normalize_statuses(raw.get("statuses").unwrap_or(&JsonValue::Null));

    let shipment_as_work = raw
        .get("shipmentAsWork")
        .and_then(JsonValue::as_bool)
        .unwrap_or(false)
        || statuses.contains_key("SEND_SHIPMENT_USB");

    ShipmentRecord {
        shipment_xid: field_str(raw, "shipmentXid"),
        shipment_name: field_str(raw, "shipmentName"),
        transport_mode: field_str(raw, "transportModeGid"),
        carrier: linked_xid(raw, "servprov"),
        source_location: linked_xid(raw, "sourceLocation"),
        dest_location: linked_xid(raw, "destLocation"),
        start_time: wrapped_str(raw, "startTime", "value"),
        end_time: wrapped_str(raw, "endTime", "value"),
        insert_date: wrapped_str(raw, "insertDate", "value"),
        update_date: wrapped_str(raw, "updateDate", "value"),
        total_weight: wrapped_value(raw, "totalWeight"),
        weight_unit: wrapped_str(raw, "totalWeight", "unit"),
        total_volume: wrapped_value(raw, "totalVolume"),
        volume_unit: wrapped_str(raw, "totalVolume", "unit"),
        total_actual_cost: wrapped_value(raw, "totalActualCost"),
        currency: wrapped_str(raw, "totalActualCost", "currency"),
        shipment_as_work,
        perspective: field_str(raw, "perspective"),
        attribute2: field_str(raw, "attribute2"),
        attribute10: field_str(raw, "attribute10"),
        data_source: data_source_refnum(raw.get("refnums").unwrap_or(&JsonValue::Null)),
        statuses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xid_from_links_strips_domain_qualifier() {
        let resource = json!({
            "links": [
                {"rel": "self", "href": "https://otm/resources/servprovs/X.1"},
                {"rel": "canonical", "href": "https://otm/resources/servprovs/KFNA.CARRIER123"},
            ]
        });
        assert_eq!(
            xid_from_links(&resource, CANONICAL_REL),
            Some("CARRIER123".to_string())
        );
    }

    #[test]
    fn test_xid_from_links_unqualified_segment() {
        let resource = json!({
            "links": [{"rel": "canonical", "href": "https://otm/locations/PLANT9"}]
        });
        assert_eq!(
            xid_from_links(&resource, CANONICAL_REL),
            Some("PLANT9".to_string())
        );
    }

    #[test]
    fn test_xid_from_links_skips_href_without_path() {
        // A matching link with no path separator is skipped in favor of a
        // later usable one, as the legacy service did.
        let resource = json!({
            "links": [
                {"rel": "canonical", "href": "opaque"},
                {"rel": "canonical", "href": "https://otm/servprovs/KFNA.C2"},
            ]
        });
        assert_eq!(
            xid_from_links(&resource, CANONICAL_REL),
            Some("C2".to_string())
        );
    }

    #[test]
    fn test_xid_from_links_no_match() {
        assert_eq!(xid_from_links(&json!({"links": []}), CANONICAL_REL), None);
        assert_eq!(xid_from_links(&json!({}), CANONICAL_REL), None);
        assert_eq!(xid_from_links(&JsonValue::Null, CANONICAL_REL), None);
    }

    #[test]
    fn test_decode_dash_separator_wins() {
        assert_eq!(
            decode_status_value("BTF_RATE_IND", "BTF_RATE_IND.BTF_RATE - REPROCESS"),
            "REPROCESS"
        );
    }

    #[test]
    fn test_decode_type_prefix_strip() {
        assert_eq!(
            decode_status_value("KFNA.BTF_SHIP_IND", "KFNA.BTF_SHIP_IND_NEW"),
            "NEW"
        );
        // Case-insensitive prefix match.
        assert_eq!(
            decode_status_value("KFNA.BTF_SHIP_IND", "KFNA.btf_ship_ind_OLD"),
            "OLD"
        );
    }

    #[test]
    fn test_decode_suffix_after_type() {
        // No qualifier prefix and no " - " separator.
        assert_eq!(
            decode_status_value("SEND_SHIPMENT_USB", "SEND_SHIPMENT_USB_R"),
            "R"
        );
        // Value unrelated to the type: last underscore segment wins.
        assert_eq!(decode_status_value("SENT_TO_USB", "SOMETHING_ELSE_YES"), "YES");
    }

    #[test]
    fn test_decode_plain_value_unchanged() {
        assert_eq!(decode_status_value("BTF_SHIP_IND", "KFNA.DONE "), "DONE");
    }

    #[test]
    fn test_normalize_statuses_allow_list_and_timestamps() {
        let raw = json!({
            "items": [
                {
                    "statusTypeGid": "KFNA.BTF_RATE_IND",
                    "statusValueGid": "KFNA.BTF_RATE_IND.BTF_RATE - REPROCESS",
                    "insertDate": {"value": "2026-01-02T08:00:00Z"},
                    "updateDate": {"value": "2026-01-03T09:30:00Z"},
                },
                {
                    "statusTypeGid": "KFNA.SEND_SHIPMENT_USB",
                    "statusValueGid": "KFNA.SEND_SHIPMENT_USB_R",
                    "insertDate": {"value": "2026-01-01T00:00:00Z"},
                },
                {
                    "statusTypeGid": "KFNA.SOME_OTHER_STATUS",
                    "statusValueGid": "KFNA.SOME_OTHER_STATUS_X",
                },
            ]
        });

        let statuses = normalize_statuses(&raw);
        assert_eq!(statuses.len(), 2);
        assert!(!statuses.contains_key("SOME_OTHER_STATUS"));

        let rate = &statuses["BTF_RATE_IND"];
        assert_eq!(rate.value, "REPROCESS");
        assert_eq!(rate.update_date.as_deref(), Some("2026-01-03T09:30:00Z"));

        let usb = &statuses["SEND_SHIPMENT_USB"];
        assert_eq!(usb.value, "R");
        assert_eq!(usb.update_date.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[test]
    fn test_data_source_refnum_first_match_wins() {
        let raw = json!({
            "items": [
                {"shipmentRefnumQualGid": "KFNA.BM", "shipmentRefnumValue": "BM123"},
                {"shipmentRefnumQualGid": "KFNA.DATA_SOURCE", "shipmentRefnumValue": "EDI_204"},
                {"shipmentRefnumQualGid": "DATA_SOURCE", "shipmentRefnumValue": "LATER"},
            ]
        });
        assert_eq!(data_source_refnum(&raw), Some("EDI_204".to_string()));
        assert_eq!(data_source_refnum(&json!({})), None);
    }

    fn sample_item() -> JsonValue {
        json!({
            "shipmentXid": "00123456",
            "shipmentName": "CHI-ATL 04/12",
            "transportModeGid": "TL",
            "servprov": {
                "links": [{"rel": "canonical", "href": "https://otm/servprovs/KFNA.CARRIER123"}]
            },
            "sourceLocation": {
                "links": [{"rel": "canonical", "href": "https://otm/locations/KFNA.DC_CHI"}]
            },
            "destLocation": {
                "links": [{"rel": "canonical", "href": "https://otm/locations/KFNA.DC_ATL"}]
            },
            "startTime": {"value": "2026-04-12T06:00:00Z"},
            "endTime": {"value": "2026-04-14T18:00:00Z"},
            "totalWeight": {"value": 40500.0, "unit": "LB"},
            "totalVolume": {"value": 2100.0, "unit": "CUFT"},
            "totalActualCost": {"value": 1875.25, "currency": "USD"},
            "attribute10": "FP-AUDIT",
            "statuses": {
                "items": [{
                    "statusTypeGid": "KFNA.SEND_SHIPMENT_USB",
                    "statusValueGid": "KFNA.SEND_SHIPMENT_USB_S",
                    "updateDate": {"value": "2026-04-13T12:00:00Z"},
                }]
            },
            "refnums": {
                "items": [{
                    "shipmentRefnumQualGid": "KFNA.DATA_SOURCE",
                    "shipmentRefnumValue": "EDI_204",
                }]
            },
        })
    }

    #[test]
    fn test_normalize_shipment_full_item() {
        let record = normalize_shipment(&sample_item());

        assert_eq!(record.shipment_xid.as_deref(), Some("00123456"));
        assert_eq!(record.carrier.as_deref(), Some("CARRIER123"));
        assert_eq!(record.source_location.as_deref(), Some("DC_CHI"));
        assert_eq!(record.dest_location.as_deref(), Some("DC_ATL"));
        assert_eq!(record.total_weight, Some(json!(40500.0)));
        assert_eq!(record.weight_unit.as_deref(), Some("LB"));
        assert_eq!(record.currency.as_deref(), Some("USD"));
        assert_eq!(record.data_source.as_deref(), Some("EDI_204"));
        assert_eq!(record.attribute10.as_deref(), Some("FP-AUDIT"));
        // No shipmentAsWork flag, but SEND_SHIPMENT_USB is present.
        assert!(record.shipment_as_work);
        assert_eq!(record.statuses["SEND_SHIPMENT_USB"].value, "S");
    }

    #[test]
    fn test_normalize_shipment_is_idempotent() {
        let raw = sample_item();
        assert_eq!(normalize_shipment(&raw), normalize_shipment(&raw));
    }

    #[test]
    fn test_normalize_shipment_total_over_empty_item() {
        let record = normalize_shipment(&json!({}));
        assert_eq!(record.shipment_xid, None);
        assert_eq!(record.carrier, None);
        assert_eq!(record.total_weight, None);
        assert!(!record.shipment_as_work);
        assert!(record.statuses.is_empty());
        assert_eq!(record.data_source, None);
    }

    #[test]
    fn test_normalize_shipment_work_flag_from_upstream() {
        let record = normalize_shipment(&json!({"shipmentAsWork": true}));
        assert!(record.shipment_as_work);
    }

    #[test]
    fn test_truncate_chars_is_codepoint_safe() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("ab", 4), "ab");
        assert_eq!(truncate_chars("é1é2é3", 3), "é1é");
    }
}
