//! OTM endpoint configuration and the fixed saved-query catalogue.

use crate::errors::OtmError;
use std::str::FromStr;

pub const OTM_DOMAIN: &str = "KRAFT";
pub const OTM_SUBDOMAIN: &str = "KFNA";

/// Field projection requested from the saved-query search endpoint.
pub const SEARCH_FIELDS: &str = "shipmentXid,shipmentName,transportModeGid,\
    servprov.servprovXid,sourceLocation.locationXid,destLocation.locationXid,\
    startTime,endTime,totalWeight,totalVolume,totalActualCost,shipmentAsWork,\
    attribute2,attribute10,insertDate,updateDate,statuses,refnums";

/// Child collections inlined into each search result item.
pub const SEARCH_EXPAND: &str = "statuses,refnums";

/// The four FreightPay status types surfaced on normalized records.
/// Status items of any other type are silently dropped.
pub const FP_STATUS_TYPES: [&str; 4] = [
    "BTF_SHIP_IND",
    "BTF_RATE_IND",
    "SEND_SHIPMENT_USB",
    "SENT_TO_USB",
];

/// Refnum qualifier carrying the externally supplied data-source tag.
pub const DATA_SOURCE_QUALIFIER: &str = "DATA_SOURCE";

/// Upper bound on search terms accepted in one bulk request.
pub const MAX_BULK_TERMS: usize = 100;

const ORDER_QUERIES: [&str; 2] = ["KFNA.FP_ORD_DIRECT", "KFNA.FP_ORD_INDIRECT"];
const SHIPMENT_QUERIES: [&str; 2] = ["KFNA.FP_SHP_NAME_DIRECT", "KFNA.FP_SHP_NAME_INDIRECT"];

/// Which pair of saved queries a search fans out to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Order,
    Shipment,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchKind::Order => "order",
            SearchKind::Shipment => "shipment",
        }
    }

    /// Saved queries dispatched for this kind, in dedup-precedence order.
    pub fn query_names(self) -> &'static [&'static str] {
        match self {
            SearchKind::Order => &ORDER_QUERIES,
            SearchKind::Shipment => &SHIPMENT_QUERIES,
        }
    }
}

impl FromStr for SearchKind {
    type Err = OtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(SearchKind::Order),
            "shipment" => Ok(SearchKind::Shipment),
            other => Err(OtmError::UnsupportedSearchKind(other.to_string())),
        }
    }
}

/// Connection settings for the external OTM instance.
#[derive(Clone, Debug)]
pub struct OtmConfig {
    /// Base URL without a trailing slash, e.g. "https://otm.example.com".
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl OtmConfig {
    /// Reads the OTM endpoint from the environment.
    ///
    /// Missing variables are not an error here; an empty base URL or blank
    /// credentials surface as HTTP failures on the first upstream call.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("OTM_BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            username: std::env::var("OTM_USERNAME").unwrap_or_default(),
            password: std::env::var("OTM_PASSWORD").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_kind_parse() {
        assert_eq!("order".parse::<SearchKind>().unwrap(), SearchKind::Order);
        assert_eq!(
            "shipment".parse::<SearchKind>().unwrap(),
            SearchKind::Shipment
        );
        assert!(matches!(
            "invoice".parse::<SearchKind>().unwrap_err(),
            OtmError::UnsupportedSearchKind(v) if v == "invoice"
        ));
    }

    #[test]
    fn test_query_names_order_is_dedup_precedence() {
        assert_eq!(
            SearchKind::Shipment.query_names(),
            &["KFNA.FP_SHP_NAME_DIRECT", "KFNA.FP_SHP_NAME_INDIRECT"]
        );
        assert_eq!(
            SearchKind::Order.query_names(),
            &["KFNA.FP_ORD_DIRECT", "KFNA.FP_ORD_INDIRECT"]
        );
    }

    #[test]
    fn test_search_fields_have_no_whitespace() {
        assert!(!SEARCH_FIELDS.contains(' '));
        assert!(SEARCH_FIELDS.contains("statuses"));
        assert!(SEARCH_FIELDS.contains("refnums"));
    }
}
