use crate::config::MAX_BULK_TERMS;
use thiserror::Error;

/// Errors that can occur during OTM client operations.
///
/// Per-query transport and HTTP failures never appear here; they are captured
/// into the error field of the query's result envelope so that one failing
/// query cannot abort its siblings.
#[derive(Error, Debug)]
pub enum OtmError {
    #[error("type must be 'order' or 'shipment', got '{0}'")]
    UnsupportedSearchKind(String),

    #[error("unknown trigger '{0}'")]
    UnsupportedTrigger(String),

    #[error("no search values provided")]
    NoSearchValues,

    #[error("maximum {} values per bulk request", MAX_BULK_TERMS)]
    TooManySearchValues,

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("trigger {trigger} dispatch failed for {shipment_xid}: {detail}")]
    TriggerDispatch {
        trigger: &'static str,
        shipment_xid: String,
        detail: String,
    },
}
