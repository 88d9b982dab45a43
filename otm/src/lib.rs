//! Client library for investigating FreightPay shipments in an OTM-style
//! transportation ERP: parallel saved-query dispatch, record normalization,
//! cross-query deduplication, and status-transition triggers.

pub mod client;
pub mod config;
pub mod errors;
pub mod normalize;
pub mod protocol;
pub mod trigger;

pub use client::OtmClient;
pub use config::{OtmConfig, SearchKind};
pub use errors::OtmError;
pub use trigger::TriggerKind;
