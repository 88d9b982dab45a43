//! Status-transition triggers posted to the OTM integration servlet.
//!
//! Each trigger is one fixed Transmission XML document with a single
//! substituted field. The shipment identifier goes in verbatim, without
//! XML-entity escaping; the receiving agent expects the raw Xid and escaping
//! would change wire compatibility.

use crate::client::{DISPATCH_TIMEOUT, OtmClient};
use crate::errors::OtmError;
use crate::normalize::truncate_chars;
use crate::protocol::TriggerOutcome;
use http::header::CONTENT_TYPE;
use std::str::FromStr;

/// Characters of the integration response body kept in the outcome.
const RESPONSE_BODY_LIMIT: usize = 500;

/// The three supported state-transition triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
    /// "BTF": flag the shipment for pricing reprocessing.
    ReprocessPricing,
    /// Queue the shipment for USB transmission.
    TransmitUsb,
    /// Send the shipment to PO.
    SendToPo,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerKind::ReprocessPricing => "reprocess-pricing",
            TriggerKind::TransmitUsb => "transmit-usb",
            TriggerKind::SendToPo => "send-to-po",
        }
    }

    fn template(self) -> &'static str {
        match self {
            TriggerKind::ReprocessPricing => REPROCESS_PRICING_XML,
            TriggerKind::TransmitUsb => TRANSMIT_USB_XML,
            TriggerKind::SendToPo => SEND_TO_PO_XML,
        }
    }
}

impl FromStr for TriggerKind {
    type Err = OtmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reprocess-pricing" => Ok(TriggerKind::ReprocessPricing),
            "transmit-usb" => Ok(TriggerKind::TransmitUsb),
            "send-to-po" => Ok(TriggerKind::SendToPo),
            other => Err(OtmError::UnsupportedTrigger(other.to_string())),
        }
    }
}

const REPROCESS_PRICING_XML: &str = r#"<Transmission xmlns="http://xmlns.oracle.com/apps/otm/transmission/v6.4">
  <TransmissionHeader>
    <SenderTransmissionNo>FP_INVESTIGATOR</SenderTransmissionNo>
  </TransmissionHeader>
  <TransmissionBody>
    <GLogXMLElement>
      <ShipmentStatus>
        <ShipmentGid>
          <Gid>
            <DomainName>KRAFT</DomainName>
            <Xid>KFNA.{shipment_xid}</Xid>
          </Gid>
        </ShipmentGid>
        <StatusTypeGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>BTF_RATE_IND</Xid>
          </Gid>
        </StatusTypeGid>
        <StatusValueGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>BTF_RATE_IND_REPROCESS</Xid>
          </Gid>
        </StatusValueGid>
      </ShipmentStatus>
    </GLogXMLElement>
  </TransmissionBody>
</Transmission>"#;

const TRANSMIT_USB_XML: &str = r#"<Transmission xmlns="http://xmlns.oracle.com/apps/otm/transmission/v6.4">
  <TransmissionHeader>
    <SenderTransmissionNo>FP_INVESTIGATOR</SenderTransmissionNo>
  </TransmissionHeader>
  <TransmissionBody>
    <GLogXMLElement>
      <ShipmentStatus>
        <ShipmentGid>
          <Gid>
            <DomainName>KRAFT</DomainName>
            <Xid>KFNA.{shipment_xid}</Xid>
          </Gid>
        </ShipmentGid>
        <StatusTypeGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>SEND_SHIPMENT_USB</Xid>
          </Gid>
        </StatusTypeGid>
        <StatusValueGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>SEND_SHIPMENT_USB_S</Xid>
          </Gid>
        </StatusValueGid>
      </ShipmentStatus>
    </GLogXMLElement>
  </TransmissionBody>
</Transmission>"#;

const SEND_TO_PO_XML: &str = r#"<Transmission xmlns="http://xmlns.oracle.com/apps/otm/transmission/v6.4">
  <TransmissionHeader>
    <SenderTransmissionNo>FP_INVESTIGATOR</SenderTransmissionNo>
  </TransmissionHeader>
  <TransmissionBody>
    <GLogXMLElement>
      <ShipmentStatus>
        <ShipmentGid>
          <Gid>
            <DomainName>KRAFT</DomainName>
            <Xid>KFNA.{shipment_xid}</Xid>
          </Gid>
        </ShipmentGid>
        <StatusTypeGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>SEND_TO_PO</Xid>
          </Gid>
        </StatusTypeGid>
        <StatusValueGid>
          <Gid>
            <DomainName>KRAFT/KFNA</DomainName>
            <Xid>SEND_TO_PO_S</Xid>
          </Gid>
        </StatusValueGid>
      </ShipmentStatus>
    </GLogXMLElement>
  </TransmissionBody>
</Transmission>"#;

/// Builds the Transmission payload for one trigger. The identifier is
/// substituted verbatim.
pub fn build_trigger_xml(kind: TriggerKind, shipment_xid: &str) -> String {
    kind.template().replace("{shipment_xid}", shipment_xid)
}

impl OtmClient {
    fn integration_url(&self) -> String {
        format!(
            "{}/GC3/glog.integration.servlet.WMServlet",
            self.config.base_url
        )
    }

    /// Posts one trigger payload. A single best-effort call: no retry, no
    /// idempotency key; callers are responsible for not double-triggering.
    ///
    /// An HTTP error status is still a delivered outcome; only a
    /// transport-level inability to complete the request is an error.
    pub async fn send_trigger(
        &self,
        kind: TriggerKind,
        shipment_xid: &str,
    ) -> Result<TriggerOutcome, OtmError> {
        let payload = build_trigger_xml(kind, shipment_xid);
        tracing::info!(trigger = kind.as_str(), shipment_xid, "dispatching trigger");

        let response = self
            .http
            .post(self.integration_url())
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(CONTENT_TYPE, "application/xml")
            .timeout(DISPATCH_TIMEOUT)
            .body(payload)
            .send()
            .await
            .map_err(|e| OtmError::TriggerDispatch {
                trigger: kind.as_str(),
                shipment_xid: shipment_xid.to_string(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(TriggerOutcome {
            status: if status.as_u16() < 400 { "ok" } else { "error" },
            http_status: status.as_u16(),
            shipment_xid: shipment_xid.to_string(),
            response: truncate_chars(&body, RESPONSE_BODY_LIMIT),
        })
    }
}
