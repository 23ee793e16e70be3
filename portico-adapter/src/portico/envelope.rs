//! SOAP envelope builder
//!
//! `soapenv:Envelope > soapenv:Body > hps:PosRequest > hps:Ver1.0 >
//! (hps:Header, hps:<TransactionType>)`

use super::{hps, hps_text};
use crate::{
    config::{Credentials, GatewayConfig},
    transport::HttpRequest,
    types::HttpMethod,
    xml::Element,
    Result,
};

/// SOAP 1.1 envelope namespace
pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Portico namespace
pub const HPS_NS: &str = "http://Hps.Exchange.PosGateway";

/// Request content type
pub const CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

/// Serialized SOAP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapEnvelope {
    /// XML document
    pub body: String,
}

impl SoapEnvelope {
    /// POST request carrying this envelope
    pub fn into_request(self, url: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Post,
            url,
            vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("SOAPAction".to_string(), "\"\"".to_string()),
            ],
            Some(self.body),
        )
    }
}

/// `hps:Header` for the active credential mode
pub fn header(
    config: &GatewayConfig,
    credentials: &Credentials,
    client_transaction_id: Option<&str>,
) -> Element {
    let mut header = Element::new(hps("Header"));

    header = match credentials {
        Credentials::SecretKey(key) => header.child(hps_text("SecretAPIKey", key.as_str())),
        Credentials::Legacy {
            site_id,
            device_id,
            license_id,
            username,
            password,
            ..
        } => header
            .child(hps_text("SiteId", site_id.as_str()))
            .child(hps_text("DeviceId", device_id.as_str()))
            .child(hps_text("LicenseId", license_id.as_str()))
            .child(hps_text("UserName", username.as_str()))
            .child(hps_text("Password", password.as_str())),
    };

    if let Some(developer_id) = config.developer_id.as_deref().filter(|d| !d.is_empty()) {
        header = header
            .child(hps_text("DeveloperID", developer_id))
            .opt_text(&hps("VersionNbr"), config.version_number.as_deref())
            .opt_text(&hps("SiteTrace"), config.site_trace.as_deref());
    }

    header.opt_text(
        &hps("ClientTxnId"),
        client_transaction_id.filter(|id| !id.is_empty()),
    )
}

/// Wrap a transaction fragment in the full envelope
pub fn build(
    config: &GatewayConfig,
    credentials: &Credentials,
    transaction: Element,
    client_transaction_id: Option<&str>,
) -> Result<SoapEnvelope> {
    let version = Element::new(hps("Ver1.0"))
        .child(header(config, credentials, client_transaction_id))
        .child(transaction);

    let envelope = Element::new("soapenv:Envelope")
        .attr("xmlns:soapenv", SOAP_ENV_NS)
        .attr("xmlns:hps", HPS_NS)
        .child(Element::new("soapenv:Body").child(Element::new(hps("PosRequest")).child(version)));

    Ok(SoapEnvelope {
        body: envelope.to_document()?,
    })
}
