//! SOAP response parser

use crate::{
    classifier,
    response::{CheckRejection, Failure, Response},
    types::{ProtocolFamily, TransactionType},
    xml::Element,
    Error, Result,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Message for statuses the parser does not handle
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response";

/// Parse a Portico reply into a normalized [`Response`].
///
/// Declines and faults are values; only an unreadable 200 body is an error.
pub fn parse(transaction_type: TransactionType, status: u16, body: String) -> Result<Response> {
    let mut response = Response::new(ProtocolFamily::Portico, transaction_type, status, body);

    match status {
        200 => {
            let root = Element::parse(&response.body)?;
            apply_version(&mut response, &root)?;
        }
        500 => {
            let message = fault_string(&response.body)
                .unwrap_or_else(|| UNEXPECTED_RESPONSE.to_string());
            warn!("{} returned a SOAP fault: {}", transaction_type, message);
            response.fail(Failure::SoapFault, "500", message);
        }
        other => {
            warn!("{} returned unexpected status {}", transaction_type, other);
            response.fail(
                Failure::UnexpectedResponse,
                other.to_string(),
                UNEXPECTED_RESPONSE,
            );
        }
    }

    Ok(response)
}

fn fault_string(body: &str) -> Option<String> {
    Element::parse(body)
        .ok()?
        .descendant("faultstring")?
        .text
        .clone()
}

fn apply_version(response: &mut Response, root: &Element) -> Result<()> {
    let version = root
        .descendant("Ver1.0")
        .ok_or_else(|| Error::Xml("response has no Ver1.0 element".to_string()))?;

    response.data = version
        .flatten()
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let header = version
        .find("Header")
        .ok_or_else(|| Error::Xml("response has no Header element".to_string()))?;

    response.transaction_reference = header.text_at(&["GatewayTxnId"]).map(str::to_string);

    let gateway_code = header
        .text_at(&["GatewayRspCode"])
        .map(str::trim)
        .ok_or_else(|| Error::Xml("response has no GatewayRspCode".to_string()))?;
    let gateway_message = header.text_at(&["GatewayRspMsg"]).unwrap_or_default();

    if let Some(classification) = classifier::classify_gateway(gateway_code, gateway_message) {
        response.reversal_required = classifier::gateway_requires_reversal(gateway_code);
        warn!(
            "{} rejected by gateway: code={} kind={:?}",
            response.transaction_type, gateway_code, classification.kind
        );
        response.fail(
            Failure::Gateway(classification.kind),
            gateway_code,
            classification.message,
        );
        return Ok(());
    }

    let transaction = version.path(&["Transaction", response.transaction_type.as_str()]);

    if response.transaction_type.is_check() {
        apply_check_result(response, transaction);
    } else {
        apply_issuer_result(response, transaction, gateway_message);
    }

    Ok(())
}

fn apply_issuer_result(response: &mut Response, transaction: Option<&Element>, gateway_message: &str) {
    let code = transaction.and_then(|t| t.text_at(&["RspCode"])).map(str::trim);
    let text = transaction.and_then(|t| t.text_at(&["RspText"]));

    let declined = code.and_then(|c| classifier::classify_issuer(c).map(|kind| (c, kind)));
    match declined {
        Some((code, kind)) => {
            response.reversal_required = classifier::issuer_requires_reversal(code);
            let message = match kind {
                classifier::IssuerErrorKind::UnknownIssuerError => {
                    text.unwrap_or(kind.message())
                }
                _ => kind.message(),
            };
            warn!(
                "{} declined by issuer: code={} kind={:?}",
                response.transaction_type, code, kind
            );
            response.fail(Failure::Issuer(kind), code, message);
        }
        None => {
            debug!("{} approved", response.transaction_type);
            response.successful = true;
            response.message = Some(text.unwrap_or(gateway_message).to_string());
        }
    }
}

fn apply_check_result(response: &mut Response, transaction: Option<&Element>) {
    let code = transaction
        .and_then(|t| t.text_at(&["RspCode"]))
        .map(str::trim)
        .unwrap_or("0");
    let message = transaction.and_then(|t| t.text_at(&["RspMessage"]));

    if code == "0" {
        response.successful = true;
        response.message = message.map(str::to_string);
        return;
    }

    response.check_rejections = transaction
        .map(|t| {
            t.find_all("CheckRspInfo")
                .map(|info| CheckRejection {
                    kind: info.text_at(&["Type"]).map(str::to_string),
                    code: info.text_at(&["Code"]).map(str::to_string),
                    message: info.text_at(&["Message"]).map(str::to_string),
                    field_name: info.text_at(&["FieldName"]).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    warn!(
        "{} declined: code={} details={}",
        response.transaction_type,
        code,
        response.check_rejections.len()
    );
    response.fail(
        Failure::CheckDeclined,
        code,
        message.unwrap_or("Transaction declined"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{GatewayErrorKind, IssuerErrorKind};

    fn envelope(header: &str, transaction: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <PosResponse rootUrl="https://example.test" xmlns="http://Hps.Exchange.PosGateway">
      <Ver1.0>
        <Header>{}</Header>
        <Transaction>{}</Transaction>
      </Ver1.0>
    </PosResponse>
  </soap:Body>
</soap:Envelope>"#,
            header, transaction
        )
    }

    fn ok_header() -> &'static str {
        "<LicenseId>1</LicenseId><GatewayTxnId>1001</GatewayTxnId>\
         <GatewayRspCode>0</GatewayRspCode><GatewayRspMsg>Success</GatewayRspMsg>\
         <TokenData><TokenValue>supt_xyz</TokenValue></TokenData>"
    }

    #[test]
    fn test_approved_auth() {
        let body = envelope(
            ok_header(),
            "<CreditAuth><RspCode>00</RspCode><RspText>APPROVAL</RspText>\
             <AuthCode>123456</AuthCode></CreditAuth>",
        );
        let response = parse(TransactionType::CreditAuth, 200, body).unwrap();

        assert!(response.is_successful());
        assert_eq!(response.code(), "200");
        assert_eq!(response.message(), Some("APPROVAL"));
        assert_eq!(response.transaction_reference(), Some("1001"));
        assert_eq!(response.auth_code(), Some("123456"));
        assert_eq!(response.token(), Some("supt_xyz"));
        assert!(!response.reversal_required());
    }

    #[test]
    fn test_gateway_invalid_card_data() {
        let body = envelope(
            "<GatewayTxnId>1002</GatewayTxnId><GatewayRspCode>27</GatewayRspCode>\
             <GatewayRspMsg>Invalid token</GatewayRspMsg>",
            "",
        );
        let response = parse(TransactionType::CreditAuth, 200, body).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.message(), Some("Invalid card data"));
        assert_eq!(response.code(), "27");
        assert_eq!(
            response.failure(),
            Some(Failure::Gateway(GatewayErrorKind::InvalidCardData))
        );
    }

    #[test]
    fn test_gateway_echoes_processor_text() {
        let body = envelope(
            "<GatewayTxnId>1003</GatewayTxnId><GatewayRspCode>3</GatewayRspCode>\
             <GatewayRspMsg>Transaction rejected because the referenced original transaction is invalid.</GatewayRspMsg>",
            "",
        );
        let response = parse(TransactionType::CreditAddToBatch, 200, body).unwrap();
        assert_eq!(
            response.message(),
            Some("Transaction rejected because the referenced original transaction is invalid.")
        );
    }

    #[test]
    fn test_gateway_timeout_flags_reversal() {
        let body = envelope(
            "<GatewayTxnId>1004</GatewayTxnId><GatewayRspCode>30</GatewayRspCode>\
             <GatewayRspMsg>Timeout</GatewayRspMsg>",
            "",
        );
        let response = parse(TransactionType::CreditSale, 200, body).unwrap();
        assert!(response.reversal_required());
        assert_eq!(response.transaction_reference(), Some("1004"));
    }

    #[test]
    fn test_issuer_decline_and_timeout() {
        let body = envelope(
            ok_header(),
            "<CreditSale><RspCode>51</RspCode><RspText>DECLINE</RspText></CreditSale>",
        );
        let response = parse(TransactionType::CreditSale, 200, body).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.code(), "51");
        assert_eq!(response.message(), Some("The card was declined."));
        assert!(!response.reversal_required());

        let body = envelope(
            ok_header(),
            "<CreditSale><RspCode>91</RspCode><RspText>NO REPLY</RspText></CreditSale>",
        );
        let response = parse(TransactionType::CreditSale, 200, body).unwrap();
        assert_eq!(
            response.failure(),
            Some(Failure::Issuer(IssuerErrorKind::IssuerTimeout))
        );
        assert!(response.reversal_required());
    }

    #[test]
    fn test_unknown_issuer_code_echoes_text() {
        let body = envelope(
            ok_header(),
            "<CreditAuth><RspCode>Q1</RspCode><RspText>ODD THING</RspText></CreditAuth>",
        );
        let response = parse(TransactionType::CreditAuth, 200, body).unwrap();
        assert_eq!(response.message(), Some("ODD THING"));
    }

    #[test]
    fn test_void_without_issuer_fields_succeeds() {
        let body = envelope(ok_header(), "<CreditVoid/>");
        let response = parse(TransactionType::CreditVoid, 200, body).unwrap();
        assert!(response.is_successful());
        assert_eq!(response.message(), Some("Success"));
    }

    #[test]
    fn test_flattened_data() {
        let body = envelope(
            ok_header(),
            "<CreditSale><RspCode>00</RspCode><RspText>APPROVAL</RspText>\
             <CPCInd>B</CPCInd></CreditSale>",
        );
        let response = parse(TransactionType::CreditSale, 200, body).unwrap();
        assert_eq!(response.purchase_card_indicator(), Some("B"));
        assert_eq!(response.field("GatewayRspMsg"), Some("Success"));
        assert_eq!(response.field("LicenseId"), Some("1"));
    }

    #[test]
    fn test_check_decline_details() {
        let body = envelope(
            ok_header(),
            "<CheckSale><RspCode>1</RspCode><RspMessage>Transaction declined</RspMessage>\
             <CheckRspInfo><Type>Error</Type><Code>1</Code><Message>Invalid routing</Message>\
             <FieldName>RoutingNumber</FieldName></CheckRspInfo>\
             <CheckRspInfo><Type>Warning</Type><Code>2</Code><Message>Check number</Message></CheckRspInfo>\
             </CheckSale>",
        );
        let response = parse(TransactionType::CheckSale, 200, body).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.failure(), Some(Failure::CheckDeclined));
        assert_eq!(response.message(), Some("Transaction declined"));
        assert_eq!(response.check_rejections().len(), 2);
        assert_eq!(
            response.check_rejections()[0].field_name.as_deref(),
            Some("RoutingNumber")
        );
        assert_eq!(response.check_rejections()[1].kind.as_deref(), Some("Warning"));
    }

    #[test]
    fn test_check_approved() {
        let body = envelope(
            ok_header(),
            "<CheckSale><RspCode>0</RspCode><RspMessage>Transaction Approved</RspMessage></CheckSale>",
        );
        let response = parse(TransactionType::CheckSale, 200, body).unwrap();
        assert!(response.is_successful());
        assert!(response.check_rejections().is_empty());
    }

    #[test]
    fn test_soap_fault() {
        let body = r#"<?xml version="1.0"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Server</faultcode><faultstring>Server was unable to process request.</faultstring></soap:Fault></soap:Body></soap:Envelope>"#;
        let response = parse(TransactionType::CreditAuth, 500, body.to_string()).unwrap();
        assert!(!response.is_successful());
        assert_eq!(response.failure(), Some(Failure::SoapFault));
        assert_eq!(
            response.message(),
            Some("Server was unable to process request.")
        );
    }

    #[test]
    fn test_unexpected_status() {
        let response = parse(TransactionType::CreditAuth, 302, String::new()).unwrap();
        assert_eq!(response.message(), Some(UNEXPECTED_RESPONSE));
        assert_eq!(response.failure(), Some(Failure::UnexpectedResponse));
    }

    #[test]
    fn test_malformed_success_body() {
        assert!(parse(TransactionType::CreditAuth, 200, "<html>".to_string()).is_err());
    }
}
