//! End-to-end gateway tests against a local stub server

use portico_adapter::{
    card::{CreditCard, PaymentSource},
    payplan::{AddCustomer, CustomerParams, CustomerSearch, DeleteCustomer, GetCustomer, SearchCustomers},
    portico::{ChargeParams, CreditAddToBatch, CreditAuth},
    Error, Gateway, GatewayConfig, ReqwestTransport,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOAP_PATH: &str = "/Hps.Exchange.PosGateway/PosGatewayService.asmx";
const REST_PATH: &str = "/payplan.v2";

fn legacy_config(service_uri: String) -> GatewayConfig {
    GatewayConfig {
        site_id: Some("12345".to_string()),
        device_id: Some("123456".to_string()),
        license_id: Some("12".to_string()),
        username: Some("gateway1213846".to_string()),
        password: Some("$Test1234".to_string()),
        service_uri: Some(service_uri),
        ..GatewayConfig::default()
    }
}

fn gateway(config: GatewayConfig, timeout: Duration) -> Gateway {
    let transport = ReqwestTransport::builder()
        .timeout(timeout)
        .allow_plaintext(true)
        .build()
        .unwrap();
    Gateway::new(config, Arc::new(transport))
}

fn soap_gateway(server: &MockServer) -> Gateway {
    gateway(
        legacy_config(format!("{}{}", server.uri(), SOAP_PATH)),
        Duration::from_secs(5),
    )
}

fn rest_gateway(server: &MockServer) -> Gateway {
    gateway(
        legacy_config(format!("{}{}/", server.uri(), REST_PATH)),
        Duration::from_secs(5),
    )
}

fn soap_reply(gateway_code: &str, transaction_type: &str, issuer_code: &str, text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <PosResponse rootUrl="https://cert.api2.heartlandportico.com/Hps.Exchange.PosGateway" xmlns="http://Hps.Exchange.PosGateway">
      <Ver1.0>
        <Header>
          <LicenseId>12</LicenseId>
          <SiteId>12345</SiteId>
          <DeviceId>123456</DeviceId>
          <GatewayTxnId>1034541234</GatewayTxnId>
          <GatewayRspCode>{gateway_code}</GatewayRspCode>
          <GatewayRspMsg>{text}</GatewayRspMsg>
        </Header>
        <Transaction>
          <{transaction_type}>
            <RspCode>{issuer_code}</RspCode>
            <RspText>{text}</RspText>
            <AuthCode>09315A</AuthCode>
          </{transaction_type}>
        </Transaction>
      </Ver1.0>
    </PosResponse>
  </soap:Body>
</soap:Envelope>"#
    )
}

fn test_card() -> PaymentSource {
    PaymentSource::Card(CreditCard::new("4012002000060016", 12, 2099).with_cvv("123"))
}

fn authorize(amount: &str) -> CreditAuth {
    CreditAuth::new(ChargeParams::new(amount, "usd", test_card()).unwrap())
}

#[tokio::test]
async fn test_authorize_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SOAP_PATH))
        .and(header("Content-Type", "text/xml; charset=UTF-8"))
        .and(body_string_contains("<hps:CreditAuth>"))
        .and(body_string_contains("<hps:Amt>42.42</hps:Amt>"))
        .and(body_string_contains("<hps:SiteId>12345</hps:SiteId>"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(soap_reply("0", "CreditAuth", "00", "APPROVAL")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = soap_gateway(&server).send(&authorize("42.42")).await.unwrap();

    assert!(response.is_successful());
    assert_eq!(response.code(), "200");
    assert_eq!(response.transaction_reference(), Some("1034541234"));
    assert_eq!(response.auth_code(), Some("09315A"));
    assert_eq!(response.message(), Some("APPROVAL"));
}

#[tokio::test]
async fn test_invalid_card_data_is_a_decline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SOAP_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(soap_reply("27", "CreditAuth", "", "Invalid Card")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = soap_gateway(&server).send(&authorize("10.00")).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.code(), "27");
    assert_eq!(response.message(), Some("Invalid card data"));
    assert!(!response.reversal_required());
}

#[tokio::test]
async fn test_capture_of_unknown_transaction_echoes_processor_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<hps:CreditAddToBatch>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(soap_reply(
            "3",
            "CreditAddToBatch",
            "",
            "Transaction rejected because the referenced original transaction is invalid.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let capture = CreditAddToBatch::new("1034541234", Some("10.00")).unwrap();
    let response = soap_gateway(&server).send(&capture).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(
        response.message(),
        Some("Transaction rejected because the referenced original transaction is invalid.")
    );
}

#[tokio::test]
async fn test_soap_fault_is_a_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><soap:Fault><faultcode>soap:Client</faultcode><faultstring>Server was unable to read request.</faultstring></soap:Fault></soap:Body></soap:Envelope>"#,
        ))
        .mount(&server)
        .await;

    let response = soap_gateway(&server).send(&authorize("10.00")).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.code(), "500");
    assert_eq!(response.message(), Some("Server was unable to read request."));
}

#[tokio::test]
async fn test_missing_password_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = legacy_config(format!("{}{}", server.uri(), SOAP_PATH));
    config.password = None;
    let err = gateway(config, Duration::from_secs(5))
        .send(&authorize("10.00"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(ref m) if m == "The password parameter is required"));
}

#[tokio::test]
async fn test_transport_timeout_sends_one_reversal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<hps:CreditAuth>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(soap_reply("0", "CreditAuth", "00", "APPROVAL"))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<hps:CreditReversal>"))
        .and(body_string_contains("<hps:ClientTxnId>88001</hps:ClientTxnId>"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(soap_reply("0", "CreditReversal", "00", "APPROVAL")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = ChargeParams::new("10.00", "usd", test_card())
        .unwrap()
        .with_client_transaction_id("88001");
    let err = gateway(
        legacy_config(format!("{}{}", server.uri(), SOAP_PATH)),
        Duration::from_millis(500),
    )
    .send(&CreditAuth::new(params))
    .await
    .unwrap_err();

    match err {
        Error::GatewayTimeout {
            transaction_reference,
            reversal_attempted,
        } => {
            assert_eq!(transaction_reference.as_deref(), Some("88001"));
            assert!(reversal_attempted);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_issuer_timeout_reversal_is_not_repeated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<hps:CreditAuth>"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(soap_reply("0", "CreditAuth", "91", "Issuer timeout")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<hps:CreditReversal>"))
        .and(body_string_contains("<hps:GatewayTxnId>1034541234</hps:GatewayTxnId>"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(soap_reply("30", "CreditReversal", "", "Timeout")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = soap_gateway(&server).send(&authorize("10.00")).await.unwrap_err();

    assert!(err.is_gateway_timeout());
    assert_eq!(err.to_string(), "Gateway timed out");
}

#[tokio::test]
async fn test_add_customer_posts_allowed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/customers", REST_PATH)))
        .and(header("Content-Type", "application/json; charset=UTF-8"))
        .and(header_exists("Authorization"))
        .and(body_string_contains(r#""customerIdentifier":"cust-1""#))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_string(r#"{"customerKey": 77, "customerIdentifier": "cust-1"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let params = CustomerParams {
        customer_identifier: Some("cust-1".to_string()),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
        country: Some("USA".to_string()),
        ..CustomerParams::default()
    };
    let response = rest_gateway(&server)
        .send_rest(&AddCustomer::new(params).unwrap())
        .await
        .unwrap();

    assert!(response.is_successful());
    assert_eq!(response.code(), "201");
    assert_eq!(response.transaction_reference(), Some("77"));
    assert_eq!(response.field("customerIdentifier"), Some("cust-1"));

    let requests = server.received_requests().await.unwrap();
    let identity = requests[0].headers.get("HPS-Identity").unwrap();
    assert_eq!(
        identity.to_str().unwrap(),
        "SiteID=12345,DeviceID=123456,LicenseID=12"
    );
}

#[tokio::test]
async fn test_delete_without_fields_sends_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/customers/77", REST_PATH)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = rest_gateway(&server)
        .send_rest(&DeleteCustomer::new("77").unwrap())
        .await
        .unwrap();
    assert!(response.is_successful());
    assert!(response.data().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, b"{}".to_vec());
}

#[tokio::test]
async fn test_get_sends_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/customers/77", REST_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"customerKey": "77"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let response = rest_gateway(&server)
        .send_rest(&GetCustomer::new("77").unwrap())
        .await
        .unwrap();
    assert_eq!(response.transaction_reference(), Some("77"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_rest_rejection_is_returned_as_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/searchCustomers", REST_PATH)))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error": {"code": "40001", "message": "Invalid search criteria"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let search = SearchCustomers::new(CustomerSearch {
        last_name: Some("Doe".to_string()),
        ..CustomerSearch::default()
    })
    .with_page(10, 0);
    let response = rest_gateway(&server).send_rest(&search).await.unwrap();

    assert!(!response.is_successful());
    assert_eq!(response.code(), "40001");
    assert_eq!(response.message(), Some("Invalid search criteria"));
    assert_eq!(response.status(), 400);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("limit=10&offset=0"));
}
