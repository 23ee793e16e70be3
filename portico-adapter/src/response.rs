//! Normalized gateway response

use crate::{
    classifier::{GatewayErrorKind, IssuerErrorKind},
    types::{ProtocolFamily, TransactionType},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Why a response is unsuccessful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Failure {
    /// Non-zero gateway code
    Gateway(GatewayErrorKind),
    /// Issuer declined or errored
    Issuer(IssuerErrorKind),
    /// ACH-specific decline
    CheckDeclined,
    /// SOAP fault (HTTP 500)
    SoapFault,
    /// PayPlan rejected the request
    Rejected,
    /// HTTP status outside the handled set
    UnexpectedResponse,
}

/// One ACH rejection detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRejection {
    /// Detail type
    pub kind: Option<String>,
    /// Detail code
    pub code: Option<String>,
    /// Detail message
    pub message: Option<String>,
    /// Field the detail refers to
    pub field_name: Option<String>,
}

/// Normalized response
///
/// Built by the protocol parsers, annotated by the classifier during the same
/// pass and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub(crate) protocol: ProtocolFamily,
    pub(crate) transaction_type: TransactionType,
    pub(crate) status: u16,
    pub(crate) body: String,
    pub(crate) successful: bool,
    pub(crate) code: String,
    pub(crate) message: Option<String>,
    pub(crate) transaction_reference: Option<String>,
    pub(crate) reversal_required: bool,
    pub(crate) failure: Option<Failure>,
    pub(crate) data: Map<String, Value>,
    pub(crate) check_rejections: Vec<CheckRejection>,
}

impl Response {
    pub(crate) fn new(
        protocol: ProtocolFamily,
        transaction_type: TransactionType,
        status: u16,
        body: String,
    ) -> Self {
        Self {
            protocol,
            transaction_type,
            status,
            body,
            successful: false,
            code: status.to_string(),
            message: None,
            transaction_reference: None,
            reversal_required: false,
            failure: None,
            data: Map::new(),
            check_rejections: Vec::new(),
        }
    }

    /// Mark as failed with a classified reason
    pub(crate) fn fail(&mut self, failure: Failure, code: impl Into<String>, message: impl Into<String>) {
        self.successful = false;
        self.failure = Some(failure);
        self.code = code.into();
        self.message = Some(message.into());
    }

    /// Whether the transaction was approved / the resource call succeeded
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Human-readable message
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// HTTP status on success; the classified reason code otherwise
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Processor-assigned reference
    pub fn transaction_reference(&self) -> Option<&str> {
        self.transaction_reference.as_deref()
    }

    /// Flattened processor fields
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// String field from [`Response::data`]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// ACH rejection details
    pub fn check_rejections(&self) -> &[CheckRejection] {
        &self.check_rejections
    }

    /// Purchase-card indicator returned on card sales
    pub fn purchase_card_indicator(&self) -> Option<&str> {
        self.field("CPCInd")
    }

    /// Multi-use token when one was requested
    pub fn token(&self) -> Option<&str> {
        self.field("TokenValue")
    }

    /// Issuer authorization code
    pub fn auth_code(&self) -> Option<&str> {
        self.field("AuthCode")
    }

    /// HTTP status
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the outcome is ambiguous and the charge must be reversed
    pub fn reversal_required(&self) -> bool {
        self.reversal_required
    }

    /// Classified failure, if any
    pub fn failure(&self) -> Option<Failure> {
        self.failure
    }

    /// Protocol family
    pub fn protocol(&self) -> ProtocolFamily {
        self.protocol
    }

    /// Transaction type this responds to
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }
}
