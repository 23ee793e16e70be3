//! Shared types for the adapter

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Wire protocol family an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolFamily {
    /// Portico SOAP/XML (card and ACH transactions)
    Portico,
    /// PayPlan REST/JSON (recurring billing resources)
    PayPlan,
}

impl std::fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolFamily::Portico => write!(f, "Portico"),
            ProtocolFamily::PayPlan => write!(f, "PayPlan"),
        }
    }
}

/// Transaction type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Authorize only
    CreditAuth,
    /// Authorize and capture (purchase)
    CreditSale,
    /// Capture a prior authorization
    CreditAddToBatch,
    /// Refund
    CreditReturn,
    /// Void
    CreditVoid,
    /// Reverse an authorization or sale
    CreditReversal,
    /// Zero-amount verification
    CreditAccountVerify,
    /// ACH debit
    CheckSale,
    /// ACH void
    CheckVoid,
    /// Create recurring customer
    PayPlanCustomerAdd,
    /// Update recurring customer
    PayPlanCustomerEdit,
    /// Delete recurring customer
    PayPlanCustomerDelete,
    /// Fetch recurring customer
    PayPlanCustomerGet,
    /// Search recurring customers
    PayPlanCustomerSearch,
    /// Create stored payment method
    PayPlanPaymentMethodAdd,
    /// Update stored payment method
    PayPlanPaymentMethodEdit,
    /// Delete stored payment method
    PayPlanPaymentMethodDelete,
    /// Fetch stored payment method
    PayPlanPaymentMethodGet,
    /// Search stored payment methods
    PayPlanPaymentMethodSearch,
    /// Create schedule
    PayPlanScheduleAdd,
    /// Update schedule
    PayPlanScheduleEdit,
    /// Delete schedule
    PayPlanScheduleDelete,
    /// Fetch schedule
    PayPlanScheduleGet,
    /// Search schedules
    PayPlanScheduleSearch,
}

impl TransactionType {
    /// Wire tag (element name for Portico, label for PayPlan)
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CreditAuth => "CreditAuth",
            TransactionType::CreditSale => "CreditSale",
            TransactionType::CreditAddToBatch => "CreditAddToBatch",
            TransactionType::CreditReturn => "CreditReturn",
            TransactionType::CreditVoid => "CreditVoid",
            TransactionType::CreditReversal => "CreditReversal",
            TransactionType::CreditAccountVerify => "CreditAccountVerify",
            TransactionType::CheckSale => "CheckSale",
            TransactionType::CheckVoid => "CheckVoid",
            TransactionType::PayPlanCustomerAdd => "PayPlanCustomerAdd",
            TransactionType::PayPlanCustomerEdit => "PayPlanCustomerEdit",
            TransactionType::PayPlanCustomerDelete => "PayPlanCustomerDelete",
            TransactionType::PayPlanCustomerGet => "PayPlanCustomerGet",
            TransactionType::PayPlanCustomerSearch => "PayPlanCustomerSearch",
            TransactionType::PayPlanPaymentMethodAdd => "PayPlanPaymentMethodAdd",
            TransactionType::PayPlanPaymentMethodEdit => "PayPlanPaymentMethodEdit",
            TransactionType::PayPlanPaymentMethodDelete => "PayPlanPaymentMethodDelete",
            TransactionType::PayPlanPaymentMethodGet => "PayPlanPaymentMethodGet",
            TransactionType::PayPlanPaymentMethodSearch => "PayPlanPaymentMethodSearch",
            TransactionType::PayPlanScheduleAdd => "PayPlanScheduleAdd",
            TransactionType::PayPlanScheduleEdit => "PayPlanScheduleEdit",
            TransactionType::PayPlanScheduleDelete => "PayPlanScheduleDelete",
            TransactionType::PayPlanScheduleGet => "PayPlanScheduleGet",
            TransactionType::PayPlanScheduleSearch => "PayPlanScheduleSearch",
        }
    }

    /// Protocol family this transaction travels over
    pub fn protocol(&self) -> ProtocolFamily {
        if self.as_str().starts_with("PayPlan") {
            ProtocolFamily::PayPlan
        } else {
            ProtocolFamily::Portico
        }
    }

    /// Only authorizations and sales are subject to automatic reversal.
    /// `CreditReversal` is never in this set, which bounds recovery to one
    /// nested call.
    pub fn is_reversible(&self) -> bool {
        matches!(self, TransactionType::CreditAuth | TransactionType::CreditSale)
    }

    /// ACH transactions carry check-specific rejection details
    pub fn is_check(&self) -> bool {
        matches!(self, TransactionType::CheckSale | TransactionType::CheckVoid)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verb supported by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// GET (never carries a body)
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case verb
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(Error::InvalidRequest(format!(
                "Invalid HTTP method '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend environment selected from the secret key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// Certification sandbox
    Certification,
    /// User acceptance test
    UserAcceptance,
    /// Production
    Production,
    /// Explicitly configured service URI (legacy credentials)
    Custom,
}

impl Environment {
    /// Cert and UAT run in test mode
    pub fn is_test(&self) -> bool {
        matches!(self, Environment::Certification | Environment::UserAcceptance)
    }
}
