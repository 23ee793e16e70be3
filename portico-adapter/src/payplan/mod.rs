//! PayPlan REST/JSON protocol
//!
//! Recurring-billing resources: customers, payment methods and schedules.
//! Each operation implements [`RestOperation`]; [`request`] turns it into an
//! HTTP request and [`response`] parses the JSON reply.

pub mod customers;
pub mod payment_methods;
pub mod request;
pub mod response;
pub mod schedules;

use crate::{
    types::{HttpMethod, TransactionType},
    Result,
};
use serde::Serialize;
use serde_json::{Map, Value};

pub use customers::{
    AddCustomer, CustomerParams, CustomerSearch, CustomerStatus, DeleteCustomer, EditCustomer,
    GetCustomer, SearchCustomers,
};
pub use payment_methods::{
    AddAchPaymentMethod, AddCardPaymentMethod, DeletePaymentMethod, EditPaymentMethod,
    GetPaymentMethod, PaymentMethodSearch, PaymentMethodUpdate, PaymentStatus,
    SearchPaymentMethods,
};
pub use schedules::{
    AddSchedule, DeleteSchedule, EditSchedule, Frequency, GetSchedule, ScheduleDuration,
    ScheduleParams, ScheduleSearch, ScheduleStatus, ScheduleUpdate, SearchSchedules,
};

/// Pagination for search operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Maximum results
    pub limit: Option<u32>,
    /// Results to skip
    pub offset: Option<u32>,
}

impl Page {
    /// Page of `limit` results starting at `offset`
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// A PayPlan operation
pub trait RestOperation: Send + Sync {
    /// Transaction-type tag
    fn transaction_type(&self) -> TransactionType;

    /// HTTP verb
    fn method(&self) -> HttpMethod;

    /// Path relative to the PayPlan base URL
    fn path(&self) -> String;

    /// Business fields this operation may send
    fn allowed_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Candidate body fields; filtered against [`RestOperation::allowed_fields`]
    fn fields(&self) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    /// Pagination, for search operations
    fn page(&self) -> Page {
        Page::default()
    }

    /// Response field holding the resource key
    fn reference_key(&self) -> Option<&'static str> {
        None
    }
}

/// Serialize a typed parameter struct into a field map
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Percent-encode a resource key for use as a path segment
pub(crate) fn segment(key: &str) -> String {
    urlencoding::encode(key.trim()).into_owned()
}

/// Reject an empty resource key
pub(crate) fn required_key(name: &str, key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(crate::Error::Validation(format!(
            "The {} parameter is required",
            name
        )));
    }
    Ok(key.to_string())
}
