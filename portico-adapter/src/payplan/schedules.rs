//! PayPlan recurring schedules

use super::{required_key, segment, to_fields, Page, RestOperation};
use crate::{
    codec,
    types::{HttpMethod, TransactionType},
    Error, Result,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const SCHEDULE_FIELDS: &[&str] = &[
    "customerKey",
    "paymentMethodKey",
    "scheduleIdentifier",
    "subtotalAmount",
    "taxAmount",
    "startDate",
    "frequency",
    "duration",
    "endDate",
    "numberOfPayments",
    "reprocessingCount",
    "scheduleStatus",
    "description",
    "invoiceNbr",
];

const UPDATE_FIELDS: &[&str] = &[
    "paymentMethodKey",
    "subtotalAmount",
    "taxAmount",
    "frequency",
    "duration",
    "endDate",
    "numberOfPayments",
    "reprocessingCount",
    "scheduleStatus",
    "description",
    "invoiceNbr",
];

const SEARCH_FIELDS: &[&str] = &[
    "customerKey",
    "paymentMethodKey",
    "scheduleIdentifier",
    "scheduleStatus",
    "frequency",
];

/// PayPlan date format (`MMDDYYYY`)
const DATE_FORMAT: &str = "%m%d%Y";

/// Billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Every week
    Weekly,
    /// Every two weeks
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    /// Twice a month
    #[serde(rename = "Semi-Monthly")]
    SemiMonthly,
    /// Every month
    Monthly,
    /// Every two months
    #[serde(rename = "Bi-Monthly")]
    BiMonthly,
    /// Every three months
    Quarterly,
    /// Twice a year
    #[serde(rename = "Semi-Annually")]
    SemiAnnually,
    /// Every year
    Annually,
}

/// Schedule status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// Running
    Active,
    /// Paused
    Inactive,
}

/// How long a schedule runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDuration {
    /// Until cancelled
    Ongoing,
    /// Until this date
    EndDate(NaiveDate),
    /// For this many payments
    LimitedNumber(u32),
}

impl ScheduleDuration {
    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleDuration::Ongoing => "Ongoing",
            ScheduleDuration::EndDate(_) => "End Date",
            ScheduleDuration::LimitedNumber(_) => "Limited Number",
        }
    }

    fn validate(&self, start_date: Option<NaiveDate>) -> Result<()> {
        match self {
            ScheduleDuration::EndDate(end) if start_date.is_some_and(|start| *end < start) => Err(
                Error::Validation("The end date must not precede the start date".to_string()),
            ),
            ScheduleDuration::LimitedNumber(0) => Err(Error::Validation(
                "The number of payments must be greater than 0".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn insert_into(&self, fields: &mut Map<String, Value>) {
        fields.insert("duration".to_string(), Value::String(self.as_str().to_string()));
        match self {
            ScheduleDuration::Ongoing => {}
            ScheduleDuration::EndDate(end) => {
                fields.insert(
                    "endDate".to_string(),
                    Value::String(end.format(DATE_FORMAT).to_string()),
                );
            }
            ScheduleDuration::LimitedNumber(count) => {
                fields.insert("numberOfPayments".to_string(), json!(count));
            }
        }
    }
}

/// PayPlan amount object: value in cents plus currency
fn amount_object(amount: &str) -> Result<Value> {
    let normalized = codec::normalize_amount(Some(amount))?;
    let cents: u64 = normalized
        .replace('.', "")
        .parse()
        .map_err(|_| Error::Validation(format!("Invalid amount: {}", amount)))?;
    Ok(json!({ "value": cents, "currency": "USD" }))
}

/// New schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleParams {
    /// Customer being billed
    pub customer_key: String,
    /// Payment method charged
    pub payment_method_key: String,
    /// Merchant-side identifier
    pub schedule_identifier: Option<String>,
    /// Amount per payment, before tax
    pub amount: String,
    /// Tax per payment
    pub tax_amount: Option<String>,
    /// First processing date
    pub start_date: NaiveDate,
    /// Frequency
    pub frequency: Frequency,
    /// Duration
    pub duration: ScheduleDuration,
    /// Retries for a declined payment
    pub reprocessing_count: Option<u32>,
    /// Description
    pub description: Option<String>,
    /// Invoice number
    pub invoice_number: Option<String>,
}

impl ScheduleParams {
    /// Minimal schedule; optional fields start empty
    pub fn new(
        customer_key: &str,
        payment_method_key: &str,
        amount: &str,
        start_date: NaiveDate,
        frequency: Frequency,
        duration: ScheduleDuration,
    ) -> Self {
        Self {
            customer_key: customer_key.to_string(),
            payment_method_key: payment_method_key.to_string(),
            schedule_identifier: None,
            amount: amount.to_string(),
            tax_amount: None,
            start_date,
            frequency,
            duration,
            reprocessing_count: None,
            description: None,
            invoice_number: None,
        }
    }
}

/// Create a schedule
#[derive(Debug, Clone)]
pub struct AddSchedule {
    params: ScheduleParams,
    fields: Map<String, Value>,
}

impl AddSchedule {
    /// Validate `params` and render its body
    pub fn new(params: ScheduleParams) -> Result<Self> {
        let customer_key = required_key("customerKey", &params.customer_key)?;
        let payment_method_key = required_key("paymentMethodKey", &params.payment_method_key)?;
        params.duration.validate(Some(params.start_date))?;

        let mut fields = Map::new();
        fields.insert("customerKey".to_string(), Value::String(customer_key));
        fields.insert("paymentMethodKey".to_string(), Value::String(payment_method_key));
        if let Some(identifier) = &params.schedule_identifier {
            fields.insert("scheduleIdentifier".to_string(), Value::String(identifier.clone()));
        }
        fields.insert("subtotalAmount".to_string(), amount_object(&params.amount)?);
        if let Some(tax) = &params.tax_amount {
            fields.insert("taxAmount".to_string(), amount_object(tax)?);
        }
        fields.insert(
            "startDate".to_string(),
            Value::String(params.start_date.format(DATE_FORMAT).to_string()),
        );
        fields.insert("frequency".to_string(), serde_json::to_value(params.frequency)?);
        params.duration.insert_into(&mut fields);
        if let Some(count) = params.reprocessing_count {
            fields.insert("reprocessingCount".to_string(), json!(count));
        }
        fields.insert(
            "scheduleStatus".to_string(),
            serde_json::to_value(ScheduleStatus::Active)?,
        );
        if let Some(description) = &params.description {
            fields.insert(
                "description".to_string(),
                Value::String(codec::check_cardholder_data(description, None)?),
            );
        }
        if let Some(invoice) = &params.invoice_number {
            fields.insert("invoiceNbr".to_string(), Value::String(invoice.clone()));
        }

        Ok(Self { params, fields })
    }

    /// Validated parameters
    pub fn params(&self) -> &ScheduleParams {
        &self.params
    }
}

impl RestOperation for AddSchedule {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanScheduleAdd
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "schedules".to_string()
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        SCHEDULE_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        Ok(self.fields.clone())
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("scheduleKey")
    }
}

/// Changes to an existing schedule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleUpdate {
    /// Switch to another payment method
    pub payment_method_key: Option<String>,
    /// New amount per payment
    pub amount: Option<String>,
    /// New tax per payment
    pub tax_amount: Option<String>,
    /// New frequency
    pub frequency: Option<Frequency>,
    /// New duration
    pub duration: Option<ScheduleDuration>,
    /// New retry count
    pub reprocessing_count: Option<u32>,
    /// Pause or resume
    pub status: Option<ScheduleStatus>,
    /// New description
    pub description: Option<String>,
    /// New invoice number
    pub invoice_number: Option<String>,
}

/// Update a schedule
#[derive(Debug, Clone)]
pub struct EditSchedule {
    schedule_key: String,
    fields: Map<String, Value>,
}

impl EditSchedule {
    /// Apply `update` to `schedule_key`
    pub fn new(schedule_key: &str, update: ScheduleUpdate) -> Result<Self> {
        let schedule_key = required_key("scheduleKey", schedule_key)?;

        let mut fields = Map::new();
        if let Some(key) = &update.payment_method_key {
            fields.insert(
                "paymentMethodKey".to_string(),
                Value::String(required_key("paymentMethodKey", key)?),
            );
        }
        if let Some(amount) = &update.amount {
            fields.insert("subtotalAmount".to_string(), amount_object(amount)?);
        }
        if let Some(tax) = &update.tax_amount {
            fields.insert("taxAmount".to_string(), amount_object(tax)?);
        }
        if let Some(frequency) = update.frequency {
            fields.insert("frequency".to_string(), serde_json::to_value(frequency)?);
        }
        if let Some(duration) = update.duration {
            duration.validate(None)?;
            duration.insert_into(&mut fields);
        }
        if let Some(count) = update.reprocessing_count {
            fields.insert("reprocessingCount".to_string(), json!(count));
        }
        if let Some(status) = update.status {
            fields.insert("scheduleStatus".to_string(), serde_json::to_value(status)?);
        }
        if let Some(description) = &update.description {
            fields.insert(
                "description".to_string(),
                Value::String(codec::check_cardholder_data(description, None)?),
            );
        }
        if let Some(invoice) = &update.invoice_number {
            fields.insert("invoiceNbr".to_string(), Value::String(invoice.clone()));
        }

        Ok(Self {
            schedule_key,
            fields,
        })
    }
}

impl RestOperation for EditSchedule {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanScheduleEdit
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("schedules/{}", segment(&self.schedule_key))
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        UPDATE_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        Ok(self.fields.clone())
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("scheduleKey")
    }
}

/// Delete a schedule
#[derive(Debug, Clone)]
pub struct DeleteSchedule {
    schedule_key: String,
    force_delete: bool,
}

impl DeleteSchedule {
    /// Delete `schedule_key`
    pub fn new(schedule_key: &str) -> Result<Self> {
        Ok(Self {
            schedule_key: required_key("scheduleKey", schedule_key)?,
            force_delete: false,
        })
    }

    /// Delete even when payments were already processed
    pub fn force(mut self) -> Self {
        self.force_delete = true;
        self
    }
}

impl RestOperation for DeleteSchedule {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanScheduleDelete
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self) -> String {
        format!("schedules/{}", segment(&self.schedule_key))
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        &["forceDelete"]
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        let mut fields = Map::new();
        if self.force_delete {
            fields.insert("forceDelete".to_string(), Value::Bool(true));
        }
        Ok(fields)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("scheduleKey")
    }
}

/// Fetch a schedule
#[derive(Debug, Clone)]
pub struct GetSchedule {
    schedule_key: String,
}

impl GetSchedule {
    /// Fetch `schedule_key`
    pub fn new(schedule_key: &str) -> Result<Self> {
        Ok(Self {
            schedule_key: required_key("scheduleKey", schedule_key)?,
        })
    }
}

impl RestOperation for GetSchedule {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanScheduleGet
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("schedules/{}", segment(&self.schedule_key))
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("scheduleKey")
    }
}

/// Schedule search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSearch {
    /// Customer key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    /// Payment method key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_key: Option<String>,
    /// Merchant-side identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_identifier: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_status: Option<ScheduleStatus>,
    /// Frequency
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

/// Search schedules
#[derive(Debug, Clone)]
pub struct SearchSchedules {
    criteria: ScheduleSearch,
    page: Page,
}

impl SearchSchedules {
    /// Search by `criteria`
    pub fn new(criteria: ScheduleSearch) -> Self {
        Self {
            criteria,
            page: Page::default(),
        }
    }

    /// Paginate results
    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.page = Page::new(limit, offset);
        self
    }
}

impl RestOperation for SearchSchedules {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanScheduleSearch
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "searchSchedules".to_string()
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        SEARCH_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        to_fields(&self.criteria)
    }

    fn page(&self) -> Page {
        self.page
    }
}
