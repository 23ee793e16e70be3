//! PayPlan customers

use super::{required_key, segment, to_fields, Page, RestOperation};
use crate::{
    codec::{self, CardholderField},
    types::{HttpMethod, TransactionType},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CUSTOMER_FIELDS: &[&str] = &[
    "customerIdentifier",
    "firstName",
    "lastName",
    "company",
    "customerStatus",
    "title",
    "department",
    "primaryEmail",
    "secondaryEmail",
    "phoneDay",
    "phoneEvening",
    "phoneMobile",
    "fax",
    "addressLine1",
    "addressLine2",
    "city",
    "stateProvince",
    "zipPostalCode",
    "country",
];

const SEARCH_FIELDS: &[&str] = &[
    "customerIdentifier",
    "company",
    "firstName",
    "lastName",
    "primaryEmail",
    "customerStatus",
    "phoneNumber",
    "zipPostalCode",
    "hasSchedules",
    "hasActiveSchedules",
];

/// Customer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerStatus {
    /// Active
    Active,
    /// Inactive
    Inactive,
}

/// Customer fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerParams {
    /// Merchant-side identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_identifier: Option<String>,
    /// First name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_status: Option<CustomerStatus>,
    /// Job title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Department
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Primary email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    /// Secondary email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_email: Option<String>,
    /// Daytime phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_day: Option<String>,
    /// Evening phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_evening: Option<String>,
    /// Mobile phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mobile: Option<String>,
    /// Fax
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    /// Street address, second line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State / province
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_postal_code: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn text(value: Option<String>, field: Option<CardholderField>) -> Result<Option<String>> {
    value
        .map(|v| codec::check_cardholder_data(&v, field))
        .transpose()
}

fn phone(value: Option<String>) -> Result<Option<String>> {
    value.map(|v| codec::clean_phone(&v)).transpose()
}

fn email(value: Option<String>) -> Result<Option<String>> {
    value.map(|v| codec::check_email(&v)).transpose()
}

impl CustomerParams {
    /// Run every field through the codec
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            customer_identifier: text(self.customer_identifier, None)?,
            first_name: text(self.first_name, Some(CardholderField::FirstName))?,
            last_name: text(self.last_name, Some(CardholderField::LastName))?,
            company: text(self.company, None)?,
            customer_status: self.customer_status,
            title: text(self.title, None)?,
            department: text(self.department, None)?,
            primary_email: email(self.primary_email)?,
            secondary_email: email(self.secondary_email)?,
            phone_day: phone(self.phone_day)?,
            phone_evening: phone(self.phone_evening)?,
            phone_mobile: phone(self.phone_mobile)?,
            fax: phone(self.fax)?,
            address_line1: text(self.address_line1, Some(CardholderField::Address))?,
            address_line2: text(self.address_line2, Some(CardholderField::Address))?,
            city: text(self.city, Some(CardholderField::City))?,
            state_province: text(self.state_province, Some(CardholderField::State))?,
            zip_postal_code: self
                .zip_postal_code
                .map(|z| codec::clean_zip(&z))
                .transpose()?,
            country: text(self.country, None)?,
        })
    }
}

fn require(name: &str, value: &Option<String>) -> Result<()> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(Error::Validation(format!("The {} parameter is required", name))),
    }
}

/// Create a customer
#[derive(Debug, Clone)]
pub struct AddCustomer {
    params: CustomerParams,
}

impl AddCustomer {
    /// Requires identifier, first and last name and country
    pub fn new(params: CustomerParams) -> Result<Self> {
        let mut params = params.normalized()?;
        require("customerIdentifier", &params.customer_identifier)?;
        require("firstName", &params.first_name)?;
        require("lastName", &params.last_name)?;
        require("country", &params.country)?;
        params.customer_status.get_or_insert(CustomerStatus::Active);
        Ok(Self { params })
    }
}

impl RestOperation for AddCustomer {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanCustomerAdd
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "customers".to_string()
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        CUSTOMER_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        to_fields(&self.params)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("customerKey")
    }
}

/// Update a customer
#[derive(Debug, Clone)]
pub struct EditCustomer {
    customer_key: String,
    params: CustomerParams,
}

impl EditCustomer {
    /// Update `customer_key` with the fields set in `params`
    pub fn new(customer_key: &str, params: CustomerParams) -> Result<Self> {
        Ok(Self {
            customer_key: required_key("customerKey", customer_key)?,
            params: params.normalized()?,
        })
    }
}

impl RestOperation for EditCustomer {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanCustomerEdit
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("customers/{}", segment(&self.customer_key))
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        CUSTOMER_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        to_fields(&self.params)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("customerKey")
    }
}

/// Delete a customer
#[derive(Debug, Clone)]
pub struct DeleteCustomer {
    customer_key: String,
    force_delete: bool,
}

impl DeleteCustomer {
    /// Delete `customer_key`
    pub fn new(customer_key: &str) -> Result<Self> {
        Ok(Self {
            customer_key: required_key("customerKey", customer_key)?,
            force_delete: false,
        })
    }

    /// Also delete the customer's payment methods and schedules
    pub fn force(mut self) -> Self {
        self.force_delete = true;
        self
    }
}

impl RestOperation for DeleteCustomer {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanCustomerDelete
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self) -> String {
        format!("customers/{}", segment(&self.customer_key))
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
        Some("customerKey")
    }
}

/// Fetch a customer
#[derive(Debug, Clone)]
pub struct GetCustomer {
    customer_key: String,
}

impl GetCustomer {
    /// Fetch `customer_key`
    pub fn new(customer_key: &str) -> Result<Self> {
        Ok(Self {
            customer_key: required_key("customerKey", customer_key)?,
        })
    }
}

impl RestOperation for GetCustomer {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanCustomerGet
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("customers/{}", segment(&self.customer_key))
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("customerKey")
    }
}

/// Customer search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSearch {
    /// Merchant-side identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_identifier: Option<String>,
    /// Company
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// First name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Primary email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_status: Option<CustomerStatus>,
    /// Any phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_postal_code: Option<String>,
    /// Only customers with schedules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_schedules: Option<bool>,
    /// Only customers with active schedules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_active_schedules: Option<bool>,
}

/// Search customers
#[derive(Debug, Clone)]
pub struct SearchCustomers {
    criteria: CustomerSearch,
    page: Page,
}

impl SearchCustomers {
    /// Search by `criteria`; an empty search returns every customer
    pub fn new(criteria: CustomerSearch) -> Self {
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

impl RestOperation for SearchCustomers {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanCustomerSearch
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "searchCustomers".to_string()
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
