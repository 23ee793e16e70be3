//! PayPlan payment methods (cards and bank accounts)

use super::{required_key, segment, to_fields, Page, RestOperation};
use crate::{
    card::{AccountType, BillingContact, Check, CheckType, CreditCard},
    codec::{self, CardholderField},
    types::{HttpMethod, TransactionType},
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CARD_FIELDS: &[&str] = &[
    "customerKey",
    "paymentMethodIdentifier",
    "nameOnAccount",
    "accountNumber",
    "expirationDate",
    "cardVerificationValue",
    "preferredPayment",
    "paymentStatus",
    "addressLine1",
    "addressLine2",
    "city",
    "stateProvince",
    "zipPostalCode",
    "country",
];

const ACH_FIELDS: &[&str] = &[
    "customerKey",
    "paymentMethodIdentifier",
    "nameOnAccount",
    "accountNumber",
    "routingNumber",
    "achType",
    "accountType",
    "telephoneIndicator",
    "preferredPayment",
    "paymentStatus",
    "addressLine1",
    "addressLine2",
    "city",
    "stateProvince",
    "zipPostalCode",
    "country",
];

const UPDATE_FIELDS: &[&str] = &[
    "paymentMethodIdentifier",
    "nameOnAccount",
    "expirationDate",
    "preferredPayment",
    "paymentStatus",
    "addressLine1",
    "addressLine2",
    "city",
    "stateProvince",
    "zipPostalCode",
    "country",
];

const SEARCH_FIELDS: &[&str] = &[
    "customerIdentifier",
    "customerKey",
    "paymentMethodType",
    "paymentStatus",
    "hasSchedules",
];

/// Payment method status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Usable
    Active,
    /// Disabled
    Inactive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zip_postal_code: Option<String>,
}

impl Address {
    fn from_contact(contact: &BillingContact) -> Result<Self> {
        let text = |value: &Option<String>, field| {
            value
                .as_deref()
                .map(|v| codec::check_cardholder_data(v, Some(field)))
                .transpose()
        };
        Ok(Self {
            address_line1: text(&contact.address, CardholderField::Address)?,
            city: text(&contact.city, CardholderField::City)?,
            state_province: text(&contact.state, CardholderField::State)?,
            zip_postal_code: contact.postcode.as_deref().map(codec::clean_zip).transpose()?,
        })
    }
}

fn name_on_account(contact: &BillingContact) -> Result<Option<String>> {
    let first = contact
        .first_name
        .as_deref()
        .map(|v| codec::check_cardholder_data(v, Some(CardholderField::FirstName)))
        .transpose()?;
    let last = contact
        .last_name
        .as_deref()
        .map(|v| codec::check_cardholder_data(v, Some(CardholderField::LastName)))
        .transpose()?;

    let name = [first, last]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(if name.is_empty() { None } else { Some(name) })
}

fn insert_common(
    fields: &mut Map<String, Value>,
    customer_key: &str,
    identifier: &Option<String>,
    preferred: bool,
    status: PaymentStatus,
) -> Result<()> {
    fields.insert("customerKey".to_string(), Value::String(customer_key.to_string()));
    if let Some(identifier) = identifier {
        fields.insert(
            "paymentMethodIdentifier".to_string(),
            Value::String(identifier.clone()),
        );
    }
    fields.insert("preferredPayment".to_string(), Value::Bool(preferred));
    fields.insert("paymentStatus".to_string(), serde_json::to_value(status)?);
    Ok(())
}

/// Store a card for a customer
#[derive(Debug, Clone)]
pub struct AddCardPaymentMethod {
    customer_key: String,
    card: CreditCard,
    identifier: Option<String>,
    preferred: bool,
    status: PaymentStatus,
}

impl AddCardPaymentMethod {
    /// Attach `card` to `customer_key`
    pub fn new(customer_key: &str, card: CreditCard) -> Result<Self> {
        card.validate()?;
        Ok(Self {
            customer_key: required_key("customerKey", customer_key)?,
            card,
            identifier: None,
            preferred: false,
            status: PaymentStatus::Active,
        })
    }

    /// Merchant-side identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Make this the customer's preferred method
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }
}

impl RestOperation for AddCardPaymentMethod {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodAdd
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "paymentMethodsCreditCard".to_string()
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        CARD_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        let mut fields = to_fields(&Address::from_contact(&self.card.billing)?)?;
        insert_common(
            &mut fields,
            &self.customer_key,
            &self.identifier,
            self.preferred,
            self.status,
        )?;

        fields.insert(
            "accountNumber".to_string(),
            Value::String(self.card.normalized_number()),
        );
        fields.insert(
            "expirationDate".to_string(),
            Value::String(format!("{:02}{}", self.card.exp_month, self.card.exp_year)),
        );
        if let Some(cvv) = &self.card.cvv {
            fields.insert("cardVerificationValue".to_string(), Value::String(cvv.clone()));
        }
        if let Some(name) = name_on_account(&self.card.billing)? {
            fields.insert("nameOnAccount".to_string(), Value::String(name));
        }

        Ok(fields)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("paymentMethodKey")
    }
}

/// Store a bank account for a customer
#[derive(Debug, Clone)]
pub struct AddAchPaymentMethod {
    customer_key: String,
    check: Check,
    identifier: Option<String>,
    preferred: bool,
    status: PaymentStatus,
}

impl AddAchPaymentMethod {
    /// Attach `check` to `customer_key`. The holder's name is required.
    pub fn new(customer_key: &str, check: Check) -> Result<Self> {
        check.validate()?;
        if name_on_account(&check.holder)?.is_none() {
            return Err(crate::Error::Validation(
                "The nameOnAccount parameter is required".to_string(),
            ));
        }
        Ok(Self {
            customer_key: required_key("customerKey", customer_key)?,
            check,
            identifier: None,
            preferred: false,
            status: PaymentStatus::Active,
        })
    }

    /// Merchant-side identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Make this the customer's preferred method
    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }
}

impl RestOperation for AddAchPaymentMethod {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodAdd
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "paymentMethodsACH".to_string()
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        ACH_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        let mut fields = to_fields(&Address::from_contact(&self.check.holder)?)?;
        insert_common(
            &mut fields,
            &self.customer_key,
            &self.identifier,
            self.preferred,
            self.status,
        )?;

        let ach_type = match self.check.account_type {
            AccountType::Checking => "Checking",
            AccountType::Savings => "Savings",
        };
        let account_type = match self.check.check_type {
            CheckType::Business | CheckType::Payroll => "Business",
            CheckType::Personal => "Personal",
        };

        fields.insert(
            "accountNumber".to_string(),
            Value::String(self.check.account_number.clone()),
        );
        fields.insert(
            "routingNumber".to_string(),
            Value::String(self.check.routing_number.clone()),
        );
        fields.insert("achType".to_string(), Value::String(ach_type.to_string()));
        fields.insert("accountType".to_string(), Value::String(account_type.to_string()));
        fields.insert("telephoneIndicator".to_string(), Value::Bool(false));
        if let Some(name) = name_on_account(&self.check.holder)? {
            fields.insert("nameOnAccount".to_string(), Value::String(name));
        }

        Ok(fields)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("paymentMethodKey")
    }
}

/// Fields that can change on a stored payment method
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodUpdate {
    /// Merchant-side identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_identifier: Option<String>,
    /// Account holder name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_on_account: Option<String>,
    /// Card expiry as `MMYYYY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// Preferred flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_payment: Option<bool>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

/// Update a stored payment method
#[derive(Debug, Clone)]
pub struct EditPaymentMethod {
    payment_method_key: String,
    update: PaymentMethodUpdate,
}

impl EditPaymentMethod {
    /// Apply `update` to `payment_method_key`
    pub fn new(payment_method_key: &str, update: PaymentMethodUpdate) -> Result<Self> {
        if let Some(expiry) = &update.expiration_date {
            if expiry.len() != 6 || !expiry.chars().all(|c| c.is_ascii_digit()) {
                return Err(crate::Error::Validation(
                    "Card expiration date is invalid".to_string(),
                ));
            }
        }
        Ok(Self {
            payment_method_key: required_key("paymentMethodKey", payment_method_key)?,
            update,
        })
    }
}

impl RestOperation for EditPaymentMethod {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodEdit
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn path(&self) -> String {
        format!("paymentMethods/{}", segment(&self.payment_method_key))
    }

    fn allowed_fields(&self) -> &'static [&'static str] {
        UPDATE_FIELDS
    }

    fn fields(&self) -> Result<Map<String, Value>> {
        to_fields(&self.update)
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("paymentMethodKey")
    }
}

/// Delete a stored payment method
#[derive(Debug, Clone)]
pub struct DeletePaymentMethod {
    payment_method_key: String,
    force_delete: bool,
}

impl DeletePaymentMethod {
    /// Delete `payment_method_key`
    pub fn new(payment_method_key: &str) -> Result<Self> {
        Ok(Self {
            payment_method_key: required_key("paymentMethodKey", payment_method_key)?,
            force_delete: false,
        })
    }

    /// Also delete schedules that use this method
    pub fn force(mut self) -> Self {
        self.force_delete = true;
        self
    }
}

impl RestOperation for DeletePaymentMethod {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodDelete
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn path(&self) -> String {
        format!("paymentMethods/{}", segment(&self.payment_method_key))
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
        Some("paymentMethodKey")
    }
}

/// Fetch a stored payment method
#[derive(Debug, Clone)]
pub struct GetPaymentMethod {
    payment_method_key: String,
}

impl GetPaymentMethod {
    /// Fetch `payment_method_key`
    pub fn new(payment_method_key: &str) -> Result<Self> {
        Ok(Self {
            payment_method_key: required_key("paymentMethodKey", payment_method_key)?,
        })
    }
}

impl RestOperation for GetPaymentMethod {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodGet
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn path(&self) -> String {
        format!("paymentMethods/{}", segment(&self.payment_method_key))
    }

    fn reference_key(&self) -> Option<&'static str> {
        Some("paymentMethodKey")
    }
}

/// Payment method search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSearch {
    /// Merchant customer identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_identifier: Option<String>,
    /// Customer key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_key: Option<String>,
    /// `Credit Card` or `ACH`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    /// Only methods used by a schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_schedules: Option<bool>,
}

/// Search stored payment methods
#[derive(Debug, Clone)]
pub struct SearchPaymentMethods {
    criteria: PaymentMethodSearch,
    page: Page,
}

impl SearchPaymentMethods {
    /// Search by `criteria`
    pub fn new(criteria: PaymentMethodSearch) -> Self {
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

impl RestOperation for SearchPaymentMethods {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::PayPlanPaymentMethodSearch
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn path(&self) -> String {
        "searchPaymentMethods".to_string()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::SecCode;
    use serde_json::json;

    fn card() -> CreditCard {
        CreditCard::new("4012002000060016", 3, 2099)
            .with_cvv("123")
            .with_billing(BillingContact {
                first_name: Some("Jane".to_string()),
                last_name: Some("Doe".to_string()),
                postcode: Some("75024".to_string()),
                ..BillingContact::default()
            })
    }

    fn check(holder: BillingContact) -> Check {
        Check {
            routing_number: "490000018".to_string(),
            account_number: "24413815".to_string(),
            check_number: None,
            account_type: AccountType::Checking,
            check_type: CheckType::Personal,
            sec_code: SecCode::Ppd,
            holder,
        }
    }

    #[test]
    fn test_card_fields() {
        let add = AddCardPaymentMethod::new("55", card()).unwrap().preferred();
        let fields = Value::Object(add.fields().unwrap());
        assert_eq!(
            fields,
            json!({
                "customerKey": "55",
                "preferredPayment": true,
                "paymentStatus": "Active",
                "accountNumber": "4012002000060016",
                "expirationDate": "032099",
                "cardVerificationValue": "123",
                "nameOnAccount": "Jane Doe",
                "zipPostalCode": "75024",
            })
        );
        assert_eq!(add.path(), "paymentMethodsCreditCard");
    }

    #[test]
    fn test_card_must_be_valid() {
        let bad = CreditCard::new("4012002000060017", 3, 2099);
        assert!(AddCardPaymentMethod::new("55", bad).is_err());
        assert!(AddCardPaymentMethod::new("", card()).is_err());
    }

    #[test]
    fn test_ach_fields() {
        let holder = BillingContact {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            ..BillingContact::default()
        };
        let add = AddAchPaymentMethod::new("55", check(holder)).unwrap();
        let fields = add.fields().unwrap();
        assert_eq!(fields["achType"], json!("Checking"));
        assert_eq!(fields["accountType"], json!("Personal"));
        assert_eq!(fields["routingNumber"], json!("490000018"));
        assert_eq!(fields["nameOnAccount"], json!("John Doe"));
        assert_eq!(add.path(), "paymentMethodsACH");
    }

    #[test]
    fn test_ach_requires_name() {
        assert!(AddAchPaymentMethod::new("55", check(BillingContact::default())).is_err());
    }

    #[test]
    fn test_edit_validates_expiry() {
        let update = PaymentMethodUpdate {
            expiration_date: Some("1/30".to_string()),
            ..PaymentMethodUpdate::default()
        };
        assert!(EditPaymentMethod::new("9", update).is_err());

        let update = PaymentMethodUpdate {
            payment_status: Some(PaymentStatus::Inactive),
            ..PaymentMethodUpdate::default()
        };
        let edit = EditPaymentMethod::new("9", update).unwrap();
        assert_eq!(edit.path(), "paymentMethods/9");
        assert_eq!(
            Value::Object(edit.fields().unwrap()),
            json!({"paymentStatus": "Inactive"})
        );
    }

    #[test]
    fn test_search() {
        let search = SearchPaymentMethods::new(PaymentMethodSearch {
            customer_key: Some("55".to_string()),
            ..PaymentMethodSearch::default()
        });
        assert_eq!(search.path(), "searchPaymentMethods");
        assert_eq!(search.page(), Page::default());
        assert_eq!(GetPaymentMethod::new("9").unwrap().path(), "paymentMethods/9");
        assert_eq!(
            DeletePaymentMethod::new("9").unwrap().method(),
            HttpMethod::Delete
        );
    }
}
