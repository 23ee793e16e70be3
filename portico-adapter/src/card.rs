//! Card, check and billing-contact value objects

use crate::{Error, Result};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Billing contact shared by cards and checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContact {
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// State / province
    pub state: Option<String>,
    /// Postal code
    pub postcode: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Email
    pub email: Option<String>,
}

impl BillingContact {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == BillingContact::default()
    }
}

/// Credit card
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Primary account number
    pub number: String,
    /// Expiry month (1-12)
    pub exp_month: u32,
    /// Expiry year (four digits)
    pub exp_year: i32,
    /// Card verification value
    pub cvv: Option<String>,
    /// Billing contact
    #[serde(default)]
    pub billing: BillingContact,
}

impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCard")
            .field("number", &self.masked_number())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("billing", &self.billing)
            .finish_non_exhaustive()
    }
}

impl CreditCard {
    /// Card with number and expiry
    pub fn new(number: impl Into<String>, exp_month: u32, exp_year: i32) -> Self {
        Self {
            number: number.into(),
            exp_month,
            exp_year,
            cvv: None,
            billing: BillingContact::default(),
        }
    }

    /// Set the CVV
    pub fn with_cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }

    /// Set the billing contact
    pub fn with_billing(mut self, billing: BillingContact) -> Self {
        self.billing = billing;
        self
    }

    /// Digits of the card number
    pub fn normalized_number(&self) -> String {
        self.number.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Number masked to its last four digits
    pub fn masked_number(&self) -> String {
        let digits = self.normalized_number();
        let tail = if digits.len() > 4 {
            &digits[digits.len() - 4..]
        } else {
            digits.as_str()
        };
        format!("****{}", tail)
    }

    /// Structural validation: Luhn checksum, length, expiry
    pub fn validate(&self) -> Result<()> {
        let digits = self.normalized_number();
        if !(12..=19).contains(&digits.len()) || !luhn_valid(&digits) {
            return Err(Error::Validation("Card number is invalid".to_string()));
        }

        if !(1..=12).contains(&self.exp_month) {
            return Err(Error::Validation("Card expiration month is invalid".to_string()));
        }

        let now = Utc::now();
        if (self.exp_year, self.exp_month) < (now.year(), now.month()) {
            return Err(Error::Validation("Card has expired".to_string()));
        }

        if let Some(cvv) = &self.cvv {
            if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::Validation("Card CVV is invalid".to_string()));
            }
        }

        Ok(())
    }
}

fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// What an authorization or sale charges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSource {
    /// Manually entered card
    Card(CreditCard),
    /// Multi-use token from a prior request
    Token(String),
}

impl PaymentSource {
    /// Validate the underlying card or token
    pub fn validate(&self) -> Result<()> {
        match self {
            PaymentSource::Card(card) => card.validate(),
            PaymentSource::Token(token) if token.trim().is_empty() => {
                Err(Error::Validation("The token parameter is required".to_string()))
            }
            PaymentSource::Token(_) => Ok(()),
        }
    }

    /// Billing contact, when the source carries one
    pub fn billing(&self) -> Option<&BillingContact> {
        match self {
            PaymentSource::Card(card) if !card.billing.is_empty() => Some(&card.billing),
            _ => None,
        }
    }
}

/// Bank account type for ACH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Checking
    Checking,
    /// Savings
    Savings,
}

impl AccountType {
    /// Portico wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "CHECKING",
            AccountType::Savings => "SAVINGS",
        }
    }
}

/// Check type for ACH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    /// Personal
    Personal,
    /// Business
    Business,
    /// Payroll
    Payroll,
}

impl CheckType {
    /// Portico wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckType::Personal => "PERSONAL",
            CheckType::Business => "BUSINESS",
            CheckType::Payroll => "PAYROLL",
        }
    }
}

/// Standard entry class code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecCode {
    /// Prearranged payment and deposit
    Ppd,
    /// Corporate credit or debit
    Ccd,
    /// Point of purchase
    Pop,
    /// Internet initiated
    Web,
    /// Telephone initiated
    Tel,
    /// eBronze
    EBronze,
}

impl SecCode {
    /// Portico wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            SecCode::Ppd => "PPD",
            SecCode::Ccd => "CCD",
            SecCode::Pop => "POP",
            SecCode::Web => "WEB",
            SecCode::Tel => "TEL",
            SecCode::EBronze => "EBRONZE",
        }
    }
}

/// Bank check (ACH)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    /// Routing (ABA) number
    pub routing_number: String,
    /// Account number
    pub account_number: String,
    /// Check number
    pub check_number: Option<String>,
    /// Account type
    pub account_type: AccountType,
    /// Check type
    pub check_type: CheckType,
    /// Standard entry class
    pub sec_code: SecCode,
    /// Account holder
    #[serde(default)]
    pub holder: BillingContact,
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("routing_number", &self.routing_number)
            .field("account_type", &self.account_type)
            .field("check_type", &self.check_type)
            .field("sec_code", &self.sec_code)
            .finish_non_exhaustive()
    }
}

impl Check {
    /// Structural validation: nine-digit routing number with a valid ABA
    /// checksum and a numeric account number.
    pub fn validate(&self) -> Result<()> {
        let routing = &self.routing_number;
        if routing.len() != 9 || !routing.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Validation("Routing number is invalid".to_string()));
        }

        let weights = [3, 7, 1];
        let sum: u32 = routing
            .chars()
            .filter_map(|c| c.to_digit(10))
            .enumerate()
            .map(|(i, d)| d * weights[i % 3])
            .sum();
        if sum % 10 != 0 {
            return Err(Error::Validation("Routing number is invalid".to_string()));
        }

        if self.account_number.is_empty()
            || !self.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(Error::Validation("Account number is invalid".to_string()));
        }

        Ok(())
    }
}
