//! ACH (eCheck) operations

use super::{hps, hps_text, TransactionBuilder};
use crate::{
    card::{BillingContact, Check},
    codec::{self, CardholderField},
    types::TransactionType,
    xml::Element,
    Error, Result,
};

/// Debit a bank account
#[derive(Debug, Clone)]
pub struct CheckSale {
    amount: String,
    check: Check,
    description: Option<String>,
    client_transaction_id: Option<String>,
}

impl CheckSale {
    /// Debit `amount` from `check`
    pub fn new(amount: &str, check: Check) -> Result<Self> {
        let amount = codec::normalize_amount(Some(amount))?;
        check.validate()?;

        Ok(Self {
            amount,
            check,
            description: None,
            client_transaction_id: None,
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the client transaction id
    pub fn with_client_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.client_transaction_id = Some(id.into());
        self
    }
}

fn consumer_info(holder: &BillingContact) -> Result<Element> {
    let text = |value: &Option<String>, field: CardholderField| -> Result<Option<String>> {
        value
            .as_deref()
            .map(|v| codec::check_cardholder_data(v, Some(field)))
            .transpose()
    };

    let first_name = text(&holder.first_name, CardholderField::FirstName)?;
    let last_name = text(&holder.last_name, CardholderField::LastName)?;
    let check_name = match (&first_name, &last_name) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(name), None) | (None, Some(name)) => Some(name.clone()),
        (None, None) => None,
    };

    Ok(Element::new(hps("ConsumerInfo"))
        .opt_text(&hps("FirstName"), first_name.as_deref())
        .opt_text(&hps("LastName"), last_name.as_deref())
        .opt_text(&hps("CheckName"), check_name.as_deref())
        .opt_text(
            &hps("Address1"),
            text(&holder.address, CardholderField::Address)?.as_deref(),
        )
        .opt_text(&hps("City"), text(&holder.city, CardholderField::City)?.as_deref())
        .opt_text(&hps("State"), text(&holder.state, CardholderField::State)?.as_deref())
        .opt_text(
            &hps("Zip"),
            holder.postcode.as_deref().map(codec::clean_zip).transpose()?.as_deref(),
        )
        .opt_text(
            &hps("PhoneNumber"),
            holder.phone.as_deref().map(codec::clean_phone).transpose()?.as_deref(),
        )
        .opt_text(
            &hps("EmailAddress"),
            holder.email.as_deref().map(codec::check_email).transpose()?.as_deref(),
        ))
}

impl TransactionBuilder for CheckSale {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CheckSale
    }

    fn build(&self) -> Result<Element> {
        let account = Element::new(hps("AccountInfo"))
            .child(hps_text("AccountNumber", self.check.account_number.as_str()))
            .opt_text(&hps("CheckNumber"), self.check.check_number.as_deref())
            .child(hps_text("RoutingNumber", self.check.routing_number.as_str()));

        let description = self
            .description
            .as_deref()
            .map(|d| codec::check_cardholder_data(d, None))
            .transpose()?;

        let block = Element::new(hps("Block1"))
            .child(hps_text("Amt", self.amount.as_str()))
            .child(account)
            .child(hps_text("CheckAction", "SALE"))
            .child(hps_text("SECCode", self.check.sec_code.as_str()))
            .child(hps_text("CheckType", self.check.check_type.as_str()))
            .child(hps_text("DataEntryMode", "MANUAL"))
            .non_empty_child(consumer_info(&self.check.holder)?)
            .child(hps_text("AccountType", self.check.account_type.as_str()))
            .non_empty_child(
                Element::new(hps("AdditionalTxnFields"))
                    .opt_text(&hps("Description"), description.as_deref()),
            );

        Ok(Element::new(hps("CheckSale")).child(block))
    }

    fn client_transaction_id(&self) -> Option<&str> {
        self.client_transaction_id.as_deref()
    }
}

/// Void an ACH debit
#[derive(Debug, Clone)]
pub struct CheckVoid {
    transaction_reference: String,
}

impl CheckVoid {
    /// Void `transaction_reference`
    pub fn new(transaction_reference: &str) -> Result<Self> {
        let reference = transaction_reference.trim();
        if reference.is_empty() {
            return Err(Error::Validation(
                "The transactionReference parameter is required".to_string(),
            ));
        }
        Ok(Self {
            transaction_reference: reference.to_string(),
        })
    }
}

impl TransactionBuilder for CheckVoid {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CheckVoid
    }

    fn build(&self) -> Result<Element> {
        Ok(Element::new(hps("CheckVoid")).child(
            Element::new(hps("Block1"))
                .child(hps_text("GatewayTxnId", self.transaction_reference.as_str())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{AccountType, CheckType, SecCode};
    use crate::portico::ReversalKey;

    fn check() -> Check {
        Check {
            routing_number: "490000018".to_string(),
            account_number: "24413815".to_string(),
            check_number: Some("1234".to_string()),
            account_type: AccountType::Savings,
            check_type: CheckType::Business,
            sec_code: SecCode::Web,
            holder: BillingContact {
                first_name: Some("John".to_string()),
                last_name: Some("Doe".to_string()),
                email: Some("john@example.com".to_string()),
                ..BillingContact::default()
            },
        }
    }

    #[test]
    fn test_check_sale_fragment() {
        let sale = CheckSale::new("11.5", check()).unwrap();
        let fragment = sale.build().unwrap();
        let block = fragment.find("hps:Block1").unwrap();

        assert_eq!(block.text_at(&["hps:Amt"]), Some("11.50"));
        assert_eq!(
            block.text_at(&["hps:AccountInfo", "hps:RoutingNumber"]),
            Some("490000018")
        );
        assert_eq!(block.text_at(&["hps:CheckAction"]), Some("SALE"));
        assert_eq!(block.text_at(&["hps:SECCode"]), Some("WEB"));
        assert_eq!(block.text_at(&["hps:CheckType"]), Some("BUSINESS"));
        assert_eq!(block.text_at(&["hps:AccountType"]), Some("SAVINGS"));
        assert_eq!(
            block.text_at(&["hps:ConsumerInfo", "hps:CheckName"]),
            Some("John Doe")
        );
    }

    #[test]
    fn test_check_sale_rejects_bad_routing() {
        let mut bad = check();
        bad.routing_number = "123".to_string();
        assert!(CheckSale::new("1.00", bad).is_err());
    }

    #[test]
    fn test_check_sale_not_reversible() {
        let sale = CheckSale::new("1.00", check()).unwrap();
        assert!(sale
            .reversal(ReversalKey::GatewayTxnId("1".to_string()))
            .is_none());
    }

    #[test]
    fn test_check_void() {
        let fragment = CheckVoid::new("9001").unwrap().build().unwrap();
        assert_eq!(
            fragment.text_at(&["hps:Block1", "hps:GatewayTxnId"]),
            Some("9001")
        );
        assert!(CheckVoid::new("").is_err());
    }
}
