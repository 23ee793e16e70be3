//! Credit card operations

use super::{card_data, card_holder_data, flag, hps, hps_text, TransactionBuilder};
use crate::{
    card::PaymentSource,
    codec,
    types::TransactionType,
    xml::Element,
    Error, Result,
};
use serde::{Deserialize, Serialize};

/// Parameters shared by authorizations, sales and their reversals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeParams {
    amount: String,
    currency: String,
    source: PaymentSource,
    /// Free-text description
    pub description: Option<String>,
    /// Merchant invoice number
    pub invoice_number: Option<String>,
    /// Merchant customer id
    pub customer_id: Option<String>,
    /// Client transaction id, echoed in the header
    pub client_transaction_id: Option<String>,
    /// Let the gateway accept a duplicate of a recent transaction
    pub allow_duplicates: bool,
    /// Ask for a multi-use token in the response
    pub request_token: bool,
}

impl ChargeParams {
    /// Validated parameters; the amount is normalized to two decimals
    pub fn new(amount: &str, currency: &str, source: PaymentSource) -> Result<Self> {
        let amount = codec::normalize_amount(Some(amount))?;
        let currency = codec::check_currency(currency, None)?;
        source.validate()?;

        Ok(Self {
            amount,
            currency,
            source,
            description: None,
            invoice_number: None,
            customer_id: None,
            client_transaction_id: None,
            allow_duplicates: false,
            request_token: false,
        })
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the invoice number
    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }

    /// Set the customer id
    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Set the client transaction id
    pub fn with_client_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.client_transaction_id = Some(id.into());
        self
    }

    /// Request a multi-use token
    pub fn with_token_request(mut self) -> Self {
        self.request_token = true;
        self
    }

    /// Normalized amount
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Lower-cased currency
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Card or token being charged
    pub fn source(&self) -> &PaymentSource {
        &self.source
    }

    fn additional_fields(&self) -> Result<Element> {
        let description = self
            .description
            .as_deref()
            .map(|d| codec::check_cardholder_data(d, None))
            .transpose()?;

        Ok(Element::new(hps("AdditionalTxnFields"))
            .opt_text(&hps("Description"), description.as_deref())
            .opt_text(&hps("InvoiceNbr"), self.invoice_number.as_deref())
            .opt_text(&hps("CustomerID"), self.customer_id.as_deref()))
    }

    fn charge_block(&self, cpc_request: bool) -> Result<Element> {
        let mut block = Element::new(hps("Block1"))
            .child(hps_text("AllowDup", flag(self.allow_duplicates)))
            .child(hps_text("AllowPartialAuth", "N"))
            .child(hps_text("Amt", self.amount.as_str()));

        if let Some(holder) = self.source.billing().map(card_holder_data).transpose()?.flatten() {
            block = block.child(holder);
        }

        block = block.child(card_data(&self.source, self.request_token));
        if cpc_request {
            block = block.child(hps_text("CPCReq", "Y"));
        }

        Ok(block.non_empty_child(self.additional_fields()?))
    }
}

/// Which identifier a reversal targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReversalKey {
    /// Reference returned by the gateway
    GatewayTxnId(String),
    /// Client transaction id of a request that never got an answer
    ClientTxnId(String),
}

impl ReversalKey {
    /// The identifier value
    pub fn as_str(&self) -> &str {
        match self {
            ReversalKey::GatewayTxnId(id) | ReversalKey::ClientTxnId(id) => id,
        }
    }
}

fn required_reference(reference: &str) -> Result<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(Error::Validation(
            "The transactionReference parameter is required".to_string(),
        ));
    }
    Ok(reference.to_string())
}

/// Authorize a card without capturing it
#[derive(Debug, Clone)]
pub struct CreditAuth {
    params: ChargeParams,
}

impl CreditAuth {
    /// Authorization for `params`
    pub fn new(params: ChargeParams) -> Self {
        Self { params }
    }

    /// Parameters
    pub fn params(&self) -> &ChargeParams {
        &self.params
    }
}

impl TransactionBuilder for CreditAuth {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditAuth
    }

    fn build(&self) -> Result<Element> {
        Ok(Element::new(hps("CreditAuth")).child(self.params.charge_block(false)?))
    }

    fn client_transaction_id(&self) -> Option<&str> {
        self.params.client_transaction_id.as_deref()
    }

    fn reversal(&self, key: ReversalKey) -> Option<CreditReversal> {
        Some(CreditReversal::for_charge(self.params.clone(), key))
    }
}

/// Authorize and capture in one step (purchase)
#[derive(Debug, Clone)]
pub struct CreditSale {
    params: ChargeParams,
}

impl CreditSale {
    /// Sale for `params`
    pub fn new(params: ChargeParams) -> Self {
        Self { params }
    }

    /// Parameters
    pub fn params(&self) -> &ChargeParams {
        &self.params
    }
}

impl TransactionBuilder for CreditSale {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditSale
    }

    fn build(&self) -> Result<Element> {
        Ok(Element::new(hps("CreditSale")).child(self.params.charge_block(true)?))
    }

    fn client_transaction_id(&self) -> Option<&str> {
        self.params.client_transaction_id.as_deref()
    }

    fn reversal(&self, key: ReversalKey) -> Option<CreditReversal> {
        Some(CreditReversal::for_charge(self.params.clone(), key))
    }
}

/// Capture a prior authorization into the open batch
#[derive(Debug, Clone)]
pub struct CreditAddToBatch {
    transaction_reference: String,
    amount: Option<String>,
}

impl CreditAddToBatch {
    /// Capture `transaction_reference`, optionally for a different amount
    pub fn new(transaction_reference: &str, amount: Option<&str>) -> Result<Self> {
        Ok(Self {
            transaction_reference: required_reference(transaction_reference)?,
            amount: amount.map(|a| codec::normalize_amount(Some(a))).transpose()?,
        })
    }
}

impl TransactionBuilder for CreditAddToBatch {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditAddToBatch
    }

    fn build(&self) -> Result<Element> {
        Ok(Element::new(hps("CreditAddToBatch"))
            .child(hps_text("GatewayTxnId", self.transaction_reference.as_str()))
            .opt_text(&hps("Amt"), self.amount.as_deref()))
    }
}

/// Refund a prior sale
#[derive(Debug, Clone)]
pub struct CreditReturn {
    transaction_reference: String,
    amount: String,
    billing: Option<crate::card::BillingContact>,
}

impl CreditReturn {
    /// Refund `amount` of `transaction_reference`
    pub fn new(transaction_reference: &str, amount: &str) -> Result<Self> {
        Ok(Self {
            transaction_reference: required_reference(transaction_reference)?,
            amount: codec::normalize_amount(Some(amount))?,
            billing: None,
        })
    }

    /// Attach cardholder details
    pub fn with_billing(mut self, billing: crate::card::BillingContact) -> Self {
        self.billing = Some(billing);
        self
    }
}

impl TransactionBuilder for CreditReturn {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditReturn
    }

    fn build(&self) -> Result<Element> {
        let mut block = Element::new(hps("Block1"))
            .child(hps_text("AllowDup", "Y"))
            .child(hps_text("Amt", self.amount.as_str()))
            .child(hps_text("GatewayTxnId", self.transaction_reference.as_str()));

        if let Some(holder) = self.billing.as_ref().map(card_holder_data).transpose()?.flatten() {
            block = block.child(holder);
        }

        Ok(Element::new(hps("CreditReturn")).child(block))
    }
}

/// Void a transaction still in the open batch
#[derive(Debug, Clone)]
pub struct CreditVoid {
    transaction_reference: String,
}

impl CreditVoid {
    /// Void `transaction_reference`
    pub fn new(transaction_reference: &str) -> Result<Self> {
        Ok(Self {
            transaction_reference: required_reference(transaction_reference)?,
        })
    }
}

impl TransactionBuilder for CreditVoid {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditVoid
    }

    fn build(&self) -> Result<Element> {
        Ok(Element::new(hps("CreditVoid"))
            .child(hps_text("GatewayTxnId", self.transaction_reference.as_str())))
    }
}

/// Reverse an authorization or sale
///
/// Never itself reversible.
#[derive(Debug, Clone)]
pub struct CreditReversal {
    key: ReversalKey,
    amount: String,
    source: Option<PaymentSource>,
    description: Option<String>,
}

impl CreditReversal {
    /// Reverse `amount` of the transaction with gateway id `transaction_reference`
    pub fn new(transaction_reference: &str, amount: &str) -> Result<Self> {
        Ok(Self {
            key: ReversalKey::GatewayTxnId(required_reference(transaction_reference)?),
            amount: codec::normalize_amount(Some(amount))?,
            source: None,
            description: None,
        })
    }

    /// Reversal reusing the parameters of the charge it compensates
    pub fn for_charge(params: ChargeParams, key: ReversalKey) -> Self {
        Self {
            key,
            amount: params.amount,
            source: Some(params.source),
            description: params.description,
        }
    }

    /// What the reversal targets
    pub fn key(&self) -> &ReversalKey {
        &self.key
    }

    /// Reversed amount
    pub fn amount(&self) -> &str {
        &self.amount
    }
}

impl TransactionBuilder for CreditReversal {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditReversal
    }

    fn build(&self) -> Result<Element> {
        let target = match &self.key {
            ReversalKey::GatewayTxnId(id) => hps_text("GatewayTxnId", id.as_str()),
            ReversalKey::ClientTxnId(id) => hps_text("ClientTxnId", id.as_str()),
        };

        let mut block = Element::new(hps("Block1"))
            .child(target)
            .child(hps_text("Amt", self.amount.as_str()));

        if let (ReversalKey::ClientTxnId(_), Some(source)) = (&self.key, &self.source) {
            block = block.child(card_data(source, false));
        }

        let description = self
            .description
            .as_deref()
            .map(|d| codec::check_cardholder_data(d, None))
            .transpose()?;
        block = block.non_empty_child(
            Element::new(hps("AdditionalTxnFields"))
                .opt_text(&hps("Description"), description.as_deref()),
        );

        Ok(Element::new(hps("CreditReversal")).child(block))
    }
}

/// Zero-amount verification of a card
#[derive(Debug, Clone)]
pub struct CreditAccountVerify {
    source: PaymentSource,
    request_token: bool,
}

impl CreditAccountVerify {
    /// Verify `source`
    pub fn new(source: PaymentSource) -> Result<Self> {
        source.validate()?;
        Ok(Self {
            source,
            request_token: false,
        })
    }

    /// Request a multi-use token
    pub fn with_token_request(mut self) -> Self {
        self.request_token = true;
        self
    }
}

impl TransactionBuilder for CreditAccountVerify {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::CreditAccountVerify
    }

    fn build(&self) -> Result<Element> {
        let mut block = Element::new(hps("Block1"));
        if let Some(billing) = self.source.billing() {
            // Zip and street are what AVS checks; names are not sent here
            let holder = crate::card::BillingContact {
                address: billing.address.clone(),
                postcode: billing.postcode.clone(),
                ..Default::default()
            };
            if let Some(holder) = card_holder_data(&holder)? {
                block = block.child(holder);
            }
        }
        block = block.child(card_data(&self.source, self.request_token));

        Ok(Element::new(hps("CreditAccountVerify")).child(block))
    }
}
