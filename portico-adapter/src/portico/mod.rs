//! Portico SOAP/XML protocol
//!
//! Each operation implements [`TransactionBuilder`] and produces only its
//! own `hps:<TransactionType>` fragment; [`envelope`] wraps that fragment in
//! the SOAP envelope and header, [`response`] parses the reply.

pub mod check;
pub mod credit;
pub mod envelope;
pub mod response;

use crate::{
    card::{BillingContact, PaymentSource},
    codec::{self, CardholderField},
    types::TransactionType,
    xml::Element,
    Result,
};

pub use check::{CheckSale, CheckVoid};
pub use credit::{
    ChargeParams, CreditAccountVerify, CreditAddToBatch, CreditAuth, CreditReturn,
    CreditReversal, CreditSale, CreditVoid, ReversalKey,
};

/// A Portico operation able to render its transaction fragment
pub trait TransactionBuilder: Send + Sync {
    /// Transaction-type tag; also the fragment's element name
    fn transaction_type(&self) -> TransactionType;

    /// Build the `hps:<TransactionType>` element
    fn build(&self) -> Result<Element>;

    /// Client transaction id sent in the header
    fn client_transaction_id(&self) -> Option<&str> {
        None
    }

    /// Compensating reversal for this operation, keyed by `key`.
    ///
    /// Only authorizations and sales return one.
    fn reversal(&self, _key: ReversalKey) -> Option<CreditReversal> {
        None
    }
}

/// Qualify a name with the `hps` prefix
pub(crate) fn hps(name: &str) -> String {
    format!("hps:{}", name)
}

/// `hps:<name>` holding `text`
pub(crate) fn hps_text(name: &str, text: impl Into<String>) -> Element {
    Element::text(hps(name), text)
}

/// `Y` / `N` flag
pub(crate) fn flag(value: bool) -> &'static str {
    if value {
        "Y"
    } else {
        "N"
    }
}

/// `hps:CardHolderData` from a billing contact. Empty contacts render nothing.
pub(crate) fn card_holder_data(billing: &BillingContact) -> Result<Option<Element>> {
    if billing.is_empty() {
        return Ok(None);
    }

    let text = |value: &Option<String>, field: CardholderField| -> Result<Option<String>> {
        value
            .as_deref()
            .map(|v| codec::check_cardholder_data(v, Some(field)))
            .transpose()
    };

    let first_name = text(&billing.first_name, CardholderField::FirstName)?;
    let last_name = text(&billing.last_name, CardholderField::LastName)?;
    let address = text(&billing.address, CardholderField::Address)?;
    let city = text(&billing.city, CardholderField::City)?;
    let state = text(&billing.state, CardholderField::State)?;
    let zip = billing.postcode.as_deref().map(codec::clean_zip).transpose()?;
    let phone = billing.phone.as_deref().map(codec::clean_phone).transpose()?;
    let email = billing.email.as_deref().map(codec::check_email).transpose()?;

    let element = Element::new(hps("CardHolderData"))
        .opt_text(&hps("CardHolderFirstName"), first_name.as_deref())
        .opt_text(&hps("CardHolderLastName"), last_name.as_deref())
        .opt_text(&hps("CardHolderAddr"), address.as_deref())
        .opt_text(&hps("CardHolderCity"), city.as_deref())
        .opt_text(&hps("CardHolderState"), state.as_deref())
        .opt_text(&hps("CardHolderZip"), zip.as_deref())
        .opt_text(&hps("CardHolderPhone"), phone.as_deref())
        .opt_text(&hps("CardHolderEmail"), email.as_deref());

    Ok(Some(element))
}

/// `hps:CardData` for a manual entry or a stored token
pub(crate) fn card_data(source: &PaymentSource, request_token: bool) -> Element {
    let entry = match source {
        PaymentSource::Card(card) => Element::new(hps("ManualEntry"))
            .child(hps_text("CardNbr", card.normalized_number()))
            .child(hps_text("ExpMonth", card.exp_month.to_string()))
            .child(hps_text("ExpYear", card.exp_year.to_string()))
            .opt_text(&hps("CVV2"), card.cvv.as_deref()),
        PaymentSource::Token(token) => {
            Element::new(hps("TokenData")).child(hps_text("TokenValue", token.trim()))
        }
    };

    Element::new(hps("CardData"))
        .child(entry)
        .child(hps_text("TokenRequest", flag(request_token)))
}
