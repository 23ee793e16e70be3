//! Reversal recovery
//!
//! When the outcome of an authorization or sale is ambiguous (the transport
//! timed out, or the gateway / issuer reported a timeout) the charge is
//! reversed once and the original call is reported as a gateway timeout.

use crate::{
    metrics::REVERSALS_TOTAL,
    portico::{CreditReversal, ReversalKey, TransactionBuilder},
    Error, Response, Result,
};
use tracing::{error, info, warn};

/// Why an outcome is ambiguous
#[derive(Debug, Clone, Copy)]
pub enum Ambiguity<'a> {
    /// No response arrived before the timeout
    TransportTimeout,
    /// The parsed response asks for a reversal
    Flagged(&'a Response),
}

/// Identifier to reverse by, if the operation is reversible and one is known.
///
/// A transport timeout never yields a gateway transaction id, so the client
/// transaction id is used instead.
pub fn reversal_key(builder: &dyn TransactionBuilder, ambiguity: &Ambiguity<'_>) -> Option<ReversalKey> {
    if !builder.transaction_type().is_reversible() {
        return None;
    }

    match ambiguity {
        Ambiguity::TransportTimeout => builder
            .client_transaction_id()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| ReversalKey::ClientTxnId(id.to_string())),
        Ambiguity::Flagged(response) => response
            .transaction_reference()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| ReversalKey::GatewayTxnId(id.to_string())),
    }
}

/// The compensating reversal for an ambiguous outcome, if one applies
pub fn plan(builder: &dyn TransactionBuilder, ambiguity: &Ambiguity<'_>) -> Option<CreditReversal> {
    let key = reversal_key(builder, ambiguity)?;
    warn!(
        "{} outcome ambiguous ({}), reversing {}",
        builder.transaction_type(),
        ambiguity_label(ambiguity),
        key.as_str()
    );
    builder.reversal(key)
}

fn ambiguity_label(ambiguity: &Ambiguity<'_>) -> &'static str {
    match ambiguity {
        Ambiguity::TransportTimeout => "transport timeout",
        Ambiguity::Flagged(_) => "gateway timeout",
    }
}

/// Error reported for the original call once its reversal has run.
///
/// Whatever the reversal's own result, the original call failed with a
/// gateway timeout; only an error from the reversal escalates it.
pub fn conclude(key: &ReversalKey, result: Result<Response>) -> Error {
    match result {
        Ok(response) => {
            if response.is_successful() {
                info!("Reversal of {} accepted", key.as_str());
            } else {
                warn!(
                    "Reversal of {} declined: {}",
                    key.as_str(),
                    response.message().unwrap_or_default()
                );
            }
            REVERSALS_TOTAL.with_label_values(&["completed"]).inc();
            Error::GatewayTimeout {
                transaction_reference: Some(key.as_str().to_string()),
                reversal_attempted: true,
            }
        }
        Err(e) => {
            error!("Reversal of {} failed: {}", key.as_str(), e);
            REVERSALS_TOTAL.with_label_values(&["failed"]).inc();
            Error::ReversalFailed {
                transaction_reference: key.as_str().to_string(),
                reason: e.to_string(),
            }
        }
    }
}
