//! Gateway and issuer response-code classification
//!
//! Two static, read-only tables. Gateway codes describe whether Portico
//! accepted the request; issuer codes describe whether the card-issuing bank
//! approved the financial transaction.

use serde::{Deserialize, Serialize};

/// Gateway code that means "no response from issuer"
pub const GATEWAY_TIMEOUT_CODE: &str = "30";

/// Issuer code that means "issuer timed out"
pub const ISSUER_TIMEOUT_CODE: &str = "91";

/// Gateway-level error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayErrorKind {
    /// Credentials rejected
    AuthenticationError,
    /// Referenced transaction cannot be acted on
    InvalidOriginalTransaction,
    /// No batch open for capture
    NoOpenBatch,
    /// Purchase-card (CPC) data rejected
    InvalidCpcData,
    /// Card data or token rejected
    InvalidCardData,
    /// Card number rejected
    InvalidCardNumber,
    /// Issuer did not answer in time
    GatewayTimeout,
    /// Anything else
    UnknownGatewayError,
}

/// Classified gateway code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayClassification {
    /// Kind
    pub kind: GatewayErrorKind,
    /// Message to surface
    pub message: String,
}

/// Issuer-level error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuerErrorKind {
    /// Declined by issuer
    CardDeclined,
    /// Issuer could not process the card
    ProcessingError,
    /// Amount rejected
    InvalidAmount,
    /// Card number rejected by issuer
    IncorrectNumber,
    /// Card expired
    ExpiredCard,
    /// PIN invalid
    InvalidPin,
    /// Too many PIN attempts
    PinEntriesExceeded,
    /// Expiry rejected
    InvalidExpiry,
    /// PIN could not be verified
    PinVerification,
    /// Issuer timed out
    IssuerTimeout,
    /// Security code mismatch
    IncorrectCvc,
    /// Fraud suspected
    PossibleFraudDetected,
    /// Anything else
    UnknownIssuerError,
}

impl IssuerErrorKind {
    /// Canonical message
    pub fn message(&self) -> &'static str {
        match self {
            IssuerErrorKind::CardDeclined => "The card was declined.",
            IssuerErrorKind::ProcessingError => "An error occurred while processing the card.",
            IssuerErrorKind::InvalidAmount => "Must be greater than or equal 0.",
            IssuerErrorKind::IncorrectNumber => "The card number is incorrect.",
            IssuerErrorKind::ExpiredCard => "The card has expired.",
            IssuerErrorKind::InvalidPin => "The 4-digit pin is invalid.",
            IssuerErrorKind::PinEntriesExceeded => "Maximum number of pin retries exceeded.",
            IssuerErrorKind::InvalidExpiry => "Card expiration date is invalid.",
            IssuerErrorKind::PinVerification => "Can't verify card pin number.",
            IssuerErrorKind::IssuerTimeout => "The card issuer timed-out.",
            IssuerErrorKind::IncorrectCvc => "The card's security code is incorrect.",
            IssuerErrorKind::PossibleFraudDetected => "Possible fraud detected.",
            IssuerErrorKind::UnknownIssuerError => "An unknown issuer error has occurred.",
        }
    }
}

/// Issuer codes that mean approval (full, partial, or verification)
pub const ISSUER_SUCCESS_CODES: &[&str] = &["00", "0", "10", "85"];

const ISSUER_TABLE: &[(&str, IssuerErrorKind)] = &[
    ("02", IssuerErrorKind::CardDeclined),
    ("03", IssuerErrorKind::CardDeclined),
    ("04", IssuerErrorKind::CardDeclined),
    ("05", IssuerErrorKind::CardDeclined),
    ("41", IssuerErrorKind::CardDeclined),
    ("43", IssuerErrorKind::CardDeclined),
    ("44", IssuerErrorKind::CardDeclined),
    ("51", IssuerErrorKind::CardDeclined),
    ("56", IssuerErrorKind::CardDeclined),
    ("61", IssuerErrorKind::CardDeclined),
    ("62", IssuerErrorKind::CardDeclined),
    ("63", IssuerErrorKind::CardDeclined),
    ("65", IssuerErrorKind::CardDeclined),
    ("78", IssuerErrorKind::CardDeclined),
    ("06", IssuerErrorKind::ProcessingError),
    ("07", IssuerErrorKind::ProcessingError),
    ("12", IssuerErrorKind::ProcessingError),
    ("15", IssuerErrorKind::ProcessingError),
    ("19", IssuerErrorKind::ProcessingError),
    ("52", IssuerErrorKind::ProcessingError),
    ("53", IssuerErrorKind::ProcessingError),
    ("57", IssuerErrorKind::ProcessingError),
    ("58", IssuerErrorKind::ProcessingError),
    ("76", IssuerErrorKind::ProcessingError),
    ("77", IssuerErrorKind::ProcessingError),
    ("96", IssuerErrorKind::ProcessingError),
    ("EC", IssuerErrorKind::ProcessingError),
    ("13", IssuerErrorKind::InvalidAmount),
    ("14", IssuerErrorKind::IncorrectNumber),
    ("89", IssuerErrorKind::IncorrectNumber),
    ("54", IssuerErrorKind::ExpiredCard),
    ("55", IssuerErrorKind::InvalidPin),
    ("75", IssuerErrorKind::PinEntriesExceeded),
    ("80", IssuerErrorKind::InvalidExpiry),
    ("86", IssuerErrorKind::PinVerification),
    ("91", IssuerErrorKind::IssuerTimeout),
    ("EB", IssuerErrorKind::IncorrectCvc),
    ("N7", IssuerErrorKind::IncorrectCvc),
    ("FR", IssuerErrorKind::PossibleFraudDetected),
];

/// Classify a gateway response code.
///
/// Returns `None` for `0`. Codes whose canonical message is the processor's
/// own text (unknown, invalid original transaction, no open batch) echo
/// `processor_message`.
pub fn classify_gateway(code: &str, processor_message: &str) -> Option<GatewayClassification> {
    let (kind, message) = match code.trim() {
        "0" => return None,
        "-2" => (
            GatewayErrorKind::AuthenticationError,
            "Authentication error. Please double check your service configuration.",
        ),
        "3" => (GatewayErrorKind::InvalidOriginalTransaction, processor_message),
        "5" => (GatewayErrorKind::NoOpenBatch, processor_message),
        "12" => (GatewayErrorKind::InvalidCpcData, "Invalid CPC data"),
        "13" | "26" | "27" | "34" => (GatewayErrorKind::InvalidCardData, "Invalid card data"),
        "14" => (
            GatewayErrorKind::InvalidCardNumber,
            "The card number is not valid",
        ),
        "30" => (GatewayErrorKind::GatewayTimeout, "Gateway timed out"),
        _ => (GatewayErrorKind::UnknownGatewayError, processor_message),
    };

    Some(GatewayClassification {
        kind,
        message: message.to_string(),
    })
}

/// Whether a gateway code mandates an automatic reversal
pub fn gateway_requires_reversal(code: &str) -> bool {
    code.trim() == GATEWAY_TIMEOUT_CODE
}

/// Whether an issuer code means approval
pub fn is_issuer_success(code: &str) -> bool {
    ISSUER_SUCCESS_CODES.contains(&code.trim())
}

/// Classify an issuer response code. Returns `None` for approvals.
pub fn classify_issuer(code: &str) -> Option<IssuerErrorKind> {
    let code = code.trim();
    if is_issuer_success(code) {
        return None;
    }

    let kind = ISSUER_TABLE
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, kind)| *kind)
        .unwrap_or(IssuerErrorKind::UnknownIssuerError);
    Some(kind)
}

/// Whether an issuer code mandates an automatic reversal
pub fn issuer_requires_reversal(code: &str) -> bool {
    code.trim() == ISSUER_TIMEOUT_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gw(code: &str) -> GatewayClassification {
        classify_gateway(code, "processor text").unwrap()
    }

    #[test]
    fn test_gateway_success() {
        assert_eq!(classify_gateway("0", "Success"), None);
        assert!(!gateway_requires_reversal("0"));
    }

    #[test]
    fn test_gateway_documented_codes() {
        assert_eq!(gw("-2").kind, GatewayErrorKind::AuthenticationError);
        assert_eq!(
            gw("-2").message,
            "Authentication error. Please double check your service configuration."
        );

        assert_eq!(gw("3").kind, GatewayErrorKind::InvalidOriginalTransaction);
        assert_eq!(gw("3").message, "processor text");

        assert_eq!(gw("5").kind, GatewayErrorKind::NoOpenBatch);
        assert_eq!(gw("5").message, "processor text");

        assert_eq!(gw("12").kind, GatewayErrorKind::InvalidCpcData);
        assert_eq!(gw("12").message, "Invalid CPC data");

        for code in ["13", "26", "27", "34"] {
            assert_eq!(gw(code).kind, GatewayErrorKind::InvalidCardData, "code {}", code);
            assert_eq!(gw(code).message, "Invalid card data");
        }

        assert_eq!(gw("14").kind, GatewayErrorKind::InvalidCardNumber);
        assert_eq!(gw("14").message, "The card number is not valid");

        assert_eq!(gw("30").kind, GatewayErrorKind::GatewayTimeout);
        assert_eq!(gw("30").message, "Gateway timed out");
    }

    #[test]
    fn test_gateway_unknown_echoes_processor_text() {
        for code in ["1", "-1", "99", "abc"] {
            let c = gw(code);
            assert_eq!(c.kind, GatewayErrorKind::UnknownGatewayError);
            assert_eq!(c.message, "processor text");
        }
    }

    #[test]
    fn test_gateway_reversal_predicate() {
        assert!(gateway_requires_reversal("30"));
        for code in ["0", "-2", "1", "3", "5", "12", "13", "14", "26", "27", "34"] {
            assert!(!gateway_requires_reversal(code), "code {}", code);
        }
    }

    #[test]
    fn test_issuer_success_codes() {
        for code in ["00", "0", "10", "85"] {
            assert_eq!(classify_issuer(code), None, "code {}", code);
        }
    }

    #[test]
    fn test_issuer_table_exhaustive() {
        for (code, kind) in ISSUER_TABLE {
            assert_eq!(classify_issuer(code), Some(*kind), "code {}", code);
        }
        assert_eq!(classify_issuer("05"), Some(IssuerErrorKind::CardDeclined));
        assert_eq!(classify_issuer("12"), Some(IssuerErrorKind::ProcessingError));
        assert_eq!(classify_issuer("13"), Some(IssuerErrorKind::InvalidAmount));
        assert_eq!(classify_issuer("89"), Some(IssuerErrorKind::IncorrectNumber));
        assert_eq!(classify_issuer("54"), Some(IssuerErrorKind::ExpiredCard));
        assert_eq!(classify_issuer("55"), Some(IssuerErrorKind::InvalidPin));
        assert_eq!(classify_issuer("75"), Some(IssuerErrorKind::PinEntriesExceeded));
        assert_eq!(classify_issuer("80"), Some(IssuerErrorKind::InvalidExpiry));
        assert_eq!(classify_issuer("86"), Some(IssuerErrorKind::PinVerification));
        assert_eq!(classify_issuer("91"), Some(IssuerErrorKind::IssuerTimeout));
        assert_eq!(classify_issuer("n7"), Some(IssuerErrorKind::IncorrectCvc));
        assert_eq!(classify_issuer("FR"), Some(IssuerErrorKind::PossibleFraudDetected));
    }

    #[test]
    fn test_issuer_unknown() {
        assert_eq!(classify_issuer("R1"), Some(IssuerErrorKind::UnknownIssuerError));
        assert_eq!(
            IssuerErrorKind::UnknownIssuerError.message(),
            "An unknown issuer error has occurred."
        );
    }

    #[test]
    fn test_issuer_reversal_predicate_is_distinct() {
        assert!(issuer_requires_reversal("91"));
        assert!(!issuer_requires_reversal("30"));
        assert!(!gateway_requires_reversal("91"));
    }
}
