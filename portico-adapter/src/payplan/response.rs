//! JSON response parser

use crate::{
    response::{Failure, Response},
    types::{ProtocolFamily, TransactionType},
    Error, Result,
};
use serde_json::{Map, Value};
use tracing::warn;

/// Message when no better one is available
pub const UNEXPECTED_RESPONSE: &str = "Unexpected response";

/// Parse a PayPlan reply.
///
/// `reference_key` names the response field holding the resource key.
pub fn parse(
    transaction_type: TransactionType,
    reference_key: Option<&str>,
    status: u16,
    body: String,
) -> Result<Response> {
    let mut response = Response::new(ProtocolFamily::PayPlan, transaction_type, status, body);

    match status {
        200 | 201 | 204 => {
            let data = parse_object(&response.body).ok_or_else(|| {
                Error::InvalidRequest(format!(
                    "Malformed JSON in {} response",
                    transaction_type
                ))
            })?;
            response.transaction_reference = reference_key
                .and_then(|key| data.get(key))
                .and_then(scalar_string);
            response.data = data;
            response.successful = true;
        }
        400..=499 => {
            let data = parse_object(&response.body).unwrap_or_default();
            let message = error_message(&data).unwrap_or_else(|| UNEXPECTED_RESPONSE.to_string());
            let code = data
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(scalar_string)
                .unwrap_or_else(|| status.to_string());
            warn!("{} rejected: status={} code={}", transaction_type, status, code);
            response.data = data;
            response.fail(Failure::Rejected, code, message);
        }
        500 => {
            let data = parse_object(&response.body).unwrap_or_default();
            let message = error_message(&data).unwrap_or_else(|| UNEXPECTED_RESPONSE.to_string());
            warn!("{} failed on the server: {}", transaction_type, message);
            response.data = data;
            response.fail(Failure::UnexpectedResponse, "500", message);
        }
        other => {
            warn!("{} returned unexpected status {}", transaction_type, other);
            response.fail(
                Failure::UnexpectedResponse,
                other.to_string(),
                UNEXPECTED_RESPONSE,
            );
        }
    }

    Ok(response)
}

/// Body as a JSON object; an empty body is an empty object
fn parse_object(body: &str) -> Option<Map<String, Value>> {
    if body.trim().is_empty() {
        return Some(Map::new());
    }
    match serde_json::from_str(body).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn error_message(data: &Map<String, Value>) -> Option<String> {
    data.get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| data.get("message"))
        .and_then(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
