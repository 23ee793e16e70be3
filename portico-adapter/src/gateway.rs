//! Gateway orchestrator
//!
//! build → resolve → dispatch → parse → classify → (reverse) → result.
//! Each call issues one request and at most one nested reversal, awaited
//! one after the other.

use crate::{
    config::GatewayConfig,
    endpoint,
    metrics::{outcome_label, GATEWAY_REQUESTS_TOTAL, GATEWAY_REQUEST_DURATION},
    payplan::{self, RestOperation},
    portico::{self, CreditReversal, TransactionBuilder},
    reversal::{self, Ambiguity},
    transport::{tls_handshake_message, ConnectionStatus, HttpTransport, ReqwestTransport},
    types::{ProtocolFamily, TransactionType},
    Error, Response, Result,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

enum Dispatched {
    Completed(Response),
    TimedOut,
}

/// Payment gateway client
///
/// Holds read-only configuration and the transport; safe to share.
#[derive(Clone)]
pub struct Gateway {
    config: GatewayConfig,
    transport: Arc<dyn HttpTransport>,
}

impl Gateway {
    /// Gateway over a caller-supplied transport
    pub fn new(config: GatewayConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Gateway with an HTTPS-only reqwest transport using the configured timeout
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    /// Configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Whether the current credentials target a test environment
    pub fn is_test_mode(&self) -> bool {
        self.config
            .credentials()
            .map(|credentials| endpoint::resolve(&credentials, ProtocolFamily::Portico).test_mode)
            .unwrap_or(false)
    }

    /// Send a Portico transaction.
    ///
    /// Declines come back as an unsuccessful [`Response`]. An ambiguous
    /// authorization or sale is reversed and reported as
    /// [`Error::GatewayTimeout`] (or [`Error::ReversalFailed`]).
    pub async fn send(&self, builder: &dyn TransactionBuilder) -> Result<Response> {
        let transaction_type = builder.transaction_type();
        let start = Instant::now();

        let result = self.send_with_recovery(builder).await;

        observe(transaction_type, start, &result);
        result
    }

    /// Send a PayPlan operation
    pub async fn send_rest(&self, operation: &dyn RestOperation) -> Result<Response> {
        let transaction_type = operation.transaction_type();
        let start = Instant::now();

        let result = self
            .dispatch_rest(operation)
            .await
            .map_err(Error::into_dispatch_error);

        observe(transaction_type, start, &result);
        result
    }

    async fn send_with_recovery(&self, builder: &dyn TransactionBuilder) -> Result<Response> {
        match self.dispatch_portico(builder).await {
            Ok(Dispatched::Completed(response)) if response.reversal_required() => {
                match reversal::plan(builder, &Ambiguity::Flagged(&response)) {
                    Some(reversal) => Err(self.reverse(reversal).await),
                    None => Ok(response),
                }
            }
            Ok(Dispatched::Completed(response)) => Ok(response),
            Ok(Dispatched::TimedOut) => match reversal::plan(builder, &Ambiguity::TransportTimeout) {
                Some(reversal) => Err(self.reverse(reversal).await),
                None => Err(Error::GatewayTimeout {
                    transaction_reference: None,
                    reversal_attempted: false,
                }),
            },
            Err(e) => Err(e.into_dispatch_error()),
        }
    }

    /// Send the reversal without recovery of its own
    async fn reverse(&self, reversal: CreditReversal) -> Error {
        let result = match self.dispatch_portico(&reversal).await {
            Ok(Dispatched::Completed(response)) => Ok(response),
            Ok(Dispatched::TimedOut) => Err(Error::GatewayTimeout {
                transaction_reference: Some(reversal.key().as_str().to_string()),
                reversal_attempted: false,
            }),
            Err(e) => Err(e.into_dispatch_error()),
        };
        reversal::conclude(reversal.key(), result)
    }

    async fn dispatch_portico(&self, builder: &dyn TransactionBuilder) -> Result<Dispatched> {
        let transaction_type = builder.transaction_type();
        ensure_protocol(transaction_type, ProtocolFamily::Portico)?;

        let fragment = builder.build()?;
        let credentials = self.config.credentials()?;
        let envelope = portico::envelope::build(
            &self.config,
            &credentials,
            fragment,
            builder.client_transaction_id(),
        )?;
        let target = endpoint::resolve(&credentials, ProtocolFamily::Portico);

        info!("Sending {} to {}", transaction_type, target.url);
        let raw = self
            .transport
            .execute(envelope.into_request(&target.url))
            .await?;

        match raw.connection {
            ConnectionStatus::Completed => {
                debug!("{} answered with status {}", transaction_type, raw.status);
                portico::response::parse(transaction_type, raw.status, raw.body)
                    .map(Dispatched::Completed)
            }
            ConnectionStatus::OperationTimedOut => Ok(Dispatched::TimedOut),
            ConnectionStatus::TlsHandshakeFailed {
                library_version, ..
            } => Err(Error::TlsHandshake(tls_handshake_message(library_version))),
        }
    }

    async fn dispatch_rest(&self, operation: &dyn RestOperation) -> Result<Response> {
        let transaction_type = operation.transaction_type();
        ensure_protocol(transaction_type, ProtocolFamily::PayPlan)?;

        let credentials = self.config.credentials()?;
        let envelope = payplan::request::build(operation, &credentials)?;
        let target = endpoint::resolve(&credentials, ProtocolFamily::PayPlan);

        info!(
            "Sending {} {} {}",
            transaction_type, envelope.method, envelope.path
        );
        let raw = self
            .transport
            .execute(envelope.into_request(&target.url))
            .await?;

        match raw.connection {
            ConnectionStatus::Completed => payplan::response::parse(
                transaction_type,
                operation.reference_key(),
                raw.status,
                raw.body,
            ),
            ConnectionStatus::OperationTimedOut => Err(Error::GatewayTimeout {
                transaction_reference: None,
                reversal_attempted: false,
            }),
            ConnectionStatus::TlsHandshakeFailed {
                library_version, ..
            } => Err(Error::TlsHandshake(tls_handshake_message(library_version))),
        }
    }
}

fn ensure_protocol(transaction_type: TransactionType, expected: ProtocolFamily) -> Result<()> {
    if transaction_type.protocol() != expected {
        return Err(Error::InvalidRequest(format!(
            "{} is not a {} operation",
            transaction_type, expected
        )));
    }
    Ok(())
}

fn observe(transaction_type: TransactionType, start: Instant, result: &Result<Response>) {
    GATEWAY_REQUEST_DURATION
        .with_label_values(&[transaction_type.as_str()])
        .observe(start.elapsed().as_secs_f64());
    GATEWAY_REQUESTS_TOTAL
        .with_label_values(&[transaction_type.as_str(), outcome_label(result)])
        .inc();
}
