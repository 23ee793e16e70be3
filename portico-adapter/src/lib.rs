//! # Portico Adapter
//!
//! Client-side adapter for the Portico payment gateway:
//! - Portico SOAP/XML card and check transactions
//! - PayPlan REST/JSON customers, payment methods and schedules
//! - Credential-driven endpoint selection (cert / UAT / production)
//! - Automatic single reversal of ambiguous authorizations and sales
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Gateway (Orchestrator)                   │
//! └────────────┬────────────────────────────┬───────────┘
//!              │                            │
//!     ┌────────▼─────────┐        ┌─────────▼────────┐
//!     │ Portico builders │        │ PayPlan operations│
//!     │  SOAP envelope   │        │  JSON + headers   │
//!     └────────┬─────────┘        └─────────┬────────┘
//!              │                            │
//! ┌────────────▼────────────────────────────▼────────┐
//! │     Endpoint resolver + HTTP transport (TLS)     │
//! └────────────┬────────────────────────────┬────────┘
//!              │                            │
//!     ┌────────▼─────────┐        ┌─────────▼────────┐
//!     │ SOAP parser +    │        │ JSON parser      │
//!     │ classifier       │        │                  │
//!     └────────┬─────────┘        └──────────────────┘
//!              │
//! ┌────────────▼─────────────────────────────────────┐
//! │            Reversal recovery                     │
//! └──────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod card;
pub mod classifier;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod payplan;
pub mod portico;
pub mod response;
pub mod reversal;
pub mod transport;
pub mod types;
pub mod xml;

pub use config::{Credentials, GatewayConfig};
pub use error::{Error, Result};
pub use gateway::Gateway;
pub use payplan::RestOperation;
pub use portico::TransactionBuilder;
pub use response::{CheckRejection, Failure, Response};
pub use transport::{ConnectionStatus, HttpRequest, HttpTransport, RawResponse, ReqwestTransport};
pub use types::{Environment, HttpMethod, ProtocolFamily, TransactionType};

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 100;
