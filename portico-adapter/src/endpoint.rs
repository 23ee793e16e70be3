//! Credential & endpoint resolution
//!
//! The secret key carries an environment marker; legacy credentials carry an
//! explicit service URI. Resolution is recomputed on every call.

use crate::{
    config::Credentials,
    types::{Environment, ProtocolFamily},
};
use tracing::debug;

/// Secret-key marker selecting the certification sandbox
pub const CERT_MARKER: &str = "_cert_";

/// Secret-key marker selecting user acceptance testing
pub const UAT_MARKER: &str = "_uat_";

/// Portico certification endpoint
pub const PORTICO_CERT_URL: &str =
    "https://cert.api2.heartlandportico.com/Hps.Exchange.PosGateway/PosGatewayService.asmx";
/// Portico UAT endpoint
pub const PORTICO_UAT_URL: &str =
    "https://posgateway.uat.secureexchange.net/Hps.Exchange.PosGateway/PosGatewayService.asmx";
/// Portico production endpoint
pub const PORTICO_PROD_URL: &str =
    "https://api2.heartlandportico.com/Hps.Exchange.PosGateway/PosGatewayService.asmx";

/// PayPlan certification base URL
pub const PAYPLAN_CERT_URL: &str = "https://cert.api2.heartlandportico.com/Portico.PayPlan.v2/";
/// PayPlan UAT base URL
pub const PAYPLAN_UAT_URL: &str = "https://api-uat.heartlandportico.com/payplan.v2/";
/// PayPlan production base URL
pub const PAYPLAN_PROD_URL: &str = "https://api.heartlandportico.com/payplan.v2/";

/// Resolved target for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Base URL
    pub url: String,
    /// Environment the URL belongs to
    pub environment: Environment,
    /// Test mode, consistent with the environment
    pub test_mode: bool,
}

/// Classify a secret key by its embedded marker
pub fn environment_for_key(secret_api_key: &str) -> Environment {
    if secret_api_key.contains(CERT_MARKER) {
        Environment::Certification
    } else if secret_api_key.contains(UAT_MARKER) {
        Environment::UserAcceptance
    } else {
        Environment::Production
    }
}

/// Fixed base URL for a protocol family in an environment.
/// `None` for [`Environment::Custom`], which has no fixed URL.
pub fn base_url(protocol: ProtocolFamily, environment: Environment) -> Option<&'static str> {
    let url = match (protocol, environment) {
        (ProtocolFamily::Portico, Environment::Certification) => PORTICO_CERT_URL,
        (ProtocolFamily::Portico, Environment::UserAcceptance) => PORTICO_UAT_URL,
        (ProtocolFamily::Portico, Environment::Production) => PORTICO_PROD_URL,
        (ProtocolFamily::PayPlan, Environment::Certification) => PAYPLAN_CERT_URL,
        (ProtocolFamily::PayPlan, Environment::UserAcceptance) => PAYPLAN_UAT_URL,
        (ProtocolFamily::PayPlan, Environment::Production) => PAYPLAN_PROD_URL,
        (_, Environment::Custom) => return None,
    };
    Some(url)
}

/// Resolve the target URL for `protocol` under `credentials`
pub fn resolve(credentials: &Credentials, protocol: ProtocolFamily) -> ResolvedEndpoint {
    let resolved = match credentials {
        Credentials::SecretKey(key) => {
            let environment = environment_for_key(key);
            ResolvedEndpoint {
                url: base_url(protocol, environment)
                    .unwrap_or(PORTICO_PROD_URL)
                    .to_string(),
                environment,
                test_mode: environment.is_test(),
            }
        }
        Credentials::Legacy { service_uri, .. } => ResolvedEndpoint {
            url: service_uri.clone(),
            environment: Environment::Custom,
            test_mode: false,
        },
    };

    debug!(
        "Resolved {} endpoint {} ({:?})",
        protocol, resolved.url, resolved.environment
    );
    resolved
}
