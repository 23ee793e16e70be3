//! REST request builder

use super::{Page, RestOperation};
use crate::{
    config::Credentials,
    transport::HttpRequest,
    types::HttpMethod,
    Result,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

/// Legacy identity header
pub const IDENTITY_HEADER: &str = "HPS-Identity";

/// Request content type
pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

// Compared after lower-casing and removing underscores, so both `siteId` and
// `site_id` are caught.
const RESERVED_KEYS: &[&str] = &[
    "http",
    "limit",
    "offset",
    "secretapikey",
    "siteid",
    "deviceid",
    "licenseid",
    "username",
    "password",
    "serviceuri",
    "developerid",
    "versionnumber",
    "sitetrace",
    "timeoutseconds",
];

/// Built REST request, before the base URL is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestEnvelope {
    /// Verb
    pub method: HttpMethod,
    /// Path and query relative to the base URL
    pub path: String,
    /// Headers
    pub headers: Vec<(String, String)>,
    /// JSON body (`None` for GET)
    pub body: Option<String>,
}

impl RestEnvelope {
    /// Request against `base_url`
    pub fn into_request(self, base_url: &str) -> HttpRequest {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        );
        HttpRequest::new(self.method, url, self.headers, self.body)
    }
}

/// True for framework or configuration keys that must never be sent
pub fn is_reserved(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    RESERVED_KEYS.contains(&normalized.as_str())
}

/// Keep only allow-listed, non-reserved fields with a value
pub fn business_fields(fields: Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    fields
        .into_iter()
        .filter(|(k, v)| !v.is_null() && allowed.contains(&k.as_str()) && !is_reserved(k))
        .collect()
}

/// Serialize business fields; an empty set is `{}`
pub fn serialize_body(fields: &Map<String, Value>) -> Result<String> {
    Ok(serde_json::to_string(fields)?)
}

/// `Authorization` header value
pub fn authorization(credentials: &Credentials) -> String {
    let secret = match credentials {
        Credentials::SecretKey(key) => key.clone(),
        Credentials::Legacy {
            username, password, ..
        } => format!("{}:{}", username, password),
    };
    format!("Basic {}", STANDARD.encode(secret))
}

/// Identity header value in legacy mode, listing only non-empty ids
pub fn identity(credentials: &Credentials) -> Option<String> {
    match credentials {
        Credentials::SecretKey(_) => None,
        Credentials::Legacy {
            site_id,
            device_id,
            license_id,
            ..
        } => {
            let parts: Vec<String> = [
                ("SiteID", site_id),
                ("DeviceID", device_id),
                ("LicenseID", license_id),
            ]
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
            Some(parts.join(","))
        }
    }
}

/// `limit=..&offset=..` when both are present
pub fn query_string(page: Page) -> Option<String> {
    match (page.limit, page.offset) {
        (Some(limit), Some(offset)) => Some(format!("limit={}&offset={}", limit, offset)),
        _ => None,
    }
}

/// Build the request for `operation`
pub fn build(operation: &dyn RestOperation, credentials: &Credentials) -> Result<RestEnvelope> {
    let method = operation.method();

    let mut path = operation.path();
    if let Some(query) = query_string(operation.page()) {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&query);
    }

    let mut headers = vec![
        ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
        ("Authorization".to_string(), authorization(credentials)),
    ];
    if let Some(identity) = identity(credentials) {
        headers.push((IDENTITY_HEADER.to_string(), identity));
    }

    let body = match method {
        HttpMethod::Get => None,
        _ => {
            let fields = business_fields(operation.fields()?, operation.allowed_fields());
            Some(serialize_body(&fields)?)
        }
    };

    Ok(RestEnvelope {
        method,
        path,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;
    use serde_json::json;

    fn legacy(site_id: &str) -> Credentials {
        Credentials::Legacy {
            site_id: site_id.to_string(),
            device_id: "2".to_string(),
            license_id: "3".to_string(),
            username: "user".to_string(),
            password: "pass".to_string(),
            service_uri: "https://example.test/payplan/".to_string(),
        }
    }

    struct Probe {
        method: HttpMethod,
        fields: Value,
        page: Page,
    }

    impl RestOperation for Probe {
        fn transaction_type(&self) -> TransactionType {
            TransactionType::PayPlanCustomerSearch
        }

        fn method(&self) -> HttpMethod {
            self.method
        }

        fn path(&self) -> String {
            "searchCustomers".to_string()
        }

        fn allowed_fields(&self) -> &'static [&'static str] {
            &["firstName", "limit", "siteId"]
        }

        fn fields(&self) -> Result<Map<String, Value>> {
            Ok(self.fields.as_object().cloned().unwrap_or_default())
        }

        fn page(&self) -> Page {
            self.page
        }
    }

    #[test]
    fn test_empty_body_is_object() {
        let probe = Probe {
            method: HttpMethod::Post,
            fields: json!({}),
            page: Page::default(),
        };
        let envelope = build(&probe, &Credentials::SecretKey("k".to_string())).unwrap();
        assert_eq!(envelope.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_filters_reserved_and_unlisted_fields() {
        let probe = Probe {
            method: HttpMethod::Post,
            fields: json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "limit": 5,
                "siteId": "1",
                "http": {},
            }),
            page: Page::default(),
        };
        let envelope = build(&probe, &Credentials::SecretKey("k".to_string())).unwrap();
        let body: Value = serde_json::from_str(envelope.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"firstName": "Jane"}));
    }

    #[test]
    fn test_get_has_no_body() {
        let probe = Probe {
            method: HttpMethod::Get,
            fields: json!({"firstName": "Jane"}),
            page: Page::default(),
        };
        let envelope = build(&probe, &Credentials::SecretKey("k".to_string())).unwrap();
        assert!(envelope.body.is_none());
    }

    #[test]
    fn test_pagination_needs_both_values() {
        let mut probe = Probe {
            method: HttpMethod::Post,
            fields: json!({}),
            page: Page::new(10, 20),
        };
        let creds = Credentials::SecretKey("k".to_string());
        assert_eq!(
            build(&probe, &creds).unwrap().path,
            "searchCustomers?limit=10&offset=20"
        );

        probe.page = Page {
            limit: Some(10),
            offset: None,
        };
        assert_eq!(build(&probe, &creds).unwrap().path, "searchCustomers");
    }

    #[test]
    fn test_secret_key_auth() {
        let creds = Credentials::SecretKey("skapi_cert_abc".to_string());
        assert_eq!(
            authorization(&creds),
            format!("Basic {}", STANDARD.encode("skapi_cert_abc"))
        );
        assert!(identity(&creds).is_none());
    }

    #[test]
    fn test_legacy_auth_and_identity() {
        let creds = legacy("1");
        assert_eq!(authorization(&creds), "Basic dXNlcjpwYXNz");
        assert_eq!(
            identity(&creds).as_deref(),
            Some("SiteID=1,DeviceID=2,LicenseID=3")
        );
    }

    #[test]
    fn test_identity_emitted_in_legacy_mode_even_without_site_id() {
        let probe = Probe {
            method: HttpMethod::Get,
            fields: json!({}),
            page: Page::default(),
        };
        let envelope = build(&probe, &legacy("")).unwrap();
        let header = envelope
            .headers
            .iter()
            .find(|(k, _)| k == IDENTITY_HEADER)
            .map(|(_, v)| v.as_str());
        assert_eq!(header, Some("DeviceID=2,LicenseID=3"));
    }

    #[test]
    fn test_reserved_key_forms() {
        assert!(is_reserved("site_id"));
        assert!(is_reserved("SiteId"));
        assert!(is_reserved("secretApiKey"));
        assert!(!is_reserved("customerKey"));
    }

    #[test]
    fn test_url_join() {
        let envelope = RestEnvelope {
            method: HttpMethod::Get,
            path: "customers/1".to_string(),
            headers: vec![],
            body: None,
        };
        let request = envelope.into_request("https://api.example.test/payplan.v2/");
        assert_eq!(request.url, "https://api.example.test/payplan.v2/customers/1");
    }
}
