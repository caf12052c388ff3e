// # Cloudflare DNS Provider Client
//
// `DnsProviderClient` implementation against the Cloudflare API v4.
//
// This client is a thin transport: one HTTP request per call, full error
// propagation, no retries, no caching. Scheduling and failure isolation
// are owned by the poll loop.
//
// ## Security
//
// - The API token never appears in logs or `Debug` output
// - The client fails fast at construction if the token is empty
//
// ## API Reference
//
// - List DNS records: GET `/zones/:zone_id/dns_records?type=A`
// - Update DNS record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_sync_core::traits::{DnsProviderClient, RecordUpdate, RemoteRecord};
use ddns_sync_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Timeout for API requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

impl<T> Envelope<T> {
    /// Unwrap the payload of a successful envelope
    fn into_result(self, context: &str) -> Result<T> {
        if !self.success {
            let detail = self
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::provider(
                "cloudflare",
                format!("{context}: API reported failure: {detail}"),
            ));
        }
        self.result.ok_or_else(|| {
            Error::provider("cloudflare", format!("{context}: response has no result"))
        })
    }
}

/// Cloudflare API client for one zone-scoped token
pub struct CloudflareClient {
    /// API token with Zone:DNS:Edit permission. Never logged.
    api_token: String,

    /// API base URL; overridable for tests
    base_url: String,

    /// HTTP client with timeout and TLS settings applied
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a new client
    ///
    /// `verify_tls` controls certificate validation; it is on by default
    /// at the config layer and disabling it is an explicit opt-in.
    pub fn new(api_token: impl Into<String>, verify_tls: bool) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_token,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at a different base URL (for tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Map a non-2xx status to a provider error with useful context
    fn status_error(status: reqwest::StatusCode, body: &str, context: &str) -> Error {
        match status.as_u16() {
            401 | 403 => Error::provider(
                "cloudflare",
                format!(
                    "{context}: authentication failed, invalid token or missing permission ({status})"
                ),
            ),
            404 => Error::provider("cloudflare", format!("{context}: not found ({status})")),
            429 => Error::provider(
                "cloudflare",
                format!("{context}: rate limit exceeded ({status})"),
            ),
            500..=599 => Error::provider(
                "cloudflare",
                format!("{context}: server error (transient): {status} - {body}"),
            ),
            _ => Error::provider("cloudflare", format!("{context}: {status} - {body}")),
        }
    }

    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error response".to_string());
            return Err(Self::status_error(status, &body, context));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            Error::provider("cloudflare", format!("{context}: failed to parse response: {e}"))
        })?;
        envelope.into_result(context)
    }
}

#[async_trait]
impl DnsProviderClient for CloudflareClient {
    async fn list_a_records(&self, zone_id: &str) -> Result<Vec<RemoteRecord>> {
        let url = format!("{}/zones/{}/dns_records?type=A", self.base_url, zone_id);
        debug!("listing A records for zone {}", zone_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {e}")))?;

        let records: Vec<RemoteRecord> =
            Self::read_envelope(response, "list A records").await?;
        debug!("zone {} has {} A record(s)", zone_id, records.len());
        Ok(records)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        let url = format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, zone_id, record_id
        );
        debug!("updating record {} to {}", update.name, update.content);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .json(update)
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {e}")))?;

        let _: serde_json::Value = Self::read_envelope(response, "update record").await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, CloudflareClient) {
        let server = MockServer::start().await;
        let client = CloudflareClient::new("test-token", true)
            .unwrap()
            .with_base_url(server.uri());
        (server, client)
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(CloudflareClient::new("", true).is_err());
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let client = CloudflareClient::new("secret-token-12345", true).unwrap();
        let debug_str = format!("{client:?}");
        assert!(!debug_str.contains("secret-token-12345"));
        assert!(debug_str.contains("REDACTED"));
    }

    #[tokio::test]
    async fn list_a_records_parses_the_envelope() {
        let (server, client) = setup().await;

        let body = json!({
            "success": true,
            "errors": [],
            "result": [
                {"id": "r1", "name": "a.example.com", "content": "1.1.1.1", "ttl": 300, "proxied": false},
                {"id": "r2", "name": "b.example.com", "content": "2.2.2.2", "ttl": 1, "proxied": true},
            ]
        });

        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .and(query_param("type", "A"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let records = client.list_a_records("z1").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "r1");
        assert_eq!(records[0].content, "1.1.1.1");
        assert!(records[1].proxied);
    }

    #[tokio::test]
    async fn auth_failure_maps_to_a_provider_error() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client.list_a_records("z1").await.unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
    }

    #[tokio::test]
    async fn envelope_failure_is_an_error_even_with_status_200() {
        let (server, client) = setup().await;

        let body = json!({
            "success": false,
            "errors": [{"code": 10000, "message": "Authentication error"}],
            "result": null
        });

        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let err = client.list_a_records("z1").await.unwrap_err();
        assert!(err.to_string().contains("Authentication error"));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/zones/z1/dns_records"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client.list_a_records("z1").await.unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[tokio::test]
    async fn update_record_sends_the_full_payload() {
        let (server, client) = setup().await;

        let update = RecordUpdate {
            record_type: "A".to_string(),
            name: "a.example.com".to_string(),
            content: "9.9.9.9".to_string(),
            ttl: 120,
            proxied: true,
        };

        let expected = json!({
            "type": "A",
            "name": "a.example.com",
            "content": "9.9.9.9",
            "ttl": 120,
            "proxied": true
        });

        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r1"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(&expected))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "errors": [],
                "result": {"id": "r1"}
            })))
            .mount(&server)
            .await;

        client.update_record("z1", "r1", &update).await.unwrap();
    }

    #[tokio::test]
    async fn update_record_surfaces_rate_limiting() {
        let (server, client) = setup().await;

        let update = RecordUpdate {
            record_type: "A".to_string(),
            name: "a.example.com".to_string(),
            content: "9.9.9.9".to_string(),
            ttl: 300,
            proxied: false,
        };

        Mock::given(method("PUT"))
            .and(path("/zones/z1/dns_records/r1"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = client.update_record("z1", "r1", &update).await.unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }
}
