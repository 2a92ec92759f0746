// # OVH DNS Zone API
//
// This crate provides the OVH implementation of `ZoneApi` for ons.
//
// ## Behaviour
//
// - One HTTP request per trait call
// - Full error propagation to the reconciler (no retry, no backoff)
// - HTTP timeout configured (30 seconds)
// - Specific error messages for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Requests signed with the application secret and consumer key
//
// ## Clock Skew
//
// OVH rejects signatures whose timestamp drifts from its own clock. The
// delta between the server clock (`GET /auth/time`, unauthenticated) and
// the local clock is measured on the first signed call and reused for
// the lifetime of the client.
//
// ## Security Requirements
//
// - Application secret and consumer key NEVER appear in logs
// - Credentials MUST be provided via environment variables only
// - Construction fails fast if a credential is empty
//
// ## API Reference
//
// - List records: GET `/domain/zone/{zone}/record?fieldType=A`
// - Get record: GET `/domain/zone/{zone}/record/{id}`
// - Create record: POST `/domain/zone/{zone}/record`
// - Delete record: DELETE `/domain/zone/{zone}/record/{id}`
// - Publish: POST `/domain/zone/{zone}/refresh`

pub mod endpoint;
pub mod signature;

use async_trait::async_trait;
use ons_core::config::ProviderConfig;
use ons_core::record::{FIELD_TYPE_A, Record, RecordId};
use ons_core::traits::ZoneApi;
use ons_core::{Error, Result};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;

pub use endpoint::resolve_endpoint;

/// Provider name used in errors and logs
const PROVIDER: &str = "ovh";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// OVH zone API client
///
/// Stateless apart from the measured clock delta. All coordination
/// (batching, publishing, persistence) is owned by the `Reconciler`.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose credentials.
pub struct OvhZoneApi {
    /// API base URL, without trailing slash
    base_url: String,

    /// Application key
    application_key: String,

    /// Application secret
    /// ⚠️ NEVER log this value
    application_secret: String,

    /// Consumer key
    /// ⚠️ NEVER log this value
    consumer_key: String,

    /// Server time minus local time, in seconds
    time_delta: OnceCell<i64>,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for OvhZoneApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OvhZoneApi")
            .field("base_url", &self.base_url)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<REDACTED>")
            .field("consumer_key", &"<REDACTED>")
            .finish()
    }
}

impl OvhZoneApi {
    /// Create a new OVH client
    ///
    /// # Errors
    ///
    /// `Error::Config` if a credential is empty, the endpoint is unknown,
    /// or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        let base_url = resolve_endpoint(&config.endpoint)?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            application_key: config.application_key.clone(),
            application_secret: config.application_secret.clone(),
            consumer_key: config.consumer_key.clone(),
            time_delta: OnceCell::new(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server-adjusted Unix timestamp
    async fn timestamp(&self) -> Result<i64> {
        let delta = self
            .time_delta
            .get_or_try_init(|| self.measure_time_delta())
            .await?;
        Ok(chrono::Utc::now().timestamp() + delta)
    }

    /// Compare the server clock with the local one
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /auth/time
    /// ```
    async fn measure_time_delta(&self) -> Result<i64> {
        let url = format!("{}/auth/time", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_for_status(response, "Server time lookup").await);
        }

        let server_time: i64 = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse server time: {}", e)))?;

        let delta = server_time - chrono::Utc::now().timestamp();
        tracing::debug!("OVH clock delta: {}s", delta);
        Ok(delta)
    }

    /// Send a signed request
    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let body = body.map(Value::to_string).unwrap_or_default();
        let timestamp = self.timestamp().await?;
        let signature = signature::sign(
            &self.application_secret,
            &self.consumer_key,
            method.as_str(),
            &url,
            &body,
            timestamp,
        );

        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Ovh-Application", &self.application_key)
            .header("X-Ovh-Consumer", &self.consumer_key)
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature)
            .header("Content-Type", "application/json");
        if !body.is_empty() {
            request = request.body(body);
        }

        request
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("HTTP request failed: {}", e)))
    }

    /// Send a signed request and fail on a non-success status
    async fn send_ok(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        action: &str,
    ) -> Result<Response> {
        let response = self.send(method, path, body).await?;
        if !response.status().is_success() {
            return Err(error_for_status(response, action).await);
        }
        Ok(response)
    }
}

/// Map a non-success response to a provider error
async fn error_for_status(response: Response, action: &str) -> Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    let message = match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: invalid credentials or insufficient rights. Status: {} - {}",
            status, error_text
        ),
        404 => format!("{}: not found. Status: {} - {}", action, status, error_text),
        409 => format!(
            "Conflict: the zone is being modified by another request. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!(
            "OVH server error (transient): {} - {}",
            status, error_text
        ),
        _ => format!("{} failed: {} - {}", action, status, error_text),
    };
    Error::provider(PROVIDER, message)
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse {}: {}", what, e)))
}

fn record_path(zone: &str) -> String {
    format!("/domain/zone/{}/record", zone)
}

#[async_trait]
impl ZoneApi for OvhZoneApi {
    /// # API Call
    ///
    /// ```http
    /// GET /domain/zone/:zone/record?fieldType=A
    /// ```
    async fn list_identifiers(&self, zone: &str, field_type: &str) -> Result<Vec<RecordId>> {
        let path = format!("{}?fieldType={}", record_path(zone), field_type);
        let response = self
            .send_ok(Method::GET, &path, None, "Record listing")
            .await?;
        let ids: Vec<RecordId> = parse_json(response, "record identifiers").await?;

        tracing::debug!("Listed {} {} record(s) in {}", ids.len(), field_type, zone);
        Ok(ids)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /domain/zone/:zone/record/:id
    /// ```
    async fn fetch_record(&self, zone: &str, id: RecordId) -> Result<Option<Record>> {
        let path = format!("{}/{}", record_path(zone), id);
        let response = self.send(Method::GET, &path, None).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_for_status(response, "Record lookup").await);
        }

        let mut record: Record = parse_json(response, "record").await?;
        if record.zone.is_empty() {
            record.zone = zone.to_string();
        }
        Ok(Some(record))
    }

    /// # API Call
    ///
    /// ```http
    /// POST /domain/zone/:zone/record
    /// {
    ///   "fieldType": "A",
    ///   "subDomain": "www",
    ///   "target": "1.2.3.4"
    /// }
    /// ```
    async fn create_record(&self, zone: &str, sub_domain: &str, target: &str) -> Result<Record> {
        let payload = serde_json::json!({
            "fieldType": FIELD_TYPE_A,
            "subDomain": sub_domain,
            "target": target,
        });

        let response = self
            .send_ok(Method::POST, &record_path(zone), Some(&payload), "Record creation")
            .await?;
        let mut record: Record = parse_json(response, "created record").await?;
        if record.zone.is_empty() {
            record.zone = zone.to_string();
        }
        if record.id.is_none() {
            return Err(Error::provider(
                PROVIDER,
                "Invalid response format: created record has no id",
            ));
        }

        tracing::debug!("OVH created {}", record);
        Ok(record)
    }

    /// # API Call
    ///
    /// ```http
    /// DELETE /domain/zone/:zone/record/:id
    /// ```
    async fn delete_record(&self, zone: &str, id: RecordId) -> Result<()> {
        let path = format!("{}/{}", record_path(zone), id);
        self.send_ok(Method::DELETE, &path, None, "Record deletion")
            .await?;
        Ok(())
    }

    /// # API Call
    ///
    /// ```http
    /// POST /domain/zone/:zone/refresh
    /// ```
    async fn publish_zone(&self, zone: &str) -> Result<()> {
        let path = format!("/domain/zone/{}/refresh", zone);
        self.send_ok(Method::POST, &path, None, "Zone refresh")
            .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            endpoint: "ovh-eu".to_string(),
            application_key: "app_key".to_string(),
            application_secret: "secret_value_12345".to_string(),
            consumer_key: "consumer_value_67890".to_string(),
        }
    }

    #[test]
    fn test_new_resolves_endpoint() {
        let api = OvhZoneApi::new(&config()).unwrap();
        assert_eq!(api.base_url(), "https://eu.api.ovh.com/1.0");
        assert_eq!(api.provider_name(), "ovh");
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut cfg = config();
        cfg.application_secret.clear();
        assert!(matches!(OvhZoneApi::new(&cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut cfg = config();
        cfg.endpoint = "nowhere".to_string();
        assert!(OvhZoneApi::new(&cfg).is_err());
    }

    #[test]
    fn test_credentials_not_exposed_in_debug() {
        let api = OvhZoneApi::new(&config()).unwrap();

        let debug_str = format!("{:?}", api);
        assert!(!debug_str.contains("secret_value_12345"));
        assert!(!debug_str.contains("consumer_value_67890"));
        assert!(debug_str.contains("OvhZoneApi"));
    }
}
