//! HTTP lookup client implementation
//!
//! Consults the result cache and the local rate limiter around every call,
//! retries transient failures with linear backoff, and honors provider
//! `Retry-After` hints on 429 responses.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, StatusCode};
use tokio::time::sleep;

use super::{RawRecord, RemoteLookup, RequestWindow, ResultCache};
use crate::config::{ApiConfig, Config};
use crate::error::{ApiError, Result};
use crate::lookup::operator;

/// Remote API client
pub struct ApiClient {
    http: HttpClient,
    api: ApiConfig,
    limiter: RequestWindow,
    rate_limit_enabled: bool,
    cache: ResultCache,
    cache_enabled: bool,
    operator_fallback: bool,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// The bearer token and User-Agent are fixed as default headers; the
    /// per-attempt timeout comes from `api.timeout_secs`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("lacak/0.3"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(key) = config.api.key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| ApiError::InvalidResponse(format!("Invalid API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api: config.api.clone(),
            limiter: RequestWindow::new(
                config.rate_limit.max_requests,
                config.rate_limit.window_secs,
            ),
            rate_limit_enabled: config.rate_limit.enabled,
            cache: ResultCache::new(config.cache.duration_secs),
            cache_enabled: config.cache.enabled,
            operator_fallback: config.features.operator_check,
        })
    }

    fn request_delay(&self) -> Duration {
        Duration::from_secs(self.api.request_delay_secs)
    }

    fn remote_configured(&self) -> bool {
        self.api.enabled && self.api.key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Issue a GET with retry logic.
    ///
    /// `Ok(None)` covers every terminal non-result: local limiter denial,
    /// exhausted retries, unparseable body on the last attempt. Only a 401
    /// aborts with an error, and it is never retried.
    async fn make_request(
        &mut self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<RawRecord>> {
        if self.rate_limit_enabled && !self.limiter.can_make_request() {
            log::warn!("Local rate limit reached, skipping call to {endpoint}");
            sleep(self.request_delay() * 2).await;
            return Ok(None);
        }

        let delay = self.request_delay();

        for attempt in 1..=self.api.max_retries {
            match self.http.get(endpoint).query(params).send().await {
                Ok(response) => {
                    let status = response.status();
                    match status {
                        StatusCode::OK => match response.json::<RawRecord>().await {
                            Ok(record) => {
                                self.limiter.add_request();
                                sleep(delay).await;
                                return Ok(Some(record));
                            }
                            Err(e) => {
                                log::warn!("Failed to parse API response: {e}");
                            }
                        },
                        StatusCode::TOO_MANY_REQUESTS => {
                            let wait = retry_after(&response).unwrap_or(delay * 2);
                            log::warn!(
                                "Provider rate limited us, waiting {}s",
                                wait.as_secs()
                            );
                            sleep(wait).await;
                        }
                        StatusCode::UNAUTHORIZED => {
                            return Err(ApiError::Unauthorized.into());
                        }
                        other => {
                            log::warn!("API returned status {other}");
                        }
                    }
                }
                Err(e) => {
                    let err = ApiError::from(e);
                    log::warn!(
                        "Request failed (attempt {attempt}/{}): {err}",
                        self.api.max_retries
                    );
                }
            }

            if attempt < self.api.max_retries {
                sleep(delay * attempt).await;
            }
        }

        log::warn!("Retries exhausted for {endpoint}");
        Ok(None)
    }

    async fn lookup(
        &mut self,
        kind: &str,
        param: &str,
        identifier: &str,
        endpoint: Option<String>,
    ) -> Result<Option<RawRecord>> {
        let cache_key = format!("{kind}_{identifier}");

        if self.cache_enabled {
            if let Some(cached) = self.cache.get(&cache_key) {
                log::debug!("Cache hit for {kind} lookup");
                return Ok(Some(cached));
            }
        }

        if !self.remote_configured() {
            log::info!("Remote API not configured, skipping {kind} lookup");
            return Ok(None);
        }

        let Some(endpoint) = endpoint else {
            log::debug!("No {kind} endpoint configured");
            return Ok(None);
        };

        let result = self.make_request(&endpoint, &[(param, identifier)]).await?;

        if self.cache_enabled {
            if let Some(record) = &result {
                self.cache.set(&cache_key, record.clone());
            }
        }

        Ok(result)
    }
}

/// Parse a `Retry-After` seconds value from a 429 response
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl RemoteLookup for ApiClient {
    async fn lookup_phone(&mut self, phone: &str) -> Result<Option<RawRecord>> {
        log::debug!("Querying API for phone: {phone}");
        let endpoint = self.api.endpoints.phone_lookup.clone();
        self.lookup("phone", "phone", phone, endpoint).await
    }

    async fn lookup_nik(&mut self, nik: &str) -> Result<Option<RawRecord>> {
        // NIKs are sensitive, keep the tail out of the logs
        let head: String = nik.chars().take(6).collect();
        log::debug!("Querying API for NIK: {head}****");
        let endpoint = self.api.endpoints.nik_lookup.clone();
        self.lookup("nik", "nik", nik, endpoint).await
    }

    async fn check_operator(&mut self, phone: &str) -> Result<String> {
        // The prefix table is fast and accurate for national numbers and
        // never touches the network
        if let Some(op) = operator::prefix_operator(phone) {
            return Ok(op.to_string());
        }

        if self.remote_configured() && self.operator_fallback {
            if let Some(endpoint) = self.api.endpoints.operator_check.clone() {
                if let Some(record) = self.make_request(&endpoint, &[("phone", phone)]).await? {
                    if let Some(op) = record.get("operator").and_then(|v| v.as_str()) {
                        return Ok(op.to_string());
                    }
                }
            }
        }

        Ok("Unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_config(server_url: &str) -> Config {
        let mut config = Config::default();
        config.api.enabled = true;
        config.api.key = Some("test-key".to_string());
        config.api.request_delay_secs = 0;
        config.api.max_retries = 3;
        config.api.endpoints.phone_lookup = Some(format!("{server_url}/phone"));
        config.api.endpoints.nik_lookup = Some(format!("{server_url}/nik"));
        config.api.endpoints.operator_check = Some(format!("{server_url}/operator"));
        config
    }

    #[tokio::test]
    async fn test_lookup_phone_success_then_cache_hit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::UrlEncoded(
                "phone".into(),
                "081234567890".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"John Doe","city":"Jakarta"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();

        let first = client.lookup_phone("081234567890").await.unwrap().unwrap();
        assert_eq!(first.get("name").unwrap(), "John Doe");

        // Second lookup is served from cache: the endpoint is hit once
        let second = client.lookup_phone("081234567890").await.unwrap().unwrap();
        assert_eq!(first, second);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cache_disabled_hits_network_each_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"name":"John Doe"}"#)
            .expect(2)
            .create_async()
            .await;

        let mut config = test_config(&server.url());
        config.cache.enabled = false;

        let mut client = ApiClient::new(&config).unwrap();
        client.lookup_phone("081234567890").await.unwrap().unwrap();
        client.lookup_phone("081234567890").await.unwrap().unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_aborts_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/nik")
            .match_query(Matcher::Any)
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();
        let result = client.lookup_nik("3174012345678901").await;

        match result {
            Err(crate::error::Error::Api(ApiError::Unauthorized)) => (),
            other => panic!("Expected Unauthorized, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_exhausts_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();
        let result = client.lookup_phone("081234567890").await.unwrap();

        assert!(result.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_rate_limit_retried_with_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "0")
            .expect(3)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();
        let result = client.lookup_phone("081234567890").await.unwrap();

        // Still absent after the retry ceiling, but every attempt was made
        assert!(result.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_configured_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = test_config(&server.url());
        config.api.enabled = false;

        let mut client = ApiClient::new(&config).unwrap();
        let result = client.lookup_phone("081234567890").await.unwrap();

        assert!(result.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_local_limiter_denial_returns_absent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/phone")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = test_config(&server.url());
        config.rate_limit.max_requests = 0;

        let mut client = ApiClient::new(&config).unwrap();
        let result = client.lookup_phone("081234567890").await.unwrap();

        assert!(result.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_operator_prefix_match_never_hits_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/operator")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();
        let op = client.check_operator("081134567890").await.unwrap();

        assert_eq!(op, "Telkomsel");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_operator_remote_fallback_for_unmapped_prefix() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/operator")
            .match_query(Matcher::UrlEncoded(
                "phone".into(),
                "080034567890".into(),
            ))
            .with_status(200)
            .with_body(r#"{"operator":"FakeCell"}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = ApiClient::new(&test_config(&server.url())).unwrap();
        let op = client.check_operator("080034567890").await.unwrap();

        assert_eq!(op, "FakeCell");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_operator_unknown_when_nothing_matches() {
        let mut config = Config::default();
        config.api.request_delay_secs = 0;

        let mut client = ApiClient::new(&config).unwrap();
        let op = client.check_operator("080034567890").await.unwrap();

        assert_eq!(op, "Unknown");
    }
}
