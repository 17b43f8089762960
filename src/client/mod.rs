//! Remote lookup client
//!
//! The remote tier of the lookup pipeline: an HTTP client with retry,
//! backoff, rate limiting and response caching, behind the [`RemoteLookup`]
//! trait so the orchestrator can be exercised against a mock.

use async_trait::async_trait;

use crate::error::Result;

pub mod api;
pub mod cache;
#[cfg(test)]
pub mod mock;
pub mod rate_limit;

pub use api::ApiClient;
pub use cache::ResultCache;
pub use rate_limit::RequestWindow;

/// Raw provider response: a JSON object, keys mapped later by the normalizer
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Remote lookup operations
#[async_trait]
pub trait RemoteLookup: Send {
    /// Look up a phone number. `Ok(None)` means not found or not configured.
    async fn lookup_phone(&mut self, phone: &str) -> Result<Option<RawRecord>>;

    /// Look up a national ID. `Ok(None)` means not found or not configured.
    async fn lookup_nik(&mut self, nik: &str) -> Result<Option<RawRecord>>;

    /// Resolve the carrier for a phone number.
    ///
    /// Tries the local prefix table before any network call; falls back to
    /// `"Unknown"` when neither tier knows the number.
    async fn check_operator(&mut self, phone: &str) -> Result<String>;
}
