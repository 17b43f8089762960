//! Mock remote client for testing
//!
//! Lets orchestrator tests script remote responses and verify which
//! operations were (or were not) invoked.

use async_trait::async_trait;

use super::{RawRecord, RemoteLookup};
use crate::error::Result;

/// Scripted [`RemoteLookup`] implementation.
///
/// Configure responses via builder methods; call counters record every
/// invocation for assertions.
#[derive(Default)]
pub struct MockRemote {
    phone_response: Option<RawRecord>,
    nik_response: Option<RawRecord>,
    operator_response: Option<String>,
    pub phone_calls: usize,
    pub nik_calls: usize,
    pub operator_calls: usize,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phone_response(mut self, record: RawRecord) -> Self {
        self.phone_response = Some(record);
        self
    }

    pub fn with_nik_response(mut self, record: RawRecord) -> Self {
        self.nik_response = Some(record);
        self
    }

    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator_response = Some(operator.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.phone_calls + self.nik_calls + self.operator_calls
    }
}

#[async_trait]
impl RemoteLookup for MockRemote {
    async fn lookup_phone(&mut self, _phone: &str) -> Result<Option<RawRecord>> {
        self.phone_calls += 1;
        Ok(self.phone_response.clone())
    }

    async fn lookup_nik(&mut self, _nik: &str) -> Result<Option<RawRecord>> {
        self.nik_calls += 1;
        Ok(self.nik_response.clone())
    }

    async fn check_operator(&mut self, _phone: &str) -> Result<String> {
        self.operator_calls += 1;
        Ok(self
            .operator_response
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()))
    }
}
