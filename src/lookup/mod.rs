//! Lookup orchestration
//!
//! Classifies a target as phone or NIK, then walks the tiers in cost order:
//! local store first (authoritative when present, never merged with remote
//! data), remote API second. The winning raw record is normalized onto the
//! display schema with the source tier attached.

use crate::client::{ApiClient, RawRecord, RemoteLookup};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::LocalStore;

pub mod normalize;
pub mod operator;

pub use normalize::{normalize, NormalizedResult};

/// How a target string was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Phone,
    Nik,
}

/// Which tier produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    LocalStore,
    RemoteApi,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::LocalStore => "Local database",
            Source::RemoteApi => "Remote API",
        }
    }
}

/// The tiered lookup pipeline
pub struct Pipeline<R: RemoteLookup> {
    remote: R,
    store: LocalStore,
    config: Config,
}

impl Pipeline<ApiClient> {
    /// Build the production pipeline from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = ApiClient::new(config)?;
        let store = LocalStore::open(config);
        Ok(Self::new(remote, store, config.clone()))
    }
}

impl<R: RemoteLookup> Pipeline<R> {
    pub fn new(remote: R, store: LocalStore, config: Config) -> Self {
        Self {
            remote,
            store,
            config,
        }
    }

    /// Classify a target by shape: phone prefix, then NIK length
    pub fn classify(&self, target: &str) -> Option<TargetKind> {
        if target.starts_with(&self.config.search.phone_prefix) {
            Some(TargetKind::Phone)
        } else if target.len() == self.config.search.nik_length {
            Some(TargetKind::Nik)
        } else {
            None
        }
    }

    /// Raw tiered lookup.
    ///
    /// An unrecognized target fails before any I/O. Local store wins over
    /// the remote tier; `Ok(None)` means both tiers reported absence.
    pub async fn lookup(
        &mut self,
        target: &str,
        kind: Option<TargetKind>,
    ) -> Result<Option<(RawRecord, Source)>> {
        let kind = self.resolve_kind(target, kind)?;

        if self.config.database.enabled {
            log::debug!("Checking local database for {target}");
            let hit = match kind {
                TargetKind::Phone => self.store.query_phone(target),
                TargetKind::Nik => self.store.query_nik(target),
            };
            if let Some(record) = hit {
                log::info!("Found in local database");
                return Ok(Some((record, Source::LocalStore)));
            }
        }

        if self.config.remote_configured() {
            log::debug!("Querying remote API for {target}");
            let hit = match kind {
                TargetKind::Phone => self.remote.lookup_phone(target).await?,
                TargetKind::Nik => self.remote.lookup_nik(target).await?,
            };
            if let Some(record) = hit {
                log::info!("Found via remote API");
                return Ok(Some((record, Source::RemoteApi)));
            }
        }

        log::info!("No results from local database or remote API");
        Ok(None)
    }

    /// Full lookup: raw tiers, operator sub-lookup, normalization.
    ///
    /// The returned result carries a `Source` field naming the tier that
    /// produced the record.
    pub async fn lookup_normalized(
        &mut self,
        target: &str,
        kind: Option<TargetKind>,
    ) -> Result<Option<NormalizedResult>> {
        let kind = self.resolve_kind(target, kind)?;

        let Some((record, source)) = self.lookup(target, Some(kind)).await? else {
            return Ok(None);
        };

        // Secondary operator lookup for phone targets lacking one
        let has_operator = record.contains_key("operator") || record.contains_key("carrier");
        let operator = if kind == TargetKind::Phone && !has_operator {
            Some(self.remote.check_operator(target).await?)
        } else {
            None
        };

        let mut result = normalize(&record, operator.as_deref());
        result.insert("Source", source.label());
        Ok(Some(result))
    }

    /// Resolve the carrier for a phone number
    pub async fn operator(&mut self, phone: &str) -> Result<String> {
        self.remote.check_operator(phone).await
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    #[cfg(test)]
    pub fn remote(&self) -> &R {
        &self.remote
    }

    fn resolve_kind(&self, target: &str, kind: Option<TargetKind>) -> Result<TargetKind> {
        match kind {
            Some(k) => Ok(k),
            None => self
                .classify(target)
                .ok_or_else(|| Error::UnrecognizedTarget(target.to_string())),
        }
    }
}
