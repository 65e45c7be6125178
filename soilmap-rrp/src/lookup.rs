//! Read side of the lookup: a typed table and a process-wide cache over it.
//!
//! The cache never raises. A source that is missing, unreachable or malformed
//! yields an empty table and a warning; the next access tries again. Once a
//! load succeeds (even with zero entries) the table is kept for the life of
//! the cache.

use crate::builder::LookupTable;
use crate::models::{lookup_key, RrpEntry};
use anyhow::Context;
use log::{info, warn};
use reqwest::Url;
use soilmap_utils::numbers::key_part;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The emitted lookup, keyed by `"<study>:<unit>"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RrpLookup {
    entries: LookupTable,
}

impl RrpLookup {
    pub fn new(entries: LookupTable) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn get_key(&self, key: &str) -> Option<&RrpEntry> {
        self.entries.get(key)
    }

    /// Entry for a study/unit pair, as they appear in feature properties.
    pub fn get(&self, study_number: &str, unit_number: &str) -> Option<&RrpEntry> {
        self.get_key(&lookup_key(&key_part(study_number), &key_part(unit_number)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the lookup JSON lives.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupSource {
    File(PathBuf),
    Url(Url),
}

impl LookupSource {
    /// `http(s)://` locations are fetched, anything else is a file path.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => LookupSource::Url(url),
            _ => LookupSource::File(PathBuf::from(location)),
        }
    }

    async fn read(&self) -> anyhow::Result<String> {
        match self {
            LookupSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
            LookupSource::Url(url) => {
                let response = reqwest::get(url.clone()).await?;
                if !response.status().is_success() {
                    anyhow::bail!("GET {} returned {}", url, response.status());
                }
                Ok(response.text().await?)
            }
        }
    }

    pub async fn load(&self) -> anyhow::Result<RrpLookup> {
        let json = self.read().await?;
        RrpLookup::from_json(&json).with_context(|| format!("malformed lookup at {:?}", self))
    }
}

/// Observable state of a [`LookupCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Empty,
    Loaded,
    LoadFailed,
}

#[derive(Debug)]
enum CacheState {
    Empty,
    Loaded(Arc<RrpLookup>),
    LoadFailed,
}

/// Lazily loaded, shared lookup table.
#[derive(Debug)]
pub struct LookupCache {
    source: LookupSource,
    state: Mutex<CacheState>,
}

impl LookupCache {
    pub fn new(source: LookupSource) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState::Empty),
        }
    }

    pub async fn status(&self) -> CacheStatus {
        match *self.state.lock().await {
            CacheState::Empty => CacheStatus::Empty,
            CacheState::Loaded(_) => CacheStatus::Loaded,
            CacheState::LoadFailed => CacheStatus::LoadFailed,
        }
    }

    /// The cached table, loading it first if needed. Load failures give an
    /// empty table for this call only.
    pub async fn get(&self) -> Arc<RrpLookup> {
        let mut state = self.state.lock().await;
        if let CacheState::Loaded(lookup) = &*state {
            return Arc::clone(lookup);
        }
        match self.source.load().await {
            Ok(lookup) => {
                info!("Loaded {} soil units from {:?}", lookup.len(), self.source);
                let lookup = Arc::new(lookup);
                *state = CacheState::Loaded(Arc::clone(&lookup));
                lookup
            }
            Err(e) => {
                warn!("Soil unit lookup unavailable, using an empty table: {:#}", e);
                *state = CacheState::LoadFailed;
                Arc::new(RrpLookup::default())
            }
        }
    }
}
