//! DNS provider API abstraction
//!
//! The zone record manager only talks to the provider through this trait, so
//! the Hostinger client can be swapped for a stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Record type used for DNS-01 challenges
pub const TXT: &str = "TXT";

/// A single record value as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Name relative to the zone (`@` for the apex)
    pub name: String,
    pub record_type: String,
    pub content: String,
    pub ttl: u32,
}

impl DnsRecord {
    /// Whether this record has the given relative name and type
    pub fn matches(&self, name: &str, record_type: &str) -> bool {
        self.name == name && self.record_type == record_type
    }
}

/// A named record set to create or update in a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub name: String,
    pub record_type: String,
    pub ttl: u32,
    pub values: Vec<String>,
}

impl RecordSet {
    /// A TXT record set holding a single value
    pub fn txt(name: impl Into<String>, content: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: TXT.to_string(),
            ttl,
            values: vec![content.into()],
        }
    }
}

/// Selects records to delete by name and type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

impl RecordFilter {
    pub fn txt(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: TXT.to_string(),
        }
    }
}

/// Errors from provider API calls
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode API response: {0}")]
    Decode(String),
}

/// Zone-level record operations offered by a DNS provider
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// List every record in the zone
    async fn list_records(&self, zone: &str) -> Result<Vec<DnsRecord>, ApiError>;

    /// Create or update a record set
    ///
    /// With `overwrite` false only the named record set is touched; every
    /// other record in the zone is left as is.
    async fn update_records(
        &self,
        zone: &str,
        record_set: RecordSet,
        overwrite: bool,
    ) -> Result<(), ApiError>;

    /// Delete all records matching any of the filters
    async fn delete_records(&self, zone: &str, filters: Vec<RecordFilter>)
        -> Result<(), ApiError>;
}
