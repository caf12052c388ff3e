// # DNS Provider Client Trait
//
// Defines the interface the reconciler uses to read and write zone
// records. The contract assumes a REST-over-HTTPS provider with bearer
// authentication, but nothing in the core depends on that detail.
//
// ## Implementations
//
// - Cloudflare: `ddns-sync-cloudflare` crate
// - Test doubles inside the contract tests
//
// Clients are thin transports: one API call per method, no retries, no
// caching, full error propagation. Scheduling and failure isolation are
// owned by the poll loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One A record as the provider currently holds it
///
/// Read during a reconciliation pass and discarded afterwards; never
/// persisted locally. `content` stays a string because the provider is
/// the source of truth and may hold values we did not write; a malformed
/// remote value must compare as a mismatch, not break the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Provider-assigned record ID
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Current record content (the IP the provider serves)
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Whether the provider proxies traffic for this record
    #[serde(default)]
    pub proxied: bool,
}

/// Payload for a record update
///
/// `ttl` and `proxied` are carried over from the existing record; only
/// `content` changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// Record type, always "A" here
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record name, unchanged from the existing record
    pub name: String,
    /// New record content
    pub content: String,
    /// TTL preserved from the existing record
    pub ttl: u32,
    /// Proxied flag preserved from the existing record
    pub proxied: bool,
}

impl RecordUpdate {
    /// Build the update payload for pointing `record` at `new_ip`
    pub fn retarget(record: &RemoteRecord, new_ip: Ipv4Addr) -> Self {
        Self {
            record_type: "A".to_string(),
            name: record.name.clone(),
            content: new_ip.to_string(),
            ttl: record.ttl,
            proxied: record.proxied,
        }
    }
}

/// Trait for DNS provider client implementations
#[async_trait]
pub trait DnsProviderClient: Send + Sync {
    /// List all A records in the given zone
    ///
    /// Returns records in provider order; the reconciler does not sort
    /// or deduplicate them.
    async fn list_a_records(&self, zone_id: &str) -> Result<Vec<RemoteRecord>, crate::Error>;

    /// Update a single record
    ///
    /// # Parameters
    ///
    /// - `zone_id`: the zone the record lives in
    /// - `record_id`: the provider-assigned record ID
    /// - `update`: the full replacement payload
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<(), crate::Error>;

    /// Provider name for logging and error context
    fn provider_name(&self) -> &'static str;
}
