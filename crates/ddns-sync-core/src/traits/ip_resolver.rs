// # IP Resolver Trait
//
// Defines the interface for determining the host's current public IPv4
// address from a configured source descriptor.
//
// ## Implementations
//
// - `ddns-sync-resolver` crate: HTTP lookup, shell command, DNS lookup
// - Test doubles inside the contract tests

use crate::config::IpSourceConfig;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP resolver implementations
///
/// A resolver performs exactly one lookup per call; it never retries and
/// never caches. Failures surface as a single `Error::Resolution` carrying
/// the underlying cause, and the poll loop decides what happens next.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Resolve the current public IPv4 address from the given source
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: the current address
    /// - `Err(Error)`: if the source failed to produce a usable address
    async fn resolve(&self, source: &IpSourceConfig) -> Result<Ipv4Addr, crate::Error>;
}
