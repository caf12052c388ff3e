// # ddns-sync-core
//
// Core library for the polling DDNS synchronizer.
//
// ## Architecture Overview
//
// - **IpResolver**: trait for turning a configured source descriptor
//   (HTTP endpoint, shell command, DNS hostname) into the current IPv4
// - **DnsProviderClient**: trait for listing and updating zone A records
// - **LastIpTable**: per-profile change detection, owned by the loop
// - **reconcile**: one diff-and-update pass over a profile's records
// - **Poller**: the fixed-interval loop with per-profile failure isolation
//
// ## Design Principles
//
// 1. One cycle in flight at a time; profiles strictly sequential
// 2. Explicit results everywhere; the loop decides continue-vs-abort
// 3. State commits only after a profile's pass succeeded
// 4. I/O lives behind traits so providers and resolvers can be swapped

pub mod config;
pub mod error;
pub mod events;
pub mod messages;
pub mod poller;
pub mod reconciler;
pub mod tracker;
pub mod traits;

// Re-export core types for convenience
pub use config::{CloudflareConfig, IpSourceConfig, ProfileConfig, SyncConfig};
pub use error::{Error, Result};
pub use events::{EventReporter, SyncEvent};
pub use messages::MessageCatalog;
pub use poller::Poller;
pub use reconciler::{ChangeSet, RecordChange, reconcile};
pub use tracker::{IpDecision, LastIpTable};
pub use traits::{DnsProviderClient, IpResolver, RecordUpdate, RemoteRecord};
