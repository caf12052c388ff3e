//! Trait seams between the core loop and its I/O collaborators

pub mod dns_provider;
pub mod ip_resolver;

pub use dns_provider::{DnsProviderClient, RecordUpdate, RemoteRecord};
pub use ip_resolver::IpResolver;
