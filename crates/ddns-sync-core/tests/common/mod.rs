//! Test doubles and helpers shared by the contract tests
//!
//! The doubles are deliberately small: a scripted resolver keyed by the
//! source descriptor, and a fake provider that applies updates to an
//! in-memory record set while counting calls.

use async_trait::async_trait;
use ddns_sync_core::config::{
    CloudflareConfig, IpSourceConfig, ProfileConfig, SyncConfig,
};
use ddns_sync_core::error::{Error, Result};
use ddns_sync_core::events::SyncEvent;
use ddns_sync_core::traits::{DnsProviderClient, IpResolver, RecordUpdate, RemoteRecord};
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A resolver whose answers are scripted per source descriptor
///
/// Sources are keyed by their url/command/hostname string, so each test
/// profile gets a distinct `url` like `mock://home`. Every cycle pops one
/// scripted answer; an unscripted lookup is an error, which keeps tests
/// honest about how many cycles they drive.
#[derive(Default)]
pub struct ScriptedResolver {
    scripts: Mutex<HashMap<String, VecDeque<Result<Ipv4Addr>>>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, key: &str, ip: Ipv4Addr) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Ok(ip));
    }

    pub fn push_err(&self, key: &str, msg: &str) {
        self.scripts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Err(Error::resolution(msg)));
    }
}

fn source_key(source: &IpSourceConfig) -> &str {
    match source {
        IpSourceConfig::Url { url } => url,
        IpSourceConfig::Command { command } => command,
        IpSourceConfig::Resolve { hostname } => hostname,
    }
}

#[async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self, source: &IpSourceConfig) -> Result<Ipv4Addr> {
        let key = source_key(source);
        self.scripts
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(Error::resolution(format!("unscripted lookup: {key}"))))
    }
}

/// A provider double backed by an in-memory record set
///
/// `update_record` applies the update to the stored records, so a second
/// reconciliation pass sees the post-update zone. A single record ID can
/// be armed to fail, failing before the update is applied.
pub struct FakeProvider {
    records: Mutex<Vec<RemoteRecord>>,
    fail_update_on: Mutex<Option<String>>,
    list_calls: AtomicUsize,
    update_calls: Mutex<Vec<(String, RecordUpdate)>>,
}

impl FakeProvider {
    pub fn new(records: Vec<RemoteRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_update_on: Mutex::new(None),
            list_calls: AtomicUsize::new(0),
            update_calls: Mutex::new(Vec::new()),
        }
    }

    /// Arm a failure for the given record ID
    pub fn fail_update_on(&self, record_id: &str) {
        *self.fail_update_on.lock().unwrap() = Some(record_id.to_string());
    }

    /// Disarm any armed failure
    pub fn clear_failure(&self) {
        *self.fail_update_on.lock().unwrap() = None;
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// IDs of records for which an update was attempted, in order
    pub fn updated_record_ids(&self) -> Vec<String> {
        self.update_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Current content of a stored record
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == record_id)
            .map(|r| r.content.clone())
    }
}

#[async_trait]
impl DnsProviderClient for FakeProvider {
    async fn list_a_records(&self, _zone_id: &str) -> Result<Vec<RemoteRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().clone())
    }

    async fn update_record(
        &self,
        _zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<()> {
        if self.fail_update_on.lock().unwrap().as_deref() == Some(record_id) {
            return Err(Error::provider("fake", format!("armed failure on {record_id}")));
        }

        self.update_calls
            .lock()
            .unwrap()
            .push((record_id.to_string(), update.clone()));

        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.id == record_id) {
            record.content = update.content.clone();
            record.ttl = update.ttl;
            record.proxied = update.proxied;
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Source key used for a profile's scripted resolver entries
pub fn mock_source(profile: &str) -> String {
    format!("mock://{profile}")
}

/// A record with the defaults tests don't care about
pub fn record(id: &str, name: &str, content: &str) -> RemoteRecord {
    RemoteRecord {
        id: id.to_string(),
        name: name.to_string(),
        content: content.to_string(),
        ttl: 300,
        proxied: false,
    }
}

/// A credentialed, API-enabled profile resolving via `mock://<name>`
pub fn managed_profile(name: &str, domains: &[&str]) -> ProfileConfig {
    ProfileConfig {
        name: name.to_string(),
        ip_source: Some(IpSourceConfig::Url {
            url: mock_source(name),
        }),
        api_enabled: true,
        cloudflare: Some(CloudflareConfig {
            api_token: "test-token".to_string(),
            zone_id: format!("zone-{name}"),
        }),
        domains: domains.iter().map(|d| d.to_string()).collect(),
    }
}

/// A profile with the provider API switched off
pub fn observe_only_profile(name: &str) -> ProfileConfig {
    ProfileConfig {
        name: name.to_string(),
        ip_source: Some(IpSourceConfig::Url {
            url: mock_source(name),
        }),
        api_enabled: false,
        cloudflare: None,
        domains: Vec::new(),
    }
}

/// Minimal valid configuration around the given profiles
pub fn test_config(profiles: Vec<ProfileConfig>) -> SyncConfig {
    SyncConfig {
        ip_source: None,
        update_interval: 300,
        verify_tls: true,
        messages: HashMap::new(),
        profiles,
    }
}

/// Drain every event currently buffered on the channel
pub fn drain_events(rx: &mut mpsc::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
