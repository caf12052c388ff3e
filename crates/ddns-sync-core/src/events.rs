//! Structured events emitted by the poll loop
//!
//! Every observable point in a cycle produces a `SyncEvent`. The reporter
//! renders it through the localizable message catalog for the logs and
//! forwards the structured value on a bounded channel for anything that
//! wants to consume events programmatically (the daemon, tests).
//!
//! Event occurrence and field sets are part of the contract; the log
//! text is templated and replaceable.

use crate::messages::MessageCatalog;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Default capacity of the event channel
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// One observable moment in a polling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The profile's IP was resolved
    CurrentIp { profile: String, ip: Ipv4Addr },

    /// The resolved IP differs from the committed baseline
    IpChanged {
        profile: String,
        previous: Ipv4Addr,
        new_ip: Ipv4Addr,
    },

    /// The resolved IP matches the baseline; nothing was done
    IpUnchanged { profile: String },

    /// Reconciliation was skipped because the provider API is disabled
    /// or no credentials are configured
    ApiDisabled { profile: String },

    /// A managed record holds a different IP than expected
    RecordMismatch {
        profile: String,
        record: String,
        old_ip: String,
        new_ip: Ipv4Addr,
    },

    /// A managed record was updated at the provider
    RecordUpdated {
        profile: String,
        record: String,
        new_ip: Ipv4Addr,
    },

    /// A managed record already held the expected IP
    RecordCorrect {
        profile: String,
        record: String,
        ip: Ipv4Addr,
    },

    /// A profile's cycle failed; other profiles are unaffected
    ProfileError { profile: String, error: String },

    /// An error escaped the per-profile isolation; the loop continues
    CycleError { error: String },
}

/// Renders events into log lines and fans them out on a channel
#[derive(Debug)]
pub struct EventReporter {
    catalog: MessageCatalog,
    tx: mpsc::Sender<SyncEvent>,
}

impl EventReporter {
    /// Create a reporter and the receiving end of its event channel
    pub fn new(catalog: MessageCatalog) -> (Self, mpsc::Receiver<SyncEvent>) {
        Self::with_capacity(catalog, DEFAULT_EVENT_CAPACITY)
    }

    /// Create a reporter with an explicit channel capacity
    pub fn with_capacity(
        catalog: MessageCatalog,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { catalog, tx }, rx)
    }

    /// Log the event and forward it to the channel
    ///
    /// A full or closed channel drops the event with a warning rather
    /// than blocking the loop.
    pub fn emit(&self, event: SyncEvent) {
        self.log(&event);
        if self.tx.try_send(event).is_err() {
            warn!("event channel full or closed, dropping event");
        }
    }

    fn log(&self, event: &SyncEvent) {
        match event {
            SyncEvent::CurrentIp { profile, ip } => {
                let ip = ip.to_string();
                info!(
                    "{}",
                    self.catalog
                        .render("current_ip", &[("user", profile), ("new_ip", &ip)])
                );
            }
            SyncEvent::IpChanged {
                profile,
                previous,
                new_ip,
            } => {
                let previous = previous.to_string();
                let new_ip = new_ip.to_string();
                info!(
                    "{}",
                    self.catalog.render(
                        "ip_change",
                        &[("user", profile), ("last_ip", &previous), ("new_ip", &new_ip)],
                    )
                );
            }
            SyncEvent::IpUnchanged { profile } => {
                info!("{}", self.catalog.render("ip_unchanged", &[("user", profile)]));
            }
            SyncEvent::ApiDisabled { profile } => {
                info!("{}", self.catalog.render("api_disabled", &[("user", profile)]));
            }
            SyncEvent::RecordMismatch {
                profile,
                record,
                old_ip,
                new_ip,
            } => {
                let new_ip = new_ip.to_string();
                info!(
                    "{}",
                    self.catalog.render(
                        "ip_mismatch",
                        &[
                            ("user", profile),
                            ("name", record),
                            ("old_ip", old_ip),
                            ("new_ip", &new_ip),
                        ],
                    )
                );
            }
            SyncEvent::RecordUpdated {
                profile,
                record,
                new_ip,
            } => {
                let new_ip = new_ip.to_string();
                info!(
                    "{}",
                    self.catalog.render(
                        "ip_updated",
                        &[("user", profile), ("name", record), ("new_ip", &new_ip)],
                    )
                );
            }
            SyncEvent::RecordCorrect { profile, record, ip } => {
                let ip = ip.to_string();
                info!(
                    "{}",
                    self.catalog.render(
                        "ip_correct",
                        &[("user", profile), ("name", record), ("new_ip", &ip)],
                    )
                );
            }
            SyncEvent::ProfileError { profile, error } => {
                error!(
                    "{}",
                    self.catalog
                        .render("error", &[("user", profile), ("error", error)])
                );
            }
            SyncEvent::CycleError { error } => {
                error!("{}", self.catalog.render("cycle_error", &[("error", error)]));
            }
        }
    }
}
