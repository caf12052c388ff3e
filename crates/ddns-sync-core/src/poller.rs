//! Polling loop
//!
//! The `Poller` drives the whole system: every cycle it walks the
//! profiles in configuration order, resolves each profile's current IP,
//! consults the last-IP table, and reconciles provider records when the
//! address moved.
//!
//! ## Failure isolation
//!
//! An error in one profile's resolve-or-reconcile sequence is reported
//! and the cycle continues with the next profile. A second guard around
//! the whole cycle body catches anything that escapes the per-profile
//! isolation. The loop has no exit condition of its own; it runs until
//! the process receives SIGINT/SIGTERM.
//!
//! ## State ownership
//!
//! The loop exclusively owns the `LastIpTable`. Profiles are processed
//! strictly sequentially, so no locking is needed, and the table is
//! committed only after a profile's branch completed without an
//! unrecovered error. A failed pass retries next cycle against the same
//! baseline.

use crate::config::{IpSourceConfig, ProfileConfig, SyncConfig};
use crate::error::{Error, Result};
use crate::events::{EventReporter, SyncEvent};
use crate::messages::MessageCatalog;
use crate::reconciler::reconcile;
use crate::tracker::{IpDecision, LastIpTable};
use crate::traits::{DnsProviderClient, IpResolver};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// A profile plus the provider client built for it at startup
struct ProfileRuntime {
    config: ProfileConfig,
    provider: Option<Arc<dyn DnsProviderClient>>,
}

/// The polling loop and all state it owns
pub struct Poller {
    profiles: Vec<ProfileRuntime>,
    global_source: Option<IpSourceConfig>,
    resolver: Box<dyn IpResolver>,
    table: LastIpTable,
    reporter: EventReporter,
    interval: Duration,
}

impl Poller {
    /// Build a poller from a validated configuration
    ///
    /// `providers` maps profile names to the clients built from their
    /// credentials. Every profile that is API-enabled and carries
    /// credentials must have an entry; anything else is a configuration
    /// error surfaced before the loop starts.
    ///
    /// Returns the poller and the receiving end of its event channel.
    pub fn new(
        config: SyncConfig,
        resolver: Box<dyn IpResolver>,
        mut providers: HashMap<String, Arc<dyn DnsProviderClient>>,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let interval = config.interval();
        let global_source = config.ip_source.clone();
        let catalog = MessageCatalog::new(config.messages.clone());
        let (reporter, event_rx) = EventReporter::new(catalog);

        let mut profiles = Vec::with_capacity(config.profiles.len());
        for profile in config.profiles {
            let provider = providers.remove(&profile.name);
            if profile.api_enabled && profile.has_credentials() && provider.is_none() {
                return Err(Error::config(format!(
                    "no provider client supplied for profile {}",
                    profile.name
                )));
            }
            profiles.push(ProfileRuntime {
                config: profile,
                provider,
            });
        }

        Ok((
            Self {
                profiles,
                global_source,
                resolver,
                table: LastIpTable::new(),
                reporter,
                interval,
            },
            event_rx,
        ))
    }

    /// Run the loop until the process is told to stop
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the loop with a programmatic shutdown signal (for tests)
    pub async fn run_with_shutdown(
        &mut self,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!(
            "starting poll loop: {} profile(s), interval {:?}",
            self.profiles.len(),
            self.interval
        );

        if let Some(mut rx) = shutdown_rx {
            loop {
                self.guarded_cycle().await;
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        } else {
            loop {
                self.guarded_cycle().await;
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Outer guard: nothing escapes a cycle, the loop always reaches
    /// the next sleep
    async fn guarded_cycle(&mut self) {
        if let Err(e) = self.run_cycle().await {
            self.reporter.emit(SyncEvent::CycleError {
                error: e.to_string(),
            });
        }
    }

    /// Run one polling pass over all profiles
    ///
    /// Public so tests and embedders can drive cycles without sleeping.
    pub async fn run_cycle(&mut self) -> Result<()> {
        for i in 0..self.profiles.len() {
            let outcome = sync_profile(
                &self.profiles[i],
                self.global_source.as_ref(),
                self.resolver.as_ref(),
                &self.table,
                &self.reporter,
            )
            .await;

            let name = self.profiles[i].config.name.clone();
            match outcome {
                Ok(Some(ip)) => self.table.commit(&name, ip),
                Ok(None) => {}
                Err(e) => self.reporter.emit(SyncEvent::ProfileError {
                    profile: name,
                    error: e.to_string(),
                }),
            }
        }
        Ok(())
    }

    /// The committed baseline for a profile, if any
    pub fn last_ip(&self, profile: &str) -> Option<Ipv4Addr> {
        self.table.last_ip(profile)
    }
}

/// One profile's resolve-and-reconcile sequence
///
/// Returns `Ok(Some(ip))` when the observation should be committed to
/// the table (reconciled successfully, or intentionally skipped because
/// the API is disabled), `Ok(None)` when the IP was unchanged, and
/// `Err` when anything failed; the caller leaves the table untouched in
/// that case so the next cycle retries against the same baseline.
async fn sync_profile(
    profile: &ProfileRuntime,
    global_source: Option<&IpSourceConfig>,
    resolver: &dyn IpResolver,
    table: &LastIpTable,
    reporter: &EventReporter,
) -> Result<Option<Ipv4Addr>> {
    let name = &profile.config.name;

    let source = profile.config.effective_source(global_source).ok_or_else(|| {
        // Validation rejects this at startup; kept as an error for defense in depth.
        Error::config(format!("profile {name} has no ip_source"))
    })?;

    let ip = resolver.resolve(source).await?;
    reporter.emit(SyncEvent::CurrentIp {
        profile: name.clone(),
        ip,
    });

    let decision = table.decide(name, ip);
    if !decision.needs_reconcile() {
        reporter.emit(SyncEvent::IpUnchanged {
            profile: name.clone(),
        });
        return Ok(None);
    }

    if let IpDecision::Changed { previous } = decision {
        reporter.emit(SyncEvent::IpChanged {
            profile: name.clone(),
            previous,
            new_ip: ip,
        });
    }

    match (&profile.provider, &profile.config.cloudflare) {
        (Some(provider), Some(cf)) if profile.config.api_enabled => {
            reconcile(
                provider.as_ref(),
                name,
                &cf.zone_id,
                &profile.config.domains,
                ip,
                reporter,
            )
            .await?;
        }
        _ => {
            reporter.emit(SyncEvent::ApiDisabled {
                profile: name.clone(),
            });
        }
    }

    Ok(Some(ip))
}
