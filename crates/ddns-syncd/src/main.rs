// # ddns-syncd - DDNS Synchronizer Daemon
//
// Thin integration layer: reads the configuration file, wires up the
// resolver and provider clients, and hands control to the poll loop in
// ddns-sync-core. No synchronization logic lives here.
//
// ## Configuration
//
// The config path comes from the first CLI argument, then the
// `DDNS_SYNC_CONFIG` environment variable, then `config.json` in the
// working directory. The log level comes from `DDNS_SYNC_LOG`
// (trace/debug/info/warn/error, default info).
//
// ## Example
//
// ```bash
// DDNS_SYNC_LOG=debug ddns-syncd /etc/ddns-sync/config.json
// ```
//
// Example config:
//
// ```json
// {
//   "ip_source": {"type": "url", "url": "https://api.ipify.org"},
//   "update_interval": 300,
//   "profiles": [
//     {
//       "name": "home",
//       "cloudflare": {"api_token": "...", "zone_id": "..."},
//       "domains": ["home.example.com", "vpn.example.com"]
//     }
//   ]
// }
// ```

use anyhow::Result;
use ddns_sync_core::traits::DnsProviderClient;
use ddns_sync_core::{Poller, SyncConfig};
use ddns_sync_resolver::SourceIpResolver;
use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn config_path() -> String {
    env::args()
        .nth(1)
        .or_else(|| env::var("DDNS_SYNC_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string())
}

fn log_level() -> Level {
    match env::var("DDNS_SYNC_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> ExitCode {
    let path = config_path();

    // Load and validate before anything else; the loop must never start
    // with an unusable configuration.
    let config = match SyncConfig::from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return SyncExitCode::ConfigError.into();
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return SyncExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return SyncExitCode::ConfigError.into();
    }

    info!("starting ddns-syncd");
    info!(
        "configuration loaded from {}: {} profile(s), interval {}s",
        path,
        config.profiles.len(),
        config.update_interval
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            return SyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => SyncExitCode::CleanShutdown,
            Err(e) => {
                error!("daemon error: {e}");
                SyncExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Build the components and run the poll loop until shutdown
async fn run_daemon(config: SyncConfig) -> Result<()> {
    if !config.verify_tls {
        tracing::warn!("TLS certificate verification is DISABLED for outbound calls");
    }

    let resolver = SourceIpResolver::new(config.verify_tls)?;

    // One provider client per credentialed profile; tokens are scoped
    // per zone, so clients are not shared.
    let mut providers: HashMap<String, Arc<dyn DnsProviderClient>> = HashMap::new();
    for profile in &config.profiles {
        if let Some(ref cf) = profile.cloudflare {
            let client =
                ddns_sync_cloudflare::CloudflareClient::new(cf.api_token.clone(), config.verify_tls)?;
            providers.insert(profile.name.clone(), Arc::new(client));
            info!(
                "profile {}: cloudflare client ready ({} domain(s))",
                profile.name,
                profile.domains.len()
            );
        } else {
            info!("profile {}: no provider credentials, observe-only", profile.name);
        }
    }

    let (mut poller, mut event_rx) = Poller::new(config, Box::new(resolver), providers)?;

    // The reporter already writes log lines; this drain keeps the
    // channel from filling up and gives debug visibility into the
    // structured stream.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "sync event");
        }
    });

    info!("entering poll loop");
    poller.run().await?;

    info!("poll loop stopped, shutting down");
    Ok(())
}
