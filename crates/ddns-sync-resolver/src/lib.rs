// # Source IP Resolver
//
// Concrete `IpResolver` covering the three configured source kinds:
//
// - `url`: HTTP GET against a what-is-my-ip endpoint, trimmed body
// - `command`: shell command via `sh -c`, trimmed stdout
// - `resolve`: DNS A lookup, first IPv4 address wins
//
// One lookup per call, no retries, no caching. Failures propagate as a
// single resolution error carrying the underlying cause; the poll loop
// decides what happens next.

use async_trait::async_trait;
use ddns_sync_core::config::IpSourceConfig;
use ddns_sync_core::traits::IpResolver;
use ddns_sync_core::{Error, Result};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tracing::debug;

/// Timeout for HTTP IP lookups
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolver backed by HTTP, subprocess, and DNS lookups
pub struct SourceIpResolver {
    client: reqwest::Client,
}

impl SourceIpResolver {
    /// Create a resolver
    ///
    /// `verify_tls` controls certificate validation on the HTTP path.
    /// It is on by default at the config layer; turning it off is an
    /// explicit opt-in for endpoints with broken or self-signed
    /// certificates.
    pub fn new(verify_tls: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn resolve_url(&self, url: &str) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("GET {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("failed to read body from {url}: {e}")))?;

        parse_ip(body.trim(), url)
    }

    async fn resolve_command(&self, command: &str) -> Result<Ipv4Addr> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| Error::resolution(format!("failed to run `{command}`: {e}")))?;

        if !output.status.success() {
            return Err(Error::resolution(format!(
                "`{command}` exited with {}",
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Err(Error::resolution(format!("`{command}` produced no IP")));
        }

        parse_ip(trimmed, command)
    }

    async fn resolve_hostname(&self, hostname: &str) -> Result<Ipv4Addr> {
        let addrs = tokio::net::lookup_host((hostname, 0))
            .await
            .map_err(|e| Error::resolution(format!("DNS lookup of {hostname} failed: {e}")))?;

        addrs
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4.ip()),
                SocketAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| Error::resolution(format!("{hostname} has no A record")))
    }
}

fn parse_ip(text: &str, origin: &str) -> Result<Ipv4Addr> {
    text.parse().map_err(|_| {
        Error::resolution(format!("{origin} returned an invalid IPv4 address: {text:?}"))
    })
}

#[async_trait]
impl IpResolver for SourceIpResolver {
    async fn resolve(&self, source: &IpSourceConfig) -> Result<Ipv4Addr> {
        let ip = match source {
            IpSourceConfig::Url { url } => self.resolve_url(url).await?,
            IpSourceConfig::Command { command } => self.resolve_command(command).await?,
            IpSourceConfig::Resolve { hostname } => self.resolve_hostname(hostname).await?,
        };
        debug!("resolved current IP: {}", ip);
        Ok(ip)
    }
}
