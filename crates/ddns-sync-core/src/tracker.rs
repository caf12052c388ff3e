// # Last-IP tracker
//
// Remembers the last observed IPv4 address per profile and decides
// whether a reconciliation should run. The table is owned by the poll
// loop; `decide` never mutates, and `commit` is called only after a
// profile's resolve-and-reconcile sequence completed without an
// unrecovered error. A failed pass therefore retries next cycle against
// the same baseline.
//
// State is in-memory only and lost on restart: the first cycle after a
// start treats every profile as a first observation.

use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Outcome of comparing a freshly resolved IP against the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpDecision {
    /// Same IP as last cycle; nothing to do
    Unchanged,
    /// No IP on record yet; reconcile, but there is no "old" value to report
    FirstObservation,
    /// The IP changed since the last committed observation
    Changed {
        /// The previously committed address
        previous: Ipv4Addr,
    },
}

impl IpDecision {
    /// Whether this decision triggers a reconciliation attempt
    pub fn needs_reconcile(self) -> bool {
        !matches!(self, IpDecision::Unchanged)
    }
}

/// Per-profile last-observed-IP table
#[derive(Debug, Default)]
pub struct LastIpTable {
    inner: HashMap<String, Ipv4Addr>,
}

impl LastIpTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `new_ip` against the profile's committed baseline
    pub fn decide(&self, profile: &str, new_ip: Ipv4Addr) -> IpDecision {
        match self.inner.get(profile) {
            None => IpDecision::FirstObservation,
            Some(&last) if last == new_ip => IpDecision::Unchanged,
            Some(&last) => IpDecision::Changed { previous: last },
        }
    }

    /// Record a successfully handled observation
    pub fn commit(&mut self, profile: &str, new_ip: Ipv4Addr) {
        self.inner.insert(profile.to_string(), new_ip);
    }

    /// The committed baseline for a profile, if any
    pub fn last_ip(&self, profile: &str) -> Option<Ipv4Addr> {
        self.inner.get(profile).copied()
    }
}
