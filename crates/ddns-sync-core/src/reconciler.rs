// # Record reconciler
//
// One reconciliation pass: fetch the zone's A records, filter to the
// profile's managed domains, and rewrite every matched record whose
// content differs from the freshly resolved IP.
//
// Scoping guard: records whose name is not in the profile's domain set
// are ignored entirely, never modified and never reported, no matter how
// stale they look. Records are processed in provider order with no
// sorting or deduplication; two records sharing a name are updated
// independently.
//
// The first provider error aborts the remaining iterations of the pass.
// Updates already issued are not rolled back; the provider is the source
// of truth and partial application is an accepted failure mode.

use crate::events::{EventReporter, SyncEvent};
use crate::traits::{DnsProviderClient, RecordUpdate};
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// One applied record change, kept for reporting only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    /// Record name
    pub name: String,
    /// Content the record held before the update
    pub old_ip: String,
    /// Content the record holds now
    pub new_ip: Ipv4Addr,
}

/// Ordered changes applied during one pass
pub type ChangeSet = Vec<RecordChange>;

/// Reconcile a profile's managed records against `new_ip`
///
/// Returns the changes actually applied. An empty set means every
/// managed record already held the right address.
pub async fn reconcile(
    provider: &dyn DnsProviderClient,
    profile: &str,
    zone_id: &str,
    domains: &[String],
    new_ip: Ipv4Addr,
    reporter: &EventReporter,
) -> Result<ChangeSet, crate::Error> {
    let managed: HashSet<&str> = domains.iter().map(String::as_str).collect();
    let new_content = new_ip.to_string();

    let records = provider.list_a_records(zone_id).await?;

    let mut changes = ChangeSet::new();
    for record in records {
        if !managed.contains(record.name.as_str()) {
            continue;
        }

        if record.content == new_content {
            reporter.emit(SyncEvent::RecordCorrect {
                profile: profile.to_string(),
                record: record.name.clone(),
                ip: new_ip,
            });
            continue;
        }

        reporter.emit(SyncEvent::RecordMismatch {
            profile: profile.to_string(),
            record: record.name.clone(),
            old_ip: record.content.clone(),
            new_ip,
        });

        let update = RecordUpdate::retarget(&record, new_ip);
        provider.update_record(zone_id, &record.id, &update).await?;

        changes.push(RecordChange {
            name: record.name.clone(),
            old_ip: record.content.clone(),
            new_ip,
        });

        reporter.emit(SyncEvent::RecordUpdated {
            profile: profile.to_string(),
            record: record.name,
            new_ip,
        });
    }

    Ok(changes)
}
