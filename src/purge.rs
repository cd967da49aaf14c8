// Emptying and deleting a hosted zone

use tracing::{info, warn};
use crate::error::Result;
use crate::provider::{list_records, DnsProvider};
use crate::reconcile::apply_batch;
use crate::resource::{filter_user_records, ChangeAction, ChangeBatch, Zone};

// Route53 accepts at most this many changes in one ChangeResourceRecordSets call
pub const MAX_CHANGES_PER_BATCH: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct PurgeReport {
    pub zone: Zone,
    pub batch: ChangeBatch,
    pub change_ids: Vec<String>,
    pub zone_deleted: bool,
}

/// Delete every user record in the zone.  SOA and NS stay: the provider
/// owns them.  Returns every change that was (or in dry-run, would have
/// been) submitted along with the change id of each submitted batch.
/// Batches go out one after the other and earlier ones are not rolled back
/// if a later one fails.
pub fn delete_zone_records<P: DnsProvider + ?Sized>(provider: &P, dry: bool, zone: &Zone)
                                                    -> Result<(ChangeBatch, Vec<String>)> {
    let current = list_records(provider, &zone.id)?;
    for rrs in &current {
        info!(dry, zone_id = %zone.id, "deleteZoneRecords: rrs: {}", rrs);
    }

    let mut batch = ChangeBatch::new();
    for rrs in filter_user_records(&current) {
        batch.push(ChangeAction::Delete, rrs);
    }

    if batch.is_empty() {
        info!(zone_id = %zone.id, "deleteZoneRecords: no record to delete");
        return Ok((batch, Vec::new()));
    }

    let mut change_ids = Vec::new();
    for part in batch.split(MAX_CHANGES_PER_BATCH) {
        if let Some(id) = apply_batch(provider, dry, zone, &part)? {
            change_ids.push(id);
        }
    }
    Ok((batch, change_ids))
}

/// Remove the zone's records, then the zone.  Route53 refuses to delete a
/// zone that still holds anything besides SOA and NS.
pub fn delete_hosted_zone<P: DnsProvider + ?Sized>(provider: &P, dry: bool, zone: &Zone) -> Result<PurgeReport> {
    let (batch, change_ids) = delete_zone_records(provider, dry, zone)?;

    if dry {
        warn!(zone_name = %zone.name, zone_id = %zone.id, "deleteHostedZone: dry run, zone not deleted");
    } else {
        provider.delete_hosted_zone(&zone.id)?;
    }

    info!(dry, zone_name = %zone.name, zone_id = %zone.id, "deleteHostedZone: removed");

    Ok(PurgeReport {
        zone: zone.clone(),
        batch,
        change_ids,
        zone_deleted: !dry,
    })
}
