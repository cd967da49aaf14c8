// The two things route53ctl does: reconcile a zone against rules, or purge it.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use crate::address::HostResolver;
use crate::error::{Error, Result};
use crate::provider::{list_records, list_zones, DnsProvider};
use crate::purge::{delete_hosted_zone, PurgeReport};
use crate::reconcile::{apply_batch, update_records, NegativeCachePolicy};
use crate::resource::{ChangeBatch, Zone};
use crate::rule::parse_rules;
use crate::vpce::VpceZoneTable;
use crate::zone::{must_pick_zone, pick_or_create_zone, qualify_zone_name};

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    pub dry_run: bool,
    pub zone_name: String,
    pub zone_id: String,
    pub vpc_id: String,
    pub vpc_region: String,
    pub rules: Vec<String>,
    pub ttl: i64,
    pub negative_ttl: i64,
    pub negative_cache: NegativeCachePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub zone: Zone,
    pub created_zone: bool,
    pub batch: ChangeBatch,
    pub change_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurgeRequest {
    pub dry_run: bool,
    pub zone_name: String,
    pub zone_id: String,
}

// Unique per call; Route53 uses it to recognise retried creations
fn caller_reference() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => format!("route53ctl-{}", n.as_nanos()),
        Err(_) => "route53ctl-0".to_string(),
    }
}

/// Select or create the zone, then bring its weighted records in line with
/// the rules.  Rules are parsed and resolved before the provider is touched.
pub fn reconcile<P, R>(provider: &P, resolver: &R, table: &VpceZoneTable, req: &ReconcileRequest)
                       -> Result<ReconcileReport>
where
    P: DnsProvider + ?Sized,
    R: HostResolver + ?Sized,
{
    let zone_name = qualify_zone_name(&req.zone_name);

    info!(dry = req.dry_run, zone_name = %zone_name, zone_id = %req.zone_id, vpc_id = %req.vpc_id,
          vpc_region = %req.vpc_region, rules = ?req.rules, "setZone");

    table.zone_id(&req.vpc_region)?;

    if req.rules.is_empty() {
        return Err(Error::MissingInput("setZone: at least one rule is required".to_string()));
    }

    let rules = parse_rules(&req.rules[..], resolver, table)?;

    let zones = list_zones(provider)?;
    let zone = pick_or_create_zone(provider, req.dry_run, &zones, &zone_name, &req.zone_id,
                                   &req.vpc_id, &req.vpc_region, &caller_reference())?;

    info!(zone_name = %zone.name, zone_id = %zone.id, "setZone: found zone");

    let current = list_records(provider, &zone.id)?;
    let batch = update_records(&zone, &current, &rules, req.ttl, req.negative_ttl, req.negative_cache)?;
    let change_id = apply_batch(provider, req.dry_run, &zone, &batch)?;

    if let Some(created) = zone.created_at {
        info!("setZone: time elapsed between zone creation and records creation: {:?}",
              created.elapsed());
    }

    Ok(ReconcileReport {
        created_zone: zone.created_at.is_some(),
        zone,
        batch,
        change_id,
    })
}

/// Delete all user records of an existing zone and then the zone.  The zone
/// must be found; nothing is ever created here.
pub fn purge<P: DnsProvider + ?Sized>(provider: &P, req: &PurgeRequest) -> Result<PurgeReport> {
    let zone_name = qualify_zone_name(&req.zone_name);

    info!(dry = req.dry_run, zone_name = %zone_name, zone_id = %req.zone_id, "purgeZone");

    if zone_name.is_empty() && req.zone_id.is_empty() {
        return Err(Error::MissingInput("purgeZone: at least one of zoneName or zoneID is required".to_string()));
    }

    let zones = list_zones(provider)?;
    let zone = must_pick_zone(&zones, &zone_name, &req.zone_id)?;

    info!(zone_name = %zone.name, zone_id = %zone.id, "purgeZone: found zone");

    delete_hosted_zone(provider, req.dry_run, &zone)
}
