// Picking the hosted zone a run operates on, or creating it.

use std::time::Instant;
use tracing::{info, warn};
use crate::error::{Error, Result};
use crate::provider::{CreateZoneRequest, DnsProvider};
use crate::resource::Zone;

const ZONE_ID_PREFIX: &str = "/hostedzone/";

// Zone ids come back from Route53 as "/hostedzone/<ID>"; users type the bare
// id.  Accept both.
pub fn normalize_zone_id(id: &str) -> String {
    if id.starts_with(ZONE_ID_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", ZONE_ID_PREFIX, id)
    }
}

pub fn trim_zone_id(id: &str) -> &str {
    id.trim_start_matches(ZONE_ID_PREFIX)
}

// Append the trailing dot Route53 uses in zone names
pub fn qualify_zone_name(name: &str) -> String {
    if name.is_empty() || name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Choose exactly one zone.  A supplied id is authoritative: it must match.
/// Without an id the name must match exactly one zone.
pub fn pick_zone<'a>(zones: &'a [Zone], name: &str, id: &str) -> Result<&'a Zone> {
    if zones.is_empty() {
        return Err(Error::NoZones);
    }

    if !id.is_empty() {
        let wanted = normalize_zone_id(id);
        return zones.iter().find(|z| normalize_zone_id(&z.id) == wanted).ok_or_else(|| {
            Error::ZoneNotFound { name: name.to_string(), id: id.to_string() }
        });
    }

    let mut found_by_name = Vec::new();
    for zone in zones {
        info!("pickZone: scanning: {}", zone);
        if zone.name == name {
            found_by_name.push(zone);
        }
    }

    match found_by_name.len() {
        1 => Ok(found_by_name[0]),
        0 => Err(Error::ZoneNotFound { name: name.to_string(), id: id.to_string() }),
        count => Err(Error::AmbiguousZone { name: name.to_string(), count }),
    }
}

// Strict variant used by purge: no fallback of any kind
pub fn must_pick_zone(zones: &[Zone], name: &str, id: &str) -> Result<Zone> {
    pick_zone(zones, name, id).map(Clone::clone)
}

/// Pick the zone, creating it when picking fails for any reason.  Creation
/// still needs the VPC and stops in dry-run, so a bad pick never goes on to
/// touch records.
#[allow(clippy::too_many_arguments)]
pub fn pick_or_create_zone<P: DnsProvider + ?Sized>(
    provider: &P,
    dry: bool,
    zones: &[Zone],
    name: &str,
    id: &str,
    vpc_id: &str,
    vpc_region: &str,
    caller_reference: &str,
) -> Result<Zone> {
    match pick_zone(zones, name, id) {
        Ok(zone) => Ok(zone.clone()),
        Err(e) => {
            warn!(zone_name = name, zone_id = id, error = %e, "pickOrCreateZone: falling back to zone creation");
            create_zone(provider, dry, name, vpc_id, vpc_region, caller_reference)
        }
    }
}

/// Create a private zone attached to the VPC.  caller_reference makes
/// provider-side retries idempotent.  In dry-run nothing is sent and the
/// run stops here, since there is no zone to list records from.
pub fn create_zone<P: DnsProvider + ?Sized>(
    provider: &P,
    dry: bool,
    name: &str,
    vpc_id: &str,
    vpc_region: &str,
    caller_reference: &str,
) -> Result<Zone> {
    if name.is_empty() {
        return Err(Error::MissingInput("createZone: zoneName is required".to_string()));
    }
    if vpc_id.is_empty() {
        return Err(Error::MissingInput("createZone: vpcID is required".to_string()));
    }
    if vpc_region.is_empty() {
        return Err(Error::MissingInput("createZone: vpcRegion is required".to_string()));
    }

    let request = CreateZoneRequest {
        name: name.to_string(),
        vpc_id: vpc_id.to_string(),
        vpc_region: vpc_region.to_string(),
        caller_reference: caller_reference.to_string(),
    };

    if dry {
        warn!(zone_name = name, vpc_id, vpc_region, "createZone: dry run prevented zone creation");
        return Err(Error::DryRunZoneCreation(name.to_string()));
    }

    let mut zone = provider.create_hosted_zone(&request)?;
    zone.created_at = Some(Instant::now());

    info!(zone_name = name, vpc_id, vpc_region, zone_id = %zone.id, "createZone: zone created");
    Ok(zone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, name: &str) -> Zone {
        Zone {
            id: format!("/hostedzone/{}", id),
            name: name.to_string(),
            private: true,
            created_at: None,
        }
    }

    fn zones() -> Vec<Zone> {
        vec![
            zone("Z1", "a.example."),
            zone("Z2", "b.example."),
            zone("Z3", "b.example."),
        ]
    }

    #[test]
    fn id_wins_regardless_of_order() {
        let mut list = zones();
        assert_eq!(pick_zone(&list, "", "Z3").unwrap().id, "/hostedzone/Z3");
        list.reverse();
        assert_eq!(pick_zone(&list, "", "Z3").unwrap().id, "/hostedzone/Z3");
        assert_eq!(pick_zone(&list, "b.example.", "/hostedzone/Z2").unwrap().id, "/hostedzone/Z2");
    }

    #[test]
    fn unmatched_id_is_an_error_even_if_the_name_matches() {
        match pick_zone(&zones(), "a.example.", "Z9").unwrap_err() {
            Error::ZoneNotFound { id, .. } => assert_eq!(id, "Z9"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn unique_name_is_picked() {
        assert_eq!(pick_zone(&zones(), "a.example.", "").unwrap().id, "/hostedzone/Z1");
    }

    #[test]
    fn duplicate_name_is_ambiguous() {
        match pick_zone(&zones(), "b.example.", "").unwrap_err() {
            Error::AmbiguousZone { count, .. } => assert_eq!(count, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_account_and_unknown_name() {
        assert!(matches!(pick_zone(&[], "a.example.", ""), Err(Error::NoZones)));
        assert!(matches!(pick_zone(&zones(), "c.example.", ""), Err(Error::ZoneNotFound { .. })));
    }

    #[test]
    fn must_pick_zone_returns_an_owned_zone() {
        let picked = must_pick_zone(&zones(), "a.example.", "").unwrap();
        assert_eq!(picked.name, "a.example.");
        assert!(must_pick_zone(&zones(), "b.example.", "").is_err());
    }

    #[test]
    fn zone_ids_and_names_are_normalised() {
        assert_eq!(normalize_zone_id("Z1"), "/hostedzone/Z1");
        assert_eq!(normalize_zone_id("/hostedzone/Z1"), "/hostedzone/Z1");
        assert_eq!(trim_zone_id("/hostedzone/Z1"), "Z1");
        assert_eq!(qualify_zone_name("a.example"), "a.example.");
        assert_eq!(qualify_zone_name("a.example."), "a.example.");
        assert_eq!(qualify_zone_name(""), "");
    }
}
