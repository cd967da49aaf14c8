// Functions for talking to Route53
use std::str::FromStr;
use rusoto_core::{HttpClient, Region};
use rusoto_route53::{Route53, Route53Client};
use rusoto_route53::{ChangeResourceRecordSetsRequest, CreateHostedZoneRequest, DeleteHostedZoneRequest,
                     ListHostedZonesRequest, ListResourceRecordSetsRequest};
use rusoto_route53::{HostedZone, HostedZoneConfig, ResourceRecord, ResourceRecordSet, VPC};
use rusoto_sts::{StsAssumeRoleSessionCredentialsProvider, StsClient};
use tracing::debug;
use crate::error::{Error, Result};
use crate::provider::{CreateZoneRequest, DnsProvider, RecordCursor, RecordPage, ZonePage};
use crate::resource::{AliasTarget, ChangeBatch, RecordSet, Zone};
use crate::zone::{normalize_zone_id, trim_zone_id};
use crate::ProviderConfig;

// Route53 accepts at most this many items per list page
const PAGE_SIZE: &str = "500";

pub struct Route53Provider {
    client: Route53Client,
}

impl Route53Provider {
    // Build a client from the provider config, assuming a role through STS
    // when asked to.
    pub fn new(conf: &ProviderConfig) -> Result<Route53Provider> {
        let region = parse_region(conf.region.as_ref().map(String::as_str))?;

        if !conf.assume_role {
            return Ok(Route53Provider { client: Route53Client::new(region) });
        }

        let arn = match &conf.role_arn {
            Some(x) => x.to_string(),
            None => {
                return Err(Error::Config("assume_role = true but no role_arn given".to_string()));
            }
        };
        let session = match &conf.session_name {
            Some(x) => x.to_string(),
            None => "default".to_string()
        };
        let sts = StsClient::new(region.to_owned());
        let provider = StsAssumeRoleSessionCredentialsProvider::new(
            sts,
            arn,
            session,
            None, None, None, None
        );
        let dispatcher = HttpClient::new()
            .map_err(|e| Error::Config(format!("unable to build HTTP client: {:?}", e)))?;
        Ok(Route53Provider { client: Route53Client::new_with(dispatcher, provider, region) })
    }
}

// Region from the config, or rusoto's default when none is set.  A name
// rusoto does not know is a config error.
fn parse_region(name: Option<&str>) -> Result<Region> {
    match name {
        Some(x) => Region::from_str(x)
            .map_err(|_| Error::Config(format!("unknown provider region: {}", x))),
        None => Ok(Region::default()),
    }
}

impl DnsProvider for Route53Provider {
    fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        let req = ListHostedZonesRequest {
            marker: marker.map(String::from),
            max_items: Some(PAGE_SIZE.to_string()),
            ..Default::default()
        };
        let output = self.client.list_hosted_zones(req).sync()
            .map_err(|e| Error::provider("ListHostedZones", e.to_string()))?;
        debug!(truncated = output.is_truncated, "ListHostedZones: got {} zone(s)", output.hosted_zones.len());
        let next_marker = if output.is_truncated { output.next_marker } else { None };
        Ok(ZonePage {
            zones: output.hosted_zones.into_iter().map(parse_zone).collect(),
            next_marker,
        })
    }

    fn list_record_sets(&self, zone_id: &str, start: Option<&RecordCursor>) -> Result<RecordPage> {
        let mut req = ListResourceRecordSetsRequest {
            hosted_zone_id: trim_zone_id(zone_id).to_string(),
            max_items: Some(PAGE_SIZE.to_string()),
            ..Default::default()
        };
        if let Some(cursor) = start {
            req.start_record_name = Some(cursor.name.to_string());
            req.start_record_type = Some(cursor.rtype.to_string());
            req.start_record_identifier = cursor.identifier.clone();
        }
        let output = self.client.list_resource_record_sets(req).sync()
            .map_err(|e| Error::provider("ListResourceRecordSets", format!("zoneID={}: {}", zone_id, e)))?;
        debug!(zone_id, truncated = output.is_truncated,
               "ListResourceRecordSets: got {} record set(s)", output.resource_record_sets.len());

        // Loop until is_truncated comes back false
        let next = match (output.is_truncated, output.next_record_name, output.next_record_type) {
            (true, Some(name), Some(rtype)) => Some(RecordCursor {
                name,
                rtype,
                identifier: output.next_record_identifier,
            }),
            _ => None,
        };
        Ok(RecordPage {
            record_sets: output.resource_record_sets.into_iter().map(parse_record_set).collect(),
            next,
        })
    }

    fn create_hosted_zone(&self, request: &CreateZoneRequest) -> Result<Zone> {
        let req = CreateHostedZoneRequest {
            caller_reference: request.caller_reference.to_string(),
            name: request.name.to_string(),
            vpc: Some(VPC {
                vpc_id: Some(request.vpc_id.to_string()),
                vpc_region: Some(request.vpc_region.to_string()),
            }),
            hosted_zone_config: Some(HostedZoneConfig {
                comment: Some("managed by route53ctl".to_string()),
                private_zone: Some(true),
            }),
            ..Default::default()
        };
        let output = self.client.create_hosted_zone(req).sync()
            .map_err(|e| Error::provider("CreateHostedZone", format!("zoneName={}: {}", request.name, e)))?;
        Ok(parse_zone(output.hosted_zone))
    }

    fn delete_hosted_zone(&self, zone_id: &str) -> Result<()> {
        let req = DeleteHostedZoneRequest { id: trim_zone_id(zone_id).to_string() };
        self.client.delete_hosted_zone(req).sync()
            .map_err(|e| Error::provider("DeleteHostedZone", format!("zoneID={}: {}", zone_id, e)))?;
        Ok(())
    }

    fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<String> {
        let changes = batch.iter()
            .map(|c| rusoto_route53::Change {
                action: c.action.as_str().to_string(),
                resource_record_set: to_record_set(&c.record_set),
            })
            .collect();
        let req = ChangeResourceRecordSetsRequest {
            hosted_zone_id: trim_zone_id(zone_id).to_string(),
            change_batch: rusoto_route53::ChangeBatch {
                changes,
                comment: Some("route53ctl".to_string()),
            },
        };
        let output = self.client.change_resource_record_sets(req).sync()
            .map_err(|e| Error::provider("ChangeResourceRecordSets", format!("zoneID={}: {}", zone_id, e)))?;
        Ok(output.change_info.id)
    }
}

fn parse_zone(zone: HostedZone) -> Zone {
    let private = zone.config.and_then(|c| c.private_zone).unwrap_or(false);
    Zone {
        id: normalize_zone_id(&zone.id),
        name: zone.name,
        private,
        created_at: None,
    }
}

// Take a Route53 ResourceRecordSet, convert to our RecordSet
fn parse_record_set(rec: ResourceRecordSet) -> RecordSet {
    // resource_records is an Option<Vec<ResourceRecord>>
    let records = match rec.resource_records {
        Some(x) => x.into_iter().map(|r| r.value).collect(),
        None => Vec::new()
    };
    RecordSet {
        name: rec.name,
        rtype: rec.type_,
        set_identifier: rec.set_identifier,
        ttl: rec.ttl,
        weight: rec.weight,
        alias_target: rec.alias_target.map(|a| AliasTarget {
            dns_name: a.dns_name,
            hosted_zone_id: a.hosted_zone_id,
            evaluate_target_health: a.evaluate_target_health,
        }),
        records,
    }
}

fn to_record_set(rrs: &RecordSet) -> ResourceRecordSet {
    let resource_records = if rrs.records.is_empty() {
        None
    } else {
        Some(rrs.records.iter().map(|v| ResourceRecord { value: v.to_string() }).collect())
    };
    ResourceRecordSet {
        name: rrs.name.to_string(),
        type_: rrs.rtype.to_string(),
        set_identifier: rrs.set_identifier.clone(),
        ttl: rrs.ttl,
        weight: rrs.weight,
        alias_target: rrs.alias_target.as_ref().map(|a| rusoto_route53::AliasTarget {
            dns_name: a.dns_name.to_string(),
            hosted_zone_id: a.hosted_zone_id.to_string(),
            evaluate_target_health: a.evaluate_target_health,
        }),
        resource_records,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_region_must_be_known() {
        assert_eq!(parse_region(Some("sa-east-1")).unwrap(), Region::SaEast1);
        match parse_region(Some("sa-east-9")).unwrap_err() {
            Error::Config(msg) => assert!(msg.contains("sa-east-9")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn hosted_zone_is_converted_with_its_privacy() {
        let zone = parse_zone(HostedZone {
            id: "/hostedzone/Z1".to_string(),
            name: "internal.example.".to_string(),
            config: Some(HostedZoneConfig { comment: None, private_zone: Some(true) }),
            ..Default::default()
        });
        assert_eq!(zone.id, "/hostedzone/Z1");
        assert!(zone.private);
        assert!(zone.created_at.is_none());
    }

    #[test]
    fn record_sets_convert_both_ways() {
        let ours = RecordSet {
            name: "internal.example.".to_string(),
            rtype: "A".to_string(),
            set_identifier: Some("ip:10.0.0.1".to_string()),
            ttl: Some(44),
            weight: Some(3),
            alias_target: None,
            records: vec!["10.0.0.1".to_string()],
        };
        assert_eq!(parse_record_set(to_record_set(&ours)), ours);
    }

    #[test]
    fn alias_sets_carry_no_records() {
        let ours = RecordSet {
            name: "internal.example.".to_string(),
            rtype: "A".to_string(),
            set_identifier: Some("vpce:x".to_string()),
            weight: Some(1),
            alias_target: Some(AliasTarget {
                dns_name: "vpce-1.vpce-svc-1.us-east-1.vpce.amazonaws.com".to_string(),
                hosted_zone_id: "Z7HUB22UULQXV".to_string(),
                evaluate_target_health: true,
            }),
            ..Default::default()
        };
        let theirs = to_record_set(&ours);
        assert!(theirs.resource_records.is_none());
        assert!(theirs.ttl.is_none());
        assert_eq!(theirs.alias_target.unwrap().hosted_zone_id, "Z7HUB22UULQXV");
    }
}
