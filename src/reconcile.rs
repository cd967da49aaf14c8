// Turning rules plus the zone's current record sets into a change batch.
//
// Every rule becomes one weighted record set at the zone apex.  The batch
// only upserts: weighted targets missing from the rule list are left alone,
// the rule list is expected to be complete on every run.
//
// SOA and NS are never deleted.  The one exception to leaving them untouched
// is NegativeCachePolicy::Enforce, which upserts the SOA to set its minimum
// field and TTL.  Under the default Preserve policy negative_ttl only ever
// produces a warning.

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use crate::error::{Error, Result};
use crate::provider::DnsProvider;
use crate::resource::{AliasTarget, ChangeAction, ChangeBatch, RecordSet, Zone};
use crate::rule::{Rule, Target};

// Route53 limit on SetIdentifier length
const MAX_SET_IDENTIFIER: usize = 128;
// Hex digits of the value digest kept in a shortened identifier
const IDENTIFIER_DIGEST_LEN: usize = 16;
// Position of the negative caching TTL in an SOA value
const SOA_MINIMUM_FIELD: usize = 6;

/// What to do about the SOA minimum field, which sets how long resolvers
/// cache negative answers for the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeCachePolicy {
    /// Leave the SOA alone, warn if it disagrees with the requested TTL
    Preserve,
    /// Upsert the SOA so its minimum and TTL equal the requested TTL
    Enforce,
}

impl Default for NegativeCachePolicy {
    fn default() -> NegativeCachePolicy {
        NegativeCachePolicy::Preserve
    }
}

/// "kind:value", or when that is too long for Route53, a prefix of it
/// followed by '#' and a digest of the whole string.
pub fn set_identifier(rule: &Rule) -> String {
    let full = format!("{}:{}", rule.kind(), rule.value());
    if full.chars().count() <= MAX_SET_IDENTIFIER {
        return full;
    }

    let mut hasher = Sha256::new();
    hasher.update(full.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let keep = MAX_SET_IDENTIFIER - IDENTIFIER_DIGEST_LEN - 1;
    let prefix: String = full.chars().take(keep).collect();
    format!("{}#{}", prefix, &digest[..IDENTIFIER_DIGEST_LEN])
}

// Later duplicates (same kind and value) win
fn distinct_rules(rules: &[Rule]) -> Vec<&Rule> {
    rules.iter().enumerate()
        .filter(|(i, r)| {
            !rules[i + 1..].iter().any(|o| o.kind() == r.kind() && o.value() == r.value())
        })
        .map(|(_, r)| r)
        .collect()
}

/// Record sets the rules ask for, in rule order.  An "ip" rule yields an A
/// set and/or an AAAA set depending on the address families it resolved to.
pub fn desired_record_sets(zone_name: &str, rules: &[Rule], ttl: i64) -> Vec<RecordSet> {
    let mut sets = Vec::new();
    for rule in distinct_rules(rules) {
        let id = set_identifier(rule);
        match rule.target() {
            Target::Addresses(addrs) => {
                let v4: Vec<String> = addrs.iter().filter(|a| a.is_ipv4()).map(|a| a.to_string()).collect();
                let v6: Vec<String> = addrs.iter().filter(|a| a.is_ipv6()).map(|a| a.to_string()).collect();
                for (rtype, records) in vec![("A", v4), ("AAAA", v6)] {
                    if records.is_empty() {
                        continue;
                    }
                    sets.push(RecordSet {
                        name: zone_name.to_string(),
                        rtype: rtype.to_string(),
                        set_identifier: Some(id.clone()),
                        ttl: Some(ttl),
                        weight: Some(rule.weight()),
                        alias_target: None,
                        records,
                    });
                }
            }
            Target::Alias { hosted_zone_id } => {
                sets.push(RecordSet {
                    name: zone_name.to_string(),
                    rtype: "A".to_string(),
                    set_identifier: Some(id),
                    ttl: None,
                    weight: Some(rule.weight()),
                    alias_target: Some(AliasTarget {
                        dns_name: rule.value().to_string(),
                        hosted_zone_id: hosted_zone_id.to_string(),
                        evaluate_target_health: true,
                    }),
                    records: Vec::new(),
                });
            }
        }
    }
    sets
}

fn soa_minimum(soa: &RecordSet) -> Option<i64> {
    soa.records.first()
        .and_then(|v| v.split_whitespace().nth(SOA_MINIMUM_FIELD))
        .and_then(|m| m.parse().ok())
}

fn with_soa_minimum(value: &str, minimum: i64) -> String {
    let mut fields: Vec<String> = value.split_whitespace().map(String::from).collect();
    if fields.len() > SOA_MINIMUM_FIELD {
        fields[SOA_MINIMUM_FIELD] = minimum.to_string();
    }
    fields.join(" ")
}

/// The SOA upsert needed to bring negative caching to `negative_ttl`, if
/// any.  Only the minimum field and the record TTL change.
pub fn negative_cache_record(current: &[RecordSet], negative_ttl: i64, policy: NegativeCachePolicy)
                             -> Option<RecordSet> {
    let soa = match current.iter().find(|rrs| rrs.rtype == "SOA") {
        Some(x) => x,
        None => {
            warn!("updateRecords: zone has no SOA record, negative cache TTL not checked");
            return None;
        }
    };

    let minimum = soa_minimum(soa);
    if minimum == Some(negative_ttl) && soa.ttl == Some(negative_ttl) {
        return None;
    }

    match policy {
        NegativeCachePolicy::Preserve => {
            warn!(soa_minimum = ?minimum, soa_ttl = ?soa.ttl, negative_ttl,
                  "updateRecords: SOA negative caching differs from requested TTL, leaving it as is");
            None
        }
        NegativeCachePolicy::Enforce => {
            if minimum.is_none() {
                warn!(soa = %soa, "updateRecords: unparseable SOA, negative cache TTL not enforced");
                return None;
            }
            let mut updated = soa.clone();
            updated.ttl = Some(negative_ttl);
            updated.records = soa.records.iter().map(|v| with_soa_minimum(v, negative_ttl)).collect();
            Some(updated)
        }
    }
}

// Fail if two record sets address the same provider record
fn check_slots(sets: &[RecordSet]) -> Result<()> {
    for (i, rrs) in sets.iter().enumerate() {
        if sets[..i].iter().any(|o| o.same_slot(rrs)) {
            return Err(Error::ConflictingRecords {
                name: rrs.name.clone(),
                rtype: rrs.rtype.clone(),
                identifier: rrs.set_identifier.clone().unwrap_or_default(),
            });
        }
    }
    Ok(())
}

/// Build the change batch for `rules` against the zone's current record
/// sets.  Sets already present with identical contents are skipped, so a
/// converged zone produces an empty batch.  Nothing is sent from here.
///
/// Two desired sets landing on the same record slot is an error: the batch
/// would hold two changes for one record.
pub fn update_records(zone: &Zone, current: &[RecordSet], rules: &[Rule], ttl: i64,
                      negative_ttl: i64, policy: NegativeCachePolicy) -> Result<ChangeBatch> {
    let desired = desired_record_sets(&zone.name, rules, ttl);
    check_slots(&desired)?;

    let mut batch = ChangeBatch::new();

    if let Some(soa) = negative_cache_record(current, negative_ttl, policy) {
        batch.push(ChangeAction::Upsert, soa);
    }

    for desired in desired {
        if current.iter().any(|rrs| rrs == &desired) {
            info!(zone_id = %zone.id, "updateRecords: unchanged: {}", desired);
            continue;
        }
        batch.push(ChangeAction::Upsert, desired);
    }

    Ok(batch)
}

/// Submit a batch unless dry-run is on.  Returns the provider change id of
/// a submitted batch.  Empty batches are never sent.
pub fn apply_batch<P: DnsProvider + ?Sized>(provider: &P, dry: bool, zone: &Zone, batch: &ChangeBatch)
                                            -> Result<Option<String>> {
    for change in batch.iter() {
        info!(dry, zone_id = %zone.id, "changeBatch: {}", change);
    }

    if batch.is_empty() {
        info!(zone_id = %zone.id, "changeBatch: no changes detected");
        return Ok(None);
    }

    if dry {
        warn!(zone_id = %zone.id, changes = batch.len(), "changeBatch: dry run, batch not submitted");
        return Ok(None);
    }

    let change_id = provider.change_record_sets(&zone.id, batch)?;
    info!(zone_id = %zone.id, change_id = %change_id, changes = batch.len(), "changeBatch: submitted");
    Ok(Some(change_id))
}
