// Module defining the DNS data route53ctl works with: zones, record sets
// and the change batches that mutate them.

use std::time::Instant;

// What is a zone?  The provider's handle for a hosted zone.  created_at is
// only set when this run created the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub private: bool,
    pub created_at: Option<Instant>,
}

impl Zone {
    pub fn privacy(&self) -> &'static str {
        if self.private {
            "PRIVATE"
        } else {
            "PUBLIC"
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "zone={} id={} type={}", self.name, self.id, self.privacy())
    }
}

#[derive(Debug, Clone, Eq)]
pub struct AliasTarget {
    pub dns_name: String,
    pub hosted_zone_id: String,
    pub evaluate_target_health: bool,
}

// Route53 hands back alias names lowercased and fully qualified, so compare
// on that form.
impl PartialEq for AliasTarget {
    fn eq(&self, other: &Self) -> bool {
        same_name(&self.dns_name, &other.dns_name) &&
        self.hosted_zone_id         == other.hosted_zone_id &&
        self.evaluate_target_health == other.evaluate_target_health
    }
}

impl std::fmt::Display for AliasTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(dnsName={} hostedZoneId={} evaluateTargetHealth={})",
               self.dns_name, self.hosted_zone_id, self.evaluate_target_health)
    }
}

// A DNS node as the provider stores it.  Either alias_target is set or
// records holds literal values.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub name: String,
    pub rtype: String,
    pub set_identifier: Option<String>,
    pub ttl: Option<i64>,
    pub weight: Option<i64>,
    pub alias_target: Option<AliasTarget>,
    pub records: Vec<String>,
}

impl Eq for RecordSet { }

impl PartialEq for RecordSet {
    fn eq(&self, other: &Self) -> bool {
        let mut my_records = self.records.clone();
        my_records.sort();
        let mut other_records = other.records.clone();
        other_records.sort();
        same_name(&self.name, &other.name) &&
        self.rtype          == other.rtype &&
        self.set_identifier == other.set_identifier &&
        self.ttl            == other.ttl &&
        self.weight         == other.weight &&
        self.alias_target   == other.alias_target &&
        my_records          == other_records
    }
}

impl std::fmt::Display for RecordSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let alias = match &self.alias_target {
            Some(x) => x.to_string(),
            None => "()".to_string()
        };
        write!(f, "name={} required={} ttl={} type={} id={} weight={} aliasTarget={} records={}",
               self.name,
               self.non_deletable(),
               self.ttl.unwrap_or(0),
               self.rtype,
               self.set_identifier.as_ref().map(String::as_str).unwrap_or(""),
               self.weight.unwrap_or(0),
               alias,
               self.records.join(","))
    }
}

impl RecordSet {
    // SOA and NS belong to the zone itself; the provider refuses to delete
    // them and route53ctl never tries.
    pub fn non_deletable(&self) -> bool {
        self.rtype == "SOA" || self.rtype == "NS"
    }

    // True if both sets address the same provider record, whatever their
    // contents.
    pub fn same_slot(&self, other: &RecordSet) -> bool {
        same_name(&self.name, &other.name) &&
        self.rtype          == other.rtype &&
        self.set_identifier == other.set_identifier
    }
}

// Drop SOA/NS from a list of record sets
pub fn filter_user_records(sets: &[RecordSet]) -> Vec<RecordSet> {
    sets.iter().filter(|rrs| !rrs.non_deletable()).cloned().collect()
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim_end_matches('.').eq_ignore_ascii_case(b.trim_end_matches('.'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Upsert,
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
            ChangeAction::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub action: ChangeAction,
    pub record_set: RecordSet,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.action, self.record_set)
    }
}

// Ordered list of changes, submitted to the provider in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    pub fn new() -> ChangeBatch {
        ChangeBatch { changes: Vec::new() }
    }

    pub fn push(&mut self, action: ChangeAction, record_set: RecordSet) {
        self.changes.push(Change { action, record_set });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<Change> {
        self.changes.iter()
    }

    // Consecutive batches of at most `size` changes, in order
    pub fn split(&self, size: usize) -> Vec<ChangeBatch> {
        self.changes.chunks(size.max(1))
            .map(|c| ChangeBatch { changes: c.to_vec() })
            .collect()
    }
}
