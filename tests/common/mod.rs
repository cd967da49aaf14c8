//! Test doubles for the contract tests
//!
//! `FakeProvider` keeps zones and record sets in memory, serves them in
//! small pages and records every call it receives, so tests can check both
//! the outcome and which provider calls were made.

#![allow(dead_code)]

use route53ctl::address::HostResolver;
use route53ctl::provider::{CreateZoneRequest, DnsProvider, RecordCursor, RecordPage, ZonePage};
use route53ctl::resource::{ChangeAction, ChangeBatch, RecordSet, Zone};
use route53ctl::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::net::IpAddr;

pub const VPCE: &str = "vpce-0abc123456789defg-abcdefgh.vpce-svc-0123456789abcdef.us-east-1.vpce.amazonaws.com";

/// One provider call, as seen by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListZones,
    ListRecords(String),
    CreateZone(CreateZoneRequest),
    DeleteZone(String),
    ChangeRecords(String, ChangeBatch),
}

impl Call {
    pub fn is_write(&self) -> bool {
        match self {
            Call::CreateZone(_) | Call::DeleteZone(_) | Call::ChangeRecords(..) => true,
            _ => false,
        }
    }
}

struct State {
    zones: Vec<Zone>,
    records: HashMap<String, Vec<RecordSet>>,
    calls: Vec<Call>,
    next_id: usize,
}

pub struct FakeProvider {
    state: RefCell<State>,
    page_size: usize,
}

pub fn soa(zone_name: &str) -> RecordSet {
    RecordSet {
        name: zone_name.to_string(),
        rtype: "SOA".to_string(),
        ttl: Some(900),
        records: vec!["ns-1536.awsdns-00.co.uk. awsdns-hostmaster.amazon.com. 1 7200 900 1209600 86400".to_string()],
        ..Default::default()
    }
}

pub fn ns(zone_name: &str) -> RecordSet {
    RecordSet {
        name: zone_name.to_string(),
        rtype: "NS".to_string(),
        ttl: Some(172800),
        records: vec!["ns-1536.awsdns-00.co.uk.".to_string()],
        ..Default::default()
    }
}

pub fn a_record(zone_name: &str, label: &str, value: &str) -> RecordSet {
    RecordSet {
        name: format!("{}.{}", label, zone_name),
        rtype: "A".to_string(),
        ttl: Some(300),
        records: vec![value.to_string()],
        ..Default::default()
    }
}

impl FakeProvider {
    /// Empty account, pages of two items
    pub fn new() -> FakeProvider {
        FakeProvider::with_page_size(2)
    }

    pub fn with_page_size(page_size: usize) -> FakeProvider {
        FakeProvider {
            state: RefCell::new(State {
                zones: Vec::new(),
                records: HashMap::new(),
                calls: Vec::new(),
                next_id: 1,
            }),
            page_size,
        }
    }

    /// Add a zone holding SOA and NS; returns its id
    pub fn add_zone(&self, name: &str) -> String {
        let mut state = self.state.borrow_mut();
        let id = format!("/hostedzone/Z{}", state.next_id);
        state.next_id += 1;
        state.zones.push(Zone { id: id.clone(), name: name.to_string(), private: true, created_at: None });
        state.records.insert(id.clone(), vec![soa(name), ns(name)]);
        id
    }

    pub fn add_record(&self, zone_id: &str, rrs: RecordSet) {
        self.state.borrow_mut().records.entry(zone_id.to_string()).or_insert_with(Vec::new).push(rrs);
    }

    pub fn records(&self, zone_id: &str) -> Vec<RecordSet> {
        self.state.borrow().records.get(zone_id).cloned().unwrap_or_default()
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.state.borrow().zones.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn writes(&self) -> usize {
        self.calls().iter().filter(|c| c.is_write()).count()
    }

    pub fn reads(&self) -> usize {
        self.calls().iter().filter(|c| !c.is_write()).count()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

// Cursors are plain offsets into the list; the fake puts the offset in
// the record name slot.
fn page<T: Clone>(items: &[T], offset: usize, size: usize) -> (Vec<T>, Option<usize>) {
    let end = (offset + size).min(items.len());
    let next = if end < items.len() { Some(end) } else { None };
    (items[offset.min(items.len())..end].to_vec(), next)
}

impl DnsProvider for FakeProvider {
    fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        self.record(Call::ListZones);
        let offset = marker.map(|m| m.parse().unwrap()).unwrap_or(0);
        let (zones, next) = page(&self.state.borrow().zones, offset, self.page_size);
        Ok(ZonePage { zones, next_marker: next.map(|n| n.to_string()) })
    }

    fn list_record_sets(&self, zone_id: &str, start: Option<&RecordCursor>) -> Result<RecordPage> {
        self.record(Call::ListRecords(zone_id.to_string()));
        let all = match self.state.borrow().records.get(zone_id) {
            Some(x) => x.clone(),
            None => return Err(Error::provider("ListResourceRecordSets", format!("NoSuchHostedZone: {}", zone_id))),
        };
        let offset = start.map(|c| c.name.parse().unwrap()).unwrap_or(0);
        let (record_sets, next) = page(&all, offset, self.page_size);
        Ok(RecordPage {
            record_sets,
            next: next.map(|n| RecordCursor { name: n.to_string(), rtype: "A".to_string(), identifier: None }),
        })
    }

    fn create_hosted_zone(&self, request: &CreateZoneRequest) -> Result<Zone> {
        self.record(Call::CreateZone(request.clone()));
        let id = self.add_zone(&request.name);
        Ok(Zone { id, name: request.name.clone(), private: true, created_at: None })
    }

    fn delete_hosted_zone(&self, zone_id: &str) -> Result<()> {
        self.record(Call::DeleteZone(zone_id.to_string()));
        let mut state = self.state.borrow_mut();
        let left = state.records.get(zone_id).map(|r| r.iter().filter(|x| !x.non_deletable()).count());
        if left.unwrap_or(0) > 0 {
            return Err(Error::provider("DeleteHostedZone", "HostedZoneNotEmpty"));
        }
        state.zones.retain(|z| z.id != zone_id);
        state.records.remove(zone_id);
        Ok(())
    }

    fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<String> {
        self.record(Call::ChangeRecords(zone_id.to_string(), batch.clone()));
        let mut state = self.state.borrow_mut();
        let records = state.records.entry(zone_id.to_string()).or_insert_with(Vec::new);
        for change in batch.iter() {
            let rrs = &change.record_set;
            match change.action {
                ChangeAction::Upsert => match records.iter_mut().find(|r| r.same_slot(rrs)) {
                    Some(existing) => *existing = rrs.clone(),
                    None => records.push(rrs.clone()),
                },
                ChangeAction::Delete => {
                    if rrs.non_deletable() {
                        return Err(Error::provider("ChangeResourceRecordSets", "InvalidChangeBatch"));
                    }
                    records.retain(|r| !r.same_slot(rrs));
                }
            }
        }
        state.next_id += 1;
        Ok(format!("/change/C{}", state.next_id))
    }
}

/// Resolver backed by a fixed host table; literal addresses pass through
pub struct StaticResolver(pub HashMap<String, Vec<IpAddr>>);

impl StaticResolver {
    /// Entries are (host, "addr1,addr2,...")
    pub fn new(entries: &[(&str, &str)]) -> StaticResolver {
        let mut map = HashMap::new();
        for (host, addrs) in entries {
            map.insert(host.to_string(), addrs.split(',').map(|a| a.parse().unwrap()).collect());
        }
        StaticResolver(map)
    }
}

impl HostResolver for StaticResolver {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        self.0.get(host).cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such host: {}", host)))
    }
}
