// The DNS provider boundary.  Everything route53ctl needs from the remote
// side goes through DnsProvider; r53.rs implements it on top of rusoto.

use std::marker::PhantomData;
use crate::error::Result;
use crate::resource::{ChangeBatch, RecordSet, Zone};
use tracing::{debug, info};

// One page of hosted zones; next_marker is None on the last page.
#[derive(Debug, Clone, Default)]
pub struct ZonePage {
    pub zones: Vec<Zone>,
    pub next_marker: Option<String>,
}

// Route53 resumes record listings at a (name, type, identifier) triple
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCursor {
    pub name: String,
    pub rtype: String,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub record_sets: Vec<RecordSet>,
    pub next: Option<RecordCursor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateZoneRequest {
    pub name: String,
    pub vpc_id: String,
    pub vpc_region: String,
    pub caller_reference: String,
}

pub trait DnsProvider {
    fn list_hosted_zones(&self, marker: Option<&str>) -> Result<ZonePage>;

    fn list_record_sets(&self, zone_id: &str, start: Option<&RecordCursor>) -> Result<RecordPage>;

    fn create_hosted_zone(&self, request: &CreateZoneRequest) -> Result<Zone>;

    fn delete_hosted_zone(&self, zone_id: &str) -> Result<()>;

    /// Submit a change batch atomically, returning the provider's change id.
    fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<String>;
}

/// Lazy sequence of pages pulled through `fetch`, which receives the cursor
/// of the previous page (None for the first one) and returns the items plus
/// the cursor of the next page, if any.
///
/// The sequence ends after the first page without a next cursor, or right
/// after yielding an error.  `restart` rewinds it to the first page.
pub struct Pages<T, C, F>
where
    F: FnMut(Option<&C>) -> Result<(Vec<T>, Option<C>)>,
{
    fetch: F,
    cursor: Option<C>,
    done: bool,
    fetched: usize,
    items: PhantomData<fn() -> T>,
}

pub fn pages<T, C, F>(fetch: F) -> Pages<T, C, F>
where
    F: FnMut(Option<&C>) -> Result<(Vec<T>, Option<C>)>,
{
    Pages { fetch, cursor: None, done: false, fetched: 0, items: PhantomData }
}

impl<T, C, F> Pages<T, C, F>
where
    F: FnMut(Option<&C>) -> Result<(Vec<T>, Option<C>)>,
{
    pub fn restart(&mut self) {
        self.cursor = None;
        self.done = false;
        self.fetched = 0;
    }

    pub fn fetched(&self) -> usize {
        self.fetched
    }
}

impl<T, C, F> Iterator for Pages<T, C, F>
where
    F: FnMut(Option<&C>) -> Result<(Vec<T>, Option<C>)>,
{
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match (self.fetch)(self.cursor.as_ref()) {
            Ok((items, next)) => {
                self.fetched += 1;
                self.done = next.is_none();
                self.cursor = next;
                Some(Ok(items))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Consume every page.  A failed page fails the whole listing, so callers
/// never act on a partial view.
pub fn drain<T, I>(pages: I) -> Result<Vec<T>>
where
    I: Iterator<Item = Result<Vec<T>>>,
{
    let mut all = Vec::new();
    for page in pages {
        let mut items = page?;
        all.append(&mut items);
    }
    Ok(all)
}

// Retrieve every hosted zone in the account
pub fn list_zones<P: DnsProvider + ?Sized>(provider: &P) -> Result<Vec<Zone>> {
    let mut zone_pages = pages(|marker: Option<&String>| {
        let page = provider.list_hosted_zones(marker.map(String::as_str))?;
        Ok((page.zones, page.next_marker))
    });
    let zones = drain(&mut zone_pages)?;
    debug!(pages = zone_pages.fetched(), "listZones: pagination drained");
    info!("listZones: found {} zone(s)", zones.len());
    Ok(zones)
}

// Retrieve every record set of a zone
pub fn list_records<P: DnsProvider + ?Sized>(provider: &P, zone_id: &str) -> Result<Vec<RecordSet>> {
    let mut record_pages = pages(|start: Option<&RecordCursor>| {
        let page = provider.list_record_sets(zone_id, start)?;
        Ok((page.record_sets, page.next))
    });
    let sets = drain(&mut record_pages)?;
    debug!(zone_id, pages = record_pages.fetched(), "listRecords: pagination drained");
    info!(zone_id, "listRecords: found {} record set(s)", sets.len());
    Ok(sets)
}
