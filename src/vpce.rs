// VPC endpoint hostnames and the alias hosted zones that serve them.
//
// vpce-0abc123456789defg-abcdefgh.vpce-svc-0123456789abcdef.us-east-1.vpce.amazonaws.com

use std::collections::BTreeMap;
use crate::error::{Error, Result};

pub const VPCE_HOSTNAME_LABELS: usize = 6;
const REGION_LABEL: usize = 2;

// Pull the region label out of a VPC endpoint hostname
pub fn region_from_vpce_hostname(hostname: &str) -> Result<String> {
    let parts: Vec<&str> = hostname.split('.').collect();
    if parts.len() != VPCE_HOSTNAME_LABELS {
        return Err(Error::InvalidVpceHostname {
            hostname: hostname.to_string(),
            found: parts.len(),
            expected: VPCE_HOSTNAME_LABELS,
        });
    }
    Ok(parts[REGION_LABEL].to_string())
}

/// Region to hosted-zone-id table used as the alias target zone for VPC
/// endpoint records.  The default carries the regions route53ctl ships
/// with; the config file can add more.
///
/// See https://github.com/kubernetes-sigs/external-dns/issues/3429
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VpceZoneTable(pub BTreeMap<String, String>);

impl Default for VpceZoneTable {
    fn default() -> VpceZoneTable {
        let mut table = BTreeMap::new();
        table.insert("sa-east-1".to_string(), "Z2LXUWEVLCVZIB".to_string());
        table.insert("us-east-1".to_string(), "Z7HUB22UULQXV".to_string());
        VpceZoneTable(table)
    }
}

impl VpceZoneTable {
    // Entries in `extra` win over existing ones
    pub fn with_overrides(mut self, extra: &BTreeMap<String, String>) -> VpceZoneTable {
        for (region, zone_id) in extra {
            self.0.insert(region.to_string(), zone_id.to_string());
        }
        self
    }

    pub fn zone_id(&self, region: &str) -> Result<&str> {
        match self.0.get(region) {
            Some(x) => Ok(x.as_str()),
            None => Err(Error::UnknownRegion {
                region: region.to_string(),
                known: self.regions().join(", "),
            }),
        }
    }

    pub fn regions(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    // Both steps at once: hostname -> region -> alias zone id
    pub fn zone_id_for_hostname(&self, hostname: &str) -> Result<&str> {
        let region = region_from_vpce_hostname(hostname)?;
        self.zone_id(&region)
    }
}
