#[macro_use] extern crate serde_derive;
extern crate serde;
extern crate serde_json;
extern crate rusoto_core;
extern crate rusoto_route53;
extern crate rusoto_sts;
extern crate sha2;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

// Sub-modules for parsing rules, picking zones and talking to AWS
pub mod error;
pub mod resource;
pub mod provider;
pub mod r53;
pub mod address;
pub mod vpce;
pub mod rule;
pub mod zone;
pub mod reconcile;
pub mod purge;
pub mod ops;

pub use error::{Error, Result};
pub use ops::{purge, reconcile, PurgeRequest, ReconcileReport, ReconcileRequest};
pub use purge::PurgeReport;
pub use reconcile::NegativeCachePolicy;
pub use vpce::VpceZoneTable;

// Define a struct for holding configuration metadata.  Every section is
// optional; an empty file means defaults.
#[derive(Deserialize, Debug, Default)]
pub struct Route53ctlConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    // Extra or replacement region -> alias hosted zone id entries
    #[serde(default)]
    pub vpce_zones: BTreeMap<String, String>,
    #[serde(default)]
    pub negative_cache: NegativeCachePolicy,
}

// Define a struct for holding provider configuration metadata
// If assume_role is true, role_arn needs to be populated
// Region is optional as well
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ProviderConfig {
    pub region: Option<String>,
    #[serde(default)]
    pub assume_role: bool,
    pub role_arn: Option<String>,
    pub session_name: Option<String>
}

impl Route53ctlConfig {
    pub fn vpce_table(&self) -> VpceZoneTable {
        VpceZoneTable::default().with_overrides(&self.vpce_zones)
    }
}

// Load in a config file and deserialize it into a Route53ctlConfig struct
pub fn load_config(fname: &str) -> Result<Route53ctlConfig> {
    let f = File::open(fname)
        .map_err(|e| Error::Config(format!("error opening file {}: {}", fname, e)))?;
    let reader = BufReader::new(f);
    serde_json::from_reader(reader)
        .map_err(|e| Error::Config(format!("error parsing config JSON {}: {}", fname, e)))
}
