// Error type shared by every stage of a route53ctl run.  Nothing in the
// library exits the process; main decides what an error means for the
// exit status.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Rule string failed validation (field count, kind, weight)
    #[error("bad rule: {rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("unexpected vpce hostname format: {hostname} (parts={found}, expected={expected})")]
    InvalidVpceHostname {
        hostname: String,
        found: usize,
        expected: usize,
    },

    /// Region missing from the VPCE alias zone table
    #[error("unknown zone ID for VPCE at region={region}: known regions: {known}")]
    UnknownRegion { region: String, known: String },

    #[error("missing input: {0}")]
    MissingInput(String),

    /// Hostname resolution failed for an "ip" rule
    #[error("lookup failed: rule={rule} host={host}: {source}")]
    Lookup {
        rule: String,
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("there is no zone in route53")]
    NoZones,

    #[error("zone not found: zoneName={name} zoneID={id}")]
    ZoneNotFound { name: String, id: String },

    #[error("found {count} zone(s) by name {name}, please supply zoneID")]
    AmbiguousZone { name: String, count: usize },

    /// Two desired record sets address the same (name, type, identifier)
    #[error("conflicting record sets: name={name} type={rtype} setIdentifier={identifier}")]
    ConflictingRecords {
        name: String,
        rtype: String,
        identifier: String,
    },

    #[error("dry run prevented zone creation: zoneName={0}")]
    DryRunZoneCreation(String),

    /// Any failure reported by the DNS provider API
    #[error("{operation}: provider error: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn provider(operation: &'static str, message: impl Into<String>) -> Self {
        Error::Provider {
            operation,
            message: message.into(),
        }
    }

    // True for problems the operator fixes by changing the invocation, as
    // opposed to failures that happened while talking to the provider.
    pub fn is_usage(&self) -> bool {
        match self {
            Error::InvalidRule { .. }
            | Error::InvalidVpceHostname { .. }
            | Error::UnknownRegion { .. }
            | Error::MissingInput(_)
            | Error::AmbiguousZone { .. }
            | Error::ConflictingRecords { .. }
            | Error::Config(_) => true,
            _ => false,
        }
    }
}
