// Rule parsing.  A rule is "weight:kind:value":
//
//   10:ip:10.0.0.1,web.internal
//   20:vpce:vpce-0abc-x.vpce-svc-0123.us-east-1.vpce.amazonaws.com
//
// Targets are resolved while parsing so a bad rule stops the run before
// any provider call.

use std::net::IpAddr;
use std::str::FromStr;
use crate::address::{resolve_ip_value, HostResolver};
use crate::error::{Error, Result};
use crate::vpce::VpceZoneTable;

const RULE_FIELDS: usize = 3;
// Route53 weights run from 0 to 255
const MAX_WEIGHT: i64 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Ip,
    Vpce,
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<RuleKind, String> {
        match s {
            "ip" => Ok(RuleKind::Ip),
            "vpce" => Ok(RuleKind::Vpce),
            _ => Err(format!("unexpected rule kind: {} (should be ip or vpce)", s)),
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RuleKind::Ip => f.write_str("ip"),
            RuleKind::Vpce => f.write_str("vpce"),
        }
    }
}

// Resolved target of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Addresses(Vec<IpAddr>),
    Alias { hosted_zone_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    weight: i64,
    kind: RuleKind,
    value: String,
    target: Target,
}

impl Rule {
    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn addresses(&self) -> &[IpAddr] {
        match &self.target {
            Target::Addresses(x) => x,
            Target::Alias { .. } => &[],
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.weight, self.kind, self.value)
    }
}

fn invalid(rule: &str, reason: String) -> Error {
    Error::InvalidRule { rule: rule.to_string(), reason }
}

pub fn parse_rule<R: HostResolver + ?Sized>(s: &str, resolver: &R, table: &VpceZoneTable) -> Result<Rule> {
    let fields: Vec<&str> = s.splitn(RULE_FIELDS, ':').collect();
    if fields.len() != RULE_FIELDS {
        return Err(invalid(s, format!("wrong number of fields in rule: {} (should be {})",
                                      fields.len(), RULE_FIELDS)));
    }

    let kind: RuleKind = fields[1].parse().map_err(|e| invalid(s, e))?;

    let weight: i64 = fields[0].parse()
        .map_err(|e| invalid(s, format!("error converting weight: {}: {}", fields[0], e)))?;
    if weight < 0 || weight > MAX_WEIGHT {
        return Err(invalid(s, format!("weight out of range: {} (should be 0-{})", weight, MAX_WEIGHT)));
    }

    let value = fields[2].to_string();
    let target = match kind {
        RuleKind::Ip => Target::Addresses(resolve_ip_value(&value, resolver)?),
        RuleKind::Vpce => Target::Alias {
            hosted_zone_id: table.zone_id_for_hostname(&value)?.to_string(),
        },
    };

    Ok(Rule { weight, kind, value, target })
}

// All or nothing: the first bad rule fails the whole list
pub fn parse_rules<R, S>(rules: &[S], resolver: &R, table: &VpceZoneTable) -> Result<Vec<Rule>>
where
    R: HostResolver + ?Sized,
    S: AsRef<str>,
{
    rules.iter().map(|s| parse_rule(s.as_ref(), resolver, table)).collect()
}
