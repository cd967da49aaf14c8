// Resolution of "ip" rule values into addresses

use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use crate::error::{Error, Result};

pub trait HostResolver {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

// Operating system resolver (getaddrinfo), /etc/hosts included
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }
        let addrs: Vec<IpAddr> = (host, 0).to_socket_addrs()?.map(|sa| sa.ip()).collect();
        if addrs.is_empty() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no addresses found"));
        }
        Ok(addrs)
    }
}

// Split a comma separated list of hosts/addresses and resolve every token,
// keeping order and duplicates.  The first failure aborts.
pub fn resolve_ip_value<R: HostResolver + ?Sized>(value: &str, resolver: &R) -> Result<Vec<IpAddr>> {
    let mut list = Vec::new();
    for host in value.split(',') {
        let mut addrs = resolver.lookup(host).map_err(|e| Error::Lookup {
            rule: value.to_string(),
            host: host.to_string(),
            source: e,
        })?;
        list.append(&mut addrs);
    }
    Ok(list)
}
