use std::io;
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::utils::get_ip::local_ipv4_addrs;

/// Source of the machine's current IP address.
pub trait IpResolver {
    fn resolve(&self) -> Result<IpAddr>;
}

/// Learns the routable local address by connecting to a known host and reading
/// the local end of the connection.
#[derive(Debug, Clone)]
pub struct RendezvousResolver {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl RendezvousResolver {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.rendezvous_host.clone(),
            settings.rendezvous_port,
            settings.connect_timeout,
        )
    }

    /// Resolved addresses of the rendezvous host, IPv4 first.
    fn addresses(&self) -> Result<Vec<SocketAddr>> {
        let mut addrs: Vec<SocketAddr> = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| Error::RendezvousLookup {
                host: self.host.clone(),
                source,
            })?
            .collect();

        if addrs.is_empty() {
            return Err(Error::RendezvousLookup {
                host: self.host.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
            });
        }
        ipv4_first(&mut addrs);
        Ok(addrs)
    }

    fn connect(&self, addrs: &[SocketAddr]) -> Result<TcpStream> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    log::debug!("Connecting to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(Error::RendezvousUnreachable {
            host: self.host.clone(),
            port: self.port,
            source: last_err
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses")),
        })
    }
}

impl IpResolver for RendezvousResolver {
    fn resolve(&self) -> Result<IpAddr> {
        let result = self
            .addresses()
            .and_then(|addrs| self.connect(&addrs))
            .and_then(|stream| Ok(stream.local_addr()?.ip()));

        if let Err(e) = &result {
            log::debug!("{}; local interfaces: {:?}", e, local_ipv4_addrs());
        }
        result
    }
}

/// A resolver that always answers with the same address.
#[derive(Debug, Clone, Copy)]
pub struct FixedResolver(pub IpAddr);

impl IpResolver for FixedResolver {
    fn resolve(&self) -> Result<IpAddr> {
        Ok(self.0)
    }
}

/// Subnet prefixes are dotted-decimal, so a v4 local address is the useful one.
/// Keeps resolver order within each family.
fn ipv4_first(addrs: &mut [SocketAddr]) {
    addrs.sort_by_key(|addr| !addr.is_ipv4());
}
