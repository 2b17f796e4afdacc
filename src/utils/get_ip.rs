use std::net::Ipv4Addr;

use get_if_addrs::{get_if_addrs, IfAddr};

/// Non-loopback IPv4 addresses bound to local interfaces, with interface names.
pub fn local_ipv4_addrs() -> Vec<(String, Ipv4Addr)> {
    let mut addrs = Vec::new();
    if let Ok(ifaces) = get_if_addrs() {
        for iface in ifaces {
            if let IfAddr::V4(v4addr) = iface.addr {
                let ip = v4addr.ip;
                if !ip.is_loopback() {
                    addrs.push((iface.name, ip));
                }
            }
        }
    }
    addrs
}
