//! IP list matching.
//!
//! List entries are either a single address or a CIDR block
//! (`10.0.0.0/8`, `2001:db8::/32`). Entries that do not parse match nothing.

use std::net::IpAddr;

/// Returns whether `ip` matches any entry of `list`.
pub fn ip_in_list(ip: &str, list: &[String]) -> bool {
    let parsed = ip.trim().parse::<IpAddr>().ok();
    list.iter().any(|entry| match parsed {
        Some(addr) => entry_matches(entry, addr),
        // Unparseable request IPs can still be listed verbatim.
        None => entry.trim() == ip.trim(),
    })
}

/// Returns whether `addr` matches a single list entry.
pub fn entry_matches(entry: &str, addr: IpAddr) -> bool {
    let entry = entry.trim();
    let Some((network, prefix)) = entry.split_once('/') else {
        return entry.parse::<IpAddr>().is_ok_and(|listed| listed == addr);
    };

    let (Ok(network), Ok(prefix)) = (network.parse::<IpAddr>(), prefix.parse::<u32>()) else {
        return false;
    };

    match (network, addr) {
        (IpAddr::V4(net), IpAddr::V4(ip)) if prefix <= 32 => {
            prefix_eq(u128::from(u32::from(net)) << 96, u128::from(u32::from(ip)) << 96, prefix)
        }
        (IpAddr::V6(net), IpAddr::V6(ip)) if prefix <= 128 => {
            prefix_eq(u128::from(net), u128::from(ip), prefix)
        }
        _ => false,
    }
}

/// Compares the top `prefix` bits of two left-aligned addresses.
fn prefix_eq(network: u128, addr: u128, prefix: u32) -> bool {
    if prefix == 0 {
        return true;
    }
    let mask = u128::MAX << (128 - prefix);
    network & mask == addr & mask
}
