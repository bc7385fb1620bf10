//! Provider-reserved address synthesis for subnet resources.
//!
//! Cloud providers hold back a handful of addresses in every subnet (network
//! address, router, DNS, broadcast). Those addresses are never assigned to
//! workloads but still count as active IPs for licensing, so they are
//! synthesized here from the subnet's CIDR even when no workload announced
//! them.

use crate::provider::Provider;
use crate::resource::ResourceRecord;
use ipnet::IpNet;
use serde_json::Value;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Detail keys that may carry a CIDR string.
const CIDR_DETAIL_KEYS: &[&str] = &[
    "cidr_block",
    "ip_cidr_range",
    "address_prefix",
    "ipv6_cidr_block",
    "ipv6_address_prefix",
];

/// Detail keys that may carry a list of CIDR strings.
const CIDR_LIST_DETAIL_KEYS: &[&str] = &["address_prefixes", "ipv6_address_prefixes"];

/// Synthesize the provider-reserved addresses for a subnet record.
/// Non-subnet records and unparsable CIDR strings yield nothing.
pub fn reserved_addresses(provider: Provider, record: &ResourceRecord) -> Vec<IpAddr> {
    if !record.resource_type.eq_ignore_ascii_case("subnet") {
        return Vec::new();
    }

    let mut reserved = BTreeSet::new();
    for cidr in cidr_strings(record) {
        let Ok(net) = cidr.trim().parse::<IpNet>() else {
            continue;
        };
        collect_reserved(provider, net, &mut reserved);
    }
    reserved.into_iter().collect()
}

fn cidr_strings(record: &ResourceRecord) -> Vec<&str> {
    let mut out = Vec::new();
    for key in CIDR_DETAIL_KEYS {
        if let Some(cidr) = record.detail_str(key) {
            out.push(cidr);
        }
    }
    for key in CIDR_LIST_DETAIL_KEYS {
        if let Some(Value::Array(items)) = record.detail(key) {
            for item in items {
                if let Value::String(cidr) = item {
                    out.push(cidr.as_str());
                }
            }
        }
    }
    out
}

fn collect_reserved(provider: Provider, net: IpNet, reserved: &mut BTreeSet<IpAddr>) {
    match net {
        IpNet::V4(v4) => {
            let first = u32::from(v4.network());
            let last = u32::from(v4.broadcast());
            let offsets: &[u32] = match provider {
                // Network address + next 3, plus the broadcast address.
                Provider::Aws | Provider::Azure => &[0, 1, 2, 3],
                // Network address + gateway at the front, last two at the back.
                Provider::Gcp => &[0, 1],
                Provider::Multicloud => &[0],
            };
            for offset in offsets {
                if let Some(addr) = first.checked_add(*offset).filter(|a| *a <= last) {
                    reserved.insert(IpAddr::V4(Ipv4Addr::from(addr)));
                }
            }
            let tail: &[u32] = match provider {
                Provider::Aws | Provider::Azure | Provider::Multicloud => &[0],
                Provider::Gcp => &[0, 1],
            };
            for offset in tail {
                if let Some(addr) = last.checked_sub(*offset).filter(|a| *a >= first) {
                    reserved.insert(IpAddr::V4(Ipv4Addr::from(addr)));
                }
            }
        }
        IpNet::V6(v6) => {
            // GCP reserves addresses in IPv4 ranges only.
            if provider == Provider::Gcp {
                return;
            }
            let first = u128::from(v6.network());
            let last = u128::from(v6.broadcast());
            let offsets: &[u128] = match provider {
                Provider::Aws | Provider::Azure => &[0, 1, 2, 3],
                _ => &[0],
            };
            for offset in offsets {
                if let Some(addr) = first.checked_add(*offset).filter(|a| *a <= last) {
                    reserved.insert(IpAddr::V6(Ipv6Addr::from(addr)));
                }
            }
            reserved.insert(IpAddr::V6(Ipv6Addr::from(last)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subnet(cidr: &str) -> ResourceRecord {
        ResourceRecord::new("subnet", "us-east-1", "s-1").with_detail("cidr_block", json!(cidr))
    }

    #[test]
    fn aws_slash_24_reserves_five_addresses() {
        let addrs = reserved_addresses(Provider::Aws, &subnet("10.0.0.0/24"));
        let rendered: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            rendered,
            ["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.255"]
        );
    }

    #[test]
    fn azure_matches_aws_reservation_rule() {
        let addrs = reserved_addresses(Provider::Azure, &subnet("10.1.0.0/24"));
        assert_eq!(addrs.len(), 5);
    }

    #[test]
    fn gcp_slash_24_reserves_four_addresses() {
        let addrs = reserved_addresses(Provider::Gcp, &subnet("10.128.0.0/24"));
        let rendered: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            rendered,
            ["10.128.0.0", "10.128.0.1", "10.128.0.254", "10.128.0.255"]
        );
    }

    #[test]
    fn fallback_provider_reserves_first_and_last_only() {
        let addrs = reserved_addresses(Provider::Multicloud, &subnet("10.2.0.0/24"));
        let rendered: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(rendered, ["10.2.0.0", "10.2.0.255"]);
    }

    #[test]
    fn tiny_blocks_deduplicate_colliding_offsets() {
        // /30 holds 4 addresses; the first-4 rule overlaps the last address.
        let addrs = reserved_addresses(Provider::Aws, &subnet("10.0.0.0/30"));
        assert_eq!(addrs.len(), 4);
        // /31 holds 2; offsets past the block are clamped.
        let addrs = reserved_addresses(Provider::Aws, &subnet("10.0.0.0/31"));
        assert_eq!(addrs.len(), 2);
    }

    #[test]
    fn unparsable_cidr_contributes_nothing() {
        assert!(reserved_addresses(Provider::Aws, &subnet("not-a-cidr")).is_empty());
        assert!(reserved_addresses(Provider::Aws, &subnet("10.0.0.0/99")).is_empty());
    }

    #[test]
    fn non_subnet_records_contribute_nothing() {
        let record = ResourceRecord::new("vpc", "us-east-1", "vpc-1")
            .with_detail("cidr_block", json!("10.0.0.0/16"));
        assert!(reserved_addresses(Provider::Aws, &record).is_empty());
    }

    #[test]
    fn subnet_type_match_is_case_insensitive() {
        let record = ResourceRecord::new("Subnet", "eastus", "s-1")
            .with_detail("address_prefix", json!("10.3.0.0/28"));
        assert_eq!(reserved_addresses(Provider::Azure, &record).len(), 5);
    }

    #[test]
    fn azure_address_prefixes_list_is_consulted() {
        let record = ResourceRecord::new("subnet", "eastus", "s-1")
            .with_detail("address_prefixes", json!(["10.4.0.0/24", "10.4.1.0/24"]));
        assert_eq!(reserved_addresses(Provider::Azure, &record).len(), 10);
    }

    #[test]
    fn gcp_skips_ipv6_ranges() {
        let record = ResourceRecord::new("subnet", "us-central1", "s-1")
            .with_detail("ipv6_cidr_block", json!("2600:1900::/64"));
        assert!(reserved_addresses(Provider::Gcp, &record).is_empty());
    }

    #[test]
    fn aws_ipv6_block_reserves_first_four_and_last() {
        let record = ResourceRecord::new("subnet", "us-east-1", "s-1")
            .with_detail("ipv6_cidr_block", json!("2600:1f18:abc::/64"));
        assert_eq!(reserved_addresses(Provider::Aws, &record).len(), 5);
    }
}
