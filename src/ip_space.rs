//! IP-space inference: assign each extracted address to a logical
//! address-uniqueness domain.
//!
//! RFC1918-style private ranges are legitimately reused across isolated
//! virtual networks, so deduplicating on the raw address string alone would
//! systematically undercount. Every address is keyed by `(space, address)`
//! instead, where the space is the owning virtual network when it can be
//! recovered, one shared public pool per provider for routable addresses,
//! and a shared `unknown` bucket otherwise.

use crate::ip_extract::IpRole;
use crate::provider::Provider;
use crate::resource::ResourceRecord;
use std::net::IpAddr;

/// Resource types that hold provider-allocated public addresses.
const PUBLIC_ADDRESS_TYPES: &[&str] = &["elastic-ip", "public-ip", "external-ip"];

/// Infer the space identifier for one `(record, address, role)` observation.
/// Deterministic given the same inputs.
pub fn infer_space(
    provider: Provider,
    record: &ResourceRecord,
    ip: IpAddr,
    role: IpRole,
) -> String {
    // A public IP is globally unique regardless of which resource holds it;
    // all of a provider's public addresses collapse into one shared space.
    if role == IpRole::Public || PUBLIC_ADDRESS_TYPES.contains(&record.resource_type.as_str()) {
        return format!("{provider}:public");
    }

    if let Some(space) = private_network_space(provider, record) {
        return space;
    }

    if role != IpRole::Private && is_globally_routable(ip) {
        return format!("{provider}:public");
    }

    // Shared bucket for private addresses with no recoverable network
    // context. Known precision loss: two identical private IPs that both
    // land here deduplicate into one.
    format!("{provider}:unknown")
}

/// Derive the owning virtual-network space from provider-specific detail
/// fields, when present.
fn private_network_space(provider: Provider, record: &ResourceRecord) -> Option<String> {
    match provider {
        Provider::Aws => aws_vpc_space(record),
        Provider::Azure => azure_vnet_space(record),
        Provider::Gcp => gcp_network_space(record),
        Provider::Multicloud => aws_vpc_space(record)
            .or_else(|| azure_vnet_space(record))
            .or_else(|| gcp_network_space(record)),
    }
}

fn aws_vpc_space(record: &ResourceRecord) -> Option<String> {
    record
        .detail_str("vpc_id")
        .or_else(|| record.detail_str("VpcId"))
        .map(|vpc_id| format!("aws:vpc:{vpc_id}"))
}

fn azure_vnet_space(record: &ResourceRecord) -> Option<String> {
    if let Some(vnet_id) = record.detail_str("vnet_id") {
        return Some(format!("azure:vnet:{vnet_id}"));
    }
    // Azure subnet IDs embed the parent VNet path:
    // .../virtualNetworks/<vnet>/subnets/<subnet>
    let subnet_id = record.detail_str("subnet_id")?;
    let lower = subnet_id.to_ascii_lowercase();
    let cut = lower.find("/subnets/")?;
    Some(format!("azure:vnet:{}", &subnet_id[..cut]))
}

fn gcp_network_space(record: &ResourceRecord) -> Option<String> {
    record
        .detail_str("network")
        .or_else(|| record.detail_str("vpc_network"))
        .map(|network| format!("gcp:network:{network}"))
}

/// Conservative global-routability check used for the public-space fallback.
fn is_globally_routable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            let shared = octets[0] == 100 && (octets[1] & 0xc0) == 64;
            let reserved = octets[0] >= 240;
            !(v4.is_unspecified()
                || v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || shared
                || reserved)
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            let unique_local = (segments[0] & 0xfe00) == 0xfc00;
            let link_local = (segments[0] & 0xffc0) == 0xfe80;
            !(v6.is_unspecified() || v6.is_loopback() || unique_local || link_local)
        }
    }
}
