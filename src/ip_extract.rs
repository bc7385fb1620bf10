//! IP extraction from free-form resource detail fields.
//!
//! Extraction consults a fixed key table with exact-match lookups only. An
//! earlier broad-substring match produced false positives (fields like
//! `description` leaking in), so the table stays narrow on purpose.

use crate::resource::ResourceRecord;
use serde_json::Value;
use std::net::IpAddr;

/// Where on the wire an address was seen, per the extraction key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRole {
    Private,
    Public,
    Unknown,
}

/// Which licensing evidence category an address came from. Categories
/// overlap: the same address can be both discovered and a subnet reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IpSource {
    Discovered,
    Allocated,
    Fixed,
    DhcpLease,
    SubnetReservation,
}

impl IpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpSource::Discovered => "discovered",
            IpSource::Allocated => "allocated",
            IpSource::Fixed => "fixed",
            IpSource::DhcpLease => "dhcp_lease",
            IpSource::SubnetReservation => "subnet_reservation",
        }
    }
}

/// Detail-field taxonomy: key, evidence category, address role.
/// Singular keys hold one string; plural keys hold lists. Either may
/// defensively carry a nested object with an `ip`-like field.
const IP_DETAIL_KEYS: &[(&str, IpSource, IpRole)] = &[
    ("ip", IpSource::Discovered, IpRole::Unknown),
    ("ip_address", IpSource::Discovered, IpRole::Unknown),
    ("private_ip", IpSource::Discovered, IpRole::Private),
    ("private_ips", IpSource::Discovered, IpRole::Private),
    ("public_ip", IpSource::Discovered, IpRole::Public),
    ("public_ips", IpSource::Discovered, IpRole::Public),
    ("elastic_ip", IpSource::Allocated, IpRole::Public),
    ("elastic_ips", IpSource::Allocated, IpRole::Public),
    ("reserved_ips", IpSource::Allocated, IpRole::Unknown),
    ("reservation_ips", IpSource::Allocated, IpRole::Unknown),
    ("fixed_ips", IpSource::Fixed, IpRole::Private),
    ("fixed_addresses", IpSource::Fixed, IpRole::Private),
    ("dhcp_lease_ips", IpSource::DhcpLease, IpRole::Private),
    ("lease_ips", IpSource::DhcpLease, IpRole::Private),
    ("leases", IpSource::DhcpLease, IpRole::Private),
    ("dns_record_ips", IpSource::Discovered, IpRole::Unknown),
    ("a_record_ips", IpSource::Discovered, IpRole::Unknown),
    ("aaaa_record_ips", IpSource::Discovered, IpRole::Unknown),
];

/// Keys treated as IP evidence when projecting records for the audit
/// manifest and when testing whether an asset carries an address.
pub fn ip_evidence_keys() -> impl Iterator<Item = &'static str> {
    IP_DETAIL_KEYS.iter().map(|(key, _, _)| *key)
}

/// Canonicalize one candidate address string. Invalid strings are dropped,
/// never an error; equivalent textual forms collapse to one parsed address.
pub fn canonical_ip(raw: &str) -> Option<IpAddr> {
    raw.trim().parse::<IpAddr>().ok()
}

/// Pull every resolvable address out of a record's detail fields.
pub fn extract_ips(record: &ResourceRecord) -> Vec<(IpAddr, IpRole, IpSource)> {
    let mut out = Vec::new();
    for (key, source, role) in IP_DETAIL_KEYS {
        let Some(value) = record.details.get(*key) else {
            continue;
        };
        collect_from_value(value, *role, *source, &mut out);
    }
    out
}

/// True if the record's detail fields resolve to at least one address.
pub fn has_ip_evidence(record: &ResourceRecord) -> bool {
    !extract_ips(record).is_empty()
}

fn collect_from_value(
    value: &Value,
    role: IpRole,
    source: IpSource,
    out: &mut Vec<(IpAddr, IpRole, IpSource)>,
) {
    match value {
        Value::String(s) => {
            if let Some(ip) = canonical_ip(s) {
                out.push((ip, role, source));
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) => {
                        if let Some(ip) = canonical_ip(s) {
                            out.push((ip, role, source));
                        }
                    }
                    Value::Object(_) => {
                        if let Some(ip) = nested_ip(item) {
                            out.push((ip, role, source));
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Object(_) => {
            if let Some(ip) = nested_ip(value) {
                out.push((ip, role, source));
            }
        }
        _ => {}
    }
}

/// One level of recursion into an object value carrying an `ip`-like field.
fn nested_ip(value: &Value) -> Option<IpAddr> {
    for key in ["ip", "ip_address", "address"] {
        if let Some(Value::String(s)) = value.get(key) {
            if let Some(ip) = canonical_ip(s) {
                return Some(ip);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_with(key: &str, value: Value) -> ResourceRecord {
        ResourceRecord::new("ec2-instance", "us-east-1", "i-1").with_detail(key, value)
    }

    #[test]
    fn extracts_singular_and_plural_keys() {
        let record = ResourceRecord::new("ec2-instance", "us-east-1", "i-1")
            .with_detail("private_ip", json!("10.0.0.5"))
            .with_detail("public_ips", json!(["52.1.2.3", "52.1.2.4"]));
        let ips = extract_ips(&record);
        assert_eq!(ips.len(), 3);
        assert!(ips
            .iter()
            .any(|(ip, role, _)| ip.to_string() == "10.0.0.5" && *role == IpRole::Private));
        assert!(ips
            .iter()
            .any(|(ip, role, _)| ip.to_string() == "52.1.2.3" && *role == IpRole::Public));
    }

    #[test]
    fn invalid_strings_are_silently_dropped() {
        let record = record_with("private_ips", json!(["10.0.0.5", "not-an-ip", ""]));
        assert_eq!(extract_ips(&record).len(), 1);
    }

    #[test]
    fn canonicalization_collapses_equivalent_forms() {
        let a = canonical_ip(" 2001:DB8::1 ").expect("parse");
        let b = canonical_ip("2001:db8:0:0:0:0:0:1").expect("parse");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2001:db8::1");
    }

    #[test]
    fn recurses_one_level_into_objects() {
        let record = record_with(
            "fixed_ips",
            json!([{"ip_address": "10.0.1.9", "subnet": "s-1"}, {"note": "no address"}]),
        );
        let ips = extract_ips(&record);
        assert_eq!(ips.len(), 1);
        assert_eq!(ips[0].2, IpSource::Fixed);
    }

    #[test]
    fn absent_keys_and_wrong_types_contribute_nothing() {
        let record = ResourceRecord::new("vpc", "us-east-1", "vpc-1")
            .with_detail("cidr_block", json!("10.0.0.0/16"))
            .with_detail("ip", json!(42));
        assert!(extract_ips(&record).is_empty());
        assert!(!has_ip_evidence(&record));
    }

    #[test]
    fn lease_and_elastic_keys_carry_their_categories() {
        let record = ResourceRecord::new("dhcp-range", "eastus", "r-1")
            .with_detail("dhcp_lease_ips", json!(["10.1.0.20"]))
            .with_detail("elastic_ip", json!("52.9.9.9"));
        let ips = extract_ips(&record);
        assert!(ips
            .iter()
            .any(|(_, _, source)| *source == IpSource::DhcpLease));
        assert!(ips
            .iter()
            .any(|(_, role, source)| *source == IpSource::Allocated && *role == IpRole::Public));
    }
}
