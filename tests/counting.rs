//! End-to-end counting behavior across providers.

mod common;

use common::{aws_instance, aws_subnet, azure_vm, gcp_instance};
use ddi_sizer::counter::ResourceCounter;
use ddi_sizer::resource::ResourceRecord;
use serde_json::json;

#[test]
fn mixed_aws_inventory_counts_every_dimension() {
    let resources = vec![
        ResourceRecord::new("vpc", "us-east-1", "vpc-1")
            .with_detail("cidr_block", json!("10.0.0.0/16")),
        aws_subnet("s-1", "10.0.0.0/24", "vpc-1"),
        aws_instance("i-1", "10.0.0.5", "vpc-1"),
        aws_instance("i-2", "10.0.0.6", "vpc-1"),
        ResourceRecord::new("route53-zone", "global", "example.com"),
        ResourceRecord::new("nat-gateway", "us-east-1", "nat-1"),
    ];
    let count = ResourceCounter::new("aws").expect("aws").count(&resources);

    assert_eq!(count.total_objects, 6);
    // vpc, subnet, route53-zone.
    assert_eq!(count.ddi_objects, 3);
    assert_eq!(count.ddi_breakdown.get("subnet"), Some(&1));
    assert_eq!(count.ddi_breakdown.get("vpc"), Some(&1));
    // 5 reserved slots in the /24 plus two instance addresses.
    assert_eq!(count.active_ips, 7);
    assert_eq!(count.ip_spaces.get("aws:vpc:vpc-1"), Some(&7));
    assert_eq!(count.breakdown_by_region.get("us-east-1"), Some(&5));
    assert_eq!(count.breakdown_by_region.get("global"), Some(&1));
}

#[test]
fn private_address_reuse_across_clouds_never_conflates() {
    // The same RFC1918 address in three different networks is three IPs.
    let resources = vec![
        aws_instance("i-1", "10.0.0.5", "vpc-a"),
        azure_vm("vm-1", "10.0.0.5", "vnet-b"),
        gcp_instance("gvm-1", "10.0.0.5", "net-c"),
    ];
    let count = ResourceCounter::new("multicloud")
        .expect("multicloud")
        .count(&resources);
    assert_eq!(count.active_ips, 3);
    assert_eq!(count.ip_spaces.len(), 3);
}

#[test]
fn shuffled_input_produces_identical_counts() {
    let mut resources = vec![
        aws_subnet("s-1", "10.0.0.0/26", "vpc-1"),
        aws_instance("i-1", "10.0.0.9", "vpc-1"),
        aws_instance("i-2", "52.0.0.1", "vpc-1"),
        ResourceRecord::new("route53-record", "global", "a.example.com")
            .with_detail("a_record_ips", json!(["52.0.0.1"])),
    ];
    let counter = ResourceCounter::new("aws").expect("aws");
    let baseline = counter.count(&resources);
    resources.reverse();
    let reversed = counter.count(&resources);
    resources.swap(0, 2);
    let swapped = counter.count(&resources);

    for other in [reversed, swapped] {
        assert_eq!(baseline.total_objects, other.total_objects);
        assert_eq!(baseline.ddi_objects, other.ddi_objects);
        assert_eq!(baseline.active_ips, other.active_ips);
        assert_eq!(baseline.ip_sources, other.ip_sources);
        assert_eq!(baseline.ip_spaces, other.ip_spaces);
        assert_eq!(baseline.breakdown_by_region, other.breakdown_by_region);
    }
}

#[test]
fn repeated_counts_on_the_same_input_agree() {
    let resources = vec![
        aws_subnet("s-1", "10.0.0.0/24", "vpc-1"),
        aws_instance("i-1", "10.0.0.5", "vpc-1"),
    ];
    let counter = ResourceCounter::new("aws").expect("aws");
    let a = counter.count(&resources);
    let b = counter.count(&resources);
    assert_eq!(a.active_ips, b.active_ips);
    assert_eq!(a.ip_sources, b.ip_sources);
}

#[test]
fn azure_subnet_reservations_attach_to_the_parent_vnet_space() {
    let subnet = ResourceRecord::new("subnet", "eastus", "default")
        .with_detail("address_prefix", json!("10.1.0.0/27"))
        .with_detail(
            "subnet_id",
            json!("/subscriptions/s/providers/Microsoft.Network/virtualNetworks/vnet-1/subnets/default"),
        );
    let count = ResourceCounter::new("azure").expect("azure").count(&[subnet]);
    assert_eq!(count.active_ips, 5);
    assert_eq!(
        count
            .ip_spaces
            .keys()
            .filter(|space| space.starts_with("azure:vnet:"))
            .count(),
        1
    );
    assert_eq!(count.ip_sources.get("subnet_reservation"), Some(&5));
}

#[test]
fn dns_records_with_public_addresses_share_the_provider_public_space() {
    let record_a = ResourceRecord::new("dns-record", "global", "a.example.com")
        .with_detail("a_record_ips", json!(["93.184.216.34"]));
    let record_b = ResourceRecord::new("dns-record", "global", "b.example.com")
        .with_detail("a_record_ips", json!(["93.184.216.34"]));
    let count = ResourceCounter::new("gcp")
        .expect("gcp")
        .count(&[record_a, record_b]);
    assert_eq!(count.active_ips, 1);
    assert_eq!(count.ip_spaces.get("gcp:public"), Some(&1));
}

#[test]
fn unknown_resource_types_are_tolerated_end_to_end() {
    let resources = vec![
        ResourceRecord::new("quantum-widget", "us-east-1", "w-1")
            .with_detail("ip", json!("10.9.9.9")),
        ResourceRecord::new("", "us-east-1", "anon"),
    ];
    let count = ResourceCounter::new("aws").expect("aws").count(&resources);
    assert_eq!(count.total_objects, 2);
    assert_eq!(count.ddi_objects, 0);
    // The widget's address still counts as an active IP.
    assert_eq!(count.active_ips, 1);
}
