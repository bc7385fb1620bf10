//! Shared record builders for integration tests.

use ddi_sizer::resource::ResourceRecord;
use serde_json::json;

pub fn aws_instance(name: &str, ip: &str, vpc: &str) -> ResourceRecord {
    ResourceRecord::new("ec2-instance", "us-east-1", name)
        .with_detail("private_ip", json!(ip))
        .with_detail("vpc_id", json!(vpc))
}

pub fn aws_subnet(name: &str, cidr: &str, vpc: &str) -> ResourceRecord {
    ResourceRecord::new("subnet", "us-east-1", name)
        .with_detail("cidr_block", json!(cidr))
        .with_detail("vpc_id", json!(vpc))
}

pub fn azure_vm(name: &str, ip: &str, vnet: &str) -> ResourceRecord {
    ResourceRecord::new("vm", "eastus", name)
        .with_detail("private_ip", json!(ip))
        .with_detail("vnet_id", json!(vnet))
}

pub fn gcp_instance(name: &str, ip: &str, network: &str) -> ResourceRecord {
    ResourceRecord::new("compute-instance", "us-central1", name)
        .with_detail("private_ip", json!(ip))
        .with_detail("network", json!(network))
}
