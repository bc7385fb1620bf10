//! Provider vocabulary and the static classification tables.
//!
//! Adding a new resource type is a table edit here, never a new code path.

use anyhow::{bail, Result};
use std::fmt;

/// Cloud providers the counting engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    /// Mixed-provider resource sets; classification tables are the union.
    Multicloud,
}

impl Provider {
    /// Parse a provider name. An unrecognized name is a configuration error
    /// and fails the whole run before any counting is attempted.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            "gcp" => Ok(Provider::Gcp),
            "multicloud" => Ok(Provider::Multicloud),
            other => bail!(
                "unsupported provider: {other} (must be one of aws, azure, gcp, multicloud)"
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
            Provider::Multicloud => "multicloud",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const AWS_DDI_TYPES: &[&str] = &["subnet", "vpc", "route53-zone", "route53-record"];

const AZURE_DDI_TYPES: &[&str] = &[
    "dns-zone",
    "dns-record",
    "subnet",
    "vnet",
    "dhcp-range",
    "ipam-block",
    "ipam-space",
    "host-record",
    "ddns-record",
    "address-block",
    "view",
    "zone",
    "dtc-lbdn",
    "dtc-server",
    "dtc-pool",
    "dtc-topology-rule",
    "dtc-health-check",
    "dhcp-exclusion-range",
    "dhcp-filter-rule",
    "dhcp-option",
    "ddns-zone",
];

const GCP_DDI_TYPES: &[&str] = &["subnet", "vpc-network", "dns-zone", "dns-record"];

const MULTICLOUD_DDI_TYPES: &[&str] = &[
    "subnet",
    "vpc",
    "vpc-network",
    "route53-zone",
    "route53-record",
    "dns-zone",
    "dns-record",
    "vnet",
    "dhcp-range",
    "ipam-block",
    "ipam-space",
    "host-record",
    "ddns-record",
    "address-block",
    "view",
    "zone",
    "dtc-lbdn",
    "dtc-server",
    "dtc-pool",
    "dtc-topology-rule",
    "dtc-health-check",
    "dhcp-exclusion-range",
    "dhcp-filter-rule",
    "dhcp-option",
    "ddns-zone",
];

const AWS_ASSET_TYPES: &[&str] = &[
    "ec2-instance",
    "application-load-balancer",
    "network-load-balancer",
    "classic-load-balancer",
];

const AZURE_ASSET_TYPES: &[&str] = &[
    "vm",
    "gateway",
    "endpoint",
    "firewall",
    "switch",
    "router",
    "server",
    "load_balancer",
];

const GCP_ASSET_TYPES: &[&str] = &["compute-instance", "vpc-network"];

const MULTICLOUD_ASSET_TYPES: &[&str] = &[
    "ec2-instance",
    "vm",
    "compute-instance",
    "application-load-balancer",
    "network-load-balancer",
    "classic-load-balancer",
    "gateway",
    "endpoint",
    "firewall",
    "switch",
    "router",
    "server",
    "load_balancer",
    "vpc-network",
];

/// DDI object types (DNS/DHCP/IPAM infrastructure) per provider.
pub fn ddi_resource_types(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Aws => AWS_DDI_TYPES,
        Provider::Azure => AZURE_DDI_TYPES,
        Provider::Gcp => GCP_DDI_TYPES,
        Provider::Multicloud => MULTICLOUD_DDI_TYPES,
    }
}

/// Managed-asset types (billable compute/network resources) per provider.
pub fn asset_resource_types(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Aws => AWS_ASSET_TYPES,
        Provider::Azure => AZURE_ASSET_TYPES,
        Provider::Gcp => GCP_ASSET_TYPES,
        Provider::Multicloud => MULTICLOUD_ASSET_TYPES,
    }
}

pub fn is_ddi_object(provider: Provider, resource_type: &str) -> bool {
    ddi_resource_types(provider).contains(&resource_type)
}

pub fn is_managed_asset(provider: Provider, resource_type: &str) -> bool {
    asset_resource_types(provider).contains(&resource_type)
}

/// Known regions per provider, used for provider attribution of
/// mixed-provider resource sets.
pub const AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "sa-east-1",
];

pub const AZURE_REGIONS: &[&str] = &[
    "eastus",
    "eastus2",
    "southcentralus",
    "westus2",
    "westus3",
    "canadacentral",
    "northeurope",
    "westeurope",
    "uksouth",
    "ukwest",
    "eastasia",
    "southeastasia",
];

pub const GCP_REGIONS: &[&str] = &[
    "us-central1",
    "us-east1",
    "us-west1",
    "europe-west1",
    "asia-east1",
    "asia-southeast1",
];
