//! Licensing-token math and provider attribution.
//!
//! Management Tokens are billed across three independent dimensions: DDI
//! objects, active IP addresses, and managed assets. Each dimension is
//! ceiling-divided by its ratio and floored at one token; the total is the
//! sum of the three, never their maximum.

use crate::counter::{epoch_ms, ResourceCount, ResourceCounter};
use crate::ip_extract::has_ip_evidence;
use crate::provider::{
    self, Provider, AWS_REGIONS, AZURE_REGIONS, GCP_REGIONS,
};
use crate::resource::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sizing ratios: native objects per Management Token.
pub const DDI_OBJECTS_PER_TOKEN: u64 = 25;
pub const ACTIVE_IPS_PER_TOKEN: u64 = 13;
pub const ASSETS_PER_TOKEN: u64 = 3;
/// Tokens are sold in packs of this size.
pub const TOKEN_PACK_SIZE: u64 = 1000;

pub const LICENSING_BASIS: &str = "Universal DDI Native Objects (25/13/3 per token)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensingCounts {
    pub ddi_objects: u64,
    pub active_ip_addresses: u64,
    pub managed_assets: u64,
    pub total_objects: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequirements {
    pub ddi_objects_tokens: u64,
    pub active_ips_tokens: u64,
    pub managed_assets_tokens: u64,
    pub total_management_tokens: u64,
    pub token_packs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRatios {
    pub ddi_objects_per_token: u64,
    pub active_ips_per_token: u64,
    pub assets_per_token: u64,
}

impl Default for SizingRatios {
    fn default() -> Self {
        Self {
            ddi_objects_per_token: DDI_OBJECTS_PER_TOKEN,
            active_ips_per_token: ACTIVE_IPS_PER_TOKEN,
            assets_per_token: ASSETS_PER_TOKEN,
        }
    }
}

/// Per-provider slice of a mixed-provider resource set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCounts {
    pub ddi_objects: u64,
    pub active_ips: u64,
    pub managed_assets: u64,
    pub total_objects: u64,
}

/// The token requirement report, safe to serialize directly to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicensingReport {
    pub generated_at_epoch_ms: u128,
    pub licensing_basis: String,
    pub counts: LicensingCounts,
    pub token_requirements: TokenRequirements,
    pub provider_breakdown: BTreeMap<String, ProviderCounts>,
    pub sizing_ratios: SizingRatios,
    /// Full aggregate count backing the licensing numbers.
    pub aggregate: ResourceCount,
}

/// Converts one run's resource records into a token requirement report.
/// Pure pipeline: no inter-call state beyond the provider hint.
#[derive(Debug, Clone, Copy)]
pub struct LicensingCalculator {
    current_provider: Option<Provider>,
}

impl LicensingCalculator {
    /// `current_provider` is the active discovery context, used to prefer a
    /// provider when attribution is ambiguous and to pick classification
    /// tables; `None` falls back to the multicloud union.
    pub fn new(current_provider: Option<Provider>) -> Self {
        Self { current_provider }
    }

    fn effective_provider(&self) -> Provider {
        self.current_provider.unwrap_or(Provider::Multicloud)
    }

    pub fn calculate(&self, resources: &[ResourceRecord]) -> LicensingReport {
        let counting_provider = self.effective_provider();
        let counter = ResourceCounter::for_provider(counting_provider);
        let aggregate = counter.count(resources);

        let managed_assets = count_managed_assets(counting_provider, resources);
        let counts = LicensingCounts {
            ddi_objects: aggregate.ddi_objects,
            active_ip_addresses: aggregate.active_ips,
            managed_assets,
            total_objects: aggregate.total_objects,
        };

        let ddi_tokens = tokens_for(counts.ddi_objects, DDI_OBJECTS_PER_TOKEN);
        let ip_tokens = tokens_for(counts.active_ip_addresses, ACTIVE_IPS_PER_TOKEN);
        let asset_tokens = tokens_for(counts.managed_assets, ASSETS_PER_TOKEN);
        let total = ddi_tokens + ip_tokens + asset_tokens;
        let token_requirements = TokenRequirements {
            ddi_objects_tokens: ddi_tokens,
            active_ips_tokens: ip_tokens,
            managed_assets_tokens: asset_tokens,
            total_management_tokens: total,
            token_packs: total.div_ceil(TOKEN_PACK_SIZE).max(1),
        };

        tracing::info!(
            provider = counting_provider.as_str(),
            ddi = counts.ddi_objects,
            active_ips = counts.active_ip_addresses,
            assets = counts.managed_assets,
            tokens = total,
            "calculated token requirements"
        );

        LicensingReport {
            generated_at_epoch_ms: epoch_ms(),
            licensing_basis: LICENSING_BASIS.to_string(),
            counts,
            token_requirements,
            provider_breakdown: self.provider_breakdown(resources),
            sizing_ratios: SizingRatios::default(),
            aggregate,
        }
    }

    fn provider_breakdown(&self, resources: &[ResourceRecord]) -> BTreeMap<String, ProviderCounts> {
        let mut groups: BTreeMap<&'static str, Vec<&ResourceRecord>> = BTreeMap::new();
        for record in resources {
            groups
                .entry(self.determine_provider(record))
                .or_default()
                .push(record);
        }

        let mut breakdown = BTreeMap::new();
        for (name, records) in groups {
            let provider = Provider::parse(name).unwrap_or(Provider::Multicloud);
            let mut counts = ProviderCounts {
                total_objects: records.len() as u64,
                ..ProviderCounts::default()
            };
            for record in &records {
                if provider::is_ddi_object(Provider::Multicloud, &record.resource_type) {
                    counts.ddi_objects += 1;
                } else if provider::is_managed_asset(Provider::Multicloud, &record.resource_type)
                    && has_ip_evidence(record)
                {
                    counts.managed_assets += 1;
                }
            }
            let owned: Vec<ResourceRecord> = records.into_iter().cloned().collect();
            counts.active_ips =
                ResourceCounter::for_provider(provider).count_active_ips(&owned);
            breakdown.insert(name.to_string(), counts);
        }
        breakdown
    }

    /// Assign a record to a provider: known region, then type tables with the
    /// current provider preferred on overlap, then pattern fallbacks, then
    /// the `global` sentinel deferring to the current provider.
    fn determine_provider(&self, record: &ResourceRecord) -> &'static str {
        let region = record.region.to_ascii_lowercase();
        let rtype = record.resource_type.to_ascii_lowercase();

        if AWS_REGIONS.contains(&region.as_str()) {
            return "aws";
        }
        if AZURE_REGIONS.contains(&region.as_str()) {
            return "azure";
        }
        if GCP_REGIONS.contains(&region.as_str()) {
            return "gcp";
        }

        let rtype = rtype.as_str();
        let in_aws = AWS_ATTRIBUTION_TYPES.contains(&rtype);
        let in_azure = AZURE_ATTRIBUTION_TYPES.contains(&rtype);
        let in_gcp = GCP_ATTRIBUTION_TYPES.contains(&rtype);

        match self.current_provider {
            Some(Provider::Aws) if in_aws => return "aws",
            Some(Provider::Azure) if in_azure => return "azure",
            Some(Provider::Gcp) if in_gcp => return "gcp",
            _ => {}
        }
        // gcp first so `dns-zone` without context is not misattributed.
        if in_gcp {
            return "gcp";
        }
        if in_azure {
            return "azure";
        }
        if in_aws {
            return "aws";
        }

        if rtype.contains("route53") || rtype.starts_with("ec2-") {
            return "aws";
        }
        if rtype == "managedzone" || rtype == "recordset" {
            return "gcp";
        }

        if region == "global" {
            if let Some(p @ (Provider::Aws | Provider::Azure | Provider::Gcp)) =
                self.current_provider
            {
                return p.as_str();
            }
        }

        "unknown"
    }
}

/// Attribution type sets. Narrower than the classification tables on
/// purpose: only types whose spelling identifies their provider.
const AWS_ATTRIBUTION_TYPES: &[&str] = &["vpc", "subnet", "route53-zone", "route53-record"];

const AZURE_ATTRIBUTION_TYPES: &[&str] = &[
    "vm",
    "vnet",
    "subnet",
    "dns-zone",
    "dns-record",
    "endpoint",
    "switch",
    "gateway",
    "router",
    "dhcp-range",
    "ipam-block",
    "ipam-space",
    "host-record",
    "ddns-record",
    "address-block",
    "view",
    "zone",
];

const GCP_ATTRIBUTION_TYPES: &[&str] = &[
    "compute-instance",
    "vpc-network",
    "dns-zone",
    "dns-record",
];

/// Assets must carry at least one resolvable address and are deduplicated by
/// resource id.
fn count_managed_assets(provider: Provider, resources: &[ResourceRecord]) -> u64 {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for record in resources {
        if provider::is_managed_asset(provider, &record.resource_type) && has_ip_evidence(record) {
            seen.insert(record.resource_id.as_str());
        }
    }
    seen.len() as u64
}

fn tokens_for(count: u64, ratio: u64) -> u64 {
    count.div_ceil(ratio).max(1)
}
