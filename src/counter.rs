//! Resource counting: classification, space-qualified IP deduplication, and
//! the aggregate breakdowns everything downstream consumes.

use crate::ip_extract::{extract_ips, IpRole, IpSource};
use crate::ip_space::infer_space;
use crate::provider::{self, Provider};
use crate::reservation::reserved_addresses;
use crate::resource::ResourceRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Aggregate counts for one discovery run. All counts are order-independent:
/// sums and set memberships only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCount {
    pub total_objects: u64,
    pub ddi_objects: u64,
    /// Per-type DDI breakdown; empty and `"unknown"` types are excluded.
    pub ddi_breakdown: BTreeMap<String, u64>,
    /// Count of distinct `(space, address)` keys.
    pub active_ips: u64,
    /// Occurrences per evidence category. Categories overlap, so these do
    /// not sum to `active_ips`.
    pub ip_sources: BTreeMap<String, u64>,
    /// Distinct active IPs per inferred space.
    pub ip_spaces: BTreeMap<String, u64>,
    pub breakdown_by_region: BTreeMap<String, u64>,
    pub generated_at_epoch_ms: u128,
}

/// Counts resources for a single provider context. Stateless per invocation;
/// safe to reuse and to call concurrently on disjoint inputs.
#[derive(Debug, Clone, Copy)]
pub struct ResourceCounter {
    provider: Provider,
}

impl ResourceCounter {
    /// Unsupported provider names fail here, before any counting.
    pub fn new(provider: &str) -> Result<Self> {
        Ok(Self {
            provider: Provider::parse(provider)?,
        })
    }

    pub fn for_provider(provider: Provider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Produce the aggregate count for one run. Empty input yields zeros;
    /// malformed per-resource data contributes nothing to the affected tally.
    pub fn count(&self, resources: &[ResourceRecord]) -> ResourceCount {
        let mut ddi_objects = 0u64;
        let mut ddi_breakdown: BTreeMap<String, u64> = BTreeMap::new();
        let mut breakdown_by_region: BTreeMap<String, u64> = BTreeMap::new();
        let mut active: BTreeMap<(String, IpAddr), BTreeSet<IpSource>> = BTreeMap::new();

        for record in resources {
            let region = if record.region.is_empty() {
                "unknown"
            } else {
                record.region.as_str()
            };
            *breakdown_by_region.entry(region.to_string()).or_default() += 1;

            if provider::is_ddi_object(self.provider, &record.resource_type) {
                ddi_objects += 1;
                if !record.resource_type.is_empty() && record.resource_type != "unknown" {
                    *ddi_breakdown
                        .entry(record.resource_type.clone())
                        .or_default() += 1;
                }
            }

            for (ip, role, source) in extract_ips(record) {
                let space = infer_space(self.provider, record, ip, role);
                active.entry((space, ip)).or_default().insert(source);
            }

            for ip in reserved_addresses(self.provider, record) {
                let space = infer_space(self.provider, record, ip, IpRole::Private);
                active
                    .entry((space, ip))
                    .or_default()
                    .insert(IpSource::SubnetReservation);
            }
        }

        let mut ip_sources: BTreeMap<String, u64> = BTreeMap::new();
        let mut ip_spaces: BTreeMap<String, u64> = BTreeMap::new();
        for ((space, _), sources) in &active {
            *ip_spaces.entry(space.clone()).or_default() += 1;
            for source in sources {
                *ip_sources.entry(source.as_str().to_string()).or_default() += 1;
            }
        }

        tracing::debug!(
            provider = self.provider.as_str(),
            total = resources.len(),
            ddi = ddi_objects,
            active_ips = active.len(),
            "counted resources"
        );

        ResourceCount {
            total_objects: resources.len() as u64,
            ddi_objects,
            ddi_breakdown,
            active_ips: active.len() as u64,
            ip_sources,
            ip_spaces,
            breakdown_by_region,
            generated_at_epoch_ms: epoch_ms(),
        }
    }

    /// The distinct active-IP count alone, for per-provider breakdowns.
    pub fn count_active_ips(&self, resources: &[ResourceRecord]) -> u64 {
        let mut active: BTreeSet<(String, IpAddr)> = BTreeSet::new();
        for record in resources {
            for (ip, role, _) in extract_ips(record) {
                let space = infer_space(self.provider, record, ip, role);
                active.insert((space, ip));
            }
            for ip in reserved_addresses(self.provider, record) {
                let space = infer_space(self.provider, record, ip, IpRole::Private);
                active.insert((space, ip));
            }
        }
        active.len() as u64
    }
}

pub(crate) fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
