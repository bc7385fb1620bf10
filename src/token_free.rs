//! Token-free partitioning.
//!
//! The discovery layer marks platform-managed resources that never consume a
//! Management Token. Reports list them separately so the licensed breakdowns
//! cover only billable resources.

use crate::resource::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFreePartition {
    pub licensed: Vec<ResourceRecord>,
    pub token_free: Vec<ResourceRecord>,
    /// Type breakdown of the licensed subset only.
    pub breakdown_by_type: BTreeMap<String, u64>,
    /// Region breakdown of the licensed subset only.
    pub breakdown_by_region: BTreeMap<String, u64>,
}

/// Split resources on the `requires_management_token` flag.
pub fn partition_token_free(resources: &[ResourceRecord]) -> TokenFreePartition {
    let mut licensed = Vec::new();
    let mut token_free = Vec::new();
    for record in resources {
        if record.requires_management_token {
            licensed.push(record.clone());
        } else {
            token_free.push(record.clone());
        }
    }

    let mut breakdown_by_type: BTreeMap<String, u64> = BTreeMap::new();
    let mut breakdown_by_region: BTreeMap<String, u64> = BTreeMap::new();
    for record in &licensed {
        let ty = if record.resource_type.is_empty() {
            "unknown"
        } else {
            record.resource_type.as_str()
        };
        *breakdown_by_type.entry(ty.to_string()).or_default() += 1;
        let region = if record.region.is_empty() {
            "unknown"
        } else {
            record.region.as_str()
        };
        *breakdown_by_region.entry(region.to_string()).or_default() += 1;
    }

    TokenFreePartition {
        licensed,
        token_free,
        breakdown_by_type,
        breakdown_by_region,
    }
}
