//! Normalized resource records produced by the discovery walkers.
//!
//! Records are pure data: the counting engine reads only `resource_type`,
//! `region`, and the open `details` map. Detail keys are provider-specific
//! and deliberately unvalidated; absent keys are normal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One discovered cloud resource, immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Unique within a run, formatted `{region}:{type}:{name}`.
    pub resource_id: String,
    pub resource_type: String,
    /// `"global"` is a valid sentinel for non-regional resources.
    pub region: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    /// Set by the discovery layer per resource-specific policy.
    #[serde(default = "default_true")]
    pub requires_management_token: bool,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Open provider-specific detail fields; the only payload the counting
    /// engine inspects besides type and region.
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
    #[serde(default)]
    pub discovered_at: String,
}

fn default_true() -> bool {
    true
}

impl ResourceRecord {
    /// Build a record with the canonical `{region}:{type}:{name}` identity.
    pub fn new(resource_type: &str, region: &str, name: &str) -> Self {
        Self {
            resource_id: format!("{region}:{resource_type}:{name}"),
            resource_type: resource_type.to_string(),
            region: region.to_string(),
            name: name.to_string(),
            state: String::new(),
            requires_management_token: true,
            tags: BTreeMap::new(),
            details: BTreeMap::new(),
            discovered_at: String::new(),
        }
    }

    /// Attach a detail field, consuming and returning the record.
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// String-typed detail field, if present and non-empty.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        match self.details.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_id_follows_region_type_name() {
        let record = ResourceRecord::new("subnet", "us-east-1", "subnet-abc");
        assert_eq!(record.resource_id, "us-east-1:subnet:subnet-abc");
    }

    #[test]
    fn missing_optional_fields_deserialize_with_defaults() {
        let raw = r#"{
            "resource_id": "us-east-1:vpc:vpc-1",
            "resource_type": "vpc",
            "region": "us-east-1"
        }"#;
        let record: ResourceRecord = serde_json::from_str(raw).expect("deserialize");
        assert!(record.requires_management_token);
        assert!(record.details.is_empty());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn detail_str_skips_non_string_values() {
        let record = ResourceRecord::new("subnet", "us-east-1", "s")
            .with_detail("cidr_block", json!("10.0.0.0/24"))
            .with_detail("available_ips", json!(251))
            .with_detail("empty", json!(""));
        assert_eq!(record.detail_str("cidr_block"), Some("10.0.0.0/24"));
        assert_eq!(record.detail_str("available_ips"), None);
        assert_eq!(record.detail_str("empty"), None);
        assert_eq!(record.detail_str("absent"), None);
    }
}
