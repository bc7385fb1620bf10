//! Deterministic report renderings: CSV, text summary, estimator CSV, and
//! the hashed JSON audit manifest.
//!
//! Renderers are pure string functions; file writing is separate so tests
//! can assert on content without touching disk.

use crate::ip_extract::ip_evidence_keys;
use crate::licensing::{
    LicensingReport, ACTIVE_IPS_PER_TOKEN, ASSETS_PER_TOKEN, DDI_OBJECTS_PER_TOKEN,
};
use crate::resource::ResourceRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// CSV rendering with the fixed summary layout.
pub fn render_csv(report: &LicensingReport, provider: &str) -> String {
    let mut out = String::new();
    push_row(&mut out, &["Universal DDI Licensing Calculator"]);
    push_row(
        &mut out,
        &["Generated:", &report.generated_at_epoch_ms.to_string()],
    );
    push_row(&mut out, &["Basis:", &report.licensing_basis]);
    out.push('\n');

    push_row(&mut out, &["LICENSING SUMMARY"]);
    push_row(
        &mut out,
        &["Metric", "Count", "Tokens Required", "Per Token Ratio"],
    );
    push_row(
        &mut out,
        &[
            "DDI Objects",
            &report.counts.ddi_objects.to_string(),
            &report.token_requirements.ddi_objects_tokens.to_string(),
            &format!("{DDI_OBJECTS_PER_TOKEN} objects/token"),
        ],
    );
    push_row(
        &mut out,
        &[
            "Active IP Addresses",
            &report.counts.active_ip_addresses.to_string(),
            &report.token_requirements.active_ips_tokens.to_string(),
            &format!("{ACTIVE_IPS_PER_TOKEN} IPs/token"),
        ],
    );
    push_row(
        &mut out,
        &[
            "Managed Assets",
            &report.counts.managed_assets.to_string(),
            &report.token_requirements.managed_assets_tokens.to_string(),
            &format!("{ASSETS_PER_TOKEN} assets/token"),
        ],
    );
    push_row(
        &mut out,
        &[
            "TOTAL MANAGEMENT TOKENS",
            "",
            &report
                .token_requirements
                .total_management_tokens
                .to_string(),
            "",
        ],
    );
    out.push('\n');

    push_row(&mut out, &["PROVIDER BREAKDOWN"]);
    push_row(
        &mut out,
        &[
            "Provider",
            "DDI Objects",
            "Active IPs",
            "Managed Assets",
            "Total Objects",
        ],
    );
    if let Some(counts) = report.provider_breakdown.get(provider) {
        push_row(
            &mut out,
            &[
                &provider.to_ascii_uppercase(),
                &counts.ddi_objects.to_string(),
                &counts.active_ips.to_string(),
                &counts.managed_assets.to_string(),
                &counts.total_objects.to_string(),
            ],
        );
    }
    out
}

/// Human-readable summary mirroring the CSV content.
pub fn render_text_summary(report: &LicensingReport, provider: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "UNIVERSAL DDI LICENSING CALCULATOR");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", report.generated_at_epoch_ms);
    let _ = writeln!(out, "Basis: {}", report.licensing_basis);
    let _ = writeln!(out);

    let _ = writeln!(out, "LICENSING REQUIREMENTS SUMMARY");
    let _ = writeln!(out, "{}", "-".repeat(30));
    let _ = writeln!(
        out,
        "DDI Objects: {} ({} tokens required)",
        group_thousands(report.counts.ddi_objects),
        report.token_requirements.ddi_objects_tokens
    );
    let _ = writeln!(
        out,
        "Active IP Addresses: {} ({} tokens required)",
        group_thousands(report.counts.active_ip_addresses),
        report.token_requirements.active_ips_tokens
    );
    let _ = writeln!(
        out,
        "Managed Assets: {} ({} tokens required)",
        group_thousands(report.counts.managed_assets),
        report.token_requirements.managed_assets_tokens
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "TOTAL MANAGEMENT TOKENS REQUIRED: {}",
        report.token_requirements.total_management_tokens
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "CLOUD PROVIDER BREAKDOWN");
    let _ = writeln!(out, "{}", "-".repeat(25));
    if let Some(counts) = report.provider_breakdown.get(provider) {
        let _ = writeln!(out, "{}:", provider.to_ascii_uppercase());
        let _ = writeln!(out, "  DDI Objects: {}", group_thousands(counts.ddi_objects));
        let _ = writeln!(out, "  Active IPs: {}", group_thousands(counts.active_ips));
        let _ = writeln!(
            out,
            "  Managed Assets: {}",
            group_thousands(counts.managed_assets)
        );
        let _ = writeln!(
            out,
            "  Total Objects: {}",
            group_thousands(counts.total_objects)
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "UNIVERSAL DDI SIZING RATIOS (Native Objects)");
    let _ = writeln!(out, "{}", "-".repeat(45));
    let _ = writeln!(
        out,
        "DDI Objects: {DDI_OBJECTS_PER_TOKEN} per Management Token"
    );
    let _ = writeln!(out, "Active IPs: {ACTIVE_IPS_PER_TOKEN} per Management Token");
    let _ = writeln!(out, "Managed Assets: {ASSETS_PER_TOKEN} per Management Token");
    out
}

/// Flat CSV with exactly the fields the sizing spreadsheet consumes.
pub fn render_estimator_csv(report: &LicensingReport) -> String {
    let mut out = String::new();
    push_row(
        &mut out,
        &[
            "ddi_objects",
            "active_ip_addresses",
            "managed_assets",
            "tokens_ddi_objects",
            "tokens_active_ips",
            "tokens_managed_assets",
            "tokens_total",
        ],
    );
    push_row(
        &mut out,
        &[
            &report.counts.ddi_objects.to_string(),
            &report.counts.active_ip_addresses.to_string(),
            &report.counts.managed_assets.to_string(),
            &report.token_requirements.ddi_objects_tokens.to_string(),
            &report.token_requirements.active_ips_tokens.to_string(),
            &report.token_requirements.managed_assets_tokens.to_string(),
            &report
                .token_requirements
                .total_management_tokens
                .to_string(),
        ],
    );
    out
}

/// Identity + IP-evidence projection of one record, the unit the audit hash
/// covers. Keeping the projection minimal keeps the fingerprint stable when
/// incidental detail fields change.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceProjection {
    pub resource_id: String,
    pub resource_type: String,
    pub region: String,
    pub name: String,
    pub state: String,
    pub requires_management_token: bool,
    pub ip_evidence: BTreeMap<String, Value>,
}

pub fn project_resource(record: &ResourceRecord) -> ResourceProjection {
    let mut ip_evidence = BTreeMap::new();
    for key in ip_evidence_keys() {
        if let Some(value) = record.details.get(key) {
            ip_evidence.insert(key.to_string(), value.clone());
        }
    }
    ResourceProjection {
        resource_id: record.resource_id.clone(),
        resource_type: record.resource_type.clone(),
        region: record.region.clone(),
        name: record.name.clone(),
        state: record.state.clone(),
        requires_management_token: record.requires_management_token,
        ip_evidence,
    }
}

/// SHA-256 over a canonical (sorted-key, compact) JSON rendering of the
/// projected resource set. A diffable fingerprint for reproducibility
/// reviews, not an integrity guarantee against a malicious modifier.
pub fn resources_sha256(resources: &[ResourceRecord]) -> Result<String> {
    let projected: Vec<ResourceProjection> = resources.iter().map(project_resource).collect();
    // Round-tripping through Value sorts object keys, giving a canonical form.
    let canonical =
        serde_json::to_value(&projected).context("project resources for hashing")?;
    Ok(sha256_hex(canonical.to_string().as_bytes()))
}

#[derive(Debug, Serialize)]
struct ProofManifest {
    generated_at: u128,
    provider: String,
    scope: BTreeMap<String, String>,
    regions: Vec<String>,
    licensing_basis: String,
    ratios: crate::licensing::SizingRatios,
    counts: crate::licensing::LicensingCounts,
    token_requirements: crate::licensing::TokenRequirements,
    breakdowns: ManifestBreakdowns,
    resources_summary: ResourcesSummary,
    hashes: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct ManifestBreakdowns {
    provider_breakdown: BTreeMap<String, crate::licensing::ProviderCounts>,
    ip_sources: BTreeMap<String, u64>,
    ip_spaces: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize)]
struct ResourcesSummary {
    total_objects: u64,
    by_type: BTreeMap<String, u64>,
    /// First 20 projected records, enough to spot-check a review.
    sample_resources: Vec<ResourceProjection>,
}

/// Write the audit manifest. The manifest embeds a hash over the resource
/// set, is written once, hashed, then rewritten with its own hash embedded.
pub fn write_proof_manifest(
    path: &Path,
    provider: &str,
    scope: &BTreeMap<String, String>,
    regions: &[String],
    report: &LicensingReport,
    resources: &[ResourceRecord],
) -> Result<()> {
    let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
    for record in resources {
        let ty = if record.resource_type.is_empty() {
            "unknown"
        } else {
            record.resource_type.as_str()
        };
        *by_type.entry(ty.to_string()).or_default() += 1;
    }

    let projected: Vec<ResourceProjection> =
        resources.iter().take(20).map(project_resource).collect();

    let mut provider_breakdown = BTreeMap::new();
    if let Some(counts) = report.provider_breakdown.get(provider) {
        provider_breakdown.insert(provider.to_string(), counts.clone());
    }

    let mut hashes = BTreeMap::new();
    hashes.insert("resources_sha256".to_string(), resources_sha256(resources)?);

    let mut manifest = ProofManifest {
        generated_at: report.generated_at_epoch_ms,
        provider: provider.to_string(),
        scope: scope.clone(),
        regions: regions.to_vec(),
        licensing_basis: report.licensing_basis.clone(),
        ratios: report.sizing_ratios.clone(),
        counts: report.counts.clone(),
        token_requirements: report.token_requirements.clone(),
        breakdowns: ManifestBreakdowns {
            provider_breakdown,
            ip_sources: report.aggregate.ip_sources.clone(),
            ip_spaces: report.aggregate.ip_spaces.clone(),
        },
        resources_summary: ResourcesSummary {
            total_objects: resources.len() as u64,
            by_type,
            sample_resources: projected,
        },
        hashes,
    };

    let first_pass = serde_json::to_vec_pretty(&manifest).context("serialize manifest")?;
    write_bytes(path, &first_pass)?;

    let manifest_sha256 = sha256_hex(&first_pass);
    manifest
        .hashes
        .insert("manifest_sha256".to_string(), manifest_sha256);
    let final_pass = serde_json::to_vec_pretty(&manifest).context("serialize manifest")?;
    write_bytes(path, &final_pass)?;

    tracing::info!(path = %path.display(), "wrote proof manifest");
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, text.as_bytes())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Output file name for the token calculation artifacts.
pub fn token_calculation_file_name(provider: &str, epoch_ms: u128, ext: &str) -> String {
    format!("{provider}_management_token_calculation_{epoch_ms}.{ext}")
}

/// Output file name for the token-free resource listing.
pub fn token_free_file_name(provider: &str, epoch_ms: u128, ext: &str) -> String {
    format!("{provider}_management_token_free_{epoch_ms}.{ext}")
}

fn push_row(out: &mut String, fields: &[&str]) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_escape(field));
    }
    out.push('\n');
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
