//! CLI argument parsing for the sizing workflow.
//!
//! The CLI is intentionally thin: discovery happens elsewhere and hands this
//! tool a JSON file of resource records, so the counting and licensing core
//! stays reusable as a library.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for counting and licensing estimation.
#[derive(Parser, Debug)]
#[command(
    name = "ddis",
    version,
    about = "Cloud resource counter and DDI licensing-token estimator",
    after_help = "Examples:\n  ddis count --input aws_native_objects.json --provider aws\n  ddis license --input aws_native_objects.json --provider aws --out-dir output \\\n      --scope account=123456789012 --regions us-east-1,us-west-2",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count discovered resources and print the aggregate breakdowns
    Count(CountArgs),
    /// Calculate token requirements and write the export artifacts
    License(LicenseArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Count resources and deduplicate active IPs")]
pub struct CountArgs {
    /// JSON file holding the discovered resource records
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Provider context (aws, azure, gcp, multicloud)
    #[arg(long, value_name = "NAME")]
    pub provider: String,

    /// Output path for the aggregate count JSON (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Output path for the token-free resource listing JSON
    #[arg(long, value_name = "PATH")]
    pub out_token_free: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Calculate token requirements and write export artifacts")]
pub struct LicenseArgs {
    /// JSON file holding the discovered resource records
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Provider context (aws, azure, gcp, multicloud)
    #[arg(long, value_name = "NAME")]
    pub provider: String,

    /// Directory for the CSV, text, estimator, and manifest artifacts
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub out_dir: PathBuf,

    /// Scope entries recorded in the audit manifest (key=value, repeatable)
    #[arg(long, value_name = "KV")]
    pub scope: Vec<String>,

    /// Regions covered by the run, recorded in the audit manifest
    #[arg(long, value_name = "R1,R2")]
    pub regions: Option<String>,
}
