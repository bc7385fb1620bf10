use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ddi_sizer::cli::{Command, CountArgs, LicenseArgs, RootArgs};
use ddi_sizer::counter::ResourceCounter;
use ddi_sizer::export;
use ddi_sizer::licensing::LicensingCalculator;
use ddi_sizer::provider::Provider;
use ddi_sizer::resource::ResourceRecord;
use ddi_sizer::token_free::partition_token_free;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Count(args) => run_count(args),
        Command::License(args) => run_license(args),
    }
}

fn load_resources(path: &Path) -> Result<Vec<ResourceRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[derive(Serialize)]
struct CountOutput {
    provider: String,
    count: ddi_sizer::ResourceCount,
    licensed_objects: u64,
    token_free_objects: u64,
}

fn run_count(args: CountArgs) -> Result<()> {
    let counter = ResourceCounter::new(&args.provider)?;
    let resources = load_resources(&args.input)?;
    let count = counter.count(&resources);
    let partition = partition_token_free(&resources);

    let output = CountOutput {
        provider: counter.provider().to_string(),
        count,
        licensed_objects: partition.licensed.len() as u64,
        token_free_objects: partition.token_free.len() as u64,
    };
    let rendered = serde_json::to_string_pretty(&output).context("serialize count output")?;
    match &args.out {
        Some(path) => export::write_text(path, &rendered)?,
        None => println!("{rendered}"),
    }

    if let Some(path) = &args.out_token_free {
        let rendered = serde_json::to_string_pretty(&partition.token_free)
            .context("serialize token-free listing")?;
        export::write_text(path, &rendered)?;
    }
    Ok(())
}

fn run_license(args: LicenseArgs) -> Result<()> {
    let provider = Provider::parse(&args.provider)?;
    let resources = load_resources(&args.input)?;
    let calculator = LicensingCalculator::new(Some(provider));
    let report = calculator.calculate(&resources);

    let scope = parse_scope(&args.scope)?;
    let regions: Vec<String> = args
        .regions
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis();
    let name = provider.as_str();

    let csv_path = args
        .out_dir
        .join(export::token_calculation_file_name(name, stamp, "csv"));
    export::write_text(&csv_path, &export::render_csv(&report, name))?;

    let txt_path = args
        .out_dir
        .join(export::token_calculation_file_name(name, stamp, "txt"));
    export::write_text(&txt_path, &export::render_text_summary(&report, name))?;

    let estimator_path = args
        .out_dir
        .join(format!("{name}_estimator_{stamp}.csv"));
    export::write_text(&estimator_path, &export::render_estimator_csv(&report))?;

    let manifest_path = args
        .out_dir
        .join(export::token_calculation_file_name(name, stamp, "json"));
    export::write_proof_manifest(&manifest_path, name, &scope, &regions, &report, &resources)?;

    println!("{}", export::render_text_summary(&report, name));
    tracing::info!(
        out_dir = %args.out_dir.display(),
        "wrote licensing artifacts"
    );
    Ok(())
}

fn parse_scope(entries: &[String]) -> Result<BTreeMap<String, String>> {
    let mut scope = BTreeMap::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("scope entry must be key=value: {entry}"))?;
        scope.insert(key.to_string(), value.to_string());
    }
    Ok(scope)
}
