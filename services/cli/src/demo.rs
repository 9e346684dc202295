use crate::infra::{resolve_selector, today, OutputFormat};
use chrono::NaiveDate;
use clap::Args;
use credit_lens::config::AppConfig;
use credit_lens::error::AppError;
use credit_lens::report::{categorize, CreditFile, CreditSnapshot, IdentitySource};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

const DEMO_REPORT: &str =
    include_str!("../../../crates/credit-lens/fixtures/three_bureau_report.json");
const ADDRESS_FIELDS: &[&str] = &["line1", "line2", "city", "state", "postalCode"];
const EMPLOYMENT_FIELDS: &[&str] = &["employer", "position", "since"];

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Path to the bureau report JSON
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Bureau to report on (equifax, transunion, experian, all)
    #[arg(long)]
    pub(crate) bureau: Option<String>,
    /// Date account ages are measured against (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Credit score to categorize
    #[arg(allow_negative_numbers = true)]
    pub(crate) value: i64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Bureau to report on (equifax, transunion, experian, all)
    #[arg(long)]
    pub(crate) bureau: Option<String>,
    /// Date account ages are measured against. Defaults to 2025-10-01 so the
    /// demo output is stable.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

pub(crate) fn run_report(args: ReportArgs, config: &AppConfig) -> Result<(), AppError> {
    let selector = resolve_selector(args.bureau.as_deref(), config)?;
    let as_of = args.as_of.unwrap_or_else(today);
    let file = CreditFile::from_path(&args.input)?;

    info!(input = %args.input.display(), %selector, %as_of, "building credit snapshot");
    let snapshot = file.snapshot(selector, as_of);
    print_snapshot(&snapshot, args.format)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let band = categorize(args.value);
    match args.format {
        OutputFormat::Text => println!("{}: {}", args.value, band.label()),
        OutputFormat::Json => {
            let body = serde_json::json!({
                "score": args.value,
                "band": band,
                "label": band.label(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let selector = resolve_selector(args.bureau.as_deref(), config)?;
    let as_of = args
        .as_of
        .or(NaiveDate::from_ymd_opt(2025, 10, 1))
        .unwrap_or_else(today);
    let file = CreditFile::from_reader(DEMO_REPORT.as_bytes())?;

    info!(%selector, %as_of, bureaus = file.bureaus().len(), "running bundled demo report");
    let snapshot = file.snapshot(selector, as_of);
    print_snapshot(&snapshot, args.format)
}

fn print_snapshot(snapshot: &CreditSnapshot, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Text => print!("{}", render_snapshot(snapshot)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(snapshot)?),
    }
    Ok(())
}

pub(crate) fn render_snapshot(snapshot: &CreditSnapshot) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Credit snapshot: {} (as of {})",
        snapshot.selector.label(),
        snapshot.as_of
    ));

    match &snapshot.identity {
        Some(identity) => {
            let source = match &identity.source {
                IdentitySource::ProviderView { provider_code } => {
                    provider_code.as_deref().unwrap_or("unlabeled bureau").to_string()
                }
                IdentitySource::LegacyPersonalInfo => "legacy personal info".to_string(),
            };
            lines.push(format!(
                "\nIdentity (seeded from {source})\n- Name: {}",
                identity.name().unwrap_or_else(|| "unknown".to_string())
            ));
            if let Some(dob) = identity.date_of_birth() {
                lines.push(format!("- Date of birth: {dob}"));
            }
            if let Some(address) = identity.current_address() {
                let address = describe_record(address, ADDRESS_FIELDS);
                lines.push(format!("- Current address: {address}"));
            }
            for address in identity.previous_addresses() {
                let address = describe_record(address, ADDRESS_FIELDS);
                lines.push(format!("- Previous address: {address}"));
            }
            for job in identity.employment() {
                lines.push(format!("- Employment: {}", describe_record(job, EMPLOYMENT_FIELDS)));
            }
        }
        None => lines.push("\nIdentity: none reported".to_string()),
    }

    if snapshot.scores.is_empty() {
        lines.push("\nScores: none reported".to_string());
    } else {
        lines.push("\nScores".to_string());
        for score in &snapshot.scores {
            let bureau = score
                .bureau
                .map(|bureau| bureau.label())
                .or(score.provider_code.as_deref())
                .unwrap_or("unlabeled bureau");
            lines.push(format!("- {bureau}: {} ({})", score.score, score.band_label));
        }
    }

    let metrics = &snapshot.metrics;
    let provenance = &metrics.provenance;
    lines.push("\nMetrics".to_string());
    lines.push(format!(
        "- Utilization: {:.1}% [{}]",
        metrics.utilization_rate * 100.0,
        provenance.utilization_rate.label()
    ));
    lines.push(format!(
        "- Balance / limit: {:.2} / {:.2}, available {:.2} [{}]",
        metrics.total_balance,
        metrics.total_credit_limit,
        metrics.available_credit,
        provenance.total_balance.label()
    ));
    lines.push(format!(
        "- Accounts: {} [{}]",
        metrics.total_accounts,
        provenance.total_accounts.label()
    ));
    lines.push(format!(
        "- On-time payments: {}% [{}]",
        metrics.on_time_percentage,
        provenance.on_time_percentage.label()
    ));
    lines.push(format!(
        "- Average account age: {} months [{}]",
        metrics.average_account_age_months,
        provenance.average_account_age.label()
    ));

    if snapshot.accounts.is_empty() {
        lines.push("\nAccounts: none".to_string());
    } else {
        lines.push("\nAccounts".to_string());
        for account in &snapshot.accounts {
            let limit = account
                .credit_limit
                .map(|limit| format!("{limit:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!(
                "- {} {}: balance {:.2}, limit {}",
                account.kind.label(),
                account.creditor_name.as_deref().unwrap_or("unnamed creditor"),
                account.balance,
                limit
            ));
        }
    }

    lines.push(format!(
        "\nInquiries: {}, public records: {}, collections: {}",
        snapshot.inquiries.len(),
        snapshot.public_records.len(),
        snapshot.collections.len()
    ));

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Joins the listed text fields of a bureau record for display.
fn describe_record(value: &Value, fields: &[&str]) -> String {
    let parts: Vec<&str> = match value {
        Value::String(text) => vec![text.trim()],
        Value::Object(record) => fields
            .iter()
            .filter_map(|field| record.get(*field).and_then(Value::as_str))
            .map(str::trim)
            .collect(),
        _ => Vec::new(),
    };

    let parts: Vec<&str> = parts.into_iter().filter(|part| !part.is_empty()).collect();
    if parts.is_empty() {
        "unspecified".to_string()
    } else {
        parts.join(", ")
    }
}
