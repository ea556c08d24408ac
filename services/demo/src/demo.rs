use crate::infra::Session;
use clap::Args;
use privacy_suite::composer::{render_markdown, ProfileComposer, ProfileSummary};
use privacy_suite::customers::{CustomerFilter, CustomerRecord, PrivacyTier};
use privacy_suite::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for the detailed reports (defaults to SUITE_REPORT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Only print the per-customer summaries
    #[arg(long)]
    pub(crate) skip_reports: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ProfileArgs {
    /// Customer id to build the profile for
    #[arg(long)]
    pub(crate) customer: String,
    /// Print the full profile as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Customer id to report on
    #[arg(long)]
    pub(crate) customer: String,
    /// Directory to write the report into (defaults to SUITE_REPORT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Print the Markdown to stdout instead of writing a file
    #[arg(long)]
    pub(crate) stdout: bool,
}

const RULE: &str =
    "================================================================================";

pub(crate) fn run_demo(session: &Session, args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        output_dir,
        skip_reports,
    } = args;

    println!("Privacy Protection Suite demo");
    println!(
        "Customer data: {} ({} customers)",
        session.config.data.customer_file.display(),
        session.store.len()
    );

    if session.store.is_empty() {
        println!("No customers to demonstrate.");
        return Ok(());
    }

    let mut composer = ProfileComposer::from_config(&session.store, &session.config.generation);
    for record in session.store.list_all() {
        println!("\n{RULE}");
        println!("{} ({})", display_name(record), record.customer_id);
        println!(
            "Privacy level: {} | Service tier: {}",
            record.privacy_level.as_deref().unwrap_or("medium"),
            record.service_tier.as_deref().unwrap_or("standard")
        );
        println!("{RULE}");

        let profile = composer.build_profile(record.customer_id.as_str())?;
        render_summary(&ProfileSummary::from_profile(&profile));
    }

    if skip_reports {
        return Ok(());
    }

    println!("\n{RULE}");
    println!("GENERATING DETAILED REPORTS FOR HIGH AND MAXIMUM PRIVACY CUSTOMERS");
    println!("{RULE}");

    let report_dir = session.report_dir(output_dir);
    let candidates: Vec<&CustomerRecord> = [PrivacyTier::High, PrivacyTier::Maximum]
        .into_iter()
        .flat_map(|tier| session.store.filter_by(&CustomerFilter::PrivacyLevel(tier)))
        .collect();

    if candidates.is_empty() {
        println!("No high or maximum privacy customers on file.");
    }

    for record in candidates {
        println!(
            "\nGenerating detailed report for {} ({})...",
            display_name(record),
            record.customer_id
        );
        let path = composer.save_report(record.customer_id.as_str(), &report_dir)?;
        println!("Report saved: {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_profile(session: &Session, args: ProfileArgs) -> Result<(), AppError> {
    let mut composer = ProfileComposer::from_config(&session.store, &session.config.generation);
    let profile = composer.build_profile(&args.customer)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let summary = ProfileSummary::from_profile(&profile);
    println!(
        "{} ({}) | privacy {} | service {}",
        summary.customer_name, summary.customer_id, summary.privacy_level, summary.service_tier
    );
    render_summary(&summary);
    println!(
        "{} of {} subsystems active, {} records generated",
        summary.active_subsystems,
        summary.subsystems.len(),
        summary.total_records
    );
    Ok(())
}

pub(crate) fn run_report(session: &Session, args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        customer,
        output_dir,
        stdout,
    } = args;
    let mut composer = ProfileComposer::from_config(&session.store, &session.config.generation);

    if stdout {
        let profile = composer.build_profile(&customer)?;
        print!("{}", render_markdown(&profile));
        return Ok(());
    }

    let path = composer.save_report(&customer, &session.report_dir(output_dir))?;
    println!("Report saved to: {}", path.display());
    Ok(())
}

fn render_summary(summary: &ProfileSummary) {
    for entry in &summary.subsystems {
        println!("- {}: {}", entry.subsystem_label, entry.headline);
    }
}

fn display_name(record: &CustomerRecord) -> &str {
    if record.name.trim().is_empty() {
        record.customer_id.as_str()
    } else {
        &record.name
    }
}
