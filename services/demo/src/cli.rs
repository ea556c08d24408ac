use crate::customers::{run_list, run_update, ListArgs, UpdateArgs};
use crate::demo::{run_demo, run_profile, run_report, DemoArgs, ProfileArgs, ReportArgs};
use crate::infra::Session;
use clap::{Parser, Subcommand};
use privacy_suite::config::AppConfig;
use privacy_suite::error::AppError;
use privacy_suite::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "privacy-suite",
    about = "Generate illustrative privacy protection profiles from stored customer preferences",
    version
)]
struct Cli {
    /// Customer data file (overrides SUITE_CUSTOMER_FILE)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Seed for reproducible output (overrides SUITE_RNG_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize every stored customer and save reports for high-privacy customers (default command)
    Demo(DemoArgs),
    /// Build one customer's protection profile
    Profile(ProfileArgs),
    /// Write one customer's Markdown report
    Report(ReportArgs),
    /// Inspect or edit stored customer preferences
    Customers {
        #[command(subcommand)]
        command: CustomersCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CustomersCommand {
    /// List stored customers, optionally filtered
    List(ListArgs),
    /// Merge new values into a stored customer and save the file
    Update(UpdateArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(path) = cli.data {
        config.data.customer_file = path;
    }
    if let Some(seed) = cli.seed {
        config.generation.seed = Some(seed);
    }

    telemetry::init(&config.telemetry)?;
    tracing::debug!(
        environment = ?config.environment,
        customer_file = %config.data.customer_file.display(),
        "configuration loaded"
    );

    let mut session = Session::open(config);
    let command = cli
        .command
        .unwrap_or_else(|| Command::Demo(DemoArgs::default()));

    match command {
        Command::Demo(args) => run_demo(&session, args),
        Command::Profile(args) => run_profile(&session, args),
        Command::Report(args) => run_report(&session, args),
        Command::Customers {
            command: CustomersCommand::List(args),
        } => run_list(&session, args),
        Command::Customers {
            command: CustomersCommand::Update(args),
        } => run_update(&mut session, args),
    }
}
