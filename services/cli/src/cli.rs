use crate::demo::{run_demo, run_report, run_score, DemoArgs, ReportArgs, ScoreArgs};
use clap::{Parser, Subcommand};
use credit_lens::config::AppConfig;
use credit_lens::error::AppError;
use credit_lens::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "credit-lens",
    about = "Reconcile multi-bureau credit reports into a single snapshot",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a credit snapshot from a bureau report file
    Report(ReportArgs),
    /// Print the band for a credit score
    Score(ScoreArgs),
    /// Run the report command against the bundled three-bureau fixture
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    info!(environment = ?config.environment, command = ?cli.command, "credit-lens starting");

    match cli.command {
        Command::Report(args) => run_report(args, &config),
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args, &config),
    }
}
