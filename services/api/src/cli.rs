use crate::demo::{run_demo, run_validation_report, DemoArgs, ValidationReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use underwriter_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Underwriting Validation Engine",
    about = "Evaluate hierarchical underwriting requirements from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a rule file and emit a CSV validation report
    Validation {
        #[command(subcommand)]
        command: ValidationCommand,
    },
    /// Run an end-to-end CLI demo on a bundled sample policy
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ValidationCommand {
    /// Evaluate rules against applicant data and render the report
    Report(ValidationReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Validation {
            command: ValidationCommand::Report(args),
        } => run_validation_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
