use crate::commands::{
    run_assignments, run_authorize, run_validate, AssignmentsArgs, AuthorizeArgs, ValidateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_checklists::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Checklists",
    about = "Serve and inspect fleet inspection checklist templates from the command line",
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
    /// Validate a template document and print its normalized form or every error found
    Validate(ValidateArgs),
    /// Preview the assignments a template would produce against CSV roster exports
    Assignments(AssignmentsArgs),
    /// Evaluate an access profile document against one action
    Authorize(AuthorizeArgs),
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
        Command::Validate(args) => run_validate(args),
        Command::Assignments(args) => run_assignments(args),
        Command::Authorize(args) => run_authorize(args),
    }
}
