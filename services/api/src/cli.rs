use crate::demo::{run_demo, run_reminder_sweep, DemoArgs, RemindArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use shift_planner::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Shift Planner",
    about = "Run the shift planning service or its scheduled jobs from the command line",
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
    /// Run the deadline reminder sweep once, as the scheduler would
    Remind(RemindArgs),
    /// Run an end-to-end demo: open a period, collect availability, and
    /// print the staffing dashboard
    Demo(DemoArgs),
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
        Command::Remind(args) => run_reminder_sweep(args),
        Command::Demo(args) => run_demo(args),
    }
}
