use crate::commands::{run_listings, run_send_test_email, SendTestEmailArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loob_recruitment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loob Recruitment",
    about = "Run the Loob recruitment intake service and its operator commands",
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
    /// Send a confirmation email for a throwaway application through the configured transport
    SendTestEmail(SendTestEmailArgs),
    /// Print the job listing catalogue loaded at startup
    Listings,
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
        Command::SendTestEmail(args) => run_send_test_email(args).await,
        Command::Listings => run_listings(),
    }
}
