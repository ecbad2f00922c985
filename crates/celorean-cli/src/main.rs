//! Celorean CLI: Command-line interface for a Celorean node.
//!
//! Subcommands: login, session, issue, verify, list.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Celorean: Wallet sign-in and course credentials.
#[derive(Parser, Debug)]
#[command(name = "celorean", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in with a wallet key and print the session cookie.
    Login(commands::login::LoginArgs),
    /// Check a session cookie.
    Session(commands::session::SessionArgs),
    /// Issue a course credential.
    Issue(commands::issue::IssueArgs),
    /// Verify a stored credential by content id.
    Verify(commands::verify::VerifyArgs),
    /// List a student's credentials.
    List(commands::list::ListArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Login(args) => commands::login::run(args).await,
        Commands::Session(args) => commands::session::run(args).await,
        Commands::Issue(args) => commands::issue::run(args).await,
        Commands::Verify(args) => commands::verify::run(args).await,
        Commands::List(args) => commands::list::run(args).await,
    }
}
