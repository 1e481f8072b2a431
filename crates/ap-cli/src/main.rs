//! Agent Playground — command-line entry point.

mod commands;
mod state;

use anyhow::Result;
use ap_core::config::PlaygroundConfig;
use clap::{Parser, Subcommand};
use commands::agents::{AgentsArgs, RunArgs};
use commands::history::HistoryArgs;
use commands::prompt::PromptCommand;
use state::AppState;

/// Browse agents, run them and edit their prompts
#[derive(Parser, Debug)]
#[command(name = "agent-playground")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List agents enabled for the playground
    Agents(AgentsArgs),

    /// Run an agent
    Run(RunArgs),

    /// Show or clear recent runs
    History(HistoryArgs),

    /// Work on an agent's prompt
    Prompt {
        #[command(subcommand)]
        command: PromptCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let state = AppState::new(PlaygroundConfig::from_env())?;

    match cli.command {
        Command::Agents(args) => commands::agents::list(&state, args).await,
        Command::Run(args) => commands::agents::run(&state, args).await,
        Command::History(args) => commands::history::execute(&state, args),
        Command::Prompt { command } => commands::prompt::execute(&state, command).await,
    }
}
