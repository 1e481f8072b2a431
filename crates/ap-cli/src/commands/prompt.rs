//! Prompt commands: inspect, edit, discard and promote an agent's prompt.

use crate::commands::agents::find_agent;
use crate::state::AppState;
use anyhow::{anyhow, bail, Context, Result};
use ap_core::prompt::ResourceId;
use ap_core::status::PromotionState;
use ap_editor::PromptSession;
use ap_providers::AgentCatalog;
use clap::{Args, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum PromptCommand {
    /// Print the prompt text the editor would open with
    Show(PromptArgs),
    /// Show how the local draft relates to the server version
    Status(PromptArgs),
    /// Replace the prompt text with the contents of a file or stdin
    Edit(EditArgs),
    /// Drop the local draft and go back to the server version
    Discard(PromptArgs),
    /// Create a new server version from the current text
    Promote(PromptArgs),
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Agent id or name
    pub agent: String,

    /// Use this prompt id instead of looking it up in the agent catalog
    #[arg(long)]
    pub prompt_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: PromptArgs,

    /// Read the new text from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

pub async fn execute(state: &AppState, command: PromptCommand) -> Result<()> {
    match command {
        PromptCommand::Show(args) => {
            let session = open(state, &args).await?;
            let record = session.record();
            eprintln!("{} (version {})", record.name, record.version);
            println!("{}", session.editor_text());
            session.close(false).await?;
        }
        PromptCommand::Status(args) => {
            let session = open(state, &args).await?;
            let current = session.state().await;
            println!("{}: {}", session.id(), current.describe());
            println!("server version: {}", session.record().version);
            warn_stale_draft(&session).await;
            session.close(false).await?;
        }
        PromptCommand::Edit(args) => {
            let text = read_text(args.file.as_ref())?;
            let mut session = open(state, &args.target).await?;
            let current = session.edit(text).await;
            warn_stale_draft(&session).await;
            session.close(true).await.context("saving draft")?;
            println!("{}", current.describe());
        }
        PromptCommand::Discard(args) => {
            let mut session = open(state, &args).await?;
            let current = session.discard().await?;
            println!("{}", current.describe());
            session.close(false).await?;
        }
        PromptCommand::Promote(args) => {
            let mut session = open(state, &args).await?;
            let mut states = session.start_promotion().await?;
            while states.changed().await.is_ok() {
                match &*states.borrow_and_update() {
                    PromotionState::Describing => eprintln!("Describing change..."),
                    PromotionState::Creating { description } => {
                        eprintln!("Creating version: {description}")
                    }
                    _ => {}
                }
            }
            let last = PromotionState::clone(&states.borrow());
            let outcome = session.finish_promotion(last).await;
            session.close(false).await?;
            match outcome {
                PromotionState::Succeeded { record, version } => {
                    println!(
                        "Promoted {} to version {}: {}",
                        record.name, record.version, version.change_description
                    );
                }
                PromotionState::Failed { message } => bail!("promotion failed: {message}"),
                other => bail!("promotion ended in unexpected state {other:?}"),
            }
        }
    }
    Ok(())
}

async fn warn_stale_draft(session: &PromptSession) {
    if session.has_stale_draft().await {
        eprintln!(
            "note: a different local draft is still stored and will reopen next time; \
             run `prompt discard` to drop it"
        );
    }
}

async fn open(state: &AppState, args: &PromptArgs) -> Result<PromptSession> {
    let id = resolve_prompt(state, args).await?;
    state.open_prompt(id).await
}

async fn resolve_prompt(state: &AppState, args: &PromptArgs) -> Result<ResourceId> {
    if let Some(id) = &args.prompt_id {
        return Ok(ResourceId::new(id.as_str()));
    }
    let client = state.agent_client()?;
    let agents = client.list_agents().await.context("listing agents")?;
    let agent = find_agent(&agents, &args.agent)?;
    agent
        .prompt_resource()
        .ok_or_else(|| anyhow!("agent '{}' has no prompt", agent.name))
}

fn read_text(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}
