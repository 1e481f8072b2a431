//! Agent catalog commands: list, search and run.

use crate::state::AppState;
use anyhow::{anyhow, bail, Context, Result};
use ap_core::agent::{search, Agent, AgentRunInput};
use ap_core::history::HistoryEntry;
use ap_providers::AgentCatalog;
use clap::Args;

#[derive(Args, Debug)]
pub struct AgentsArgs {
    /// Only show agents whose name, description or model contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Print the agents as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Agent id or name
    pub agent: String,

    /// Input field, repeatable. Values that parse as JSON are sent as JSON
    #[arg(short, long = "input", value_name = "KEY=VALUE")]
    pub inputs: Vec<String>,

    /// Inputs as a JSON object
    #[arg(long, conflicts_with = "inputs")]
    pub json: Option<String>,
}

pub async fn list(state: &AppState, args: AgentsArgs) -> Result<()> {
    let client = state.agent_client()?;
    let agents = client.list_agents().await.context("listing agents")?;
    let matches = search(&agents, args.search.as_deref().unwrap_or(""));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No agents found.");
        return Ok(());
    }
    for agent in matches {
        println!("{:<24} {:<16} {}", agent.id, agent.model, agent.name);
        if !agent.description.is_empty() {
            println!("{:<24} {}", "", agent.description);
        }
    }
    Ok(())
}

pub async fn run(state: &AppState, args: RunArgs) -> Result<()> {
    let inputs = parse_inputs(&args.inputs, args.json.as_deref())?;
    let client = state.agent_client()?;
    let agents = client.list_agents().await.context("listing agents")?;
    let agent = find_agent(&agents, &args.agent)?;

    let result = client.run_agent(agent, &inputs).await;
    let entry = HistoryEntry::new(&agent.id, &agent.name, inputs, result.clone());
    if let Err(e) = state.history.add(&entry) {
        tracing::warn!("Failed to record run history: {e}");
    }

    if !result.success {
        bail!(
            "{} failed after {} ms: {}",
            agent.name,
            result.response_time_ms,
            result.error.unwrap_or_default()
        );
    }

    eprintln!("{} answered in {} ms", agent.name, result.response_time_ms);
    match result.data {
        Some(serde_json::Value::String(text)) => println!("{text}"),
        Some(data) => println!("{}", serde_json::to_string_pretty(&data)?),
        None => {}
    }
    Ok(())
}

/// Look up an agent by exact id, then by case-insensitive name.
pub fn find_agent<'a>(agents: &'a [Agent], key: &str) -> Result<&'a Agent> {
    agents
        .iter()
        .find(|a| a.id == key)
        .or_else(|| agents.iter().find(|a| a.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| anyhow!("no playground agent named '{key}'"))
}

fn parse_inputs(pairs: &[String], json: Option<&str>) -> Result<AgentRunInput> {
    if let Some(json) = json {
        return match serde_json::from_str(json).context("parsing --json")? {
            serde_json::Value::Object(map) => Ok(map),
            _ => bail!("--json must be a JSON object"),
        };
    }

    let mut inputs = AgentRunInput::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("input '{pair}' is not KEY=VALUE"))?;
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        inputs.insert(key.trim().to_string(), value);
    }
    Ok(inputs)
}
