//! Run history commands.

use crate::state::AppState;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show runs of this agent id
    #[arg(long)]
    pub agent: Option<String>,

    /// Delete all recorded runs
    #[arg(long, conflicts_with = "agent")]
    pub clear: bool,

    /// Print the entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(state: &AppState, args: HistoryArgs) -> Result<()> {
    if args.clear {
        state.history.clear()?;
        println!("History cleared.");
        return Ok(());
    }

    let entries = match &args.agent {
        Some(agent) => state.history.for_agent(agent)?,
        None => state.history.list()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }
    for entry in entries {
        let outcome = if entry.result.success { "ok" } else { "failed" };
        println!(
            "{}  {:<24} {:<6} {:>6} ms",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.agent_name,
            outcome,
            entry.result.response_time_ms
        );
    }
    Ok(())
}
