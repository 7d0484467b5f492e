//! CLI entrypoint for agent-ensemble
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ensemble_application::{NoStateStore, RunTaskInput, RunTaskUseCase, StateStore};
use ensemble_domain::{AgentId, AgentRegistry, Role, RoleAssigner};
use ensemble_infrastructure::{CliAgentInvoker, ConfigLoader, FileStateStore, discover_agents};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// CLI arguments for agent-ensemble
#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(author, version, about = "Coordinates AI coding agents to plan, implement, and review a task")]
#[command(long_about = r#"
agent-ensemble runs a task through a small crew of external coding agents
(claude, codex, gemini, ollama), whichever of them are installed:

1. Decompose: a planner agent breaks the task into steps
2. Implement: an implementer agent produces a candidate
3. Consensus: a critic agent reviews; revise/accept/reject, bounded rounds
4. Present: the final output and verdict are printed

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./ensemble.toml     Project-level config
3. ~/.config/agent-ensemble/config.toml   Global config

Example:
  ensemble "add a --dry-run flag to the sync command"
  ensemble --pin critic=gemini --max-iterations 5 "fix the flaky retry test"
  ensemble --agents
"#)]
struct Cli {
    /// The task to run (not required with --agents)
    task: Option<String>,

    /// List discovered agents and exit
    #[arg(long)]
    agents: bool,

    /// Pin a role to an agent, e.g. critic=gemini (repeatable)
    #[arg(long, value_name = "ROLE=AGENT")]
    pin: Vec<String>,

    /// Maximum critic iterations in the consensus loop
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    /// Skip the consensus review entirely
    #[arg(long)]
    no_review: bool,

    /// Explicit config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore all config files, use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Suppress the banner and progress output
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting agent-ensemble");

    // Load configuration
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Failed to load configuration")?
    };

    // Discover installed agents
    let registry = discover_agents(&file_config.disabled_agents()).await;

    if cli.agents {
        let store = state_dir().and_then(|dir| FileStateStore::open(dir).ok());
        print_agents(&registry, store.as_ref());
        return Ok(());
    }

    let task = match cli.task {
        Some(t) => t,
        None => bail!("A task is required. Use --agents to list discovered agents."),
    };

    if registry.available_count() == 0 {
        bail!("No coding agents found on PATH (looked for claude, codex, gemini, ollama)");
    }

    // Build settings: file config first, CLI flags on top
    let mut settings = file_config.to_settings();
    for pin in &cli.pin {
        let (role, agent) = parse_pin(pin)?;
        settings.pins.insert(role, agent);
    }
    if let Some(max) = cli.max_iterations {
        settings.max_iterations = max;
    }
    if cli.no_review {
        settings.enable_review = false;
    }

    // === Dependency Injection ===
    let invoker = Arc::new(CliAgentInvoker::new(settings.overrides.clone()));
    let store = open_state_store();
    let assigner = RoleAssigner::new(registry.clone(), settings.pins.clone());

    if !cli.quiet {
        println!();
        println!("agent-ensemble");
        println!("Task:   {task}");
        println!(
            "Agents: {}",
            registry
                .available()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let use_case = RunTaskUseCase::new(invoker, store);
    let output = use_case
        .execute(RunTaskInput::new(task), &assigner, &settings)
        .await?;

    // Present
    if !cli.quiet {
        if let Some(plan) = &output.plan {
            println!("--- Plan ---");
            println!("{plan}");
            println!();
        }
        println!("--- Assignments ---");
        for (role, agent) in &output.assignments {
            println!("  {role:<12} {agent}");
        }
        println!();
    }

    println!("{}", output.outcome.output);

    if !cli.quiet {
        println!();
        let outcome = &output.outcome;
        if outcome.was_reviewed() {
            println!(
                "Verdict: {} after {} iteration(s){}",
                outcome.verdict,
                outcome.iterations,
                if outcome.forced { " (iteration cap reached)" } else { "" }
            );
            for issue in &outcome.issues {
                println!("  [{:?}] {}", issue.severity, issue.description);
            }
        } else {
            println!("Verdict: accept (review skipped)");
        }
    }

    if output.outcome.is_rejected() {
        // Output was still printed; the exit code carries the failure signal
        std::process::exit(1);
    }

    Ok(())
}

/// Parse a `role=agent` pin argument
fn parse_pin(pin: &str) -> Result<(Role, AgentId)> {
    let (role_name, agent_name) = pin
        .split_once('=')
        .with_context(|| format!("Invalid pin '{pin}': expected ROLE=AGENT"))?;
    let role: Role = role_name
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid pin '{pin}': {e}"))?;
    let agent: AgentId = agent_name
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid pin '{pin}': {e}"))?;
    Ok((role, agent))
}

/// List discovered agents with versions, capabilities, and verdict history
fn print_agents(registry: &AgentRegistry, store: Option<&FileStateStore>) {
    if registry.available_count() == 0 {
        println!("No agents found on PATH (looked for claude, codex, gemini, ollama)");
        return;
    }
    println!("Discovered agents:");
    for agent in registry.discovered() {
        let caps = agent
            .id
            .capabilities()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let history = store
            .map(|s| s.verdict_totals(agent.id))
            .filter(|t| t.total() > 0)
            .map(|t| {
                format!(
                    "  accept {} / revise {} / reject {}",
                    t.accepts, t.revises, t.rejects
                )
            })
            .unwrap_or_default();
        println!(
            "  {:<8} {:<24} [{caps}]{history}",
            agent.id.to_string(),
            agent.version
        );
    }
}

/// Directory holding the persistent state files
fn state_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("agent-ensemble"))
}

/// Open the file-backed state store, degrading to no-op persistence
fn open_state_store() -> Arc<dyn StateStore> {
    let Some(dir) = state_dir() else {
        warn!("No data directory available; state will not be persisted");
        return Arc::new(NoStateStore);
    };
    match FileStateStore::open(&dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Could not open state store in {}: {e}", dir.display());
            Arc::new(NoStateStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let (role, agent) = parse_pin("critic=gemini").unwrap();
        assert_eq!(role, Role::Critic);
        assert_eq!(agent, AgentId::Gemini);
    }

    #[test]
    fn test_parse_pin_trims_whitespace() {
        let (role, agent) = parse_pin(" implementer = claude ").unwrap();
        assert_eq!(role, Role::Implementer);
        assert_eq!(agent, AgentId::Claude);
    }

    #[test]
    fn test_parse_pin_rejects_garbage() {
        assert!(parse_pin("critic").is_err());
        assert!(parse_pin("janitor=claude").is_err());
        assert!(parse_pin("critic=copilot").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "ensemble",
            "--pin",
            "critic=gemini",
            "--max-iterations",
            "5",
            "-vv",
            "do the thing",
        ]);
        assert_eq!(cli.task.as_deref(), Some("do the thing"));
        assert_eq!(cli.pin, ["critic=gemini"]);
        assert_eq!(cli.max_iterations, Some(5));
        assert_eq!(cli.verbose, 2);
    }
}
