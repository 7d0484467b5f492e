//! Agent discovery
//!
//! Probes `$PATH` for each known agent binary and captures a version string
//! from `<binary> --version`. A binary that exists but does not answer the
//! probe is still recorded, with `"available"` as its version. Discovery
//! runs once at process start; the resulting registry is immutable.

use ensemble_domain::{AgentId, AgentRegistry, DiscoveredAgent};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Probe for all known agents, skipping any the configuration disabled
pub async fn discover_agents(disabled: &[AgentId]) -> AgentRegistry {
    let mut found = Vec::new();

    for id in AgentId::ALL {
        if disabled.contains(&id) {
            debug!("Agent {id} disabled by configuration");
            continue;
        }
        if !is_command_available(id.binary()) {
            debug!("Agent {id} not found on PATH");
            continue;
        }

        let version = probe_version(id)
            .await
            .unwrap_or_else(|| "available".to_string());
        info!("Discovered agent {id} ({version})");
        found.push(DiscoveredAgent::new(id, version));
    }

    AgentRegistry::new(found)
}

/// Check if a command is available on the system
fn is_command_available(command: &str) -> bool {
    which::which(command).is_ok()
}

/// Best-effort `--version` capture; first non-empty stdout line
async fn probe_version(id: AgentId) -> Option<String> {
    let output = Command::new(id.binary())
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
