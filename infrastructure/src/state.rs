//! File-backed state store
//!
//! Implements the [`StateStore`] port with three artifacts under one state
//! directory:
//!
//! - `state.json`: the key-value run state and agent stats, rewritten
//!   whole via write-to-temp-then-rename so readers never see a torn file
//! - `session.jsonl`: append-only session log, one JSON object per line
//!   with a `type` field and `timestamp`
//! - `patterns.txt`: learned patterns, one per line, append-only
//!
//! Everything is best-effort: failures are logged with `warn!` and
//! swallowed, never surfaced to the core logic.

use ensemble_application::ports::state_store::{SessionEvent, StateStore};
use ensemble_domain::{AgentId, Role, Verdict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// The persisted document behind `state.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateDoc {
    /// Key-value run state (e.g. `consensus.verdict`)
    state: BTreeMap<String, String>,
    /// Verdict counters keyed `agent/role/verdict`
    stats: BTreeMap<String, u64>,
}

/// Verdict tallies for one agent, summed across roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictTotals {
    pub accepts: u64,
    pub revises: u64,
    pub rejects: u64,
}

impl VerdictTotals {
    pub fn total(&self) -> u64 {
        self.accepts + self.revises + self.rejects
    }
}

/// State store persisting under a single directory
pub struct FileStateStore {
    dir: PathBuf,
    doc: Mutex<StateDoc>,
}

impl FileStateStore {
    /// Open (or create) the store under `dir`.
    ///
    /// An existing but unreadable `state.json` is discarded with a warning;
    /// persisted state is advisory, not load-bearing.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let state_path = dir.join("state.json");
        let doc = match std::fs::read_to_string(&state_path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Discarding unreadable state file {}: {e}", state_path.display());
                StateDoc::default()
            }),
            Err(_) => StateDoc::default(),
        };

        Ok(Self {
            dir,
            doc: Mutex::new(doc),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Verdict counter for one (agent, role, verdict) triple
    pub fn stat(&self, agent: AgentId, role: Role, verdict: Verdict) -> u64 {
        let key = stat_key(agent, role, verdict);
        self.doc
            .lock()
            .map(|doc| doc.stats.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Verdict tallies for one agent across all roles, for the agents listing
    pub fn verdict_totals(&self, agent: AgentId) -> VerdictTotals {
        let Ok(doc) = self.doc.lock() else {
            return VerdictTotals::default();
        };
        let prefix = format!("{agent}/");
        let mut totals = VerdictTotals::default();
        for (key, count) in doc.stats.iter().filter(|(k, _)| k.starts_with(&prefix)) {
            match key.rsplit('/').next() {
                Some("accept") => totals.accepts += count,
                Some("revise") => totals.revises += count,
                Some("reject") => totals.rejects += count,
                _ => {}
            }
        }
        totals
    }

    /// Write the whole document atomically: temp file, then rename
    fn persist(&self, doc: &StateDoc) {
        let path = self.dir.join("state.json");
        let tmp = self.dir.join("state.json.tmp");

        let json = match serde_json::to_string_pretty(doc) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize state: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&tmp, json) {
            warn!("Could not write state file {}: {e}", tmp.display());
            return;
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            warn!("Could not replace state file {}: {e}", path.display());
        }
    }

    fn append_line(&self, filename: &str, line: &str) {
        let path = self.dir.join(filename);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| writeln!(file, "{line}"));
        if let Err(e) = result {
            warn!("Could not append to {}: {e}", path.display());
        }
    }
}

fn stat_key(agent: AgentId, role: Role, verdict: Verdict) -> String {
    format!("{agent}/{role}/{verdict}")
}

impl StateStore for FileStateStore {
    fn set_state(&self, key: &str, value: &str) {
        let Ok(mut doc) = self.doc.lock() else {
            return;
        };
        doc.state.insert(key.to_string(), value.to_string());
        self.persist(&doc);
    }

    fn get_state(&self, key: &str) -> Option<String> {
        self.doc.lock().ok()?.state.get(key).cloned()
    }

    fn record_pattern(&self, pattern: &str) {
        // One pattern per line; embedded newlines would corrupt the format
        let flattened = pattern.replace('\n', " ");
        self.append_line("patterns.txt", &flattened);
    }

    fn update_agent_stats(&self, agent: AgentId, role: Role, verdict: Verdict) {
        let Ok(mut doc) = self.doc.lock() else {
            return;
        };
        *doc.stats.entry(stat_key(agent, role, verdict)).or_insert(0) += 1;
        self.persist(&doc);
    }

    fn log_event(&self, event: SessionEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Merge payload with type + timestamp
        let record = if let serde_json::Value::Object(mut map) = event.payload {
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.clone()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "timestamp": timestamp,
                "payload": event.payload,
            })
        };

        match serde_json::to_string(&record) {
            Ok(line) => self.append_line("session.jsonl", &line),
            Err(e) => warn!("Could not serialize session event: {e}"),
        }
    }
}
