//! Verdict and issue types for consensus reviews

use serde::{Deserialize, Serialize};

/// The critic's judgment of a candidate implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The candidate is good enough; terminate successfully
    #[default]
    Accept,
    /// The candidate needs another implementation pass
    Revise,
    /// The candidate is unsalvageable; terminate with a failure signal
    Reject,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Revise => "revise",
            Verdict::Reject => "reject",
        }
    }

    /// Permissive parse: anything that is not exactly one of the three
    /// known verdicts (case-insensitive) is `None`; callers default to
    /// [`Verdict::Accept`].
    pub fn parse_lenient(s: &str) -> Option<Verdict> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Some(Verdict::Accept),
            "revise" => Some(Verdict::Revise),
            "reject" => Some(Verdict::Reject),
            _ => None,
        }
    }

    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn is_reject(&self) -> bool {
        matches!(self, Verdict::Reject)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How serious a reported issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Major,
    Minor,
}

impl IssueSeverity {
    /// Lenient parse with `Major` as the neutral default, so an unknown
    /// severity string never gets harvested as a "minor" pattern.
    pub fn parse_lenient(s: &str) -> IssueSeverity {
        match s.trim().to_lowercase().as_str() {
            "critical" => IssueSeverity::Critical,
            "minor" => IssueSeverity::Minor,
            _ => IssueSeverity::Major,
        }
    }
}

/// A single issue reported by the critic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub description: String,
}

impl Issue {
    pub fn new(severity: IssueSeverity, description: impl Into<String>) -> Self {
        Self {
            severity,
            description: description.into(),
        }
    }
}

/// The structured content extracted from one critic response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueReport {
    pub verdict: Verdict,
    pub issues: Vec<Issue>,
    pub summary: Option<String>,
}

impl Default for CritiqueReport {
    /// The degrade-gracefully default: accept with no issues
    fn default() -> Self {
        Self {
            verdict: Verdict::Accept,
            issues: Vec::new(),
            summary: None,
        }
    }
}

impl CritiqueReport {
    /// Issues of minor severity, harvestable as learned patterns
    pub fn minor_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Minor)
    }
}
