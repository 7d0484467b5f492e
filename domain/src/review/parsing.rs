//! Critique response parsing
//!
//! Critic agents are asked to answer with a fenced JSON block carrying a
//! `verdict` and optional `issues`, but free-text responses must never
//! crash the loop. Parsing is a single well-defined extraction step (find
//! the payload, strict-decode it) with a documented fallback: on any
//! failure the report degrades to `accept` with no issues.

use super::verdict::{CritiqueReport, Issue, IssueSeverity, Verdict};
use serde::Deserialize;

/// Raw payload shape, before normalization.
///
/// Every field is optional so a partially well-formed payload still decodes;
/// normalization applies the documented defaults afterwards.
#[derive(Debug, Deserialize)]
struct RawCritique {
    verdict: Option<String>,
    #[serde(default)]
    issues: Vec<RawIssue>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    severity: Option<String>,
    description: Option<String>,
}

/// Parse a critic response into a [`CritiqueReport`].
///
/// Extraction prefers a ` ```json ` fenced block; failing that, the outermost
/// `{..}` span. A missing payload, malformed JSON, or an unknown `verdict`
/// value all normalize to the default report (`accept`, no issues).
pub fn parse_critique(response: &str) -> CritiqueReport {
    let Some(payload) = extract_payload(response) else {
        return CritiqueReport::default();
    };

    let Ok(raw) = serde_json::from_str::<RawCritique>(payload) else {
        return CritiqueReport::default();
    };

    let verdict = raw
        .verdict
        .as_deref()
        .and_then(Verdict::parse_lenient)
        .unwrap_or(Verdict::Accept);

    let issues = raw
        .issues
        .into_iter()
        .filter_map(|i| {
            let description = i.description?;
            if description.trim().is_empty() {
                return None;
            }
            let severity = i
                .severity
                .as_deref()
                .map(IssueSeverity::parse_lenient)
                .unwrap_or(IssueSeverity::Major);
            Some(Issue::new(severity, description))
        })
        .collect();

    CritiqueReport {
        verdict,
        issues,
        summary: raw.summary.filter(|s| !s.trim().is_empty()),
    }
}

/// Locate the JSON payload inside a possibly free-text response
fn extract_payload(response: &str) -> Option<&str> {
    // Preferred: a ```json fenced block
    if let Some(fence_start) = response.find("```json") {
        let body = &response[fence_start + "```json".len()..];
        if let Some(fence_end) = body.find("```") {
            return Some(body[..fence_end].trim());
        }
    }

    // Fallback: the outermost brace span
    let start = response.find('{')?;
    let end = response[start..].rfind('}')?;
    Some(&response[start..start + end + 1])
}
