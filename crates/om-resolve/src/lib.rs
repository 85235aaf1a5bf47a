//! Project identity resolution.
//!
//! Recurring meetings drift in how their transcripts are titled, so exact
//! key equality under-groups. The resolver fuzzy-matches a freshly extracted
//! identity against the known projects and decides append-vs-create.
//!
//! Matching is greedy first-match over the caller-supplied (stable) order,
//! not best-match: the first existing key scoring at or above the threshold
//! wins even if a later key would score higher. Kept that way deliberately
//! for reproducibility; ties are not broken toward the closest match.

use om_core::{IngestError, ProjectRef, TranscriptIdentity};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minimum similarity (0-100 scale) for two keys to denote one project.
pub const MATCH_THRESHOLD: f64 = 90.0;

/// Outcome of identity resolution. The caller performs the actual upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Append to an existing project under its canonical key.
    Matched { canonical_key: String },
    /// No existing project is close enough; create a new one.
    New {
        project_key: String,
        project_id: String,
    },
}

impl Resolution {
    /// The key all subsequent persistence for this ingestion must use.
    pub fn canonical_key(&self) -> &str {
        match self {
            Self::Matched { canonical_key } => canonical_key,
            Self::New { project_key, .. } => project_key,
        }
    }
}

/// Case-insensitive similarity between two project keys on a 0-100 scale.
pub fn key_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * 100.0
}

/// Decide whether `identity` belongs to one of `existing` or starts a new
/// project. No side effects.
pub fn resolve(
    identity: &TranscriptIdentity,
    existing: &[ProjectRef],
) -> Result<Resolution, IngestError> {
    let candidate = identity.project_key.trim();
    if candidate.is_empty() {
        // An empty key would score 100 against another empty key and silently
        // merge unrelated garbage ingestions.
        return Err(IngestError::MatchingUnavailable(
            "empty candidate project key".into(),
        ));
    }

    for project in existing {
        let score = key_similarity(candidate, &project.project_key);
        debug!(
            candidate,
            existing = %project.project_key,
            score,
            "fuzzy key comparison"
        );
        if score >= MATCH_THRESHOLD {
            info!(
                canonical = %project.project_key,
                score,
                "matched existing project"
            );
            return Ok(Resolution::Matched {
                canonical_key: project.project_key.clone(),
            });
        }
    }

    info!(key = %identity.project_key, id = %identity.project_id, "new project");
    Ok(Resolution::New {
        project_key: identity.project_key.clone(),
        project_id: identity.project_id.clone(),
    })
}
