//! Per-participant analysis stage adapter.

use std::sync::Arc;

use anyhow::Result;
use om_core::{IngestError, ParticipantAnalysis};
use serde::Deserialize;
use tracing::debug;

use crate::CompletionClient;
use crate::response::strip_code_fences;

const SYSTEM_PROMPT: &str = "\
You are a meeting analysis agent for leadership management.
You take a meeting transcript (any format) as input and produce a structured
per-participant analysis.

For each participant extract:
- Key updates (max 5)
- Roadblocks (max 5)
- Actionable items (max 5)

Return ONLY valid JSON matching this exact schema:

[
  {
    \"participant_name\": \"John Doe\",
    \"key_updates\": [\"u1\", \"u2\"],
    \"roadblocks\": [\"b1\"],
    \"actionable\": [\"a1\", \"a2\"]
  }
]";

/// Wire shape of one participant entry as the model emits it. Fields default
/// to empty so a sparse entry still parses; limits are enforced by
/// [`ParticipantAnalysis::new`], not trusted from the model.
#[derive(Debug, Deserialize)]
struct RawParticipant {
    #[serde(default)]
    participant_name: String,
    #[serde(default)]
    key_updates: Vec<String>,
    #[serde(default)]
    roadblocks: Vec<String>,
    #[serde(default)]
    actionable: Vec<String>,
}

/// Produces one [`ParticipantAnalysis`] per participant.
pub struct ParticipantAnalyst {
    client: Arc<dyn CompletionClient>,
}

impl ParticipantAnalyst {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn analyze(&self, transcript: &str) -> Result<Vec<ParticipantAnalysis>> {
        let output = self.client.complete(SYSTEM_PROMPT, transcript).await?;
        let body = strip_code_fences(&output);

        let raw: Vec<RawParticipant> = serde_json::from_str(body).map_err(|e| {
            IngestError::ParseError {
                stage: "analyze-participants".into(),
                detail: format!("expected JSON array of participant objects: {e}"),
            }
        })?;

        let analyses = raw
            .into_iter()
            .map(|p| {
                ParticipantAnalysis::new(p.participant_name, p.key_updates, p.roadblocks, p.actionable)
            })
            .collect::<Vec<_>>();

        debug!(count = analyses.len(), "participant analysis generated");
        Ok(analyses)
    }
}
