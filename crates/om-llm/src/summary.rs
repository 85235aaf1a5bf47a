//! Meeting-summary stage adapter.

use std::sync::Arc;

use anyhow::Result;
use om_core::{IngestError, types::MAX_SUMMARY_POINTS};
use tracing::debug;

use crate::CompletionClient;
use crate::response::strip_code_fences;

const SYSTEM_PROMPT: &str = "\
You are a meeting analysis agent for leadership management.

Read the meeting transcript exactly as given and produce a concise factual
summary.

GUIDELINES:
1. Base every summary point only on information that explicitly appears in
   the transcript.
2. When something is unclear or incomplete in the transcript, describe it as
   unclear.
3. Keep all points factual, concise, and directly taken from what
   participants said.
4. Preserve meaning without adding interpretations, assumptions, or
   conclusions.
5. Avoid combining unrelated points unless the transcript clearly connects
   them.

OUTPUT FORMAT:
Return ONLY a valid JSON list of 8-10 bullet points (strings), for example:

[
  \"Speaker A shared progress on the project timeline\",
  \"Speaker B mentioned a blocker related to staging access\"
]

If the transcript includes fewer than 8 meaningful points, return only the
available points. If it includes more than 10, select the most important
ones.";

/// Produces the per-meeting bullet-point summary.
pub struct MeetingSummaryAgent {
    client: Arc<dyn CompletionClient>,
}

impl MeetingSummaryAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Summarize one transcript into at most ten bullet points.
    ///
    /// The model cannot be trusted to obey the limit, so truncation happens
    /// here. Non-JSON output fails the stage; there is no partial record.
    pub async fn generate_summary(&self, transcript: &str) -> Result<Vec<String>> {
        let output = self.client.complete(SYSTEM_PROMPT, transcript).await?;
        let body = strip_code_fences(&output);

        let mut points: Vec<String> = serde_json::from_str(body).map_err(|e| {
            IngestError::ParseError {
                stage: "summarize".into(),
                detail: format!("expected JSON array of strings: {e}"),
            }
        })?;

        points.truncate(MAX_SUMMARY_POINTS);
        debug!(count = points.len(), "meeting summary generated");
        Ok(points)
    }
}
