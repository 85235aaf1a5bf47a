//! Executive project-summary stage adapter.
//!
//! Unlike the other adapters this one consumes the full project aggregate
//! (all persisted meetings and participant analyses) and returns free-form
//! structured text, not JSON. The only parsing contract is a non-empty
//! response.

use std::sync::Arc;

use anyhow::{Context, Result};
use om_core::{IngestError, ProjectAggregate};
use tracing::debug;

use crate::CompletionClient;

const SYSTEM_PROMPT: &str = "\
You are an executive-level project analysis agent.

Your goal: produce a CEO-ready project summary focused on ACHIEVEMENTS,
ROADBLOCKS, RISKS, and OVERALL MOMENTUM. You receive the full project data
(meeting summaries plus per-participant analyses) as JSON. Use ONLY this
data; never invent information.

OUTPUT FORMAT (follow exactly):

Project Name: <project name>

Participants:
<name1>, <name2>, <name3>

Summary:

Meeting 1: <Meeting Name>   <Meeting Date & Time>
Achievements:
* achievement 1
Roadblocks:
* blocker 1
Key Notes:
* 2-3 crisp bullets summarizing the meeting

(continue for all meetings)

Overall Progress (CEO Focused):
* 3-5 bullets highlighting major achievements
* 2-3 bullets summarizing key blockers or risks
* an overall momentum statement grounded in the data

RULES:
1. Achievements = measurable progress, decisions, completed tasks.
2. Roadblocks = blockers, dependencies, delays, unresolved items.
3. Derive both from the meeting summaries and the participant analyses.
4. Be concise, factual, and executive-ready.
5. No JSON. Output clean formatted text.";

/// Produces the project-level executive narrative.
pub struct ProjectSummaryAgent {
    client: Arc<dyn CompletionClient>,
}

impl ProjectSummaryAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn generate(&self, project: &ProjectAggregate) -> Result<String> {
        let context = serde_json::to_string_pretty(project)
            .context("failed to serialize project aggregate")?;

        let output = self.client.complete(SYSTEM_PROMPT, &context).await?;
        let narrative = output.trim().to_string();
        if narrative.is_empty() {
            return Err(IngestError::ParseError {
                stage: "global-summarize".into(),
                detail: "model returned an empty narrative".into(),
            }
            .into());
        }

        debug!(chars = narrative.len(), "executive narrative generated");
        Ok(narrative)
    }
}
