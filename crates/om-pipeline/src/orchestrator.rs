//! Pipeline controller.
//!
//! Runs the fixed stage sequence, threading the immutable state forward.
//! Any stage error aborts the whole run; there is no per-stage retry and no
//! compensating rollback of writes already made (at-least-once semantics:
//! re-ingesting after an abort can duplicate meeting entries and re-send
//! notifications).

use std::sync::Arc;

use anyhow::{Result, anyhow};
use om_core::{
    IngestError, MeetingSummaryRecord, ParticipantMeetingEntry, UserAnalysisRecord,
};
use om_llm::{CompletionClient, MeetingSummaryAgent, ParticipantAnalyst, ProjectSummaryAgent};
use om_notify::{DigestContent, Mailer, Recipient, dispatch};
use om_store::ProjectStore;
use tracing::{info, instrument};

use crate::state::{PipelineInput, PipelineState, Stage};

/// Terminal failure of a run, naming the stage whose transition failed.
#[derive(thiserror::Error, Debug)]
#[error("pipeline aborted at stage '{stage}': {cause:#}")]
pub struct PipelineAbort {
    pub stage: Stage,
    pub cause: anyhow::Error,
}

pub struct Orchestrator {
    summary_agent: MeetingSummaryAgent,
    participant_analyst: ParticipantAnalyst,
    project_agent: ProjectSummaryAgent,
    store: Arc<dyn ProjectStore>,
    mailer: Arc<dyn Mailer>,
    recipients: Vec<Recipient>,
    executive_roles: Vec<String>,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        store: Arc<dyn ProjectStore>,
        mailer: Arc<dyn Mailer>,
        recipients: Vec<Recipient>,
        executive_roles: Vec<String>,
    ) -> Self {
        Self {
            summary_agent: MeetingSummaryAgent::new(client.clone()),
            participant_analyst: ParticipantAnalyst::new(client.clone()),
            project_agent: ProjectSummaryAgent::new(client),
            store,
            mailer,
            recipients,
            executive_roles,
        }
    }

    /// Execute the full stage sequence for one transcript.
    ///
    /// Ordering is load-bearing: the summary upsert happens before the
    /// participant upsert, and the aggregate is fetched only after both
    /// writes complete so the executive narrative reflects the data written
    /// by this very run.
    #[instrument(skip_all, fields(project_key = %input.project_key, meeting = %input.meeting_name))]
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineState, PipelineAbort> {
        let state = PipelineState::start(input);

        let state = abort_at(Stage::Summarized, self.summarize(state).await)?;
        let state = abort_at(Stage::SummaryRecordBuilt, Self::build_summary_record(state))?;
        let state = abort_at(
            Stage::ParticipantAnalyzed,
            self.analyze_participants(state).await,
        )?;
        let state = abort_at(Stage::UserRecordsBuilt, Self::build_user_records(state))?;
        let state = abort_at(Stage::SummaryPersisted, self.persist_summary(state).await)?;
        let state = abort_at(
            Stage::ParticipantsPersisted,
            self.persist_participants(state).await,
        )?;
        let state = abort_at(Stage::AggregateFetched, self.fetch_aggregate(state).await)?;
        let state = abort_at(Stage::GlobalSummarized, self.global_summarize(state).await)?;
        let state = abort_at(Stage::Notified, self.notify(state).await)?;

        info!("pipeline complete");
        Ok(state.complete())
    }

    async fn summarize(&self, state: PipelineState) -> Result<PipelineState> {
        let points = self.summary_agent.generate_summary(&state.transcript).await?;
        Ok(state.with_summary_points(points))
    }

    fn build_summary_record(state: PipelineState) -> Result<PipelineState> {
        let points = require(&state.summary_points, "summary points")?.clone();
        let record = MeetingSummaryRecord::new(
            state.meeting_name.clone(),
            state.meeting_time.clone(),
            state.duration.clone(),
            state.participants.clone(),
            points,
        );
        Ok(state.with_summary_record(record))
    }

    async fn analyze_participants(&self, state: PipelineState) -> Result<PipelineState> {
        let summaries = self.participant_analyst.analyze(&state.transcript).await?;
        Ok(state.with_participant_summaries(summaries))
    }

    fn build_user_records(state: PipelineState) -> Result<PipelineState> {
        let summaries = require(&state.participant_summaries, "participant summaries")?;
        let records = summaries
            .iter()
            .map(|ps| UserAnalysisRecord {
                project_key: state.project_key.clone(),
                project_id: state.project_id.clone(),
                meeting_name: state.meeting_name.clone(),
                participant_summary: ps.clone(),
            })
            .collect();
        Ok(state.with_user_analysis_list(records))
    }

    async fn persist_summary(&self, state: PipelineState) -> Result<PipelineState> {
        let record = require(&state.summary_record, "summary record")?.clone();
        self.store
            .upsert_meeting_summary(
                &state.project_key,
                &state.project_id,
                &state.project_name,
                record,
            )
            .await?;
        Ok(state.summary_persisted())
    }

    async fn persist_participants(&self, state: PipelineState) -> Result<PipelineState> {
        let records = require(&state.user_analysis_list, "user analysis records")?;
        let entry = ParticipantMeetingEntry {
            meeting_name: state.meeting_name.clone(),
            participant_summaries: records
                .iter()
                .map(|r| r.participant_summary.clone())
                .collect(),
        };
        self.store
            .upsert_participant_summary(
                &state.project_key,
                &state.project_id,
                &state.project_name,
                entry,
            )
            .await?;
        Ok(state.participants_persisted())
    }

    async fn fetch_aggregate(&self, state: PipelineState) -> Result<PipelineState> {
        // This run just wrote the project; a missing document here means the
        // store lost the write, not that the project never existed.
        let project = self
            .store
            .fetch_project(&state.project_key)
            .await?
            .ok_or_else(|| {
                anyhow::Error::from(IngestError::PersistenceFailure(format!(
                    "project '{}' missing immediately after write",
                    state.project_key
                )))
            })?;
        Ok(state.with_project_data(project))
    }

    async fn global_summarize(&self, state: PipelineState) -> Result<PipelineState> {
        let project = require(&state.project_data, "project aggregate")?;
        let narrative = self.project_agent.generate(project).await?;
        Ok(state.with_global_summary(narrative))
    }

    async fn notify(&self, state: PipelineState) -> Result<PipelineState> {
        let points = require(&state.summary_points, "summary points")?;
        let records = require(&state.user_analysis_list, "user analysis records")?;
        let narrative = require(&state.global_summary, "global summary")?;

        let content = DigestContent {
            meeting_summary_text: points.join("\n"),
            participant_analysis_text: format_participant_lines(records),
            global_summary_text: narrative.clone(),
        };

        let report = dispatch(
            &state.project_key,
            &content,
            &self.recipients,
            &self.executive_roles,
            self.mailer.as_ref(),
        )
        .await?;
        Ok(state.with_notification(report))
    }
}

fn abort_at(stage: Stage, result: Result<PipelineState>) -> Result<PipelineState, PipelineAbort> {
    result.map_err(|cause| PipelineAbort { stage, cause })
}

fn require<'a, T>(field: &'a Option<T>, what: &str) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| anyhow!("pipeline state missing {what}"))
}

/// One line per participant, matching the digest layout:
/// `Name | Updates: ... Roadblocks: ... Actionable: ...`
fn format_participant_lines(records: &[UserAnalysisRecord]) -> String {
    records
        .iter()
        .map(|r| {
            let ps = &r.participant_summary;
            format!(
                "{} | Updates: {} Roadblocks: {} Actionable: {}",
                ps.participant_name,
                ps.key_updates.join(", "),
                ps.roadblocks.join(", "),
                ps.actionable.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use om_llm::CannedClient;
    use om_notify::RecordingMailer;
    use om_store::JsonDocStore;

    const SUMMARY_JSON: &str = r#"["migration at 80%", "staging access blocked"]"#;
    const PARTICIPANTS_JSON: &str = r#"[
        {"participant_name": "Lisa Chen", "key_updates": ["migration at 80%"],
         "roadblocks": [], "actionable": ["escalate VPN change"]},
        {"participant_name": "Raj Patel", "key_updates": [],
         "roadblocks": ["staging access blocked"], "actionable": []}
    ]"#;
    const NARRATIVE: &str = "Project Name: Phoenix\nOverall momentum is strong.";

    fn input() -> PipelineInput {
        PipelineInput {
            transcript: "Phoenix-Meeting Recording\nLisa Chen 0:05\nhello".into(),
            project_key: "Phoenix - Lisa Chen, Raj Patel".into(),
            project_id: "abc123def456".into(),
            project_name: "Phoenix".into(),
            meeting_name: "Phoenix Kickoff".into(),
            meeting_time: "2025-12-10 15:00:00".into(),
            duration: "51m 18s".into(),
            participants: vec!["Lisa Chen".into(), "Raj Patel".into()],
        }
    }

    fn recipients() -> Vec<Recipient> {
        vec![
            Recipient {
                name: "Dana Fox".into(),
                email: "dana@example.com".into(),
                role: "director".into(),
                department: "Platform".into(),
            },
            Recipient {
                name: "Raj Patel".into(),
                email: "raj@example.com".into(),
                role: "engineer".into(),
                department: "Platform".into(),
            },
        ]
    }

    fn vocab() -> Vec<String> {
        ["manager", "director", "lead"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    struct Harness {
        client: Arc<CannedClient>,
        mailer: Arc<RecordingMailer>,
        store: Arc<JsonDocStore>,
        orchestrator: Orchestrator,
        _dir: tempfile::TempDir,
    }

    fn harness(responses: Vec<&str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(CannedClient::new(responses));
        let store = Arc::new(JsonDocStore::new(dir.path()));
        let mailer = Arc::new(RecordingMailer::new());
        let orchestrator = Orchestrator::new(
            client.clone(),
            store.clone(),
            mailer.clone(),
            recipients(),
            vocab(),
        );
        Harness {
            client,
            mailer,
            store,
            orchestrator,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_full_run_reaches_done() {
        let h = harness(vec![SUMMARY_JSON, PARTICIPANTS_JSON, NARRATIVE]);
        let state = h.orchestrator.run(input()).await.unwrap();

        assert_eq!(state.stage, Stage::Done);
        assert_eq!(state.summary_points.as_ref().unwrap().len(), 2);
        assert_eq!(state.participant_summaries.as_ref().unwrap().len(), 2);
        assert_eq!(state.global_summary.as_deref(), Some(NARRATIVE));
        assert_eq!(h.client.remaining(), 0);

        let report = state.notification.unwrap();
        assert_eq!(report.executives, vec!["dana@example.com"]);
        assert_eq!(report.participants, vec!["raj@example.com"]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_run_persists_both_collections() {
        let h = harness(vec![SUMMARY_JSON, PARTICIPANTS_JSON, NARRATIVE]);
        h.orchestrator.run(input()).await.unwrap();

        let project = h
            .store
            .fetch_project("Phoenix - Lisa Chen, Raj Patel")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(project.project_id, "abc123def456");
        assert_eq!(project.meetings.len(), 1);
        assert_eq!(project.meetings[0].meeting_name, "Phoenix Kickoff");
        assert_eq!(project.user_analysis.len(), 1);
        assert_eq!(project.user_analysis[0].participant_summaries.len(), 2);
    }

    #[tokio::test]
    async fn test_global_summary_sees_just_written_data() {
        let h = harness(vec![SUMMARY_JSON, PARTICIPANTS_JSON, NARRATIVE]);
        h.orchestrator.run(input()).await.unwrap();

        // Third completion call is the executive narrative; its context is
        // the aggregate fetched after both writes, so it must contain the
        // meeting written by this very run.
        let calls = h.client.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].1.contains("Phoenix Kickoff"));
        assert!(calls[2].1.contains("escalate VPN change"));
    }

    #[tokio::test]
    async fn test_bad_summary_json_aborts_at_summarize() {
        let h = harness(vec!["not json at all"]);
        let abort = h.orchestrator.run(input()).await.unwrap_err();
        assert_eq!(abort.stage, Stage::Summarized);
        assert!(abort.to_string().contains("aborted at stage 'summarize'"));
        // Nothing was persisted and nobody was notified.
        assert!(
            h.store
                .fetch_project("Phoenix - Lisa Chen, Raj Patel")
                .await
                .unwrap()
                .is_none()
        );
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_bad_participant_json_aborts_before_any_write() {
        let h = harness(vec![SUMMARY_JSON, "garbage"]);
        let abort = h.orchestrator.run(input()).await.unwrap_err();
        assert_eq!(abort.stage, Stage::ParticipantAnalyzed);
        assert!(
            h.store
                .fetch_project("Phoenix - Lisa Chen, Raj Patel")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_empty_narrative_aborts_after_persistence() {
        let h = harness(vec![SUMMARY_JSON, PARTICIPANTS_JSON, "   "]);
        let abort = h.orchestrator.run(input()).await.unwrap_err();
        assert_eq!(abort.stage, Stage::GlobalSummarized);
        // Writes made before the abort stay: no compensating rollback.
        assert!(
            h.store
                .fetch_project("Phoenix - Lisa Chen, Raj Patel")
                .await
                .unwrap()
                .is_some()
        );
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_partial_notification_failure_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(CannedClient::new(vec![
            SUMMARY_JSON,
            PARTICIPANTS_JSON,
            NARRATIVE,
        ]));
        let store = Arc::new(JsonDocStore::new(dir.path()));
        let mailer = Arc::new(RecordingMailer::failing_for(&["dana@example.com"]));
        let orchestrator = Orchestrator::new(
            client,
            store,
            mailer.clone(),
            recipients(),
            vocab(),
        );

        let state = orchestrator.run(input()).await.unwrap();
        assert_eq!(state.stage, Stage::Done);
        let report = state.notification.unwrap();
        assert!(report.executives.is_empty());
        assert_eq!(report.participants, vec!["raj@example.com"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_appends_duplicate_meeting_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonDocStore::new(dir.path()));
        for _ in 0..2 {
            let client = Arc::new(CannedClient::new(vec![
                SUMMARY_JSON,
                PARTICIPANTS_JSON,
                NARRATIVE,
            ]));
            let orchestrator = Orchestrator::new(
                client,
                store.clone(),
                Arc::new(RecordingMailer::new()),
                recipients(),
                vocab(),
            );
            orchestrator.run(input()).await.unwrap();
        }

        let project = store
            .fetch_project("Phoenix - Lisa Chen, Raj Patel")
            .await
            .unwrap()
            .unwrap();
        // At-least-once: duplicates are appended, not merged.
        assert_eq!(project.meetings.len(), 2);
        assert_eq!(project.user_analysis.len(), 2);
    }

    #[tokio::test]
    async fn test_digest_formatting() {
        let h = harness(vec![SUMMARY_JSON, PARTICIPANTS_JSON, NARRATIVE]);
        h.orchestrator.run(input()).await.unwrap();

        let sent = h.mailer.sent();
        let exec = sent.iter().find(|m| m.to == "dana@example.com").unwrap();
        assert_eq!(
            exec.subject,
            "[Phoenix - Lisa Chen, Raj Patel] Executive Project Summary"
        );
        assert!(exec.html.contains("Overall momentum is strong."));

        let standard = sent.iter().find(|m| m.to == "raj@example.com").unwrap();
        assert!(standard.html.contains("migration at 80%<br>staging access blocked"));
        assert!(standard.html.contains(
            "Lisa Chen | Updates: migration at 80% Roadblocks:  Actionable: escalate VPN change"
        ));
    }
}
