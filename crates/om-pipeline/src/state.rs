//! Pipeline state threading.
//!
//! Every stage is a value transformation `PipelineState -> PipelineState`:
//! a stage consumes the previous state and returns a new one with its output
//! attached and the position advanced. Nothing mutates a prior state in
//! place, so any intermediate state can be cloned off, inspected, and
//! replayed, and re-running a stage from a checkpoint is side-effect-free at
//! the state level.

use om_core::{
    MeetingSummaryRecord, ParticipantAnalysis, ProjectAggregate, UserAnalysisRecord,
};
use om_notify::NotificationReport;
use serde::{Deserialize, Serialize};

/// Position of a pipeline run. Advances strictly left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Start,
    Summarized,
    SummaryRecordBuilt,
    ParticipantAnalyzed,
    UserRecordsBuilt,
    SummaryPersisted,
    ParticipantsPersisted,
    AggregateFetched,
    GlobalSummarized,
    Notified,
    Done,
}

impl Stage {
    /// Name of the operation that produces this stage, used in abort
    /// reports so the caller always learns which step failed.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Summarized => "summarize",
            Self::SummaryRecordBuilt => "build-summary-record",
            Self::ParticipantAnalyzed => "analyze-participants",
            Self::UserRecordsBuilt => "build-user-records",
            Self::SummaryPersisted => "persist-summary",
            Self::ParticipantsPersisted => "persist-participants",
            Self::AggregateFetched => "fetch-aggregate",
            Self::GlobalSummarized => "global-summarize",
            Self::Notified => "notify",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation())
    }
}

/// Everything a run starts from. The key/id/name here are the canonical
/// (post-resolution) values, which may differ from the raw extracted ones
/// when the transcript matched an existing project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInput {
    pub transcript: String,
    pub project_key: String,
    pub project_id: String,
    pub project_name: String,
    pub meeting_name: String,
    pub meeting_time: String,
    pub duration: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub stage: Stage,

    pub transcript: String,
    pub project_key: String,
    pub project_id: String,
    pub project_name: String,
    pub meeting_name: String,
    pub meeting_time: String,
    pub duration: String,
    pub participants: Vec<String>,

    pub summary_points: Option<Vec<String>>,
    pub summary_record: Option<MeetingSummaryRecord>,
    pub participant_summaries: Option<Vec<ParticipantAnalysis>>,
    pub user_analysis_list: Option<Vec<UserAnalysisRecord>>,
    pub project_data: Option<ProjectAggregate>,
    pub global_summary: Option<String>,
    pub notification: Option<NotificationReport>,
}

impl PipelineState {
    pub fn start(input: PipelineInput) -> Self {
        Self {
            stage: Stage::Start,
            transcript: input.transcript,
            project_key: input.project_key,
            project_id: input.project_id,
            project_name: input.project_name,
            meeting_name: input.meeting_name,
            meeting_time: input.meeting_time,
            duration: input.duration,
            participants: input.participants,
            summary_points: None,
            summary_record: None,
            participant_summaries: None,
            user_analysis_list: None,
            project_data: None,
            global_summary: None,
            notification: None,
        }
    }

    pub fn with_summary_points(self, points: Vec<String>) -> Self {
        Self {
            stage: Stage::Summarized,
            summary_points: Some(points),
            ..self
        }
    }

    pub fn with_summary_record(self, record: MeetingSummaryRecord) -> Self {
        Self {
            stage: Stage::SummaryRecordBuilt,
            summary_record: Some(record),
            ..self
        }
    }

    pub fn with_participant_summaries(self, summaries: Vec<ParticipantAnalysis>) -> Self {
        Self {
            stage: Stage::ParticipantAnalyzed,
            participant_summaries: Some(summaries),
            ..self
        }
    }

    pub fn with_user_analysis_list(self, records: Vec<UserAnalysisRecord>) -> Self {
        Self {
            stage: Stage::UserRecordsBuilt,
            user_analysis_list: Some(records),
            ..self
        }
    }

    pub fn summary_persisted(self) -> Self {
        Self {
            stage: Stage::SummaryPersisted,
            ..self
        }
    }

    pub fn participants_persisted(self) -> Self {
        Self {
            stage: Stage::ParticipantsPersisted,
            ..self
        }
    }

    pub fn with_project_data(self, project: ProjectAggregate) -> Self {
        Self {
            stage: Stage::AggregateFetched,
            project_data: Some(project),
            ..self
        }
    }

    pub fn with_global_summary(self, narrative: String) -> Self {
        Self {
            stage: Stage::GlobalSummarized,
            global_summary: Some(narrative),
            ..self
        }
    }

    pub fn with_notification(self, report: NotificationReport) -> Self {
        Self {
            stage: Stage::Notified,
            notification: Some(report),
            ..self
        }
    }

    pub fn complete(self) -> Self {
        Self {
            stage: Stage::Done,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PipelineInput {
        PipelineInput {
            transcript: "raw".into(),
            project_key: "Phoenix - Lisa Chen".into(),
            project_id: "abc123def456".into(),
            project_name: "Phoenix".into(),
            meeting_name: "Kickoff".into(),
            meeting_time: "2025-12-10 15:00:00".into(),
            duration: "51m 18s".into(),
            participants: vec!["Lisa Chen".into()],
        }
    }

    #[test]
    fn test_stage_advances_without_touching_prior_state() {
        let start = PipelineState::start(input());
        let checkpoint = start.clone();

        let next = start.with_summary_points(vec!["p".into()]);
        assert_eq!(next.stage, Stage::Summarized);
        assert_eq!(next.summary_points.as_deref(), Some(&["p".to_string()][..]));

        // The checkpoint taken before the transition is untouched.
        assert_eq!(checkpoint.stage, Stage::Start);
        assert!(checkpoint.summary_points.is_none());
    }

    #[test]
    fn test_transitions_preserve_base_fields() {
        let state = PipelineState::start(input())
            .with_summary_points(vec![])
            .with_participant_summaries(vec![])
            .complete();
        assert_eq!(state.stage, Stage::Done);
        assert_eq!(state.project_key, "Phoenix - Lisa Chen");
        assert_eq!(state.meeting_time, "2025-12-10 15:00:00");
    }

    #[test]
    fn test_stage_operation_names() {
        assert_eq!(Stage::Summarized.operation(), "summarize");
        assert_eq!(Stage::AggregateFetched.operation(), "fetch-aggregate");
        assert_eq!(Stage::Notified.to_string(), "notify");
    }
}
