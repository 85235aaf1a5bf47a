use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Maximum bullet points kept in a meeting summary.
pub const MAX_SUMMARY_POINTS: usize = 10;
/// Maximum entries kept per participant list field.
pub const MAX_PARTICIPANT_ITEMS: usize = 5;

/// Output format for CLI rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Normalized header record derived from one raw transcript.
///
/// Immutable after extraction. `participants` is deduplicated and sorted so
/// that `project_key` and `project_id` are deterministic regardless of the
/// speaking order in the source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptIdentity {
    pub project_name: String,
    pub meeting_name: String,
    /// Deduplicated, lexicographically sorted.
    pub participants: Vec<String>,
    /// Canonical `YYYY-MM-DD HH:MM:SS`, or empty when absent from the text.
    pub occurred_at: String,
    /// Verbatim duration token such as `51m 18s`, or empty.
    pub duration: String,
    /// Human-readable fuzzy-match candidate; not guaranteed unique.
    pub project_key: String,
    /// 12-hex-char truncated SHA-256 of `project_name|participants`.
    pub project_id: String,
    pub raw_text: String,
}

/// Minimal projection of a stored project, fed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub project_key: String,
    pub project_id: String,
}

/// One meeting's summary contribution to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummaryRecord {
    pub meeting_name: String,
    pub meeting_time: String,
    pub duration: String,
    pub participants: Vec<String>,
    pub summary_points: Vec<String>,
}

impl MeetingSummaryRecord {
    /// Builds a record, truncating `summary_points` to the documented
    /// maximum. Truncation happens here because the model producing the
    /// points cannot be trusted to obey the limit.
    pub fn new(
        meeting_name: impl Into<String>,
        meeting_time: impl Into<String>,
        duration: impl Into<String>,
        participants: Vec<String>,
        mut summary_points: Vec<String>,
    ) -> Self {
        summary_points.truncate(MAX_SUMMARY_POINTS);
        Self {
            meeting_name: meeting_name.into(),
            meeting_time: meeting_time.into(),
            duration: duration.into(),
            participants,
            summary_points,
        }
    }
}

/// Per-participant analysis for one meeting.
///
/// Each list is hard-truncated to five entries at construction; this is a
/// contract, not a display limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAnalysis {
    pub participant_name: String,
    pub key_updates: Vec<String>,
    pub roadblocks: Vec<String>,
    pub actionable: Vec<String>,
}

impl ParticipantAnalysis {
    pub fn new(
        participant_name: impl Into<String>,
        mut key_updates: Vec<String>,
        mut roadblocks: Vec<String>,
        mut actionable: Vec<String>,
    ) -> Self {
        key_updates.truncate(MAX_PARTICIPANT_ITEMS);
        roadblocks.truncate(MAX_PARTICIPANT_ITEMS);
        actionable.truncate(MAX_PARTICIPANT_ITEMS);
        Self {
            participant_name: participant_name.into(),
            key_updates,
            roadblocks,
            actionable,
        }
    }
}

/// One participant analysis bound to its project and meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnalysisRecord {
    pub project_key: String,
    pub project_id: String,
    pub meeting_name: String,
    pub participant_summary: ParticipantAnalysis,
}

/// The persisted per-meeting shape in the participants collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantMeetingEntry {
    pub meeting_name: String,
    pub participant_summaries: Vec<ParticipantAnalysis>,
}

/// Raw-transcript archive entry, appended once per ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMeetingEntry {
    pub meeting_name: String,
    pub meeting_time: String,
    pub duration: String,
    pub participants: Vec<String>,
    pub transcript: String,
}

/// Full project rollup fetched from the store, consumed by the
/// executive-summary stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAggregate {
    pub project_key: String,
    pub project_id: String,
    pub project_name: String,
    pub meetings: Vec<MeetingSummaryRecord>,
    pub user_analysis: Vec<ParticipantMeetingEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item-{i}")).collect()
    }

    #[test]
    fn test_participant_analysis_truncates_to_five_in_order() {
        let analysis = ParticipantAnalysis::new("Lisa Chen", items(8), items(2), items(6));
        assert_eq!(analysis.key_updates.len(), 5);
        assert_eq!(analysis.key_updates, items(5));
        assert_eq!(analysis.roadblocks.len(), 2);
        assert_eq!(analysis.actionable.len(), 5);
    }

    #[test]
    fn test_summary_record_truncates_to_ten() {
        let record = MeetingSummaryRecord::new("Sync", "", "", vec![], items(14));
        assert_eq!(record.summary_points.len(), 10);
        assert_eq!(record.summary_points, items(10));
    }

    #[test]
    fn test_summary_record_keeps_short_lists() {
        let record = MeetingSummaryRecord::new("Sync", "", "", vec![], items(3));
        assert_eq!(record.summary_points, items(3));
    }

    #[test]
    fn test_participant_analysis_serde_round_trip() {
        let analysis = ParticipantAnalysis::new(
            "John Doe",
            vec!["u1".into()],
            vec!["b1".into()],
            vec!["a1".into(), "a2".into()],
        );
        let json = serde_json::to_string(&analysis).unwrap();
        let back: ParticipantAnalysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back, analysis);
    }
}
