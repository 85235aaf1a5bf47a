pub mod error;
pub mod types;

pub use error::IngestError;
pub use types::{
    MeetingSummaryRecord, OutputFormat, ParticipantAnalysis, ParticipantMeetingEntry, ProjectAggregate,
    ProjectRef, TranscriptIdentity, TranscriptMeetingEntry, UserAnalysisRecord,
};
