//! Persistence gateway for project documents.
//!
//! The pipeline talks to a narrow upsert/fetch interface; the default
//! backend keeps one JSON document per project per collection on disk,
//! with atomic tmp-file + rename writes. Upserts are set-on-insert for the
//! identity fields and append-only for `meetings` — duplicate meeting
//! entries are an accepted at-least-once cost, never deduplicated by
//! content.

mod doc_store;
mod slug;

pub use doc_store::JsonDocStore;
pub use slug::slugify_key;

use anyhow::Result;
use async_trait::async_trait;
use om_core::{
    MeetingSummaryRecord, ParticipantMeetingEntry, ProjectAggregate, ProjectRef,
    TranscriptMeetingEntry,
};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn upsert_meeting_summary(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        record: MeetingSummaryRecord,
    ) -> Result<()>;

    async fn upsert_participant_summary(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        entry: ParticipantMeetingEntry,
    ) -> Result<()>;

    async fn upsert_transcript(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        entry: TranscriptMeetingEntry,
    ) -> Result<()>;

    /// Combined rollup of meeting summaries and participant analyses.
    /// `None` when no document exists under the key.
    async fn fetch_project(&self, project_key: &str) -> Result<Option<ProjectAggregate>>;

    /// Known projects, in a stable (key-sorted) order, for the resolver.
    async fn list_projects(&self) -> Result<Vec<ProjectRef>>;
}
