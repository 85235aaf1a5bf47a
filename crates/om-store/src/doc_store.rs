//! File-backed JSON document store.
//!
//! Layout: `<base>/<collection>/<slug>.json`, one document per project.
//! Collections mirror the analysis outputs: `meeting_summary`,
//! `participants_analysis`, and `transcripts` (the raw archive).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use om_core::{
    IngestError, MeetingSummaryRecord, ParticipantMeetingEntry, ProjectAggregate, ProjectRef,
    TranscriptMeetingEntry,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{ProjectStore, slugify_key};

const MEETING_SUMMARY: &str = "meeting_summary";
const PARTICIPANTS_ANALYSIS: &str = "participants_analysis";
const TRANSCRIPTS: &str = "transcripts";

/// One project's document within a collection. Identity fields are written
/// once on insert; `meetings` only grows.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ProjectDoc<T> {
    project_key: String,
    project_id: String,
    project_name: String,
    meetings: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct JsonDocStore {
    base_dir: PathBuf,
}

impl JsonDocStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn doc_path(&self, collection: &str, project_key: &str) -> PathBuf {
        self.base_dir
            .join(collection)
            .join(format!("{}.json", slugify_key(project_key)))
    }

    fn load_doc<T: DeserializeOwned>(
        &self,
        collection: &str,
        project_key: &str,
    ) -> Result<Option<ProjectDoc<T>>> {
        let path = self.doc_path(collection, project_key);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let doc = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt document: {}", path.display()))?;
        Ok(Some(doc))
    }

    /// Atomic write: serialize to a sibling tmp file, then rename over the
    /// destination so readers never observe a torn document.
    fn write_doc<T: Serialize>(
        &self,
        collection: &str,
        project_key: &str,
        doc: &ProjectDoc<T>,
    ) -> Result<()> {
        let path = self.doc_path(collection, project_key);
        let dir = path
            .parent()
            .context("document path has no parent directory")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create collection dir: {}", dir.display()))?;

        let tmp_path = path.with_extension("json.tmp");
        let serialized =
            serde_json::to_string_pretty(doc).context("failed to serialize document")?;
        fs::write(&tmp_path, serialized)
            .with_context(|| format!("failed to write temp document: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path).with_context(|| {
            format!("failed to atomically replace document: {}", path.display())
        })?;

        debug!(path = %path.display(), "document written");
        Ok(())
    }

    /// Read-modify-write upsert: create the document with its identity
    /// fields on first insert, then append the meeting entry. Appends are
    /// never content-deduplicated.
    fn upsert_entry<T: Serialize + DeserializeOwned>(
        &self,
        collection: &str,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        entry: T,
    ) -> Result<()> {
        let mut doc = match self.load_doc::<T>(collection, project_key)? {
            Some(doc) => doc,
            None => {
                info!(collection, key = project_key, "creating project document");
                ProjectDoc {
                    project_key: project_key.to_string(),
                    project_id: project_id.to_string(),
                    project_name: project_name.to_string(),
                    meetings: Vec::new(),
                }
            }
        };

        doc.meetings.push(entry);
        self.write_doc(collection, project_key, &doc)
    }

    fn scan_collection(&self, collection: &str, refs: &mut BTreeMap<String, String>) -> Result<()> {
        let dir = self.base_dir.join(collection);
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed to list collection: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read document: {}", path.display()))?;
            // Only the identity header matters here; the meetings payload
            // differs per collection.
            let head: ProjectRef = serde_json::from_str(&raw)
                .with_context(|| format!("corrupt document: {}", path.display()))?;
            refs.entry(head.project_key.clone())
                .or_insert(head.project_id);
        }
        Ok(())
    }
}

fn persistence_err(e: anyhow::Error) -> anyhow::Error {
    IngestError::PersistenceFailure(format!("{e:#}")).into()
}

#[async_trait]
impl ProjectStore for JsonDocStore {
    async fn upsert_meeting_summary(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        record: MeetingSummaryRecord,
    ) -> Result<()> {
        self.upsert_entry(MEETING_SUMMARY, project_key, project_id, project_name, record)
            .map_err(persistence_err)
    }

    async fn upsert_participant_summary(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        entry: ParticipantMeetingEntry,
    ) -> Result<()> {
        self.upsert_entry(
            PARTICIPANTS_ANALYSIS,
            project_key,
            project_id,
            project_name,
            entry,
        )
        .map_err(persistence_err)
    }

    async fn upsert_transcript(
        &self,
        project_key: &str,
        project_id: &str,
        project_name: &str,
        entry: TranscriptMeetingEntry,
    ) -> Result<()> {
        self.upsert_entry(TRANSCRIPTS, project_key, project_id, project_name, entry)
            .map_err(persistence_err)
    }

    async fn fetch_project(&self, project_key: &str) -> Result<Option<ProjectAggregate>> {
        let Some(meeting_doc) = self
            .load_doc::<MeetingSummaryRecord>(MEETING_SUMMARY, project_key)
            .map_err(persistence_err)?
        else {
            return Ok(None);
        };

        let user_analysis = self
            .load_doc::<ParticipantMeetingEntry>(PARTICIPANTS_ANALYSIS, project_key)
            .map_err(persistence_err)?
            .map(|doc| doc.meetings)
            .unwrap_or_default();

        Ok(Some(ProjectAggregate {
            project_key: meeting_doc.project_key,
            project_id: meeting_doc.project_id,
            project_name: meeting_doc.project_name,
            meetings: meeting_doc.meetings,
            user_analysis,
        }))
    }

    async fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        let mut refs = BTreeMap::new();
        self.scan_collection(TRANSCRIPTS, &mut refs)
            .map_err(persistence_err)?;
        self.scan_collection(MEETING_SUMMARY, &mut refs)
            .map_err(persistence_err)?;

        Ok(refs
            .into_iter()
            .map(|(project_key, project_id)| ProjectRef {
                project_key,
                project_id,
            })
            .collect())
    }
}
