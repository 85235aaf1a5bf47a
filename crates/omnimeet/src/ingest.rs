//! The ingest and extract command handlers.
//!
//! Ingest wires the whole chain together: load and clean the transcript,
//! extract its identity, resolve it against known projects, archive the raw
//! transcript under the canonical key, then hand off to the pipeline.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use om_config::Config;
use om_core::{OutputFormat, TranscriptMeetingEntry};
use om_llm::ApiClient;
use om_notify::{NotificationReport, SmtpMailer, load_recipients};
use om_pipeline::{Orchestrator, PipelineInput};
use om_resolve::{Resolution, resolve};
use om_store::{JsonDocStore, ProjectStore};
use serde::Serialize;
use tracing::info;

/// What the caller sees after a successful run.
#[derive(Debug, Serialize)]
struct IngestReport {
    project_key: String,
    project_id: String,
    meeting_name: String,
    resolution: &'static str,
    notification: NotificationReport,
}

pub(crate) async fn handle_ingest(
    project_root: &Path,
    transcript_path: &str,
    recipients_override: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let config = Config::load(project_root)?;

    let raw_text = om_extract::load_transcript(Path::new(transcript_path))?;
    let identity = om_extract::extract(&raw_text);

    let store = Arc::new(JsonDocStore::new(project_root.join(&config.store.base_dir)));

    let existing = store.list_projects().await?;
    let resolution = resolve(&identity, &existing)?;
    let canonical_key = resolution.canonical_key().to_string();
    let resolution_label = match &resolution {
        Resolution::Matched { canonical_key } => {
            info!(canonical = %canonical_key, "appending to existing project");
            "matched"
        }
        Resolution::New { project_key, .. } => {
            info!(key = %project_key, "creating new project");
            "new"
        }
    };

    // Archive the raw transcript before analysis so the project is known
    // even if a later stage aborts.
    store
        .upsert_transcript(
            &canonical_key,
            &identity.project_id,
            &identity.project_name,
            TranscriptMeetingEntry {
                meeting_name: identity.meeting_name.clone(),
                meeting_time: identity.occurred_at.clone(),
                duration: identity.duration.clone(),
                participants: identity.participants.clone(),
                transcript: identity.raw_text.clone(),
            },
        )
        .await?;

    let recipients_path = recipients_override
        .map(str::to_string)
        .unwrap_or_else(|| config.notify.recipients_path.clone());
    let recipients = load_recipients(&project_root.join(&recipients_path))?;

    let api_key = Config::llm_api_key()?;
    let client = Arc::new(ApiClient::new(
        &config.llm.base_url,
        api_key,
        config.llm.models.clone(),
    )?);

    let (smtp_user, smtp_password) = Config::smtp_credentials()?;
    let mailer = Arc::new(SmtpMailer::connect(
        &config.smtp.server,
        config.smtp.port,
        &smtp_user,
        &smtp_password,
    )?);

    let orchestrator = Orchestrator::new(
        client,
        store,
        mailer,
        recipients,
        config.notify.executive_roles.clone(),
    );

    let input = PipelineInput {
        transcript: identity.raw_text.clone(),
        project_key: canonical_key,
        project_id: identity.project_id.clone(),
        project_name: identity.project_name.clone(),
        meeting_name: identity.meeting_name.clone(),
        meeting_time: identity.occurred_at.clone(),
        duration: identity.duration.clone(),
        participants: identity.participants.clone(),
    };

    let state = orchestrator.run(input).await?;

    let report = IngestReport {
        project_key: state.project_key.clone(),
        project_id: state.project_id.clone(),
        meeting_name: state.meeting_name.clone(),
        resolution: resolution_label,
        notification: state.notification.clone().unwrap_or_default(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Ingested '{}' into project '{}' ({})", report.meeting_name, report.project_key, report.resolution);
            println!("  participants notified: {}", report.notification.participants.join(", "));
            println!("  executives notified:   {}", report.notification.executives.join(", "));
            for (email, reason) in &report.notification.failures {
                println!("  FAILED {email}: {reason}");
            }
        }
    }
    Ok(())
}

pub(crate) fn handle_extract(transcript_path: &str, format: OutputFormat) -> Result<()> {
    let raw_text = om_extract::load_transcript(Path::new(transcript_path))?;
    let identity = om_extract::extract(&raw_text);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&identity).context("failed to render identity")?
            );
        }
        OutputFormat::Text => {
            println!("project_name: {}", identity.project_name);
            println!("meeting_name: {}", identity.meeting_name);
            println!("participants: {}", identity.participants.join(", "));
            println!("occurred_at:  {}", identity.occurred_at);
            println!("duration:     {}", identity.duration);
            println!("project_key:  {}", identity.project_key);
            println!("project_id:   {}", identity.project_id);
        }
    }
    Ok(())
}
