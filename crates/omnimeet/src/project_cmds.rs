//! Read-only project inspection commands.

use std::path::Path;

use anyhow::Result;
use om_config::Config;
use om_core::OutputFormat;
use om_store::{JsonDocStore, ProjectStore};

pub(crate) async fn handle_show(project_root: &Path, key: &str, format: OutputFormat) -> Result<()> {
    let config = Config::load(project_root)?;
    let store = JsonDocStore::new(project_root.join(&config.store.base_dir));

    let Some(project) = store.fetch_project(key).await? else {
        anyhow::bail!("no project found for key '{key}'");
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&project)?),
        OutputFormat::Text => {
            println!("{} ({})", project.project_name, project.project_id);
            println!("key: {}", project.project_key);
            println!("meetings: {}", project.meetings.len());
            for meeting in &project.meetings {
                println!("  - {} {} [{}]", meeting.meeting_name, meeting.meeting_time, meeting.duration);
                for point in &meeting.summary_points {
                    println!("      * {point}");
                }
            }
            for entry in &project.user_analysis {
                println!("  analysis for {}:", entry.meeting_name);
                for ps in &entry.participant_summaries {
                    println!(
                        "      {} | updates {} | roadblocks {} | actionable {}",
                        ps.participant_name,
                        ps.key_updates.len(),
                        ps.roadblocks.len(),
                        ps.actionable.len()
                    );
                }
            }
        }
    }
    Ok(())
}

pub(crate) async fn handle_list(project_root: &Path, format: OutputFormat) -> Result<()> {
    let config = Config::load(project_root)?;
    let store = JsonDocStore::new(project_root.join(&config.store.base_dir));
    let refs = store.list_projects().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&refs)?),
        OutputFormat::Text => {
            if refs.is_empty() {
                println!("no projects stored");
            }
            for r in &refs {
                println!("{}  {}", r.project_id, r.project_key);
            }
        }
    }
    Ok(())
}
