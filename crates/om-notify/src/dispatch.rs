//! Role-routed fan-out of the analysis digests.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Mailer, Recipient, RoleClass, combined_html, to_html};

/// The three text blocks produced by a pipeline run.
#[derive(Debug, Clone)]
pub struct DigestContent {
    pub meeting_summary_text: String,
    pub participant_analysis_text: String,
    pub global_summary_text: String,
}

/// Outcome of one fan-out: who got what, and which sends failed.
/// A partial failure does not abort the batch; the run still counts as
/// notified with this report attached.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationReport {
    pub participants: Vec<String>,
    pub executives: Vec<String>,
    /// `(email, reason)` for each failed send.
    pub failures: Vec<(String, String)>,
}

/// Send role-routed digests to every recipient through one mailer session.
/// Executives get the global narrative only; everyone else gets the combined
/// meeting + participant digest. A failing recipient is recorded and skipped.
pub async fn dispatch(
    project_key: &str,
    content: &DigestContent,
    recipients: &[Recipient],
    executive_roles: &[String],
    mailer: &dyn Mailer,
) -> Result<NotificationReport> {
    let global_html = to_html(&content.global_summary_text);
    let combined = combined_html(
        &content.meeting_summary_text,
        &content.participant_analysis_text,
    );

    let mut report = NotificationReport::default();

    for recipient in recipients {
        let (subject, html, bucket) =
            match RoleClass::classify(&recipient.role, executive_roles) {
                RoleClass::Executive => (
                    format!("[{project_key}] Executive Project Summary"),
                    &global_html,
                    &mut report.executives,
                ),
                RoleClass::Standard => (
                    format!("[{project_key}] Meeting Update"),
                    &combined,
                    &mut report.participants,
                ),
            };

        match mailer.send(&recipient.email, &subject, html).await {
            Ok(()) => {
                info!(to = %recipient.email, %subject, "notification sent");
                bucket.push(recipient.email.clone());
            }
            Err(e) => {
                warn!(to = %recipient.email, error = %e, "notification send failed");
                report
                    .failures
                    .push((recipient.email.clone(), format!("{e:#}")));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingMailer;

    fn recipient(name: &str, email: &str, role: &str) -> Recipient {
        Recipient {
            name: name.into(),
            email: email.into(),
            role: role.to_lowercase(),
            department: "Platform".into(),
        }
    }

    fn content() -> DigestContent {
        DigestContent {
            meeting_summary_text: "point one\npoint two".into(),
            participant_analysis_text: "Lisa Chen | Updates: u1".into(),
            global_summary_text: "Project Name: Phoenix\nmomentum strong".into(),
        }
    }

    fn vocab() -> Vec<String> {
        ["manager", "director", "lead"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_routes_by_role() {
        let mailer = RecordingMailer::new();
        let recipients = vec![
            recipient("Dana Fox", "dana@example.com", "Director"),
            recipient("Raj Patel", "raj@example.com", "Engineer"),
        ];

        let report = dispatch("Phoenix", &content(), &recipients, &vocab(), &mailer)
            .await
            .unwrap();

        assert_eq!(report.executives, vec!["dana@example.com"]);
        assert_eq!(report.participants, vec!["raj@example.com"]);
        assert!(report.failures.is_empty());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "[Phoenix] Executive Project Summary");
        assert!(sent[0].html.contains("momentum strong"));
        assert!(!sent[0].html.contains("Meeting Summary"));
        assert_eq!(sent[1].subject, "[Phoenix] Meeting Update");
        assert!(sent[1].html.contains("<h2>Meeting Summary</h2>"));
        assert!(sent[1].html.contains("point one<br>point two"));
    }

    #[tokio::test]
    async fn test_partial_failure_continues_batch() {
        let mailer = RecordingMailer::failing_for(&["dana@example.com"]);
        let recipients = vec![
            recipient("Dana Fox", "dana@example.com", "Director"),
            recipient("Raj Patel", "raj@example.com", "Engineer"),
        ];

        let report = dispatch("Phoenix", &content(), &recipients, &vocab(), &mailer)
            .await
            .unwrap();

        assert!(report.executives.is_empty());
        assert_eq!(report.participants, vec!["raj@example.com"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "dana@example.com");
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_directory_sends_nothing() {
        let mailer = RecordingMailer::new();
        let report = dispatch("Phoenix", &content(), &[], &vocab(), &mailer)
            .await
            .unwrap();
        assert!(report.participants.is_empty());
        assert!(report.executives.is_empty());
        assert!(mailer.sent().is_empty());
    }
}
