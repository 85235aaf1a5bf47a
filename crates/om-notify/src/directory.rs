//! CSV recipient directory and role classification.

use std::path::Path;

use anyhow::Result;
use om_core::IngestError;
use serde::Deserialize;
use tracing::debug;

/// One row of the recipient directory. `role` is normalized (lowercased,
/// trimmed) at load time so classification is a plain equality check.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: String,
}

/// Closed-set routing decision for a recipient role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleClass {
    Executive,
    Standard,
}

impl RoleClass {
    /// Classify a role against the executive vocabulary. The vocabulary is
    /// matched case-insensitively on the whole role string.
    pub fn classify(role: &str, executive_roles: &[String]) -> Self {
        let normalized = role.trim().to_lowercase();
        if executive_roles
            .iter()
            .any(|r| r.trim().to_lowercase() == normalized)
        {
            Self::Executive
        } else {
            Self::Standard
        }
    }
}

/// Load the recipient directory from CSV with headers
/// `name,email,role,department`.
pub fn load_recipients(path: &Path) -> Result<Vec<Recipient>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| IngestError::RecipientDirectory {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let mut recipients = Vec::new();
    for row in reader.deserialize() {
        let mut recipient: Recipient = row.map_err(|e| IngestError::RecipientDirectory {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        recipient.role = recipient.role.trim().to_lowercase();
        recipients.push(recipient);
    }

    debug!(count = recipients.len(), path = %path.display(), "recipient directory loaded");
    Ok(recipients)
}
