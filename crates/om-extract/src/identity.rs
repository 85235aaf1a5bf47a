//! Transcript identity extraction.
//!
//! Pure pattern heuristics over the raw text; never fails. Ambiguous or
//! missing fields default to empty strings so the identity record stays
//! total. Participant sorting is load-bearing: it makes the derived
//! `project_key` and `project_id` independent of speaking order.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use om_core::TranscriptIdentity;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

const RECORDING_MARKER: &str = "-Meeting Recording";

/// Hex length of the truncated content hash. Collision probability is
/// negligible at expected ingestion volumes; the fuzzy project key is the
/// primary identity and this hash is the fallback.
const PROJECT_ID_LEN: usize = 12;

fn header_timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-(\d{8})_(\d{6})").expect("static regex"))
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}m\s?\d{1,2}s)").expect("static regex"))
}

fn participant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Z][a-zA-Z]+\s[A-Z][a-zA-Z]+)\s\d+:\d{2}").expect("static regex")
    })
}

fn datetime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,2}\s[A-Za-z]+\s\d{4}),\s(\d{1,2}:\d{2}[ap]m)\b")
            .expect("static regex")
    })
}

/// Extract a normalized identity record from raw transcript text.
pub fn extract(raw_text: &str) -> TranscriptIdentity {
    let first_line = raw_text.lines().next().unwrap_or("").trim();

    let meeting_name = first_line.replace(RECORDING_MARKER, "").trim().to_string();
    let project_name = header_timestamp_re()
        .replace_all(&meeting_name, "")
        .trim()
        .to_string();

    let duration = duration_re()
        .find(raw_text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let participants = extract_participants(raw_text);
    let occurred_at = extract_occurred_at(raw_text, first_line);

    let project_key = derive_project_key(&project_name, &participants);
    let project_id = derive_project_id(&project_name, &participants);

    debug!(%project_key, %project_id, "extracted transcript identity");

    TranscriptIdentity {
        project_name,
        meeting_name,
        participants,
        occurred_at,
        duration,
        project_key,
        project_id,
        raw_text: raw_text.to_string(),
    }
}

/// Two-token capitalized names immediately followed by a M:SS timestamp.
/// Both tokens must be at least three characters, which filters out speaker
/// labels and single-letter initials. Deduplicated and sorted.
fn extract_participants(text: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for caps in participant_re().captures_iter(text) {
        let name = &caps[1];
        let mut tokens = name.split_whitespace();
        let (Some(first), Some(last)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if first.len() >= 3 && last.len() >= 3 {
            names.insert(format!("{first} {last}"));
        }
    }
    names.into_iter().collect()
}

/// Canonical `YYYY-MM-DD HH:MM:SS`, or empty when nothing parses.
///
/// A `D Month YYYY, H:MMam/pm` stamp in the body wins; otherwise the
/// `-YYYYMMDD_HHMMSS` token embedded in the header line is used.
fn extract_occurred_at(text: &str, first_line: &str) -> String {
    if let Some(caps) = datetime_re().captures(text) {
        let raw = format!("{} {}", &caps[1], &caps[2]);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%d %B %Y %I:%M%p") {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }

    if let Some(caps) = header_timestamp_re().captures(first_line) {
        let raw = format!("{} {}", &caps[1], &caps[2]);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&raw, "%Y%m%d %H%M%S") {
            return dt.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    }

    String::new()
}

/// Human-readable fuzzy-match candidate. Not unique by construction.
pub fn derive_project_key(project_name: &str, participants: &[String]) -> String {
    format!("{} - {}", project_name, participants.join(", "))
}

/// First 12 hex chars of SHA-256 over `project_name|participants`. Stable
/// for identical inputs regardless of original speaking order because the
/// participant list is sorted before hashing.
pub fn derive_project_id(project_name: &str, participants: &[String]) -> String {
    let input = format!("{}|{}", project_name, participants.join(","));
    let digest = Sha256::digest(input.as_bytes());
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    hex[..PROJECT_ID_LEN].to_string()
}
