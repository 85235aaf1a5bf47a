//! Transcript loading and text cleanup.
//!
//! Only plain-text containers are handled here (.txt, .md, .vtt). Rich
//! formats like PDF or DOCX must be converted upstream; the loader rejects
//! them explicitly instead of producing garbage.

use std::path::Path;

use anyhow::{Context, Result};
use om_core::IngestError;
use regex::Regex;
use std::sync::OnceLock;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "vtt"];

/// Read a transcript file and normalize its whitespace.
pub fn load_transcript(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(IngestError::UnsupportedTranscriptFormat(ext).into());
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read transcript: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(clean_text(&text))
}

fn gap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static regex"))
}

fn spacing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t]+").expect("static regex"))
}

/// Strip NUL bytes, collapse runs of blank lines to one, collapse runs of
/// spaces/tabs to a single space, and trim.
pub fn clean_text(text: &str) -> String {
    let text = text.replace('\0', "");
    let text = gap_re().replace_all(&text, "\n\n");
    let text = spacing_re().replace_all(&text, " ");
    text.trim().to_string()
}
