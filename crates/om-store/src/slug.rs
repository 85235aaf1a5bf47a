//! Filesystem-safe document names derived from project keys.

/// Lowercase the key, map every non-alphanumeric run to a single dash, and
/// trim dashes. Keys differing only in case or punctuation share a slug,
/// which is consistent with the fuzzy identity model upstream.
pub fn slugify_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut last_dash = false;

    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basic() {
        assert_eq!(
            slugify_key("Project Phoenix - Lisa Chen, Raj Patel"),
            "project-phoenix-lisa-chen-raj-patel"
        );
    }

    #[test]
    fn test_slug_collapses_runs_and_trims() {
        assert_eq!(slugify_key("  --Weekly  Sync!!  "), "weekly-sync");
    }

    #[test]
    fn test_slug_empty_input() {
        assert_eq!(slugify_key("!!!"), "unnamed");
    }

    #[test]
    fn test_slug_case_insensitive() {
        assert_eq!(slugify_key("ALPHA beta"), slugify_key("alpha BETA"));
    }
}
