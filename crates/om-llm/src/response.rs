//! Shared handling of model response text.

/// Strip a surrounding markdown code fence, with or without a language tag.
/// Models frequently wrap JSON output in ```json fences despite being told
/// not to; the adapters tolerate it.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line, if any.
    match inner.split_once('\n') {
        Some((_tag, body)) => body.trim(),
        None => inner.trim(),
    }
}
