//! Plain-text to HTML wrapping for e-mail bodies.

/// Wrap plain text in a simple styled div, converting newlines to breaks.
pub fn to_html(text: &str) -> String {
    format!(
        "<div style='font-family:Arial;font-size:14px;'>{}</div>",
        text.replace('\n', "<br>")
    )
}

/// Combined digest for non-executive recipients: meeting summary followed by
/// the participant analysis, separated by a rule.
pub fn combined_html(meeting_text: &str, participant_text: &str) -> String {
    format!(
        "<html><body>\n\
         <h2>Meeting Summary</h2>\n{}\n<hr>\n\
         <h2>Participant Analysis</h2>\n{}\n\
         </body></html>",
        to_html(meeting_text),
        to_html(participant_text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_html_converts_newlines() {
        let html = to_html("line one\nline two");
        assert!(html.contains("line one<br>line two"));
        assert!(html.starts_with("<div"));
    }

    #[test]
    fn test_combined_html_sections() {
        let html = combined_html("points", "analysis");
        assert!(html.contains("<h2>Meeting Summary</h2>"));
        assert!(html.contains("<h2>Participant Analysis</h2>"));
        assert!(html.contains("<hr>"));
    }
}
