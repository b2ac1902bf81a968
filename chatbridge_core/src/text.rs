//! Text preparation for speech synthesis.

/// Strip markdown-ish formatting before the text is spoken.
///
/// Removes every `_`, then every `*`, then turns each newline into a single
/// space. No other whitespace is touched.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.replace('_', "").replace('*', "").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_underscores_and_asterisks() {
        assert_eq!(clean_text("*Hello* _world_"), "Hello world");
    }

    #[test]
    fn newline_becomes_single_space() {
        assert_eq!(clean_text("line one\nline two"), "line one line two");
        assert_eq!(clean_text("a\n\nb"), "a  b");
    }

    #[test]
    fn other_whitespace_is_kept() {
        assert_eq!(clean_text("  tabs\there  "), "  tabs\there  ");
    }

    #[test]
    fn idempotent() {
        for input in ["", "plain", "_a_*b*\nc", "**\n__\n", "snake_case\r\nline"] {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {input:?}");
        }
    }
}
