//! ANSI escape sequence removal for captured text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// CSI sequences (colors, cursor movement) and OSC sequences (titles, links)
static ANSI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
        .expect("ANSI pattern is valid")
});

/// Remove ANSI escape sequences. Borrows the input when there is nothing to strip.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_PATTERN.replace_all(text, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_color_codes() {
        let red = "Hello \x1b[31mWorld\x1b[39m!";
        assert_eq!(strip_ansi(red), "Hello World!");
    }

    #[test]
    fn test_strips_bold_and_reset() {
        assert_eq!(strip_ansi("\x1b[1;32mok\x1b[0m"), "ok");
    }

    #[test]
    fn test_strips_hyperlinks() {
        let link = "\x1b]8;;https://example.com\x07link\x1b]8;;\x07";
        assert_eq!(strip_ansi(link), "link");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed("plain")));
    }
}
