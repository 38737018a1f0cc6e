use regex::Regex;
use std::sync::LazyLock;

// A `<` swallows everything up to the next `>`, or to the end of input when
// the tag is never closed.
static MARKUP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>?").ok());

/// Strips markup-like substrings and surrounding whitespace.
pub fn sanitize_input(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match MARKUP.as_ref() {
        Some(markup) => markup.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_trims() {
        assert_eq!(sanitize_input("<b>Bot</b>"), "Bot");
        assert_eq!(sanitize_input("  Sales <i>Bot</i>  "), "Sales Bot");
        assert_eq!(
            sanitize_input("<script>alert(1)</script>Helper"),
            "alert(1)Helper"
        );
    }

    #[test]
    fn unterminated_tag_runs_to_end() {
        assert_eq!(sanitize_input("Bot <img src=x"), "Bot");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(sanitize_input("Soporte Técnico"), "Soporte Técnico");
        assert_eq!(sanitize_input(""), "");
        assert_eq!(sanitize_input("   "), "");
    }
}
