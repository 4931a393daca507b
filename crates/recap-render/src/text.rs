use std::fmt;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Append one formatted line to a document being built.
pub fn push_line(out: &mut String, args: fmt::Arguments<'_>) {
    out.push_str(&args.to_string());
    out.push('\n');
}

/// Escape `&`, `<`, `>`, `"` and `'` for HTML/XML text and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut `text` to at most `max_width` terminal columns, ending in `…` when
/// anything was removed.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    // Reserve one column for the ellipsis.
    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_push_line_appends_newline() {
        let mut out = String::from("<svg>\n");
        push_line(&mut out, format_args!("<rect width='{}'/>", 12));
        assert_eq!(out, "<svg>\n<rect width='12'/>\n");
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_to_width("gpt-4o", 18), "gpt-4o");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_truncate_counts_wide_characters() {
        // Each CJK character occupies two columns.
        let out = truncate_to_width("日本語のタイトル", 7);
        assert_eq!(out, "日本語…");
        assert!(out.width() <= 7);
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
