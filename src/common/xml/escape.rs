use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static MARKUP_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build markup escaper")
});

const MARKUP_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"];

/// Escape the five markup-significant characters for HTML/XML text and attributes.
///
/// # Examples
///
/// ```
/// use rowstream::common::xml::escape_markup;
/// assert_eq!(escape_markup("a & b"), "a &amp; b");
/// assert_eq!(escape_markup("<td>\"x\"</td>"), "&lt;td&gt;&quot;x&quot;&lt;/td&gt;");
/// ```
#[inline]
pub fn escape_markup(s: &str) -> String {
    if !s.bytes().any(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\'')) {
        return s.to_string();
    }
    MARKUP_ESCAPER.replace_all(s, &MARKUP_ENTITIES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text_untouched() {
        assert_eq!(escape_markup("Name"), "Name");
        assert_eq!(escape_markup(""), "");
    }

    #[test]
    fn test_escape_all_entities() {
        assert_eq!(escape_markup("'&'"), "&#39;&amp;&#39;");
        assert_eq!(escape_markup("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
    }
}
