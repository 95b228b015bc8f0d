//! Best-effort repair of malformed XMLTV feeds
//!
//! Providers regularly ship feeds with raw control characters in titles and
//! unescaped ampersands in descriptions. These helpers fix the two defects
//! that break a strict parser, plus a wrapper for feeds that lack a single
//! document root.

use regex::Regex;
use std::sync::OnceLock;

/// Entity forms that a bare `&` may legitimately start
fn entity_reference() -> &'static Regex {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    ENTITY.get_or_init(|| {
        Regex::new(r"^(?:amp|lt|gt|apos|quot|#[0-9]+|#x[0-9a-fA-F]+);")
            .expect("entity reference pattern is valid")
    })
}

/// Leading XML declaration and DOCTYPE, which cannot appear inside a wrapper
fn prolog() -> &'static Regex {
    static PROLOG: OnceLock<Regex> = OnceLock::new();
    PROLOG.get_or_init(|| {
        Regex::new(r"^\s*(?:<\?xml[^>]*\?>\s*)?(?:<!DOCTYPE[^>]*>\s*)?")
            .expect("prolog pattern is valid")
    })
}

/// Whether a character is allowed by the XML 1.0 `Char` production
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Remove characters that XML 1.0 does not allow anywhere in a document
pub fn strip_invalid_xml_chars(input: &str) -> String {
    input.chars().filter(|c| is_xml_char(*c)).collect()
}

/// Escape every `&` that does not start a predefined entity or a character
/// reference
pub fn escape_bare_ampersands(input: &str) -> String {
    let pattern = entity_reference();
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(index) = rest.find('&') {
        output.push_str(&rest[..index]);
        let after = &rest[index + 1..];
        if pattern.is_match(after) {
            output.push('&');
        } else {
            output.push_str("&amp;");
        }
        rest = after;
    }
    output.push_str(rest);
    output
}

/// Apply both character-level repairs
pub fn repair_xml(input: &str) -> String {
    escape_bare_ampersands(&strip_invalid_xml_chars(input))
}

/// Wrap content in a synthetic `<tv>` root
///
/// Used as a last resort for feeds that concatenate several documents or
/// omit the root element. The prolog is dropped because it is only valid
/// at the very start of a document.
pub fn wrap_in_root(input: &str) -> String {
    let body = prolog().replace(input, "");
    format!("<tv>{body}</tv>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_bare_ampersands() {
        assert_eq!(
            escape_bare_ampersands("Law & Order &amp; Friends"),
            "Law &amp; Order &amp; Friends"
        );
        assert_eq!(
            escape_bare_ampersands("&lt;&gt;&apos;&quot;&#38;&#x26;"),
            "&lt;&gt;&apos;&quot;&#38;&#x26;"
        );
        assert_eq!(escape_bare_ampersands("&nbsp;"), "&amp;nbsp;");
        assert_eq!(escape_bare_ampersands("trailing &"), "trailing &amp;");
        assert_eq!(escape_bare_ampersands("&#xZZ;"), "&amp;#xZZ;");
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(
            strip_invalid_xml_chars("Fox\u{1} Sports\u{B}\t503\u{FFFE}\n"),
            "Fox Sports\t503\n"
        );
        assert_eq!(strip_invalid_xml_chars("Kayo \u{1F3C9}"), "Kayo \u{1F3C9}");
    }

    #[test]
    fn test_repair_xml() {
        let raw = "<title>Rugby\u{7} & League</title>";
        assert_eq!(repair_xml(raw), "<title>Rugby &amp; League</title>");
    }

    #[test]
    fn test_wrap_in_root_drops_prolog() {
        let raw = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n<channel id=\"a\"/><channel id=\"b\"/>";
        assert_eq!(
            wrap_in_root(raw),
            "<tv><channel id=\"a\"/><channel id=\"b\"/></tv>"
        );
    }
}
