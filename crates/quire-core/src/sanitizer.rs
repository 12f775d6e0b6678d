//! Post content sanitization.
//!
//! Post bodies arrive as HTML from a rich-text editor. Before storage they
//! pass through a [`ContentSanitizer`], which keeps formatting markup and
//! removes anything executable:
//! - `<script>`, `<style>`, `<iframe>`, `<object>` and `<embed>` with their content
//! - tags outside the formatting allowlist (their text is kept)
//! - event handler attributes (onclick, onerror, etc.)
//! - `javascript:` and other script-capable URLs

use regex::Regex;
use thiserror::Error;

/// Sanitizer error types.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// A sanitizer pattern failed to build
    #[error("Sanitizer pattern error: {0}")]
    Pattern(String),

    /// The input could not be sanitized
    #[error("Content rejected: {0}")]
    Rejected(String),
}

/// Turns untrusted HTML into HTML that is safe to render.
pub trait ContentSanitizer: Send + Sync {
    /// Sanitize raw content.
    fn sanitize(&self, raw: &str) -> Result<String, SanitizeError>;
}

/// Elements removed together with everything between their tags.
const DANGEROUS_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];

/// Formatting elements that survive sanitization.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "del", "div", "em", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr", "i", "img", "ins", "li", "mark", "ol", "p", "pre", "s", "span", "strike",
    "strong", "sub", "sup", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

/// Elements written without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// URL schemes that can run script.
const BLOCKED_URL_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:text/html"];

/// Allowlist-based HTML sanitizer.
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer;

impl HtmlSanitizer {
    /// Create a sanitizer with the default allowlist.
    pub fn new() -> Self {
        Self
    }

    fn allowed_attribute(tag: &str, attr: &str) -> bool {
        match attr {
            "class" | "title" => true,
            "href" | "target" | "rel" => tag == "a",
            "src" | "alt" | "width" | "height" => tag == "img",
            "colspan" | "rowspan" => tag == "td" || tag == "th",
            _ => false,
        }
    }

    fn is_url_attribute(attr: &str) -> bool {
        attr == "href" || attr == "src"
    }

    fn blocked_url(value: &str) -> bool {
        // Browsers ignore whitespace and control characters inside schemes
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_lowercase();
        BLOCKED_URL_SCHEMES
            .iter()
            .any(|scheme| compact.starts_with(scheme))
    }

    fn rebuild_tag(
        attr_pattern: &Regex,
        entity_pattern: &Regex,
        closing: bool,
        name: &str,
        attrs: &str,
    ) -> String {
        if closing {
            return if VOID_TAGS.contains(&name) {
                String::new()
            } else {
                format!("</{name}>")
            };
        }

        let mut tag = format!("<{name}");
        for cap in attr_pattern.captures_iter(attrs) {
            let attr = cap[1].to_lowercase();
            if attr.starts_with("on") || !Self::allowed_attribute(name, &attr) {
                continue;
            }
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| m.as_str())
                .unwrap_or("");
            // Browsers decode references before reading the scheme
            let value = decode_entities(entity_pattern, value);
            if Self::is_url_attribute(&attr) && Self::blocked_url(&value) {
                continue;
            }
            tag.push_str(&format!(" {}=\"{}\"", attr, escape_attribute(&value)));
        }
        tag.push('>');
        tag
    }
}

impl ContentSanitizer for HtmlSanitizer {
    fn sanitize(&self, raw: &str) -> Result<String, SanitizeError> {
        let pattern_error = |e: regex::Error| SanitizeError::Pattern(e.to_string());
        let mut result = raw.to_string();

        // Comments can hide markup from the tag pass
        let comments = Regex::new(r"(?s)<!--.*?-->").map_err(pattern_error)?;
        result = comments.replace_all(&result, "").into_owned();

        for element in DANGEROUS_ELEMENTS {
            let with_content =
                Regex::new(&format!(r"(?is)<{element}\b[^>]*>.*?</{element}\s*>"))
                    .map_err(pattern_error)?;
            result = with_content.replace_all(&result, "").into_owned();

            // Unclosed or void occurrences: drop the tag itself
            let bare = Regex::new(&format!(r"(?i)</?{element}\b[^>]*>")).map_err(pattern_error)?;
            result = bare.replace_all(&result, "").into_owned();
        }

        let tag_pattern =
            Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^<>]*)>").map_err(pattern_error)?;
        let attr_pattern = Regex::new(
            r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
        )
        .map_err(pattern_error)?;
        let entity_pattern =
            Regex::new(r"&(?:#[xX]([0-9a-fA-F]+);?|#([0-9]+);?|([a-zA-Z][a-zA-Z0-9]*);)")
                .map_err(pattern_error)?;

        let mut output = String::with_capacity(result.len());
        let mut last = 0;
        for cap in tag_pattern.captures_iter(&result) {
            let Some(whole) = cap.get(0) else { continue };
            output.push_str(&escape_text(&result[last..whole.start()]));
            last = whole.end();

            let name = cap[2].to_lowercase();
            if !ALLOWED_TAGS.contains(&name.as_str()) {
                continue;
            }
            let closing = !cap[1].is_empty();
            output.push_str(&Self::rebuild_tag(
                &attr_pattern,
                &entity_pattern,
                closing,
                &name,
                &cap[3],
            ));
        }
        output.push_str(&escape_text(&result[last..]));

        Ok(output)
    }
}

/// Remove every tag, keeping only text. Used when sanitization fails.
///
/// Content of script and style blocks is text from the browser's point of
/// view only once its tags are gone, so it survives here as inert text.
pub fn strip_tags(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            _ => text.push(c),
        }
    }
    escape_text(&text)
}

fn escape_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Decode numeric and common named character references. Unknown names
/// are left as written.
fn decode_entities(pattern: &Regex, value: &str) -> String {
    pattern
        .replace_all(value, |cap: &regex::Captures<'_>| {
            let code = match (cap.get(1), cap.get(2), cap.get(3)) {
                (Some(hex), _, _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (_, Some(dec), _) => dec.as_str().parse::<u32>().ok(),
                (_, _, Some(name)) => match named_entity(name.as_str()) {
                    Some(c) => return c.to_string(),
                    None => return cap[0].to_string(),
                },
                _ => None,
            };
            code.and_then(char::from_u32)
                .filter(|c| *c != '\0')
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string()
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name.to_ascii_lowercase().as_str() {
        "colon" => ':',
        "tab" => '\t',
        "newline" => '\n',
        "sol" => '/',
        "lpar" => '(',
        "rpar" => ')',
        "period" => '.',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => return None,
    };
    Some(c)
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        HtmlSanitizer::new().sanitize(raw).unwrap()
    }

    #[test]
    fn test_keeps_formatting() {
        assert_eq!(
            clean("<p>Hello <strong>world</strong><br></p>"),
            "<p>Hello <strong>world</strong><br></p>"
        );
    }

    #[test]
    fn test_drops_script_with_content() {
        assert_eq!(clean("<p>a</p><script>alert(1)</script><p>b</p>"), "<p>a</p><p>b</p>");
        assert_eq!(clean("<STYLE>p{}</STYLE>ok"), "ok");
        assert_eq!(clean("x<iframe src=\"//evil\"></iframe>y"), "xy");
        assert_eq!(clean("x<embed src=\"a.swf\">y"), "xy");
    }

    #[test]
    fn test_drops_event_handlers() {
        assert_eq!(
            clean("<img src=\"a.png\" onerror=\"alert(1)\" alt='pic'>"),
            "<img src=\"a.png\" alt=\"pic\">"
        );
        assert_eq!(clean("<p onclick=go()>x</p>"), "<p>x</p>");
    }

    #[test]
    fn test_drops_javascript_urls() {
        assert_eq!(clean("<a href=\"javascript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(clean("<a href=\" JaVa\tScRiPt:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(
            clean("<a href=\"https://example.com\">x</a>"),
            "<a href=\"https://example.com\">x</a>"
        );
    }

    #[test]
    fn test_drops_entity_encoded_javascript_urls() {
        assert_eq!(clean("<a href=\"&#106;avascript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(clean("<a href=\"javascript&colon;alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(clean("<a href=\"&#x6A;avascript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(clean("<a href=\"&#106avascript:alert(1)\">x</a>"), "<a>x</a>");
        assert_eq!(clean("<a href=\"java&Tab;script:alert(1)\">x</a>"), "<a>x</a>");
    }

    #[test]
    fn test_attribute_ampersands_are_escaped() {
        assert_eq!(
            clean("<a href=\"https://example.com/?a=1&amp;b=2\">x</a>"),
            "<a href=\"https://example.com/?a=1&amp;b=2\">x</a>"
        );
        assert_eq!(
            clean("<a href=\"https://example.com/?a=1&b=2\">x</a>"),
            "<a href=\"https://example.com/?a=1&amp;b=2\">x</a>"
        );
        // A double-encoded reference stays inert text
        assert_eq!(
            clean("<a href=\"&amp;#106;avascript:x\">x</a>"),
            "<a href=\"&amp;#106;avascript:x\">x</a>"
        );
    }

    #[test]
    fn test_unknown_tags_keep_text() {
        assert_eq!(clean("<form><p>inside</p></form>"), "<p>inside</p>");
    }

    #[test]
    fn test_escapes_stray_brackets() {
        assert_eq!(clean("1 < 2 and 3 > 2"), "1 &lt; 2 and 3 &gt; 2");
        assert_eq!(clean("<3"), "&lt;3");
    }

    #[test]
    fn test_removes_comments() {
        assert_eq!(clean("a<!-- <script>x</script> -->b"), "ab");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>there</b></p>"), "Hello there");
        assert_eq!(strip_tags("<script>alert(1)</script>"), "alert(1)");
    }
}
