//! Text normalization for field values.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]
//!
//! Field values carry markup that should not take part in a comparison:
//! non-breaking-space entities, cloze deletions and, for reporting pools,
//! HTML tags.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Cloze deletion: `{{c1::answer}}` or `{{c1::answer::hint}}`.
///
/// Group 1 is the answer, group 2 the optional hint.
static CLOZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{c\d+::(.*?)(?:::(.*?))?\}\}").expect("static regex: cloze deletion")
});

static HTML_COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex: html comment"));

static HTML_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style.*?>.*?</style>|<script.*?>.*?</script>")
        .expect("static regex: style and script blocks")
});

static HTML_IMG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]*?src=["']?([^"'>\s]+)["']?[^>]*>"#)
        .expect("static regex: image tag")
});

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("static regex: html tag"));

const NBSP_ENTITY: &str = "&nbsp;";

/// Normalizes a field value for similarity comparison.
///
/// Normalization steps:
/// 1. Replace `&nbsp;` with a plain space
/// 2. Replace each cloze deletion with its answer
/// 3. Convert to lowercase
///
/// # Example
///
/// ```rust
/// use cousins::matching::normalize;
///
/// assert_eq!(normalize("{{c1::Paris::city}} is nice"), "paris is nice");
/// assert_eq!(normalize("New&nbsp;York"), "new york");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let spaced = text.replace(NBSP_ENTITY, " ");
    strip_cloze(&spaced).to_lowercase()
}

/// Replaces every cloze deletion with its answer, leaving other text alone.
///
/// # Example
///
/// ```rust
/// use cousins::matching::strip_cloze;
///
/// assert_eq!(strip_cloze("{{c1::Rome}} and {{c2::Milan::north}}"), "Rome and Milan");
/// assert_eq!(strip_cloze("no markup"), "no markup");
/// ```
#[must_use]
pub fn strip_cloze(text: &str) -> Cow<'_, str> {
    CLOZE_REGEX.replace_all(text, "$1")
}

/// Extracts the distinct cloze answers of a text, in order of appearance.
///
/// # Example
///
/// ```rust
/// use cousins::matching::cloze_answers;
///
/// let answers = cloze_answers("{{c1::Paris::city}} is in {{c2::France}}, {{c3::Paris}}");
/// assert_eq!(answers, vec!["Paris", "France"]);
/// ```
#[must_use]
pub fn cloze_answers(text: &str) -> Vec<&str> {
    let mut answers: Vec<&str> = Vec::new();
    for captures in CLOZE_REGEX.captures_iter(text) {
        if let Some(answer) = captures.get(1).map(|m| m.as_str()) {
            if !answers.contains(&answer) {
                answers.push(answer);
            }
        }
    }
    answers
}

/// Strips HTML from a field value, keeping media file names.
///
/// Removes comments, `<style>`/`<script>` blocks and tags. Image tags are
/// replaced by their source file name so two notes showing the same picture
/// still compare equal. Common entities are decoded.
///
/// # Example
///
/// ```rust
/// use cousins::matching::strip_html;
///
/// assert_eq!(strip_html("<b>Paris</b>&nbsp;&amp; Rome"), "Paris & Rome");
/// assert_eq!(strip_html(r#"<img src="map.png">"#), " map.png ");
/// ```
#[must_use]
pub fn strip_html(text: &str) -> String {
    let text = HTML_COMMENT_REGEX.replace_all(text, "");
    let text = HTML_BLOCK_REGEX.replace_all(&text, "");
    let text = HTML_IMG_REGEX.replace_all(&text, " ${1} ");
    let text = HTML_TAG_REGEX.replace_all(&text, "");
    decode_entities(&text)
}

/// Decodes the handful of entities field editors emit.
fn decode_entities(text: &str) -> String {
    text.replace(NBSP_ENTITY, " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("{{c1::Paris::city}} is nice", "paris is nice" ; "cloze with hint")]
    #[test_case("{{c1::Paris}} is nice", "paris is nice" ; "cloze without hint")]
    #[test_case("{{c12::A}}{{c3::B::b}}", "ab" ; "adjacent clozes")]
    #[test_case("Hello&nbsp;World", "hello world" ; "nbsp entity")]
    #[test_case("{{c1::New&nbsp;York}}", "new york" ; "nbsp inside cloze")]
    #[test_case("{{not a cloze}}", "{{not a cloze}}" ; "braces without marker")]
    #[test_case("", "" ; "empty")]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_normalize_multiline_cloze() {
        assert_eq!(normalize("{{c1::line one\nline two}}"), "line one\nline two");
    }

    #[test]
    fn test_strip_cloze_borrows_when_unchanged() {
        assert!(matches!(strip_cloze("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_cloze_answers_ignore_hints() {
        assert_eq!(cloze_answers("{{c1::hello::greeting}}"), vec!["hello"]);
        assert!(cloze_answers("nothing here").is_empty());
    }

    #[test_case("<div>Paris</div>", "Paris" ; "simple tag")]
    #[test_case("a<br/>b", "ab" ; "self closing")]
    #[test_case("x<!-- hidden -->y", "xy" ; "comment")]
    #[test_case("<style>.c {}</style>text", "text" ; "style block")]
    #[test_case("<script>alert(1)</script>ok", "ok" ; "script block")]
    #[test_case("&lt;tag&gt; &quot;q&quot; &#39;s&#39;", "<tag> \"q\" 's'" ; "entities")]
    #[test_case("&amp;lt;", "&lt;" ; "ampersand decoded last")]
    #[test_case("[sound:word.mp3]", "[sound:word.mp3]" ; "sound reference kept")]
    fn test_strip_html(input: &str, expected: &str) {
        assert_eq!(strip_html(input), expected);
    }

    #[test]
    fn test_strip_html_keeps_image_names() {
        assert_eq!(
            strip_html("see <img class=\"x\" src='eiffel.jpg' /> here"),
            "see  eiffel.jpg  here"
        );
    }
}
