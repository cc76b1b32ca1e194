//! Text extraction primitives: page-reference detection and HTML-to-Markdown
//! conversion for the chat platform.

use regex::Regex;
use std::sync::LazyLock;

/// Page-reference phrasings, in priority order. The agent may echo a page
/// request in more than one form; the first pattern that matches wins.
static PAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)покажи\s+страниц[уа]\s+(\d+)",
        r"(?i)стр\.?\s+(\d+)",
        r"(?i)страниц[уа]\s+(\d+)",
        r"(?i)page\s+(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

/// Detail-request phrasings, each capturing a hotel id.
static DETAIL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)подробнее\s+об\s+отеле\s+(\d+)",
        r"(?i)детали\s+отеля\s+(\d+)",
        r"(?i)отель\s+(\d+)\s+подробнее",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static regex"))
    .collect()
});

/// Returns the page number referenced by `text`, if any phrasing matches.
pub fn detect_requested_page(text: &str) -> Option<u32> {
    PAGE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}

/// Returns the hotel id from a "tell me more about hotel N" style message.
pub fn detect_detail_request(text: &str) -> Option<String> {
    DETAIL_PATTERNS
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].to_string())
}

static TAG_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)<br\s*/?>", "\n"),
        (r"(?i)</p>", "\n\n"),
        (r"(?i)<p[^>]*>", ""),
        (r"(?i)<strong[^>]*>(.*?)</strong>", "*${1}*"),
        (r"(?i)<b[^>]*>(.*?)</b>", "*${1}*"),
        (r"(?i)<em[^>]*>(.*?)</em>", "_${1}_"),
        (r"(?i)<i[^>]*>(.*?)</i>", "_${1}_"),
        (r"(?i)<li[^>]*>", "• "),
        (r"(?i)</li>", "\n"),
        (r"(?i)<ul[^>]*>", "\n"),
        (r"(?i)</ul>", "\n"),
        (r"<[^>]*>", ""),
    ]
    .iter()
    .map(|(p, r)| (Regex::new(p).expect("static regex"), *r))
    .collect()
});

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// Converts the small set of HTML tags the agent emits into Telegram Markdown,
/// strips anything else that looks like a tag, and normalizes whitespace.
///
/// Idempotent: a converted string passes through unchanged.
pub fn html_to_markdown(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in TAG_RULES.iter() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    let trimmed_lines = out
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    EXCESS_NEWLINES
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}
