//! Channel name extraction from a channel page.
//!
//! A plain `<title>` scan instead of an HTML parse: it is cheap, runs
//! anywhere, and the title tag is the only thing we need from the page.

use std::sync::LazyLock;

use regex::Regex;

/// Suffix the site appends to every page title.
pub const TITLE_SUFFIX: &str = " - YouTube";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>(.*?)</title>").expect("title pattern is valid"));

/// Extract the channel display name from a page body.
///
/// Takes the first `<title>` on a single line, decodes the five basic HTML
/// entities and drops a trailing [`TITLE_SUFFIX`]. Returns `None` when there
/// is no title or nothing is left after stripping.
pub fn extract_channel_name(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    if raw.is_empty() {
        return None;
    }

    let decoded = decode_entities(raw);
    let name = decoded.strip_suffix(TITLE_SUFFIX).unwrap_or(&decoded);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Decode `&amp; &lt; &gt; &quot; &#39;`.
///
/// `&amp;` goes first, so `&amp;lt;` ends up as `<`.
pub fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
