// src/ingest/normalize.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Canonicalize a scraped HTML fragment into plain display text.
///
/// Entities are unescaped to a fixed point so double-encoded input
/// (`&amp;lt;b&amp;gt;`) still comes out clean, then tags are stripped,
/// control characters removed, and whitespace runs collapsed to single
/// spaces. `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        let unescaped = html_escape::decode_html_entities(&text).to_string();
        if unescaped == text {
            break;
        }
        text = unescaped;
    }

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    text = re_tags.replace_all(&text, "").to_string();

    // C0 + DEL + C1 ranges.
    text.retain(|c| !matches!(c, '\u{00}'..='\u{1f}' | '\u{7f}'..='\u{9f}'));

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    text = re_ws.replace_all(&text, " ").to_string();
    text.trim().to_string()
}
