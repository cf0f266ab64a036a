// src/ingest/timeparse.rs
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, NaiveTime};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Best-effort parse of the search source's informal timestamps.
///
/// Three shapes are recognized, in order: "N分钟前", "今天 HH:MM", and
/// "MM-DD HH:MM" with the year inferred from `now` (rolled back one year
/// when the result would land in the future). Anything malformed falls back
/// to `now` — a slightly wrong timestamp beats dropping the article.
pub fn parse_article_time(text: &str, now: DateTime<Local>) -> DateTime<Local> {
    try_parse(text, now).unwrap_or(now)
}

fn try_parse(text: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    if text.contains("分钟前") {
        static RE_MINUTES: OnceCell<Regex> = OnceCell::new();
        let re = RE_MINUTES.get_or_init(|| Regex::new(r"(\d+)").unwrap());
        let minutes: i64 = re.captures(text)?.get(1)?.as_str().parse().ok()?;
        return Some(now - Duration::minutes(minutes));
    }

    if text.contains("今天") {
        let hhmm = text.split_whitespace().last()?;
        let t = NaiveTime::parse_from_str(hhmm, "%H:%M").ok()?;
        return now.date_naive().and_time(t).and_local_timezone(Local).single();
    }

    let dt = NaiveDateTime::parse_from_str(
        &format!("{}-{}", now.year(), text.trim()),
        "%Y-%m-%d %H:%M",
    )
    .ok()?;
    let parsed = dt.and_local_timezone(Local).single()?;
    if parsed > now {
        // Year boundary: a December article found in January.
        let rolled = dt.with_year(now.year() - 1)?;
        return rolled.and_local_timezone(Local).single();
    }
    Some(parsed)
}
