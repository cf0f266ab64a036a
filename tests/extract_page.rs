// tests/extract_page.rs
use chrono::{DateTime, Local, TimeZone};
use gold_insight::ingest::extract::extract;
use gold_insight::sentiment::LexiconModel;

const PAGE: &str = include_str!("fixtures/sina_search.html");

fn keywords() -> Vec<String> {
    gold_insight::ingest::config::CrawlConfig::default().keywords
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

#[test]
fn fixture_page_yields_exactly_one_record() {
    let now = at(2024, 6, 1, 12, 0);
    let records = extract(PAGE, now, &keywords(), &LexiconModel::new());

    // Block 2 has no tracked keyword, block 3 has no summary.
    assert_eq!(records.len(), 1);
    let rec = &records[0];
    assert_eq!(rec.title, "黄金期货上涨 突破新高");
    assert_eq!(rec.url, "https://finance.example.cn/gold/001.html");
    assert!(rec.summary.contains("美联储"));
    assert!(!rec.summary.contains('<'), "markup must be stripped");
}

#[test]
fn today_time_tag_resolves_to_todays_clock_time() {
    let now = at(2024, 6, 1, 12, 0);
    let records = extract(PAGE, now, &keywords(), &LexiconModel::new());
    assert_eq!(records[0].time, at(2024, 6, 1, 14, 30));
}

#[test]
fn sentiment_is_bounded_and_bullish_for_rally_copy() {
    let now = at(2024, 6, 1, 12, 0);
    let records = extract(PAGE, now, &keywords(), &LexiconModel::new());
    let s = records[0].sentiment;
    assert!((0.0..=1.0).contains(&s));
    assert!(s > 0.6, "rally copy should read bullish, got {s}");
}

#[test]
fn retention_uses_the_full_keyword_set_not_the_query_term() {
    // Even if only "利率" drove the query, a block matching "黄金期货" is kept.
    let now = at(2024, 6, 1, 12, 0);
    let narrow = vec!["黄金期货".to_string()];
    let records = extract(PAGE, now, &narrow, &LexiconModel::new());
    assert_eq!(records.len(), 1);
}

#[test]
fn pages_without_result_blocks_yield_nothing() {
    let now = at(2024, 6, 1, 12, 0);
    let records = extract(
        "<html><body><p>暂无结果</p></body></html>",
        now,
        &keywords(),
        &LexiconModel::new(),
    );
    assert!(records.is_empty());
}

#[test]
fn extraction_is_pure_across_calls() {
    let now = at(2024, 6, 1, 12, 0);
    let model = LexiconModel::new();
    let a = extract(PAGE, now, &keywords(), &model);
    let b = extract(PAGE, now, &keywords(), &model);
    assert_eq!(a, b);
}
