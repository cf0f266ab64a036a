// tests/store_merge.rs
use chrono::{Local, TimeZone};
use gold_insight::ingest::store::NewsStore;
use gold_insight::ingest::types::ArticleRecord;

fn rec(url: &str, title: &str) -> ArticleRecord {
    ArticleRecord {
        time: Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        title: title.to_string(),
        summary: "黄金期货摘要".to_string(),
        url: url.to_string(),
        sentiment: 0.73,
    }
}

#[test]
fn first_merge_writes_bom_header_and_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));

    let n = store
        .merge(&[rec("https://a.test/1", "一"), rec("https://a.test/2", "二")])
        .unwrap();
    assert_eq!(n, 2);

    let bytes = std::fs::read(store.path()).unwrap();
    assert!(bytes.starts_with(b"\xef\xbb\xbf"), "store must carry a BOM");
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert!(text.starts_with("time,title,summary,url,sentiment"));
    assert_eq!(store.load().len(), 2);
}

#[test]
fn remerging_the_same_candidates_adds_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));
    let candidates = vec![rec("https://a.test/1", "一")];

    assert_eq!(store.merge(&candidates).unwrap(), 1);
    assert_eq!(store.merge(&candidates).unwrap(), 0);
    assert_eq!(store.load().len(), 1);
}

#[test]
fn url_is_the_identity_key_despite_content_drift() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));

    assert_eq!(store.merge(&[rec("https://a.test/1", "旧标题")]).unwrap(), 1);
    // Same url, different title and summary: still the same article.
    assert_eq!(store.merge(&[rec("https://a.test/1", "新标题")]).unwrap(), 0);

    let rows = store.load();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "旧标题");
}

#[test]
fn later_merges_append_without_touching_earlier_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));

    store.merge(&[rec("https://a.test/1", "一")]).unwrap();
    store.merge(&[rec("https://a.test/1", "一"), rec("https://a.test/2", "二")]).unwrap();

    let rows = store.load();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].url, "https://a.test/1");
    assert_eq!(rows[1].url, "https://a.test/2");

    // Exactly one header row.
    let bytes = std::fs::read(store.path()).unwrap();
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert_eq!(text.matches("time,title,summary,url,sentiment").count(), 1);
}

#[test]
fn empty_merge_leaves_write_time_unset() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));

    assert!(store.last_write_time().is_none());
    assert_eq!(store.merge(&[]).unwrap(), 0);
    assert!(store.last_write_time().is_none(), "empty merge must not reset the gate clock");

    store.merge(&[rec("https://a.test/1", "一")]).unwrap();
    let first = store.last_write_time().expect("set after non-empty merge");

    // A merge with nothing new keeps the previous timestamp.
    assert_eq!(store.merge(&[rec("https://a.test/1", "一")]).unwrap(), 0);
    assert_eq!(store.last_write_time(), Some(first));
}

#[test]
fn in_batch_duplicates_collapse_to_a_single_row() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));

    let n = store
        .merge(&[rec("https://a.test/1", "一"), rec("https://a.test/1", "重复")])
        .unwrap();
    assert_eq!(n, 1);

    let rows = store.load();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "一", "first occurrence wins within a batch");

    // Header plus exactly one data row on disk.
    let bytes = std::fs::read(store.path()).unwrap();
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    assert_eq!(text.trim_end().lines().count(), 2);
}

#[test]
fn records_without_url_are_never_persisted() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));
    assert_eq!(store.merge(&[rec("", "无链接")]).unwrap(), 0);
    assert!(store.load().is_empty());
}

#[test]
fn round_trips_timestamps_and_scores() {
    let tmp = tempfile::tempdir().unwrap();
    let store = NewsStore::new(tmp.path().join("news.csv"));
    let original = rec("https://a.test/1", "黄金期货上涨");
    store.merge(&[original.clone()]).unwrap();

    let rows = store.load();
    assert_eq!(rows[0], original);
}
