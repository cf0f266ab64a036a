// src/ingest/store.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ingest::types::ArticleRecord;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Append-only article store: one CSV row per record (UTF-8 with BOM,
/// header on first write), URL as identity key. Rows are never rewritten
/// or removed.
///
/// The crawl gate reads `last_write_time` from a sidecar metadata file
/// updated only on merges that actually appended rows, so empty merges and
/// file-copy operations do not disturb the interval clock.
#[derive(Debug, Clone)]
pub struct NewsStore {
    path: PathBuf,
    meta_path: PathBuf,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StoreMeta {
    last_successful_write: DateTime<Local>,
}

impl NewsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let meta_path = path.with_extension("meta.json");
        Self { path, meta_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp of the last merge that appended rows, or `None` when the
    /// store has never been written.
    pub fn last_write_time(&self) -> Option<DateTime<Local>> {
        let raw = fs::read_to_string(&self.meta_path).ok()?;
        let meta: StoreMeta = serde_json::from_str(&raw).ok()?;
        Some(meta.last_successful_write)
    }

    /// URLs already durable. A missing or unreadable store counts as empty;
    /// individually malformed rows are skipped.
    pub fn existing_urls(&self) -> HashSet<String> {
        self.load()
            .into_iter()
            .map(|rec| rec.url)
            .collect()
    }

    /// All durable records, skipping rows that no longer deserialize and
    /// deduplicating by URL (first occurrence wins; later rows for the same
    /// URL were never merged by this component).
    pub fn load(&self) -> Vec<ArticleRecord> {
        let Ok(bytes) = fs::read(&self.path) else {
            return Vec::new();
        };
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        let mut reader = csv::Reader::from_reader(body);

        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        for row in reader.deserialize::<ArticleRecord>() {
            match row {
                Ok(rec) if !rec.url.is_empty() && seen.insert(rec.url.clone()) => out.push(rec),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = ?e, path = %self.path.display(), "skipping malformed store row"),
            }
        }
        out
    }

    /// Append candidates whose URL is not yet durable and return how many
    /// rows were added. Duplicate URLs within the batch collapse to the
    /// first occurrence, keeping the one-row-per-URL invariant even for
    /// callers that skip the in-crawl dedup.
    ///
    /// The store is rewritten to a temp file and renamed so readers never
    /// observe a partial append. An empty filtered set writes nothing and
    /// leaves the gate metadata untouched.
    pub fn merge(&self, candidates: &[ArticleRecord]) -> Result<usize> {
        let existing = self.existing_urls();
        let mut seen: HashSet<String> = HashSet::new();
        let fresh: Vec<&ArticleRecord> = candidates
            .iter()
            .filter(|rec| {
                !rec.url.is_empty()
                    && !existing.contains(&rec.url)
                    && seen.insert(rec.url.clone())
            })
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating data dir {}", dir.display()))?;
            }
        }

        let prior = fs::read(&self.path).ok();
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut file = fs::File::create(&tmp)
                .with_context(|| format!("creating {}", tmp.display()))?;
            match &prior {
                Some(bytes) => file.write_all(bytes).context("copying existing rows")?,
                None => file.write_all(UTF8_BOM).context("writing BOM")?,
            }
            let mut writer = csv::WriterBuilder::new()
                .has_headers(prior.is_none())
                .from_writer(file);
            for rec in &fresh {
                writer.serialize(rec).context("serializing article row")?;
            }
            writer.flush().context("flushing store")?;
        }
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;

        let meta = StoreMeta {
            last_successful_write: Local::now(),
        };
        fs::write(&self.meta_path, serde_json::to_string(&meta)?)
            .with_context(|| format!("writing {}", self.meta_path.display()))?;

        Ok(fresh.len())
    }
}
