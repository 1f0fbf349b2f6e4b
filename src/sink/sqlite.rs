//! SQLite sink implementation

use crate::crawler::TraversalResult;
use crate::fetch::FetchResult;
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{ResultSink, SinkError, SinkResult};
use crate::sink::{PageRecord, PageStatus, RunKind, RunRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

/// SQLite-backed [`ResultSink`]
pub struct SqliteSink {
    conn: Connection,
    config_hash: Option<String>,
}

/// A page about to be written
struct PageRow<'a> {
    url: &'a str,
    depth: Option<u32>,
    result: &'a FetchResult,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            config_hash: None,
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            config_hash: None,
        })
    }

    /// Stamps every run recorded from now on with a configuration hash
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    fn record_run(
        &mut self,
        kind: RunKind,
        label: &str,
        seed: Option<&str>,
        pages: &[PageRow<'_>],
    ) -> SinkResult<i64> {
        let recorded_at = Utc::now().to_rfc3339();
        let failed = pages.iter().filter(|p| !p.result.is_success()).count();

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO runs (kind, label, seed, config_hash, recorded_at, total_pages, completed, failed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                kind.to_db_string(),
                label,
                seed,
                self.config_hash,
                recorded_at,
                pages.len() as i64,
                (pages.len() - failed) as i64,
                failed as i64,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for (position, page) in pages.iter().enumerate() {
            insert_page(&tx, run_id, position, page)?;
        }

        tx.commit()?;

        tracing::info!(
            "Recorded {} run {} '{}': {} pages, {} failed",
            kind.to_db_string(),
            run_id,
            label,
            pages.len(),
            failed
        );
        Ok(run_id)
    }
}

fn insert_page(
    tx: &Transaction<'_>,
    run_id: i64,
    position: usize,
    page: &PageRow<'_>,
) -> SinkResult<()> {
    let status = if page.result.is_success() {
        PageStatus::Completed
    } else {
        PageStatus::Failed
    };

    tx.execute(
        "INSERT INTO pages (run_id, position, url, depth, status, title, error, result_json, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            run_id,
            position as i64,
            page.url,
            page.depth,
            status.to_db_string(),
            page.result.title(),
            page.result.error(),
            serde_json::to_string(page.result)?,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl ResultSink for SqliteSink {
    fn record_batch(
        &mut self,
        label: &str,
        urls: &[String],
        results: &[FetchResult],
    ) -> SinkResult<i64> {
        if urls.len() != results.len() {
            return Err(SinkError::LengthMismatch {
                urls: urls.len(),
                results: results.len(),
            });
        }

        let pages: Vec<PageRow<'_>> = urls
            .iter()
            .zip(results)
            .map(|(url, result)| PageRow {
                url,
                depth: None,
                result,
            })
            .collect();

        self.record_run(RunKind::Batch, label, None, &pages)
    }

    fn record_traversal(
        &mut self,
        label: &str,
        seed: &str,
        result: &TraversalResult,
    ) -> SinkResult<i64> {
        let pages: Vec<PageRow<'_>> = result
            .pages
            .iter()
            .map(|page| PageRow {
                url: &page.url,
                depth: Some(page.depth),
                result: &page.result,
            })
            .collect();

        self.record_run(RunKind::Traversal, label, Some(seed), &pages)
    }

    fn get_run(&self, run_id: i64) -> SinkResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, label, seed, config_hash, recorded_at, total_pages, completed, failed
             FROM runs WHERE id = ?1",
        )?;

        let row = stmt
            .query_row(params![run_id], |row| {
                Ok((
                    RunRecord {
                        id: row.get(0)?,
                        kind: RunKind::Batch,
                        label: row.get(2)?,
                        seed: row.get(3)?,
                        config_hash: row.get(4)?,
                        recorded_at: row.get(5)?,
                        total_pages: row.get(6)?,
                        completed: row.get(7)?,
                        failed: row.get(8)?,
                    },
                    row.get::<_, String>(1)?,
                ))
            })
            .optional()?;

        let (mut run, kind) = row.ok_or(SinkError::RunNotFound(run_id))?;
        run.kind = RunKind::from_db_string(&kind)
            .ok_or_else(|| SinkError::Corrupt(format!("unknown run kind '{kind}'")))?;
        Ok(run)
    }

    fn pages_for_run(&self, run_id: i64) -> SinkResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, position, url, depth, status, title, error, result_json, recorded_at
             FROM pages WHERE run_id = ?1 ORDER BY position",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    PageRecord {
                        id: row.get(0)?,
                        run_id: row.get(1)?,
                        position: row.get(2)?,
                        url: row.get(3)?,
                        depth: row.get(4)?,
                        status: PageStatus::Completed,
                        title: row.get(6)?,
                        error: row.get(7)?,
                        result_json: row.get(8)?,
                        recorded_at: row.get(9)?,
                    },
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut page, status)| {
                page.status = PageStatus::from_db_string(&status)
                    .ok_or_else(|| SinkError::Corrupt(format!("unknown page status '{status}'")))?;
                Ok(page)
            })
            .collect()
    }

    fn count_runs(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
