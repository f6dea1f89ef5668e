use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::model::ApiObject;

const DB_PATH: &str = "data/javadoc.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data").context("Failed to create data directory")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pages (
            id         INTEGER PRIMARY KEY,
            url        TEXT UNIQUE NOT NULL,
            name       TEXT NOT NULL,
            visited    BOOLEAN NOT NULL DEFAULT 0,
            visited_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_pages_visited ON pages(visited);

        CREATE TABLE IF NOT EXISTS page_results (
            id          INTEGER PRIMARY KEY,
            page_id     INTEGER NOT NULL REFERENCES pages(id),
            url         TEXT NOT NULL,
            path        TEXT,
            object_json TEXT,
            error       TEXT,
            latency_ms  INTEGER,
            resolved_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_page_results_page ON page_results(page_id);
        CREATE INDEX IF NOT EXISTS idx_page_results_path ON page_results(path);
        ",
    )?;
    Ok(())
}

// ── Queue ──

/// Queue `(url, name)` pairs; already-known URLs are ignored.
pub fn insert_pages(conn: &Connection, pages: &[(String, String)]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO pages (url, name) VALUES (?1, ?2)")?;
        for (url, name) in pages {
            count += stmt.execute(rusqlite::params![url, name])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn fetch_unvisited(
    conn: &Connection,
    limit: Option<usize>,
) -> Result<Vec<(i64, String, String)>> {
    let sql = match limit {
        Some(n) => format!(
            "SELECT id, url, name FROM pages WHERE visited = 0 ORDER BY id LIMIT {}",
            n
        ),
        None => "SELECT id, url, name FROM pages WHERE visited = 0 ORDER BY id".to_string(),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Results ──

/// Outcome of resolving one queued page. Exactly one of `object` / `error`
/// is set.
pub struct ResultRow {
    pub page_id: i64,
    pub url: String,
    pub object: Option<ApiObject>,
    pub error: Option<String>,
    pub latency_ms: Option<i64>,
}

/// Statements prepared once per resolve run and reused for every row.
pub struct ResultWriter<'c> {
    insert: rusqlite::Statement<'c>,
    update: rusqlite::Statement<'c>,
}

impl<'c> ResultWriter<'c> {
    pub fn new(conn: &'c Connection) -> Result<Self> {
        let insert = conn.prepare(
            "INSERT INTO page_results (page_id, url, path, object_json, error, latency_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let update = conn.prepare(
            "UPDATE pages SET visited = 1, visited_at = datetime('now') WHERE id = ?1",
        )?;
        Ok(ResultWriter { insert, update })
    }

    /// Store the row and mark its page visited.
    pub fn save(&mut self, row: &ResultRow) -> Result<()> {
        let path = row.object.as_ref().map(|o| o.path.as_str());
        let json = row.object.as_ref().map(serde_json::to_string).transpose()?;
        self.insert.execute(rusqlite::params![
            row.page_id, row.url, path, json, row.error, row.latency_ms,
        ])?;
        self.update.execute(rusqlite::params![row.page_id])?;
        Ok(())
    }
}

/// Every successfully resolved object, in catalog (page id) order. A page
/// resolved more than once contributes its latest result.
pub fn fetch_corpus(conn: &Connection) -> Result<Vec<ApiObject>> {
    let mut stmt = conn.prepare(
        "SELECT r.object_json
         FROM page_results r
         WHERE r.object_json IS NOT NULL
           AND r.id = (SELECT MAX(id) FROM page_results WHERE page_id = r.page_id)
         ORDER BY r.page_id",
    )?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    rows.iter()
        .map(|json| serde_json::from_str(json).context("Corrupt object_json in page_results"))
        .collect()
}

/// Pages whose latest result is a failure, as `(url, error)`.
pub fn fetch_errors(conn: &Connection, limit: usize) -> Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT r.url, r.error
         FROM page_results r
         WHERE r.error IS NOT NULL
           AND r.id = (SELECT MAX(id) FROM page_results WHERE page_id = r.page_id)
         ORDER BY r.page_id
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub visited: usize,
    pub unvisited: usize,
    pub resolved: usize,
    pub errors: usize,
}

/// Counts only the latest result of each page.
const LATEST_RESULTS: &str = "SELECT COUNT(*) FROM page_results r
     WHERE r.id = (SELECT MAX(id) FROM page_results WHERE page_id = r.page_id)";

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |sql: &str| -> Result<usize> {
        Ok(conn.query_row(sql, [], |row| row.get::<_, i64>(0))? as usize)
    };
    let total = count("SELECT COUNT(*) FROM pages")?;
    let visited = count("SELECT COUNT(*) FROM pages WHERE visited = 1")?;
    let resolved = count(&format!("{LATEST_RESULTS} AND r.object_json IS NOT NULL"))?;
    let errors = count(&format!("{LATEST_RESULTS} AND r.error IS NOT NULL"))?;
    Ok(Stats {
        total,
        visited,
        unvisited: total - visited,
        resolved,
        errors,
    })
}
