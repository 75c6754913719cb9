use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use crate::parser::extract::CardReport;

const DB_PATH: &str = "data/evaluations.sqlite";

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS evaluations (
            id         INTEGER PRIMARY KEY,
            url        TEXT NOT NULL,
            model      TEXT NOT NULL,
            markdown   TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_evaluations_url ON evaluations(url);

        -- Derived data: overwritten whenever an evaluation is re-extracted
        CREATE TABLE IF NOT EXISTS reports (
            evaluation_id     INTEGER PRIMARY KEY REFERENCES evaluations(id),
            title             TEXT,
            card_url          TEXT,
            card_type         TEXT,
            version           TEXT,
            owner             TEXT,
            raw_total         REAL,
            score             REAL,
            label             TEXT CHECK(label IN ('Excellent','Good','Fair','Poor')),
            present           INTEGER NOT NULL,
            partial           INTEGER NOT NULL,
            missing           INTEGER NOT NULL,
            total_items       INTEGER NOT NULL,
            gaps_missing      TEXT,
            gaps_inconsistent TEXT,
            gaps_ambiguous    TEXT,
            details           TEXT NOT NULL,
            processed_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS category_scores (
            id            INTEGER PRIMARY KEY,
            evaluation_id INTEGER NOT NULL REFERENCES evaluations(id),
            name          TEXT NOT NULL,
            score         INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_category_eval ON category_scores(evaluation_id);
        ",
    )?;
    Ok(())
}

// ── Evaluations ──

pub struct StoredEvaluation {
    pub id: i64,
    pub url: String,
    pub markdown: String,
}

pub fn insert_evaluation(conn: &Connection, url: &str, model: &str, markdown: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO evaluations (url, model, markdown, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![url, model, markdown, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<StoredEvaluation>> {
    let sql = format!(
        "SELECT e.id, e.url, e.markdown
         FROM evaluations e
         LEFT JOIN reports r ON r.evaluation_id = e.id
         WHERE r.evaluation_id IS NULL
         ORDER BY e.id{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredEvaluation { id: row.get(0)?, url: row.get(1)?, markdown: row.get(2)? })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Reports ──

pub fn save_report(conn: &Connection, evaluation_id: i64, report: &CardReport) -> Result<()> {
    save_reports(conn, &[(evaluation_id, report.clone())])
}

pub fn save_reports(conn: &Connection, items: &[(i64, CardReport)]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut r_stmt = tx.prepare(
            "INSERT OR REPLACE INTO reports
             (evaluation_id, title, card_url, card_type, version, owner, raw_total,
              score, label, present, partial, missing, total_items,
              gaps_missing, gaps_inconsistent, gaps_ambiguous, details, processed_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
        )?;
        let mut del_stmt = tx.prepare("DELETE FROM category_scores WHERE evaluation_id = ?1")?;
        let mut c_stmt = tx.prepare(
            "INSERT INTO category_scores (evaluation_id, name, score) VALUES (?1, ?2, ?3)",
        )?;

        for (id, report) in items {
            r_stmt.execute(rusqlite::params![
                id,
                report.basic_info.title,
                report.basic_info.url,
                report.basic_info.card_type,
                report.basic_info.version,
                report.basic_info.owner,
                report.raw_total,
                report.score.value,
                report.score.label.map(|l| l.to_string()),
                report.standards.present as i64,
                report.standards.partial as i64,
                report.standards.missing as i64,
                report.standards.total_items as i64,
                report.gaps.missing,
                report.gaps.inconsistent,
                report.gaps.ambiguous,
                report.details,
                Utc::now().to_rfc3339(),
            ])?;
            del_stmt.execute(rusqlite::params![id])?;
            for c in &report.categories {
                c_stmt.execute(rusqlite::params![id, c.name, c.score])?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Reporting queries ──

pub struct OverviewRow {
    pub url: String,
    pub title: String,
    pub score: Option<f64>,
    pub label: String,
    pub total_items: i64,
    pub missing: i64,
}

pub fn fetch_overview(
    conn: &Connection,
    label: Option<&str>,
    limit: usize,
) -> Result<Vec<OverviewRow>> {
    let base = "SELECT e.url, COALESCE(r.title, ''), r.score, COALESCE(r.label, '-'),
                       r.total_items, r.missing
                FROM evaluations e
                JOIN reports r ON r.evaluation_id = e.id";

    let rows = match label {
        Some(l) => {
            let sql = format!("{base} WHERE r.label = ?1 ORDER BY e.id DESC LIMIT {limit}");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([l], map_overview)?.collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("{base} ORDER BY e.id DESC LIMIT {limit}");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], map_overview)?.collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(rows)
}

fn map_overview(row: &rusqlite::Row) -> rusqlite::Result<OverviewRow> {
    Ok(OverviewRow {
        url: row.get(0)?,
        title: row.get(1)?,
        score: row.get(2)?,
        label: row.get(3)?,
        total_items: row.get(4)?,
        missing: row.get(5)?,
    })
}

pub struct Stats {
    pub evaluations: i64,
    pub processed: i64,
    pub unprocessed: i64,
    pub scored: i64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let evaluations: i64 = conn.query_row("SELECT COUNT(*) FROM evaluations", [], |r| r.get(0))?;
    let processed: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |r| r.get(0))?;
    let scored: i64 =
        conn.query_row("SELECT COUNT(*) FROM reports WHERE score IS NOT NULL", [], |r| r.get(0))?;
    Ok(Stats { evaluations, processed, unprocessed: evaluations - processed, scored })
}

// ── Tests ──
