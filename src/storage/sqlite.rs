use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{AnalysisReport, Dataset, Post, RetrievalStrategy};

pub struct Storage {
    conn: Connection,
}

type PostRow = (String, String, String, i64, u32, String, String, String, String);

impl Storage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.init_db()?;
        Ok(storage)
    }

    /// Opens a database written by an earlier run without creating anything.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingData(format!(
                "database file not found: {}",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    fn init_db(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                score INTEGER NOT NULL,
                num_comments INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                author TEXT NOT NULL,
                url TEXT NOT NULL,
                strategy TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY,
                generated_at TEXT NOT NULL,
                total_posts INTEGER NOT NULL,
                report_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);
            "#,
        )?;

        Ok(())
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replaces the stored dataset with `dataset`.
    pub fn save_dataset(&self, dataset: &Dataset) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM posts", [])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO posts (id, title, text, score, num_comments, created_at, author, url, strategy)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for post in dataset {
                stmt.execute(params![
                    post.id,
                    post.title,
                    post.text,
                    post.score,
                    post.num_comments,
                    post.created_at.to_rfc3339(),
                    post.author,
                    post.url,
                    post.strategy.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        tracing::info!("Saved {} posts to database", dataset.len());
        Ok(())
    }

    pub fn load_dataset(&self) -> Result<Dataset> {
        if !self.table_exists("posts")? {
            return Err(Error::MissingData("no posts table in database".to_string()));
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, text, score, num_comments, created_at, author, url, strategy
            FROM posts
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
            ))
        })?;

        let mut posts = Vec::new();
        for row in rows {
            posts.push(post_from_row(row?)?);
        }

        tracing::info!("Loaded {} posts from database", posts.len());
        Ok(Dataset::from_posts(posts))
    }

    pub fn post_count(&self) -> Result<usize> {
        if !self.table_exists("posts")? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn has_posts(&self) -> Result<bool> {
        Ok(self.post_count()? > 0)
    }

    pub fn save_report(&self, report: &AnalysisReport) -> Result<()> {
        let report_json = serde_json::to_string(report)?;
        self.conn.execute(
            r#"
            INSERT INTO reports (generated_at, total_posts, report_json)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                report.generated_at.to_rfc3339(),
                report.total_posts as i64,
                report_json,
            ],
        )?;
        Ok(())
    }

    pub fn latest_report(&self) -> Result<Option<AnalysisReport>> {
        if !self.table_exists("reports")? {
            return Ok(None);
        }

        let report_json: Option<String> = self
            .conn
            .query_row(
                "SELECT report_json FROM reports ORDER BY generated_at DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match report_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

fn post_from_row(row: PostRow) -> Result<Post> {
    let (id, title, text, score, num_comments, created_at, author, url, strategy) = row;

    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            Error::ParseError(format!("post {} has bad timestamp {:?}: {}", id, created_at, e))
        })?;
    let strategy: RetrievalStrategy = strategy.parse()?;

    Ok(Post {
        id,
        title,
        text,
        score,
        num_comments,
        created_at,
        author,
        url,
        strategy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: &str, strategy: RetrievalStrategy) -> Post {
        Post {
            id: id.to_string(),
            title: format!("Title {}", id),
            text: "Body text".to_string(),
            score: 7,
            num_comments: 3,
            created_at: Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 0).unwrap(),
            author: "deleted".to_string(),
            url: format!("https://reddit.com/{}", id),
            strategy,
        }
    }

    #[test]
    fn test_save_and_load_dataset() {
        let storage = Storage::in_memory().unwrap();
        let dataset = Dataset::from_posts(vec![
            post("b", RetrievalStrategy::Engaged),
            post("a", RetrievalStrategy::Fallback),
        ]);

        storage.save_dataset(&dataset).unwrap();
        let loaded = storage.load_dataset().unwrap();

        assert_eq!(loaded.posts(), dataset.posts());
        assert_eq!(storage.post_count().unwrap(), 2);
    }

    #[test]
    fn test_save_replaces_previous_dataset() {
        let storage = Storage::in_memory().unwrap();
        storage
            .save_dataset(&Dataset::from_posts(vec![post("old", RetrievalStrategy::Recent)]))
            .unwrap();
        storage
            .save_dataset(&Dataset::from_posts(vec![post("new", RetrievalStrategy::Recent)]))
            .unwrap();

        let loaded = storage.load_dataset().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.posts()[0].id, "new");
    }

    #[test]
    fn test_fresh_database_has_no_posts() {
        let storage = Storage::in_memory().unwrap();
        assert!(!storage.has_posts().unwrap());
        assert!(storage.load_dataset().unwrap().is_empty());
        assert!(storage.latest_report().unwrap().is_none());
    }

    #[test]
    fn test_missing_table_is_missing_data() {
        let conn = Connection::open_in_memory().unwrap();
        let storage = Storage { conn };

        assert!(matches!(storage.load_dataset(), Err(Error::MissingData(_))));
        assert_eq!(storage.post_count().unwrap(), 0);
    }

    #[test]
    fn test_missing_file_is_missing_data() {
        let path = std::env::temp_dir().join("uscisanalyzer-does-not-exist.db");
        assert!(matches!(Storage::open_existing(&path), Err(Error::MissingData(_))));
    }

    #[test]
    fn test_bad_rows_are_parse_errors() {
        let storage = Storage::in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO posts VALUES ('x', 't', '', 0, 0, 'yesterday', 'deleted', '', 'new')",
                [],
            )
            .unwrap();
        assert!(matches!(storage.load_dataset(), Err(Error::ParseError(_))));

        storage.conn.execute("DELETE FROM posts", []).unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO posts VALUES ('x', 't', '', 0, 0, '2024-01-01T00:00:00+00:00', 'deleted', '', 'rising')",
                [],
            )
            .unwrap();
        assert!(matches!(storage.load_dataset(), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_latest_report_round_trip() {
        use crate::analysis::AnalysisPipeline;

        let storage = Storage::in_memory().unwrap();
        let dataset = Dataset::from_posts(vec![post("a", RetrievalStrategy::Recent)]);
        let report = AnalysisPipeline::default().run(&dataset);

        storage.save_report(&report).unwrap();
        let latest = storage.latest_report().unwrap().unwrap();

        assert_eq!(latest.total_posts, 1);
        assert_eq!(latest.sentiment.counts, report.sentiment.counts);
        assert_eq!(latest.categories.categories.len(), 5);
    }
}
