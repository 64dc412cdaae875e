//! SQLite implementation of the record store.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use tracing::info;

use homebridgr_core::{Error, Result};

use crate::RecordStore;

const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    data TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS idx_records_created
    ON records (collection, created_at DESC);
";

/// Record store on a single SQLite file.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/records/`). The file will be
    /// `db_dir/homebridgr.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("homebridgr.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(e.to_string()))?;

        info!("Record store opened at {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn decode_document(data: String) -> Result<Value> {
    serde_json::from_str(&data).map_err(|e| Error::Storage(format!("corrupt record: {e}")))
}

impl RecordStore for SqliteStore {
    fn insert(&self, collection: &str, mut fields: Map<String, Value>) -> Result<Value> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = fields
            .get("created_at")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        fields.insert("id".into(), Value::String(id.clone()));
        fields.insert("created_at".into(), Value::String(created_at.clone()));

        let document = Value::Object(fields);
        let data = serde_json::to_string(&document)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO records (collection, id, created_at, data) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, created_at, data],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(document)
    }

    fn fetch(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let conn = self.conn.lock();
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        data.map(decode_document).transpose()
    }

    fn update(&self, collection: &str, id: &str, fields: Map<String, Value>) -> Result<Value> {
        let conn = self.conn.lock();

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        let Some(data) = data else {
            return Err(Error::NotFound(format!("{collection}/{id}")));
        };

        let mut document = decode_document(data)?;
        if let Value::Object(ref mut existing) = document {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }

        let updated = serde_json::to_string(&document)?;
        let changed = conn
            .execute(
                "UPDATE records SET data = ?1 WHERE collection = ?2 AND id = ?3",
                params![updated, collection, id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("{collection}/{id}")));
        }

        Ok(document)
    }

    fn list(&self, collection: &str) -> Result<Vec<Value>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT data FROM records WHERE collection = ?1 ORDER BY created_at DESC, id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut documents = Vec::new();
        for row in rows {
            let data = row.map_err(|e| Error::Database(e.to_string()))?;
            documents.push(decode_document(data)?);
        }

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn open_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_and_fetch_roundtrip() {
        let (_dir, store) = open_store();

        let doc = store
            .insert("student_posts", fields(json!({ "caption": "First day!" })))
            .unwrap();

        let id = doc["id"].as_str().unwrap();
        assert!(doc["created_at"].is_string());

        let fetched = store.fetch("student_posts", id).unwrap().unwrap();
        assert_eq!(fetched, doc);
    }

    #[test]
    fn test_fetch_missing_returns_none() {
        let (_dir, store) = open_store();
        assert!(store.fetch("student_posts", "nope").unwrap().is_none());
    }

    #[test]
    fn test_update_merges_fields() {
        let (_dir, store) = open_store();

        let doc = store
            .insert("community_posts", fields(json!({ "text_content": "hello" })))
            .unwrap();
        let id = doc["id"].as_str().unwrap();

        let updated = store
            .update(
                "community_posts",
                id,
                fields(json!({
                    "analysis_terms": [{ "term": "a", "explanation": "b" }],
                    "analysis_raw_text": "{}",
                })),
            )
            .unwrap();

        assert_eq!(updated["text_content"], "hello");
        assert_eq!(updated["analysis_terms"][0]["term"], "a");

        let fetched = store.fetch("community_posts", id).unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[test]
    fn test_update_missing_record_is_not_found() {
        let (_dir, store) = open_store();
        let err = store
            .update("student_posts", "ghost", Map::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_list_is_newest_first_and_scoped_to_collection() {
        let (_dir, store) = open_store();

        let mut older = fields(json!({ "caption": "old" }));
        older.insert(
            "created_at".into(),
            json!("2026-01-01T00:00:00+00:00"),
        );
        store.insert("student_posts", older).unwrap();

        let mut newer = fields(json!({ "caption": "new" }));
        newer.insert(
            "created_at".into(),
            json!("2026-02-01T00:00:00+00:00"),
        );
        store.insert("student_posts", newer).unwrap();

        store
            .insert("community_posts", fields(json!({ "text_content": "other" })))
            .unwrap();

        let posts = store.list("student_posts").unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0]["caption"], "new");
        assert_eq!(posts[1]["caption"], "old");
    }
}
