/// The ImageLibrary manages the SQLite database of saved pictures.
///
/// One row per calendar date, ordered newest-saved-first. Every public
/// operation hops through a blocking task so callers on an interactive
/// context are never stalled by disk I/O, and every completed change
/// republishes the full ordered list into a watch channel that
/// subscribers observe.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::watch;
use tokio::task;
use tracing::debug;

use super::data::ImageRecord;

/// Failures of the saved-image store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("could not create data directory: {0}")]
    Io(#[from] io::Error),
    #[error("background task failed: {0}")]
    Task(#[from] task::JoinError),
}

/// Durable catalog of saved astronomy pictures
pub struct ImageLibrary {
    conn: Arc<Mutex<Connection>>,
    changes: Arc<watch::Sender<Vec<ImageRecord>>>,
    db_path: Option<PathBuf>,
}

impl ImageLibrary {
    /// Open (or create) the database at the given path and initialize
    /// the schema. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "image library opened");

        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Open a throwaway in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    /// Open the library at its default location.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/apod-client/apod.db
    /// - macOS: ~/Library/Application Support/apod-client/apod.db
    /// - Windows: %APPDATA%\apod-client\apod.db
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_db_path())
    }

    /// Get the path where the database should be stored
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("apod-client");
        path.push("apod.db");
        path
    }

    fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;

        let (changes, _) = watch::channel(Self::snapshot(&conn)?);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes: Arc::new(changes),
            db_path,
        })
    }

    /// Initialize the database schema.
    /// Creates the table and index if they don't exist.
    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        // One row per calendar date; the date is the natural key
        conn.execute(
            "CREATE TABLE IF NOT EXISTS saved_images (
                date            TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                image_url       TEXT NOT NULL,
                hd_image_url    TEXT,
                explanation     TEXT NOT NULL,
                copyright       TEXT,
                media_type      TEXT NOT NULL,
                saved_at        INTEGER NOT NULL
            )",
            [],
        )?;

        // Index for the newest-first list query
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_saved_images_saved_at
             ON saved_images(saved_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file, if it is file-backed
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Subscribe to the saved list. The receiver immediately holds the
    /// current list and is notified after every change; dropping it
    /// ends the subscription.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ImageRecord>> {
        self.changes.subscribe()
    }

    /// Write a record, overwriting any existing row with the same date
    pub async fn insert_or_replace(&self, record: ImageRecord) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let changes = Arc::clone(&self.changes);

        task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            conn.execute(
                "INSERT OR REPLACE INTO saved_images
                 (date, title, image_url, hd_image_url, explanation, copyright, media_type, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.date,
                    record.title,
                    record.image_url,
                    record.hd_image_url,
                    record.explanation,
                    record.copyright,
                    record.media_type,
                    record.saved_at,
                ],
            )?;
            debug!(date = record.date.as_str(), "record saved");

            Self::publish(&conn, &changes)
        })
        .await??;

        Ok(())
    }

    /// Remove a record by its date. Removing an absent date succeeds
    /// and emits nothing, which keeps deletes idempotent for undo/redo.
    pub async fn delete_by_date(&self, date: &str) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let changes = Arc::clone(&self.changes);
        let date = date.to_string();

        task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            let affected = conn.execute(
                "DELETE FROM saved_images WHERE date = ?1",
                params![date],
            )?;
            debug!(date = date.as_str(), affected, "record deleted");

            if affected > 0 {
                Self::publish(&conn, &changes)?;
            }
            Ok::<_, rusqlite::Error>(())
        })
        .await??;

        Ok(())
    }

    /// Remove a record
    pub async fn delete(&self, record: &ImageRecord) -> Result<(), StoreError> {
        self.delete_by_date(&record.date).await
    }

    /// Check whether a record for the date is saved
    pub async fn exists(&self, date: &str) -> Result<bool, StoreError> {
        let conn = Arc::clone(&self.conn);
        let date = date.to_string();

        let found = task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM saved_images WHERE date = ?1)",
                params![date],
                |row| row.get::<_, bool>(0),
            )
        })
        .await??;

        Ok(found)
    }

    /// Load the record saved for a date, if any
    pub async fn get_by_date(&self, date: &str) -> Result<Option<ImageRecord>, StoreError> {
        let conn = Arc::clone(&self.conn);
        let date = date.to_string();

        let record = task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            conn.query_row(
                "SELECT date, title, image_url, hd_image_url, explanation, copyright, media_type, saved_at
                 FROM saved_images WHERE date = ?1",
                params![date],
                |row| {
                    Ok(ImageRecord {
                        date: row.get(0)?,
                        title: row.get(1)?,
                        image_url: row.get(2)?,
                        hd_image_url: row.get(3)?,
                        explanation: row.get(4)?,
                        copyright: row.get(5)?,
                        media_type: row.get(6)?,
                        saved_at: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await??;

        Ok(record)
    }

    /// Get a count of saved records
    pub async fn count(&self) -> Result<i64, StoreError> {
        let conn = Arc::clone(&self.conn);

        let count = task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            conn.query_row("SELECT COUNT(*) FROM saved_images", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await??;

        Ok(count)
    }

    /// Remove every saved record
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        let conn = Arc::clone(&self.conn);
        let changes = Arc::clone(&self.changes);

        task::spawn_blocking(move || {
            let conn = conn.lock().expect("library mutex poisoned");
            let affected = conn.execute("DELETE FROM saved_images", [])?;
            debug!(affected, "library cleared");

            if affected > 0 {
                Self::publish(&conn, &changes)?;
            }
            Ok::<_, rusqlite::Error>(())
        })
        .await??;

        Ok(())
    }

    /// Load the full list ordered newest-saved-first
    fn snapshot(conn: &Connection) -> rusqlite::Result<Vec<ImageRecord>> {
        let mut stmt = conn.prepare(
            "SELECT date, title, image_url, hd_image_url, explanation, copyright, media_type, saved_at
             FROM saved_images ORDER BY saved_at DESC, date DESC",
        )?;

        let record_iter = stmt.query_map([], |row| {
            Ok(ImageRecord {
                date: row.get(0)?,
                title: row.get(1)?,
                image_url: row.get(2)?,
                hd_image_url: row.get(3)?,
                explanation: row.get(4)?,
                copyright: row.get(5)?,
                media_type: row.get(6)?,
                saved_at: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Push the current list to subscribers; called with the
    /// connection lock held so emissions arrive in mutation order
    fn publish(
        conn: &Connection,
        changes: &watch::Sender<Vec<ImageRecord>>,
    ) -> rusqlite::Result<()> {
        let records = Self::snapshot(conn)?;
        changes.send_replace(records);
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ImageLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLibrary")
            .field("db_path", &self.db_path)
            .finish()
    }
}
