/// Shared data structures for the application state
///
/// These structs represent the data model that flows between the remote
/// API, the database layer and the consumer.

use chrono::Utc;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Kind of media the archive serves for a given date
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Lowercase wire/database form ("image" or "video")
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

impl ToSql for MediaType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for MediaType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|s| match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(FromSqlError::Other(
                format!("unknown media type: {other}").into(),
            )),
        })
    }
}

/// Represents one astronomy picture of the day
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Calendar date in YYYY-MM-DD form; the natural key. Two records
    /// with the same date are the same picture.
    pub date: String,
    /// Display title
    pub title: String,
    /// Standard-resolution media URL
    pub image_url: String,
    /// High-resolution URL (absent for videos, or when the archive
    /// omits it for that date)
    pub hd_image_url: Option<String>,
    /// Long-form description
    pub explanation: String,
    /// Attribution text, if any
    pub copyright: Option<String>,
    /// Whether the entry is a still image or a video
    pub media_type: MediaType,
    /// Unix milliseconds stamped when the record was constructed from a
    /// fetch; orders the saved list newest first
    pub saved_at: i64,
}

impl ImageRecord {
    /// Build a record from its fields, stamping the save timestamp now
    pub fn new(
        date: String,
        title: String,
        image_url: String,
        hd_image_url: Option<String>,
        explanation: String,
        copyright: Option<String>,
        media_type: MediaType,
    ) -> Self {
        Self {
            date,
            title,
            image_url,
            hd_image_url,
            explanation,
            copyright,
            media_type,
            saved_at: Utc::now().timestamp_millis(),
        }
    }

    /// Whether a high-resolution view can be offered for this record
    pub fn hd_available(&self) -> bool {
        self.media_type == MediaType::Image && self.hd_image_url.is_some()
    }
}
