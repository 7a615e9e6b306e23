/// Repository for astronomy pictures
///
/// Composes the remote service, the image library and the preference
/// store behind one API: fetch by date, save, delete, existence check
/// and the observable saved list. Collaborators are injected at
/// construction, so tests run against a stub service and an in-memory
/// library.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task;
use tracing::{debug, warn};

use crate::api::{ApiError, ApodService};
use crate::date;
use crate::state::data::ImageRecord;
use crate::state::library::{ImageLibrary, StoreError};
use crate::state::prefs::Preferences;

/// Failures of a fetch-by-date lookup
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The input is not a syntactically valid calendar date
    #[error("invalid date format")]
    InvalidDate,
    /// The requested date lies after today
    #[error("cannot look up future dates")]
    FutureDate,
    /// The requested date precedes June 16, 1995
    #[error("the archive starts on June 16, 1995")]
    BeforeServiceStart,
    /// The remote lookup itself failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failures while saving a fetched record
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// A record for the same date is already saved
    #[error("an image for {0} is already saved")]
    AlreadyExists(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Single entry point for everything the app does with pictures
pub struct Repository {
    service: Box<dyn ApodService>,
    library: Arc<ImageLibrary>,
    prefs: Arc<Preferences>,
    /// Serializes saves and deletes so an existence check and the
    /// write it guards cannot interleave with another writer
    write_lock: Mutex<()>,
}

impl Repository {
    /// Build a repository from its collaborators
    pub fn new(
        service: Box<dyn ApodService>,
        library: Arc<ImageLibrary>,
        prefs: Arc<Preferences>,
    ) -> Self {
        Self {
            service,
            library,
            prefs,
            write_lock: Mutex::new(()),
        }
    }

    /// Look up the archive entry for a date.
    ///
    /// The date is re-validated here even though callers usually check
    /// first, so the repository stays safe to call directly: malformed,
    /// future and pre-archive dates are rejected without any network
    /// traffic. On success the date is remembered as the last viewed
    /// one. Dropping the returned future cancels the lookup.
    pub async fn fetch_by_date(&self, date: &str) -> Result<ImageRecord, FetchError> {
        if !date::is_valid_date(date) {
            return Err(FetchError::InvalidDate);
        }
        if date::is_future_date(date) {
            return Err(FetchError::FutureDate);
        }
        if date::is_before_service_start(date) {
            return Err(FetchError::BeforeServiceStart);
        }

        let api_key = self.prefs.api_key();
        let entry = self.service.fetch(&api_key, date).await?;
        debug!(date, title = entry.title.as_str(), "fetched archive entry");

        self.record_last_viewed(date).await;

        Ok(ImageRecord::from(entry))
    }

    /// Remember the date of the last successful lookup. Best effort: a
    /// failure here is logged and never fails the fetch.
    async fn record_last_viewed(&self, date: &str) {
        let prefs = Arc::clone(&self.prefs);
        let date = date.to_string();

        match task::spawn_blocking(move || prefs.set_last_viewed_date(&date)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(%err, "could not record last viewed date"),
            Err(err) => warn!(%err, "could not record last viewed date"),
        }
    }

    /// Save a fetched record. Fails with `AlreadyExists` when a record
    /// for the same date is saved; never silently overwrites.
    pub async fn save(&self, record: ImageRecord) -> Result<(), SaveError> {
        let _guard = self.write_lock.lock().await;

        if self.library.exists(&record.date).await? {
            return Err(SaveError::AlreadyExists(record.date));
        }
        self.library.insert_or_replace(record).await?;

        Ok(())
    }

    /// Remove a saved record. Succeeds even when the record is already
    /// gone, so an undo that re-issues a delete never errors.
    pub async fn delete(&self, record: &ImageRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.library.delete_by_date(&record.date).await
    }

    /// Check whether a record for the date is saved. No side effects.
    pub async fn exists(&self, date: &str) -> Result<bool, StoreError> {
        self.library.exists(date).await
    }

    /// Subscribe to the saved list, newest first. The receiver holds
    /// the current list immediately and is notified after every
    /// change; dropping it releases the subscription.
    pub fn observe_all(&self) -> watch::Receiver<Vec<ImageRecord>> {
        self.library.subscribe()
    }
}
