//! Data layer for a NASA Astronomy Picture of the Day viewer.
//!
//! Fetches the picture metadata for a chosen date from the public
//! archive, validates dates against the archive's range, and keeps a
//! local library of saved pictures with a live, newest-first view of
//! it. A UI shell sits on top of [`Repository`]; everything here runs
//! headless.

pub mod api;
pub mod date;
pub mod repository;
pub mod state;

pub use api::{ApiError, ApodClient, ApodResponse, ApodService};
pub use repository::{FetchError, Repository, SaveError};
pub use state::data::{ImageRecord, MediaType};
pub use state::library::{ImageLibrary, StoreError};
pub use state::prefs::{Preferences, PrefsError, DEFAULT_API_KEY};
