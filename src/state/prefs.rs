/// User preference storage
///
/// A small JSON document holding the scalar settings the app persists:
/// API key, language, theme, dark-mode flag, last viewed date and the
/// first-run flag. Loading is fail-soft, so a missing or unreadable
/// file can never block startup; every setter rewrites the document
/// immediately under one lock, which keeps concurrent writers of
/// different keys from corrupting it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// API key used until the user supplies their own. NASA's shared demo
/// key, rate-limited but functional.
pub const DEFAULT_API_KEY: &str = "DEMO_KEY";

/// Failures while persisting preferences
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("could not write preference file: {0}")]
    Io(#[from] io::Error),
    #[error("could not encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The persisted document. Unknown keys are ignored and missing keys
/// fall back to their defaults individually.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
struct PrefValues {
    api_key: String,
    language: String,
    theme: String,
    dark_mode: bool,
    last_viewed_date: Option<String>,
    first_run: bool,
}

impl Default for PrefValues {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            language: "en".to_string(),
            theme: "system".to_string(),
            dark_mode: false,
            last_viewed_date: None,
            first_run: true,
        }
    }
}

/// Store for user settings, backed by one JSON file on disk
pub struct Preferences {
    path: PathBuf,
    values: Mutex<PrefValues>,
}

impl Preferences {
    /// Open the store at the given path. A missing file starts from
    /// defaults; an unreadable or corrupt file is logged and also
    /// starts from defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), %err, "preference file unreadable, using defaults");
                    PrefValues::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => PrefValues::default(),
            Err(err) => {
                warn!(path = %path.display(), %err, "preference file unreadable, using defaults");
                PrefValues::default()
            }
        };

        debug!(path = %path.display(), "preferences loaded");

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Open the store at its default location.
    ///
    /// The preference file lives in the user's data directory:
    /// - Linux: ~/.local/share/apod-client/preferences.json
    /// - macOS: ~/Library/Application Support/apod-client/preferences.json
    /// - Windows: %APPDATA%\apod-client\preferences.json
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    /// Get the path where the preference file should be stored
    fn default_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("apod-client");
        path.push("preferences.json");
        path
    }

    /// Get the path to the preference file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api_key(&self) -> String {
        self.lock().api_key.clone()
    }

    pub fn language(&self) -> String {
        self.lock().language.clone()
    }

    pub fn theme(&self) -> String {
        self.lock().theme.clone()
    }

    pub fn dark_mode(&self) -> bool {
        self.lock().dark_mode
    }

    pub fn last_viewed_date(&self) -> Option<String> {
        self.lock().last_viewed_date.clone()
    }

    pub fn first_run(&self) -> bool {
        self.lock().first_run
    }

    pub fn set_api_key(&self, api_key: &str) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.api_key = api_key.to_string();
        self.persist(&values)
    }

    pub fn set_language(&self, language: &str) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.language = language.to_string();
        self.persist(&values)
    }

    pub fn set_theme(&self, theme: &str) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.theme = theme.to_string();
        self.persist(&values)
    }

    pub fn set_dark_mode(&self, dark_mode: bool) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.dark_mode = dark_mode;
        self.persist(&values)
    }

    pub fn set_last_viewed_date(&self, date: &str) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.last_viewed_date = Some(date.to_string());
        self.persist(&values)
    }

    pub fn set_first_run(&self, first_run: bool) -> Result<(), PrefsError> {
        let mut values = self.lock();
        values.first_run = first_run;
        self.persist(&values)
    }

    /// Reset every setting to its default and persist the reset
    pub fn clear_all(&self) -> Result<(), PrefsError> {
        let mut values = self.lock();
        *values = PrefValues::default();
        self.persist(&values)
    }

    fn lock(&self) -> MutexGuard<'_, PrefValues> {
        self.values.lock().expect("preferences mutex poisoned")
    }

    /// Write the whole document; called with the lock held so writes
    /// never interleave
    fn persist(&self, values: &PrefValues) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

// Implement Debug by hand to keep the API key out of log output
impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let prefs = Preferences::open(dir.path().join("preferences.json"));

        assert_eq!(prefs.api_key(), DEFAULT_API_KEY);
        assert_eq!(prefs.language(), "en");
        assert_eq!(prefs.theme(), "system");
        assert!(!prefs.dark_mode());
        assert_eq!(prefs.last_viewed_date(), None);
        assert!(prefs.first_run());
    }

    #[test]
    fn test_set_and_reopen_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let prefs = Preferences::open(&path);
        prefs.set_api_key("my-key").unwrap();
        prefs.set_language("pt").unwrap();
        prefs.set_theme("dark").unwrap();
        prefs.set_dark_mode(true).unwrap();
        prefs.set_last_viewed_date("2020-01-01").unwrap();
        prefs.set_first_run(false).unwrap();

        let reopened = Preferences::open(&path);
        assert_eq!(reopened.api_key(), "my-key");
        assert_eq!(reopened.language(), "pt");
        assert_eq!(reopened.theme(), "dark");
        assert!(reopened.dark_mode());
        assert_eq!(reopened.last_viewed_date().as_deref(), Some("2020-01-01"));
        assert!(!reopened.first_run());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ this is not json").unwrap();

        let prefs = Preferences::open(&path);
        assert_eq!(prefs.api_key(), DEFAULT_API_KEY);
        assert!(prefs.first_run());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"language":"pt","unknown_key":42}"#).unwrap();

        let prefs = Preferences::open(&path);
        assert_eq!(prefs.language(), "pt");
        assert_eq!(prefs.theme(), "system");
        assert!(prefs.first_run());
    }

    #[test]
    fn test_clear_all_restores_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let prefs = Preferences::open(&path);
        prefs.set_api_key("my-key").unwrap();
        prefs.set_dark_mode(true).unwrap();
        prefs.clear_all().unwrap();

        assert_eq!(prefs.api_key(), DEFAULT_API_KEY);
        assert!(!prefs.dark_mode());

        let reopened = Preferences::open(&path);
        assert_eq!(reopened.api_key(), DEFAULT_API_KEY);
        assert!(!reopened.dark_mode());
    }

    #[test]
    fn test_concurrent_writers_of_different_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let prefs = Preferences::open(&path);

        // Each thread writes its own key; the document stays whole
        std::thread::scope(|scope| {
            scope.spawn(|| prefs.set_api_key("my-key").unwrap());
            scope.spawn(|| prefs.set_language("pt").unwrap());
            scope.spawn(|| prefs.set_theme("dark").unwrap());
            scope.spawn(|| prefs.set_dark_mode(true).unwrap());
            scope.spawn(|| prefs.set_last_viewed_date("2020-01-01").unwrap());
            scope.spawn(|| prefs.set_first_run(false).unwrap());
        });

        let reopened = Preferences::open(&path);
        assert_eq!(reopened.api_key(), "my-key");
        assert_eq!(reopened.language(), "pt");
        assert_eq!(reopened.theme(), "dark");
        assert!(reopened.dark_mode());
        assert_eq!(reopened.last_viewed_date().as_deref(), Some("2020-01-01"));
        assert!(!reopened.first_run());
    }
}
