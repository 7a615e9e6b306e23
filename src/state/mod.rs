/// State management module
///
/// This module handles all persistent application state, including:
/// - The saved-image database and its live list query (library.rs)
/// - Shared data structures (data.rs)
/// - User preferences (prefs.rs)

pub mod library;
pub mod data;
pub mod prefs;
