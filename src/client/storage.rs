//! Durable local client state: the bearer token and the theme preference.
//!
//! A small JSON file stands in for the browser's local storage. Read at
//! startup, token cleared on sign-out. Writes rewrite the whole file; the
//! state is two keys, not a database.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const TOKEN_KEY: &str = "auth_token";
const THEME_KEY: &str = "theme";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// File-backed key-value store for persisted client state.
#[derive(Debug, Clone)]
pub struct ClientStorage {
    path: PathBuf,
}

impl ClientStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.load()?;
        map.insert(key.to_owned(), value.to_owned());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }

    /// The persisted bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.get(TOKEN_KEY)
    }

    /// Persist the bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.set(TOKEN_KEY, token)
    }

    /// Drop the bearer token. Missing token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.remove(TOKEN_KEY)
    }

    /// The persisted theme; unknown or absent values fall back to default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn theme(&self) -> Result<Theme, StorageError> {
        Ok(self
            .get(THEME_KEY)?
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or_default())
    }

    /// Persist the theme preference. Survives sign-out.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.set(THEME_KEY, theme.as_str())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
