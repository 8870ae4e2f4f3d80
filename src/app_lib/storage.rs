//! "Previously signed in" hint. Only the user id is kept; the session itself
//! lives in the bearer token held by the `HttpClient` and in server cookies.

use super::errors::AppError;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::debug;

/// Stores the last authenticated user id in a file, or in memory when no
/// path is configured.
#[derive(Debug)]
pub struct UserIdHint {
    path: Option<PathBuf>,
    memory: Mutex<Option<String>>,
}

impl UserIdHint {
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            memory: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the stored user id, if any.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the hint file exists but cannot be read.
    pub fn load(&self) -> Result<Option<String>, AppError> {
        let Some(path) = &self.path else {
            return Ok(self
                .memory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone());
        };

        match fs::read_to_string(path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Storage(format!(
                "Failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    /// # Errors
    /// Returns `AppError::Storage` if the hint file cannot be written.
    pub fn store(&self, user_id: &str) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            *self.memory.lock().unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_string());
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                AppError::Storage(format!("Failed to create {}: {err}", parent.display()))
            })?;
        }

        fs::write(path, user_id)
            .map_err(|err| AppError::Storage(format!("Failed to write {}: {err}", path.display())))?;
        debug!(path = %path.display(), "stored user id hint");
        Ok(())
    }

    /// Removes the hint. Missing files are not an error.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the hint file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            *self.memory.lock().unwrap_or_else(PoisonError::into_inner) = None;
            return Ok(());
        };

        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!(
                "Failed to remove {}: {err}",
                path.display()
            ))),
        }
    }
}
