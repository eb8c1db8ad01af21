//! Backing store for prowork
//!
//! State lives in a single per-user directory:
//!
//! ```text
//! ~/.prowork/                 # application directory (--home / PROWORK_HOME)
//!   config.toml               # optional settings
//!   tasks.json                # the task collection, rewritten in full on save
//! ```
//!
//! If the directory cannot be created the storage runs in-memory only: reads
//! come back empty and writes are skipped. Every write retries creating the
//! directory, so persistence resumes once the problem is fixed.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::{Error, Result};

/// Name of the application directory under the user's home
pub const APP_DIR: &str = ".prowork";

/// Default file name of the backing store
pub const TASKS_FILE: &str = "tasks.json";

/// Name of the optional settings file inside the application directory
pub const CONFIG_FILE: &str = "config.toml";

/// Storage manager for the task file
#[derive(Debug, Clone)]
pub struct Storage {
    /// Application directory
    app_dir: PathBuf,
    /// Full path to the backing store
    tasks_file: PathBuf,
    /// Whether the application directory exists and writes may proceed
    persistent: bool,
}

impl Storage {
    /// Open storage rooted at `app_dir`, creating the directory if needed.
    ///
    /// A directory that cannot be created is logged and leaves the storage in
    /// in-memory mode; it is never an error.
    pub fn open(app_dir: impl Into<PathBuf>, tasks_file_name: &str) -> Self {
        let app_dir = app_dir.into();
        let tasks_file = app_dir.join(tasks_file_name);
        let mut storage = Self {
            app_dir,
            tasks_file,
            persistent: false,
        };
        storage.persistent = storage.ensure_dir();
        tracing::debug!(path = %storage.tasks_file.display(), "tasks will be stored here");
        storage
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    /// Path to the application directory
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Path to the backing store
    pub fn tasks_file(&self) -> &Path {
        &self.tasks_file
    }

    /// Path to the settings file
    pub fn config_file(&self) -> PathBuf {
        self.app_dir.join(CONFIG_FILE)
    }

    /// False while running in-memory only
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    // =========================================================================
    // Reads and writes
    // =========================================================================

    /// Read the backing store. `None` when there is nothing to read.
    pub fn read_tasks_text(&self) -> Result<Option<String>> {
        if !self.persistent {
            tracing::debug!("storage is in-memory only; nothing to load");
            return Ok(None);
        }
        if !self.tasks_file.exists() {
            tracing::info!(path = %self.tasks_file.display(), "no tasks file found, starting empty");
            return Ok(None);
        }
        let text = fs::read_to_string(&self.tasks_file)?;
        Ok(Some(text))
    }

    /// Replace the backing store with `text`.
    ///
    /// Returns `Ok(false)` when the write was skipped because the storage is
    /// in-memory only.
    pub fn write_tasks_text(&mut self, text: &str) -> Result<bool> {
        if !self.persistent {
            self.persistent = self.ensure_dir();
            if !self.persistent {
                tracing::warn!(
                    path = %self.tasks_file.display(),
                    "storage unavailable; changes kept in memory only"
                );
                return Ok(false);
            }
        }
        write_atomic(&self.tasks_file, text.as_bytes())?;
        Ok(true)
    }

    fn ensure_dir(&self) -> bool {
        if self.app_dir.is_dir() {
            return true;
        }
        match fs::create_dir_all(&self.app_dir) {
            Ok(()) => {
                tracing::info!(path = %self.app_dir.display(), "created application directory");
                true
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.app_dir.display(),
                    error = %err,
                    "cannot create application directory; running in-memory only"
                );
                false
            }
        }
    }
}

/// The per-user application directory, `~/.prowork`.
///
/// Falls back to `./.prowork` when no home directory can be determined.
pub fn default_app_dir() -> PathBuf {
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(APP_DIR),
        None => {
            tracing::warn!("cannot determine home directory; using current directory");
            PathBuf::from(APP_DIR)
        }
    }
}

/// Write data atomically using temp file + rename
///
/// The temp file sits next to the target so the rename stays on one
/// filesystem. On failure the target keeps its previous contents and the temp
/// file is removed.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let result = (|| -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::WriteFailed {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ))
}
