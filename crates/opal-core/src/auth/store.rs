//! Persistence boundary for [`AuthRecord`]s.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::AuthRecord;

/// Errors from loading or saving an auth record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing has been stored yet.
    #[error("no auth record found at {location}")]
    NotFound { location: String },

    /// The backing file is readable or writable by group/other.
    #[error("security check failed on {path}: mode is {mode:04o}; it should not be accessible by group/other")]
    InsecurePermissions { path: PathBuf, mode: u32 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stored content exists but is not a valid auth record.
    #[error("bad auth record in {location}: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize auth record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("keychain error: {0}")]
    Keychain(#[from] keyring::Error),
}

/// Loads and saves authentication information.
///
/// Implementations do no locking; callers sharing one store between
/// sessions must serialize their saves.
pub trait AuthStore {
    fn load(&self) -> Result<AuthRecord, StoreError>;
    fn save(&self, record: &AuthRecord) -> Result<(), StoreError>;
}

impl<S: AuthStore + ?Sized> AuthStore for Box<S> {
    fn load(&self) -> Result<AuthRecord, StoreError> {
        (**self).load()
    }

    fn save(&self, record: &AuthRecord) -> Result<(), StoreError> {
        (**self).save(record)
    }
}

/// Stores the auth record as JSON in a single owner-only file.
#[derive(Debug, Clone)]
pub struct FileAuthStore {
    path: PathBuf,
}

impl FileAuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound {
                location: self.path.display().to_string(),
            }
        } else {
            StoreError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }

    #[cfg(unix)]
    fn check_permissions(&self) -> Result<(), StoreError> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(&self.path).map_err(|e| self.io_error(e))?;
        let mode = metadata.permissions().mode() & 0o7777;
        if mode & 0o077 != 0 {
            return Err(StoreError::InsecurePermissions {
                path: self.path.clone(),
                mode,
            });
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(&self) -> Result<(), StoreError> {
        fs::metadata(&self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl AuthStore for FileAuthStore {
    fn load(&self) -> Result<AuthRecord, StoreError> {
        self.check_permissions()?;

        let raw = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        let record: AuthRecord =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                location: self.path.display().to_string(),
                source,
            })?;

        debug!(path = %self.path.display(), cookies = record.cookies.len(), "Loaded auth record");
        Ok(record)
    }

    fn save(&self, record: &AuthRecord) -> Result<(), StoreError> {
        // Serialize fully before touching the file
        let contents = serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?;
        write_owner_only(&self.path, &contents).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), cookies = record.cookies.len(), "Saved auth record");
        Ok(())
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; tighten a pre-existing file too
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(path, contents)
}
