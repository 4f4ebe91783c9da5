//! One flat JSON file per wallet.
//!
//! A wallet named `alice` lives at `{dir}/alice.json`. Files are created
//! exclusively and never rewritten; the store has no update or delete.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stash_core::constants::WALLET_FILE_EXTENSION;
use stash_core::error::WalletError;
use stash_core::types::WalletRecord;
use tracing::{debug, info, warn};

/// Directory-backed wallet record store.
#[derive(Debug, Clone)]
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the wallet file for `name`, after checking the name is a
    /// single plain path component.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, WalletError> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{WALLET_FILE_EXTENSION}")))
    }

    /// Write `record` as a new wallet file, creating the directory if needed.
    ///
    /// Refuses to overwrite: an existing file yields
    /// [`WalletError::WalletAlreadyExists`] and is left untouched.
    pub fn create(&self, name: &str, record: &WalletRecord) -> Result<PathBuf, WalletError> {
        let path = self.path_for(name)?;

        fs::create_dir_all(&self.dir).map_err(|e| write_error(&path, e))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => WalletError::WalletAlreadyExists(path.clone()),
                _ => write_error(&path, e),
            })?;

        let mut json = serde_json::to_string_pretty(record)
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        json.push('\n');

        let written = file
            .write_all(json.as_bytes())
            .and_then(|()| file.sync_all());
        drop(file);
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %cleanup, "could not remove partial wallet file");
            }
            return Err(write_error(&path, e));
        }

        info!(path = %path.display(), address = %record.address, "wallet file created");
        Ok(path)
    }

    /// Read the wallet file for `name`.
    ///
    /// The record is returned as stored; callers validate it before use.
    pub fn load(&self, name: &str) -> Result<(PathBuf, WalletRecord), WalletError> {
        let path = self.path_for(name)?;
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => WalletError::WalletNotFound(path.clone()),
            _ => WalletError::Storage(format!("{}: {e}", path.display())),
        })?;

        let record: WalletRecord = serde_json::from_str(&contents).map_err(|e| {
            WalletError::InvalidWalletFormat(format!("malformed wallet file: {e}"))
        })?;
        debug!(path = %path.display(), "wallet file loaded");
        Ok((path, record))
    }
}

/// Reject names that are empty or would escape the wallet directory.
pub fn validate_name(name: &str) -> Result<(), WalletError> {
    if name.trim().is_empty() {
        return Err(WalletError::MissingArgument("wallet name".into()));
    }
    if name.contains(['/', '\\']) || name.contains("..") || name.contains('\0') {
        return Err(WalletError::InvalidWalletFormat(format!(
            "wallet name {name:?} must not contain path separators"
        )));
    }
    Ok(())
}

fn write_error(path: &Path, e: io::Error) -> WalletError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => WalletError::PermissionDenied(path.to_path_buf()),
        _ => WalletError::Storage(format!("{}: {e}", path.display())),
    }
}
