// SPDX-License-Identifier: MIT

//! Property-list file backend.

use std::{
    ffi::CString,
    fs::{self, File, OpenOptions, Permissions},
    io::Write,
    os::{
        fd::AsRawFd,
        unix::{
            ffi::OsStrExt,
            fs::{MetadataExt, PermissionsExt},
        },
    },
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    core::{
        convert::{decode_store, encode_store, is_binary_plist},
        error::DockError,
        types::RawStore,
    },
    gateway::{DOCK_DOMAIN, PersistenceGateway, reload::LaunchAgent, write_with_dock_stopped},
};

/// Reads and writes a plist file directly.
///
/// Writes are atomic: the new contents go to a sibling temporary file that replaces the
/// original by rename, keeping its format (XML or binary), owner and mode.
#[derive(Debug, Clone)]
pub struct PlistFileGateway {
    path: PathBuf,
    reloader: Option<LaunchAgent>,
}

impl PlistFileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PlistFileGateway {
            path: path.into(),
            reloader: None,
        }
    }

    /// `~/Library/Preferences/com.apple.dock.plist`, reloading the Dock agent on save.
    pub fn dock() -> Result<Self, DockError> {
        let home = dirs::home_dir()
            .ok_or_else(|| DockError::StoreUnavailable("could not find home directory".into()))?;
        let path = home
            .join("Library/Preferences")
            .join(format!("{DOCK_DOMAIN}.plist"));
        Ok(Self::new(path).with_reloader(LaunchAgent::dock()))
    }

    pub fn with_reloader(mut self, agent: LaunchAgent) -> Self {
        self.reloader = Some(agent);
        self
    }

    pub fn without_reloader(mut self) -> Self {
        self.reloader = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> DockError {
        DockError::StoreWrite(format!("{}: {e}", self.path.display()))
    }

    /// Writes `buf` next to the target and renames it into place.
    fn replace_contents(&self, buf: &[u8], orig: Option<&fs::Metadata>) -> Result<(), DockError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| DockError::StoreWrite("invalid path: no parent directory".into()))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| DockError::StoreWrite("invalid path: no file name".into()))?;
        let tmp_path = dir.join(format!("{}.tmp", file_name.to_string_lossy()));

        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp_file.write_all(buf).map_err(|e| self.io_error(e))?;
        tmp_file.sync_all().map_err(|e| self.io_error(e))?;

        if let Some(meta) = orig {
            if let Err(e) = restore_ownership(&tmp_path, meta.uid(), meta.gid()) {
                debug!("could not restore ownership of {}: {e}", self.path.display());
            }
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(e));
        }

        if let Some(meta) = orig {
            fs::set_permissions(&self.path, meta.permissions()).map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn write_locked(&self, store: &RawStore) -> Result<(), DockError> {
        // exclusive lock on the existing file while it is replaced
        let guard = OpenOptions::new().read(true).open(&self.path).ok();
        if let Some(file) = &guard {
            // safety: the descriptor stays open for as long as `guard` lives
            unsafe {
                libc::flock(file.as_raw_fd(), libc::LOCK_EX);
            }
        }

        let orig = fs::metadata(&self.path).ok();
        let is_binary = match &guard {
            Some(_) => fs::read(&self.path)
                .map(|buf| is_binary_plist(&buf))
                .unwrap_or(false),
            None => false,
        };

        let buf = encode_store(store, is_binary)?;
        let result = self.replace_contents(&buf, orig.as_ref());

        if let Some(file) = &guard {
            // safety: matching the flock above
            unsafe {
                libc::flock(file.as_raw_fd(), libc::LOCK_UN);
            }
        }

        result?;
        debug!(
            "wrote {} keys to {} ({})",
            store.len(),
            self.path.display(),
            if is_binary { "binary" } else { "xml" }
        );
        Ok(())
    }
}

impl PersistenceGateway for PlistFileGateway {
    fn read(&self) -> Result<RawStore, DockError> {
        let buf = fs::read(&self.path)
            .map_err(|e| DockError::StoreUnavailable(format!("{}: {e}", self.path.display())))?;
        debug!("read {} bytes from {}", buf.len(), self.path.display());
        decode_store(&buf)
    }

    fn write(&self, store: &RawStore) -> Result<(), DockError> {
        write_with_dock_stopped(self.reloader.as_ref(), || self.write_locked(store))
    }

    fn notify_consumer_reload(&self) -> Result<(), DockError> {
        match &self.reloader {
            Some(agent) => agent.bootstrap(),
            None => Ok(()),
        }
    }
}

/// Restores file ownership to the given uid/gid, keeping the file mode.
fn restore_ownership(path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
    let mode = fs::metadata(path)?.permissions().mode();
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // safety: c_path is a valid nul-terminated string
    let res = unsafe { libc::chown(c_path.as_ptr(), uid as libc::uid_t, gid as libc::gid_t) };
    if res != 0 {
        return Err(std::io::Error::last_os_error());
    }
    fs::set_permissions(path, Permissions::from_mode(mode))
}
