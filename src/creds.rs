//! Credential cache.
//!
//! The transport owns the meaning of its authentication material; this side
//! only stores the blob durably and hands it back on reconnect. Rotations
//! are pushed by the transport and must survive a restart, so every update
//! is written through immediately, independent of message flow.

use crate::transport::CredentialBlob;
use std::io;
use std::path::PathBuf;

pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Last saved blob, if any. An unreadable or corrupt file means a fresh
    /// pairing, not a crash.
    pub fn load(&self) -> Option<CredentialBlob> {
        let bytes = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(blob) => Some(blob),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt credential blob");
                None
            }
        }
    }

    /// Write the blob through to disk. Temp-file-then-rename keeps a
    /// half-written blob from clobbering the previous good one.
    pub fn save(&self, creds: &CredentialBlob) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec(creds)?)?;
        std::fs::rename(&tmp, &self.path)
    }
}
