//! Snapshot persistence
//!
//! Serializes the full node store to a single binary snapshot file and
//! rebuilds it on startup. The layout is a 4-byte magic, a little-endian
//! u16 format version, then the bincode-encoded entry list: a
//! count-prefixed sequence of records with length-prefixed name and
//! permission strings, a count-prefixed child-id list, and timestamps as
//! Unix seconds. The id counter is not persisted; it is recomputed on load.

use crate::error::FsError;
use crate::store::{Entry, NodeStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAGIC: [u8; 4] = *b"INFS";
const VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Handle on the snapshot file the store is flushed to between sessions.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the entire store. An unwritable target surfaces as
    /// [`FsError::Persistence`]; the in-memory store is unaffected either way.
    pub fn save(&self, store: &NodeStore) -> Result<(), FsError> {
        let mut entries: Vec<&Entry> = store.entries().collect();
        entries.sort_by_key(|entry| entry.id);

        let body =
            bincode::serialize(&entries).map_err(|e| FsError::Snapshot(e.to_string()))?;
        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&VERSION.to_le_bytes());
        buf.extend_from_slice(&body);
        fs::write(&self.path, buf)?;

        debug!(path = %self.path.display(), entries = store.len(), "snapshot written");
        Ok(())
    }

    /// Load a store from the snapshot. A missing file is not an error: the
    /// result is a fresh tree containing only the root.
    pub fn load(&self) -> Result<NodeStore, FsError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot found, starting fresh");
                return Ok(NodeStore::new());
            }
            Err(e) => return Err(FsError::Persistence(e)),
        };

        if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
            return Err(FsError::Snapshot("unrecognized snapshot header".into()));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(FsError::Snapshot(format!(
                "unsupported snapshot version {version}"
            )));
        }

        let entries: Vec<Entry> = bincode::deserialize(&bytes[HEADER_LEN..])
            .map_err(|e| FsError::Snapshot(e.to_string()))?;
        debug!(path = %self.path.display(), entries = entries.len(), "snapshot loaded");
        Ok(NodeStore::from_entries(entries))
    }
}
