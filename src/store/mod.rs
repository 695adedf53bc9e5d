//! Node Store
//!
//! The authoritative collection of filesystem entries, keyed by id. Every
//! mutation of an entry flows through this store; the tree operations in
//! [`crate::session`] navigate it from the current-directory cursor.

pub mod persistence;

use crate::types::{EntryId, ROOT_ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default permission token for freshly created entries.
pub const DEFAULT_PERMISSIONS: &str = "rwxr-xr-x";

/// Entry kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single filesystem entry (the inode-equivalent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Unique among siblings only, not globally.
    pub name: String,
    pub kind: EntryKind,
    /// Byte count. Never derived from content; there is no content model.
    pub size: u64,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Bumped whenever the entry or its directory listing changes.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub modified_at: DateTime<Utc>,
    /// Short permission token, conventionally 9 or 3 characters.
    pub permissions: String,
    /// Ordered child ids; meaningful for directories only. Insertion
    /// order is display and traversal order.
    pub children: Vec<EntryId>,
    /// Containing directory. The root is its own parent.
    pub parent: EntryId,
}

impl Entry {
    fn new(id: EntryId, name: &str, kind: EntryKind, parent: EntryId) -> Self {
        let now = Utc::now();
        Entry {
            id,
            name: name.to_string(),
            kind,
            size: 0,
            created_at: now,
            modified_at: now,
            permissions: DEFAULT_PERMISSIONS.to_string(),
            children: Vec::new(),
            parent,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Id-keyed entry map plus the monotonic id allocator.
///
/// Ids are never reused while the store is loaded: `next_id` stays strictly
/// greater than every id ever observed, including ids read from a snapshot.
#[derive(Debug, Clone)]
pub struct NodeStore {
    entries: HashMap<EntryId, Entry>,
    next_id: EntryId,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Fresh store containing only the root directory.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(ROOT_ID, Entry::new(ROOT_ID, "/", EntryKind::Directory, ROOT_ID));
        NodeStore {
            entries,
            next_id: ROOT_ID + 1,
        }
    }

    /// Rebuild a store from persisted entries, recomputing the id counter
    /// as one greater than the maximum id seen.
    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        let mut max_id = ROOT_ID;
        for entry in entries {
            max_id = max_id.max(entry.id);
            map.insert(entry.id, entry);
        }
        NodeStore {
            entries: map,
            next_id: max_id + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.get_mut(&id)
    }

    /// All entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Find a direct child of `parent` by exact name.
    pub fn child_by_name(&self, parent: EntryId, name: &str) -> Option<&Entry> {
        let dir = self.entries.get(&parent)?;
        dir.children
            .iter()
            .filter_map(|id| self.entries.get(id))
            .find(|entry| entry.name == name)
    }

    /// Create a new entry under `parent`, appending it to the parent's
    /// child list and bumping the parent's modification time.
    pub(crate) fn create(&mut self, name: &str, kind: EntryKind, parent: EntryId) -> EntryId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Entry::new(id, name, kind, parent));
        if let Some(dir) = self.entries.get_mut(&parent) {
            dir.children.push(id);
            dir.modified_at = Utc::now();
        }
        id
    }

    pub(crate) fn touch_modified(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.modified_at = Utc::now();
        }
    }

    pub(crate) fn rename(&mut self, id: EntryId, name: &str) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.name = name.to_string();
            entry.modified_at = Utc::now();
        }
    }

    pub(crate) fn set_permissions(&mut self, id: EntryId, mode: &str) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.permissions = mode.to_string();
            entry.modified_at = Utc::now();
        }
    }

    /// Detach `id` from its parent and delete it together with its entire
    /// subtree. The traversal uses an explicit worklist so arbitrarily deep
    /// trees cannot exhaust the call stack. Returns the number of entries
    /// removed.
    pub(crate) fn remove_subtree(&mut self, id: EntryId) -> usize {
        if let Some(parent_id) = self.entries.get(&id).map(|entry| entry.parent) {
            if let Some(parent) = self.entries.get_mut(&parent_id) {
                parent.children.retain(|&child| child != id);
                parent.modified_at = Utc::now();
            }
        }
        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(entry) = self.entries.remove(&next) {
                pending.extend(entry.children);
                removed += 1;
            }
        }
        removed
    }

    /// Absolute path of `id`: `/` for the root, otherwise the names
    /// collected while walking parent links up to the root, reversed and
    /// joined with `/`.
    ///
    /// Terminates because parent chains are acyclic: every non-root entry
    /// is reachable from the root in as many hops as its depth.
    pub fn absolute_path(&self, id: EntryId) -> String {
        if id == ROOT_ID {
            return "/".to_string();
        }
        let mut parts = Vec::new();
        let mut current = id;
        while current != ROOT_ID {
            match self.entries.get(&current) {
                Some(entry) => {
                    parts.push(entry.name.as_str());
                    current = entry.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }
}
