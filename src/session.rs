//! Tree operations, resolved against a current-directory cursor.
//!
//! One [`FsSession`] owns the node store and the cursor; every mutating
//! operation is all-or-nothing: on error the store is left exactly as it
//! was before the call.

use crate::error::FsError;
use crate::store::{Entry, EntryKind, NodeStore};
use crate::types::{EntryId, ROOT_ID};
use tracing::debug;

/// Outcome of a [`FsSession::touch`].
///
/// Unlike `mkdir`, touching an existing name is not an error: it refreshes
/// the entry's modification time instead of creating anything. This
/// asymmetry mirrors the conventional `touch` tool and is part of the
/// public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    Created(EntryId),
    Refreshed(EntryId),
}

/// A single-user session over the node store.
pub struct FsSession {
    store: NodeStore,
    cwd: EntryId,
}

impl Default for FsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FsSession {
    /// Session over a fresh store, cursor at the root.
    pub fn new() -> Self {
        Self::with_store(NodeStore::new())
    }

    /// Session over a loaded store. The cursor always starts at the root,
    /// regardless of where a previous session left off.
    pub fn with_store(store: NodeStore) -> Self {
        FsSession {
            store,
            cwd: ROOT_ID,
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn cwd(&self) -> EntryId {
        self.cwd
    }

    /// Create a directory in the current one. A sibling of the same name,
    /// file or directory, is a hard error and nothing is created.
    pub fn mkdir(&mut self, name: &str) -> Result<EntryId, FsError> {
        if self.store.child_by_name(self.cwd, name).is_some() {
            return Err(FsError::AlreadyExists(name.to_string()));
        }
        let id = self.store.create(name, EntryKind::Directory, self.cwd);
        debug!(name, id, "directory created");
        Ok(id)
    }

    /// Create a file in the current directory, or refresh the modification
    /// time of an existing sibling of that name (see [`TouchOutcome`]).
    pub fn touch(&mut self, name: &str) -> TouchOutcome {
        if let Some(existing) = self.store.child_by_name(self.cwd, name) {
            let id = existing.id;
            self.store.touch_modified(id);
            debug!(name, id, "file refreshed");
            return TouchOutcome::Refreshed(id);
        }
        let id = self.store.create(name, EntryKind::File, self.cwd);
        debug!(name, id, "file created");
        TouchOutcome::Created(id)
    }

    /// Direct children of the cursor, in insertion order. Restartable and
    /// side-effect free.
    pub fn list(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.store
            .get(self.cwd)
            .into_iter()
            .flat_map(|dir| dir.children.iter())
            .filter_map(move |id| self.store.get(*id))
    }

    /// Depth-first pre-order walk of the cursor's subtree, starting with
    /// the cursor itself at depth 0.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.store, self.cwd)
    }

    /// Change the current directory.
    ///
    /// `""` and `/` both jump to the root (an absent shell argument is
    /// passed down as `""`). `..` moves to the parent and is a no-op at the
    /// root. Anything else names a single direct child; multi-segment paths
    /// are not supported.
    pub fn cd(&mut self, path: &str) -> Result<(), FsError> {
        match path {
            "" | "/" => {
                self.cwd = ROOT_ID;
                Ok(())
            }
            ".." => {
                if self.cwd != ROOT_ID {
                    if let Some(entry) = self.store.get(self.cwd) {
                        self.cwd = entry.parent;
                    }
                }
                Ok(())
            }
            name => match self.store.child_by_name(self.cwd, name) {
                Some(child) if child.is_directory() => {
                    self.cwd = child.id;
                    Ok(())
                }
                _ => Err(FsError::NotFound(name.to_string())),
            },
        }
    }

    /// Remove a direct child. Directories must be empty. Returns the number
    /// of entries deleted from the store.
    pub fn rm(&mut self, name: &str) -> Result<usize, FsError> {
        let child = self
            .store
            .child_by_name(self.cwd, name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if child.is_directory() && !child.children.is_empty() {
            return Err(FsError::NotEmpty(name.to_string()));
        }
        let id = child.id;
        let removed = self.store.remove_subtree(id);
        debug!(name, removed, "entry removed");
        Ok(removed)
    }

    /// Rename a direct child in place. The new name must not collide with
    /// any sibling; on collision the store is untouched.
    pub fn mv(&mut self, old_name: &str, new_name: &str) -> Result<(), FsError> {
        let id = self
            .store
            .child_by_name(self.cwd, old_name)
            .map(|entry| entry.id)
            .ok_or_else(|| FsError::NotFound(old_name.to_string()))?;
        if self.store.child_by_name(self.cwd, new_name).is_some() {
            return Err(FsError::AlreadyExists(new_name.to_string()));
        }
        self.store.rename(id, new_name);
        self.store.touch_modified(self.cwd);
        debug!(old_name, new_name, "entry renamed");
        Ok(())
    }

    /// Replace a direct child's permission token. Only the length is
    /// validated: exactly 9 or exactly 3 characters.
    pub fn chmod(&mut self, name: &str, mode: &str) -> Result<(), FsError> {
        let id = self
            .store
            .child_by_name(self.cwd, name)
            .map(|entry| entry.id)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        if mode.len() != 9 && mode.len() != 3 {
            return Err(FsError::InvalidFormat(mode.to_string()));
        }
        self.store.set_permissions(id, mode);
        debug!(name, mode, "permissions changed");
        Ok(())
    }

    /// Absolute paths of every entry in the cursor's subtree whose name
    /// contains `pattern` as a literal, case-sensitive substring. An empty
    /// result means no matches.
    pub fn find(&self, pattern: &str) -> Vec<String> {
        self.walk()
            .filter_map(|(_, id)| self.store.get(id))
            .filter(|entry| entry.name.contains(pattern))
            .map(|entry| self.store.absolute_path(entry.id))
            .collect()
    }

    /// Absolute path of the current directory.
    pub fn pwd(&self) -> String {
        self.store.absolute_path(self.cwd)
    }
}

/// Restartable iterative pre-order traversal, yielding `(depth, id)`.
pub struct Walk<'a> {
    store: &'a NodeStore,
    stack: Vec<(usize, EntryId)>,
}

impl<'a> Walk<'a> {
    fn new(store: &'a NodeStore, start: EntryId) -> Self {
        Walk {
            store,
            stack: vec![(0, start)],
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = (usize, EntryId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        if let Some(entry) = self.store.get(id) {
            if entry.is_directory() {
                // Push in reverse so children come off the stack in
                // listing order.
                for &child in entry.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
            }
        }
        Some((depth, id))
    }
}
