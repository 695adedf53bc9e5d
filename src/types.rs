//! Core identifier types for the inode store.

/// EntryId: unique identifier of a filesystem entry within a session
pub type EntryId = u64;

/// Id of the root directory. The root is its own parent.
pub const ROOT_ID: EntryId = 0;
