//! Entity trait: identity + continuity across state changes.

use crate::id::RecordId;

/// A record mirrored from the remote record service.
///
/// Equality of identity is by `id()`, never by field values: an update
/// replaces the entry whose identifier matches.
pub trait Entity {
    /// Returns the server-assigned identifier.
    fn id(&self) -> RecordId;
}
