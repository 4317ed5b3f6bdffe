//! Bookkeeping of implicit managed references.
//!
//! A managed peer of a ref-counted object holds one reference on it that no native
//! code knows about. It is taken when the peer is bound and dropped through the
//! unsafe decrement when the peer is disposed. The ledger records both sides so a
//! second drop is caught before it frees an object native code still holds.

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{runtime::ObjectId, Error, Result};

/// Per-object count of implicit managed references.
#[derive(Debug, Default)]
pub struct UnsafeRefLedger {
    references: DashMap<ObjectId, u32>,
}

impl UnsafeRefLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an implicit reference taken on behalf of a managed peer.
    pub fn post_unsafe_reference(&self, id: ObjectId) {
        *self.references.entry(id).or_insert(0) += 1;
    }

    /// Records that the implicit reference of `id` is about to be dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsafeReferenceUnderflow`] if no implicit reference is
    /// outstanding for `id`.
    pub fn pre_unsafe_unreference(&self, id: ObjectId) -> Result<()> {
        match self.references.entry(id) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() -= 1;
                if *entry.get() == 0 {
                    entry.remove();
                }
                Ok(())
            }
            Entry::Vacant(_) => Err(Error::UnsafeReferenceUnderflow(id)),
        }
    }

    /// Returns the number of outstanding implicit references of `id`.
    #[must_use]
    pub fn outstanding(&self, id: ObjectId) -> u32 {
        self.references.get(&id).map_or(0, |count| *count)
    }

    /// Discards the entry of a destroyed object.
    pub fn forget(&self, id: ObjectId) {
        self.references.remove(&id);
    }

    /// Returns the number of objects with outstanding implicit references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Returns `true` if no implicit references are outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
