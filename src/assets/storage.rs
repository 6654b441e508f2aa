//! Registry tables
//!
//! One table per asset category, keyed by a stable identity. Table membership
//! is the only record of whether an asset is loaded.

use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::handle::ResourceHandle;

/// Outcome of releasing one reference to a key
#[derive(Debug)]
pub enum Release<T> {
    /// The key was not in the table
    Missing,
    /// Other holders remain; the asset stays loaded
    Retained(u32),
    /// The last holder let go; the asset was removed from the table
    Released(T),
}

/// Mapping from a category-specific key to a counted asset
#[derive(Debug)]
pub struct Registry<K, T> {
    /// Loaded assets indexed by their key
    entries: FxHashMap<K, ResourceHandle<T>>,
}

impl<K: Eq + Hash + Debug, T> Registry<K, T> {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Check whether a key is loaded
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Look up a loaded asset without touching its count
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(ResourceHandle::get)
    }

    /// Current count for a key, `None` if not loaded
    #[must_use]
    pub fn ref_count<Q>(&self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(ResourceHandle::ref_count)
    }

    /// Increment the count of an already loaded key.
    ///
    /// Returns the new count, or `None` if the key is absent.
    pub fn acquire<Q>(&mut self, key: &Q) -> Option<u32>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get_mut(key).map(ResourceHandle::acquire)
    }

    /// Insert a freshly loaded asset with a count of 1.
    ///
    /// Any previous entry for the key is returned.
    pub fn insert(&mut self, key: K, value: T) -> Option<T> {
        self.entries
            .insert(key, ResourceHandle::new(value))
            .map(ResourceHandle::into_inner)
    }

    /// Decrement the count of a key, removing it once no holders remain
    pub fn release<Q>(&mut self, key: &Q) -> Release<T>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(handle) = self.entries.get_mut(key) else {
            return Release::Missing;
        };

        let remaining = handle.release();
        if remaining > 0 {
            return Release::Retained(remaining);
        }

        match self.entries.remove(key) {
            Some(handle) => Release::Released(handle.into_inner()),
            None => Release::Missing,
        }
    }

    /// Remove a key regardless of its count.
    ///
    /// Returns the asset and the count it had.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<(T, u32)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|handle| {
            let count = handle.ref_count();
            (handle.into_inner(), count)
        })
    }

    /// Empty the table, yielding every key with its asset and remaining count
    pub fn drain(&mut self) -> impl Iterator<Item = (K, T, u32)> + '_ {
        self.entries.drain().map(|(key, handle)| {
            let count = handle.ref_count();
            (key, handle.into_inner(), count)
        })
    }

    /// Get the number of loaded assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Debug, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
