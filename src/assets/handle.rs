//! Reference-counted resource handle
//!
//! Pairs an owned asset with the number of outstanding `load` calls for it.

/// An owned asset together with its access counter.
///
/// A handle is created with a count of 1. Every further `load` of the same
/// key calls [`ResourceHandle::acquire`], every `dispose` calls
/// [`ResourceHandle::release`]. The registry removes the handle in the same
/// step its count reaches 0, so a stored handle never reports 0.
#[derive(Debug)]
pub struct ResourceHandle<T> {
    /// The owned asset
    value: T,
    /// Outstanding load calls
    ref_count: u32,
}

impl<T> ResourceHandle<T> {
    /// Wrap a freshly loaded asset with a count of 1
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            ref_count: 1,
        }
    }

    /// Get a reference to the underlying asset
    #[must_use]
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Current access count
    #[must_use]
    pub const fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// Record another holder and return the new count
    pub fn acquire(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_add(1);
        self.ref_count
    }

    /// Drop one holder and return the remaining count
    pub fn release(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }

    /// Take the asset out of the handle
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> std::ops::Deref for ResourceHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
