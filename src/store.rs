// src/store.rs
// Key-value storage abstraction for the visitor gate.
// The hosting page supplies an origin-scoped persistent store (survives page
// reloads) for blacklist/attempt state, and may supply a separate
// session-scoped store for the post-redirect identifier.

/// Narrow storage contract. Implementations wrap whatever the host offers
/// (web storage, an extension store, an in-memory map in tests). Every error
/// is collapsed to `()`: callers degrade to empty/absent state, they never
/// surface storage faults to the visitor.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ()>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), ()>;
    fn delete(&self, key: &str) -> Result<(), ()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ()> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &[u8]) -> Result<(), ()> {
        (**self).set(key, value)
    }
    fn delete(&self, key: &str) -> Result<(), ()> {
        (**self).delete(key)
    }
}
