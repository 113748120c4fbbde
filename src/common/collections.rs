//! Hashing collections used throughout the crate. Keys are small ids, so the
//! non-cryptographic Fx hasher is the right trade.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
