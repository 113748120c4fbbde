use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a session owned by the process backend. Ids are opaque,
/// stable, and unique across the whole multiplexer; this crate never looks
/// inside the session itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(raw: u64) -> Self { Self(raw) }

    pub fn raw(self) -> u64 { self.0 }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "s{}", self.0) }
}
