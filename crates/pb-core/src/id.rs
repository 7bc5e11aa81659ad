use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner for component IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Process-wide counter behind every minted ID. Never reset, so an ID minted
/// once is never minted again, even after the node it named was deleted.
static COUNTER: AtomicU64 = AtomicU64::new(0);

/// An opaque, stable identifier for a component in the page tree.
/// Internally a 4-byte `Spur` index into the global interner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// The fixed ID of every document's root (page body).
    pub fn root() -> Self {
        Self::intern("root")
    }

    /// Mint a fresh ID with a type prefix (e.g. `section_4`, `button_12`).
    ///
    /// Callers that must avoid IDs loaded from a persisted document should
    /// go through `PageTree`, which re-mints on collision.
    pub fn with_prefix(prefix: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.as_str())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::intern(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_banner");
        let b = NodeId::intern("hero_banner");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_banner");
    }

    #[test]
    fn minted_ids_are_unique() {
        let a = NodeId::with_prefix("button");
        let b = NodeId::with_prefix("button");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("button_"));
    }

    #[test]
    fn display_uses_at_prefix() {
        assert_eq!(NodeId::root().to_string(), "@root");
    }
}
