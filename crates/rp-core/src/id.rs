use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for vertex labels.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned vertex label (`"v0"`, `"v17"`, ...).
///
/// Labels are the identity of a vertex: two `VertexId`s compare equal
/// exactly when their labels do, regardless of which graph instance or
/// wire frame produced them. 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexId(Spur);

impl VertexId {
    /// Intern a label, or return the existing id if already interned.
    pub fn intern(s: &str) -> Self {
        VertexId(INTERNER.get_or_intern(s))
    }

    /// Look up a label without interning it.
    /// Returns `None` if no vertex with this label was ever created.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(VertexId)
    }

    /// Resolve back to the label.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VertexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VertexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(VertexId::intern(&s))
    }
}
