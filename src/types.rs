///! Variable keys and discrete domains.
///!
///! A [`VarId`] is the position of a variable in its network. It is the only
///! handle the inference engines work with; names and labels are resolved once,
///! at the boundary.
use std::fmt;

/// A variable key (0-indexed position in the network).
///
/// # Invariants
///
/// - Keys are dense: a network of `n` variables uses exactly `0..n`.
/// - A key is only meaningful for the network that issued it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Creates a key from its raw index.
    pub const fn new(index: usize) -> Self {
        VarId(index)
    }

    /// Returns the raw index as a `usize`.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<VarId> for usize {
    fn from(var: VarId) -> Self {
        var.0
    }
}

impl From<usize> for VarId {
    fn from(index: usize) -> Self {
        VarId(index)
    }
}

/// A discrete random variable: a name and its ordered value labels.
///
/// Immutable once constructed. The position of a label in the domain is the
/// value index used by every table in the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    domain: Vec<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, domain: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Number of values in the domain.
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Index of the value labelled `label`, if present.
    pub fn value_key(&self, label: &str) -> Option<usize> {
        self.domain.iter().position(|v| v == label)
    }

    /// Label of the value at `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.domain.get(index).map(String::as_str)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}", self.name, self.domain.join(","))
    }
}
