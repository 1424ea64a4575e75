use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    /// Java's package-private visibility (no modifier).
    Package,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Package
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        })
    }
}

/// A type as written in a declaration, e.g. `java.util.List<String>` or `int[]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The type with all type arguments removed (`Map<K, V>[]` -> `Map[]`).
    pub fn erased(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut depth = 0usize;
        for ch in self.0.chars() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                _ if depth == 0 && !ch.is_whitespace() => out.push(ch),
                _ => {}
            }
        }
        out
    }

    /// The erased type without its package qualification.
    pub fn simple_name(&self) -> String {
        let erased = self.erased();
        match erased.rsplit_once('.') {
            Some((_, simple)) => simple.to_string(),
            None => erased,
        }
    }

    /// Equal after erasure, or one simple name is a capitalized suffix of the other
    /// (`List`/`ArrayList`, `Exception`/`IOException`).
    pub fn equals_with_sub_type(&self, other: &TypeRef) -> bool {
        let a = self.simple_name();
        let b = other.simple_name();
        if a == b {
            return true;
        }
        let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
        short.starts_with(|c: char| c.is_ascii_uppercase()) && long.ends_with(short.as_str())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
