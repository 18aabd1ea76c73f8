//! The primitive type registry.
//!
//! The script language has a small closed set of primitive types. Each is a
//! canonical singleton: two types are equal iff they are the same `&'static
//! Type`, never by structural comparison of a `TypeKind`.

use std::fmt;

/// The kind of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `null` / unit.
    Null,
    /// 32-bit signed integer.
    Integer,
    /// IEEE-754 single precision float.
    Float,
    /// UTF-8, NUL-terminated string.
    String,
    /// A string-shaped identifier, distinct from `String` for overload and
    /// cast purposes but represented the same way.
    Key,
    /// Three packed floats (x, y, z).
    Vector,
    /// Four packed floats (x, y, z, s).
    Quaternion,
    /// A heterogeneous, singly-linked sequence.
    List,
    /// The propagating bad-type, produced once a subtree fails to type-check.
    Error,
}

impl TypeKind {
    /// All primitive kinds, in registry order.
    pub const ALL: [TypeKind; 9] = [
        TypeKind::Null,
        TypeKind::Integer,
        TypeKind::Float,
        TypeKind::String,
        TypeKind::Key,
        TypeKind::Vector,
        TypeKind::Quaternion,
        TypeKind::List,
        TypeKind::Error,
    ];

    /// The textual name used in the builtin manifest grammar and in
    /// diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Null => "null",
            TypeKind::Integer => "integer",
            TypeKind::Float => "float",
            TypeKind::String => "string",
            TypeKind::Key => "key",
            TypeKind::Vector => "vector",
            TypeKind::Quaternion => "quaternion",
            TypeKind::List => "list",
            TypeKind::Error => "error",
        }
    }

    /// Parse a manifest/source type name back into a kind.
    pub fn from_name(name: &str) -> Option<TypeKind> {
        TypeKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether values of this type are represented as a run of 4-byte
    /// floats when pushed onto the VM stack (§4.6 of the bytecode contract).
    pub fn is_float_packed(self) -> bool {
        matches!(self, TypeKind::Vector | TypeKind::Quaternion)
    }
}

/// A canonical, process-wide singleton type.
///
/// Equality between two `&Type` references is always pointer identity;
/// `Type` does not implement `PartialEq` on its fields to make that the only
/// way to compare types.
pub struct Type {
    kind: TypeKind,
}

impl Type {
    /// Recover the kind this singleton represents.
    pub fn itype(&self) -> TypeKind {
        self.kind
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.kind.name())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())
    }
}

macro_rules! singleton {
    ($kind:ident) => {
        Type {
            kind: TypeKind::$kind,
        }
    };
}

static NULL: Type = singleton!(Null);
static INTEGER: Type = singleton!(Integer);
static FLOAT: Type = singleton!(Float);
static STRING: Type = singleton!(String);
static KEY: Type = singleton!(Key);
static VECTOR: Type = singleton!(Vector);
static QUATERNION: Type = singleton!(Quaternion);
static LIST: Type = singleton!(List);
static ERROR: Type = singleton!(Error);

/// The process-wide type registry. Thread-safe after initialization because
/// every singleton is a `static` with no interior mutability.
pub struct TypeRegistry;

impl TypeRegistry {
    /// Return the canonical singleton for `kind`.
    pub fn get(kind: TypeKind) -> &'static Type {
        match kind {
            TypeKind::Null => &NULL,
            TypeKind::Integer => &INTEGER,
            TypeKind::Float => &FLOAT,
            TypeKind::String => &STRING,
            TypeKind::Key => &KEY,
            TypeKind::Vector => &VECTOR,
            TypeKind::Quaternion => &QUATERNION,
            TypeKind::List => &LIST,
            TypeKind::Error => &ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_identity_comparable() {
        let a = TypeRegistry::get(TypeKind::Integer);
        let b = TypeRegistry::get(TypeKind::Integer);
        assert!(std::ptr::eq(a, b));

        let c = TypeRegistry::get(TypeKind::Float);
        assert!(!std::ptr::eq(a, c));
    }

    #[test]
    fn round_trips_through_name() {
        for kind in TypeKind::ALL {
            assert_eq!(TypeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TypeKind::from_name("bogus"), None);
    }
}
