//! Compile-time constant values.
//!
//! A [`Constant`] is a tagged value carrying a type and a payload. Constants
//! are arena-allocated and, for lists, chained together via an intrusive
//! sibling pointer rather than an owned `Vec` — the same linked-list shape
//! the AST itself uses for child sequences, so list constants can be built
//! without a second allocation strategy.

use std::cell::Cell;
use std::fmt;

use crate::arena::Arena;
use crate::ops::BinaryOp;
use crate::span::Span;
use crate::types::{Type, TypeKind, TypeRegistry};

/// The payload of a constant, discriminated by the constant's `ty`.
#[derive(Debug, Clone, Copy)]
pub enum ConstantData<'a> {
    Integer(i32),
    Float(f32),
    /// Raw string bytes, NUL-terminated per the language's string
    /// representation. Never contains an embedded NUL before the terminator.
    String(&'a [u8]),
    Vector(f32, f32, f32),
    Quaternion(f32, f32, f32, f32),
    /// The first element of a list; `None` for the empty list. Remaining
    /// elements are reached by following [`Constant::next`].
    List(Option<&'a Constant<'a>>),
}

/// A compile-time constant value, owned by the arena that allocated it.
pub struct Constant<'a> {
    ty: &'static Type,
    data: ConstantData<'a>,
    /// Next sibling when this constant is an element of a list constant.
    /// Unused (always `None`) for a constant that is not a list element.
    next: Cell<Option<&'a Constant<'a>>>,
}

impl<'a> Constant<'a> {
    fn new_in(arena: &'a Arena, ty: TypeKind, data: ConstantData<'a>) -> &'a Constant<'a> {
        arena.alloc(Constant {
            ty: TypeRegistry::get(ty),
            data,
            next: Cell::new(None),
        })
    }

    /// Allocate an integer constant.
    pub fn integer(arena: &'a Arena, value: i32) -> &'a Constant<'a> {
        Self::new_in(arena, TypeKind::Integer, ConstantData::Integer(value))
    }

    /// Allocate a float constant.
    pub fn float(arena: &'a Arena, value: f32) -> &'a Constant<'a> {
        Self::new_in(arena, TypeKind::Float, ConstantData::Float(value))
    }

    /// Allocate a string constant from raw bytes (no terminator included).
    pub fn string(arena: &'a Arena, bytes: &[u8]) -> &'a Constant<'a> {
        let copy = arena.alloc_bytes(bytes);
        Self::new_in(arena, TypeKind::String, ConstantData::String(copy))
    }

    /// Allocate a key constant (same representation as a string).
    pub fn key(arena: &'a Arena, bytes: &[u8]) -> &'a Constant<'a> {
        let copy = arena.alloc_bytes(bytes);
        Self::new_in(arena, TypeKind::Key, ConstantData::String(copy))
    }

    /// Allocate a vector constant.
    pub fn vector(arena: &'a Arena, x: f32, y: f32, z: f32) -> &'a Constant<'a> {
        Self::new_in(arena, TypeKind::Vector, ConstantData::Vector(x, y, z))
    }

    /// Allocate a quaternion constant.
    pub fn quaternion(arena: &'a Arena, x: f32, y: f32, z: f32, s: f32) -> &'a Constant<'a> {
        Self::new_in(
            arena,
            TypeKind::Quaternion,
            ConstantData::Quaternion(x, y, z, s),
        )
    }

    /// Allocate a list constant by chaining `elements` as siblings. Does not
    /// copy the elements; use [`Constant::copy`] first if the caller does
    /// not own them.
    pub fn list(arena: &'a Arena, elements: &[&'a Constant<'a>]) -> &'a Constant<'a> {
        for pair in elements.windows(2) {
            pair[0].next.set(Some(pair[1]));
        }
        if let Some(last) = elements.last() {
            last.next.set(None);
        }
        Self::new_in(
            arena,
            TypeKind::List,
            ConstantData::List(elements.first().copied()),
        )
    }

    /// This constant's type.
    pub fn get_type(&self) -> &'static Type {
        self.ty
    }

    /// The payload.
    pub fn data(&self) -> &ConstantData<'a> {
        &self.data
    }

    /// The next list-sibling, when this constant is itself a list element.
    pub fn next(&self) -> Option<&'a Constant<'a>> {
        self.next.get()
    }

    /// Iterate this constant's list elements (empty iterator if this is not
    /// a `List` constant or the list is empty).
    pub fn list_elements(&self) -> ListIter<'a> {
        let first = match self.data {
            ConstantData::List(first) => first,
            _ => None,
        };
        ListIter { next: first }
    }

    /// `false` for non-finite floats, or for vectors/quaternions containing
    /// one; `true` for every other constant kind (including lists, whose
    /// elements are not individually checked here — callers that need a
    /// deep check should walk `list_elements`).
    pub fn is_finite(&self) -> bool {
        match self.data {
            ConstantData::Float(f) => f.is_finite(),
            ConstantData::Vector(x, y, z) => x.is_finite() && y.is_finite() && z.is_finite(),
            ConstantData::Quaternion(x, y, z, s) => {
                x.is_finite() && y.is_finite() && z.is_finite() && s.is_finite()
            }
            _ => true,
        }
    }

    /// Deep-copy this constant (and, for lists, its elements) into `arena`.
    pub fn copy(&self, arena: &'a Arena) -> &'a Constant<'a> {
        match self.data {
            ConstantData::Integer(v) => Constant::integer(arena, v),
            ConstantData::Float(v) => Constant::float(arena, v),
            ConstantData::String(bytes) => Self::new_in(
                arena,
                self.ty.itype(),
                ConstantData::String(arena.alloc_bytes(bytes)),
            ),
            ConstantData::Vector(x, y, z) => Constant::vector(arena, x, y, z),
            ConstantData::Quaternion(x, y, z, s) => Constant::quaternion(arena, x, y, z, s),
            ConstantData::List(_) => {
                let copies: Vec<&Constant<'a>> =
                    self.list_elements().map(|e| e.copy(arena)).collect();
                Constant::list(arena, &copies)
            }
        }
    }

    /// Evaluate a unary or binary operator with `self` as the left operand.
    ///
    /// `rhs` is `None` for unary operators. Returns `None` when the
    /// operation is not defined for these operand types (the language-level
    /// legality of that is the type checker's concern, not this method's;
    /// this method only ever produces a value when the result is
    /// well-defined).
    pub fn operation(
        &self,
        op: BinaryOp,
        rhs: Option<&Constant<'a>>,
        arena: &'a Arena,
        _loc: Span,
    ) -> Option<&'a Constant<'a>> {
        crate::ops::eval_binary(arena, op, self, rhs?)
    }

    /// Evaluate a unary operator.
    pub fn unary(&self, op: crate::ops::UnaryOp, arena: &'a Arena) -> Option<&'a Constant<'a>> {
        crate::ops::eval_unary(arena, op, self)
    }

    /// Coerce this constant to `target`, per the language's cast rules.
    /// Returns `None` when the cast is illegal or not foldable at compile
    /// time (the caller cannot distinguish the two from the result alone;
    /// see §4.3 — that ambiguity is deliberate and mirrors the cast
    /// contract described by the specification).
    pub fn cast(&self, target: TypeKind, arena: &'a Arena) -> Option<&'a Constant<'a>> {
        crate::ops::eval_cast(arena, self, target)
    }
}

/// Iterator over a list constant's elements.
pub struct ListIter<'a> {
    next: Option<&'a Constant<'a>>,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Constant<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

impl fmt::Debug for Constant<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data {
            ConstantData::Integer(v) => write!(f, "{v}"),
            ConstantData::Float(v) => write!(f, "{v}"),
            ConstantData::String(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            ConstantData::Vector(x, y, z) => write!(f, "<{x}, {y}, {z}>"),
            ConstantData::Quaternion(x, y, z, s) => write!(f, "<{x}, {y}, {z}, {s}>"),
            ConstantData::List(_) => {
                write!(f, "[")?;
                for (i, e) in self.list_elements().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e:?}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_finite_detects_nan_vector() {
        let arena = Arena::new();
        let v = Constant::vector(&arena, 1.0, f32::NAN, 3.0);
        assert!(!v.is_finite());
        let ok = Constant::vector(&arena, 1.0, 2.0, 3.0);
        assert!(ok.is_finite());
    }

    #[test]
    fn list_chains_siblings() {
        let arena = Arena::new();
        let a = Constant::integer(&arena, 1);
        let b = Constant::integer(&arena, 2);
        let list = Constant::list(&arena, &[a, b]);
        let collected: Vec<i32> = list
            .list_elements()
            .map(|c| match c.data() {
                ConstantData::Integer(v) => *v,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(collected, vec![1, 2]);
    }

    #[test]
    fn copy_is_deep_for_lists() {
        let arena = Arena::new();
        let other = Arena::new();
        let a = Constant::integer(&arena, 7);
        let list = Constant::list(&arena, &[a]);
        let copied = list.copy(&other);
        assert_eq!(copied.list_elements().count(), 1);
    }
}
