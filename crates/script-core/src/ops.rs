//! Operator definitions and constant-folding evaluation.
//!
//! `BinaryOp`/`UnaryOp` name the operators the language's expression grammar
//! exposes. [`eval_binary`], [`eval_unary`], and [`eval_cast`] implement
//! [`Constant::operation`](crate::constant::Constant::operation) and
//! [`Constant::cast`](crate::constant::Constant::cast) — the only place the
//! language's arithmetic and coercion rules are encoded.

use std::fmt;

use crate::arena::Arena;
use crate::constant::{Constant, ConstantData};
use crate::types::TypeKind;

/// Binary operators. Plain assignment and compound-assignment (`+=`, etc.)
/// are modeled at the AST level by [`crate::ast::BinOpKind`], not as a
/// member of this enum — arithmetic folding never needs to know whether a
/// node is an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    LogicalOr,
    /// `&&`
    LogicalAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            BitwiseAnd => "&",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
        };
        write!(f, "{s}")
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    LogicalNot,
    /// `~`
    BitwiseNot,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::BitwiseNot => "~",
        };
        write!(f, "{s}")
    }
}

fn bool_to_int(b: bool) -> i32 {
    if b {
        1
    } else {
        0
    }
}

/// Evaluate `lhs op rhs`, returning `None` when the operator is undefined
/// for this pair of operand types (e.g. bitwise-or on two vectors).
pub fn eval_binary<'a>(
    arena: &'a Arena,
    op: BinaryOp,
    lhs: &Constant<'a>,
    rhs: &Constant<'a>,
) -> Option<&'a Constant<'a>> {
    use ConstantData::*;

    match (lhs.data(), rhs.data(), op) {
        // Integer arithmetic / bitwise / comparisons.
        (Integer(a), Integer(b), _) => eval_integer(arena, op, *a, *b),

        // Float arithmetic and comparisons (integer operand promotes to float).
        (Float(a), Float(b), _) => eval_float(arena, op, *a, *b),
        (Integer(a), Float(b), _) => eval_float(arena, op, *a as f32, *b),
        (Float(a), Integer(b), _) => eval_float(arena, op, *a, *b as f32),

        // String concatenation and equality.
        (String(a), String(b), BinaryOp::Add) => {
            let mut bytes = Vec::with_capacity(a.len() + b.len());
            bytes.extend_from_slice(a);
            bytes.extend_from_slice(b);
            Some(Constant::string(arena, &bytes))
        }
        (String(a), String(b), BinaryOp::Equal) => {
            Some(Constant::integer(arena, bool_to_int(a == b)))
        }
        (String(a), String(b), BinaryOp::NotEqual) => {
            Some(Constant::integer(arena, bool_to_int(a != b)))
        }

        // Vector arithmetic.
        (Vector(ax, ay, az), Vector(bx, by, bz), BinaryOp::Add) => {
            Some(Constant::vector(arena, ax + bx, ay + by, az + bz))
        }
        (Vector(ax, ay, az), Vector(bx, by, bz), BinaryOp::Sub) => {
            Some(Constant::vector(arena, ax - bx, ay - by, az - bz))
        }
        (Vector(ax, ay, az), Vector(bx, by, bz), BinaryOp::Mul) => {
            // Dot product: vector * vector -> float.
            Some(Constant::float(arena, ax * bx + ay * by + az * bz))
        }
        (Vector(x, y, z), Float(s), BinaryOp::Mul) => {
            Some(Constant::vector(arena, x * s, y * s, z * s))
        }
        (Vector(x, y, z), Integer(s), BinaryOp::Mul) => {
            let s = *s as f32;
            Some(Constant::vector(arena, x * s, y * s, z * s))
        }
        (Vector(x, y, z), Float(s), BinaryOp::Div) => {
            Some(Constant::vector(arena, x / s, y / s, z / s))
        }
        (Vector(ax, ay, az), Vector(bx, by, bz), BinaryOp::Equal) => Some(Constant::integer(
            arena,
            bool_to_int(ax == bx && ay == by && az == bz),
        )),
        (Vector(ax, ay, az), Vector(bx, by, bz), BinaryOp::NotEqual) => Some(Constant::integer(
            arena,
            bool_to_int(!(ax == bx && ay == by && az == bz)),
        )),

        // Quaternion arithmetic.
        (Quaternion(ax, ay, az, as_), Quaternion(bx, by, bz, bs), BinaryOp::Mul) => {
            // Hamilton product.
            Some(Constant::quaternion(
                arena,
                as_ * bx + ax * bs + ay * bz - az * by,
                as_ * by - ax * bz + ay * bs + az * bx,
                as_ * bz + ax * by - ay * bx + az * bs,
                as_ * bs - ax * bx - ay * by - az * bz,
            ))
        }
        (Quaternion(ax, ay, az, aw), Quaternion(bx, by, bz, bw), BinaryOp::Equal) => {
            Some(Constant::integer(
                arena,
                bool_to_int(ax == bx && ay == by && az == bz && aw == bw),
            ))
        }

        _ => None,
    }
}

fn eval_integer<'a>(arena: &'a Arena, op: BinaryOp, a: i32, b: i32) -> Option<&'a Constant<'a>> {
    use BinaryOp::*;
    let result = match op {
        Add => a.wrapping_add(b),
        Sub => a.wrapping_sub(b),
        Mul => a.wrapping_mul(b),
        Div => {
            if b == 0 {
                return None;
            }
            a.wrapping_div(b)
        }
        Mod => {
            if b == 0 {
                return None;
            }
            a.wrapping_rem(b)
        }
        BitwiseOr => a | b,
        BitwiseXor => a ^ b,
        BitwiseAnd => a & b,
        ShiftLeft => a.wrapping_shl(b as u32 & 31),
        ShiftRight => a.wrapping_shr(b as u32 & 31),
        LogicalOr => bool_to_int(a != 0 || b != 0),
        LogicalAnd => bool_to_int(a != 0 && b != 0),
        Equal => bool_to_int(a == b),
        NotEqual => bool_to_int(a != b),
        Less => bool_to_int(a < b),
        LessEqual => bool_to_int(a <= b),
        Greater => bool_to_int(a > b),
        GreaterEqual => bool_to_int(a >= b),
    };
    Some(Constant::integer(arena, result))
}

fn eval_float<'a>(arena: &'a Arena, op: BinaryOp, a: f32, b: f32) -> Option<&'a Constant<'a>> {
    use BinaryOp::*;
    match op {
        Add => Some(Constant::float(arena, a + b)),
        Sub => Some(Constant::float(arena, a - b)),
        Mul => Some(Constant::float(arena, a * b)),
        Div => {
            if b == 0.0 {
                None
            } else {
                Some(Constant::float(arena, a / b))
            }
        }
        Mod => {
            if b == 0.0 {
                None
            } else {
                Some(Constant::float(arena, a % b))
            }
        }
        Equal => Some(Constant::integer(arena, bool_to_int(a == b))),
        NotEqual => Some(Constant::integer(arena, bool_to_int(a != b))),
        Less => Some(Constant::integer(arena, bool_to_int(a < b))),
        LessEqual => Some(Constant::integer(arena, bool_to_int(a <= b))),
        Greater => Some(Constant::integer(arena, bool_to_int(a > b))),
        GreaterEqual => Some(Constant::integer(arena, bool_to_int(a >= b))),
        // Bitwise / shift operators are not defined on floats.
        BitwiseOr | BitwiseXor | BitwiseAnd | ShiftLeft | ShiftRight | LogicalOr | LogicalAnd => {
            None
        }
    }
}

/// Evaluate a unary operator.
pub fn eval_unary<'a>(
    arena: &'a Arena,
    op: UnaryOp,
    operand: &Constant<'a>,
) -> Option<&'a Constant<'a>> {
    match (op, operand.data()) {
        (UnaryOp::Neg, ConstantData::Integer(v)) => {
            Some(Constant::integer(arena, v.wrapping_neg()))
        }
        (UnaryOp::Neg, ConstantData::Float(v)) => Some(Constant::float(arena, -v)),
        (UnaryOp::Neg, ConstantData::Vector(x, y, z)) => Some(Constant::vector(arena, -x, -y, -z)),
        (UnaryOp::Neg, ConstantData::Quaternion(x, y, z, s)) => {
            Some(Constant::quaternion(arena, -x, -y, -z, -s))
        }
        (UnaryOp::LogicalNot, ConstantData::Integer(v)) => {
            Some(Constant::integer(arena, bool_to_int(*v == 0)))
        }
        (UnaryOp::BitwiseNot, ConstantData::Integer(v)) => Some(Constant::integer(arena, !v)),
        _ => None,
    }
}

/// Evaluate a cast from `src`'s type to `target`. Returns `None` when the
/// cast is illegal, or legal-but-unfoldable (the two cases are
/// indistinguishable from this function's result alone — see
/// [`Constant::cast`](crate::constant::Constant::cast)).
pub fn eval_cast<'a>(
    arena: &'a Arena,
    src: &Constant<'a>,
    target: TypeKind,
) -> Option<&'a Constant<'a>> {
    use ConstantData::*;
    match (src.data(), target) {
        (Integer(v), TypeKind::Float) => Some(Constant::float(arena, *v as f32)),
        (Integer(v), TypeKind::String) => Some(Constant::string(arena, v.to_string().as_bytes())),
        (Integer(v), TypeKind::Integer) => Some(Constant::integer(arena, *v)),

        (Float(v), TypeKind::Integer) => Some(Constant::integer(arena, *v as i32)),
        (Float(v), TypeKind::String) => {
            Some(Constant::string(arena, format_float(*v).as_bytes()))
        }
        (Float(v), TypeKind::Float) => Some(Constant::float(arena, *v)),

        (String(bytes), TypeKind::Integer) => {
            let s = std::str::from_utf8(bytes).ok()?;
            s.trim()
                .parse::<i32>()
                .ok()
                .map(|v| Constant::integer(arena, v))
        }
        (String(bytes), TypeKind::Float) => {
            let s = std::str::from_utf8(bytes).ok()?;
            s.trim()
                .parse::<f32>()
                .ok()
                .map(|v| Constant::float(arena, v))
        }
        // string <-> key: identical byte representation, lossless both ways.
        (String(bytes), TypeKind::Key) => Some(Constant::key(arena, bytes)),
        (String(bytes), TypeKind::String) => Some(Constant::string(arena, bytes)),

        (Vector(..), TypeKind::String) => {
            Some(Constant::string(arena, format!("{src:?}").as_bytes()))
        }
        (Quaternion(..), TypeKind::String) => {
            Some(Constant::string(arena, format!("{src:?}").as_bytes()))
        }
        (List(_), TypeKind::String) => Some(Constant::string(arena, format!("{src:?}").as_bytes())),

        _ => None,
    }
}

fn format_float(v: f32) -> String {
    format!("{v:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_folds() {
        let arena = Arena::new();
        let a = Constant::integer(&arena, 2);
        let b = Constant::integer(&arena, 3);
        let sum = eval_binary(&arena, BinaryOp::Add, a, b).unwrap();
        match sum.data() {
            ConstantData::Integer(v) => assert_eq!(*v, 5),
            _ => panic!("expected integer"),
        }
    }

    #[test]
    fn division_by_zero_is_not_foldable() {
        let arena = Arena::new();
        let a = Constant::integer(&arena, 2);
        let zero = Constant::integer(&arena, 0);
        assert!(eval_binary(&arena, BinaryOp::Div, a, zero).is_none());
    }

    #[test]
    fn integer_to_float_cast() {
        let arena = Arena::new();
        let i = Constant::integer(&arena, 3);
        let f = eval_cast(&arena, i, TypeKind::Float).unwrap();
        match f.data() {
            ConstantData::Float(v) => assert_eq!(*v, 3.0),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn vector_negation() {
        let arena = Arena::new();
        let v = Constant::vector(&arena, 1.0, -2.0, 3.0);
        let neg = eval_unary(&arena, UnaryOp::Neg, v).unwrap();
        match neg.data() {
            ConstantData::Vector(x, y, z) => assert_eq!((*x, *y, *z), (-1.0, 2.0, -3.0)),
            _ => panic!("expected vector"),
        }
    }
}
