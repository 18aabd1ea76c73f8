//! The bytecode opcode set.
//!
//! Scoped to exactly what the external interface contract names: a
//! push/pop pair per runtime type, an unconditional jump, and a return.
//! There is deliberately no conditional-branch opcode — control-flow
//! statements (`if`/`while`/`do`/`for`) are lowered by structurally
//! recursing into their children rather than synthesizing a test-and-branch
//! sequence, so no opcode here represents a conditional test. `List`-typed
//! values never reach this stage either: the simplifier never folds a list
//! expression into a `ConstantExpression`, so there is no literal to push.

use script_core::TypeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    PushInteger = 0x01,
    PushFloat = 0x02,
    PushString = 0x03,
    PushVector = 0x04,
    PushQuaternion = 0x05,
    PopInteger = 0x10,
    PopFloat = 0x11,
    PopString = 0x12,
    PopVector = 0x13,
    PopQuaternion = 0x14,
    PopNull = 0x15,
    Jump = 0x20,
    Return = 0x21,
}

impl OpCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The `push_<type>` opcode for a literal of runtime type `kind`, or
    /// `None` for types with no literal form (`Null`, `List`, `Error`). Key
    /// constants push as strings; the two share a wire representation.
    pub fn push_for(kind: TypeKind) -> Option<OpCode> {
        match kind {
            TypeKind::Integer => Some(OpCode::PushInteger),
            TypeKind::Float => Some(OpCode::PushFloat),
            TypeKind::String | TypeKind::Key => Some(OpCode::PushString),
            TypeKind::Vector => Some(OpCode::PushVector),
            TypeKind::Quaternion => Some(OpCode::PushQuaternion),
            TypeKind::Null | TypeKind::List | TypeKind::Error => None,
        }
    }

    /// The `pop_<type>` opcode discarding an expression-statement result of
    /// runtime type `kind`.
    pub fn pop_for(kind: TypeKind) -> OpCode {
        match kind {
            TypeKind::Integer => OpCode::PopInteger,
            TypeKind::Float => OpCode::PopFloat,
            TypeKind::String | TypeKind::Key => OpCode::PopString,
            TypeKind::Vector => OpCode::PopVector,
            TypeKind::Quaternion => OpCode::PopQuaternion,
            TypeKind::Null | TypeKind::List | TypeKind::Error => OpCode::PopNull,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_string_share_opcodes() {
        assert_eq!(OpCode::push_for(TypeKind::Key), OpCode::push_for(TypeKind::String));
        assert_eq!(OpCode::pop_for(TypeKind::Key), OpCode::pop_for(TypeKind::String));
    }

    #[test]
    fn list_has_no_push_opcode() {
        assert_eq!(OpCode::push_for(TypeKind::List), None);
    }
}
