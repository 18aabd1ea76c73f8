//! The six end-to-end scenarios, exercised against real parsed source text
//! rather than hand-built synthetic trees, since that is the level at which
//! they are actually specified.

use script_core::ast::NodeKind;
use script_core::{Arena, ConstantData, DiagnosticCode};
use scriptc::{OpCode, Session, SimplifierFlags};

fn first_global<'a>(root: &'a script_core::ast::Node<'a>) -> &'a script_core::ast::Node<'a> {
    let storage = root.children().next().expect("at least one global_storage");
    storage.children().next().expect("global_storage wraps one node")
}

#[test]
fn constant_folding() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session.parse("integer N = 2 + 3 * 4;").unwrap();
    let output = session.compile(root, SimplifierFlags::default());

    assert!(session.is_sane());

    let n = first_global(root);
    let initializer = n.children().next().unwrap();
    assert_eq!(initializer.kind, NodeKind::ConstantExpression);
    match initializer.constant_value().unwrap().data() {
        ConstantData::Integer(v) => assert_eq!(*v, 14),
        other => panic!("expected integer, got {other:?}"),
    }
    assert!(output.folded_total >= 1);
}

#[test]
fn global_reference_ordering_forward() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session.parse("integer A = 5; integer B = A;").unwrap();
    session.compile(root, SimplifierFlags::default());

    assert!(session.is_sane());

    let mut globals = root.children().map(first_global);
    let a = globals.next().unwrap();
    let b = globals.next().unwrap();
    let a_symbol = a.symbol().unwrap();
    let b_symbol = b.symbol().unwrap();
    match a_symbol.constant_value().unwrap().data() {
        ConstantData::Integer(v) => assert_eq!(*v, 5),
        other => panic!("expected integer, got {other:?}"),
    }
    match b_symbol.constant_value().unwrap().data() {
        ConstantData::Integer(v) => assert_eq!(*v, 5),
        other => panic!("expected integer, got {other:?}"),
    }
}

#[test]
fn global_reference_ordering_reversed_is_rejected() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session.parse("integer B = A; integer A = 5;").unwrap();
    session.compile(root, SimplifierFlags::default());

    assert!(!session.is_sane());

    let mut globals = root.children().map(first_global);
    let b = globals.next().unwrap();
    let b_symbol = b.symbol().unwrap();
    assert!(b_symbol.constant_value().is_none());

    let diagnostics = session.diagnostics();
    assert!(diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::GlobalInitializerNotConstant));
}

#[test]
fn vector_member_fold() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session
        .parse("vector V = <1.0, 2.0, 3.0>; float F = V.y;")
        .unwrap();
    session.compile(root, SimplifierFlags::default());

    assert!(session.is_sane());

    let f = root.children().nth(1).map(first_global).unwrap();
    let f_symbol = f.symbol().unwrap();
    match f_symbol.constant_value().unwrap().data() {
        ConstantData::Float(v) => assert_eq!(*v, 2.0),
        other => panic!("expected float, got {other:?}"),
    }
}

#[test]
fn illegal_simple_assignable_is_flagged() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session
        .parse("integer someFunc() { return 1; } integer X = someFunc();")
        .unwrap();
    session.compile(root, SimplifierFlags::default());

    assert!(!session.is_sane());
    let diagnostics = session.diagnostics();
    assert!(diagnostics
        .iter()
        .any(|d| d.code == DiagnosticCode::GlobalInitializerNotConstant));
}

#[test]
fn jump_patching_exact_offset() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session
        .parse("integer f() { jump L; integer U = 1; @L; return 0; }")
        .unwrap();
    let output = session.compile(root, SimplifierFlags::default());

    assert!(session.is_sane());
    let code = &output.functions[0].code;
    assert_eq!(code[0], OpCode::Jump.as_u8());
    let offset = i32::from_be_bytes([code[1], code[2], code[3], code[4]]);
    // `integer U = 1;` compiles to 6 bytes (push + 4-byte payload + pop), so
    // the jump lands on the label exactly 6 bytes past the operand.
    assert_eq!(offset, 6);
}

#[test]
fn unused_local_pruning() {
    let arena = Arena::new();
    let session = Session::new(&arena);
    let root = session
        .parse("default { state_entry() { integer U = 1; } }")
        .unwrap();
    let output = session.compile(root, SimplifierFlags::default());

    assert!(session.is_sane());
    assert_eq!(output.folded_total, 1);

    let state = root.children().next().unwrap();
    let handler = state.children().next().unwrap();
    let body = handler.children().last().unwrap();
    assert!(body.children().next().is_none());
}
