//! Symbols and lexical symbol tables.

use std::cell::{Cell, RefCell};
use std::fmt;

use rustc_hash::FxHashMap;

use crate::ast::Node;
use crate::constant::Constant;
use crate::types::Type;

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
    Event,
    Label,
}

/// Where a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolSubKind {
    Local,
    Global,
    Builtin,
    Parameter,
}

/// One parameter of a function or event signature.
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: &'static Type,
}

/// An ordered parameter list plus return type, for `function`/`event`
/// symbols.
#[derive(Debug, Clone, Copy)]
pub struct FunctionSignature<'a> {
    pub return_type: &'static Type,
    pub params: &'a [Param<'a>],
}

/// A declared name: a variable, function, event, or label.
pub struct Symbol<'a> {
    pub name: &'a str,
    pub ty: &'static Type,
    pub kind: SymbolKind,
    pub sub_kind: SymbolSubKind,
    pub signature: Option<FunctionSignature<'a>>,
    constant_value: RefCell<Option<&'a Constant<'a>>>,
    /// Back-reference to the declaring node. `None` for builtins, which have
    /// no AST node of their own.
    pub declaring_node: Cell<Option<&'a Node<'a>>>,
    /// Number of lvalue reads, including the declaration itself — so an
    /// unreferenced local starts at 1, never 0.
    references: Cell<u32>,
    /// Number of writes, excluding the initializer.
    assignments: Cell<u32>,
    /// Set when this symbol's value is statically indeterminable for a
    /// structural reason (unresolved type, upstream error), as opposed to
    /// merely lacking a constant value.
    constant_precluded: Cell<bool>,
}

impl<'a> Symbol<'a> {
    /// Construct a new symbol. `references` starts at 1 to account for the
    /// declaration itself.
    pub fn new(
        name: &'a str,
        ty: &'static Type,
        kind: SymbolKind,
        sub_kind: SymbolSubKind,
    ) -> Symbol<'a> {
        Symbol {
            name,
            ty,
            kind,
            sub_kind,
            signature: None,
            constant_value: RefCell::new(None),
            declaring_node: Cell::new(None),
            references: Cell::new(1),
            assignments: Cell::new(0),
            constant_precluded: Cell::new(false),
        }
    }

    pub fn with_signature(mut self, signature: FunctionSignature<'a>) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn is_builtin(&self) -> bool {
        self.sub_kind == SymbolSubKind::Builtin
    }

    pub fn constant_value(&self) -> Option<&'a Constant<'a>> {
        *self.constant_value.borrow()
    }

    pub fn set_constant_value(&self, value: Option<&'a Constant<'a>>) {
        *self.constant_value.borrow_mut() = value;
    }

    pub fn constant_precluded(&self) -> bool {
        self.constant_precluded.get()
    }

    pub fn set_constant_precluded(&self, precluded: bool) {
        self.constant_precluded.set(precluded);
    }

    pub fn references(&self) -> u32 {
        self.references.get()
    }

    pub fn assignments(&self) -> u32 {
        self.assignments.get()
    }

    /// Record one more lvalue read of this symbol.
    pub fn add_reference(&self) {
        self.references.set(self.references.get() + 1);
    }

    /// Record one more write to this symbol.
    pub fn add_assignment(&self) {
        self.assignments.set(self.assignments.get() + 1);
    }

    /// Whether this symbol is referenced exactly once: the declaration, and
    /// nothing else. Used by the simplifier's unused-declaration pruning.
    pub fn is_unreferenced(&self) -> bool {
        self.references.get() == 1
    }
}

impl fmt::Debug for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Symbol({:?} {} : {}, refs={}, assigns={})",
            self.kind,
            self.name,
            self.ty,
            self.references.get(),
            self.assignments.get()
        )
    }
}

/// A lexical scope's symbol table: a mapping from `(name, kind)` to symbol.
///
/// Every script owns a root table; every function, state, event, and
/// compound statement owns a nested table reachable from the root by
/// walking `parent` links on the owning AST node.
#[derive(Default)]
pub struct SymbolTable<'a> {
    symbols: RefCell<FxHashMap<(&'a str, SymbolKind), &'a Symbol<'a>>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self {
            symbols: RefCell::new(FxHashMap::default()),
        }
    }

    /// Define `symbol` in this scope. Returns the symbol that was previously
    /// defined under the same `(name, kind)`, if any (a redeclaration —
    /// diagnosing that is the caller's responsibility, this table just
    /// overwrites).
    pub fn define(&self, symbol: &'a Symbol<'a>) -> Option<&'a Symbol<'a>> {
        self.symbols
            .borrow_mut()
            .insert((symbol.name, symbol.kind), symbol)
    }

    /// Look up `name` of kind `kind` in this scope only (no parent walk).
    pub fn lookup(&self, name: &str, kind: SymbolKind) -> Option<&'a Symbol<'a>> {
        self.symbols.borrow().get(&(name, kind)).copied()
    }

    /// Remove a symbol from this table by identity.
    pub fn remove(&self, symbol: &Symbol<'a>) {
        self.symbols
            .borrow_mut()
            .retain(|_, s| !std::ptr::eq(*s, symbol));
    }

    pub fn len(&self) -> usize {
        self.symbols.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::types::{TypeKind, TypeRegistry};

    #[test]
    fn unreferenced_local_has_one_reference() {
        let arena = Arena::new();
        let name = arena.alloc_str("x");
        let sym = Symbol::new(
            name,
            TypeRegistry::get(TypeKind::Integer),
            SymbolKind::Variable,
            SymbolSubKind::Local,
        );
        assert!(sym.is_unreferenced());
        sym.add_reference();
        assert!(!sym.is_unreferenced());
    }

    #[test]
    fn table_define_and_lookup() {
        let arena = Arena::new();
        let table = SymbolTable::new();
        let name = arena.alloc_str("x");
        let sym = arena.alloc(Symbol::new(
            name,
            TypeRegistry::get(TypeKind::Integer),
            SymbolKind::Variable,
            SymbolSubKind::Local,
        ));
        table.define(sym);
        assert!(table.lookup("x", SymbolKind::Variable).is_some());
        assert!(table.lookup("x", SymbolKind::Function).is_none());

        table.remove(sym);
        assert!(table.lookup("x", SymbolKind::Variable).is_none());
    }
}
