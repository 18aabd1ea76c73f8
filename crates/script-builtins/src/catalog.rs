//! The process-wide builtin catalog.
//!
//! Builtin constants, functions, and event signatures are loaded exactly
//! once, into an arena that is leaked for the remaining lifetime of the
//! process (see the data model's lifecycle rule: builtin state is never
//! freed). The catalog is read-only after [`load_builtins`] returns, so
//! concurrent reads from multiple compilation threads are safe even though
//! the underlying [`SymbolTable`] uses interior mutability internally.

use std::sync::OnceLock;

use log::info;
use script_core::{ActiveArenaGuard, Arena, FatalError, SymbolTable};

use crate::manifest::parse_manifest;

const DEFAULT_MANIFEST: &str = include_str!("default_manifest.txt");

/// Wraps a raw pointer to the leaked, read-only catalog table.
///
/// `SymbolTable` holds a `RefCell` internally and so is never `Sync`, but
/// once loading finishes nothing calls `define` or `remove` on it again —
/// every subsequent access is a `lookup`, which only ever takes `&self`.
/// That usage discipline is what actually makes sharing the pointer across
/// threads sound; the unsafe impls below just assert it.
struct CatalogHandle(*const SymbolTable<'static>);

unsafe impl Send for CatalogHandle {}
unsafe impl Sync for CatalogHandle {}

static CATALOG: OnceLock<CatalogHandle> = OnceLock::new();

/// Load the builtin catalog from `manifest_text`, or the compiled-in
/// fallback table if `manifest_text` is `None`. Must be called exactly once
/// before any compilation; calling it a second time is an invariant
/// violation, not a recoverable error.
pub fn load_builtins(manifest_text: Option<&str>) -> Result<(), FatalError> {
    if CATALOG.get().is_some() {
        return Err(FatalError::InvariantViolated(
            "load_builtins called more than once".to_string(),
        ));
    }

    let arena: &'static Arena = Box::leak(Box::new(Arena::new()));
    let _guard = ActiveArenaGuard::enter(arena);

    let table = SymbolTable::new();
    let (name, text) = match manifest_text {
        Some(text) => ("<user-manifest>", text),
        None => ("<builtin-fallback>", DEFAULT_MANIFEST),
    };
    parse_manifest(arena, &table, name, text)?;
    info!(target: "script_builtins", "loaded {} builtin symbols from {name}", table.len());

    let table: &'static SymbolTable<'static> = Box::leak(Box::new(table));
    CATALOG
        .set(CatalogHandle(table as *const SymbolTable<'static>))
        .map_err(|_| {
            FatalError::InvariantViolated("race installing the builtin catalog".to_string())
        })?;
    Ok(())
}

/// Fetch the process-wide builtin catalog.
///
/// # Panics
///
/// Panics if [`load_builtins`] has not yet completed successfully.
pub fn builtin_catalog() -> &'static SymbolTable<'static> {
    let handle = CATALOG
        .get()
        .expect("builtin catalog not loaded; call load_builtins() first");
    // SAFETY: the table was leaked in `load_builtins` and is never mutated
    // again, so shared reads from any thread are sound.
    unsafe { &*handle.0 }
}

/// Whether [`load_builtins`] has already run successfully.
pub fn is_loaded() -> bool {
    CATALOG.get().is_some()
}
