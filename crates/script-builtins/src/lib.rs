//! The builtin-symbol catalog loader: parses the manifest grammar (§4.1)
//! into a process-wide, read-only [`SymbolTable`](script_core::SymbolTable).

pub mod catalog;
pub mod manifest;

pub use catalog::{builtin_catalog, is_loaded, load_builtins};
pub use manifest::parse_manifest;

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::SymbolKind;

    #[test]
    fn loads_default_manifest_once() {
        if !is_loaded() {
            load_builtins(None).expect("default manifest must parse");
        }
        let catalog = builtin_catalog();
        assert!(catalog.lookup("PI", SymbolKind::Variable).is_some());
        assert!(catalog.lookup("llAbs", SymbolKind::Function).is_some());
        assert!(catalog.lookup("state_entry", SymbolKind::Event).is_some());

        assert!(matches!(
            load_builtins(None),
            Err(script_core::FatalError::InvariantViolated(_))
        ));
    }
}
