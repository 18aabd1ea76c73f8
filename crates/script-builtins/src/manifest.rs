//! The builtin manifest grammar: one record per line.
//!
//! ```text
//! <ret_type> <name>(<type> <pname>, ...)     // function
//! event <name>(<type> <pname>, ...)          // event signature, return type null
//! const <type> <name> = <literal>            // constant
//! ```
//!
//! Blank lines and `//`-prefixed lines are ignored. A malformed record
//! aborts the process with a [`FatalError`] naming the manifest and the
//! offending line — the manifest is a trusted input, so a parse failure
//! here is a packaging bug, not a user error to recover from.

use script_core::{
    Arena, Constant, FatalError, FunctionSignature, Param, Symbol, SymbolKind, SymbolSubKind,
    SymbolTable, TypeKind, TypeRegistry, parse_string,
};

/// Parse every record in `text` and define the resulting symbols in `table`,
/// allocating into `arena`. `manifest_name` is used only for diagnostics.
pub fn parse_manifest<'a>(
    arena: &'a Arena,
    table: &SymbolTable<'a>,
    manifest_name: &str,
    text: &str,
) -> Result<(), FatalError> {
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let line_no = index as u32 + 1;
        let record = parse_record(arena, line).map_err(|detail| FatalError::MalformedManifest {
            manifest: manifest_name.to_string(),
            line: line_no,
            detail,
        })?;

        let symbol = arena.alloc(record);
        table.define(symbol);
    }
    Ok(())
}

fn parse_record<'a>(arena: &'a Arena, line: &str) -> Result<Symbol<'a>, String> {
    if let Some(rest) = line.strip_prefix("const ") {
        parse_const(arena, rest)
    } else if let Some(rest) = line.strip_prefix("event ") {
        parse_signature(arena, TypeRegistry::get(TypeKind::Null), rest, SymbolKind::Event)
    } else {
        let (ret_name, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("expected `<ret_type> <name>(...)`, got `{line}`"))?;
        let ret_type = lookup_type(ret_name)?;
        parse_signature(arena, ret_type, rest, SymbolKind::Function)
    }
}

fn parse_signature<'a>(
    arena: &'a Arena,
    return_type: &'static script_core::Type,
    rest: &str,
    kind: SymbolKind,
) -> Result<Symbol<'a>, String> {
    let rest = rest.trim();
    let (name, paren) = rest
        .split_once('(')
        .ok_or_else(|| format!("expected `(` after name in `{rest}`"))?;
    let name = name.trim();
    let params_text = paren
        .strip_suffix(')')
        .ok_or_else(|| format!("expected closing `)` in `{rest}`"))?
        .trim();

    let mut params = Vec::new();
    if !params_text.is_empty() {
        for param in params_text.split(',') {
            let param = param.trim();
            let (ty_name, pname) = param
                .split_once(char::is_whitespace)
                .ok_or_else(|| format!("expected `<type> <name>` parameter, got `{param}`"))?;
            params.push(Param {
                name: arena.alloc_str(pname.trim()),
                ty: lookup_type(ty_name.trim())?,
            });
        }
    }

    let signature = FunctionSignature {
        return_type,
        params: arena.alloc_slice(&params),
    };

    let name = arena.alloc_str(name);
    Ok(Symbol::new(name, return_type, kind, SymbolSubKind::Builtin).with_signature(signature))
}

fn parse_const<'a>(arena: &'a Arena, rest: &str) -> Result<Symbol<'a>, String> {
    let (ty_name, rest) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected `<type> <name> = <literal>`, got `{rest}`"))?;

    // `key` has no literal syntax of its own; the manifest narrows it to
    // `string` and the type checker treats the distinction at use sites.
    let declared_kind = TypeKind::from_name(ty_name.trim())
        .ok_or_else(|| format!("unknown type `{ty_name}`"))?;
    let literal_kind = if declared_kind == TypeKind::Key {
        TypeKind::String
    } else {
        declared_kind
    };

    let (name, literal) = rest
        .trim()
        .split_once('=')
        .ok_or_else(|| format!("expected `= <literal>` in `{rest}`"))?;
    let name = name.trim();
    let literal = literal.trim();

    let value = parse_literal(arena, literal_kind, literal)?;
    let symbol = Symbol::new(
        arena.alloc_str(name),
        TypeRegistry::get(declared_kind),
        SymbolKind::Variable,
        SymbolSubKind::Builtin,
    );
    symbol.set_constant_value(Some(value));
    Ok(symbol)
}

fn parse_literal<'a>(
    arena: &'a Arena,
    kind: TypeKind,
    literal: &str,
) -> Result<&'a Constant<'a>, String> {
    match kind {
        TypeKind::Integer => {
            let value = if let Some(hex) = literal.strip_prefix("0x").or_else(|| literal.strip_prefix("0X")) {
                i32::from_str_radix(hex, 16)
                    .map_err(|e| format!("bad hex integer `{literal}`: {e}"))?
            } else {
                literal
                    .parse::<i32>()
                    .map_err(|e| format!("bad integer `{literal}`: {e}"))?
            };
            Ok(Constant::integer(arena, value))
        }
        TypeKind::Float => {
            let value = literal
                .parse::<f32>()
                .map_err(|e| format!("bad float `{literal}`: {e}"))?;
            Ok(Constant::float(arena, value))
        }
        TypeKind::String => Ok(Constant::string(arena, parse_string(arena, literal))),
        TypeKind::Vector => {
            let (x, y, z) = parse_components::<3>(literal)?
                .try_into()
                .map(|[x, y, z]| (x, y, z))
                .unwrap();
            Ok(Constant::vector(arena, x, y, z))
        }
        TypeKind::Quaternion => {
            let parts = parse_components::<4>(literal)?;
            Ok(Constant::quaternion(arena, parts[0], parts[1], parts[2], parts[3]))
        }
        TypeKind::Null | TypeKind::Key | TypeKind::List | TypeKind::Error => {
            Err(format!("type `{}` has no manifest literal syntax", kind.name()))
        }
    }
}

fn parse_components<const N: usize>(literal: &str) -> Result<Vec<f32>, String> {
    let inner = literal
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| format!("expected `<x, y, ...>`, got `{literal}`"))?;
    let parts: Vec<f32> = inner
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f32>()
                .map_err(|e| format!("bad component `{p}` in `{literal}`: {e}"))
        })
        .collect::<Result<_, _>>()?;
    if parts.len() != N {
        return Err(format!(
            "expected {N} components in `{literal}`, got {}",
            parts.len()
        ));
    }
    Ok(parts)
}

fn lookup_type(name: &str) -> Result<&'static script_core::Type, String> {
    TypeKind::from_name(name)
        .map(TypeRegistry::get)
        .ok_or_else(|| format!("unknown type `{name}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_core::{ActiveArenaGuard, ConstantData, SymbolKind};

    #[test]
    fn parses_constant_function_and_event() {
        let arena = Arena::new();
        let _guard = ActiveArenaGuard::enter(&arena);
        let table = SymbolTable::new();

        let text = "\
// a comment
const float PI = 3.14159

integer llAbs(integer val)
event state_entry()
";
        parse_manifest(&arena, &table, "test.manifest", text).unwrap();

        let pi = table.lookup("PI", SymbolKind::Variable).unwrap();
        match pi.constant_value().unwrap().data() {
            ConstantData::Float(v) => assert!((*v - 3.14159).abs() < 1e-5),
            _ => panic!("expected float"),
        }

        let abs_fn = table.lookup("llAbs", SymbolKind::Function).unwrap();
        assert_eq!(abs_fn.signature.unwrap().params.len(), 1);

        let entry = table.lookup("state_entry", SymbolKind::Event).unwrap();
        assert_eq!(entry.ty.itype(), TypeKind::Null);
    }

    #[test]
    fn key_constant_is_narrowed_to_string() {
        let arena = Arena::new();
        let _guard = ActiveArenaGuard::enter(&arena);
        let table = SymbolTable::new();

        parse_manifest(&arena, &table, "test.manifest", "const key NULL_KEY = \"\"").unwrap();
        let sym = table.lookup("NULL_KEY", SymbolKind::Variable).unwrap();
        assert_eq!(sym.ty.itype(), TypeKind::Key);
        match sym.constant_value().unwrap().data() {
            ConstantData::String(_) => {}
            other => panic!("expected string-shaped payload, got {other:?}"),
        }
    }

    #[test]
    fn malformed_record_reports_line_number() {
        let arena = Arena::new();
        let _guard = ActiveArenaGuard::enter(&arena);
        let table = SymbolTable::new();

        let err = parse_manifest(&arena, &table, "bad.manifest", "integer\nconst bogus X = 1")
            .unwrap_err();
        match err {
            FatalError::MalformedManifest { line, .. } => assert_eq!(line, 1),
            other => panic!("expected MalformedManifest, got {other:?}"),
        }
    }
}
