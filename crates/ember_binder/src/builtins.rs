//! Builtin functions and type functions.

use crate::symbol::{FunctionKind, FunctionSymbol, TypeFunctionKind, TypeFunctionSymbol, VariableSymbol};
use crate::types::TypeSymbol;
use ember_core::text::TextSpan;
use std::sync::Arc;

fn builtin(name: &str, parameters: &[(&str, TypeSymbol)], return_type: TypeSymbol) -> Arc<FunctionSymbol> {
    let parameters = parameters
        .iter()
        .enumerate()
        .map(|(i, (name, ty))| Arc::new(VariableSymbol::parameter(*name, i, ty.clone())))
        .collect();
    let mut function = FunctionSymbol::new(name, parameters, return_type, FunctionKind::Builtin, TextSpan::default());
    function.is_public = true;
    Arc::new(function)
}

/// Functions every root scope starts with.
pub fn functions() -> Vec<Arc<FunctionSymbol>> {
    vec![
        builtin("Print", &[("text", TypeSymbol::STRING)], TypeSymbol::VOID),
        builtin("Write", &[("text", TypeSymbol::STRING)], TypeSymbol::VOID),
        builtin("Input", &[], TypeSymbol::STRING),
        builtin("Clear", &[], TypeSymbol::VOID),
        builtin("SetCursor", &[("x", TypeSymbol::INT), ("y", TypeSymbol::INT)], TypeSymbol::VOID),
        builtin("GetSizeX", &[], TypeSymbol::INT),
        builtin("GetSizeY", &[], TypeSymbol::INT),
        builtin("Random", &[("max", TypeSymbol::INT)], TypeSymbol::INT),
        builtin("Sleep", &[("ms", TypeSymbol::INT)], TypeSymbol::VOID),
        builtin("Version", &[], TypeSymbol::STRING),
        builtin("Char", &[("code", TypeSymbol::INT)], TypeSymbol::STRING),
    ]
}

fn type_function(
    kind: TypeFunctionKind,
    origin: &'static str,
    parameters: Vec<TypeSymbol>,
    return_type: TypeSymbol,
) -> TypeFunctionSymbol {
    let parameters = parameters
        .into_iter()
        .enumerate()
        .map(|(i, ty)| Arc::new(VariableSymbol::parameter(format!("prm_{}", i), i, ty)))
        .collect();
    TypeFunctionSymbol {
        kind,
        parameters,
        return_type,
        origin,
    }
}

/// Outcome of resolving a type function on a receiver type.
#[derive(Debug, Clone)]
pub enum TypeFunctionLookup {
    Found(TypeFunctionSymbol),
    /// The function exists but has no variant for this receiver.
    NotApplicable,
    Unknown,
}

/// Resolve the type function `name` for a receiver of type `base`.
pub fn lookup_type_function(name: &str, base: &TypeSymbol) -> TypeFunctionLookup {
    let function = match name {
        "GetLength" if *base == TypeSymbol::STRING => {
            type_function(TypeFunctionKind::GetLength, "string", vec![], TypeSymbol::INT)
        }
        "GetLength" => type_function(TypeFunctionKind::GetArrayLength, "array", vec![], TypeSymbol::INT),
        "GetBuffer" => type_function(
            TypeFunctionKind::GetBuffer,
            "string",
            vec![],
            TypeSymbol::pointer_to(TypeSymbol::BYTE),
        ),
        "Substring" => type_function(
            TypeFunctionKind::Substring,
            "string",
            vec![TypeSymbol::INT, TypeSymbol::INT],
            TypeSymbol::STRING,
        ),
        "Push" => match base.element_type() {
            Some(element) if base.is_array() => {
                let kind = if element.is_object() {
                    TypeFunctionKind::Push
                } else {
                    TypeFunctionKind::PrimitivePush
                };
                type_function(kind, "array", vec![element.clone()], TypeSymbol::VOID)
            }
            _ => return TypeFunctionLookup::NotApplicable,
        },
        "Join" => type_function(TypeFunctionKind::Join, "thread", vec![], TypeSymbol::VOID),
        "Kill" => type_function(TypeFunctionKind::Kill, "thread", vec![], TypeSymbol::VOID),
        "Run" | "RunThread" => {
            let Some((return_type, parameters)) = base.sub_types.split_last() else {
                return TypeFunctionLookup::NotApplicable;
            };
            if !base.is_action() {
                return TypeFunctionLookup::NotApplicable;
            }
            if name == "Run" {
                type_function(TypeFunctionKind::Run, "action", parameters.to_vec(), return_type.clone())
            } else {
                type_function(TypeFunctionKind::RunThread, "action", parameters.to_vec(), TypeSymbol::THREAD)
            }
        }
        _ => return TypeFunctionLookup::Unknown,
    };
    TypeFunctionLookup::Found(function)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(name: &str, base: &TypeSymbol) -> TypeFunctionSymbol {
        match lookup_type_function(name, base) {
            TypeFunctionLookup::Found(function) => function,
            other => panic!("Expected {} to resolve on {}, got {:?}", name, base, other),
        }
    }

    #[test]
    fn test_get_length_variants() {
        let on_string = found("GetLength", &TypeSymbol::STRING);
        assert_eq!(on_string.kind, TypeFunctionKind::GetLength);
        let on_array = found("GetLength", &TypeSymbol::array_of(TypeSymbol::INT));
        assert_eq!(on_array.kind, TypeFunctionKind::GetArrayLength);
        assert_eq!(on_array.origin, "array");
    }

    #[test]
    fn test_push_picks_variant_by_element() {
        let objects = TypeSymbol::array_of(TypeSymbol::STRING);
        let numbers = TypeSymbol::array_of(TypeSymbol::INT);
        let push = found("Push", &objects);
        let ppush = found("Push", &numbers);
        assert_eq!(push.kind, TypeFunctionKind::Push);
        assert_eq!(ppush.kind, TypeFunctionKind::PrimitivePush);
        assert_eq!(ppush.parameters[0].ty, TypeSymbol::INT);
        assert!(matches!(
            lookup_type_function("Push", &TypeSymbol::STRING),
            TypeFunctionLookup::NotApplicable
        ));
    }

    #[test]
    fn test_run_signature_comes_from_action() {
        let action = TypeSymbol::action(vec![TypeSymbol::INT, TypeSymbol::STRING], TypeSymbol::BOOL);
        let run = found("Run", &action);
        assert_eq!(run.parameters.len(), 2);
        assert_eq!(run.parameters[1].name, "prm_1");
        assert_eq!(run.return_type, TypeSymbol::BOOL);
        let thread = found("RunThread", &action);
        assert_eq!(thread.return_type, TypeSymbol::THREAD);
    }

    #[test]
    fn test_unknown_type_function() {
        assert!(matches!(
            lookup_type_function("Explode", &TypeSymbol::STRING),
            TypeFunctionLookup::Unknown
        ));
    }

    #[test]
    fn test_builtins_are_public() {
        assert!(functions().iter().all(|f| f.is_public && f.kind == FunctionKind::Builtin));
    }
}
