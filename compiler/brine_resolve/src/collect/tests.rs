use pretty_assertions::assert_eq;

use brine_diagnostic::ErrorCode;
use brine_types::Type;

use super::*;
use crate::test_helpers::{codes, load};

fn names(pool: &[Arc<Function>]) -> Vec<String> {
    pool.iter().map(|f| f.name.clone()).collect()
}

fn collect(files: &[(&str, &str)]) -> (Declarations, Vec<ErrorCode>) {
    let (sources, mut diagnostics) = load(files);
    let decls = collect_declarations(&sources, &mut diagnostics);
    (decls, codes(&diagnostics))
}

#[test]
fn test_pools_by_kind() {
    let (decls, errors) = collect(&[(
        "main.br",
        "struct Vec2 { x: float, y: float, }\n\
         fn dot(a: Vec2, b: Vec2) -> float { return 0.0; }\n\
         method length(self: Vec2) -> float { return 0.0; }\n\
         operator + (a: Vec2, b: Vec2) -> Vec2 { return a; }\n\
         extern fn puts(s: string);\n\
         print(1);",
    )]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(names(&decls.functions), vec!["dot", "puts"]);
    assert_eq!(names(&decls.general_functions), vec!["length"]);
    assert_eq!(names(&decls.operators), vec!["+"]);
    assert_eq!(names(&decls.constructors), vec!["Vec2"]);
    assert_eq!(names(&decls.externals), vec!["puts"]);
    assert_eq!(decls.statements_of(&FileUri::new("mem:main.br")).len(), 1);
}

#[test]
fn test_constructor_mirrors_struct_fields() {
    let (decls, errors) = collect(&[(
        "main.br",
        "struct Pair<A, B> { first: A, second: B, }",
    )]);
    assert!(errors.is_empty(), "{errors:?}");
    let ctor = &decls.constructors[0];
    assert_eq!(ctor.kind, FunctionKind::Constructor);
    assert_eq!(ctor.type_params, vec!["A", "B"]);
    assert_eq!(ctor.signature(), "Pair<A, B>(A, B) -> Pair<A, B>");
    let pair = decls.struct_named("Pair").map(|s| s.fields.len());
    assert_eq!(pair, Some(2));
}

#[test]
fn test_types_may_be_used_before_declaration() {
    let (decls, errors) = collect(&[(
        "main.br",
        "fn origin() -> Point { return Point(0, 0); }\n\
         alias Coord = int;\n\
         struct Point { x: Coord, y: Coord, }",
    )]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(decls.functions[0].ret, Type::named("Point", vec![]));
    let field = decls.struct_named("Point").and_then(|s| s.field("x"));
    assert_eq!(field.map(|f| f.ty.clone()), Some(Type::alias("Coord", Type::Int)));
}

#[test]
fn test_alias_chain_and_cycle() {
    let (decls, errors) = collect(&[(
        "main.br",
        "alias Ints = [Int];\nalias Int = int;\nalias A = B;\nalias B = A;",
    )]);
    assert_eq!(errors, vec![ErrorCode::E2002]);
    let ints = decls.alias_named("Ints").map(|a| a.ty.resolve_aliases());
    assert_eq!(ints, Some(Type::array(Type::Int)));
    assert_eq!(decls.alias_named("A").map(|a| a.ty.clone()), Some(Type::Error));
    assert_eq!(decls.alias_named("B").map(|a| a.ty.clone()), Some(Type::Error));
}

#[test]
fn test_unknown_type_and_wrong_arity() {
    let (decls, errors) = collect(&[(
        "main.br",
        "struct Box<T> { value: T, }\n\
         fn f(a: Missing, b: Box, c: Box<int>) {}",
    )]);
    assert_eq!(errors, vec![ErrorCode::E2002, ErrorCode::E2002]);
    let f = &decls.functions[0];
    let types: Vec<_> = f.params.iter().filter_map(|p| p.ty.declared().cloned()).collect();
    assert_eq!(
        types,
        vec![Type::Error, Type::Error, Type::named("Box", vec![Type::Int])]
    );
}

#[test]
fn test_type_params_scope_to_their_declaration() {
    let (decls, errors) = collect(&[(
        "main.br",
        "fn id<T>(x: T) -> T { return x; }\nfn bad(x: T) {}",
    )]);
    assert_eq!(errors, vec![ErrorCode::E2002]);
    assert_eq!(decls.functions[0].ret, Type::param("T"));
}

#[test]
fn test_duplicate_signature_is_rejected_across_files() {
    let (decls, errors) = collect(&[
        ("main.br", "using \"other\";\nfn f(x: int) {}\nfn f(x: float) {}"),
        ("other.br", "fn f(y: int) {}"),
    ]);
    assert_eq!(errors, vec![ErrorCode::E2006]);
    assert_eq!(decls.functions.len(), 2);
}

#[test]
fn test_duplicate_types_fields_and_params() {
    let (decls, errors) = collect(&[(
        "main.br",
        "struct S { a: int, a: float, }\n\
         alias S = int;\n\
         struct int { v: int, }\n\
         fn g(x: int, x: int) {}",
    )]);
    assert_eq!(
        errors,
        vec![
            ErrorCode::E2006,
            ErrorCode::E2006,
            ErrorCode::E2006,
            ErrorCode::E2006
        ]
    );
    assert_eq!(decls.structs.len(), 1);
    assert_eq!(decls.structs[0].fields.len(), 1);
    assert!(decls.aliases.is_empty());
    assert_eq!(decls.functions[0].params.len(), 1);
}

#[test]
fn test_method_and_function_with_same_signature_coexist() {
    let (decls, errors) = collect(&[(
        "main.br",
        "fn size(self: string) -> int { return 0; }\n\
         method size(self: string) -> int { return 0; }",
    )]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(decls.pool(FunctionKind::Function).len(), 1);
    assert_eq!(decls.pool(FunctionKind::Method).len(), 1);
}
