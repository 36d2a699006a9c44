use pretty_assertions::assert_eq;

use super::*;

fn pair(a: Type, b: Type) -> Type {
    Type::named("Pair", vec![a, b])
}

#[test]
fn test_binds_parameter_in_array() {
    let mut args = TypeArgs::new();
    unify(
        &Type::array(Type::param("T")),
        &Type::array(Type::Float),
        &mut args,
    )
    .unwrap();
    assert_eq!(args.get("T"), Some(&Type::Float));
}

#[test]
fn test_binds_struct_arguments() {
    let mut args = TypeArgs::new();
    unify(
        &pair(Type::param("A"), Type::param("B")),
        &pair(Type::Int, Type::Str),
        &mut args,
    )
    .unwrap();
    assert_eq!(args.to_string(), "<A = int, B = string>");
}

#[test]
fn test_repeated_parameter_must_agree() {
    let mut args = TypeArgs::new();
    let t = Type::param("T");
    unify(&t, &Type::Int, &mut args).unwrap();
    unify(&t, &Type::Int, &mut args).unwrap();
    let err = unify(&t, &Type::Float, &mut args).unwrap_err();
    assert!(matches!(err, UnifyError::Conflict { ref param, .. } if param == "T"));
}

#[test]
fn test_alias_is_looked_through_for_conflicts() {
    let mut args = TypeArgs::new();
    let t = Type::param("T");
    unify(&t, &Type::Int, &mut args).unwrap();
    assert!(unify(&t, &Type::alias("Count", Type::Int), &mut args).is_ok());
}

#[test]
fn test_shape_mismatch() {
    let mut args = TypeArgs::new();
    let err = unify(&Type::array(Type::param("T")), &Type::Int, &mut args).unwrap_err();
    assert_eq!(
        err,
        UnifyError::Mismatch {
            expected: Type::array(Type::param("T")),
            found: Type::Int,
        }
    );
    assert!(args.is_empty());
}

#[test]
fn test_struct_arity_mismatch() {
    let mut args = TypeArgs::new();
    let err = unify(
        &Type::named("Box", vec![Type::param("T")]),
        &Type::named("Box", vec![Type::Int, Type::Int]),
        &mut args,
    )
    .unwrap_err();
    assert!(matches!(err, UnifyError::ArityMismatch { expected: 1, found: 2, .. }));
}

#[test]
fn test_concrete_pattern_always_unifies() {
    let mut args = TypeArgs::new();
    assert!(unify(&Type::Int, &Type::Str, &mut args).is_ok());
    assert!(args.is_empty());
}
