//! Scoring and ranking of a single candidate.

use std::cmp::Ordering;
use std::sync::Arc;

use brine_diagnostic::{Diagnostic, ErrorCode};
use brine_types::{substitute, unify, Type, TypeArgs, TypeMatch};

use crate::function::{Function, ParamType};
use crate::query::FunctionQuery;

/// How well one candidate fits one query. Built per query and discarded.
#[derive(Debug)]
pub struct FunctionMatch<'p> {
    pub candidate: &'p Arc<Function>,
    /// Problems found while scoring (failed type argument inference).
    pub diagnostics: Vec<Diagnostic>,
    pub name_matched: bool,
    /// 0 exact, 1 near miss, 2 no match.
    pub badness: u8,
    pub arity_matched: bool,
    /// Weakest tier over all checked parameters.
    pub param_match: TypeMatch,
    pub return_match: TypeMatch,
    pub defaults_used: usize,
    pub in_preferred_file: bool,
    /// Inferred bindings; `Some` only for generic candidates.
    pub type_args: Option<TypeArgs>,
    /// Why the candidate stopped matching, for diagnostics.
    pub(crate) reason: Option<String>,
}

impl<'p> FunctionMatch<'p> {
    pub fn score<A>(candidate: &'p Arc<Function>, query: &FunctionQuery<'_, A>) -> Self {
        let badness = query.identifier.badness(&candidate.name);
        let mut m = FunctionMatch {
            candidate,
            diagnostics: Vec::new(),
            name_matched: badness == 0,
            badness,
            arity_matched: false,
            param_match: TypeMatch::None,
            return_match: TypeMatch::None,
            defaults_used: 0,
            in_preferred_file: query
                .prefer_file
                .is_some_and(|file| candidate.file.as_ref() == Some(file)),
            type_args: None,
            reason: None,
        };
        if !m.name_matched {
            return m;
        }

        let total = candidate.params.len();
        if let Some(count) = query.arity() {
            let required = candidate.required_params();
            if count < required || count > total {
                m.reason = Some(if required == total {
                    format!("expects {total} argument(s), found {count}")
                } else {
                    format!("expects {required} to {total} arguments, found {count}")
                });
                return m;
            }
            m.defaults_used = total - count;
        }
        m.arity_matched = true;

        if candidate.is_generic() && !m.infer_type_args(query) {
            return m;
        }

        m.param_match = TypeMatch::Equals;
        if let Some(args) = query.arguments {
            for (param, arg) in candidate.params.iter().zip(args) {
                let (tier, expected) = match &param.ty {
                    ParamType::Accepts(acceptor) => {
                        let accepted = query
                            .convert(arg, None)
                            .is_some_and(|ty| acceptor.accepts(&ty));
                        let tier = if accepted {
                            TypeMatch::Equals
                        } else {
                            TypeMatch::None
                        };
                        (tier, acceptor.description.to_string())
                    }
                    ParamType::Declared(declared) => {
                        let declared = m.substituted(declared);
                        (param_tier(query, arg, &declared), declared.to_string())
                    }
                };
                m.param_match = m.param_match.min(tier);
                if tier == TypeMatch::None {
                    let found = query
                        .convert(arg, None)
                        .map_or_else(|| "_".to_string(), |ty| ty.to_string());
                    m.reason = Some(format!(
                        "parameter `{}` expects `{expected}`, found `{found}`",
                        param.name
                    ));
                    break;
                }
            }
        }

        m.return_match = match query.expected_return {
            None => TypeMatch::Equals,
            Some(expected) => {
                let ret = m.substituted(&candidate.ret);
                if ret.has_params() {
                    TypeMatch::None
                } else {
                    TypeMatch::of(&ret, expected)
                }
            }
        };
        m
    }

    /// Unify declared parameter types with argument types. Returns `false`
    /// (with a diagnostic recorded) when they conflict.
    fn infer_type_args<A>(&mut self, query: &FunctionQuery<'_, A>) -> bool {
        let candidate = self.candidate;
        let mut bindings = TypeArgs::new();

        if let Some(args) = query.arguments {
            for (param, arg) in candidate.params.iter().zip(args) {
                let ParamType::Declared(pattern) = &param.ty else {
                    continue;
                };
                if !pattern.has_params() {
                    continue;
                }
                let Some(actual) = query.convert(arg, None) else {
                    continue;
                };
                if let Err(err) = unify(pattern, &actual, &mut bindings) {
                    tracing::trace!(candidate = %candidate.signature(), %err, "inference failed");
                    self.diagnostics.push(
                        Diagnostic::error(ErrorCode::E2016)
                            .with_message(format!(
                                "cannot infer type arguments for `{}`",
                                candidate.signature()
                            ))
                            .with_note(format!("parameter `{}`: {err}", param.name)),
                    );
                    self.reason = Some(format!("parameter `{}`: {err}", param.name));
                    return false;
                }
            }
        }

        // A type parameter used only in the return position can still be
        // pinned by the expected return type.
        if let Some(expected) = query.expected_return {
            if candidate.ret.has_params() {
                let mut attempt = bindings.clone();
                if unify(&candidate.ret, expected, &mut attempt).is_ok() {
                    bindings = attempt;
                }
            }
        }

        self.type_args = Some(bindings);
        true
    }

    fn substituted(&self, ty: &Type) -> Type {
        match &self.type_args {
            Some(args) if ty.has_params() => substitute(ty, args),
            _ => ty.clone(),
        }
    }

    /// Whether the match carries no unresolved template.
    pub fn is_concrete(&self) -> bool {
        self.type_args.is_none()
    }

    /// Whether every check passed.
    pub fn is_accepted(&self) -> bool {
        self.diagnostics.is_empty()
            && self.name_matched
            && self.arity_matched
            && self.param_match.is_match()
            && self.return_match.is_match()
    }

    /// Compare by the ranking criteria only; `Greater` means `self` is the
    /// better match. `Equal` means the two are indistinguishable.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.name_matched
            .cmp(&other.name_matched)
            .then_with(|| other.badness.cmp(&self.badness))
            .then_with(|| self.arity_matched.cmp(&other.arity_matched))
            .then_with(|| self.param_match.cmp(&other.param_match))
            .then_with(|| self.return_match.cmp(&other.return_match))
            .then_with(|| self.is_concrete().cmp(&other.is_concrete()))
            .then_with(|| other.defaults_used.cmp(&self.defaults_used))
            .then_with(|| self.in_preferred_file.cmp(&other.in_preferred_file))
    }

    /// Strictly better, breaking rank ties by declaration location so the
    /// outcome never depends on pool order.
    pub(crate) fn outranks(&self, other: &Self) -> bool {
        match self.rank(other) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.candidate.stable_key() < other.candidate.stable_key(),
        }
    }
}

/// Tier of one argument against one declared parameter type.
fn param_tier<A>(query: &FunctionQuery<'_, A>, arg: &A, declared: &Type) -> TypeMatch {
    if declared.has_params() {
        return TypeMatch::None;
    }
    if let Some(actual) = query.convert(arg, None) {
        let tier = TypeMatch::of(&actual, declared);
        if tier.is_match() {
            return tier;
        }
    }
    match query.convert(arg, Some(declared)) {
        Some(hinted) if TypeMatch::of(&hinted, declared) >= TypeMatch::Same => {
            TypeMatch::Promotion
        }
        _ => TypeMatch::None,
    }
}
