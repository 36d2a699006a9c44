//! Overload and template resolution.
//!
//! # Algorithm
//!
//! ```text
//! for candidate in pool:
//!     score it (name, arity, inferred type args, parameter and return tiers)
//!     keep it if it enters the top two
//! best := top[0]
//! best has scoring diagnostics   -> report them
//! best failed a check            -> report that check (name, arity, params, return)
//! best ranks equal to top[1]     -> ambiguous
//! best is generic                -> instantiate through the template cache
//! ```
//!
//! Ranking criteria, most significant first: name matched, identifier
//! badness, arity matched, parameter tier, return tier, concrete over
//! generic, fewer defaults used, declared in the preferred file. Ties on all
//! criteria are broken by declaration location when picking the top two,
//! which keeps the result independent of pool order, and reported as
//! ambiguous when the tied candidate would otherwise be accepted.

mod candidate;

pub use candidate::FunctionMatch;

use std::cmp::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use brine_diagnostic::{Diagnostic, ErrorCode};
use brine_types::{TypeArgs, TypeMatch};

use crate::function::Function;
use crate::query::FunctionQuery;
use crate::template::{CompliableTemplate, TemplateCache};

/// An accepted match.
#[derive(Clone, Debug)]
pub struct Resolved {
    /// The function to call; for generic candidates the instantiation.
    pub function: Arc<Function>,
    /// Set when `function` is an instantiation.
    pub template: Option<Arc<CompliableTemplate>>,
    pub param_match: TypeMatch,
}

impl Resolved {
    pub fn type_args(&self) -> Option<&TypeArgs> {
        self.template.as_ref().map(|t| &t.args)
    }
}

/// The two best matches seen so far, best first.
#[derive(Default)]
struct TopTwo<'p> {
    slots: SmallVec<[FunctionMatch<'p>; 2]>,
}

impl<'p> TopTwo<'p> {
    fn insert(&mut self, m: FunctionMatch<'p>) {
        let pos = self
            .slots
            .iter()
            .position(|held| m.outranks(held))
            .unwrap_or(self.slots.len());
        if pos < 2 {
            self.slots.insert(pos, m);
            self.slots.truncate(2);
        }
    }
}

/// Pick the best candidate of `pool` for `query`.
///
/// `kind` names the pool in diagnostics ("function", "operator", ...).
/// Returned diagnostics carry no location; the caller attaches the call
/// site.
#[tracing::instrument(level = "debug", skip_all, fields(kind = %kind, name = %query.identifier))]
pub fn resolve<A>(
    pool: &[Arc<Function>],
    kind: &str,
    query: &FunctionQuery<'_, A>,
    templates: &mut TemplateCache,
) -> Result<Resolved, Diagnostic> {
    if pool.is_empty() {
        return Err(Diagnostic::error(ErrorCode::E2010)
            .with_message(format!("no {kind}s are available to call `{}`", query.identifier)));
    }

    let mut top = TopTwo::default();
    for candidate in pool {
        let m = FunctionMatch::score(candidate, query);
        tracing::trace!(
            candidate = %candidate.signature(),
            badness = m.badness,
            params = %m.param_match,
            ret = %m.return_match,
            "scored"
        );
        top.insert(m);
    }
    let mut slots = top.slots.into_iter();
    let Some(mut best) = slots.next() else {
        return Err(Diagnostic::internal(ErrorCode::E9001)
            .with_message(format!("no match kept for `{}`", query.identifier)));
    };
    let second = slots.next();

    if !best.diagnostics.is_empty() {
        let mut diags = std::mem::take(&mut best.diagnostics).into_iter();
        if let Some(first) = diags.next() {
            return Err(first.with_causes(diags));
        }
    }
    // A tie is ambiguous even when both candidates would fail. Ties among
    // candidates that do not carry the identifier fall through to E2011.
    if let Some(second) = &second {
        if best.name_matched && best.rank(second) == Ordering::Equal {
            return Err(ambiguous(kind, query, &best, second));
        }
    }
    if let Some(failure) = check_failure(kind, query, &best, second.as_ref()) {
        tracing::debug!(code = %failure.code, "no acceptable candidate");
        return Err(failure);
    }

    let param_match = best.param_match;
    let Some(args) = best.type_args.take() else {
        tracing::debug!(function = %best.candidate.signature(), %param_match, "resolved");
        return Ok(Resolved {
            function: Arc::clone(best.candidate),
            template: None,
            param_match,
        });
    };
    instantiate(best.candidate, args, query, templates, param_match)
}

fn instantiate<A>(
    template: &Arc<Function>,
    args: TypeArgs,
    query: &FunctionQuery<'_, A>,
    templates: &mut TemplateCache,
    param_match: TypeMatch,
) -> Result<Resolved, Diagnostic> {
    let unresolved: Vec<&str> = template
        .type_params
        .iter()
        .map(String::as_str)
        .filter(|p| !args.contains(p))
        .collect();
    if !unresolved.is_empty() {
        return Err(Diagnostic::error(ErrorCode::E2015)
            .with_message(format!(
                "cannot resolve the type arguments of `{}`",
                template.signature()
            ))
            .with_note(format!("no type could be inferred for {}", unresolved.join(", ")))
            .with_suggestion("annotate the expected type"));
    }

    let (entry, created) = templates.get_or_instantiate(template, &args);
    if created {
        if let Some(callback) = query.on_instantiate {
            callback(&entry);
        }
    }
    tracing::debug!(function = %entry.instance, created, "resolved template");
    Ok(Resolved {
        function: Arc::clone(&entry.instance),
        template: Some(entry),
        param_match,
    })
}

/// The first check `best` fails, as a diagnostic.
fn check_failure<A>(
    kind: &str,
    query: &FunctionQuery<'_, A>,
    best: &FunctionMatch<'_>,
    second: Option<&FunctionMatch<'_>>,
) -> Option<Diagnostic> {
    let name = &query.identifier;
    let candidate = best.candidate;

    if !best.name_matched {
        let diag = Diagnostic::error(ErrorCode::E2011)
            .with_message(format!("cannot find {kind} `{name}`"));
        return Some(if best.badness == 1 {
            diag.with_suggestion(format!("did you mean `{}`?", candidate.name))
        } else {
            diag
        });
    }

    if !best.arity_matched {
        return Some(
            Diagnostic::error(ErrorCode::E2004)
                .with_message(format!(
                    "wrong number of arguments for {kind} `{name}`: {}",
                    query.describe_arguments()
                ))
                .with_causes(reasons(best, second, |m| !m.arity_matched)),
        );
    }

    if !best.param_match.is_match() {
        return Some(
            Diagnostic::error(ErrorCode::E2012)
                .with_message(format!(
                    "no {kind} `{name}` accepts arguments {}",
                    query.describe_arguments()
                ))
                .with_causes(reasons(best, second, |m| {
                    m.arity_matched && !m.param_match.is_match()
                })),
        );
    }

    if !best.return_match.is_match() {
        let expected = query
            .expected_return
            .map_or_else(String::new, ToString::to_string);
        return Some(
            Diagnostic::error(ErrorCode::E2013)
                .with_message(format!(
                    "{kind} `{name}` returns `{}`, expected `{expected}`",
                    candidate.ret
                ))
                .with_note(format!("candidate: `{}`", candidate.signature())),
        );
    }

    None
}

/// Reason notes for the top candidates that failed the same way.
fn reasons(
    best: &FunctionMatch<'_>,
    second: Option<&FunctionMatch<'_>>,
    failed: impl Fn(&FunctionMatch<'_>) -> bool,
) -> Vec<Diagnostic> {
    std::iter::once(best)
        .chain(second.filter(|m| m.name_matched))
        .filter(|m| failed(m))
        .map(|m| {
            let reason = m.reason.as_deref().unwrap_or("does not match");
            let note = Diagnostic::note(ErrorCode::E2012)
                .with_message(format!("`{}` {reason}", m.candidate.signature()));
            match &m.candidate.file {
                Some(file) => note
                    .with_file(file.clone())
                    .with_label(m.candidate.name_span, "declared here"),
                None => note,
            }
        })
        .collect()
}

#[cold]
fn ambiguous<A>(
    kind: &str,
    query: &FunctionQuery<'_, A>,
    best: &FunctionMatch<'_>,
    second: &FunctionMatch<'_>,
) -> Diagnostic {
    let mut diag = Diagnostic::error(ErrorCode::E2014).with_message(format!(
        "ambiguous call to {kind} `{}` with arguments {}",
        query.identifier,
        query.describe_arguments()
    ));
    for m in [best, second] {
        diag = diag.with_note(format!("candidate: `{}`", m.candidate.signature()));
        if let Some(file) = &m.candidate.file {
            diag = diag.with_cross_file_label(file.clone(), m.candidate.name_span, "candidate");
        }
    }
    diag
}
