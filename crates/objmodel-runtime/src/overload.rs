//! Rank-based selection among overloaded candidates.
//!
//! Every candidate is bound against the call's arguments first. Among the
//! candidates that bind, the lowest [`Rank`](crate::binder::Rank) wins; a tie
//! at the best rank is ambiguous.

use objmodel_core::BindError;

use crate::binder::BoundArgs;

/// The winning candidate with its bound arguments.
#[derive(Debug, Clone)]
pub struct OverloadMatch<T> {
    pub candidate: T,
    pub bound: BoundArgs,
}

/// Why no candidate was selected.
#[derive(Debug, Clone, PartialEq)]
pub enum NoMatch<T> {
    /// The only candidate failed to bind.
    Rejected(T, BindError),
    /// Several candidates, none of which binds.
    NoneViable,
    /// Candidates tied at the best rank.
    Ambiguous(Vec<T>),
}

/// Pick the best of the bound candidates.
///
/// `attempts` holds each candidate with the outcome of binding the call's
/// arguments to it, in declaration order.
pub fn find_best_match<T>(
    attempts: Vec<(T, Result<BoundArgs, BindError>)>,
) -> Result<OverloadMatch<T>, NoMatch<T>> {
    let single = attempts.len() == 1;
    let mut viable = Vec::with_capacity(attempts.len());
    let mut rejected = None;

    for (candidate, outcome) in attempts {
        match outcome {
            Ok(bound) => viable.push(OverloadMatch { candidate, bound }),
            Err(error) => rejected = Some((candidate, error)),
        }
    }

    if viable.is_empty() {
        return match rejected {
            Some((candidate, error)) if single => Err(NoMatch::Rejected(candidate, error)),
            _ => Err(NoMatch::NoneViable),
        };
    }

    // Stable sort keeps declaration order among equal ranks.
    viable.sort_by_key(|m| m.bound.rank());
    let best = viable[0].bound.rank();
    let tied = viable.iter().filter(|m| m.bound.rank() == best).count();
    if tied > 1 {
        return Err(NoMatch::Ambiguous(
            viable
                .into_iter()
                .take(tied)
                .map(|m| m.candidate)
                .collect(),
        ));
    }

    let mut viable = viable.into_iter();
    viable.next().ok_or(NoMatch::NoneViable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objmodel_core::Value;

    fn bound(defaults_used: usize, vararg_used: bool, cost: u32) -> Result<BoundArgs, BindError> {
        Ok(BoundArgs {
            values: vec![("x".to_string(), Value::Unit)],
            defaults_used,
            vararg_used,
            cost,
        })
    }

    fn missing() -> Result<BoundArgs, BindError> {
        Err(BindError::MissingArgument { param: "x".into() })
    }

    #[test]
    fn exact_match_beats_defaults() {
        let winner = find_best_match(vec![
            ("defaulted", bound(1, false, 0)),
            ("exact", bound(0, false, 0)),
        ])
        .unwrap();
        assert_eq!(winner.candidate, "exact");
    }

    #[test]
    fn non_vararg_beats_vararg() {
        let winner =
            find_best_match(vec![("vararg", bound(0, true, 0)), ("plain", bound(0, false, 0))])
                .unwrap();
        assert_eq!(winner.candidate, "plain");
    }

    #[test]
    fn tie_is_ambiguous() {
        let err = find_best_match(vec![
            ("a", bound(0, false, 1)),
            ("b", bound(0, false, 1)),
            ("c", bound(0, false, 3)),
        ])
        .unwrap_err();
        assert_eq!(err, NoMatch::Ambiguous(vec!["a", "b"]));
    }

    #[test]
    fn single_candidate_reports_its_bind_error() {
        let err = find_best_match(vec![("only", missing())]).unwrap_err();
        assert!(matches!(
            err,
            NoMatch::Rejected("only", BindError::MissingArgument { .. })
        ));

        let err = find_best_match(vec![("a", missing()), ("b", missing())]).unwrap_err();
        assert_eq!(err, NoMatch::NoneViable);
    }

    #[test]
    fn failing_candidates_are_skipped() {
        let winner = find_best_match(vec![("a", missing()), ("b", bound(2, true, 9))]).unwrap();
        assert_eq!(winner.candidate, "b");
    }
}
