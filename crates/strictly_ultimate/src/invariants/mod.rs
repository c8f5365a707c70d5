//! Properties a board or match must keep across every change.
//!
//! Board engines hold each authority snapshot against the mirror it would
//! replace ([`SnapshotInvariants`]); [`MatchState`](crate::MatchState) checks
//! its routing rules after each transition in debug builds
//! ([`MatchInvariants`]).

use derive_more::Display;

/// A named predicate over `S`.
pub trait Invariant<S> {
    /// Whether `state` satisfies the property.
    fn holds(state: &S) -> bool;

    /// What the property says, used in violation reports.
    fn description() -> &'static str;
}

/// An invariant that failed, by description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// Description of the failed invariant.
    pub description: &'static str,
}

impl InvariantViolation {
    /// Evaluates `I` against `state`, yielding a violation if it fails.
    pub fn check<S, I: Invariant<S>>(state: &S) -> Option<Self> {
        (!I::holds(state)).then(|| Self {
            description: I::description(),
        })
    }
}

/// Several invariants checked in one pass.
///
/// Tuples of invariants implement this; every member is evaluated so the
/// report lists all failures, not just the first.
pub trait InvariantSet<S> {
    /// Ok when every member holds; otherwise each failure in tuple order.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

macro_rules! impl_invariant_set {
    ($($member:ident),+) => {
        impl<S, $($member: Invariant<S>),+> InvariantSet<S> for ($($member,)+) {
            fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
                let violations: Vec<_> = [$(InvariantViolation::check::<S, $member>(state)),+]
                    .into_iter()
                    .flatten()
                    .collect();
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                }
            }
        }
    };
}

impl_invariant_set!(A);
impl_invariant_set!(A, B);
impl_invariant_set!(A, B, C);

pub mod grid_transition;
pub mod routing;

pub use grid_transition::{GridTransition, MoveRecorded, OutcomeMonotonic, WriteOnceCells};
pub use routing::{ActiveBoardOpen, TerminalIsFinal};

/// Everything an authoritative snapshot must satisfy relative to the mirror
/// it replaces.
pub type SnapshotInvariants = (WriteOnceCells, MoveRecorded, OutcomeMonotonic);

/// Everything the match state must satisfy between transitions.
pub type MatchInvariants = (ActiveBoardOpen, TerminalIsFinal);
