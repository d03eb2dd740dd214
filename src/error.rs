/*!
Error types returned by the [`crate::ast::Compiler`] and by
[`crate::nfa::thompson::Builder`].

Every variant here is a terminal failure: unlike the engines (which are
total and report "no match" rather than failing), building an `NFA` either
succeeds completely or fails with one of these.
*/

use core::fmt;

/// An error that occurs when translating an AST into an NFA, or when the
/// builder backing that translation is asked to do something invalid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildError {
    kind: BuildErrorKind,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum BuildErrorKind {
    /// The AST itself is malformed, e.g. a `Repeat` node with `min > max`.
    InvalidPattern { message: &'static str },
    /// AST recursion exceeded the compiler's configured
    /// `max_recursion_depth`, or the node count exceeded an internal bound.
    TooComplex { message: &'static str },
    /// The compiler's `Config` is self-contradictory.
    InvalidConfig { message: &'static str },
    /// The builder was asked to patch an edge to a `StateID` outside the
    /// range of states it has allocated.
    OutOfBounds { id: crate::util::primitives::StateID },
    /// A built NFA would contain an edge pointing at `INVALID`, other than
    /// the permitted `Fail` state's (nonexistent) edges.
    DanglingEdge { id: crate::util::primitives::StateID },
    /// `build()` was called before `set_start`/`set_starts`.
    StartUnset,
    /// `patch_split` was called on a state that isn't a `Split`.
    NotASplit { id: crate::util::primitives::StateID },
}

impl BuildError {
    pub fn invalid_pattern(message: &'static str) -> BuildError {
        BuildError { kind: BuildErrorKind::InvalidPattern { message } }
    }

    pub fn too_complex(message: &'static str) -> BuildError {
        BuildError { kind: BuildErrorKind::TooComplex { message } }
    }

    pub fn invalid_config(message: &'static str) -> BuildError {
        BuildError { kind: BuildErrorKind::InvalidConfig { message } }
    }

    pub fn out_of_bounds(id: crate::util::primitives::StateID) -> BuildError {
        BuildError { kind: BuildErrorKind::OutOfBounds { id } }
    }

    pub fn dangling_edge(id: crate::util::primitives::StateID) -> BuildError {
        BuildError { kind: BuildErrorKind::DanglingEdge { id } }
    }

    pub fn start_unset() -> BuildError {
        BuildError { kind: BuildErrorKind::StartUnset }
    }

    pub fn not_a_split(id: crate::util::primitives::StateID) -> BuildError {
        BuildError { kind: BuildErrorKind::NotASplit { id } }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            BuildErrorKind::InvalidPattern { message } => {
                write!(f, "invalid pattern: {}", message)
            }
            BuildErrorKind::TooComplex { message } => {
                write!(f, "pattern too complex: {}", message)
            }
            BuildErrorKind::InvalidConfig { message } => {
                write!(f, "invalid compiler configuration: {}", message)
            }
            BuildErrorKind::OutOfBounds { id } => {
                write!(f, "state id {:?} is out of bounds", id)
            }
            BuildErrorKind::DanglingEdge { id } => {
                write!(f, "state {:?} has a dangling (invalid) edge", id)
            }
            BuildErrorKind::StartUnset => {
                write!(f, "nfa builder finished without a start state set")
            }
            BuildErrorKind::NotASplit { id } => {
                write!(f, "state {:?} is not a split state", id)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}
