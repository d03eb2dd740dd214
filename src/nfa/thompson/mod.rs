/*!
The Thompson NFA: an immutable state graph produced by [`Compiler`] and
consumed by every execution engine in this crate.
*/

use alloc::{string::String, vec::Vec};

use crate::util::{alphabet::ByteClasses, primitives::StateID};

pub mod builder;
pub mod compiler;
#[cfg(feature = "nfa-backtrack")]
pub mod backtrack;
#[cfg(feature = "nfa-pikevm")]
pub mod pikevm;
#[cfg(feature = "alloc")]
pub mod reverse;

pub use self::builder::Builder;
pub use self::compiler::{Compiler, Config};

/// The sentinel state ID meaning "not yet patched". A fully built NFA
/// never contains this value in a reachable edge.
pub const INVALID: StateID = StateID::MAX;

/// The sentinel state ID for the distinguished always-fails state. Unlike
/// `INVALID`, this is a real, reachable state: every NFA's state vector has
/// exactly one `State::Fail` at this ID, and patching an edge to `FAIL` is
/// a normal (if unusual) way to express "this path can never continue".
pub const FAIL: StateID = StateID::ZERO;

/// A single zero-width assertion kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Look {
    StartText,
    EndText,
    StartLine,
    EndLine,
    WordBoundary,
    NoWordBoundary,
}

/// A labeled edge: match any byte in `[lo, hi]`, then continue at `next`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transition {
    pub lo: u8,
    pub hi: u8,
    pub next: StateID,
}

impl Transition {
    #[inline]
    pub fn matches(&self, byte: u8) -> bool {
        self.lo <= byte && byte <= self.hi
    }
}

/// A single state in the NFA's state graph.
///
/// States are addressed by their index in [`NFA`]'s state vector; a state
/// never owns another state, only an opaque [`StateID`] pointing back into
/// the same vector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum State {
    /// This pattern has matched; there is no further input to consume.
    Match { pattern_id: crate::util::primitives::PatternID },
    /// Matches a single byte in `[lo, hi]`, then continues at `next`.
    ByteRange { trans: Transition },
    /// Matches a single byte against a sorted, pairwise-disjoint list of
    /// ranges, continuing at the matching range's `next`.
    Sparse { transitions: Vec<Transition> },
    /// A two-way epsilon branch. `is_quantifier_split` distinguishes a
    /// split introduced by `*`/`+`/`?` from one introduced by `|`; the Pike
    /// VM's priority bookkeeping (§4.5) depends on telling them apart.
    Split { left: StateID, right: StateID, is_quantifier_split: bool },
    /// An unconditional epsilon transition.
    Epsilon { next: StateID },
    /// Marks the start (`is_start = true`) or end of capture group
    /// `group_index`, recording the current position into the
    /// corresponding capture slot, then continuing at `next`.
    Capture { group_index: crate::util::primitives::SmallIndex, is_start: bool, next: StateID },
    /// A zero-width assertion; continues at `next` only if it holds at the
    /// current position.
    Look { look: Look, next: StateID },
    /// Matches one UTF-8 encoded scalar value of any kind, then continues
    /// at `next`. An optimization over the full UTF-8 dot automaton that
    /// the Pike VM and backtracker know how to execute directly.
    RuneAny { next: StateID },
    /// Like `RuneAny`, but excludes `\n`.
    RuneAnyNotNL { next: StateID },
    /// A state with no outgoing edges; reaching it means this path cannot
    /// continue. The unique state at ID `FAIL` is this variant.
    Fail,
}

impl State {
    /// Returns true if every input byte leads to at least one transition;
    /// used by the compiler to validate translated fragments.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self,
            State::Epsilon { .. }
                | State::Split { .. }
                | State::Capture { .. }
                | State::Look { .. }
        )
    }
}

/// An immutable, compiled NFA.
///
/// Built once by [`Compiler`]/[`Builder`] and never mutated afterward;
/// freely shareable across threads (§5) since nothing about it changes
/// after `build()` returns.
#[derive(Clone, Debug)]
pub struct NFA {
    states: Vec<State>,
    start_anchored: StateID,
    start_unanchored: StateID,
    anchored: bool,
    utf8: bool,
    capture_count: usize,
    capture_names: Vec<String>,
    byte_classes: ByteClasses,
}

impl NFA {
    pub(crate) fn new(
        states: Vec<State>,
        start_anchored: StateID,
        start_unanchored: StateID,
        anchored: bool,
        utf8: bool,
        capture_count: usize,
        capture_names: Vec<String>,
        byte_classes: ByteClasses,
    ) -> NFA {
        NFA {
            states,
            start_anchored,
            start_unanchored,
            anchored,
            utf8,
            capture_count,
            capture_names,
            byte_classes,
        }
    }

    #[inline]
    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.as_usize()]
    }

    #[inline]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn start_anchored(&self) -> StateID {
        self.start_anchored
    }

    #[inline]
    pub fn start_unanchored(&self) -> StateID {
        self.start_unanchored
    }

    /// True when both starts coincide, i.e. every search through this NFA
    /// behaves as anchored regardless of what the caller asks for.
    #[inline]
    pub fn is_always_anchored(&self) -> bool {
        self.start_anchored == self.start_unanchored
    }

    #[inline]
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    #[inline]
    pub fn is_utf8(&self) -> bool {
        self.utf8
    }

    /// This core only ever compiles a single pattern per NFA (multi-pattern
    /// compilation belongs to the upstream façade that is out of scope
    /// here), so this is always `1`.
    #[inline]
    pub fn pattern_count(&self) -> usize {
        1
    }

    #[inline]
    pub fn capture_count(&self) -> usize {
        self.capture_count
    }

    #[inline]
    pub fn capture_name(&self, group: usize) -> Option<&str> {
        self.capture_names.get(group).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }

    #[inline]
    pub fn subexp_names(&self) -> &[String] {
        &self.capture_names
    }

    #[inline]
    pub fn byte_classes(&self) -> &ByteClasses {
        &self.byte_classes
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateID> {
        StateID::iter(self.states.len())
    }
}
