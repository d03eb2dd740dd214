/*!
Incremental construction of an [`NFA`](super::NFA): state allocation,
patching and validation.
*/

use alloc::{string::String, vec, vec::Vec};

use crate::{
    error::BuildError,
    nfa::thompson::{Look, State, Transition, FAIL, INVALID, NFA},
    util::{
        alphabet::ByteClassBuilder,
        primitives::{PatternID, SmallIndex, StateID},
    },
};

/// A freshly allocated fragment of the NFA: `start` is its entry state;
/// `end` is a placeholder the caller must [`Builder::patch`] to whatever
/// comes next once it's known.
#[derive(Clone, Copy, Debug)]
pub struct ThompsonRef {
    pub start: StateID,
    pub end: StateID,
}

/// Accumulates states for an [`NFA`](super::NFA) under construction.
///
/// States are allocated with placeholder `next`/`left`/`right` fields set
/// to [`INVALID`]; callers patch them in once the successor state is
/// known. [`Builder::build`] validates that every placeholder has been
/// filled before handing back a finished [`NFA`].
pub struct Builder {
    states: Vec<State>,
    start_anchored: StateID,
    start_unanchored: StateID,
    anchored: bool,
    utf8: bool,
    capture_count: usize,
    capture_names: Vec<String>,
    classes: ByteClassBuilder,
}

impl Builder {
    pub fn new() -> Builder {
        let mut b = Builder {
            states: Vec::new(),
            start_anchored: INVALID,
            start_unanchored: INVALID,
            anchored: false,
            utf8: true,
            capture_count: 0,
            capture_names: vec![String::new()],
            classes: ByteClassBuilder::new(),
        };
        let fail_id = b.states.len();
        b.states.push(State::Fail);
        debug_assert_eq!(StateID::new_unchecked(fail_id), FAIL);
        b
    }

    pub fn set_utf8(&mut self, yes: bool) {
        self.utf8 = yes;
    }

    pub fn set_anchored(&mut self, yes: bool) {
        self.anchored = yes;
    }

    /// Reserves a new capture group, returning its index. Group `0` (the
    /// whole match) is implicit and already reserved by `new()`.
    pub fn add_capture(&mut self, name: Option<String>) -> SmallIndex {
        let index = self.capture_names.len();
        self.capture_names.push(name.unwrap_or_default());
        self.capture_count = self.capture_names.len();
        SmallIndex::new(index)
    }

    fn push(&mut self, state: State) -> StateID {
        let id = StateID::new(self.states.len()).expect("state id space exhausted");
        self.states.push(state);
        id
    }

    pub fn allocate_match(&mut self, pattern_id: PatternID) -> StateID {
        self.push(State::Match { pattern_id })
    }

    pub fn allocate_byte_range(&mut self, lo: u8, hi: u8) -> ThompsonRef {
        self.classes.set_range(lo, hi);
        let id = self.push(State::ByteRange {
            trans: Transition { lo, hi, next: INVALID },
        });
        ThompsonRef { start: id, end: id }
    }

    /// Like [`Self::allocate_byte_range`], but with `next` already resolved
    /// (see [`Self::allocate_sparse_fixed`] for why this is needed).
    pub fn allocate_byte_range_fixed(&mut self, lo: u8, hi: u8, next: StateID) -> StateID {
        self.classes.set_range(lo, hi);
        self.push(State::ByteRange { trans: Transition { lo, hi, next } })
    }

    pub fn allocate_sparse(&mut self, mut transitions: Vec<Transition>) -> ThompsonRef {
        for t in &mut transitions {
            self.classes.set_range(t.lo, t.hi);
            t.next = INVALID;
        }
        let id = self.push(State::Sparse { transitions });
        ThompsonRef { start: id, end: id }
    }

    /// Like [`Self::allocate_sparse`], but each transition's `next` is kept
    /// as given rather than reset to `INVALID`. Used when the transitions
    /// already point at distinct, already-built continuations (e.g. the
    /// leading byte of several UTF-8 suffix chains that each end at the
    /// same class exit but take different routes to get there), so there
    /// is no single uniform successor left to patch later.
    pub fn allocate_sparse_fixed(&mut self, transitions: Vec<Transition>) -> StateID {
        for t in &transitions {
            self.classes.set_range(t.lo, t.hi);
        }
        self.push(State::Sparse { transitions })
    }

    pub fn allocate_split(&mut self) -> StateID {
        self.push(State::Split { left: INVALID, right: INVALID, is_quantifier_split: false })
    }

    pub fn allocate_quantifier_split(&mut self) -> StateID {
        self.push(State::Split { left: INVALID, right: INVALID, is_quantifier_split: true })
    }

    pub fn allocate_epsilon(&mut self) -> StateID {
        self.push(State::Epsilon { next: INVALID })
    }

    pub fn allocate_capture(&mut self, group_index: SmallIndex, is_start: bool) -> StateID {
        self.push(State::Capture { group_index, is_start, next: INVALID })
    }

    pub fn allocate_look(&mut self, look: Look) -> StateID {
        self.push(State::Look { look, next: INVALID })
    }

    pub fn allocate_rune_any(&mut self) -> StateID {
        self.push(State::RuneAny { next: INVALID })
    }

    pub fn allocate_rune_any_not_nl(&mut self) -> StateID {
        self.push(State::RuneAnyNotNL { next: INVALID })
    }

    pub fn allocate_fail(&mut self) -> StateID {
        FAIL
    }

    /// Pushes a brand new, distinct dead-end state (as opposed to
    /// [`Self::allocate_fail`], which hands back the single shared
    /// sentinel). Used by the reverse-NFA transducer, where a state with no
    /// incoming forward edges needs its own identity in the reversed graph
    /// even though it behaves exactly like `FAIL`.
    pub fn allocate_dead(&mut self) -> StateID {
        self.push(State::Fail)
    }

    /// Patches the single `next` edge of a single-successor state.
    pub fn patch(&mut self, id: StateID, target: StateID) -> Result<(), BuildError> {
        let state = self
            .states
            .get_mut(id.as_usize())
            .ok_or_else(|| BuildError::out_of_bounds(id))?;
        match state {
            State::ByteRange { trans } => trans.next = target,
            State::Sparse { transitions } => {
                for t in transitions.iter_mut() {
                    t.next = target;
                }
            }
            State::Epsilon { next } => *next = target,
            State::Capture { next, .. } => *next = target,
            State::Look { next, .. } => *next = target,
            State::RuneAny { next } => *next = target,
            State::RuneAnyNotNL { next } => *next = target,
            State::Split { .. } => return Err(BuildError::not_a_split(id)),
            State::Match { .. } | State::Fail => return Err(BuildError::not_a_split(id)),
        }
        Ok(())
    }

    /// Patches a `Sparse` state's transitions with distinct targets, one per
    /// transition, in order. Unlike [`Self::patch`], which forces every
    /// transition in a sparse state to the same successor, this is for the
    /// reverse-NFA transducer where each range in a merged sparse state may
    /// lead back to a different predecessor.
    pub fn patch_sparse(&mut self, id: StateID, targets: &[StateID]) -> Result<(), BuildError> {
        match self.states.get_mut(id.as_usize()) {
            Some(State::Sparse { transitions }) => {
                if transitions.len() != targets.len() {
                    return Err(BuildError::not_a_split(id));
                }
                for (t, &target) in transitions.iter_mut().zip(targets) {
                    t.next = target;
                }
                Ok(())
            }
            Some(_) => Err(BuildError::not_a_split(id)),
            None => Err(BuildError::out_of_bounds(id)),
        }
    }

    pub fn patch_split(
        &mut self,
        id: StateID,
        left: StateID,
        right: StateID,
    ) -> Result<(), BuildError> {
        match self.states.get_mut(id.as_usize()) {
            Some(State::Split { left: l, right: r, .. }) => {
                *l = left;
                *r = right;
                Ok(())
            }
            Some(_) => Err(BuildError::not_a_split(id)),
            None => Err(BuildError::out_of_bounds(id)),
        }
    }

    pub fn set_starts(&mut self, anchored: StateID, unanchored: StateID) {
        self.start_anchored = anchored;
        self.start_unanchored = unanchored;
    }

    pub fn set_start(&mut self, id: StateID) {
        self.set_starts(id, id);
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.start_anchored == INVALID || self.start_unanchored == INVALID {
            return Err(BuildError::start_unset());
        }
        let in_range = |id: StateID| id.as_usize() < self.states.len();
        if !in_range(self.start_anchored) {
            return Err(BuildError::out_of_bounds(self.start_anchored));
        }
        if !in_range(self.start_unanchored) {
            return Err(BuildError::out_of_bounds(self.start_unanchored));
        }
        for (i, state) in self.states.iter().enumerate() {
            let id = StateID::new_unchecked(i);
            let check = |next: StateID| -> Result<(), BuildError> {
                if next == INVALID {
                    return Err(BuildError::dangling_edge(id));
                }
                if !in_range(next) {
                    return Err(BuildError::out_of_bounds(next));
                }
                Ok(())
            };
            match state {
                State::Fail | State::Match { .. } => {}
                State::ByteRange { trans } => check(trans.next)?,
                State::Sparse { transitions } => {
                    for t in transitions {
                        check(t.next)?;
                    }
                }
                State::Split { left, right, .. } => {
                    check(*left)?;
                    check(*right)?;
                }
                State::Epsilon { next }
                | State::Capture { next, .. }
                | State::Look { next, .. }
                | State::RuneAny { next }
                | State::RuneAnyNotNL { next } => check(*next)?,
            }
        }
        Ok(())
    }

    pub fn build(self) -> Result<NFA, BuildError> {
        self.validate()?;
        let byte_classes = self.classes.build();
        Ok(NFA::new(
            self.states,
            self.start_anchored,
            self.start_unanchored,
            self.anchored,
            self.utf8,
            self.capture_count,
            self.capture_names,
            byte_classes,
        ))
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}
