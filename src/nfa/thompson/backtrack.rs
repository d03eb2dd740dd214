/*!
A bounded backtracker: a depth-first [`NFA`] simulation that mirrors the
[`pikevm`](super::pikevm)'s epsilon-closure rules with a single thread and
immediate backtracking, instead of keeping every thread alive in lockstep.

Unlike the Pike VM, this engine is only correct (in the sense of running in
bounded time and memory) when `nfa.num_states() * (haystack.len() + 1)` is
small: its visited set is one entry per `(state, position)` pair, and it
refuses to revisit a pair within a single search. Callers must check
[`BoundedBacktracker::can_handle`] (or let [`BoundedBacktracker::try_search`]
do it for them) before relying on a result.
*/

use alloc::vec;
use alloc::vec::Vec;

use crate::{
    nfa::thompson::{Look, State, NFA},
    util::{
        primitives::StateID,
        search::{Anchored, Input, Match, MatchError, MatchKind, Span},
    },
};

#[cfg(feature = "logging")]
use log::trace;

/// The default visited-set budget: `2^22` `(state, position)` cells, a
/// couple megabytes of generation counters.
const DEFAULT_VISITED_CAPACITY: usize = 1 << 22;

/// Bounded backtracker configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    match_kind: Option<MatchKind>,
    visited_capacity: Option<usize>,
}

impl Config {
    pub fn new() -> Config {
        Config { match_kind: None, visited_capacity: None }
    }

    pub fn match_kind(mut self, kind: MatchKind) -> Config {
        self.match_kind = Some(kind);
        self
    }

    /// The maximum `num_states * (len(haystack) + 1)` product this engine
    /// will accept. Exceeding it makes every public search method report
    /// "cannot handle" rather than attempt a search whose memory use would
    /// be unbounded.
    pub fn visited_capacity(mut self, capacity: usize) -> Config {
        self.visited_capacity = Some(capacity);
        self
    }

    fn overwrite(self, defaults: Config) -> Config {
        Config {
            match_kind: self.match_kind.or(defaults.match_kind),
            visited_capacity: self.visited_capacity.or(defaults.visited_capacity),
        }
    }

    fn get_match_kind(&self) -> MatchKind {
        self.match_kind.unwrap_or_default()
    }

    fn get_visited_capacity(&self) -> usize {
        self.visited_capacity.unwrap_or(DEFAULT_VISITED_CAPACITY)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// A generation-indexed `(state, position)` visited set.
///
/// Each cell stores the generation at which it was last marked; a cell is a
/// member of the current visited set iff its stored generation equals the
/// live one. Bumping the generation is how the whole table is "cleared" in
/// O(1); only on `u16` overflow does clearing cost a real `O(len)` pass.
struct Visited {
    table: Vec<u16>,
    generation: u16,
    stride: usize,
}

impl Visited {
    fn new() -> Visited {
        Visited { table: Vec::new(), generation: 1, stride: 0 }
    }

    /// Resizes (if needed) and resets the table for a search over
    /// `num_states` NFA states and a haystack of `len` bytes.
    fn reset(&mut self, num_states: usize, len: usize) {
        self.stride = len + 1;
        let needed = num_states * self.stride;
        if self.table.len() < needed {
            self.table.resize(needed, 0);
        }
        if self.generation == u16::MAX {
            self.table[..needed].iter_mut().for_each(|c| *c = 0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    /// Marks `(sid, pos)` visited, returning `true` if it was already a
    /// member (meaning the caller must not explore it again).
    #[inline]
    fn insert(&mut self, sid: StateID, pos: usize) -> bool {
        let idx = sid.as_usize() * self.stride + pos;
        let already = self.table[idx] == self.generation;
        self.table[idx] = self.generation;
        already
    }
}

/// Per-call mutable state for the backtracker, reusable across searches via
/// [`BoundedBacktracker::search_with_state`].
pub struct Cache {
    visited: Visited,
}

impl Cache {
    pub fn new() -> Cache {
        Cache { visited: Visited::new() }
    }
}

impl Default for Cache {
    fn default() -> Cache {
        Cache::new()
    }
}

/// A bounded recursive backtracker.
///
/// Like the Pike VM, every public method takes `&self`, so a
/// `BoundedBacktracker` is freely shareable across threads; callers own
/// their [`Cache`] (or use the internally-allocated convenience methods).
pub struct BoundedBacktracker {
    nfa: NFA,
    config: Config,
}

impl BoundedBacktracker {
    pub fn new(nfa: NFA, config: Config) -> BoundedBacktracker {
        #[cfg(feature = "logging")]
        trace!("bounded backtracker built with config {:?}", config);
        BoundedBacktracker { nfa, config }
    }

    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// The largest haystack length this engine will accept for the current
    /// NFA, given its configured visited-set budget.
    pub fn max_input_size(&self) -> usize {
        let states = self.nfa.num_states().max(1);
        self.config.get_visited_capacity() / states
    }

    /// Returns true iff a search over a haystack of `len` bytes stays
    /// within this engine's configured budget.
    pub fn can_handle(&self, len: usize) -> bool {
        let states = self.nfa.num_states();
        match states.checked_mul(len + 1) {
            Some(product) => product <= self.config.get_visited_capacity(),
            None => false,
        }
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        let mut state = Cache::new();
        self.try_is_match(&mut state, &Input::new(haystack)).unwrap_or(false)
    }

    pub fn is_match_anchored(&self, haystack: &[u8]) -> bool {
        let mut state = Cache::new();
        let input = Input::new(haystack).anchored(Anchored::Yes);
        self.try_is_match(&mut state, &input).unwrap_or(false)
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        let mut state = Cache::new();
        self.search_with_state(&mut state, &Input::new(haystack)).ok().flatten()
    }

    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Match> {
        let mut state = Cache::new();
        let input = Input::new(haystack).span(at..haystack.len());
        self.search_with_state(&mut state, &input).ok().flatten()
    }

    pub fn try_is_match(
        &self,
        state: &mut Cache,
        input: &Input<'_>,
    ) -> Result<bool, MatchError> {
        Ok(self.try_search(state, input)?.is_some())
    }

    pub fn try_search(
        &self,
        state: &mut Cache,
        input: &Input<'_>,
    ) -> Result<Option<Match>, MatchError> {
        self.search_with_state(state, input)
    }

    /// Searches using a caller-supplied, reusable [`Cache`].
    ///
    /// Returns `Err` (rather than silently searching anyway) when
    /// `haystack.len()` would exceed this engine's budget: the contract is
    /// that a caller who ignores the error gets `None`, not a wrong answer.
    pub fn search_with_state(
        &self,
        state: &mut Cache,
        input: &Input<'_>,
    ) -> Result<Option<Match>, MatchError> {
        let haystack = input.haystack();
        if !self.can_handle(haystack.len()) {
            return Err(MatchError::haystack_too_long(haystack.len()));
        }
        let num_states = self.nfa.num_states();
        let match_kind = self.config.get_match_kind();
        let anchored = input.get_anchored().is_anchored() || self.nfa.is_always_anchored();
        // As in the Pike VM, always walk from `start_anchored`: the `at`
        // retry loop below is what realizes unanchored search, by trying
        // every position in turn. Seeding with `start_unanchored` would let
        // its internal `.*?` prefix match the retry itself, freezing the
        // reported start at whatever position first reached here.
        let start_seed = self.nfa.start_anchored();

        let start_at = input.start();
        let end_at = input.end();
        let mut at = start_at;
        loop {
            state.visited.reset(num_states, haystack.len());
            let mut found_end = None;
            let mut engine = Engine {
                nfa: &self.nfa,
                haystack,
                visited: &mut state.visited,
                match_kind,
                best_end: &mut found_end,
            };
            engine.run(start_seed, at);
            if let Some(end) = found_end {
                return Ok(Some(Match::new(
                    input.get_pattern().unwrap_or(crate::util::primitives::PatternID::ZERO),
                    Span { start: at, end },
                )));
            }
            if anchored || at >= end_at {
                return Ok(None);
            }
            at += 1;
        }
    }
}

/// The actual depth-first walk, borrowed fresh for each starting position so
/// it can close over `best_end` without fighting the borrow checker across
/// `BoundedBacktracker::search_with_state`'s retry loop.
struct Engine<'a> {
    nfa: &'a NFA,
    haystack: &'a [u8],
    visited: &'a mut Visited,
    match_kind: MatchKind,
    best_end: &'a mut Option<usize>,
}

impl<'a> Engine<'a> {
    /// Runs the backtracker from `(sid, pos)`. Returns `true` if the caller
    /// (under leftmost-first semantics) should stop exploring siblings,
    /// i.e. a match was found and greedy precedence means nothing later can
    /// win. Leftmost-longest never short-circuits: it keeps exploring for a
    /// longer end and relies on `best_end` to track the winner.
    fn run(&mut self, sid: StateID, pos: usize) -> bool {
        if self.visited.insert(sid, pos) {
            return false;
        }
        match self.nfa.state(sid) {
            State::Match { .. } => {
                let better = match *self.best_end {
                    None => true,
                    Some(e) => pos > e,
                };
                if better {
                    *self.best_end = Some(pos);
                }
                !self.match_kind.is_longest()
            }
            State::Fail => false,
            State::Epsilon { next } => self.run(*next, pos),
            State::Capture { next, .. } => self.run(*next, pos),
            State::Look { look, next } => {
                if look_matches(*look, self.haystack, pos) {
                    self.run(*next, pos)
                } else {
                    false
                }
            }
            State::Split { left, right, .. } => {
                if self.run(*left, pos) {
                    return true;
                }
                self.run(*right, pos)
            }
            State::ByteRange { trans } => {
                if pos < self.haystack.len() && trans.matches(self.haystack[pos]) {
                    self.run(trans.next, pos + 1)
                } else {
                    false
                }
            }
            State::Sparse { transitions } => {
                if pos >= self.haystack.len() {
                    return false;
                }
                let byte = self.haystack[pos];
                match transitions.iter().find(|t| t.matches(byte)) {
                    Some(t) => self.run(t.next, pos + 1),
                    None => false,
                }
            }
            State::RuneAny { next } | State::RuneAnyNotNL { next } => {
                let not_nl = matches!(self.nfa.state(sid), State::RuneAnyNotNL { .. });
                let next = *next;
                if pos >= self.haystack.len() {
                    return false;
                }
                match crate::util::decode_utf8(&self.haystack[pos..]) {
                    None => false,
                    Some(decoded) => {
                        let (ch, width) = match decoded {
                            Ok(c) => (c, c.len_utf8()),
                            Err(_) => ('\u{FFFD}', 1),
                        };
                        if not_nl && ch == '\n' {
                            false
                        } else {
                            self.run(next, pos + width)
                        }
                    }
                }
            }
        }
    }
}

fn look_matches(look: Look, haystack: &[u8], pos: usize) -> bool {
    let is_word = |b: Option<u8>| b.is_some_and(crate::util::is_word_byte);
    match look {
        Look::StartText => pos == 0,
        Look::EndText => pos == haystack.len(),
        Look::StartLine => pos == 0 || haystack[pos - 1] == b'\n',
        Look::EndLine => pos == haystack.len() || haystack[pos] == b'\n',
        Look::WordBoundary => {
            is_word(pos.checked_sub(1).and_then(|i| haystack.get(i).copied()))
                != is_word(haystack.get(pos).copied())
        }
        Look::NoWordBoundary => {
            is_word(pos.checked_sub(1).and_then(|i| haystack.get(i).copied()))
                == is_word(haystack.get(pos).copied())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Ast, Flags},
        nfa::thompson::Compiler,
    };

    fn build(ast: &Ast) -> BoundedBacktracker {
        let nfa = Compiler::new().build(ast).unwrap();
        BoundedBacktracker::new(nfa, Config::new())
    }

    fn lit(s: &str) -> Ast {
        Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
    }

    #[test]
    fn finds_simple_literal() {
        let bt = build(&lit("needle"));
        let m = bt.search(b"a needle in a haystack").unwrap();
        assert_eq!(m.range(), 2..8);
        assert_eq!(&b"a needle in a haystack"[m.range()], b"needle");
    }

    #[test]
    fn leftmost_first_prefers_earlier_alternative() {
        let ast = Ast::alternate(alloc::vec![lit("a"), lit("aa")]);
        let bt = build(&ast);
        let m = bt.search(b"aa").unwrap();
        assert_eq!(m.range(), 0..1);
    }

    #[test]
    fn leftmost_longest_prefers_longer_match() {
        let ast = Ast::alternate(alloc::vec![lit("a"), lit("aa")]);
        let nfa = Compiler::new().build(&ast).unwrap();
        let bt = BoundedBacktracker::new(
            nfa,
            Config::new().match_kind(MatchKind::LeftmostLongest),
        );
        let m = bt.search(b"aa").unwrap();
        assert_eq!(m.range(), 0..2);
    }

    #[test]
    fn refuses_to_handle_oversized_input() {
        let bt = build(&lit("a"));
        let small = BoundedBacktracker::new(
            Compiler::new().build(&lit("a")).unwrap(),
            Config::new().visited_capacity(4),
        );
        assert!(!small.can_handle(100));
        assert!(bt.can_handle(100));
    }

    #[test]
    fn agrees_with_pikevm_on_in_budget_inputs() {
        use crate::nfa::thompson::pikevm::{Config as PikeConfig, PikeVM};

        let ast = Ast::concat(alloc::vec![
            Ast::plus(Ast::char_class(alloc::vec![(b'a' as u32, b'z' as u32)]), true),
            lit("@"),
            Ast::plus(Ast::char_class(alloc::vec![(b'a' as u32, b'z' as u32)]), true),
        ]);
        let nfa = Compiler::new().build(&ast).unwrap();
        let vm = PikeVM::new(nfa.clone(), PikeConfig::new());
        let bt = BoundedBacktracker::new(nfa, Config::new());
        let haystack = b"contact me at user@example in the morning";
        assert_eq!(vm.search(haystack), bt.search(haystack));
    }

    #[test]
    fn unanchored_search_reports_true_start_past_first_position() {
        let bt = build(&lit("needle"));
        let m = bt.search(b"xxxneedlexxx").unwrap();
        assert_eq!(m.range(), 3..9);
    }
}
