/*!
A Pike VM: parallel simulation of a [`NFA`] executing every active thread in
lockstep, one input byte at a time, under leftmost-first or
leftmost-longest semantics.
*/

use alloc::vec::Vec;

use crate::{
    nfa::thompson::{Look, State, NFA},
    util::{
        captures::Captures,
        primitives::StateID,
        search::{Anchored, Input, Match, MatchKind, Span},
        sparse_set::SparseSet,
    },
};

#[cfg(feature = "logging")]
use log::trace;

/// Pike VM configuration.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    match_kind: Option<MatchKind>,
}

impl Config {
    pub fn new() -> Config {
        Config { match_kind: None }
    }

    pub fn match_kind(mut self, kind: MatchKind) -> Config {
        self.match_kind = Some(kind);
        self
    }

    fn overwrite(self, defaults: Config) -> Config {
        Config { match_kind: self.match_kind.or(defaults.match_kind) }
    }

    fn get_match_kind(&self) -> MatchKind {
        self.match_kind.unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// A single thread of execution: the state it's waiting in, where it
/// started, its capture vector, its alternation priority (lower wins) and
/// whether it has ever taken the "free" left branch of an alternation.
#[derive(Clone)]
struct Thread {
    sid: StateID,
    start: usize,
    captures: Captures,
    priority: u32,
    took_left: bool,
}

/// A priority-ordered list of threads sharing one input position.
struct ThreadList {
    threads: Vec<Thread>,
    set: SparseSet,
}

impl ThreadList {
    fn new(num_states: usize) -> ThreadList {
        ThreadList { threads: Vec::new(), set: SparseSet::new(num_states) }
    }

    fn clear(&mut self) {
        self.threads.clear();
        self.set.clear();
    }
}

/// Executes an [`NFA`] by simulating all of its active states in lockstep.
///
/// Every public search method takes `&self`; all of the engine's mutable
/// working state lives on the stack of the call, so a `PikeVM` is freely
/// shareable across threads (the caller pays for its own thread-local
/// queues, never a lock).
pub struct PikeVM {
    nfa: NFA,
    config: Config,
}

impl PikeVM {
    pub fn new(nfa: NFA, config: Config) -> PikeVM {
        #[cfg(feature = "logging")]
        trace!("pikevm built with config {:?}", config);
        PikeVM { nfa, config }
    }

    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    pub fn set_longest(&mut self, yes: bool) {
        self.config.match_kind =
            Some(if yes { MatchKind::LeftmostLongest } else { MatchKind::LeftmostFirst });
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.try_is_match(Input::new(haystack))
    }

    pub fn try_is_match(&self, input: Input<'_>) -> bool {
        self.try_search_slots(&input, false).is_some()
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        self.try_search(&Input::new(haystack))
    }

    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Match> {
        self.try_search(&Input::new(haystack).span(at..haystack.len()))
    }

    pub fn search_between(&self, haystack: &[u8], start_at: usize, max_end: usize) -> Option<Match> {
        self.try_search(&Input::new(haystack).span(start_at..max_end))
    }

    pub fn try_search(&self, input: &Input<'_>) -> Option<Match> {
        let (span, _) = self.try_search_slots(input, false)?;
        Some(Match::new(
            input.get_pattern().unwrap_or(crate::util::primitives::PatternID::ZERO),
            span,
        ))
    }

    pub fn search_with_captures(&self, haystack: &[u8]) -> Option<(Match, Vec<Option<(usize, usize)>>)> {
        self.search_with_captures_at(haystack, 0)
    }

    pub fn search_with_captures_at(
        &self,
        haystack: &[u8],
        at: usize,
    ) -> Option<(Match, Vec<Option<(usize, usize)>>)> {
        let input = Input::new(haystack).span(at..haystack.len());
        let (span, caps) = self.try_search_slots(&input, true)?;
        let caps = caps.expect("captures requested");
        let groups = caps.group_spans(span.start, span.end);
        Some((Match::new(crate::util::primitives::PatternID::ZERO, span), groups))
    }

    pub fn search_all(&self, haystack: &[u8]) -> Vec<Match> {
        let mut out = Vec::new();
        let mut at = 0;
        while at <= haystack.len() {
            let input = Input::new(haystack).span(at..haystack.len());
            match self.try_search(&input) {
                None => break,
                Some(m) => {
                    at = if m.is_empty() { m.end() + 1 } else { m.end() };
                    out.push(m);
                }
            }
        }
        out
    }

    /// Core search loop. Returns the best match's span plus, when
    /// `want_captures` is true, its capture vector.
    fn try_search_slots(
        &self,
        input: &Input<'_>,
        want_captures: bool,
    ) -> Option<(Span, Option<Captures>)> {
        let num_states = self.nfa.num_states();
        let num_slots = self.nfa.capture_count() * 2;
        let match_kind = self.config.get_match_kind();

        let mut current = ThreadList::new(num_states);
        let mut next = ThreadList::new(num_states);

        let haystack = input.haystack();
        let anchored = input.get_anchored().is_anchored() || self.nfa.is_always_anchored();
        // Always seed at `start_anchored`: the outer per-position loop below
        // re-seeds a fresh thread at every position when the search is
        // unanchored, which is what actually realizes unanchored search
        // here. `start_unanchored`'s internal `.*?` prefix is for the
        // reverse NFA (`nfa::thompson::reverse`), not this loop: seeding
        // with it would let the prefix's own thread silently absorb the
        // unanchored retry and freeze `Thread::start` at the first seed.
        let start_seed = self.nfa.start_anchored();

        let mut best: Option<(usize, usize, u32)> = None;
        let mut best_captures: Option<Captures> = None;

        let start_at = input.start();
        let end_at = input.end();
        let mut pos = start_at;
        loop {
            if best.is_none() && (!anchored || pos == start_at) {
                let seed = Thread {
                    sid: start_seed,
                    start: pos,
                    captures: Captures::empty(num_slots.max(2)),
                    priority: 0,
                    took_left: false,
                };
                self.add_thread(&mut current, seed, haystack, pos, want_captures);
            }

            for i in 0..current.threads.len() {
                let t = &current.threads[i];
                if matches!(self.nfa.state(t.sid), State::Match { .. }) {
                    let candidate = (t.start, pos, t.priority);
                    if is_better(best, candidate, match_kind) {
                        best = Some(candidate);
                        if want_captures {
                            best_captures = Some(t.captures.clone());
                        }
                        if !match_kind.is_longest() {
                            // Leftmost-first: lower-priority threads queued
                            // after this one in `current` cannot improve on
                            // it (priority order), so we can stop scanning
                            // this position's queue.
                            break;
                        }
                    }
                }
            }

            if pos >= end_at {
                break;
            }
            if let Some((best_start, _, _)) = best {
                if !current.threads.iter().any(|t| t.start <= best_start) {
                    break;
                }
            }

            next.clear();
            let byte = haystack[pos];
            for i in 0..current.threads.len() {
                let t = current.threads[i].clone();
                self.step_thread(&mut next, t, haystack, pos, byte, want_captures);
            }
            core::mem::swap(&mut current, &mut next);
            pos += 1;
        }

        let (start, end, _) = best?;
        Some((Span { start, end }, best_captures))
    }

    /// Epsilon closure: pushes `seed` and everything reachable from it via
    /// epsilon/capture/look/split transitions onto `list`, in priority
    /// order, stopping at any input-consuming or match state.
    fn add_thread(
        &self,
        list: &mut ThreadList,
        seed: Thread,
        haystack: &[u8],
        pos: usize,
        want_captures: bool,
    ) {
        let mut stack = Vec::with_capacity(8);
        stack.push(seed);
        while let Some(mut t) = stack.pop() {
            loop {
                if !list.set.insert(t.sid) {
                    break;
                }
                match self.nfa.state(t.sid) {
                    State::Match { .. }
                    | State::ByteRange { .. }
                    | State::Sparse { .. }
                    | State::RuneAny { .. }
                    | State::RuneAnyNotNL { .. } => {
                        list.threads.push(t);
                        break;
                    }
                    State::Fail => break,
                    State::Epsilon { next } => {
                        t.sid = *next;
                    }
                    State::Capture { group_index, is_start, next } => {
                        if want_captures {
                            let slot = crate::util::captures::slot_index(*group_index, *is_start);
                            t.captures.update(slot, pos);
                        }
                        t.sid = *next;
                    }
                    State::Look { look, next } => {
                        if look_matches(*look, haystack, pos) {
                            t.sid = *next;
                        } else {
                            break;
                        }
                    }
                    State::Split { left, right, is_quantifier_split } => {
                        if *is_quantifier_split {
                            let mut right_t = t.clone();
                            if t.took_left {
                                right_t.priority = 0;
                                right_t.took_left = false;
                            }
                            right_t.sid = *right;
                            stack.push(right_t);
                            t.sid = *left;
                        } else {
                            let left_forced = matches!(
                                self.nfa.state(*left),
                                State::Look { look, .. } if look_matches(*look, haystack, pos)
                            );
                            let mut right_t = t.clone();
                            right_t.sid = *right;
                            if !left_forced {
                                right_t.priority = right_t.priority.saturating_add(1);
                            }
                            stack.push(right_t);
                            t.sid = *left;
                            t.took_left = true;
                        }
                    }
                }
            }
        }
    }

    /// Consumes `byte` for a single thread already in the current queue,
    /// advancing survivors into `next` via a fresh epsilon closure.
    fn step_thread(
        &self,
        next: &mut ThreadList,
        t: Thread,
        haystack: &[u8],
        pos: usize,
        byte: u8,
        want_captures: bool,
    ) {
        match self.nfa.state(t.sid) {
            State::ByteRange { trans } => {
                if trans.matches(byte) {
                    let mut nt = t;
                    nt.sid = trans.next;
                    self.add_thread(next, nt, haystack, pos + 1, want_captures);
                }
            }
            State::Sparse { transitions } => {
                if let Some(trans) = transitions.iter().find(|tr| tr.matches(byte)) {
                    let mut nt = t;
                    nt.sid = trans.next;
                    self.add_thread(next, nt, haystack, pos + 1, want_captures);
                }
            }
            State::RuneAny { next: target } | State::RuneAnyNotNL { next: target } => {
                let not_nl = matches!(self.nfa.state(t.sid), State::RuneAnyNotNL { .. });
                if (0x80..=0xBF).contains(&byte) {
                    // Mid-rune: carry the thread forward unchanged: it is
                    // waiting for the rune's last continuation byte.
                    self.requeue_mid_rune(next, t, pos + 1);
                    return;
                }
                if let Some(decoded) = crate::util::decode_utf8(&haystack[pos..]) {
                    let (ch, width) = match decoded {
                        Ok(c) => (c, c.len_utf8()),
                        Err(_) => ('\u{FFFD}', 1),
                    };
                    if !(not_nl && ch == '\n') {
                        let mut nt = t;
                        nt.sid = *target;
                        self.add_thread(next, nt, haystack, pos + width, want_captures);
                    }
                }
            }
            _ => unreachable!("non-consuming state in thread queue"),
        }
    }

    /// `RuneAny`/`RuneAnyNotNL` threads mid-rune are kept alive verbatim
    /// (no epsilon closure performed) until the rune's last byte is seen;
    /// this models "waiting inside a multi-byte match" without decoding
    /// prefixes repeatedly.
    fn requeue_mid_rune(&self, next: &mut ThreadList, t: Thread, _pos: usize) {
        if next.set.insert(t.sid) {
            next.threads.push(t);
        }
    }
}

fn is_better(
    best: Option<(usize, usize, u32)>,
    candidate: (usize, usize, u32),
    kind: MatchKind,
) -> bool {
    let (cand_start, cand_end, cand_prio) = candidate;
    match best {
        None => true,
        Some((best_start, best_end, best_prio)) => {
            if cand_start != best_start {
                return cand_start < best_start;
            }
            if kind.is_longest() {
                cand_end > best_end
            } else if cand_prio != best_prio {
                cand_prio < best_prio
            } else {
                cand_end > best_end
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

    fn build(ast: &Ast) -> PikeVM {
        let nfa = Compiler::new().build(ast).unwrap();
        PikeVM::new(nfa, Config::new())
    }

    fn lit(s: &str) -> Ast {
        Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
    }

    #[test]
    fn finds_simple_literal() {
        let vm = build(&lit("needle"));
        let m = vm.search(b"a needle in a haystack").unwrap();
        assert_eq!(m.range(), 2..8);
        assert_eq!(&b"a needle in a haystack"[m.range()], b"needle");
    }

    #[test]
    fn leftmost_first_prefers_earlier_alternative() {
        let ast = Ast::alternate(alloc::vec![lit("a"), lit("aa")]);
        let vm = build(&ast);
        let m = vm.search(b"aa").unwrap();
        assert_eq!(m.range(), 0..1);
    }

    #[test]
    fn leftmost_longest_prefers_longer_match() {
        let ast = Ast::alternate(alloc::vec![lit("a"), lit("aa")]);
        let mut vm = build(&ast);
        vm.set_longest(true);
        let m = vm.search(b"aa").unwrap();
        assert_eq!(m.range(), 0..2);
    }

    #[test]
    fn captures_group_bounds() {
        let inner = Ast::capture(lit("b"), 1, alloc::string::String::new());
        let ast = Ast::concat(alloc::vec![lit("a"), inner, lit("c")]);
        let vm = build(&ast);
        let (m, groups) = vm.search_with_captures(b"abc").unwrap();
        assert_eq!(m.range(), 0..3);
        assert_eq!(groups[1], Some((1, 2)));
    }

    #[test]
    fn word_boundary_respected() {
        let ast = Ast::concat(alloc::vec![Ast::look(crate::ast::Op::WordBoundary), lit("cat")]);
        let vm = build(&ast);
        assert!(vm.is_match(b"the cat sat"));
        assert!(!vm.is_match(b"concatenate"));
    }

    #[test]
    fn alternation_inside_plus_matches_maximally() {
        let inner = Ast::alternate(alloc::vec![lit("foo"), lit("bar")]);
        let ast = Ast::plus(inner, true);
        let vm = build(&ast);
        let m = vm.search(b"foobar").unwrap();
        assert_eq!(m.range(), 0..6);
    }

    #[test]
    fn nullable_star_body_terminates_on_empty_haystack() {
        // `(?:|a)*`: the body can match the empty string, so the closure
        // walk revisits the split's own target through its epsilon branch
        // on every iteration. Exercises the per-visit dedup check in
        // `add_thread`, not just the outer `stack.pop()` loop: without it
        // this search never returns.
        let inner = Ast::alternate(alloc::vec![Ast::empty_match(), lit("a")]);
        let ast = Ast::star(inner, true);
        let vm = build(&ast);
        let m = vm.search(b"").unwrap();
        assert_eq!(m.range(), 0..0);
    }
}
