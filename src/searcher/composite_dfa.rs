/*!
`CompositeSequenceDFA`: the same domain as [`crate::searcher::CompositeSearcher`]
(a fixed sequence of quantified ASCII character classes) but compiled ahead
of time into a dense DFA, for patterns where every part requires at least
one byte. Search is then a single forward scan with no backtracking.

The DFA is built by subset construction over an NFA whose "items" are
`Start(part)` ("about to consume the first byte of `part`") and
`Count(part, n)` ("consumed `n` bytes of `part` so far, possibly having
already passed its minimum"). Each part contributes at most
`count_cap(part) + 1` items, so the construction is only attempted when
every part's minimum (and, if finite, maximum) is small; patterns that
would blow up the subset construction fall back to the general engines.
*/

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec,
    vec::Vec,
};

use crate::{
    ast::{Ast, Op},
    searcher::byteset::{ascii_ranges_of, ByteSet},
    util::{
        alphabet::{ByteClassBuilder, ByteClasses},
        primitives::PatternID,
        search::{Match, Span},
    },
};

/// The maximum number of distinct `Count` states a single part may need;
/// chosen so the subset construction across up to 8 parts stays small
/// (well under a thousand configurations in the worst case).
const MAX_PART_STATES: usize = 32;

/// The maximum number of parts this searcher will compile a DFA for.
const MAX_PARTS: usize = 8;

const DEAD: u32 = u32::MAX;

#[derive(Clone)]
struct PartSpec {
    member: ByteSet,
    min_match: usize,
    /// The highest distinct count worth tracking: `min(max_match, ...)`
    /// when `max_match` is finite, else `min_match.max(1)` (beyond which
    /// every further repetition behaves identically: still within bounds,
    /// past the minimum).
    count_cap: usize,
    /// Whether `count_cap` was capped by a finite `max_match` (so reaching
    /// it forces a move to the next part) or stands in for "unbounded".
    capped_by_max: bool,
}

impl PartSpec {
    fn from_ast(ast: &Ast) -> Option<PartSpec> {
        let (ranges, min_match, max_match) = match ast.op {
            Op::Plus => (ascii_ranges_of(ast.sub.first()?)?, 1, usize::MAX),
            Op::CharClass => (ascii_ranges_of(ast)?, 1, 1),
            Op::Repeat => {
                if ast.min < 1 {
                    return None;
                }
                let ranges = ascii_ranges_of(ast.sub.first()?)?;
                let min = ast.min as usize;
                let max = if ast.max < 0 { usize::MAX } else { ast.max as usize };
                if max < min {
                    return None;
                }
                (ranges, min, max)
            }
            _ => return None,
        };
        let capped_by_max = max_match != usize::MAX;
        let count_cap = if capped_by_max { max_match } else { min_match.max(1) };
        if count_cap == 0 || count_cap > MAX_PART_STATES || min_match > count_cap {
            return None;
        }
        Some(PartSpec { member: ByteSet::from_ranges(&ranges), min_match, count_cap, capped_by_max })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Item {
    Start(u8),
    Count(u8, u32),
}

fn step(parts: &[PartSpec], cur: &BTreeSet<Item>, b: u8) -> BTreeSet<Item> {
    let mut next = BTreeSet::new();
    for &item in cur {
        match item {
            Item::Start(i) => {
                let iu = i as usize;
                if parts[iu].member.contains(b) {
                    next.insert(Item::Count(i, 1));
                }
            }
            Item::Count(i, c) => {
                let iu = i as usize;
                if !parts[iu].member.contains(b) {
                    continue;
                }
                if (c as usize) < parts[iu].count_cap {
                    next.insert(Item::Count(i, c + 1));
                } else if !parts[iu].capped_by_max {
                    // Unbounded plateau: already past the minimum, no
                    // finite maximum to respect, so another byte of the
                    // same class just stays here.
                    next.insert(Item::Count(i, c));
                }
            }
        }
    }
    next
}

fn closure(parts: &[PartSpec], items: &mut BTreeSet<Item>) {
    loop {
        let mut added = false;
        let snapshot: Vec<Item> = items.iter().copied().collect();
        for item in snapshot {
            if let Item::Count(i, c) = item {
                let iu = i as usize;
                if (c as usize) >= parts[iu].min_match && iu + 1 < parts.len() {
                    if items.insert(Item::Start((iu + 1) as u8)) {
                        added = true;
                    }
                }
            }
        }
        if !added {
            break;
        }
    }
}

fn is_accepting(items: &BTreeSet<Item>, parts: &[PartSpec]) -> bool {
    let last = parts.len() - 1;
    items.iter().any(|item| match *item {
        Item::Count(i, c) => i as usize == last && (c as usize) >= parts[last].min_match,
        _ => false,
    })
}

/// A DFA over a fixed sequence of quantified ASCII character classes, each
/// requiring at least one byte.
#[derive(Clone)]
pub struct CompositeSequenceDFA {
    parts: Vec<PartSpec>,
    classes: ByteClasses,
    alphabet_len: usize,
    table: Vec<u32>,
    accepting: Vec<bool>,
    start_state: u32,
}

impl CompositeSequenceDFA {
    /// Recognizes a `Concat` of 2 to 8 parts, each requiring at least one
    /// byte (a bare ASCII `CharClass`, `Plus`, or `Repeat` with `min >=
    /// 1`), with small enough min/max bounds to keep the subset
    /// construction bounded. Returns `None` for any other shape.
    pub fn try_from_ast(ast: &Ast) -> Option<CompositeSequenceDFA> {
        if ast.op != Op::Concat || ast.sub.len() < 2 || ast.sub.len() > MAX_PARTS {
            return None;
        }
        let mut parts = Vec::with_capacity(ast.sub.len());
        for child in &ast.sub {
            parts.push(PartSpec::from_ast(child)?);
        }
        Some(CompositeSequenceDFA::build(parts))
    }

    fn build(parts: Vec<PartSpec>) -> CompositeSequenceDFA {
        let mut builder = ByteClassBuilder::new();
        for part in &parts {
            for (lo, hi) in part.member.to_ranges() {
                builder.set_range(lo, hi);
            }
        }
        let classes = builder.build();
        let alphabet_len = classes.alphabet_len();
        let reps: Vec<u8> = classes.representatives().collect();

        let mut start_set = BTreeSet::new();
        start_set.insert(Item::Start(0));
        closure(&parts, &mut start_set);

        let mut id_of: BTreeMap<BTreeSet<Item>, u32> = BTreeMap::new();
        let mut configs: Vec<BTreeSet<Item>> = Vec::new();
        let mut rows: Vec<Vec<u32>> = Vec::new();

        id_of.insert(start_set.clone(), 0);
        configs.push(start_set);
        rows.push(Vec::new());

        let mut pending: Vec<u32> = vec![0];
        let mut done: BTreeSet<u32> = BTreeSet::new();
        while let Some(id) = pending.pop() {
            if !done.insert(id) {
                continue;
            }
            let cur = configs[id as usize].clone();
            let mut row = vec![DEAD; alphabet_len];
            for (class, &b) in reps.iter().enumerate() {
                let mut next_set = step(&parts, &cur, b);
                closure(&parts, &mut next_set);
                if next_set.is_empty() {
                    continue;
                }
                let next_id = match id_of.get(&next_set) {
                    Some(&eid) => eid,
                    None => {
                        let eid = configs.len() as u32;
                        id_of.insert(next_set.clone(), eid);
                        configs.push(next_set);
                        rows.push(Vec::new());
                        eid
                    }
                };
                row[class] = next_id;
                pending.push(next_id);
            }
            rows[id as usize] = row;
        }

        let accepting: Vec<bool> =
            configs.iter().map(|c| is_accepting(c, &parts)).collect();
        let mut table = Vec::with_capacity(rows.len() * alphabet_len);
        for row in &rows {
            table.extend_from_slice(row);
        }

        CompositeSequenceDFA {
            parts,
            classes,
            alphabet_len,
            table,
            accepting,
            start_state: 0,
        }
    }

    fn try_match_from(&self, haystack: &[u8], start: usize) -> Option<Span> {
        let mut state = self.start_state;
        let mut i = start;
        let mut last_accept_end = None;
        while i < haystack.len() {
            let class = self.classes.get(haystack[i]) as usize;
            let next = self.table[state as usize * self.alphabet_len + class];
            if next == DEAD {
                break;
            }
            state = next;
            i += 1;
            if self.accepting[state as usize] {
                last_accept_end = Some(i);
            }
        }
        last_accept_end.map(|end| Span { start, end })
    }

    /// Finds the leftmost match at or after `at`: leftmost-longest within
    /// the first position where any match exists at all.
    pub fn search_at(&self, haystack: &[u8], at: usize) -> Option<Span> {
        let mut pos = at;
        loop {
            while pos < haystack.len() && !self.parts[0].member.contains(haystack[pos]) {
                pos += 1;
            }
            if pos >= haystack.len() {
                return None;
            }
            if let Some(span) = self.try_match_from(haystack, pos) {
                return Some(span);
            }
            pos += 1;
        }
    }

    pub fn search(&self, haystack: &[u8]) -> Option<Match> {
        self.search_at(haystack, 0).map(|span| Match::new(PatternID::ZERO, span))
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.search(haystack).is_some()
    }

    /// The number of distinct DFA states this pattern compiled to.
    pub fn state_count(&self) -> usize {
        self.accepting.len()
    }
}

impl core::fmt::Debug for CompositeSequenceDFA {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("CompositeSequenceDFA")
            .field("parts", &self.parts.len())
            .field("states", &self.state_count())
            .field("alphabet_len", &self.alphabet_len)
            .finish()
    }
}

impl core::fmt::Debug for PartSpec {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("PartSpec")
            .field("min_match", &self.min_match)
            .field("count_cap", &self.count_cap)
            .field("capped_by_max", &self.capped_by_max)
            .finish()
    }
}
