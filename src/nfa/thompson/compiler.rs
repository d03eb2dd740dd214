/*!
Lowers an [`Ast`] into an [`NFA`] via Thompson construction.
*/

use alloc::{collections::BTreeMap, string::String, vec, vec::Vec};

use crate::{
    ast::{Ast, Op},
    error::BuildError,
    nfa::thompson::{
        builder::{Builder, ThompsonRef},
        Look, Transition, NFA,
    },
    util::{
        primitives::{PatternID, StateID},
        utf8::Utf8Sequences,
    },
};

#[cfg(feature = "logging")]
use log::trace;

/// Compiler configuration (§4.2). Every field defaults exactly as the core
/// specification requires.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    utf8: Option<bool>,
    anchored: Option<bool>,
    dot_newline: Option<bool>,
    ascii_only: Option<bool>,
    max_recursion_depth: Option<u32>,
}

impl Config {
    pub fn new() -> Config {
        Config {
            utf8: None,
            anchored: None,
            dot_newline: None,
            ascii_only: None,
            max_recursion_depth: None,
        }
    }

    pub fn utf8(mut self, yes: bool) -> Config {
        self.utf8 = Some(yes);
        self
    }

    pub fn anchored(mut self, yes: bool) -> Config {
        self.anchored = Some(yes);
        self
    }

    pub fn dot_newline(mut self, yes: bool) -> Config {
        self.dot_newline = Some(yes);
        self
    }

    pub fn ascii_only(mut self, yes: bool) -> Config {
        self.ascii_only = Some(yes);
        self
    }

    pub fn max_recursion_depth(mut self, depth: u32) -> Config {
        self.max_recursion_depth = Some(depth);
        self
    }

    /// Merges `self` on top of `defaults`: any field `self` doesn't set
    /// falls back to `defaults`'s value. Mirrors the `Config::overwrite`
    /// pattern used throughout the DFA layer's own `Config` types.
    fn overwrite(self, defaults: Config) -> Config {
        Config {
            utf8: self.utf8.or(defaults.utf8),
            anchored: self.anchored.or(defaults.anchored),
            dot_newline: self.dot_newline.or(defaults.dot_newline),
            ascii_only: self.ascii_only.or(defaults.ascii_only),
            max_recursion_depth: self.max_recursion_depth.or(defaults.max_recursion_depth),
        }
    }

    fn get_utf8(&self) -> bool {
        self.utf8.unwrap_or(true)
    }

    fn get_anchored(&self) -> bool {
        self.anchored.unwrap_or(false)
    }

    fn get_dot_newline(&self) -> bool {
        self.dot_newline.unwrap_or(false)
    }

    fn get_ascii_only(&self) -> bool {
        self.ascii_only.unwrap_or(false)
    }

    fn get_max_recursion_depth(&self) -> u32 {
        self.max_recursion_depth.unwrap_or(100)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

/// Key for the UTF-8 suffix-sharing cache: a target state plus the byte
/// range leading into it. A direct-mapped table of this capacity, keyed
/// (and overwritable) by a cheap hash, would also satisfy the spec; a
/// `BTreeMap` capped at [`CACHE_CAP`] entries gives the same "miss only
/// forgoes sharing, never breaks correctness" property with less code.
const CACHE_CAP: usize = 64;

#[derive(Default)]
struct SuffixCache {
    map: BTreeMap<(StateID, u8, u8), StateID>,
}

impl SuffixCache {
    fn get(&self, key: (StateID, u8, u8)) -> Option<StateID> {
        self.map.get(&key).copied()
    }

    fn insert(&mut self, key: (StateID, u8, u8), id: StateID) {
        if self.map.len() >= CACHE_CAP {
            self.map.clear();
        }
        self.map.insert(key, id);
    }
}

/// Translates a normalized [`Ast`] into a Thompson-constructed [`NFA`].
pub struct Compiler {
    config: Config,
}

impl Compiler {
    pub fn new() -> Compiler {
        Compiler { config: Config::new() }
    }

    pub fn configure(mut self, config: Config) -> Compiler {
        self.config = config.overwrite(self.config);
        self
    }

    pub fn build(&self, ast: &Ast) -> Result<NFA, BuildError> {
        #[cfg(feature = "logging")]
        trace!("compiling ast with config {:?}", self.config);

        let mut ctx = Ctx {
            builder: Builder::new(),
            cache: SuffixCache::default(),
            config: self.config,
        };
        ctx.builder.set_utf8(self.config.get_utf8());
        ctx.builder.set_anchored(self.config.get_anchored());

        // Group 0 (the whole match) is implicit; register every explicit
        // `Capture` node's group in index order so `Builder::add_capture`'s
        // running count matches what `compile_capture` later assumes when it
        // reads `ast.cap` directly rather than a freshly allocated index.
        let mut names = vec![None; 1 + ast.max_capture_index() as usize];
        collect_capture_names(ast, &mut names);
        for name in names.into_iter().skip(1) {
            ctx.builder.add_capture(name);
        }

        let body = ctx.compile(ast, 0)?;
        let matched = ctx.builder.allocate_match(PatternID::ZERO);
        ctx.builder.patch(body.end, matched).map_err(|_| {
            BuildError::invalid_pattern("failed to patch root fragment to match state")
        })?;
        let start_anchored = body.start;

        let start_unanchored = if self.config.get_anchored() || is_pattern_anchored(ast) {
            start_anchored
        } else {
            // The non-greedy `(?s:.)*?` unanchored prefix: a quantifier
            // split whose left side is the real pattern and whose right
            // side loops on any byte back to itself.
            let split = ctx.builder.allocate_quantifier_split();
            let any = ctx.builder.allocate_byte_range(0x00, 0xFF);
            ctx.builder
                .patch(any.end, split)
                .map_err(|_| BuildError::invalid_pattern("unanchored prefix patch failed"))?;
            ctx.builder
                .patch_split(split, start_anchored, any.start)
                .map_err(|_| BuildError::invalid_pattern("unanchored prefix split failed"))?;
            split
        };
        ctx.builder.set_starts(start_anchored, start_unanchored);
        ctx.builder.build()
    }
}

impl Default for Compiler {
    fn default() -> Compiler {
        Compiler::new()
    }
}

struct Ctx {
    builder: Builder,
    cache: SuffixCache,
    config: Config,
}

impl Ctx {
    fn compile(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        if depth > self.config.get_max_recursion_depth() {
            return Err(BuildError::too_complex("ast recursion depth exceeded"));
        }
        match ast.op {
            Op::EmptyMatch => {
                let id = self.builder.allocate_epsilon();
                Ok(ThompsonRef { start: id, end: id })
            }
            Op::NoMatch => {
                let dead_end = self.builder.allocate_epsilon();
                self.builder
                    .patch(dead_end, crate::nfa::thompson::FAIL)
                    .map_err(|_| BuildError::invalid_pattern("no-match patch failed"))?;
                let unreachable_end = self.builder.allocate_epsilon();
                Ok(ThompsonRef { start: dead_end, end: unreachable_end })
            }
            Op::Literal => self.compile_literal(ast),
            Op::CharClass => self.compile_char_class(ast),
            Op::AnyChar => self.compile_any_char(self.config.get_dot_newline()),
            Op::AnyCharNotNL => self.compile_any_char(false),
            Op::Concat => self.compile_concat(ast, depth),
            Op::Alternate => self.compile_alternate(ast, depth),
            Op::Star => self.compile_star(ast, depth),
            Op::Plus => self.compile_plus(ast, depth),
            Op::Quest => self.compile_quest(ast, depth),
            Op::Repeat => self.compile_repeat(ast, depth),
            Op::Capture => self.compile_capture(ast, depth),
            Op::BeginText => self.compile_look(Look::StartText),
            Op::EndText => self.compile_look(Look::EndText),
            Op::BeginLine => self.compile_look(Look::StartLine),
            Op::EndLine => self.compile_look(Look::EndLine),
            Op::WordBoundary => self.compile_look(Look::WordBoundary),
            Op::NoWordBoundary => self.compile_look(Look::NoWordBoundary),
        }
    }

    fn compile_look(&mut self, look: Look) -> Result<ThompsonRef, BuildError> {
        let id = self.builder.allocate_look(look);
        Ok(ThompsonRef { start: id, end: id })
    }

    fn compile_any_char(&mut self, include_newline: bool) -> Result<ThompsonRef, BuildError> {
        if self.config.get_ascii_only() {
            return Ok(if include_newline {
                self.builder.allocate_byte_range(0x00, 0xFF)
            } else {
                let id = self.builder.allocate_sparse(vec![
                    Transition { lo: 0x00, hi: 0x09, next: crate::nfa::thompson::INVALID },
                    Transition { lo: 0x0B, hi: 0xFF, next: crate::nfa::thompson::INVALID },
                ]);
                id
            });
        }
        let id = if include_newline {
            self.builder.allocate_rune_any()
        } else {
            self.builder.allocate_rune_any_not_nl()
        };
        Ok(ThompsonRef { start: id, end: id })
    }

    fn compile_literal(&mut self, ast: &Ast) -> Result<ThompsonRef, BuildError> {
        let fold = ast.flags.contains(crate::ast::Flags::FOLD_CASE);
        let mut frags = Vec::with_capacity(ast.rune.len());
        for &rune in &ast.rune {
            frags.push(self.compile_rune_literal(rune, fold)?);
        }
        Ok(self.concat_fragments(frags))
    }

    fn compile_rune_literal(&mut self, rune: u32, fold: bool) -> Result<ThompsonRef, BuildError> {
        let ch = char::from_u32(rune)
            .ok_or_else(|| BuildError::invalid_pattern("literal rune is not a valid scalar value"))?;
        if fold && ch.is_ascii_alphabetic() {
            let upper = ch.to_ascii_uppercase() as u8;
            let lower = ch.to_ascii_lowercase() as u8;
            if upper == lower {
                return Ok(self.builder.allocate_byte_range(upper, upper));
            }
            let upper_frag = self.builder.allocate_byte_range(upper, upper);
            let lower_frag = self.builder.allocate_byte_range(lower, lower);
            let exit = self.builder.allocate_epsilon();
            let split = self.builder.allocate_split();
            self.builder
                .patch_split(split, upper_frag.start, lower_frag.start)
                .map_err(|_| BuildError::invalid_pattern("fold-case split failed"))?;
            self.builder
                .patch(upper_frag.end, exit)
                .map_err(|_| BuildError::invalid_pattern("fold-case patch failed"))?;
            self.builder
                .patch(lower_frag.end, exit)
                .map_err(|_| BuildError::invalid_pattern("fold-case patch failed"))?;
            return Ok(ThompsonRef { start: split, end: exit });
        }
        let mut buf = [0u8; 4];
        let bytes = ch.encode_utf8(&mut buf).as_bytes();
        let frags: Vec<ThompsonRef> =
            bytes.iter().map(|&b| self.builder.allocate_byte_range(b, b)).collect();
        Ok(self.concat_fragments(frags))
    }

    fn concat_fragments(&mut self, frags: Vec<ThompsonRef>) -> ThompsonRef {
        if frags.is_empty() {
            let id = self.builder.allocate_epsilon();
            return ThompsonRef { start: id, end: id };
        }
        for w in frags.windows(2) {
            let _ = self.builder.patch(w[0].end, w[1].start);
        }
        ThompsonRef { start: frags[0].start, end: frags[frags.len() - 1].end }
    }

    fn compile_concat(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        if ast.sub.is_empty() {
            let id = self.builder.allocate_epsilon();
            return Ok(ThompsonRef { start: id, end: id });
        }
        let mut frags = Vec::with_capacity(ast.sub.len());
        for child in &ast.sub {
            frags.push(self.compile(child, depth + 1)?);
        }
        Ok(self.concat_fragments(frags))
    }

    fn compile_alternate(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        if ast.sub.is_empty() {
            return self.compile(&Ast::no_match(), depth + 1);
        }
        if ast.sub.len() == 1 {
            return self.compile(&ast.sub[0], depth + 1);
        }
        let mut frags = Vec::with_capacity(ast.sub.len());
        for child in &ast.sub {
            frags.push(self.compile(child, depth + 1)?);
        }
        let exit = self.builder.allocate_epsilon();
        for frag in &frags {
            self.builder
                .patch(frag.end, exit)
                .map_err(|_| BuildError::invalid_pattern("alternate patch failed"))?;
        }
        let mut chain = frags[frags.len() - 1].start;
        for frag in frags[..frags.len() - 1].iter().rev() {
            let split = self.builder.allocate_split();
            self.builder
                .patch_split(split, frag.start, chain)
                .map_err(|_| BuildError::invalid_pattern("alternate split failed"))?;
            chain = split;
        }
        Ok(ThompsonRef { start: chain, end: exit })
    }

    fn compile_star(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        let body = self.compile(&ast.sub[0], depth + 1)?;
        let greedy = !ast.flags.contains(crate::ast::Flags::NON_GREEDY);
        let split = self.builder.allocate_quantifier_split();
        let exit = self.builder.allocate_epsilon();
        self.builder
            .patch(body.end, split)
            .map_err(|_| BuildError::invalid_pattern("star loop patch failed"))?;
        let r = if greedy {
            self.builder.patch_split(split, body.start, exit)
        } else {
            self.builder.patch_split(split, exit, body.start)
        };
        r.map_err(|_| BuildError::invalid_pattern("star split failed"))?;
        Ok(ThompsonRef { start: split, end: exit })
    }

    fn compile_plus(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        let body = self.compile(&ast.sub[0], depth + 1)?;
        let greedy = !ast.flags.contains(crate::ast::Flags::NON_GREEDY);
        let split = self.builder.allocate_quantifier_split();
        let exit = self.builder.allocate_epsilon();
        self.builder
            .patch(body.end, split)
            .map_err(|_| BuildError::invalid_pattern("plus loop patch failed"))?;
        let r = if greedy {
            self.builder.patch_split(split, body.start, exit)
        } else {
            self.builder.patch_split(split, exit, body.start)
        };
        r.map_err(|_| BuildError::invalid_pattern("plus split failed"))?;
        Ok(ThompsonRef { start: body.start, end: exit })
    }

    fn compile_quest(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        let body = self.compile(&ast.sub[0], depth + 1)?;
        let greedy = !ast.flags.contains(crate::ast::Flags::NON_GREEDY);
        let split = self.builder.allocate_quantifier_split();
        let exit = self.builder.allocate_epsilon();
        self.builder
            .patch(body.end, exit)
            .map_err(|_| BuildError::invalid_pattern("quest patch failed"))?;
        let r = if greedy {
            self.builder.patch_split(split, body.start, exit)
        } else {
            self.builder.patch_split(split, exit, body.start)
        };
        r.map_err(|_| BuildError::invalid_pattern("quest split failed"))?;
        Ok(ThompsonRef { start: split, end: exit })
    }

    fn compile_repeat(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        let (min, max) = (ast.min, ast.max);
        if max != -1 && min > max {
            return Err(BuildError::invalid_pattern("repeat min exceeds max"));
        }
        let sub = &ast.sub[0];
        let greedy = !ast.flags.contains(crate::ast::Flags::NON_GREEDY);
        let mut copies = Vec::new();
        for _ in 0..min {
            copies.push(self.compile(sub, depth + 1)?);
        }
        if max == -1 {
            let star = Ast::star(sub.clone(), greedy);
            copies.push(self.compile(&star, depth + 1)?);
        } else {
            for _ in 0..(max - min) {
                let quest = Ast::quest(sub.clone(), greedy);
                copies.push(self.compile(&quest, depth + 1)?);
            }
        }
        if copies.is_empty() {
            let id = self.builder.allocate_epsilon();
            return Ok(ThompsonRef { start: id, end: id });
        }
        Ok(self.concat_fragments(copies))
    }

    fn compile_capture(&mut self, ast: &Ast, depth: u32) -> Result<ThompsonRef, BuildError> {
        let group = crate::util::primitives::SmallIndex::new(ast.cap as usize);
        let open = self.builder.allocate_capture(group, true);
        let body = self.compile(&ast.sub[0], depth + 1)?;
        let close = self.builder.allocate_capture(group, false);
        self.builder
            .patch(open, body.start)
            .map_err(|_| BuildError::invalid_pattern("capture open patch failed"))?;
        self.builder
            .patch(body.end, close)
            .map_err(|_| BuildError::invalid_pattern("capture close patch failed"))?;
        Ok(ThompsonRef { start: open, end: close })
    }

    fn compile_char_class(&mut self, ast: &Ast) -> Result<ThompsonRef, BuildError> {
        let mut ranges: Vec<(u32, u32)> = ast
            .rune
            .chunks(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        ranges.sort_unstable();
        if ranges.is_empty() {
            return self.compile(&Ast::no_match(), 0);
        }
        let ascii_only = ranges.iter().all(|&(_, hi)| hi <= 0x7F);
        if ascii_only {
            let exit = self.builder.allocate_epsilon();
            if ranges.len() == 1 {
                let (lo, hi) = ranges[0];
                let frag = self.builder.allocate_byte_range(lo as u8, hi as u8);
                self.builder
                    .patch(frag.end, exit)
                    .map_err(|_| BuildError::invalid_pattern("char class patch failed"))?;
                return Ok(ThompsonRef { start: frag.start, end: exit });
            }
            let transitions = ranges
                .iter()
                .map(|&(lo, hi)| Transition {
                    lo: lo as u8,
                    hi: hi as u8,
                    next: crate::nfa::thompson::INVALID,
                })
                .collect();
            let frag = self.builder.allocate_sparse(transitions);
            self.builder
                .patch(frag.end, exit)
                .map_err(|_| BuildError::invalid_pattern("char class patch failed"))?;
            return Ok(ThompsonRef { start: frag.start, end: exit });
        }
        self.compile_utf8_char_class(&ranges)
    }

    /// Splits `ranges` at UTF-8 length boundaries and at the surrogate
    /// hole (via [`Utf8Sequences`]), encodes each resulting sequence as a
    /// chain of byte-range states built from the last position toward the
    /// first (so continuation-byte suffixes can be shared across
    /// sequences), and joins every sequence's leading byte range into one
    /// `Sparse` entry point.
    ///
    /// A negated class that spans essentially the whole non-ASCII region
    /// is deliberately over-approximated rather than precisely excluding
    /// ill-formed UTF-8 — see `SPEC_FULL.md` §12.1.
    fn compile_utf8_char_class(
        &mut self,
        ranges: &[(u32, u32)],
    ) -> Result<ThompsonRef, BuildError> {
        let exit = self.builder.allocate_epsilon();
        let mut leading: Vec<Transition> = Vec::new();
        for &(lo, hi) in ranges {
            if hi > 0x10FFFF - 1 && lo <= 0x80 {
                // A class wide enough to include essentially the entire
                // non-ASCII range: fold it down to the permissive
                // `[0x80,0xFF]` fast path instead of enumerating every
                // UTF-8 sequence, per the over-acceptance posture in
                // `SPEC_FULL.md` §12.1.
                leading.push(Transition { lo: 0x80, hi: 0xFF, next: exit });
                continue;
            }
            let lo_char = char::from_u32(lo);
            let hi_char = char::from_u32(hi);
            let (lo_char, hi_char) = match (lo_char, hi_char) {
                (Some(l), Some(h)) => (l, h),
                _ => continue,
            };
            for seq in Utf8Sequences::new(lo_char, hi_char) {
                let bytes = seq.as_slice();
                let mut next = exit;
                for (i, range) in bytes.iter().enumerate().rev() {
                    let entry_next = next;
                    let key = (entry_next, range.start, range.end);
                    next = if let Some(cached) = self.cache.get(key) {
                        cached
                    } else {
                        let id = self.builder.allocate_byte_range_fixed(
                            range.start,
                            range.end,
                            entry_next,
                        );
                        self.cache.insert(key, id);
                        id
                    };
                    if i == 0 {
                        leading.push(Transition { lo: range.start, hi: range.end, next: entry_next });
                    }
                }
            }
        }
        if leading.is_empty() {
            return self.compile(&Ast::no_match(), 0);
        }
        let entry = if leading.len() == 1 && leading[0].next == exit {
            self.builder.allocate_byte_range_fixed(leading[0].lo, leading[0].hi, exit)
        } else {
            self.builder.allocate_sparse_fixed(leading)
        };
        Ok(ThompsonRef { start: entry, end: exit })
    }
}

/// Walks `ast` recording each `Capture` node's name (or `None`) at its
/// group index into `out`, which the caller has pre-sized to
/// `1 + ast.max_capture_index()`.
fn collect_capture_names(ast: &Ast, out: &mut Vec<Option<String>>) {
    if ast.op == Op::Capture {
        let idx = ast.cap as usize;
        if idx < out.len() {
            out[idx] = if ast.name.is_empty() { None } else { Some(ast.name.clone()) };
        }
    }
    for child in &ast.sub {
        collect_capture_names(child, out);
    }
}

/// True iff `ast` begins with `BeginText` (not `BeginLine`), recursing
/// through `Concat` and `Capture`.
pub fn is_pattern_anchored(ast: &Ast) -> bool {
    match ast.op {
        Op::BeginText => true,
        Op::Capture => ast.sub.first().is_some_and(is_pattern_anchored),
        Op::Concat => ast.sub.first().is_some_and(is_pattern_anchored),
        _ => false,
    }
}

/// True iff `ast` ends with `EndText`, recursively through `Concat`,
/// `Capture` and `Alternate` (every branch of an alternation must be
/// end-anchored).
pub fn is_pattern_end_anchored(ast: &Ast) -> bool {
    match ast.op {
        Op::EndText => true,
        Op::Capture => ast.sub.last().is_some_and(is_pattern_end_anchored),
        Op::Concat => ast.sub.last().is_some_and(is_pattern_end_anchored),
        Op::Alternate => !ast.sub.is_empty() && ast.sub.iter().all(is_pattern_end_anchored),
        _ => false,
    }
}

/// True iff an `EndText`/`EndLine` assertion appears anywhere other than
/// the final position of the pattern — a pattern like that can't safely
/// be selected for reverse-anchored search.
pub fn has_internal_end_anchor(ast: &Ast) -> bool {
    fn walk(ast: &Ast, is_tail: bool) -> bool {
        match ast.op {
            Op::EndText | Op::EndLine if !is_tail => true,
            Op::Concat => ast.sub.iter().enumerate().any(|(i, child)| {
                walk(child, is_tail && i == ast.sub.len() - 1)
            }),
            Op::Capture => ast.sub.first().is_some_and(|c| walk(c, is_tail)),
            Op::Alternate => ast.sub.iter().any(|c| walk(c, is_tail)),
            Op::Star | Op::Plus | Op::Quest | Op::Repeat => {
                ast.sub.first().is_some_and(|c| walk(c, false))
            }
            _ => false,
        }
    }
    walk(ast, true)
}

/// A 256-bit set of bytes that may begin a match, or `None` ("incomplete")
/// when the pattern's possible first bytes can't be determined exactly
/// (e.g. it can match empty, or contains an unbounded-lookback construct).
pub fn extract_first_bytes(ast: &Ast) -> Option<[bool; 256]> {
    fn walk(ast: &Ast, out: &mut [bool; 256]) -> Option<bool> {
        // Returns `Some(nullable)` on success, `None` if incomplete.
        match ast.op {
            Op::Literal => {
                let &rune = ast.rune.first()?;
                let ch = char::from_u32(rune)?;
                let mut buf = [0u8; 4];
                let b = ch.encode_utf8(&mut buf).as_bytes()[0];
                out[b as usize] = true;
                if ast.flags.contains(crate::ast::Flags::FOLD_CASE) && ch.is_ascii_alphabetic() {
                    out[ch.to_ascii_uppercase() as usize] = true;
                    out[ch.to_ascii_lowercase() as usize] = true;
                }
                Some(false)
            }
            Op::CharClass => {
                for pair in ast.rune.chunks(2) {
                    let (lo, hi) = (pair[0], pair[1]);
                    if hi > 0x7F {
                        return None;
                    }
                    for b in lo as usize..=hi as usize {
                        out[b] = true;
                    }
                }
                Some(false)
            }
            Op::AnyChar | Op::AnyCharNotNL => None,
            Op::EmptyMatch
            | Op::BeginText
            | Op::EndText
            | Op::BeginLine
            | Op::EndLine
            | Op::WordBoundary
            | Op::NoWordBoundary => Some(true),
            Op::NoMatch => Some(false),
            Op::Concat => {
                for child in &ast.sub {
                    let nullable = walk(child, out)?;
                    if !nullable {
                        return Some(false);
                    }
                }
                Some(true)
            }
            Op::Alternate => {
                let mut nullable = false;
                for child in &ast.sub {
                    nullable |= walk(child, out)?;
                }
                Some(nullable)
            }
            Op::Capture => walk(ast.sub.first()?, out),
            Op::Star | Op::Quest => {
                walk(ast.sub.first()?, out)?;
                Some(true)
            }
            Op::Plus => walk(ast.sub.first()?, out),
            Op::Repeat => {
                let nullable = walk(ast.sub.first()?, out)?;
                Some(nullable || ast.min == 0)
            }
        }
    }
    let mut out = [false; 256];
    walk(ast, &mut out).map(|_| out)
}

/// True iff `ast` contains an `AnyChar`/`AnyCharNotNL` node anywhere.
pub fn contains_dot(ast: &Ast) -> bool {
    matches!(ast.op, Op::AnyChar | Op::AnyCharNotNL) || ast.sub.iter().any(contains_dot)
}

/// True iff `ast` contains a literal or character class whose encoding
/// depends on the `UTF8` configuration knob, i.e. anything with a rune
/// outside the ASCII range.
pub fn pattern_has_utf8_dependence(ast: &Ast) -> bool {
    match ast.op {
        Op::Literal => ast.rune.iter().any(|&r| r > 0x7F),
        Op::CharClass => ast.rune.chunks(2).any(|pair| pair[1] > 0x7F),
        _ => ast.sub.iter().any(pattern_has_utf8_dependence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Flags;

    fn lit(s: &str) -> Ast {
        Ast::literal(s.chars().map(|c| c as u32).collect(), Flags::empty())
    }

    #[test]
    fn compiles_simple_literal() {
        let nfa = Compiler::new().build(&lit("ab")).unwrap();
        assert!(nfa.num_states() > 0);
    }

    #[test]
    fn anchored_pattern_shares_starts() {
        let ast = Ast::concat(vec![Ast::look(Op::BeginText), lit("a")]);
        let nfa = Compiler::new().build(&ast).unwrap();
        assert!(nfa.is_always_anchored());
    }

    #[test]
    fn unanchored_pattern_has_distinct_starts() {
        let nfa = Compiler::new().build(&lit("a")).unwrap();
        assert!(!nfa.is_always_anchored());
    }

    #[test]
    fn repeat_rejects_min_greater_than_max() {
        let ast = Ast::repeat(lit("a"), 3, 1, true);
        assert!(Compiler::new().build(&ast).is_err());
    }

    #[test]
    fn first_bytes_for_digit_class() {
        let ast = Ast::char_class(vec![(b'0' as u32, b'9' as u32)]);
        let bytes = extract_first_bytes(&ast).unwrap();
        assert!(bytes[b'5' as usize]);
        assert!(!bytes[b'a' as usize]);
    }

    #[test]
    fn utf8_class_compiles() {
        let ast = Ast::char_class(vec![(0x0, 0x10FFFF)]);
        let nfa = Compiler::new().build(&ast).unwrap();
        assert!(nfa.num_states() > 1);
    }

    // A narrow non-ASCII range (Cyrillic lowercase) is too small to hit the
    // permissive `[0x80,0xFF]` fast path, so this exercises the suffix-
    // sharing chain in `compile_utf8_char_class` directly: each sequence's
    // leading byte must reach the *next* byte's state, not reenter itself.
    #[cfg(feature = "nfa-pikevm")]
    #[test]
    fn narrow_non_ascii_class_matches_via_suffix_chain() {
        use crate::nfa::thompson::pikevm::PikeVM;

        let ast = Ast::char_class(vec![('а' as u32, 'я' as u32)]);
        let nfa = Compiler::new().build(&ast).unwrap();
        let vm = PikeVM::new(nfa, Default::default());
        let m = vm.search("привет".as_bytes()).unwrap();
        assert_eq!(m.range(), 0.."п".len());
    }
}
