/*!
Reversing a compiled [`NFA`]: builds a second NFA that accepts the reverse
of the language the original accepts, with start and match swapped.

Running the Pike VM anchored over a reversed haystack against this graph
answers "does the forward NFA match ending exactly here", which is the
fast path for patterns anchored with `$`/`\z`: rather than trying every
candidate start position forward, the caller walks backward from a known
end position once.
*/

use alloc::vec::Vec;

use crate::{
    error::BuildError,
    nfa::thompson::{builder::Builder, State, Transition, FAIL, INVALID, NFA},
    util::primitives::{PatternID, StateID},
};

/// An edge collected while walking the forward graph, expressed from the
/// perspective of its *target*: `label = None` means the forward edge was
/// an epsilon (a `Split`, `Epsilon`, `Capture` or `Look` state); `Some((lo,
/// hi))` means it consumed a byte in that range. `from` is the forward
/// state the edge came from.
#[derive(Clone, Copy)]
struct Incoming {
    label: Option<(u8, u8)>,
    from: usize,
}

/// A placeholder allocated during the first pass that still needs its
/// successor(s) patched in once every forward state has a known reverse
/// counterpart.
enum Pending {
    /// A single-successor placeholder (`Epsilon` or `ByteRange`): patch its
    /// one edge to the reverse counterpart of `pred`.
    Single { id: StateID, pred: usize },
    /// A merged `Sparse` placeholder covering several byte-consuming
    /// predecessors: patch each transition to its own predecessor's reverse
    /// counterpart, in the same order the transitions were built in.
    Sparse { id: StateID, preds: Vec<usize> },
}

/// Builds the reverse of `forward`.
///
/// When `anchored` is true, only states reachable from the forward NFA's
/// anchored start are reversed; the unanchored `(?s:.)*?` prefix (present
/// whenever the forward NFA isn't already always-anchored) is dropped
/// entirely; since those states are a pure input-skipping device, they'd
/// serve no purpose walked backward and would make every search wastefully
/// also consider that prefix. When `anchored` is false the whole graph is
/// reversed, prefix included.
///
/// Two UTF-8 convenience states, `RuneAny` and `RuneAnyNotNL`, are reversed
/// as if they were single-byte ranges (`RuneAny` as `[0x00, 0xFF]`,
/// `RuneAnyNotNL` as `[0x00, 0x09] | [0x0B, 0xFF]`) rather than as the
/// variable-width encodings they actually match. This loses byte-exact
/// fidelity for patterns built from `.` under `utf8` mode; callers that
/// need the reverse NFA for `$`-anchored fast paths should prefer patterns
/// without unescaped dots, or accept the over-approximation.
pub fn reverse(forward: &NFA, anchored: bool) -> Result<NFA, BuildError> {
    let n = forward.num_states();
    let root = if anchored { forward.start_anchored() } else { forward.start_unanchored() };
    let included = reachable_from(forward, root);

    let match_fwd = forward
        .states()
        .iter()
        .position(|s| matches!(s, State::Match { .. }))
        .expect("a built NFA always has a Match state");
    debug_assert!(included[match_fwd], "match state must be reachable from the chosen root");

    let start_fwd = root_start(forward, anchored);

    // Collect, for every included state, the list of forward edges that
    // point at it. These become its reverse counterpart's outgoing edges.
    let mut incoming: Vec<Vec<Incoming>> = alloc::vec![Vec::new(); n];
    for i in 0..n {
        if !included[i] {
            continue;
        }
        let mut push = |target: StateID, label: Option<(u8, u8)>| {
            let t = target.as_usize();
            if included[t] {
                incoming[t].push(Incoming { label, from: i });
            }
        };
        match forward.state(StateID::new_unchecked(i)) {
            State::Match { .. } | State::Fail => {}
            State::ByteRange { trans } => push(trans.next, Some((trans.lo, trans.hi))),
            State::Sparse { transitions } => {
                for t in transitions {
                    push(t.next, Some((t.lo, t.hi)));
                }
            }
            State::Split { left, right, .. } => {
                push(*left, None);
                push(*right, None);
            }
            State::Epsilon { next } => push(*next, None),
            State::Capture { next, .. } => push(*next, None),
            State::Look { next, .. } => push(*next, None),
            State::RuneAny { next } => push(*next, Some((0x00, 0xFF))),
            State::RuneAnyNotNL { next } => {
                push(*next, Some((0x00, 0x09)));
                push(*next, Some((0x0B, 0xFF)));
            }
        }
    }

    let mut builder = Builder::new();
    builder.set_utf8(forward.is_utf8());
    builder.set_anchored(true);

    let mut map: Vec<Option<StateID>> = alloc::vec![None; n];
    map[start_fwd] = Some(builder.allocate_match(PatternID::ZERO));

    let mut pending: Vec<Pending> = Vec::new();

    for i in 0..n {
        if i == start_fwd || !included[i] {
            continue;
        }
        let edges = &incoming[i];
        let eps: Vec<usize> = edges.iter().filter(|e| e.label.is_none()).map(|e| e.from).collect();
        let bytes: Vec<(u8, u8, usize)> = edges
            .iter()
            .filter_map(|e| e.label.map(|(lo, hi)| (lo, hi, e.from)))
            .collect();
        let branch_count = eps.len() + if bytes.is_empty() { 0 } else { 1 };

        let id = if branch_count == 0 {
            builder.allocate_dead()
        } else if branch_count == 1 && eps.len() == 1 {
            let id = builder.allocate_epsilon();
            pending.push(Pending::Single { id, pred: eps[0] });
            id
        } else if branch_count == 1 && bytes.len() == 1 {
            let (lo, hi, pred) = bytes[0];
            let r = builder.allocate_byte_range(lo, hi);
            pending.push(Pending::Single { id: r.end, pred });
            r.start
        } else if branch_count == 1 {
            let transitions = bytes
                .iter()
                .map(|&(lo, hi, _)| Transition { lo, hi, next: INVALID })
                .collect();
            let r = builder.allocate_sparse(transitions);
            pending.push(Pending::Sparse { id: r.end, preds: bytes.iter().map(|&(_, _, p)| p).collect() });
            r.start
        } else {
            // Multiple branches: one leaf per epsilon predecessor, plus (if
            // any byte-consuming predecessors exist) one shared leaf for all
            // of them, joined by a chain of plain splits.
            let mut leaves: Vec<StateID> = Vec::with_capacity(branch_count);
            for &pred in &eps {
                let leaf = builder.allocate_epsilon();
                pending.push(Pending::Single { id: leaf, pred });
                leaves.push(leaf);
            }
            if !bytes.is_empty() {
                if bytes.len() == 1 {
                    let (lo, hi, pred) = bytes[0];
                    let r = builder.allocate_byte_range(lo, hi);
                    pending.push(Pending::Single { id: r.end, pred });
                    leaves.push(r.start);
                } else {
                    let transitions = bytes
                        .iter()
                        .map(|&(lo, hi, _)| Transition { lo, hi, next: INVALID })
                        .collect();
                    let r = builder.allocate_sparse(transitions);
                    pending.push(Pending::Sparse {
                        id: r.end,
                        preds: bytes.iter().map(|&(_, _, p)| p).collect(),
                    });
                    leaves.push(r.start);
                }
            }
            let mut chain = *leaves.last().unwrap();
            for &leaf in leaves[..leaves.len() - 1].iter().rev() {
                let split = builder.allocate_split();
                builder.patch_split(split, leaf, chain)?;
                chain = split;
            }
            chain
        };
        map[i] = Some(id);
    }

    for p in pending {
        match p {
            Pending::Single { id, pred } => {
                builder.patch(id, map[pred].expect("predecessor already assigned"))?;
            }
            Pending::Sparse { id, preds } => {
                let targets: Vec<StateID> =
                    preds.iter().map(|&p| map[p].expect("predecessor already assigned")).collect();
                builder.patch_sparse(id, &targets)?;
            }
        }
    }

    let start = map[match_fwd].expect("match state already assigned");
    builder.set_start(start);
    builder.build()
}

/// The forward state that reversing should terminate on: the anchored
/// start when only the anchored subgraph is reversed, otherwise the
/// unanchored start (so the unanchored prefix's own entry becomes the
/// reverse NFA's match state too, in the rare case it's part of the
/// reversed graph at all).
fn root_start(forward: &NFA, anchored: bool) -> usize {
    if anchored {
        forward.start_anchored().as_usize()
    } else {
        forward.start_unanchored().as_usize()
    }
}

/// A plain reachability walk over every edge kind, used to find the set of
/// forward states worth reversing.
fn reachable_from(forward: &NFA, start: StateID) -> Vec<bool> {
    let n = forward.num_states();
    let mut seen = alloc::vec![false; n];
    let mut stack = alloc::vec![start];
    seen[start.as_usize()] = true;
    // FAIL is reachable from everywhere in spirit (every dead end routes
    // there) but need not be walked into explicitly; it has no edges.
    let _ = FAIL;
    while let Some(id) = stack.pop() {
        let mut push = |next: StateID| {
            let i = next.as_usize();
            if !seen[i] {
                seen[i] = true;
                stack.push(next);
            }
        };
        match forward.state(id) {
            State::Match { .. } | State::Fail => {}
            State::ByteRange { trans } => push(trans.next),
            State::Sparse { transitions } => {
                for t in transitions {
                    push(t.next);
                }
            }
            State::Split { left, right, .. } => {
                push(*left);
                push(*right);
            }
            State::Epsilon { next } => push(*next),
            State::Capture { next, .. } => push(*next),
            State::Look { next, .. } => push(*next),
            State::RuneAny { next } => push(*next),
            State::RuneAnyNotNL { next } => push(*next),
        }
    }
    seen
}
