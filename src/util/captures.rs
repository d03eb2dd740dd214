/*!
Per-thread capture-group tracking: a reference-counted copy-on-write
vector, cheap to fork across Pike VM threads since forking is just a
refcount bump. The bounded backtracker does not track captures at all, so
this is the only capture representation this crate needs.
*/

use alloc::{sync::Arc, vec, vec::Vec};

use crate::util::primitives::SmallIndex;

/// Sentinel written into a slot that has never been set.
const ABSENT: isize = -1;

/// A reference-counted, copy-on-write vector of capture-slot positions.
///
/// `clone` is O(1): it just bumps the refcount and hands back a second
/// handle to the same buffer. A write only copies the buffer if some other
/// handle is still looking at it; if this handle is the sole owner, the
/// write happens in place. This is the data structure that keeps Pike VM
/// thread forking (one `Split` can spawn two threads that each carry a
/// capture vector) cheap: without it, every split would pay a full-vector
/// clone, which the design notes call out as a 2-5x regression.
#[derive(Clone, Debug)]
pub struct Captures {
    slots: Arc<Vec<isize>>,
}

impl Captures {
    /// Creates a vector with `num_slots` slots, all absent.
    pub fn empty(num_slots: usize) -> Captures {
        Captures { slots: Arc::new(vec![ABSENT; num_slots]) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<usize> {
        match self.slots[slot] {
            ABSENT => None,
            p => Some(p as usize),
        }
    }

    /// Writes `pos` into `slot`. Copies the underlying buffer first if any
    /// other `Captures` handle shares it.
    #[inline]
    pub fn update(&mut self, slot: usize, pos: usize) {
        let buf = Arc::make_mut(&mut self.slots);
        buf[slot] = pos as isize;
    }

    /// An owned snapshot of the current slot values, independent of this
    /// handle's lifetime — used to record a best-match-so-far without
    /// pinning the live thread's buffer.
    pub fn copy_data(&self) -> Vec<isize> {
        (*self.slots).clone()
    }

    /// Builds the `[start, end]`-pair view the public API exposes: entry
    /// `0` is always the overall match bounds; later entries mirror
    /// `(2*group, 2*group+1)` and are `None` when the group never
    /// participated.
    pub fn group_spans(
        &self,
        match_start: usize,
        match_end: usize,
    ) -> Vec<Option<(usize, usize)>> {
        let groups = self.len() / 2;
        let mut out = Vec::with_capacity(groups);
        out.push(Some((match_start, match_end)));
        for g in 1..groups {
            let start = self.get(2 * g);
            let end = self.get(2 * g + 1);
            out.push(match (start, end) {
                (Some(s), Some(e)) => Some((s, e)),
                _ => None,
            });
        }
        out
    }
}

/// The index of the slot within a capture row that records the start (if
/// `is_start`) or end position of capture group `group`.
#[inline]
pub fn slot_index(group: SmallIndex, is_start: bool) -> usize {
    2 * group.as_usize() + if is_start { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cow_clone_is_independent() {
        let parent = Captures::empty(4);
        let mut child1 = parent.clone();
        let child2 = parent.clone();
        child1.update(0, 42);
        assert_eq!(parent.get(0), None);
        assert_eq!(child2.get(0), None);
        assert_eq!(child1.get(0), Some(42));
    }
}
