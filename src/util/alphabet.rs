/*!
Alphabet reduction: mapping the 256 possible byte values down to a much
smaller set of equivalence classes.

Two bytes are in the same class if and only if they are treated identically
by every `ByteRange`/`Sparse` transition in a particular NFA. An engine that
dispatches on the class instead of the raw byte gets the same behavior with
a smaller dispatch table, which matters most for a DFA-shaped transition
table but also shrinks the `Sparse` scan the Pike VM does on each step.
*/

use core::fmt;

/// The number of distinct byte values, always 256.
const BYTES: usize = 256;

/// A map from every byte value to a small equivalence class in `[0, K)`.
#[derive(Clone)]
pub struct ByteClasses {
    classes: [u8; BYTES],
}

impl ByteClasses {
    /// The trivial alphabet: every byte is its own class. Used when no
    /// reduction has happened, e.g. for ad hoc single-byte-range NFAs.
    pub fn singleton() -> ByteClasses {
        let mut classes = [0u8; BYTES];
        for (i, c) in classes.iter_mut().enumerate() {
            *c = i as u8;
        }
        ByteClasses { classes }
    }

    /// The coarsest alphabet: every byte maps to class `0`.
    pub fn empty() -> ByteClasses {
        ByteClasses { classes: [0u8; BYTES] }
    }

    /// Builds a `ByteClasses` table from a finished [`ByteClassBuilder`].
    fn from_boundaries(boundaries: &[bool; BYTES]) -> ByteClasses {
        let mut classes = [0u8; BYTES];
        let mut class = 0u8;
        for byte in 0..BYTES {
            classes[byte] = class;
            if boundaries[byte] {
                class = class.saturating_add(1);
            }
        }
        ByteClasses { classes }
    }

    /// The equivalence class of `byte`.
    #[inline]
    pub fn get(&self, byte: u8) -> u8 {
        self.classes[byte as usize]
    }

    /// The number of distinct classes in this alphabet, i.e. `max_class +
    /// 1`.
    #[inline]
    pub fn alphabet_len(&self) -> usize {
        self.classes.iter().copied().max().map_or(0, |m| m as usize + 1)
    }

    /// Returns true if this is the trivial singleton alphabet (every byte
    /// its own class). Engines can skip the class-remapping step entirely
    /// in this case.
    pub fn is_singleton(&self) -> bool {
        self.alphabet_len() == BYTES
    }

    /// One representative byte for each class, lowest value per class.
    pub fn representatives(&self) -> impl Iterator<Item = u8> + '_ {
        let mut seen = [false; 256];
        (0..BYTES).filter_map(move |b| {
            let c = self.classes[b] as usize;
            if seen[c] {
                None
            } else {
                seen[c] = true;
                Some(b as u8)
            }
        })
    }

    /// All bytes belonging to `class`.
    pub fn elements(&self, class: u8) -> impl Iterator<Item = u8> + '_ {
        (0..BYTES).filter_map(move |b| {
            if self.classes[b] == class {
                Some(b as u8)
            } else {
                None
            }
        })
    }
}

impl fmt::Debug for ByteClasses {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_singleton() {
            return write!(f, "ByteClasses(<singleton>)");
        }
        write!(f, "ByteClasses(")?;
        let mut first = true;
        for class in 0..self.alphabet_len() as u8 {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}=>[", class)?;
            let mut first_elt = true;
            for b in self.elements(class) {
                if !first_elt {
                    write!(f, " ")?;
                }
                first_elt = false;
                write!(f, "{:02X}", b)?;
            }
            write!(f, "]")?;
        }
        write!(f, ")")
    }
}

/// Incrementally builds a [`ByteClasses`] from the byte ranges that appear
/// as transition labels in an NFA under construction.
///
/// Every `ByteRange(lo, hi)` (or element of a `Sparse` list) the compiler
/// emits calls [`Self::set_range`]; once every transition has been seen,
/// [`Self::build`] walks `0..256` and cuts a new class at every boundary
/// bit, which is exactly the condition "these two bytes never appear on
/// opposite sides of a range boundary, so no transition distinguishes
/// them".
#[derive(Clone)]
pub struct ByteClassBuilder {
    boundaries: [bool; BYTES],
}

impl ByteClassBuilder {
    pub fn new() -> ByteClassBuilder {
        ByteClassBuilder { boundaries: [false; BYTES] }
    }

    /// Registers the range `[lo, hi]` as a transition label. The class
    /// boundary falls just below `lo` (so `lo-1` and `lo` can differ) and
    /// exactly at `hi` (so `hi` and `hi+1` can differ).
    pub fn set_range(&mut self, lo: u8, hi: u8) {
        debug_assert!(lo <= hi);
        if lo > 0 {
            self.boundaries[lo as usize - 1] = true;
        }
        self.boundaries[hi as usize] = true;
    }

    pub fn build(&self) -> ByteClasses {
        ByteClasses::from_boundaries(&self.boundaries)
    }
}

impl Default for ByteClassBuilder {
    fn default() -> ByteClassBuilder {
        ByteClassBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_is_identity() {
        let classes = ByteClasses::singleton();
        assert_eq!(classes.alphabet_len(), 256);
        for b in 0..=255u8 {
            assert_eq!(classes.get(b), b);
        }
    }

    #[test]
    fn empty_is_one_class() {
        let classes = ByteClasses::empty();
        assert_eq!(classes.alphabet_len(), 1);
        for b in 0..=255u8 {
            assert_eq!(classes.get(b), 0);
        }
    }

    #[test]
    fn digits_form_their_own_class() {
        let mut builder = ByteClassBuilder::new();
        builder.set_range(b'0', b'9');
        let classes = builder.build();
        assert_eq!(classes.get(b'4'), classes.get(b'7'));
        assert_ne!(classes.get(b'9'), classes.get(b'a'));
        assert_ne!(classes.get(b'/'), classes.get(b'0'));
    }

    #[test]
    fn disjoint_ranges_distinct_classes() {
        let mut builder = ByteClassBuilder::new();
        builder.set_range(b'a', b'z');
        builder.set_range(b'A', b'Z');
        let classes = builder.build();
        assert_ne!(classes.get(b'm'), classes.get(b'M'));
        assert_eq!(classes.get(b'a'), classes.get(b'z'));
    }
}
