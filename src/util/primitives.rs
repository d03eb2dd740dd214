/*!
Lightweight wrapper types for the small integers used pervasively by the NFA
and its engines: state identifiers, pattern identifiers and small indices
into per-state capture-slot rows.

None of these types do anything interesting on their own. Their entire
purpose is to stop a `usize` meant as a `StateID` from being silently used
as, say, a byte value or a slot index. The compiler catches that class of
mistake for free once the types stop matching.
*/

use core::{
    convert::{Infallible, TryFrom},
    mem, ops,
};

macro_rules! index_type {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident, $iter:ident
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// The maximum value representable by this ID.
            pub const MAX: $name = $name(u32::MAX - 1);

            /// The total number of distinct values of this ID that may ever
            /// be constructed.
            pub const LIMIT: usize = $name::MAX.0 as usize + 1;

            /// The zero value of this ID.
            pub const ZERO: $name = $name(0);

            /// Create a new ID, failing if it exceeds [`Self::MAX`].
            #[inline]
            pub fn new(id: usize) -> Result<$name, $err> {
                $name::try_from(id)
            }

            /// Create a new ID without checking that it fits within
            /// [`Self::MAX`]. Callers must not rely on the bound for safety,
            /// only for correctness: every field of every type in this crate
            /// that holds one of these IDs is a plain `u32`, so an
            /// out-of-range value cannot violate memory safety, only produce
            /// nonsensical indexing behavior.
            #[inline]
            pub fn new_unchecked(id: usize) -> $name {
                $name(id as u32)
            }

            /// Like [`Self::new`], but panics instead of returning an error.
            #[inline]
            pub fn must(id: usize) -> $name {
                $name::new(id).unwrap()
            }

            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn as_u32(&self) -> u32 {
                self.0
            }

            #[inline]
            pub fn one_more(&self) -> usize {
                self.as_usize().checked_add(1).unwrap()
            }

            #[inline]
            pub(crate) fn iter(len: usize) -> $iter {
                $iter::new(len)
            }
        }

        /// An error returned when an ID could not be constructed because
        /// the given integer exceeded the maximum allowed value.
        #[derive(Clone, Debug, Eq, PartialEq)]
        pub struct $err {
            attempted: u64,
        }

        impl $err {
            pub fn attempted(&self) -> u64 {
                self.attempted
            }
        }

        #[cfg(feature = "std")]
        impl std::error::Error for $err {}

        impl core::fmt::Display for $err {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(
                    f,
                    "failed to create {} from {:?}, which exceeds {:?}",
                    stringify!($name),
                    self.attempted(),
                    $name::MAX,
                )
            }
        }

        #[derive(Clone, Debug)]
        pub(crate) struct $iter {
            rng: ops::Range<usize>,
        }

        impl $iter {
            fn new(len: usize) -> $iter {
                assert!(
                    len <= $name::LIMIT,
                    "cannot create ID iterator when element count exceeds {:?}",
                    $name::LIMIT,
                );
                $iter { rng: 0..len }
            }
        }

        impl Iterator for $iter {
            type Item = $name;

            fn next(&mut self) -> Option<$name> {
                if self.rng.start >= self.rng.end {
                    return None;
                }
                let next_id = self.rng.start + 1;
                let id = mem::replace(&mut self.rng.start, next_id);
                Some($name::new_unchecked(id))
            }
        }

        impl<T> ops::Index<$name> for [T] {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &T {
                &self[index.as_usize()]
            }
        }

        impl<T> ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.as_usize()]
            }
        }

        #[cfg(feature = "alloc")]
        impl<T> ops::Index<$name> for alloc::vec::Vec<T> {
            type Output = T;

            #[inline]
            fn index(&self, index: $name) -> &T {
                &self[index.as_usize()]
            }
        }

        #[cfg(feature = "alloc")]
        impl<T> ops::IndexMut<$name> for alloc::vec::Vec<T> {
            #[inline]
            fn index_mut(&mut self, index: $name) -> &mut T {
                &mut self[index.as_usize()]
            }
        }

        impl TryFrom<usize> for $name {
            type Error = $err;

            fn try_from(id: usize) -> Result<$name, $err> {
                if id > $name::MAX.as_usize() {
                    return Err($err { attempted: id as u64 });
                }
                Ok($name::new_unchecked(id))
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $err;

            fn try_from(id: u32) -> Result<$name, $err> {
                if id > $name::MAX.as_u32() {
                    return Err($err { attempted: id as u64 });
                }
                Ok($name::new_unchecked(id as usize))
            }
        }

        impl TryFrom<u8> for $name {
            type Error = Infallible;

            fn try_from(id: u8) -> Result<$name, Infallible> {
                Ok($name::new_unchecked(id as usize))
            }
        }
    };
}

index_type!(
    /// The identifier of a state inside an [`NFA`](crate::nfa::thompson::NFA).
    ///
    /// A state ID indexes directly into the NFA's state vector. Two
    /// sentinel values, [`crate::nfa::thompson::INVALID`] and
    /// [`crate::nfa::thompson::FAIL`], have special meaning to the builder
    /// and the compiled automaton respectively; they are otherwise ordinary
    /// members of this type.
    StateID, StateIDError, StateIDIter
);

index_type!(
    /// The identifier of a capturing group, relative to the pattern it
    /// belongs to. Group `0` always refers to the whole match and is never
    /// named.
    PatternID, PatternIDError, PatternIDIter
);

/// A small index, used for indexing into a capture-slot row.
///
/// This is distinguished from [`StateID`] and [`PatternID`] purely for
/// documentation purposes: a `SmallIndex` is never used to look up a state
/// or a pattern, only a position within a fixed-width row.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SmallIndex(u32);

impl SmallIndex {
    pub const MAX: SmallIndex = SmallIndex(u32::MAX - 1);

    #[inline]
    pub fn new(index: usize) -> SmallIndex {
        assert!(index <= SmallIndex::MAX.0 as usize);
        SmallIndex(index as u32)
    }

    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}
