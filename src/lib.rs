/*!
The core of a Thompson-construction regular expression engine.

This crate builds a [`nfa::thompson::NFA`] from a normalized syntax tree
([`ast::Ast`]) and executes it with one of two general-purpose engines — a
parallel simulation ([`nfa::thompson::pikevm::PikeVM`]) guaranteeing O(n)
search time, and a bounded recursive backtracker
([`nfa::thompson::backtrack::BoundedBacktracker`]) for small inputs — plus a
family of specialized fast-path searchers (the [`searcher`] module) that
recognize common shapes of pattern and execute them without a general NFA
simulation at all.

This is deliberately *not* a full regex library: there is no parser for
regex concrete syntax (callers build or obtain an [`ast::Ast`] some other
way), no lazy DFA, and no higher-level façade that picks an engine for you.
Those all belong to a layer built on top of this one.

# Organization

- [`ast`] — the external syntax-tree boundary this crate compiles from.
- [`nfa::thompson`] — the NFA data model, its [`nfa::thompson::Builder`] and
  [`nfa::thompson::Compiler`].
- [`nfa::thompson::pikevm`] — the Pike VM (requires `nfa-pikevm`).
- [`nfa::thompson::backtrack`] — the bounded backtracker (requires
  `nfa-backtrack`).
- [`nfa::thompson::reverse`] — reversing a forward NFA for `$`-anchored
  backward search.
- [`searcher`] — the specialized fast-path searchers (requires `searcher`).
- [`util`] — shared primitives: IDs, byte classes, the `Input`/`Match`
  vocabulary, UTF-8 helpers, captures.
- [`error`] — compile-time error types.

# Example

```
use thompson_regex_core::{
    ast::{Ast, Flags},
    nfa::thompson::{pikevm::PikeVM, Compiler},
};

let ast = Ast::literal("needle".chars().map(|c| c as u32).collect(), Flags::empty());
let nfa = Compiler::new().build(&ast)?;
let vm = PikeVM::new(nfa, Default::default());
let m = vm.search(b"an needle in a haystack").unwrap();
assert_eq!(m.range(), 3..9);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_debug_implementations)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "syntax")]
pub mod ast;
pub mod error;
#[cfg(feature = "alloc")]
pub mod nfa;
#[cfg(feature = "searcher")]
pub mod searcher;
pub mod util;

#[cfg(feature = "alloc")]
pub use crate::util::search::{Anchored, Input, Match, MatchError, MatchKind, Span};
