//! Value layer for the Conscell s-expression language
//!
//! This crate contains interned atoms (symbols and keywords), mutable cons
//! pairs with a nil terminator, their textual renderings, and a cycle
//! collector for pair graphs. It does not include a reader or evaluator;
//! hosts build on the `native` entry points or the typed API directly.

pub mod error;
pub mod gc;
pub mod interner;
pub mod iter;
pub mod language;
pub mod native;
pub mod printer;
pub mod split;

// Re-export commonly used items for convenience
pub use error::{ErrorKind, ValueError};
pub use gc::{CollectionReport, collect};
pub use interner::{
    Atom, AtomKind, WeakAtom, gensym, gensym_where, is_interned, keyword, keyword_of, symbol,
    symbol_of,
};
pub use iter::PairIter;
pub use language::{
    NIL, Pair, Position, Value, WeakPair, car, cdr, cons, list, pair, setcar, setcdr,
};
