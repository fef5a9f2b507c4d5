//! # dawgdic-core
//!
//! A compact, read-only string-to-integer dictionary backed by a minimised
//! Directed Acyclic Word Graph (DAWG) packed into a double array.
//!
//! Given a sorted lexicon of keys, optionally paired with non-negative
//! values, [`DawgBuilder`] incrementally minimises a trie as keys arrive,
//! merging equivalent suffixes via hash-consing. [`Dictionary::build`] then
//! embeds the resulting [`Dawg`] into a single packed `Vec<u32>` using an
//! XOR-offset addressing scheme, supporting exact lookup and prefix
//! traversal with no further allocation. [`Guide`]/[`RankedGuide`] annotate
//! the dictionary for key completion, either lexicographic or value-ranked.

#![deny(unsafe_code)]

pub mod completer;
pub mod dawg;
pub mod dawg_builder;
pub mod dictionary;
pub mod dictionary_builder;
pub mod guide;
mod pool;
pub mod ranked_completer;
pub mod ranked_guide;

pub use completer::Completer;
pub use dawg::Dawg;
pub use dawg_builder::{DawgBuilder, InsertError};
pub use dictionary::Dictionary;
pub use dictionary_builder::BuildError;
pub use guide::Guide;
pub use ranked_completer::RankedCompleter;
pub use ranked_guide::RankedGuide;
