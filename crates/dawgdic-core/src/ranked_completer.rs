//! Best-first enumeration of completions, highest value first.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::dictionary::Dictionary;
use crate::ranked_guide::{best_reachable_value, RankedGuide};

#[derive(Debug, Clone)]
struct Candidate {
    value: i32,
    index: u32,
    key: Vec<u8>,
    // `true` for a concrete key ready to emit (the node's own `'\0'`
    // transition); `false` for a subtree still to be expanded into its
    // terminal and its children on the next pop.
    emit: bool,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.index == other.index && self.emit == other.emit
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; higher value wins, lower index breaks ties
        // so iteration order is deterministic across runs.
        self.value
            .cmp(&other.value)
            .then_with(|| other.index.cmp(&self.index))
            .then_with(|| self.emit.cmp(&other.emit))
    }
}

/// Walks completions of a prefix in descending order of value.
///
/// Maintains a max-heap of candidates instead of a single stack. A popped
/// subtree candidate is expanded into, at most, one terminal-emit candidate
/// for its own `'\0'` transition plus one subtree candidate per child, all
/// pushed back onto the heap; a popped emit candidate is returned directly.
/// This keeps a node's own key and its descendants as independent heap
/// entries so neither can shadow the other.
pub struct RankedCompleter<'a> {
    dic: &'a Dictionary,
    guide: &'a RankedGuide,
    heap: BinaryHeap<Candidate>,
    value_memo: HashMap<u32, i32>,
    key: Vec<u8>,
    current_index: u32,
}

impl<'a> RankedCompleter<'a> {
    pub fn new(dic: &'a Dictionary, guide: &'a RankedGuide) -> Self {
        RankedCompleter {
            dic,
            guide,
            heap: BinaryHeap::new(),
            value_memo: HashMap::new(),
            key: Vec::new(),
            current_index: 0,
        }
    }

    /// Begins enumerating completions of `prefix`, rooted at the dictionary
    /// index `prefix` already resolves to.
    pub fn start(&mut self, index: u32, prefix: &[u8]) {
        self.heap.clear();
        let value = best_reachable_value(self.dic, index, &mut self.value_memo);
        self.heap.push(Candidate { value, index, key: prefix.to_vec(), emit: false });
        self.key.clear();
        self.current_index = index;
    }

    /// Advances to the next completion in descending value order, returning
    /// `false` once exhausted.
    pub fn next(&mut self) -> bool {
        loop {
            let candidate = match self.heap.pop() {
                Some(c) => c,
                None => return false,
            };

            if candidate.emit {
                self.key = candidate.key;
                self.current_index = candidate.index;
                return true;
            }

            let idx = candidate.index;
            let key = candidate.key;

            // The node's own terminal and its children are independent
            // branches: both get queued, never one in place of the other.
            if self.dic.has_leaf(idx) {
                let value = self.dic.value_at(idx);
                self.heap.push(Candidate { value, index: idx, key: key.clone(), emit: true });
            }

            let mut label = self.guide.child(idx);
            while label != 0 {
                let child_idx = match self.dic.follow_byte(label, idx) {
                    Some(i) => i,
                    None => break,
                };
                let value = best_reachable_value(self.dic, child_idx, &mut self.value_memo);
                let mut child_key = key.clone();
                child_key.push(label);
                self.heap.push(Candidate { value, index: child_idx, key: child_key, emit: false });
                label = self.guide.sibling(child_idx);
            }
        }
    }

    /// The key of the completion last returned by [`Self::next`].
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The value of the completion last returned by [`Self::next`].
    pub fn value(&self) -> i32 {
        self.dic.value_at(self.current_index)
    }
}
