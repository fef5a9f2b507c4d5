//! Lexicographic enumeration of every key completing a given prefix.

use crate::dictionary::Dictionary;
use crate::guide::Guide;

/// Walks every completion of a prefix in ascending lexicographic order.
///
/// Reusable across calls to [`Self::start`] so a caller can run many
/// completions without reallocating the internal key buffer and index stack.
pub struct Completer<'a> {
    dic: &'a Dictionary,
    guide: &'a Guide,
    key: Vec<u8>,
    index_stack: Vec<u32>,
    started: bool,
}

impl<'a> Completer<'a> {
    pub fn new(dic: &'a Dictionary, guide: &'a Guide) -> Self {
        Completer { dic, guide, key: Vec::new(), index_stack: Vec::new(), started: false }
    }

    /// Begins enumerating completions of `prefix`, rooted at the dictionary
    /// index `prefix` already resolves to.
    pub fn start(&mut self, index: u32, prefix: &[u8]) {
        self.key.clear();
        self.key.extend_from_slice(prefix);
        self.index_stack.clear();
        self.index_stack.push(index);
        self.started = false;
    }

    /// Advances to the next completion in lexicographic order, returning
    /// `false` once exhausted.
    pub fn next(&mut self) -> bool {
        if self.index_stack.is_empty() {
            return false;
        }

        if !self.started {
            self.started = true;
            return self.descend_to_terminal();
        }

        let top = *self.index_stack.last().unwrap();
        let child_label = self.guide.child(top);
        let moved = if child_label != 0 {
            match self.dic.follow_byte(child_label, top) {
                Some(next_idx) => {
                    self.index_stack.push(next_idx);
                    self.key.push(child_label);
                    true
                }
                None => false,
            }
        } else {
            self.ascend()
        };

        if !moved {
            self.index_stack.clear();
            return false;
        }

        self.descend_to_terminal()
    }

    /// From the current top of the stack, descends via the smallest label at
    /// each step until reaching an accepting unit, ascending past dead ends.
    fn descend_to_terminal(&mut self) -> bool {
        loop {
            let top = match self.index_stack.last() {
                Some(&i) => i,
                None => return false,
            };
            if self.dic.has_leaf(top) {
                return true;
            }
            let child_label = self.guide.child(top);
            if child_label == 0 {
                if !self.ascend() {
                    self.index_stack.clear();
                    return false;
                }
                continue;
            }
            match self.dic.follow_byte(child_label, top) {
                Some(next_idx) => {
                    self.index_stack.push(next_idx);
                    self.key.push(child_label);
                }
                None => {
                    self.index_stack.clear();
                    return false;
                }
            }
        }
    }

    /// Pops up the stack until a popped unit has a next sibling, follows it,
    /// and returns `true`. Returns `false` if the start index itself is
    /// reached with no sibling left to try.
    fn ascend(&mut self) -> bool {
        loop {
            if self.index_stack.len() <= 1 {
                self.index_stack.clear();
                return false;
            }
            let popped = self.index_stack.pop().unwrap();
            self.key.pop();
            let parent = *self.index_stack.last().unwrap();
            let sibling_label = self.guide.sibling(popped);
            if sibling_label != 0 {
                return match self.dic.follow_byte(sibling_label, parent) {
                    Some(next_idx) => {
                        self.index_stack.push(next_idx);
                        self.key.push(sibling_label);
                        true
                    }
                    None => {
                        self.index_stack.clear();
                        false
                    }
                };
            }
        }
    }

    /// The key of the completion last returned by [`Self::next`].
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The value of the completion last returned by [`Self::next`].
    pub fn value(&self) -> i32 {
        let top = *self.index_stack.last().unwrap();
        self.dic.value_at(top)
    }
}
