//! Packs a minimised [`Dawg`] into a [`Dictionary`]'s double array.
//!
//! Each DAWG state is placed at a dictionary index chosen so that every
//! outgoing label's target (`base ^ label`) lands on a currently-free slot.
//! Shared DAWG sub-trees (the product of hash-consing) are placed once; a
//! later parent reaching the same sub-tree reuses its existing physical
//! anchor instead of duplicating it, as long as the reused offset still
//! satisfies the placement constraints from that parent's own position.

use std::collections::HashMap;

use crate::dawg::Dawg;
use crate::dictionary::{Dictionary, Unit, OFFSET_MAX};

const BLOCK_SIZE: u32 = 256;
const NUM_OF_UNFIXED_BLOCKS: usize = 16;

/// Failure packing a [`Dawg`] into a [`Dictionary`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// The computed offset needed more than the 22 bits the plain unit
    /// encoding provides.
    #[error("dictionary offset overflowed the 22-bit encoding")]
    OffsetOverflow,
}

#[derive(Debug, Clone, Copy)]
struct Extra {
    prev: u32,
    next: u32,
    is_fixed: bool,
    is_used: bool,
}

impl Default for Extra {
    fn default() -> Self {
        Extra { prev: 0, next: 0, is_fixed: false, is_used: false }
    }
}

/// Builds a [`Dictionary`] from a [`Dawg`] by placing each state into a
/// shared double array.
struct DictionaryBuilder {
    units: Vec<Unit>,
    extras: Vec<Extra>,
    /// Head of the circular free list of not-yet-fixed slots; equal to
    /// `units.len()` when the list is empty.
    unfixed_index: u32,
    /// `dawg_node -> p ^ offset`, the physical anchor a DAWG node's
    /// children were placed under, reusable from any later parent `p2` via
    /// `offset2 = p2 ^ anchor`.
    anchors: HashMap<u32, u32>,
    num_unused_units: u32,
}

impl DictionaryBuilder {
    fn new() -> Self {
        DictionaryBuilder {
            units: Vec::new(),
            extras: Vec::new(),
            unfixed_index: 0,
            anchors: HashMap::new(),
            num_unused_units: 0,
        }
    }

    /// Packs `dawg` into a [`Dictionary`].
    pub fn build(dawg: &Dawg) -> Result<Dictionary, BuildError> {
        let mut builder = DictionaryBuilder::new();
        builder.expand();
        builder.unlink_free(0);
        builder.extras[0].is_fixed = true;

        builder.place(dawg, dawg.root(), 0)?;
        builder.fix_all_blocks();

        Ok(Dictionary::from_units(builder.units, builder.num_unused_units))
    }

    fn place(&mut self, dawg: &Dawg, dawg_node: u32, p: u32) -> Result<(), BuildError> {
        let children = Self::collect_children(dawg, dawg_node);
        if children.is_empty() {
            return Ok(());
        }
        let labels: Vec<u8> = children.iter().map(|&(label, _)| label).collect();

        if let Some(&anchor) = self.anchors.get(&dawg_node) {
            let offset = p ^ anchor;
            if self.is_good_offset(p, offset, &labels) {
                self.claim_offset(offset);
                self.units[p as usize].set_offset(offset);
                return Ok(());
            }
        }

        let offset = self.find_good_offset(p, &labels)?;
        self.claim_offset(offset);
        self.units[p as usize].set_offset(offset);
        self.anchors.insert(dawg_node, p ^ offset);

        for &(label, child_node) in &children {
            let target = p ^ offset ^ u32::from(label);
            self.ensure_capacity(target);
            if !self.extras[target as usize].is_fixed {
                self.unlink_free(target);
                self.extras[target as usize].is_fixed = true;
            }
            if label == 0 {
                self.units[target as usize] = Unit::leaf(dawg.value(child_node));
                self.units[p as usize].set_has_leaf(true);
            } else {
                self.units[target as usize] = Unit::non_leaf(label, 0, false);
            }
        }

        for &(label, child_node) in &children {
            if label != 0 {
                let child_p = p ^ offset ^ u32::from(label);
                self.place(dawg, child_node, child_p)?;
            }
        }

        Ok(())
    }

    fn collect_children(dawg: &Dawg, dawg_node: u32) -> Vec<(u8, u32)> {
        let mut result = Vec::new();
        let mut child = dawg.child(dawg_node);
        while child != 0 {
            result.push((dawg.label(child), child));
            child = dawg.sibling(child);
        }
        result
    }

    fn find_good_offset(&mut self, p: u32, labels: &[u8]) -> Result<u32, BuildError> {
        if self.unfixed_index < self.units.len() as u32 {
            let start = self.unfixed_index;
            let mut slot = start;
            loop {
                let offset = slot ^ u32::from(labels[0]);
                if self.is_good_offset(p, offset, labels) {
                    return Ok(offset);
                }
                slot = self.extras[slot as usize].next;
                if slot == start {
                    break;
                }
            }
        }

        let base_block = (self.units.len() as u32).next_multiple_of(BLOCK_SIZE);
        let offset = base_block | (p & 0xFF);
        if offset >= OFFSET_MAX {
            return Err(BuildError::OffsetOverflow);
        }
        Ok(offset)
    }

    fn is_good_offset(&self, p: u32, offset: u32, labels: &[u8]) -> bool {
        if offset >= OFFSET_MAX {
            return false;
        }
        if (p ^ offset) & 0xFF != 0 {
            return false;
        }
        if (offset as usize) < self.extras.len() && self.extras[offset as usize].is_used {
            return false;
        }
        for &label in &labels[1..] {
            let target = offset ^ u32::from(label);
            if (target as usize) < self.extras.len() && self.extras[target as usize].is_fixed {
                return false;
            }
        }
        true
    }

    fn claim_offset(&mut self, offset: u32) {
        self.ensure_capacity(offset);
        self.extras[offset as usize].is_used = true;
    }

    fn ensure_capacity(&mut self, index: u32) {
        while index >= self.units.len() as u32 {
            self.expand();
        }
    }

    /// Appends one fresh block of `BLOCK_SIZE` free slots, splicing it into
    /// the circular free list, then fixes the oldest block once more than
    /// `NUM_OF_UNFIXED_BLOCKS` have accumulated.
    fn expand(&mut self) {
        let old_len = self.units.len() as u32;
        let new_len = old_len + BLOCK_SIZE;
        let was_empty = self.unfixed_index == old_len;

        self.units.resize(new_len as usize, Unit::default());
        self.extras.resize(new_len as usize, Extra::default());

        for i in old_len..new_len {
            self.extras[i as usize] = Extra {
                prev: if i == old_len { new_len - 1 } else { i - 1 },
                next: if i == new_len - 1 { old_len } else { i + 1 },
                is_fixed: false,
                is_used: false,
            };
        }

        if was_empty {
            self.unfixed_index = old_len;
        } else {
            let head = self.unfixed_index;
            let before = self.extras[head as usize].prev;
            self.extras[before as usize].next = old_len;
            self.extras[old_len as usize].prev = before;
            self.extras[(new_len - 1) as usize].next = head;
            self.extras[head as usize].prev = new_len - 1;
        }

        let total_blocks = (new_len / BLOCK_SIZE) as usize;
        if total_blocks > NUM_OF_UNFIXED_BLOCKS {
            self.fix_block(total_blocks - NUM_OF_UNFIXED_BLOCKS - 1);
        }
    }

    /// Removes `index` from the circular free list.
    fn unlink_free(&mut self, index: u32) {
        let (prev, next) = {
            let extra = &self.extras[index as usize];
            (extra.prev, extra.next)
        };
        if self.unfixed_index == index {
            self.unfixed_index = if next == index { self.units.len() as u32 } else { next };
        }
        self.extras[prev as usize].next = next;
        self.extras[next as usize].prev = prev;
    }

    /// Reserves every still-free slot in block `block_index` with inert
    /// filler content, so no future placement can ever claim it: a stray
    /// XOR computed by a real query can only ever land on a slot some real
    /// parent deliberately reserved.
    fn fix_block(&mut self, block_index: usize) {
        let begin = block_index as u32 * BLOCK_SIZE;
        let end = (begin + BLOCK_SIZE).min(self.units.len() as u32);
        for i in begin..end {
            if !self.extras[i as usize].is_fixed {
                self.unlink_free(i);
                self.extras[i as usize].is_fixed = true;
                self.units[i as usize] = Unit::non_leaf(0, 0, false);
                self.num_unused_units += 1;
            }
        }
    }

    fn fix_all_blocks(&mut self) {
        let total_blocks = self.units.len() / BLOCK_SIZE as usize;
        for block in 0..total_blocks {
            self.fix_block(block);
        }
    }
}

impl Dictionary {
    /// Packs `dawg` into a [`Dictionary`].
    pub fn build(dawg: &Dawg) -> Result<Dictionary, BuildError> {
        DictionaryBuilder::build(dawg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg_builder::DawgBuilder;

    fn build_dawg(pairs: &[(&str, i32)]) -> Dawg {
        let mut builder = DawgBuilder::new();
        for (key, value) in pairs {
            builder.insert(key.as_bytes(), *value).unwrap();
        }
        builder.finish()
    }

    #[test]
    fn places_every_key() {
        let dawg = build_dawg(&[("apple", 1), ("banana", 2), ("cherry", 3)]);
        let dic = Dictionary::build(&dawg).unwrap();
        assert_eq!(dic.find(b"apple"), Some(1));
        assert_eq!(dic.find(b"banana"), Some(2));
        assert_eq!(dic.find(b"cherry"), Some(3));
        assert!(!dic.contains(b"cher"));
    }

    #[test]
    fn shares_merged_suffixes_without_duplicating_placement() {
        let dawg = build_dawg(&[("cities", 1), ("pities", 2)]);
        let dic = Dictionary::build(&dawg).unwrap();
        assert_eq!(dic.find(b"cities"), Some(1));
        assert_eq!(dic.find(b"pities"), Some(2));
    }

    #[test]
    fn large_random_key_set_round_trips() {
        let mut keys: Vec<String> = (0u32..2000)
            .map(|i| format!("{:06}", i * 37 % 1_000_000))
            .collect();
        keys.sort();
        keys.dedup();

        let mut builder = DawgBuilder::new();
        for (i, key) in keys.iter().enumerate() {
            builder.insert(key.as_bytes(), i as i32).unwrap();
        }
        let dawg = builder.finish();
        let dic = Dictionary::build(&dawg).unwrap();

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(dic.find(key.as_bytes()), Some(i as i32));
        }
    }
}
