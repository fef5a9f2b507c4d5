//! Online trie minimisation into a [`Dawg`](crate::dawg::Dawg).
//!
//! Keys must arrive in one monotone byte-lexicographic order (ascending or
//! descending); the direction is fixed by the first divergence the builder
//! observes and every later divergence must agree with it. Equivalent
//! sibling chains ("states") are hash-consed as soon as the builder can
//! prove no further key will ever extend them.

use crate::dawg::{Dawg, PackedTransition};
use crate::pool::Pool;

const INITIAL_HASH_TABLE_SIZE: usize = 1 << 8;

/// Failure to insert a key into a [`DawgBuilder`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// Values must be in `[0, 2^31)`.
    #[error("value must be non-negative")]
    NegativeValue,
    /// Keys must contain at least one byte.
    #[error("key must not be empty")]
    EmptyKey,
    /// Either the key was out of order relative to the direction fixed by an
    /// earlier insert, or it duplicates an already-inserted key.
    #[error("key is out of order (or duplicates a key already inserted)")]
    OrderViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Ascending,
    Descending,
}

/// Mutable, not-yet-fixed transition record used while a key is being
/// spliced into the trie.
#[derive(Debug, Default, Clone, Copy)]
struct BuildUnit {
    child: u32,
    sibling: u32,
    label: u8,
    is_state: bool,
    has_sibling: bool,
}

impl BuildUnit {
    fn base(&self) -> u32 {
        if self.label == 0 {
            (self.child << 1) | self.has_sibling as u32
        } else {
            (self.child << 2) | ((self.is_state as u32) << 1) | self.has_sibling as u32
        }
    }

    fn set_value(&mut self, value: i32) {
        self.child = value as u32;
    }
}

/// Incrementally minimises a sorted stream of keys into a DAWG.
pub struct DawgBuilder {
    unit_pool: Pool<BuildUnit>,
    base_pool: Pool<PackedTransition>,
    label_pool: Pool<u8>,
    flag_pool: Pool<bool>,
    hash_table: Vec<u32>,
    unfixed_units: Vec<u32>,
    unused_units: Vec<u32>,
    order: Option<Order>,
    num_states: u32,
    num_merged_transitions: u32,
    num_merging_states: u32,
}

impl Default for DawgBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DawgBuilder {
    pub fn new() -> Self {
        let mut builder = DawgBuilder {
            unit_pool: Pool::new(),
            base_pool: Pool::new(),
            label_pool: Pool::new(),
            flag_pool: Pool::new(),
            hash_table: vec![0; INITIAL_HASH_TABLE_SIZE],
            unfixed_units: Vec::new(),
            unused_units: Vec::new(),
            order: None,
            num_states: 1,
            num_merged_transitions: 0,
            num_merging_states: 0,
        };
        builder.reuse_or_create_unit();
        builder.allocate_transition();
        builder.unit_pool[0].label = 0xFF;
        builder.unfixed_units.push(0);
        builder
    }

    /// Resets the builder to its freshly-constructed state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Inserts `key` with an associated `value`.
    ///
    /// `key` must compare, against every previously inserted key, in the
    /// same direction (ascending or descending) as the first divergence the
    /// builder has ever observed; otherwise the insert is rejected and the
    /// builder's state is left exactly as it was before the call.
    pub fn insert(&mut self, key: &[u8], value: i32) -> Result<(), InsertError> {
        if value < 0 {
            return Err(InsertError::NegativeValue);
        }
        if key.is_empty() {
            return Err(InsertError::EmptyKey);
        }

        let length = key.len();
        let mut index: u32 = 0;
        let mut key_pos: usize = 0;
        let mut diverged = false;

        while key_pos <= length {
            let child_index = self.unit_pool[index].child;
            if child_index == 0 {
                break;
            }

            let key_label = if key_pos < length { key[key_pos] } else { 0 };
            let unit_label = self.unit_pool[child_index].label;

            use std::cmp::Ordering::*;
            match key_label.cmp(&unit_label) {
                Equal => {
                    index = child_index;
                    key_pos += 1;
                }
                ordering => {
                    let direction = if ordering == Greater {
                        Order::Ascending
                    } else {
                        Order::Descending
                    };
                    match self.order {
                        None => self.order = Some(direction),
                        Some(fixed) if fixed != direction => {
                            return Err(InsertError::OrderViolation);
                        }
                        _ => {}
                    }
                    self.unit_pool[child_index].has_sibling = true;
                    self.fix_states(child_index);
                    diverged = true;
                    break;
                }
            }
        }

        if !diverged && key_pos > length {
            // Every position (including the terminator) matched an
            // existing chain: this key duplicates one already inserted.
            return Err(InsertError::OrderViolation);
        }

        for pos in key_pos..=length {
            let key_label = if pos < length { key[pos] } else { 0 };
            let child_index = self.reuse_or_create_unit();

            if self.unit_pool[index].child == 0 {
                self.unit_pool[child_index].is_state = true;
            }
            self.unit_pool[child_index].sibling = self.unit_pool[index].child;
            self.unit_pool[child_index].label = key_label;
            self.unit_pool[index].child = child_index;
            self.unfixed_units.push(child_index);

            index = child_index;
        }

        self.unit_pool[index].set_value(value);
        Ok(())
    }

    /// Seals the builder, hash-consing every still-open state and moving the
    /// fixed transitions into an immutable [`Dawg`]. Leaves the builder
    /// reset, ready for reuse.
    pub fn finish(&mut self) -> Dawg {
        self.fix_states(0);
        self.base_pool[0] = PackedTransition(self.unit_pool[0].base());
        self.label_pool[0] = self.unit_pool[0].label;

        let mut base_pool = Pool::new();
        let mut label_pool = Pool::new();
        let mut flag_pool = Pool::new();
        base_pool.swap(&mut self.base_pool);
        label_pool.swap(&mut self.label_pool);
        flag_pool.swap(&mut self.flag_pool);

        let dawg = Dawg {
            base_pool,
            label_pool,
            flag_pool,
            num_states: self.num_states,
            num_merged_transitions: self.num_merged_transitions,
            num_merging_states: self.num_merging_states,
        };

        self.clear();
        dawg
    }

    /// Fixes every unit above `index` on the unfixed stack, hash-consing
    /// each completed sibling chain and rewiring its parent's child pointer
    /// to the canonical (possibly shared) state.
    fn fix_states(&mut self, index: u32) {
        while let Some(unfixed_index) = self.unfixed_units.pop() {
            if unfixed_index == index {
                break;
            }

            let expansion_threshold = self.hash_table.len() - (self.hash_table.len() >> 2);
            if self.num_states as usize >= expansion_threshold {
                self.expand_hash_table();
            }

            let mut num_of_siblings: u32 = 0;
            let mut i = unfixed_index;
            while i != 0 {
                num_of_siblings += 1;
                i = self.unit_pool[i].sibling;
            }

            let (hash_id, mut matched_index) = self.find_unit(unfixed_index);

            if matched_index != 0 {
                self.num_merged_transitions += num_of_siblings;
                if !self.flag_pool[matched_index] {
                    self.num_merging_states += 1;
                    self.flag_pool[matched_index] = true;
                }
            } else {
                let mut transition_index = 0;
                for _ in 0..num_of_siblings {
                    transition_index = self.allocate_transition();
                }
                let mut i = unfixed_index;
                while i != 0 {
                    self.base_pool[transition_index] = PackedTransition(self.unit_pool[i].base());
                    self.label_pool[transition_index] = self.unit_pool[i].label;
                    transition_index -= 1;
                    i = self.unit_pool[i].sibling;
                }
                matched_index = transition_index + 1;
                self.hash_table[hash_id as usize] = matched_index;
                self.num_states += 1;
            }

            let mut current = unfixed_index;
            while current != 0 {
                let next = self.unit_pool[current].sibling;
                self.unused_units.push(current);
                current = next;
            }

            let new_top = *self.unfixed_units.last().expect("root stays on the stack");
            self.unit_pool[new_top].child = matched_index;
        }
    }

    fn expand_hash_table(&mut self) {
        let new_size = self.hash_table.len() << 1;
        self.hash_table = vec![0; new_size];

        for index in 1..self.base_pool.len() {
            if self.label_pool[index] == 0 || self.base_pool[index].is_state() {
                let hash_id = self.hash_transition(index) % self.hash_table.len() as u32;
                self.hash_table[hash_id as usize] = index;
            }
        }
    }

    fn find_unit(&self, unit_index: u32) -> (u32, u32) {
        let table_len = self.hash_table.len() as u32;
        let mut hash_id = self.hash_unit(unit_index) % table_len;
        loop {
            let transition_id = self.hash_table[hash_id as usize];
            if transition_id == 0 {
                return (hash_id, 0);
            }
            if self.are_equal(unit_index, transition_id) {
                return (hash_id, transition_id);
            }
            hash_id = (hash_id + 1) % table_len;
        }
    }

    /// Whether the unfixed sibling chain headed at `unit_index` and the
    /// already-fixed transition chain headed at `transition_index` carry the
    /// same (base, label) sequence. The unfixed chain links newest-first via
    /// `BuildUnit::sibling`; the fixed chain links oldest-first via
    /// `has_sibling`/`index + 1`, so both are normalised to oldest-first
    /// before comparing.
    fn are_equal(&self, unit_index: u32, transition_index: u32) -> bool {
        let mut unit_chain = Vec::new();
        let mut i = unit_index;
        while i != 0 {
            unit_chain.push((self.unit_pool[i].base(), self.unit_pool[i].label));
            i = self.unit_pool[i].sibling;
        }
        unit_chain.reverse();

        let mut fixed_chain = Vec::new();
        let mut t = transition_index;
        loop {
            fixed_chain.push((self.base_pool[t].0, self.label_pool[t]));
            if !self.base_pool[t].has_sibling() {
                break;
            }
            t += 1;
        }

        unit_chain == fixed_chain
    }

    fn hash_unit(&self, index: u32) -> u32 {
        let mut hash_value = 0u32;
        let mut index = index;
        while index != 0 {
            let base = self.unit_pool[index].base();
            let label = self.unit_pool[index].label;
            hash_value ^= hash32((u32::from(label) << 24) ^ base);
            index = self.unit_pool[index].sibling;
        }
        hash_value
    }

    fn hash_transition(&self, index: u32) -> u32 {
        let mut hash_value = 0u32;
        let mut index = index;
        loop {
            let base = self.base_pool[index].0;
            let label = self.label_pool[index];
            hash_value ^= hash32((u32::from(label) << 24) ^ base);
            if !self.base_pool[index].has_sibling() {
                break;
            }
            index += 1;
        }
        hash_value
    }

    fn reuse_or_create_unit(&mut self) -> u32 {
        let index = match self.unused_units.pop() {
            Some(index) => index,
            None => self.unit_pool.allocate(),
        };
        self.unit_pool[index] = BuildUnit::default();
        index
    }

    fn allocate_transition(&mut self) -> u32 {
        self.base_pool.allocate();
        self.flag_pool.allocate();
        self.label_pool.allocate()
    }
}

/// 32-bit integer mix (Thomas Wang-style), used to combine transition hashes
/// order-insensitively within a sibling chain.
fn hash32(value: u32) -> u32 {
    let mut key = value;
    key = (!key).wrapping_add(key << 15);
    key ^= key >> 12;
    key = key.wrapping_add(key << 2);
    key ^= key >> 4;
    key = key.wrapping_mul(2057);
    key ^ (key >> 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_value() {
        let mut builder = DawgBuilder::new();
        assert_eq!(
            builder.insert(b"a", -1),
            Err(InsertError::NegativeValue)
        );
    }

    #[test]
    fn rejects_empty_key() {
        let mut builder = DawgBuilder::new();
        assert_eq!(builder.insert(b"", 0), Err(InsertError::EmptyKey));
    }

    #[test]
    fn ascending_inserts_succeed() {
        let mut builder = DawgBuilder::new();
        assert!(builder.insert(b"apple", 1).is_ok());
        assert!(builder.insert(b"banana", 2).is_ok());
        assert!(builder.insert(b"cherry", 3).is_ok());
    }

    #[test]
    fn descending_inserts_succeed() {
        let mut builder = DawgBuilder::new();
        assert!(builder.insert(b"cherry", 3).is_ok());
        assert!(builder.insert(b"banana", 2).is_ok());
        assert!(builder.insert(b"apple", 1).is_ok());
    }

    #[test]
    fn mixed_direction_is_rejected() {
        let mut builder = DawgBuilder::new();
        assert!(builder.insert(b"apple", 1).is_ok());
        assert!(builder.insert(b"banana", 2).is_ok());
        assert_eq!(
            builder.insert(b"avocado", 4),
            Err(InsertError::OrderViolation)
        );
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut builder = DawgBuilder::new();
        assert!(builder.insert(b"apple", 1).is_ok());
        assert_eq!(
            builder.insert(b"apple", 2),
            Err(InsertError::OrderViolation)
        );
    }

    #[test]
    fn merges_equivalent_suffixes() {
        let mut builder = DawgBuilder::new();
        for key in ["cities", "pities"] {
            builder.insert(key.as_bytes(), 0).unwrap();
        }
        let dawg = builder.finish();
        assert!(dawg.merged_transitions_count() > 0);
    }
}
