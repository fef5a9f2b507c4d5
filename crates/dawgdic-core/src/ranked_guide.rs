//! Value-ranked completion guide: same shape as [`crate::guide::Guide`], but
//! each node's children are ordered by the best value reachable through
//! them, descending, instead of lexicographically.

use std::collections::HashMap;
use std::io::{Read, Write};

use crate::dictionary::Dictionary;
use crate::guide::{Guide, ReadError};

/// Best value reachable at or below `idx`, memoized per dictionary index.
pub(crate) fn best_reachable_value(dic: &Dictionary, idx: u32, memo: &mut HashMap<u32, i32>) -> i32 {
    if let Some(&v) = memo.get(&idx) {
        return v;
    }
    let mut best = if dic.has_leaf(idx) { dic.value_at(idx) } else { i32::MIN };
    for label in 1u8..=255 {
        if let Some(next) = dic.follow_byte(label, idx) {
            let v = best_reachable_value(dic, next, memo);
            if v > best {
                best = v;
            }
        }
    }
    memo.insert(idx, best);
    best
}

/// A [`Guide`] whose sibling order is ranked by descending best-reachable
/// value instead of ascending label.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RankedGuide(Guide);

impl RankedGuide {
    /// Builds a ranked guide over `dic`, ordering each node's children by
    /// descending best-reachable value (ties broken by ascending label).
    pub fn build(dic: &Dictionary) -> RankedGuide {
        let mut memo = HashMap::new();
        let mut child = vec![0u8; dic.size()];
        let mut sibling = vec![0u8; dic.size()];
        let mut visited = vec![false; dic.size()];
        let mut stack = vec![dic.root()];
        visited[dic.root() as usize] = true;

        while let Some(idx) = stack.pop() {
            let mut labels: Vec<(u8, u32, i32)> = Vec::new();
            for label in 1u8..=255 {
                if let Some(next) = dic.follow_byte(label, idx) {
                    let value = best_reachable_value(dic, next, &mut memo);
                    labels.push((label, next, value));
                }
            }
            labels.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

            if let Some(&(first_label, _, _)) = labels.first() {
                child[idx as usize] = first_label;
            }
            for pair in labels.windows(2) {
                sibling[pair[0].1 as usize] = pair[1].0;
            }
            for &(_, next, _) in &labels {
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    stack.push(next);
                }
            }
        }

        RankedGuide(Guide::from_parts(child, sibling))
    }

    pub fn child(&self, idx: u32) -> u8 {
        self.0.child(idx)
    }

    pub fn sibling(&self, idx: u32) -> u8 {
        self.0.sibling(idx)
    }

    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Same on-disk framing as [`Guide`]: a `u32` size followed by
    /// `{child, sibling}` byte pairs. Rank order is implicit in the stored
    /// labels, not in any extra persisted field.
    pub fn write<W: Write>(&self, writer: W) -> std::io::Result<()> {
        self.0.write(writer)
    }

    pub fn read<R: Read>(reader: R) -> Result<RankedGuide, ReadError> {
        Ok(RankedGuide(Guide::read(reader)?))
    }

    pub fn read_matching<R: Read>(reader: R, dic: &Dictionary) -> Result<RankedGuide, ReadError> {
        Ok(RankedGuide(Guide::read_matching(reader, dic)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg_builder::DawgBuilder;

    fn build(pairs: &[(&str, i32)]) -> (Dictionary, RankedGuide) {
        let mut builder = DawgBuilder::new();
        for (key, value) in pairs {
            builder.insert(key.as_bytes(), *value).unwrap();
        }
        let dawg = builder.finish();
        let dic = Dictionary::build(&dawg).unwrap();
        let guide = RankedGuide::build(&dic);
        (dic, guide)
    }

    #[test]
    fn orders_children_by_descending_value() {
        let (dic, guide) = build(&[("apple", 5), ("application", 50), ("apply", 20)]);
        let after_appl = dic.follow(b"appl", dic.root()).unwrap();
        // Children of "appl" are 'e' (-> "apple"=5) and 'i' (-> "application"=50,
        // "apply"=20, best-reachable for 'i' branch is 50). 'i' should rank first.
        assert_eq!(guide.child(after_appl), b'i');
    }

    #[test]
    fn persists_through_write_and_read() {
        let (_, guide) = build(&[("apple", 5), ("application", 50), ("apply", 20)]);
        let mut buf = Vec::new();
        guide.write(&mut buf).unwrap();
        let reread = RankedGuide::read(std::io::Cursor::new(&buf)).unwrap();
        assert_eq!(reread, guide);
    }
}
