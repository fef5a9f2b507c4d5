//! Lexicographic completion guide: for every dictionary index that is a
//! DAWG node, the smallest outgoing label and the next sibling label, so a
//! [`crate::completer::Completer`] can walk completions without touching the
//! DAWG itself.

use std::io::{Read, Write};

use crate::dictionary::Dictionary;

/// Failure reading a persisted guide.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("guide file is truncated")]
    Truncated,
    #[error("guide size {found} does not match dictionary size {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ReadError> {
    let mut buf = [0u8; 4];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(u32::from_le_bytes(buf)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ReadError::Truncated),
        Err(e) => Err(e.into()),
    }
}

/// Parallel `{child, sibling}` byte arrays indexed by dictionary unit index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Guide {
    child: Vec<u8>,
    sibling: Vec<u8>,
}

impl Guide {
    pub(crate) fn from_parts(child: Vec<u8>, sibling: Vec<u8>) -> Guide {
        Guide { child, sibling }
    }

    /// Builds a guide by walking every reachable unit of `dic` and recording
    /// its smallest outgoing label and each child's next-sibling label, in
    /// plain ascending lexicographic order.
    pub fn build(dic: &Dictionary) -> Guide {
        let mut child = vec![0u8; dic.size()];
        let mut sibling = vec![0u8; dic.size()];
        let mut visited = vec![false; dic.size()];
        let mut stack = vec![dic.root()];
        visited[dic.root() as usize] = true;

        while let Some(idx) = stack.pop() {
            let labels = Self::ordered_children(dic, idx);

            if let Some(&(first_label, _)) = labels.first() {
                child[idx as usize] = first_label;
            }
            for pair in labels.windows(2) {
                sibling[pair[0].1 as usize] = pair[1].0;
            }
            for &(_, next) in &labels {
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    stack.push(next);
                }
            }
        }

        Guide { child, sibling }
    }

    fn ordered_children(dic: &Dictionary, idx: u32) -> Vec<(u8, u32)> {
        let mut labels = Vec::new();
        for label in 1u8..=255 {
            if let Some(next) = dic.follow_byte(label, idx) {
                labels.push((label, next));
            }
        }
        labels
    }

    /// Smallest outgoing label of the node at `idx` (other than `'\0'`), or
    /// `0` if it has none.
    pub fn child(&self, idx: u32) -> u8 {
        self.child[idx as usize]
    }

    /// Label of the next sibling after `idx`, or `0` if `idx` is last.
    pub fn sibling(&self, idx: u32) -> u8 {
        self.sibling[idx as usize]
    }

    pub fn size(&self) -> usize {
        self.child.len()
    }

    /// Serialises as a `u32` size followed by that many `{child, sibling}`
    /// byte pairs.
    pub fn write<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&(self.child.len() as u32).to_le_bytes())?;
        for i in 0..self.child.len() {
            writer.write_all(&[self.child[i], self.sibling[i]])?;
        }
        Ok(())
    }

    pub fn read<R: Read>(mut reader: R) -> Result<Guide, ReadError> {
        let size = read_u32(&mut reader)? as usize;
        let mut child = Vec::with_capacity(size);
        let mut sibling = Vec::with_capacity(size);
        for _ in 0..size {
            let mut buf = [0u8; 2];
            reader.read_exact(&mut buf).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    ReadError::Truncated
                } else {
                    ReadError::Io(e)
                }
            })?;
            child.push(buf[0]);
            sibling.push(buf[1]);
        }
        Ok(Guide { child, sibling })
    }

    /// Reads a guide and checks it was built over a dictionary of the same
    /// size as `dic`, the pairing a caller must maintain by hand since guide
    /// files carry no reference to the dictionary they annotate.
    pub fn read_matching<R: Read>(reader: R, dic: &Dictionary) -> Result<Guide, ReadError> {
        let guide = Guide::read(reader)?;
        if guide.size() != dic.size() {
            return Err(ReadError::SizeMismatch { expected: dic.size(), found: guide.size() });
        }
        Ok(guide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg_builder::DawgBuilder;

    fn build(pairs: &[(&str, i32)]) -> (Dictionary, Guide) {
        let mut builder = DawgBuilder::new();
        for (key, value) in pairs {
            builder.insert(key.as_bytes(), *value).unwrap();
        }
        let dawg = builder.finish();
        let dic = Dictionary::build(&dawg).unwrap();
        let guide = Guide::build(&dic);
        (dic, guide)
    }

    #[test]
    fn child_is_smallest_label() {
        let (dic, guide) = build(&[("apple", 1), ("avocado", 2)]);
        let after_a = dic.follow_byte(b'a', dic.root()).unwrap();
        // "apple" < "avocado" lexicographically: 'p' < 'v'.
        assert_eq!(guide.child(after_a), b'p');
    }

    #[test]
    fn persists_through_write_and_read() {
        let (_, guide) = build(&[("apple", 1), ("banana", 2)]);
        let mut buf = Vec::new();
        guide.write(&mut buf).unwrap();
        let reread = Guide::read(std::io::Cursor::new(&buf)).unwrap();
        assert_eq!(reread, guide);
    }
}
