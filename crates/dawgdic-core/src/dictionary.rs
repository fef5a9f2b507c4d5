//! Packed double-array dictionary: the on-disk/in-memory query structure.
//!
//! A [`Dictionary`] is a flat array of 32-bit [`Unit`]s addressed by XOR
//! offsets: `next = idx ^ offset(idx) ^ label`. Each non-leaf unit stores its
//! own incoming label so a parent can verify a candidate child actually
//! belongs to it; the `'\0'`-labelled terminal transition is the one
//! exception — its presence is recorded as a `has_leaf` flag on the parent
//! rather than a label match, since that slot's bits hold the stored value
//! instead of a label.

use std::io::{Read, Write};

const LABEL_SHIFT: u32 = 1;
const LABEL_MASK: u32 = 0xFF;
const OFFSET_SHIFT: u32 = 9;
const OFFSET_LOW_BITS: u32 = 22;
const OFFSET_LOW_MASK: u32 = (1 << OFFSET_LOW_BITS) - 1;
const HAS_LEAF_BIT: u32 = 1;
const HAS_EXTENSION_BIT: u32 = 1 << 31;

/// The largest offset a unit can hold without needing an extension unit.
pub(crate) const OFFSET_MAX: u32 = 1 << OFFSET_LOW_BITS;

/// A single packed double-array word.
///
/// Two mutually exclusive readings share the same bits, disambiguated by the
/// caller's traversal context (never by a bit in the word itself): a unit
/// reached as a normal child exposes `label`/`offset`/`has_leaf`; a unit
/// reached through its parent's `has_leaf` flag (the `'\0'` slot) exposes
/// `value` instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unit(pub(crate) u32);

impl Unit {
    pub(crate) fn has_leaf(self) -> bool {
        self.0 & HAS_LEAF_BIT != 0
    }

    pub(crate) fn label(self) -> u8 {
        ((self.0 >> LABEL_SHIFT) & LABEL_MASK) as u8
    }

    pub(crate) fn has_extension(self) -> bool {
        self.0 & HAS_EXTENSION_BIT != 0
    }

    pub(crate) fn offset_low(self) -> u32 {
        (self.0 >> OFFSET_SHIFT) & OFFSET_LOW_MASK
    }

    pub(crate) fn value(self) -> i32 {
        (self.0 >> 1) as i32
    }

    pub(crate) fn non_leaf(label: u8, offset: u32, has_leaf: bool) -> Unit {
        debug_assert!(offset < OFFSET_MAX, "offset {offset} needs an extension unit");
        let mut bits = (offset & OFFSET_LOW_MASK) << OFFSET_SHIFT;
        bits |= u32::from(label) << LABEL_SHIFT;
        if has_leaf {
            bits |= HAS_LEAF_BIT;
        }
        Unit(bits)
    }

    pub(crate) fn leaf(value: i32) -> Unit {
        Unit(((value as u32) << 1) | HAS_LEAF_BIT)
    }

    pub(crate) fn set_offset(&mut self, offset: u32) {
        debug_assert!(offset < OFFSET_MAX, "offset {offset} needs an extension unit");
        self.0 = (self.0 & !(OFFSET_LOW_MASK << OFFSET_SHIFT)) | ((offset & OFFSET_LOW_MASK) << OFFSET_SHIFT);
    }

    pub(crate) fn set_has_leaf(&mut self, has_leaf: bool) {
        if has_leaf {
            self.0 |= HAS_LEAF_BIT;
        } else {
            self.0 &= !HAS_LEAF_BIT;
        }
    }
}

/// Failure reading a persisted dictionary.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("dictionary file is truncated")]
    Truncated,
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, ReadError> {
    let mut buf = [0u8; 4];
    match reader.read_exact(&mut buf) {
        Ok(()) => Ok(u32::from_le_bytes(buf)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(ReadError::Truncated),
        Err(e) => Err(e.into()),
    }
}

/// An immutable, packed double-array dictionary mapping byte-string keys to
/// non-negative `i32` values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dictionary {
    units: Vec<Unit>,
    unused_units: u32,
}

impl Dictionary {
    pub(crate) fn from_units(units: Vec<Unit>, unused_units: u32) -> Dictionary {
        Dictionary { units, unused_units }
    }

    /// Index of the root unit.
    pub fn root(&self) -> u32 {
        0
    }

    /// Number of units in the backing array.
    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Number of units reserved as dead filler during block-fixing, never
    /// addressed by any real key. A build-quality diagnostic, not used by
    /// queries.
    pub fn unused_units(&self) -> u32 {
        self.unused_units
    }

    fn offset_of(&self, idx: u32) -> u32 {
        let unit = self.units[idx as usize];
        if unit.has_extension() {
            let high = self.units[idx as usize + 1].0;
            (unit.offset_low() | (high << OFFSET_LOW_BITS)) << 2
        } else {
            unit.offset_low()
        }
    }

    /// Follows a single byte transition from `idx`, validating that the
    /// landed unit really belongs to this parent under this label.
    pub fn follow_byte(&self, label: u8, idx: u32) -> Option<u32> {
        let next = idx ^ self.offset_of(idx) ^ u32::from(label);
        let unit = *self.units.get(next as usize)?;
        if unit.label() == label {
            Some(next)
        } else {
            None
        }
    }

    /// Folds [`Self::follow_byte`] over `key`, starting from `start`. Fails
    /// on the first byte with no matching child.
    pub fn follow(&self, key: &[u8], start: u32) -> Option<u32> {
        let mut idx = start;
        for &byte in key {
            idx = self.follow_byte(byte, idx)?;
        }
        Some(idx)
    }

    /// Like [`Self::follow`], but stops at the first mismatch instead of
    /// failing outright, returning the index reached and how many bytes of
    /// `key` matched.
    pub fn follow_prefix(&self, key: &[u8], start: u32) -> (u32, usize) {
        let mut idx = start;
        for (consumed, &byte) in key.iter().enumerate() {
            match self.follow_byte(byte, idx) {
                Some(next) => idx = next,
                None => return (idx, consumed),
            }
        }
        (idx, key.len())
    }

    /// Whether the state at `idx` has an outgoing `'\0'` (accepting)
    /// transition.
    pub fn has_leaf(&self, idx: u32) -> bool {
        self.units[idx as usize].has_leaf()
    }

    /// Value stored at the `'\0'` transition of `idx`. Caller must have
    /// already confirmed [`Self::has_leaf`].
    pub fn value_at(&self, idx: u32) -> i32 {
        let leaf_idx = idx ^ self.offset_of(idx);
        self.units[leaf_idx as usize].value()
    }

    /// Whether `key` is a complete, value-bearing entry in the dictionary.
    pub fn contains(&self, key: &[u8]) -> bool {
        match self.follow(key, self.root()) {
            Some(idx) => self.has_leaf(idx),
            None => false,
        }
    }

    /// Value associated with `key`, or `None` if absent.
    pub fn find(&self, key: &[u8]) -> Option<i32> {
        let idx = self.follow(key, self.root())?;
        self.has_leaf(idx).then(|| self.value_at(idx))
    }

    /// Serialises the dictionary: a `u32` unit count followed by that many
    /// little-endian `u32` units.
    pub fn write<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&(self.units.len() as u32).to_le_bytes())?;
        for unit in &self.units {
            writer.write_all(&unit.0.to_le_bytes())?;
        }
        Ok(())
    }

    /// Reads a dictionary previously written by [`Self::write`].
    pub fn read<R: Read>(mut reader: R) -> Result<Dictionary, ReadError> {
        let size = read_u32(&mut reader)? as usize;
        let mut units = Vec::with_capacity(size);
        for _ in 0..size {
            units.push(Unit(read_u32(&mut reader)?));
        }
        Ok(Dictionary { units, unused_units: 0 })
    }

    /// Parses a dictionary out of an in-memory byte buffer (a safe stand-in
    /// for adopting a pre-mapped region without copying it through a
    /// stream).
    pub fn from_bytes(bytes: &[u8]) -> Result<Dictionary, ReadError> {
        Dictionary::read(std::io::Cursor::new(bytes))
    }
}
