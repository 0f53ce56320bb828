//! A single description shard and lazy fragment slicing.

use crate::error::ShardError;
use crate::types::CrateName;
use std::sync::OnceLock;

/// One file's worth of a crate's search descriptions.
///
/// `payload` is a preamble of `start_offset` bytes followed by the item
/// descriptions back to back. `fragment_lengths[i]` is the UTF-8 byte length of
/// description `i`, so descriptions are recovered by slicing rather than by
/// scanning for separators. Slice boundaries are computed on first access and
/// cached; a shard that is never searched is never decoded.
#[derive(Debug, Clone)]
pub struct DescriptorShard {
    crate_name: CrateName,
    shard_index: u32,
    payload: String,
    fragment_lengths: Vec<usize>,
    start_offset: usize,
    /// Prefix sums of `fragment_lengths`, starting at `start_offset`.
    offsets: OnceLock<Vec<usize>>,
}

impl DescriptorShard {
    pub fn new(
        crate_name: impl Into<CrateName>,
        shard_index: u32,
        payload: impl Into<String>,
        fragment_lengths: Vec<usize>,
        start_offset: usize,
    ) -> Self {
        Self {
            crate_name: crate_name.into(),
            shard_index,
            payload: payload.into(),
            fragment_lengths,
            start_offset,
            offsets: OnceLock::new(),
        }
    }

    /// Concatenate `descriptions` after `preamble`, recording each length.
    ///
    /// This is the producer side: the result always satisfies [`Self::validate`].
    pub fn from_descriptions<I, S>(
        crate_name: impl Into<CrateName>,
        shard_index: u32,
        preamble: &str,
        descriptions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut payload = String::from(preamble);
        let mut fragment_lengths = Vec::new();
        for description in descriptions {
            let description = description.as_ref();
            payload.push_str(description);
            fragment_lengths.push(description.len());
        }
        Self::new(crate_name, shard_index, payload, fragment_lengths, preamble.len())
    }

    pub fn crate_name(&self) -> &CrateName {
        &self.crate_name
    }

    pub fn shard_index(&self) -> u32 {
        self.shard_index
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn fragment_lengths(&self) -> &[usize] {
        &self.fragment_lengths
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Number of descriptions in this shard.
    pub fn len(&self) -> usize {
        self.fragment_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_lengths.is_empty()
    }

    /// The fixed data before the first fragment.
    pub fn preamble(&self) -> Option<&str> {
        self.payload.get(..self.start_offset)
    }

    /// Description `index` within this shard.
    ///
    /// Returns `None` when `index` is out of range or the length table does not
    /// line up with the payload.
    pub fn fragment(&self, index: usize) -> Option<&str> {
        let offsets = self.offsets();
        let start = *offsets.get(index)?;
        let end = *offsets.get(index + 1)?;
        self.payload.get(start..end)
    }

    /// All descriptions in order. A fragment that cannot be sliced yields `""`.
    pub fn fragments(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        (0..self.len()).map(|index| self.fragment(index).unwrap_or_default())
    }

    /// Check that the length table partitions the payload.
    pub fn validate(&self) -> Result<(), ShardError> {
        let fragments: usize = self.fragment_lengths.iter().sum();
        let covered = self.start_offset.checked_add(fragments);
        if covered != Some(self.payload.len()) {
            return Err(ShardError::LengthMismatch {
                crate_name: self.crate_name.to_string(),
                shard_index: self.shard_index,
                start_offset: self.start_offset,
                fragments,
                payload: self.payload.len(),
            });
        }

        for (fragment, &offset) in self.offsets().iter().enumerate() {
            if !self.payload.is_char_boundary(offset) {
                return Err(ShardError::SplitInsideChar {
                    crate_name: self.crate_name.to_string(),
                    shard_index: self.shard_index,
                    fragment,
                    offset,
                });
            }
        }

        Ok(())
    }

    fn offsets(&self) -> &[usize] {
        self.offsets.get_or_init(|| {
            let mut offsets = Vec::with_capacity(self.fragment_lengths.len() + 1);
            let mut cursor = self.start_offset;
            offsets.push(cursor);
            for &length in &self.fragment_lengths {
                cursor = cursor.saturating_add(length);
                offsets.push(cursor);
            }
            offsets
        })
    }
}
