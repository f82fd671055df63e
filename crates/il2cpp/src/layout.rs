//! Header layout reconstruction
//!
//! The section words that follow the header prefix are not stored in declared
//! field order. They are recovered by chaining: the first section starts right
//! after the header, and every later section starts where the previous one
//! ends. The search works on a sorted copy of the words, so the result depends
//! only on their values and never on their physical order.

use crate::header::{Il2CppGlobalMetadataHeader, SectionRange};
use gmeta_binary_parser::BinaryReader;
use gmeta_core::{Error, FormatVersion, Result};
use tracing::debug;

/// Gap tolerated between two sections when no exact chain link exists
pub const PADDING_SLACK: u32 = 4;

/// Backtracking search over a sorted word multiset with an active mask
struct ChainMatcher {
    values: Vec<u32>,
    active: Vec<bool>,
    remaining: usize,
}

impl ChainMatcher {
    fn new(words: &[u32]) -> Self {
        let mut values = words.to_vec();
        values.sort_unstable();
        let remaining = values.len();
        Self {
            values,
            active: vec![true; remaining],
            remaining,
        }
    }

    fn find(&self, value: u64, skip: Option<usize>) -> Option<usize> {
        (0..self.values.len()).find(|&i| {
            self.active[i] && u64::from(self.values[i]) == value && Some(i) != skip
        })
    }

    fn take(&mut self, index: usize) {
        self.active[index] = false;
        self.remaining -= 1;
    }

    fn restore(&mut self, index: usize) {
        self.active[index] = true;
        self.remaining += 1;
    }

    /// Indices of distinct sizes whose end, starting at `start`, is another remaining word
    fn candidates(&self, start: u64) -> Vec<usize> {
        let mut found = Vec::new();
        let mut last = None;
        for (index, &size) in self.values.iter().enumerate() {
            if !self.active[index] || last == Some(size) {
                continue;
            }
            if self.find(start + u64::from(size), Some(index)).is_some() {
                last = Some(size);
                found.push(index);
            }
        }
        found
    }

    /// Resolve the chain from `cur`; the returned ranges are in reverse order
    fn solve(&mut self, cur: u64) -> Option<Vec<SectionRange>> {
        if self.remaining == 2 {
            let mut left = (0..self.values.len()).filter(|&i| self.active[i]);
            let (a, b) = (self.values[left.next()?], self.values[left.next()?]);
            return if u64::from(a) == cur {
                Some(vec![SectionRange::new(a, b)])
            } else if u64::from(b) == cur {
                Some(vec![SectionRange::new(b, a)])
            } else {
                None
            };
        }
        if self.remaining < 2 {
            return None;
        }

        let anchor = self.find(cur, None)?;
        let offset = self.values[anchor];
        self.take(anchor);

        for slack in [0, PADDING_SLACK] {
            let start = cur + u64::from(slack);
            let candidates = self.candidates(start);
            if candidates.is_empty() {
                continue;
            }
            for index in candidates {
                let size = self.values[index];
                self.take(index);
                if let Some(mut chain) = self.solve(start + u64::from(size)) {
                    chain.push(SectionRange::new(offset, size));
                    return Some(chain);
                }
                self.restore(index);
            }
            break;
        }

        self.restore(anchor);
        None
    }
}

/// Pair up raw section words into `(offset, size)` ranges in chain order
///
/// Returns `None` when no chain starting at `start` consumes every word.
pub fn reconstruct(words: &[u32], start: u32) -> Option<Vec<SectionRange>> {
    let mut matcher = ChainMatcher::new(words);
    let mut chain = matcher.solve(u64::from(start))?;
    chain.reverse();
    Some(chain)
}

/// Read the header under `version`, recovering the section order if requested
pub fn read_header(
    data: &[u8],
    version: FormatVersion,
    reconstruct_layout: bool,
) -> Result<Il2CppGlobalMetadataHeader> {
    let mut header = Il2CppGlobalMetadataHeader::read_declared(data, version)?;
    if !reconstruct_layout {
        return Ok(header);
    }

    let word_count = Il2CppGlobalMetadataHeader::word_count(version);
    let start = (word_count * 4) as u32;
    let words = BinaryReader::new_at(data, 8).read_words(word_count - 2)?;
    let ranges = reconstruct(&words, start).ok_or(Error::LayoutUnresolvable {
        words: words.len(),
        start,
    })?;
    header.set_sections(version, &ranges)?;

    for (name, range) in header.sections(version) {
        debug!("{:<40} {:#010x} +{:#x}", name, range.offset, range.size);
    }

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MetadataBuilder, Words};
    use gmeta_core::FormatVersion as V;

    fn flatten(ranges: &[SectionRange]) -> Vec<u32> {
        ranges.iter().flat_map(|r| [r.offset, r.size]).collect()
    }

    fn sample() -> Vec<SectionRange> {
        [(64, 8), (72, 0), (72, 12), (84, 0), (84, 0), (84, 20), (104, 4)]
            .into_iter()
            .map(|(offset, size)| SectionRange::new(offset, size))
            .collect()
    }

    #[test]
    fn test_chain_recovered_from_any_order() {
        let expected = sample();
        let mut words = flatten(&expected);
        assert_eq!(reconstruct(&words, 64), Some(expected.clone()));

        words.reverse();
        assert_eq!(reconstruct(&words, 64), Some(expected.clone()));

        words.rotate_left(5);
        assert_eq!(reconstruct(&words, 64), Some(expected));
    }

    #[test]
    fn test_chain_links_and_round_trip() {
        let mut words = flatten(&sample());
        words.swap(0, 9);
        let first = reconstruct(&words, 64).unwrap();
        for pair in first.windows(2) {
            assert_eq!(pair[0].end(), u64::from(pair[1].offset));
        }
        assert_eq!(reconstruct(&words, 64), Some(first.clone()));
        assert_eq!(reconstruct(&flatten(&first), 64), Some(first));
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        // size 4 also leads to a word (20), but that branch cannot finish
        let words = [16, 20, 36, 4, 40, 4];
        assert_eq!(
            reconstruct(&words, 16),
            Some(vec![
                SectionRange::new(16, 20),
                SectionRange::new(36, 4),
                SectionRange::new(40, 4),
            ])
        );
    }

    #[test]
    fn test_padding_slack() {
        let words = [112, 4, 100, 8];
        assert_eq!(
            reconstruct(&words, 100),
            Some(vec![SectionRange::new(100, 8), SectionRange::new(112, 4)])
        );
    }

    #[test]
    fn test_unresolvable_chain() {
        assert_eq!(reconstruct(&[1, 2, 3, 4], 40), None);
        assert_eq!(reconstruct(&[40], 40), None);
        assert_eq!(reconstruct(&[u32::MAX, u32::MAX, 8, 40], 40), None);
    }

    #[test]
    fn test_read_header_recovers_declared_order() {
        let builder = MetadataBuilder::new(V::V20)
            .section("string", b"abc\0".to_vec())
            .section("fields", vec![0; 16])
            .section("images", vec![0; 24]);
        let declared = builder.build();
        let shuffled = builder.reverse_header().build();
        assert_ne!(declared, shuffled);

        let expected = Il2CppGlobalMetadataHeader::read_declared(&declared, V::V20).unwrap();
        assert_eq!(read_header(&declared, V::V20, true).unwrap(), expected);
        assert_eq!(read_header(&shuffled, V::V20, true).unwrap(), expected);
        assert_eq!(expected.string, SectionRange::new(224, 4));
        assert_eq!(expected.images, SectionRange::new(244, 24));

        assert_ne!(read_header(&shuffled, V::V20, false).unwrap(), expected);
    }

    #[test]
    fn test_read_header_unresolvable() {
        let mut words = Words::default().u32(crate::METADATA_MAGIC).i32(20);
        for _ in 0..54 {
            words = words.u32(7);
        }
        let data = words.into_bytes();
        assert!(matches!(
            read_header(&data, V::V20, true),
            Err(Error::LayoutUnresolvable { words: 54, start: 224 })
        ));
        assert!(read_header(&data, V::V20, false).is_ok());
    }
}
