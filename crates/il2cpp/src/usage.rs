//! Metadata usage decoding
//!
//! A usage pair links a runtime slot (the destination index) to a packed
//! source reference. The top three bits of the packed value select the usage
//! kind; the remaining bits hold the index, with a layout that changed at 27.

use crate::types::{Il2CppMetadataUsageList, Il2CppMetadataUsagePair};
use gmeta_core::{Error, FormatVersion, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Kind of a metadata usage, from the top three bits of an encoded index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum MetadataUsage {
    TypeInfo = 1,
    Il2CppType = 2,
    MethodDef = 3,
    FieldInfo = 4,
    StringLiteral = 5,
    MethodRef = 6,
}

impl MetadataUsage {
    pub const ALL: [MetadataUsage; 6] = [
        MetadataUsage::TypeInfo,
        MetadataUsage::Il2CppType,
        MetadataUsage::MethodDef,
        MetadataUsage::FieldInfo,
        MetadataUsage::StringLiteral,
        MetadataUsage::MethodRef,
    ];

    pub fn from_kind(kind: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|usage| *usage as u32 == kind)
    }

    fn slot(self) -> usize {
        self as usize - 1
    }
}

/// Usage kind bits of an encoded index
pub fn usage_kind(encoded: u32) -> u32 {
    (encoded & 0xE000_0000) >> 29
}

/// Index bits of an encoded index under `version`
pub fn decoded_index(encoded: u32, version: FormatVersion) -> u32 {
    if version >= FormatVersion::V27 {
        (encoded & 0x1FFF_FFFE) >> 1
    } else {
        encoded & 0x1FFF_FFFF
    }
}

/// Decoded usages, one ordered `destination -> index` map per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTable {
    tables: [BTreeMap<u32, u32>; 6],
}

impl UsageTable {
    /// Decode every pair referenced by `lists`
    ///
    /// Windows that reach past the pair array are cut short. A later pair for
    /// the same destination replaces an earlier one.
    pub fn build(
        lists: &[Il2CppMetadataUsageList],
        pairs: &[Il2CppMetadataUsagePair],
        version: FormatVersion,
    ) -> Result<Self> {
        let mut table = Self::default();
        for list in lists {
            let start = usize::try_from(list.start)
                .unwrap_or(usize::MAX)
                .min(pairs.len());
            let count = usize::try_from(list.count).unwrap_or(usize::MAX);
            let end = start.saturating_add(count).min(pairs.len());
            for pair in &pairs[start..end] {
                let kind = usage_kind(pair.encoded_source_index);
                let usage = MetadataUsage::from_kind(kind).ok_or_else(|| {
                    Error::invalid_format(format!(
                        "metadata usage {:#010x} has unknown kind {}",
                        pair.encoded_source_index, kind
                    ))
                })?;
                table.tables[usage.slot()].insert(
                    pair.destination_index,
                    decoded_index(pair.encoded_source_index, version),
                );
            }
        }

        debug!(
            "Decoded {} metadata usages",
            table.tables.iter().map(BTreeMap::len).sum::<usize>()
        );
        Ok(table)
    }

    pub fn get(&self, usage: MetadataUsage) -> &BTreeMap<u32, u32> {
        &self.tables[usage.slot()]
    }

    /// One past the highest destination index of any kind
    pub fn total_count(&self) -> u64 {
        self.tables
            .iter()
            .map(|table| table.keys().next_back().copied().unwrap_or(0))
            .max()
            .map_or(0, |max| u64::from(max) + 1)
    }
}
