//! Enumerated-set domains: a named, ordered sequence of distinct string
//! labels. Immutable once constructed; shared by every record that draws
//! from it. Loading from the on-disk grammar lives in `sdg_io::enumset`
//! (this crate stays I/O-free); this module only defines the in-memory
//! domain and index/label lookups.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::CoreError;

/// An ordered, immutable domain of distinct string labels, addressed by
/// position (`index`). Two `EnumSet`s are distinguished by `name`, which is
/// informational only — equality/hash are by content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumSet {
    name: String,
    labels: Vec<String>,
}

impl EnumSet {
    /// Build a domain from an ordered, deduplicated label list. `labels` must
    /// already be free of duplicates; callers that load from a file are
    /// expected to have rejected duplicates as a `DataFormatError` upstream.
    pub fn new(name: impl Into<String>, labels: Vec<String>) -> Self {
        EnumSet {
            name: name.into(),
            labels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: u32) -> Result<&str, CoreError> {
        self.labels
            .get(index as usize)
            .map(String::as_str)
            .ok_or(CoreError::EnumIndexOutOfRange)
    }

    pub fn index_of(&self, label: &str) -> Result<u32, CoreError> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| i as u32)
            .ok_or(CoreError::UnknownEnumLabel)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl fmt::Display for EnumSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumSet({}, {} labels)", self.name, self.labels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EnumSet {
        EnumSet::new(
            "tier",
            alloc::vec!["low".into(), "mid".into(), "high".into()],
        )
    }

    #[test]
    fn round_trips_index_and_label() {
        let set = sample();
        assert_eq!(set.label(1).unwrap(), "mid");
        assert_eq!(set.index_of("high").unwrap(), 2);
    }

    #[test]
    fn rejects_out_of_range() {
        let set = sample();
        assert_eq!(set.label(3), Err(CoreError::EnumIndexOutOfRange));
        assert_eq!(set.index_of("unknown"), Err(CoreError::UnknownEnumLabel));
    }
}
