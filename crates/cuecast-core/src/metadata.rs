//! Bounded log of timed-metadata cues
//!
//! Entries are kept newest-first. Every insert enforces the capacity before
//! returning, so readers never observe more than `capacity` entries.

use crate::{types::MetadataEntry, Error, Result};
use serde::Deserialize;
use std::collections::VecDeque;

/// Number of entries kept for display
pub const DEFAULT_METADATA_CAPACITY: usize = 10;

/// Largest capacity a log accepts
pub const MAX_METADATA_CAPACITY: usize = 1000;

/// Newest-first, fixed-capacity buffer of metadata entries
#[derive(Debug, Clone)]
pub struct MetadataLog {
    entries: VecDeque<MetadataEntry>,
    capacity: usize,
}

impl MetadataLog {
    /// Create an empty log. The capacity is clamped to
    /// `1..=MAX_METADATA_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.clamp(1, MAX_METADATA_CAPACITY),
        }
    }

    /// Prepend an entry, dropping the oldest ones beyond capacity
    pub fn insert(&mut self, entry: MetadataEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Current entries, newest first
    pub fn snapshot(&self) -> Vec<MetadataEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&MetadataEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for MetadataLog {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_CAPACITY)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CuePayload {
    product_id: String,
}

/// Extract the product id from a cue's text payload.
///
/// The payload must be a JSON object with a non-empty string `productId`.
/// Other fields are ignored.
pub fn parse_cue_payload(text: &str) -> Result<String> {
    let payload: CuePayload = serde_json::from_str(text)
        .map_err(|e| Error::MalformedMetadataPayload(e.to_string()))?;

    if payload.product_id.is_empty() {
        return Err(Error::MalformedMetadataPayload(
            "productId is empty".to_string(),
        ));
    }

    Ok(payload.product_id)
}
