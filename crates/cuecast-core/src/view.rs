//! Render model for the metadata overlay

use crate::{metadata::MetadataLog, visibility::VisibilityGate};

/// Builds the overlay lines shown while the pointer hovers the player
pub struct MetadataView;

impl MetadataView {
    /// Display lines, newest first, or `None` while the overlay is hidden
    pub fn render(gate: &VisibilityGate, log: &MetadataLog) -> Option<Vec<String>> {
        gate.is_active()
            .then(|| log.iter().map(ToString::to_string).collect())
    }
}
