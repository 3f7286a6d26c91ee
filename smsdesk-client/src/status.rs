//! Request status view model
//!
//! A request moves through four workflow stages: data requested, data
//! received, suspension requested, suspension completed. Two backend
//! revisions exist in the wild: the older one reports a single status
//! string, the newer one a set of stage tags that the backend appends to
//! independently (`$addToSet` semantics). This module resolves both shapes
//! into one canonical representation, [`StatusSet`].
//!
//! The set semantic is authoritative: a stage is reached iff its tag is
//! present. No monotonic progression is assumed, so a sparse set like
//! `{pending, suspended}` renders `received` as unreached. A legacy single
//! string is normalized into its monotonic prefix at the deserialization
//! boundary, because that is exactly what the single-status revision
//! displayed; past that boundary only the set shape exists.

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// A single workflow stage of a sender-data request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusStage {
    /// Data request submitted, waiting for the operator
    Pending,
    /// Requested sender data has been returned
    Received,
    /// Signal-suspension request sent to the operator
    SuspensionRequested,
    /// Operator confirmed the suspension
    Suspended,
}

impl StatusStage {
    /// All stages in canonical workflow order
    pub const ORDER: [StatusStage; 4] = [
        StatusStage::Pending,
        StatusStage::Received,
        StatusStage::SuspensionRequested,
        StatusStage::Suspended,
    ];

    /// Wire tag for this stage
    pub fn as_tag(&self) -> &'static str {
        match self {
            StatusStage::Pending => "pending",
            StatusStage::Received => "received",
            StatusStage::SuspensionRequested => "suspension_requested",
            StatusStage::Suspended => "suspended",
        }
    }

    /// Parse a wire tag
    ///
    /// Accepts the legacy `pending_suspension` alias for
    /// `suspension_requested` (the two backend revisions disagreed on the
    /// tag name). Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pending" => Some(StatusStage::Pending),
            "received" => Some(StatusStage::Received),
            "suspension_requested" | "pending_suspension" => {
                Some(StatusStage::SuspensionRequested)
            }
            "suspended" => Some(StatusStage::Suspended),
            _ => None,
        }
    }

    /// Position in the canonical order
    pub fn index(&self) -> usize {
        match self {
            StatusStage::Pending => 0,
            StatusStage::Received => 1,
            StatusStage::SuspensionRequested => 2,
            StatusStage::Suspended => 3,
        }
    }

    /// Display label for table headers and checklists
    pub fn label(&self) -> &'static str {
        match self {
            StatusStage::Pending => "Requesting data",
            StatusStage::Received => "Data received",
            StatusStage::SuspensionRequested => "Suspension requested",
            StatusStage::Suspended => "Suspended",
        }
    }
}

impl fmt::Display for StatusStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Canonical tagged status representation
///
/// A set of reached stages. Constructed from either wire shape (single
/// string or tag list); always serialized back out as a tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSet(BTreeSet<StatusStage>);

impl StatusSet {
    /// Empty status set (a request with no recorded stage)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from explicit stages
    pub fn from_stages(stages: impl IntoIterator<Item = StatusStage>) -> Self {
        Self(stages.into_iter().collect())
    }

    /// Normalize a legacy single-status string into its monotonic prefix
    ///
    /// `received` becomes `{pending, received}`: the single-status revision
    /// assumed monotonic progress, so every earlier stage was shown reached.
    pub fn from_single(stage: StatusStage) -> Self {
        Self(
            StatusStage::ORDER
                .iter()
                .copied()
                .filter(|s| s.index() <= stage.index())
                .collect(),
        )
    }

    /// Parse a list of wire tags, dropping unknown ones with a warning
    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = BTreeSet::new();
        for tag in tags {
            match StatusStage::from_tag(tag) {
                Some(stage) => {
                    set.insert(stage);
                }
                None => warn!(tag, "ignoring unknown status tag"),
            }
        }
        Self(set)
    }

    /// Whether a stage has been reached
    pub fn contains(&self, stage: StatusStage) -> bool {
        self.0.contains(&stage)
    }

    /// Record a stage as reached
    pub fn insert(&mut self, stage: StatusStage) {
        self.0.insert(stage);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reached stages in canonical order
    pub fn iter(&self) -> impl Iterator<Item = StatusStage> + '_ {
        self.0.iter().copied()
    }

    /// Ordered checklist for display: one `(stage, reached)` entry per stage
    pub fn checklist(&self) -> [(StatusStage, bool); 4] {
        StatusStage::ORDER.map(|stage| (stage, self.contains(stage)))
    }
}

impl Serialize for StatusSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for stage in &self.0 {
            seq.serialize_element(stage.as_tag())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for StatusSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Versioned wire schema: single string (old revision) or tag list.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Single(String),
            Many(Vec<String>),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Single(tag) => match StatusStage::from_tag(&tag) {
                Some(stage) => Ok(StatusSet::from_single(stage)),
                None => {
                    warn!(tag, "unknown single status tag, treating as empty");
                    Ok(StatusSet::new())
                }
            },
            Wire::Many(tags) => Ok(StatusSet::from_tags(tags.iter().map(String::as_str))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tag_round_trip() {
        for stage in StatusStage::ORDER {
            assert_eq!(StatusStage::from_tag(stage.as_tag()), Some(stage));
        }
    }

    #[test]
    fn test_legacy_alias_parses() {
        assert_eq!(
            StatusStage::from_tag("pending_suspension"),
            Some(StatusStage::SuspensionRequested)
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert_eq!(StatusStage::from_tag("archived"), None);
    }

    #[test]
    fn test_single_status_expands_to_prefix() {
        let set = StatusSet::from_single(StatusStage::Received);
        assert!(set.contains(StatusStage::Pending));
        assert!(set.contains(StatusStage::Received));
        assert!(!set.contains(StatusStage::SuspensionRequested));
        assert!(!set.contains(StatusStage::Suspended));
    }

    #[test]
    fn test_sparse_set_is_taken_literally() {
        // The set semantic assumes nothing: suspended without received stays
        // exactly that.
        let set = StatusSet::from_tags(["pending", "suspended"]);
        let checklist = set.checklist();
        assert_eq!(checklist[0], (StatusStage::Pending, true));
        assert_eq!(checklist[1], (StatusStage::Received, false));
        assert_eq!(checklist[2], (StatusStage::SuspensionRequested, false));
        assert_eq!(checklist[3], (StatusStage::Suspended, true));
    }

    #[test]
    fn test_checklist_for_partial_progress() {
        let set = StatusSet::from_tags(["pending", "received"]);
        let checklist = set.checklist();
        assert!(checklist[0].1);
        assert!(checklist[1].1);
        assert!(!checklist[2].1);
        assert!(!checklist[3].1);
    }

    #[test]
    fn test_deserialize_single_string() {
        let set: StatusSet = serde_json::from_str(r#""suspension_requested""#).unwrap();
        assert!(set.contains(StatusStage::Pending));
        assert!(set.contains(StatusStage::Received));
        assert!(set.contains(StatusStage::SuspensionRequested));
        assert!(!set.contains(StatusStage::Suspended));
    }

    #[test]
    fn test_deserialize_tag_list_drops_unknown() {
        let set: StatusSet =
            serde_json::from_str(r#"["pending", "mystery", "suspended"]"#).unwrap();
        assert!(set.contains(StatusStage::Pending));
        assert!(set.contains(StatusStage::Suspended));
        assert!(!set.contains(StatusStage::Received));
    }

    #[test]
    fn test_serialize_as_ordered_list() {
        let set = StatusSet::from_tags(["suspended", "pending"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["pending","suspended"]"#);
    }
}
