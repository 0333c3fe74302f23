//! Session element domain models.
//!
//! A session's labeling sequence is made of elements. Classification sessions
//! label slice elements directly; comparison sessions label comparison
//! elements, each of which pairs two slices. Labels are append-only: an
//! element's current label is the one with the latest finish time, and earlier
//! labels are retained as history until the element itself is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one orderable slice: an image plus a slicing dimension and
/// position within it. The ranking engine treats this as opaque identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SliceRef {
    pub image_id: i64,
    pub slice_dim: u32,
    pub slice_index: u32,
}

impl SliceRef {
    pub fn new(image_id: i64, slice_dim: u32, slice_index: u32) -> Self {
        Self { image_id, slice_dim, slice_index }
    }
}

impl std::fmt::Display for SliceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "image {} dim {} slice {}", self.image_id, self.slice_dim, self.slice_index)
    }
}

/// Kind discriminant for persisted session elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Slice,
    Comparison,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slice => "slice",
            Self::Comparison => "comparison",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slice" => Some(Self::Slice),
            "comparison" => Some(Self::Comparison),
            _ => None,
        }
    }
}

/// A unit element wrapping exactly one slice.
///
/// Slice elements are seeded once at session creation (sampled, immutable
/// thereafter) and are the item set the ranking engine orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub id: i64,
    pub session_id: i64,
    /// Position in the session's slice sequence; dense and zero-based.
    pub element_index: i64,
    pub slice: SliceRef,
}

/// A comparison element pairing two slices for a rater to judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub id: i64,
    pub session_id: i64,
    /// Position in the session's comparison sequence; dense and zero-based.
    pub element_index: i64,
    pub left: SliceRef,
    pub right: SliceRef,
}

/// A timestamped label attached to one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub element_id: i64,
    pub value: String,
    pub start_at: DateTime<Utc>,
    pub finish_at: DateTime<Utc>,
}

impl Label {
    /// True if this label supersedes `other` as the element's current label.
    ///
    /// Latest finish time wins; ties break toward the higher record id.
    pub fn supersedes(&self, other: &Label) -> bool {
        (self.finish_at, self.id) > (other.finish_at, other.id)
    }
}

/// The two directional label values for comparison elements.
///
/// Sessions may define further label options ("Unclear", etc.); only these two
/// contribute an edge to the sort matrix.
pub const LABEL_FIRST: &str = "First";
pub const LABEL_SECOND: &str = "Second";

/// Map a comparison label value to a (winner, loser) pair, if directional.
pub fn label_to_edge(comparison: &Comparison, value: &str) -> Option<(SliceRef, SliceRef)> {
    match value {
        LABEL_FIRST => Some((comparison.left, comparison.right)),
        LABEL_SECOND => Some((comparison.right, comparison.left)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn label(id: i64, finish_secs: i64) -> Label {
        Label {
            id,
            element_id: 1,
            value: "First".to_string(),
            start_at: Utc.timestamp_opt(0, 0).unwrap(),
            finish_at: Utc.timestamp_opt(finish_secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_supersedes_by_finish_time() {
        let older = label(1, 100);
        let newer = label(2, 200);
        assert!(newer.supersedes(&older));
        assert!(!older.supersedes(&newer));
    }

    #[test]
    fn test_supersedes_tie_breaks_on_id() {
        let first = label(1, 100);
        let second = label(2, 100);
        assert!(second.supersedes(&first));
        assert!(!first.supersedes(&second));
    }

    #[test]
    fn test_label_to_edge_directions() {
        let comparison = Comparison {
            id: 1,
            session_id: 1,
            element_index: 0,
            left: SliceRef::new(1, 0, 5),
            right: SliceRef::new(2, 0, 7),
        };

        assert_eq!(
            label_to_edge(&comparison, LABEL_FIRST),
            Some((comparison.left, comparison.right))
        );
        assert_eq!(
            label_to_edge(&comparison, LABEL_SECOND),
            Some((comparison.right, comparison.left))
        );
        assert_eq!(label_to_edge(&comparison, "Unclear"), None);
    }
}
