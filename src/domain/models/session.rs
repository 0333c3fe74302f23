//! Labeling session domain model.
//!
//! Sessions come in three kinds. Classification sessions label slices one at a
//! time. Comparison sessions label slice pairs; the random variant samples its
//! comparisons up-front, while the active-sort variant grows its comparison
//! sequence one element at a time, driven by the ranking engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of labeling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Label each slice independently.
    Classification,
    /// Label slice pairs sampled once at creation.
    ComparisonRandom,
    /// Label slice pairs chosen adaptively by the ranking engine.
    ComparisonActiveSort,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::ComparisonRandom => "comparison_random",
            Self::ComparisonActiveSort => "comparison_active_sort",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classification" => Some(Self::Classification),
            "comparison_random" => Some(Self::ComparisonRandom),
            "comparison_active_sort" => Some(Self::ComparisonActiveSort),
            _ => None,
        }
    }

    /// True if raters judge slice pairs rather than single slices.
    pub fn is_comparison(&self) -> bool {
        matches!(self, Self::ComparisonRandom | Self::ComparisonActiveSort)
    }

    /// True if the comparison sequence is chosen adaptively during labeling.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::ComparisonActiveSort)
    }

    /// Minimum number of slices a session of this kind needs to be meaningful.
    pub fn min_slices(&self) -> usize {
        if self.is_comparison() {
            2
        } else {
            1
        }
    }

    /// Human-readable tags describing the session kind.
    pub fn tags(&self) -> Vec<&'static str> {
        match self {
            Self::Classification => vec!["Classification Session"],
            Self::ComparisonRandom => vec!["Comparison Session", "Random Sampling"],
            Self::ComparisonActiveSort => vec!["Comparison Session", "Active Sampling (Sort)"],
        }
    }
}

/// A labeling session over a dataset's sampled slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelingSession {
    pub id: i64,
    pub dataset_id: i64,
    pub kind: SessionKind,
    pub name: String,
    /// The question shown to raters.
    pub prompt: String,
    /// Comma-separated label options beyond the built-in directional pair.
    pub label_options: String,
    pub metadata_json: String,
    pub created_at: DateTime<Utc>,
}

impl LabelingSession {
    /// The session's label options as a list.
    pub fn label_option_list(&self) -> Vec<String> {
        self.label_options
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            SessionKind::Classification,
            SessionKind::ComparisonRandom,
            SessionKind::ComparisonActiveSort,
        ] {
            assert_eq!(SessionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(SessionKind::from_str("bogus"), None);
    }

    #[test]
    fn test_kind_capabilities() {
        assert!(!SessionKind::Classification.is_comparison());
        assert!(SessionKind::ComparisonRandom.is_comparison());
        assert!(!SessionKind::ComparisonRandom.is_active());
        assert!(SessionKind::ComparisonActiveSort.is_active());
        assert_eq!(SessionKind::Classification.min_slices(), 1);
        assert_eq!(SessionKind::ComparisonActiveSort.min_slices(), 2);
    }

    #[test]
    fn test_label_option_list() {
        let session = LabelingSession {
            id: 1,
            dataset_id: 1,
            kind: SessionKind::Classification,
            name: "s".to_string(),
            prompt: "p".to_string(),
            label_options: "Normal, Abnormal, ".to_string(),
            metadata_json: "{}".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(session.label_option_list(), vec!["Normal", "Abnormal"]);
    }
}
