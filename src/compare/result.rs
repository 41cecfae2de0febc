use crate::vcs::PendingChange;
use serde::Serialize;
use std::cmp::Ordering;

/// Summary shown when both selections are the same shelveset
pub const SAME_SHELVESET_MESSAGE: &str =
    "Both selections are the same shelveset; all files match.";

/// Summary shown when no version control backend could be reached
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Could not connect to the version control server.";

/// Outcome of comparing one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Matching,
    Different,
    Unmatched,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Matching => "matching",
            Classification::Different => "different",
            Classification::Unmatched => "unmatched",
        }
    }

    /// Single character used in the listing
    pub fn marker(&self) -> char {
        match self {
            Classification::Matching => '=',
            Classification::Different => '~',
            Classification::Unmatched => '?',
        }
    }
}

/// One row of a comparison. At least one side is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    first: Option<PendingChange>,
    second: Option<PendingChange>,
    classification: Classification,
}

impl ComparisonEntry {
    /// A first-side change with its counterpart
    pub fn paired(first: PendingChange, second: PendingChange, same_content: bool) -> Self {
        Self {
            first: Some(first),
            second: Some(second),
            classification: if same_content {
                Classification::Matching
            } else {
                Classification::Different
            },
        }
    }

    pub fn first_only(first: PendingChange) -> Self {
        Self {
            first: Some(first),
            second: None,
            classification: Classification::Unmatched,
        }
    }

    pub fn second_only(second: PendingChange) -> Self {
        Self {
            first: None,
            second: Some(second),
            classification: Classification::Unmatched,
        }
    }

    pub fn first(&self) -> Option<&PendingChange> {
        self.first.as_ref()
    }

    pub fn second(&self) -> Option<&PendingChange> {
        self.second.as_ref()
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Display path of the first side, empty when absent
    pub fn first_display_name(&self) -> String {
        self.first
            .as_ref()
            .map(PendingChange::server_path)
            .unwrap_or_default()
    }

    /// Display path of the second side, empty when absent
    pub fn second_display_name(&self) -> String {
        self.second
            .as_ref()
            .map(PendingChange::server_path)
            .unwrap_or_default()
    }

    /// Case-insensitive substring match on either display path
    pub fn matches_filter(&self, needle_lower: &str) -> bool {
        self.first_display_name().to_lowercase().contains(needle_lower)
            || self.second_display_name().to_lowercase().contains(needle_lower)
    }
}

/// The complete outcome of one comparison
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DiffResult {
    pub first_name: String,
    pub second_name: String,
    /// Entries in path order
    pub entries: Vec<ComparisonEntry>,
    pub total: usize,
    pub matching: usize,
    pub different: usize,
    pub summary: String,
}

impl DiffResult {
    /// Empty result carrying the connection error summary
    pub fn connection_error() -> Self {
        Self {
            summary: CONNECTION_ERROR_MESSAGE.to_string(),
            ..Self::default()
        }
    }

    /// Entries matching `filter`; a missing or blank filter keeps everything
    pub fn apply_filter(&self, filter: Option<&str>) -> Vec<&ComparisonEntry> {
        filter_entries(self.entries.iter(), filter)
    }
}

/// Summary line for a comparison of two different shelvesets
pub fn summary_message(total: usize, matching: usize, different: usize) -> String {
    format!(
        "{} common files compared: {} matching, {} different or unmatched.",
        total, matching, different
    )
}

/// Filter any view of entries by a case-insensitive substring.
///
/// A blank filter keeps everything. Otherwise the filter is searched for
/// as given, surrounding whitespace included.
pub fn filter_entries<'a, I>(entries: I, filter: Option<&str>) -> Vec<&'a ComparisonEntry>
where
    I: IntoIterator<Item = &'a ComparisonEntry>,
{
    match filter.filter(|f| !f.trim().is_empty()) {
        None => entries.into_iter().collect(),
        Some(f) => {
            let needle = f.to_lowercase();
            entries
                .into_iter()
                .filter(|e| e.matches_filter(&needle))
                .collect()
        }
    }
}

/// Column a view can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    First,
    Second,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Reorder a view. Ties keep their current (path) order.
pub fn sort_view(entries: &mut [&ComparisonEntry], column: SortColumn, direction: SortDirection) {
    entries.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::First => compare_names(&a.first_display_name(), &b.first_display_name()),
            SortColumn::Second => {
                compare_names(&a.second_display_name(), &b.second_display_name())
            }
            SortColumn::Status => a.classification.cmp(&b.classification),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}
