use crate::compare::ComparisonEntry;
use std::fmt;

/// Model for one row of the comparison listing
pub struct EntryRowModel {
    pub marker: char,
    pub first: String,
    pub second: String,
    pub change: String,
}

impl From<&ComparisonEntry> for EntryRowModel {
    fn from(entry: &ComparisonEntry) -> Self {
        let change = match (entry.first(), entry.second()) {
            (Some(a), Some(b)) if a.change_type == b.change_type => {
                a.change_type.as_str().to_string()
            }
            (Some(a), Some(b)) => format!("{}/{}", a.change_type.as_str(), b.change_type.as_str()),
            (Some(c), None) | (None, Some(c)) => c.change_type.as_str().to_string(),
            (None, None) => String::new(),
        };

        Self {
            marker: entry.classification().marker(),
            first: dash_if_empty(entry.first_display_name()),
            second: dash_if_empty(entry.second_display_name()),
            change,
        }
    }
}

impl fmt::Display for EntryRowModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<13} {}  ->  {}",
            self.marker, self.change, self.first, self.second
        )
    }
}

fn dash_if_empty(name: String) -> String {
    if name.is_empty() {
        "-".to_string()
    } else {
        name
    }
}
