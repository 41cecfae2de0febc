use crate::vcs::Shelveset;
use std::fmt;

/// Model for a shelveset in the listing
pub struct ShelvesetModel {
    pub name: String,
    pub owner: String,
    pub created: String,
    pub summary: String,
}

impl From<&Shelveset> for ShelvesetModel {
    fn from(shelveset: &Shelveset) -> Self {
        // Extract the first line of the comment as the summary
        let summary = shelveset
            .comment
            .lines()
            .next()
            .unwrap_or("")
            .to_string();

        Self {
            name: shelveset.name.clone(),
            owner: shelveset.owner_display_name.clone(),
            created: shelveset.creation_date.format("%Y-%m-%d %H:%M").to_string(),
            summary,
        }
    }
}

impl fmt::Display for ShelvesetModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<24} {:<20} {}  {}",
            self.name, self.owner, self.created, self.summary
        )
    }
}
