//! Closed enumerations describing an achievement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of achievement an activity records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technical,
    Sports,
    Cultural,
    Volunteering,
    Internship,
    Academic,
    Leadership,
    Research,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Self::Technical,
        Self::Sports,
        Self::Cultural,
        Self::Volunteering,
        Self::Internship,
        Self::Academic,
        Self::Leadership,
        Self::Research,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Sports => "Sports",
            Self::Cultural => "Cultural",
            Self::Volunteering => "Volunteering",
            Self::Internship => "Internship",
            Self::Academic => "Academic",
            Self::Leadership => "Leadership",
            Self::Research => "Research",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope at which an achievement was earned.
///
/// Ordered `College < University < State < National < International`. The
/// ordering is for display and sorting only; it never weights a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementLevel {
    College,
    University,
    State,
    National,
    International,
}

impl AchievementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::College => "College",
            Self::University => "University",
            Self::State => "State",
            Self::National => "National",
            Self::International => "International",
        }
    }
}

impl fmt::Display for AchievementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AchievementLevel::College < AchievementLevel::University);
        assert!(AchievementLevel::University < AchievementLevel::State);
        assert!(AchievementLevel::State < AchievementLevel::National);
        assert!(AchievementLevel::National < AchievementLevel::International);
    }

    #[test]
    fn category_names_match_display() {
        for c in Category::ALL {
            assert_eq!(c.to_string(), c.as_str());
        }
    }
}
