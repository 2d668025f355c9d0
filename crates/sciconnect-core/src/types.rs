use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SciConnectError;

// =============================================================================
// Enums
// =============================================================================

/// Personality tag attached to every expert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonalityType {
    Intj,
    Infj,
    Intp,
    Entp,
    Enfp,
    Entj,
    Istj,
    Isfj,
}

impl PersonalityType {
    /// Every selectable tag, in picker order.
    pub const ALL: [PersonalityType; 8] = [
        PersonalityType::Intj,
        PersonalityType::Infj,
        PersonalityType::Intp,
        PersonalityType::Entp,
        PersonalityType::Enfp,
        PersonalityType::Entj,
        PersonalityType::Istj,
        PersonalityType::Isfj,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalityType::Intj => "INTJ",
            PersonalityType::Infj => "INFJ",
            PersonalityType::Intp => "INTP",
            PersonalityType::Entp => "ENTP",
            PersonalityType::Enfp => "ENFP",
            PersonalityType::Entj => "ENTJ",
            PersonalityType::Istj => "ISTJ",
            PersonalityType::Isfj => "ISFJ",
        }
    }
}

impl fmt::Display for PersonalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonalityType {
    type Err = SciConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PersonalityType::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SciConnectError::InvalidInput(format!("unknown personality tag: {s}")))
    }
}

/// Categorical filter over personality tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagFilter {
    /// The "no filter" sentinel.
    #[default]
    All,
    Only(PersonalityType),
}

impl TagFilter {
    pub fn matches(&self, tag: PersonalityType) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Only(wanted) => *wanted == tag,
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagFilter::All => f.write_str("ALL"),
            TagFilter::Only(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for TagFilter {
    type Err = SciConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(TagFilter::All);
        }
        trimmed.parse().map(TagFilter::Only)
    }
}

/// What a call captures: audio always, video on request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Audio,
    Video,
}

impl CaptureKind {
    pub fn includes_video(&self) -> bool {
        matches!(self, CaptureKind::Video)
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureKind::Audio => f.write_str("audio"),
            CaptureKind::Video => f.write_str("video"),
        }
    }
}

// =============================================================================
// Catalog entries
// =============================================================================

/// A subject-matter expert available for engagement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expert {
    pub id: String,
    pub name: String,
    pub field: String,
    pub personality: PersonalityType,
    pub bio: String,
    /// Avatar image URL.
    pub avatar: String,
    /// Names of the causes this expert supports.
    #[serde(default)]
    pub causes: Vec<String>,
}

impl Expert {
    /// Initials shown when the avatar cannot be loaded.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

/// A donation target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Free-text impact statement, e.g. "$10 plants 5 trees".
    pub impact: String,
}

// =============================================================================
// Profile
// =============================================================================

/// The local user's editable profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    pub personality: PersonalityType,
    pub interests: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            display_name: "Alex".to_string(),
            personality: PersonalityType::Enfp,
            interests: parse_interests("space, climate, biotech"),
        }
    }
}

impl UserProfile {
    pub fn set_interests(&mut self, raw: &str) {
        self.interests = parse_interests(raw);
    }
}

/// Split a comma-separated interest list, trimming entries and dropping blanks.
pub fn parse_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
