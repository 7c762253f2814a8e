//! User interaction events feeding the trending ranking.
//!
//! # Examples
//! ```
//! use newsdesk_core::InteractionKind;
//!
//! assert_eq!(InteractionKind::Share.as_str(), "share");
//! assert_eq!("Bookmark".parse::<InteractionKind>(), Ok(InteractionKind::Bookmark));
//! ```

use chrono::{DateTime, Utc};
use geo::Coord;

use crate::ArticleId;

/// The fixed set of recorded user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InteractionKind {
    /// The article was displayed.
    View,
    /// The article link was followed.
    Click,
    /// The article was shared onwards.
    Share,
    /// The article was saved for later.
    Bookmark,
    /// A comment was posted.
    Comment,
}

impl InteractionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::View,
        Self::Click,
        Self::Share,
        Self::Bookmark,
        Self::Comment,
    ];

    /// Return the kind as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Click => "click",
            Self::Share => "share",
            Self::Bookmark => "bookmark",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "click" => Ok(Self::Click),
            "share" => Ok(Self::Share),
            "bookmark" => Ok(Self::Bookmark),
            "comment" => Ok(Self::Comment),
            _ => Err(format!("unknown interaction kind '{s}'")),
        }
    }
}

/// A single immutable interaction record.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    /// Article the actor interacted with.
    pub article_id: ArticleId,
    /// Opaque actor identifier.
    pub actor_id: String,
    /// What the actor did.
    pub kind: InteractionKind,
    /// Where the actor was (`x = lon`, `y = lat`), when known.
    pub location: Option<Coord<f64>>,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    /// Construct an event.
    pub fn new(
        article_id: ArticleId,
        actor_id: impl Into<String>,
        kind: InteractionKind,
        location: Option<Coord<f64>>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            article_id,
            actor_id: actor_id.into(),
            kind,
            location,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_as_str() {
        for kind in InteractionKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn parsing_round_trips_every_kind() {
        for kind in InteractionKind::ALL {
            assert_eq!(InteractionKind::from_str(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn parsing_rejects_unknown() {
        let err = InteractionKind::from_str("like").unwrap_err();
        assert!(err.contains("unknown interaction kind"));
    }
}
