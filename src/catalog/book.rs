//! Book resource as served by the catalog endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store-assigned book identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry.
///
/// `quantity` is signed: the store decrements it server-side on every borrow
/// and nothing stops it from going below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store identifier.
    #[serde(rename = "_id")]
    pub id: BookId,
    /// Title.
    pub name: String,
    /// Author name.
    pub author: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
    /// Copies available to borrow.
    #[serde(default)]
    pub quantity: i64,
    /// Reader rating, 1 to 5.
    #[serde(default)]
    pub rating: f64,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Book {
    /// True when at least one copy can be borrowed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }
}

/// Categories offered by the add/update forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Novel,
    History,
    Drama,
    SciFi,
    Science,
    Cse,
    Pharmacy,
    Eee,
}

impl Category {
    /// Every category, in form order.
    pub const ALL: [Category; 8] = [
        Self::Novel,
        Self::History,
        Self::Drama,
        Self::SciFi,
        Self::Science,
        Self::Cse,
        Self::Pharmacy,
        Self::Eee,
    ];

    /// Label stored on the book resource.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Novel => "Novel",
            Self::History => "History",
            Self::Drama => "Drama",
            Self::SciFi => "Sci-Fi",
            Self::Science => "Science",
            Self::Cse => "CSE",
            Self::Pharmacy => "Pharmacy",
            Self::Eee => "EEE",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{wanted}' (expected one of: {})", known.join(", "))
            })
    }
}
