//! Curriculum coordinates: boards, subjects, classes and chapter references

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class labels offered by the browser and the admin selectors, in display order
pub const CLASSES: [&str; 6] = ["7", "8", "9", "10", "11", "12"];

/// Curriculum authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Board {
    Cbse,
    Icse,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::Cbse, Board::Icse];

    /// Literal value used in content keys, routes and the persisted index
    pub fn as_str(self) -> &'static str {
        match self {
            Board::Cbse => "cbse",
            Board::Icse => "icse",
        }
    }

    /// Upper-cased name shown to users
    pub fn label(self) -> &'static str {
        match self {
            Board::Cbse => "CBSE",
            Board::Icse => "ICSE",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Board {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::ALL
            .into_iter()
            .find(|board| board.as_str() == s)
            .ok_or_else(|| CurriculumError::UnknownBoard(s.to_string()))
    }
}

/// Subject taught under every board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    #[serde(rename = "Computer Science")]
    ComputerScience,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::ComputerScience,
    ];

    /// Literal value, also the display name
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::ComputerScience => "Computer Science",
        }
    }

    /// Accent colour used for the subject card header
    pub fn accent_rgb(self) -> [u8; 3] {
        match self {
            Subject::Physics => [14, 165, 233],
            Subject::Chemistry => [16, 185, 129],
            Subject::Biology => [244, 63, 94],
            Subject::ComputerScience => [139, 92, 246],
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = CurriculumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| CurriculumError::UnknownSubject(s.to_string()))
    }
}

/// Errors parsing curriculum values from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurriculumError {
    #[error("unknown board: {0}")]
    UnknownBoard(String),
    #[error("unknown subject: {0}")]
    UnknownSubject(String),
}

/// Full coordinate of one chapter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterRef {
    pub board: Board,
    pub subject: Subject,
    pub class: String,
    pub chapter: String,
}

impl ChapterRef {
    pub fn new(
        board: Board,
        subject: Subject,
        class: impl Into<String>,
        chapter: impl Into<String>,
    ) -> Self {
        Self {
            board,
            subject,
            class: class.into(),
            chapter: chapter.into(),
        }
    }
}
