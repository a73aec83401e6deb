use serde::{Deserialize, Serialize};

use crate::error::{ChapterError, Result};

/// A single verse as served by the verse API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub number: u32,
    pub text: String,
}

impl Verse {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Words of the verse, split on whitespace. Mark indices refer to this split.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words().nth(index)
    }
}

/// Parameter bag exchanged with the navigation host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRoute {
    pub book_name: String,
    pub chapter_number: u32,
    pub book_abbreviation: String,
    pub total_chapters: u32,
}

/// The chapter a screen is showing. Fixed for the lifetime of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    book_abbreviation: String,
    book_name: String,
    chapter_number: u32,
    total_chapters: u32,
}

impl ChapterRef {
    pub fn new(
        book_abbreviation: impl Into<String>,
        book_name: impl Into<String>,
        chapter_number: u32,
        total_chapters: u32,
    ) -> Result<Self> {
        let book_abbreviation = book_abbreviation.into();
        let book_name = book_name.into();

        if book_abbreviation.trim().is_empty() {
            return Err(ChapterError::InvalidChapterRef(
                "book abbreviation is empty".to_string(),
            ));
        }
        if total_chapters == 0 {
            return Err(ChapterError::InvalidChapterRef(format!(
                "{} has no chapters",
                book_name
            )));
        }
        if chapter_number == 0 || chapter_number > total_chapters {
            return Err(ChapterError::InvalidChapterRef(format!(
                "chapter {} is outside 1..={}",
                chapter_number, total_chapters
            )));
        }

        Ok(Self {
            book_abbreviation,
            book_name,
            chapter_number,
            total_chapters,
        })
    }

    pub fn from_route(route: &ChapterRoute) -> Result<Self> {
        Self::new(
            route.book_abbreviation.clone(),
            route.book_name.clone(),
            route.chapter_number,
            route.total_chapters,
        )
    }

    /// Route to another chapter of the same book. The caller checks the range.
    pub fn route_to(&self, chapter_number: u32) -> ChapterRoute {
        ChapterRoute {
            book_name: self.book_name.clone(),
            chapter_number,
            book_abbreviation: self.book_abbreviation.clone(),
            total_chapters: self.total_chapters,
        }
    }

    pub fn route(&self) -> ChapterRoute {
        self.route_to(self.chapter_number)
    }

    pub fn book_abbreviation(&self) -> &str {
        &self.book_abbreviation
    }

    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    pub fn chapter_number(&self) -> u32 {
        self.chapter_number
    }

    pub fn total_chapters(&self) -> u32 {
        self.total_chapters
    }
}
