//! UI-agnostic screen state
//!
//! Snapshots are immutable values the rendering layer draws from. A chapter
//! screen publishes a fresh one after every mutation.

use serde::Serialize;

use crate::annotations::AnnotationStore;
use crate::scripture::Verse;
use crate::selection::SelectedWord;
use crate::translation::Translation;

/// Skeleton rows shown while a chapter is loading.
pub const PLACEHOLDER_ROWS: usize = 3;

pub const MIN_FONT_SIZE: u16 = 10;
pub const FONT_SIZE_STEP: u16 = 2;

/// Verse text size. Grows without limit, shrinks only while above the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FontSize(u16);

impl FontSize {
    pub fn new(size: u16) -> Self {
        Self(size)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn increase(&mut self) {
        self.0 = self.0.saturating_add(FONT_SIZE_STEP);
    }

    pub fn decrease(&mut self) {
        if self.0 > MIN_FONT_SIZE {
            self.0 = self.0.saturating_sub(FONT_SIZE_STEP).max(MIN_FONT_SIZE);
        }
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self(16)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordView {
    pub text: String,
    pub marked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseView {
    pub number: u32,
    pub words: Vec<WordView>,
}

impl VerseView {
    pub fn build(verse: &Verse, marks: &AnnotationStore) -> Self {
        let marked: Vec<usize> = marks.marked_in_verse(verse.number).collect();
        let words = verse
            .words()
            .enumerate()
            .map(|(index, word)| WordView {
                text: word.to_string(),
                marked: marked.contains(&index),
            })
            .collect();
        Self {
            number: verse.number,
            words,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChapterView {
    Loading { placeholder_rows: usize },
    Ready { verses: Vec<VerseView> },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenSnapshot {
    pub book_name: String,
    pub chapter_number: u32,
    pub total_chapters: u32,
    pub translation: Translation,
    pub font_size: FontSize,
    pub options_visible: bool,
    pub view: ChapterView,
    pub selection: Option<SelectedWord>,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub speech_available: bool,
    pub speaking: bool,
}

impl ScreenSnapshot {
    pub fn verses(&self) -> &[VerseView] {
        match &self.view {
            ChapterView::Ready { verses } => verses,
            _ => &[],
        }
    }
}
