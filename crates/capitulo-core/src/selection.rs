use serde::Serialize;

/// The word an open action menu is pointing at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedWord {
    pub verse_number: u32,
    pub word_index: usize,
    pub text: String,
}

/// At most one open word selection. Opening another replaces it.
#[derive(Debug, Default)]
pub struct WordSelectionSession {
    current: Option<SelectedWord>,
}

impl WordSelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a selection, silently dropping any previous one. Returns the
    /// replaced selection.
    pub fn open(&mut self, verse_number: u32, word_index: usize, text: impl Into<String>) -> Option<SelectedWord> {
        self.current.replace(SelectedWord {
            verse_number,
            word_index,
            text: text.into(),
        })
    }

    pub fn close(&mut self) -> Option<SelectedWord> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&SelectedWord> {
        self.current.as_ref()
    }
}
