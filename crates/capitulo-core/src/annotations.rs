use std::collections::BTreeSet;

/// Word marks for the chapter on screen, keyed by `(verse number, word index)`.
///
/// Indices only mean something against one specific verse text, so every
/// successful reload wipes the store.
#[derive(Debug, Default, Clone)]
pub struct AnnotationStore {
    marked: BTreeSet<(u32, usize)>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the mark on a word. Returns whether the word is marked afterwards.
    pub fn toggle(&mut self, verse_number: u32, word_index: usize) -> bool {
        let key = (verse_number, word_index);
        if self.marked.remove(&key) {
            false
        } else {
            self.marked.insert(key);
            true
        }
    }

    pub fn is_marked(&self, verse_number: u32, word_index: usize) -> bool {
        self.marked.contains(&(verse_number, word_index))
    }

    /// Marked word indices of one verse, ascending.
    pub fn marked_in_verse(&self, verse_number: u32) -> impl Iterator<Item = usize> + '_ {
        self.marked
            .range((verse_number, 0)..=(verse_number, usize::MAX))
            .map(|&(_, index)| index)
    }

    pub fn invalidate_all(&mut self) {
        if !self.marked.is_empty() {
            tracing::debug!(count = self.marked.len(), "Clearing word marks");
        }
        self.marked.clear();
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}
