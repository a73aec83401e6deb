//! One chapter screen: the owner of everything a reading view mutates.
//!
//! Navigating to another chapter means building a new `ChapterScreen`; nothing
//! here is shared between instances. Every mutation publishes a
//! [`ScreenSnapshot`] on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::annotations::AnnotationStore;
use crate::config::ScreenSettings;
use crate::error::Result;
use crate::loader::{ChapterLoader, LoadCompletion, LoadState};
use crate::navigator;
use crate::scripture::{ChapterRef, ChapterRoute};
use crate::selection::{SelectedWord, WordSelectionSession};
use crate::source::VerseDataSource;
use crate::speech::{SpeechController, SpeechEngine};
use crate::state::{ChapterView, FontSize, ScreenSnapshot, VerseView, PLACEHOLDER_ROWS};
use crate::translation::Translation;

pub struct ChapterScreen<S, E> {
    chapter: ChapterRef,
    translation: Translation,
    font_size: FontSize,
    options_visible: bool,
    settings: ScreenSettings,

    loader: ChapterLoader<S>,
    completions: mpsc::UnboundedReceiver<LoadCompletion>,
    annotations: AnnotationStore,
    selection: WordSelectionSession,
    speech: SpeechController<E>,

    snapshots: watch::Sender<ScreenSnapshot>,
}

impl<S: VerseDataSource, E: SpeechEngine> ChapterScreen<S, E> {
    pub fn new(chapter: ChapterRef, source: Arc<S>, engine: E, settings: ScreenSettings) -> Self {
        let (loader, completions) = ChapterLoader::new(source, settings.fetch_timeout);
        let annotations = AnnotationStore::new();
        let selection = WordSelectionSession::new();
        let speech = SpeechController::new(engine);

        let initial = build_snapshot(
            &chapter,
            settings.translation,
            FontSize::new(settings.font_size),
            false,
            loader.state(),
            &annotations,
            &selection,
            &speech,
        );
        let (snapshots, _) = watch::channel(initial);

        Self {
            translation: settings.translation,
            font_size: FontSize::new(settings.font_size),
            options_visible: false,
            chapter,
            settings,
            loader,
            completions,
            annotations,
            selection,
            speech,
            snapshots,
        }
    }

    /// Start the first fetch, then bring up speech. The fetch runs while the
    /// speech engine initializes.
    pub async fn mount(&mut self) {
        self.issue_load();
        self.publish();

        let language = self.settings.speech_language.clone();
        self.speech
            .initialize(&language, self.settings.speech_init_timeout)
            .await;
        self.publish();
    }

    /// Cancel in-flight fetches and silence speech. The screen shows nothing
    /// new after this.
    pub fn unmount(&mut self) {
        self.loader.cancel();
        self.speech.stop();
        self.publish();
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn chapter(&self) -> &ChapterRef {
        &self.chapter
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Wait for the next fetch to report back. Pair with
    /// [`ChapterScreen::handle_completion`].
    pub async fn recv_completion(&mut self) -> Option<LoadCompletion> {
        self.completions.recv().await
    }

    /// Apply a fetch result. Stale results are dropped and return `false`.
    pub fn handle_completion(&mut self, completion: LoadCompletion) -> bool {
        if !self.loader.apply(completion) {
            return false;
        }
        if matches!(self.loader.state(), LoadState::Ready(_)) {
            // word boundaries may differ in the new text
            self.annotations.invalidate_all();
        }
        self.selection.close();
        self.publish();
        true
    }

    /// Wait for completions until one changes the screen.
    pub async fn settle(&mut self) -> bool {
        while let Some(completion) = self.recv_completion().await {
            if self.handle_completion(completion) {
                return true;
            }
        }
        false
    }

    pub fn select_translation(&mut self, translation: Translation) {
        self.translation = translation;
        self.issue_load();
        self.publish();
    }

    pub fn retry(&mut self) {
        self.selection.close();
        if self.loader.retry().is_none() {
            self.issue_load();
        }
        self.publish();
    }

    /// Open the action menu on a word. Ignored when the word is not on screen.
    pub fn tap_word(&mut self, verse_number: u32, word_index: usize) -> Option<SelectedWord> {
        let text = self
            .loader
            .state()
            .verses()?
            .iter()
            .find(|verse| verse.number == verse_number)?
            .word(word_index)?
            .to_string();

        self.selection.open(verse_number, word_index, text);
        self.publish();
        self.selection.current().cloned()
    }

    /// Mark or unmark the open word and close the menu. Returns the new mark
    /// state, or `None` when nothing was open.
    pub fn toggle_selected_mark(&mut self) -> Option<bool> {
        let selected = self.selection.close()?;
        let marked = self.annotations.toggle(selected.verse_number, selected.word_index);
        self.publish();
        Some(marked)
    }

    pub fn close_selection(&mut self) {
        if self.selection.close().is_some() {
            self.publish();
        }
    }

    pub fn selection(&self) -> Option<&SelectedWord> {
        self.selection.current()
    }

    /// Speak one verse. Returns `false` when the verse is not on screen.
    pub fn speak_verse(&mut self, verse_number: u32) -> bool {
        let Some(text) = self
            .loader
            .state()
            .verses()
            .and_then(|verses| verses.iter().find(|v| v.number == verse_number))
            .map(|verse| verse.text.clone())
        else {
            return false;
        };

        self.speech.speak(&text);
        self.publish();
        true
    }

    pub fn speak_chapter(&mut self) -> bool {
        let Some(verses) = self.loader.state().verses() else {
            return false;
        };
        self.speech.speak_chapter(verses);
        self.publish();
        true
    }

    pub fn stop_speech(&mut self) {
        self.speech.stop();
        self.publish();
    }

    pub fn speech(&self) -> &SpeechController<E> {
        &self.speech
    }

    pub fn increase_font_size(&mut self) {
        self.font_size.increase();
        self.publish();
    }

    pub fn decrease_font_size(&mut self) {
        self.font_size.decrease();
        self.publish();
    }

    pub fn toggle_options(&mut self) {
        self.options_visible = !self.options_visible;
        self.publish();
    }

    pub fn previous_route(&self) -> Option<ChapterRoute> {
        navigator::previous_target(self.chapter.chapter_number(), self.chapter.total_chapters())
            .map(|n| self.chapter.route_to(n))
    }

    pub fn next_route(&self) -> Option<ChapterRoute> {
        navigator::next_target(self.chapter.chapter_number(), self.chapter.total_chapters())
            .map(|n| self.chapter.route_to(n))
    }

    pub fn jump_route(&self, selected: u32) -> Result<ChapterRoute> {
        navigator::jump_target(
            self.chapter.chapter_number(),
            selected,
            self.chapter.total_chapters(),
        )
        .map(|n| self.chapter.route_to(n))
    }

    fn issue_load(&mut self) {
        // the open word belongs to text that is about to go away
        self.selection.close();
        self.loader.load(
            self.translation,
            self.chapter.book_abbreviation(),
            self.chapter.chapter_number(),
        );
    }

    fn publish(&mut self) {
        self.speech.refresh();
        let snapshot = build_snapshot(
            &self.chapter,
            self.translation,
            self.font_size,
            self.options_visible,
            self.loader.state(),
            &self.annotations,
            &self.selection,
            &self.speech,
        );
        self.snapshots.send_replace(snapshot);
    }
}

#[allow(clippy::too_many_arguments)]
fn build_snapshot<E: SpeechEngine>(
    chapter: &ChapterRef,
    translation: Translation,
    font_size: FontSize,
    options_visible: bool,
    state: &LoadState,
    annotations: &AnnotationStore,
    selection: &WordSelectionSession,
    speech: &SpeechController<E>,
) -> ScreenSnapshot {
    let view = match state {
        LoadState::Loading => ChapterView::Loading {
            placeholder_rows: PLACEHOLDER_ROWS,
        },
        LoadState::Ready(verses) => ChapterView::Ready {
            verses: verses
                .iter()
                .map(|verse| VerseView::build(verse, annotations))
                .collect(),
        },
        LoadState::Failed(e) => ChapterView::Failed {
            message: e.user_message(),
        },
    };

    ScreenSnapshot {
        book_name: chapter.book_name().to_string(),
        chapter_number: chapter.chapter_number(),
        total_chapters: chapter.total_chapters(),
        translation,
        font_size,
        options_visible,
        view,
        selection: selection.current().cloned(),
        can_go_previous: navigator::previous_target(chapter.chapter_number(), chapter.total_chapters()).is_some(),
        can_go_next: navigator::next_target(chapter.chapter_number(), chapter.total_chapters()).is_some(),
        speech_available: speech.is_available(),
        speaking: speech.active_utterance().is_some(),
    }
}
