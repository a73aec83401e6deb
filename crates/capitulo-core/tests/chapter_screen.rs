use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use capitulo_core::error::Result;
use capitulo_core::{
    ChapterError, ChapterRef, ChapterScreen, ChapterView, ScreenSettings, SpeechEngine, SpeechParams,
    Translation, Verse, VerseDataSource, Voice,
};
use tokio::sync::oneshot;

type Gate = oneshot::Sender<Result<Vec<Verse>>>;

/// Verse source whose answers are released by the test in any order.
#[derive(Default)]
struct GatedSource {
    gates: Mutex<HashMap<Translation, Gate>>,
}

impl GatedSource {
    async fn wait_for(&self, translations: &[Translation]) {
        loop {
            {
                let gates = self.gates.lock().unwrap();
                if translations.iter().all(|t| gates.contains_key(t)) {
                    return;
                }
            }
            tokio::task::yield_now().await;
        }
    }

    fn release(&self, translation: Translation, result: Result<Vec<Verse>>) {
        let gate = self.gates.lock().unwrap().remove(&translation).unwrap();
        let _ = gate.send(result);
    }
}

impl VerseDataSource for GatedSource {
    async fn fetch_verses(&self, translation: Translation, _book: &str, _chapter: u32) -> Result<Vec<Verse>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(translation, tx);
        rx.await
            .unwrap_or_else(|_| Err(ChapterError::Network("gate dropped".to_string())))
    }
}

/// Speech engine with no audio; remembers what it was asked to say.
#[derive(Default)]
struct SilentEngine {
    log: Vec<String>,
    speaking: bool,
}

impl SpeechEngine for SilentEngine {
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn list_voices(&mut self) -> Result<Vec<Voice>> {
        Ok(Vec::new())
    }

    fn set_default_language(&mut self, _code: &str) -> Result<()> {
        Ok(())
    }

    fn set_default_voice(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }

    fn speak(&mut self, text: &str, _params: &SpeechParams) -> Result<()> {
        self.log.push(format!("speak:{}", text));
        self.speaking = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.push("stop".to_string());
        self.speaking = false;
        Ok(())
    }

    fn is_speaking(&mut self) -> bool {
        self.speaking
    }
}

fn psalm(translation: Translation) -> Vec<Verse> {
    vec![
        Verse::new(2, format!("Em verdes pastos me faz repousar [{}]", translation)),
        Verse::new(1, format!("O Senhor é o meu pastor [{}]", translation)),
    ]
}

fn new_screen(source: &Arc<GatedSource>) -> ChapterScreen<GatedSource, SilentEngine> {
    let chapter = ChapterRef::new("sl", "Salmos", 23, 150).unwrap();
    ChapterScreen::new(
        chapter,
        Arc::clone(source),
        SilentEngine::default(),
        ScreenSettings::default(),
    )
}

async fn drain(screen: &mut ChapterScreen<GatedSource, SilentEngine>, n: usize) -> usize {
    let mut applied = 0;
    for _ in 0..n {
        let completion = screen.recv_completion().await.unwrap();
        if screen.handle_completion(completion) {
            applied += 1;
        }
    }
    applied
}

#[tokio::test]
async fn test_rapid_translation_switches_show_last_selection() {
    let source = Arc::new(GatedSource::default());
    let mut screen = new_screen(&source);

    screen.mount().await; // nvi
    screen.select_translation(Translation::Acf);
    screen.select_translation(Translation::Ra);
    source
        .wait_for(&[Translation::Nvi, Translation::Acf, Translation::Ra])
        .await;

    source.release(Translation::Ra, Ok(psalm(Translation::Ra)));
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    source.release(Translation::Acf, Ok(psalm(Translation::Acf)));

    assert_eq!(drain(&mut screen, 3).await, 1);

    let snapshot = screen.snapshot();
    assert_eq!(snapshot.translation, Translation::Ra);
    let verses = snapshot.verses();
    assert_eq!(verses.len(), 2);
    assert_eq!(verses[0].number, 1);
    assert_eq!(verses[0].words.last().unwrap().text, "[ra]");
}

#[tokio::test]
async fn test_marks_do_not_survive_a_reload() {
    let source = Arc::new(GatedSource::default());
    let mut screen = new_screen(&source);

    screen.mount().await;
    source.wait_for(&[Translation::Nvi]).await;
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    drain(&mut screen, 1).await;

    let marked = [(1, 1), (1, 3), (2, 0)];
    for (verse, word) in marked {
        screen.tap_word(verse, word).unwrap();
        assert_eq!(screen.toggle_selected_mark(), Some(true));
    }
    assert_eq!(screen.annotations().len(), 3);

    // same chapter, same translation: marks still go
    screen.retry();
    source.wait_for(&[Translation::Nvi]).await;
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    drain(&mut screen, 1).await;

    for (verse, word) in marked {
        assert!(!screen.annotations().is_marked(verse, word));
    }
}

#[tokio::test]
async fn test_network_failure_leaves_marks_untouched() {
    let source = Arc::new(GatedSource::default());
    let mut screen = new_screen(&source);

    screen.mount().await;
    source.wait_for(&[Translation::Nvi]).await;
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    drain(&mut screen, 1).await;
    screen.tap_word(1, 0).unwrap();
    screen.toggle_selected_mark();

    screen.select_translation(Translation::Acf);
    source.wait_for(&[Translation::Acf]).await;
    source.release(
        Translation::Acf,
        Err(ChapterError::Network("500 Internal Server Error".to_string())),
    );
    drain(&mut screen, 1).await;

    assert!(matches!(screen.snapshot().view, ChapterView::Failed { .. }));
    assert!(screen.snapshot().verses().is_empty());
    assert!(screen.annotations().is_marked(1, 0));
}

#[tokio::test]
async fn test_selection_is_single_and_closed_by_reload() {
    let source = Arc::new(GatedSource::default());
    let mut screen = new_screen(&source);

    screen.mount().await;
    source.wait_for(&[Translation::Nvi]).await;
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    drain(&mut screen, 1).await;

    screen.tap_word(1, 1).unwrap();
    screen.tap_word(2, 2).unwrap();
    let open = screen.selection().unwrap();
    assert_eq!((open.verse_number, open.word_index), (2, 2));
    assert_eq!(open.text, "pastos");

    screen.select_translation(Translation::Ra);
    assert!(screen.selection().is_none());
    assert!(screen.snapshot().selection.is_none());
}

#[tokio::test]
async fn test_unmount_discards_in_flight_results_and_stops_speech() {
    let source = Arc::new(GatedSource::default());
    let mut screen = new_screen(&source);

    screen.mount().await;
    source.wait_for(&[Translation::Nvi]).await;
    source.release(Translation::Nvi, Ok(psalm(Translation::Nvi)));
    drain(&mut screen, 1).await;

    assert!(screen.speak_verse(1));
    screen.select_translation(Translation::Acf);
    source.wait_for(&[Translation::Acf]).await;
    screen.unmount();

    assert!(screen.speech().engine().log.ends_with(&["stop".to_string()]));
    assert!(!screen.snapshot().speaking);
    assert!(matches!(screen.snapshot().view, ChapterView::Loading { .. }));
}

/// Flags when the fetch future holding it is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Source whose fetches never resolve.
#[derive(Default)]
struct HangingSource {
    started: AtomicBool,
    dropped: Arc<AtomicBool>,
}

impl VerseDataSource for HangingSource {
    async fn fetch_verses(&self, _translation: Translation, _book: &str, _chapter: u32) -> Result<Vec<Verse>> {
        let _flag = DropFlag(Arc::clone(&self.dropped));
        self.started.store(true, Ordering::SeqCst);
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_unmount_aborts_pending_fetch() {
    let source = Arc::new(HangingSource::default());
    let chapter = ChapterRef::new("ap", "Apocalipse", 22, 22).unwrap();
    let mut screen = ChapterScreen::new(
        chapter,
        Arc::clone(&source),
        SilentEngine::default(),
        ScreenSettings::default(),
    );

    screen.mount().await;
    while !source.started.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
    assert!(!source.dropped.load(Ordering::SeqCst));

    screen.unmount();
    for _ in 0..10 {
        if source.dropped.load(Ordering::SeqCst) {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(source.dropped.load(Ordering::SeqCst));
}
