//! Verse loading with last-issued-wins semantics.
//!
//! Every request gets a sequence number. Fetches run as tasks and report back
//! through a channel; the owner feeds each [`LoadCompletion`] into
//! [`ChapterLoader::apply`], which drops anything that is not the latest request.
//! Arrival order never matters.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{ChapterError, Result};
use crate::scripture::Verse;
use crate::source::VerseDataSource;
use crate::translation::Translation;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: RequestId,
    pub translation: Translation,
    pub book_abbreviation: String,
    pub chapter: u32,
}

#[derive(Debug)]
pub struct LoadCompletion {
    pub request: LoadRequest,
    pub result: Result<Vec<Verse>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready(Vec<Verse>),
    Failed(ChapterError),
}

impl LoadState {
    pub fn verses(&self) -> Option<&[Verse]> {
        match self {
            LoadState::Ready(verses) => Some(verses),
            _ => None,
        }
    }
}

pub struct ChapterLoader<S> {
    source: Arc<S>,
    timeout: Duration,
    latest: RequestId,
    last_request: Option<LoadRequest>,
    state: LoadState,
    tasks: JoinSet<()>,
    tx: mpsc::UnboundedSender<LoadCompletion>,
}

impl<S: VerseDataSource> ChapterLoader<S> {
    /// Create a loader and the receiving end its fetch tasks report to.
    pub fn new(source: Arc<S>, timeout: Duration) -> (Self, mpsc::UnboundedReceiver<LoadCompletion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let loader = Self {
            source,
            timeout,
            latest: 0,
            last_request: None,
            state: LoadState::Loading,
            tasks: JoinSet::new(),
            tx,
        };
        (loader, rx)
    }

    /// Issue a fetch. State goes to `Loading` until this request (and only
    /// this one) completes. Must be called from within a tokio runtime.
    pub fn load(&mut self, translation: Translation, book_abbreviation: &str, chapter: u32) -> LoadRequest {
        // Reap finished tasks so the set only holds in-flight fetches.
        while self.tasks.try_join_next().is_some() {}

        self.latest += 1;
        let request = LoadRequest {
            id: self.latest,
            translation,
            book_abbreviation: book_abbreviation.to_string(),
            chapter,
        };
        self.state = LoadState::Loading;
        self.last_request = Some(request.clone());

        tracing::debug!(
            id = request.id,
            translation = %translation,
            book = book_abbreviation,
            chapter,
            "Issuing verse request"
        );

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let spawned = request.clone();
        self.tasks.spawn(async move {
            let fetch = source.fetch_verses(spawned.translation, &spawned.book_abbreviation, spawned.chapter);
            let result = match tokio::time::timeout(timeout, fetch).await {
                Ok(result) => result,
                Err(_) => Err(ChapterError::Timeout(timeout)),
            };
            // Receiver gone means the screen was torn down.
            let _ = tx.send(LoadCompletion {
                request: spawned,
                result,
            });
        });

        request
    }

    /// Re-issue the most recent request, if there was one.
    pub fn retry(&mut self) -> Option<LoadRequest> {
        let last = self.last_request.clone()?;
        Some(self.load(last.translation, &last.book_abbreviation, last.chapter))
    }

    /// Fold a completion into the state. Returns `false` when it was stale and
    /// discarded.
    pub fn apply(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion { request, result } = completion;

        if !self.is_latest(request.id) {
            tracing::debug!(
                id = request.id,
                latest = self.latest,
                "Discarding stale verse response"
            );
            return false;
        }

        self.state = match result.and_then(normalize_verses) {
            Ok(verses) => {
                tracing::info!(
                    translation = %request.translation,
                    book = %request.book_abbreviation,
                    chapter = request.chapter,
                    count = verses.len(),
                    "Loaded verses"
                );
                LoadState::Ready(verses)
            }
            Err(e) => {
                tracing::warn!(
                    translation = %request.translation,
                    book = %request.book_abbreviation,
                    chapter = request.chapter,
                    error = %e,
                    "Verse request failed"
                );
                LoadState::Failed(e)
            }
        };
        true
    }

    pub fn is_latest(&self, id: RequestId) -> bool {
        self.latest != 0 && id == self.latest
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Abort every in-flight fetch. Anything already queued on the channel is
    /// stale from here on.
    pub fn cancel(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(in_flight = self.tasks.len(), "Cancelling verse requests");
        }
        self.tasks.abort_all();
        self.latest += 1;
    }
}

/// Validate verses and put them in ascending order.
fn normalize_verses(mut verses: Vec<Verse>) -> Result<Vec<Verse>> {
    if verses.is_empty() {
        return Err(ChapterError::MalformedResponse("chapter has no verses".to_string()));
    }
    if let Some(bad) = verses.iter().find(|v| v.number == 0 || v.text.trim().is_empty()) {
        return Err(ChapterError::MalformedResponse(format!(
            "invalid verse {}",
            bad.number
        )));
    }

    if !verses.windows(2).all(|w| w[0].number <= w[1].number) {
        verses.sort_by_key(|v| v.number);
    }
    if verses.windows(2).any(|w| w[0].number == w[1].number) {
        return Err(ChapterError::MalformedResponse("duplicate verse numbers".to_string()));
    }

    Ok(verses)
}
