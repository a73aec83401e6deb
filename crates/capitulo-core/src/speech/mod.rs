//! Spoken verses.
//!
//! [`SpeechController`] keeps at most one utterance alive: every `speak` stops
//! the engine first. Speech is best effort, so an engine that is missing or
//! failed to start turns every call into a logged no-op.

mod espeak;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChapterError, Result};
use crate::scripture::Verse;

pub use espeak::EspeakEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoiceQuality {
    Low,
    Normal,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub language: String,
    pub quality: VoiceQuality,
}

/// Playback parameters sent with every utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    pub pan: f32,
    pub volume: f32,
    pub stream: String,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            pan: 0.0,
            volume: 1.0,
            stream: "STREAM_MUSIC".to_string(),
        }
    }
}

/// A text-to-speech backend.
pub trait SpeechEngine {
    fn initialize(&mut self) -> impl Future<Output = Result<()>>;
    fn list_voices(&mut self) -> impl Future<Output = Result<Vec<Voice>>>;
    fn set_default_language(&mut self, code: &str) -> Result<()>;
    fn set_default_voice(&mut self, id: &str) -> Result<()>;
    fn speak(&mut self, text: &str, params: &SpeechParams) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn is_speaking(&mut self) -> bool;
}

pub struct SpeechController<E> {
    engine: E,
    ready: bool,
    params: SpeechParams,
    active: Option<String>,
}

impl<E: SpeechEngine> SpeechController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            ready: false,
            params: SpeechParams::default(),
            active: None,
        }
    }

    /// Start the engine and pick a high quality voice for `language` if there
    /// is one. Failures are logged and leave the controller unavailable.
    pub async fn initialize(&mut self, language: &str, timeout: Duration) -> bool {
        let status = match tokio::time::timeout(timeout, self.engine.initialize()).await {
            Ok(status) => status,
            Err(_) => Err(ChapterError::SpeechUnavailable(format!(
                "engine did not start within {:?}",
                timeout
            ))),
        };

        if let Err(e) = status {
            tracing::warn!(error = %e, "Speech engine unavailable, speech disabled");
            self.ready = false;
            return false;
        }
        self.ready = true;

        if let Err(e) = self.engine.set_default_language(language) {
            tracing::warn!(language, error = %e, "Could not set speech language");
        }

        match tokio::time::timeout(timeout, self.engine.list_voices()).await {
            Ok(Ok(voices)) => match pick_voice(&voices, language) {
                Some(voice) => {
                    if let Err(e) = self.engine.set_default_voice(&voice.id) {
                        tracing::warn!(voice = %voice.id, error = %e, "Could not set voice");
                    } else {
                        tracing::info!(voice = %voice.id, "Selected speech voice");
                    }
                }
                None => tracing::debug!(language, "No high quality voice, using engine default"),
            },
            Ok(Err(e)) => tracing::warn!(error = %e, "Could not list voices"),
            Err(_) => tracing::warn!("Listing voices timed out"),
        }

        true
    }

    /// Speak `text`, interrupting whatever is playing.
    pub fn speak(&mut self, text: &str) {
        if !self.ready {
            tracing::debug!("Speech unavailable, ignoring utterance");
            return;
        }

        if let Err(e) = self.engine.stop() {
            tracing::warn!(error = %e, "Failed to stop previous utterance");
        }
        self.active = None;

        match self.engine.speak(text, &self.params) {
            Ok(()) => self.active = Some(text.to_string()),
            Err(e) => tracing::warn!(error = %e, "Failed to start utterance"),
        }
    }

    pub fn speak_chapter(&mut self, verses: &[Verse]) {
        let text = verses
            .iter()
            .map(|verse| verse.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        self.speak(&text);
    }

    pub fn stop(&mut self) {
        if !self.ready {
            return;
        }
        if let Err(e) = self.engine.stop() {
            tracing::warn!(error = %e, "Failed to stop utterance");
        }
        self.active = None;
    }

    /// Forget the active utterance once the engine has finished it.
    pub fn refresh(&mut self) {
        if self.active.is_some() && !self.engine.is_speaking() {
            self.active = None;
        }
    }

    pub fn active_utterance(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.ready
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn pick_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|voice| voice.language.eq_ignore_ascii_case(language) && voice.quality == VoiceQuality::High)
}


#[cfg(test)]
mod tests {
    use super::testing::{EngineCall, RecordingEngine};
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn voice(id: &str, language: &str, quality: VoiceQuality) -> Voice {
        Voice {
            id: id.to_string(),
            language: language.to_string(),
            quality,
        }
    }

    #[tokio::test]
    async fn test_second_speak_preempts_first() {
        let mut speech = SpeechController::new(RecordingEngine::default());
        assert!(speech.initialize("pt-BR", TIMEOUT).await);

        speech.speak("text A");
        speech.speak("text B");

        assert_eq!(speech.active_utterance(), Some("text B"));
        let calls = &speech.engine().calls;
        let tail: Vec<&EngineCall> = calls.iter().rev().take(4).rev().collect();
        assert_eq!(
            tail,
            vec![
                &EngineCall::Stop,
                &EngineCall::Speak("text A".to_string()),
                &EngineCall::Stop,
                &EngineCall::Speak("text B".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_speak_chapter_joins_verses_with_spaces() {
        let mut speech = SpeechController::new(RecordingEngine::default());
        speech.initialize("pt-BR", TIMEOUT).await;

        speech.speak_chapter(&[Verse::new(1, "No princípio"), Verse::new(2, "era o Verbo")]);
        assert_eq!(speech.engine().spoken(), vec!["No princípio era o Verbo"]);
    }

    #[tokio::test]
    async fn test_unavailable_engine_is_a_no_op() {
        let engine = RecordingEngine {
            fail_init: true,
            ..Default::default()
        };
        let mut speech = SpeechController::new(engine);
        assert!(!speech.initialize("pt-BR", TIMEOUT).await);

        speech.speak("ignored");
        speech.stop();
        assert!(!speech.is_available());
        assert!(speech.active_utterance().is_none());
        assert_eq!(speech.engine().calls, vec![EngineCall::Initialize]);
    }

    #[tokio::test]
    async fn test_uninitialized_engine_is_a_no_op() {
        let mut speech = SpeechController::new(RecordingEngine::default());
        speech.speak("ignored");
        assert!(speech.engine().calls.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_picks_high_quality_locale_voice() {
        let engine = RecordingEngine {
            voices: vec![
                voice("en-us-high", "en-US", VoiceQuality::High),
                voice("pt-br-normal", "pt-BR", VoiceQuality::Normal),
                voice("pt-br-high", "pt-BR", VoiceQuality::High),
            ],
            ..Default::default()
        };
        let mut speech = SpeechController::new(engine);
        speech.initialize("pt-BR", TIMEOUT).await;

        let calls = &speech.engine().calls;
        assert!(calls.contains(&EngineCall::SetLanguage("pt-BR".to_string())));
        assert!(calls.contains(&EngineCall::SetVoice("pt-br-high".to_string())));
    }

    #[tokio::test]
    async fn test_initialize_keeps_default_voice_without_match() {
        let engine = RecordingEngine {
            voices: vec![voice("pt-br-normal", "pt-BR", VoiceQuality::Normal)],
            ..Default::default()
        };
        let mut speech = SpeechController::new(engine);
        assert!(speech.initialize("pt-BR", TIMEOUT).await);
        assert!(!speech
            .engine()
            .calls
            .iter()
            .any(|c| matches!(c, EngineCall::SetVoice(_))));
    }

    #[tokio::test]
    async fn test_refresh_clears_finished_utterance() {
        let mut speech = SpeechController::new(RecordingEngine::default());
        speech.initialize("pt-BR", TIMEOUT).await;
        speech.speak("Jesus chorou");
        speech.refresh();
        assert_eq!(speech.active_utterance(), Some("Jesus chorou"));

        // engine finished on its own
        speech.engine.speaking = false;
        speech.refresh();
        assert!(speech.active_utterance().is_none());
    }
}
