pub mod annotations;
pub mod config;
pub mod error;
pub mod loader;
pub mod navigator;
pub mod screen;
pub mod scripture;
pub mod selection;
pub mod source;
pub mod speech;
pub mod state;
pub mod translation;

// Re-export main types for convenience
pub use annotations::AnnotationStore;
pub use config::{Config, ScreenSettings};
pub use error::ChapterError;
pub use loader::{ChapterLoader, LoadCompletion, LoadRequest, LoadState, RequestId};
pub use screen::ChapterScreen;
pub use scripture::{ChapterRef, ChapterRoute, Verse};
pub use selection::{SelectedWord, WordSelectionSession};
pub use source::{BibliaDigitalClient, BookInfo, VerseDataSource};
pub use speech::{EspeakEngine, SpeechController, SpeechEngine, SpeechParams, Voice, VoiceQuality};
pub use state::{ChapterView, FontSize, ScreenSnapshot, VerseView, WordView};
pub use translation::Translation;
