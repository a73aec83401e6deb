use std::process::Stdio;

use tokio::process::{Child, Command};

use super::{SpeechEngine, SpeechParams, Voice, VoiceQuality};
use crate::error::{ChapterError, Result};

/// Speech through an `espeak-ng` compatible binary, one child process per
/// utterance.
pub struct EspeakEngine {
    program: String,
    language: Option<String>,
    voice: Option<String>,
    child: Option<Child>,
}

impl EspeakEngine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            language: None,
            voice: None,
            child: None,
        }
    }

    fn voice_arg(&self) -> Option<&str> {
        self.voice.as_deref().or(self.language.as_deref())
    }
}

impl SpeechEngine for EspeakEngine {
    async fn initialize(&mut self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ChapterError::SpeechUnavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(ChapterError::SpeechUnavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(())
    }

    async fn list_voices(&mut self) -> Result<Vec<Voice>> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ChapterError::SpeechUnavailable(e.to_string()))?;

        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn set_default_language(&mut self, code: &str) -> Result<()> {
        self.language = Some(code.to_string());
        Ok(())
    }

    fn set_default_voice(&mut self, id: &str) -> Result<()> {
        self.voice = Some(id.to_string());
        Ok(())
    }

    fn speak(&mut self, text: &str, params: &SpeechParams) -> Result<()> {
        // espeak amplitude runs 0..=200 with 100 as normal volume
        let amplitude = (params.volume.clamp(0.0, 2.0) * 100.0).round() as u32;

        let mut command = Command::new(&self.program);
        if let Some(voice) = self.voice_arg() {
            command.arg("-v").arg(voice);
        }
        let child = command
            .arg("-a")
            .arg(amplitude.to_string())
            .arg("--")
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChapterError::SpeechUnavailable(e.to_string()))?;

        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            if matches!(child.try_wait(), Ok(None)) {
                child
                    .start_kill()
                    .map_err(|e| ChapterError::SpeechUnavailable(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn is_speaking(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  pt-BR           --/M      Portuguese_(Brazil) roa/pt-BR            (pt 5)
/// ```
///
/// MBROLA voices (`mb/` files) are the high quality ones.
fn parse_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 5 {
                return None;
            }
            let language = columns[1];
            let file = columns[4];
            let quality = if file.starts_with("mb/") {
                VoiceQuality::High
            } else {
                VoiceQuality::Normal
            };
            Some(Voice {
                id: file.to_string(),
                language: language.to_string(),
                quality,
            })
        })
        .collect()
}
