use serde::{Deserialize, Serialize};

use crate::error::ChapterError;

/// Bible translations served by the verse API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// Almeida Corrigida Fiel
    Acf,
    /// Nova Versão Internacional
    #[default]
    Nvi,
    /// Almeida Revista e Atualizada
    Ra,
}

impl Translation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Translation::Acf => "acf",
            Translation::Nvi => "nvi",
            Translation::Ra => "ra",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ChapterError> {
        match s.trim().to_lowercase().as_str() {
            "acf" => Ok(Translation::Acf),
            "nvi" => Ok(Translation::Nvi),
            "ra" => Ok(Translation::Ra),
            _ => Err(ChapterError::UnknownTranslation(s.to_string())),
        }
    }

    pub fn all() -> Vec<Translation> {
        vec![Translation::Acf, Translation::Nvi, Translation::Ra]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Translation::Acf => "Almeida Corrigida Fiel",
            Translation::Nvi => "Nova Versão Internacional",
            Translation::Ra => "Almeida Revista e Atualizada",
        }
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
