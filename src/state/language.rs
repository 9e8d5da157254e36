//! Chat languages.
//!
//! The relay currently speaks two languages. Routing only ever compares
//! languages pairwise, so adding a variant here is enough to extend it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A user's preferred chat language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    English,
    Japanese,
}

/// Returned when a language name or code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 2] = [Language::English, Language::Japanese];

    /// ISO-639-1 code sent to the translation service.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }

    /// Human-readable name, as stored in the user directory.
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Japanese => "Japanese",
        }
    }

    /// The other language of the pair.
    pub fn counterpart(self) -> Self {
        match self {
            Self::English => Self::Japanese,
            Self::Japanese => Self::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts either the name or the code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| {
                lang.name().eq_ignore_ascii_case(wanted) || lang.code().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

impl TryFrom<String> for Language {
    type Error = UnknownLanguage;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.name().to_string()
    }
}
