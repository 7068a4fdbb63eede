//! Languages served by the chat widget.

use crate::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How query text is entered into the input control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Whole string in one keystroke burst
    Bulk,
    /// One character at a time with a delay between keystrokes
    PerCharacter,
}

/// Widget language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English, left-to-right
    #[serde(rename = "en")]
    English,
    /// Arabic, right-to-left
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    /// All supported languages
    pub const ALL: [Self; 2] = [Self::English, Self::Arabic];

    /// Two-letter tag
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Arabic => "ar",
        }
    }

    /// URL path segment of the localized site, e.g. `/ar/`
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::English => "/en/",
            Self::Arabic => "/ar/",
        }
    }

    /// Expected text direction of the input field
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::English => "ltr",
            Self::Arabic => "rtl",
        }
    }

    /// Locator name of the AI message element in the chat widget
    #[must_use]
    pub const fn response_locator(self) -> &'static str {
        match self {
            Self::English => "ai_message",
            Self::Arabic => "ai_message_rtl",
        }
    }

    /// Input mode used when typing queries
    #[must_use]
    pub const fn input_mode(self) -> InputMode {
        match self {
            Self::English => InputMode::Bulk,
            Self::Arabic => InputMode::PerCharacter,
        }
    }

    /// Landing URL for this language under `base_url`
    #[must_use]
    pub fn landing_url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ar" | "arabic" => Ok(Self::Arabic),
            other => Err(ProbeError::config(format!("unsupported language: {other}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_paths() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Arabic.path(), "/ar/");
        assert_eq!(Language::Arabic.to_string(), "ar");
    }

    #[test]
    fn test_arabic_uses_rtl_variant() {
        assert_eq!(Language::Arabic.response_locator(), "ai_message_rtl");
        assert_eq!(Language::Arabic.direction(), "rtl");
        assert_eq!(Language::Arabic.input_mode(), InputMode::PerCharacter);
        assert_eq!(Language::English.input_mode(), InputMode::Bulk);
    }

    #[test]
    fn test_landing_url_trims_slash() {
        assert_eq!(
            Language::English.landing_url("https://ask.u.ae/"),
            "https://ask.u.ae/en/"
        );
        assert_eq!(
            Language::Arabic.landing_url("https://ask.u.ae"),
            "https://ask.u.ae/ar/"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("AR".parse::<Language>().unwrap(), Language::Arabic);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&Language::Arabic).unwrap();
        assert_eq!(json, "\"ar\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::English);
    }
}
