//! Display locale for relative times and date buckets

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language used for human-facing time labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Bahasa Indonesia (`id-ID`), the dashboard's primary language
    #[default]
    #[serde(rename = "id", alias = "id-ID", alias = "indonesian")]
    Indonesian,
    /// English (`en-US`)
    #[serde(rename = "en", alias = "en-US", alias = "english")]
    English,
}

impl Locale {
    /// BCP 47 tag for this locale
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Indonesian => "id-ID",
            Self::English => "en-US",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" | "indonesian" => Ok(Self::Indonesian),
            "en" | "en-us" | "english" => Ok(Self::English),
            _ => Err(TypesError::unknown("locale", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("id", Locale::Indonesian)]
    #[case("id-ID", Locale::Indonesian)]
    #[case("EN", Locale::English)]
    #[case(" en-us ", Locale::English)]
    fn test_locale_from_str(#[case] input: &str, #[case] expected: Locale) {
        assert_eq!(input.parse::<Locale>().unwrap(), expected);
    }

    #[test]
    fn test_locale_rejects_unknown() {
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_locale_default_is_indonesian() {
        assert_eq!(Locale::default(), Locale::Indonesian);
        assert_eq!(Locale::default().to_string(), "id-ID");
    }

    #[test]
    fn test_locale_serde_aliases() {
        let parsed: Locale = serde_json::from_str("\"en-US\"").unwrap();
        assert_eq!(parsed, Locale::English);
        assert_eq!(serde_json::to_string(&Locale::Indonesian).unwrap(), "\"id\"");
    }
}
