use std::{
    collections::BTreeSet,
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::ColumnType;

/// Strings treated as null by default.
pub const DEFAULT_NULL_STRINGS: &[&str] = &["null", "NULL", "NA", "N/A"];

/// Number-format conventions of a locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    tag: String,
    decimal_separator: char,
    grouping_separator: char,
}

impl Locale {
    /// Locale-neutral format: `.` decimal separator, `,` grouping separator.
    pub fn root() -> Self {
        Self::new("", '.', ',')
    }

    pub fn new(tag: impl Into<String>, decimal_separator: char, grouping_separator: char) -> Self {
        Self {
            tag: tag.into(),
            decimal_separator,
            grouping_separator,
        }
    }

    /// Resolves a language tag such as `de-DE` or `fr_FR`.
    pub fn for_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().replace('_', "-");
        if normalized.is_empty() || normalized.eq_ignore_ascii_case("root") {
            return Some(Self::root());
        }
        let lowered = normalized.to_ascii_lowercase();
        let (language, region) = match lowered.split_once('-') {
            Some((language, region)) => (language.to_string(), Some(region.to_string())),
            None => (lowered.clone(), None),
        };
        let (decimal, grouping) = match (language.as_str(), region.as_deref()) {
            ("de" | "it", Some("ch")) => ('.', '\''),
            ("en" | "ja" | "zh" | "ko" | "he" | "th", _) => ('.', ','),
            ("de" | "it" | "es" | "nl" | "pt" | "da" | "id" | "tr" | "el", _) => (',', '.'),
            ("fr" | "ru" | "pl" | "sv" | "cs" | "fi" | "nb" | "no" | "uk" | "sk" | "hu", _) => {
                (',', '\u{a0}')
            }
            _ => return None,
        };
        Some(Self::new(normalized, decimal, grouping))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn grouping_separator(&self) -> char {
        self.grouping_separator
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.tag)
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locale::for_tag(&value).ok_or_else(|| format!("Unsupported locale '{value}'"))
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Locale::try_from(value.to_string())
    }
}

/// Per-call overrides for the parser cascade. Unset fields fall back to the
/// registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
    /// chrono format string used for date-time, date and time values.
    #[serde(skip_serializing_if = "Option::is_none", alias = "date_time_format")]
    pub date_time_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_strings: Option<BTreeSet<String>>,
    /// Types the cascade must not infer.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub skip_types: BTreeSet<ColumnType>,
}

impl ParserOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening parser options {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).context("Parsing parser options YAML")
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merged_with(mut self, overrides: ParserOptions) -> Self {
        if overrides.locale.is_some() {
            self.locale = overrides.locale;
        }
        if overrides.date_time_pattern.is_some() {
            self.date_time_pattern = overrides.date_time_pattern;
        }
        if overrides.null_strings.is_some() {
            self.null_strings = overrides.null_strings;
        }
        self.skip_types.extend(overrides.skip_types);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_tag_resolves_separators() {
        let german = Locale::for_tag("de_DE").unwrap();
        assert_eq!(german.decimal_separator(), ',');
        assert_eq!(german.grouping_separator(), '.');
        assert_eq!(german.tag(), "de-DE");
        let swiss = Locale::for_tag("de-CH").unwrap();
        assert_eq!(swiss.grouping_separator(), '\'');
        assert_eq!(Locale::for_tag("root").unwrap(), Locale::root());
        assert!(Locale::for_tag("xx").is_none());
    }

    #[test]
    fn options_deserialize_from_yaml() {
        let yaml = "locale: fr-FR\nnull_strings: [\"-\", \"?\"]\nskip_types: [double, custom:percent]\n";
        let options: ParserOptions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(options.locale.unwrap().decimal_separator(), ',');
        assert!(options.null_strings.unwrap().contains("-"));
        assert!(options.skip_types.contains(&ColumnType::Double));
        assert!(
            options
                .skip_types
                .contains(&ColumnType::Custom("percent".to_string()))
        );
    }

    #[test]
    fn merged_with_prefers_overrides() {
        let base = ParserOptions {
            date_time_pattern: Some("%d/%m/%Y %H:%M".to_string()),
            ..ParserOptions::default()
        };
        let overrides = ParserOptions {
            locale: Locale::for_tag("de"),
            ..ParserOptions::default()
        };
        let merged = base.merged_with(overrides);
        assert!(merged.locale.is_some());
        assert_eq!(merged.date_time_pattern.as_deref(), Some("%d/%m/%Y %H:%M"));
    }
}
