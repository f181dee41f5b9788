use std::{
    collections::BTreeSet,
    fmt,
    sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard},
};

use log::{debug, trace};
use url::Url;

use crate::{
    collector::TypedCollector,
    column::{Column, ValueColumn},
    data::{ColumnType, Value},
    error::{FrameError, FrameResult},
    json,
    numeric::{parse_decimal, parse_double},
    options::{DEFAULT_NULL_STRINGS, Locale, ParserOptions},
    temporal::{self, DEFAULT_DATE_PATTERNS, DEFAULT_DATE_TIME_PATTERNS, DEFAULT_TIME_PATTERNS},
};

pub const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "file", "mailto", "jar"];

pub type ConvertFn = dyn Fn(&str, &ParseContext<'_>) -> Option<Value> + Send + Sync;

#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    locale: &'a Locale,
    pattern: Option<&'a str>,
    registered_patterns: &'a [String],
}

impl<'a> ParseContext<'a> {
    pub fn locale(&self) -> &'a Locale {
        self.locale
    }

    /// The user pattern, or `defaults` when none was given, followed by the
    /// registered patterns.
    pub fn patterns(&self, defaults: &'a [&'a str]) -> impl Iterator<Item = &'a str> + use<'a> {
        let leading = match self.pattern {
            Some(pattern) => vec![pattern],
            None => defaults.to_vec(),
        };
        let registered = self.registered_patterns;
        leading
            .into_iter()
            .chain(registered.iter().map(String::as_str))
    }
}

#[derive(Clone)]
pub struct StringParser {
    ty: ColumnType,
    covered_by: BTreeSet<ColumnType>,
    convert: Arc<ConvertFn>,
}

impl StringParser {
    pub fn new<F>(ty: ColumnType, convert: F) -> Self
    where
        F: Fn(&str, &ParseContext<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            ty,
            covered_by: BTreeSet::new(),
            convert: Arc::new(convert),
        }
    }

    /// Inference skips this parser while any type in `covered_by` is under
    /// consideration.
    pub fn with_covered_by<I>(mut self, covered_by: I) -> Self
    where
        I: IntoIterator<Item = ColumnType>,
    {
        self.covered_by.extend(covered_by);
        self
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    pub fn covered_by(&self) -> &BTreeSet<ColumnType> {
        &self.covered_by
    }

    pub fn convert(&self, value: &str, context: &ParseContext<'_>) -> Option<Value> {
        (self.convert)(value, context)
    }
}

impl fmt::Debug for StringParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringParser")
            .field("ty", &self.ty)
            .field("covered_by", &self.covered_by)
            .finish_non_exhaustive()
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "t" | "true" | "yes" => Some(true),
        "f" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|url| URL_SCHEMES.contains(&url.scheme()))
}

fn default_parsers() -> Vec<StringParser> {
    vec![
        StringParser::new(ColumnType::Int, |value, _| value.parse::<i32>().ok().map(Value::Int)),
        StringParser::new(ColumnType::Long, |value, _| {
            value.parse::<i64>().ok().map(Value::Long)
        }),
        StringParser::new(ColumnType::Instant, |value, _| {
            temporal::parse_instant(value).map(Value::Instant)
        }),
        StringParser::new(ColumnType::LocalDateTime, |value, context| {
            temporal::parse_local_date_time(value, context.patterns(DEFAULT_DATE_TIME_PATTERNS))
                .map(Value::LocalDateTime)
        }),
        StringParser::new(ColumnType::LocalDate, |value, context| {
            temporal::parse_local_date(value, context.patterns(DEFAULT_DATE_PATTERNS))
                .map(Value::LocalDate)
        }),
        StringParser::new(ColumnType::Duration, |value, _| {
            temporal::parse_duration(value).map(Value::Duration)
        }),
        StringParser::new(ColumnType::LocalTime, |value, context| {
            temporal::parse_local_time(value, context.patterns(DEFAULT_TIME_PATTERNS))
                .map(Value::LocalTime)
        }),
        StringParser::new(ColumnType::Url, |value, _| parse_url(value).map(Value::Url)),
        StringParser::new(ColumnType::Double, |value, context| {
            parse_double(value, context.locale()).map(Value::Double)
        }),
        StringParser::new(ColumnType::Double, |value, _| {
            parse_double(value, &Locale::root()).map(Value::Double)
        }),
        StringParser::new(ColumnType::Boolean, |value, _| {
            parse_boolean(value).map(Value::Boolean)
        }),
        StringParser::new(ColumnType::Decimal, |value, _| {
            parse_decimal(value).map(Value::Decimal)
        }),
        StringParser::new(ColumnType::Frame, |value, _| {
            if !value.starts_with('[') {
                return None;
            }
            json::read_json_str(value).ok().map(Value::Frame)
        }),
        StringParser::new(ColumnType::Row, |value, _| {
            if !value.starts_with('{') {
                return None;
            }
            json::read_json_str(value).ok().map(Value::Row)
        }),
        StringParser::new(ColumnType::String, |value, _| {
            Some(Value::String(value.to_string()))
        }),
    ]
}

struct Attempt {
    values: Vec<Option<Value>>,
    has_nulls: bool,
    null_string_parsed: bool,
    saw_value: bool,
}

#[derive(Debug, Clone)]
pub struct ParserRegistry {
    parsers: Vec<StringParser>,
    date_time_patterns: Vec<String>,
    null_strings: BTreeSet<String>,
    locale: Locale,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: default_parsers(),
            date_time_patterns: Vec::new(),
            null_strings: DEFAULT_NULL_STRINGS.iter().map(|s| s.to_string()).collect(),
            locale: Locale::root(),
        }
    }

    pub fn reset_to_default(&mut self) {
        *self = Self::new();
    }

    /// Adds `parser` ahead of the trailing string fallback.
    pub fn register(&mut self, parser: StringParser) {
        let position = self
            .parsers
            .iter()
            .rposition(|existing| existing.ty == ColumnType::String)
            .unwrap_or(self.parsers.len());
        debug!("Registering parser for {} at position {position}", parser.ty);
        self.parsers.insert(position, parser);
    }

    pub fn unregister(&mut self, ty: &ColumnType) {
        self.parsers.retain(|parser| parser.ty != *ty);
    }

    /// Registers an extra chrono pattern tried after the defaults for
    /// date-time, date and time values.
    pub fn add_date_time_pattern(&mut self, pattern: impl Into<String>) -> FrameResult<()> {
        let pattern = pattern.into();
        if !temporal::is_valid_pattern(&pattern) {
            return Err(FrameError::InvalidPattern { pattern });
        }
        if !self.date_time_patterns.contains(&pattern) {
            self.date_time_patterns.push(pattern);
        }
        Ok(())
    }

    pub fn set_null_strings<I, S>(&mut self, null_strings: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_strings = null_strings.into_iter().map(Into::into).collect();
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    pub fn parsers(&self) -> &[StringParser] {
        &self.parsers
    }

    pub fn parser_for(&self, ty: &ColumnType) -> Option<&StringParser> {
        self.parsers.iter().find(|parser| parser.ty == *ty)
    }

    pub fn date_time_patterns(&self) -> &[String] {
        &self.date_time_patterns
    }

    pub fn null_strings(&self) -> &BTreeSet<String> {
        &self.null_strings
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    fn context<'a>(&'a self, options: &'a ParserOptions) -> FrameResult<ParseContext<'a>> {
        if let Some(pattern) = options.date_time_pattern.as_deref() {
            if !temporal::is_valid_pattern(pattern) {
                return Err(FrameError::InvalidPattern {
                    pattern: pattern.to_string(),
                });
            }
        }
        Ok(ParseContext {
            locale: options.locale.as_ref().unwrap_or(&self.locale),
            pattern: options.date_time_pattern.as_deref(),
            registered_patterns: &self.date_time_patterns,
        })
    }

    /// Infers the type of a string column.
    ///
    /// Group and frame columns, and value columns that are not of type
    /// `String`, are returned unchanged.
    pub fn try_parse(&self, column: Column, options: Option<&ParserOptions>) -> FrameResult<Column> {
        let source = match column {
            Column::Value(source) if *source.column_type() == ColumnType::String => source,
            other => return Ok(other),
        };
        let defaults = ParserOptions::default();
        let options = options.unwrap_or(&defaults);
        let context = self.context(options)?;
        let null_strings = options.null_strings.as_ref().unwrap_or(&self.null_strings);

        let considered = self
            .parsers
            .iter()
            .map(|parser| parser.ty.clone())
            .filter(|ty| *ty == ColumnType::String || !options.skip_types.contains(ty))
            .collect::<BTreeSet<_>>();

        for parser in &self.parsers {
            if !considered.contains(&parser.ty) {
                trace!("Column '{}': {} is skipped", source.name(), parser.ty);
                continue;
            }
            if !parser.covered_by.is_disjoint(&considered) {
                trace!("Column '{}': {} is covered", source.name(), parser.ty);
                continue;
            }
            let Some(attempt) = attempt(parser, &source, &context, null_strings) else {
                continue;
            };
            debug!("Column '{}' parsed as {}", source.name(), parser.ty);
            return finish(source, parser, attempt);
        }
        Err(FrameError::ParserCascadeExhausted {
            column: source.name().to_string(),
        })
    }

    /// Converts every non-null cell of `column` with the first parser of
    /// `ty`, failing on the first cell it rejects.
    pub fn parse(
        &self,
        column: Column,
        ty: &ColumnType,
        options: Option<&ParserOptions>,
    ) -> FrameResult<Column> {
        let parser = self
            .parser_for(ty)
            .ok_or_else(|| FrameError::NoParserForType { ty: ty.clone() })?;
        let source = match column {
            same if same.column_type() == *ty => return Ok(same),
            Column::Value(source) if *source.column_type() == ColumnType::String => source,
            other => {
                return Err(FrameError::TypeConversion {
                    value: other.name().to_string(),
                    from: other.column_type(),
                    to: ty.clone(),
                });
            }
        };
        let defaults = ParserOptions::default();
        let options = options.unwrap_or(&defaults);
        let context = self.context(options)?;
        let null_strings = options.null_strings.as_ref().unwrap_or(&self.null_strings);

        let mut collector = TypedCollector::new(ty.clone(), false);
        for cell in source.values() {
            let Some(value) = cell else {
                collector.push_null();
                continue;
            };
            let text = cell_text(value);
            let trimmed = text.trim();
            if null_strings.contains(trimmed) {
                collector.push_null();
                continue;
            }
            let converted =
                parser
                    .convert(trimmed, &context)
                    .ok_or_else(|| FrameError::TypeConversion {
                        value: text.to_string(),
                        from: source.column_type().clone(),
                        to: ty.clone(),
                    })?;
            collector.push(Some(converted))?;
        }
        collector.finalize(source.name())
    }
}

fn cell_text(value: &Value) -> std::borrow::Cow<'_, str> {
    match value.as_str() {
        Some(text) => std::borrow::Cow::Borrowed(text),
        None => std::borrow::Cow::Owned(value.as_display()),
    }
}

fn attempt(
    parser: &StringParser,
    source: &ValueColumn,
    context: &ParseContext<'_>,
    null_strings: &BTreeSet<String>,
) -> Option<Attempt> {
    let mut attempt = Attempt {
        values: Vec::with_capacity(source.len()),
        has_nulls: false,
        null_string_parsed: false,
        saw_value: false,
    };
    for cell in source.values() {
        let Some(value) = cell else {
            attempt.has_nulls = true;
            attempt.values.push(None);
            continue;
        };
        let text = cell_text(value);
        let trimmed = text.trim();
        if null_strings.contains(trimmed) {
            attempt.has_nulls = true;
            attempt.null_string_parsed = true;
            attempt.values.push(None);
            continue;
        }
        let converted = parser.convert(trimmed, context)?;
        attempt.saw_value = true;
        attempt.values.push(Some(converted));
    }
    Some(attempt)
}

fn finish(source: ValueColumn, parser: &StringParser, attempt: Attempt) -> FrameResult<Column> {
    if parser.ty == ColumnType::String && !attempt.null_string_parsed {
        return Ok(Column::Value(source));
    }
    if !attempt.saw_value {
        return Ok(Column::Value(ValueColumn::with_nullability(
            source.name(),
            ColumnType::String,
            attempt.has_nulls,
            attempt.values,
        )));
    }
    let mut collector = TypedCollector::new(parser.ty.clone(), false);
    for value in attempt.values {
        collector.push(value)?;
    }
    collector.finalize(source.name())
}

static GLOBAL_PARSERS: LazyLock<RwLock<ParserRegistry>> =
    LazyLock::new(|| RwLock::new(ParserRegistry::new()));

pub fn global_parsers() -> RwLockReadGuard<'static, ParserRegistry> {
    GLOBAL_PARSERS.read().unwrap_or_else(PoisonError::into_inner)
}

/// Mutates the process-wide registry. Must not run while parses that read
/// it are in flight.
pub fn configure_global_parsers<F, T>(configure: F) -> T
where
    F: FnOnce(&mut ParserRegistry) -> T,
{
    let mut registry = GLOBAL_PARSERS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    configure(&mut registry)
}

pub fn reset_global_parsers() {
    configure_global_parsers(ParserRegistry::reset_to_default);
}
