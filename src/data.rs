use std::fmt;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use url::Url;

use crate::frame::Frame;

const CUSTOM_PREFIX: &str = "custom:";

/// Element type of a column.
///
/// The order of the variants is only used for set membership; parser
/// priority is defined by the registry, not by this ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    Int,
    Long,
    Instant,
    LocalDateTime,
    LocalDate,
    Duration,
    LocalTime,
    Url,
    Double,
    Boolean,
    Decimal,
    /// Cells are independent nested frames.
    Frame,
    /// Cells are rows of a nested frame.
    Row,
    String,
    /// Mixed or unknown element type.
    Any,
    /// Result type of a user-registered parser.
    Custom(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Long => "long",
            ColumnType::Instant => "instant",
            ColumnType::LocalDateTime => "datetime",
            ColumnType::LocalDate => "date",
            ColumnType::Duration => "duration",
            ColumnType::LocalTime => "time",
            ColumnType::Url => "url",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Decimal => "decimal",
            ColumnType::Frame => "frame",
            ColumnType::Row => "row",
            ColumnType::String => "string",
            ColumnType::Any => "any",
            ColumnType::Custom(name) => name,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "int",
            "long",
            "instant",
            "datetime",
            "date",
            "duration",
            "time",
            "url",
            "double",
            "boolean",
            "decimal",
            "frame",
            "row",
            "string",
            "any",
            "custom:<name>",
        ]
    }

    pub fn token(&self) -> String {
        match self {
            ColumnType::Custom(name) => format!("{CUSTOM_PREFIX}{name}"),
            other => other.as_str().to_string(),
        }
    }

    /// Returns true if `value` may be stored in a column of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ColumnType::Any | ColumnType::Custom(_) => true,
            expected => value.column_type() == *expected,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, ColumnType::Frame | ColumnType::Row)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(name) = trimmed.strip_prefix(CUSTOM_PREFIX) {
            let name = name.trim();
            if name.is_empty() {
                return Err(anyhow!("Custom column type requires a name, e.g. custom:percent"));
            }
            return Ok(ColumnType::Custom(name.to_string()));
        }
        let normalized = trimmed.to_ascii_lowercase();
        match normalized.as_str() {
            "int" | "integer" | "i32" => Ok(ColumnType::Int),
            "long" | "i64" => Ok(ColumnType::Long),
            "instant" | "timestamp" => Ok(ColumnType::Instant),
            "datetime" | "date-time" | "localdatetime" => Ok(ColumnType::LocalDateTime),
            "date" | "localdate" => Ok(ColumnType::LocalDate),
            "duration" => Ok(ColumnType::Duration),
            "time" | "localtime" => Ok(ColumnType::LocalTime),
            "url" => Ok(ColumnType::Url),
            "double" | "float" | "f64" => Ok(ColumnType::Double),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "decimal" => Ok(ColumnType::Decimal),
            "frame" => Ok(ColumnType::Frame),
            "row" => Ok(ColumnType::Row),
            "string" => Ok(ColumnType::String),
            "any" => Ok(ColumnType::Any),
            _ => Err(anyhow!(
                "Unknown column type '{value}'. Supported types: {}",
                ColumnType::variants().join(", ")
            )),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.token())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token
            .parse::<ColumnType>()
            .map_err(|err| de::Error::custom(err.to_string()))
    }
}

/// A single non-null cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Instant(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    Duration(TimeDelta),
    LocalTime(NaiveTime),
    Url(Url),
    Double(f64),
    Boolean(bool),
    Decimal(Decimal),
    String(String),
    /// A one-row frame.
    Row(Frame),
    Frame(Frame),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Long(_) => ColumnType::Long,
            Value::Instant(_) => ColumnType::Instant,
            Value::LocalDateTime(_) => ColumnType::LocalDateTime,
            Value::LocalDate(_) => ColumnType::LocalDate,
            Value::Duration(_) => ColumnType::Duration,
            Value::LocalTime(_) => ColumnType::LocalTime,
            Value::Url(_) => ColumnType::Url,
            Value::Double(_) => ColumnType::Double,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Decimal(_) => ColumnType::Decimal,
            Value::String(_) => ColumnType::String,
            Value::Row(_) => ColumnType::Row,
            Value::Frame(_) => ColumnType::Frame,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Long(l) => l.to_string(),
            Value::Instant(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::LocalDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Value::LocalDate(d) => d.format("%Y-%m-%d").to_string(),
            Value::Duration(d) => d.to_string(),
            Value::LocalTime(t) => t.format("%H:%M:%S%.f").to_string(),
            Value::Url(u) => u.as_str().to_string(),
            Value::Double(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Row(row) => render_row(row),
            Value::Frame(frame) => format!("[{} x {}]", frame.row_count(), frame.column_count()),
        }
    }
}

fn render_row(row: &Frame) -> String {
    let fields = row
        .columns()
        .iter()
        .map(|column| {
            let cell = column
                .cell(0)
                .map(|value| value.as_display())
                .unwrap_or_else(|| "null".to_string());
            format!("{}: {cell}", column.name())
        })
        .collect::<Vec<_>>();
    format!("{{{}}}", fields.join(", "))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

macro_rules! impl_value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_value_from! {
    i32 => Int,
    i64 => Long,
    f64 => Double,
    bool => Boolean,
    String => String,
    Decimal => Decimal,
    NaiveDate => LocalDate,
    NaiveDateTime => LocalDateTime,
    NaiveTime => LocalTime,
    DateTime<Utc> => Instant,
    TimeDelta => Duration,
    Url => Url,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}
