use chrono::NaiveTime;
use rust_decimal::Decimal;

use crate::{
    collector::TypedCollector,
    column::Column,
    data::{ColumnType, Value},
    error::{FrameError, FrameResult},
    options::ParserOptions,
    parser::ParserRegistry,
};

/// Converts `column` to `target`.
///
/// String columns are parsed with the registry's parser for `target`.
/// Other columns support numeric widening, the lossless temporal
/// conversions and conversion of anything to `String`.
pub fn convert_column(
    column: Column,
    target: &ColumnType,
    registry: &ParserRegistry,
    options: Option<&ParserOptions>,
) -> FrameResult<Column> {
    if column.column_type() == *target {
        return Ok(column);
    }
    if column.column_type() == ColumnType::String {
        return registry.parse(column, target, options);
    }

    let mut collector = TypedCollector::new(target.clone(), false);
    for index in 0..column.len() {
        let converted = match column.cell(index) {
            Some(value) => Some(convert_value(value, target)?),
            None => None,
        };
        collector.push(converted)?;
    }
    collector.finalize(column.name())
}

fn convert_value(value: Value, target: &ColumnType) -> FrameResult<Value> {
    if target.accepts(&value) {
        return Ok(value);
    }
    let converted = match (&value, target) {
        (_, ColumnType::String) => Some(Value::String(value.as_display())),
        (Value::Int(i), ColumnType::Long) => Some(Value::Long(i64::from(*i))),
        (Value::Int(i), ColumnType::Double) => Some(Value::Double(f64::from(*i))),
        (Value::Int(i), ColumnType::Decimal) => Some(Value::Decimal(Decimal::from(*i))),
        (Value::Long(l), ColumnType::Double) => Some(Value::Double(*l as f64)),
        (Value::Long(l), ColumnType::Decimal) => Some(Value::Decimal(Decimal::from(*l))),
        (Value::Double(d), ColumnType::Decimal) => Decimal::try_from(*d).ok().map(Value::Decimal),
        (Value::LocalDateTime(dt), ColumnType::LocalDate) => Some(Value::LocalDate(dt.date())),
        (Value::LocalDateTime(dt), ColumnType::LocalTime) => Some(Value::LocalTime(dt.time())),
        (Value::Instant(ts), ColumnType::LocalDateTime) => {
            Some(Value::LocalDateTime(ts.naive_utc()))
        }
        (Value::LocalDate(d), ColumnType::LocalDateTime) => {
            Some(Value::LocalDateTime(d.and_time(NaiveTime::MIN)))
        }
        _ => None,
    };
    converted.ok_or_else(|| FrameError::TypeConversion {
        value: value.as_display(),
        from: value.column_type(),
        to: target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ValueColumn;
    use chrono::NaiveDate;

    fn column(ty: ColumnType, values: Vec<Option<Value>>) -> Column {
        Column::Value(ValueColumn::new("c", ty, values))
    }

    #[test]
    fn integers_widen() {
        let registry = ParserRegistry::new();
        let source = column(ColumnType::Int, vec![Some(Value::Int(2)), None]);
        let converted = convert_column(source, &ColumnType::Double, &registry, None).unwrap();
        assert_eq!(converted.cell(0), Some(Value::Double(2.0)));
        assert!(converted.is_nullable());
    }

    #[test]
    fn dates_become_midnight_date_times() {
        let registry = ParserRegistry::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let source = column(ColumnType::LocalDate, vec![Some(Value::LocalDate(date))]);
        let converted =
            convert_column(source, &ColumnType::LocalDateTime, &registry, None).unwrap();
        assert_eq!(
            converted.cell(0),
            Some(Value::LocalDateTime(date.and_hms_opt(0, 0, 0).unwrap()))
        );
    }

    #[test]
    fn strings_go_through_the_parser() {
        let registry = ParserRegistry::new();
        let source = Column::Value(ValueColumn::strings("c", [Some("1.5")]));
        let converted = convert_column(source, &ColumnType::Decimal, &registry, None).unwrap();
        assert_eq!(converted.column_type(), ColumnType::Decimal);
    }

    #[test]
    fn narrowing_is_rejected() {
        let registry = ParserRegistry::new();
        let source = column(ColumnType::Double, vec![Some(Value::Double(1.5))]);
        let err = convert_column(source, &ColumnType::Int, &registry, None).unwrap_err();
        assert!(matches!(
            err,
            FrameError::TypeConversion { from: ColumnType::Double, to: ColumnType::Int, .. }
        ));
    }

    #[test]
    fn anything_converts_to_string() {
        let registry = ParserRegistry::new();
        let source = column(ColumnType::Boolean, vec![Some(Value::Boolean(true))]);
        let converted = convert_column(source, &ColumnType::String, &registry, None).unwrap();
        assert_eq!(converted.cell(0), Some(Value::from("true")));
    }
}
