use itertools::Itertools;
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
    collector::DataCollector,
    data::Value,
    error::FrameResult,
    frame::Frame,
};

/// Column name used when an array holds scalars instead of objects.
pub const VALUE_COLUMN: &str = "value";

/// Reads a JSON document into a frame.
///
/// An array of objects becomes one row per object, an array of scalars a
/// single [`VALUE_COLUMN`] column and a lone object a one-row frame. Any
/// other top-level value is read as a one-row [`VALUE_COLUMN`] frame.
pub fn read_json_str(text: &str) -> FrameResult<Frame> {
    let document: JsonValue = serde_json::from_str(text)?;
    read_json_value(&document)
}

fn read_json_value(document: &JsonValue) -> FrameResult<Frame> {
    match document {
        JsonValue::Array(items) => read_array(items),
        JsonValue::Object(object) => read_records(&[Some(object)]),
        scalar => read_scalars(std::slice::from_ref(scalar)),
    }
}

fn read_array(items: &[JsonValue]) -> FrameResult<Frame> {
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Object(object) => records.push(Some(object)),
            JsonValue::Null => records.push(None),
            _ => return read_scalars(items),
        }
    }
    // an array of nulls only has no fields to turn into columns
    if records.iter().all(Option::is_none) && !records.is_empty() {
        return read_scalars(items);
    }
    read_records(&records)
}

fn read_records(records: &[Option<&Map<String, JsonValue>>]) -> FrameResult<Frame> {
    let keys = records
        .iter()
        .flatten()
        .flat_map(|object| object.keys())
        .unique()
        .collect::<Vec<_>>();

    let mut columns = Vec::with_capacity(keys.len());
    for key in keys {
        let mut collector = DataCollector::with_capacity(records.len());
        for record in records {
            let cell = match record.and_then(|object| object.get(key)) {
                Some(value) => convert_value(value)?,
                None => None,
            };
            collector.push(cell);
        }
        columns.push(collector.finalize(key)?);
    }
    Frame::with_row_count(columns, records.len())
}

fn read_scalars(items: &[JsonValue]) -> FrameResult<Frame> {
    let mut collector = DataCollector::with_capacity(items.len());
    for item in items {
        collector.push(convert_value(item)?);
    }
    let column = collector.finalize(VALUE_COLUMN)?;
    Frame::with_row_count(vec![column], items.len())
}

fn convert_value(value: &JsonValue) -> FrameResult<Option<Value>> {
    let converted = match value {
        JsonValue::Null => None,
        JsonValue::Bool(flag) => Some(Value::Boolean(*flag)),
        JsonValue::Number(number) => Some(convert_number(number)),
        JsonValue::String(text) => Some(Value::String(text.clone())),
        JsonValue::Array(items) => Some(Value::Frame(read_array(items)?)),
        JsonValue::Object(object) => Some(Value::Row(read_records(&[Some(object)])?)),
    };
    Ok(converted)
}

fn convert_number(number: &Number) -> Value {
    if let Some(integer) = number.as_i64() {
        return match i32::try_from(integer) {
            Ok(small) => Value::Int(small),
            Err(_) => Value::Long(integer),
        };
    }
    Value::Double(number.as_f64().unwrap_or(f64::NAN))
}
