use log::debug;
use rayon::prelude::*;

use crate::{
    column::{Column, ColumnGroup, FrameColumn},
    error::FrameResult,
    frame::Frame,
    options::ParserOptions,
    parser::ParserRegistry,
};

/// Runs [`ParserRegistry::try_parse`] on every string column of `frame`,
/// descending into column groups and into the frames of frame columns.
///
/// Columns are parsed concurrently and keep their order; the first error is
/// returned.
pub fn parse_frame(
    frame: Frame,
    registry: &ParserRegistry,
    options: Option<&ParserOptions>,
) -> FrameResult<Frame> {
    let row_count = frame.row_count();
    debug!(
        "Parsing {} column(s) across {} row(s)",
        frame.column_count(),
        row_count
    );
    let columns = frame
        .into_columns()
        .into_par_iter()
        .map(|column| parse_column(column, registry, options))
        .collect::<FrameResult<Vec<_>>>()?;
    Frame::with_row_count(columns, row_count)
}

fn parse_column(
    column: Column,
    registry: &ParserRegistry,
    options: Option<&ParserOptions>,
) -> FrameResult<Column> {
    match column {
        Column::Value(_) => registry.try_parse(column, options),
        Column::Group(group) => {
            let name = group.name().to_string();
            let inner = parse_frame(group.into_frame(), registry, options)?;
            Ok(Column::Group(ColumnGroup::new(name, inner)))
        }
        Column::Frame(frames) => {
            let name = frames.name().to_string();
            let parsed = frames
                .into_frames()
                .into_par_iter()
                .map(|frame| parse_frame(frame, registry, options))
                .collect::<FrameResult<Vec<_>>>()?;
            Ok(Column::Frame(FrameColumn::new(name, parsed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        column::ValueColumn,
        data::{ColumnType, Value},
    };

    fn strings(name: &str, values: &[&str]) -> Column {
        Column::Value(ValueColumn::strings(name, values.iter().map(|v| Some(*v))))
    }

    #[test]
    fn nested_columns_are_parsed_in_place() {
        let inner = Frame::new(vec![strings("x", &["1", "2"]), strings("y", &["a", "b"])]).unwrap();
        let nested = Frame::new(vec![strings("z", &["true"])]).unwrap();
        let frame = Frame::new(vec![
            strings("a", &["1.5", "2"]),
            Column::Group(ColumnGroup::new("g", inner)),
            Column::Frame(FrameColumn::new("f", vec![nested, Frame::empty()])),
        ])
        .unwrap();

        let parsed = parse_frame(frame, &ParserRegistry::new(), None).unwrap();
        assert_eq!(parsed.names(), ["a", "g", "f"]);
        assert_eq!(parsed.column("a").unwrap().column_type(), ColumnType::Double);
        let group = parsed.column("g").and_then(Column::as_group).unwrap();
        assert_eq!(group.frame().column("x").unwrap().cell(1), Some(Value::Int(2)));
        assert_eq!(group.frame().column("y").unwrap().column_type(), ColumnType::String);
        let frames = parsed.column("f").and_then(Column::as_frame_column).unwrap();
        assert_eq!(
            frames.frames()[0].column("z").unwrap().cell(0),
            Some(Value::Boolean(true))
        );
    }
}
