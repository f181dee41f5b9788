use std::collections::HashSet;

use crate::{
    collector::{DataCollector, TypedCollector},
    column::{Column, ColumnGroup, FrameColumn, ValueColumn},
    data::{ColumnType, Value},
    error::{FrameError, FrameResult},
    insert::{ColumnToInsert, insert_columns},
    path::ColumnPath,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
    row_count: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> FrameResult<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    /// Builds a frame with an explicit row count, which also covers frames
    /// that have rows but no columns.
    pub fn with_row_count(columns: Vec<Column>, row_count: usize) -> FrameResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(FrameError::DuplicateColumn {
                    name: column.name().to_string(),
                });
            }
            if column.len() != row_count {
                return Err(FrameError::LengthMismatch {
                    name: column.name().to_string(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, row_count })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, path: &ColumnPath) -> FrameResult<&Column> {
        let mut frame = self;
        let last = path.len() - 1;
        for (depth, segment) in path.segments().iter().enumerate() {
            let column = frame
                .column(segment)
                .ok_or_else(|| FrameError::ColumnNotFound {
                    path: path.prefix(depth + 1),
                })?;
            if depth == last {
                return Ok(column);
            }
            frame = column
                .as_group()
                .map(ColumnGroup::frame)
                .ok_or_else(|| FrameError::NotAColumnGroup {
                    path: path.prefix(depth + 1),
                })?;
        }
        Err(FrameError::EmptyPath)
    }

    pub fn row(&self, index: usize) -> Option<Frame> {
        if index >= self.row_count {
            return None;
        }
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let sliced = match column {
                Column::Value(values) => Column::Value(ValueColumn::with_nullability(
                    values.name(),
                    values.column_type().clone(),
                    values.is_nullable(),
                    vec![values.get(index).cloned()],
                )),
                Column::Group(group) => {
                    Column::Group(ColumnGroup::new(group.name(), group.frame().row(index)?))
                }
                Column::Frame(frames) => Column::Frame(FrameColumn::new(
                    frames.name(),
                    vec![frames.frames().get(index)?.clone()],
                )),
            };
            columns.push(sliced);
        }
        Some(Self {
            columns,
            row_count: 1,
        })
    }

    /// Vertical concatenation. Columns appear in first-seen order and are
    /// null-filled where a frame lacks them.
    pub fn concat(frames: &[Frame]) -> FrameResult<Frame> {
        let pieces = frames
            .iter()
            .map(|frame| (frame.row_count(), Some(frame)))
            .collect::<Vec<_>>();
        concat_pieces(&pieces)
    }

    /// Concatenates one-row frames; `None` entries become all-null rows.
    pub(crate) fn concat_rows(rows: &[Option<Frame>]) -> FrameResult<Frame> {
        let pieces = rows
            .iter()
            .map(|row| match row {
                Some(frame) => (frame.row_count(), Some(frame)),
                None => (1, None),
            })
            .collect::<Vec<_>>();
        concat_pieces(&pieces)
    }

    pub fn insert(self, path: ColumnPath, column: Column) -> FrameResult<Frame> {
        insert_columns(Some(self), vec![ColumnToInsert::new(path, column)], None)
    }

    /// Paths of every value and frame column, depth first.
    pub fn leaf_paths(&self) -> Vec<ColumnPath> {
        let mut paths = Vec::new();
        collect_leaf_paths(self, &[], &mut paths);
        paths
    }
}

fn collect_leaf_paths(frame: &Frame, prefix: &[String], out: &mut Vec<ColumnPath>) {
    for column in frame.columns() {
        let mut segments = prefix.to_vec();
        segments.push(column.name().to_string());
        match column {
            Column::Group(group) => collect_leaf_paths(group.frame(), &segments, out),
            Column::Value(_) | Column::Frame(_) => {
                if let Ok(path) = ColumnPath::new(segments) {
                    out.push(path);
                }
            }
        }
    }
}

fn concat_pieces(pieces: &[(usize, Option<&Frame>)]) -> FrameResult<Frame> {
    let total = pieces.iter().map(|(len, _)| *len).sum();
    let mut names: Vec<&str> = Vec::new();
    for (_, frame) in pieces {
        for column in frame.iter().flat_map(|frame| frame.columns()) {
            if !names.contains(&column.name()) {
                names.push(column.name());
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let present = pieces
            .iter()
            .filter_map(|(_, frame)| frame.and_then(|frame| frame.column(name)))
            .collect::<Vec<_>>();
        let cells = pieces.iter().flat_map(|(len, frame)| {
            let column = frame.and_then(|frame| frame.column(name));
            (0..*len).map(move |index| column.and_then(|column| column.cell(index)))
        });
        let shared_type = present
            .first()
            .map(|column| column.column_type())
            .filter(|ty| present.iter().all(|column| column.column_type() == *ty));
        let column = match shared_type {
            Some(ty) if ty != ColumnType::Any => {
                let mut collector = TypedCollector::new(ty, false);
                for cell in cells {
                    collector.push(cell)?;
                }
                collector.finalize(name)?
            }
            _ => {
                let mut collector = DataCollector::with_capacity(total);
                cells.for_each(|cell: Option<Value>| collector.push(cell));
                collector.finalize(name)?
            }
        };
        columns.push(column);
    }
    Frame::with_row_count(columns, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(name: &str, values: &[i32]) -> Column {
        Column::Value(ValueColumn::new(
            name,
            ColumnType::Int,
            values.iter().map(|v| Some(Value::Int(*v))).collect(),
        ))
    }

    #[test]
    fn new_rejects_duplicate_names_and_ragged_columns() {
        assert!(matches!(
            Frame::new(vec![ints("a", &[1]), ints("a", &[2])]),
            Err(FrameError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            Frame::new(vec![ints("a", &[1]), ints("b", &[2, 3])]),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn get_walks_column_groups() {
        let inner = Frame::new(vec![ints("b", &[1, 2])]).unwrap();
        let frame = Frame::new(vec![Column::Group(ColumnGroup::new("a", inner))]).unwrap();
        let path = ColumnPath::new(["a", "b"]).unwrap();
        assert_eq!(frame.get(&path).unwrap().name(), "b");
        assert!(matches!(
            frame.get(&ColumnPath::new(["a", "c"]).unwrap()),
            Err(FrameError::ColumnNotFound { path }) if path == "a.c"
        ));
        assert!(matches!(
            frame.get(&ColumnPath::new(["a", "b", "c"]).unwrap()),
            Err(FrameError::NotAColumnGroup { path }) if path == "a.b"
        ));
    }

    #[test]
    fn concat_null_fills_missing_columns() {
        let left = Frame::new(vec![ints("a", &[1]), ints("b", &[2])]).unwrap();
        let right = Frame::new(vec![ints("b", &[3]), ints("c", &[4])]).unwrap();
        let joined = Frame::concat(&[left, right]).unwrap();
        assert_eq!(joined.names(), ["a", "b", "c"]);
        assert_eq!(joined.row_count(), 2);
        let a = joined.column("a").unwrap();
        assert_eq!(a.column_type(), ColumnType::Int);
        assert!(a.is_nullable());
        assert_eq!(a.cell(1), None);
        assert!(!joined.column("b").unwrap().is_nullable());
    }

    #[test]
    fn row_slices_every_column_kind() {
        let inner = Frame::new(vec![ints("x", &[7, 8])]).unwrap();
        let frame = Frame::new(vec![
            ints("a", &[1, 2]),
            Column::Group(ColumnGroup::new("g", inner)),
        ])
        .unwrap();
        let row = frame.row(1).unwrap();
        assert_eq!(row.row_count(), 1);
        assert_eq!(row.column("a").unwrap().cell(0), Some(Value::Int(2)));
        let leaf = row.get(&ColumnPath::new(["g", "x"]).unwrap()).unwrap();
        assert_eq!(leaf.cell(0), Some(Value::Int(8)));
        assert!(frame.row(2).is_none());
    }
}
