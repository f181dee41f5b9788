#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use nested_frame::{Column, ColumnGroup, ColumnPath, ColumnType, Frame, Value, ValueColumn};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn path(dotted: &str) -> ColumnPath {
    ColumnPath::parse(dotted, '.').expect("valid path")
}

pub fn ints(name: &str, values: &[i32]) -> Column {
    Column::Value(ValueColumn::new(
        name,
        ColumnType::Int,
        values.iter().map(|v| Some(Value::Int(*v))).collect(),
    ))
}

pub fn strings(name: &str, values: &[Option<&str>]) -> Column {
    Column::Value(ValueColumn::strings(name, values.iter().copied()))
}

pub fn group(name: &str, columns: Vec<Column>) -> Column {
    Column::Group(ColumnGroup::new(
        name,
        Frame::new(columns).expect("valid group"),
    ))
}

/// `a`, `b`, `g.{x, y}`, `c` with one row each.
pub fn sample_frame() -> Frame {
    Frame::new(vec![
        ints("a", &[1]),
        ints("b", &[2]),
        group("g", vec![ints("x", &[3]), ints("y", &[4])]),
        ints("c", &[5]),
    ])
    .expect("valid frame")
}

/// Names of every column, groups rendered as `name(children)`.
pub fn layout(frame: &Frame) -> String {
    frame
        .columns()
        .iter()
        .map(|column| match column {
            Column::Group(group) => format!("{}({})", group.name(), layout(group.frame())),
            other => other.name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
