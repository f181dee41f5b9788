use crate::{
    data::{ColumnType, Value},
    frame::Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Value,
    Group,
    Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Value(ValueColumn),
    Group(ColumnGroup),
    Frame(FrameColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn {
    name: String,
    ty: ColumnType,
    nullable: bool,
    values: Vec<Option<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnGroup {
    name: String,
    frame: Frame,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameColumn {
    name: String,
    frames: Vec<Frame>,
}

impl ValueColumn {
    /// Builds a column; nullability is derived from the cells.
    pub fn new(name: impl Into<String>, ty: ColumnType, values: Vec<Option<Value>>) -> Self {
        let nullable = values.iter().any(Option::is_none);
        Self {
            name: name.into(),
            ty,
            nullable,
            values,
        }
    }

    pub(crate) fn with_nullability(
        name: impl Into<String>,
        ty: ColumnType,
        nullable: bool,
        values: Vec<Option<Value>>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable,
            values,
        }
    }

    /// Convenience constructor for raw string data; `None` cells are null.
    pub fn strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|value| value.map(|s| Value::String(s.into())))
            .collect();
        Self::new(name, ColumnType::String, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Option<Value>> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ColumnGroup {
    pub fn new(name: impl Into<String>, frame: Frame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }
}

impl FrameColumn {
    pub fn new(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl Column {
    pub fn name(&self) -> &str {
        match self {
            Column::Value(column) => column.name(),
            Column::Group(group) => group.name(),
            Column::Frame(column) => column.name(),
        }
    }

    pub fn rename(self, name: impl Into<String>) -> Column {
        let name = name.into();
        match self {
            Column::Value(column) => Column::Value(ValueColumn { name, ..column }),
            Column::Group(group) => Column::Group(ColumnGroup { name, ..group }),
            Column::Frame(column) => Column::Frame(FrameColumn { name, ..column }),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Value(_) => ColumnKind::Value,
            Column::Group(_) => ColumnKind::Group,
            Column::Frame(_) => ColumnKind::Frame,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Value(column) => column.len(),
            Column::Group(group) => group.frame().row_count(),
            Column::Frame(column) => column.frames().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Value(column) => column.column_type().clone(),
            Column::Group(_) => ColumnType::Row,
            Column::Frame(_) => ColumnType::Frame,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Column::Value(column) => column.is_nullable(),
            Column::Group(_) | Column::Frame(_) => false,
        }
    }

    pub fn cell(&self, index: usize) -> Option<Value> {
        match self {
            Column::Value(column) => column.get(index).cloned(),
            Column::Group(group) => group.frame().row(index).map(Value::Row),
            Column::Frame(column) => column.frames().get(index).cloned().map(Value::Frame),
        }
    }

    pub fn as_group(&self) -> Option<&ColumnGroup> {
        match self {
            Column::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&ValueColumn> {
        match self {
            Column::Value(column) => Some(column),
            _ => None,
        }
    }

    pub fn as_frame_column(&self) -> Option<&FrameColumn> {
        match self {
            Column::Frame(column) => Some(column),
            _ => None,
        }
    }
}

impl From<ValueColumn> for Column {
    fn from(column: ValueColumn) -> Self {
        Column::Value(column)
    }
}

impl From<ColumnGroup> for Column {
    fn from(group: ColumnGroup) -> Self {
        Column::Group(group)
    }
}

impl From<FrameColumn> for Column {
    fn from(column: FrameColumn) -> Self {
        Column::Frame(column)
    }
}
