use crate::{
    column::{Column, ColumnGroup, FrameColumn, ValueColumn},
    data::{ColumnType, Value},
    error::{FrameError, FrameResult},
    frame::Frame,
};

#[derive(Debug, Clone, Default)]
pub struct DataCollector {
    values: Vec<Option<Value>>,
    has_nulls: bool,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            has_nulls: false,
        }
    }

    pub fn push(&mut self, value: Option<Value>) {
        if value.is_none() {
            self.has_nulls = true;
        }
        self.values.push(value);
    }

    pub fn push_value(&mut self, value: impl Into<Value>) {
        self.push(Some(value.into()));
    }

    pub fn push_null(&mut self) {
        self.push(None);
    }

    /// True once any null was pushed.
    pub fn has_nulls(&self) -> bool {
        self.has_nulls
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    /// Common type of the non-null values collected so far.
    pub fn inferred_type(&self) -> ColumnType {
        let mut seen: Vec<ColumnType> = Vec::new();
        for value in self.values.iter().flatten() {
            let ty = value.column_type();
            if !seen.contains(&ty) {
                seen.push(ty);
            }
        }
        match seen.as_slice() {
            [] => ColumnType::Any,
            [single] => single.clone(),
            many if many
                .iter()
                .all(|ty| matches!(ty, ColumnType::Int | ColumnType::Long)) =>
            {
                ColumnType::Long
            }
            many if many.iter().all(|ty| {
                matches!(ty, ColumnType::Int | ColumnType::Long | ColumnType::Double)
            }) =>
            {
                ColumnType::Double
            }
            _ => ColumnType::Any,
        }
    }

    pub fn finalize(self, name: impl Into<String>) -> FrameResult<Column> {
        let ty = self.inferred_type();
        let values = match ty {
            ColumnType::Long | ColumnType::Double => self
                .values
                .into_iter()
                .map(|value| value.map(|value| widen(value, &ty)))
                .collect(),
            _ => self.values,
        };
        build_column(name.into(), ty, values, self.has_nulls)
    }
}

/// Collector for a declared element type.
#[derive(Debug, Clone)]
pub struct TypedCollector {
    ty: ColumnType,
    check_types: bool,
    values: Vec<Option<Value>>,
    has_nulls: bool,
}

impl TypedCollector {
    /// With `check_types == false` values are trusted to match `ty`.
    pub fn new(ty: ColumnType, check_types: bool) -> Self {
        Self {
            ty,
            check_types,
            values: Vec::new(),
            has_nulls: false,
        }
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    pub fn push(&mut self, value: Option<Value>) -> FrameResult<()> {
        match value {
            None => {
                self.has_nulls = true;
                self.values.push(None);
            }
            Some(value) => {
                if self.check_types && !self.ty.accepts(&value) {
                    return Err(FrameError::TypeMismatch {
                        value: value.as_display(),
                        actual: value.column_type(),
                        expected: self.ty.clone(),
                    });
                }
                self.values.push(Some(value));
            }
        }
        Ok(())
    }

    pub fn push_value(&mut self, value: impl Into<Value>) -> FrameResult<()> {
        self.push(Some(value.into()))
    }

    pub fn push_null(&mut self) {
        self.has_nulls = true;
        self.values.push(None);
    }

    pub fn has_nulls(&self) -> bool {
        self.has_nulls
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn finalize(self, name: impl Into<String>) -> FrameResult<Column> {
        build_column(name.into(), self.ty, self.values, self.has_nulls)
    }
}

fn widen(value: Value, ty: &ColumnType) -> Value {
    match (value, ty) {
        (Value::Int(i), ColumnType::Long) => Value::Long(i64::from(i)),
        (Value::Int(i), ColumnType::Double) => Value::Double(f64::from(i)),
        (Value::Long(l), ColumnType::Double) => Value::Double(l as f64),
        (other, _) => other,
    }
}

fn build_column(
    name: String,
    ty: ColumnType,
    values: Vec<Option<Value>>,
    has_nulls: bool,
) -> FrameResult<Column> {
    match ty {
        ColumnType::Row => {
            let rows = values
                .into_iter()
                .map(|value| match value {
                    Some(Value::Row(row)) => Some(row),
                    _ => None,
                })
                .collect::<Vec<_>>();
            let frame = Frame::concat_rows(&rows)?;
            Ok(Column::Group(ColumnGroup::new(name, frame)))
        }
        ColumnType::Frame => {
            let frames = values
                .into_iter()
                .map(|value| match value {
                    Some(Value::Frame(frame)) => frame,
                    _ => Frame::empty(),
                })
                .collect();
            Ok(Column::Frame(FrameColumn::new(name, frames)))
        }
        ty => Ok(Column::Value(ValueColumn::with_nullability(
            name, ty, has_nulls, values,
        ))),
    }
}
