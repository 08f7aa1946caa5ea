// src/processing/regionprops/table.rs
use std::fmt;

/// A single table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Cell {
    /// Integers without a decimal point, reals always with one, NaN as an
    /// empty field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Float(value) if value.is_nan() => Ok(()),
            Cell::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// Value of one property for one region.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl PropertyValue {
    pub fn into_cells(self) -> Vec<Cell> {
        match self {
            PropertyValue::Int(value) => vec![Cell::Int(value)],
            PropertyValue::Float(value) => vec![Cell::Float(value)],
            PropertyValue::Ints(values) => values.into_iter().map(Cell::Int).collect(),
            PropertyValue::Floats(values) => values.into_iter().map(Cell::Float).collect(),
        }
    }
}

/// Region-property table: one row per region, `label` in the first column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl PropertyTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
