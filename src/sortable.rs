use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    /// Re-selecting a descending column flips it to ascending; anything else
    /// (a new column, or an ascending one) sorts descending.
    pub fn next(&self, key: &str) -> SortState {
        let direction = if self.key == key && self.direction == SortDirection::Descending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        };
        SortState::new(key, direction)
    }

    pub fn indicator(&self, key: &str) -> &'static str {
        if self.key != key {
            return "";
        }
        match self.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Comparable form of a cell. Text is case-folded on construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    pub fn number(v: f64) -> Self {
        SortValue::Number(if v.is_finite() { v } else { 0.0 })
    }

    pub fn text(s: &str) -> Self {
        SortValue::Text(s.to_lowercase())
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Rows that know how to expose a sortable value per column key. Unknown keys and
/// malformed cells must still produce a value (0 or empty text), never fail.
pub trait SortableRow {
    fn sort_value(&self, key: &str) -> SortValue;
}

/// Stable sort of `rows` by `key`, returning the reordered rows and the new state.
pub fn sort_by_key<T, F>(rows: &[T], key: &str, previous: &SortState, extract: F) -> (Vec<T>, SortState)
where
    T: Clone,
    F: Fn(&T, &str) -> SortValue,
{
    let next = previous.next(key);
    let mut keyed: Vec<(SortValue, T)> = rows
        .iter()
        .map(|row| (extract(row, key), row.clone()))
        .collect();
    // `sort_by` is stable; equal rows keep their input order in both directions.
    match next.direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.compare(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.compare(&a.0)),
    }
    (keyed.into_iter().map(|(_, row)| row).collect(), next)
}

pub fn sort_rows<T: SortableRow + Clone>(
    rows: &[T],
    key: &str,
    previous: &SortState,
) -> (Vec<T>, SortState) {
    sort_by_key(rows, key, previous, |row, key| row.sort_value(key))
}

/// Rows plus the sort state that produced their order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedTable<T> {
    pub rows: Vec<T>,
    pub sort: SortState,
}

impl<T: SortableRow + Clone> SortedTable<T> {
    /// Rows are taken in the order given; `initial` only describes that order.
    pub fn new(rows: Vec<T>, initial: SortState) -> Self {
        Self {
            rows,
            sort: initial,
        }
    }

    pub fn sort(&mut self, key: &str) {
        let (rows, next) = sort_rows(&self.rows, key, &self.sort);
        self.rows = rows;
        self.sort = next;
    }
}
