//! Feature matrix: the typed, immutable input of a run
//!
//! Rows are entities, columns are numeric features. Entity identifiers live in
//! an ordered side index; row position is the node id used by the graph
//! stages.

use crate::error::{PipelineError, PipelineResult};
use indexmap::IndexSet;
use ndarray::{Array2, ArrayView1};

/// Ordered, uniquely identified rows of fixed-length numeric vectors
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    ids: IndexSet<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Build from entity ids and row vectors.
    ///
    /// Requires at least one row and one column, equal row lengths, unique
    /// ids and finite values.
    pub fn new(ids: Vec<String>, rows: Vec<Vec<f64>>) -> PipelineResult<Self> {
        if ids.len() != rows.len() {
            return Err(PipelineError::validation(
                "ids",
                ids.len(),
                format!("expected one id per row ({} rows)", rows.len()),
            ));
        }
        let width = rows.first().map_or(0, Vec::len);
        if let Some((pos, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(PipelineError::validation(
                format!("row {}", pos),
                row.len(),
                format!("expected {} features", width),
            ));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((ids.len(), width), flat).map_err(|e| {
            PipelineError::validation("rows", ids.len(), e.to_string())
        })?;

        Self::from_array(ids, values)
    }

    /// Build from row vectors, using row positions ("0", "1", ...) as ids
    pub fn from_rows_positional(rows: Vec<Vec<f64>>) -> PipelineResult<Self> {
        let ids = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::new(ids, rows)
    }

    /// Build from an N x F array
    pub fn from_array(ids: Vec<String>, values: Array2<f64>) -> PipelineResult<Self> {
        let (rows, cols) = values.dim();
        if rows == 0 {
            return Err(PipelineError::validation("rows", 0, "dataset has no rows"));
        }
        if cols == 0 {
            return Err(PipelineError::validation("columns", 0, "dataset has no features"));
        }
        if ids.len() != rows {
            return Err(PipelineError::validation(
                "ids",
                ids.len(),
                format!("expected one id per row ({} rows)", rows),
            ));
        }

        let mut unique = IndexSet::with_capacity(rows);
        for id in ids {
            if unique.contains(&id) {
                return Err(PipelineError::validation("id", id, "identifiers must be unique"));
            }
            unique.insert(id);
        }

        if let Some(((r, c), v)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::validation(
                format!("value at row {} column {}", r, c),
                v,
                "missing or non-finite values are not allowed",
            ));
        }

        let columns = (0..cols).map(|c| format!("column{}", c)).collect();
        Ok(Self {
            ids: unique,
            columns,
            values,
        })
    }

    /// Replace the generated column names
    pub fn with_column_names(mut self, names: Vec<String>) -> PipelineResult<Self> {
        if names.len() != self.column_count() {
            return Err(PipelineError::validation(
                "column names",
                names.len(),
                format!("expected {} names", self.column_count()),
            ));
        }
        self.columns = names;
        Ok(self)
    }

    /// Same rows and ids with new values; used by transforms
    pub(crate) fn derive(&self, values: Array2<f64>, columns: Vec<String>) -> Self {
        debug_assert_eq!(values.nrows(), self.row_count());
        debug_assert_eq!(values.ncols(), columns.len());
        Self {
            ids: self.ids.clone(),
            columns,
            values,
        }
    }

    pub fn row_count(&self) -> usize {
        self.values.nrows()
    }

    pub fn column_count(&self) -> usize {
        self.values.ncols()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self, position: usize) -> ArrayView1<'_, f64> {
        self.values.row(position)
    }

    /// Entity id at a row position
    pub fn id(&self, position: usize) -> Option<&str> {
        self.ids.get_index(position).map(String::as_str)
    }

    /// Row position of an entity id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.get_index_of(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
