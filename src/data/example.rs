//! A single training/test instance: feature vector plus per-class labels.
use std::collections::HashMap;

use super::label::Label;

/// The feature representation of one `Example`.
///
/// Dense is canonical for dense datasets, `(indices, values)` is canonical
/// for sparse ones (§3, "Example"). `Sparse::index_of` mirrors the
/// teacher's `name_to_index` map, but keyed on feature index within this
/// one example rather than on feature name within the whole dataset.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Features {
    Dense(Vec<f64>),
    Sparse {
        indices: Vec<usize>,
        values: Vec<f64>,
        index_of: HashMap<usize, usize>,
    },
}

impl Features {
    pub fn sparse(pairs: Vec<(usize, f64)>) -> Self {
        let mut indices = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        let mut index_of = HashMap::with_capacity(pairs.len());
        for (pos, (idx, val)) in pairs.into_iter().enumerate() {
            index_of.insert(idx, pos);
            indices.push(idx);
            values.push(val);
        }
        Features::Sparse { indices, values, index_of }
    }

    /// Value at feature `j`. Missing sparse entries are implicit zero
    /// (§3, "Example"); an out-of-range dense index panics, as it would
    /// indicate a loader bug rather than recoverable user input.
    #[inline]
    pub fn value_at(&self, j: usize) -> f64 {
        match self {
            Features::Dense(v) => v[j],
            Features::Sparse { values, index_of, .. } => {
                index_of.get(&j).map(|&pos| values[pos]).unwrap_or(0.0)
            }
        }
    }

    /// Re-materializes a missing (NaN/±inf sentinel) numeric value to the
    /// given modal replacement (§3, "Example": "re-materialized to the
    /// column's modal value on demand").
    #[inline]
    pub fn value_at_or(&self, j: usize, modal: f64) -> f64 {
        let v = self.value_at(j);
        if v.is_finite() { v } else { modal }
    }
}

/// One labeled instance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Example {
    pub name: Option<String>,
    pub features: Features,
    pub labels: Vec<Label>,
}

impl Example {
    pub fn new(features: Features, labels: Vec<Label>) -> Self {
        Self { name: None, features, labels }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The label slot for class `l`, if the example carries one
    /// (multi-label datasets need not list every class for every example
    /// in sparse-label mode; §6 "per-label initial weights (optional,
    /// sparse-label only)").
    pub fn label(&self, class_idx: usize) -> Option<&Label> {
        self.labels.iter().find(|l| l.class_idx == class_idx)
    }

    pub fn label_mut(&mut self, class_idx: usize) -> Option<&mut Label> {
        self.labels.iter_mut().find(|l| l.class_idx == class_idx)
    }
}
