//! `Dataset` (the source's `RawData`): the sole owner of loaded examples.
use std::collections::HashMap;

use super::example::Example;
use super::label::Sign;
use super::weight_policy::WeightPolicy;

/// Whether a feature column holds real-valued numbers or a closed set of
/// nominal values (§3, "Dataset").
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AttributeType {
    Numeric,
    Nominal(Vec<String>),
}

/// Dense vs. sparse storage, fixed for the whole dataset at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Representation {
    Dense,
    Sparse,
}

/// Owns every `Example`, the class name/index map, and per-feature
/// metadata. Immutable after `Dataset::load` returns (§5, "Shared-resource
/// policy": "the DataModel is immutable after load").
#[derive(Debug, Clone)]
pub struct Dataset {
    examples: Vec<Example>,
    class_names: Vec<String>,
    class_index: HashMap<String, usize>,
    attribute_types: Vec<AttributeType>,
    representation: Representation,
    class_counts: Vec<usize>,
}

impl Dataset {
    /// Builds a `Dataset` from already-parsed examples (parsing itself is
    /// an external collaborator, §1 "OUT OF SCOPE") and applies the
    /// requested weight-initialization policy (§4.1).
    pub fn load(
        examples: Vec<Example>,
        class_names: Vec<String>,
        attribute_types: Vec<AttributeType>,
        representation: Representation,
        policy: WeightPolicy,
    ) -> Self {
        let class_index = class_names.iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let n_classes = class_names.len();
        let mut class_counts = vec![0usize; n_classes];
        for ex in &examples {
            for label in &ex.labels {
                if label.y != Sign::Abstain {
                    class_counts[label.class_idx] += 1;
                }
            }
        }

        let mut dataset = Self {
            examples,
            class_names,
            class_index,
            attribute_types,
            representation,
            class_counts,
        };
        policy.apply(&mut dataset);
        dataset
    }

    pub fn n_examples(&self) -> usize {
        self.examples.len()
    }

    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }

    pub fn n_features(&self) -> usize {
        self.attribute_types.len()
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn class_name(&self, idx: usize) -> &str {
        &self.class_names[idx]
    }

    pub fn class_index(&self, name: &str) -> Option<usize> {
        self.class_index.get(name).copied()
    }

    pub fn class_count(&self, class_idx: usize) -> usize {
        self.class_counts[class_idx]
    }

    pub fn attribute_type(&self, j: usize) -> &AttributeType {
        &self.attribute_types[j]
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn example(&self, raw_idx: usize) -> &Example {
        &self.examples[raw_idx]
    }

    pub(crate) fn examples_mut(&mut self) -> &mut [Example] {
        &mut self.examples
    }

    /// Total weight mass across every (example, label) slot. Should equal
    /// `1.0` within `1e-3` right after `load` (§4.1 invariant) and `1.0`
    /// within `1e-6` after each boosting weight update (§8).
    pub fn total_weight(&self) -> f64 {
        self.examples.iter()
            .flat_map(|ex| ex.labels.iter())
            .map(|l| l.weight)
            .sum()
    }
}
