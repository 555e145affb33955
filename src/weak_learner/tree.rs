//! Indicator/tree combinator (§4.3): a sequence of child weak learners
//! indexed by a parent/child-slot table; `classify` routes an example
//! through the tree by the split at each internal node.
use crate::data::{Dataset, Example, InputData, Sign, SortedColumn};

use super::{stump::StumpLearner, Hypothesis, WeakHypothesisKind, WeakLearner};

/// Which side of a threshold an example falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LR {
    Left,
    Right,
}

/// The split test at one internal tree node: `x_feature <= threshold`
/// goes left, otherwise right.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
}

impl Split {
    pub fn split(&self, example: &Example) -> LR {
        let x = example.features.value_at_or(self.feature, 0.0);
        if x <= self.threshold { LR::Left } else { LR::Right }
    }
}

/// Either a terminal weak hypothesis or a pointer to another node in the
/// owning tree's flat node array.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Child {
    Leaf(Box<WeakHypothesisKind>),
    Node(usize),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TreeNode {
    pub split: Split,
    pub left: Child,
    pub right: Child,
}

/// Grows a shallow decision tree by recursively delegating each node's
/// split to `StumpLearner` on the examples routed to it, stopping at
/// `max_depth` or once a node's subset has no non-degenerate stump left.
pub struct TreeLearner {
    pub max_depth: usize,
    pub min_examples: usize,
}

impl TreeLearner {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth, min_examples: 2 }
    }

    fn grow(
        &self,
        data: &Dataset,
        view: &mut InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
        depth: usize,
        nodes: &mut Vec<TreeNode>,
    ) -> Child {
        let stump = StumpLearner::new();
        let (hyp, energy) = stump.train(data, view, sorted, theta);

        let WeakHypothesisKind::Stump { feature, threshold, .. } = &hyp.kind else {
            return Child::Leaf(Box::new(hyp.kind));
        };

        if depth >= self.max_depth || energy.is_nan() || view.len() < self.min_examples {
            return Child::Leaf(Box::new(hyp.kind));
        }

        let feature = *feature;
        let threshold = *threshold;

        let raw_left: Vec<usize> = view
            .iter()
            .filter(|(_, ex)| ex.features.value_at_or(feature, 0.0) <= threshold)
            .map(|(logical, _)| view.raw_index(logical))
            .collect();
        let raw_right: Vec<usize> = view
            .iter()
            .filter(|(_, ex)| ex.features.value_at_or(feature, 0.0) > threshold)
            .map(|(logical, _)| view.raw_index(logical))
            .collect();

        if raw_left.is_empty() || raw_right.is_empty() {
            return Child::Leaf(Box::new(hyp.kind));
        }

        let saved: Vec<usize> = (0..view.len()).map(|l| view.raw_index(l)).collect();

        view.filter_to_raw_indices(raw_left);
        let left = self.grow(data, view, sorted, theta, depth + 1, nodes);

        view.filter_to_raw_indices(raw_right);
        let right = self.grow(data, view, sorted, theta, depth + 1, nodes);

        view.filter_to_raw_indices(saved);

        let idx = nodes.len();
        nodes.push(TreeNode { split: Split { feature, threshold }, left, right });
        Child::Node(idx)
    }
}

impl WeakLearner for TreeLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let mut scratch = InputData::new(data);
        let saved: Vec<usize> = (0..view.len()).map(|l| view.raw_index(l)).collect();
        scratch.filter_to_raw_indices(saved);

        let mut nodes = Vec::new();
        let root = self.grow(data, &mut scratch, sorted, theta, 0, &mut nodes);

        let kind = match root {
            Child::Leaf(leaf) => *leaf,
            Child::Node(idx) => {
                debug_assert_eq!(idx, nodes.len() - 1);
                WeakHypothesisKind::Tree(nodes)
            }
        };

        let mut rates = super::Rates::default();
        for (logical, _) in view.iter() {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    rates.eps_zero += label.weight;
                    continue;
                }
                let agree = kind.classify(ex, label.class_idx) * label.y();
                if agree > 0.0 {
                    rates.eps_pos += label.weight;
                } else if agree < 0.0 {
                    rates.eps_neg += label.weight;
                } else {
                    rates.eps_zero += label.weight;
                }
            }
        }
        let (energy, alpha) = super::energy_and_alpha(rates, theta);
        (Hypothesis::new(alpha, kind), energy)
    }
}
