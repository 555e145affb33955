//! The weak-learner family (§4.3): a tagged `Hypothesis` value plus the
//! training algorithms that produce one.
//!
//! Per `SPEC_FULL.md` §9 ("Deep inheritance of weak learners"), the
//! source's `BaseLearner -> AbstainableLearner -> SingleStumpLearner -> ...`
//! chain becomes one enum; `classify`/`train` dispatch is a `match` instead
//! of virtual calls.
pub mod stump;
pub mod constant;
pub mod selector;
pub mod one_class;
pub mod tree;
pub mod product;
pub mod haar;
pub mod bandit_wrapper;

pub use stump::StumpLearner;
pub use constant::ConstantLearner;
pub use selector::SelectorLearner;
pub use one_class::OneClassLearner;
pub use tree::{TreeLearner, TreeNode};
pub use product::ProductLearner;
pub use haar::HaarLearner;
pub use bandit_wrapper::BanditLearner;

use crate::data::{Dataset, Example, InputData, SortedColumn};

/// Smoothing constant `zeta` in the closed-form alpha (§4.3).
pub const ZETA: f64 = 1e-3;

/// A trained weak hypothesis: a coefficient, a classifier-specific
/// parameter block, and (only meaningful for cascade stages) a rejection
/// threshold (§3, "WeakHypothesis").
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Hypothesis {
    pub alpha: f64,
    pub kind: WeakHypothesisKind,
    pub reject_threshold: Option<f64>,
}

impl Hypothesis {
    pub fn new(alpha: f64, kind: WeakHypothesisKind) -> Self {
        Self { alpha, kind, reject_threshold: None }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.reject_threshold = Some(threshold);
        self
    }

    /// `h(x, l)`: the raw classifier output before scaling by `alpha`.
    /// `{-1, +1}` for the deterministic variants, real-valued for
    /// `Product`/`Tree` compositions that route through soft children.
    pub fn classify(&self, example: &Example, class: usize) -> f64 {
        self.kind.classify(example, class)
    }

    /// `alpha * h(x, l)`: the contribution to the posterior table `g`.
    pub fn confidence(&self, example: &Example, class: usize) -> f64 {
        self.alpha * self.classify(example, class)
    }

    /// `sum_{i,l} w_{i,l} h(x_i,l) y_{i,l}`, optionally normalized by the
    /// active view's total weight (§4.3, `edge`).
    pub fn edge(&self, data: &Dataset, view: &InputData, normalized: bool) -> f64 {
        let mut raw = 0.0;
        let mut total_w = 0.0;
        for (logical, _) in view.iter() {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == crate::data::Sign::Abstain {
                    continue;
                }
                raw += label.weight * self.classify(ex, label.class_idx) * label.y();
                total_w += label.weight;
            }
        }
        let _ = data;
        if normalized && total_w > 0.0 { raw / total_w } else { raw }
    }
}

/// The tagged variant over every weak-classifier shape this crate supports
/// (§3, "WeakHypothesis", and §9's re-architecture note).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum WeakHypothesisKind {
    /// `h(x,l) = v_l`, independent of `x`.
    Constant { polarity: Vec<f64> },
    /// `h(x,l) = v_l * sign(x_j - tau)`, one shared threshold.
    Stump { feature: usize, threshold: f64, polarity: Vec<f64> },
    /// One shared feature, a per-class threshold.
    Selector { feature: usize, thresholds: Vec<f64>, polarity: Vec<f64> },
    /// A single optimized class; the rest vote by their constant polarity.
    OneClass { feature: usize, threshold: f64, target_class: usize, polarity: Vec<f64> },
    /// A sequence of child hypotheses with an explicit parent/child-slot
    /// routing table (§4.3, "Indicator/tree/product").
    Tree(Vec<TreeNode>),
    /// Child outputs multiplied together in `{-1,+1}`; alpha is shared.
    Product(Vec<WeakHypothesisKind>),
    /// A two-feature difference stump, in the spirit of a Haar-like
    /// rectangle-difference feature.
    Haar { feature_a: usize, feature_b: usize, threshold: f64, polarity: Vec<f64> },
    /// A bandit-selected attribute subset wrapping an inner hypothesis
    /// (§4.3, "Bandit wrapper").
    Bandit(Box<WeakHypothesisKind>),
}

impl WeakHypothesisKind {
    pub fn classify(&self, example: &Example, class: usize) -> f64 {
        match self {
            WeakHypothesisKind::Constant { polarity } => polarity[class],
            WeakHypothesisKind::Stump { feature, threshold, polarity } => {
                polarity[class] * sign(example.features.value_at_or(*feature, 0.0) - threshold)
            }
            WeakHypothesisKind::Selector { feature, thresholds, polarity } => {
                let x = example.features.value_at_or(*feature, 0.0);
                polarity[class] * sign(x - thresholds[class])
            }
            WeakHypothesisKind::OneClass { feature, threshold, target_class, polarity } => {
                let x = example.features.value_at_or(*feature, 0.0);
                if class == *target_class {
                    polarity[class] * sign(x - threshold)
                } else {
                    polarity[class]
                }
            }
            WeakHypothesisKind::Tree(nodes) => {
                classify_tree(nodes, nodes.len() - 1, example, class)
            }
            WeakHypothesisKind::Product(children) => {
                children.iter().map(|c| c.classify(example, class)).product()
            }
            WeakHypothesisKind::Haar { feature_a, feature_b, threshold, polarity } => {
                let diff = example.features.value_at_or(*feature_a, 0.0)
                    - example.features.value_at_or(*feature_b, 0.0);
                polarity[class] * sign(diff - threshold)
            }
            WeakHypothesisKind::Bandit(inner) => inner.classify(example, class),
        }
    }
}

fn classify_tree(nodes: &[TreeNode], at: usize, example: &Example, class: usize) -> f64 {
    use crate::weak_learner::tree::{Child, LR};

    let node = &nodes[at];
    let child = match node.split.split(example) {
        LR::Left => &node.left,
        LR::Right => &node.right,
    };
    match child {
        Child::Node(idx) => classify_tree(nodes, *idx, example, class),
        Child::Leaf(kind) => kind.classify(example, class),
    }
}

#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 { 1.0 } else if x < 0.0 { -1.0 } else { 0.0 }
}

/// Per-class weighted fractions of correct/wrong/abstaining predictions
/// under the current weight distribution (§4.3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rates {
    pub eps_pos: f64,
    pub eps_neg: f64,
    pub eps_zero: f64,
}

/// The closed-form energy/alpha pair of §4.3, with and without an
/// edge-offset `theta`.
pub fn energy_and_alpha(rates: Rates, theta: f64) -> (f64, f64) {
    let Rates { eps_pos, eps_neg, eps_zero } = rates;

    if theta <= 0.0 {
        let alpha = 0.5 * ((eps_pos + ZETA) / (eps_neg + ZETA)).ln();
        let energy = 2.0 * (eps_neg * eps_pos).sqrt() + eps_zero;
        return (energy, alpha);
    }

    let alpha = if eps_neg.abs() < 1e-12 {
        ((1.0 - theta) * eps_pos / (theta * eps_zero.max(ZETA))).ln()
    } else {
        let b = theta * eps_zero / (2.0 * (1.0 + theta) * eps_neg);
        let c = (1.0 - theta) * eps_pos / ((1.0 + theta) * eps_neg);
        (-b + (b * b + c).sqrt()).ln()
    };
    let energy = 2.0 * (eps_neg * eps_pos).sqrt() + eps_zero;
    (energy, alpha)
}

/// A trained weak learner's public contract (§4.3): parse config, train
/// against the current view, classify. Implementors are the concrete
/// algorithms in this module (`StumpLearner`, `ConstantLearner`, ...);
/// `strong_learner` code is generic over this trait rather than matching
/// on a learner-name string (§9, "Global registered-learners singleton").
pub trait WeakLearner {
    /// Trains against the given view and returns `(hypothesis, energy)`.
    /// `energy` is `f64::NAN` when no non-degenerate split exists — the
    /// caller falls back to the constant learner (§4.4).
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64);
}
