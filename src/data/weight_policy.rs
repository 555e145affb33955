//! Weight-initialization policies (§4.1).
use log::warn;

use super::dataset::Dataset;
use super::label::Sign;

/// Selects how the initial per-(example, class) weight mass is spread.
/// Mirrors the `--weightpolicy` CLI flag of §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WeightPolicy {
    /// Each example gets `1/N`, split `1/(2N)` positive / `1/(2N)` negative.
    SharePoints,
    /// Each example gets `1/N`, split among its labels by their
    /// user-provided initial weight.
    ShareLabels,
    /// Input weights normalized globally to sum to 1.
    Proportional,
    /// Each class gets `1/K`, split evenly positive/negative.
    Balanced,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        WeightPolicy::SharePoints
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

impl WeightPolicy {
    pub fn apply(self, data: &mut Dataset) {
        match self {
            WeightPolicy::SharePoints => Self::apply_share_points(data),
            WeightPolicy::ShareLabels => Self::apply_share_labels(data),
            WeightPolicy::Proportional => Self::apply_proportional(data),
            WeightPolicy::Balanced => Self::apply_balanced(data),
        }
        Self::check_invariant(data);
    }

    fn apply_share_points(data: &mut Dataset) {
        let n = data.n_examples() as f64;
        for ex in data.examples_mut() {
            let (n_pos, n_neg) = count_sides(&ex.labels);
            for label in ex.labels.iter_mut() {
                let user_weight = label.initial_weight.max(label.weight);
                let side_mass = match label.y {
                    Sign::Pos if n_neg > 0 => 1.0 / (2.0 * n),
                    Sign::Neg if n_pos > 0 => 1.0 / (2.0 * n),
                    Sign::Pos | Sign::Neg => 1.0 / n,
                    Sign::Abstain => 0.0,
                };
                label.weight = side_mass * user_weight;
                label.initial_weight = label.weight;
            }
        }
    }

    fn apply_share_labels(data: &mut Dataset) {
        let n = data.n_examples() as f64;
        for ex in data.examples_mut() {
            let total_user: f64 = ex.labels.iter()
                .map(|l| l.initial_weight.max(l.weight))
                .sum();
            for label in ex.labels.iter_mut() {
                let share = if total_user > 0.0 {
                    label.initial_weight.max(label.weight) / total_user
                } else {
                    1.0 / ex.labels.len().max(1) as f64
                };
                label.weight = share / n;
                label.initial_weight = label.weight;
            }
        }
    }

    fn apply_proportional(data: &mut Dataset) {
        let total: f64 = data.examples().iter()
            .flat_map(|ex| ex.labels.iter())
            .map(|l| l.initial_weight.max(l.weight))
            .sum();
        let total = if total > 0.0 { total } else { 1.0 };
        for ex in data.examples_mut() {
            for label in ex.labels.iter_mut() {
                label.weight = label.initial_weight.max(label.weight) / total;
                label.initial_weight = label.weight;
            }
        }
    }

    fn apply_balanced(data: &mut Dataset) {
        let n = data.n_examples();
        let k = data.n_classes() as f64;
        let counts: Vec<usize> = (0..data.n_classes())
            .map(|c| data.class_count(c))
            .collect();

        for ex in data.examples_mut() {
            for label in ex.labels.iter_mut() {
                let n_l = counts[label.class_idx] as f64;
                let n_not_l = (n as f64 - n_l).max(1.0);
                label.weight = match label.y {
                    Sign::Pos => 1.0 / (2.0 * k * n_l.max(1.0)),
                    Sign::Neg => 1.0 / (2.0 * k * n_not_l),
                    Sign::Abstain => 0.0,
                };
                label.initial_weight = label.weight;
            }
        }
    }

    fn check_invariant(data: &Dataset) {
        let total = data.total_weight();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                "post-init weight sum {total} deviates from 1.0 by more than {WEIGHT_SUM_TOLERANCE}"
            );
        }
    }
}

fn count_sides(labels: &[super::label::Label]) -> (usize, usize) {
    let n_pos = labels.iter().filter(|l| l.y == Sign::Pos).count();
    let n_neg = labels.iter().filter(|l| l.y == Sign::Neg).count();
    (n_pos, n_neg)
}
