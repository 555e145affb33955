//! Haar-like feature (§4.3): a two-feature difference stump, in the
//! spirit of a rectangle-difference feature from Viola-Jones detectors.
use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

/// Searches `(feature_a, feature_b)` pairs among the first `max_features`
/// numeric columns and finds the best threshold on `x_a - x_b`, by the
/// same half-edge sweep `StumpAlgorithm` uses on a single column.
pub struct HaarLearner {
    pub max_features: usize,
}

impl HaarLearner {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    fn scan_pair(
        a: usize,
        b: usize,
        data: &Dataset,
        view: &InputData,
        n_classes: usize,
    ) -> Option<(f64, f64, Vec<f64>)> {
        let mut diffs: Vec<(usize, f64)> = view
            .iter()
            .map(|(logical, ex)| {
                (logical, ex.features.value_at_or(a, 0.0) - ex.features.value_at_or(b, 0.0))
            })
            .collect();
        diffs.sort_by(|x, y| x.1.partial_cmp(&y.1).unwrap().then_with(|| x.0.cmp(&y.0)));

        if diffs.len() < 2 {
            return None;
        }

        let mut full_sum = vec![0.0_f64; n_classes];
        for &(logical, _) in &diffs {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                full_sum[label.class_idx] += label.weight * label.y();
            }
        }
        let mut half_edge: Vec<f64> = full_sum.iter().map(|s| s / 2.0).collect();
        let mut best: Option<(f64, f64, Vec<f64>)> = None;

        for pair in diffs.windows(2) {
            let (prev_logical, prev_val) = pair[0];
            let (_cur_logical, cur_val) = pair[1];

            let prev_ex = view.example(prev_logical);
            for label in &prev_ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                half_edge[label.class_idx] -= label.weight * label.y();
            }

            if cur_val > prev_val {
                let score: f64 = half_edge.iter().map(|h| h.abs()).sum();
                let better = best.as_ref().map_or(true, |&(s, ..)| score > s);
                if better {
                    let threshold = (prev_val + cur_val) / 2.0;
                    best = Some((score, threshold, half_edge.clone()));
                }
            }
        }

        let _ = data;
        best
    }
}

impl WeakLearner for HaarLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_classes = data.n_classes();
        let numeric: Vec<usize> = sorted
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_some())
            .map(|(j, _)| j)
            .take(self.max_features.max(2))
            .collect();

        let mut best: Option<(usize, usize, f64, f64, Vec<f64>)> = None;
        for (ai, &a) in numeric.iter().enumerate() {
            for &b in &numeric[ai + 1..] {
                if let Some((score, threshold, half_edge)) = Self::scan_pair(a, b, data, view, n_classes) {
                    let is_better = best.as_ref().map_or(true, |&(_, _, best_score, ..)| score > best_score);
                    if is_better {
                        best = Some((a, b, score, threshold, half_edge));
                    }
                }
            }
        }

        let Some((feature_a, feature_b, _score, threshold, half_edge)) = best else {
            return (Hypothesis::new(0.0, WeakHypothesisKind::Constant {
                polarity: vec![0.0; n_classes],
            }), f64::NAN);
        };

        let polarity: Vec<f64> = half_edge.iter().map(|&h| if h >= 0.0 { 1.0 } else { -1.0 }).collect();
        let kind = WeakHypothesisKind::Haar { feature_a, feature_b, threshold, polarity };

        let mut rates = Rates::default();
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
        let (energy, alpha) = energy_and_alpha(rates, theta);
        (Hypothesis::new(alpha, kind), energy)
    }
}
