//! Selector stump (§4.3): one shared attribute, but each class picks its
//! own threshold and polarity independently along that attribute's sweep.
use rayon::prelude::*;

use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

pub struct SelectorLearner;

impl SelectorLearner {
    pub fn new() -> Self {
        Self
    }

    /// For one attribute: the per-class best `(|half_edge|, threshold)`
    /// found along the sweep, and the total summed score used to rank
    /// attributes against each other.
    fn scan_attribute(
        sorted: &SortedColumn,
        input: &InputData,
        n_classes: usize,
    ) -> Option<(f64, Vec<(f64, f64, f64)>)> {
        let view = sorted.view(input);
        if view.len() < 2 {
            return None;
        }

        let mut full_sum = vec![0.0_f64; n_classes];
        for &(logical, _) in &view {
            let ex = input.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                full_sum[label.class_idx] += label.weight * label.y();
            }
        }
        let mut half_edge: Vec<f64> = full_sum.iter().map(|s| s / 2.0).collect();

        // best[l] = (|half_edge|, threshold, signed half_edge)
        let mut best: Vec<(f64, f64, f64)> = vec![(f64::MIN, 0.0, 0.0); n_classes];
        let mut any = false;

        for pair in view.windows(2) {
            let (prev_logical, prev_val) = pair[0];
            let (_cur_logical, cur_val) = pair[1];

            let prev_ex = input.example(prev_logical);
            for label in &prev_ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                half_edge[label.class_idx] -= label.weight * label.y();
            }

            if cur_val > prev_val {
                any = true;
                let threshold = (prev_val + cur_val) / 2.0;
                for l in 0..n_classes {
                    let abs = half_edge[l].abs();
                    if abs > best[l].0 {
                        best[l] = (abs, threshold, half_edge[l]);
                    }
                }
            }
        }

        if !any {
            return None;
        }
        let total: f64 = best.iter().map(|b| b.0).sum();
        Some((total, best))
    }
}

impl Default for SelectorLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakLearner for SelectorLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_classes = data.n_classes();

        let candidates: Vec<(usize, f64, Vec<(f64, f64, f64)>)> = sorted
            .par_iter()
            .enumerate()
            .filter_map(|(j, maybe_col)| {
                let col = maybe_col.as_ref()?;
                let (total, best) = Self::scan_attribute(col, view, n_classes)?;
                Some((j, total, best))
            })
            .collect();

        let best = candidates.into_iter().reduce(|a, b| {
            if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a }
        });

        let Some((feature, _total, per_class)) = best else {
            return (Hypothesis::new(0.0, WeakHypothesisKind::Constant {
                polarity: vec![0.0; n_classes],
            }), f64::NAN);
        };

        let thresholds: Vec<f64> = per_class.iter().map(|&(_, t, _)| t).collect();
        let polarity: Vec<f64> = per_class
            .iter()
            .map(|&(_, _, signed)| if signed >= 0.0 { 1.0 } else { -1.0 })
            .collect();

        let kind = WeakHypothesisKind::Selector { feature, thresholds, polarity };

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
