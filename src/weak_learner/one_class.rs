//! One-class stump (§4.3): a single class is optimized with its own
//! attribute/threshold cut; every other class votes by its constant
//! polarity.
use rayon::prelude::*;

use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

pub struct OneClassLearner;

impl OneClassLearner {
    pub fn new() -> Self {
        Self
    }

    fn constant_polarity(data: &Dataset, view: &InputData) -> Vec<f64> {
        let mut sum = vec![0.0_f64; data.n_classes()];
        for (logical, _) in view.iter() {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                sum[label.class_idx] += label.weight * label.y();
            }
        }
        sum.iter().map(|&s| if s >= 0.0 { 1.0 } else { -1.0 }).collect()
    }

    /// Best `(|half_edge|, class, threshold, signed half_edge)` over every
    /// class for one attribute's sweep.
    fn scan_attribute(
        sorted: &SortedColumn,
        input: &InputData,
        n_classes: usize,
    ) -> Option<(f64, usize, f64, f64)> {
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

        let mut best: Option<(f64, usize, f64, f64)> = None;

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
                let threshold = (prev_val + cur_val) / 2.0;
                for (l, &h) in half_edge.iter().enumerate() {
                    let abs = h.abs();
                    let better = best.as_ref().map_or(true, |&(best_abs, ..)| abs > best_abs);
                    if better {
                        best = Some((abs, l, threshold, h));
                    }
                }
            }
        }

        best
    }
}

impl Default for OneClassLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakLearner for OneClassLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_classes = data.n_classes();
        let mut polarity = Self::constant_polarity(data, view);

        let candidates: Vec<(usize, f64, usize, f64, f64)> = sorted
            .par_iter()
            .enumerate()
            .filter_map(|(j, maybe_col)| {
                let col = maybe_col.as_ref()?;
                let (abs, class, threshold, signed) = Self::scan_attribute(col, view, n_classes)?;
                Some((j, abs, class, threshold, signed))
            })
            .collect();

        let best = candidates.into_iter().reduce(|a, b| {
            if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) { b } else { a }
        });

        let Some((feature, _abs, target_class, threshold, signed)) = best else {
            return (Hypothesis::new(0.0, WeakHypothesisKind::Constant {
                polarity: vec![0.0; n_classes],
            }), f64::NAN);
        };

        polarity[target_class] = if signed >= 0.0 { 1.0 } else { -1.0 };

        let kind = WeakHypothesisKind::OneClass { feature, threshold, target_class, polarity };

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
