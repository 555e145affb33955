//! `StumpAlgorithm` (§4.4): linear threshold search over a sorted column,
//! with a running per-class half-edge and a rayon-parallel attribute scan.
use rayon::prelude::*;

use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

/// The single-threshold, per-class-polarity stump of §4.3 ("Single-stump").
/// One shared attribute and cut point; each class gets its own polarity
/// sign so a class can disagree about which side of the cut is positive.
pub struct StumpLearner;

impl StumpLearner {
    pub fn new() -> Self {
        Self
    }

    /// One attribute's half-edge sweep (§4.4, steps 1-3). Returns
    /// `(score, threshold, half_edge_at_best_cut)` or `None` if every value
    /// in the column ties (no strict split point exists).
    fn scan_attribute(
        feature: usize,
        sorted: &SortedColumn,
        input: &InputData,
        n_classes: usize,
    ) -> Option<(f64, f64, Vec<f64>)> {
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
        let mut best: Option<(f64, f64, Vec<f64>)> = None;

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
                let score: f64 = half_edge.iter().map(|h| h.abs()).sum();
                let is_better = match &best {
                    None => true,
                    Some((best_score, _, _)) => score > *best_score,
                };
                if is_better {
                    let threshold = (prev_val + cur_val) / 2.0;
                    best = Some((score, threshold, half_edge.clone()));
                }
            }
        }

        let _ = feature;
        best
    }

    /// Weighted `(eps_pos, eps_neg, eps_zero)` for the candidate stump,
    /// recomputed against the full view rather than carried incrementally
    /// from the half-edge sweep, so missing/NaN entries are handled the
    /// same way `Hypothesis::classify` handles them at prediction time.
    fn rates_for(
        kind: &WeakHypothesisKind,
        data: &Dataset,
        view: &InputData,
    ) -> Rates {
        let _ = data;
        let mut rates = Rates::default();
        for (logical, _) in view.iter() {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    rates.eps_zero += label.weight;
                    continue;
                }
                let h = kind.classify(ex, label.class_idx);
                let agree = h * label.y();
                if agree > 0.0 {
                    rates.eps_pos += label.weight;
                } else if agree < 0.0 {
                    rates.eps_neg += label.weight;
                } else {
                    rates.eps_zero += label.weight;
                }
            }
        }
        rates
    }
}

impl Default for StumpLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakLearner for StumpLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_classes = data.n_classes();

        // Parallel attribute scan (§4.4): each attribute reads only the
        // frozen weight vector and its own column, so this is embarrassingly
        // parallel. The reduction below is a deterministic, index-ordered
        // fold so the winner never depends on thread scheduling.
        let candidates: Vec<(usize, f64, f64, Vec<f64>)> = sorted
            .par_iter()
            .enumerate()
            .filter_map(|(j, maybe_col)| {
                let col = maybe_col.as_ref()?;
                let (score, threshold, half_edge) =
                    Self::scan_attribute(j, col, view, n_classes)?;
                Some((j, score, threshold, half_edge))
            })
            .collect();

        let best = candidates.into_iter().reduce(|a, b| {
            // keyed on (-|edge|, attribute_index): larger score wins; ties
            // go to the earlier attribute index, independent of scan order.
            if b.1 > a.1 || (b.1 == a.1 && b.0 < a.0) {
                b
            } else {
                a
            }
        });

        let Some((feature, _score, threshold, half_edge)) = best else {
            return (Hypothesis::new(0.0, WeakHypothesisKind::Constant {
                polarity: vec![0.0; n_classes],
            }), f64::NAN);
        };

        let polarity: Vec<f64> = half_edge
            .iter()
            .map(|&h| if h >= 0.0 { 1.0 } else { -1.0 })
            .collect();

        let kind = WeakHypothesisKind::Stump { feature, threshold, polarity };
        let rates = Self::rates_for(&kind, data, view);
        let (energy, alpha) = energy_and_alpha(rates, theta);

        (Hypothesis::new(alpha, kind), energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Dataset, Example, Features, Label, Representation, WeightPolicy};

    /// Seed scenario 1 (§8): N=4, x=[0,0,1,1], y=[-1,-1,+1,+1], uniform
    /// weights. The first stump must choose feature 0, threshold 0.5, and
    /// zero energy.
    #[test]
    fn scenario_one_perfect_stump() {
        let xs = [0.0, 0.0, 1.0, 1.0];
        let ys = [Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos];
        let examples: Vec<Example> = xs.iter().zip(ys.iter()).map(|(&x, &y)| {
            Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 0.25)])
        }).collect();

        let data = Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        );
        let sorted = SortedColumn::build_all(&data);
        let view = InputData::new(&data);

        let learner = StumpLearner::new();
        let (hyp, energy) = learner.train(&data, &view, &sorted, 0.0);

        assert!(energy.abs() < 1e-9, "energy={energy}");
        match &hyp.kind {
            WeakHypothesisKind::Stump { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert!((threshold - 0.5).abs() < 1e-9);
            }
            other => panic!("expected Stump, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_column_returns_nan_energy() {
        let examples: Vec<Example> = (0..4).map(|_| {
            Example::new(Features::Dense(vec![1.0]), vec![Label::new(0, Sign::Pos, 0.25)])
        }).collect();
        let data = Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        );
        let sorted = SortedColumn::build_all(&data);
        let view = InputData::new(&data);

        let learner = StumpLearner::new();
        let (_hyp, energy) = learner.train(&data, &view, &sorted, 0.0);
        assert!(energy.is_nan());
    }
}
