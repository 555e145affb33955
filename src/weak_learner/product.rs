//! Product combinator (§4.3): child hypotheses multiplied together in
//! `{-1,+1}`, sharing one alpha.
use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, stump::StumpLearner, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

/// Trains `n_factors` stumps independently against the same view and
/// multiplies their outputs. Each factor is found by the same
/// `StumpLearner` search used standalone; the combination only changes how
/// the final alpha/energy are scored.
pub struct ProductLearner {
    pub n_factors: usize,
}

impl ProductLearner {
    pub fn new(n_factors: usize) -> Self {
        Self { n_factors: n_factors.max(1) }
    }
}

impl WeakLearner for ProductLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let stump = StumpLearner::new();
        let mut children = Vec::with_capacity(self.n_factors);

        // Each factor excludes the attributes already claimed by earlier
        // factors, so a product of `n_factors` stumps doesn't degenerate
        // into `n_factors` copies of the single best stump.
        let mut remaining: Vec<Option<SortedColumn>> = sorted.to_vec();

        for _ in 0..self.n_factors {
            let (hyp, energy) = stump.train(data, view, &remaining, theta);
            if energy.is_nan() {
                break;
            }
            if let WeakHypothesisKind::Stump { feature, .. } = &hyp.kind {
                remaining[*feature] = None;
            }
            children.push(hyp.kind);
        }

        if children.is_empty() {
            return (Hypothesis::new(0.0, WeakHypothesisKind::Constant {
                polarity: vec![0.0; data.n_classes()],
            }), f64::NAN);
        }

        let kind = WeakHypothesisKind::Product(children);

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
