//! Constant learner, grounded on `Algorithms/ConstantAlgorithm.cpp`'s
//! `findConstant`/`findConstantWeightsEdges`: `h(x,l) = v_l`, chosen per
//! class to match the sign of the weighted-label sum.
use crate::data::{Dataset, InputData, Sign, SortedColumn};

use super::{energy_and_alpha, Hypothesis, Rates, WeakHypothesisKind, WeakLearner};

pub struct ConstantLearner;

impl ConstantLearner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstantLearner {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakLearner for ConstantLearner {
    fn train(
        &self,
        data: &Dataset,
        view: &InputData,
        _sorted: &[Option<SortedColumn>],
        theta: f64,
    ) -> (Hypothesis, f64) {
        let n_classes = data.n_classes();
        let mut weighted_sum = vec![0.0_f64; n_classes];
        for (logical, _) in view.iter() {
            let ex = view.example(logical);
            for label in &ex.labels {
                if label.y == Sign::Abstain {
                    continue;
                }
                weighted_sum[label.class_idx] += label.weight * label.y();
            }
        }

        let polarity: Vec<f64> = weighted_sum
            .iter()
            .map(|&s| if s >= 0.0 { 1.0 } else { -1.0 })
            .collect();

        let kind = WeakHypothesisKind::Constant { polarity };

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Example, Features, Label, Representation, WeightPolicy};

    #[test]
    fn matches_majority_sign() {
        let examples: Vec<Example> = vec![
            Example::new(Features::Dense(vec![0.0]), vec![Label::new(0, Sign::Pos, 0.4)]),
            Example::new(Features::Dense(vec![0.0]), vec![Label::new(0, Sign::Neg, 0.1)]),
        ];
        let data = Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        );
        let view = InputData::new(&data);
        let learner = ConstantLearner::new();
        let (hyp, _) = learner.train(&data, &view, &[], 0.0);
        match hyp.kind {
            WeakHypothesisKind::Constant { polarity } => assert_eq!(polarity[0], 1.0),
            _ => panic!("expected Constant"),
        }
    }
}
