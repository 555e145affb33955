//! FilterBoost (§4.6): at each iteration, draws a small subsample by
//! rejection sampling (acceptance probability falls as the current margin
//! grows) and trains the weak learner only on that subsample, rather than
//! reweighting the whole dataset every round.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::classifier::{Classifier, PredictionRule};
use crate::config::TrainConfig;
use crate::data::{Dataset, Example, InputData, Sign, SortedColumn};
use crate::output_info::{OutputInfo, OutputMetric};
use crate::weak_learner::{ConstantLearner, Hypothesis, WeakLearner};

use super::State;

pub struct FilterBoost {
    dataset: Dataset,
    sorted: Vec<Option<SortedColumn>>,
    weak_learner: Box<dyn WeakLearner>,
    config: TrainConfig,
    ensemble: Vec<Hypothesis>,
    output: OutputInfo,
    /// `C` in `C * ln(t+3)` (§4.6); the subsample grows slowly with `t`.
    subsample_constant: f64,
    rng: StdRng,
}

impl FilterBoost {
    pub fn new(
        dataset: Dataset,
        weak_learner: Box<dyn WeakLearner>,
        config: TrainConfig,
        metrics: Vec<OutputMetric>,
        seed: u64,
    ) -> Self {
        let sorted = SortedColumn::build_all(&dataset);
        let n_examples = dataset.n_examples();
        let n_classes = dataset.n_classes();
        Self {
            dataset,
            sorted,
            weak_learner,
            config,
            ensemble: Vec::new(),
            output: OutputInfo::new(metrics, n_examples, n_classes),
            subsample_constant: 100.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn subsample_constant(mut self, c: f64) -> Self {
        self.subsample_constant = c;
        self
    }

    /// Margin of `ex` under the ensemble trained so far, averaged over its
    /// non-abstaining labels (§4.6, "averaged over an example's labels").
    fn example_margin(&self, ex: &Example) -> f64 {
        let mut sum = 0.0;
        let mut count = 0.0;
        for label in &ex.labels {
            if label.y == Sign::Abstain {
                continue;
            }
            let g: f64 = self.ensemble.iter().map(|h| h.confidence(ex, label.class_idx)).sum();
            sum += g * label.y();
            count += 1.0;
        }
        if count > 0.0 { sum / count } else { 0.0 }
    }

    fn draw_subsample(&mut self, target: usize) -> Vec<usize> {
        let n = self.dataset.n_examples();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);

        let mut accepted = Vec::with_capacity(target);
        for raw in order {
            if accepted.len() >= target {
                break;
            }
            let margin = self.example_margin(self.dataset.example(raw));
            let accept_p = 1.0 / (1.0 + margin.exp());
            if self.rng.gen::<f64>() < accept_p {
                accepted.push(raw);
            }
        }
        accepted.sort_unstable();
        accepted
    }

    fn train_on(&self, view: &InputData) -> (Hypothesis, f64) {
        let (mut hyp, mut energy) = self.weak_learner.train(&self.dataset, view, &self.sorted, self.config.edge_offset);
        if self.config.force_constant_check || energy.is_nan() {
            let constant = ConstantLearner::new();
            let (const_hyp, const_energy) = constant.train(&self.dataset, view, &self.sorted, self.config.edge_offset);
            if energy.is_nan() || const_energy < energy
                || (self.config.prefer_constant_on_tie && const_energy == energy)
            {
                hyp = const_hyp;
                energy = const_energy;
            }
        }
        (hyp, energy)
    }
}

impl super::StrongLearner for FilterBoost {
    fn preprocess(&mut self) {
        let view = InputData::new(&self.dataset);
        let (hyp, energy) = ConstantLearner::new().train(&self.dataset, &view, &self.sorted, self.config.edge_offset);
        log::info!("[ ROUND -1 ] constant-classifier baseline energy={energy:.6} alpha={:.6}", hyp.alpha);
    }

    fn boost(&mut self, iteration: usize) -> State {
        if iteration >= self.config.iterations {
            return State::Terminate;
        }

        let target = (self.subsample_constant * (iteration as f64 + 3.0).ln()).ceil().max(1.0) as usize;
        let raw_indices = self.draw_subsample(target);
        if raw_indices.is_empty() {
            log::warn!("[ FILTER ] empty subsample at iteration {iteration}, continuing");
            return State::Continue;
        }

        let mut view = InputData::new(&self.dataset);
        view.filter_to_raw_indices(raw_indices);

        let (hyp, energy) = self.train_on(&view);
        if energy.is_nan() {
            log::warn!("[ BREAK ] no non-degenerate weak hypothesis at iteration {iteration}");
            return State::Terminate;
        }

        let edge = hyp.edge(&self.dataset, &view, false);
        if edge <= self.config.edge_offset {
            log::warn!("edge {edge:.6} <= theta at iteration {iteration}, continuing");
            return State::Continue;
        }

        let full_view = InputData::new(&self.dataset);
        self.output.emit(&self.dataset, &full_view, iteration, &hyp);
        self.ensemble.push(hyp);
        State::Continue
    }

    fn postprocess(self) -> Classifier {
        Classifier::new(self.ensemble, Vec::new(), PredictionRule::WinnerTakesAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeType, Example as Ex, Features, Label, Representation, WeightPolicy};
    use crate::strong_learner::StrongLearner;
    use crate::weak_learner::StumpLearner;

    fn two_class_toy() -> Dataset {
        let xs = [0.0, 0.0, 1.0, 1.0, 0.1, 0.9, 0.2, 0.8];
        let ys = [
            Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos,
            Sign::Neg, Sign::Pos, Sign::Neg, Sign::Pos,
        ];
        let examples: Vec<Ex> = xs.iter().zip(ys.iter()).map(|(&x, &y)| {
            Ex::new(Features::Dense(vec![x]), vec![Label::new(0, y, 0.125)])
        }).collect();
        Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    #[test]
    fn trains_some_hypotheses_on_separable_data() {
        let mut config = TrainConfig::default();
        config.iterations = 5;

        let mut fb = FilterBoost::new(
            two_class_toy(),
            Box::new(StumpLearner::new()),
            config,
            vec![],
            42,
        );
        fb.preprocess();
        let mut t = 0;
        loop {
            match fb.boost(t) {
                State::Continue => t += 1,
                State::Terminate => break,
            }
        }
        assert!(!fb.ensemble.is_empty());
    }
}
