//! AdaBoost.MH (§4.6): the reference strong-learner loop. arc-gv and
//! FilterBoost (in sibling modules) reuse `apply_weight_update` and
//! `train_one` rather than re-deriving the update math.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::classifier::{Classifier, PredictionRule};
use crate::config::TrainConfig;
use crate::data::{Dataset, InputData, Sign, SortedColumn};
use crate::output_info::OutputInfo;
use crate::serialization::StageMarker;
use crate::weak_learner::{ConstantLearner, Hypothesis, WeakLearner};

use super::State;

/// Below this, a round's weak hypothesis is treated as a perfect fit over
/// the current weights (§8, scenario 1: training stops once energy hits
/// zero rather than continuing to reweight an already-separated sample).
const ENERGY_EPS: f64 = 1e-9;

/// Sliding-window early stopping over held-out zero-one error (§4.6).
struct EarlyStopper {
    window: VecDeque<f64>,
    window_len: usize,
    lambda: f64,
    tau_min: usize,
    best_mean: f64,
    best_iter: usize,
}

impl EarlyStopper {
    fn new(cfg: crate::config::EarlyStoppingConfig, t_total: usize) -> Self {
        let window_len = ((cfg.beta * t_total as f64).ceil() as usize).max(1);
        Self {
            window: VecDeque::with_capacity(window_len),
            window_len,
            lambda: cfg.lambda,
            tau_min: cfg.tau_min,
            best_mean: f64::INFINITY,
            best_iter: 0,
        }
    }

    /// Returns `true` once the rule says to stop.
    fn record(&mut self, iteration: usize, test_error: f64) -> bool {
        if self.window.len() == self.window_len {
            self.window.pop_front();
        }
        self.window.push_back(test_error);

        if iteration < self.tau_min {
            return false;
        }

        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        if mean < self.best_mean {
            self.best_mean = mean;
            self.best_iter = iteration;
        }

        iteration as f64 > self.lambda * self.best_iter as f64 && self.best_iter > 0
    }
}

/// Owns the mutable training state: the dataset (whose label weights are
/// the only thing this loop mutates), the precomputed sorted columns, the
/// ensemble built so far, and the output-info sink.
pub struct AdaBoostMh {
    pub(crate) dataset: Dataset,
    pub(crate) sorted: Vec<Option<SortedColumn>>,
    pub(crate) weak_learner: Box<dyn WeakLearner>,
    pub(crate) config: TrainConfig,
    pub(crate) ensemble: Vec<Hypothesis>,
    pub(crate) output: OutputInfo,
    test_dataset: Option<Dataset>,
    early_stopper: Option<EarlyStopper>,
    start: Instant,
    terminated: bool,
}

impl AdaBoostMh {
    pub fn new(
        dataset: Dataset,
        weak_learner: Box<dyn WeakLearner>,
        config: TrainConfig,
        metrics: Vec<crate::output_info::OutputMetric>,
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
            test_dataset: None,
            early_stopper: None,
            start: Instant::now(),
            terminated: false,
        }
    }

    /// Registers a held-out set for early stopping (§4.6); only effective
    /// if `config.early_stopping` is also set.
    pub fn with_test_data(mut self, test_dataset: Dataset) -> Self {
        if let Some(cfg) = self.config.early_stopping {
            self.early_stopper = Some(EarlyStopper::new(cfg, self.config.iterations));
        }
        self.test_dataset = Some(test_dataset);
        self
    }

    /// Fast-resumes from a previously trained (and deserialized) prefix:
    /// replays each hypothesis's weight update in one pass, reconstituting
    /// `g` and the label weights without re-running the weak-learner
    /// search (§4.6, "Resume"). Both resume paths must agree on `g`; since
    /// every weak learner here is a deterministic function of the current
    /// weights, a fast-resumed continuation is bit-for-bit identical to an
    /// uninterrupted run (§8, "Resume equivalence") as long as no
    /// bandit-backed weak learner is in play — those carry their own RNG
    /// state that a pure weight replay cannot reconstruct; see DESIGN.md.
    pub fn resume(mut self, prior: Vec<Hypothesis>) -> Self {
        for hyp in prior {
            self.apply_weight_update(&hyp);
            let view = InputData::new(&self.dataset);
            self.output.emit(&self.dataset, &view, self.ensemble.len(), &hyp);
            self.ensemble.push(hyp);
        }
        self
    }

    /// The iteration index a caller should pass to the next `boost` call.
    pub fn next_iteration(&self) -> usize {
        self.ensemble.len()
    }

    fn time_exceeded(&self) -> bool {
        self.config.time_limit_minutes > 0
            && self.start.elapsed() > Duration::from_secs(self.config.time_limit_minutes * 60)
    }

    /// `w_{i,l} <- w_{i,l} * exp(-alpha * h(x_i,l) * y_{i,l}) / Z` (§4.6).
    pub(crate) fn apply_weight_update(&mut self, hyp: &Hypothesis) {
        let n_classes = self.dataset.n_classes();
        let contributions: Vec<Vec<f64>> = self.dataset.examples().iter()
            .map(|ex| (0..n_classes).map(|l| hyp.classify(ex, l)).collect())
            .collect();

        let mut z = 0.0;
        for (i, ex) in self.dataset.examples_mut().iter_mut().enumerate() {
            for label in ex.labels.iter_mut() {
                if label.y == Sign::Abstain {
                    continue;
                }
                let h = contributions[i][label.class_idx];
                label.weight *= (-hyp.alpha * h * label.y()).exp();
                z += label.weight;
            }
        }
        if z > 0.0 {
            for ex in self.dataset.examples_mut().iter_mut() {
                for label in ex.labels.iter_mut() {
                    if label.y != Sign::Abstain {
                        label.weight /= z;
                    }
                }
            }
        }
    }

    /// Trains one weak hypothesis, falling back to the constant learner on
    /// a NaN energy or (if configured) whenever the constant learner beats
    /// it outright (§4.6 pseudocode, §9 "prefer constant on exact ties").
    pub(crate) fn train_one(&self) -> (Hypothesis, f64, f64) {
        let view = InputData::new(&self.dataset);
        let (mut hyp, mut energy) = self.weak_learner.train(&self.dataset, &view, &self.sorted, self.config.edge_offset);

        if self.config.force_constant_check || energy.is_nan() {
            let constant = ConstantLearner::new();
            let (const_hyp, const_energy) = constant.train(&self.dataset, &view, &self.sorted, self.config.edge_offset);
            let prefer_constant = energy.is_nan()
                || const_energy < energy
                || (self.config.prefer_constant_on_tie && const_energy == energy);
            if prefer_constant {
                hyp = const_hyp;
                energy = const_energy;
            }
        }

        let edge = if energy.is_nan() { f64::NAN } else { hyp.edge(&self.dataset, &view, false) };
        (hyp, energy, edge)
    }

    fn test_zero_one_error(&self) -> Option<f64> {
        let test = self.test_dataset.as_ref()?;
        let rule = PredictionRule::WinnerTakesAll;
        let classifier = Classifier::new(self.ensemble.clone(), Vec::<StageMarker>::new(), rule);
        let view = InputData::new(test);
        let mut wrong = 0.0;
        let mut total = 0.0;
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            total += 1.0;
            let true_class = (0..test.n_classes())
                .find(|&l| ex.label(l).map(|lb| lb.y == Sign::Pos).unwrap_or(false));
            match classifier.posterior(test, raw) {
                crate::classifier::Outcome::Predicted(p) => {
                    if Some(p) != true_class {
                        wrong += 1.0;
                    }
                }
                crate::classifier::Outcome::Rejected { .. } => wrong += 1.0,
            }
        }
        if total > 0.0 { Some(wrong / total) } else { None }
    }
}

impl super::StrongLearner for AdaBoostMh {
    fn preprocess(&mut self) {
        let view = InputData::new(&self.dataset);
        let constant = ConstantLearner::new();
        let (hyp, energy) = constant.train(&self.dataset, &view, &self.sorted, self.config.edge_offset);
        log::info!(
            "[ ROUND -1 ] constant-classifier baseline energy={energy:.6} alpha={:.6}",
            hyp.alpha
        );
    }

    fn boost(&mut self, iteration: usize) -> State {
        if self.terminated || iteration >= self.config.iterations {
            return State::Terminate;
        }
        if self.time_exceeded() {
            log::info!("[ TLE ] time budget exceeded at iteration {iteration}");
            self.terminated = true;
            return State::Terminate;
        }

        let (hyp, energy, edge) = self.train_one();
        if energy.is_nan() {
            log::warn!("[ BREAK ] no non-degenerate weak hypothesis at iteration {iteration}");
            self.terminated = true;
            return State::Terminate;
        }

        if edge <= self.config.edge_offset {
            log::warn!(
                "edge {edge:.6} <= theta {:.6} at iteration {iteration}, continuing without this hypothesis",
                self.config.edge_offset
            );
            return State::Continue;
        }

        self.apply_weight_update(&hyp);

        let view = InputData::new(&self.dataset);
        self.output.emit(&self.dataset, &view, iteration, &hyp);
        drop(view);

        self.ensemble.push(hyp);

        if energy.abs() < ENERGY_EPS {
            log::info!("[ BREAK ] zero training energy at iteration {iteration}, stopping early");
            self.terminated = true;
            return State::Terminate;
        }

        if self.early_stopper.is_some() {
            if let Some(test_err) = self.test_zero_one_error() {
                let stop = self.early_stopper.as_mut().unwrap().record(iteration, test_err);
                if stop {
                    log::info!("[ BREAK ] early stopping at iteration {iteration}");
                    self.terminated = true;
                    return State::Terminate;
                }
            }
        }

        State::Continue
    }

    fn postprocess(self) -> Classifier {
        Classifier::new(self.ensemble, Vec::new(), PredictionRule::WinnerTakesAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainConfig;
    use crate::data::{AttributeType, Dataset, Example, Features, Label, Representation, WeightPolicy};
    use crate::output_info::OutputMetric;
    use crate::strong_learner::StrongLearner;
    use crate::weak_learner::StumpLearner;

    fn two_class_toy() -> Dataset {
        let xs = [0.0, 0.0, 1.0, 1.0];
        let ys = [Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos];
        let examples: Vec<Example> = xs.iter().zip(ys.iter()).map(|(&x, &y)| {
            Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 0.25)])
        }).collect();
        Dataset::load(
            examples,
            vec!["c0".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    /// Seed scenario 1 (§8): perfectly separable two-class data should
    /// converge to zero training error in a single boosting round.
    #[test]
    fn scenario_one_converges_in_one_round() {
        let data = two_class_toy();
        let mut config = TrainConfig::default();
        config.iterations = 5;

        let mut booster = AdaBoostMh::new(
            data,
            Box::new(StumpLearner::new()),
            config,
            vec![OutputMetric::E01],
        );
        booster.preprocess();

        let mut t = 0;
        loop {
            match booster.boost(t) {
                State::Continue => t += 1,
                State::Terminate => break,
            }
        }

        assert_eq!(booster.ensemble.len(), 1);
        let classifier = booster.postprocess();
        let data2 = two_class_toy();
        let view = InputData::new(&data2);
        for (logical, ex) in view.iter() {
            let raw = view.raw_index(logical);
            let true_class = 0;
            match classifier.posterior(&data2, raw) {
                crate::classifier::Outcome::Predicted(p) => assert_eq!(p, true_class),
                other => panic!("unexpected {other:?}"),
            }
            let _ = ex;
        }
    }
}
