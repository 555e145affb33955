//! End-to-end AdaBoost.MH scenarios (seed scenarios 1-2, SPEC_FULL.md §8).
use multiboost::prelude::*;

#[path = "support/mod.rs"]
mod support;

fn dataset_from(xs: &[f64], ys: &[Sign]) -> Dataset {
    let n = xs.len();
    let examples: Vec<Example> = xs.iter().zip(ys.iter())
        .map(|(&x, &y)| Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 1.0 / n as f64)]))
        .collect();
    Dataset::load(
        examples,
        vec!["object".into()],
        vec![AttributeType::Numeric],
        Representation::Dense,
        WeightPolicy::Proportional,
    )
}

fn run_to_completion(learner: &mut impl StrongLearner) -> usize {
    learner.preprocess();
    let mut t = 0;
    loop {
        match learner.boost(t) {
            State::Continue => t += 1,
            State::Terminate => break,
        }
        if t > 1_000 {
            panic!("strong learner failed to terminate");
        }
    }
    t
}

/// Scenario 1: N=4, x=[0,0,1,1], y=[-1,-1,+1,+1]. One perfectly separating
/// stump drives energy to zero and the single-iteration model replays to
/// perfect accuracy.
#[test]
fn scenario_one_separates_in_one_round() {
    support::init_logging();
    let data = dataset_from(&[0.0, 0.0, 1.0, 1.0], &[Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos]);

    let mut config = TrainConfig::default();
    config.iterations = 1;

    let mut ada = AdaBoostMh::new(data.clone(), Box::new(StumpLearner::new()), config, vec![]);
    run_to_completion(&mut ada);
    let classifier = ada.postprocess();

    let ensemble = classifier.ensemble();
    for (raw, ex) in data.examples().iter().enumerate() {
        let g: f64 = ensemble.iter().map(|h| h.confidence(ex, 0)).sum();
        let expected = ex.label(0).unwrap().y();
        assert_eq!(g.signum(), expected, "example {raw}: margin {g} disagreed with label {expected}");
    }
}

/// Scenario 2: three one-hot classes, two examples apiece, a single
/// class-identifying numeric feature. Three rounds of AdaBoost.MH should
/// give every example a strict positive margin on its true class and a
/// strict negative margin on every other class.
#[test]
fn scenario_two_three_class_margins_separate() {
    support::init_logging();
    let n_classes = 3;
    let xs = [0.0, 0.1, 1.0, 1.1, 2.0, 2.1];
    let classes = [0, 0, 1, 1, 2, 2];

    let examples: Vec<Example> = xs.iter().zip(classes.iter()).map(|(&x, &c)| {
        let labels = (0..n_classes)
            .map(|l| Label::new(l, if l == c { Sign::Pos } else { Sign::Neg }, 1.0 / (xs.len() * n_classes) as f64))
            .collect();
        Example::new(Features::Dense(vec![x]), labels)
    }).collect();

    let data = Dataset::load(
        examples,
        vec!["a".into(), "b".into(), "c".into()],
        vec![AttributeType::Numeric],
        Representation::Dense,
        WeightPolicy::Proportional,
    );

    let mut config = TrainConfig::default();
    config.iterations = 3;

    let mut ada = AdaBoostMh::new(data.clone(), Box::new(StumpLearner::new()), config, vec![]);
    run_to_completion(&mut ada);
    let classifier = ada.postprocess();

    let ensemble = classifier.ensemble();
    assert!(!ensemble.is_empty());

    for (raw, ex) in data.examples().iter().enumerate() {
        let true_class = classes[raw];
        let g: Vec<f64> = (0..n_classes)
            .map(|l| ensemble.iter().map(|h| h.confidence(ex, l)).sum())
            .collect();
        for l in 0..n_classes {
            if l == true_class {
                assert!(g[l] > 0.0, "example {raw}: margin on true class {l} was {}", g[l]);
            } else {
                assert!(g[l] < 0.0, "example {raw}: margin on false class {l} was {}", g[l]);
            }
        }
    }
}
