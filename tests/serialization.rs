//! Serialize-and-reload round trip (seed scenario 6, SPEC_FULL.md §8):
//! a model trained on the three-class scenario must reproduce an
//! identical confusion matrix after a round trip through the tagged-text
//! model format.
use multiboost::prelude::*;
use multiboost::serialization::{read_model, write_model};

fn three_class_dataset() -> Dataset {
    let n_classes = 3;
    let xs = [0.0, 0.1, 1.0, 1.1, 2.0, 2.1];
    let classes = [0, 0, 1, 1, 2, 2];

    let examples: Vec<Example> = xs.iter().zip(classes.iter()).map(|(&x, &c)| {
        let labels = (0..n_classes)
            .map(|l| Label::new(l, if l == c { Sign::Pos } else { Sign::Neg }, 1.0 / (xs.len() * n_classes) as f64))
            .collect();
        Example::new(Features::Dense(vec![x]), labels)
    }).collect();

    Dataset::load(
        examples,
        vec!["a".into(), "b".into(), "c".into()],
        vec![AttributeType::Numeric],
        Representation::Dense,
        WeightPolicy::Proportional,
    )
}

#[test]
fn reloaded_model_reproduces_the_same_confusion_matrix() {
    let data = three_class_dataset();

    let mut config = TrainConfig::default();
    config.iterations = 10;

    let mut ada = AdaBoostMh::new(data.clone(), Box::new(StumpLearner::new()), config, vec![]);
    ada.preprocess();
    let mut t = 0;
    loop {
        match ada.boost(t) {
            State::Continue => t += 1,
            State::Terminate => break,
        }
        if t > 1_000 {
            panic!("failed to terminate");
        }
    }
    let classifier = ada.postprocess();

    let view = InputData::new(&data);
    let before = classifier.confusion_matrix(&data, &view);

    let mut buf = Vec::new();
    write_model(&mut buf, classifier.ensemble(), &[]).expect("write_model");
    let text = String::from_utf8(buf).expect("utf8 model text");

    let (ensemble, stages) = read_model(&text).expect("read_model");
    assert!(stages.is_empty());
    let reloaded = Classifier::new(ensemble, stages, PredictionRule::WinnerTakesAll);

    let after = reloaded.confusion_matrix(&data, &view);
    assert_eq!(before, after, "confusion matrix changed after a round trip through the model file");
}

#[test]
fn reloaded_posteriors_match_to_full_precision() {
    let data = three_class_dataset();
    let mut config = TrainConfig::default();
    config.iterations = 5;

    let mut ada = AdaBoostMh::new(data.clone(), Box::new(StumpLearner::new()), config, vec![]);
    ada.preprocess();
    let mut t = 0;
    loop {
        match ada.boost(t) {
            State::Continue => t += 1,
            State::Terminate => break,
        }
        if t > 1_000 {
            panic!("failed to terminate");
        }
    }
    let classifier = ada.postprocess();

    let mut buf = Vec::new();
    write_model(&mut buf, classifier.ensemble(), &[]).expect("write_model");
    let text = String::from_utf8(buf).expect("utf8 model text");
    let (ensemble, stages) = read_model(&text).expect("read_model");
    let reloaded = Classifier::new(ensemble, stages, PredictionRule::WinnerTakesAll);

    for raw in 0..data.n_examples() {
        let ex = data.example(raw);
        for l in 0..data.n_classes() {
            let original: f64 = classifier.ensemble().iter().map(|h| h.confidence(ex, l)).sum();
            let round_tripped: f64 = reloaded.ensemble().iter().map(|h| h.confidence(ex, l)).sum();
            assert_eq!(original.to_bits(), round_tripped.to_bits(), "raw={raw} class={l}");
        }
    }
}
