//! `StumpLearner` threshold search over a full `Dataset`/`InputData` pair,
//! exercised independently of any strong learner (SPEC_FULL.md §4.4, §8.1).
use multiboost::prelude::*;

fn two_class_dataset() -> Dataset {
    let xs = [0.0, 0.0, 1.0, 1.0];
    let ys = [Sign::Neg, Sign::Neg, Sign::Pos, Sign::Pos];
    let examples: Vec<Example> = xs.iter().zip(ys.iter())
        .map(|(&x, &y)| Example::new(Features::Dense(vec![x]), vec![Label::new(0, y, 0.25)]))
        .collect();
    Dataset::load(
        examples,
        vec!["object".into()],
        vec![AttributeType::Numeric],
        Representation::Dense,
        WeightPolicy::Proportional,
    )
}

#[test]
fn stump_finds_the_separating_cut() {
    let data = two_class_dataset();
    let sorted = SortedColumn::build_all(&data);
    let view = InputData::new(&data);

    let stump = StumpLearner::new();
    let (hyp, energy) = stump.train(&data, &view, &sorted, 0.0);

    assert!(energy.abs() < 1e-9, "a perfectly separable column should drive energy to 0, got {energy}");
    let edge = hyp.edge(&data, &view, false);
    assert!(edge > 0.0, "edge should be strictly positive on separable data, got {edge}");

    match &hyp.kind {
        WeakHypothesisKind::Stump { feature, threshold, .. } => {
            assert_eq!(*feature, 0);
            assert!((0.0..1.0).contains(threshold), "threshold {threshold} should fall between the two clusters");
        }
        other => panic!("expected a Stump hypothesis, got {other:?}"),
    }
}

#[test]
fn stump_abstains_gracefully_on_a_degenerate_single_value_column() {
    let examples: Vec<Example> = (0..4).map(|_| {
        Example::new(Features::Dense(vec![1.0]), vec![Label::new(0, Sign::Pos, 0.25)])
    }).collect();
    let data = Dataset::load(
        examples,
        vec!["object".into()],
        vec![AttributeType::Numeric],
        Representation::Dense,
        WeightPolicy::Proportional,
    );
    let sorted = SortedColumn::build_all(&data);
    let view = InputData::new(&data);

    let stump = StumpLearner::new();
    let (_, energy) = stump.train(&data, &view, &sorted, 0.0);
    assert!(energy.is_nan(), "a column with a single distinct value has no valid split");
}

#[test]
fn filtering_the_view_restricts_the_scan_to_the_kept_examples() {
    let data = two_class_dataset();
    let sorted = SortedColumn::build_all(&data);
    let mut view = InputData::new(&data);
    view.filter_to_raw_indices(vec![0, 1]); // both negative examples only

    let stump = StumpLearner::new();
    let (_, energy) = stump.train(&data, &view, &sorted, 0.0);
    assert!(energy.is_nan(), "no split is possible once only one class remains in the view");
}
