//! `SortedColumn` / `SortedColumnView` (§4.2): the per-feature ascending
//! layout that makes threshold search linear per feature per iteration.
use fixedbitset::FixedBitSet;

use super::dataset::{AttributeType, Dataset, Representation};
use super::input_data::InputData;

/// One numeric feature column, pre-sorted ascending by value with a
/// deterministic tie-break on raw example index (§9, "Implicit
/// iteration-order contract").
///
/// For sparse datasets, only the explicitly-present `(raw_idx, value)`
/// pairs are stored here; `SortedColumn::view` synthesizes the implicit
/// zero entries for whichever examples are active in a given
/// `InputData` but absent from this column (§4.2).
#[derive(Clone)]
pub struct SortedColumn {
    /// ascending by `(value, raw_idx)`
    pairs: Vec<(usize, f64)>,
    /// `Some` for sparse columns: a dense bitset over raw indices,
    /// one bit per example, set for whichever are explicitly present
    /// in `pairs`. `None` for dense columns, where every raw index is
    /// (conceptually) present. A `FixedBitSet` is a tighter fit than a
    /// `HashSet<usize>` here since the domain is exactly `0..n_examples`.
    present: Option<FixedBitSet>,
}

impl SortedColumn {
    /// Builds every numeric column's `SortedColumn` at load time,
    /// `O(N log N)` each (§4.2).
    pub fn build_all(dataset: &Dataset) -> Vec<Option<SortedColumn>> {
        (0..dataset.n_features())
            .map(|j| match dataset.attribute_type(j) {
                AttributeType::Numeric => Some(Self::build_one(dataset, j)),
                AttributeType::Nominal(_) => None,
            })
            .collect()
    }

    fn build_one(dataset: &Dataset, feature_idx: usize) -> Self {
        let sparse = dataset.representation() == Representation::Sparse;

        let mut pairs = Vec::new();
        let mut present = sparse.then(|| FixedBitSet::with_capacity(dataset.n_examples()));

        for (raw, ex) in dataset.examples().iter().enumerate() {
            match &ex.features {
                super::example::Features::Dense(values) => {
                    let v = values[feature_idx];
                    if v.is_finite() {
                        pairs.push((raw, v));
                    }
                }
                super::example::Features::Sparse { index_of, values, .. } => {
                    if let Some(&pos) = index_of.get(&feature_idx) {
                        let v = values[pos];
                        if v.is_finite() {
                            pairs.push((raw, v));
                            if let Some(p) = present.as_mut() {
                                p.insert(raw);
                            }
                        }
                    }
                }
            }
        }

        pairs.sort_by(|a, b| {
            a.1.partial_cmp(&b.1).unwrap().then_with(|| a.0.cmp(&b.0))
        });

        Self { pairs, present }
    }

    /// Ascending `(logical index, value)` pairs reprojected onto the
    /// currently active view of `input`, with implicit sparse zeros
    /// merged in (§4.2). `O(N)` per call.
    pub fn view<'a>(&'a self, input: &'a InputData<'a>) -> Vec<(usize, f64)> {
        let Some(present) = &self.present else {
            // Dense: every raw index conceptually has a value already in
            // `pairs`; just reproject and drop filtered-out examples.
            return self.pairs.iter()
                .filter_map(|&(raw, v)| input.logical_index(raw).map(|l| (l, v)))
                .collect();
        };

        // `InputData::iter` doesn't expose raw indices directly; recompute
        // them via `raw_index` over the logical range instead.
        let mut missing: Vec<usize> = Vec::new();
        for logical in 0..input.len() {
            let raw = input.raw_index(logical);
            if !present.contains(raw) {
                missing.push(raw);
            }
        }
        missing.sort_unstable();

        let neg = self.pairs.iter()
            .filter(|&&(raw, v)| v < 0.0 && input.logical_index(raw).is_some())
            .filter_map(|&(raw, v)| input.logical_index(raw).map(|l| (l, v)));
        let zero = missing.iter()
            .map(|&raw| (input.logical_index(raw).expect("raw came from the active view"), 0.0));
        let pos = self.pairs.iter()
            .filter(|&&(raw, v)| v >= 0.0 && input.logical_index(raw).is_some())
            .filter_map(|&(raw, v)| input.logical_index(raw).map(|l| (l, v)));

        neg.chain(zero).chain(pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{AttributeType, Dataset, Representation};
    use crate::data::example::{Example, Features};
    use crate::data::label::{Label, Sign};
    use crate::data::weight_policy::WeightPolicy;

    fn dense_dataset() -> Dataset {
        let vals = [3.0, 1.0, 2.0, 1.0, f64::NAN];
        let examples = vals.iter().map(|&v| {
            Example::new(Features::Dense(vec![v]), vec![Label::new(0, Sign::Pos, 1.0)])
        }).collect();
        Dataset::load(
            examples,
            vec!["c".into()],
            vec![AttributeType::Numeric],
            Representation::Dense,
            WeightPolicy::Proportional,
        )
    }

    #[test]
    fn monotone_and_nan_excluded() {
        let data = dense_dataset();
        let cols = SortedColumn::build_all(&data);
        let col = cols[0].as_ref().unwrap();
        let view = InputData::new(&data);
        let projected = col.view(&view);

        assert_eq!(projected.len(), 4); // NaN excluded
        for w in projected.windows(2) {
            assert!(w[1].1 >= w[0].1);
        }
    }

    #[test]
    fn tie_break_is_raw_index_ascending() {
        let data = dense_dataset();
        let cols = SortedColumn::build_all(&data);
        let col = cols[0].as_ref().unwrap();
        let view = InputData::new(&data);
        let projected = col.view(&view);

        // value 1.0 appears at raw indices 1 and 3; raw 1 must sort first.
        let ones: Vec<usize> = projected.iter()
            .filter(|&&(_, v)| v == 1.0)
            .map(|&(l, _)| l)
            .collect();
        assert_eq!(ones.len(), 2);
        assert!(view.raw_index(ones[0]) < view.raw_index(ones[1]));
    }

    #[test]
    fn sparse_synthesizes_zero_entries() {
        let examples = vec![
            Example::new(Features::sparse(vec![(0, -2.0)]), vec![Label::new(0, Sign::Pos, 1.0)]),
            Example::new(Features::sparse(vec![]), vec![Label::new(0, Sign::Pos, 1.0)]),
            Example::new(Features::sparse(vec![(0, 5.0)]), vec![Label::new(0, Sign::Pos, 1.0)]),
        ];
        let data = Dataset::load(
            examples,
            vec!["c".into()],
            vec![AttributeType::Numeric],
            Representation::Sparse,
            WeightPolicy::Proportional,
        );
        let cols = SortedColumn::build_all(&data);
        let col = cols[0].as_ref().unwrap();
        let view = InputData::new(&data);
        let projected = col.view(&view);

        let values: Vec<f64> = projected.iter().map(|&(_, v)| v).collect();
        assert_eq!(values, vec![-2.0, 0.0, 5.0]);
    }
}
