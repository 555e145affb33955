//! `InputData`: a filterable presentation over an immutable `Dataset`
//! (§3, "InputData view").
use super::dataset::Dataset;
use super::example::Example;

/// Maps "logical index `0..N'-1`" to the underlying `Dataset`'s raw
/// example indices, plus the inverse map used to test membership in O(1).
///
/// Filtering never copies or reorders the underlying `Dataset` — it only
/// rebuilds these two index vectors (§3 invariant).
pub struct InputData<'a> {
    dataset: &'a Dataset,
    /// logical index -> raw index
    filter: Vec<usize>,
    /// raw index -> logical index, or `-1` if filtered out
    inverse: Vec<i64>,
}

impl<'a> InputData<'a> {
    /// The full, unfiltered view over `dataset`.
    pub fn new(dataset: &'a Dataset) -> Self {
        let n = dataset.n_examples();
        let filter: Vec<usize> = (0..n).collect();
        let inverse: Vec<i64> = (0..n as i64).collect();
        Self { dataset, filter, inverse }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Number of examples in the *current* (possibly filtered) view.
    pub fn len(&self) -> usize {
        self.filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
    }

    #[inline]
    pub fn raw_index(&self, logical: usize) -> usize {
        self.filter[logical]
    }

    /// `None` if `raw` is not part of the current view.
    #[inline]
    pub fn logical_index(&self, raw: usize) -> Option<usize> {
        match self.inverse.get(raw) {
            Some(&l) if l >= 0 => Some(l as usize),
            _ => None,
        }
    }

    pub fn example(&self, logical: usize) -> &'a Example {
        self.dataset.example(self.raw_index(logical))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Example)> + '_ {
        self.filter.iter().enumerate().map(move |(logical, &raw)| {
            (logical, self.dataset.example(raw))
        })
    }

    /// Restricts the view to the raw indices for which `keep` returns
    /// `true`. Order among the kept raw indices is preserved.
    pub fn filter_by(&mut self, keep: impl Fn(usize, &Example) -> bool) {
        let mut new_filter = Vec::with_capacity(self.filter.len());
        for &raw in &self.filter {
            if keep(raw, self.dataset.example(raw)) {
                new_filter.push(raw);
            }
        }
        self.rebuild(new_filter);
    }

    /// Restricts the view to an explicit set of raw indices, preserving
    /// the order given.
    pub fn filter_to_raw_indices(&mut self, raw_indices: Vec<usize>) {
        self.rebuild(raw_indices);
    }

    /// Restores the full, unfiltered view.
    pub fn reset(&mut self) {
        let n = self.dataset.n_examples();
        self.filter = (0..n).collect();
        self.inverse = (0..n as i64).collect();
    }

    fn rebuild(&mut self, new_filter: Vec<usize>) {
        let mut inverse = vec![-1i64; self.dataset.n_examples()];
        for (logical, &raw) in new_filter.iter().enumerate() {
            inverse[raw] = logical as i64;
        }
        self.filter = new_filter;
        self.inverse = inverse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::example::{Example, Features};
    use crate::data::dataset::{AttributeType, Representation};
    use crate::data::weight_policy::WeightPolicy;
    use crate::data::label::{Label, Sign};

    fn toy_dataset() -> Dataset {
        let examples = (0..5).map(|i| {
            let label = Label::new(0, if i % 2 == 0 { Sign::Pos } else { Sign::Neg }, 1.0);
            Example::new(Features::Dense(vec![i as f64]), vec![label])
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
    fn full_view_is_identity() {
        let data = toy_dataset();
        let view = InputData::new(&data);
        assert_eq!(view.len(), 5);
        for i in 0..5 {
            assert_eq!(view.raw_index(i), i);
            assert_eq!(view.logical_index(i), Some(i));
        }
    }

    #[test]
    fn filter_preserves_raw_ownership() {
        let data = toy_dataset();
        let mut view = InputData::new(&data);
        view.filter_by(|_, ex| matches!(ex.features, Features::Dense(ref v) if v[0] >= 2.0));
        assert_eq!(view.len(), 3);
        assert_eq!(view.raw_index(0), 2);
        assert_eq!(view.logical_index(1), None);
        assert_eq!(view.logical_index(2), Some(0));

        view.reset();
        assert_eq!(view.len(), 5);
    }
}
