use crate::error::{MathError, MathResult};
use crate::histogram::combined::CombinedHistogram;
use crate::histogram::value::HistogramValue;

struct ConditionBucket<C> {
    min: C,
    max: C,
}

/// A partition of a condition domain `C` into buckets, each holding an
/// independent [`CombinedHistogram`] over the value domain `T`. Grounded in
/// `ConditionalCombinedPrFunction.h`.
pub struct ConditionalCombinedHistogram<C, T> {
    buckets: Vec<ConditionBucket<C>>,
    inner: Vec<CombinedHistogram<T>>,
}

impl<C: HistogramValue, T: HistogramValue> ConditionalCombinedHistogram<C, T> {
    pub fn new(buckets: Vec<(C, C, CombinedHistogram<T>)>) -> MathResult<Self> {
        if buckets.is_empty() {
            return Err(MathError::EmptyDomain);
        }

        let mut cond_buckets = Vec::with_capacity(buckets.len());
        let mut inner = Vec::with_capacity(buckets.len());
        for (min, max, hist) in buckets {
            cond_buckets.push(ConditionBucket { min, max });
            inner.push(hist);
        }

        for (i, w) in cond_buckets.windows(2).enumerate() {
            if w[0].max.to_f64() > w[1].min.to_f64() {
                return Err(MathError::OverlappingConditionBuckets { index: i + 1 });
            }
        }

        Ok(ConditionalCombinedHistogram {
            buckets: cond_buckets,
            inner,
        })
    }

    fn bucket_for(&self, condition: C) -> Option<usize> {
        let c = condition.to_f64();
        self.buckets
            .iter()
            .position(|b| c >= b.min.to_f64() && c < b.max.to_f64())
    }

    pub fn inner_for(&self, condition: C) -> Option<&CombinedHistogram<T>> {
        self.bucket_for(condition).map(|i| &self.inner[i])
    }

    pub fn cdf(&self, x: T, condition: C) -> Option<f64> {
        self.inner_for(condition).map(|h| h.cdf(x))
    }

    pub fn sample(&self, u: f64, condition: C) -> Option<T> {
        self.inner_for(condition).and_then(|h| h.sample(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> ConditionalCombinedHistogram<i64, i64> {
        let low = CombinedHistogram::new(vec![(1, 1.0)], vec![], 0.0).unwrap();
        let mid = CombinedHistogram::new(vec![], vec![(0, 100, 1.0)], 0.0).unwrap();
        let high = CombinedHistogram::new(vec![(9, 1.0)], vec![], 0.0).unwrap();
        ConditionalCombinedHistogram::new(vec![(0, 10, low), (10, 20, mid), (20, 30, high)])
            .unwrap()
    }

    #[test]
    fn scenario_six_from_spec() {
        let hist = build();
        // condition field 17 lands in bucket #2 ([10, 20)); sample(0.5) must
        // equal that bucket's own invcdf(0.5).
        let bucket_two = hist.inner_for(17).unwrap();
        assert_eq!(hist.sample(0.5, 17), bucket_two.sample(0.5));
    }

    #[test]
    fn condition_outside_every_bucket_is_none() {
        let hist = build();
        assert!(hist.inner_for(100).is_none());
    }

    #[test]
    fn rejects_overlapping_condition_buckets() {
        let a = CombinedHistogram::new(vec![(1i64, 1.0)], vec![], 0.0).unwrap();
        let b = CombinedHistogram::new(vec![(2i64, 1.0)], vec![], 0.0).unwrap();
        let err = ConditionalCombinedHistogram::new(vec![(0, 10, a), (5, 20, b)]).unwrap_err();
        assert!(matches!(err, MathError::OverlappingConditionBuckets { .. }));
    }
}
