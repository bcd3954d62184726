use crate::error::{MathError, MathResult};
use crate::parametric::{Normal, Pareto};
use crate::ProbabilityFunction;

/// A `Normal` truncated to `[min, max)`, re-parameterised by clipping the
/// inner CDF to the allowed sub-interval — matches
/// `BoundedNormalPrFunction` in the original implementation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundedNormal {
    inner: Normal,
    min: f64,
    max: f64,
    cdf_min: f64,
    cdf_span: f64,
}

impl BoundedNormal {
    pub fn new(inner: Normal, min: f64, max: f64) -> MathResult<Self> {
        if !(max > min) {
            return Err(MathError::EmptyBoundedInterval { min, max });
        }
        let cdf_min = inner.cdf(min);
        let cdf_max = inner.cdf(max);
        let cdf_span = cdf_max - cdf_min;
        if cdf_span <= 0.0 {
            return Err(MathError::EmptyBoundedInterval { min, max });
        }
        Ok(BoundedNormal {
            inner,
            min,
            max,
            cdf_min,
            cdf_span,
        })
    }
}

impl ProbabilityFunction for BoundedNormal {
    type Domain = f64;

    fn pdf(&self, x: f64) -> f64 {
        if x < self.min || x >= self.max {
            0.0
        } else {
            self.inner.pdf(x) / self.cdf_span
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x < self.min {
            0.0
        } else if x >= self.max {
            1.0
        } else {
            (self.inner.cdf(x) - self.cdf_min) / self.cdf_span
        }
    }

    fn invcdf(&self, u: f64) -> f64 {
        let clipped = self.cdf_min + u.clamp(0.0, 1.0) * self.cdf_span;
        self.inner.invcdf(clipped).clamp(self.min, self.max)
    }
}

/// A `Pareto` truncated to `[min, max)`, re-parameterised the same way as
/// [`BoundedNormal`] — matches `BoundedParetoPrFunction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundedPareto {
    inner: Pareto,
    min: f64,
    max: f64,
    cdf_min: f64,
    cdf_span: f64,
}

impl BoundedPareto {
    pub fn new(inner: Pareto, min: f64, max: f64) -> MathResult<Self> {
        if !(max > min) {
            return Err(MathError::EmptyBoundedInterval { min, max });
        }
        let cdf_min = inner.cdf(min);
        let cdf_max = inner.cdf(max);
        let cdf_span = cdf_max - cdf_min;
        if cdf_span <= 0.0 {
            return Err(MathError::EmptyBoundedInterval { min, max });
        }
        Ok(BoundedPareto {
            inner,
            min,
            max,
            cdf_min,
            cdf_span,
        })
    }
}

impl ProbabilityFunction for BoundedPareto {
    type Domain = f64;

    fn pdf(&self, x: f64) -> f64 {
        if x < self.min || x >= self.max {
            0.0
        } else {
            self.inner.pdf(x) / self.cdf_span
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x < self.min {
            0.0
        } else if x >= self.max {
            1.0
        } else {
            (self.inner.cdf(x) - self.cdf_min) / self.cdf_span
        }
    }

    fn invcdf(&self, u: f64) -> f64 {
        let clipped = self.cdf_min + u.clamp(0.0, 1.0) * self.cdf_span;
        self.inner.invcdf(clipped).clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_normal_stays_within_bounds() {
        let b = BoundedNormal::new(Normal::new(0.0, 1.0).unwrap(), -1.0, 1.0).unwrap();
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            let x = b.invcdf(u);
            assert!(x >= -1.0 && x <= 1.0, "u={u} x={x}");
        }
    }

    #[test]
    fn bounded_pareto_stays_within_bounds() {
        let b = BoundedPareto::new(Pareto::new(1.0, 2.0).unwrap(), 1.0, 5.0).unwrap();
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            let x = b.invcdf(u);
            assert!(x >= 1.0 && x <= 5.0, "u={u} x={x}");
        }
    }

    #[test]
    fn rejects_empty_interval() {
        let n = Normal::new(0.0, 1.0).unwrap();
        assert!(BoundedNormal::new(n, 2.0, 1.0).is_err());
    }
}
