use crate::error::{MathError, MathResult};
use crate::ProbabilityFunction;

/// Pareto type-I distribution with scale `xm` (the minimum value) and shape
/// `alpha`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pareto {
    xm: f64,
    alpha: f64,
}

impl Pareto {
    pub fn new(xm: f64, alpha: f64) -> MathResult<Self> {
        if !(xm > 0.0) {
            return Err(MathError::InvalidParameter("pareto: xm must be positive"));
        }
        if !(alpha > 0.0) {
            return Err(MathError::InvalidParameter(
                "pareto: alpha must be positive",
            ));
        }
        Ok(Pareto { xm, alpha })
    }

    pub fn scale(&self) -> f64 {
        self.xm
    }

    pub fn shape(&self) -> f64 {
        self.alpha
    }
}

impl ProbabilityFunction for Pareto {
    type Domain = f64;

    fn pdf(&self, x: f64) -> f64 {
        if x < self.xm {
            0.0
        } else {
            self.alpha * self.xm.powf(self.alpha) / x.powf(self.alpha + 1.0)
        }
    }

    fn cdf(&self, x: f64) -> f64 {
        if x < self.xm {
            0.0
        } else {
            1.0 - (self.xm / x).powf(self.alpha)
        }
    }

    fn invcdf(&self, u: f64) -> f64 {
        let u = u.clamp(0.0, 1.0 - 1e-15);
        self.xm / (1.0 - u).powf(1.0 / self.alpha)
    }
}
