use crate::error::{MathError, MathResult};
use crate::ProbabilityFunction;

/// Gaussian distribution with mean `mu` and standard deviation `sigma`.
///
/// The original implementation delegates `invcdf` to a numeric library; this
/// port uses Peter Acklam's rational approximation of the inverse normal CDF
/// (a standard closed-form technique, accurate to about `1.15e-9` absolute
/// error), and the Abramowitz–Stegun 7.1.26 rational approximation of `erf`
/// for `cdf`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normal {
    mu: f64,
    sigma: f64,
}

impl Normal {
    pub fn new(mu: f64, sigma: f64) -> MathResult<Self> {
        if !(sigma > 0.0) {
            return Err(MathError::InvalidParameter(
                "normal: sigma must be positive",
            ));
        }
        Ok(Normal { mu, sigma })
    }

    pub fn mean(&self) -> f64 {
        self.mu
    }

    pub fn stddev(&self) -> f64 {
        self.sigma
    }
}

/// Abramowitz & Stegun formula 7.1.26, |error| <= 1.5e-7.
pub(crate) fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    let y = 1.0 - poly * (-x * x).exp();
    sign * y
}

/// Peter Acklam's rational approximation of the standard normal `invcdf`.
pub(crate) fn inv_standard_normal_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_690e+02,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239e+00,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838e+00,
        -2.549_732_539_343_734e+00,
        4.374_664_141_464_968e+00,
        2.938_163_982_698_783e+00,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996e+00,
        3.754_408_661_907_416e+00,
    ];

    const P_LOW: f64 = 0.024_25;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

impl ProbabilityFunction for Normal {
    type Domain = f64;

    fn pdf(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * core::f64::consts::PI).sqrt())
    }

    fn cdf(&self, x: f64) -> f64 {
        0.5 * (1.0 + erf((x - self.mu) / (self.sigma * core::f64::consts::SQRT_2)))
    }

    fn invcdf(&self, u: f64) -> f64 {
        self.mu + self.sigma * inv_standard_normal_cdf(u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_is_the_mean() {
        let n = Normal::new(5.0, 2.0).unwrap();
        assert!((n.invcdf(0.5) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn cdf_invcdf_round_trip() {
        let n = Normal::new(3.0, 1.5).unwrap();
        for &u in &[0.05, 0.25, 0.5, 0.75, 0.95] {
            let x = n.invcdf(u);
            let back = n.cdf(x);
            assert!((back - u).abs() < 1e-6, "u={u} back={back}");
        }
    }

    #[test]
    fn rejects_nonpositive_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
    }
}
