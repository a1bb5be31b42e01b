//! Sign/mantissa/exponent scalars: the leaf tier of the magnitude ladder.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MagnitudeError, Result};

/// A number stored as `sign * mantissa * 10^exponent`.
///
/// The mantissa is kept in `[1, 10)` (0 exactly when the value is zero) and
/// the exponent is integer-valued; every constructor and operation
/// re-normalizes to restore that invariant. The exponent lives in an `f64` so
/// intermediate results can exceed any fixed-width integer; values whose
/// native conversion would overflow saturate to the `INFINITY` sentinel
/// (exponent `f64::INFINITY`) and native NaN collapses to zero.
///
/// Usage: `ScalarMagnitude::from_f64(1500.0)` -> `1.5e3`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarMagnitude {
    pub sign: i8,
    pub mantissa: f64,
    pub exponent: f64,
}

impl ScalarMagnitude {
    pub const ZERO: ScalarMagnitude = ScalarMagnitude {
        sign: 0,
        mantissa: 0.0,
        exponent: 0.0,
    };

    pub const ONE: ScalarMagnitude = ScalarMagnitude {
        sign: 1,
        mantissa: 1.0,
        exponent: 0.0,
    };

    /// Saturation sentinel for results beyond any representable exponent.
    pub const INFINITY: ScalarMagnitude = ScalarMagnitude {
        sign: 1,
        mantissa: 1.0,
        exponent: f64::INFINITY,
    };

    pub const NEG_INFINITY: ScalarMagnitude = ScalarMagnitude {
        sign: -1,
        mantissa: 1.0,
        exponent: f64::INFINITY,
    };

    /// Builds a normalized scalar from a signed mantissa and an exponent.
    ///
    /// The mantissa may be any finite value; a fractional exponent is folded
    /// into the mantissa first so the stored exponent stays integer-valued.
    pub fn new(mantissa: f64, exponent: f64) -> Self {
        if mantissa == 0.0 || mantissa.is_nan() || exponent.is_nan() {
            return Self::ZERO;
        }
        if exponent == f64::NEG_INFINITY {
            return Self::ZERO;
        }
        if mantissa.is_infinite() || exponent == f64::INFINITY {
            return if mantissa < 0.0 {
                Self::NEG_INFINITY
            } else {
                Self::INFINITY
            };
        }

        let sign: i8 = if mantissa < 0.0 { -1 } else { 1 };
        let mut abs = mantissa.abs();
        let mut exponent = exponent;

        let floor = exponent.floor();
        if exponent != floor {
            abs *= 10f64.powf(exponent - floor);
        }
        exponent = floor;

        let shift = abs.log10().floor();
        if shift != 0.0 {
            abs /= 10f64.powf(shift);
            exponent += shift;
        }
        // powf round-off can leave the mantissa a hair outside [1, 10)
        if abs >= 10.0 {
            abs /= 10.0;
            exponent += 1.0;
        } else if abs < 1.0 {
            abs *= 10.0;
            exponent -= 1.0;
        }

        ScalarMagnitude {
            sign,
            mantissa: abs,
            exponent,
        }
    }

    pub fn from_f64(n: f64) -> Self {
        Self::new(n, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.sign == 0
    }

    fn signed_mantissa(&self) -> f64 {
        f64::from(self.sign) * self.mantissa
    }

    /// Native approximation, saturating to `±inf`/`0` outside f64 range.
    pub fn to_f64(&self) -> f64 {
        self.signed_mantissa() * 10f64.powf(self.exponent)
    }

    /// Adds two scalars. When the exponents differ by more than 15 the
    /// smaller operand is below the precision floor of a native float and the
    /// larger one is returned unchanged.
    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return *other;
        }
        if other.is_zero() {
            return *self;
        }
        if !self.exponent.is_finite() || !other.exponent.is_finite() {
            return if other.exponent > self.exponent {
                *other
            } else {
                *self
            };
        }
        let diff = self.exponent - other.exponent;
        if diff > 15.0 {
            return *self;
        }
        if diff < -15.0 {
            return *other;
        }
        let base = self.exponent.max(other.exponent);
        let a = self.signed_mantissa() * 10f64.powf(self.exponent - base);
        let b = other.signed_mantissa() * 10f64.powf(other.exponent - base);
        Self::new(a + b, base)
    }

    pub fn subtract(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn multiply(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        Self::new(
            self.signed_mantissa() * other.signed_mantissa(),
            self.exponent + other.exponent,
        )
    }

    pub fn divide(&self, other: &Self) -> Result<Self> {
        if other.mantissa == 0.0 {
            return Err(MagnitudeError::DivisionByZero);
        }
        Ok(Self::new(
            self.signed_mantissa() / other.signed_mantissa(),
            self.exponent - other.exponent,
        ))
    }

    /// Raises to a native power via `(m*10^e)^p = m^p * 10^(e*p)`.
    ///
    /// The sign of a negative base survives only for odd integer exponents;
    /// otherwise the magnitude of the power is returned.
    pub fn pow(&self, exponent: f64) -> Self {
        if self.is_zero() {
            return match exponent.partial_cmp(&0.0) {
                Some(Ordering::Equal) => Self::ONE,
                Some(Ordering::Less) => Self::INFINITY,
                _ => Self::ZERO,
            };
        }
        let mantissa = self.mantissa.powf(exponent);
        let negative = self.sign < 0 && exponent.fract() == 0.0 && (exponent.abs() % 2.0) == 1.0;
        Self::new(
            if negative { -mantissa } else { mantissa },
            self.exponent * exponent,
        )
    }

    pub fn sqrt(&self) -> Self {
        self.pow(0.5)
    }

    pub fn root(&self, n: f64) -> Self {
        self.pow(1.0 / n)
    }

    /// Rounds the mantissa to `decimals` decimal places and re-normalizes
    /// (rounding 9.9999 to two places yields 10.0, which shifts the exponent).
    pub fn round(&self, decimals: i32) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }
        let factor = 10f64.powi(decimals);
        let mantissa = (self.mantissa * factor).round() / factor;
        Self::new(f64::from(self.sign) * mantissa, self.exponent)
    }

    pub fn neg(&self) -> Self {
        ScalarMagnitude {
            sign: -self.sign,
            ..*self
        }
    }

    pub fn abs(&self) -> Self {
        ScalarMagnitude {
            sign: self.sign.abs(),
            ..*self
        }
    }

    /// Logarithm in an arbitrary base, computed in log10 space so it stays
    /// exact for exponents far beyond native range. Non-positive inputs
    /// saturate to zero.
    pub fn log(&self, base: f64) -> Self {
        if self.sign <= 0 {
            return Self::ZERO;
        }
        let log10 = self.exponent + self.mantissa.log10();
        Self::from_f64(log10 / base.log10())
    }

    pub fn log10(&self) -> Self {
        self.log(10.0)
    }

    pub fn ln(&self) -> Self {
        self.log(std::f64::consts::E)
    }

    /// `e^x`, expressed as `10^(x*log10(e))` so moderate inputs do not
    /// overflow the native exponential.
    pub fn exp(&self) -> Self {
        Self::new(1.0, self.to_f64() * std::f64::consts::LOG10_E)
    }

    pub fn sin(&self) -> Self {
        Self::from_f64(self.to_f64().sin())
    }

    pub fn cos(&self) -> Self {
        Self::from_f64(self.to_f64().cos())
    }

    pub fn tan(&self) -> Self {
        Self::from_f64(self.to_f64().tan())
    }

    pub fn asin(&self) -> Self {
        Self::from_f64(self.to_f64().asin())
    }

    pub fn acos(&self) -> Self {
        Self::from_f64(self.to_f64().acos())
    }

    pub fn atan(&self) -> Self {
        Self::from_f64(self.to_f64().atan())
    }

    pub fn floor(&self) -> Self {
        if self.exponent >= 15.0 {
            return *self;
        }
        Self::from_f64(self.to_f64().floor())
    }

    pub fn ceil(&self) -> Self {
        if self.exponent >= 15.0 {
            return *self;
        }
        Self::from_f64(self.to_f64().ceil())
    }

    pub fn min(&self, other: &Self) -> Self {
        if self.to_f64() <= other.to_f64() {
            *self
        } else {
            *other
        }
    }

    pub fn max(&self, other: &Self) -> Self {
        if self.to_f64() >= other.to_f64() {
            *self
        } else {
            *other
        }
    }
}

impl PartialOrd for ScalarMagnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.sign != other.sign {
            return Some(self.sign.cmp(&other.sign));
        }
        if self.sign == 0 {
            return Some(Ordering::Equal);
        }
        let magnitude = match self.exponent.partial_cmp(&other.exponent)? {
            Ordering::Equal => self.mantissa.partial_cmp(&other.mantissa)?,
            ord => ord,
        };
        Some(if self.sign < 0 {
            magnitude.reverse()
        } else {
            magnitude
        })
    }
}

impl fmt::Display for ScalarMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign < 0 {
            write!(f, "-{}e{}", self.mantissa, self.exponent)
        } else {
            write!(f, "{}e{}", self.mantissa, self.exponent)
        }
    }
}

impl std::str::FromStr for ScalarMagnitude {
    type Err = MagnitudeError;

    /// Parses the `[-]MeE` grammar, e.g. `1.5e3` or `-9.81e-2`. The input is
    /// re-normalized, so denormal text such as `15e2` parses to `1.5e3`.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let (sign, body) = match text.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, text),
        };
        let (mantissa_text, exponent_text) = body
            .split_once(|c| c == 'e' || c == 'E')
            .ok_or_else(|| MagnitudeError::malformed(text, "missing exponent separator"))?;
        let mantissa: f64 = mantissa_text
            .parse()
            .map_err(|_| MagnitudeError::malformed(text, "unparseable mantissa"))?;
        let exponent: f64 = exponent_text
            .parse()
            .map_err(|_| MagnitudeError::malformed(text, "unparseable exponent"))?;
        if !mantissa.is_finite() || exponent.is_nan() {
            return Err(MagnitudeError::malformed(text, "non-finite literal"));
        }
        Ok(Self::new(sign * mantissa, exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_normalized(v: &ScalarMagnitude) {
        if v.sign == 0 {
            assert_eq!(v.mantissa, 0.0);
            assert_eq!(v.exponent, 0.0);
        } else {
            assert!((1.0..10.0).contains(&v.mantissa), "mantissa {}", v.mantissa);
            assert_eq!(v.exponent, v.exponent.floor());
        }
    }

    #[test]
    fn constructs_from_native_number() {
        let v = ScalarMagnitude::from_f64(1500.0);
        assert_eq!(v.sign, 1);
        assert_eq!(v.mantissa, 1.5);
        assert_eq!(v.exponent, 3.0);
        assert_eq!(v.to_string(), "1.5e3");
    }

    #[test]
    fn constructs_negative_and_zero() {
        let neg = ScalarMagnitude::from_f64(-0.25);
        assert_eq!(neg.sign, -1);
        assert_eq!(neg.mantissa, 2.5);
        assert_eq!(neg.exponent, -1.0);

        assert_eq!(ScalarMagnitude::from_f64(0.0), ScalarMagnitude::ZERO);
        assert_normalized(&ScalarMagnitude::ZERO);
    }

    #[test]
    fn parse_round_trips() {
        for text in ["1.5e3", "-1.5e3", "9.999e-12", "1e0", "0e0", "3.7e100"] {
            let v: ScalarMagnitude = text.parse().unwrap();
            assert_normalized(&v);
            assert_eq!(v.to_string(), text);
        }
    }

    #[test]
    fn parse_renormalizes_denormal_text() {
        let v: ScalarMagnitude = "15e2".parse().unwrap();
        assert_eq!(v.mantissa, 1.5);
        assert_eq!(v.exponent, 3.0);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        for text in ["", "12", "1.5f3", "e5", "1.5e", "one e two"] {
            let err = text.parse::<ScalarMagnitude>().unwrap_err();
            assert!(err.is_parse_error(), "{text} should not parse");
        }
    }

    #[test]
    fn add_carries_into_exponent() {
        let v = ScalarMagnitude::from_f64(5e3).add(&ScalarMagnitude::from_f64(5e3));
        assert_eq!(v.mantissa, 1.0);
        assert_eq!(v.exponent, 4.0);
        assert_eq!(v.to_string(), "1e4");
    }

    #[test]
    fn add_dominance_beyond_precision_window() {
        let big: ScalarMagnitude = "1e40".parse().unwrap();
        let small: ScalarMagnitude = "1e2".parse().unwrap();
        assert_eq!(big.add(&small), big);
        assert_eq!(small.add(&big), big);
        assert_eq!(big.subtract(&small), big);
        assert_eq!(small.subtract(&big), big.neg());
    }

    #[test]
    fn additive_identity() {
        let v: ScalarMagnitude = "4.2e7".parse().unwrap();
        assert_eq!(v.add(&ScalarMagnitude::ZERO), v);
        assert_eq!(ScalarMagnitude::ZERO.add(&v), v);
    }

    #[test]
    fn subtract_exact_cancellation() {
        let v: ScalarMagnitude = "4.2e7".parse().unwrap();
        assert_eq!(v.subtract(&v), ScalarMagnitude::ZERO);
    }

    #[test]
    fn multiply_adds_exponents() {
        let a: ScalarMagnitude = "3e10".parse().unwrap();
        let b: ScalarMagnitude = "4e20".parse().unwrap();
        let v = a.multiply(&b);
        assert_eq!(v.mantissa, 1.2);
        assert_eq!(v.exponent, 31.0);
        assert_normalized(&v);
    }

    #[test]
    fn multiplicative_identity() {
        let v: ScalarMagnitude = "-2.5e13".parse().unwrap();
        assert_eq!(v.multiply(&ScalarMagnitude::ONE), v);
    }

    #[test]
    fn multiply_tracks_sign() {
        let a = ScalarMagnitude::from_f64(-2.0);
        let b = ScalarMagnitude::from_f64(3.0);
        assert_eq!(a.multiply(&b).sign, -1);
        assert_eq!(a.multiply(&a).sign, 1);
    }

    #[test]
    fn divide_subtracts_exponents() {
        let a: ScalarMagnitude = "1e10".parse().unwrap();
        let b: ScalarMagnitude = "4e2".parse().unwrap();
        let v = a.divide(&b).unwrap();
        assert_eq!(v.mantissa, 2.5);
        assert_eq!(v.exponent, 7.0);
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        let v = ScalarMagnitude::from_f64(10.0);
        assert_eq!(
            v.divide(&ScalarMagnitude::ZERO),
            Err(MagnitudeError::DivisionByZero)
        );
    }

    #[test]
    fn pow_keeps_exponent_integral() {
        let v: ScalarMagnitude = "1e7".parse().unwrap();
        let r = v.pow(0.5);
        assert_eq!(r.exponent, 3.0);
        assert!((r.mantissa - 10f64.sqrt()).abs() < 1e-12);
        assert_normalized(&r);
    }

    #[test]
    fn pow_sign_rules() {
        let v = ScalarMagnitude::from_f64(-2.0);
        assert_eq!(v.pow(3.0).sign, -1);
        assert_eq!(v.pow(2.0).sign, 1);
        assert_eq!(ScalarMagnitude::ZERO.pow(0.0), ScalarMagnitude::ONE);
        assert_eq!(ScalarMagnitude::ZERO.pow(2.0), ScalarMagnitude::ZERO);
    }

    #[test]
    fn round_can_spill_into_exponent() {
        let v = ScalarMagnitude::new(9.9999, 3.0);
        let r = v.round(2);
        assert_eq!(r.mantissa, 1.0);
        assert_eq!(r.exponent, 4.0);
    }

    #[test]
    fn log_of_huge_value_stays_finite() {
        let v: ScalarMagnitude = "1e300".parse().unwrap();
        let r = v.log10();
        assert!((r.to_f64() - 300.0).abs() < 1e-9);
        // beyond native range too
        let huge: ScalarMagnitude = "1e5000".parse().unwrap();
        assert!((huge.log10().to_f64() - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn log_of_non_positive_saturates_to_zero() {
        assert_eq!(ScalarMagnitude::from_f64(-3.0).log10(), ScalarMagnitude::ZERO);
        assert_eq!(ScalarMagnitude::ZERO.log10(), ScalarMagnitude::ZERO);
    }

    #[test]
    fn exp_escapes_native_range() {
        let v = ScalarMagnitude::from_f64(1000.0);
        let r = v.exp();
        // e^1000 = 10^434.29...
        assert_eq!(r.exponent, 434.0);
        assert_normalized(&r);
    }

    #[test]
    fn overflow_saturates_to_sentinel() {
        let v: ScalarMagnitude = "1e300".parse().unwrap();
        let r = v.pow(f64::MAX);
        assert_eq!(r, ScalarMagnitude::INFINITY);
        assert_eq!(r.neg(), ScalarMagnitude::NEG_INFINITY);
    }

    #[test]
    fn ordering_is_sign_then_exponent_then_mantissa() {
        let parse = |t: &str| t.parse::<ScalarMagnitude>().unwrap();
        assert!(parse("1e2") < parse("1e3"));
        assert!(parse("2e2") > parse("1e2"));
        assert!(parse("-1e3") < parse("-1e2"));
        assert!(parse("-1e2") < parse("1e-10"));
        assert!(parse("1e2") <= parse("1e2"));
    }

    #[test]
    fn min_max_use_native_comparison() {
        let a = ScalarMagnitude::from_f64(7.0);
        let b = ScalarMagnitude::from_f64(-3.0);
        assert_eq!(a.min(&b), b);
        assert_eq!(a.max(&b), a);
    }

    #[test]
    fn floor_and_ceil() {
        let v = ScalarMagnitude::from_f64(2.7);
        assert_eq!(v.floor().to_f64(), 2.0);
        assert_eq!(v.ceil().to_f64(), 3.0);
        // already integral beyond native precision
        let huge: ScalarMagnitude = "1.5e20".parse().unwrap();
        assert_eq!(huge.floor(), huge);
    }

    #[test]
    fn every_operation_preserves_normalization() {
        let a: ScalarMagnitude = "9.87e6".parse().unwrap();
        let b: ScalarMagnitude = "3.21e5".parse().unwrap();
        for v in [
            a.add(&b),
            a.subtract(&b),
            a.multiply(&b),
            a.divide(&b).unwrap(),
            a.pow(2.5),
            a.sqrt(),
            a.round(1),
            a.log10(),
            a.exp(),
        ] {
            assert_normalized(&v);
        }
    }
}
