//! Power-tower magnitudes: a layer count over a scalar value.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MagnitudeError, Result};
use crate::scalar::ScalarMagnitude;

/// Exponent bound above which a scalar is compressed one layer up.
pub const PROMOTION_EXPONENT: f64 = 1e7;

/// A magnitude stored as an iterated power tower.
///
/// `layer = 0` means `value` is the number itself; `layer = k` means the
/// number is `10^10^...^value`, k tens deep. Whenever the inner exponent
/// reaches [`PROMOTION_EXPONENT`] the value is replaced by its own log10 and
/// the layer is bumped; promotion is one-directional and there is no
/// automatic demotion. The overall sign is the inner scalar's sign, so
/// `10^^-5e2` reads as `-(10^(5e2))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerMagnitude {
    pub layer: u32,
    pub value: ScalarMagnitude,
}

impl TowerMagnitude {
    pub const ZERO: TowerMagnitude = TowerMagnitude {
        layer: 0,
        value: ScalarMagnitude::ZERO,
    };

    pub const ONE: TowerMagnitude = TowerMagnitude {
        layer: 0,
        value: ScalarMagnitude::ONE,
    };

    /// Builds a tower from parts and runs the promotion loop.
    pub fn new(layer: u32, value: ScalarMagnitude) -> Self {
        Self::promoted(layer, value)
    }

    pub fn from_f64(n: f64) -> Self {
        Self::promoted(0, ScalarMagnitude::from_f64(n))
    }

    pub fn from_scalar(value: ScalarMagnitude) -> Self {
        Self::promoted(0, value)
    }

    /// The compression loop: while the inner exponent is at or above the
    /// threshold, replace the value with `exponent + log10(mantissa)` and
    /// climb a layer. The saturation sentinel (infinite exponent) is left
    /// where it is, since its log is itself.
    fn promoted(layer: u32, value: ScalarMagnitude) -> Self {
        let mut layer = layer;
        let mut value = value;
        while value.exponent.is_finite() && value.exponent >= PROMOTION_EXPONENT {
            let log10 = value.exponent + value.mantissa.log10();
            let mut next = ScalarMagnitude::from_f64(log10);
            if value.sign < 0 {
                next = next.neg();
            }
            value = next;
            layer += 1;
        }
        TowerMagnitude { layer, value }
    }

    pub fn is_zero(&self) -> bool {
        self.layer == 0 && self.value.is_zero()
    }

    pub fn sign(&self) -> i8 {
        self.value.sign
    }

    /// Native approximation; anything above layer 0 is infinite at native
    /// scale.
    pub fn to_f64(&self) -> f64 {
        if self.layer == 0 {
            self.value.to_f64()
        } else if self.sign() < 0 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    /// Adds two towers. Operands of different layers never meet within
    /// representable precision, so the higher layer wins outright; at equal
    /// layers above zero the larger inner value wins for the same reason.
    pub fn add(&self, other: &Self) -> Self {
        if self.layer != other.layer {
            return if self.layer > other.layer {
                *self
            } else {
                *other
            };
        }
        if self.layer == 0 {
            return Self::promoted(0, self.value.add(&other.value));
        }
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Less) => *other,
            _ => *self,
        }
    }

    pub fn subtract(&self, other: &Self) -> Self {
        if self.layer != other.layer {
            return if self.layer > other.layer {
                *self
            } else {
                other.neg()
            };
        }
        if self.layer == 0 {
            return Self::promoted(0, self.value.subtract(&other.value));
        }
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Less) => other.neg(),
            Some(Ordering::Equal) => Self::ZERO,
            _ => *self,
        }
    }

    /// Multiplies two towers. At layer 0 this is scalar multiplication; one
    /// layer up, `10^a * 10^b = 10^(a+b)` turns it into addition of the inner
    /// values, and the same reduction applies at every higher layer.
    pub fn multiply(&self, other: &Self) -> Self {
        if self.layer != other.layer {
            return if self.layer > other.layer {
                *self
            } else {
                *other
            };
        }
        if self.layer == 0 {
            Self::promoted(0, self.value.multiply(&other.value))
        } else {
            Self::promoted(self.layer, self.value.add(&other.value))
        }
    }

    /// Division mirrors `multiply`: inner subtraction above layer 0. A
    /// higher-layer divisor collapses the quotient to zero.
    pub fn divide(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(MagnitudeError::DivisionByZero);
        }
        if self.layer != other.layer {
            return Ok(if self.layer > other.layer {
                *self
            } else {
                Self::ZERO
            });
        }
        if self.layer == 0 {
            Ok(Self::promoted(0, self.value.divide(&other.value)?))
        } else {
            Ok(Self::promoted(self.layer, self.value.subtract(&other.value)))
        }
    }

    pub fn pow(&self, exponent: f64) -> Self {
        Self::promoted(self.layer, self.value.pow(exponent))
    }

    pub fn sqrt(&self) -> Self {
        self.pow(0.5)
    }

    pub fn root(&self, n: f64) -> Self {
        self.pow(1.0 / n)
    }

    pub fn round(&self, decimals: i32) -> Self {
        Self::promoted(self.layer, self.value.round(decimals))
    }

    pub fn neg(&self) -> Self {
        TowerMagnitude {
            layer: self.layer,
            value: self.value.neg(),
        }
    }

    pub fn abs(&self) -> Self {
        TowerMagnitude {
            layer: self.layer,
            value: self.value.abs(),
        }
    }

    pub fn min(&self, other: &Self) -> Self {
        match self.partial_cmp(other) {
            Some(Ordering::Greater) => *other,
            _ => *self,
        }
    }

    pub fn max(&self, other: &Self) -> Self {
        match self.partial_cmp(other) {
            Some(Ordering::Less) => *other,
            _ => *self,
        }
    }
}

impl PartialOrd for TowerMagnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a, b) = (self.sign(), other.sign());
        if a != b {
            return Some(a.cmp(&b));
        }
        if a == 0 {
            return Some(Ordering::Equal);
        }
        if self.layer != other.layer {
            let by_layer = self.layer.cmp(&other.layer);
            return Some(if a < 0 { by_layer.reverse() } else { by_layer });
        }
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for TowerMagnitude {
    /// Layer 0 renders as the bare scalar; layers 1..=10 as `10^^...`, one
    /// `^^` per layer; deeper towers use the compact `10#<layer>^^` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.layer == 0 {
            write!(f, "{}", self.value)
        } else if self.layer > 10 {
            write!(f, "10#{}^^{}", self.layer, self.value)
        } else {
            write!(f, "10{}{}", "^^".repeat(self.layer as usize), self.value)
        }
    }
}

impl std::str::FromStr for TowerMagnitude {
    type Err = MagnitudeError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if let Some(rest) = text.strip_prefix("10#") {
            if !rest.starts_with('#') {
                let (layer_text, inner) = rest
                    .split_once("^^")
                    .ok_or_else(|| MagnitudeError::malformed(text, "missing ^^ after layer marker"))?;
                let layer: u32 = layer_text
                    .parse()
                    .map_err(|_| MagnitudeError::malformed(text, "unparseable layer count"))?;
                return Ok(Self::promoted(layer, inner.parse()?));
            }
        }
        if text.contains("^^") {
            let parts: Vec<&str> = text.split("^^").collect();
            let middle_empty = parts[1..parts.len() - 1].iter().all(|p| p.is_empty());
            if parts[0] != "10" || !middle_empty {
                return Err(MagnitudeError::malformed(text, "mismatched tower marker"));
            }
            let layer = (parts.len() - 1) as u32;
            return Ok(Self::promoted(layer, parts[parts.len() - 1].parse()?));
        }
        Ok(Self::promoted(0, text.parse()?))
    }
}
