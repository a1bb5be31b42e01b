//! Second-order towers: an ultra-layer count over a tower value.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MagnitudeError, Result};
use crate::tower::TowerMagnitude;

/// Inner layer count at which a tower is compressed one ultra-layer up.
pub const LAYER_LIMIT: u32 = 1000;

/// Same shape as [`TowerMagnitude`], one level up: when the inner tower's
/// layer count itself becomes unmanageable, the tower collapses to the log10
/// of its innermost scalar and `ultra_layer` is bumped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UltraTowerMagnitude {
    pub ultra_layer: u32,
    pub value: TowerMagnitude,
}

impl UltraTowerMagnitude {
    pub const ZERO: UltraTowerMagnitude = UltraTowerMagnitude {
        ultra_layer: 0,
        value: TowerMagnitude::ZERO,
    };

    pub fn new(ultra_layer: u32, value: TowerMagnitude) -> Self {
        Self::promoted(ultra_layer, value)
    }

    pub fn from_f64(n: f64) -> Self {
        Self::promoted(0, TowerMagnitude::from_f64(n))
    }

    pub fn from_tower(value: TowerMagnitude) -> Self {
        Self::promoted(0, value)
    }

    fn promoted(ultra_layer: u32, value: TowerMagnitude) -> Self {
        let mut ultra_layer = ultra_layer;
        let mut value = value;
        while value.layer >= LAYER_LIMIT {
            let inner = value.value;
            let log10 = inner.exponent + inner.mantissa.log10();
            let mut next = TowerMagnitude::from_f64(log10);
            if inner.sign < 0 {
                next = next.neg();
            }
            value = next;
            ultra_layer += 1;
        }
        UltraTowerMagnitude { ultra_layer, value }
    }

    pub fn is_zero(&self) -> bool {
        self.ultra_layer == 0 && self.value.is_zero()
    }

    pub fn sign(&self) -> i8 {
        self.value.sign()
    }

    pub fn to_f64(&self) -> f64 {
        if self.ultra_layer == 0 {
            self.value.to_f64()
        } else if self.sign() < 0 {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.ultra_layer != other.ultra_layer {
            return if self.ultra_layer > other.ultra_layer {
                *self
            } else {
                *other
            };
        }
        Self::promoted(self.ultra_layer, self.value.add(&other.value))
    }

    pub fn subtract(&self, other: &Self) -> Self {
        if self.ultra_layer != other.ultra_layer {
            return if self.ultra_layer > other.ultra_layer {
                *self
            } else {
                other.neg()
            };
        }
        Self::promoted(self.ultra_layer, self.value.subtract(&other.value))
    }

    pub fn multiply(&self, other: &Self) -> Self {
        if self.ultra_layer != other.ultra_layer {
            return if self.ultra_layer > other.ultra_layer {
                *self
            } else {
                *other
            };
        }
        Self::promoted(self.ultra_layer, self.value.multiply(&other.value))
    }

    pub fn divide(&self, other: &Self) -> Result<Self> {
        if other.is_zero() {
            return Err(MagnitudeError::DivisionByZero);
        }
        if self.ultra_layer != other.ultra_layer {
            return Ok(if self.ultra_layer > other.ultra_layer {
                *self
            } else {
                Self::ZERO
            });
        }
        Ok(Self::promoted(
            self.ultra_layer,
            self.value.divide(&other.value)?,
        ))
    }

    pub fn pow(&self, exponent: f64) -> Self {
        Self::promoted(self.ultra_layer, self.value.pow(exponent))
    }

    pub fn sqrt(&self) -> Self {
        self.pow(0.5)
    }

    pub fn root(&self, n: f64) -> Self {
        self.pow(1.0 / n)
    }

    pub fn round(&self, decimals: i32) -> Self {
        Self::promoted(self.ultra_layer, self.value.round(decimals))
    }

    pub fn neg(&self) -> Self {
        UltraTowerMagnitude {
            ultra_layer: self.ultra_layer,
            value: self.value.neg(),
        }
    }

    pub fn abs(&self) -> Self {
        UltraTowerMagnitude {
            ultra_layer: self.ultra_layer,
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

impl PartialOrd for UltraTowerMagnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a, b) = (self.sign(), other.sign());
        if a != b {
            return Some(a.cmp(&b));
        }
        if a == 0 {
            return Some(Ordering::Equal);
        }
        if self.ultra_layer != other.ultra_layer {
            let by_layer = self.ultra_layer.cmp(&other.ultra_layer);
            return Some(if a < 0 { by_layer.reverse() } else { by_layer });
        }
        self.value.partial_cmp(&other.value)
    }
}

impl fmt::Display for UltraTowerMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ultra_layer == 0 {
            write!(f, "{}", self.value)
        } else {
            write!(f, "10##{}^^{}", self.ultra_layer, self.value)
        }
    }
}

impl std::str::FromStr for UltraTowerMagnitude {
    type Err = MagnitudeError;

    /// Accepts `"10##" ultraLayer "^^" TowerText`; anything without the
    /// `10##` marker is parsed as an ultra-layer-0 tower.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if let Some(rest) = text.strip_prefix("10##") {
            let (layer_text, inner) = rest
                .split_once("^^")
                .ok_or_else(|| MagnitudeError::malformed(text, "missing ^^ after ultra marker"))?;
            let ultra_layer: u32 = layer_text
                .parse()
                .map_err(|_| MagnitudeError::malformed(text, "unparseable ultra-layer count"))?;
            return Ok(Self::promoted(ultra_layer, inner.parse()?));
        }
        Ok(Self::promoted(0, text.parse()?))
    }
}
