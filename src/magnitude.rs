//! A tagged union over the three magnitude tiers.
//!
//! Code that has to handle "a number at some tier" matches on this enum
//! instead of inspecting structural shape; binary operations widen both
//! operands to the wider tier and stay there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scalar::ScalarMagnitude;
use crate::tower::TowerMagnitude;
use crate::ultra::UltraTowerMagnitude;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Magnitude {
    Scalar(ScalarMagnitude),
    Tower(TowerMagnitude),
    Ultra(UltraTowerMagnitude),
}

impl Magnitude {
    pub const ZERO: Magnitude = Magnitude::Scalar(ScalarMagnitude::ZERO);
    pub const ONE: Magnitude = Magnitude::Scalar(ScalarMagnitude::ONE);

    pub fn from_f64(n: f64) -> Self {
        Magnitude::Scalar(ScalarMagnitude::from_f64(n))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Magnitude::Scalar(v) => v.is_zero(),
            Magnitude::Tower(v) => v.is_zero(),
            Magnitude::Ultra(v) => v.is_zero(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Magnitude::Scalar(v) => v.to_f64(),
            Magnitude::Tower(v) => v.to_f64(),
            Magnitude::Ultra(v) => v.to_f64(),
        }
    }

    fn as_tower(&self) -> TowerMagnitude {
        match self {
            Magnitude::Scalar(v) => TowerMagnitude::from_scalar(*v),
            Magnitude::Tower(v) => *v,
            // binary ops widen to Ultra whenever either side is Ultra, so
            // this arm only ever sees ultra-layer-0 values
            Magnitude::Ultra(v) => v.value,
        }
    }

    fn as_ultra(&self) -> UltraTowerMagnitude {
        match self {
            Magnitude::Scalar(v) => {
                UltraTowerMagnitude::from_tower(TowerMagnitude::from_scalar(*v))
            }
            Magnitude::Tower(v) => UltraTowerMagnitude::from_tower(*v),
            Magnitude::Ultra(v) => *v,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(a.add(b)),
            (Magnitude::Ultra(_), _) | (_, Magnitude::Ultra(_)) => {
                Magnitude::Ultra(self.as_ultra().add(&other.as_ultra()))
            }
            _ => Magnitude::Tower(self.as_tower().add(&other.as_tower())),
        }
    }

    pub fn subtract(&self, other: &Self) -> Self {
        match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(a.subtract(b)),
            (Magnitude::Ultra(_), _) | (_, Magnitude::Ultra(_)) => {
                Magnitude::Ultra(self.as_ultra().subtract(&other.as_ultra()))
            }
            _ => Magnitude::Tower(self.as_tower().subtract(&other.as_tower())),
        }
    }

    pub fn multiply(&self, other: &Self) -> Self {
        match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(a.multiply(b)),
            (Magnitude::Ultra(_), _) | (_, Magnitude::Ultra(_)) => {
                Magnitude::Ultra(self.as_ultra().multiply(&other.as_ultra()))
            }
            _ => Magnitude::Tower(self.as_tower().multiply(&other.as_tower())),
        }
    }

    pub fn divide(&self, other: &Self) -> Result<Self> {
        Ok(match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(a.divide(b)?),
            (Magnitude::Ultra(_), _) | (_, Magnitude::Ultra(_)) => {
                Magnitude::Ultra(self.as_ultra().divide(&other.as_ultra())?)
            }
            _ => Magnitude::Tower(self.as_tower().divide(&other.as_tower())?),
        })
    }

    pub fn pow(&self, exponent: f64) -> Self {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(v.pow(exponent)),
            Magnitude::Tower(v) => Magnitude::Tower(v.pow(exponent)),
            Magnitude::Ultra(v) => Magnitude::Ultra(v.pow(exponent)),
        }
    }

    pub fn sqrt(&self) -> Self {
        self.pow(0.5)
    }

    pub fn round(&self, decimals: i32) -> Self {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(v.round(decimals)),
            Magnitude::Tower(v) => Magnitude::Tower(v.round(decimals)),
            Magnitude::Ultra(v) => Magnitude::Ultra(v.round(decimals)),
        }
    }

    pub fn neg(&self) -> Self {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(v.neg()),
            Magnitude::Tower(v) => Magnitude::Tower(v.neg()),
            Magnitude::Ultra(v) => Magnitude::Ultra(v.neg()),
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(v.abs()),
            Magnitude::Tower(v) => Magnitude::Tower(v.abs()),
            Magnitude::Ultra(v) => Magnitude::Ultra(v.abs()),
        }
    }

    /// Logarithm in a native base. Exact for scalars (and layer-0 wrappers);
    /// anything above layer 0 collapses through the native approximation and
    /// saturates.
    pub fn log(&self, base: f64) -> Self {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(v.log(base)),
            Magnitude::Tower(v) if v.layer == 0 => Magnitude::Scalar(v.value.log(base)),
            Magnitude::Ultra(v) if v.ultra_layer == 0 && v.value.layer == 0 => {
                Magnitude::Scalar(v.value.value.log(base))
            }
            _ => Magnitude::Scalar(ScalarMagnitude::from_f64(self.to_f64()).log(base)),
        }
    }

    pub fn log10(&self) -> Self {
        self.log(10.0)
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Scalar(v) => write!(f, "{v}"),
            Magnitude::Tower(v) => write!(f, "{v}"),
            Magnitude::Ultra(v) => write!(f, "{v}"),
        }
    }
}

impl std::str::FromStr for Magnitude {
    type Err = crate::error::MagnitudeError;

    /// Dispatches on the wire markers: `10##` selects the ultra tier, `^^`
    /// or `10#` the tower tier, anything else the scalar grammar.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.starts_with("10##") {
            return Ok(Magnitude::Ultra(text.parse()?));
        }
        if text.contains("^^") || text.starts_with("10#") {
            return Ok(Magnitude::Tower(text.parse()?));
        }
        Ok(Magnitude::Scalar(text.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Magnitude {
        text.parse().unwrap()
    }

    #[test]
    fn parse_dispatches_on_markers() {
        assert!(matches!(parse("1.5e3"), Magnitude::Scalar(_)));
        assert!(matches!(parse("10^^5e2"), Magnitude::Tower(_)));
        assert!(matches!(parse("10#12^^5e2"), Magnitude::Tower(_)));
        assert!(matches!(parse("10##2^^10^^1e5"), Magnitude::Ultra(_)));
    }

    #[test]
    fn display_round_trips_each_tier() {
        for text in ["1.5e3", "10^^5e2", "10#12^^5e2", "10##2^^10^^1e5"] {
            assert_eq!(parse(text).to_string(), text);
        }
    }

    #[test]
    fn mixed_tier_operations_widen() {
        let scalar = parse("1e100");
        let tower = parse("10^^5e2");
        let sum = scalar.add(&tower);
        assert!(matches!(sum, Magnitude::Tower(t) if t.layer == 1));

        let ultra = parse("10##2^^1e5");
        assert!(matches!(tower.add(&ultra), Magnitude::Ultra(_)));
    }

    #[test]
    fn scalar_operations_stay_scalar() {
        let v = parse("5e3").add(&parse("5e3"));
        assert_eq!(v, parse("1e4"));
    }

    #[test]
    fn divide_propagates_errors_across_tiers() {
        let tower = parse("10^^5e2");
        assert!(tower.divide(&Magnitude::ZERO).is_err());
    }

    #[test]
    fn log_of_layer_zero_wrapper_is_exact() {
        let v = Magnitude::Tower(crate::tower::TowerMagnitude::from_f64(1e5));
        let r = v.log10();
        assert!((r.to_f64() - 5.0).abs() < 1e-12);
    }
}
