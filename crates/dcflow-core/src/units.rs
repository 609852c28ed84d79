//! Unit newtypes for DC power-flow quantities.
//!
//! A DC power flow juggles four kinds of number that are all `f64` underneath:
//! per-unit real power (injections and flows), per-unit line reactance, its
//! reciprocal susceptance, and bus voltage angles. Mixing them up (adding an
//! angle to a flow, or feeding a reactance where a susceptance belongs) is the
//! classic DC power-flow bug, so each gets its own type.
//!
//! All types are `#[repr(transparent)]` over `f64`.
//!
//! # Usage
//!
//! ```
//! use dcflow_core::units::{PerUnit, Radians, ReactancePu};
//!
//! let injection = PerUnit(1.0);
//! let x = ReactancePu(0.1);
//! let b = x.to_susceptance();
//! assert!((b.value() - 10.0).abs() < 1e-12);
//!
//! // Flow across a line from an angle difference
//! let flow = b.flow(Radians(0.02), Radians(0.0));
//! assert!((flow.value() - 0.2).abs() < 1e-12);
//!
//! // let wrong = injection + x; // does not compile
//! # let _ = injection;
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Implements arithmetic, `Display`, and helpers shared by every unit type
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*} {}", p, self.0, $unit_name),
                    None => write!(f, "{:.4} {}", self.0, $unit_name),
                }
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Absolute value
            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Check if value is finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Power
// =============================================================================

/// Real power in per-unit of the system MVA base.
///
/// Used for bus net injections (generation minus load) and line flows.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

/// Real power in megawatts, for display against a chosen MVA base.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW");

impl PerUnit {
    pub const ZERO: Self = Self(0.0);

    /// Scale to megawatts on a system base of `base_mva`.
    #[inline]
    pub fn to_megawatts(self, base_mva: f64) -> Megawatts {
        Megawatts(self.0 * base_mva)
    }
}

impl Megawatts {
    /// Convert to per-unit on `base_mva`. A zero base yields zero.
    #[inline]
    pub fn to_per_unit(self, base_mva: f64) -> PerUnit {
        if base_mva.abs() < 1e-12 {
            PerUnit(0.0)
        } else {
            PerUnit(self.0 / base_mva)
        }
    }
}

// =============================================================================
// Line parameters
// =============================================================================

/// Series reactance of a line in per-unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ReactancePu(pub f64);

impl_unit_ops!(ReactancePu, "pu");

/// Series susceptance of a line in per-unit, `1 / x` under the DC approximation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SusceptancePu(pub f64);

impl_unit_ops!(SusceptancePu, "pu");

impl ReactancePu {
    /// `b = 1 / x`. Callers validate `x > 0` first; a zero reactance gives infinity.
    #[inline]
    pub fn to_susceptance(self) -> SusceptancePu {
        SusceptancePu(1.0 / self.0)
    }

    /// A usable DC line reactance is strictly positive and finite.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl SusceptancePu {
    /// Real power flowing from the bus at `theta_from` to the bus at `theta_to`.
    #[inline]
    pub fn flow(self, theta_from: Radians, theta_to: Radians) -> PerUnit {
        PerUnit(self.0 * (theta_from.0 - theta_to.0))
    }
}

// =============================================================================
// Angles
// =============================================================================

/// Bus voltage angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees, for display
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    /// The slack reference angle
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}
