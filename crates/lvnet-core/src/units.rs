//! Compile-time unit safety for low-voltage network quantities.
//!
//! Prevents mixing incompatible units like kVA and amperes, metres and
//! kilometres, or degrees and radians.
//!
//! # Design Philosophy
//!
//! Feeder and pole studies juggle many physical quantities:
//! - Apparent power (kVA) and line current (A)
//! - Voltages (V) and series impedance (Ω)
//! - Span lengths (m) and mechanical forces (daN)
//! - Cable directions (degrees or radians)
//!
//! Using raw `f64` values throughout the engines makes it easy to add a length
//! in metres to one in kilometres, or to feed degrees into `cos`. The newtype
//! wrappers in this module catch such errors at compile time.
//!
//! # Zero Runtime Overhead
//!
//! All types use `#[repr(transparent)]` ensuring they have the same memory
//! layout as `f64`, and serialize as bare numbers.
//!
//! # Usage
//!
//! ```
//! use lvnet_core::units::{Amperes, Degrees, KiloVoltAmperes, Volts};
//!
//! let load = KiloVoltAmperes(30.0) + KiloVoltAmperes(4.5);
//! let current: Amperes = load.three_phase_current(Volts(220.0));
//! assert!((current.value() - 90.54).abs() < 0.01);
//!
//! // This would NOT compile - different units
//! // let wrong = load + current;
//!
//! let angle = Degrees(90.0).to_radians();
//! assert!(angle.cos().abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Round `value` to `decimals` places, half away from zero.
///
/// Used only where results leave the engines; intermediate arithmetic always
/// keeps full precision.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Macro to implement common arithmetic operations for unit types
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

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.2} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Zero value
            pub const ZERO: Self = Self(0.0);

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

            /// Minimum of two values
            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// Maximum of two values
            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            /// Value rounded to a fixed number of decimals, for output
            #[inline]
            pub fn rounded(self, decimals: u32) -> Self {
                Self(round_to(self.0, decimals))
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
// Power and Current
// =============================================================================

/// Apparent power in kilovolt-amperes (kVA)
///
/// Demand is aggregated as apparent power; lighting loads are converted from
/// watts assuming unity power factor.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KiloVoltAmperes(pub f64);

impl_unit_ops!(KiloVoltAmperes, "kVA");

/// Current in amperes (A)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

/// Current in kiloamperes (kA), used for short-circuit levels
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kiloamperes(pub f64);

impl_unit_ops!(Kiloamperes, "kA");

impl KiloVoltAmperes {
    /// Convert a lighting load in watts (unity power factor)
    #[inline]
    pub fn from_watts(watts: f64) -> Self {
        Self(watts / 1000.0)
    }

    /// Balanced three-phase line current: I = S × 1000 / (√3 × V_line)
    #[inline]
    pub fn three_phase_current(self, line_voltage: Volts) -> Amperes {
        Amperes(self.0 * 1000.0 / (3f64.sqrt() * line_voltage.0))
    }
}

impl Amperes {
    #[inline]
    pub fn to_kiloamperes(self) -> Kiloamperes {
        Kiloamperes(self.0 / 1000.0)
    }
}

// =============================================================================
// Voltage and Impedance
// =============================================================================

/// Voltage in volts (V)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

impl_unit_ops!(Volts, "V");

/// Series impedance (or one of its components) in ohms (Ω)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

impl_unit_ops!(Ohms, "Ω");

impl Volts {
    /// Express this voltage as a percentage of a nominal voltage
    #[inline]
    pub fn percent_of(self, nominal: Volts) -> f64 {
        if nominal.0.abs() < 1e-12 {
            0.0
        } else {
            self.0 / nominal.0 * 100.0
        }
    }
}

impl Ohms {
    /// Impedance magnitude |Z| = √(R² + X²)
    #[inline]
    pub fn magnitude(resistance: Ohms, reactance: Ohms) -> Ohms {
        Ohms(resistance.0.hypot(reactance.0))
    }
}

/// Ohm's law: I = V / Z
impl Div<Ohms> for Volts {
    type Output = Amperes;
    fn div(self, rhs: Ohms) -> Self::Output {
        Amperes(self.0 / rhs.0)
    }
}

// =============================================================================
// Length and Force
// =============================================================================

/// Length in metres (m)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(pub f64);

impl_unit_ops!(Meters, "m");

impl Meters {
    #[inline]
    pub fn to_kilometers(self) -> f64 {
        self.0 / 1000.0
    }
}

/// Force in deca-newtons (daN, 1 daN = 10 N)
///
/// Pole ratings and cable tensions are quoted in daN by utility standards.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct DecaNewtons(pub f64);

impl_unit_ops!(DecaNewtons, "daN");

// =============================================================================
// Angle Units
// =============================================================================

/// Angle in radians
///
/// The natural unit for mathematical operations (sin, cos, etc.).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Radians(pub f64);

impl_unit_ops!(Radians, "rad");

/// Angle in degrees
///
/// More human-readable for display and input/output.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°");

impl Radians {
    /// Convert to degrees
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    /// Sine of the angle
    #[inline]
    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    /// Cosine of the angle
    #[inline]
    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    /// Four-quadrant angle of the vector (x, y)
    #[inline]
    pub fn atan2(y: f64, x: f64) -> Radians {
        Radians(y.atan2(x))
    }
}

impl Degrees {
    /// Convert to radians
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    /// Shift a bearing from (-360, 360) into [0, 360)
    #[inline]
    pub fn normalized(self) -> Degrees {
        if self.0 < 0.0 {
            Degrees(self.0 + 360.0)
        } else {
            self
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kva_arithmetic() {
        let s1 = KiloVoltAmperes(10.0);
        let s2 = KiloVoltAmperes(2.5);

        assert_eq!((s1 + s2).value(), 12.5);
        assert_eq!((s1 - s2).value(), 7.5);
        assert_eq!((-s1).value(), -10.0);
        assert_eq!((s1 * 2.0).value(), 20.0);
        assert_eq!((2.0 * s1).value(), 20.0);
        assert_eq!((s1 / 2.0).value(), 5.0);
        assert_eq!(s1 / s2, 4.0);
    }

    #[test]
    fn test_three_phase_current() {
        // 100 kVA at 220 V line-to-line: 100000 / (1.7320508 * 220) = 262.43 A
        let i = KiloVoltAmperes(100.0).three_phase_current(Volts(220.0));
        assert!((i.value() - 262.432).abs() < 1e-3);
        assert!((i.to_kiloamperes().value() - 0.262432).abs() < 1e-6);
    }

    #[test]
    fn test_lighting_watts() {
        assert_eq!(KiloVoltAmperes::from_watts(250.0).value(), 0.25);
    }

    #[test]
    fn test_ohms_law_and_magnitude() {
        let z = Ohms::magnitude(Ohms(3.0), Ohms(4.0));
        assert!((z.value() - 5.0).abs() < 1e-12);

        let i = Volts(127.0) / z;
        assert!((i.value() - 25.4).abs() < 1e-12);
    }

    #[test]
    fn test_voltage_percent() {
        assert!((Volts(11.0).percent_of(Volts(220.0)) - 5.0).abs() < 1e-12);
        assert_eq!(Volts(11.0).percent_of(Volts(0.0)), 0.0);
    }

    #[test]
    fn test_angle_conversion() {
        let deg = Degrees(180.0);
        let rad = deg.to_radians();

        assert!((rad.value() - std::f64::consts::PI).abs() < 1e-10);
        assert!((rad.to_degrees().value() - 180.0).abs() < 1e-10);
    }

    #[test]
    fn test_trig_functions() {
        let angle = Degrees(30.0).to_radians();

        assert!((angle.sin() - 0.5).abs() < 1e-10);
        assert!((angle.cos() - (3.0_f64).sqrt() / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_bearing_normalization() {
        let down = Radians::atan2(-1.0, 0.0).to_degrees().normalized();
        assert!((down.value() - 270.0).abs() < 1e-10);
        assert_eq!(Degrees(45.0).normalized(), Degrees(45.0));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(6.42123, 2), 6.42);
        assert_eq!(round_to(0.125, 1), 0.1);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(Amperes(157.4634).rounded(1), Amperes(157.5));
        assert_eq!(Kiloamperes(1.50049).rounded(3), Kiloamperes(1.5));
    }

    #[test]
    fn test_sum_iterator() {
        let loads = vec![
            KiloVoltAmperes(10.0),
            KiloVoltAmperes(20.0),
            KiloVoltAmperes(30.0),
        ];
        let total: KiloVoltAmperes = loads.iter().sum();

        assert_eq!(total.value(), 60.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", KiloVoltAmperes(75.0)), "75.00 kVA");
        assert_eq!(format!("{}", Degrees(45.0)), "45.00 °");
        assert_eq!(format!("{}", DecaNewtons(600.0)), "600.00 daN");
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Meters(40.5)).unwrap();
        assert_eq!(json, "40.5");
        let back: Meters = serde_json::from_str("35").unwrap();
        assert_eq!(back, Meters(35.0));
    }
}
