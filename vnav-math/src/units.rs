use std::f64::consts::FRAC_PI_2;
use std::marker::PhantomData;
use std::{cmp, fmt, iter, ops};

use crate::AssertApproxError;

mod altitude;
pub use altitude::Altitude;
mod serial;
pub use serial::SerialUnit;
mod temp;
pub use temp::{Temp, TempDelta};

/// Converts nautical miles to feet.
pub const FEET_PER_NM: f64 = 6076.12;
/// Converts nautical miles to meters.
pub const METERS_PER_NM: f64 = 1852.;
/// Converts pounds to kilograms.
pub const KG_PER_POUND: f64 = 0.45359237;
/// Converts pound-force to newtons.
pub const NEWTONS_PER_POUND_FORCE: f64 = 4.4482216;
/// Converts minutes to seconds.
pub const SECONDS_PER_MINUTE: f64 = 60.;
/// Converts hours to seconds.
pub const SECONDS_PER_HOUR: f64 = 3600.;

/// A scalar physical quantity with a compile-time dimension.
///
/// `Base` identifies the base dimension and `Dt` the number of times it is differentiated over
/// time, e.g. `Quantity<LengthBase, DtOne>` is a speed.
pub struct Quantity<Base, Dt>(pub f64, pub PhantomData<(Base, Dt)>);

impl<Base, Dt> Quantity<Base, Dt> {
    pub const ZERO: Self = Self(0., PhantomData);

    #[must_use]
    pub const fn new(value: f64) -> Self { Self(value, PhantomData) }

    #[must_use]
    pub const fn into_raw(self) -> f64 { self.0 }

    #[must_use]
    pub fn lerp(self, other: Self, s: f64) -> Self { Self::new(self.0 + (other.0 - self.0) * s) }

    #[must_use]
    pub fn is_positive(self) -> bool { self.0 > 0. }

    #[must_use]
    pub fn is_negative(self) -> bool { self.0 < 0. }

    #[must_use]
    pub fn is_finite(self) -> bool { self.0.is_finite() }

    #[must_use]
    pub fn abs(self) -> Self { Self::new(self.0.abs()) }

    #[must_use]
    pub fn signum(self) -> f64 { self.0.signum() }

    #[must_use]
    pub fn min(self, other: Self) -> Self { Self::new(self.0.min(other.0)) }

    #[must_use]
    pub fn max(self, other: Self) -> Self { Self::new(self.0.max(other.0)) }

    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self { Self::new(self.0.clamp(min.0, max.0)) }

    /// Inverse lerp function.
    #[must_use]
    pub fn ratio_between(self, start: Self, end: Self) -> f64 {
        crate::inverse_lerp(start.0, end.0, self.0)
    }

    /// Compares two quantities with a total order, for sorting.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> cmp::Ordering { self.0.total_cmp(&other.0) }
}

impl<Base, Dt> Quantity<Base, Dt>
where
    Self: fmt::Debug,
{
    /// Asserts that the quantity is within `epsilon` of `other`.
    ///
    /// # Errors
    /// If the absolute difference between `self` and `other` is greater than `epsilon`.
    pub fn assert_approx(
        self,
        other: Self,
        epsilon: Self,
    ) -> Result<(), AssertApproxError<Self, Self>> {
        if (self.0 - other.0).abs() > epsilon.0 || self.0.is_nan() {
            Err(AssertApproxError { actual: self, expect: other, epsilon })
        } else {
            Ok(())
        }
    }
}

impl<Base, Dt> Default for Quantity<Base, Dt> {
    fn default() -> Self { Self::ZERO }
}

impl<Base, Dt> num_traits::Zero for Quantity<Base, Dt> {
    fn zero() -> Self { Self::ZERO }

    fn is_zero(&self) -> bool { self.0 == 0. }
}

impl<Base, Dt> Clone for Quantity<Base, Dt> {
    fn clone(&self) -> Self { *self }
}

impl<Base, Dt> Copy for Quantity<Base, Dt> {}

impl<Base, Dt> PartialEq for Quantity<Base, Dt> {
    fn eq(&self, other: &Self) -> bool { self.0 == other.0 }
}

impl<Base, Dt> PartialOrd for Quantity<Base, Dt> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { self.0.partial_cmp(&other.0) }
}

impl<Base, Dt> ops::Add for Quantity<Base, Dt> {
    type Output = Self;

    fn add(self, other: Self) -> Self { Self::new(self.0 + other.0) }
}

impl<Base, Dt> ops::AddAssign for Quantity<Base, Dt> {
    fn add_assign(&mut self, other: Self) { self.0 += other.0; }
}

impl<Base, Dt> ops::Sub for Quantity<Base, Dt> {
    type Output = Self;

    fn sub(self, other: Self) -> Self { Self::new(self.0 - other.0) }
}

impl<Base, Dt> ops::SubAssign for Quantity<Base, Dt> {
    fn sub_assign(&mut self, other: Self) { self.0 -= other.0; }
}

impl<Base, Dt> ops::Mul<f64> for Quantity<Base, Dt> {
    type Output = Self;

    fn mul(self, other: f64) -> Self { Self::new(self.0 * other) }
}

impl<Base, Dt> ops::MulAssign<f64> for Quantity<Base, Dt> {
    fn mul_assign(&mut self, other: f64) { self.0 *= other; }
}

impl<Base, Dt> ops::Div<f64> for Quantity<Base, Dt> {
    type Output = Self;

    fn div(self, other: f64) -> Self { Self::new(self.0 / other) }
}

impl<Base, Dt> ops::Div for Quantity<Base, Dt> {
    type Output = f64;

    fn div(self, other: Self) -> f64 { self.0 / other.0 }
}

impl<Base, Dt> ops::Neg for Quantity<Base, Dt> {
    type Output = Self;

    fn neg(self) -> Self { Self::new(-self.0) }
}

impl<Base, Dt> iter::Sum for Quantity<Base, Dt> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |sum, value| sum + value)
    }
}

/// Used as `Dt` in `Quantity` to indicate that the unit is not a rate of change.
pub struct DtZero;
/// Used as `Dt` in `Quantity` to indicate that the unit is the rate of change of `Quantity<Dt=Dt>`.
pub struct Ddt<Dt>(Dt);

pub type DtOne = Ddt<DtZero>;
pub type DtTwo = Ddt<DtOne>;

/// (B / T^(n+1)) * T = B / T^n
impl<Base, Dt> ops::Mul<Time> for Quantity<Base, Ddt<Dt>> {
    type Output = Quantity<Base, Dt>;

    fn mul(self, time: Time) -> Quantity<Base, Dt> { Quantity::new(self.0 * time.0) }
}

/// (B / T^n) / (B / T^(n+1)) = T
impl<Base, Dt> ops::Div<Quantity<Base, Ddt<Dt>>> for Quantity<Base, Dt> {
    type Output = Time;

    fn div(self, rate: Quantity<Base, Ddt<Dt>>) -> Time { Time::new(self.0 / rate.0) }
}

pub struct LengthBase;
/// A distance or height quantity. Internal representation is in nautical miles.
pub type Length = Quantity<LengthBase, DtZero>;
/// A linear speed quantity. Internal representation is in nautical miles per second.
pub type Speed = Quantity<LengthBase, DtOne>;
/// A linear acceleration quantity. Internal representation is in nautical miles per second^2.
pub type Accel = Quantity<LengthBase, DtTwo>;

pub struct AngleBase;
/// An angle, typically a flight path angle. Internal representation is in radians.
pub type Angle = Quantity<AngleBase, DtZero>;

pub struct TimeBase;
/// A signed time span. Internal representation is in seconds.
///
/// Unlike [`std::time::Duration`], backward integration produces negative time steps.
pub type Time = Quantity<TimeBase, DtZero>;

pub struct MassBase;
/// An aircraft or fuel mass. Internal representation is in pounds.
pub type Mass = Quantity<MassBase, DtZero>;
/// Rate of mass change. Internal representation is in pounds per second.
pub type FuelFlow = Quantity<MassBase, DtOne>;

pub struct ForceBase;
/// Thrust or drag. Internal representation is in pound-force.
pub type Force = Quantity<ForceBase, DtZero>;

pub struct PressureBase;
/// Atmospheric pressure. Internal representation is in pascals.
pub type Pressure = Quantity<PressureBase, DtZero>;

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Length")
            .field("nm", &self.into_nm())
            .field("feet", &self.into_feet())
            .finish()
    }
}

impl fmt::Debug for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Speed")
            .field("knots", &self.into_knots())
            .field("fpm", &self.into_fpm())
            .finish()
    }
}

impl fmt::Debug for Accel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accel").field("knots/s", &self.into_knots_per_sec()).finish()
    }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Angle").field("degrees", &self.into_degrees()).finish()
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Time").field("seconds", &self.into_seconds()).finish()
    }
}

impl fmt::Debug for Mass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mass").field("lb", &self.into_pounds()).finish()
    }
}

impl fmt::Debug for FuelFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuelFlow").field("lb/h", &self.into_pounds_per_hour()).finish()
    }
}

impl fmt::Debug for Force {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Force").field("lbf", &self.into_pounds_force()).finish()
    }
}

impl fmt::Debug for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pressure").field("hPa", &self.into_hectopascals()).finish()
    }
}

impl Length {
    #[must_use]
    pub const fn into_nm(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_nm(nm: f64) -> Self { Self(nm, PhantomData) }

    #[must_use]
    pub const fn into_feet(self) -> f64 { self.0 * FEET_PER_NM }

    #[must_use]
    pub const fn from_feet(feet: f64) -> Self { Self(feet / FEET_PER_NM, PhantomData) }

    #[must_use]
    pub const fn into_meters(self) -> f64 { self.0 * METERS_PER_NM }

    #[must_use]
    pub const fn from_meters(meters: f64) -> Self { Self(meters / METERS_PER_NM, PhantomData) }

    /// Angle of the slope that rises by `self` over the horizontal distance `run`.
    #[must_use]
    pub fn atan2(self, run: Self) -> Angle { Angle::from_radians(self.0.atan2(run.0)) }
}

impl Speed {
    #[must_use]
    pub const fn into_knots(self) -> f64 { self.0 * SECONDS_PER_HOUR }

    #[must_use]
    pub const fn from_knots(knots: f64) -> Self { Self(knots / SECONDS_PER_HOUR, PhantomData) }

    #[must_use]
    pub const fn into_fpm(self) -> f64 { self.0 * (SECONDS_PER_MINUTE * FEET_PER_NM) }

    #[must_use]
    pub const fn from_fpm(fpm: f64) -> Self {
        Self(fpm / (SECONDS_PER_MINUTE * FEET_PER_NM), PhantomData)
    }

    #[must_use]
    pub const fn into_meters_per_sec(self) -> f64 { self.0 * METERS_PER_NM }

    #[must_use]
    pub const fn from_meters_per_sec(mps: f64) -> Self { Self(mps / METERS_PER_NM, PhantomData) }
}

impl Accel {
    #[must_use]
    pub const fn into_knots_per_sec(self) -> f64 { self.0 * SECONDS_PER_HOUR }

    #[must_use]
    pub const fn from_knots_per_sec(knots: f64) -> Self {
        Self(knots / SECONDS_PER_HOUR, PhantomData)
    }

    #[must_use]
    pub const fn into_meters_per_sec2(self) -> f64 { self.0 * METERS_PER_NM }

    #[must_use]
    pub const fn from_meters_per_sec2(mps2: f64) -> Self { Self(mps2 / METERS_PER_NM, PhantomData) }
}

impl Angle {
    pub const RIGHT: Self = Self(FRAC_PI_2, PhantomData);

    #[must_use]
    pub const fn from_radians(radians: f64) -> Self { Self(radians, PhantomData) }

    #[must_use]
    pub const fn into_radians(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_degrees(degrees: f64) -> Self { Self(degrees.to_radians(), PhantomData) }

    #[must_use]
    pub const fn into_degrees(self) -> f64 { self.0.to_degrees() }

    #[must_use]
    pub fn sin(self) -> f64 { self.0.sin() }

    #[must_use]
    pub fn cos(self) -> f64 { self.0.cos() }

    #[must_use]
    pub fn tan(self) -> f64 { self.0.tan() }

    /// The angle whose sine is `value`, clamping `value` into the domain of `asin`.
    #[must_use]
    pub fn asin_clamped(value: f64) -> Self { Self::from_radians(value.clamp(-1., 1.).asin()) }
}

impl Time {
    #[must_use]
    pub const fn from_seconds(seconds: f64) -> Self { Self(seconds, PhantomData) }

    #[must_use]
    pub const fn into_seconds(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_minutes(minutes: f64) -> Self {
        Self(minutes * SECONDS_PER_MINUTE, PhantomData)
    }

    #[must_use]
    pub const fn into_minutes(self) -> f64 { self.0 / SECONDS_PER_MINUTE }
}

impl Mass {
    #[must_use]
    pub const fn from_pounds(pounds: f64) -> Self { Self(pounds, PhantomData) }

    #[must_use]
    pub const fn into_pounds(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_kilograms(kg: f64) -> Self { Self(kg / KG_PER_POUND, PhantomData) }

    #[must_use]
    pub const fn into_kilograms(self) -> f64 { self.0 * KG_PER_POUND }
}

impl FuelFlow {
    #[must_use]
    pub const fn from_pounds_per_hour(pph: f64) -> Self {
        Self(pph / SECONDS_PER_HOUR, PhantomData)
    }

    #[must_use]
    pub const fn into_pounds_per_hour(self) -> f64 { self.0 * SECONDS_PER_HOUR }
}

impl Force {
    #[must_use]
    pub const fn from_pounds_force(lbf: f64) -> Self { Self(lbf, PhantomData) }

    #[must_use]
    pub const fn into_pounds_force(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_newtons(newtons: f64) -> Self {
        Self(newtons / NEWTONS_PER_POUND_FORCE, PhantomData)
    }

    #[must_use]
    pub const fn into_newtons(self) -> f64 { self.0 * NEWTONS_PER_POUND_FORCE }

    /// Ratio of this force over a weight, both in pounds.
    ///
    /// This is the gradient (sine of the path angle) the force can sustain against gravity.
    #[must_use]
    pub fn gradient_over(self, weight: Mass) -> f64 { self.0 / weight.0 }
}

impl Pressure {
    #[must_use]
    pub const fn from_pascals(pascals: f64) -> Self { Self(pascals, PhantomData) }

    #[must_use]
    pub const fn into_pascals(self) -> f64 { self.0 }

    #[must_use]
    pub const fn from_hectopascals(hpa: f64) -> Self { Self(hpa * 100., PhantomData) }

    #[must_use]
    pub const fn into_hectopascals(self) -> f64 { self.0 / 100. }
}
