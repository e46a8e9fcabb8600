use std::{fmt, ops};

use crate::{AssertApproxError, Quantity};

pub struct TempBase;

/// Difference in temperature, such as an ISA deviation.
///
/// Always in K (which is equivalent to celsius in terms of deltas).
pub type TempDelta = Quantity<TempBase, super::DtZero>;

impl TempDelta {
    #[must_use]
    pub const fn from_kelvins(kelvins: f64) -> Self { Self::new(kelvins) }

    #[must_use]
    pub const fn into_kelvins(self) -> f64 { self.0 }
}

impl fmt::Debug for TempDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempDelta").field("kelvins", &self.0).finish()
    }
}

/// Absolute temperature value.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Temp(pub TempDelta);

impl Temp {
    /// Freezing point of water, equivalent to `from_celsius(0.0)`.
    pub const WATER_FREEZING: Self = Self(TempDelta::new(273.15));

    #[must_use]
    pub const fn from_kelvins(kelvins: f64) -> Self { Self(TempDelta::from_kelvins(kelvins)) }

    #[must_use]
    pub const fn into_kelvins(self) -> f64 { self.0.0 }

    #[must_use]
    pub const fn from_celsius(celsius: f64) -> Self {
        Self::from_kelvins(celsius + Self::WATER_FREEZING.0.0)
    }

    #[must_use]
    pub const fn into_celsius(self) -> f64 { self.0.0 - Self::WATER_FREEZING.0.0 }

    /// Asserts that the temperature is within `epsilon` of `other`.
    ///
    /// # Errors
    /// If the absolute difference between `self` and `other` is greater than `epsilon`.
    pub fn assert_approx(
        self,
        other: Temp,
        epsilon: TempDelta,
    ) -> Result<(), AssertApproxError<Self, TempDelta>> {
        if (self - other).abs() > epsilon {
            Err(AssertApproxError { actual: self, expect: other, epsilon })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Temperature").field("celsius", &self.into_celsius()).finish()
    }
}

impl ops::Add<TempDelta> for Temp {
    type Output = Temp;

    fn add(self, rhs: TempDelta) -> Temp { Temp(self.0 + rhs) }
}

impl ops::Sub<TempDelta> for Temp {
    type Output = Temp;

    fn sub(self, rhs: TempDelta) -> Temp { Temp(self.0 - rhs) }
}

impl ops::Sub for Temp {
    type Output = TempDelta;

    fn sub(self, rhs: Self) -> TempDelta { self.0 - rhs.0 }
}

impl ops::Div for Temp {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 { self.into_kelvins() / rhs.into_kelvins() }
}
