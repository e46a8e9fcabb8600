use std::{fmt, ops};

use super::Length;
use crate::AssertApproxError;

/// An altitude above mean sea level.
///
/// Differences between two altitudes are [`Length`]s.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Altitude(pub Length);

impl Altitude {
    pub const SEA_LEVEL: Self = Self(Length::ZERO);

    #[must_use]
    pub const fn from_feet(feet: f64) -> Self { Self(Length::from_feet(feet)) }

    #[must_use]
    pub const fn into_feet(self) -> f64 { self.0.into_feet() }

    /// Height above mean sea level.
    #[must_use]
    pub const fn amsl(self) -> Length { self.0 }

    #[must_use]
    pub fn lerp(self, other: Self, s: f64) -> Self { Self(self.0.lerp(other.0, s)) }

    #[must_use]
    pub fn min(self, other: Self) -> Self { Self(self.0.min(other.0)) }

    #[must_use]
    pub fn max(self, other: Self) -> Self { Self(self.0.max(other.0)) }

    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self { Self(self.0.clamp(min.0, max.0)) }

    /// Asserts that the altitude is within `epsilon` of `other`.
    ///
    /// # Errors
    /// If the absolute difference between `self` and `other` is greater than `epsilon`.
    pub fn assert_approx(
        self,
        other: Self,
        epsilon: Length,
    ) -> Result<(), AssertApproxError<Self, Length>> {
        if (self - other).abs() > epsilon || self.0.into_raw().is_nan() {
            Err(AssertApproxError { actual: self, expect: other, epsilon })
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Altitude").field("feet", &self.into_feet()).finish()
    }
}

impl ops::Add<Length> for Altitude {
    type Output = Self;

    fn add(self, rhs: Length) -> Self { Self(self.0 + rhs) }
}

impl ops::AddAssign<Length> for Altitude {
    fn add_assign(&mut self, rhs: Length) { self.0 += rhs; }
}

impl ops::Sub<Length> for Altitude {
    type Output = Self;

    fn sub(self, rhs: Length) -> Self { Self(self.0 - rhs) }
}

impl ops::SubAssign<Length> for Altitude {
    fn sub_assign(&mut self, rhs: Length) { self.0 -= rhs; }
}

impl ops::Sub for Altitude {
    type Output = Length;

    fn sub(self, rhs: Self) -> Length { self.0 - rhs.0 }
}
