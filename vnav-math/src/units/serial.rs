//! Serialization of unit types in their conventional aviation units.
//!
//! Scenario files are hand-written, so quantities are stored as plain numbers
//! in the unit a pilot would use (feet, knots, nautical miles, pounds)
//! rather than in the internal representation.

use std::borrow::Cow;

use super::{
    Accel, Altitude, Angle, Force, FuelFlow, Length, Mass, Pressure, Speed, Temp, TempDelta, Time,
};
use crate::Quantity;

pub trait SerialUnit: Copy {
    /// Name of the unit in serialized form, also used as the schema name suffix.
    const UNIT: &'static str;

    fn into_serial(self) -> f64;

    fn from_serial(value: f64) -> Self;
}

macro_rules! serial_units {
    ($($ty:ty => $unit:literal, $into:ident, $from:ident;)*) => {
        $(
            impl SerialUnit for $ty {
                const UNIT: &'static str = $unit;

                fn into_serial(self) -> f64 { self.$into() }

                fn from_serial(value: f64) -> Self { Self::$from(value) }
            }
        )*
    }
}

serial_units! {
    Length => "Nm", into_nm, from_nm;
    Speed => "Knots", into_knots, from_knots;
    Accel => "KnotsPerSecond", into_knots_per_sec, from_knots_per_sec;
    Angle => "Degrees", into_degrees, from_degrees;
    Time => "Seconds", into_seconds, from_seconds;
    Mass => "Pounds", into_pounds, from_pounds;
    FuelFlow => "PoundsPerHour", into_pounds_per_hour, from_pounds_per_hour;
    Force => "PoundsForce", into_pounds_force, from_pounds_force;
    Pressure => "Hectopascals", into_hectopascals, from_hectopascals;
    TempDelta => "Kelvins", into_kelvins, from_kelvins;
    Temp => "Celsius", into_celsius, from_celsius;
    Altitude => "Feet", into_feet, from_feet;
}

fn serialize_unit<T: SerialUnit, S: serde::Serializer>(
    value: T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.into_serial())
}

fn deserialize_unit<'de, T: SerialUnit, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<T, D::Error> {
    let value = <f64 as serde::Deserialize>::deserialize(deserializer)?;

    if !value.is_finite() {
        return Err(<D::Error as serde::de::Error>::custom("non-finite quantity"));
    }

    Ok(T::from_serial(value))
}

#[cfg(feature = "schema")]
fn unit_schema_name<T: SerialUnit>() -> Cow<'static, str> { format!("Quantity{}", T::UNIT).into() }

impl<Base, Dt> serde::Serialize for Quantity<Base, Dt>
where
    Self: SerialUnit,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_unit(*self, serializer)
    }
}

impl<'de, Base, Dt> serde::Deserialize<'de> for Quantity<Base, Dt>
where
    Self: SerialUnit,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_unit(deserializer)
    }
}

#[cfg(feature = "schema")]
impl<Base, Dt> schemars::JsonSchema for Quantity<Base, Dt>
where
    Self: SerialUnit,
{
    fn schema_name() -> Cow<'static, str> { unit_schema_name::<Self>() }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        <f64 as schemars::JsonSchema>::json_schema(generator)
    }
}

macro_rules! newtype_serde {
    ($($ty:ty),*) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serialize_unit(*self, serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    deserialize_unit(deserializer)
                }
            }

            #[cfg(feature = "schema")]
            impl schemars::JsonSchema for $ty {
                fn schema_name() -> Cow<'static, str> { unit_schema_name::<Self>() }

                fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
                    <f64 as schemars::JsonSchema>::json_schema(generator)
                }
            }
        )*
    }
}

newtype_serde!(Altitude, Temp);
