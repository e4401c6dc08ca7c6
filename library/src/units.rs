//! Parsing of `"<number> <unit>"` strings into canonical SI values.
//!
//! Canonical units: kilograms, metres, radians, pascals, kelvins, seconds.

use crate::error::Error;
use crate::Result;
use itertools::Itertools;
use log::trace;
use serde::{Deserialize, Serialize};

pub const KM_TO_M: f64 = 1.0e3;
pub const AU_TO_M: f64 = 1.495_978_707e11;
pub const LY_TO_M: f64 = 9.460_730_472_580_8e15;
pub const PC_TO_M: f64 = 3.085_677_581_491_367_3e16;
pub const ZETTAGRAM_TO_KG: f64 = 1.0e18;
pub const YOTTAGRAM_TO_KG: f64 = 1.0e21;
pub const CELSIUS_TO_KELVIN: f64 = 273.15;
/// m³ kg⁻¹ s⁻² (CODATA 2018).
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

pub trait Unit: Sized + Copy {
    const DIMENSION: &'static str;

    fn from_label(label: &str) -> Option<Self>;

    fn to_canonical(self, magnitude: f64) -> f64;
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MassUnit {
    Kilogram,
    Zettagram,
    Yottagram,
}

impl Unit for MassUnit {
    const DIMENSION: &'static str = "mass";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "kg" => Some(MassUnit::Kilogram),
            "Zg" => Some(MassUnit::Zettagram),
            "Yg" => Some(MassUnit::Yottagram),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            MassUnit::Kilogram => magnitude,
            MassUnit::Zettagram => magnitude * ZETTAGRAM_TO_KG,
            MassUnit::Yottagram => magnitude * YOTTAGRAM_TO_KG,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DistanceUnit {
    Metre,
    Kilometre,
    AstronomicalUnit,
    LightYear,
    Parsec,
}

impl Unit for DistanceUnit {
    const DIMENSION: &'static str = "distance";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "m" => Some(DistanceUnit::Metre),
            "km" => Some(DistanceUnit::Kilometre),
            "au" => Some(DistanceUnit::AstronomicalUnit),
            "ly" => Some(DistanceUnit::LightYear),
            "pc" => Some(DistanceUnit::Parsec),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            DistanceUnit::Metre => magnitude,
            DistanceUnit::Kilometre => magnitude * KM_TO_M,
            DistanceUnit::AstronomicalUnit => magnitude * AU_TO_M,
            DistanceUnit::LightYear => magnitude * LY_TO_M,
            DistanceUnit::Parsec => magnitude * PC_TO_M,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AngleUnit {
    Radian,
    Degree,
}

impl Unit for AngleUnit {
    const DIMENSION: &'static str = "angle";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "rad" => Some(AngleUnit::Radian),
            "deg" => Some(AngleUnit::Degree),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            AngleUnit::Radian => magnitude,
            AngleUnit::Degree => magnitude.to_radians(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PressureUnit {
    Pascal,
    Kilopascal,
}

impl Unit for PressureUnit {
    const DIMENSION: &'static str = "pressure";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pa" => Some(PressureUnit::Pascal),
            "kPa" => Some(PressureUnit::Kilopascal),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            PressureUnit::Pascal => magnitude,
            PressureUnit::Kilopascal => magnitude * 1000.0,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TemperatureUnit {
    Kelvin,
    Celsius,
}

impl Unit for TemperatureUnit {
    const DIMENSION: &'static str = "temperature";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "K" => Some(TemperatureUnit::Kelvin),
            "C" => Some(TemperatureUnit::Celsius),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            TemperatureUnit::Kelvin => magnitude,
            TemperatureUnit::Celsius => magnitude + CELSIUS_TO_KELVIN,
        }
    }
}

/// Labels accepted in the single-quantity time shape. Hours only appear in
/// the compound `h min [s]` shapes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TimeUnit {
    Day,
    Minute,
    Second,
}

impl Unit for TimeUnit {
    const DIMENSION: &'static str = "time";

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "days" => Some(TimeUnit::Day),
            "min" => Some(TimeUnit::Minute),
            "s" => Some(TimeUnit::Second),
            _ => None,
        }
    }

    fn to_canonical(self, magnitude: f64) -> f64 {
        match self {
            TimeUnit::Day => magnitude * 86400.0,
            TimeUnit::Minute => magnitude * 60.0,
            TimeUnit::Second => magnitude,
        }
    }
}

/// How distance labels other than `m` are interpreted.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub enum DistanceConvention {
    /// Apply SI conversion factors to `km`, `au`, `ly` and `pc`.
    #[default]
    Si,
    /// Every label is numerically identical to metres. Older system files
    /// were authored against this behaviour.
    Legacy,
}

/// A magnitude tagged with its unit, only alive while a string is parsed.
#[derive(Debug, Clone, Copy)]
struct Quantity<U> {
    magnitude: f64,
    unit: U,
}

impl<U: Unit> Quantity<U> {
    fn parse(input: &str) -> Result<Quantity<U>> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let (magnitude, label) = tokens.iter().collect_tuple().ok_or_else(|| {
            Error::unit_parse(
                input,
                format!(
                    "expected \"<number> <{} unit>\", got {} token(s)",
                    U::DIMENSION,
                    tokens.len()
                ),
            )
        })?;

        let unit = U::from_label(label).ok_or_else(|| {
            Error::unit_parse(input, format!("unknown {} unit '{}'", U::DIMENSION, label))
        })?;

        Ok(Quantity {
            magnitude: parse_magnitude(input, magnitude)?,
            unit,
        })
    }

    fn canonical(self, input: &str) -> Result<f64> {
        ensure_finite(input, U::DIMENSION, self.unit.to_canonical(self.magnitude))
    }
}

fn parse_magnitude(input: &str, token: &str) -> Result<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::unit_parse(
            input,
            format!("'{}' is not a finite number", token),
        )),
    }
}

/// A finite magnitude can still overflow once scaled to SI.
fn ensure_finite(input: &str, dimension: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::unit_range(
            input,
            format!("{} does not fit in an f64 once converted", dimension),
        ))
    }
}

pub fn parse_mass(input: &str) -> Result<f64> {
    let kg = Quantity::<MassUnit>::parse(input)?.canonical(input)?;
    trace!("mass \"{}\" -> {} kg", input, kg);
    Ok(kg)
}

pub fn parse_distance(input: &str) -> Result<f64> {
    parse_distance_with(input, DistanceConvention::Si)
}

pub fn parse_distance_with(input: &str, convention: DistanceConvention) -> Result<f64> {
    let quantity = Quantity::<DistanceUnit>::parse(input)?;
    let metres = match convention {
        DistanceConvention::Si => quantity.canonical(input)?,
        DistanceConvention::Legacy => quantity.magnitude,
    };
    trace!("distance \"{}\" -> {} m ({:?})", input, metres, convention);
    Ok(metres)
}

pub fn parse_angle(input: &str) -> Result<f64> {
    let rad = Quantity::<AngleUnit>::parse(input)?.canonical(input)?;
    trace!("angle \"{}\" -> {} rad", input, rad);
    Ok(rad)
}

pub fn parse_pressure(input: &str) -> Result<f64> {
    let pa = Quantity::<PressureUnit>::parse(input)?.canonical(input)?;
    trace!("pressure \"{}\" -> {} Pa", input, pa);
    Ok(pa)
}

pub fn parse_temperature(input: &str) -> Result<f64> {
    let kelvin = Quantity::<TemperatureUnit>::parse(input)?.canonical(input)?;
    if kelvin < 0.0 {
        return Err(Error::unit_range(
            input,
            format!("{} K is below absolute zero", kelvin),
        ));
    }
    trace!("temperature \"{}\" -> {} K", input, kelvin);
    Ok(kelvin)
}

/// Accepts `<n> days|min|s`, `<n> h <n> min` and `<n> h <n> min <n> s`.
pub fn parse_time(input: &str) -> Result<f64> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    let seconds = match tokens.as_slice() {
        [_, _] => Quantity::<TimeUnit>::parse(input)?.canonical(input)?,
        [hours, h, minutes, min] => {
            expect_labels(input, &[(*h, "h"), (*min, "min")])?;
            ensure_finite(
                input,
                TimeUnit::DIMENSION,
                parse_magnitude(input, hours)? * 3600.0 + parse_magnitude(input, minutes)? * 60.0,
            )?
        }
        [hours, h, minutes, min, seconds, s] => {
            expect_labels(input, &[(*h, "h"), (*min, "min"), (*s, "s")])?;
            ensure_finite(
                input,
                TimeUnit::DIMENSION,
                parse_magnitude(input, hours)? * 3600.0
                    + parse_magnitude(input, minutes)? * 60.0
                    + parse_magnitude(input, seconds)?,
            )?
        }
        _ => {
            return Err(Error::unit_parse(
                input,
                format!("expected 2, 4 or 6 time tokens, got {}", tokens.len()),
            ))
        }
    };

    trace!("time \"{}\" -> {} s", input, seconds);
    Ok(seconds)
}

fn expect_labels(input: &str, labels: &[(&str, &str)]) -> Result<()> {
    let offending = labels
        .iter()
        .filter(|(found, expected)| found != expected)
        .map(|(found, expected)| format!("'{}' (expected '{}')", found, expected))
        .collect::<Vec<_>>();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(Error::unit_parse(
            input,
            format!("unexpected time unit label(s) {}", offending.join(", ")),
        ))
    }
}
