use std::fmt;
use std::str::FromStr;

use crate::config::BuildOptions;
use crate::error::{Error, SchemaError};
use crate::system::descriptor::{BodyDescriptor, Eccentricity, Shaped};
use crate::units::{
    parse_angle, parse_distance_with, parse_mass, parse_pressure, parse_temperature, parse_time,
    GRAVITATIONAL_CONSTANT,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
}

impl FromStr for BodyKind {
    type Err = SchemaError;

    fn from_str(kind: &str) -> std::result::Result<Self, Self::Err> {
        [BodyKind::Star, BodyKind::Planet, BodyKind::Moon]
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(kind))
            .ok_or_else(|| SchemaError::UnknownKind(kind.to_string()))
    }
}

impl BodyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Star => "Star",
            BodyKind::Planet => "Planet",
            BodyKind::Moon => "Moon",
        }
    }

    /// Reads the `kind` of a descriptor. Every failure aborts a build.
    pub fn of(body: &str, descriptor: &BodyDescriptor) -> Result<BodyKind> {
        match &descriptor.kind {
            None => Err(Error::schema(body, SchemaError::MissingKind)),
            Some(Value::String(kind)) => kind.parse().map_err(|err| Error::schema(body, err)),
            Some(other) => Err(Error::schema(
                body,
                SchemaError::UnknownKind(other.to_string()),
            )),
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atmosphere {
    pub surface_pressure_pa: f64,
    pub surface_temperature_k: f64,
    pub scale_height_m: Option<f64>,
}

/// Fields every kind carries, already in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalProperties {
    pub mass_kg: f64,
    pub radius_m: f64,
    pub axial_period_s: f64,
    pub axial_tilt_rad: f64,
    /// Standard gravitational parameter, `G * mass` unless given.
    pub gm_m3_s2: f64,
    pub flattening: f64,
    pub atmosphere: Option<Atmosphere>,
    pub rendering: Value,
}

/// Angular orbital elements. Each one defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitOrientation {
    pub inclination_rad: f64,
    pub longitude_ascending_node_rad: f64,
    pub longitude_periapsis_rad: f64,
    pub mean_longitude_rad: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarBody {
    pub physical: PhysicalProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitingBody {
    pub physical: PhysicalProperties,
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
    pub orientation: OrbitOrientation,
}

impl OrbitingBody {
    pub fn semi_minor_axis_m(&self) -> f64 {
        self.semi_major_axis_m * (1.0 - self.eccentricity.powi(2)).sqrt()
    }
}

/// A descriptor that passed every check required by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Star(StarBody),
    Orbiting(BodyKind, OrbitingBody),
}

impl Body {
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Star(_) => BodyKind::Star,
            Body::Orbiting(kind, _) => *kind,
        }
    }

    pub fn physical(&self) -> &PhysicalProperties {
        match self {
            Body::Star(star) => &star.physical,
            Body::Orbiting(_, orbiting) => &orbiting.physical,
        }
    }

    /// Checks the fields `kind` requires and converts them. Schema errors
    /// (malformed blocks, then missing fields) are reported before any unit
    /// error.
    pub fn validate(
        body: &str,
        kind: BodyKind,
        descriptor: &BodyDescriptor,
        options: &BuildOptions,
    ) -> Result<Body> {
        well_formed(body, "orbit", descriptor.orbit.as_ref())?;
        well_formed(body, "atmosphere", descriptor.atmosphere.as_ref())?;
        well_formed(body, "satellites", descriptor.satellites.as_ref())?;

        let orbit = descriptor.orbit();
        let distance = |text: &str| parse_distance_with(text, options.distance_convention);

        let mass = required(body, "mass", descriptor.mass.as_ref())?;
        let radius = required(body, "radius", descriptor.radius.as_ref())?;
        let axial_period = required(
            body,
            "orbit.axial_period",
            orbit.and_then(|orbit| orbit.axial_period.as_ref()),
        )?;
        let rendering = required(body, "rendering", descriptor.rendering.as_ref())?;

        let atmosphere = match descriptor.atmosphere() {
            None => None,
            Some(atmosphere) => Some((
                required(
                    body,
                    "atmosphere.surface_pressure",
                    atmosphere.surface_pressure.as_ref(),
                )?,
                required(
                    body,
                    "atmosphere.surface_temperature",
                    atmosphere.surface_temperature.as_ref(),
                )?,
                atmosphere.scale_height.as_ref(),
            )),
        };

        let shape = match kind {
            BodyKind::Star => None,
            BodyKind::Planet | BodyKind::Moon => Some((
                required(
                    body,
                    "orbit.semi_major_axis",
                    orbit.and_then(|orbit| orbit.semi_major_axis.as_ref()),
                )?,
                required(
                    body,
                    "orbit.eccentricity",
                    orbit.and_then(|orbit| orbit.eccentricity.as_ref()),
                )?,
            )),
        };

        let mass_kg = quantity(body, "mass", mass, parse_mass)?;
        let physical = PhysicalProperties {
            mass_kg,
            radius_m: quantity(body, "radius", radius, distance)?,
            axial_period_s: quantity(body, "orbit.axial_period", axial_period, parse_time)?,
            axial_tilt_rad: optional_quantity(
                body,
                "axial_tilt",
                descriptor.axial_tilt.as_ref(),
                parse_angle,
            )?
            .unwrap_or_default(),
            gm_m3_s2: match &descriptor.gm {
                Some(gm) => convert(body, "gm", parse_gm(gm))?,
                None => mass_kg * GRAVITATIONAL_CONSTANT,
            },
            flattening: match &descriptor.flattening {
                Some(flattening) => convert(body, "flattening", parse_flattening(flattening))?,
                None => 0.0,
            },
            atmosphere: match atmosphere {
                None => None,
                Some((pressure, temperature, scale_height)) => Some(Atmosphere {
                    surface_pressure_pa: quantity(
                        body,
                        "atmosphere.surface_pressure",
                        pressure,
                        parse_pressure,
                    )?,
                    surface_temperature_k: quantity(
                        body,
                        "atmosphere.surface_temperature",
                        temperature,
                        parse_temperature,
                    )?,
                    scale_height_m: optional_quantity(
                        body,
                        "atmosphere.scale_height",
                        scale_height,
                        distance,
                    )?,
                }),
            },
            rendering: rendering.clone(),
        };

        let Some((semi_major_axis, eccentricity)) = shape else {
            return Ok(Body::Star(StarBody { physical }));
        };

        let angle = |field: &'static str, value: Option<&Value>| {
            optional_quantity(body, field, value, parse_angle).map(Option::unwrap_or_default)
        };
        let orientation = OrbitOrientation {
            inclination_rad: angle(
                "orbit.inclination",
                orbit.and_then(|orbit| orbit.inclination.as_ref()),
            )?,
            longitude_ascending_node_rad: angle(
                "orbit.longitude_ascending_node",
                orbit.and_then(|orbit| orbit.longitude_ascending_node.as_ref()),
            )?,
            longitude_periapsis_rad: angle(
                "orbit.longitude_periapsis",
                orbit.and_then(|orbit| orbit.longitude_periapsis.as_ref()),
            )?,
            mean_longitude_rad: angle(
                "orbit.mean_longitude",
                orbit.and_then(|orbit| orbit.mean_longitude.as_ref()),
            )?,
        };

        Ok(Body::Orbiting(
            kind,
            OrbitingBody {
                physical,
                semi_major_axis_m: quantity(
                    body,
                    "orbit.semi_major_axis",
                    semi_major_axis,
                    distance,
                )?,
                eccentricity: convert(
                    body,
                    "orbit.eccentricity",
                    parse_eccentricity(eccentricity, options.check_eccentricity),
                )?,
                orientation,
            },
        ))
    }
}

fn well_formed<T>(body: &str, field: &'static str, block: Option<&Shaped<T>>) -> Result<()> {
    match block {
        Some(Shaped::Malformed(_)) => Err(Error::schema(body, SchemaError::NotAnObject(field))),
        _ => Ok(()),
    }
}

fn required<'a, T>(body: &str, field: &'static str, value: Option<&'a T>) -> Result<&'a T> {
    value.ok_or_else(|| Error::schema(body, SchemaError::MissingField(field)))
}

fn convert(body: &str, field: &'static str, parsed: Result<f64>) -> Result<f64> {
    parsed.map_err(|err| Error::InvalidField {
        body: body.to_string(),
        field,
        source: Box::new(err),
    })
}

fn unit_text(value: &Value) -> Result<&str> {
    value.as_str().ok_or_else(|| {
        Error::unit_parse(&value.to_string(), "expected a \"<number> <unit>\" string")
    })
}

fn quantity(
    body: &str,
    field: &'static str,
    value: &Value,
    parse: impl FnOnce(&str) -> Result<f64>,
) -> Result<f64> {
    convert(body, field, unit_text(value).and_then(parse))
}

fn optional_quantity(
    body: &str,
    field: &'static str,
    value: Option<&Value>,
    parse: impl FnOnce(&str) -> Result<f64>,
) -> Result<Option<f64>> {
    value
        .map(|value| quantity(body, field, value, parse))
        .transpose()
}

fn finite_number(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| Error::unit_parse(&value.to_string(), "expected a finite number"))
}

fn parse_gm(value: &Value) -> Result<f64> {
    let gm = finite_number(value)?;
    if gm <= 0.0 {
        return Err(Error::unit_range(
            &value.to_string(),
            "gravitational parameter must be positive",
        ));
    }
    Ok(gm)
}

fn parse_flattening(value: &Value) -> Result<f64> {
    let flattening = finite_number(value)?;
    if !(0.0..1.0).contains(&flattening) {
        return Err(Error::unit_range(
            &value.to_string(),
            "flattening must be in [0, 1)",
        ));
    }
    Ok(flattening)
}

pub fn parse_eccentricity(eccentricity: &Eccentricity, check_range: bool) -> Result<f64> {
    let input = eccentricity.to_string();
    let value = match eccentricity {
        Eccentricity::Number(value) => *value,
        Eccentricity::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::unit_parse(&input, "eccentricity is not a number"))?,
        Eccentricity::Other(_) => {
            return Err(Error::unit_parse(
                &input,
                "eccentricity must be a number or a numeric string",
            ))
        }
    };

    if !value.is_finite() {
        return Err(Error::unit_parse(&input, "eccentricity is not a finite number"));
    }
    if check_range && !(0.0..1.0).contains(&value) {
        return Err(Error::unit_range(
            &input,
            "eccentricity of a closed orbit must be in [0, 1)",
        ));
    }
    Ok(value)
}
