use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::marker::PhantomData;

use crate::error::Error;
use crate::Result;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

/// Top-level key that is accepted and ignored.
pub const EPOCH_KEY: &str = "epoch";

/// A system document: an optional `epoch` and the top-level bodies, in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct SystemDescriptor {
    pub epoch: Option<Value>,
    pub bodies: Vec<(String, BodyDescriptor)>,
}

/// Quantities are kept as raw JSON values so that a value of the wrong type
/// is reported against its own body instead of failing the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodyDescriptor {
    pub kind: Option<Value>,
    pub mass: Option<Value>,
    pub radius: Option<Value>,
    pub axial_tilt: Option<Value>,
    pub gm: Option<Value>,
    pub flattening: Option<Value>,
    pub orbit: Option<Shaped<OrbitDescriptor>>,
    pub atmosphere: Option<Shaped<AtmosphereDescriptor>>,
    pub rendering: Option<Value>,
    pub satellites: Option<Shaped<Satellites>>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrbitDescriptor {
    pub axial_period: Option<Value>,
    pub semi_major_axis: Option<Value>,
    pub eccentricity: Option<Eccentricity>,
    pub inclination: Option<Value>,
    pub longitude_ascending_node: Option<Value>,
    pub longitude_periapsis: Option<Value>,
    pub mean_longitude: Option<Value>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AtmosphereDescriptor {
    pub surface_pressure: Option<Value>,
    pub surface_temperature: Option<Value>,
    pub scale_height: Option<Value>,
    #[serde(flatten)]
    pub unknown: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Eccentricity {
    Number(f64),
    Text(String),
    Other(Value),
}

/// A block that should be a JSON object. Anything else is kept as
/// `Malformed` and rejected when its body is validated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Shaped<T> {
    Valid(T),
    Malformed(Value),
}

impl<T> Shaped<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Shaped::Valid(inner) => Some(inner),
            Shaped::Malformed(_) => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Shaped::Malformed(_))
    }
}

/// Satellites keep the order in which they appear in the document.
#[derive(Debug, Clone, Default)]
pub struct Satellites(pub Vec<(String, BodyDescriptor)>);

impl SystemDescriptor {
    pub fn from_json(text: &str) -> Result<SystemDescriptor> {
        serde_json::from_str(text).map_err(Error::Document)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<SystemDescriptor> {
        serde_json::from_reader(reader).map_err(Error::Document)
    }
}

impl BodyDescriptor {
    /// Satellites in document order. Empty when the block is absent or
    /// malformed.
    pub fn satellites(&self) -> &[(String, BodyDescriptor)] {
        self.satellites
            .as_ref()
            .and_then(Shaped::valid)
            .map(|satellites| satellites.0.as_slice())
            .unwrap_or_default()
    }

    pub fn orbit(&self) -> Option<&OrbitDescriptor> {
        self.orbit.as_ref().and_then(Shaped::valid)
    }

    pub fn atmosphere(&self) -> Option<&AtmosphereDescriptor> {
        self.atmosphere.as_ref().and_then(Shaped::valid)
    }

    /// Keys that are not part of the descriptor model, prefixed with their
    /// block name where relevant.
    pub fn unknown_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.unknown.keys().cloned().collect();
        if let Some(orbit) = self.orbit() {
            keys.extend(orbit.unknown.keys().map(|key| format!("orbit.{}", key)));
        }
        if let Some(atmosphere) = self.atmosphere() {
            keys.extend(
                atmosphere
                    .unknown
                    .keys()
                    .map(|key| format!("atmosphere.{}", key)),
            );
        }
        keys
    }
}

impl fmt::Display for Eccentricity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eccentricity::Number(value) => write!(f, "{}", value),
            Eccentricity::Text(text) => write!(f, "{}", text),
            Eccentricity::Other(value) => write!(f, "{}", value),
        }
    }
}

struct OrderedBodies<T>(PhantomData<T>);

impl<'de> Visitor<'de> for OrderedBodies<Satellites> {
    type Value = Satellites;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of satellite name to body description")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Satellites, A::Error> {
        let mut bodies = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((name, body)) = map.next_entry::<String, BodyDescriptor>()? {
            bodies.push((name, body));
        }
        Ok(Satellites(bodies))
    }
}

impl<'de> Visitor<'de> for OrderedBodies<SystemDescriptor> {
    type Value = SystemDescriptor;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping of body name to body description")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<SystemDescriptor, A::Error> {
        let mut system = SystemDescriptor::default();
        while let Some(key) = map.next_key::<String>()? {
            if key == EPOCH_KEY {
                if system.epoch.is_some() {
                    return Err(de::Error::duplicate_field(EPOCH_KEY));
                }
                system.epoch = Some(map.next_value()?);
            } else {
                system.bodies.push((key, map.next_value()?));
            }
        }
        Ok(system)
    }
}

impl<'de> Deserialize<'de> for Satellites {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedBodies::<Satellites>(PhantomData))
    }
}

impl<'de> Deserialize<'de> for SystemDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedBodies::<SystemDescriptor>(PhantomData))
    }
}
