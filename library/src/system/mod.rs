pub mod body;
pub mod descriptor;
pub mod tree;

pub use body::{Atmosphere, Body, BodyKind, OrbitOrientation, OrbitingBody, PhysicalProperties, StarBody};
pub use descriptor::{
    AtmosphereDescriptor, BodyDescriptor, Eccentricity, OrbitDescriptor, Satellites, Shaped,
    SystemDescriptor,
};
pub use tree::{build_tree, build_tree_with, OrbitSystem, OrbitTree, SkippedBody};
