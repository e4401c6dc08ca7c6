use crate::config::BuildOptions;
use crate::error::{Error, SchemaError};
use crate::system::body::{Atmosphere, Body, BodyKind, OrbitOrientation};
use crate::system::descriptor::{BodyDescriptor, SystemDescriptor};
use crate::Result;
use log::{debug, info, warn};
use serde_json::Value;

pub const PATH_SEPARATOR: char = '/';

/// One validated body and the bodies orbiting it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSystem {
    pub name: String,
    pub kind: BodyKind,
    pub mass_kg: f64,
    pub radius_m: f64,
    pub axial_period_s: f64,
    pub axial_tilt_rad: f64,
    pub gm_m3_s2: f64,
    pub flattening: f64,
    pub atmosphere: Option<Atmosphere>,
    pub semi_major_axis_m: f64,
    pub semi_minor_axis_m: f64,
    pub eccentricity: f64,
    /// All zero for the root star.
    pub orientation: OrbitOrientation,
    pub rendering: Value,
    pub children: Vec<OrbitSystem>,
}

/// A body left out of the tree, and why.
#[derive(Debug)]
pub struct SkippedBody {
    pub path: String,
    pub error: Error,
}

#[derive(Debug)]
pub struct OrbitTree {
    pub root: OrbitSystem,
    pub skipped: Vec<SkippedBody>,
}

impl OrbitSystem {
    fn new(name: &str, body: Body) -> OrbitSystem {
        let kind = body.kind();
        let (physical, semi_major_axis_m, semi_minor_axis_m, eccentricity, orientation) =
            match body {
                Body::Star(star) => (star.physical, 0.0, 0.0, 0.0, OrbitOrientation::default()),
                Body::Orbiting(_, orbiting) => {
                    let semi_minor_axis_m = orbiting.semi_minor_axis_m();
                    (
                        orbiting.physical,
                        orbiting.semi_major_axis_m,
                        semi_minor_axis_m,
                        orbiting.eccentricity,
                        orbiting.orientation,
                    )
                }
            };

        OrbitSystem {
            name: name.to_string(),
            kind,
            mass_kg: physical.mass_kg,
            radius_m: physical.radius_m,
            axial_period_s: physical.axial_period_s,
            axial_tilt_rad: physical.axial_tilt_rad,
            gm_m3_s2: physical.gm_m3_s2,
            flattening: physical.flattening,
            atmosphere: physical.atmosphere,
            semi_major_axis_m,
            semi_minor_axis_m,
            eccentricity,
            orientation,
            rendering: physical.rendering,
            children: Vec::new(),
        }
    }

    pub fn satellite(&self, name: &str) -> Option<&OrbitSystem> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Resolves a path such as `Sol/Jupiter/Io`. The first component names
    /// this node.
    pub fn find(&self, path: &str) -> Option<&OrbitSystem> {
        let mut components = path.split(PATH_SEPARATOR);
        if components.next()? != self.name {
            return None;
        }
        components.try_fold(self, |node, name| node.satellite(name))
    }

    /// Depth-first, pre-order walk of this subtree.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn body_count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a OrbitSystem>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a OrbitSystem;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a OrbitSystem {
    type Item = &'a OrbitSystem;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub fn build_tree(system: &SystemDescriptor) -> Result<OrbitTree> {
    build_tree_with(system, &BuildOptions::default())
}

/// Builds the body tree. A faulty Planet or Moon only costs its own
/// subtree; anything wrong with the Star or with a `kind` aborts the build.
pub fn build_tree_with(system: &SystemDescriptor, options: &BuildOptions) -> Result<OrbitTree> {
    let (name, descriptor) = match system.bodies.as_slice() {
        [] => return Err(Error::NoRootBody),
        [root] => root,
        bodies => {
            return Err(Error::MultipleRootBodies(
                bodies.iter().map(|(name, _)| name.clone()).collect(),
            ))
        }
    };

    let mut builder = TreeBuilder {
        options,
        skipped: Vec::new(),
    };
    let root = builder.build_root(name, descriptor)?;

    info!(
        "Built system '{}': {} bodies, {} skipped",
        root.name,
        root.body_count(),
        builder.skipped.len()
    );

    Ok(OrbitTree {
        root,
        skipped: builder.skipped,
    })
}

struct TreeBuilder<'a> {
    options: &'a BuildOptions,
    skipped: Vec<SkippedBody>,
}

impl TreeBuilder<'_> {
    fn build_root(&mut self, name: &str, descriptor: &BodyDescriptor) -> Result<OrbitSystem> {
        let kind = BodyKind::of(name, descriptor)?;
        if kind != BodyKind::Star {
            return Err(Error::schema(
                name,
                SchemaError::RootNotStar(kind.to_string()),
            ));
        }

        let body = Body::validate(name, kind, descriptor, self.options)?;
        self.build_node(name, name, body, descriptor)
    }

    fn build_node(
        &mut self,
        name: &str,
        path: &str,
        body: Body,
        descriptor: &BodyDescriptor,
    ) -> Result<OrbitSystem> {
        for key in descriptor.unknown_keys() {
            warn!("{}: ignoring unknown field '{}'", path, key);
        }

        let mut node = OrbitSystem::new(name, body);
        debug!(
            "{} {}: a = {} m, b = {} m",
            node.kind, path, node.semi_major_axis_m, node.semi_minor_axis_m
        );

        for (child_name, child) in descriptor.satellites() {
            let child_path = format!("{}{}{}", path, PATH_SEPARATOR, child_name);
            if let Some(child_node) = self.build_satellite(child_name, &child_path, child)? {
                node.children.push(child_node);
            }
        }

        Ok(node)
    }

    /// `Ok(None)` when the satellite was skipped.
    fn build_satellite(
        &mut self,
        name: &str,
        path: &str,
        descriptor: &BodyDescriptor,
    ) -> Result<Option<OrbitSystem>> {
        let kind = BodyKind::of(path, descriptor)?;
        if kind == BodyKind::Star {
            return Err(Error::schema(path, SchemaError::NestedStar));
        }

        match Body::validate(path, kind, descriptor, self.options) {
            Ok(body) => self.build_node(name, path, body, descriptor).map(Some),
            Err(err) => {
                warn!("Skipping {} {} and its satellites: {}", kind, path, err);
                self.skipped.push(SkippedBody {
                    path: path.to_string(),
                    error: err,
                });
                Ok(None)
            }
        }
    }
}
