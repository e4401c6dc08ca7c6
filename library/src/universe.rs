use std::fs::File;
use std::io::BufReader;

use crate::catalog::{load_catalog, parse_catalog, StarCatalogEntry};
use crate::config::{CatalogSource, LoaderConfig, SystemSource};
use crate::error::Error;
use crate::system::{build_tree_with, OrbitTree, SystemDescriptor};
use crate::Result;
use log::info;

/// Everything the scene and the simulation need at start-up.
#[derive(Debug)]
pub struct Universe {
    pub system: OrbitTree,
    pub stars: Vec<StarCatalogEntry>,
}

fn open(path: &str) -> Result<BufReader<File>> {
    info!("Loading {}", path);
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| Error::Io {
            path: path.to_string(),
            source: err,
        })
}

/// Reads the catalog, then builds the body tree. Either step failing fails
/// the whole load.
pub fn load(config: &LoaderConfig) -> Result<Universe> {
    let stars = match &config.catalog {
        CatalogSource::Text(text) => parse_catalog(text)?,
        CatalogSource::Path { path } => load_catalog(open(path)?).map_err(|err| match err {
            Error::Io { source, .. } => Error::Io {
                path: path.clone(),
                source,
            },
            other => other,
        })?,
    };

    let descriptor = match &config.system {
        SystemSource::Text(text) => SystemDescriptor::from_json(text)?,
        SystemSource::Path { path } => SystemDescriptor::from_reader(open(path)?)?,
    };

    let system = build_tree_with(&descriptor, &config.build)?;

    Ok(Universe { system, stars })
}
