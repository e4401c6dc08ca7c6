use crate::units::DistanceConvention;

/// Where the system document comes from.
pub enum SystemSource {
    Text(String),
    Path { path: String },
}

/// Where the star catalog comes from.
pub enum CatalogSource {
    Text(String),
    Path { path: String },
}

/// Knobs of the tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub distance_convention: DistanceConvention,
    /// Reject orbiting bodies whose eccentricity is outside `[0, 1)`.
    pub check_eccentricity: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            distance_convention: DistanceConvention::Si,
            check_eccentricity: true,
        }
    }
}

pub struct LoaderConfig {
    pub system: SystemSource,
    pub catalog: CatalogSource,
    pub build: BuildOptions,
}

impl LoaderConfig {
    pub fn from_paths(system_path: &str, catalog_path: &str) -> LoaderConfig {
        LoaderConfig {
            system: SystemSource::Path {
                path: system_path.to_string(),
            },
            catalog: CatalogSource::Path {
                path: catalog_path.to_string(),
            },
            build: BuildOptions::default(),
        }
    }
}
