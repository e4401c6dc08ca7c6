use std::env;

use clap::Parser;

use orrery::{
    config::{BuildOptions, LoaderConfig},
    system::OrbitSystem,
    units::DistanceConvention,
};

use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    #[arg(value_name = "SYSTEM", default_value = "data/solsystem.json")]
    system: String,

    #[arg(value_name = "CATALOG", default_value = "data/stars.csv")]
    catalog: String,

    /// Treat km, au, ly and pc as plain metres
    #[arg(long, default_value_t = false)]
    legacy_distances: bool,

    /// Accept eccentricities outside [0, 1)
    #[arg(long, default_value_t = false)]
    no_eccentricity_check: bool,

    #[arg(long, default_value = "orrery::(.*)", value_name = "REGEX")]
    trace_filter: String,

    #[arg(
        long,
        default_value = "INFO",
        value_name = "TRACE|DEBUG|INFO|WARN|ERROR"
    )]
    trace_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env::set_var("RUST_LOG", &args.trace_level);
    common::trace::init(Some(args.trace_filter.clone()));

    let config = LoaderConfig {
        build: BuildOptions {
            distance_convention: if args.legacy_distances {
                DistanceConvention::Legacy
            } else {
                DistanceConvention::Si
            },
            check_eccentricity: !args.no_eccentricity_check,
        },
        ..LoaderConfig::from_paths(&args.system, &args.catalog)
    };

    let universe = match orrery::load(&config) {
        Ok(universe) => universe,
        Err(err) => {
            log::error!("Load failed: {}", err);
            return Err(err).context(format!("loading {} and {}", args.system, args.catalog));
        }
    };

    println!("{} background stars", universe.stars.len());
    print_system(&universe.system.root, 0);

    for skipped in &universe.system.skipped {
        println!("skipped {}: {}", skipped.path, skipped.error);
    }

    Ok(())
}

fn print_system(node: &OrbitSystem, depth: usize) {
    println!(
        "{:indent$}{} ({}): m = {:e} kg, r = {:e} m, a = {:e} m, b = {:e} m, i = {:.4} rad",
        "",
        node.name,
        node.kind,
        node.mass_kg,
        node.radius_m,
        node.semi_major_axis_m,
        node.semi_minor_axis_m,
        node.orientation.inclination_rad,
        indent = depth * 2
    );
    if let Some(atmosphere) = &node.atmosphere {
        println!(
            "{:indent$}atmosphere: {} Pa, {} K",
            "",
            atmosphere.surface_pressure_pa,
            atmosphere.surface_temperature_k,
            indent = depth * 2 + 2
        );
    }
    for child in &node.children {
        print_system(child, depth + 1);
    }
}
