#[cfg(test)]
mod orrery_tests_system {
    use std::sync::Once;

    use anyhow::anyhow;
    use approx::assert_relative_eq;
    use common::trace;
    use log::info;
    use orrery::{
        config::BuildOptions,
        error::{Error, SchemaError},
        system::{build_tree, build_tree_with, BodyKind, SystemDescriptor},
        units::DistanceConvention,
    };
    use serde_json::{json, Value};

    static TRACE: Once = Once::new();

    pub fn before_all() {
        TRACE.call_once(|| {
            trace::init(Some(".*orrery(.*)".to_string()));
            info!("Tracing enabled");
        });
    }

    fn star() -> Value {
        json!({
            "kind": "Star",
            "mass": "1988500 Yg",
            "radius": "696340 km",
            "orbit": { "axial_period": "25.05 days" },
            "rendering": { "model": "sphere", "texture": "sun.jpg" }
        })
    }

    fn orbiting(kind: &str, semi_major_axis: &str, eccentricity: f64) -> Value {
        json!({
            "kind": kind,
            "mass": "100 Zg",
            "radius": "1000 km",
            "orbit": {
                "axial_period": "10 h 30 min",
                "semi_major_axis": semi_major_axis,
                "eccentricity": eccentricity
            },
            "rendering": { "model": "sphere" }
        })
    }

    fn with_satellites(mut body: Value, satellites: Value) -> Value {
        body["satellites"] = satellites;
        body
    }

    fn system(root: Value) -> anyhow::Result<SystemDescriptor> {
        let document = json!({ "epoch": "J2000", "Sol": root });
        Ok(SystemDescriptor::from_json(&document.to_string())?)
    }

    #[test]
    fn case_01_planet_missing_eccentricity_is_pruned() -> anyhow::Result<()> {
        before_all();

        let mut broken = with_satellites(
            orbiting("Planet", "2 au", 0.1),
            json!({ "Phobos": orbiting("Moon", "9376 km", 0.0151) }),
        );
        broken["orbit"]
            .as_object_mut()
            .ok_or(anyhow!("orbit is not an object"))?
            .remove("eccentricity");

        let root = with_satellites(
            star(),
            json!({
                "Venus": orbiting("Planet", "0.72 au", 0.0068),
                "Mars": broken,
                "Earth": with_satellites(
                    orbiting("Planet", "1 au", 0.0167),
                    json!({ "Moon": orbiting("Moon", "384400 km", 0.0549) })
                )
            }),
        );

        let tree = build_tree(&system(root)?)?;

        let names: Vec<&str> = tree.root.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(vec!["Sol", "Venus", "Earth", "Moon"], names);
        assert!(tree.root.find("Sol/Mars").is_none());
        assert!(tree.root.iter().all(|node| node.name != "Phobos"));

        assert_eq!(2, tree.root.children.len());
        assert!(tree.root.find("Sol/Earth/Moon").is_some());

        assert_eq!(1, tree.skipped.len());
        assert_eq!("Sol/Mars", tree.skipped[0].path);
        assert!(matches!(
            tree.skipped[0].error,
            Error::Schema {
                source: SchemaError::MissingField("orbit.eccentricity"),
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn case_02_root_without_kind_is_fatal() -> anyhow::Result<()> {
        before_all();

        let mut root = with_satellites(
            star(),
            json!({ "Earth": orbiting("Planet", "1 au", 0.0167) }),
        );
        root.as_object_mut()
            .ok_or(anyhow!("root is not an object"))?
            .remove("kind");

        match build_tree(&system(root)?) {
            Err(Error::Schema {
                body,
                source: SchemaError::MissingKind,
            }) => assert_eq!("Sol", body),
            other => return Err(anyhow!("unexpected {:?}", other)),
        }
        Ok(())
    }

    #[test]
    fn case_03_moon_without_kind_is_fatal() -> anyhow::Result<()> {
        before_all();

        let mut moon = orbiting("Moon", "384400 km", 0.0549);
        moon.as_object_mut()
            .ok_or(anyhow!("moon is not an object"))?
            .remove("kind");
        let root = with_satellites(
            star(),
            json!({ "Earth": with_satellites(orbiting("Planet", "1 au", 0.0167), json!({ "Moon": moon })) }),
        );

        match build_tree(&system(root)?) {
            Err(Error::Schema {
                body,
                source: SchemaError::MissingKind,
            }) => assert_eq!("Sol/Earth/Moon", body),
            other => return Err(anyhow!("unexpected {:?}", other)),
        }
        Ok(())
    }

    #[test]
    fn case_04_unknown_kind_is_fatal_anywhere() -> anyhow::Result<()> {
        before_all();

        let root = with_satellites(
            star(),
            json!({ "Halley": orbiting("Comet", "17.8 au", 0.967) }),
        );
        assert!(matches!(
            build_tree(&system(root)?),
            Err(Error::Schema {
                source: SchemaError::UnknownKind(_),
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn case_05_star_errors_are_fatal() -> anyhow::Result<()> {
        before_all();

        let mut root = star();
        root.as_object_mut()
            .ok_or(anyhow!("root is not an object"))?
            .remove("rendering");
        assert!(matches!(
            build_tree(&system(root)?),
            Err(Error::Schema {
                source: SchemaError::MissingField("rendering"),
                ..
            })
        ));

        let mut root = star();
        root["mass"] = json!("1988500 tonnes");
        match build_tree(&system(root)?) {
            Err(err @ Error::InvalidField { field: "mass", .. }) => {
                assert!(matches!(err.unit_cause(), Some(Error::UnitParse { .. })))
            }
            other => return Err(anyhow!("unexpected {:?}", other)),
        }
        Ok(())
    }

    #[test]
    fn case_06_semi_minor_axis_is_derived() -> anyhow::Result<()> {
        before_all();

        let root = with_satellites(
            star(),
            json!({
                "Legacy": orbiting("Planet", "10 au", 0.6),
                "Metric": orbiting("Planet", "10 m", 0.6)
            }),
        );
        let descriptor = system(root)?;

        let legacy = build_tree_with(
            &descriptor,
            &BuildOptions {
                distance_convention: DistanceConvention::Legacy,
                ..BuildOptions::default()
            },
        )?;
        let planet = legacy
            .root
            .find("Sol/Legacy")
            .ok_or(anyhow!("Legacy not built"))?;
        assert_eq!(10.0, planet.semi_major_axis_m);
        assert_relative_eq!(8.0, planet.semi_minor_axis_m);

        let si = build_tree(&descriptor)?;
        let planet = si.root.find("Sol/Metric").ok_or(anyhow!("Metric not built"))?;
        assert_relative_eq!(8.0, planet.semi_minor_axis_m);
        let planet = si.root.find("Sol/Legacy").ok_or(anyhow!("Legacy not built"))?;
        assert_relative_eq!(1.495978707e12, planet.semi_major_axis_m);
        assert_relative_eq!(0.8 * 1.495978707e12, planet.semi_minor_axis_m);
        Ok(())
    }

    #[test]
    fn case_07_eccentricity_check_can_be_disabled() -> anyhow::Result<()> {
        before_all();

        let root = with_satellites(
            star(),
            json!({
                "Earth": orbiting("Planet", "1 au", 0.0167),
                "Escaper": orbiting("Planet", "1 au", 1.2)
            }),
        );
        let descriptor = system(root)?;

        let checked = build_tree(&descriptor)?;
        assert!(checked.root.find("Sol/Escaper").is_none());
        assert_eq!(1, checked.skipped.len());
        assert!(matches!(
            checked.skipped[0].error.unit_cause(),
            Some(Error::UnitRange { .. })
        ));

        let unchecked = build_tree_with(
            &descriptor,
            &BuildOptions {
                check_eccentricity: false,
                ..BuildOptions::default()
            },
        )?;
        let escaper = unchecked
            .root
            .find("Sol/Escaper")
            .ok_or(anyhow!("Escaper not built"))?;
        assert_eq!(1.2, escaper.eccentricity);
        assert!(escaper.semi_minor_axis_m.is_nan());
        Ok(())
    }

    #[test]
    fn case_08_nested_star_is_fatal() -> anyhow::Result<()> {
        before_all();

        let root = with_satellites(star(), json!({ "Companion": star() }));
        assert!(matches!(
            build_tree(&system(root)?),
            Err(Error::Schema {
                source: SchemaError::NestedStar,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn case_09_moon_unit_error_only_prunes_the_moon() -> anyhow::Result<()> {
        before_all();

        let mut moon = orbiting("Moon", "384400 km", 0.0549);
        moon["orbit"]["axial_period"] = json!("27 fortnights");
        let root = with_satellites(
            star(),
            json!({
                "Earth": with_satellites(
                    orbiting("Planet", "1 au", 0.0167),
                    json!({ "Moon": moon, "Cruithne": orbiting("Moon", "1 au", 0.515) })
                )
            }),
        );

        let tree = build_tree(&system(root)?)?;
        let earth = tree.root.find("Sol/Earth").ok_or(anyhow!("Earth not built"))?;
        assert_eq!(BodyKind::Planet, earth.kind);
        assert_eq!(1, earth.children.len());
        assert_eq!("Cruithne", earth.children[0].name);
        assert_eq!("Sol/Earth/Moon", tree.skipped[0].path);
        Ok(())
    }

    #[test]
    fn case_10_rendering_is_forwarded_untouched() -> anyhow::Result<()> {
        before_all();

        let mut root = star();
        root["rendering"] = json!({ "model": "sphere", "texture": "sun.jpg", "glow": [1, 0.8, 0.2] });
        let tree = build_tree(&system(root)?)?;
        assert_eq!(
            json!({ "model": "sphere", "texture": "sun.jpg", "glow": [1, 0.8, 0.2] }),
            tree.root.rendering
        );
        assert_eq!(25.05 * 86400.0, tree.root.axial_period_s);
        Ok(())
    }

    #[test]
    fn case_11_wrongly_typed_planet_field_only_prunes_the_planet() -> anyhow::Result<()> {
        before_all();

        let mut mars = orbiting("Planet", "1.52 au", 0.0934);
        mars["mass"] = json!(6.4e23);
        let mut vulcan = orbiting("Planet", "0.1 au", 0.0);
        vulcan["orbit"]["semi_major_axis"] = json!(5);
        let root = with_satellites(
            star(),
            json!({
                "Earth": orbiting("Planet", "1 au", 0.0167),
                "Mars": mars,
                "Vulcan": vulcan
            }),
        );

        let tree = build_tree(&system(root)?)?;
        let names: Vec<&str> = tree.root.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(vec!["Sol", "Earth"], names);

        let skipped: Vec<&str> = tree.skipped.iter().map(|body| body.path.as_str()).collect();
        assert_eq!(vec!["Sol/Mars", "Sol/Vulcan"], skipped);
        assert!(matches!(
            tree.skipped[0].error,
            Error::InvalidField { field: "mass", .. }
        ));
        assert!(matches!(
            tree.skipped[0].error.unit_cause(),
            Some(Error::UnitParse { .. })
        ));
        assert!(matches!(
            tree.skipped[1].error,
            Error::InvalidField {
                field: "orbit.semi_major_axis",
                ..
            }
        ));

        let mut root = star();
        root["radius"] = json!(696_340_000);
        assert!(matches!(
            build_tree(&system(root)?),
            Err(Error::InvalidField { field: "radius", .. })
        ));
        Ok(())
    }

    #[test]
    fn case_12_malformed_satellites_prune_their_owner() -> anyhow::Result<()> {
        before_all();

        let root = with_satellites(
            star(),
            json!({
                "Earth": with_satellites(
                    orbiting("Planet", "1 au", 0.0167),
                    json!({
                        "Moon": with_satellites(orbiting("Moon", "384400 km", 0.0549), json!(3))
                    })
                ),
                "Jupiter": with_satellites(orbiting("Planet", "5.2 au", 0.0489), json!(["Io"])),
                "Saturn": orbiting("Planet", "9.58 au", 0.0565)
            }),
        );

        let tree = build_tree(&system(root)?)?;
        let names: Vec<&str> = tree.root.iter().map(|node| node.name.as_str()).collect();
        assert_eq!(vec!["Sol", "Earth", "Saturn"], names);

        let skipped: Vec<&str> = tree.skipped.iter().map(|body| body.path.as_str()).collect();
        assert_eq!(vec!["Sol/Earth/Moon", "Sol/Jupiter"], skipped);
        for body in &tree.skipped {
            assert!(matches!(
                body.error,
                Error::Schema {
                    source: SchemaError::NotAnObject("satellites"),
                    ..
                }
            ));
        }

        let root = with_satellites(star(), json!("Earth"));
        assert!(matches!(
            build_tree(&system(root)?),
            Err(Error::Schema {
                source: SchemaError::NotAnObject("satellites"),
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn case_13_orbital_elements_and_atmosphere_reach_the_tree() -> anyhow::Result<()> {
        before_all();

        let mut venus = orbiting("Planet", "0.723 au", 0.0068);
        venus["axial_tilt"] = json!("177.36 deg");
        venus["flattening"] = json!(0.0);
        venus["atmosphere"] = json!({
            "surface_pressure": "9200 kPa",
            "surface_temperature": "464 C",
            "scale_height": "15.9 km"
        });
        venus["orbit"]["inclination"] = json!("3.39 deg");
        venus["orbit"]["mean_longitude"] = json!("181.98 deg");

        let mut broken = orbiting("Planet", "1 au", 0.0);
        broken["atmosphere"] = json!({ "surface_pressure": "1 atm", "surface_temperature": "288 K" });

        let root = with_satellites(star(), json!({ "Venus": venus, "Broken": broken }));
        let tree = build_tree(&system(root)?)?;

        let venus = tree.root.find("Sol/Venus").ok_or(anyhow!("Venus not built"))?;
        assert_relative_eq!(177.36_f64.to_radians(), venus.axial_tilt_rad);
        assert_relative_eq!(3.39_f64.to_radians(), venus.orientation.inclination_rad);
        assert_relative_eq!(181.98_f64.to_radians(), venus.orientation.mean_longitude_rad);
        assert_eq!(0.0, venus.orientation.longitude_ascending_node_rad);
        let atmosphere = venus
            .atmosphere
            .as_ref()
            .ok_or(anyhow!("Venus has no atmosphere"))?;
        assert_eq!(9_200_000.0, atmosphere.surface_pressure_pa);
        assert_relative_eq!(737.15, atmosphere.surface_temperature_k);
        assert_relative_eq!(15_900.0, atmosphere.scale_height_m.unwrap_or_default());

        assert_eq!(1, tree.skipped.len());
        assert!(matches!(
            tree.skipped[0].error,
            Error::InvalidField {
                field: "atmosphere.surface_pressure",
                ..
            }
        ));
        Ok(())
    }
}
