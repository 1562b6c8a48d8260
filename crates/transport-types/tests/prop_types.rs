// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Property-Based Tests (proptest) for transport-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for configuration handling.

use proptest::prelude::*;
use transport_types::config::{FieldDriverOptions, FieldPropagatorOptions};
use transport_types::field_map::RZMapFieldInput;

proptest! {
    /// Any positive, ordered tolerance set validates and survives a JSON
    /// round trip unchanged.
    #[test]
    fn options_roundtrip_preserves_tolerances(
        minimum_step in 1e-8f64..1e-3,
        delta_chord in 1e-4f64..1e-1,
        delta_intersection in 1e-6f64..1e-2,
        epsilon in 1e-5f64..1e-2,
        max_substeps in 1i16..1000,
    ) {
        let options = FieldPropagatorOptions {
            driver: FieldDriverOptions {
                minimum_step,
                max_step: 1.0e6,
                delta_chord,
                delta_intersection,
                epsilon_rel_max: epsilon,
            },
            max_substeps,
        };
        prop_assert!(options.validate().is_ok());

        let json = serde_json::to_string(&options).unwrap();
        let back: FieldPropagatorOptions = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.max_substeps, max_substeps);
        prop_assert!((back.driver.minimum_step - minimum_step).abs() < 1e-20);
        prop_assert!((back.driver.delta_chord - delta_chord).abs() < 1e-20);
        prop_assert!((back.delta_intersection() - delta_intersection).abs() < 1e-20);
    }

    /// The bump distance is always a strict fraction of the intersection
    /// tolerance.
    #[test]
    fn bump_distance_below_intersection_tolerance(
        delta_intersection in 1e-6f64..1e-2,
    ) {
        let mut options = FieldPropagatorOptions::default();
        options.driver.delta_intersection = delta_intersection;
        prop_assert!(options.bump_distance() < options.delta_intersection());
        prop_assert!((options.bump_distance() - 0.1 * delta_intersection).abs()
            < 1e-16 * delta_intersection.max(1.0));
    }

    /// Field-map validation accepts exactly the matching sample counts.
    #[test]
    fn field_map_sample_count_validation(
        nr in 2usize..12,
        nz in 2usize..12,
    ) {
        let good = RZMapFieldInput {
            num_grid_z: nz,
            num_grid_r: nr,
            delta_grid: 0.1,
            offset_z: -1.0,
            field_z: vec![1.0; nr * nz],
            field_r: vec![0.0; nr * nz],
        };
        prop_assert!(good.validate().is_ok());

        let mut bad = good.clone();
        bad.field_z.push(0.0);
        prop_assert!(bad.validate().is_err());
    }
}
