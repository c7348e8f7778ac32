use std::collections::HashSet;

use proptest::prelude::*;
use ps_core::Scalar;
use ps_sweep::{Cursor, ParameterRange, combinations, walk_matrix};

fn explicit_ranges(lens: &[usize]) -> Vec<ParameterRange> {
    lens.iter()
        .enumerate()
        .map(|(dim, &len)| {
            let values = (0..len as i64).map(Scalar::Int).collect();
            ParameterRange::explicit(format!("d{dim}"), "", values).unwrap()
        })
        .collect()
}

fn indices(combination: &[ps_sweep::ParameterValue]) -> Vec<i64> {
    combination
        .iter()
        .map(|v| match v.value {
            Scalar::Int(i) => i,
            ref other => panic!("unexpected value {other:?}"),
        })
        .collect()
}

proptest! {
    #[test]
    fn walk_covers_full_product_once(lens in prop::collection::vec(1usize..5, 1..5)) {
        let mut ranges = explicit_ranges(&lens);
        let seen = combinations(&mut ranges);

        let expected: usize = lens.iter().product();
        prop_assert_eq!(seen.len(), expected);

        let unique: HashSet<Vec<i64>> = seen.iter().map(|c| indices(c)).collect();
        prop_assert_eq!(unique.len(), expected);
    }

    #[test]
    fn walk_is_in_odometer_order(lens in prop::collection::vec(1usize..5, 1..5)) {
        let mut ranges = explicit_ranges(&lens);
        let seen: Vec<Vec<i64>> = combinations(&mut ranges).iter().map(|c| indices(c)).collect();

        // Odometer order over index digits is lexicographic order.
        let mut sorted = seen.clone();
        sorted.sort();
        prop_assert_eq!(&seen, &sorted);

        let last = lens.len() - 1;
        for pair in seen.windows(2) {
            let carried = pair[0][..last] != pair[1][..last];
            if !carried {
                prop_assert_ne!(pair[0][last], pair[1][last]);
            }
        }
    }

    #[test]
    fn linear_ranges_end_exactly_on_end(
        start in -100.0f64..100.0,
        step in 0.01f64..10.0,
        count in 1usize..50,
        extra in 0.0f64..1.0,
    ) {
        let end = start + step * (count as f64 - 1.0 + extra);
        let range = ParameterRange::linear("x", "", start, end, step).unwrap();
        let values = range.values();
        let last = values.last().and_then(Scalar::as_f64).unwrap();
        prop_assert_eq!(last, end);
        prop_assert!(values.len() >= count && values.len() <= count + 1);
    }

    #[test]
    fn large_magnitude_linear_ranges_keep_every_step(
        start in -1e12f64..1e12,
        ratio in 1e-4f64..0.1,
        count in 1usize..50,
        extra in 0.0f64..1.0,
    ) {
        let step = start.abs().max(1.0) * ratio;
        let end = start + step * (count as f64 - 1.0 + extra);
        let range = ParameterRange::linear("x", "", start, end, step).unwrap();
        let values = range.values();
        let last = values.last().and_then(Scalar::as_f64).unwrap();
        prop_assert_eq!(last, end);
        prop_assert!(values.len() >= count && values.len() <= count + 1);
    }

    #[test]
    fn exponential_ranges_end_exactly_on_end(
        start in 0.001f64..1000.0,
        step in 1.1f64..10.0,
        powers in 0u32..12,
    ) {
        let end = start * step.powi(powers as i32) * 1.01;
        let range = ParameterRange::exponential("k", "", start, end, step).unwrap();
        let values = range.values();
        prop_assert_eq!(values.last().and_then(Scalar::as_f64).unwrap(), end);
        prop_assert!(values.len() as u32 <= powers + 2);
    }

    #[test]
    fn explicit_range_terminal_after_len_advances(len in 1usize..20) {
        let mut range = explicit_ranges(&[len]).remove(0);
        range.reset();
        for k in 0..len {
            prop_assert!(!range.is_terminal());
            prop_assert_eq!(range.current().value, Scalar::Int(k as i64));
            range.advance();
        }
        prop_assert!(range.is_terminal());
    }
}

#[test]
fn stiffness_viscosity_matrix() {
    let mut ranges = vec![
        ParameterRange::linear("stiffness", "Stiffness", 1000.0, 10000.0, 9000.0).unwrap(),
        ParameterRange::linear("viscosity", "Viscosity", 0.0, 0.5, 0.5).unwrap(),
    ];

    let mut seen = Vec::new();
    let visited = walk_matrix(&mut ranges, |values| {
        let pair: Vec<f64> = values.iter().filter_map(|v| v.value.as_f64()).collect();
        seen.push((pair[0], pair[1]));
        Ok::<(), std::convert::Infallible>(())
    })
    .unwrap();

    assert_eq!(visited, 4);
    assert_eq!(
        seen,
        vec![(1000.0, 0.0), (1000.0, 0.5), (10000.0, 0.0), (10000.0, 0.5)]
    );
}

#[test]
fn mixed_policies_walk_together() {
    let mut ranges = vec![
        ParameterRange::explicit(
            "stiffness",
            "Stiffness",
            vec![Scalar::Float(1000.0), Scalar::Float(10000.0)],
        )
        .unwrap(),
        ParameterRange::exponential("timestep", "Timestep", 0.01, 0.0025, 0.5).unwrap(),
    ];
    let seen = combinations(&mut ranges);
    assert_eq!(seen.len(), 6);
    let flags: Vec<String> = seen[5].iter().map(|v| v.as_flag()).collect();
    assert_eq!(flags, vec!["--stiffness=10000", "--timestep=0.0025"]);
}
