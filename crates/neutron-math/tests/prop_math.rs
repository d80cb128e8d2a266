// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Property-Based Tests (proptest) for neutron-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for the quadrature abscissae and norms.

use neutron_math::legendre::{gauss_legendre, gauss_legendre_01};
use neutron_math::norms::{l2_norm, rel_l2_diff};
use proptest::prelude::*;

proptest! {
    /// Nodes are ascending, inside (-1, 1), and symmetric about zero.
    #[test]
    fn gauss_nodes_sorted_and_symmetric(n in 1usize..16) {
        let (x, w) = gauss_legendre(n);
        for i in 1..n {
            prop_assert!(x[i] > x[i - 1]);
        }
        for i in 0..n {
            prop_assert!(x[i].abs() < 1.0);
            prop_assert!(w[i] > 0.0);
            prop_assert!((x[i] + x[n - 1 - i]).abs() < 1e-12);
            prop_assert!((w[i] - w[n - 1 - i]).abs() < 1e-12);
        }
    }

    /// The n-point rule integrates monomials up to degree 2n-1 exactly.
    #[test]
    fn gauss_exactness(n in 1usize..10) {
        for degree in 0..2 * n {
            let (x, w) = gauss_legendre(n);
            let integral: f64 = x.iter().zip(&w).map(|(x, w)| w * x.powi(degree as i32)).sum();
            let exact = if degree % 2 == 0 {
                2.0 / (degree as f64 + 1.0)
            } else {
                0.0
            };
            prop_assert!(
                (integral - exact).abs() < 1e-11,
                "n={}, degree={}: {} vs {}", n, degree, integral, exact
            );
        }
    }

    /// The [0, 1] map preserves the weight sum at 1.
    #[test]
    fn gauss_unit_interval_weight_sum(n in 1usize..16) {
        let (_, w) = gauss_legendre_01(n);
        let total: f64 = w.iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-12);
    }

    /// Scaling a vector scales its norm.
    #[test]
    fn l2_norm_homogeneous(v in prop::collection::vec(-1e3..1e3f64, 1..50), s in -10.0..10.0f64) {
        let scaled: Vec<f64> = v.iter().map(|x| s * x).collect();
        prop_assert!((l2_norm(&scaled) - s.abs() * l2_norm(&v)).abs() < 1e-6);
    }

    /// The relative difference of a vector with itself is zero.
    #[test]
    fn rel_diff_reflexive(v in prop::collection::vec(-1e3..1e3f64, 1..50)) {
        prop_assert_eq!(rel_l2_diff(&v, &v), 0.0);
    }
}
