// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Property-Based Tests (proptest) for angles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for angles and the angular quadrature.
//!
//! Covers: direction normalization, octant transforms, upwind surfaces,
//! reflection indexing, and quadrature weight conservation.

use std::f64::consts::PI;

use neutron_core::angle::Angle;
use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::mesh::{Normal, Surface};
use neutron_types::constants::FOUR_PI;
use proptest::prelude::*;

fn octant_one_angle() -> impl Strategy<Value = Angle> {
    (0.01..0.49f64, 0.01..0.49f64, 0.1..4.0f64)
        .prop_map(|(a, t, w)| Angle::from_angles(a * PI, t * PI, w))
}

proptest! {
    /// Every constructed direction is a unit vector.
    #[test]
    fn angle_is_normalized(ang in octant_one_angle()) {
        let norm = ang.ox * ang.ox + ang.oy * ang.oy + ang.oz * ang.oz;
        prop_assert!((norm - 1.0).abs() < 1e-10);
    }

    /// to_octant preserves cosine magnitudes and only flips signs.
    #[test]
    fn octant_transform_preserves_magnitudes(ang in octant_one_angle(), oct in 1usize..=8) {
        let t = ang.to_octant(oct);
        prop_assert!((t.ox.abs() - ang.ox.abs()).abs() < 1e-12);
        prop_assert!((t.oy.abs() - ang.oy.abs()).abs() < 1e-12);
        prop_assert!((t.oz.abs() - ang.oz.abs()).abs() < 1e-12);
        prop_assert_eq!(t.weight, ang.weight);
    }

    /// The upwind surface always opposes the direction of travel.
    #[test]
    fn upwind_surface_opposes_travel(ang in octant_one_angle(), oct in 1usize..=8) {
        let t = ang.to_octant(oct);
        let sx = t.upwind_surface(Normal::X);
        prop_assert_eq!(sx, if t.ox > 0.0 { Surface::West } else { Surface::East });
        let sy = t.upwind_surface(Normal::Y);
        prop_assert_eq!(sy, if t.oy > 0.0 { Surface::South } else { Surface::North });
        let sz = t.upwind_surface(Normal::Z);
        prop_assert_eq!(sz, if t.oz > 0.0 { Surface::Bottom } else { Surface::Top });
    }

    /// Quadrature weights always sum to the full solid angle.
    #[test]
    fn quadrature_weights_sum(na in 1usize..6, np in 1usize..5) {
        let quad = AngularQuadrature::product(na, np).unwrap();
        let total: f64 = quad.iter().map(|a| a.weight).sum();
        prop_assert!((total - FOUR_PI).abs() < 1e-10);
    }

    /// Reflection about a normal flips exactly that cosine and is an
    /// involution.
    #[test]
    fn reflection_is_involution(na in 1usize..4, np in 1usize..4, seed in 0usize..1000) {
        let quad = AngularQuadrature::product(na, np).unwrap();
        let iang = seed % quad.ndir();
        for norm in [Normal::X, Normal::Y, Normal::Z] {
            let r = quad.reflect(iang, norm);
            prop_assert_eq!(quad.reflect(r, norm), iang);
            let a = quad.angle(iang);
            let b = quad.angle(r);
            match norm {
                Normal::X => prop_assert!((a.ox + b.ox).abs() < 1e-12),
                Normal::Y => prop_assert!((a.oy + b.oy).abs() < 1e-12),
                Normal::Z => prop_assert!((a.oz + b.oz).abs() < 1e-12),
            }
        }
    }
}
