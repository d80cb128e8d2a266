// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Angular Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Product angular quadrature: uniform azimuthal angles crossed with
//! Gauss-Legendre polar cosines, stored octant-major.

use std::f64::consts::PI;

use neutron_math::legendre::gauss_legendre_01;
use neutron_types::error::{TransportError, TransportResult};

use crate::angle::Angle;
use crate::mesh::Normal;

/// Octant images under reflection about each face normal, 1-based.
const REFLECT_X: [usize; 8] = [2, 1, 4, 3, 6, 5, 8, 7];
const REFLECT_Y: [usize; 8] = [4, 3, 2, 1, 8, 7, 6, 5];
const REFLECT_Z: [usize; 8] = [5, 6, 7, 8, 1, 2, 3, 4];

/// Discrete ordinate set partitioned into eight octants.
///
/// Angles are ordered octant-major; within an octant the azimuthal
/// index varies slowest and the polar index fastest, so angle
/// `(m, ip)` of octant `o` sits at `(o-1)·ndir_oct + m·n_polar + ip`.
/// Weights over all octants sum to 4π.
#[derive(Debug, Clone)]
pub struct AngularQuadrature {
    angles: Vec<Angle>,
    n_azimuthal: usize,
    n_polar: usize,
}

impl AngularQuadrature {
    /// Build the product quadrature with `n_azimuthal` uniformly spaced
    /// azimuths and `n_polar` Gauss-Legendre polar cosines per octant.
    pub fn product(n_azimuthal: usize, n_polar: usize) -> TransportResult<Self> {
        if n_azimuthal == 0 || n_polar == 0 {
            return Err(TransportError::Config(
                "Angular quadrature orders must be positive.".into(),
            ));
        }

        let (mu, wp) = gauss_legendre_01(n_polar);

        // Octant 1 base set; solid angle per octant is π/2
        let mut base = Vec::with_capacity(n_azimuthal * n_polar);
        for m in 0..n_azimuthal {
            let alpha = (m as f64 + 0.5) * 0.5 * PI / n_azimuthal as f64;
            for ip in 0..n_polar {
                let theta = mu[ip].acos();
                let weight = 0.5 * PI * wp[ip] / n_azimuthal as f64;
                base.push(Angle::from_angles(alpha, theta, weight));
            }
        }

        let mut angles = Vec::with_capacity(8 * base.len());
        for oct in 1..=8 {
            for ang in &base {
                angles.push(ang.to_octant(oct));
            }
        }

        Ok(AngularQuadrature {
            angles,
            n_azimuthal,
            n_polar,
        })
    }

    /// Total number of directions.
    pub fn ndir(&self) -> usize {
        self.angles.len()
    }

    /// Directions per octant.
    pub fn ndir_oct(&self) -> usize {
        self.n_azimuthal * self.n_polar
    }

    pub fn n_azimuthal(&self) -> usize {
        self.n_azimuthal
    }

    pub fn n_polar(&self) -> usize {
        self.n_polar
    }

    /// 1-based octant of a direction index.
    pub fn octant(&self, iang: usize) -> usize {
        iang / self.ndir_oct() + 1
    }

    pub fn angle(&self, iang: usize) -> &Angle {
        &self.angles[iang]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Angle> {
        self.angles.iter()
    }

    /// Index of the direction obtained by reflecting `iang` about the
    /// given face normal. Reflection preserves the intra-octant index.
    pub fn reflect(&self, iang: usize, norm: Normal) -> usize {
        let table = match norm {
            Normal::X => &REFLECT_X,
            Normal::Y => &REFLECT_Y,
            Normal::Z => &REFLECT_Z,
        };
        let oct = self.octant(iang);
        let pos = iang % self.ndir_oct();
        (table[oct - 1] - 1) * self.ndir_oct() + pos
    }

    /// Replace the azimuth of base direction `m` across all octants,
    /// preserving polar angles and weights. Used by the ray tracer when
    /// it snaps azimuths to the modular track angles.
    pub fn set_azimuth(&mut self, m: usize, alpha: f64) {
        debug_assert!(m < self.n_azimuthal);
        debug_assert!(alpha > 0.0 && alpha < 0.5 * PI);
        for ip in 0..self.n_polar {
            let idx = m * self.n_polar + ip;
            let modified = self.angles[idx].modify_alpha(alpha);
            let ndir_oct = self.ndir_oct();
            for oct in 1..=8 {
                self.angles[(oct - 1) * ndir_oct + idx] = modified.to_octant(oct);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::constants::FOUR_PI;

    #[test]
    fn test_weight_sum_is_four_pi() {
        let quad = AngularQuadrature::product(4, 3).unwrap();
        let total: f64 = quad.iter().map(|a| a.weight).sum();
        assert!((total - FOUR_PI).abs() < 1e-10, "weight sum {total}");
    }

    #[test]
    fn test_ordering_and_counts() {
        let quad = AngularQuadrature::product(3, 2).unwrap();
        assert_eq!(quad.ndir(), 48);
        assert_eq!(quad.ndir_oct(), 6);
        assert_eq!(quad.octant(0), 1);
        assert_eq!(quad.octant(47), 8);
    }

    #[test]
    fn test_direction_normalization() {
        let quad = AngularQuadrature::product(4, 2).unwrap();
        for ang in quad.iter() {
            let norm = ang.ox * ang.ox + ang.oy * ang.oy + ang.oz * ang.oz;
            assert!((norm - 1.0).abs() < 1e-10);
            assert!(ang.weight > 0.0);
        }
    }

    #[test]
    fn test_reflection_flips_one_cosine() {
        let quad = AngularQuadrature::product(2, 2).unwrap();
        for iang in 0..quad.ndir() {
            let a = quad.angle(iang);
            let r = quad.angle(quad.reflect(iang, Normal::X));
            assert!((a.ox + r.ox).abs() < 1e-12);
            assert!((a.oy - r.oy).abs() < 1e-12);
            assert!((a.oz - r.oz).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reflection_involution() {
        let quad = AngularQuadrature::product(3, 2).unwrap();
        for iang in 0..quad.ndir() {
            for norm in [Normal::X, Normal::Y, Normal::Z] {
                assert_eq!(quad.reflect(quad.reflect(iang, norm), norm), iang);
            }
        }
    }

    #[test]
    fn test_set_azimuth_updates_all_octants() {
        let mut quad = AngularQuadrature::product(2, 2).unwrap();
        quad.set_azimuth(0, 0.5);
        for oct in 1..=8 {
            let idx = (oct - 1) * quad.ndir_oct();
            let a = quad.angle(idx);
            // |ox| must match the new azimuth in every octant
            let expected = a.theta.sin() * 0.5_f64.cos();
            assert!((a.ox.abs() - expected.abs()).abs() < 1e-12);
        }
        let total: f64 = quad.iter().map(|a| a.weight).sum();
        assert!((total - FOUR_PI).abs() < 1e-10);
    }
}
