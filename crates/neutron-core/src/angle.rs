// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Angle
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! A single discrete ordinate: direction cosines, angular coordinates,
//! and quadrature weight.

use std::f64::consts::PI;

use crate::mesh::{Normal, Surface};

/// Tolerance for component-wise angle equality.
const EQ_TOL: f64 = 1e-12;

/// One direction of the angular quadrature.
///
/// The direction cosines satisfy ox² + oy² + oz² = 1; `rsintheta` is
/// kept alongside because it converts projected 2-D ray lengths into
/// true path lengths.
#[derive(Debug, Clone, Copy)]
pub struct Angle {
    /// x-component of the direction
    pub ox: f64,
    /// y-component of the direction
    pub oy: f64,
    /// z-component of the direction
    pub oz: f64,
    /// azimuthal angle
    pub alpha: f64,
    /// polar angle
    pub theta: f64,
    /// quadrature weight
    pub weight: f64,
    /// reciprocal sine of the polar angle
    pub rsintheta: f64,
}

impl Angle {
    /// Construct from azimuthal angle, polar angle, and weight.
    pub fn from_angles(alpha: f64, theta: f64, weight: f64) -> Self {
        let sin_theta = theta.sin();
        Angle {
            ox: sin_theta * alpha.cos(),
            oy: sin_theta * alpha.sin(),
            oz: theta.cos(),
            alpha,
            theta,
            weight,
            rsintheta: 1.0 / sin_theta,
        }
    }

    /// Construct from direction cosines and weight. The azimuth is
    /// recovered as acos(ox/sinθ) and reflected across 2π when oy < 0.
    pub fn from_cosines(ox: f64, oy: f64, oz: f64, weight: f64) -> Self {
        let theta = oz.acos();
        let sin_theta = theta.sin();
        let mut alpha = (ox / sin_theta).clamp(-1.0, 1.0).acos();
        if oy < 0.0 {
            alpha = 2.0 * PI - alpha;
        }
        Angle {
            ox,
            oy,
            oz,
            alpha,
            theta,
            weight,
            rsintheta: 1.0 / sin_theta,
        }
    }

    /// Rotate this angle (assumed in octant 1) into octant `n ∈ [1, 8]`
    /// by flipping cosine signs to the octant's parity.
    pub fn to_octant(&self, n: usize) -> Angle {
        assert!((1..=8).contains(&n), "Invalid octant: {n}");
        let k = n - 1;
        // Octants 1-4 counterclockwise with oz > 0, then 5-8 below
        let sx = if k % 4 == 1 || k % 4 == 2 { -1.0 } else { 1.0 };
        let sy = if k % 4 >= 2 { -1.0 } else { 1.0 };
        let sz = if k >= 4 { -1.0 } else { 1.0 };
        Angle::from_cosines(
            sx * self.ox.abs(),
            sy * self.oy.abs(),
            sz * self.oz.abs(),
            self.weight,
        )
    }

    /// The surface from which rays travelling in this direction
    /// originate, for a given face normal.
    pub fn upwind_surface(&self, norm: Normal) -> Surface {
        match norm {
            Normal::X => {
                if self.ox > 0.0 {
                    Surface::West
                } else {
                    Surface::East
                }
            }
            Normal::Y => {
                if self.oy > 0.0 {
                    Surface::South
                } else {
                    Surface::North
                }
            }
            Normal::Z => {
                if self.oz > 0.0 {
                    Surface::Bottom
                } else {
                    Surface::Top
                }
            }
        }
    }

    /// Rebuild the angle with a new azimuth, preserving the polar angle
    /// and the weight.
    pub fn modify_alpha(&self, alpha: f64) -> Angle {
        Angle::from_angles(alpha, self.theta, self.weight)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Self) -> bool {
        (self.ox - other.ox).abs() < EQ_TOL
            && (self.oy - other.oy).abs() < EQ_TOL
            && (self.oz - other.oz).abs() < EQ_TOL
            && (self.alpha - other.alpha).abs() < EQ_TOL
            && (self.theta - other.theta).abs() < EQ_TOL
            && (self.weight - other.weight).abs() < EQ_TOL
    }
}
