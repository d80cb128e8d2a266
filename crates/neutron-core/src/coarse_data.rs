// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Coarse Data
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shared coarse-mesh surface-current storage.
//!
//! The bus is owned by the composite sweeper and lent to one
//! sub-sweeper at a time: MoC fills the radial (x, y) currents during
//! its plane sweeps, then the Sn sweeper zeroes the group and refills
//! all three families on its last inner iteration.

use ndarray::Array2;

use crate::mesh::CoarseMesh;

/// Net surface currents per group, one column per group, one row per
/// surface of the family.
#[derive(Debug)]
pub struct CoarseData {
    current_x: Array2<f64>,
    current_y: Array2<f64>,
    current_z: Array2<f64>,
    has_radial_data: bool,
    has_axial_data: bool,
}

impl CoarseData {
    pub fn new(mesh: &CoarseMesh, ng: usize) -> Self {
        CoarseData {
            current_x: Array2::zeros((mesh.n_surf_x(), ng)),
            current_y: Array2::zeros((mesh.n_surf_y(), ng)),
            current_z: Array2::zeros((mesh.n_surf_z(), ng)),
            has_radial_data: false,
            has_axial_data: false,
        }
    }

    pub fn has_radial_data(&self) -> bool {
        self.has_radial_data
    }

    pub fn has_axial_data(&self) -> bool {
        self.has_axial_data
    }

    pub fn set_has_radial_data(&mut self, v: bool) {
        self.has_radial_data = v;
    }

    pub fn set_has_axial_data(&mut self, v: bool) {
        self.has_axial_data = v;
    }

    /// Zero every current in group `g`.
    pub fn zero_group(&mut self, g: usize) {
        self.current_x.column_mut(g).fill(0.0);
        self.current_y.column_mut(g).fill(0.0);
        self.current_z.column_mut(g).fill(0.0);
    }

    pub fn current_x(&self, isurf: usize, g: usize) -> f64 {
        self.current_x[[isurf, g]]
    }

    pub fn current_y(&self, isurf: usize, g: usize) -> f64 {
        self.current_y[[isurf, g]]
    }

    pub fn current_z(&self, isurf: usize, g: usize) -> f64 {
        self.current_z[[isurf, g]]
    }

    pub fn add_current_x(&mut self, isurf: usize, g: usize, j: f64) {
        self.current_x[[isurf, g]] += j;
    }

    pub fn add_current_y(&mut self, isurf: usize, g: usize, j: f64) {
        self.current_y[[isurf, g]] += j;
    }

    pub fn add_current_z(&mut self, isurf: usize, g: usize, j: f64) {
        self.current_z[[isurf, g]] += j;
    }
}
