// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn Current Worker
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Current-capture policy for the Sn sweep.
//!
//! The no-op variant costs nothing in the inner loop; the capturing
//! variant accumulates net surface currents into the coarse-data bus
//! on the sweeper's last inner iteration.

use std::rc::Rc;

use neutron_core::angle::Angle;
use neutron_core::coarse_data::CoarseData;
use neutron_core::core_mesh::CoreMesh;

/// Current-capture capability set.
pub trait CurrentWorker {
    fn set_angle(&mut self, iang: usize, ang: Angle, g: usize);

    /// Accumulate the incoming boundary-face contributions for the
    /// current angle.
    fn upwind_work(&mut self, x_flux: &[f64], y_flux: &[f64], z_flux: &[f64]);

    /// Accumulate the outgoing-face contributions of one cell.
    fn current_work(&mut self, psi_x: f64, psi_y: f64, psi_z: f64, i: usize);
}

/// No-op capture.
pub struct NoCurrent;

impl CurrentWorker for NoCurrent {
    fn set_angle(&mut self, _iang: usize, _ang: Angle, _g: usize) {}

    fn upwind_work(&mut self, _x: &[f64], _y: &[f64], _z: &[f64]) {}

    fn current_work(&mut self, _psi_x: f64, _psi_y: f64, _psi_z: f64, _i: usize) {}
}

/// Accumulates net currents (ω·w·ψ, signed by direction) on every
/// surface the sweep touches.
pub struct Current<'a> {
    data: &'a mut CoarseData,
    mesh: Rc<CoreMesh>,
    g: usize,
    ox: f64,
    oy: f64,
    oz: f64,
    w: f64,
}

impl<'a> Current<'a> {
    pub fn new(data: &'a mut CoarseData, mesh: Rc<CoreMesh>, g: usize) -> Self {
        Current {
            data,
            mesh,
            g,
            ox: 0.0,
            oy: 0.0,
            oz: 0.0,
            w: 0.0,
        }
    }
}

impl CurrentWorker for Current<'_> {
    fn set_angle(&mut self, _iang: usize, ang: Angle, g: usize) {
        self.ox = ang.ox;
        self.oy = ang.oy;
        self.oz = ang.oz;
        self.w = ang.weight;
        self.g = g;
    }

    fn upwind_work(&mut self, x_flux: &[f64], y_flux: &[f64], z_flux: &[f64]) {
        let mesh = self.mesh.coarse();
        let (nx, ny, nz) = (mesh.nx(), mesh.ny(), mesh.nz());

        let isx = if self.ox > 0.0 { 0 } else { nx };
        for iz in 0..nz {
            for iy in 0..ny {
                let s = mesh.surf_x(isx, iy, iz);
                self.data
                    .add_current_x(s, self.g, self.ox * self.w * x_flux[ny * iz + iy]);
            }
        }

        let isy = if self.oy > 0.0 { 0 } else { ny };
        for iz in 0..nz {
            for ix in 0..nx {
                let s = mesh.surf_y(ix, isy, iz);
                self.data
                    .add_current_y(s, self.g, self.oy * self.w * y_flux[nx * iz + ix]);
            }
        }

        let isz = if self.oz > 0.0 { 0 } else { nz };
        for iy in 0..ny {
            for ix in 0..nx {
                let s = mesh.surf_z(ix, iy, isz);
                self.data
                    .add_current_z(s, self.g, self.oz * self.w * z_flux[nx * iy + ix]);
            }
        }
    }

    fn current_work(&mut self, psi_x: f64, psi_y: f64, psi_z: f64, i: usize) {
        let mesh = self.mesh.coarse();
        let pos = mesh.position(i);

        let isx = if self.ox > 0.0 { pos.ix + 1 } else { pos.ix };
        let s = mesh.surf_x(isx, pos.iy, pos.iz);
        self.data.add_current_x(s, self.g, self.ox * self.w * psi_x);

        let isy = if self.oy > 0.0 { pos.iy + 1 } else { pos.iy };
        let s = mesh.surf_y(pos.ix, isy, pos.iz);
        self.data.add_current_y(s, self.g, self.oy * self.w * psi_y);

        let isz = if self.oz > 0.0 { pos.iz + 1 } else { pos.iz };
        let s = mesh.surf_z(pos.ix, pos.iy, isz);
        self.data.add_current_z(s, self.g, self.oz * self.w * psi_z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::ProblemConfig;

    fn unit_mesh() -> Rc<CoreMesh> {
        let doc = r#"{
            "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0}],
            "materials": [{"id": 1, "name": "m", "xsab": [1.0], "scattering": [[0.0]]}],
            "pins": [{"id": 1, "mesh": 1, "materials": [1]}],
            "lattices": [{"id": 1, "nx": 1, "ny": 1, "pins": [1]}],
            "assemblies": [{"id": 1, "np": 1, "hz": 1.0, "lattices": [1]}],
            "core": {"nx": 1, "ny": 1, "assemblies": [1]},
            "sweeper": {"type": "sn", "n_inner": 1},
            "solver": {"type": "eigenvalue"}
        }"#;
        Rc::new(CoreMesh::from_config(&ProblemConfig::from_str(doc).unwrap()).unwrap())
    }

    #[test]
    fn test_outgoing_current_sign() {
        let mesh = unit_mesh();
        let mut cd = CoarseData::new(mesh.coarse(), 1);
        let ang_pos = Angle::from_angles(0.7, 0.9, 2.0);
        {
            let mut cw = Current::new(&mut cd, Rc::clone(&mesh), 0);
            cw.set_angle(0, ang_pos, 0);
            cw.current_work(1.0, 1.0, 1.0, 0);
        }
        // Positive ox exits through the east face (surface index 1)
        assert!((cd.current_x(1, 0) - ang_pos.ox * 2.0).abs() < 1e-14);
        assert_eq!(cd.current_x(0, 0), 0.0);

        let ang_neg = ang_pos.to_octant(7);
        {
            let mut cw = Current::new(&mut cd, Rc::clone(&mesh), 0);
            cw.set_angle(0, ang_neg, 0);
            cw.current_work(1.0, 1.0, 1.0, 0);
        }
        // Negative ox exits west with a negative contribution
        assert!((cd.current_x(0, 0) - ang_neg.ox * 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_upwind_plus_outgoing_cancel_in_equilibrium() {
        // Isotropic, uniform angular flux: net current on every
        // surface must vanish once all octants are accumulated.
        let mesh = unit_mesh();
        let quad =
            neutron_core::angular_quadrature::AngularQuadrature::product(2, 2).unwrap();
        let mut cd = CoarseData::new(mesh.coarse(), 1);
        {
            let mut cw = Current::new(&mut cd, Rc::clone(&mesh), 0);
            for iang in 0..quad.ndir() {
                let ang = *quad.angle(iang);
                cw.set_angle(iang, ang, 0);
                cw.upwind_work(&[1.0], &[1.0], &[1.0]);
                cw.current_work(1.0, 1.0, 1.0, 0);
            }
        }
        for s in 0..2 {
            assert!(cd.current_x(s, 0).abs() < 1e-12);
            assert!(cd.current_y(s, 0).abs() < 1e-12);
            assert!(cd.current_z(s, 0).abs() < 1e-12);
        }
    }
}
