// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn Cell Worker
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-cell differencing schemes for the Sn sweep.
//!
//! A cell worker is configured per group, angle, and sweep row, then
//! evaluated once per cell: it returns the cell-average angular flux
//! and overwrites the face values with the outgoing fluxes. The
//! corrected variant reads α/β factors produced by the MoC sweeper.

use std::cell::RefCell;
use std::rc::Rc;

use neutron_core::angle::Angle;
use neutron_core::core_mesh::CoreMesh;
use neutron_core::correction_data::CorrectionData;
use neutron_core::mesh::Normal;

/// Differencing scheme capability set. Inner-loop calls are
/// monomorphized through the sweeper's type parameter.
pub trait CellWorker {
    fn set_group(&mut self, g: usize);

    fn set_angle(&mut self, iang: usize, ang: Angle);

    fn set_z(&mut self, iz: usize);

    fn set_y(&mut self, iy: usize);

    /// Evaluate one cell: `psi_x/y/z` carry the upwind face fluxes in
    /// and the downwind face fluxes out. Returns the cell average.
    fn evaluate(
        &mut self,
        psi_x: &mut f64,
        psi_y: &mut f64,
        psi_z: &mut f64,
        q: f64,
        xstr: f64,
        i: usize,
    ) -> f64;
}

/// Standard diamond difference.
pub struct CellWorkerDd {
    mesh: Rc<CoreMesh>,
    tx: Vec<f64>,
    ty: f64,
    tz: f64,
    oy: f64,
    oz: f64,
}

impl CellWorkerDd {
    pub fn new(mesh: Rc<CoreMesh>) -> Self {
        let nx = mesh.coarse().nx();
        CellWorkerDd {
            mesh,
            tx: vec![0.0; nx],
            ty: 0.0,
            tz: 0.0,
            oy: 0.0,
            oz: 0.0,
        }
    }
}

impl CellWorker for CellWorkerDd {
    fn set_group(&mut self, _g: usize) {}

    fn set_angle(&mut self, _iang: usize, ang: Angle) {
        let ox = ang.ox.abs();
        self.oy = ang.oy.abs();
        self.oz = ang.oz.abs();
        for (ix, dx) in self.mesh.coarse().dx().iter().enumerate() {
            self.tx[ix] = 2.0 * ox / dx;
        }
    }

    fn set_z(&mut self, iz: usize) {
        self.tz = 2.0 * self.oz / self.mesh.coarse().dz()[iz];
    }

    fn set_y(&mut self, iy: usize) {
        self.ty = 2.0 * self.oy / self.mesh.coarse().dy()[iy];
    }

    fn evaluate(
        &mut self,
        psi_x: &mut f64,
        psi_y: &mut f64,
        psi_z: &mut f64,
        q: f64,
        xstr: f64,
        i: usize,
    ) -> f64 {
        let tx = self.tx[i % self.tx.len()];
        let psi = (q + tx * *psi_x + self.ty * *psi_y + self.tz * *psi_z)
            / (xstr + tx + self.ty + self.tz);
        *psi_x = 2.0 * psi - *psi_x;
        *psi_y = 2.0 * psi - *psi_y;
        *psi_z = 2.0 * psi - *psi_z;
        psi
    }
}

/// Corrected diamond difference: the radial face closures are scaled
/// by the MoC-derived α·β factors; the axial closure stays diamond.
pub struct CellWorkerCdd {
    base: CellWorkerDd,
    corrections: Rc<RefCell<CorrectionData>>,
    group: usize,
    iang: usize,
}

impl CellWorkerCdd {
    pub fn new(mesh: Rc<CoreMesh>, corrections: Rc<RefCell<CorrectionData>>) -> Self {
        CellWorkerCdd {
            base: CellWorkerDd::new(mesh),
            corrections,
            group: 0,
            iang: 0,
        }
    }

    pub fn corrections(&self) -> Rc<RefCell<CorrectionData>> {
        Rc::clone(&self.corrections)
    }
}

impl CellWorker for CellWorkerCdd {
    fn set_group(&mut self, g: usize) {
        self.group = g;
    }

    fn set_angle(&mut self, iang: usize, ang: Angle) {
        self.iang = iang;
        self.base.set_angle(iang, ang);
    }

    fn set_z(&mut self, iz: usize) {
        self.base.set_z(iz);
    }

    fn set_y(&mut self, iy: usize) {
        self.base.set_y(iy);
    }

    fn evaluate(
        &mut self,
        psi_x: &mut f64,
        psi_y: &mut f64,
        psi_z: &mut f64,
        q: f64,
        xstr: f64,
        i: usize,
    ) -> f64 {
        let tx = self.base.tx[i % self.base.tx.len()];
        let (ax, ay) = {
            let c = self.corrections.borrow();
            let b = c.beta(i, self.iang, self.group);
            (
                c.alpha(i, self.iang, self.group, Normal::X) * b,
                c.alpha(i, self.iang, self.group, Normal::Y) * b,
            )
        };
        let psi = (q + tx * *psi_x + self.base.ty * *psi_y + self.base.tz * *psi_z)
            / (xstr + tx * ax + self.base.ty * ay + self.base.tz);
        *psi_x = 2.0 * ax * psi - *psi_x;
        *psi_y = 2.0 * ay * psi - *psi_y;
        *psi_z = 2.0 * psi - *psi_z;
        psi
    }
}
