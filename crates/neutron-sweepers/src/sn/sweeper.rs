// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn Sweeper
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-group orthogonal-mesh Sn sweep, generic over the differencing
//! scheme.
//!
//! The sweeper runs `n_inner` inner iterations per group; only the
//! last inner captures surface currents, and only when a coarse-data
//! bus is attached. In-group boundary updates are either Gauss-Seidel
//! (each angle immediately feeds its reflections) or Jacobi (the whole
//! group's outgoing flux is applied at once).

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::{Array1, Array2, ArrayView2};
use neutron_types::config::SweeperConfig;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::coarse_data::CoarseData;
use neutron_core::core_mesh::CoreMesh;
use neutron_core::mesh::Normal;
use neutron_core::source::{ScatterFlux, Source, TransportSource, XsHandle};
use neutron_core::sweeper::{fission_source_into, total_fission_of, TransportSweeper};
use neutron_core::xs_mesh_homogenized::XSMeshHomogenized;
use neutron_math::norms::rel_l2_diff;

use super::boundary::SnBoundary;
use super::cell_worker::{CellWorker, CellWorkerCdd, CellWorkerDd};
use super::current_worker::{Current, CurrentWorker, NoCurrent};

pub type SnSweeperDd = SnSweeperVariant<CellWorkerDd>;
pub type SnSweeperCdd = SnSweeperVariant<CellWorkerCdd>;

/// Sn sweeper parameterized on its cell worker. Client code that knows
/// the concrete worker type (the 2D3D composite does) gets fully typed
/// access; everything else goes through `TransportSweeper`.
pub struct SnSweeperVariant<W: CellWorker> {
    mesh: Rc<CoreMesh>,
    quad: AngularQuadrature,
    xs: Rc<RefCell<XSMeshHomogenized>>,
    flux: Array2<f64>,
    flux_old: Array2<f64>,
    xstr: Vec<f64>,
    q: Array1<f64>,
    flux_1g: Array1<f64>,
    bc_in: SnBoundary,
    bc_out: SnBoundary,
    n_inner: usize,
    gs_boundary: bool,
    cell_worker: W,
}

impl<W: CellWorker> SnSweeperVariant<W> {
    pub fn new(
        config: &SweeperConfig,
        mesh: Rc<CoreMesh>,
        quad: AngularQuadrature,
        xs: Rc<RefCell<XSMeshHomogenized>>,
        cell_worker: W,
    ) -> TransportResult<Self> {
        log::debug!("Constructing a base Sn sweeper");

        if config.n_inner < 0 {
            return Err(TransportError::Config(
                "Invalid number of inner iterations specified (n_inner).".into(),
            ));
        }
        let n_inner = config.n_inner as usize;

        let n_pin = mesh.n_pin();
        let ng = mesh.n_group();
        let n_ang = quad.ndir();
        let bc_in = SnBoundary::new(mesh.coarse(), ng, n_ang);
        let bc_out = SnBoundary::new(mesh.coarse(), 1, n_ang);

        Ok(SnSweeperVariant {
            mesh,
            quad,
            xs,
            flux: Array2::from_elem((n_pin, ng), 1.0),
            flux_old: Array2::from_elem((n_pin, ng), 1.0),
            xstr: vec![0.0; n_pin],
            q: Array1::zeros(n_pin),
            flux_1g: Array1::zeros(n_pin),
            bc_in,
            bc_out,
            n_inner,
            gs_boundary: config.gs_boundary,
            cell_worker,
        })
    }

    pub fn quadrature(&self) -> &AngularQuadrature {
        &self.quad
    }

    pub fn xs_mesh(&self) -> Rc<RefCell<XSMeshHomogenized>> {
        Rc::clone(&self.xs)
    }

    /// One full group sweep: `n_inner` inners, current capture on the
    /// last when the bus is attached.
    pub fn sweep_sn(
        &mut self,
        group: usize,
        source: &Source,
        mut coarse: Option<&mut CoarseData>,
    ) -> TransportResult<()> {
        {
            let xs = self.xs.borrow();
            for xsr in xs.iter() {
                let xstr = xsr.xsmactr()[group];
                for &r in xsr.reg() {
                    self.xstr[r] = xstr;
                }
            }
        }

        self.flux_1g.assign(&self.flux.column(group));

        for inner in 0..self.n_inner {
            source.self_scatter(group, &self.flux_1g, &mut self.q);

            let last = inner + 1 == self.n_inner;
            match coarse.as_deref_mut() {
                Some(cd) if last => {
                    cd.zero_group(group);
                    let mesh = Rc::clone(&self.mesh);
                    let mut cw = Current::new(cd, mesh, group);
                    self.sweep_1g(group, &mut cw);
                    cd.set_has_radial_data(true);
                    cd.set_has_axial_data(true);
                }
                _ => {
                    let mut cw = NoCurrent;
                    self.sweep_1g(group, &mut cw);
                }
            }
        }

        self.flux.column_mut(group).assign(&self.flux_1g);
        Ok(())
    }

    /// Generic one-group sweep over the orthogonal mesh, tailored to a
    /// current-capture policy through the `CurrentWorker` parameter.
    fn sweep_1g<CW: CurrentWorker>(&mut self, group: usize, cw: &mut CW) {
        self.flux_1g.fill(0.0);
        self.cell_worker.set_group(group);

        let coarse = self.mesh.coarse();
        let nx = coarse.nx() as i64;
        let ny = coarse.ny() as i64;
        let nz = coarse.nz() as i64;

        let mut x_flux = vec![0.0; (ny * nz) as usize];
        let mut y_flux = vec![0.0; (nx * nz) as usize];
        let mut z_flux = vec![0.0; (nx * ny) as usize];

        for iang in 0..self.quad.ndir() {
            let ang = *self.quad.angle(iang);
            cw.set_angle(iang, ang, group);
            self.cell_worker.set_angle(iang, ang);
            let wgt = ang.weight;

            // Sweep order follows the cosine signs per axis
            let (sttx, stpx, xdir) = if ang.ox > 0.0 { (0, nx, 1) } else { (nx - 1, -1, -1) };
            let (stty, stpy, ydir) = if ang.oy > 0.0 { (0, ny, 1) } else { (ny - 1, -1, -1) };
            let (sttz, stpz, zdir) = if ang.oz > 0.0 { (0, nz, 1) } else { (nz - 1, -1, -1) };

            x_flux.copy_from_slice(self.bc_in.face(group, iang, Normal::X));
            y_flux.copy_from_slice(self.bc_in.face(group, iang, Normal::Y));
            z_flux.copy_from_slice(self.bc_in.face(group, iang, Normal::Z));

            cw.upwind_work(&x_flux, &y_flux, &z_flux);

            let mut iz = sttz;
            while iz != stpz {
                self.cell_worker.set_z(iz as usize);
                let mut iy = stty;
                while iy != stpy {
                    self.cell_worker.set_y(iy as usize);
                    let mut ix = sttx;
                    while ix != stpx {
                        let fx = (ny * iz + iy) as usize;
                        let fy = (nx * iz + ix) as usize;
                        let fz = (nx * iy + ix) as usize;
                        let mut psi_x = x_flux[fx];
                        let mut psi_y = y_flux[fy];
                        let mut psi_z = z_flux[fz];

                        let i = (ix + nx * (iy + ny * iz)) as usize;
                        let qv = self.q[i];
                        let xstr = self.xstr[i];

                        let psi = self.cell_worker.evaluate(
                            &mut psi_x, &mut psi_y, &mut psi_z, qv, xstr, i,
                        );

                        x_flux[fx] = psi_x;
                        y_flux[fy] = psi_y;
                        z_flux[fz] = psi_z;

                        self.flux_1g[i] += psi * wgt;

                        cw.current_work(psi_x, psi_y, psi_z, i);

                        ix += xdir;
                    }
                    iy += ydir;
                }
                iz += zdir;
            }

            // Stash the downwind faces
            self.bc_out.set_face(0, iang, Normal::X, &x_flux);
            self.bc_out.set_face(0, iang, Normal::Y, &y_flux);
            self.bc_out.set_face(0, iang, Normal::Z, &z_flux);
            if self.gs_boundary {
                self.bc_in.update_angle(group, iang, &self.bc_out, &self.quad);
            }
        }

        if !self.gs_boundary {
            self.bc_in.update(group, &self.bc_out, &self.quad);
        }
    }

    fn pin_flux_1g_into(&self, g: usize, out: &mut Array1<f64>) {
        out.assign(&self.flux.column(g));
    }
}

impl<W: CellWorker> TransportSweeper for SnSweeperVariant<W> {
    fn n_reg(&self) -> usize {
        self.flux.nrows()
    }

    fn n_group(&self) -> usize {
        self.flux.ncols()
    }

    fn n_pin(&self) -> usize {
        self.mesh.n_pin()
    }

    fn flux(&self) -> ArrayView2<'_, f64> {
        self.flux.view()
    }

    fn scatter_flux(&self) -> ScatterFlux<'_> {
        ScatterFlux {
            fine: self.flux.view(),
            pin: None,
        }
    }

    fn sweep(&mut self, group: usize, source: &TransportSource) -> TransportResult<()> {
        let source = source.plain()?;
        self.sweep_sn(group, source, None)
    }

    fn create_source(&self) -> TransportSource {
        TransportSource::Plain(Source::new(
            self.n_reg(),
            XsHandle::Homogenized(Rc::clone(&self.xs)),
        ))
    }

    fn store_old_flux(&mut self) {
        self.flux_old.assign(&self.flux);
    }

    fn calc_fission_source(&self, k: f64, fs: &mut Array1<f64>) {
        let xs = self.xs.borrow();
        fission_source_into(xs.regions(), self.flux.view(), k, fs);
    }

    fn total_fission(&self, old: bool) -> f64 {
        let flux = if old { &self.flux_old } else { &self.flux };
        let xs = self.xs.borrow();
        total_fission_of(xs.regions(), flux.view(), self.mesh.coarse().volumes())
    }

    fn get_pin_flux_1g(&self, g: usize, out: &mut Array1<f64>) {
        self.pin_flux_1g_into(g, out);
    }

    fn set_pin_flux_1g(&mut self, g: usize, pin_flux: &Array1<f64>) -> f64 {
        let old = self.flux.column(g).to_owned();
        let diff = rel_l2_diff(
            pin_flux.as_slice().unwrap(),
            old.as_slice().unwrap(),
        );
        self.flux.column_mut(g).assign(pin_flux);
        diff
    }

    fn homogenized_xs(&self) -> Option<Rc<RefCell<XSMeshHomogenized>>> {
        Some(Rc::clone(&self.xs))
    }
}

/// Convenience constructor for the plain diamond-difference sweeper.
pub fn build_sn_dd(
    config: &SweeperConfig,
    mesh: Rc<CoreMesh>,
    quad: AngularQuadrature,
) -> TransportResult<SnSweeperDd> {
    let xs = Rc::new(RefCell::new(XSMeshHomogenized::build(Rc::clone(&mesh))?));
    let worker = CellWorkerDd::new(Rc::clone(&mesh));
    SnSweeperVariant::new(config, mesh, quad, xs, worker)
}

/// Convenience constructor for the corrected-diamond-difference
/// sweeper used inside the 2D3D composite.
pub fn build_sn_cdd(
    config: &SweeperConfig,
    mesh: Rc<CoreMesh>,
    quad: AngularQuadrature,
    corrections: Rc<RefCell<neutron_core::correction_data::CorrectionData>>,
) -> TransportResult<SnSweeperCdd> {
    let xs = Rc::new(RefCell::new(XSMeshHomogenized::build(Rc::clone(&mesh))?));
    let worker = CellWorkerCdd::new(Rc::clone(&mesh), corrections);
    SnSweeperVariant::new(config, mesh, quad, xs, worker)
}
