// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Plane Sweeper 2D3D
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The 2D3D composite sweeper.
//!
//! Each plane is treated with a 2-D MoC sweep, which produces the
//! correction factors needed to treat the entire system with a 3-D
//! corrected-diamond-difference Sn sweep. The composite owns the
//! coarse-data bus and lends it to one sub-sweeper at a time: MoC
//! writes radial currents, then Sn zeroes the group and refills all
//! three surface families.

use std::cell::RefCell;
use std::rc::Rc;

use ndarray::{Array1, ArrayView2};
use neutron_types::config::SweeperConfig;
use neutron_types::error::TransportResult;

use neutron_core::angular_quadrature::AngularQuadrature;
use neutron_core::coarse_data::CoarseData;
use neutron_core::core_mesh::CoreMesh;
use neutron_core::correction_data::CorrectionData;
use neutron_core::source::{ScatterFlux, Source, Source2D3D, TransportSource, XsHandle};
use neutron_core::sweeper::TransportSweeper;
use neutron_core::xs_mesh::XSMesh;
use neutron_core::xs_mesh_homogenized::XSMeshHomogenized;
use neutron_math::norms::rel_l2_diff;

use super::moc_sweeper::MocSweeper;
use crate::sn::cell_worker::CellWorkerCdd;
use crate::sn::sweeper::SnSweeperCdd;

pub struct PlaneSweeper2D3D {
    mesh: Rc<CoreMesh>,
    sn: SnSweeperCdd,
    moc: MocSweeper,
    corrections: Rc<RefCell<CorrectionData>>,
    coarse: CoarseData,
    sn_resid: Vec<Vec<f64>>,

    expose_sn: bool,
    do_snproject: bool,
    do_tl: bool,
    n_inactive_moc: usize,
    moc_modulo: usize,
    i_outer: isize,

    tl_buf: Array1<f64>,
    pin_buf: Array1<f64>,
    pin_buf2: Array1<f64>,
}

impl PlaneSweeper2D3D {
    pub fn new(config: &SweeperConfig, mesh: Rc<CoreMesh>) -> TransportResult<Self> {
        let ng = mesh.n_group();
        let quad = AngularQuadrature::product(config.n_azimuthal, config.n_polar)?;

        let fine_xs = Rc::new(XSMesh::build(&mesh)?);
        let mut moc = MocSweeper::new(config, Rc::clone(&mesh), quad, fine_xs)?;

        let corrections = Rc::new(RefCell::new(CorrectionData::new(
            mesh.n_pin(),
            moc.quadrature().ndir(),
            ng,
        )));
        moc.set_corrections(Rc::clone(&corrections));

        // The Sn side shares the azimuth-snapped quadrature so that
        // correction factors line up angle for angle
        let sn_quad = moc.quadrature().clone();
        let sn_xs = Rc::new(RefCell::new(XSMeshHomogenized::build(Rc::clone(&mesh))?));
        let worker = CellWorkerCdd::new(Rc::clone(&mesh), Rc::clone(&corrections));
        let sn = SnSweeperCdd::new(config, Rc::clone(&mesh), sn_quad, sn_xs, worker)?;

        let coarse = CoarseData::new(mesh.coarse(), ng);
        let n_pin = mesh.n_pin();

        log::info!(
            "Constructed 2D3D sweeper: expose_sn={}, do_snproject={}, do_tl={}, n_inactive_moc={}, moc_modulo={}",
            config.expose_sn,
            config.do_snproject,
            config.do_tl,
            config.n_inactive_moc,
            config.moc_modulo
        );

        Ok(PlaneSweeper2D3D {
            mesh,
            sn,
            moc,
            corrections,
            coarse,
            sn_resid: vec![Vec::new(); ng],
            expose_sn: config.expose_sn,
            do_snproject: config.do_snproject,
            do_tl: config.do_tl,
            n_inactive_moc: config.n_inactive_moc,
            moc_modulo: config.moc_modulo.max(1),
            i_outer: -1,
            tl_buf: Array1::zeros(n_pin),
            pin_buf: Array1::zeros(n_pin),
            pin_buf2: Array1::zeros(n_pin),
        })
    }

    pub fn corrections(&self) -> Rc<RefCell<CorrectionData>> {
        Rc::clone(&self.corrections)
    }

    /// Transverse-leakage density from the axial currents on the bus.
    fn add_tl(&mut self, group: usize) {
        let coarse_mesh = self.mesh.coarse();
        for ipin in 0..self.mesh.n_pin() {
            let pos = coarse_mesh.position(ipin);
            let top = coarse_mesh.surf_z(pos.ix, pos.iy, pos.iz + 1);
            let bot = coarse_mesh.surf_z(pos.ix, pos.iy, pos.iz);
            let dz = coarse_mesh.dz()[pos.iz];
            self.tl_buf[ipin] =
                (self.coarse.current_z(top, group) - self.coarse.current_z(bot, group)) / dz;
        }
        self.moc.set_transverse_leakage(group, &self.tl_buf);
    }

    fn moc_active(&self) -> bool {
        let i = self.i_outer.max(0) as usize;
        i >= self.n_inactive_moc && i % self.moc_modulo == 0
    }
}

impl TransportSweeper for PlaneSweeper2D3D {
    fn n_reg(&self) -> usize {
        self.moc.n_reg()
    }

    fn n_group(&self) -> usize {
        self.moc.n_group()
    }

    fn n_pin(&self) -> usize {
        self.mesh.n_pin()
    }

    fn flux(&self) -> ArrayView2<'_, f64> {
        self.moc.flux()
    }

    fn scatter_flux(&self) -> ScatterFlux<'_> {
        ScatterFlux {
            fine: self.moc.flux(),
            pin: Some(self.sn.flux()),
        }
    }

    fn sweep(&mut self, group: usize, source: &TransportSource) -> TransportResult<()> {
        let source = source.two_d_three_d()?;

        if self.do_tl && self.coarse.has_axial_data() {
            self.add_tl(group);
        }

        if self.moc_active() {
            self.moc
                .sweep_moc(group, source.moc(), Some(&mut self.coarse))?;

            if self.do_snproject {
                self.moc.get_pin_flux_1g(group, &mut self.pin_buf);
                let buf = self.pin_buf.clone();
                self.sn.set_pin_flux_1g(group, &buf);
            }
        }

        self.sn
            .sweep_sn(group, source.sn(), Some(&mut self.coarse))?;

        self.moc.get_pin_flux_1g(group, &mut self.pin_buf);
        self.sn.get_pin_flux_1g(group, &mut self.pin_buf2);
        let resid = rel_l2_diff(
            self.pin_buf2.as_slice().unwrap(),
            self.pin_buf.as_slice().unwrap(),
        );
        self.sn_resid[group].push(resid);
        log::debug!("2D3D group {group}: Sn-MoC residual {resid:.3e}");

        Ok(())
    }

    fn create_source(&self) -> TransportSource {
        let moc_src = Source::new(self.moc.n_reg(), XsHandle::Fine(self.moc.xs_mesh()));
        let sn_src = Source::new(
            self.mesh.n_pin(),
            XsHandle::Homogenized(self.sn.xs_mesh()),
        );
        TransportSource::TwoDThreeD(Source2D3D::new(moc_src, sn_src, Rc::clone(&self.mesh)))
    }

    fn store_old_flux(&mut self) {
        self.moc.store_old_flux();
        self.sn.store_old_flux();
        self.i_outer += 1;

        // Re-collapse the Sn cross sections with the latest MoC flux
        if let Err(err) = self
            .sn
            .xs_mesh()
            .borrow_mut()
            .update(self.moc.flux())
        {
            log::warn!("Homogenized XS update failed: {err}");
        }
    }

    fn calc_fission_source(&self, k: f64, fs: &mut Array1<f64>) {
        self.moc.calc_fission_source(k, fs);
    }

    fn total_fission(&self, old: bool) -> f64 {
        self.moc.total_fission(old)
    }

    fn get_pin_flux_1g(&self, g: usize, out: &mut Array1<f64>) {
        if self.expose_sn {
            self.sn.get_pin_flux_1g(g, out);
        } else {
            self.moc.get_pin_flux_1g(g, out);
        }
    }

    fn set_pin_flux_1g(&mut self, g: usize, pin_flux: &Array1<f64>) -> f64 {
        self.sn.set_pin_flux_1g(g, pin_flux);
        self.moc.set_pin_flux_1g(g, pin_flux)
    }

    fn homogenized_xs(&self) -> Option<Rc<RefCell<XSMeshHomogenized>>> {
        Some(self.sn.xs_mesh())
    }

    fn sn_moc_residuals(&self) -> Option<&[Vec<f64>]> {
        Some(&self.sn_resid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_types::config::ProblemConfig;

    fn problem(doc: &str) -> (Rc<CoreMesh>, ProblemConfig) {
        let cfg = ProblemConfig::from_str(doc).unwrap();
        let mesh = Rc::new(CoreMesh::from_config(&cfg).unwrap());
        (mesh, cfg)
    }

    const SMALL_CORE: &str = r#"{
        "mesh": [{"id": 1, "pitch_x": 1.0, "pitch_y": 1.0, "sub_x": 2, "sub_y": 2}],
        "materials": [{
            "id": 1, "name": "fuel",
            "xsab": [1.0],
            "xsnf": [1.2],
            "chi": [1.0],
            "scattering": [[0.2]]
        }],
        "pins": [{"id": 1, "mesh": 1, "materials": [1, 1, 1, 1]}],
        "lattices": [{"id": 1, "nx": 2, "ny": 2, "pins": [1, 1, 1, 1]}],
        "assemblies": [{"id": 1, "np": 2, "hz": 1.0, "lattices": [1, 1]}],
        "core": {"nx": 1, "ny": 1, "assemblies": [1]},
        "sweeper": {"type": "2d3d", "n_inner": 2, "ray_spacing": 0.2,
                    "n_azimuthal": 2, "n_polar": 2},
        "solver": {"type": "eigenvalue"}
    }"#;

    #[test]
    fn test_requires_composite_source() {
        let (mesh, cfg) = problem(SMALL_CORE);
        let mut sweeper = PlaneSweeper2D3D::new(&cfg.sweeper, mesh).unwrap();
        let fine_xs = sweeper.moc.xs_mesh();
        let bad = TransportSource::Plain(Source::new(
            sweeper.n_reg(),
            XsHandle::Fine(fine_xs),
        ));
        assert!(sweeper.sweep(0, &bad).is_err());
    }

    #[test]
    fn test_moc_skip_logic() {
        let (mesh, mut cfg) = problem(SMALL_CORE);
        cfg.sweeper.n_inactive_moc = 2;
        cfg.sweeper.moc_modulo = 2;
        let mut sweeper = PlaneSweeper2D3D::new(&cfg.sweeper, mesh).unwrap();

        // Outers 0, 1 inactive; outer 2 runs (2 % 2 == 0); outer 3 skips
        let expectations = [false, false, true, false, true];
        for &expected in &expectations {
            sweeper.store_old_flux();
            assert_eq!(sweeper.moc_active(), expected, "outer {}", sweeper.i_outer);
        }
    }

    #[test]
    fn test_composite_sweep_runs_and_records_residual() {
        let (mesh, cfg) = problem(SMALL_CORE);
        let mut sweeper = PlaneSweeper2D3D::new(&cfg.sweeper, Rc::clone(&mesh)).unwrap();
        let mut source = sweeper.create_source();

        let mut fs = Array1::zeros(sweeper.n_reg());
        sweeper.calc_fission_source(1.0, &mut fs);
        sweeper.store_old_flux();
        source.fission(&fs, 0);
        source.in_scatter(0, &sweeper.scatter_flux()).unwrap();
        sweeper.sweep(0, &source).unwrap();

        assert_eq!(sweeper.sn_moc_residuals().unwrap()[0].len(), 1);
        assert!(sweeper.coarse.has_axial_data());
        // Flat problem: MoC and Sn pin fluxes track each other closely
        assert!(sweeper.sn_moc_residuals().unwrap()[0][0] < 0.5);
    }
}
