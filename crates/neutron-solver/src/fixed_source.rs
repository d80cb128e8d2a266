// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Fixed Source Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed-source solver: one pass assembles the group source (fission,
//! then in-scatter) and sweeps each group in turn. A standalone solve
//! iterates passes with an empty fission bank until the scalar flux
//! settles.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array1;
use neutron_types::config::ProblemConfig;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::core_mesh::CoreMesh;
use neutron_core::source::TransportSource;
use neutron_core::sweeper::TransportSweeper;
use neutron_math::norms::rel_l2_diff;
use neutron_sweepers::factory::build_sweeper;

pub struct FixedSourceSolver {
    mesh: Rc<CoreMesh>,
    sweeper: Box<dyn TransportSweeper>,
    source: TransportSource,
    ng: usize,
    has_external: bool,
    flux_tol: f64,
    max_iter: usize,
    interrupt: Option<Arc<AtomicBool>>,
}

impl FixedSourceSolver {
    pub fn new(config: &ProblemConfig, mesh: Rc<CoreMesh>) -> TransportResult<Self> {
        let sweeper = build_sweeper(config, Rc::clone(&mesh))?;
        let mut source = sweeper.create_source();

        let mut has_external = false;
        if let Some(ext) = &config.solver.external_source {
            if ext.len() != sweeper.n_group() {
                return Err(TransportError::Config(format!(
                    "External source has {} groups, problem has {}.",
                    ext.len(),
                    sweeper.n_group()
                )));
            }
            source.set_external_uniform(ext);
            has_external = true;
        }

        let ng = sweeper.n_group();
        Ok(FixedSourceSolver {
            mesh,
            sweeper,
            source,
            ng,
            has_external,
            flux_tol: config.solver.flux_tolerance,
            max_iter: config.solver.max_iter,
            interrupt: None,
        })
    }

    pub fn mesh(&self) -> Rc<CoreMesh> {
        Rc::clone(&self.mesh)
    }

    pub fn n_group(&self) -> usize {
        self.ng
    }

    pub fn sweeper(&self) -> &dyn TransportSweeper {
        self.sweeper.as_ref()
    }

    pub fn install_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .map(|f| f.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// One pass over all groups against the given fission bank.
    pub fn step(&mut self, fission_source: &Array1<f64>) -> TransportResult<()> {
        self.sweeper.store_old_flux();
        for g in 0..self.ng {
            self.source.fission(fission_source, g);
            self.source.in_scatter(g, &self.sweeper.scatter_flux())?;
            self.sweeper.sweep(g, &self.source)?;
        }
        Ok(())
    }

    /// Standalone source iteration with no fission bank.
    pub fn solve(&mut self) -> TransportResult<()> {
        if !self.has_external {
            return Err(TransportError::Config(
                "No external source specified for fixed-source solve.".into(),
            ));
        }
        let fs = Array1::zeros(self.sweeper.n_reg());
        let mut prev = self.sweeper.flux().to_owned();
        for it in 1..=self.max_iter {
            if self.interrupted() {
                log::warn!("Interrupted; stopping fixed-source iteration at {it}");
                return Ok(());
            }
            self.step(&fs)?;
            let flux = self.sweeper.flux();
            let resid = rel_l2_diff(
                flux.as_slice().unwrap(),
                prev.as_slice().unwrap(),
            );
            log::info!("Source iteration {it:3}: flux residual {resid:.3e}");
            if resid < self.flux_tol {
                return Ok(());
            }
            prev.assign(&flux);
        }
        Err(TransportError::Convergence {
            iteration: self.max_iter,
            message: "fixed-source iteration did not settle".into(),
        })
    }
}
