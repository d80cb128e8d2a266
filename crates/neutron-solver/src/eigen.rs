// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Eigenvalue Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Power iteration on the fission source.
//!
//! Each outer runs one fixed-source pass, rescales k by the ratio of
//! fission production, and converges on both the k increment and the
//! L2 change of the fission source shape.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array1;
use neutron_types::config::ProblemConfig;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::core_mesh::CoreMesh;
use neutron_math::norms::rel_l2_diff;

use crate::fixed_source::FixedSourceSolver;

pub struct EigenSolver {
    fss: FixedSourceSolver,
    fission_source: Array1<f64>,
    k: f64,
    k_history: Vec<f64>,
    k_tol: f64,
    f_tol: f64,
    max_iter: usize,
    interrupt: Option<Arc<AtomicBool>>,
}

impl EigenSolver {
    pub fn new(config: &ProblemConfig, mesh: Rc<CoreMesh>) -> TransportResult<Self> {
        let fss = FixedSourceSolver::new(config, mesh)?;
        let mut fission_source = Array1::zeros(fss.sweeper().n_reg());
        fss.sweeper().calc_fission_source(1.0, &mut fission_source);

        if fission_source.sum() <= 0.0 {
            return Err(TransportError::Config(
                "Eigenvalue problem has no fissile material.".into(),
            ));
        }

        Ok(EigenSolver {
            fss,
            fission_source,
            k: 1.0,
            k_history: Vec::new(),
            k_tol: config.solver.k_tolerance,
            f_tol: config.solver.flux_tolerance,
            max_iter: config.solver.max_iter,
            interrupt: None,
        })
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn k_history(&self) -> &[f64] {
        &self.k_history
    }

    pub fn fss(&self) -> &FixedSourceSolver {
        &self.fss
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

    /// One outer iteration. Returns (|Δk|, relative fission-source
    /// change).
    pub fn step(&mut self) -> TransportResult<(f64, f64)> {
        self.fss.step(&self.fission_source)?;

        let mut fs_new = Array1::zeros(self.fission_source.len());
        self.fss.sweeper().calc_fission_source(self.k, &mut fs_new);

        let sum_new = fs_new.sum();
        let sum_old = self.fission_source.sum();
        let k_new = self.k * sum_new / sum_old;

        let df = rel_l2_diff(
            fs_new.as_slice().unwrap(),
            self.fission_source.as_slice().unwrap(),
        );
        let dk = (k_new - self.k).abs();

        self.k = k_new;
        self.fss
            .sweeper()
            .calc_fission_source(k_new, &mut self.fission_source);
        self.k_history.push(k_new);

        Ok((dk, df))
    }

    pub fn solve(&mut self) -> TransportResult<()> {
        for outer in 1..=self.max_iter {
            if self.interrupted() {
                log::warn!("Interrupted; stopping after outer {}", outer - 1);
                return Ok(());
            }
            let (dk, df) = self.step()?;
            log::info!(
                "Outer {outer:3}: k = {:.8} (dk {:.3e}, df {:.3e})",
                self.k,
                dk,
                df
            );
            if dk < self.k_tol && df < self.f_tol {
                log::info!("Converged: k = {:.8} after {outer} outers", self.k);
                return Ok(());
            }
        }
        Err(TransportError::Convergence {
            iteration: self.max_iter,
            message: format!("k = {:.8} has not converged", self.k),
        })
    }
}
