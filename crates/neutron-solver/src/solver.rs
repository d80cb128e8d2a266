// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Top-level solver selection.

use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use neutron_types::config::ProblemConfig;
use neutron_types::error::{TransportError, TransportResult};

use neutron_core::core_mesh::CoreMesh;

use crate::eigen::EigenSolver;
use crate::fixed_source::FixedSourceSolver;
use crate::output::write_output;

pub enum Solver {
    Eigenvalue(EigenSolver),
    FixedSource(FixedSourceSolver),
}

impl Solver {
    pub fn from_config(config: &ProblemConfig, mesh: Rc<CoreMesh>) -> TransportResult<Self> {
        match config.solver.kind.as_str() {
            "eigenvalue" => Ok(Solver::Eigenvalue(EigenSolver::new(config, mesh)?)),
            "fixed_source" => Ok(Solver::FixedSource(FixedSourceSolver::new(config, mesh)?)),
            _ => Err(TransportError::Config(
                "Failed to detect a valid solver type.".into(),
            )),
        }
    }

    /// Install the interrupt flag checked between outer iterations;
    /// when it trips, the solver stops cleanly so the caller can still
    /// flush the output payload.
    pub fn install_interrupt(&mut self, flag: Arc<AtomicBool>) {
        match self {
            Solver::Eigenvalue(s) => s.install_interrupt(flag),
            Solver::FixedSource(s) => s.install_interrupt(flag),
        }
    }

    pub fn solve(&mut self) -> TransportResult<()> {
        match self {
            Solver::Eigenvalue(s) => s.solve(),
            Solver::FixedSource(s) => s.solve(),
        }
    }

    pub fn k(&self) -> Option<f64> {
        match self {
            Solver::Eigenvalue(s) => Some(s.k()),
            Solver::FixedSource(_) => None,
        }
    }

    pub fn write_output(&self, path: &Path) -> TransportResult<()> {
        match self {
            Solver::Eigenvalue(s) => write_output(
                path,
                &s.fss().mesh(),
                s.fss().sweeper(),
                Some(s.k_history()),
            ),
            Solver::FixedSource(s) => write_output(path, &s.mesh(), s.sweeper(), None),
        }
    }
}
