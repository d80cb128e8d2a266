// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Neutron Solver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Solver drivers: the fixed-source inner solver, the power-iteration
//! eigenvalue solver, and the NPZ output payload.

pub mod eigen;
pub mod fixed_source;
pub mod output;
pub mod solver;

pub use eigen::EigenSolver;
pub use fixed_source::FixedSourceSolver;
pub use solver::Solver;
