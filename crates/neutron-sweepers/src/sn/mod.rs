// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Sn
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Discrete-ordinates sweep kernel on the coarse (pin-wise) mesh.

pub mod boundary;
pub mod cell_worker;
pub mod current_worker;
pub mod sweeper;

pub use boundary::SnBoundary;
pub use cell_worker::{CellWorker, CellWorkerCdd, CellWorkerDd};
pub use current_worker::{Current, CurrentWorker, NoCurrent};
pub use sweeper::{SnSweeperCdd, SnSweeperDd, SnSweeperVariant};
