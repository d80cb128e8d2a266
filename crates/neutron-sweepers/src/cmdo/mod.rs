// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Cmdo
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The coupled MoC/Sn 2D3D method: per-plane MoC sweeps produce the
//! correction factors consumed by the 3-D corrected-diamond Sn sweep.

pub mod moc_sweeper;
pub mod plane_sweeper;
pub mod rays;

pub use moc_sweeper::MocSweeper;
pub use plane_sweeper::PlaneSweeper2D3D;
