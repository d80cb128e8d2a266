// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Neutron Sweepers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Transport sweep kernels.
//!
//! The Sn sweeper is generic over its differencing scheme (plain or
//! corrected diamond difference) and its current-capture policy. The
//! MoC plane sweeper traces modular rays once per unique plane and
//! emits the correction factors the corrected scheme consumes. The
//! 2D3D composite orchestrates both against the shared coarse-data
//! bus.

pub mod cmdo;
pub mod factory;
pub mod sn;
