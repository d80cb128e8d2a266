// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Neutron Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Core data model of the transport solver.
//!
//! Angular quadrature, the geometry hierarchy (pin mesh → pin → lattice
//! → assembly → core), coarse-mesh indexing, material cross sections,
//! fine and homogenized cross-section meshes, the coarse-data and
//! correction buses shared by the coupled sweepers, source terms, and
//! the `TransportSweeper` contract.

pub mod angle;
pub mod angular_quadrature;
pub mod coarse_data;
pub mod core_mesh;
pub mod correction_data;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod source;
pub mod sweeper;
pub mod xs_mesh;
pub mod xs_mesh_homogenized;
