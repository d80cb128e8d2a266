// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Geometry hierarchy: pin mesh → pin → lattice → assembly → core.

pub mod assembly;
pub mod core;
pub mod lattice;
pub mod pin;
pub mod pin_mesh;

pub use assembly::Assembly;
pub use core::Core;
pub use lattice::Lattice;
pub use pin::Pin;
pub use pin_mesh::PinMesh;
