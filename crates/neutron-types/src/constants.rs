// ─────────────────────────────────────────────────────────────────────
// SCPN Neutron Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Angular normalization constants.

use std::f64::consts::PI;

/// Full solid angle. Quadrature weights sum to this.
pub const FOUR_PI: f64 = 4.0 * PI;

/// Reciprocal of the full solid angle. Isotropic sources are specified
/// per steradian, so volumetric source strengths are scaled by this.
pub const RFOUR_PI: f64 = 1.0 / FOUR_PI;
